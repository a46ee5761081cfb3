//! End-to-end archive generation.
//!
//! [`generate`] runs the whole pipeline:
//!
//! ```text
//! 1. load + validate outbox.json          (crate::load)
//! 2. load the post template               (crate::render)
//! 3. filter posts, map URLs to paths      (crate::filter, crate::naming)
//! 4. create the output directory
//! 5. merge static assets                  (crate::assets)
//! 6. merge media attachments
//! 7. render and write one page per post
//! ```
//!
//! Everything that can reject the input (bad records, a missing template,
//! a status URL outside the base prefix) happens before step 4, so a bad
//! export never leaves a half-written archive behind. Failures after that
//! point are IO problems, or an output directory that overlaps a source
//! tree, and abort the run as well.
//!
//! Output layout:
//!
//! ```text
//! output/
//! ├── css/ fonts/ img/                       # static assets
//! ├── <media prefix>/media_attachments/      # media
//! └── <account>/<status path>.html           # one page per post
//! ```

use crate::assets::{self, AssetError, CopyReport};
use crate::config::{ArchiveConfig, ConfigError};
use crate::events::{ArchiveEvent, Reporter};
use crate::filter::{self, Archivable};
use crate::load::{self, LoadError};
use crate::naming::{self, NamingError};
use crate::render::{RenderError, Renderer};
use crate::types::Post;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Naming(#[from] NamingError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error("IO error writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Broad failure categories, for callers that only care what went wrong,
/// not where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input file or directory is missing.
    NotFound,
    /// The outbox (or config) isn't parseable at all.
    Malformed,
    /// Parseable, but some record or setting is invalid.
    Validation,
    /// The template failed to load or render.
    Render,
    Io,
}

impl ArchiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArchiveError::Config(ConfigError::Io(_)) => ErrorKind::Io,
            ArchiveError::Config(ConfigError::Toml(_)) => ErrorKind::Malformed,
            ArchiveError::Config(ConfigError::Validation(_)) => ErrorKind::Validation,
            ArchiveError::Load(LoadError::NotFound(_)) => ErrorKind::NotFound,
            ArchiveError::Load(LoadError::Io { .. }) => ErrorKind::Io,
            ArchiveError::Load(LoadError::Malformed { .. }) => ErrorKind::Malformed,
            ArchiveError::Load(LoadError::Validation { .. }) => ErrorKind::Validation,
            ArchiveError::Naming(_) => ErrorKind::Validation,
            ArchiveError::Render(RenderError::TemplateNotFound { .. }) => ErrorKind::NotFound,
            ArchiveError::Render(_) => ErrorKind::Render,
            ArchiveError::Assets(AssetError::SourceNotFound(_)) => ErrorKind::NotFound,
            ArchiveError::Assets(AssetError::Overlap { .. }) => ErrorKind::Validation,
            ArchiveError::Assets(_) => ErrorKind::Io,
            ArchiveError::Write { .. } => ErrorKind::Io,
        }
    }
}

/// What a run did (or, for [`check`], would do).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveSummary {
    /// Number of posts in the outbox.
    pub loaded: usize,
    /// Page paths, in outbox order.
    pub pages: Vec<PathBuf>,
    /// Ids of posts that got no page, in outbox order.
    pub skipped: Vec<String>,
    /// Asset and media trees merged into the output.
    pub copies: Vec<CopyReport>,
}

struct PlannedPage<'a> {
    archivable: Archivable<'a>,
    path: PathBuf,
}

/// Generate the archive described by `config`.
pub fn generate(config: &ArchiveConfig, reporter: &Reporter) -> Result<ArchiveSummary, ArchiveError> {
    config.validate()?;
    let posts = load::load_outbox(&config.input_dir, reporter)?;
    let renderer = Renderer::new(&config.template_dir)?;
    let (planned, skipped) = plan(&posts, config, reporter)?;

    create_dir(&config.output_dir)?;

    let mut copies = assets::copy_static_assets(&config.static_dir, &config.output_dir)?;
    copies.push(assets::copy_media(&config.input_dir, &config.media_root())?);
    for copy in &copies {
        reporter.emit(ArchiveEvent::Copied {
            source: copy.source.clone(),
            destination: copy.destination.clone(),
            files: copy.files,
        });
    }

    create_dir(&config.posts_dir()?)?;

    let mut pages = Vec::with_capacity(planned.len());
    for page in planned {
        if let Some(parent) = page.path.parent() {
            create_dir(parent)?;
        }
        let html = renderer.render(&page.archivable)?;
        fs::write(&page.path, html).map_err(|source| ArchiveError::Write {
            path: page.path.clone(),
            source,
        })?;
        reporter.emit(ArchiveEvent::PageWritten {
            id: page.archivable.post.id.clone(),
            path: page.path.clone(),
        });
        pages.push(page.path);
    }

    tracing::info!(
        pages = pages.len(),
        skipped = skipped.len(),
        output = %config.output_dir.display(),
        "Archive generated"
    );

    Ok(ArchiveSummary {
        loaded: posts.len(),
        pages,
        skipped,
        copies,
    })
}

/// Run every validation step of [`generate`] without touching the output
/// directory. The summary lists the pages that would be written.
pub fn check(config: &ArchiveConfig, reporter: &Reporter) -> Result<ArchiveSummary, ArchiveError> {
    config.validate()?;
    let posts = load::load_outbox(&config.input_dir, reporter)?;
    Renderer::new(&config.template_dir)?;
    let (planned, skipped) = plan(&posts, config, reporter)?;

    Ok(ArchiveSummary {
        loaded: posts.len(),
        pages: planned.into_iter().map(|p| p.path).collect(),
        skipped,
        copies: Vec::new(),
    })
}

/// Filter posts and work out every page path up front.
fn plan<'a>(
    posts: &'a [Post],
    config: &ArchiveConfig,
    reporter: &Reporter,
) -> Result<(Vec<PlannedPage<'a>>, Vec<String>), NamingError> {
    let posts_dir = config.posts_dir()?;
    let mut planned = Vec::new();
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();

    for post in posts {
        let Some(archivable) = filter::select(post, reporter) else {
            skipped.push(post.id.clone());
            continue;
        };
        let path = posts_dir.join(naming::page_relative_path(
            &archivable.body.url,
            &config.base_prefix_url,
        )?);
        if !seen.insert(path.clone()) {
            tracing::warn!(
                id = %post.id,
                path = %path.display(),
                "Two posts map to the same page; the later one wins"
            );
        }
        planned.push(PlannedPage { archivable, path });
    }

    Ok((planned, skipped))
}

fn create_dir(path: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(path).map_err(|source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    })
}
