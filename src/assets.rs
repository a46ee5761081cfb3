//! Copying static assets and media into the output directory.
//!
//! Copies merge into the destination: files from the source overwrite files
//! with the same relative path, everything else already in the destination is
//! left alone. Re-running over an existing archive therefore refreshes it
//! without wiping anything added by hand.
//!
//! ```text
//! static/css/   → output/css/
//! static/fonts/ → output/fonts/
//! static/img/   → output/img/
//! export/media_attachments/ → output/<media prefix>/media_attachments/
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Subdirectories of the static assets directory that get copied.
pub const STATIC_SUBDIRS: [&str; 3] = ["css", "fonts", "img"];

pub const MEDIA_DIR: &str = "media_attachments";

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error(
        "Copying {} to {} failed after {copied} file(s): {source}",
        .from.display(),
        .to.display()
    )]
    Copy {
        from: PathBuf,
        to: PathBuf,
        copied: usize,
        #[source]
        source: io::Error,
    },
    #[error(
        "Refusing to copy {} into {}: the destination is inside the source",
        .from.display(),
        .to.display()
    )]
    Overlap { from: PathBuf, to: PathBuf },
    #[error("Walking {} failed after {copied} file(s): {source}", .root.display())]
    Walk {
        root: PathBuf,
        copied: usize,
        #[source]
        source: walkdir::Error,
    },
}

impl AssetError {
    /// Number of files that made it to the destination before the failure.
    pub fn copied(&self) -> usize {
        match self {
            AssetError::SourceNotFound(_) | AssetError::Overlap { .. } => 0,
            AssetError::Copy { copied, .. } | AssetError::Walk { copied, .. } => *copied,
        }
    }
}

/// What a successful tree copy did.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub files: usize,
}

/// Copy every file under `src` to the same relative path under `dst`,
/// creating directories as needed. Symlinks are followed.
///
/// `dst` must not be `src` or lie inside it: copying a file onto itself
/// truncates it, and a nested destination would be walked as source.
pub fn merge_tree(src: &Path, dst: &Path) -> Result<CopyReport, AssetError> {
    if !src.is_dir() {
        return Err(AssetError::SourceNotFound(src.to_path_buf()));
    }

    let mut copied = 0;
    let copy_error = |from: &Path, to: &Path, copied, source| AssetError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        copied,
        source,
    };

    let real_src = fs::canonicalize(src).map_err(|e| copy_error(src, dst, copied, e))?;
    let real_dst = resolve(dst).map_err(|e| copy_error(src, dst, copied, e))?;
    if real_dst.starts_with(&real_src) {
        return Err(AssetError::Overlap {
            from: src.to_path_buf(),
            to: dst.to_path_buf(),
        });
    }

    fs::create_dir_all(dst).map_err(|e| copy_error(src, dst, copied, e))?;

    let walker = WalkDir::new(src)
        .follow_links(true)
        .sort_by_file_name()
        .min_depth(1);
    for entry in walker {
        let entry = entry.map_err(|source| AssetError::Walk {
            root: src.to_path_buf(),
            copied,
            source,
        })?;
        // strip_prefix can't fail: every entry is below `src`
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| copy_error(entry.path(), &target, copied, e))?;
        } else {
            fs::copy(entry.path(), &target)
                .map_err(|e| copy_error(entry.path(), &target, copied, e))?;
            copied += 1;
        }
    }

    Ok(CopyReport {
        source: src.to_path_buf(),
        destination: dst.to_path_buf(),
        files: copied,
    })
}

/// Canonical form of a path that may not exist yet: its closest existing
/// ancestor, canonicalized, with the missing components appended.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        match fs::canonicalize(existing) {
            Ok(real) => {
                return Ok(missing.iter().rev().fold(real, |acc: PathBuf, part| acc.join(part)));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Merge `static_dir/{css,fonts,img}` into `output_dir`.
pub fn copy_static_assets(
    static_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<CopyReport>, AssetError> {
    STATIC_SUBDIRS
        .iter()
        .map(|subdir| merge_tree(&static_dir.join(subdir), &output_dir.join(subdir)))
        .collect()
}

/// Merge the export's `media_attachments/` into `media_root/media_attachments/`.
pub fn copy_media(input_dir: &Path, media_root: &Path) -> Result<CopyReport, AssetError> {
    merge_tree(&input_dir.join(MEDIA_DIR), &media_root.join(MEDIA_DIR))
}
