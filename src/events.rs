//! Events emitted while building an archive.
//!
//! Every event goes to `tracing` and, when the caller asked for it, down an
//! mpsc channel. The channel is what callers (the CLI, tests) use to audit a
//! run: how many posts were loaded, which ones were skipped and why, what got
//! copied and written.

use crate::filter::SkipReason;
use crate::types::PostType;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveEvent {
    /// The outbox was read and every entry validated.
    Loaded { posts: usize },
    /// An entry that gets no page.
    Skipped {
        id: String,
        actor: String,
        kind: PostType,
        reason: SkipReason,
    },
    /// A directory tree was merged into the output.
    Copied {
        source: PathBuf,
        destination: PathBuf,
        files: usize,
    },
    PageWritten { id: String, path: PathBuf },
}

/// Handle through which pipeline stages report [`ArchiveEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    tx: Option<Sender<ArchiveEvent>>,
}

impl Reporter {
    pub fn new(tx: Option<Sender<ArchiveEvent>>) -> Self {
        Self { tx }
    }

    /// A reporter that only logs.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ArchiveEvent) {
        trace_event(&event);
        if let Some(tx) = &self.tx {
            // A dropped receiver just means nobody is listening anymore.
            let _ = tx.send(event);
        }
    }
}

fn trace_event(event: &ArchiveEvent) {
    match event {
        ArchiveEvent::Loaded { posts } => {
            tracing::info!(num_posts = posts, "Loaded toots from outbox.json");
        }
        ArchiveEvent::Skipped {
            id,
            actor,
            kind,
            reason,
        } => {
            tracing::debug!(%id, %actor, kind = kind.as_str(), reason = reason.as_str(), "Skipping");
        }
        ArchiveEvent::Copied {
            source,
            destination,
            files,
        } => {
            tracing::debug!(
                source = %source.display(),
                destination = %destination.display(),
                files,
                "Copied tree"
            );
        }
        ArchiveEvent::PageWritten { id, path } => {
            tracing::debug!(%id, path = %path.display(), "Wrote page");
        }
    }
}
