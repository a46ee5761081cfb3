//! Reading the export's `outbox.json`.
//!
//! The outbox is loaded in one go and every entry is validated before anything
//! else happens. A single bad entry aborts the load: an archive silently
//! missing posts is worse than no archive.
//!
//! ```text
//! export/
//! ├── outbox.json            # {"orderedItems": [ ... ]}
//! └── media_attachments/     # copied verbatim, see crate::assets
//! ```

use crate::events::{ArchiveEvent, Reporter};
use crate::types::{Post, validate_record};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const OUTBOX_FILE: &str = "outbox.json";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Outbox not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed outbox {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("Invalid post at orderedItems[{index}] (id {}): {reason}", .id.as_deref().unwrap_or("unknown"))]
    Validation {
        index: usize,
        id: Option<String>,
        reason: String,
    },
}

#[derive(Deserialize)]
struct Outbox {
    #[serde(rename = "orderedItems")]
    ordered_items: Vec<serde_json::Value>,
}

/// Load and validate every post in `<input_dir>/outbox.json`, in file order.
/// Reports the number of loaded posts through `reporter`.
pub fn load_outbox(input_dir: &Path, reporter: &Reporter) -> Result<Vec<Post>, LoadError> {
    let path = input_dir.join(OUTBOX_FILE);
    let content = fs::read_to_string(&path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.clone()),
        _ => LoadError::Io {
            path: path.clone(),
            source,
        },
    })?;
    let posts = parse_outbox(&path, &content)?;
    reporter.emit(ArchiveEvent::Loaded { posts: posts.len() });
    Ok(posts)
}

/// Parse outbox JSON text. `path` is only used for error messages.
pub fn parse_outbox(path: &Path, content: &str) -> Result<Vec<Post>, LoadError> {
    let outbox: Outbox = serde_json::from_str(content).map_err(|e| LoadError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    outbox
        .ordered_items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            validate_record(raw).map_err(|e| LoadError::Validation {
                index,
                id: e.id,
                reason: e.reason,
            })
        })
        .collect()
}
