//! Mapping status URLs to output paths.
//!
//! Pages live under a directory named after the account, taken from the last
//! segment of the base prefix URL. The rest of the status URL after the prefix
//! becomes the page's path, with `.html` appended:
//!
//! ```text
//! base prefix:  https://example.social/@user/
//! status URL:   https://example.social/@user/110123
//! page:         <output>/user/110123.html
//! ```
//!
//! A status URL outside the prefix is an error, not a best-effort guess. The
//! same goes for anything in the remainder that could escape the output
//! directory (`..`, empty segments, backslashes).

use std::path::PathBuf;
use thiserror::Error;

pub const PAGE_EXTENSION: &str = "html";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NamingError {
    #[error("Base prefix URL `{0}` has no path segment to name the posts directory")]
    NoArchiveDir(String),
    #[error("Post URL `{url}` does not start with the base prefix `{prefix}`")]
    OutsidePrefix { url: String, prefix: String },
    #[error("Post URL `{url}` maps to an unsafe or empty path `{relative}`")]
    UnsafePath { url: String, relative: String },
}

/// Name of the directory holding post pages: the base prefix's last path
/// segment, without the `@` of account handles.
///
/// - `"https://example/@user/"` → `"user"`
/// - `"https://example/users/alice"` → `"alice"`
pub fn archive_dir_name(base_prefix_url: &str) -> Result<&str, NamingError> {
    let no_dir = || NamingError::NoArchiveDir(base_prefix_url.to_string());
    let (_, last) = base_prefix_url
        .trim_end_matches('/')
        .rsplit_once('/')
        .ok_or_else(no_dir)?;
    match last.trim_start_matches('@') {
        "" => Err(no_dir()),
        name => Ok(name),
    }
}

/// Path of a post's page relative to the posts directory.
pub fn page_relative_path(url: &str, base_prefix_url: &str) -> Result<PathBuf, NamingError> {
    let relative = url
        .strip_prefix(base_prefix_url)
        .ok_or_else(|| NamingError::OutsidePrefix {
            url: url.to_string(),
            prefix: base_prefix_url.to_string(),
        })?;

    let unsafe_path = || NamingError::UnsafePath {
        url: url.to_string(),
        relative: relative.to_string(),
    };

    let segments: Vec<&str> = relative.split('/').collect();
    if segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == ".." || s.contains('\\'))
    {
        return Err(unsafe_path());
    }

    let (last, parents) = segments.split_last().ok_or_else(unsafe_path)?;
    let mut path: PathBuf = parents.iter().collect();
    path.push(format!("{}.{}", last, PAGE_EXTENSION));
    Ok(path)
}
