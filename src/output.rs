//! CLI output formatting.
//!
//! Pages are listed by the post they come from, with the output path (relative
//! to the output directory) after an arrow. Skipped posts say why.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Loaded 3 posts
//! Skipped https://example/users/user/statuses/1/activity (Announce: not archivable)
//! Copied 1 file static/css → output/css
//! https://example/users/user/statuses/2/activity → user/2.html
//!
//! Archived 2 posts, skipped 1 → output
//! ```
//!
//! ## Check
//!
//! ```text
//! Pages
//! 001 user/2.html
//! 002 user/3.html
//!
//! Skipped
//! 001 https://example/users/user/statuses/1/activity
//!
//! 3 posts: 2 pages, 1 skipped
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::archive::ArchiveSummary;
use crate::events::ArchiveEvent;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

/// `path` relative to `root` when it is inside it, unchanged otherwise.
fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_event(event: &ArchiveEvent, output_dir: &Path) -> Vec<String> {
    match event {
        ArchiveEvent::Loaded { posts } => vec![format!("Loaded {}", plural(*posts, "post", "posts"))],
        ArchiveEvent::Skipped { id, kind, reason, .. } => {
            vec![format!("Skipped {} ({}: {})", id, kind, reason.as_str())]
        }
        ArchiveEvent::Copied {
            source,
            destination,
            files,
        } => vec![format!(
            "Copied {} {} \u{2192} {}",
            plural(*files, "file", "files"),
            source.display(),
            destination.display()
        )],
        ArchiveEvent::PageWritten { id, path } => {
            vec![format!("{} \u{2192} {}", id, display_relative(path, output_dir))]
        }
    }
}

pub fn print_event(event: &ArchiveEvent, output_dir: &Path) {
    for line in format_event(event, output_dir) {
        println!("{}", line);
    }
}

/// Closing line of a build.
pub fn format_summary(summary: &ArchiveSummary, output_dir: &Path) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Archived {}, skipped {} \u{2192} {}",
            plural(summary.pages.len(), "post", "posts"),
            summary.skipped.len(),
            output_dir.display()
        ),
    ]
}

pub fn print_summary(summary: &ArchiveSummary, output_dir: &Path) {
    for line in format_summary(summary, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of a dry run: the pages that would be written and the
/// posts that would be skipped.
pub fn format_check_output(summary: &ArchiveSummary, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !summary.pages.is_empty() {
        lines.push("Pages".to_string());
        for (i, page) in summary.pages.iter().enumerate() {
            lines.push(format!(
                "{} {}",
                format_index(i + 1),
                display_relative(page, output_dir)
            ));
        }
        lines.push(String::new());
    }

    if !summary.skipped.is_empty() {
        lines.push("Skipped".to_string());
        for (i, id) in summary.skipped.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), id));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "{}: {}, {} skipped",
        plural(summary.loaded, "post", "posts"),
        plural(summary.pages.len(), "page", "pages"),
        summary.skipped.len()
    ));
    lines
}

pub fn print_check_output(summary: &ArchiveSummary, output_dir: &Path) {
    for line in format_check_output(summary, output_dir) {
        println!("{}", line);
    }
}
