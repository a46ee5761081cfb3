//! Shared test utilities for the toot-archive test suite.
//!
//! Builders for outbox records shaped like a real Mastodon export, plus a
//! throwaway workspace with everything [`crate::archive::generate`] needs.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let items = vec![
//!     announce_item("a", "https://other/statuses/1"),
//!     create_item("c", "https://example/@user/1", "<p>hi</p>")
//!         .with_attachment("/media/a.jpg", "image/jpeg", Some("alt"))
//!         .build(),
//! ];
//! let (tmp, config) = setup_workspace(&items);
//! ```

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::ArchiveConfig;
use crate::load::OUTBOX_FILE;

pub const ACTOR: &str = "https://example/users/user";
pub const BASE_PREFIX: &str = "https://example/@user/";
pub const PUBLISHED: &str = "2023-01-15T12:00:00Z";

// =========================================================================
// Outbox records
// =========================================================================

/// Builder for a `Create` record. Attachments start empty.
pub struct CreateItem {
    value: Value,
}

/// A `Create` record for a status at `url`.
pub fn create_item(id: &str, url: &str, content: &str) -> CreateItem {
    CreateItem {
        value: json!({
            "id": id,
            "type": "Create",
            "actor": ACTOR,
            "published": PUBLISHED,
            "to": ["https://www.w3.org/ns/activitystreams#Public"],
            "object": {
                "id": url,
                "type": "Note",
                "url": url,
                "content": content,
                "attachment": [],
            },
        }),
    }
}

impl CreateItem {
    pub fn with_attachment(mut self, url: &str, media_type: &str, name: Option<&str>) -> Self {
        if let Some(attachments) = self.value["object"]["attachment"].as_array_mut() {
            attachments.push(json!({
                "type": "Document",
                "url": url,
                "mediaType": media_type,
                "name": name,
            }));
        }
        self
    }

    pub fn build(self) -> Value {
        self.value
    }
}

/// An `Announce` (boost) record whose object is a bare reference.
pub fn announce_item(id: &str, reference: &str) -> Value {
    json!({
        "id": id,
        "type": "Announce",
        "actor": ACTOR,
        "published": PUBLISHED,
        "object": reference,
    })
}

// =========================================================================
// Filesystem
// =========================================================================

/// Write `{"orderedItems": items}` to `dir/outbox.json`.
pub fn write_outbox(dir: &Path, items: &[Value]) {
    let outbox = json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "OrderedCollection",
        "totalItems": items.len(),
        "orderedItems": items,
    });
    write_file(&dir.join(OUTBOX_FILE), &outbox.to_string());
}

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// The templates shipped with the crate.
pub fn bundled_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// A temp workspace with an export, static assets and a config pointing at
/// them. Output goes to `<tmp>/output`, which doesn't exist yet.
///
/// ```text
/// <tmp>/
/// ├── export/
/// │   ├── outbox.json
/// │   └── media_attachments/files/1/original/a.jpg
/// └── static/
///     ├── css/style.css
///     ├── fonts/font.woff2
///     └── img/avatar.png
/// ```
pub fn setup_workspace(items: &[Value]) -> (TempDir, ArchiveConfig) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let input_dir = root.join("export");
    write_outbox(&input_dir, items);
    write_file(
        &input_dir.join("media_attachments/files/1/original/a.jpg"),
        "jpg",
    );

    let static_dir = root.join("static");
    write_file(&static_dir.join("css/style.css"), "body { margin: 0 }");
    write_file(&static_dir.join("fonts/font.woff2"), "font");
    write_file(&static_dir.join("img/avatar.png"), "png");

    let config = ArchiveConfig {
        input_dir,
        template_dir: bundled_templates(),
        static_dir,
        base_prefix_url: BASE_PREFIX.to_string(),
        base_prefix_media: "example/".to_string(),
        output_dir: root.join("output"),
    };
    (tmp, config)
}

/// Every `.html` file under `dir`, sorted.
pub fn html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    files
}
