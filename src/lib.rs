//! # Toot Archive
//!
//! Turns a Mastodon account export into a static HTML archive: one page per
//! original post, alongside the export's media and a set of static assets.
//! Boosts and anything else that isn't the account's own writing are skipped.
//!
//! # Pipeline
//!
//! ```text
//! export/outbox.json ──load──▶ Vec<Post> ──filter──▶ Archivable posts
//!                                                      │
//!                        naming: status URL ──▶ page path
//!                                                      │
//! templates/toot.html.j2 ──────────────────render──▶ output/<account>/<id>.html
//! static/{css,fonts,img} ──────────────────copy────▶ output/{css,fonts,img}
//! export/media_attachments ────────────────copy────▶ output/<media prefix>/media_attachments
//! ```
//!
//! [`archive::generate`] runs the whole thing. Every step that can reject the
//! input runs before anything is written, so a bad export leaves the output
//! directory untouched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Outbox records (`Post`, `PostBody`, `Attachment`) and record validation |
//! | [`load`] | Reads and validates `outbox.json` |
//! | [`filter`] | Decides which posts get a page |
//! | [`naming`] | Maps status URLs to page paths |
//! | [`render`] | Renders a post with the minijinja template |
//! | [`assets`] | Merges static assets and media into the output |
//! | [`archive`] | Runs the pipeline, error kinds, run summary |
//! | [`events`] | Progress events: `tracing` plus an optional channel |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Validate Everything Up Front
//!
//! The whole outbox is validated before any post is looked at. One bad record
//! fails the run, with the record's index and id in the error. Timestamps
//! must carry an explicit offset; a naive timestamp is rejected rather than
//! guessed at.
//!
//! ## Runtime Templates
//!
//! The page template is a file in a user-supplied directory, loaded with
//! [minijinja](https://docs.rs/minijinja). HTML auto-escaping is on for every
//! template. The post's `content` is the one value that is not escaped: the
//! server sanitized it when the post was made, and escaping it again would
//! print the markup as text.
//!
//! ## Merge, Never Wipe
//!
//! Re-running over an existing archive overwrites what it generates and
//! leaves everything else alone, so the output directory can hold hand-added
//! files.

pub mod archive;
pub mod assets;
pub mod config;
pub mod events;
pub mod filter;
pub mod load;
pub mod naming;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
