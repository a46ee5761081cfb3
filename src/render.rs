//! Rendering a post into an HTML page.
//!
//! Templates are Jinja-style files looked up in the configured template
//! directory and rendered with [minijinja](https://docs.rs/minijinja). HTML
//! auto-escaping is on for every template regardless of its file name, so
//! everything interpolated from the export is escaped. The one exception is
//! the status `content`, which the server already sanitized: it is handed to
//! the template as a safe string and comes out verbatim.
//!
//! ## Template Context
//!
//! The template sees a single variable, `toot`:
//!
//! ```text
//! toot.id            activity id
//! toot.type          "Create"
//! toot.actor         account URL
//! toot.published     RFC 3339 timestamp, original offset kept
//! toot.object.url
//! toot.object.content         (safe, not escaped)
//! toot.object.attachment[]    url, mediaType, name (none if absent),
//!                             kind ("image" | "video" | "audio")
//! ```

use crate::filter::Archivable;
use crate::types::Attachment;
use minijinja::{AutoEscape, Environment, ErrorKind, Value, context};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TOOT_TEMPLATE: &str = "toot.html.j2";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template `{name}` not found in {}", .dir.display())]
    TemplateNotFound { name: String, dir: PathBuf },
    #[error("Template `{name}` failed to load: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("Rendering post `{id}` failed: {source}")]
    Post {
        id: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Renders posts with one named template from a template directory.
pub struct Renderer {
    env: Environment<'static>,
    template: String,
}

impl Renderer {
    /// Set up the template environment and make sure [`TOOT_TEMPLATE`] loads.
    /// A missing or broken template is reported here, before any post is
    /// rendered.
    pub fn new(template_dir: &Path) -> Result<Self, RenderError> {
        Self::with_template(template_dir, TOOT_TEMPLATE)
    }

    pub fn with_template(template_dir: &Path, name: &str) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(template_dir));
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        if let Err(source) = env.get_template(name) {
            return Err(match source.kind() {
                ErrorKind::TemplateNotFound => RenderError::TemplateNotFound {
                    name: name.to_string(),
                    dir: template_dir.to_path_buf(),
                },
                _ => RenderError::Template {
                    name: name.to_string(),
                    source,
                },
            });
        }

        Ok(Self {
            env,
            template: name.to_string(),
        })
    }

    /// Render one post into a complete HTML document.
    pub fn render(&self, archivable: &Archivable) -> Result<String, RenderError> {
        let post_error = |source| RenderError::Post {
            id: archivable.post.id.clone(),
            source,
        };
        let template = self.env.get_template(&self.template).map_err(post_error)?;
        template
            .render(context! { toot => TootView::new(archivable) })
            .map_err(post_error)
    }
}

#[derive(Serialize)]
struct TootView<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    actor: &'a str,
    published: String,
    object: ObjectView<'a>,
}

#[derive(Serialize)]
struct ObjectView<'a> {
    url: &'a str,
    content: Value,
    attachment: Vec<AttachmentView<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentView<'a> {
    url: &'a str,
    media_type: &'static str,
    name: Option<&'a str>,
    kind: &'static str,
}

impl<'a> TootView<'a> {
    fn new(archivable: &Archivable<'a>) -> Self {
        let Archivable { post, body } = *archivable;
        TootView {
            id: &post.id,
            kind: post.kind.as_str(),
            actor: &post.actor,
            published: post.published.to_rfc3339(),
            object: ObjectView {
                url: &body.url,
                content: Value::from_safe_string(body.content.clone()),
                attachment: body.attachment.iter().map(AttachmentView::new).collect(),
            },
        }
    }
}

impl<'a> AttachmentView<'a> {
    fn new(attachment: &'a Attachment) -> Self {
        AttachmentView {
            url: &attachment.url,
            media_type: attachment.media_type.as_str(),
            name: attachment.name.as_deref(),
            kind: attachment.media_type.kind().as_str(),
        }
    }
}
