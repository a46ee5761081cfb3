//! Archive configuration.
//!
//! Settings are read from an optional `config.toml` in the config directory
//! (the working directory unless told otherwise). Every key is optional;
//! missing keys take the defaults below and unknown keys are rejected to
//! catch typos early.
//!
//! ```toml
//! input_dir = "export"          # outbox.json + media_attachments/
//! template_dir = "templates"    # must contain toot.html.j2
//! static_dir = "static"         # css/, fonts/, img/
//! output_dir = "output"
//!
//! # Prefix stripped from status URLs to get page paths. Its last segment
//! # (without the `@`) names the posts directory.
//! base_prefix_url = "https://social.juanlu.space/@astrojuanlu/"
//!
//! # Media is copied to <output_dir>/<base_prefix_media>/media_attachments/
//! base_prefix_media = "socialjuanluspace/"
//! ```
//!
//! Relative paths are resolved against the working directory.

use crate::naming;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Export directory holding `outbox.json` and `media_attachments/`.
    pub input_dir: PathBuf,
    /// Directory the post template is loaded from.
    pub template_dir: PathBuf,
    /// Directory holding the `css/`, `fonts/` and `img/` trees.
    pub static_dir: PathBuf,
    /// URL prefix stripped from each status URL to get its page path.
    pub base_prefix_url: String,
    /// Path under the output directory where media is copied.
    pub base_prefix_media: String,
    pub output_dir: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("export"),
            template_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
            base_prefix_url: "https://social.juanlu.space/@astrojuanlu/".to_string(),
            base_prefix_media: "socialjuanluspace/".to_string(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ArchiveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_prefix_url.is_empty() {
            return Err(ConfigError::Validation(
                "base_prefix_url must not be empty".into(),
            ));
        }
        if !self.base_prefix_url.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "base_prefix_url must end with `/`, got `{}`",
                self.base_prefix_url
            )));
        }
        naming::archive_dir_name(&self.base_prefix_url)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        let media = Path::new(&self.base_prefix_media);
        if media
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ConfigError::Validation(format!(
                "base_prefix_media must be a relative path inside the output directory, got `{}`",
                self.base_prefix_media
            )));
        }
        Ok(())
    }

    /// Directory the post pages are written to.
    pub fn posts_dir(&self) -> Result<PathBuf, naming::NamingError> {
        naming::archive_dir_name(&self.base_prefix_url).map(|name| self.output_dir.join(name))
    }

    /// Directory the media tree is copied under.
    pub fn media_root(&self) -> PathBuf {
        self.output_dir.join(&self.base_prefix_media)
    }
}

/// Load `config.toml` from `dir`, falling back to defaults when absent.
pub fn load_config(dir: &Path) -> Result<ArchiveConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ArchiveConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let config: ArchiveConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// A documented `config.toml` with every key at its default.
pub fn stock_config_toml() -> &'static str {
    r##"# toot-archive configuration
# All settings are optional. Values shown are the defaults.
# Unknown keys cause an error. Relative paths resolve against the
# working directory.

# Mastodon export: must contain outbox.json and media_attachments/.
input_dir = "export"

# Directory containing the toot.html.j2 template.
template_dir = "templates"

# Directory containing the css/, fonts/ and img/ asset trees.
static_dir = "static"

# Where the archive is written. Existing files are overwritten or kept,
# never deleted.
output_dir = "output"

# URL prefix stripped from each status URL to get the page path.
# Its last segment (without the leading @) names the posts directory,
# e.g. https://social.example/@me/123 -> output/me/123.html
base_prefix_url = "https://social.juanlu.space/@astrojuanlu/"

# Media is copied to <output_dir>/<base_prefix_media>/media_attachments/.
base_prefix_media = "socialjuanluspace/"
"##
}
