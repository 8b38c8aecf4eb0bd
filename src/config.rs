//! Project configuration.
//!
//! Loaded from `config.toml` at the project root. The file is optional and
//! sparse: every key has a default, and only the values you want to change
//! need to be written.
//!
//! ```toml
//! # Plugins applied to the site, in order, before rendering.
//! plugins = ["core/drafts", "scripts/tags.py", "shout"]
//!
//! # Where plain plugin names ("shout") are looked up.
//! plugin_dir = "plugins"
//!
//! [build]
//! clean = true              # Remove site/ before writing
//!
//! [templates]
//! autoescape = false        # HTML-escape values in .html/.xml templates
//!
//! [markdown]
//! tables = true
//! footnotes = true
//! strikethrough = true
//! tasklists = true
//! smart_punctuation = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
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

/// Project configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Plugin identifiers, applied in order.
    pub plugins: Vec<String>,
    /// Directory, relative to the project root, holding named plugins.
    pub plugin_dir: String,
    pub build: BuildConfig,
    pub templates: TemplatesConfig,
    pub markdown: MarkdownConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            plugin_dir: "plugins".to_string(),
            build: BuildConfig::default(),
            templates: TemplatesConfig::default(),
            markdown: MarkdownConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Validate values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pos) = self.plugins.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "plugins[{pos}] must not be empty"
            )));
        }
        if self.plugin_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "plugin_dir must not be empty".into(),
            ));
        }
        if Path::new(&self.plugin_dir).is_absolute() {
            return Err(ConfigError::Validation(
                "plugin_dir must be relative to the project root".into(),
            ));
        }
        Ok(())
    }
}

/// Output handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Remove the output directory before writing, so files from earlier
    /// builds do not linger.
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { clean: true }
    }
}

/// Template engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Escape interpolated values in `.html`/`.xml` templates. Layouts must
    /// then embed the page body with `{{ content | safe }}`.
    pub autoescape: bool,
}

/// Markdown extensions passed to the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    /// Curly quotes, en/em dashes and ellipses.
    pub smart_punctuation: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
        }
    }
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load `config.toml` from the project root.
///
/// Returns the defaults when the file does not exist.
pub fn load_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        tracing::debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
        return Ok(ProjectConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pressroom configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Plugins applied to the whole site, in order, before rendering.
#   "core/<name>"     built-in plugin (core/drafts, core/sitemap, core/titles)
#   "path/to/x.sh"    executable script, relative to the project root
#                     (recognized extensions: sh, py, rb, pl, js)
#   "name"            executable in plugin_dir
# Script and named plugins read the site as JSON on stdin and write the
# transformed site as JSON to stdout.
plugins = []

# Directory, relative to the project root, holding named plugins.
plugin_dir = "plugins"

# ---------------------------------------------------------------------------
# Build output
# ---------------------------------------------------------------------------
[build]
# Remove site/ before writing so files from earlier builds do not linger.
clean = true

# ---------------------------------------------------------------------------
# Templates
# ---------------------------------------------------------------------------
[templates]
# HTML-escape interpolated values in .html/.xml templates.
# When enabled, layouts must embed the page body with {{ content | safe }}.
autoescape = false

# ---------------------------------------------------------------------------
# Markdown extensions
# ---------------------------------------------------------------------------
[markdown]
tables = true
footnotes = true
strikethrough = true
tasklists = true
# Curly quotes, dashes and ellipses.
smart_punctuation = false
"##
}
