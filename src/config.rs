//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgtree/orgtree.toml`
//! 3. Explicit config file: `-C <file>`
//! 4. Environment variables: `ORGTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{
    ApplicationError, Charset, RenderStyle, TreeRenderer, DEFAULT_EMPTY_MESSAGE,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_ROWS,
};

/// Unified configuration for orgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Connector glyphs: "unicode" or "ascii"
    pub charset: Charset,
    /// Node label template, `{id}` is replaced by the node id
    pub label: String,
    /// Heading printed above the tree
    pub title: String,
    /// Placeholder printed when there is no hierarchy
    pub empty_message: String,
    /// Maximum number of rendered levels
    pub max_depth: usize,
    /// Maximum number of rendered rows
    pub max_rows: usize,
    /// Field holding the record list in a wrapper object ("" = none)
    pub wrapper_field: String,
    /// Colored terminal output
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            charset: Charset::Unicode,
            label: "User {id}".to_string(),
            title: "User Hierarchy Tree".to_string(),
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_rows: DEFAULT_MAX_ROWS,
            wrapper_field: "data".to_string(),
            color: true,
        }
    }
}

/// Raw settings for intermediate parsing (None = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub charset: Option<Charset>,
    pub label: Option<String>,
    pub title: Option<String>,
    pub empty_message: Option<String>,
    pub max_depth: Option<usize>,
    pub max_rows: Option<usize>,
    pub wrapper_field: Option<String>,
    pub color: Option<bool>,
}

/// Get the XDG config directory for orgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_charset(value: &str) -> Result<Charset, ApplicationError> {
    match value.to_ascii_lowercase().as_str() {
        "unicode" => Ok(Charset::Unicode),
        "ascii" => Ok(Charset::Ascii),
        other => Err(ApplicationError::Config {
            message: format!("unknown charset: {other} (expected unicode or ascii)"),
        }),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            charset: overlay.charset.unwrap_or(self.charset),
            label: overlay.label.clone().unwrap_or_else(|| self.label.clone()),
            title: overlay.title.clone().unwrap_or_else(|| self.title.clone()),
            empty_message: overlay
                .empty_message
                .clone()
                .unwrap_or_else(|| self.empty_message.clone()),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            max_rows: overlay.max_rows.unwrap_or(self.max_rows),
            wrapper_field: overlay
                .wrapper_field
                .clone()
                .unwrap_or_else(|| self.wrapper_field.clone()),
            color: overlay.color.unwrap_or(self.color),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current.apply_env_overrides(None)
    }

    /// Apply ORGTREE_* environment variables as explicit overrides.
    ///
    /// `source` replaces the process environment when given.
    pub fn apply_env_overrides(
        mut self,
        source: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ORGTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(source),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("charset") {
            self.charset = parse_charset(&val)?;
        }
        if let Ok(val) = config.get_string("label") {
            self.label = val;
        }
        if let Ok(val) = config.get_string("title") {
            self.title = val;
        }
        if let Ok(val) = config.get_string("empty_message") {
            self.empty_message = val;
        }
        if let Ok(val) = config.get_string("max_depth") {
            self.max_depth = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("ORGTREE_MAX_DEPTH: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("max_rows") {
            self.max_rows = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("ORGTREE_MAX_ROWS: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("wrapper_field") {
            self.wrapper_field = val;
        }
        if let Ok(val) = config.get_bool("color") {
            self.color = val;
        }

        Ok(self)
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            charset: self.charset,
            label: self.label.clone(),
        }
    }

    pub fn renderer(&self) -> TreeRenderer {
        TreeRenderer::new(self.max_depth).with_max_rows(self.max_rows)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/orgtree/orgtree.toml
#   Explicit: orgtree -C <file>
#   Env:      ORGTREE_* environment variables (e.g. ORGTREE_CHARSET=ascii)

# Connector glyphs: "unicode" or "ascii"
# charset = "unicode"

# Node label, {id} is replaced by the node id
# label = "User {id}"

# Heading above the tree
# title = "User Hierarchy Tree"

# Shown when there is no hierarchy to display
# empty_message = "No hierarchy found"

# Levels rendered before descent stops
# max_depth = 64

# Rows rendered before output stops (shared subtrees repeat)
# max_rows = 10000

# Field holding the record list when input is wrapped, "" to disable
# wrapper_field = "data"

# Colored output (NO_COLOR is honored as well)
# color = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
