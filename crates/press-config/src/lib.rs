//! Configuration for press.
//!
//! Reads `press.toml`, found in the current directory or one of its parents
//! unless a path is given explicitly. A missing file means defaults.
//!
//! ```toml
//! [site]
//! base_url = "${SITE_URL:-https://shop.example.com}"
//! fallback_label = "Learn more"
//!
//! [content]
//! min_html_length = 100
//! ```
//!
//! `site.base_url` and `site.fallback_label` support `${VAR}` and
//! `${VAR:-default}` environment expansion. Values from [`CliSettings`]
//! override whatever the file says.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "press.toml";

/// Label of the appended internal link when a post has no keyphrase.
const DEFAULT_FALLBACK_LABEL: &str = "Learn more";

/// Default lower bound on converted HTML length, in characters.
const DEFAULT_MIN_HTML_LENGTH: usize = 100;

/// Command-line overrides. Only `Some` values are applied.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override `site.base_url`.
    pub site_base: Option<String>,
    /// Override `site.fallback_label`.
    pub fallback_label: Option<String>,
    /// Override `content.min_html_length`.
    pub min_html_length: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target site settings.
    pub site: SiteConfig,
    /// Content checks.
    pub content: ContentConfig,

    /// Path of the loaded file, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[site]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root (or CMS API root) that posts should link back to.
    pub base_url: Option<String>,
    /// Link label used when a post has no keyphrase.
    pub fallback_label: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            fallback_label: DEFAULT_FALLBACK_LABEL.to_owned(),
        }
    }
}

/// `[content]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Converted HTML shorter than this is rejected.
    pub min_html_length: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_html_length: DEFAULT_MIN_HTML_LENGTH,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Explicit config path does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Unset variable in a `${VAR}` reference.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g. `site.base_url`).
        field: String,
        /// What went wrong (e.g. `${SITE_URL} not set`).
        message: String,
    },
}

impl Config {
    /// Load configuration, then apply CLI overrides.
    ///
    /// With `config_path`, that file must exist. Without it, `press.toml` is
    /// searched for from the current directory upwards, and defaults are used
    /// when none is found.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing, the file cannot be
    /// read or parsed, an environment reference is unset, or a value fails
    /// validation (including values supplied through `cli_settings`).
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Self::load_from_file(path)?,
            None => match discover_config() {
                Some(found) => Self::load_from_file(&found)?,
                None => Self::default(),
            },
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }
        Ok(config)
    }

    /// Parse configuration from TOML text, with expansion and validation.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing, expansion, or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Site base URL with surrounding whitespace removed, if non-empty.
    #[must_use]
    pub fn site_base(&self) -> Option<&str> {
        self.site
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
    }

    /// Check configured values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `site.base_url` is not an http(s)
    /// URL or `site.fallback_label` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = self.site_base() {
            require_http_url(base, "site.base_url")?;
        }
        require_non_empty(self.site.fallback_label.trim(), "site.fallback_label")?;
        Ok(())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(site_base) = &settings.site_base {
            self.site.base_url = Some(site_base.clone());
        }
        if let Some(label) = &settings.fallback_label {
            self.site.fallback_label.clone_from(label);
        }
        if let Some(min) = settings.min_html_length {
            self.content.min_html_length = min;
        }
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.site.base_url, "site.base_url")?;
        self.site.fallback_label =
            expand::expand_env(&self.site.fallback_label, "site.fallback_label")?;
        Ok(())
    }
}

/// Search for `press.toml` in the current directory and its parents.
fn discover_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}
