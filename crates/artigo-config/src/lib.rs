//! Configuration management for artigo.
//!
//! Parses `artigo.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [markdown]
//! enabled = true
//! engine = "commonmark"
//!
//! [tree]
//! raw_html = false
//! max_depth = 64
//!
//! [links]
//! rel = "noopener"
//!
//! [fallback]
//! unavailable = "<p>Em breve.</p>"
//! ```

use artigo_renderer::{
    DEFAULT_ERROR, DEFAULT_INVALID, DEFAULT_MARKDOWN_TARGET, DEFAULT_MAX_DEPTH, DEFAULT_REL,
    DEFAULT_UNAVAILABLE,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override markdown conversion of bare strings.
    pub markdown_enabled: Option<bool>,
    /// Override markdown engine.
    pub engine: Option<MarkdownEngineName>,
    /// Override verbatim output of raw HTML tree nodes.
    pub raw_html: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "artigo.toml";

/// Upper bound accepted for `tree.max_depth`.
const MAX_TREE_DEPTH: usize = 1024;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown configuration.
    pub markdown: MarkdownConfig,
    /// Structured tree configuration.
    pub tree: TreeConfig,
    /// Link attribute configuration.
    pub links: LinksConfig,
    /// Fallback markup configuration.
    pub fallback: FallbackConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown engine name as written in config files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownEngineName {
    /// Line-oriented converter.
    #[default]
    Basic,
    /// `CommonMark` parser.
    CommonMark,
}

/// Markdown configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Treat bare strings as markdown instead of HTML.
    pub enabled: bool,
    /// Markdown engine.
    pub engine: MarkdownEngineName,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: MarkdownEngineName::default(),
        }
    }
}

/// Structured tree configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Emit `html` nodes verbatim.
    pub raw_html: bool,
    /// Maximum nesting depth.
    pub max_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            raw_html: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Link attribute configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Default `rel` for links that carry none.
    pub rel: String,
    /// `target` for links produced from markdown. Empty disables it.
    pub markdown_target: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            rel: DEFAULT_REL.to_owned(),
            markdown_target: DEFAULT_MARKDOWN_TARGET.to_owned(),
        }
    }
}

/// Fallback markup configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Shown when content is missing.
    pub unavailable: String,
    /// Shown when content has an unrecognised shape.
    pub invalid: String,
    /// Shown when rendering fails.
    pub error: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            unavailable: DEFAULT_UNAVAILABLE.to_owned(),
            invalid: DEFAULT_INVALID.to_owned(),
            error: DEFAULT_ERROR.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
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
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `artigo.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(enabled) = settings.markdown_enabled {
            self.markdown.enabled = enabled;
        }
        if let Some(engine) = settings.engine {
            self.markdown.engine = engine;
        }
        if let Some(raw_html) = settings.raw_html {
            self.tree.raw_html = raw_html;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_tree()?;
        require_non_empty(&self.links.rel, "links.rel")?;
        self.validate_fallback()?;
        Ok(())
    }

    /// Validate tree configuration.
    fn validate_tree(&self) -> Result<(), ConfigError> {
        let depth = self.tree.max_depth;
        if depth == 0 {
            return Err(ConfigError::Validation(
                "tree.max_depth must be greater than 0".to_owned(),
            ));
        }
        if depth > MAX_TREE_DEPTH {
            return Err(ConfigError::Validation(format!(
                "tree.max_depth cannot exceed {MAX_TREE_DEPTH}"
            )));
        }
        Ok(())
    }

    /// Validate fallback configuration.
    fn validate_fallback(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.fallback.unavailable, "fallback.unavailable")?;
        require_non_empty(&self.fallback.invalid, "fallback.invalid")?;
        require_non_empty(&self.fallback.error, "fallback.error")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.markdown.enabled);
        assert_eq!(config.markdown.engine, MarkdownEngineName::Basic);
        assert!(config.tree.raw_html);
        assert_eq!(config.tree.max_depth, 128);
        assert_eq!(config.links.rel, "noopener noreferrer");
        assert_eq!(config.links.markdown_target, "_blank");
        assert_eq!(
            config.fallback.unavailable,
            "<p>Conteúdo não disponível.</p>"
        );
        assert_eq!(
            config.fallback.invalid,
            "<p>Conteúdo em formato inválido.</p>"
        );
        assert_eq!(config.fallback.error, "<p>Erro ao carregar conteúdo.</p>");
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.markdown.enabled);
        assert_eq!(config.tree.max_depth, 128);
    }

    #[test]
    fn test_parse_markdown_config() {
        let toml = r#"
[markdown]
enabled = false
engine = "commonmark"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.markdown.enabled);
        assert_eq!(config.markdown.engine, MarkdownEngineName::CommonMark);
    }

    #[test]
    fn test_parse_unknown_engine_fails() {
        let toml = r#"
[markdown]
engine = "gfm"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_tree_and_links() {
        let toml = r#"
[tree]
raw_html = false
max_depth = 32

[links]
rel = "nofollow"
markdown_target = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.tree.raw_html);
        assert_eq!(config.tree.max_depth, 32);
        assert_eq!(config.links.rel, "nofollow");
        assert_eq!(config.links.markdown_target, "");
    }

    #[test]
    fn test_parse_partial_fallback() {
        let toml = r#"
[fallback]
unavailable = "<p>Em breve.</p>"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.fallback.unavailable, "<p>Em breve.</p>");
        assert_eq!(config.fallback.error, "<p>Erro ao carregar conteúdo.</p>");
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            markdown_enabled: Some(false),
            engine: Some(MarkdownEngineName::CommonMark),
            raw_html: Some(false),
        };

        config.apply_cli_settings(&overrides);

        assert!(!config.markdown.enabled);
        assert_eq!(config.markdown.engine, MarkdownEngineName::CommonMark);
        assert!(!config.tree.raw_html);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();

        config.apply_cli_settings(&CliSettings::default());

        assert!(config.markdown.enabled);
        assert_eq!(config.markdown.engine, MarkdownEngineName::Basic);
        assert!(config.tree.raw_html);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[markdown]\nengine = \"commonmark\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.markdown.engine, MarkdownEngineName::CommonMark);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_applies_cli_settings_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artigo.toml");
        std::fs::write(&path, "[markdown]\nenabled = true\n").unwrap();
        let settings = CliSettings {
            markdown_enabled: Some(false),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert!(!config.markdown.enabled);
    }

    #[test]
    fn test_load_missing_path() {
        let err = Config::load(Some(Path::new("/nonexistent/artigo.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("/nonexistent/artigo.toml"));
    }

    #[test]
    fn test_load_invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artigo.toml");
        std::fs::write(&path, "[tree]\nmax_depth = 0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artigo.toml");
        std::fs::write(&path, "[tree\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_from_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_from(&nested).unwrap();

        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_max_depth_zero() {
        let mut config = Config::default();
        config.tree.max_depth = 0;
        assert_validation_error(&config, &["tree.max_depth", "greater than 0"]);
    }

    #[test]
    fn test_validate_max_depth_too_high() {
        let mut config = Config::default();
        config.tree.max_depth = 5000;
        assert_validation_error(&config, &["tree.max_depth", "1024"]);
    }

    #[test]
    fn test_validate_empty_rel() {
        let mut config = Config::default();
        config.links.rel = String::new();
        assert_validation_error(&config, &["links.rel", "empty"]);
    }

    #[test]
    fn test_validate_empty_fallback() {
        let mut config = Config::default();
        config.fallback.error = "  ".to_owned();
        assert_validation_error(&config, &["fallback.error", "empty"]);
    }

    #[test]
    fn test_validate_empty_markdown_target_allowed() {
        let mut config = Config::default();
        config.links.markdown_target = String::new();
        assert!(config.validate().is_ok());
    }
}
