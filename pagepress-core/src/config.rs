//! Configuration parsing and management.

use crate::citation::DEFAULT_MAX_BEFORE_TRUNCATE;
use crate::filters::{AbbreviationTable, MacroTable};
use pagepress_types::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the pagepress.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Locale for pages that do not declare one
    #[serde(default)]
    pub locale: Locale,

    /// Treat unresolved citations as failures when checking pages
    #[serde(default)]
    pub strict: bool,

    #[serde(default)]
    pub citations: CitationConfig,

    #[serde(default)]
    pub math: MathConfig,

    #[serde(default)]
    pub macros: MacroTable,

    #[serde(default)]
    pub abbreviations: AbbreviationTable,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationConfig {
    #[serde(default = "default_max_before_truncate")]
    pub max_before_truncate: usize,

    /// Append a listing of the cited entries to each page
    #[serde(default = "default_true")]
    pub append_bibliography: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathConfig {
    #[serde(default = "default_true")]
    pub equation_numbering: bool,

    #[serde(default = "default_true")]
    pub tensor_indices: bool,
}

fn default_max_before_truncate() -> usize {
    DEFAULT_MAX_BEFORE_TRUNCATE
}

fn default_true() -> bool {
    true
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            max_before_truncate: default_max_before_truncate(),
            append_bibliography: true,
        }
    }
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            equation_numbering: true,
            tensor_indices: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load the config file if it exists, otherwise use built-in defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Parse configuration from YAML text; an empty document means defaults
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Resolve an arbitrary path relative to the config file location
    pub fn resolve_relative(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.as_ref().and_then(|p| p.parent()) {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_values() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.locale, Locale::En);
        assert!(!config.strict);
        assert_eq!(config.citations.max_before_truncate, 4);
        assert!(config.citations.append_bibliography);
        assert!(config.math.equation_numbering);
        assert!(config.math.tensor_indices);
        assert!(config.macros.is_empty());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = Config::from_yaml(
            "locale: fr\ncitations:\n  max_before_truncate: 2\nmath:\n  tensor_indices: false\n",
        )
        .unwrap();
        assert_eq!(config.locale, Locale::Fr);
        assert_eq!(config.citations.max_before_truncate, 2);
        assert!(config.citations.append_bibliography);
        assert!(config.math.equation_numbering);
        assert!(!config.math.tensor_indices);
    }

    #[test]
    fn test_unknown_locale_is_rejected() {
        let err = Config::from_yaml("locale: klingon\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_from_file_and_relative_paths() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "macros:\n  R: \"\\\\mathbb{{R}}\"\nabbreviations:\n  W3C: Consortium").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.macros.get("R"), Some("\\mathbb{R}"));
        assert_eq!(config.config_path(), Some(file.path()));

        let parent = file.path().parent().unwrap();
        assert_eq!(config.resolve_relative(Path::new("x.md")), parent.join("x.md"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("pagepress.yml")).unwrap();
        assert!(config.config_path().is_none());
    }
}
