use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    pub strip_frontmatter: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            strip_frontmatter: true,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub standalone: bool,
    pub lang: String,
    /// Document title; empty means the first heading is used.
    pub title: String,
    pub stylesheet: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            standalone: false,
            lang: "en".to_string(),
            title: String::new(),
            stylesheet: String::new(),
        }
    }
}

impl Config {
    /// The configuration bundled with the crate. `build.rs` checks it parses.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|source| Error::Config {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "config not found, using defaults");
                Ok(Self::compiled_default())
            }
            Err(source) => Err(Error::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_compiled_default_matches_default() {
        assert_eq!(Config::compiled_default(), Config::default());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nstandalone = true\ntitle = \"Notes\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.output.standalone);
        assert_eq!(config.output.title, "Notes");
        assert_eq!(config.output.lang, "en");
        assert!(config.input.strip_frontmatter);
    }

    #[test]
    fn test_load_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output\nstandalone = ").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
