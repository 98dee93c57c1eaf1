//! Configuration for the expansion layer
//!
//! Settings are layered: built-in defaults, then a TOML file, then the
//! environment.
//!
//! ```bash
//! # Larger pages in the CLI
//! export WATCHVIEW_PAGE_SIZE=500
//!
//! # Never offer the native view row
//! export WATCHVIEW_NATIVE_VIEW=false
//! ```

use crate::expansion::ExpansionOptions;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `page_size`
pub const PAGE_SIZE_VAR: &str = "WATCHVIEW_PAGE_SIZE";

/// Environment variable overriding `native_view`
pub const NATIVE_VIEW_VAR: &str = "WATCHVIEW_NATIVE_VIEW";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rows requested per page when the caller does not say
    pub page_size: usize,
    /// Show static members after instance members
    pub show_static_members: bool,
    /// Offer the native view row for COM wrappers
    pub native_view: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 100,
            show_static_members: false,
            native_view: true,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("watchview").join("config.toml"))
    }

    /// Load configuration from `path` (or the default location), then apply
    /// environment overrides
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Apply overrides looked up by variable name
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(PAGE_SIZE_VAR) {
            let page_size: usize = raw
                .trim()
                .parse()
                .with_context(|| {
                    format!("{} must be a positive integer, got '{}'", PAGE_SIZE_VAR, raw)
                })?;
            if page_size == 0 {
                return Err(anyhow!("{} must be greater than 0", PAGE_SIZE_VAR));
            }
            self.page_size = page_size;
        }

        if let Some(raw) = lookup(NATIVE_VIEW_VAR) {
            self.native_view = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(anyhow!(
                        "{} must be true or false, got '{}'",
                        NATIVE_VIEW_VAR,
                        raw
                    ))
                }
            };
        }

        Ok(())
    }

    pub fn expansion_options(&self) -> ExpansionOptions {
        ExpansionOptions {
            show_static_members: self.show_static_members,
            native_view: self.native_view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("show_static_members = true").unwrap();
        assert!(config.show_static_members);
        assert_eq!(config.page_size, 100);
        assert!(config.native_view);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[(PAGE_SIZE_VAR, "25"), (NATIVE_VIEW_VAR, "off")]))
            .unwrap();
        assert_eq!(config.page_size, 25);
        assert!(!config.native_view);
    }

    #[test]
    fn test_invalid_overrides() {
        let mut config = Config::default();
        assert!(config.apply_overrides(lookup(&[(PAGE_SIZE_VAR, "0")])).is_err());
        assert!(config.apply_overrides(lookup(&[(PAGE_SIZE_VAR, "many")])).is_err());
        assert!(config.apply_overrides(lookup(&[(NATIVE_VIEW_VAR, "maybe")])).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "page_size = 7\nnative_view = false").unwrap();
        file.flush().unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.page_size, 7);
        assert_eq!(
            config.expansion_options(),
            ExpansionOptions {
                show_static_members: false,
                native_view: false,
            }
        );
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::from_file(Path::new("/nonexistent/watchview.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
