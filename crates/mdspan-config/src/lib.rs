use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glob patterns of files never followed by recursive parses.
    pub exclude: Vec<String>,
    pub parser: ParserSettings,
    pub html: HtmlSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    pub max_nesting_depth: usize,
    /// Extensions of linked files that recursive parses follow.
    pub extensions: Vec<String>,
    pub github_autolinks: bool,
    pub yaml_front_matter: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            max_nesting_depth: 256,
            extensions: vec!["md".to_string(), "markdown".to_string()],
            github_autolinks: true,
            yaml_front_matter: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlSettings {
    pub wrap_in_body: bool,
    pub wrap_in_article: bool,
    pub back_ref_image: String,
}

impl Config {
    /// Loads the config at `config_path`; a missing file gives the defaults.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in exclude patterns
        config.exclude = config
            .exclude
            .iter()
            .map(|p| Self::expand(p).unwrap_or_else(|| p.clone()))
            .collect();

        Ok(config)
    }

    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/mdspan");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// True if `path` matches one of the exclude patterns. Invalid patterns
    /// never match.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .any(|p| p.matches_path(path))
    }

    fn expand(pattern: &str) -> Option<String> {
        shellexpand::full(pattern).ok().map(|e| e.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/mdspan/config.toml"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.parser.max_nesting_depth, 256);
        assert_eq!(config.parser.extensions, vec!["md", "markdown"]);
        assert!(config.parser.github_autolinks);
        assert!(!config.parser.yaml_front_matter);
        assert!(!config.html.wrap_in_body);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            exclude: vec!["/tmp/drafts/*".into()],
            parser: ParserSettings {
                max_nesting_depth: 32,
                yaml_front_matter: true,
                ..Default::default()
            },
            html: HtmlSettings {
                wrap_in_article: true,
                back_ref_image: "back.svg".into(),
                ..Default::default()
            },
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[html]\nwrap_in_body = true\n").unwrap();

        assert!(config.html.wrap_in_body);
        assert_eq!(config.parser, ParserSettings::default());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert_eq!(result, Config::default());
    }

    #[test]
    fn test_load_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "parser = 3").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let test_config = Config {
            exclude: vec!["/notes/archive/**".into()],
            ..Default::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_exclude_with_env_var_in_toml() {
        unsafe {
            env::set_var("MDSPAN_TEST_NOTES", "/custom/notes");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "exclude = [\"$MDSPAN_TEST_NOTES/drafts/*.md\"]\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap();
        assert_eq!(config.exclude, vec!["/custom/notes/drafts/*.md"]);

        unsafe {
            env::remove_var("MDSPAN_TEST_NOTES");
        }
    }

    #[test]
    fn test_exclude_with_tilde() {
        let expanded = Config::expand("~/notes/*.md").unwrap();

        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("notes/*.md"));
    }

    #[test]
    fn test_is_excluded() {
        let config = Config {
            exclude: vec!["/notes/drafts/*".into(), "[invalid".into()],
            ..Default::default()
        };

        assert!(config.is_excluded(Path::new("/notes/drafts/a.md")));
        assert!(!config.is_excluded(Path::new("/notes/a.md")));
    }
}
