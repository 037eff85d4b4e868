use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub taggai: TaggaiConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Taggai-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TaggaiConfig {
    /// Flat directory holding the `.jpg` images and `.mp4` videos to catalog.
    pub media_folder: PathBuf,
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
}

/// Tag search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_tag_suggestion_limit")]
    pub tag_suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tag_suggestion_limit: default_tag_suggestion_limit(),
        }
    }
}

fn default_tag_suggestion_limit() -> usize {
    crate::tags::TAG_SEARCH_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in TAGGAI_CONFIG environment variable
    /// 2. ./config.toml in current directory
    ///
    /// `MEDIA_PATH` and `DB_PATH`, when set, override the file values.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("TAGGAI_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config = Self::from_toml_str(&config_str)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Failed to parse config.toml")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(media) = std::env::var("MEDIA_PATH") {
            self.taggai.media_folder = PathBuf::from(media);
        }
        if let Ok(db) = std::env::var("DB_PATH") {
            self.taggai.db_path = PathBuf::from(db);
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.taggai.media_folder.exists() {
            anyhow::bail!(
                "media_folder path does not exist: {}. Set media_folder in config.toml or MEDIA_PATH.",
                self.taggai.media_folder.display()
            );
        }

        if !self.taggai.media_folder.is_dir() {
            anyhow::bail!(
                "media_folder must be a directory, not a file: {}",
                self.taggai.media_folder.display()
            );
        }

        if self.search.tag_suggestion_limit == 0 {
            anyhow::bail!("search.tag_suggestion_limit must be greater than 0");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.taggai.db_path
    }

    /// Get the media root
    pub fn media_folder(&self) -> &Path {
        &self.taggai.media_folder
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.taggai.migrations_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn create_test_config(media_folder: &Path) -> String {
        let media_str = media_folder.to_str().unwrap().replace('\\', "\\\\");
        format!(
            r#"
[taggai]
media_folder = "{}"
db_path = "./test.db"
log_level = "debug"
"#,
            media_str
        )
    }

    fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        let originals: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(k, _)| (k.to_string(), std::env::var(k).ok()))
            .collect();
        for (k, v) in vars {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        }
        f();
        for (k, v) in originals {
            match v {
                Some(v) => std::env::set_var(&k, v),
                None => std::env::remove_var(&k),
            }
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let media = temp_dir.path().canonicalize().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, create_test_config(&media)).unwrap();

        with_env(
            &[
                ("TAGGAI_CONFIG", config_path.to_str()),
                ("MEDIA_PATH", None),
                ("DB_PATH", None),
            ],
            || {
                let config = Config::load();
                assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
                let config = config.unwrap();
                assert_eq!(config.taggai.log_level, "debug");
                assert_eq!(config.db_path(), Path::new("./test.db"));
                assert_eq!(config.migrations_dir(), Path::new("migrations"));
                assert_eq!(config.search.tag_suggestion_limit, 20);
            },
        );
    }

    #[test]
    fn test_env_overrides_paths() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let other_media = temp_dir.path().join("other");
        fs::create_dir(&other_media).unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, create_test_config(Path::new("/does/not/exist"))).unwrap();

        with_env(
            &[
                ("TAGGAI_CONFIG", config_path.to_str()),
                ("MEDIA_PATH", other_media.to_str()),
                ("DB_PATH", Some("/tmp/override.db")),
            ],
            || {
                let config = Config::load().unwrap();
                assert_eq!(config.media_folder(), other_media.as_path());
                assert_eq!(config.db_path(), Path::new("/tmp/override.db"));
            },
        );
    }

    #[test]
    fn test_config_missing_media_folder() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, create_test_config(Path::new("/does/not/exist"))).unwrap();

        with_env(
            &[
                ("TAGGAI_CONFIG", config_path.to_str()),
                ("MEDIA_PATH", None),
            ],
            || {
                let err = Config::load().unwrap_err();
                assert!(err.to_string().contains("media_folder"));
            },
        );
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_env(&[("TAGGAI_CONFIG", Some("nonexistent.toml"))], || {
            assert!(Config::load().is_err());
        });
    }

    #[test]
    fn test_search_section_optional() {
        let config = Config::from_toml_str(
            r#"
[taggai]
media_folder = "media"
db_path = "taggai.db"

[search]
tag_suggestion_limit = 5
"#,
        )
        .unwrap();
        assert_eq!(config.search.tag_suggestion_limit, 5);
        assert_eq!(config.taggai.log_level, "info");
    }
}
