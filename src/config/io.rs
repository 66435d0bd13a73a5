//! Configuration file I/O operations

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.maelstrom/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".maelstrom")
    }

    /// Get the global config file path (~/.maelstrom/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the given file, or the global config if it exists, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let global_path = Self::global_config_path();
        if global_path.exists() {
            Self::from_file(&global_path)
        } else {
            tracing::debug!("No config at {}, using defaults", global_path.display());
            Ok(Self::default())
        }
    }

    /// Validate `content` as a config file and write it to `path` verbatim.
    ///
    /// Comments are kept. The write holds an exclusive `<path>.lock` and goes
    /// through a temp file renamed over the target.
    pub fn write_template(path: &Path, content: &str) -> Result<()> {
        toml::from_str::<Config>(content).with_context(|| "Config template does not parse")?;
        write_locked(path, content)
    }
}

/// Atomically replace `path` with `content` while holding `<path>.lock`
fn write_locked(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let lock_path = path.with_extension("toml.lock");
    let lock = File::create(&lock_path)
        .with_context(|| format!("Failed to open {}", lock_path.display()))?;
    lock.lock_exclusive()
        .with_context(|| format!("Failed to lock {}", lock_path.display()))?;

    let temp_path = path.with_extension("toml.tmp");
    let mut temp = File::create(&temp_path)
        .with_context(|| format!("Failed to create {}", temp_path.display()))?;
    temp.write_all(content.as_bytes())
        .and_then(|()| temp.sync_all())
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_template_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let template = "# operator notes\n[settings]\nreplay_concurrency = 3\n";

        Config::write_template(&path, template).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), template);
        assert!(!path.with_extension("toml.tmp").exists());

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.settings.replay_concurrency, 3);
        assert_eq!(loaded.settings.leaderboard_size, 10);
    }

    #[test]
    fn test_write_template_rejects_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(Config::write_template(&path, "[settings]\nreplay_concurrency = \"many\"\n").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\n").unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert!(loaded.settings.database_path.is_none());
        assert_eq!(loaded.settings.replay_concurrency, 8);
    }
}
