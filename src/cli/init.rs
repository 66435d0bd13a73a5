//! Init command implementation

use anyhow::{bail, Result};
use std::path::PathBuf;

use maelstrom::config::Config;

/// Default configuration content for maelstrom init
pub const DEFAULT_CONFIG: &str = r#"# Maelstrom Configuration
# =======================
#
# Per-community leveling settings (increment, cooldown, modifiers, role
# thresholds, ...) live in the database; use `maelstrom configure` to set them.

# ============================================================================
# SETTINGS - Global configuration options
# ============================================================================
#
# Available options:
#   database_path       - SQLite database file (default: ~/.maelstrom/maelstrom.db)
#   replay_concurrency  - Messages processed at once by `maelstrom replay` (default: 8)
#   leaderboard_size    - Rows shown by `maelstrom leaderboard` (default: 10)

[settings]
# database_path = "/var/lib/maelstrom/maelstrom.db"
replay_concurrency = 8
leaderboard_size = 10
"#;

/// Initialize a new configuration file
///
/// By default creates the global config at ~/.maelstrom/config.toml
/// Use --config to specify a custom path
pub async fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    Config::write_template(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.settings.database_path.is_none());
        assert_eq!(config.settings.replay_concurrency, 8);
        assert_eq!(config.settings.leaderboard_size, 10);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_command(Some(path.clone()), false).await.unwrap();
        assert!(path.exists());
        assert!(init_command(Some(path.clone()), false).await.is_err());

        std::fs::write(&path, "# edited\n").unwrap();
        init_command(Some(path.clone()), true).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
        assert!(path.with_extension("toml.lock").exists());
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
