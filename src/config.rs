use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::board::DEFAULT_BOARD_SIZE;
use crate::error::ConfigError;

/// Config file name inside the platform config directory
pub const CONFIG_FILE: &str = "gomoku.toml";

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub bot: BotConfig,
    pub records: RecordsConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub size: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Gomocup engine binary. Without one the built-in fallback bot plays.
    pub engine_path: Option<PathBuf>,
    /// Per-move answer timeout
    pub timeout_ms: u64,
    /// Pause before the bot's move is requested
    pub delay_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            engine_path: None,
            timeout_ms: 15_000,
            delay_ms: 500,
        }
    }
}

impl BotConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Deadline handed to the engine process. Shorter than [`BotConfig::timeout`]
    /// so the engine gives up on a move before the GUI does.
    pub fn engine_timeout(&self) -> Duration {
        self.timeout() * 4 / 5
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Where saved matches live. Defaults to the platform data directory.
    pub dir: Option<PathBuf>,
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", "gomoku", "gomoku")
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// `gomoku.toml` in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Configured record directory, else the platform data directory
    pub fn records_dir(&self) -> PathBuf {
        if let Some(dir) = &self.records.dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join("records"))
            .unwrap_or_else(|| PathBuf::from("records"))
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(5..=25).contains(&self.board.size) {
            return Err(ConfigError::Validation(
                "board.size must be in 5..=25".into(),
            ));
        }
        if self.bot.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "bot.timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}
