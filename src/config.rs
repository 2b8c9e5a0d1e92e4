//! Application configuration, loaded from TOML and overridden by CLI flags.
//!
//! ```toml
//! [game]
//! base_tick_ms = 150
//!
//! [display]
//! fit_to_terminal = true
//!
//! [theme]
//! endpoint = "http://127.0.0.1:8787/theme"
//!
//! [gesture]
//! tracker_command = "python3 hand_tracker.py"
//!
//! [log]
//! file = "gesture-snake.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::GameConfig;
use crate::gesture::DEFAULT_SENSITIVITY;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub gesture: GestureConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// How the grid maps onto the terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Derive the grid from the terminal size instead of `game.grid_*`
    #[serde(default = "default_true")]
    pub fit_to_terminal: bool,

    /// Terminal columns per cell
    #[serde(default = "default_cell_width")]
    pub cell_width: usize,

    /// Terminal rows per cell
    #[serde(default = "default_cell_height")]
    pub cell_height: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fit_to_terminal: true,
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Theme service endpoint; built-in palettes are used when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_theme_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_theme_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Shell command that runs the hand tracker
    #[serde(default)]
    pub tracker_command: Option<String>,

    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,

    /// Turn gesture control on at startup
    #[serde(default)]
    pub enabled: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tracker_command: None,
            sensitivity: default_sensitivity(),
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file; the terminal belongs to the game, so nothing is logged without one
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// `EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: default_log_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cell_width() -> usize {
    2
}

fn default_cell_height() -> usize {
    1
}

fn default_theme_timeout_ms() -> u64 {
    5000
}

fn default_sensitivity() -> f32 {
    DEFAULT_SENSITIVITY
}

fn default_log_filter() -> String {
    "gesture_snake=info".to_string()
}

impl AppConfig {
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.game;

        if game.initial_snake_length == 0 {
            return Err(ConfigError::Validation(
                "game.initial_snake_length must be at least 1".to_string(),
            ));
        }
        if !self.display.fit_to_terminal
            && (game.grid_width < game.initial_snake_length || game.grid_height == 0)
        {
            return Err(ConfigError::Validation(format!(
                "a {}x{} grid cannot hold a snake of length {}",
                game.grid_width, game.grid_height, game.initial_snake_length
            )));
        }
        if game.points_per_food == 0 || game.points_per_level == 0 {
            return Err(ConfigError::Validation(
                "game.points_per_food and game.points_per_level must be positive".to_string(),
            ));
        }
        if game.base_tick_ms == 0 || game.min_tick_ms == 0 {
            return Err(ConfigError::Validation(
                "tick intervals must be positive".to_string(),
            ));
        }
        if game.min_tick_ms > game.base_tick_ms {
            return Err(ConfigError::Validation(format!(
                "game.min_tick_ms ({}) exceeds game.base_tick_ms ({})",
                game.min_tick_ms, game.base_tick_ms
            )));
        }
        if self.display.cell_width == 0 || self.display.cell_height == 0 {
            return Err(ConfigError::Validation(
                "display cell size must be positive".to_string(),
            ));
        }
        if !(self.gesture.sensitivity > 0.0 && self.gesture.sensitivity < 1.0) {
            return Err(ConfigError::Validation(format!(
                "gesture.sensitivity must be in (0, 1), got {}",
                self.gesture.sensitivity
            )));
        }
        if self.theme.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "theme.timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
