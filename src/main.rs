use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use gesture_snake::config::AppConfig;
use gesture_snake::game::GameConfig;
use gesture_snake::logging::init_logging;
use gesture_snake::modes::{PlayMode, PlayOptions};
use gesture_snake::render::Renderer;
use gesture_snake::theme::{HttpThemeProvider, PaletteThemeProvider, ThemeProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "gesture-snake")]
#[command(version, about = "Snake with keyboard or hand-gesture control")]
struct Cli {
    /// Input used when the game starts (G toggles it at runtime)
    #[arg(long, default_value = "keyboard")]
    control: Control,

    /// Grid width; the grid fits the terminal when neither size is given
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Theme service endpoint (http://host:port/path)
    #[arg(long)]
    theme_endpoint: Option<String>,

    /// Shell command that starts the hand tracker
    #[arg(long)]
    tracker: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Control {
    /// Arrow keys or WASD
    Keyboard,
    /// Point with the index finger in front of the camera
    Gesture,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if self.width.is_some() || self.height.is_some() {
            config.display.fit_to_terminal = false;
        }
        if let Some(width) = self.width {
            config.game.grid_width = width;
        }
        if let Some(height) = self.height {
            config.game.grid_height = height;
        }
        if let Some(endpoint) = &self.theme_endpoint {
            config.theme.endpoint = Some(endpoint.clone());
        }
        if let Some(tracker) = &self.tracker {
            config.gesture.tracker_command = Some(tracker.clone());
        }
        if let Some(log_file) = &self.log_file {
            config.log.file = Some(log_file.clone());
        }
        if self.control == Control::Gesture {
            config.gesture.enabled = true;
        }
    }
}

/// Final grid: either the configured one or whatever fits the terminal
fn game_config(config: &AppConfig) -> Result<GameConfig> {
    let mut game = config.game.clone();

    if config.display.fit_to_terminal {
        let (columns, rows) = crossterm::terminal::size().context("Failed to read terminal size")?;
        let (width, height) = Renderer::grid_viewport(columns, rows);
        let fitted = GameConfig::from_viewport(
            width,
            height,
            config.display.cell_width,
            config.display.cell_height,
        );
        game.grid_width = fitted.grid_width;
        game.grid_height = fitted.grid_height;
    }

    ensure!(
        game.grid_width >= game.initial_snake_length + 2 && game.grid_height >= 3,
        "a {}x{} grid is too small to play; enlarge the terminal or pass --width/--height",
        game.grid_width,
        game.grid_height
    );

    Ok(game)
}

fn theme_provider(config: &AppConfig) -> Result<Arc<dyn ThemeProvider>> {
    match &config.theme.endpoint {
        Some(endpoint) => {
            let provider =
                HttpThemeProvider::new(endpoint, Duration::from_millis(config.theme.timeout_ms))
                    .context("Failed to configure theme service")?;
            Ok(Arc::new(provider))
        }
        None => Ok(Arc::new(PaletteThemeProvider::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    init_logging(&config.log)?;

    let game = game_config(&config)?;
    let theme_provider = theme_provider(&config)?;

    info!(
        width = game.grid_width,
        height = game.grid_height,
        theme_endpoint = config.theme.endpoint.as_deref().unwrap_or("built-in"),
        gestures = config.gesture.enabled,
        "starting"
    );

    let mut play_mode = PlayMode::new(
        game,
        PlayOptions {
            theme_provider,
            tracker_command: config.gesture.tracker_command.clone(),
            sensitivity: config.gesture.sensitivity,
            start_with_gestures: config.gesture.enabled,
        },
    );
    play_mode.run().await?;

    Ok(())
}
