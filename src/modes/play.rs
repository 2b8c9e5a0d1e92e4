//! Interactive play mode.
//!
//! One task multiplexes the keyboard, the tick timer, the hand-tracker frame
//! stream, theme answers and the render timer. The tick timer is `None`
//! whenever no game is running.

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, interval_at};
use tracing::{debug, info, warn};

use crate::game::{GameConfig, GameStatus};
use crate::gesture::{GestureClassifier, GestureStatus, HandTracker, LandmarkFrame, TrackerError};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{HudInfo, Renderer};
use crate::session::GameSession;
use crate::theme::{ThemeProvider, ThemeUpdate, resolve_theme};

/// Render at 30 FPS
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Collaborators and input settings for a play session
pub struct PlayOptions {
    pub theme_provider: Arc<dyn ThemeProvider>,
    pub tracker_command: Option<String>,
    pub sensitivity: f32,
    pub start_with_gestures: bool,
}

pub struct PlayMode {
    session: GameSession,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    classifier: GestureClassifier,
    tracker: Option<HandTracker>,
    tracker_command: Option<String>,
    gesture: GestureStatus,
    start_with_gestures: bool,
    theme_provider: Arc<dyn ThemeProvider>,
    theme_tx: mpsc::UnboundedSender<ThemeUpdate>,
    theme_rx: mpsc::UnboundedReceiver<ThemeUpdate>,
    tick_timer: Option<Interval>,
    should_quit: bool,
}

impl PlayMode {
    pub fn new(config: GameConfig, options: PlayOptions) -> Self {
        Self::with_session(GameSession::new(config), options)
    }

    pub fn with_session(session: GameSession, options: PlayOptions) -> Self {
        let (theme_tx, theme_rx) = mpsc::unbounded_channel();

        Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            classifier: GestureClassifier::new(options.sensitivity),
            tracker: None,
            tracker_command: options.tracker_command,
            gesture: GestureStatus::Off,
            start_with_gestures: options.start_with_gestures,
            theme_provider: options.theme_provider,
            theme_tx,
            theme_rx,
            tick_timer: None,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut terminal = restore_on_error(setup_terminal())?;

        if self.start_with_gestures {
            self.enable_gestures();
        }

        let result = self.run_game_loop(&mut terminal).await;

        // The camera is released before anything else can fail
        self.disable_gestures().await;
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut render_timer = interval(RENDER_INTERVAL);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event).await;
                    }
                }

                _ = next_tick(&mut self.tick_timer) => {
                    self.update_game();
                }

                frame = next_frame(&mut self.tracker) => {
                    self.handle_frame(frame).await;
                }

                Some(update) = self.theme_rx.recv() => {
                    self.session.apply_theme(update);
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        let hud = HudInfo {
                            history: self.session.history(),
                            metrics: &self.metrics,
                            gesture: &self.gesture,
                        };
                        self.renderer.render(frame, self.session.state(), &hud);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    async fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Turn(direction) => {
                self.session.handle_direction_change(direction);
            }
            KeyAction::Confirm => {
                if self.session.state().status != GameStatus::Playing {
                    self.start_game();
                }
            }
            KeyAction::Restart => self.start_game(),
            KeyAction::ToggleGesture => self.toggle_gestures().await,
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn start_game(&mut self) {
        self.session.reset();
        self.metrics.on_game_start();
        self.restart_timer();
    }

    fn update_game(&mut self) {
        let result = self.session.tick();

        if result.level_up {
            self.restart_timer();
            self.request_theme();
        }

        if result.game_over() {
            self.tick_timer = None;
            self.metrics.on_game_over();
        }
    }

    /// (Re)start the tick timer at the current level's interval; the first tick is one period away
    fn restart_timer(&mut self) {
        let period = self.session.tick_interval();
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.tick_timer = Some(timer);
        debug!(period_ms = period.as_millis() as u64, "tick timer restarted");
    }

    /// Fire-and-forget theme fetch for the current level
    fn request_theme(&self) {
        let provider = Arc::clone(&self.theme_provider);
        let tx = self.theme_tx.clone();
        let game_id = self.session.game_id();
        let state = self.session.state();
        let level = state.level;
        let previous = state.theme.name.clone();

        tokio::spawn(async move {
            let theme = resolve_theme(provider.as_ref(), level, &previous).await;
            // The receiver only goes away when the mode is shutting down
            let _ = tx.send(ThemeUpdate {
                game_id,
                level,
                theme,
            });
        });
    }

    async fn toggle_gestures(&mut self) {
        if self.gesture == GestureStatus::Off {
            self.enable_gestures();
        } else {
            self.disable_gestures().await;
        }
    }

    fn enable_gestures(&mut self) {
        let command = self.tracker_command.as_deref().unwrap_or("");
        match HandTracker::start(command) {
            Ok(tracker) => {
                self.tracker = Some(tracker);
                self.classifier.reset();
                self.gesture = GestureStatus::Active;
            }
            Err(e) => {
                warn!(error = %e, "gesture control unavailable");
                self.gesture = GestureStatus::CameraNeeded(e.to_string());
            }
        }
    }

    async fn disable_gestures(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.stop().await;
        }
        self.gesture = GestureStatus::Off;
    }

    async fn handle_frame(&mut self, frame: Result<Option<LandmarkFrame>, TrackerError>) {
        match frame {
            Ok(Some(frame)) => {
                if let Some(direction) = self.classifier.process_frame(&frame) {
                    let accepted = self.session.handle_direction_change(direction);
                    debug!(direction = direction.as_str(), accepted, "gesture");
                }
            }
            Ok(None) => {
                info!("hand tracker exited");
                self.tracker = None;
                self.gesture = GestureStatus::CameraNeeded("hand tracker exited".to_string());
            }
            Err(e) => {
                warn!(error = %e, "hand tracker failed");
                if let Some(tracker) = self.tracker.take() {
                    tracker.stop().await;
                }
                self.gesture = GestureStatus::CameraNeeded(e.to_string());
            }
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stderr>>> {
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

/// Leave raw mode and the alternate screen if terminal setup failed half way
fn restore_on_error<T>(result: Result<T>) -> Result<T> {
    if result.is_err() {
        let _ = disable_raw_mode();
        let _ = execute!(stderr(), LeaveAlternateScreen);
    }
    result
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn next_frame(
    tracker: &mut Option<HandTracker>,
) -> Result<Option<LandmarkFrame>, TrackerError> {
    match tracker {
        Some(tracker) => tracker.next_frame().await,
        None => std::future::pending().await,
    }
}
