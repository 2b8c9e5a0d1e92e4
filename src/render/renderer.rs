use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::game::{GameState, GameStatus, Position};
use crate::gesture::GestureStatus;
use crate::metrics::{GameMetrics, ScoreHistory};
use crate::theme::{parse_hex_color, Theme};

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const SIDE_PANEL_WIDTH: u16 = 32;

/// Everything a frame needs besides the game state
pub struct HudInfo<'a> {
    pub history: &'a ScoreHistory,
    pub metrics: &'a GameMetrics,
    pub gesture: &'a GestureStatus,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Terminal columns and rows left for the grid inside a terminal of the given size
    pub fn grid_viewport(columns: u16, rows: u16) -> (usize, usize) {
        let width = columns.saturating_sub(SIDE_PANEL_WIDTH + 2);
        let height = rows.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT + 2);
        (width as usize, height as usize)
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, hud: &HudInfo) {
        let theme = &state.theme;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, hud), chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(SIDE_PANEL_WIDTH)])
            .split(chunks[1]);

        match state.status {
            GameStatus::Menu => frame.render_widget(self.render_menu(theme, hud.gesture), body[0]),
            GameStatus::Playing => frame.render_widget(self.render_grid(state), body[0]),
            GameStatus::GameOver => frame.render_widget(self.render_game_over(state), body[0]),
        }

        self.render_side_panel(frame, body[1], state, hud.history);

        frame.render_widget(self.render_controls(theme), chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let theme = &state.theme;
        let background = color(&theme.background);
        let head = Style::default()
            .fg(color(&theme.snake_head))
            .bg(background)
            .add_modifier(Modifier::BOLD);
        let body = Style::default().fg(color(&theme.snake_body)).bg(background);
        let food = Style::default()
            .fg(color(&theme.food))
            .bg(background)
            .add_modifier(Modifier::BOLD);
        let empty = Style::default().fg(color(&theme.grid)).bg(background);

        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == state.snake.head() {
                    Span::styled("■ ", head)
                } else if state.snake.occupies(pos) {
                    Span::styled("□ ", body)
                } else if pos == state.food {
                    Span::styled("● ", food)
                } else {
                    Span::styled(". ", empty)
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(color(&theme.snake_head)))
                    .title(format!(" {} ", theme.name)),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, hud: &HudInfo) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default()
            .fg(color(&state.theme.text))
            .add_modifier(Modifier::BOLD);

        let control_style = match hud.gesture {
            GestureStatus::Off => Style::default().fg(Color::Gray),
            GestureStatus::Active => Style::default().fg(Color::Green),
            GestureStatus::CameraNeeded(_) => Style::default().fg(Color::Red),
        };

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value),
            Span::raw("    "),
            Span::styled("Level: ", label),
            Span::styled(state.level.to_string(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(hud.history.best().to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(hud.metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Control: ", label),
            Span::styled(hud.gesture.label().to_string(), control_style),
        ])];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
    }

    fn render_menu(&self, theme: &Theme, gesture: &GestureStatus) -> Paragraph<'_> {
        let accent = Style::default()
            .fg(color(&theme.snake_head))
            .add_modifier(Modifier::BOLD);

        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled("S N A K E", accent)),
            Line::from(""),
            Line::from(Span::styled(
                theme.story.clone(),
                Style::default().fg(color(&theme.text)),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled("Enter", accent),
                Span::styled(" to start", Style::default().fg(Color::Gray)),
            ]),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled("G", accent),
                Span::styled(" to toggle hand-gesture control", Style::default().fg(Color::Gray)),
            ]),
        ];

        if let GestureStatus::CameraNeeded(reason) = gesture {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(
                format!("Camera needed: {reason}"),
                Style::default().fg(Color::Red),
            )));
        }

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(color(&theme.snake_head))),
            )
    }

    fn render_game_over(&self, state: &GameState) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("   Level: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.level.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Enter",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to play again or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_side_panel(
        &self,
        frame: &mut Frame,
        area: Rect,
        state: &GameState,
        history: &ScoreHistory,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(8)])
            .split(area);

        let labels: Vec<String> = history.entries().map(|e| format!("#{}", e.game_id)).collect();
        let bars: Vec<(&str, u64)> = labels
            .iter()
            .zip(history.entries())
            .map(|(label, entry)| (label.as_str(), u64::from(entry.score)))
            .collect();

        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Last games "),
            )
            .data(bars.as_slice())
            .bar_width(2)
            .bar_gap(1)
            .bar_style(Style::default().fg(color(&state.theme.snake_body)))
            .value_style(Style::default().fg(Color::Black).bg(color(&state.theme.snake_body)));
        frame.render_widget(chart, chunks[0]);

        let story = Paragraph::new(vec![
            Line::from(Span::styled(
                state.theme.name.clone(),
                Style::default()
                    .fg(color(&state.theme.snake_head))
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                state.theme.story.clone(),
                Style::default().fg(color(&state.theme.text)),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Theme "));
        frame.render_widget(story, chunks[1]);
    }

    fn render_controls(&self, theme: &Theme) -> Paragraph<'_> {
        let key = Style::default().fg(color(&theme.snake_head));
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", key),
            Span::raw(" or "),
            Span::styled("WASD", key),
            Span::raw(" to move | "),
            Span::styled("G", key),
            Span::raw(" gestures | "),
            Span::styled("R", key),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Theme color to terminal color; unparseable values fall back to the terminal default
fn color(hex: &str) -> Color {
    parse_hex_color(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Snake};
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_color_conversion() {
        assert_eq!(color("#ff3366"), Color::Rgb(255, 51, 102));
        assert_eq!(color("nope"), Color::Reset);
    }

    #[test]
    fn test_grid_viewport() {
        assert_eq!(Renderer::grid_viewport(120, 40), (86, 32));
        assert_eq!(Renderer::grid_viewport(10, 5), (0, 0));
    }

    #[test]
    fn test_renders_every_status() {
        let history = ScoreHistory::new();
        let metrics = GameMetrics::new();
        let gesture = GestureStatus::CameraNeeded("tracker exited".to_string());
        let hud = HudInfo {
            history: &history,
            metrics: &metrics,
            gesture: &gesture,
        };
        let mut state = GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right, 3),
            Position::new(1, 1),
            10,
            10,
        );

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let renderer = Renderer::new();
        for status in [GameStatus::Menu, GameStatus::Playing, GameStatus::GameOver] {
            state.status = status;
            terminal
                .draw(|frame| renderer.render(frame, &state, &hud))
                .unwrap();
        }
    }
}
