//! Game controller: one engine, the live state, the intent buffer and the
//! score history of this session.

use std::time::Duration;
use tracing::{debug, info};

use crate::game::{
    Direction, DirectionBuffer, GameConfig, GameEngine, GameState, GameStatus, TickResult,
};
use crate::metrics::{ScoreEntry, ScoreHistory};
use crate::theme::ThemeUpdate;

pub struct GameSession {
    engine: GameEngine,
    state: GameState,
    intent: DirectionBuffer,
    history: ScoreHistory,
    game_id: u64,
}

impl GameSession {
    /// New session sitting in the menu
    pub fn new(config: GameConfig) -> Self {
        Self::with_engine(GameEngine::new(config))
    }

    pub fn with_engine(mut engine: GameEngine) -> Self {
        let mut state = engine.reset();
        state.status = GameStatus::Menu;

        Self {
            engine,
            state,
            intent: DirectionBuffer::new(),
            history: ScoreHistory::new(),
            game_id: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    /// Id of the current (or last) game; 0 before the first game
    pub fn game_id(&self) -> u64 {
        self.game_id
    }

    /// Tick interval for the current level
    pub fn tick_interval(&self) -> Duration {
        self.engine.config().tick_interval(self.state.level)
    }

    /// Buffer a direction from keyboard or gesture input.
    ///
    /// Ignored outside of play and when it reverses the committed direction.
    pub fn handle_direction_change(&mut self, direction: Direction) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.intent.submit(direction, self.state.snake.direction)
    }

    /// Start a fresh game with default score, level, direction and theme
    pub fn reset(&mut self) {
        self.game_id += 1;
        self.state = self.engine.reset();
        self.intent.clear();

        info!(
            game_id = self.game_id,
            width = self.state.grid_width,
            height = self.state.grid_height,
            "game started"
        );
    }

    /// Advance one step using the buffered intent
    pub fn tick(&mut self) -> TickResult {
        let intent = self.intent.take();
        let result = self.engine.tick(&mut self.state, intent);

        if result.level_up {
            info!(
                game_id = self.game_id,
                level = self.state.level,
                score = self.state.score,
                "level up"
            );
        }

        if let Some(collision) = result.collision {
            let entry = ScoreEntry {
                game_id: self.game_id,
                score: self.state.score,
                level: self.state.level,
            };
            self.history.record(entry);
            info!(
                game_id = entry.game_id,
                score = entry.score,
                level = entry.level,
                ?collision,
                "game over"
            );
        }

        result
    }

    /// Apply a fetched theme if it still belongs to the current game and level
    pub fn apply_theme(&mut self, update: ThemeUpdate) -> bool {
        if update.game_id != self.game_id || update.level != self.state.level {
            debug!(
                game_id = update.game_id,
                level = update.level,
                current_level = self.state.level,
                "discarding stale theme"
            );
            return false;
        }

        info!(level = update.level, name = %update.theme.name, "theme applied");
        self.state.theme = update.theme;
        true
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CollisionType, Position, Snake};
    use crate::theme::Theme;

    fn session() -> GameSession {
        GameSession::with_engine(GameEngine::with_seed(GameConfig::default(), 11))
    }

    fn place_food_ahead(session: &mut GameSession) {
        let state = session.state_mut();
        state.food = state.snake.head().moved_in_direction(state.snake.direction);
    }

    #[test]
    fn test_starts_in_menu() {
        let mut session = session();
        assert_eq!(session.state().status, GameStatus::Menu);
        assert_eq!(session.game_id(), 0);
        assert!(!session.handle_direction_change(Direction::Up));

        let before = session.state().clone();
        session.tick();
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_reverse_intent_does_not_change_direction() {
        let mut session = session();
        session.reset();

        assert!(!session.handle_direction_change(Direction::Left));
        session.tick();
        assert_eq!(session.state().snake.direction, Direction::Right);
    }

    #[test]
    fn test_intents_coalesce_between_ticks() {
        let mut session = session();
        session.reset();
        let head = session.state().snake.head();

        session.handle_direction_change(Direction::Up);
        session.handle_direction_change(Direction::Down);
        session.tick();

        assert_eq!(session.state().snake.direction, Direction::Down);
        assert_eq!(session.state().snake.head(), head.moved_in_direction(Direction::Down));
    }

    #[test]
    fn test_score_and_level_progression() {
        let mut session = session();
        session.reset();
        session.state_mut().snake = Snake::new(Position::new(3, 5), Direction::Right, 3);

        let mut level_ups = 0;
        for _ in 0..6 {
            place_food_ahead(&mut session);
            let result = session.tick();
            assert!(result.ate_food);
            if result.level_up {
                level_ups += 1;
            }
        }

        assert_eq!(session.state().score, 60);
        assert_eq!(session.state().level, 2);
        assert_eq!(level_ups, 1);
        assert_eq!(session.state().snake.len(), 9);
        assert_eq!(session.tick_interval(), Duration::from_millis(140));
    }

    #[test]
    fn test_game_over_records_history() {
        let mut session = session();
        session.reset();
        session.state_mut().score = 30;
        session.state_mut().snake = Snake::new(Position::new(19, 4), Direction::Right, 3);

        let result = session.tick();

        assert_eq!(result.collision, Some(CollisionType::Wall));
        assert_eq!(session.state().status, GameStatus::GameOver);
        assert_eq!(
            session.history().last(),
            Some(&ScoreEntry {
                game_id: 1,
                score: 30,
                level: 1
            })
        );

        // Ticks after the game ended change nothing
        session.tick();
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut session = session();
        session.reset();
        session.handle_direction_change(Direction::Up);
        session.state_mut().score = 120;
        session.state_mut().level = 3;
        session.state_mut().theme = Theme::offline_fallback(3);
        session.state_mut().status = GameStatus::GameOver;

        session.reset();

        let state = session.state();
        assert_eq!(session.game_id(), 2);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.theme, Theme::default());
        assert_eq!(
            state.snake.body,
            vec![
                Position::new(10, 10),
                Position::new(9, 10),
                Position::new(8, 10)
            ]
        );
        assert_eq!(session.tick_interval(), Duration::from_millis(150));

        // The Up intent from the previous game must not leak into this one
        session.tick();
        assert_eq!(session.state().snake.head(), Position::new(11, 10));
    }

    #[test]
    fn test_history_keeps_last_ten_games() {
        let mut session = session();
        for _ in 0..12 {
            session.reset();
            session.state_mut().snake = Snake::new(Position::new(19, 4), Direction::Right, 3);
            session.tick();
        }

        assert_eq!(session.history().len(), 10);
        assert_eq!(session.history().entries().next().unwrap().game_id, 3);
        assert_eq!(session.history().games_played(), 12);
    }

    #[test]
    fn test_stale_theme_is_ignored() {
        let mut session = session();
        session.reset();
        session.state_mut().level = 3;

        let theme = Theme {
            name: "Deep Reef".to_string(),
            ..Theme::default()
        };

        let old_level = ThemeUpdate {
            game_id: 1,
            level: 2,
            theme: theme.clone(),
        };
        assert!(!session.apply_theme(old_level));

        let old_game = ThemeUpdate {
            game_id: 0,
            level: 3,
            theme: theme.clone(),
        };
        assert!(!session.apply_theme(old_game));
        assert_eq!(session.state().theme, Theme::default());

        let current = ThemeUpdate {
            game_id: 1,
            level: 3,
            theme: theme.clone(),
        };
        assert!(session.apply_theme(current));
        assert_eq!(session.state().theme, theme);
    }
}
