use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionType, GameState, GameStatus, Position, Snake},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::warn;

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickResult {
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Whether the score crossed into a new level this tick
    pub level_up: bool,
    /// Type of collision if one occurred
    pub collision: Option<CollisionType>,
}

impl TickResult {
    /// Whether this tick ended the game
    pub fn game_over(&self) -> bool {
        self.collision.is_some()
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine with a deterministic food sequence
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Build a fresh game: centered horizontal snake heading right, new food, Playing
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let (width, height) = (self.config.grid_width, self.config.grid_height);
        let food = self
            .spawn_food(&snake, width, height)
            .unwrap_or_else(|| Position::new(0, 0));

        GameState::new(snake, food, width, height)
    }

    /// Advance the world by one cell.
    ///
    /// `intent` is the buffered direction; a reversal of the committed
    /// direction is ignored. On collision the state is left untouched apart
    /// from the status.
    pub fn tick(&mut self, state: &mut GameState, intent: Option<Direction>) -> TickResult {
        if !state.is_playing() {
            return TickResult::default();
        }

        let direction = match intent {
            Some(next) if !state.snake.direction.is_opposite(next) => next,
            _ => state.snake.direction,
        };

        let new_head = state.snake.head().moved_in_direction(direction);

        if let Some(collision) = self.check_collision(state, new_head) {
            state.status = GameStatus::GameOver;
            return TickResult {
                collision: Some(collision),
                ..TickResult::default()
            };
        }

        state.snake.direction = direction;
        let ate_food = new_head == state.food;
        state.snake.advance(ate_food);

        let mut level_up = false;
        if ate_food {
            let previous = state.score;
            state.score += self.config.points_per_food;

            if self.config.level_for_score(state.score) > self.config.level_for_score(previous) {
                state.level += 1;
                level_up = true;
            }

            match self.spawn_food(&state.snake, state.grid_width, state.grid_height) {
                Some(food) => state.food = food,
                None => warn!(length = state.snake.len(), "board is full, no room for food"),
            }
        }

        TickResult {
            ate_food,
            level_up,
            collision: None,
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if state.is_occupied_by_snake(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Pick a free cell for food.
    ///
    /// Samples uniformly inside the grid shrunk by the configured margin.
    /// After `max_food_attempts` misses it scans the inner rectangle, then the
    /// whole grid. Returns `None` only if every cell is occupied.
    pub fn spawn_food(&mut self, snake: &Snake, width: usize, height: usize) -> Option<Position> {
        if width == 0 || height == 0 {
            return None;
        }

        let margin = self.config.food_margin;
        let (x_range, y_range) = if width > 2 * margin && height > 2 * margin {
            (margin..width - margin, margin..height - margin)
        } else {
            (0..width, 0..height)
        };

        for _ in 0..self.config.max_food_attempts {
            let x = self.rng.gen_range(x_range.clone()) as i32;
            let y = self.rng.gen_range(y_range.clone()) as i32;
            let pos = Position::new(x, y);

            if !snake.occupies(pos) {
                return Some(pos);
            }
        }

        let inner = scan_free(snake, x_range, y_range);
        inner.or_else(|| scan_free(snake, 0..width, 0..height))
    }
}

fn scan_free(
    snake: &Snake,
    x_range: std::ops::Range<usize>,
    y_range: std::ops::Range<usize>,
) -> Option<Position> {
    y_range
        .flat_map(|y| x_range.clone().map(move |x| Position::new(x as i32, y as i32)))
        .find(|pos| !snake.occupies(*pos))
}
