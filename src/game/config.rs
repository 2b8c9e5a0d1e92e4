use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    /// Points awarded per food
    pub points_per_food: u32,
    /// A new level starts every time the score crosses a multiple of this
    pub points_per_level: u32,

    /// Tick interval at level 1, in milliseconds
    pub base_tick_ms: u64,
    /// Interval reduction per level, in milliseconds
    pub tick_step_ms: u64,
    /// Fastest allowed tick interval, in milliseconds
    pub min_tick_ms: u64,

    /// Cells kept free along each wall when spawning food
    pub food_margin: usize,
    /// Random placement attempts before falling back to a board scan
    pub max_food_attempts: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            points_per_food: 10,
            points_per_level: 50,
            base_tick_ms: 150,
            tick_step_ms: 10,
            min_tick_ms: 50,
            food_margin: 1,
            max_food_attempts: 1000,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Derive the grid from a viewport measured in the same unit as the cell size
    pub fn from_viewport(
        viewport_width: usize,
        viewport_height: usize,
        cell_width: usize,
        cell_height: usize,
    ) -> Self {
        let width = viewport_width / cell_width.max(1);
        let height = viewport_height / cell_height.max(1);
        Self::new(width, height)
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Tick interval for a level: shrinks by a fixed step, floored at the minimum
    pub fn tick_interval(&self, level: u32) -> Duration {
        let reduction = self
            .tick_step_ms
            .saturating_mul(u64::from(level.saturating_sub(1)));
        let ms = self
            .base_tick_ms
            .saturating_sub(reduction)
            .max(self.min_tick_ms);
        Duration::from_millis(ms)
    }

    /// Level reached at a given score
    pub fn level_for_score(&self, score: u32) -> u32 {
        score / self.points_per_level.max(1) + 1
    }
}
