pub mod game_metrics;
pub mod history;

pub use game_metrics::GameMetrics;
pub use history::{ScoreEntry, ScoreHistory};
