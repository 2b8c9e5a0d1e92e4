use std::time::{Duration, Instant};

/// Play clock for the current game; freezes when the game ends
pub struct GameMetrics {
    started_at: Option<Instant>,
    pub elapsed_time: Duration,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            started_at: None,
            elapsed_time: Duration::ZERO,
        }
    }

    pub fn update(&mut self) {
        if let Some(started_at) = self.started_at {
            self.elapsed_time = started_at.elapsed();
        }
    }

    pub fn on_game_start(&mut self) {
        self.started_at = Some(Instant::now());
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self) {
        self.update();
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_clock_freezes_on_game_over() {
        let mut metrics = GameMetrics::new();
        metrics.update();
        assert_eq!(metrics.elapsed_time, Duration::ZERO);

        metrics.on_game_start();
        std::thread::sleep(Duration::from_millis(20));
        metrics.on_game_over();
        let frozen = metrics.elapsed_time;
        assert!(frozen >= Duration::from_millis(20));
        assert!(!metrics.is_running());

        std::thread::sleep(Duration::from_millis(20));
        metrics.update();
        assert_eq!(metrics.elapsed_time, frozen);
    }
}
