use std::collections::VecDeque;

/// Result of one finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEntry {
    pub game_id: u64,
    pub score: u32,
    pub level: u32,
}

/// Most recent game results, oldest first, capped at `capacity`
#[derive(Debug, Clone)]
pub struct ScoreHistory {
    entries: VecDeque<ScoreEntry>,
    capacity: usize,
    games_played: u32,
    best: u32,
}

impl ScoreHistory {
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            games_played: 0,
            best: 0,
        }
    }

    pub fn record(&mut self, entry: ScoreEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.games_played += 1;
        self.best = self.best.max(entry.score);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ScoreEntry> {
        self.entries.back()
    }

    /// Best score this session, including games already evicted
    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }
}

impl Default for ScoreHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(game_id: u64, score: u32) -> ScoreEntry {
        ScoreEntry {
            game_id,
            score,
            level: score / 50 + 1,
        }
    }

    #[test]
    fn test_history_is_capped_at_ten() {
        let mut history = ScoreHistory::new();
        for id in 1..=13 {
            history.record(entry(id, id as u32 * 10));
        }

        assert_eq!(history.len(), 10);
        let ids: Vec<u64> = history.entries().map(|e| e.game_id).collect();
        assert_eq!(ids, (4..=13).collect::<Vec<_>>());
        assert_eq!(history.last().unwrap().game_id, 13);
        assert_eq!(history.games_played(), 13);
    }

    #[test]
    fn test_best_survives_eviction() {
        let mut history = ScoreHistory::with_capacity(2);
        history.record(entry(1, 500));
        history.record(entry(2, 10));
        history.record(entry(3, 20));

        assert!(history.entries().all(|e| e.score < 500));
        assert_eq!(history.best(), 500);
    }
}
