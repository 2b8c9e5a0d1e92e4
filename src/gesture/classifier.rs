//! Wrist-to-fingertip pointing classifier.
//!
//! The camera frame is not mirrored while the player sees a mirrored view,
//! so the horizontal sign is flipped: a fingertip left of the wrist in frame
//! coordinates means "right" to the player.

use crate::game::Direction;

use super::landmarks::{Landmark, LandmarkFrame};

/// Minimum wrist-to-tip displacement, in normalized units, that counts as pointing
pub const DEFAULT_SENSITIVITY: f32 = 0.08;

/// Map a wrist/index-tip pair to a direction, or `None` below the sensitivity
pub fn classify(wrist: Landmark, index_tip: Landmark, sensitivity: f32) -> Option<Direction> {
    let dx = index_tip.x - wrist.x;
    let dy = index_tip.y - wrist.y;

    if dy.abs() > dx.abs() {
        if dy.abs() <= sensitivity {
            return None;
        }
        Some(if dy < -sensitivity {
            Direction::Up
        } else {
            Direction::Down
        })
    } else {
        if dx.abs() <= sensitivity {
            return None;
        }
        Some(if dx < -sensitivity {
            Direction::Right
        } else {
            Direction::Left
        })
    }
}

/// Per-stream classifier that skips frames it has already seen
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    sensitivity: f32,
    last_timestamp: Option<u64>,
}

impl GestureClassifier {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            last_timestamp: None,
        }
    }

    /// Classify a frame; repeated timestamps and frames without a hand yield `None`
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Option<Direction> {
        if self.last_timestamp == Some(frame.timestamp_ms) {
            return None;
        }
        self.last_timestamp = Some(frame.timestamp_ms);

        let (wrist, tip) = frame.pointer()?;
        classify(wrist, tip, self.sensitivity)
    }

    pub fn reset(&mut self) {
        self.last_timestamp = None;
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}
