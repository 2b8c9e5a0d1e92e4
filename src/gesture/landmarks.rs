use serde::{Deserialize, Serialize};

/// Index of the wrist in a 21-point hand skeleton
pub const WRIST: usize = 0;
/// Index of the index fingertip in a 21-point hand skeleton
pub const INDEX_FINGER_TIP: usize = 8;

/// One tracked point in normalized image coordinates ([0, 1] per axis)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// One video frame worth of detections, as emitted by the tracker process
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub hands: Vec<Vec<Landmark>>,
}

impl LandmarkFrame {
    /// Wrist and index fingertip of the first detected hand
    pub fn pointer(&self) -> Option<(Landmark, Landmark)> {
        let hand = self.hands.first()?;
        Some((*hand.get(WRIST)?, *hand.get(INDEX_FINGER_TIP)?))
    }
}
