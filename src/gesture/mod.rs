//! Hand-gesture input: landmark frames, the pointing classifier and the
//! tracker process that owns the camera.

pub mod classifier;
pub mod landmarks;
pub mod tracker;

pub use classifier::{classify, GestureClassifier, DEFAULT_SENSITIVITY};
pub use landmarks::{Landmark, LandmarkFrame};
pub use tracker::{GestureStatus, HandTracker, TrackerError};
