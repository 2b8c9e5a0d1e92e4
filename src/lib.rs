//! Gesture Snake - terminal Snake steered by keyboard or hand gestures
//!
//! This library provides:
//! - Core game logic (game module) and the per-session controller (session)
//! - Hand-gesture input from an external landmark tracker (gesture module)
//! - Per-level themes from a theme service or built-in palettes (theme module)
//! - TUI rendering, keyboard input and the interactive play loop

pub mod config;
pub mod game;
pub mod gesture;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod session;
pub mod theme;
