//! Per-level cosmetic themes and the sources that produce them.

pub mod http;
pub mod model;
pub mod palette;
pub mod provider;

pub use http::HttpThemeProvider;
pub use model::{parse_hex_color, Theme};
pub use palette::PaletteThemeProvider;
pub use provider::{resolve_theme, ThemeError, ThemeProvider, ThemeUpdate};
