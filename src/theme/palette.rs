use async_trait::async_trait;

use super::{Theme, ThemeError, ThemeProvider};

/// Built-in rotating palettes for play without a theme service
#[derive(Debug, Clone)]
pub struct PaletteThemeProvider {
    palettes: Vec<Theme>,
}

impl PaletteThemeProvider {
    pub fn new() -> Self {
        Self {
            palettes: builtin_palettes(),
        }
    }

    pub fn with_palettes(palettes: Vec<Theme>) -> Self {
        Self { palettes }
    }

    /// Palette for a level, skipping the one currently shown
    pub fn pick(&self, level: u32, previous_theme: &str) -> Option<&Theme> {
        if self.palettes.is_empty() {
            return None;
        }

        let len = self.palettes.len();
        let start = level.saturating_sub(1) as usize % len;
        (0..len)
            .map(|offset| &self.palettes[(start + offset) % len])
            .find(|theme| theme.name != previous_theme)
            .or_else(|| self.palettes.get(start))
    }
}

impl Default for PaletteThemeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThemeProvider for PaletteThemeProvider {
    async fn fetch(&self, level: u32, previous_theme: &str) -> Result<Theme, ThemeError> {
        self.pick(level, previous_theme)
            .cloned()
            .ok_or_else(|| ThemeError::Invalid("no palettes configured".to_string()))
    }
}

fn palette(name: &str, colors: [&str; 6], story: &str) -> Theme {
    let [background, grid, snake_head, snake_body, food, text] = colors.map(str::to_string);
    Theme {
        name: name.to_string(),
        background,
        grid,
        snake_head,
        snake_body,
        food,
        text,
        story: story.to_string(),
    }
}

fn builtin_palettes() -> Vec<Theme> {
    vec![
        Theme::default(),
        palette(
            "Molten Core",
            ["#1a0800", "#2b1200", "#ffcc00", "#ff8800", "#ff2200", "#ffe0b0"],
            "The floor is lava and the snake is fireproof. Mostly.",
        ),
        palette(
            "Deep Reef",
            ["#001424", "#00263d", "#7fffd4", "#20b2aa", "#ff7f50", "#d0f0ff"],
            "Currents pull at every scale. Coral glows in the dark.",
        ),
        palette(
            "Circuit Forest",
            ["#08140a", "#102a14", "#b6ff00", "#4caf50", "#ff00aa", "#dfffd0"],
            "Moss grows over abandoned servers. Something hungry moves between them.",
        ),
        palette(
            "Frost Byte",
            ["#0a1020", "#18223a", "#ffffff", "#9ad0ff", "#ff4d6d", "#e8f4ff"],
            "Every move leaves frost behind. Keep moving.",
        ),
    ]
}
