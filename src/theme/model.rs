use serde::{Deserialize, Serialize};

use super::ThemeError;

/// Cosmetic bundle applied per level. Colors are `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub background: String,
    pub grid: String,
    pub snake_head: String,
    pub snake_body: String,
    pub food: String,
    pub text: String,
    pub story: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "Neon Classic".to_string(),
            background: "#0f0f1a".to_string(),
            grid: "#1e1e2e".to_string(),
            snake_head: "#00ffcc".to_string(),
            snake_body: "#00cc99".to_string(),
            food: "#ff3366".to_string(),
            text: "#e0e0ff".to_string(),
            story: "The grid hums to life. Eat, grow, survive.".to_string(),
        }
    }
}

impl Theme {
    /// Default palette renamed to signal that the theme service was unreachable
    pub fn offline_fallback(level: u32) -> Self {
        Self {
            name: format!("Offline Mode - Level {level}"),
            story: "The theme link is down. Running on backup colors.".to_string(),
            ..Self::default()
        }
    }

    /// Check that every field is present and every color parses
    pub fn validate(&self) -> Result<(), ThemeError> {
        if self.name.trim().is_empty() {
            return Err(ThemeError::Invalid("empty theme name".to_string()));
        }

        let colors = [
            ("background", &self.background),
            ("grid", &self.grid),
            ("snake_head", &self.snake_head),
            ("snake_body", &self.snake_body),
            ("food", &self.food),
            ("text", &self.text),
        ];
        for (field, value) in colors {
            if parse_hex_color(value).is_none() {
                return Err(ThemeError::Invalid(format!(
                    "{field} is not a #rrggbb color: {value:?}"
                )));
            }
        }

        Ok(())
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into its components
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_is_valid() {
        assert!(Theme::default().validate().is_ok());
    }

    #[test]
    fn test_offline_fallback_keeps_default_colors() {
        let theme = Theme::offline_fallback(3);
        let default = Theme::default();
        assert_eq!(theme.name, "Offline Mode - Level 3");
        assert_eq!(theme.snake_head, default.snake_head);
        assert_eq!(theme.food, default.food);
        assert_ne!(theme.story, default.story);
        assert!(theme.validate().is_ok());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff3366"), Some((255, 51, 102)));
        assert_eq!(parse_hex_color("00FF00"), Some((0, 255, 0)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_invalid_color_rejected() {
        let theme = Theme {
            food: "red".to_string(),
            ..Theme::default()
        };
        assert!(matches!(theme.validate(), Err(ThemeError::Invalid(_))));
    }
}
