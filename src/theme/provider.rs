use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use super::Theme;

/// Errors from a theme source
#[derive(Debug, Error)]
pub enum ThemeError {
    /// Endpoint URI is unusable
    #[error("invalid theme endpoint: {0}")]
    Endpoint(String),

    /// Connection or transport failure
    #[error("connection failed: {0}")]
    Connection(String),

    /// The service did not answer in time
    #[error("theme request timed out")]
    Timeout,

    /// Non-success HTTP status
    #[error("theme service returned status {0}")]
    Status(u16),

    /// Body was not a theme
    #[error("malformed theme response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Theme parsed but fails validation
    #[error("invalid theme: {0}")]
    Invalid(String),
}

/// Source of per-level themes
#[async_trait]
pub trait ThemeProvider: Send + Sync {
    /// Produce a theme for `level`, given the name of the theme it replaces
    async fn fetch(&self, level: u32, previous_theme: &str) -> Result<Theme, ThemeError>;
}

/// A theme answer tagged with the game and level that requested it
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeUpdate {
    pub game_id: u64,
    pub level: u32,
    pub theme: Theme,
}

/// Fetch a theme, substituting the offline fallback on any failure
pub async fn resolve_theme(
    provider: &dyn ThemeProvider,
    level: u32,
    previous_theme: &str,
) -> Theme {
    let result = provider
        .fetch(level, previous_theme)
        .await
        .and_then(|theme| theme.validate().map(|_| theme));

    match result {
        Ok(theme) => {
            debug!(level, name = %theme.name, "theme fetched");
            theme
        }
        Err(e) => {
            warn!(level, error = %e, "theme fetch failed, using offline theme");
            Theme::offline_fallback(level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl ThemeProvider for FailingProvider {
        async fn fetch(&self, _level: u32, _previous: &str) -> Result<Theme, ThemeError> {
            Err(ThemeError::Timeout)
        }
    }

    struct BrokenColorsProvider;

    #[async_trait]
    impl ThemeProvider for BrokenColorsProvider {
        async fn fetch(&self, _level: u32, _previous: &str) -> Result<Theme, ThemeError> {
            Ok(Theme {
                snake_head: "not-a-color".to_string(),
                ..Theme::default()
            })
        }
    }

    struct EchoProvider;

    #[async_trait]
    impl ThemeProvider for EchoProvider {
        async fn fetch(&self, level: u32, previous: &str) -> Result<Theme, ThemeError> {
            Ok(Theme {
                name: format!("{previous} +{level}"),
                ..Theme::default()
            })
        }
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_offline_theme() {
        let theme = resolve_theme(&FailingProvider, 4, "Neon Classic").await;
        assert_eq!(theme, Theme::offline_fallback(4));
    }

    #[tokio::test]
    async fn test_invalid_theme_falls_back() {
        let theme = resolve_theme(&BrokenColorsProvider, 2, "Neon Classic").await;
        assert_eq!(theme.name, "Offline Mode - Level 2");
    }

    #[tokio::test]
    async fn test_successful_fetch_passes_through() {
        let theme = resolve_theme(&EchoProvider, 3, "Lava").await;
        assert_eq!(theme.name, "Lava +3");
    }
}
