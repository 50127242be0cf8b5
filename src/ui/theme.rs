use super::Notifier;
use crate::platform::{DynStore, StorageError};
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_THEME_KEY: &str = "gallery_theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Icon and label of the toggle button.
    pub fn indicator(self) -> ThemeIndicator {
        match self {
            Theme::Dark => ThemeIndicator {
                icon: "🌙",
                label: "Dark",
            },
            Theme::Light => ThemeIndicator {
                icon: "☀️",
                label: "Light",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeIndicator {
    pub icon: &'static str,
    pub label: &'static str,
}

/// Theme preference kept in the durable store.
#[derive(Clone)]
pub struct ThemeService {
    store: DynStore,
    key: String,
    notifier: Notifier,
}

impl ThemeService {
    pub fn new(store: DynStore, key: impl Into<String>, notifier: Notifier) -> Self {
        Self {
            store,
            key: key.into(),
            notifier,
        }
    }

    pub async fn current(&self) -> Theme {
        match self.store.get_item(&self.key).await {
            Ok(Some(value)) => Theme::parse(&value).unwrap_or_else(|| {
                warn!("Unknown stored theme {:?}, using dark", value);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Could not read theme preference: {}", e);
                Theme::default()
            }
        }
    }

    pub async fn toggle(&self) -> Result<Theme, StorageError> {
        let theme = self.current().await.toggled();
        self.store
            .set_item(&self.key, theme.as_str().to_string())
            .await?;
        self.notifier
            .success(format!("Switched to {} theme", theme.as_str()))
            .await;
        Ok(theme)
    }
}
