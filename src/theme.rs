use crate::state::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const THEME_STORAGE_KEY: &str = "our-moments-theme-v1";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Valentine,
    SoftPeach,
    GreenValentine,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Valentine, Theme::SoftPeach, Theme::GreenValentine];

    pub fn id(self) -> &'static str {
        match self {
            Theme::Valentine => "valentine",
            Theme::SoftPeach => "soft-peach",
            Theme::GreenValentine => "green-valentine",
        }
    }

    pub fn parse(raw: &str) -> Option<Theme> {
        Self::ALL.into_iter().find(|t| t.id() == raw.trim())
    }
}

/// Unknown or unreadable values fall back to the default theme.
pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_STORAGE_KEY) {
        Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_default(),
        Ok(None) => Theme::default(),
        Err(err) => {
            warn!("failed to read theme: {}", err);
            Theme::default()
        }
    }
}

pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) {
    if let Err(err) = store.set(THEME_STORAGE_KEY, theme.id()) {
        warn!("failed to persist theme: {}", err);
    }
}
