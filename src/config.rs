use crate::theme::Theme;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub content_dir: PathBuf,
    /// `None` keeps the session in memory only.
    pub state_path: Option<PathBuf>,
    pub theme: Option<Theme>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let content_dir = lookup("QUIZ_CONTENT_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| manifest_dir.join("content"));
        let state_path = match lookup("LOCAL_STATE_PATH") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(PathBuf::from(v)),
            None => Some(manifest_dir.join("local_state.json")),
        };
        let theme = lookup("QUIZ_THEME")
            .filter(|v| !v.trim().is_empty())
            .and_then(|raw| {
                let parsed = Theme::parse(&raw);
                if parsed.is_none() {
                    warn!("ignoring unknown QUIZ_THEME {}", raw);
                }
                parsed
            });

        Self {
            content_dir,
            state_path,
            theme,
        }
    }
}
