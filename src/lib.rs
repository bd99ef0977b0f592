pub mod config;
pub mod content;
pub mod driver;
pub mod engine;
pub mod error;
pub mod models;
pub mod persistence;
pub mod protocol;
pub mod rules;
pub mod session;
pub mod state;
pub mod theme;
pub mod view;

use std::sync::Arc;

pub fn build_engine(config: &config::AppConfig) -> error::Result<engine::QuizEngine> {
    let content = content::load_content(&config.content_dir)?;
    let store: Arc<dyn state::KeyValueStore> = match &config.state_path {
        Some(path) => Arc::new(state::FileStore::new(path)),
        None => Arc::new(state::MemoryStore::new()),
    };
    let mut engine = engine::QuizEngine::start(Arc::new(content), store);
    if let Some(theme) = config.theme {
        engine.set_theme(theme);
    }
    Ok(engine)
}
