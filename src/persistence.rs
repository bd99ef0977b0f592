use crate::models::Content;
use crate::session::{ChapterStats, Screen, SessionState};
use crate::state::KeyValueStore;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

pub const SESSION_STORAGE_KEY: &str = "our-moments-quiz-state-v1";

pub fn load_saved_state(store: &dyn KeyValueStore, content: &Content) -> Option<SessionState> {
    let raw = match store.get(SESSION_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("failed to read saved session: {}", err);
            return None;
        }
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(err) => {
            debug!("saved session is not valid json: {}", err);
            return None;
        }
    };
    let Some(obj) = value.as_object() else {
        debug!("saved session is not a json object");
        return None;
    };
    Some(reconcile(obj, content))
}

pub fn save_state(store: &dyn KeyValueStore, state: &SessionState) {
    let serialized = match serde_json::to_string(state) {
        Ok(s) => s,
        Err(err) => {
            warn!("failed to serialize session: {}", err);
            return;
        }
    };
    if let Err(err) = store.set(SESSION_STORAGE_KEY, &serialized) {
        warn!("failed to persist session: {}", err);
    }
}

pub fn clear_saved_state(store: &dyn KeyValueStore) {
    if let Err(err) = store.remove(SESSION_STORAGE_KEY) {
        warn!("failed to clear saved session: {}", err);
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(err) => {
            debug!("ignoring saved field {}: {}", key, err);
            None
        }
    }
}

/// Rebuilds a session from a stored object. Fields that are missing or of the
/// wrong shape keep their fresh-state value; cursors are clamped to the
/// content that is loaded now.
pub fn reconcile(obj: &Map<String, Value>, content: &Content) -> SessionState {
    let settings = &content.settings;
    let fresh = SessionState::fresh(settings);

    let screen = field::<String>(obj, "screen")
        .and_then(|s| Screen::parse(&s))
        .unwrap_or(fresh.screen);
    let chapter_index = field::<i64>(obj, "currentChapterIndex").unwrap_or(0).max(0) as usize;
    let question_index = field::<i64>(obj, "currentQuestionIndex").unwrap_or(0).max(0) as usize;
    let timer_remaining = field::<i64>(obj, "timerRemaining")
        .filter(|&t| t > 0)
        .map(|t| t.min(i64::from(u32::MAX)) as u32)
        .unwrap_or(settings.question_time_limit_seconds);

    let mut seen = HashSet::new();
    let answered_question_ids: Vec<String> = field::<Vec<String>>(obj, "answeredQuestionIds")
        .unwrap_or_default()
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();

    SessionState {
        screen,
        current_chapter_index: chapter_index,
        current_question_index: question_index,
        total_score: field(obj, "totalScore").unwrap_or(fresh.total_score),
        total_correct: field(obj, "totalCorrect").unwrap_or(fresh.total_correct),
        total_answered: field(obj, "totalAnswered").unwrap_or(fresh.total_answered),
        chapter_stats: field::<BTreeMap<String, ChapterStats>>(obj, "chapterStats")
            .unwrap_or_default(),
        answered_question_ids,
        question_locked: field(obj, "questionLocked").unwrap_or(fresh.question_locked),
        selected_original_option_index: field::<Option<usize>>(obj, "selectedOriginalOptionIndex")
            .flatten(),
        last_answer_correct: field::<Option<bool>>(obj, "lastAnswerCorrect").flatten(),
        last_awarded_points: field(obj, "lastAwardedPoints").unwrap_or(fresh.last_awarded_points),
        timer_remaining,
    }
    .clamp_cursors(content)
}
