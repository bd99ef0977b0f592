use crate::models::{Chapter, Content, Question};
use crate::persistence::{clear_saved_state, load_saved_state, save_state};
use crate::rules::{deterministic_options, DisplayOption};
use crate::session::{self, reduce, ChapterStats, Intent, Screen, SessionState};
use crate::state::KeyValueStore;
use crate::theme::{load_theme, save_theme, Theme};
use crate::view::SessionView;
use std::sync::Arc;
use tracing::{debug, info};

pub struct QuizEngine {
    content: Arc<Content>,
    store: Arc<dyn KeyValueStore>,
    state: SessionState,
    theme: Theme,
}

impl QuizEngine {
    /// Restores the saved session (if any) and theme from `store`.
    pub fn start(content: Arc<Content>, store: Arc<dyn KeyValueStore>) -> Self {
        let state = match load_saved_state(store.as_ref(), &content) {
            Some(restored) => {
                info!(
                    "restored saved session on screen {} (chapter {}, question {})",
                    restored.screen, restored.current_chapter_index, restored.current_question_index
                );
                save_state(store.as_ref(), &restored);
                restored
            }
            None => SessionState::fresh(&content.settings),
        };
        let theme = load_theme(store.as_ref());
        Self {
            content,
            store,
            state,
            theme,
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        save_theme(self.store.as_ref(), theme);
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        session::current_chapter(&self.state, &self.content)
    }

    pub fn current_question(&self) -> Option<&Question> {
        session::current_question(&self.state, &self.content)
    }

    pub fn display_options(&self) -> Vec<DisplayOption> {
        self.current_question()
            .map(|q| deterministic_options(&q.id, &q.options, self.content.settings.shuffle_options))
            .unwrap_or_default()
    }

    pub fn chapter_stats(&self, chapter_id: &str) -> ChapterStats {
        self.state.chapter_stats_for(chapter_id)
    }

    pub fn total_stats(&self) -> ChapterStats {
        ChapterStats {
            score: self.state.total_score,
            correct: self.state.total_correct,
            answered: self.state.total_answered,
        }
    }

    pub fn timer_active(&self) -> bool {
        session::timer_should_run(&self.state, &self.content)
    }

    pub fn view(&self) -> SessionView {
        SessionView::build(&self.state, &self.content, self.theme)
    }

    /// Applies one intent. Returns whether the session changed.
    pub fn dispatch(&mut self, intent: Intent) -> bool {
        let next = reduce(&self.state, intent, &self.content);
        if next == self.state {
            if intent != Intent::Tick {
                debug!("ignored {} on screen {}", intent.name(), self.state.screen);
            }
            return false;
        }

        if intent == Intent::Restart {
            clear_saved_state(self.store.as_ref());
        } else {
            save_state(self.store.as_ref(), &next);
        }
        if next.screen != self.state.screen {
            info!("screen {} -> {} via {}", self.state.screen, next.screen, intent.name());
        }
        if next.total_answered != self.state.total_answered {
            debug!(
                "answer recorded: correct={:?} points={} total_score={}",
                next.last_answer_correct, next.last_awarded_points, next.total_score
            );
        }
        self.state = next;
        true
    }

    pub fn start_quiz(&mut self) -> bool {
        self.dispatch(Intent::StartQuiz)
    }

    pub fn start_chapter(&mut self) -> bool {
        self.dispatch(Intent::StartChapter)
    }

    pub fn submit_answer(&mut self, selected_original_index: Option<usize>) -> bool {
        self.dispatch(Intent::SubmitAnswer {
            selected_original_index,
        })
    }

    pub fn advance(&mut self) -> bool {
        self.dispatch(Intent::Advance)
    }

    pub fn continue_after_summary(&mut self) -> bool {
        self.dispatch(Intent::ContinueAfterSummary)
    }

    pub fn restart(&mut self) -> bool {
        self.dispatch(Intent::Restart)
    }

    pub fn tick(&mut self) -> bool {
        self.dispatch(Intent::Tick)
    }
}
