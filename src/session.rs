use crate::models::{Chapter, Content, Question, QuizSettings};
use crate::rules::{
    calculate_points, clamp_question_index, next_screen_after_question, next_screen_after_summary,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    #[default]
    Intro,
    ChapterSelect,
    Question,
    ChapterSummary,
    Final,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Intro,
        Screen::ChapterSelect,
        Screen::Question,
        Screen::ChapterSummary,
        Screen::Final,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Intro => "intro",
            Screen::ChapterSelect => "chapterSelect",
            Screen::Question => "question",
            Screen::ChapterSummary => "chapterSummary",
            Screen::Final => "final",
        }
    }

    pub fn parse(raw: &str) -> Option<Screen> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterStats {
    pub score: u32,
    pub correct: u32,
    pub answered: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub screen: Screen,
    pub current_chapter_index: usize,
    pub current_question_index: usize,
    pub total_score: u32,
    pub total_correct: u32,
    pub total_answered: u32,
    pub chapter_stats: BTreeMap<String, ChapterStats>,
    pub answered_question_ids: Vec<String>,
    pub question_locked: bool,
    pub selected_original_option_index: Option<usize>,
    pub last_answer_correct: Option<bool>,
    pub last_awarded_points: u32,
    pub timer_remaining: u32,
}

impl SessionState {
    pub fn fresh(settings: &QuizSettings) -> Self {
        Self {
            screen: Screen::Intro,
            current_chapter_index: 0,
            current_question_index: 0,
            total_score: 0,
            total_correct: 0,
            total_answered: 0,
            chapter_stats: BTreeMap::new(),
            answered_question_ids: Vec::new(),
            question_locked: false,
            selected_original_option_index: None,
            last_answer_correct: None,
            last_awarded_points: 0,
            timer_remaining: settings.question_time_limit_seconds,
        }
    }

    pub fn chapter_stats_for(&self, chapter_id: &str) -> ChapterStats {
        self.chapter_stats.get(chapter_id).copied().unwrap_or_default()
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answered_question_ids.iter().any(|id| id == question_id)
    }

    fn reset_per_question(mut self, settings: &QuizSettings) -> Self {
        self.question_locked = false;
        self.selected_original_option_index = None;
        self.last_answer_correct = None;
        self.last_awarded_points = 0;
        self.timer_remaining = settings.question_time_limit_seconds;
        self
    }

    /// Pulls both cursors back into the bounds of the given content.
    pub fn clamp_cursors(mut self, content: &Content) -> Self {
        let last_chapter = content.chapters.len().saturating_sub(1);
        self.current_chapter_index = self.current_chapter_index.min(last_chapter);
        self.current_question_index = clamp_question_index(
            self.current_question_index,
            content.chapter_len(self.current_chapter_index),
        );
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    StartQuiz,
    StartChapter,
    SubmitAnswer { selected_original_index: Option<usize> },
    Advance,
    ContinueAfterSummary,
    Restart,
    Tick,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::StartQuiz => "start_quiz",
            Intent::StartChapter => "start_chapter",
            Intent::SubmitAnswer { .. } => "submit_answer",
            Intent::Advance => "advance",
            Intent::ContinueAfterSummary => "continue_after_summary",
            Intent::Restart => "restart",
            Intent::Tick => "tick",
        }
    }
}

pub fn current_chapter<'a>(state: &SessionState, content: &'a Content) -> Option<&'a Chapter> {
    content.chapter(state.current_chapter_index)
}

pub fn current_question<'a>(state: &SessionState, content: &'a Content) -> Option<&'a Question> {
    let chapter = current_chapter(state, content)?;
    let questions = content.chapter_questions(&chapter.id);
    let idx = clamp_question_index(state.current_question_index, questions.len());
    questions.get(idx).copied()
}

/// Whether the one-second countdown should be running for this state.
pub fn timer_should_run(state: &SessionState, content: &Content) -> bool {
    content.settings.timer_enabled
        && state.screen == Screen::Question
        && !state.question_locked
        && current_question(state, content).is_some()
}

/// Applies one intent. A failed guard returns an unchanged copy.
pub fn reduce(state: &SessionState, intent: Intent, content: &Content) -> SessionState {
    let settings = &content.settings;
    match intent {
        Intent::StartQuiz => {
            if state.screen != Screen::Intro {
                return state.clone();
            }
            SessionState {
                screen: Screen::ChapterSelect,
                timer_remaining: settings.question_time_limit_seconds,
                ..state.clone()
            }
        }
        Intent::StartChapter => {
            if state.screen != Screen::ChapterSelect {
                return state.clone();
            }
            SessionState {
                screen: Screen::Question,
                ..state.clone()
            }
            .reset_per_question(settings)
        }
        Intent::SubmitAnswer {
            selected_original_index,
        } => submit_answer(state, selected_original_index, content),
        Intent::Advance => advance(state, content),
        Intent::ContinueAfterSummary => {
            if state.screen != Screen::ChapterSummary {
                return state.clone();
            }
            match next_screen_after_summary(state.current_chapter_index, content.chapters.len()) {
                Screen::Final => SessionState {
                    screen: Screen::Final,
                    ..state.clone()
                },
                next => SessionState {
                    screen: next,
                    current_chapter_index: state.current_chapter_index + 1,
                    current_question_index: 0,
                    ..state.clone()
                }
                .reset_per_question(settings),
            }
        }
        Intent::Restart => {
            if state.screen == Screen::Intro {
                return state.clone();
            }
            SessionState::fresh(settings)
        }
        Intent::Tick => {
            if !timer_should_run(state, content) {
                return state.clone();
            }
            let remaining = state.timer_remaining.saturating_sub(1);
            let ticked = SessionState {
                timer_remaining: remaining,
                ..state.clone()
            };
            if remaining == 0 {
                submit_answer(&ticked, None, content)
            } else {
                ticked
            }
        }
    }
}

fn submit_answer(state: &SessionState, selected: Option<usize>, content: &Content) -> SessionState {
    if state.screen != Screen::Question || state.question_locked {
        return state.clone();
    }
    let (Some(chapter), Some(question)) = (
        current_chapter(state, content),
        current_question(state, content),
    ) else {
        return state.clone();
    };
    if state.is_answered(&question.id) {
        return state.clone();
    }
    if selected.is_some_and(|idx| idx >= question.options.len()) {
        return state.clone();
    }

    let is_correct = question.is_correct(selected);
    let points = calculate_points(is_correct, i64::from(state.timer_remaining), &content.settings);
    let correct_inc = u32::from(is_correct);

    let mut next = state.clone();
    next.question_locked = true;
    next.selected_original_option_index = selected;
    next.last_answer_correct = Some(is_correct);
    next.last_awarded_points = points;
    next.total_score = next.total_score.saturating_add(points);
    next.total_correct = next.total_correct.saturating_add(correct_inc);
    next.total_answered = next.total_answered.saturating_add(1);
    let stats = next.chapter_stats.entry(chapter.id.clone()).or_default();
    stats.score = stats.score.saturating_add(points);
    stats.correct = stats.correct.saturating_add(correct_inc);
    stats.answered = stats.answered.saturating_add(1);
    next.answered_question_ids.push(question.id.clone());
    next
}

fn advance(state: &SessionState, content: &Content) -> SessionState {
    if state.screen != Screen::Question || !state.question_locked {
        return state.clone();
    }
    if current_question(state, content).is_none() {
        return state.clone();
    }
    let chapter_len = content.chapter_len(state.current_chapter_index);
    let idx = clamp_question_index(state.current_question_index, chapter_len);

    match next_screen_after_question(idx, chapter_len) {
        Screen::Question => SessionState {
            current_question_index: idx + 1,
            ..state.clone()
        }
        .reset_per_question(&content.settings),
        next => SessionState {
            screen: next,
            ..state.clone()
        },
    }
}
