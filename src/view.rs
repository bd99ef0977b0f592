use crate::models::{chapter_number, Chapter, Content, MomentCard, RevealConfig};
use crate::rules::{
    calculate_accuracy, clamp_question_index, deterministic_options, progress_percent, DisplayOption,
};
use crate::session::{
    current_chapter, current_question, timer_should_run, ChapterStats, Screen, SessionState,
};
use crate::theme::Theme;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStatus {
    Completed,
    Current,
    Locked,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterEntry {
    pub id: String,
    pub number: String,
    pub title: String,
    pub description: String,
    pub status: ChapterStatus,
    pub correct: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub id: String,
    pub number: String,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub stats: ChapterStats,
    pub accuracy: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub correct: bool,
    pub awarded_points: u32,
    pub correct_original_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moment_card: Option<MomentCard>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub number: usize,
    pub text: String,
    pub options: Vec<DisplayOption>,
    pub progress_percent: u32,
    pub locked: bool,
    pub selected_original_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub enabled: bool,
    pub running: bool,
    pub remaining: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TotalsView {
    pub score: u32,
    pub correct: u32,
    pub answered: u32,
    pub accuracy: u32,
    pub question_count: usize,
    pub progress_percent: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevealView {
    #[serde(flatten)]
    pub config: RevealConfig,
    pub easter_egg_unlocked: bool,
}

/// Everything the presentation layer needs to draw the active screen.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub screen: Screen,
    pub theme: Theme,
    pub chapters: Vec<ChapterEntry>,
    pub chapter: Option<ChapterView>,
    pub question: Option<QuestionView>,
    pub timer: TimerView,
    pub totals: TotalsView,
    pub reveal: Option<RevealView>,
}

impl SessionView {
    pub fn build(state: &SessionState, content: &Content, theme: Theme) -> Self {
        let settings = &content.settings;
        let question = if state.screen == Screen::Question {
            question_view(state, content)
        } else {
            None
        };
        let reveal = (state.screen == Screen::Final).then(|| RevealView {
            config: content.reveal.clone(),
            easter_egg_unlocked: content.reveal.easter_egg_unlocked(state.total_score),
        });

        SessionView {
            screen: state.screen,
            theme,
            chapters: chapter_entries(state, content),
            chapter: current_chapter(state, content).map(|c| chapter_view(c, state, content)),
            question,
            timer: TimerView {
                enabled: settings.timer_enabled,
                running: timer_should_run(state, content),
                remaining: state.timer_remaining,
                limit: settings.question_time_limit_seconds,
            },
            totals: TotalsView {
                score: state.total_score,
                correct: state.total_correct,
                answered: state.total_answered,
                accuracy: calculate_accuracy(state.total_correct, state.total_answered),
                question_count: content.total_question_count(),
                progress_percent: progress_percent(
                    state.total_answered,
                    u32::try_from(content.total_question_count()).unwrap_or(u32::MAX),
                ),
            },
            reveal,
        }
    }
}

fn chapter_entries(state: &SessionState, content: &Content) -> Vec<ChapterEntry> {
    content
        .chapters
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let status = if idx < state.current_chapter_index {
                ChapterStatus::Completed
            } else if idx == state.current_chapter_index {
                ChapterStatus::Current
            } else {
                ChapterStatus::Locked
            };
            ChapterEntry {
                id: c.id.clone(),
                number: chapter_number(c, idx),
                title: c.title.clone(),
                description: c.description.clone(),
                status,
                correct: state.chapter_stats_for(&c.id).correct,
            }
        })
        .collect()
}

fn chapter_view(chapter: &Chapter, state: &SessionState, content: &Content) -> ChapterView {
    let stats = state.chapter_stats_for(&chapter.id);
    ChapterView {
        id: chapter.id.clone(),
        number: chapter_number(chapter, state.current_chapter_index),
        title: chapter.title.clone(),
        description: chapter.description.clone(),
        question_count: content.chapter_len(state.current_chapter_index),
        stats,
        accuracy: calculate_accuracy(stats.correct, stats.answered),
    }
}

fn question_view(state: &SessionState, content: &Content) -> Option<QuestionView> {
    let question = current_question(state, content)?;
    let chapter_len = content.chapter_len(state.current_chapter_index);
    let number = clamp_question_index(state.current_question_index, chapter_len) + 1;

    let feedback = state.question_locked.then(|| Feedback {
        correct: state.last_answer_correct.unwrap_or(false),
        awarded_points: state.last_awarded_points,
        correct_original_index: question.correct_option_index,
        explanation: question.explanation.clone(),
        moment_card: question.moment_card.clone(),
    });

    Some(QuestionView {
        id: question.id.clone(),
        number,
        text: question.text.clone(),
        options: deterministic_options(
            &question.id,
            &question.options,
            content.settings.shuffle_options,
        ),
        progress_percent: progress_percent(number as u32, chapter_len as u32),
        locked: state.question_locked,
        selected_original_index: state.selected_original_option_index,
        feedback,
    })
}
