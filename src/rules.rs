use crate::models::QuizSettings;
use crate::session::Screen;
use serde::{Deserialize, Serialize};

const RANK_SEED: u32 = 2_166_136_261;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOption {
    pub text: String,
    pub original_index: usize,
}

/// Orders a question's options for display.
///
/// With shuffling enabled every option is ranked by [`seeded_rank`] of
/// `"{question_id}-{original_index}"` and the options are sorted by rank, so
/// the order depends only on the question id and the option count. With
/// shuffling disabled the original order is kept.
pub fn deterministic_options(
    question_id: &str,
    options: &[String],
    should_shuffle: bool,
) -> Vec<DisplayOption> {
    let indexed = options.iter().enumerate().map(|(idx, text)| DisplayOption {
        text: text.clone(),
        original_index: idx,
    });

    if !should_shuffle {
        return indexed.collect();
    }

    let mut ranked: Vec<(u32, DisplayOption)> = indexed
        .map(|opt| {
            let rank = seeded_rank(&format!("{}-{}", question_id, opt.original_index));
            (rank, opt)
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, opt)| opt).collect()
}

/// 32-bit FNV-1a style hash over UTF-16 code units.
pub fn seeded_rank(input: &str) -> u32 {
    let mut hash = RANK_SEED;
    for unit in input.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash
            .wrapping_add(hash << 1)
            .wrapping_add(hash << 4)
            .wrapping_add(hash << 7)
            .wrapping_add(hash << 8)
            .wrapping_add(hash << 24);
    }
    hash
}

pub fn calculate_points(is_correct: bool, time_left_seconds: i64, settings: &QuizSettings) -> u32 {
    if !is_correct {
        return 0;
    }
    if !settings.timer_enabled {
        return settings.base_points_per_correct;
    }

    let safe_limit = settings.question_time_limit_seconds.max(1) as f64;
    let normalized = (time_left_seconds as f64 / safe_limit).clamp(0.0, 1.0);
    let bonus = (normalized * settings.timer_bonus_max_points as f64).floor() as u32;
    settings.base_points_per_correct.saturating_add(bonus)
}

/// Rounded percentage of correct answers, 0 before anything was answered.
pub fn calculate_accuracy(correct: u32, answered: u32) -> u32 {
    progress_percent(correct, answered)
}

pub fn progress_percent(current: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (current as f64 / total as f64 * 100.0).round() as u32
}

pub fn clamp_question_index(index: usize, chapter_len: usize) -> usize {
    if chapter_len == 0 {
        return 0;
    }
    index.min(chapter_len - 1)
}

pub fn is_final_chapter(chapter_index: usize, chapter_count: usize) -> bool {
    chapter_index + 1 >= chapter_count
}

pub fn next_screen_after_question(question_index: usize, chapter_len: usize) -> Screen {
    if question_index + 1 < chapter_len {
        Screen::Question
    } else {
        Screen::ChapterSummary
    }
}

pub fn next_screen_after_summary(chapter_index: usize, chapter_count: usize) -> Screen {
    if is_final_chapter(chapter_index, chapter_count) {
        Screen::Final
    } else {
        Screen::ChapterSelect
    }
}
