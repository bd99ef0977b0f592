use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use validator::Validate;

static TRAILING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)$").expect("static regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MomentCard {
    pub image: String,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub chapter_id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moment_card: Option<MomentCard>,
}

impl Question {
    /// A missing selection (timeout) never matches.
    pub fn is_correct(&self, selected_original_index: Option<usize>) -> bool {
        selected_original_index == Some(self.correct_option_index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    #[validate(range(min = 1))]
    pub chapter_question_count: u32,
    pub base_points_per_correct: u32,
    pub timer_enabled: bool,
    pub question_time_limit_seconds: u32,
    pub timer_bonus_max_points: u32,
    pub shuffle_options: bool,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            chapter_question_count: 10,
            base_points_per_correct: 1,
            timer_enabled: false,
            question_time_limit_seconds: 20,
            timer_bonus_max_points: 1,
            shuffle_options: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct RevealLink {
    #[validate(length(min = 1))]
    pub label: String,
    #[validate(url)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EasterEgg {
    pub min_score: u32,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevealConfig {
    pub title: String,
    pub message: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<RevealLink>,
    pub easter_egg: EasterEgg,
}

impl RevealConfig {
    pub fn easter_egg_unlocked(&self, total_score: u32) -> bool {
        total_score >= self.easter_egg.min_score
    }
}

/// Read-only quiz content: chapters in play order, their questions, and the
/// settings and reveal screen that go with them.
#[derive(Debug, Clone)]
pub struct Content {
    pub chapters: Vec<Chapter>,
    pub questions: Vec<Question>,
    pub settings: QuizSettings,
    pub reveal: RevealConfig,
    by_chapter: HashMap<String, Vec<usize>>,
}

impl Content {
    pub fn new(
        chapters: Vec<Chapter>,
        questions: Vec<Question>,
        settings: QuizSettings,
        reveal: RevealConfig,
    ) -> Self {
        let mut by_chapter: HashMap<String, Vec<usize>> = chapters
            .iter()
            .map(|c| (c.id.clone(), Vec::new()))
            .collect();
        for (idx, q) in questions.iter().enumerate() {
            if let Some(list) = by_chapter.get_mut(&q.chapter_id) {
                list.push(idx);
            }
        }
        Self {
            chapters,
            questions,
            settings,
            reveal,
            by_chapter,
        }
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Questions of a chapter in content order. Unknown chapters have none.
    pub fn chapter_questions(&self, chapter_id: &str) -> Vec<&Question> {
        self.by_chapter
            .get(chapter_id)
            .map(|ids| ids.iter().map(|&i| &self.questions[i]).collect())
            .unwrap_or_default()
    }

    pub fn chapter_len(&self, chapter_index: usize) -> usize {
        self.chapter(chapter_index)
            .and_then(|c| self.by_chapter.get(&c.id))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn total_question_count(&self) -> usize {
        self.questions.len()
    }
}

/// Display number of a chapter: trailing digits of its id, else its 1-based position.
pub fn chapter_number(chapter: &Chapter, fallback_index: usize) -> String {
    TRAILING_DIGITS
        .captures(&chapter.id)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| (fallback_index + 1).to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentIssue {
    pub field: String,
    pub issue: String,
}

impl ContentIssue {
    pub fn new(field: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            issue: issue.into(),
        }
    }
}

impl std::fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.issue)
    }
}

pub fn validate_content(content: &Content) -> Result<(), Vec<ContentIssue>> {
    let mut issues = Vec::new();

    if let Err(err) = content.settings.validate() {
        issues.push(ContentIssue::new("settings", err.to_string()));
    }
    if let Some(link) = &content.reveal.link {
        if let Err(err) = link.validate() {
            issues.push(ContentIssue::new("reveal.link", err.to_string()));
        }
    }

    if content.chapters.is_empty() {
        issues.push(ContentIssue::new(
            "chapters",
            "must contain at least one chapter",
        ));
    }
    let mut chapter_ids = HashSet::new();
    for (i, c) in content.chapters.iter().enumerate() {
        if c.id.trim().is_empty() {
            issues.push(ContentIssue::new(format!("chapters[{i}].id"), "must not be empty"));
        }
        if !chapter_ids.insert(c.id.as_str()) {
            issues.push(ContentIssue::new(format!("chapters[{i}].id"), "must be unique"));
        }
        if c.title.trim().is_empty() {
            issues.push(ContentIssue::new(format!("chapters[{i}].title"), "must not be empty"));
        }
    }

    let mut question_ids = HashSet::new();
    for (i, q) in content.questions.iter().enumerate() {
        if q.id.trim().is_empty() {
            issues.push(ContentIssue::new(format!("questions[{i}].id"), "must not be empty"));
        }
        if !question_ids.insert(q.id.as_str()) {
            issues.push(ContentIssue::new(format!("questions[{i}].id"), "must be unique"));
        }
        if !chapter_ids.contains(q.chapter_id.as_str()) {
            issues.push(ContentIssue::new(
                format!("questions[{i}].chapterId"),
                "must reference existing chapter id",
            ));
        }
        if q.text.trim().is_empty() {
            issues.push(ContentIssue::new(format!("questions[{i}].text"), "must not be empty"));
        }
        if q.options.len() < 2 {
            issues.push(ContentIssue::new(
                format!("questions[{i}].options"),
                "must contain at least 2 options",
            ));
        }
        for (j, opt) in q.options.iter().enumerate() {
            if opt.trim().is_empty() {
                issues.push(ContentIssue::new(
                    format!("questions[{i}].options[{j}]"),
                    "must not be empty",
                ));
            }
        }
        if q.correct_option_index >= q.options.len() {
            issues.push(ContentIssue::new(
                format!("questions[{i}].correctOptionIndex"),
                "must reference an existing option",
            ));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
