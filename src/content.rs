use crate::error::{QuizError, Result};
use crate::models::{
    validate_content, Chapter, Content, ContentIssue, Question, QuizSettings, RevealConfig,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const CHAPTERS_FILE: &str = "chapters.json";
pub const QUESTIONS_FILE: &str = "questions.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const REVEAL_FILE: &str = "reveal.json";

const QUESTIONS_SCHEMA: &str = include_str!("../contracts/questions.schema.json");

pub fn load_content(dir: &Path) -> Result<Content> {
    let read = |name: &str| {
        let path = dir.join(name);
        fs::read_to_string(&path).map_err(|err| QuizError::io(path, err))
    };
    let content = parse_content(
        &read(CHAPTERS_FILE)?,
        &read(QUESTIONS_FILE)?,
        &read(SETTINGS_FILE)?,
        &read(REVEAL_FILE)?,
    )?;
    info!(
        "loaded {} chapters and {} questions from {}",
        content.chapters.len(),
        content.questions.len(),
        dir.display()
    );
    Ok(content)
}

pub fn parse_content(chapters: &str, questions: &str, settings: &str, reveal: &str) -> Result<Content> {
    let questions_value: Value =
        serde_json::from_str(questions).map_err(|err| QuizError::json(QUESTIONS_FILE, err))?;
    check_questions_schema(&questions_value)?;

    let content = Content::new(
        parse_file::<Vec<Chapter>>(CHAPTERS_FILE, chapters)?,
        serde_json::from_value::<Vec<Question>>(questions_value)
            .map_err(|err| QuizError::json(QUESTIONS_FILE, err))?,
        parse_file::<QuizSettings>(SETTINGS_FILE, settings)?,
        parse_file::<RevealConfig>(REVEAL_FILE, reveal)?,
    );
    validate_content(&content).map_err(QuizError::InvalidContent)?;

    let expected = content.settings.chapter_question_count as usize;
    for (idx, chapter) in content.chapters.iter().enumerate() {
        let actual = content.chapter_len(idx);
        if actual != expected {
            warn!(
                "chapter {} has {} questions, settings expect {}",
                chapter.id, actual, expected
            );
        }
    }
    Ok(content)
}

fn parse_file<T: DeserializeOwned>(file: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|err| QuizError::json(file, err))
}

fn check_questions_schema(instance: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(QUESTIONS_SCHEMA).map_err(|err| QuizError::json("questions schema", err))?;
    let compiled = jsonschema::draft202012::new(&schema).map_err(|err| QuizError::Schema {
        file: "questions schema".into(),
        issues: vec![ContentIssue::new("$schema", err.to_string())],
    })?;
    if compiled.validate(instance).is_ok() {
        return Ok(());
    }
    let issues = compiled
        .iter_errors(instance)
        .map(|e| ContentIssue::new(e.instance_path.to_string(), e.to_string()))
        .collect();
    Err(QuizError::Schema {
        file: QUESTIONS_FILE.into(),
        issues,
    })
}
