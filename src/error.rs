use crate::models::ContentIssue;
use serde::Serialize;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, QuizError>;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{file} does not match its schema ({} issues)", .issues.len())]
    Schema {
        file: String,
        issues: Vec<ContentIssue>,
    },
    #[error("quiz content validation failed ({} issues)", .0.len())]
    InvalidContent(Vec<ContentIssue>),
}

impl QuizError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            QuizError::Io { .. } => "IO_ERROR",
            QuizError::Json { .. } => "INVALID_JSON",
            QuizError::Schema { .. } => "SCHEMA_ERROR",
            QuizError::InvalidContent(_) => "VALIDATION_ERROR",
        }
    }

    pub fn issues(&self) -> &[ContentIssue] {
        match self {
            QuizError::Schema { issues, .. } | QuizError::InvalidContent(issues) => issues,
            _ => &[],
        }
    }
}

/// Body of an `error` envelope sent back to the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ContentIssue>,
}

impl ErrorPayload {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<ContentIssue>) -> Self {
        self.details = details;
        self
    }
}

impl From<&QuizError> for ErrorPayload {
    fn from(err: &QuizError) -> Self {
        ErrorPayload::new(err.code(), err.to_string()).with_details(err.issues().to_vec())
    }
}
