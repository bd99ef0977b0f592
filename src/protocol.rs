use crate::error::ErrorPayload;
use crate::session::Intent;
use crate::theme::Theme;
use crate::view::SessionView;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl Envelope {
    fn outbound(event: &str, payload: Value, request_id: Option<String>) -> Self {
        Self {
            event: event.into(),
            payload,
            request_id,
            ts: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn view(view: &SessionView, request_id: Option<String>) -> Self {
        Self::outbound("view", serde_json::to_value(view).unwrap_or_default(), request_id)
    }

    pub fn error(error: &ErrorPayload, request_id: Option<String>) -> Self {
        Self::outbound("error", serde_json::to_value(error).unwrap_or_default(), request_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Apply(Intent),
    SetTheme(Theme),
    GetView,
}

pub fn parse_command(env: &Envelope) -> Result<Command, ErrorPayload> {
    let command = match env.event.as_str() {
        "start_quiz" => Command::Apply(Intent::StartQuiz),
        "start_chapter" => Command::Apply(Intent::StartChapter),
        "submit_answer" => Command::Apply(Intent::SubmitAnswer {
            selected_original_index: selected_index(&env.payload)?,
        }),
        "advance" => Command::Apply(Intent::Advance),
        "continue_after_summary" => Command::Apply(Intent::ContinueAfterSummary),
        "restart" => Command::Apply(Intent::Restart),
        "set_theme" => {
            let raw = env.payload.get("theme").and_then(Value::as_str).unwrap_or_default();
            let theme = Theme::parse(raw).ok_or_else(|| {
                ErrorPayload::new("INVALID_PAYLOAD", format!("unknown theme '{raw}'"))
            })?;
            Command::SetTheme(theme)
        }
        "get_view" => Command::GetView,
        other => {
            return Err(ErrorPayload::new(
                "UNKNOWN_EVENT",
                format!("unsupported event '{other}'"),
            ))
        }
    };
    Ok(command)
}

fn selected_index(payload: &Value) -> Result<Option<usize>, ErrorPayload> {
    match payload.get("selectedOriginalIndex") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                ErrorPayload::new(
                    "INVALID_PAYLOAD",
                    "selectedOriginalIndex must be a non-negative integer or null",
                )
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(raw: Value) -> Envelope {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn parses_intents() {
        let cmd = parse_command(&env(json!({"event": "submit_answer", "payload": {"selectedOriginalIndex": 2}})));
        assert_eq!(
            cmd.unwrap(),
            Command::Apply(Intent::SubmitAnswer {
                selected_original_index: Some(2)
            })
        );
        let timeout = parse_command(&env(json!({"event": "submit_answer"})));
        assert_eq!(
            timeout.unwrap(),
            Command::Apply(Intent::SubmitAnswer {
                selected_original_index: None
            })
        );
        assert_eq!(
            parse_command(&env(json!({"event": "continue_after_summary"}))).unwrap(),
            Command::Apply(Intent::ContinueAfterSummary)
        );
    }

    #[test]
    fn rejects_bad_payloads() {
        let err = parse_command(&env(json!({"event": "submit_answer", "payload": {"selectedOriginalIndex": -1}})))
            .unwrap_err();
        assert_eq!(err.code, "INVALID_PAYLOAD");
        let err = parse_command(&env(json!({"event": "set_theme", "payload": {"theme": "neon"}}))).unwrap_err();
        assert_eq!(err.code, "INVALID_PAYLOAD");
        let err = parse_command(&env(json!({"event": "tick"}))).unwrap_err();
        assert_eq!(err.code, "UNKNOWN_EVENT");
    }

    #[test]
    fn envelope_field_names() {
        let out = Envelope::error(&ErrorPayload::new("X", "y"), Some("abc".into()));
        let raw = serde_json::to_value(&out).unwrap();
        assert_eq!(raw["event"], "error");
        assert_eq!(raw["requestId"], "abc");
        assert_eq!(raw["payload"]["code"], "X");
        assert!(raw["ts"].is_string());
    }
}
