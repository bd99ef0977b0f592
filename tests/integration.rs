use moments_quiz::content::parse_content;
use moments_quiz::driver::{handle_line, run_session};
use moments_quiz::engine::QuizEngine;
use moments_quiz::models::Content;
use moments_quiz::persistence::SESSION_STORAGE_KEY;
use moments_quiz::session::Screen;
use moments_quiz::state::{FileStore, KeyValueStore, MemoryStore};
use moments_quiz::theme::{Theme, THEME_STORAGE_KEY};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

fn quiz_content(questions_per_chapter: usize, timer_enabled: bool, time_limit: u32) -> Content {
    let chapters = json!([
        {"id": "chapter-1", "title": "Beginnings", "description": "First steps"},
        {"id": "chapter-2", "title": "Traditions", "description": "Our habits"}
    ]);
    let mut questions = Vec::new();
    for c in 1..=2 {
        for q in 0..questions_per_chapter {
            questions.push(json!({
                "id": format!("c{c}-q{}", q + 1),
                "chapterId": format!("chapter-{c}"),
                "text": format!("Question {} in chapter {c}", q + 1),
                "options": ["A", "B", "C", "D"],
                "correctOptionIndex": q % 4,
                "explanation": "It was obvious"
            }));
        }
    }
    let settings = json!({
        "chapterQuestionCount": questions_per_chapter,
        "basePointsPerCorrect": 1,
        "timerEnabled": timer_enabled,
        "questionTimeLimitSeconds": time_limit,
        "timerBonusMaxPoints": 1,
        "shuffleOptions": true
    });
    let reveal = json!({
        "title": "The end",
        "message": "Thanks",
        "image": "final.jpg",
        "link": {"label": "Gift", "url": "https://example.com/gift"},
        "easterEgg": {"minScore": 4, "title": "Egg", "message": "Hidden"}
    });
    parse_content(
        &chapters.to_string(),
        &Value::Array(questions).to_string(),
        &settings.to_string(),
        &reveal.to_string(),
    )
    .expect("content")
}

fn correct_index(engine: &QuizEngine) -> usize {
    engine.current_question().unwrap().correct_option_index
}

#[test]
fn full_playthrough_reaches_final_with_consistent_totals() {
    let store = Arc::new(MemoryStore::new());
    let mut engine = QuizEngine::start(Arc::new(quiz_content(10, false, 20)), store.clone());

    assert!(engine.start_quiz());
    for chapter in 0..2 {
        assert_eq!(engine.screen(), Screen::ChapterSelect);
        assert!(engine.start_chapter());
        for q in 0..10 {
            assert_eq!(engine.screen(), Screen::Question);
            let pick = if q % 2 == 0 { Some(correct_index(&engine)) } else { None };
            assert!(engine.submit_answer(pick));
            assert!(!engine.submit_answer(pick));
            assert!(engine.advance());
        }
        assert_eq!(engine.screen(), Screen::ChapterSummary);
        let stats = engine.chapter_stats(&format!("chapter-{}", chapter + 1));
        assert_eq!(stats.answered, 10);
        assert_eq!(stats.correct, 5);
        assert!(engine.continue_after_summary());
    }

    assert_eq!(engine.screen(), Screen::Final);
    let totals = engine.total_stats();
    assert_eq!(totals.answered, 20);
    assert_eq!(totals.correct, 10);
    assert_eq!(totals.score, 10);
    let view = engine.view();
    assert!(view.reveal.unwrap().easter_egg_unlocked);
    assert_eq!(view.totals.accuracy, 50);
    assert!(store.get(SESSION_STORAGE_KEY).unwrap().unwrap().contains("\"final\""));
}

#[test]
fn last_question_of_ten_opens_summary() {
    let mut engine = QuizEngine::start(
        Arc::new(quiz_content(10, false, 20)),
        Arc::new(MemoryStore::new()),
    );
    engine.start_quiz();
    engine.start_chapter();
    for _ in 0..9 {
        engine.submit_answer(Some(0));
        engine.advance();
    }
    assert_eq!(engine.state().current_question_index, 9);
    assert_eq!(engine.screen(), Screen::Question);
    engine.submit_answer(Some(0));
    engine.advance();
    assert_eq!(engine.screen(), Screen::ChapterSummary);
}

#[test]
fn session_survives_reload_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local_state.json");
    let content = Arc::new(quiz_content(3, true, 20));

    let snapshot = {
        let mut engine = QuizEngine::start(content.clone(), Arc::new(FileStore::new(&path)));
        engine.set_theme(Theme::GreenValentine);
        engine.start_quiz();
        engine.start_chapter();
        let pick = correct_index(&engine);
        engine.submit_answer(Some(pick));
        assert_eq!(engine.state().last_awarded_points, 2);
        engine.state().clone()
    };

    let reloaded = QuizEngine::start(content.clone(), Arc::new(FileStore::new(&path)));
    assert_eq!(reloaded.state(), &snapshot);
    assert_eq!(reloaded.theme(), Theme::GreenValentine);
    assert!(reloaded.view().question.unwrap().feedback.unwrap().correct);

    // fewer questions than the saved cursor points at
    let mut engine = reloaded;
    engine.advance();
    engine.advance();
    let shrunk = Arc::new(quiz_content(1, true, 20));
    let clamped = QuizEngine::start(shrunk, Arc::new(FileStore::new(&path)));
    assert_eq!(clamped.state().current_question_index, 0);
    assert_eq!(clamped.current_question().unwrap().id, "c1-q1");
}

#[test]
fn restored_counters_at_the_limit_saturate() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(
            SESSION_STORAGE_KEY,
            &json!({
                "screen": "question",
                "totalScore": u32::MAX,
                "totalCorrect": u32::MAX,
                "totalAnswered": u32::MAX,
                "chapterStats": {"chapter-1": {"score": u32::MAX, "correct": 7, "answered": u32::MAX}}
            })
            .to_string(),
        )
        .unwrap();
    let mut engine = QuizEngine::start(Arc::new(quiz_content(3, false, 20)), store);
    assert_eq!(engine.state().total_score, u32::MAX);

    let pick = correct_index(&engine);
    assert!(engine.submit_answer(Some(pick)));
    let totals = engine.total_stats();
    assert_eq!(totals.score, u32::MAX);
    assert_eq!(totals.correct, u32::MAX);
    assert_eq!(totals.answered, u32::MAX);
    let stats = engine.chapter_stats("chapter-1");
    assert_eq!(stats.score, u32::MAX);
    assert_eq!(stats.correct, 8);
    assert_eq!(stats.answered, u32::MAX);
    assert_eq!(engine.state().last_awarded_points, 1);
}

#[test]
fn restart_erases_saved_session_but_keeps_theme() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("state.json")));
    let mut engine = QuizEngine::start(Arc::new(quiz_content(3, false, 20)), store.clone());
    engine.set_theme(Theme::SoftPeach);
    engine.start_quiz();
    engine.start_chapter();
    engine.submit_answer(Some(0));
    assert!(store.get(SESSION_STORAGE_KEY).unwrap().is_some());

    assert!(engine.restart());
    assert_eq!(engine.screen(), Screen::Intro);
    assert_eq!(engine.total_stats().answered, 0);
    assert_eq!(engine.total_stats().score, 0);
    assert!(engine.state().answered_question_ids.is_empty());
    assert_eq!(store.get(SESSION_STORAGE_KEY).unwrap(), None);
    assert_eq!(store.get(THEME_STORAGE_KEY).unwrap().as_deref(), Some("soft-peach"));
}

#[test]
fn handle_line_replies_with_view_or_error() {
    let mut engine = QuizEngine::start(
        Arc::new(quiz_content(3, false, 20)),
        Arc::new(MemoryStore::new()),
    );
    let reply = handle_line(&mut engine, r#"{"event":"start_quiz","requestId":"r-1"}"#);
    assert_eq!(reply.event, "view");
    assert_eq!(reply.request_id.as_deref(), Some("r-1"));
    assert_eq!(reply.payload["screen"], "chapterSelect");

    let reply = handle_line(&mut engine, "not json");
    assert_eq!(reply.event, "error");
    assert_eq!(reply.payload["code"], "INVALID_JSON");

    let reply = handle_line(&mut engine, r#"{"event":"dance"}"#);
    assert_eq!(reply.payload["code"], "UNKNOWN_EVENT");
    assert!(reply.request_id.is_some());
}

#[tokio::test]
async fn line_protocol_plays_a_chapter() {
    let mut engine = QuizEngine::start(
        Arc::new(quiz_content(2, false, 20)),
        Arc::new(MemoryStore::new()),
    );
    let input = [
        json!({"event": "start_quiz"}),
        json!({"event": "start_chapter"}),
        json!({"event": "submit_answer", "payload": {"selectedOriginalIndex": 0}}),
        json!({"event": "submit_answer", "payload": {"selectedOriginalIndex": 3}}),
        json!({"event": "advance"}),
        json!({"event": "submit_answer", "payload": {"selectedOriginalIndex": null}}),
        json!({"event": "advance"}),
        json!({"event": "set_theme", "payload": {"theme": "green-valentine"}}),
    ]
    .iter()
    .map(|v| v.to_string())
    .collect::<Vec<_>>()
    .join("\n");

    let mut output = Vec::new();
    run_session(&mut engine, BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    let replies: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(replies.len(), 9);
    assert!(replies.iter().all(|r| r["event"] == "view"));
    assert_eq!(replies[0]["payload"]["screen"], "intro");

    let first_answer = &replies[3]["payload"];
    assert_eq!(first_answer["question"]["feedback"]["correct"], true);
    assert_eq!(first_answer["totals"]["score"], 1);
    // the second submit for the same question changed nothing
    assert_eq!(replies[4]["payload"], replies[3]["payload"]);

    let last = &replies[8]["payload"];
    assert_eq!(last["screen"], "chapterSummary");
    assert_eq!(last["chapter"]["stats"]["answered"], 2);
    assert_eq!(last["theme"], "green-valentine");
    assert_eq!(engine.total_stats().correct, 1);
}

async fn next_view(lines: &mut tokio::io::Lines<BufReader<tokio::io::DuplexStream>>) -> Value {
    let line = lines.next_line().await.unwrap().expect("driver closed output");
    let env: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(env["event"], "view");
    env["payload"].clone()
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_submits_without_selection() {
    let engine = QuizEngine::start(
        Arc::new(quiz_content(2, true, 2)),
        Arc::new(MemoryStore::new()),
    );
    let (mut client_in, driver_in) = tokio::io::duplex(4096);
    let (driver_out, client_out) = tokio::io::duplex(64 * 1024);
    let task = tokio::spawn(async move {
        let mut engine = engine;
        run_session(&mut engine, BufReader::new(driver_in), driver_out)
            .await
            .unwrap();
        engine
    });
    let mut lines = BufReader::new(client_out).lines();

    assert_eq!(next_view(&mut lines).await["screen"], "intro");
    client_in
        .write_all(b"{\"event\":\"start_quiz\"}\n{\"event\":\"start_chapter\"}\n")
        .await
        .unwrap();
    assert_eq!(next_view(&mut lines).await["screen"], "chapterSelect");
    let question = next_view(&mut lines).await;
    assert_eq!(question["timer"]["remaining"], 2);
    assert_eq!(question["timer"]["running"], true);

    let ticked = next_view(&mut lines).await;
    assert_eq!(ticked["timer"]["remaining"], 1);
    let expired = next_view(&mut lines).await;
    assert_eq!(expired["timer"]["remaining"], 0);
    assert_eq!(expired["timer"]["running"], false);
    assert_eq!(expired["question"]["locked"], true);
    assert_eq!(expired["question"]["feedback"]["correct"], false);
    assert_eq!(expired["question"]["selectedOriginalIndex"], Value::Null);
    assert_eq!(expired["totals"]["answered"], 1);

    // a late answer after the timeout is ignored
    client_in
        .write_all(b"{\"event\":\"submit_answer\",\"payload\":{\"selectedOriginalIndex\":0}}\n")
        .await
        .unwrap();
    let late = next_view(&mut lines).await;
    assert_eq!(late["totals"]["answered"], 1);
    assert_eq!(late["totals"]["score"], 0);

    drop(client_in);
    let engine = task.await.unwrap();
    assert_eq!(engine.total_stats().answered, 1);
    assert!(!engine.timer_active());
}
