use crate::engine::QuizEngine;
use crate::error::ErrorPayload;
use crate::protocol::{parse_command, Command, Envelope};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Applies one inbound line and returns the reply envelope.
pub fn handle_line(engine: &mut QuizEngine, line: &str) -> Envelope {
    let env: Envelope = match serde_json::from_str(line) {
        Ok(env) => env,
        Err(err) => {
            debug!("unparseable input line: {}", err);
            return Envelope::error(
                &ErrorPayload::new("INVALID_JSON", format!("cannot parse envelope: {err}")),
                None,
            );
        }
    };
    let request_id = env
        .request_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    match parse_command(&env) {
        Ok(Command::Apply(intent)) => {
            engine.dispatch(intent);
        }
        Ok(Command::SetTheme(theme)) => engine.set_theme(theme),
        Ok(Command::GetView) => {}
        Err(err) => return Envelope::error(&err, Some(request_id)),
    }
    Envelope::view(&engine.view(), Some(request_id))
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, env: &Envelope) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(env)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}

/// Runs until the reader reaches EOF. The countdown interval is re-armed each
/// time the timer predicate turns true and its ticks are ignored otherwise.
pub async fn run_session<R, W>(engine: &mut QuizEngine, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut ticker = interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut timer_armed = false;

    send(&mut writer, &Envelope::view(&engine.view(), None)).await?;

    loop {
        let active = engine.timer_active();
        if active && !timer_armed {
            ticker.reset();
        }
        timer_armed = active;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = handle_line(engine, &line);
                send(&mut writer, &reply).await?;
            }
            _ = ticker.tick(), if timer_armed => {
                if engine.tick() {
                    send(&mut writer, &Envelope::view(&engine.view(), None)).await?;
                }
            }
        }
    }

    info!("input closed on screen {}", engine.screen());
    Ok(())
}
