use moments_quiz::config::AppConfig;
use moments_quiz::driver::run_session;
use moments_quiz::error::ErrorPayload;
use moments_quiz::protocol::Envelope;
use moments_quiz::build_engine;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        "content from {}, state in {}",
        config.content_dir.display(),
        config
            .state_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "memory".to_string())
    );

    let mut engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(err) => {
            let reply = Envelope::error(&ErrorPayload::from(&err), None);
            let mut stdout = tokio::io::stdout();
            stdout.write_all(format!("{}\n", serde_json::to_string(&reply)?).as_bytes()).await?;
            stdout.flush().await?;
            for issue in err.issues() {
                tracing::warn!("{}", issue);
            }
            return Err(err.into());
        }
    };

    run_session(&mut engine, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    Ok(())
}
