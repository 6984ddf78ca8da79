use std::sync::Arc;

use shetkari_core::advisor::GeminiAdvisor;
use shetkari_core::config::ShetkariConfig;
use shetkari_core::db::Database;
use shetkari_core::repo::PgMessageRepository;
use shetkari_core::service::ChatService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ShetkariConfig::load()?;
    init_tracing(&config)?;

    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;
    db.health_check().await?;

    let repo = Arc::new(PgMessageRepository::new(db.pool().clone()));
    let advisor = Arc::new(GeminiAdvisor::new(&config.advisor));
    let chat = ChatService::new(repo, advisor, config.advisor.context_turns);

    let state = shetkari_server::app_state(chat);
    let host = config.server.host.clone();
    let port = config.server.port;

    tokio::spawn(async move {
        if let Err(e) = shetkari_server::serve(state, &host, port).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    println!(
        "shetkari-server running (API on port {}). Press Ctrl+C to stop.",
        port
    );
    tokio::signal::ctrl_c().await?;

    db.close().await;
    Ok(())
}

fn init_tracing(config: &ShetkariConfig) -> anyhow::Result<()> {
    let filter = build_env_filter(config.log_level())?;

    if config.logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}

fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    // A level string with '=' is already a full directive list.
    if level.contains('=') {
        return Ok(EnvFilter::new(level));
    }

    Ok(EnvFilter::from_default_env()
        .add_directive(format!("shetkari_core={level}").parse()?)
        .add_directive(format!("shetkari_server={level}").parse()?)
        .add_directive("tower_http=info".parse()?))
}
