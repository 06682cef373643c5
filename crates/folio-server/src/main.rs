use std::sync::Arc;

use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_server::{build_router, AppState, ServerConfig};
use folio_suggest::LlmSuggestionService;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_json);
    let site = Arc::new(config.site());

    // `folio-server regenerate`: one pass over listing and detail pages, then exit
    if std::env::args().nth(1).as_deref() == Some("regenerate") {
        let report = tokio::task::spawn_blocking(move || site.regenerate()).await??;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let settings = Arc::new(RwLock::new(folio_core::read_settings_from(&config.settings_path)));
    let state = AppState {
        site,
        suggest: Arc::new(LlmSuggestionService::new(Arc::clone(&settings))),
        settings,
        settings_path: config.settings_path.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        site_root = %config.site_root.display(),
        listing = %config.listing,
        "folio server listening"
    );
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
