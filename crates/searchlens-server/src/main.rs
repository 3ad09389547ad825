use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use searchlens_server::state::AppState;

/// `searchlens health` — liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$SEARCHLENS_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("SEARCHLENS_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Health-check subcommand — handled before tokio runtime work so
    // the probe stays fast when used as a Docker HEALTHCHECK.
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }

    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("searchlens=info".parse()?),
        )
        .json()
        .init();

    let cfg = searchlens_core::config::Config::from_env()?;

    let provider = searchlens_google::HttpGoogleClient::new(&cfg)?;
    let state = Arc::new(AppState::new(Arc::new(provider), cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = searchlens_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "Searchlens listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
