//! Preview server for the generated output.

use crate::console;
use anyhow::{bail, Context, Result};
use axum::{handler::HandlerWithoutStateExt, http::StatusCode, Router};
use poole_core::Config;
use std::path::{Path, PathBuf};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub const DEFAULT_PORT: u16 = 8000;

const NOT_FOUND: &str = "404, page not found";

/// Serve the output directory on localhost until Ctrl+C
pub fn serve_site(site: &Path, port: u16) -> Result<()> {
    let config = Config::load(site).context("Failed to load config")?;
    let output_dir = config.output_dir();
    if !output_dir.is_dir() {
        bail!(
            "Output directory {:?} not found, run `poole generate` first",
            output_dir
        );
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(run_server(output_dir, port))
}

async fn run_server(output_dir: PathBuf, port: u16) -> Result<()> {
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    console::info(format!("Start server http://localhost:{port}"));
    println!("Ctrl-C to stop it.");

    axum::serve(listener, app(&output_dir))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;
    Ok(())
}

/// Static router over the output directory. Directories serve their
/// `index.html`; anything missing or outside the root is a plain 404.
fn app(output_dir: &Path) -> Router {
    let files = ServeDir::new(output_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND)
}
