mod config;
mod document;
mod errors;
mod pipeline;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{CompilerBackend, Config};
use crate::pipeline::compile::{Compiler, LocalCompiler, RemoteCompiler};
use crate::pipeline::template::TemplateEngine;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting typeset API v{}", env!("CARGO_PKG_VERSION"));

    // Load every document template up front; a missing or malformed template
    // is a configuration error that should fail the boot.
    let templates = TemplateEngine::from_dir(Path::new(&config.template_dir))
        .context("failed to load document templates")?;
    info!("Templates loaded from {}", config.template_dir);

    let compiler = build_compiler(&config);
    info!(
        "Compiler backend: {:?} (timeout {}s, cleanup {:?})",
        config.compiler_backend, config.compile_timeout_secs, config.cleanup
    );

    let state = AppState {
        config: config.clone(),
        templates: Arc::new(templates),
        compiler,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the compiler implementation from configuration.
fn build_compiler(config: &Config) -> Arc<dyn Compiler> {
    let timeout = Duration::from_secs(config.compile_timeout_secs);
    match config.compiler_backend {
        CompilerBackend::Local => Arc::new(LocalCompiler::new(config.latex_bin.clone(), timeout)),
        CompilerBackend::Remote => Arc::new(RemoteCompiler::new(
            config.remote_compile_url.clone(),
            timeout,
        )),
    }
}
