mod analysis;
mod bundle;
mod catalog;
mod config;
mod errors;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::AnalysisContext;
use crate::bundle::TrainedModelBundle;
use crate::catalog::RoleCatalog;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Match API v{}", env!("CARGO_PKG_VERSION"));

    // Role catalog: /roles keeps serving it even if the bundle is missing
    let catalog = match RoleCatalog::load(&config.role_catalog_path) {
        Ok(catalog) => {
            if catalog.is_empty() {
                warn!("Role catalog {} lists no roles", config.role_catalog_path.display());
            }
            info!("Role catalog loaded: {} roles", catalog.len());
            catalog
        }
        Err(e) => {
            warn!("Role catalog unavailable, serving an empty catalog: {e}");
            RoleCatalog::default()
        }
    };

    // Model bundle: absence puts the service in degraded mode, never a crash
    let bundle = match TrainedModelBundle::load(&config.models_dir) {
        Ok(bundle) => {
            let unencoded = bundle.unencoded_roles(&catalog);
            if !unencoded.is_empty() {
                warn!(
                    roles = ?unencoded,
                    "Catalog roles missing from the fitted role encoding; requests for them will fail"
                );
            }
            Some(bundle)
        }
        Err(e) => {
            warn!("Model bundle not loaded, analysis disabled until restart: {e}");
            None
        }
    };

    let analysis =
        AnalysisContext::new(catalog, bundle).context("Failed to compile role skill matchers")?;

    let state = AppState {
        analysis: Arc::new(analysis),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
