//! StreamGate Server
//!
//! Stream key authorization in front of a WHIP/WHEP session engine:
//! - Self-service and admin profile APIs
//! - Session revocation on token reset or profile removal
//! - Single-page frontend
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HTTP_ADDRESS` | `0.0.0.0:8080` | Listen address |
//! | `STREAM_PROFILE_PATH` | `profiles` | Profile directory |
//! | `AUTHENTICATED_USER_HEADER` | - | Header carrying the proxy-authenticated stream key |
//! | `FRONTEND_ADMIN_TOKEN` | - | Bearer token for admin endpoints |
//! | `DISABLE_FRONTEND` | - | Any value disables the frontend |
//! | `FRONTEND_PATH` | `web/build` | Frontend build directory |
//! | `DEBUG_INCOMING_API_REQUEST` | `false` | Log route matching per request |
//! | `DISABLE_STATUS` | - | Any value hides `/api/status` |
//! | `ENABLE_HTTP_REDIRECT` | - | Any value starts the HTTPS redirect listener |
//! | `HTTPS_REDIRECT_PORT` | `80` | Port of the redirect listener |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sg_api::{create_redirect_router, create_router, AppState};
use sg_common::AppConfig;
use sg_profiles::{AuthorizationService, FileProfileStore, InMemorySessionRegistry, RevocationBridge};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting StreamGate Server");

    let config = AppConfig::from_env();
    info!(
        profile_path = %config.profile_path.display(),
        self_service = config.authenticated_user_header.is_some(),
        admin = config.admin_token.is_some(),
        frontend = !config.frontend.disabled,
        "Configuration loaded"
    );

    let store = FileProfileStore::open(&config.profile_path)
        .await
        .with_context(|| format!("opening profile directory {}", config.profile_path.display()))?;

    // No media engine is linked in; sessions are tracked in-process.
    let sessions = Arc::new(InMemorySessionRegistry::new());
    let profiles = AuthorizationService::new(Arc::new(store))
        .with_revocation(RevocationBridge::new(sessions.clone()));

    let address = config.http_address.clone();
    let redirect = config.http_redirect.clone();
    let state = AppState::new(profiles, config, sessions);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;
    info!("HTTP server listening on http://{}", address);

    // Start redirect listener
    let redirect_task = match redirect {
        Some(redirect) => {
            let redirect_address = redirect.listen_address();
            let redirect_listener = TcpListener::bind(&redirect_address)
                .await
                .with_context(|| format!("binding {}", redirect_address))?;
            info!("HTTPS redirect listening on http://{}", redirect_address);

            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(redirect_listener, create_redirect_router()).await {
                    tracing::error!(error = %e, "HTTPS redirect listener failed");
                }
            }))
        }
        None => None,
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = redirect_task {
        task.abort();
    }

    info!("StreamGate Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
