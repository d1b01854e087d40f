//! StreamGate API
//!
//! HTTP surface for:
//! - Self-service stream key tokens (identity from an upstream proxy header)
//! - Admin profile management
//! - Live session status
//! - Delegation of media signalling routes to the session engine
//! - Single-page frontend fallback
//! - Optional HTTP to HTTPS redirect listener

use std::sync::Arc;

use axum::{
    middleware,
    routing::{any, get, post},
    Router,
};
use sg_common::AppConfig;
use sg_profiles::{AuthorizationService, SessionRegistry};

pub mod admin;
pub mod auth;
pub mod cors;
pub mod error;
pub mod external;
pub mod frontend;
pub mod profiles;
pub mod redirect;
pub mod status;
pub mod trace;

pub use auth::{AdminSession, AdminVerifier, BearerAdminVerifier};
pub use error::ApiError;
pub use external::{ExternalEndpoints, DELEGATED_ROUTES};
pub use redirect::create_redirect_router;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: AuthorizationService,
    pub config: Arc<AppConfig>,
    pub admin: Arc<dyn AdminVerifier>,
    pub sessions: Arc<dyn SessionRegistry>,
    pub external: Option<Arc<dyn ExternalEndpoints>>,
}

impl AppState {
    /// State with bearer-token admin verification and no session engine routes
    pub fn new(
        profiles: AuthorizationService,
        config: AppConfig,
        sessions: Arc<dyn SessionRegistry>,
    ) -> Self {
        let admin = Arc::new(BearerAdminVerifier::new(config.admin_token.clone()));
        Self {
            profiles,
            config: Arc::new(config),
            admin,
            sessions,
            external: None,
        }
    }

    pub fn with_admin_verifier(mut self, admin: Arc<dyn AdminVerifier>) -> Self {
        self.admin = admin;
        self
    }

    pub fn with_external(mut self, external: Arc<dyn ExternalEndpoints>) -> Self {
        self.external = Some(external);
        self
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut api = Router::new()
        // Self-service
        .route("/api/profiles/get", get(profiles::get_token))
        .route("/api/profiles/reset", post(profiles::reset_token))
        // Admin
        .route("/api/admin/profiles", get(admin::list_profiles))
        .route("/api/admin/profiles/reset-token", post(admin::reset_token))
        .route("/api/admin/profiles/add-profile", post(admin::add_profile))
        .route("/api/admin/profiles/remove-profile", post(admin::remove_profile));

    if !config.disable_status {
        api = api.route("/api/status", get(status::status));
    }

    for path in DELEGATED_ROUTES {
        api = api.route(path, any(external::delegate));
    }

    // Applied before the fallback so static files are served without CORS headers.
    let mut router = api.layer(middleware::from_fn(cors::cors_middleware));

    if !config.frontend.disabled {
        router = router.fallback_service(frontend::frontend_service(&config.frontend.path));
    }

    if config.debug_incoming_api_requests {
        let path_trace = trace::PathTrace {
            frontend_enabled: !config.frontend.disabled,
        };
        router = router.layer(middleware::from_fn_with_state(
            path_trace,
            trace::debug_path_middleware,
        ));
    }

    router.with_state(state)
}
