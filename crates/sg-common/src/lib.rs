//! StreamGate shared configuration
//!
//! All process-wide settings are resolved once at startup into [`AppConfig`]
//! and handed to each component. Nothing below the binary reads the
//! environment directly.

use std::path::PathBuf;

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const HTTP_ADDRESS: &str = "HTTP_ADDRESS";
pub const STREAM_PROFILE_PATH: &str = "STREAM_PROFILE_PATH";
pub const AUTHENTICATED_USER_HEADER: &str = "AUTHENTICATED_USER_HEADER";
pub const FRONTEND_ADMIN_TOKEN: &str = "FRONTEND_ADMIN_TOKEN";
pub const DISABLE_FRONTEND: &str = "DISABLE_FRONTEND";
pub const FRONTEND_PATH: &str = "FRONTEND_PATH";
pub const DEBUG_INCOMING_API_REQUEST: &str = "DEBUG_INCOMING_API_REQUEST";
pub const DISABLE_STATUS: &str = "DISABLE_STATUS";
pub const ENABLE_HTTP_REDIRECT: &str = "ENABLE_HTTP_REDIRECT";
pub const HTTPS_REDIRECT_PORT: &str = "HTTPS_REDIRECT_PORT";

const DEFAULT_HTTP_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_PROFILE_PATH: &str = "profiles";
const DEFAULT_FRONTEND_PATH: &str = "web/build";
const DEFAULT_REDIRECT_PORT: u16 = 80;

// ============================================================================
// Configuration Types
// ============================================================================

/// Static frontend settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    /// When set, no frontend fallback is registered and unknown paths are 404
    pub disabled: bool,
    /// Directory holding the built single-page application
    pub path: PathBuf,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            path: PathBuf::from(DEFAULT_FRONTEND_PATH),
        }
    }
}

/// Plain HTTP listener that sends every request to the HTTPS origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRedirectConfig {
    pub port: u16,
}

impl Default for HttpRedirectConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_REDIRECT_PORT,
        }
    }
}

impl HttpRedirectConfig {
    pub fn listen_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Application configuration, built once and passed to every component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen address for the HTTP server
    pub http_address: String,
    /// Directory holding one entry per stream profile
    pub profile_path: PathBuf,
    /// Request header carrying the upstream-authenticated stream key.
    /// `None` disables the self-service profile endpoints.
    pub authenticated_user_header: Option<String>,
    /// Bearer token accepted on admin endpoints. `None` disables admin access.
    pub admin_token: Option<String>,
    pub frontend: FrontendConfig,
    /// Log matched/unmatched route patterns for every request
    pub debug_incoming_api_requests: bool,
    /// Hide the live session listing on `/api/status`
    pub disable_status: bool,
    /// `None` unless `ENABLE_HTTP_REDIRECT` is set
    pub http_redirect: Option<HttpRedirectConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_address: DEFAULT_HTTP_ADDRESS.to_string(),
            profile_path: PathBuf::from(DEFAULT_PROFILE_PATH),
            authenticated_user_header: None,
            admin_token: None,
            frontend: FrontendConfig::default(),
            debug_incoming_api_requests: false,
            disable_status: false,
            http_redirect: None,
        }
    }
}

impl AppConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            http_address: get(HTTP_ADDRESS).unwrap_or(defaults.http_address),
            profile_path: get(STREAM_PROFILE_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.profile_path),
            authenticated_user_header: get(AUTHENTICATED_USER_HEADER),
            admin_token: get(FRONTEND_ADMIN_TOKEN),
            frontend: FrontendConfig {
                disabled: get(DISABLE_FRONTEND).is_some(),
                path: get(FRONTEND_PATH)
                    .map(PathBuf::from)
                    .unwrap_or(defaults.frontend.path),
            },
            debug_incoming_api_requests: get(DEBUG_INCOMING_API_REQUEST)
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            disable_status: get(DISABLE_STATUS).is_some(),
            http_redirect: get(ENABLE_HTTP_REDIRECT).map(|_| HttpRedirectConfig {
                port: get(HTTPS_REDIRECT_PORT)
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_REDIRECT_PORT),
            }),
        }
    }

    pub fn with_profile_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_path = path.into();
        self
    }

    pub fn with_authenticated_user_header(mut self, header: impl Into<String>) -> Self {
        self.authenticated_user_header = Some(header.into());
        self
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    pub fn with_frontend_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.frontend.path = path.into();
        self
    }

    pub fn with_http_redirect(mut self, port: u16) -> Self {
        self.http_redirect = Some(HttpRedirectConfig { port });
        self
    }

    pub fn without_frontend(mut self) -> Self {
        self.frontend.disabled = true;
        self
    }
}
