use axum::http::{header, HeaderValue, Method};
use job_portal::config::{AppConfig, ConfigError, CorsConfig};
use job_portal::error::AppError;
use job_portal::portal::{InMemoryPortalStore, PasswordHasher, Portal, TokenService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Portal over a fresh process-local store, signing sessions with the configured secret.
pub(crate) fn build_portal(config: &AppConfig) -> Arc<Portal<InMemoryPortalStore>> {
    let store = Arc::new(InMemoryPortalStore::default());
    let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_days);
    Arc::new(Portal::new(store, PasswordHasher::default(), tokens))
}

/// Credentialed CORS for the single configured frontend origin.
pub(crate) fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(&config.allowed_origin)
        .map_err(|_| AppError::Config(ConfigError::InvalidFrontendUrl))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}
