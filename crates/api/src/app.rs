use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use persistence::{InMemoryTicketStore, TicketRepository, TicketStore};
use shared::jwt::SessionSigner;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{Config, StoreBackend};
use crate::error::ApiError;
use crate::middleware::{
    login_rate_limit_middleware, metrics_handler, metrics_middleware, require_operator,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{admin, health, scans, session, tickets};

#[derive(Clone)]
pub struct AppState {
    /// `None` when `database.url` is empty.
    pub store: Option<Arc<dyn TicketStore>>,
    pub config: Arc<Config>,
    pub login_limiter: Option<Arc<RateLimiterState>>,
    /// `None` when the PIN hash or session secret is missing.
    pub session: Option<Arc<SessionSigner>>,
}

impl AppState {
    pub fn new(config: Config, store: Option<Arc<dyn TicketStore>>) -> Self {
        let login_limiter = RateLimiterState::new(config.security.login_rate_limit_per_minute)
            .map(Arc::new);

        let session = if config.auth.is_configured() {
            match SessionSigner::new(
                &config.auth.session_secret,
                config.auth.session_expiry_secs,
                config.auth.leeway_secs,
            ) {
                Ok(signer) => Some(Arc::new(signer)),
                Err(e) => {
                    tracing::error!(error = %e, "Operator sessions disabled");
                    None
                }
            }
        } else {
            tracing::warn!("Operator authentication is not configured");
            None
        };

        Self {
            store,
            config: Arc::new(config),
            login_limiter,
            session,
        }
    }

    /// The ticket store, or `configuration_error` when none is configured.
    pub fn tickets(&self) -> Result<&dyn TicketStore, ApiError> {
        self.store
            .as_deref()
            .ok_or_else(|| ApiError::NotConfigured("Ticket store is not configured".to_string()))
    }

    pub fn session_signer(&self) -> Result<Arc<SessionSigner>, ApiError> {
        self.session.clone().ok_or_else(|| {
            ApiError::NotConfigured("Operator authentication is not configured".to_string())
        })
    }
}

/// Builds the ticket store selected by `database.url`.
///
/// Returns the Postgres pool alongside so the caller can run pool jobs.
pub async fn build_store(
    config: &Config,
) -> anyhow::Result<(Option<Arc<dyn TicketStore>>, Option<PgPool>)> {
    match config.database.backend() {
        StoreBackend::NotConfigured => {
            tracing::warn!("database.url is empty; ticket routes will answer configuration_error");
            Ok((None, None))
        }
        StoreBackend::Memory => {
            tracing::info!("Using in-memory ticket store");
            Ok((Some(Arc::new(InMemoryTicketStore::new())), None))
        }
        StoreBackend::Postgres => {
            let pool_settings = persistence::db::PoolSettings::from(&config.database);
            let pool = persistence::db::create_pool(&pool_settings).await?;

            tracing::info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            tracing::info!("Migrations completed");

            Ok((Some(Arc::new(TicketRepository::new(pool.clone()))), Some(pool)))
        }
    }
}

pub fn create_app(config: Config, store: Option<Arc<dyn TicketStore>>) -> Router {
    create_router(AppState::new(config, store))
}

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Operator routes: issuance, scanning and the admin view
    let operator_routes = Router::new()
        .route("/api/v1/tickets", post(tickets::create_ticket))
        .route("/api/v1/scans", post(scans::scan_ticket))
        .route("/api/v1/admin/tickets", get(admin::list_tickets))
        .route("/api/v1/admin/tickets/trash", get(admin::list_trash))
        .route("/api/v1/admin/tickets/stats", get(admin::ticket_stats))
        .route("/api/v1/admin/tickets/:id", delete(admin::soft_delete_ticket))
        .route(
            "/api/v1/admin/tickets/:id/revoke",
            post(admin::revoke_ticket),
        )
        .route(
            "/api/v1/admin/tickets/:id/restore",
            post(admin::restore_ticket),
        )
        .route(
            "/api/v1/admin/tickets/:id/permanent",
            delete(admin::hard_delete_ticket),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_operator,
        ));

    let session_routes = Router::new()
        .route("/api/v1/auth/session", post(session::create_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit_middleware,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/tickets/:id", get(tickets::get_ticket));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(operator_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
