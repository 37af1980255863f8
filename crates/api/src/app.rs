use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use domain::services::{JsonParamsValidator, ParamsValidator, RetryPolicy};
use persistence::repositories::CommandRepository;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{commands, health};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub commands: CommandRepository,
    pub params_validator: Arc<dyn ParamsValidator>,
}

impl AppState {
    /// Builds state with the protocol-agnostic JSON parameter validator.
    pub fn new(config: Config, pool: PgPool) -> Self {
        let validator = JsonParamsValidator::new(config.commands.allowed_protocols.clone());
        Self::with_params_validator(config, pool, Arc::new(validator))
    }

    pub fn with_params_validator(
        config: Config,
        pool: PgPool,
        params_validator: Arc<dyn ParamsValidator>,
    ) -> Self {
        let retry_policy = RetryPolicy::new(config.commands.max_delivery_attempts);
        Self {
            commands: CommandRepository::with_retry_policy(pool.clone(), retry_policy),
            pool,
            config: Arc::new(config),
            params_validator,
        }
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    create_router(AppState::new(config, pool))
}

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let command_routes = Router::new()
        .route("/api/v1/commands", post(commands::enqueue_command))
        .route("/api/v1/commands/:id", get(commands::get_command))
        .route(
            "/api/v1/commands/:id/response",
            put(commands::complete_command),
        )
        .route(
            "/api/v1/devices/:imei/commands",
            get(commands::list_commands),
        )
        .route(
            "/api/v1/devices/:imei/commands/next",
            post(commands::claim_next_command),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(command_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .with_state(state)
}
