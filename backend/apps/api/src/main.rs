//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use article::domain::ai::DisabledAiClient;
use article::infra::ai::{DEFAULT_AI_BASE_URL, DEFAULT_AI_MODEL};
use article::{
    AiBackend, ArticleConfig, ArticleRoutes, EngagementUseCase, HttpAiClient, PgArticleRepository,
    article_routes,
};
use auth::{
    ADMIN_ROLES, AuthConfig, AuthGuard, IdentityMaintenanceUseCase, LogMailer, PgIdentityRepository,
    identity_router, optional_auth, require_auth, require_role,
};
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use platform::client::TrustedProxies;
use platform::rate_limit::RateLimitConfig;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_DEADLINE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);
    tracing::debug!(config = ?config, "Configuration loaded");

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    tracing::info!("Migrations completed");

    let auth_config = AuthConfig::new(config.jwt_secret.clone(), config.backend_base_url.clone())
        .with_pepper(config.password_pepper.as_ref().map(|p| p.as_bytes().to_vec()));
    let article_config = ArticleConfig::default();
    let ai = ai_backend(&config, article_config.ai_timeout)?;

    let reaper = spawn_reaper(
        pool.clone(),
        Arc::new(auth_config.clone()),
        Arc::new(article_config.clone()),
        config.reaper_interval,
    );

    let guard = AuthGuard::new(auth_config.token_service());

    let identity = identity_router(
        PgIdentityRepository::new(pool.clone()),
        LogMailer,
        auth_config,
        RateLimitConfig::new(config.auth_rate_limit_max, config.auth_rate_limit_window_secs),
    );

    // Layers run outside-in: authentication first, then the role check.
    let ArticleRoutes {
        public,
        protected,
        admin,
    } = article_routes(PgArticleRepository::new(pool.clone()), ai, article_config);
    let articles = public
        .route_layer(from_fn_with_state(guard.clone(), optional_auth))
        .merge(protected.route_layer(from_fn_with_state(guard.clone(), require_auth)))
        .merge(
            admin
                .route_layer(from_fn_with_state(ADMIN_ROLES, require_role))
                .route_layer(from_fn_with_state(guard, require_auth)),
        );

    let health_routes = Router::new()
        .route("/health", get(health))
        .with_state(pool.clone());

    let app = Router::new()
        .merge(identity)
        .merge(articles)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(Extension(TrustedProxies::new(config.trusted_proxies.clone())))
                .layer(cors_layer(&config.frontend_origins))
                .layer(TimeoutLayer::new(config.request_timeout)),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!(mail_from = ?config.mail_from, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    reaper.abort();
    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api=info,auth=info,article=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true)
}

/// Hosted model when an API key is configured, otherwise disabled.
fn ai_backend(config: &AppConfig, timeout: Duration) -> anyhow::Result<AiBackend> {
    let Some(api_key) = config.ai_api_key.clone() else {
        tracing::info!("AI_API_KEY not set, content generation disabled");
        return Ok(AiBackend::Disabled(DisabledAiClient));
    };

    let model = config.ai_model.as_deref().unwrap_or(DEFAULT_AI_MODEL);
    let client = HttpAiClient::new(
        config.ai_base_url.as_deref().unwrap_or(DEFAULT_AI_BASE_URL),
        model,
        api_key,
        timeout,
    )
    .context("failed to build AI client")?;

    tracing::info!(model, "Content generation enabled");
    Ok(AiBackend::Http(client))
}

/// Periodic deletions standing in for TTL indexes. The first tick fires
/// immediately, so expired rows are also cleared at startup.
fn spawn_reaper(
    pool: PgPool,
    auth_config: Arc<AuthConfig>,
    article_config: Arc<ArticleConfig>,
    interval: Duration,
) -> JoinHandle<()> {
    let identity = Arc::new(PgIdentityRepository::new(pool.clone()));
    let maintenance = IdentityMaintenanceUseCase::new(
        identity.clone(),
        identity.clone(),
        identity,
        auth_config,
    );
    let articles = Arc::new(PgArticleRepository::new(pool));
    let engagement = EngagementUseCase::new(articles.clone(), articles, article_config);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = maintenance.run(Utc::now()).await {
                tracing::error!(error = %e, "Identity maintenance failed");
            }
            match engagement.purge_expired_views().await {
                Ok(0) => {}
                Ok(views_deleted) => tracing::info!(views_deleted, "Expired views purged"),
                Err(e) => tracing::error!(error = %e, "View purge failed"),
            }
        }
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// GET /health
async fn health(State(pool): State<PgPool>) -> (StatusCode, Json<HealthResponse>) {
    let ping = tokio::time::timeout(HEALTH_DEADLINE, sqlx::query("SELECT 1").execute(&pool)).await;

    let database = match ping {
        Ok(Ok(_)) => {
            return (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "ok",
                    database: "up",
                }),
            );
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            "down"
        }
        Err(_) => {
            tracing::warn!("Health check: database ping timed out");
            "timeout"
        }
    };

    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            status: "unavailable",
            database,
        }),
    )
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
