//! # docmap: document mapping service
//!
//! `docmap` lets an administrator upload a PDF and link it to a pair of identifiers (a national,
//! residency or establishment ID number and a serial/reference number). Anyone who knows the same
//! pair can later download the document.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! stores everything in a single PostgreSQL table, `document_mappings`, keyed by the identifier
//! pair. File bytes are kept in the row as base64 text.
//!
//! - The **API layer** ([`api`]) serves `GET`/`POST`/`PUT /mappings` for listing, fetching,
//!   downloading, uploading and editing mappings.
//! - The **database layer** ([`db`]) wraps every query in the [`db::handlers::Mappings`]
//!   repository.
//! - Two static forms are embedded in the binary: the public lookup form at `/` and the admin
//!   upload form at `/admin`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use docmap::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = docmap::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     docmap::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations run automatically on startup. They can also be applied by hand:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! docmap::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
mod static_assets;
pub mod telemetry;
pub mod types;
pub mod uploads;

#[cfg(test)]
pub mod test_utils;

use crate::config::{CorsOrigin, PoolSettings};
use crate::openapi::ApiDoc;
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{Json, Router, routing::get};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Room for the text fields and multipart framing on top of the file itself
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the docmap database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    // 0 means "never" for both timeouts
    let idle_timeout = (settings.idle_timeout_secs > 0).then(|| Duration::from_secs(settings.idle_timeout_secs));
    let max_lifetime = (settings.max_lifetime_secs > 0).then(|| Duration::from_secs(settings.max_lifetime_secs));

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(idle_timeout)
        .max_lifetime(max_lifetime)
}

/// Connect to PostgreSQL and bring the schema up to date
#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let url = config
        .database_url()
        .context("No database URL configured; set DATABASE_URL")?;

    let connect_options: PgConnectOptions = url
        .parse::<PgConnectOptions>()
        .context("Invalid database URL")?
        .log_slow_statements(
            log::LevelFilter::Warn,
            Duration::from_millis(config.slow_statement_threshold_ms),
        );

    let pool = pool_options(&config.database.pool)
        .connect_with(connect_options)
        .await
        .context("Failed to connect to database")?;

    info!(
        max_connections = config.database.pool.max_connections,
        "Connected to database, running migrations"
    );
    migrator().run(&pool).await.context("Failed to run database migrations")?;

    Ok(pool)
}

/// Create CORS layer from configuration.
///
/// A `*` entry anywhere in `allowed_origins` allows any origin; tower-http rejects it inside an
/// explicit origin list.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allow_origin = if config
        .cors
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard))
    {
        AllowOrigin::from(Any)
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Origins are sent without a trailing slash, while Url always renders one for the root path
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let exposed_headers = config
        .cors
        .exposed_headers
        .iter()
        .map(|h| h.parse::<HeaderName>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_credentials(config.cors.allow_credentials)
        .expose_headers(exposed_headers);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// - `/mappings`: the mapping API, with the upload body limit on `POST`/`PUT`
/// - `/healthz`
/// - `/api-docs/openapi.json` and the Scalar viewer at `/docs`
/// - `/internal/metrics` when `enable_metrics` is set
/// - the embedded forms for every other path
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let upload_limit = usize::try_from(state.config.uploads.max_file_size.saturating_add(MULTIPART_OVERHEAD_BYTES))
        .unwrap_or(usize::MAX);

    let mapping_routes = Router::new()
        .route(
            api::models::mappings::MAPPINGS_PATH,
            get(api::handlers::mappings::get_mappings).merge(
                axum::routing::post(api::handlers::mappings::upsert_mapping)
                    .put(api::handlers::mappings::edit_mapping)
                    .layer(DefaultBodyLimit::max(upload_limit)),
            ),
        )
        .with_state(state.clone());

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(mapping_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .fallback(api::handlers::static_assets::serve_embedded_asset);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let cors_layer = create_cors_layer(&state.config)?;

    // Outermost first: every request is traced, including CORS preflights
    let router = router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(cors_layer),
    );

    Ok(router)
}

/// The HTTP server with its database pool.
///
/// 1. **Create**: [`Application::new`] connects to the database and runs migrations
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown future resolves, in-flight requests finish and the pool closes
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application around an existing pool, or connect according to the config if none
    /// is given. Migrations are applied either way.
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting docmap with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await.context("Failed to run database migrations")?;
                pool
            }
            None => setup_database(&config).await?,
        };

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "docmap listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
