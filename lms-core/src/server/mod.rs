//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::jwt::JwtManager;
use crate::middleware::{ObservabilityLayer, SanitizedMakeSpan};
use crate::repository::{GradeRepositoryImpl, RoomRepositoryImpl};
use crate::service::{GradeService, RoomService};
use crate::state::{HasGrades, HasReadiness, HasRooms};
use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// How often the pool gauges are refreshed
const POOL_METRICS_INTERVAL: Duration = Duration::from_secs(15);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub room_service: Arc<RoomService<RoomRepositoryImpl>>,
    pub grade_service: Arc<GradeService<GradeRepositoryImpl>>,
    pub jwt_manager: JwtManager,
}

impl AppState {
    /// Wire repositories and services over an open pool
    pub fn new(config: &Config, db_pool: PgPool) -> Self {
        let room_repo = Arc::new(RoomRepositoryImpl::new(db_pool.clone()));
        let grade_repo = Arc::new(GradeRepositoryImpl::new(db_pool.clone()));
        let jwt_manager = JwtManager::new(config.jwt.clone());

        Self {
            db_pool,
            room_service: Arc::new(RoomService::new(room_repo)),
            grade_service: Arc::new(GradeService::new(grade_repo)),
            jwt_manager,
        }
    }
}

impl HasRooms for AppState {
    type RoomService = RoomService<RoomRepositoryImpl>;

    fn room_service(&self) -> &Self::RoomService {
        &self.room_service
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }
}

impl HasGrades for AppState {
    type GradeService = GradeService<GradeRepositoryImpl>;

    fn grade_service(&self) -> &Self::GradeService {
        &self.grade_service
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }
}

#[async_trait]
impl HasReadiness for AppState {
    async fn check_ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok()
    }
}

/// Build the HTTP router with generic state type
///
/// Generic over the state so tests can drive the production routes with
/// in-memory services.
pub fn build_router<S>(state: S) -> Router
where
    S: HasRooms + HasGrades + HasReadiness,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        // Room inventory
        .route(
            "/api/v1/rooms",
            get(api::room::fetch_rooms::<S>)
                .post(api::room::add_rooms::<S>)
                .put(api::room::update_rooms::<S>)
                .delete(api::room::delete_rooms::<S>),
        )
        .route(
            "/api/v1/rooms/{room_id}/history",
            get(api::room::fetch_room_history::<S>),
        )
        .route(
            "/api/v1/academic-years/{academic_year_id}/rooms",
            get(api::room::fetch_rooms_by_academic_year::<S>),
        )
        // Grades
        .route(
            "/api/v1/grades",
            get(api::grade::fetch_grades::<S>).post(api::grade::add_grade::<S>),
        )
        .route(
            "/api/v1/grades/{grade_id}",
            get(api::grade::get_grade::<S>).delete(api::grade::delete_grade::<S>),
        )
        .route(
            "/api/v1/grades/{grade_id}/history",
            get(api::grade::fetch_grade_history::<S>),
        )
        .route(
            "/api/v1/students/{student_id}/grades",
            get(api::grade::fetch_grades_by_student::<S>),
        )
        .route(
            "/api/v1/subjects/{subject_id}/grades",
            get(api::grade::fetch_grades_by_subject::<S>),
        )
        .layer(TraceLayer::new_for_http().make_span_with(SanitizedMakeSpan))
        .layer(ObservabilityLayer)
        .layer(cors)
        .with_state(state)
}

/// Router serving `/metrics`, mounted next to the API router
pub fn metrics_router(handle: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/metrics", get(api::metrics::metrics_handler))
        .with_state(Arc::new(handle))
}

/// Connect to the database and serve HTTP until a shutdown signal arrives
pub async fn run(config: Config, prometheus: Option<PrometheusHandle>) -> Result<()> {
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    info!("Connected to database");

    if prometheus.is_some() {
        spawn_pool_metrics(db_pool.clone());
    }

    let http_addr = config.http_addr();
    let state = AppState::new(&config, db_pool);
    let app = build_router(state).merge(metrics_router(prometheus));

    let listener = TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;
    info!("HTTP server started on {}", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Periodically publish pool occupancy
fn spawn_pool_metrics(pool: PgPool) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(POOL_METRICS_INTERVAL);
        loop {
            ticker.tick().await;
            metrics::gauge!("lms_db_pool_connections").set(f64::from(pool.size()));
            metrics::gauge!("lms_db_pool_connections_idle").set(pool.num_idle() as f64);
        }
    });
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
