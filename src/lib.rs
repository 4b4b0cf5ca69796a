//! Backend for citizen complaint filing.
//!
//! Citizens file complaints (subject, description, address, coordinates,
//! optional photo) keyed by their email; staff list complaints and move them
//! through the Pending -> Working -> Completed lifecycle. A secondary endpoint
//! proxies text to Google Cloud TTS and streams back MP3 audio.
//!
//! Records live in MongoDB; photos go to local disk or Cloudinary. All
//! service clients are constructed once in [`state::AppState`] and injected
//! into handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post, put},
    Router,
};

use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod database;
pub mod error;
pub mod media;
pub mod model;
pub mod routes;
pub mod speech;
pub mod state;
pub mod utils;

use routes::{
    all_complaints_handler, file_complaint_handler, health_handler, my_complaints_handler,
    speak_handler, update_status_handler,
};
use state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Static route table. Kept separate from [`start_server`] so tests can drive
/// the router directly with fake service handles.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/api/complaint/file", post(file_complaint_handler))
        .route("/api/complaint/all", get(all_complaints_handler))
        .route("/api/complaint/my-complaints", get(my_complaints_handler))
        .route(
            "/api/complaint/update-status/{id}",
            put(update_status_handler),
        )
        .route("/api/tts/speak", post(speak_handler))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await?;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = build_router(state).layer(cors);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
