//! HTTP surface: route table, CORS and the listener.

pub mod extract;
pub mod files;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{delete, get, patch, post},
    Router,
};
use log::info;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::{
    audio::commands as audio, events::commands as events, feedback, journals::commands as journals,
    profiles::commands as profiles, reminders::commands as reminders, stats::commands as stats,
    timer::commands as timers, utils::commands as utils, videos::commands as videos, AppState,
};

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

pub fn build_router(state: AppState) -> Router {
    let web_root = state.web_root.clone();

    let router = Router::new()
        .route("/api/log", post(events::log_event))
        .route("/api/stats", get(stats::get_stats))
        .route("/export.csv", get(stats::export_log))
        .route("/export_daily.csv", get(stats::export_daily))
        .route("/export_summary.csv", get(stats::export_summary))
        .route(
            "/api/timers",
            get(timers::list_timers).post(timers::create_timer),
        )
        .route("/api/timers/active", get(timers::active_timers))
        .route("/api/timers/{id}/pause", post(timers::pause_timer))
        .route("/api/timers/{id}/resume", post(timers::resume_timer))
        .route("/api/timers/{id}/stop", post(timers::stop_timer))
        .route(
            "/api/reminders",
            get(reminders::list_reminders).post(reminders::create_reminder),
        )
        .route(
            "/api/reminders/{id}",
            patch(reminders::update_reminder).delete(reminders::delete_reminder),
        )
        .route(
            "/api/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route("/api/profiles/active", get(profiles::active_profile))
        .route("/api/profiles/{id}/activate", post(profiles::activate_profile))
        .route(
            "/api/profiles/{id}",
            patch(profiles::update_profile).delete(profiles::delete_profile),
        )
        .route(
            "/api/journals",
            get(journals::list_journals).post(journals::create_journal),
        )
        .route(
            "/api/journals/{id}",
            get(journals::get_journal)
                .patch(journals::update_journal)
                .delete(journals::delete_journal),
        )
        .route("/api/feedback", post(feedback::submit_feedback))
        .route("/api/feedback/export.csv", get(feedback::export_feedback))
        .route(
            "/api/upload",
            post(audio::upload_audio).layer(DefaultBodyLimit::disable()),
        )
        .route("/uploads/{*filename}", get(audio::serve_upload))
        .route("/api/ambient/sounds", get(audio::ambient_sounds))
        .route("/ambient/{*filename}", get(audio::serve_ambient))
        .route("/api/utils/mkdir", post(utils::make_dir))
        .route("/api/utils/ls", get(utils::list_dir))
        .route("/api/videos/search", get(videos::search_videos))
        .route("/api/videos/download", post(videos::download_video))
        .route("/api/videos/library", get(videos::video_library))
        .route("/api/videos/toggle-watched", post(videos::toggle_watched))
        .route("/api/videos/delete", delete(videos::delete_video))
        .route("/data/videos/{*filename}", get(videos::serve_video))
        .layer(build_cors())
        .with_state(state);

    match web_root {
        Some(root) => router.fallback_service(ServeDir::new(root)),
        None => router,
    }
}

pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");
    axum::serve(listener, app).await.context("server stopped")?;
    Ok(())
}
