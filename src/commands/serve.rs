use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::Caller;
use crate::controllers::paste;
use crate::error::ApiError;
use crate::types::api::{NewPaste, PasteView};
use crate::App;

/// Usage instructions served at the root.
const USAGE: &str = include_str!("../../assets/usage.txt");

pub async fn run(app: App) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], app.config.port));
    info!("listening on {addr}");

    axum::Server::bind(&addr)
        .serve(router(app).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the route table for the paste API.
pub fn router(app: App) -> Router {
    let max_paste_size = app.config.limits.max_paste_size;

    // Layers wrap the routes registered so far, so the identity check sits
    // outside the body limit and the index stays public.
    Router::new()
        .route(
            "/paste/v1",
            get(missing_id).post(create_paste).delete(missing_id),
        )
        .route(
            "/paste/v1/",
            get(missing_id).post(create_paste).delete(missing_id),
        )
        .route("/paste/v1/:id", get(get_paste).delete(delete_paste))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_paste_size))
        .route_layer(middleware::from_fn_with_state(app.clone(), require_caller))
        .route("/", get(index))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Reject unauthenticated requests before anything reads the body.
async fn require_caller(_caller: Caller, request: Request<Body>, next: Next<Body>) -> Response {
    next.run(request).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn index() -> &'static str {
    USAGE
}

async fn missing_id(_caller: Caller) -> ApiError {
    ApiError::MissingPasteId
}

async fn get_paste(
    State(app): State<App>,
    caller: Caller,
    Path(id): Path<String>,
) -> crate::ApiResult<Json<PasteView>> {
    let paste = paste::get(&app, &id, caller.identity()).await?;
    Ok(Json(paste))
}

async fn create_paste(
    State(app): State<App>,
    caller: Caller,
    body: Result<Json<NewPaste>, JsonRejection>,
) -> crate::ApiResult<Json<PasteView>> {
    let Json(new_paste) = body?;
    let paste = paste::create(&app, new_paste, caller.identity()).await?;
    Ok(Json(paste))
}

async fn delete_paste(
    State(app): State<App>,
    caller: Caller,
    Path(id): Path<String>,
) -> crate::ApiResult<()> {
    paste::delete(&app, &id, caller.identity()).await
}
