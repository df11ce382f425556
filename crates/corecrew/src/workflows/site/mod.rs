//! Public marketing pages: landing, about and services pages, job listings, crawler files.

pub mod views;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::workflows::hiring::catalog::PositionCatalog;

pub fn site_router(catalog: Arc<PositionCatalog>) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/about", get(about_handler))
        .route("/services", get(services_handler))
        .route("/jobs", get(jobs_handler))
        .route("/jobs/{key}", get(job_handler))
        .route("/robots.txt", get(robots_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .with_state(catalog)
}

async fn landing_handler(State(catalog): State<Arc<PositionCatalog>>) -> Html<String> {
    Html(views::landing(&catalog))
}

async fn about_handler() -> Html<String> {
    Html(views::about())
}

async fn services_handler(State(catalog): State<Arc<PositionCatalog>>) -> Html<String> {
    Html(views::services(&catalog))
}

async fn jobs_handler(State(catalog): State<Arc<PositionCatalog>>) -> Html<String> {
    Html(views::jobs_index(&catalog))
}

async fn job_handler(
    State(catalog): State<Arc<PositionCatalog>>,
    Path(key): Path<String>,
) -> Response {
    match catalog.get(&key) {
        Some(position) => Html(views::job_detail(position)).into_response(),
        None => views::not_found(),
    }
}

async fn robots_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        views::robots_txt(),
    )
}

async fn sitemap_handler(State(catalog): State<Arc<PositionCatalog>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        views::sitemap_xml(&catalog),
    )
}
