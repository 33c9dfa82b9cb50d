pub mod applog;
pub mod auth;
pub mod error;
pub mod invoices;
pub mod meta;
pub mod middleware;

use std::path::Path;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::AppState;

/// Builds the full route table wrapped in the request pipeline.
///
/// Layers run outermost first: request id, then request logging, then the
/// response header policy, then the route itself.
pub fn router(state: AppState, statics_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(auth::get_index))
        .route("/__heartbeat__", get(meta::heartbeat))
        .route("/__version__", get(meta::version))
        .route("/invoice", post(invoices::post_invoice))
        .route(
            "/invoice/{id}",
            get(invoices::get_invoice)
                .put(invoices::put_invoice)
                .delete(invoices::delete_invoice),
        )
        .route("/invoice/delete/{id}", get(invoices::delete_invoice))
        .nest_service("/statics", ServeDir::new(statics_dir.as_ref()))
        .fallback(meta::not_found)
        .with_state(state)
        .layer(from_fn(middleware::set_response_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(from_fn(middleware::add_request_id))
}
