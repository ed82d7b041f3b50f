use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::{
    handlers,
    middleware::{metrics_middleware, require_admin},
    pdfs, uploads,
};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    // Public API routes
    let public_routes = Router::new()
        .route("/test", get(handlers::liveness))
        .route("/pdfs", get(pdfs::list_pdfs));

    // Admin-only routes; the gate runs only when one of these matches
    let admin_routes = Router::new()
        .route("/pdfs", post(pdfs::create_pdf))
        .route("/pdfs/{id}", delete(pdfs::delete_pdf))
        .route(
            "/upload-pdf",
            post(uploads::upload_pdf).layer(DefaultBodyLimit::max(server.max_upload_bytes)),
        )
        .route("/generate-image", post(uploads::generate_image))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_admin,
        ));

    let api_routes = public_routes
        .merge(admin_routes)
        .with_state(Arc::clone(&state));

    // Static files with SPA fallback; reached only when nothing above matches
    let serve_dir =
        ServeDir::new(&server.static_dir).fallback(ServeFile::new(server.index_path()));

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(handlers::metrics))
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
