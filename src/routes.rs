use crate::{
    routes::{
        index::get_index_route,
        students::{post_add_student, post_delete_student, post_update_student},
    },
    state::RosterState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, services::ServeDir,
    trace::TraceLayer,
};

pub mod index;
pub mod students;

pub fn router(state: RosterState) -> Router {
    let static_dir = state.config().asset_config().static_dir.clone();
    let max_upload_bytes = state.config().max_upload_bytes();

    Router::new()
        .route("/", get(get_index_route))
        .route("/add_student", post(post_add_student))
        .route("/update_student/{idno}", post(post_update_student))
        .route("/delete/{idno}", post(post_delete_student))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

///`302 Found` back to the listing
pub fn back_to_listing() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}
