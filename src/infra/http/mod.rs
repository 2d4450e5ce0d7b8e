mod board;
mod middleware;
mod selectors;
mod state;

pub use state::HttpState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use self::middleware::{log_responses, set_request_context};

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(board::board_page))
        .route("/draft", post(board::draft_change))
        .route("/posts", post(board::post_create))
        .route("/posts/{id}/edit", post(board::post_edit))
        .route("/posts/{id}/delete", post(board::post_delete))
        .route("/editing", post(board::editing_change))
        .route("/editing/update", post(board::editing_update))
        .route("/editing/cancel", post(board::editing_cancel))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
