//! Board handlers: one per user action on the single screen.

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use postboard_api_types::PostId;
use tracing::debug;

use crate::{
    application::{board::BoardError, error::HttpError, stream::PatchStream},
    infra::http::{HttpState, selectors::BOARD},
    presentation::{
        board::{BoardPageTemplate, BoardRegionTemplate, BoardView},
        views::{render_fragment, render_template_response},
    },
};

use super::forms::{DraftForm, PostFieldsForm};

/// GET / - a full page load mounts a fresh board.
pub(crate) async fn board_page(State(state): State<HttpState>) -> Response {
    match state.board.mount().await {
        Ok(count) => debug!(
            target = "postboard::http::board",
            count, "rendering mounted board"
        ),
        Err(_) => debug!(
            target = "postboard::http::board",
            "rendering board without posts"
        ),
    }

    let snapshot = state.board.snapshot().await;
    let view = BoardView::from(&snapshot);
    render_template_response(BoardPageTemplate { view }, StatusCode::OK)
}

/// POST /draft - keystrokes in the new-post form. Nothing is re-rendered.
pub(crate) async fn draft_change(
    State(state): State<HttpState>,
    Form(form): Form<DraftForm>,
) -> Response {
    apply_draft_fields(&state, form).await;
    PatchStream::new().into_response()
}

/// POST /posts - sync the draft with the submitted form, then create.
pub(crate) async fn post_create(
    State(state): State<HttpState>,
    Form(form): Form<DraftForm>,
) -> Response {
    if !apply_draft_fields(&state, form).await {
        return PatchStream::new().into_response();
    }
    let result = state.board.add_post().await;
    respond_with_outcome(&state, result, "infra::http::board::post_create").await
}

/// POST /posts/{id}/edit - open the modal on a copy of the listed post.
pub(crate) async fn post_edit(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Response {
    let result = state.board.open_editor(&PostId::from(id)).await;
    respond_with_outcome(&state, result, "infra::http::board::post_edit").await
}

/// POST /posts/{id}/delete
pub(crate) async fn post_delete(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Response {
    let result = state.board.delete_post(&PostId::from(id)).await;
    respond_with_outcome(&state, result, "infra::http::board::post_delete").await
}

/// POST /editing - keystrokes in the edit modal. Nothing is re-rendered.
pub(crate) async fn editing_change(
    State(state): State<HttpState>,
    Form(form): Form<PostFieldsForm>,
) -> Response {
    match apply_editing_fields(&state, form).await {
        Ok(()) => PatchStream::new().into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

/// POST /editing/update - sync the modal with the submitted form, then update.
pub(crate) async fn editing_update(
    State(state): State<HttpState>,
    Form(form): Form<PostFieldsForm>,
) -> Response {
    if let Err(err) = apply_editing_fields(&state, form).await {
        return HttpError::from(err).into_response();
    }
    let result = state.board.update_post().await;
    respond_with_outcome(&state, result, "infra::http::board::editing_update").await
}

/// POST /editing/cancel - close the modal and drop the editing copy.
pub(crate) async fn editing_cancel(State(state): State<HttpState>) -> Response {
    state.board.cancel_edit().await;
    respond_with_board(&state, "infra::http::board::editing_cancel").await
}

/// A form rendered before the last create carries an old revision; its fields are ignored and
/// `false` is returned.
async fn apply_draft_fields(state: &HttpState, form: DraftForm) -> bool {
    let (revision, fields) = form.into_parts();
    for (field, value) in fields.into_fields() {
        if !state.board.change_draft(revision, field, value).await {
            return false;
        }
    }
    true
}

async fn apply_editing_fields(state: &HttpState, form: PostFieldsForm) -> Result<(), BoardError> {
    for (field, value) in form.into_fields() {
        state.board.change_editing(field, value).await?;
    }
    Ok(())
}

/// Re-render after success. Silent failures were logged by the board and leave the view as is.
async fn respond_with_outcome<T>(
    state: &HttpState,
    result: Result<T, BoardError>,
    source: &'static str,
) -> Response {
    match result {
        Ok(_) => respond_with_board(state, source).await,
        Err(err) if err.is_silent() => PatchStream::new().into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn respond_with_board(state: &HttpState, source: &'static str) -> Response {
    let snapshot = state.board.snapshot().await;
    let template = BoardRegionTemplate {
        view: BoardView::from(&snapshot),
    };

    match render_fragment(&template, source) {
        Ok(html) => PatchStream::replace(BOARD, html).into_response(),
        Err(err) => err.into_response(),
    }
}
