use askama::Template;
use postboard_api_types::{Post, PostId};

use crate::application::board::BoardState;

pub const BOARD_HEADING: &str = "My Blog";

#[derive(Clone)]
pub struct PostCardView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub edit_action: String,
    pub delete_action: String,
}

#[derive(Clone)]
pub struct PostEditorView {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Clone)]
pub struct BoardView {
    pub heading: &'static str,
    pub draft_revision: u64,
    pub draft_title: String,
    pub draft_content: String,
    pub posts: Vec<PostCardView>,
    pub editor: Option<PostEditorView>,
}

impl From<&BoardState> for BoardView {
    fn from(state: &BoardState) -> Self {
        Self {
            heading: BOARD_HEADING,
            draft_revision: state.draft_revision(),
            draft_title: state.draft().title.clone(),
            draft_content: state.draft().content.clone(),
            posts: state.posts().iter().map(PostCardView::from).collect(),
            editor: state.editing().map(|post| PostEditorView {
                id: post.id.to_string(),
                title: post.title.clone(),
                content: post.content.clone(),
            }),
        }
    }
}

impl From<&Post> for PostCardView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            content: post.content.clone(),
            edit_action: post_action_path(&post.id, "edit"),
            delete_action: post_action_path(&post.id, "delete"),
        }
    }
}

/// `/posts/{id}/{action}` with the id escaped as a single path segment.
fn post_action_path(id: &PostId, action: &str) -> String {
    let segment = url::form_urlencoded::byte_serialize(id.as_str().as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("/posts/{segment}/{action}")
}

#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardPageTemplate {
    pub view: BoardView,
}

/// The patchable region: post grid and edit modal.
#[derive(Template)]
#[template(path = "board_region.html")]
pub struct BoardRegionTemplate {
    pub view: BoardView,
}
