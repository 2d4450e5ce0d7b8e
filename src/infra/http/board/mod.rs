mod forms;
mod handlers;

pub(super) use handlers::{
    board_page, draft_change, editing_cancel, editing_change, editing_update, post_create,
    post_delete, post_edit,
};
