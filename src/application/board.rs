//! Board view state and the actions that keep it in step with the posts backend.
//!
//! State is only changed after the backend confirmed an action. The lock is never held across a
//! backend call: inputs are copied out first and the result is merged into whatever the board
//! holds once the call returns.

use std::sync::Arc;

use postboard_api_types::{Post, PostId};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    application::remote::{PostsApi, RemoteError},
    domain::{
        error::DomainError,
        posts::{PostDraft, PostField, PostFields},
    },
};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("post `{0}` is not on the board")]
    UnknownPost(PostId),
    #[error("no post is being edited")]
    NotEditing,
}

impl BoardError {
    /// Failures that are only written to the log; the view does not react to them.
    pub fn is_silent(&self) -> bool {
        matches!(self, BoardError::Domain(_) | BoardError::Remote(_))
    }
}

/// Everything the single screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    posts: Vec<Post>,
    draft: PostDraft,
    draft_revision: u64,
    editing: Option<Post>,
}

impl BoardState {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    /// Bumped every time a create consumes the draft.
    pub fn draft_revision(&self) -> u64 {
        self.draft_revision
    }

    /// The post copy shown in the edit modal, if it is open.
    pub fn editing(&self) -> Option<&Post> {
        self.editing.as_ref()
    }

    fn find(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|post| &post.id == id)
    }

    fn append_created(&mut self, post: Post) {
        self.posts.push(post);
        self.draft.clear();
        self.draft_revision = self.draft_revision.wrapping_add(1);
    }

    fn replace_updated(&mut self, post: Post) {
        for slot in self.posts.iter_mut().filter(|slot| slot.id == post.id) {
            *slot = post.clone();
        }
        self.editing = None;
    }

    fn remove(&mut self, id: &PostId) {
        self.posts.retain(|post| &post.id != id);
    }
}

#[derive(Clone)]
pub struct BoardService {
    api: Arc<dyn PostsApi>,
    state: Arc<Mutex<BoardState>>,
}

impl BoardService {
    pub fn new(api: Arc<dyn PostsApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    pub async fn snapshot(&self) -> BoardState {
        self.state.lock().await.clone()
    }

    /// Start a fresh view and fill it with the backend's collection.
    ///
    /// On failure the board stays empty.
    pub async fn mount(&self) -> Result<usize, BoardError> {
        *self.state.lock().await = BoardState::default();

        let posts = self
            .api
            .list_posts()
            .await
            .map_err(|err| backend_failure("list", "error fetching posts", err))?;
        let count = posts.len();
        self.state.lock().await.posts = posts;

        info!(target = "postboard::board", count, "board mounted");
        Ok(count)
    }

    /// Apply a field change made in the new-post form rendered at `revision`.
    ///
    /// Changes from a form whose draft was already posted are dropped. Returns whether the change
    /// was applied.
    pub async fn change_draft(&self, revision: u64, field: PostField, value: String) -> bool {
        let mut state = self.state.lock().await;
        if revision != state.draft_revision {
            debug!(
                target = "postboard::board",
                revision,
                current = state.draft_revision,
                field = %field,
                "stale draft change dropped"
            );
            return false;
        }
        state.draft.set_field(field, value);
        true
    }

    /// Create the drafted post. Blank fields abort before any request is made.
    pub async fn add_post(&self) -> Result<Post, BoardError> {
        let request = self.state.lock().await.draft.to_create_request();
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                warn!(
                    target = "postboard::board",
                    operation = "create",
                    error = %err,
                    "post draft rejected"
                );
                return Err(err.into());
            }
        };

        let created = self
            .api
            .create_post(&request)
            .await
            .map_err(|err| backend_failure("create", "error adding post", err))?;

        self.state.lock().await.append_created(created.clone());
        debug!(target = "postboard::board", id = %created.id, "post added");
        Ok(created)
    }

    pub async fn open_editor(&self, id: &PostId) -> Result<Post, BoardError> {
        let mut state = self.state.lock().await;
        let post = state
            .find(id)
            .cloned()
            .ok_or_else(|| BoardError::UnknownPost(id.clone()))?;
        state.editing = Some(post.clone());
        Ok(post)
    }

    pub async fn change_editing(&self, field: PostField, value: String) -> Result<(), BoardError> {
        let mut state = self.state.lock().await;
        let editing = state.editing.as_mut().ok_or(BoardError::NotEditing)?;
        editing.set_field(field, value);
        Ok(())
    }

    /// Send the full editing copy and swap the server's answer into the list.
    pub async fn update_post(&self) -> Result<Post, BoardError> {
        let post = self
            .state
            .lock()
            .await
            .editing
            .clone()
            .ok_or(BoardError::NotEditing)?;

        let updated = self
            .api
            .update_post(&post)
            .await
            .map_err(|err| backend_failure("update", "error updating post", err))?;

        self.state.lock().await.replace_updated(updated.clone());
        debug!(target = "postboard::board", id = %updated.id, "post updated");
        Ok(updated)
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.editing = None;
    }

    pub async fn delete_post(&self, id: &PostId) -> Result<(), BoardError> {
        self.api
            .delete_post(id)
            .await
            .map_err(|err| backend_failure("delete", "error deleting post", err))?;

        self.state.lock().await.remove(id);
        debug!(target = "postboard::board", id = %id, "post deleted");
        Ok(())
    }
}

fn backend_failure(operation: &'static str, message: &'static str, err: RemoteError) -> BoardError {
    error!(
        target = "postboard::board",
        operation,
        error = %err,
        "{message}"
    );
    BoardError::Remote(err)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex as StdMutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use postboard_api_types::PostCreateRequest;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Create(PostCreateRequest),
        Update(Post),
        Delete(PostId),
    }

    #[derive(Default)]
    struct FakeApi {
        posts: Vec<Post>,
        failing: AtomicBool,
        next_id: AtomicUsize,
        calls: StdMutex<Vec<Call>>,
    }

    impl FakeApi {
        fn with_posts(posts: Vec<Post>) -> Self {
            Self {
                posts,
                ..Self::default()
            }
        }

        fn fail(&self) {
            self.failing.store(true, Ordering::SeqCst);
        }

        fn record(&self, call: Call) -> Result<(), RemoteError> {
            self.calls.lock().expect("calls lock").push(call);
            if self.failing.load(Ordering::SeqCst) {
                return Err(RemoteError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("calls lock").clone()
        }

        fn mutating_calls(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|call| !matches!(call, Call::List))
                .collect()
        }
    }

    #[async_trait]
    impl PostsApi for FakeApi {
        async fn list_posts(&self) -> Result<Vec<Post>, RemoteError> {
            self.record(Call::List)?;
            Ok(self.posts.clone())
        }

        async fn create_post(&self, request: &PostCreateRequest) -> Result<Post, RemoteError> {
            self.record(Call::Create(request.clone()))?;
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(Post {
                id: PostId::new(format!("srv-{n}")),
                title: request.title.clone(),
                content: request.content.clone(),
            })
        }

        async fn update_post(&self, post: &Post) -> Result<Post, RemoteError> {
            self.record(Call::Update(post.clone()))?;
            Ok(post.clone())
        }

        async fn delete_post(&self, id: &PostId) -> Result<(), RemoteError> {
            self.record(Call::Delete(id.clone()))
        }
    }

    fn post(id: &str, title: &str) -> Post {
        Post {
            id: PostId::new(id),
            title: title.into(),
            content: format!("{title} body"),
        }
    }

    fn sample_posts() -> Vec<Post> {
        vec![post("a", "First"), post("b", "Second"), post("c", "Third")]
    }

    async fn mounted(api: Arc<FakeApi>) -> BoardService {
        let board = BoardService::new(api);
        board.mount().await.expect("mount");
        board
    }

    #[tokio::test]
    async fn mount_lists_posts_in_server_order() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = BoardService::new(api.clone());

        let count = board.mount().await.expect("mount");

        assert_eq!(count, 3);
        assert_eq!(board.snapshot().await.posts(), sample_posts().as_slice());
        assert_eq!(api.calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn mount_failure_leaves_empty_board() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        api.fail();
        let board = BoardService::new(api);

        let err = board.mount().await.expect_err("mount fails");

        assert!(err.is_silent());
        assert!(board.snapshot().await.posts().is_empty());
    }

    #[tokio::test]
    async fn mount_resets_drafts_from_previous_view() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api).await;
        board.change_draft(0, PostField::Title, "left over".into()).await;
        board.open_editor(&PostId::new("a")).await.expect("open");

        board.mount().await.expect("remount");

        let state = board.snapshot().await;
        assert_eq!(state.draft(), &PostDraft::default());
        assert!(state.editing().is_none());
    }

    #[tokio::test]
    async fn add_post_sends_draft_and_appends_once() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        board.change_draft(0, PostField::Title, "A".into()).await;
        board.change_draft(0, PostField::Content, "B".into()).await;

        let created = board.add_post().await.expect("create");

        assert_eq!(
            api.mutating_calls(),
            vec![Call::Create(PostCreateRequest {
                title: "A".into(),
                content: "B".into(),
            })]
        );
        let state = board.snapshot().await;
        assert_eq!(state.posts().len(), 4);
        assert_eq!(state.posts().last(), Some(&created));
        assert_eq!(
            state.posts().iter().filter(|p| p.id == created.id).count(),
            1
        );
        assert_eq!(state.draft(), &PostDraft::default());
    }

    #[tokio::test]
    async fn late_draft_change_cannot_revive_posted_draft() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        board.change_draft(0, PostField::Title, "A".into()).await;
        board.change_draft(0, PostField::Content, "B".into()).await;
        board.add_post().await.expect("create");

        let applied = board.change_draft(0, PostField::Title, "A".into()).await;

        assert!(!applied);
        let state = board.snapshot().await;
        assert_eq!(state.draft(), &PostDraft::default());
        assert_eq!(state.draft_revision(), 1);
        assert!(board.change_draft(1, PostField::Title, "next".into()).await);
        assert_eq!(board.snapshot().await.draft().title, "next");
    }

    #[tokio::test]
    async fn failed_create_keeps_draft_revision() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        board.change_draft(0, PostField::Title, "A".into()).await;
        board.change_draft(0, PostField::Content, "B".into()).await;
        api.fail();

        board.add_post().await.expect_err("backend down");

        assert_eq!(board.snapshot().await.draft_revision(), 0);
        assert!(board.change_draft(0, PostField::Content, "C".into()).await);
    }

    #[tokio::test]
    async fn blank_draft_issues_no_request() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        board.change_draft(0, PostField::Title, "A".into()).await;
        board.change_draft(0, PostField::Content, "  ".into()).await;

        let err = board.add_post().await.expect_err("blank content");

        assert!(matches!(err, BoardError::Domain(_)));
        assert!(api.mutating_calls().is_empty());
        let state = board.snapshot().await;
        assert_eq!(state.posts().len(), 3);
        assert_eq!(state.draft().title, "A");
    }

    #[tokio::test]
    async fn failed_create_keeps_list_and_draft() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        board.change_draft(0, PostField::Title, "A".into()).await;
        board.change_draft(0, PostField::Content, "B".into()).await;
        api.fail();

        let err = board.add_post().await.expect_err("backend down");

        assert!(err.is_silent());
        let state = board.snapshot().await;
        assert_eq!(state.posts(), sample_posts().as_slice());
        assert_eq!(state.draft().title, "A");
        assert_eq!(state.draft().content, "B");
    }

    #[tokio::test]
    async fn update_sends_full_record_and_replaces_match_only() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        let id = PostId::new("b");
        board.open_editor(&id).await.expect("open");
        board
            .change_editing(PostField::Title, "Second, revised".into())
            .await
            .expect("edit title");

        let updated = board.update_post().await.expect("update");

        let expected = Post {
            id: id.clone(),
            title: "Second, revised".into(),
            content: "Second body".into(),
        };
        assert_eq!(updated, expected);
        assert_eq!(api.mutating_calls(), vec![Call::Update(expected.clone())]);

        let state = board.snapshot().await;
        assert_eq!(
            state.posts(),
            &[post("a", "First"), expected, post("c", "Third")]
        );
        assert!(state.editing().is_none());
    }

    #[tokio::test]
    async fn editing_does_not_touch_the_list_before_update() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api).await;
        board.open_editor(&PostId::new("a")).await.expect("open");
        board
            .change_editing(PostField::Content, "changed".into())
            .await
            .expect("edit");

        let state = board.snapshot().await;
        assert_eq!(state.posts(), sample_posts().as_slice());
        assert_eq!(state.editing().map(|p| p.content.as_str()), Some("changed"));
    }

    #[tokio::test]
    async fn failed_update_keeps_list_and_editor() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        board.open_editor(&PostId::new("c")).await.expect("open");
        board
            .change_editing(PostField::Title, "nope".into())
            .await
            .expect("edit");
        api.fail();

        board.update_post().await.expect_err("backend down");

        let state = board.snapshot().await;
        assert_eq!(state.posts(), sample_posts().as_slice());
        assert_eq!(state.editing().map(|p| p.title.as_str()), Some("nope"));
    }

    #[tokio::test]
    async fn cancel_discards_editing_copy() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        board.open_editor(&PostId::new("a")).await.expect("open");

        board.cancel_edit().await;

        assert!(board.snapshot().await.editing().is_none());
        let err = board.update_post().await.expect_err("nothing to update");
        assert!(matches!(err, BoardError::NotEditing));
        assert!(api.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn open_editor_rejects_unknown_post() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api).await;

        let err = board
            .open_editor(&PostId::new("zzz"))
            .await
            .expect_err("unknown");

        assert!(matches!(err, BoardError::UnknownPost(ref id) if id.as_str() == "zzz"));
        assert!(!err.is_silent());
    }

    #[tokio::test]
    async fn change_editing_requires_open_editor() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api).await;

        let err = board
            .change_editing(PostField::Title, "x".into())
            .await
            .expect_err("no editor");

        assert!(matches!(err, BoardError::NotEditing));
    }

    #[tokio::test]
    async fn delete_removes_only_that_post() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        let id = PostId::new("b");

        board.delete_post(&id).await.expect("delete");

        assert_eq!(api.mutating_calls(), vec![Call::Delete(id)]);
        assert_eq!(
            board.snapshot().await.posts(),
            &[post("a", "First"), post("c", "Third")]
        );
    }

    #[tokio::test]
    async fn failed_delete_keeps_list() {
        let api = Arc::new(FakeApi::with_posts(sample_posts()));
        let board = mounted(api.clone()).await;
        api.fail();

        board
            .delete_post(&PostId::new("a"))
            .await
            .expect_err("backend down");

        assert_eq!(board.snapshot().await.posts(), sample_posts().as_slice());
    }
}
