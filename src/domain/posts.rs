//! Post drafts and the field-level edits applied to them.

use std::fmt;

use postboard_api_types::{Post, PostCreateRequest};

use super::error::DomainError;

/// Editable text fields shared by the new-post draft and the editing draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostField {
    Title,
    Content,
}

impl PostField {
    pub fn as_str(self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Content => "content",
        }
    }
}

impl fmt::Display for PostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable access to the text fields of a post-shaped record.
pub trait PostFields {
    fn field_mut(&mut self, field: PostField) -> &mut String;

    fn set_field(&mut self, field: PostField, value: String) {
        *self.field_mut(field) = value;
    }
}

impl PostFields for Post {
    fn field_mut(&mut self, field: PostField) -> &mut String {
        match field {
            PostField::Title => &mut self.title,
            PostField::Content => &mut self.content,
        }
    }
}

/// Unsaved fields of the new-post form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    /// Build the create payload. Blank checks trim, the payload does not.
    pub fn to_create_request(&self) -> Result<PostCreateRequest, DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::blank(PostField::Title));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::blank(PostField::Content));
        }

        Ok(PostCreateRequest {
            title: self.title.clone(),
            content: self.content.clone(),
        })
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
    }
}

impl PostFields for PostDraft {
    fn field_mut(&mut self, field: PostField) -> &mut String {
        match field {
            PostField::Title => &mut self.title,
            PostField::Content => &mut self.content,
        }
    }
}
