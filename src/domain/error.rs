use thiserror::Error;

use super::posts::PostField;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("title and content cannot be empty (`{field}` is blank)")]
    BlankField { field: PostField },
}

impl DomainError {
    pub fn blank(field: PostField) -> Self {
        Self::BlankField { field }
    }
}
