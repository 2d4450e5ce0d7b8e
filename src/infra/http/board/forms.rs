use serde::Deserialize;

use crate::domain::posts::PostField;

/// Datastar submits the enclosing form; absent inputs are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PostFieldsForm {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
}

/// The new-post form also carries the draft revision it was rendered with.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DraftForm {
    pub(crate) revision: u64,
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
}

impl DraftForm {
    pub(crate) fn into_parts(self) -> (u64, PostFieldsForm) {
        let fields = PostFieldsForm {
            title: self.title,
            content: self.content,
        };
        (self.revision, fields)
    }
}

impl PostFieldsForm {
    pub(crate) fn into_fields(self) -> impl Iterator<Item = (PostField, String)> {
        [
            (PostField::Title, self.title),
            (PostField::Content, self.content),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}
