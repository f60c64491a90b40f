//! BlogPost domain model.
//!
//! # Responsibility
//! - Define the single persisted entity and its identifier.
//! - Define the patch shape accepted by update flows.
//!
//! # Invariants
//! - `BlogPostId(0)` means "not yet assigned"; persisted ids are positive.
//! - `id` is immutable once the store has assigned or accepted it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Integer primary key of a blog post.
///
/// Serialized as a bare integer. The zero value marks a record whose id the
/// store should assign on insert.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct BlogPostId(i64);

impl BlogPostId {
    /// Placeholder id for records not yet inserted.
    pub const UNASSIGNED: Self = Self(0);

    /// Wraps a caller-provided id.
    ///
    /// # Errors
    /// - Returns `NonPositiveId` for zero or negative values.
    pub fn new(value: i64) -> Result<Self, BlogPostValidationError> {
        if value <= 0 {
            return Err(BlogPostValidationError::NonPositiveId(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<i64> for BlogPostId {
    type Error = BlogPostValidationError;

    // Zero is accepted here so that seed files may leave ids to the store.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(BlogPostValidationError::NonPositiveId(value));
        }
        Ok(Self(value))
    }
}

impl From<BlogPostId> for i64 {
    fn from(value: BlogPostId) -> Self {
        value.0
    }
}

impl Display for BlogPostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation error for blog post identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogPostValidationError {
    NonPositiveId(i64),
}

impl Display for BlogPostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(value) => {
                write!(f, "blog post id must be positive, got {value}")
            }
        }
    }
}

impl Error for BlogPostValidationError {}

/// The persisted blog post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(default, alias = "Id")]
    pub id: BlogPostId,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Content")]
    pub content: String,
}

impl BlogPost {
    /// Creates a record whose id will be assigned by the store on persist.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: BlogPostId::UNASSIGNED,
            title: title.into(),
            content: content.into(),
        }
    }

    /// Creates a record with a caller-provided id.
    ///
    /// Used by seed/import paths where identity already exists externally.
    pub fn with_id(
        id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, BlogPostValidationError> {
        Ok(Self {
            id: BlogPostId::new(id)?,
            title: title.into(),
            content: content.into(),
        })
    }

    /// Overwrites title/content from `patch`; `id` is never touched.
    pub fn apply(&mut self, patch: BlogPostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
    }
}

/// Update input for an existing blog post.
///
/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPostPatch {
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    #[serde(default, alias = "Content")]
    pub content: Option<String>,
}

impl BlogPostPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }
}

/// A full record replaces both text fields; its id is ignored.
impl From<BlogPost> for BlogPostPatch {
    fn from(value: BlogPost) -> Self {
        Self {
            title: Some(value.title),
            content: Some(value.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlogPost, BlogPostId, BlogPostPatch, BlogPostValidationError};

    #[test]
    fn new_leaves_id_unassigned() {
        let post = BlogPost::new("t", "c");
        assert_eq!(post.id, BlogPostId::UNASSIGNED);
        assert!(!post.id.is_assigned());
    }

    #[test]
    fn with_id_rejects_zero_and_negative() {
        assert_eq!(
            BlogPost::with_id(0, "t", "c").unwrap_err(),
            BlogPostValidationError::NonPositiveId(0)
        );
        assert_eq!(
            BlogPost::with_id(-4, "t", "c").unwrap_err(),
            BlogPostValidationError::NonPositiveId(-4)
        );
    }

    #[test]
    fn apply_partial_patch_keeps_other_field_and_id() {
        let mut post = BlogPost::with_id(3, "C", "c").unwrap();
        post.apply(BlogPostPatch::title("X"));
        assert_eq!(post, BlogPost::with_id(3, "X", "c").unwrap());
    }
}
