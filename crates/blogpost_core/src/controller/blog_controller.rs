//! Blog post controller.
//!
//! # Invariants
//! - Each operation performs exactly one store lookup or queue call, then
//!   persists when it mutates.
//! - Missing ids yield `ActionResult::NotFound`; only persistence failures
//!   surface as `Err`.
//! - The controller keeps no state between calls beyond the store it wraps.

use crate::model::blog_post::{BlogPost, BlogPostId, BlogPostPatch};
use crate::repo::blog_post_repo::{BlogPostStore, RepoError};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outcome of one controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult<T> {
    /// Read succeeded with a payload.
    Success(T),
    /// A new record was stored.
    Created(T),
    /// Mutation succeeded with nothing to return.
    NoContent,
    /// No record with the requested id.
    NotFound(BlogPostId),
}

impl<T> ActionResult<T> {
    /// Conventional HTTP status for this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Created(_) => 201,
            Self::NoContent => 204,
            Self::NotFound(_) => 404,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the payload of `Success`/`Created`, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) | Self::Created(value) => Some(value),
            Self::NoContent | Self::NotFound(_) => None,
        }
    }
}

pub type ControllerResult<T> = Result<ActionResult<T>, ControllerError>;

/// Failure raised by controller operations.
#[derive(Debug)]
pub enum ControllerError {
    /// Durable read or write failed; carried through uninterpreted.
    Persistence(RepoError),
    /// Store accepted a write but did not report the record back.
    InconsistentState(&'static str),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent store state: {details}")
            }
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// Thin controller over any `BlogPostStore`.
pub struct BlogController<S: BlogPostStore> {
    store: S,
}

impl<S: BlogPostStore> BlogController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Lists every stored blog post.
    pub fn list_blog_posts(&self) -> ControllerResult<Vec<BlogPost>> {
        let posts = self.store.list_all()?;
        debug!(
            "event=blog_post_list module=controller status=ok count={}",
            posts.len()
        );
        Ok(ActionResult::Success(posts))
    }

    /// Gets one blog post by id.
    pub fn get_blog_post(&self, id: BlogPostId) -> ControllerResult<BlogPost> {
        match self.store.find_by_id(id)? {
            Some(post) => Ok(ActionResult::Success(post)),
            None => Ok(not_found("get", id)),
        }
    }

    /// Stores a new blog post and returns it with its final id.
    ///
    /// A caller-supplied id is kept as-is; a duplicate fails with
    /// `RepoError::DuplicateId` inside `ControllerError::Persistence`.
    pub fn create_blog_post(&mut self, post: BlogPost) -> ControllerResult<BlogPost> {
        self.store.add(post);
        let outcome = self.store.persist()?;
        let created = outcome
            .inserted
            .into_iter()
            .last()
            .ok_or(ControllerError::InconsistentState(
                "persist reported no inserted record",
            ))?;
        info!(
            "event=blog_post_create module=controller status=ok id={}",
            created.id
        );
        Ok(ActionResult::Created(created))
    }

    /// Overwrites title/content of an existing blog post.
    ///
    /// The stored id is never changed, whatever the patch came from.
    pub fn update_blog_post(
        &mut self,
        id: BlogPostId,
        patch: impl Into<BlogPostPatch>,
    ) -> ControllerResult<()> {
        let Some(mut post) = self.store.find_by_id(id)? else {
            return Ok(not_found("update", id));
        };

        post.apply(patch.into());
        self.store.mark_modified(&post);
        self.store.persist()?;
        info!("event=blog_post_update module=controller status=ok id={id}");
        Ok(ActionResult::NoContent)
    }

    /// Deletes an existing blog post.
    pub fn delete_blog_post(&mut self, id: BlogPostId) -> ControllerResult<()> {
        let Some(post) = self.store.find_by_id(id)? else {
            return Ok(not_found("delete", id));
        };

        self.store.remove(&post);
        self.store.persist()?;
        info!("event=blog_post_delete module=controller status=ok id={id}");
        Ok(ActionResult::NoContent)
    }
}

fn not_found<T>(op: &'static str, id: BlogPostId) -> ActionResult<T> {
    debug!("event=blog_post_{op} module=controller status=not_found id={id}");
    ActionResult::NotFound(id)
}

#[cfg(test)]
mod tests {
    use super::ActionResult;
    use crate::model::blog_post::BlogPostId;

    #[test]
    fn status_codes_follow_rest_conventions() {
        assert_eq!(ActionResult::Success(()).status_code(), 200);
        assert_eq!(ActionResult::Created(()).status_code(), 201);
        assert_eq!(ActionResult::<()>::NoContent.status_code(), 204);
        assert_eq!(
            ActionResult::<()>::NotFound(BlogPostId::UNASSIGNED).status_code(),
            404
        );
    }

    #[test]
    fn into_value_only_yields_payloads() {
        assert_eq!(ActionResult::Created(7).into_value(), Some(7));
        assert_eq!(ActionResult::<i32>::NoContent.into_value(), None);
    }
}
