//! Bulk seeding of blog posts from JSON.
//!
//! # Responsibility
//! - Parse an ordered JSON array of `{id, title, content}` records.
//! - Queue every record on a store and commit them in one batch.
//!
//! # Invariants
//! - Seed order is preserved through to insertion order.
//! - A failing record rolls back the whole batch.

use crate::model::blog_post::BlogPost;
use crate::repo::blog_post_repo::{BlogPostStore, PersistOutcome, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Error raised while loading or applying a seed.
#[derive(Debug)]
pub enum SeedError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    Repo(RepoError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read seed file `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid seed json: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Parses a JSON array of blog posts.
pub fn parse_seed(json: &str) -> Result<Vec<BlogPost>, SeedError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a JSON seed file.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<BlogPost>, SeedError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed(&json)
}

/// Adds every post to `store` and persists them as one batch.
pub fn seed_store<S: BlogPostStore + ?Sized>(
    store: &mut S,
    posts: Vec<BlogPost>,
) -> Result<PersistOutcome, SeedError> {
    for post in posts {
        store.add(post);
    }
    let outcome = store.persist()?;
    info!(
        "event=store_seed module=seed status=ok inserted={}",
        outcome.inserted.len()
    );
    Ok(outcome)
}
