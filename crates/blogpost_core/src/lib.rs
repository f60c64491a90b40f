//! Core storage and request handling for blog posts.
//! This crate owns the schema, the store contract and the controller.

pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;

pub use controller::blog_controller::{
    ActionResult, BlogController, ControllerError, ControllerResult,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::blog_post::{BlogPost, BlogPostId, BlogPostPatch, BlogPostValidationError};
pub use repo::blog_post_repo::{
    BlogPostStore, PersistOutcome, RepoError, RepoResult, SqliteBlogPostStore,
};
pub use seed::{load_seed_file, parse_seed, seed_store, SeedError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
