//! Domain model for the blog post store.
//!
//! # Invariants
//! - Every stored record is identified by a positive `BlogPostId`.
//! - Ids are never rewritten after creation.

pub mod blog_post;
