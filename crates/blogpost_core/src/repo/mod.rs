//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the blog post store contract (reads plus a pending-change queue).
//! - Isolate SQLite query details from controller orchestration.
//!
//! # Invariants
//! - Writes reach the database only through `persist()`.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateId`) in
//!   addition to DB transport errors.

pub mod blog_post_repo;
