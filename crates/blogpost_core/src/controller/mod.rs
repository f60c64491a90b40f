//! Request-handling façade over the blog post store.
//!
//! # Responsibility
//! - Translate list/get/create/update/delete requests into store calls.
//! - Report absent ids as structured results instead of errors.

pub mod blog_controller;
