#![allow(dead_code)]

use blogpost_core::db::open_db_in_memory;
use blogpost_core::{load_seed_file, BlogPost};
use rusqlite::Connection;
use std::path::PathBuf;

/// In-memory database shared by one test; dropped with the fixture.
pub struct DatabaseFixture {
    pub conn: Connection,
}

impl DatabaseFixture {
    pub fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
        }
    }
}

pub fn seed_posts() -> Vec<BlogPost> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/blog.json");
    load_seed_file(path).unwrap()
}

pub fn post(id: i64, title: &str, content: &str) -> BlogPost {
    BlogPost::with_id(id, title, content).unwrap()
}
