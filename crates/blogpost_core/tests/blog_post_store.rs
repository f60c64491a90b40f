mod common;

use blogpost_core::db::migrations::latest_version;
use blogpost_core::db::DbError;
use blogpost_core::{BlogPost, BlogPostId, BlogPostStore, RepoError, SqliteBlogPostStore};
use common::{post, seed_posts, DatabaseFixture};
use rusqlite::Connection;

#[test]
fn queued_changes_are_invisible_until_persist() {
    let mut fixture = DatabaseFixture::new();
    let mut store = SqliteBlogPostStore::try_new(&mut fixture.conn).unwrap();

    store.add(post(1, "A", "a"));
    assert_eq!(store.pending_len(), 1);
    assert!(store.find_by_id(BlogPostId::new(1).unwrap()).unwrap().is_none());

    let outcome = store.persist().unwrap();
    assert_eq!(outcome.inserted, vec![post(1, "A", "a")]);
    assert_eq!(store.pending_len(), 0);
    assert_eq!(
        store.find_by_id(BlogPostId::new(1).unwrap()).unwrap(),
        Some(post(1, "A", "a"))
    );
}

#[test]
fn mark_modified_writes_only_on_persist() {
    let mut fixture = DatabaseFixture::new();
    let mut store = SqliteBlogPostStore::try_new(&mut fixture.conn).unwrap();
    store.add(post(1, "A", "a"));
    store.persist().unwrap();

    let mut edited = store.find_by_id(BlogPostId::new(1).unwrap()).unwrap().unwrap();
    edited.title = "edited".to_string();
    store.mark_modified(&edited);
    assert_eq!(store.list_all().unwrap(), vec![post(1, "A", "a")]);

    let outcome = store.persist().unwrap();
    assert_eq!(outcome.updated, 1);
    assert_eq!(store.list_all().unwrap(), vec![post(1, "edited", "a")]);
}

#[test]
fn remove_range_clears_every_record() {
    let mut fixture = DatabaseFixture::new();
    let mut store = SqliteBlogPostStore::try_new(&mut fixture.conn).unwrap();
    for seeded in seed_posts() {
        store.add(seeded);
    }
    store.persist().unwrap();

    let all = store.list_all().unwrap();
    store.remove_range(&all);
    let outcome = store.persist().unwrap();

    assert_eq!(outcome.removed, 3);
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn persist_is_all_or_nothing() {
    let mut fixture = DatabaseFixture::new();
    let mut store = SqliteBlogPostStore::try_new(&mut fixture.conn).unwrap();
    store.add(post(1, "A", "a"));
    store.persist().unwrap();

    store.add(post(2, "B", "b"));
    store.add(BlogPost::new("auto", "id"));
    store.add(post(1, "dup", "dup"));
    let err = store.persist().unwrap_err();

    assert!(matches!(err, RepoError::DuplicateId(id) if id.get() == 1));
    assert_eq!(store.list_all().unwrap(), vec![post(1, "A", "a")]);
}

#[test]
fn modify_of_missing_record_fails_persist() {
    let mut fixture = DatabaseFixture::new();
    let mut store = SqliteBlogPostStore::try_new(&mut fixture.conn).unwrap();

    store.mark_modified(&post(5, "ghost", "ghost"));
    let err = store.persist().unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id.get() == 5));
}

#[test]
fn inserted_records_carry_assigned_ids_in_queue_order() {
    let mut fixture = DatabaseFixture::new();
    let mut store = SqliteBlogPostStore::try_new(&mut fixture.conn).unwrap();

    store.add(post(10, "ten", "10"));
    store.add(BlogPost::new("next", "auto"));
    store.add(BlogPost::new("after", "auto"));
    let outcome = store.persist().unwrap();

    let ids: Vec<i64> = outcome.inserted.iter().map(|post| post.id.get()).collect();
    assert_eq!(ids, vec![10, 11, 12]);
}

#[test]
fn store_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    match SqliteBlogPostStore::try_new(&mut conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_without_blog_posts_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBlogPostStore::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("blog_posts"))
    ));
}

#[test]
fn store_rejects_connection_missing_content_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE blog_posts (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBlogPostStore::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "blog_posts",
            column: "content"
        })
    ));
}

#[test]
fn store_rejects_connection_with_newer_schema_version() {
    let mut fixture = DatabaseFixture::new();
    fixture
        .conn
        .execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    match SqliteBlogPostStore::try_new(&mut fixture.conn) {
        Err(RepoError::Db(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        })) => {
            assert_eq!(db_version, latest_version() + 1);
            assert_eq!(latest_supported, latest_version());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected unsupported schema version error"),
    }
}

#[test]
fn reads_reject_non_positive_persisted_ids() {
    let mut fixture = DatabaseFixture::new();
    fixture
        .conn
        .execute(
            "INSERT INTO blog_posts (id, title, content) VALUES (-3, 't', 'c');",
            [],
        )
        .unwrap();
    let store = SqliteBlogPostStore::try_new(&mut fixture.conn).unwrap();

    let err = store.list_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
