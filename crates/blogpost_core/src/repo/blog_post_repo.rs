//! Blog post store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/list reads over the `blog_posts` table.
//! - Queue add/modify/remove requests and commit them in one transaction.
//!
//! # Invariants
//! - Reads observe committed rows only; queued changes stay invisible until
//!   `persist()` succeeds.
//! - `persist()` applies queued changes in order, all or nothing, and always
//!   drains the queue.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::blog_post::{BlogPost, BlogPostId, BlogPostValidationError};
use log::{debug, error, info};
use rusqlite::{params, Connection, ErrorCode, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const BLOG_POSTS_TABLE: &str = "blog_posts";
const BLOG_POSTS_COLUMNS: &[&str] = &["id", "title", "content"];

const BLOG_POST_SELECT_SQL: &str = "SELECT
    id,
    title,
    content
FROM blog_posts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for blog post persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BlogPostValidationError),
    Db(DbError),
    NotFound(BlogPostId),
    DuplicateId(BlogPostId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "blog post not found: {id}"),
            Self::DuplicateId(id) => write!(f, "blog post id already exists: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted blog post data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BlogPostValidationError> for RepoError {
    fn from(value: BlogPostValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of one successful `persist()` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistOutcome {
    /// Inserted records in queue order, carrying their final ids.
    pub inserted: Vec<BlogPost>,
    pub updated: usize,
    pub removed: usize,
}

impl PersistOutcome {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated == 0 && self.removed == 0
    }
}

/// Store interface for blog post CRUD with explicit commit.
pub trait BlogPostStore {
    /// Returns the committed record with `id`, if any.
    fn find_by_id(&self, id: BlogPostId) -> RepoResult<Option<BlogPost>>;
    /// Returns every committed record in insertion order.
    fn list_all(&self) -> RepoResult<Vec<BlogPost>>;
    /// Queues an insert. Unassigned ids are allocated on persist.
    fn add(&mut self, post: BlogPost);
    /// Queues a title/content write for an existing record.
    fn mark_modified(&mut self, post: &BlogPost);
    /// Queues a delete.
    fn remove(&mut self, post: &BlogPost);
    /// Number of queued, not yet persisted changes.
    fn pending_len(&self) -> usize;
    /// Drops every queued change without touching storage.
    fn discard_pending(&mut self);
    /// Commits all queued changes atomically.
    fn persist(&mut self) -> RepoResult<PersistOutcome>;

    /// Queues a delete for each record.
    fn remove_range(&mut self, posts: &[BlogPost]) {
        for post in posts {
            self.remove(post);
        }
    }
}

impl<S: BlogPostStore + ?Sized> BlogPostStore for &mut S {
    fn find_by_id(&self, id: BlogPostId) -> RepoResult<Option<BlogPost>> {
        (**self).find_by_id(id)
    }

    fn list_all(&self) -> RepoResult<Vec<BlogPost>> {
        (**self).list_all()
    }

    fn add(&mut self, post: BlogPost) {
        (**self).add(post);
    }

    fn mark_modified(&mut self, post: &BlogPost) {
        (**self).mark_modified(post);
    }

    fn remove(&mut self, post: &BlogPost) {
        (**self).remove(post);
    }

    fn pending_len(&self) -> usize {
        (**self).pending_len()
    }

    fn discard_pending(&mut self) {
        (**self).discard_pending();
    }

    fn persist(&mut self) -> RepoResult<PersistOutcome> {
        (**self).persist()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingChange {
    Insert(BlogPost),
    Update(BlogPost),
    Delete(BlogPostId),
}

/// SQLite-backed blog post store scoped to one unit of work.
pub struct SqliteBlogPostStore<'conn> {
    conn: &'conn mut Connection,
    pending: Vec<PendingChange>,
}

impl<'conn> SqliteBlogPostStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match the expected `blog_posts` shape.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            pending: Vec::new(),
        })
    }
}

impl BlogPostStore for SqliteBlogPostStore<'_> {
    fn find_by_id(&self, id: BlogPostId) -> RepoResult<Option<BlogPost>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BLOG_POST_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_blog_post_row(row)?));
        }

        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<BlogPost>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BLOG_POST_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut posts = Vec::new();

        while let Some(row) = rows.next()? {
            posts.push(parse_blog_post_row(row)?);
        }

        Ok(posts)
    }

    fn add(&mut self, post: BlogPost) {
        debug!(
            "event=store_queue module=repo op=add id={} pending={}",
            post.id,
            self.pending.len() + 1
        );
        self.pending.push(PendingChange::Insert(post));
    }

    fn mark_modified(&mut self, post: &BlogPost) {
        debug!(
            "event=store_queue module=repo op=modify id={} pending={}",
            post.id,
            self.pending.len() + 1
        );
        self.pending.push(PendingChange::Update(post.clone()));
    }

    fn remove(&mut self, post: &BlogPost) {
        debug!(
            "event=store_queue module=repo op=remove id={} pending={}",
            post.id,
            self.pending.len() + 1
        );
        self.pending.push(PendingChange::Delete(post.id));
    }

    fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn discard_pending(&mut self) {
        self.pending.clear();
    }

    fn persist(&mut self) -> RepoResult<PersistOutcome> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(PersistOutcome::default());
        }

        let started_at = Instant::now();
        match commit_pending(self.conn, &pending) {
            Ok(outcome) => {
                info!(
                    "event=store_persist module=repo status=ok inserted={} updated={} removed={} duration_ms={}",
                    outcome.inserted.len(),
                    outcome.updated,
                    outcome.removed,
                    started_at.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    "event=store_persist module=repo status=error changes={} duration_ms={} error={}",
                    pending.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn commit_pending(conn: &mut Connection, pending: &[PendingChange]) -> RepoResult<PersistOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut outcome = PersistOutcome::default();

    for change in pending {
        match change {
            PendingChange::Insert(post) => {
                let inserted = insert_blog_post(&tx, post)?;
                outcome.inserted.push(inserted);
            }
            PendingChange::Update(post) => {
                let changed = tx.execute(
                    "UPDATE blog_posts
                     SET
                        title = ?2,
                        content = ?3
                     WHERE id = ?1;",
                    params![post.id.get(), post.title.as_str(), post.content.as_str()],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(post.id));
                }
                outcome.updated += 1;
            }
            PendingChange::Delete(id) => {
                let changed = tx.execute("DELETE FROM blog_posts WHERE id = ?1;", [id.get()])?;
                if changed == 0 {
                    return Err(RepoError::NotFound(*id));
                }
                outcome.removed += 1;
            }
        }
    }

    tx.commit()?;
    Ok(outcome)
}

fn insert_blog_post(tx: &Transaction<'_>, post: &BlogPost) -> RepoResult<BlogPost> {
    if !post.id.is_assigned() {
        tx.execute(
            "INSERT INTO blog_posts (title, content) VALUES (?1, ?2);",
            params![post.title.as_str(), post.content.as_str()],
        )?;
        let id = BlogPostId::new(tx.last_insert_rowid())?;
        return Ok(BlogPost {
            id,
            ..post.clone()
        });
    }

    let result = tx.execute(
        "INSERT INTO blog_posts (id, title, content) VALUES (?1, ?2, ?3);",
        params![post.id.get(), post.title.as_str(), post.content.as_str()],
    );
    match result {
        Ok(_) => Ok(post.clone()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            Err(RepoError::DuplicateId(post.id))
        }
        Err(err) => Err(err.into()),
    }
}

fn parse_blog_post_row(row: &Row<'_>) -> RepoResult<BlogPost> {
    let raw_id: i64 = row.get("id")?;
    let id = BlogPostId::new(raw_id).map_err(|_| {
        RepoError::InvalidData(format!("invalid id value `{raw_id}` in blog_posts.id"))
    })?;

    Ok(BlogPost {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    if actual_version > expected_version {
        return Err(RepoError::Db(DbError::UnsupportedSchemaVersion {
            db_version: actual_version,
            latest_supported: expected_version,
        }));
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [BLOG_POSTS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(BLOG_POSTS_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({BLOG_POSTS_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in BLOG_POSTS_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: BLOG_POSTS_TABLE,
                column,
            });
        }
    }

    Ok(())
}
