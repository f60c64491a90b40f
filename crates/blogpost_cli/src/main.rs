//! Command-line front end for the blog post store.
//!
//! Every subcommand opens the database, runs one controller operation and
//! prints the result as JSON on stdout.

use anyhow::{bail, Context, Result};
use blogpost_core::db::open_db;
use blogpost_core::{
    core_version, default_log_level, init_logging, load_seed_file, seed_store, ActionResult,
    BlogController, BlogPost, BlogPostId, BlogPostPatch, SqliteBlogPostStore,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "blogpost", version, about = "Manage blog posts in a SQLite store")]
struct Cli {
    /// Database file, created and migrated on first use.
    #[arg(long, env = "BLOGPOST_DB", default_value = "blogpost.sqlite3")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error). Only takes effect together
    /// with `--log-dir`; a warning is printed otherwise.
    #[arg(long, env = "BLOGPOST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "BLOGPOST_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all blog posts.
    List,
    /// Show one blog post.
    Get { id: i64 },
    /// Create a blog post.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Explicit id; assigned by the store when omitted.
        #[arg(long)]
        id: Option<i64>,
    },
    /// Change title and/or content of a blog post.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a blog post.
    Delete { id: i64 },
    /// Load a JSON array of blog posts in one batch.
    Seed { file: PathBuf },
    /// Print the core library version.
    Version,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(level) = ignored_log_level(&cli) {
        eprintln!("warning: --log-level `{level}` ignored because --log-dir is not set");
    }
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    match cli.command {
        Command::Version => {
            println!("{}", json!({ "core_version": core_version() }));
            Ok(ExitCode::SUCCESS)
        }
        command => run(command, &cli.db),
    }
}

fn run(command: Command, db: &Path) -> Result<ExitCode> {
    let mut conn =
        open_db(db).with_context(|| format!("failed to open database `{}`", db.display()))?;
    let store = SqliteBlogPostStore::try_new(&mut conn)?;
    let mut controller = BlogController::new(store);

    match command {
        Command::List => report(controller.list_blog_posts()?),
        Command::Get { id } => report(controller.get_blog_post(parse_id(id)?)?),
        Command::Create { title, content, id } => {
            let post = match id {
                Some(id) => BlogPost::with_id(id, title, content)?,
                None => BlogPost::new(title, content),
            };
            report(controller.create_blog_post(post)?)
        }
        Command::Update { id, title, content } => {
            let patch = update_patch(title, content)?;
            report(controller.update_blog_post(parse_id(id)?, patch)?)
        }
        Command::Delete { id } => report(controller.delete_blog_post(parse_id(id)?)?),
        Command::Seed { file } => {
            let posts = load_seed_file(&file)?;
            let mut store = controller.into_store();
            let outcome = seed_store(&mut store, posts)?;
            println!("{}", json!({ "inserted": outcome.inserted.len() }));
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => Ok(ExitCode::SUCCESS),
    }
}

fn parse_id(id: i64) -> Result<BlogPostId> {
    Ok(BlogPostId::new(id)?)
}

fn ignored_log_level(cli: &Cli) -> Option<&str> {
    match (cli.log_level.as_deref(), cli.log_dir.as_deref()) {
        (Some(level), None) => Some(level),
        _ => None,
    }
}

fn update_patch(title: Option<String>, content: Option<String>) -> Result<BlogPostPatch> {
    if title.is_none() && content.is_none() {
        bail!("update needs --title and/or --content");
    }
    Ok(BlogPostPatch { title, content })
}

/// What a finished controller call prints, and where.
#[derive(Debug, PartialEq, Eq)]
enum Rendered {
    Stdout(String),
    NotFound(String),
}

fn render<T: serde::Serialize>(result: ActionResult<T>) -> Result<Rendered> {
    let status = result.status_code();
    let rendered = match result {
        ActionResult::Success(value) | ActionResult::Created(value) => {
            Rendered::Stdout(serde_json::to_string_pretty(&value)?)
        }
        ActionResult::NoContent => Rendered::Stdout(json!({ "status": status }).to_string()),
        ActionResult::NotFound(id) => Rendered::NotFound(format!("blog post {id} not found")),
    };
    Ok(rendered)
}

fn report<T: serde::Serialize>(result: ActionResult<T>) -> Result<ExitCode> {
    match render(result)? {
        Rendered::Stdout(text) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Rendered::NotFound(message) => {
            eprintln!("{message}");
            Ok(ExitCode::FAILURE)
        }
    }
}
