// Reshelve - Personal Reading Tracker
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use reshelve_core::auth::{self, Argon2Hasher, Requester};
use reshelve_core::storage::models::{NewBook, NewReadingLog, Role};
use reshelve_core::storage::users;
use reshelve_core::{catalog, shelf, Config, Database, ReshelveError};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reshelve")]
#[command(about = "Reshelve - personal reading tracker operator tool", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Act as the user with this email
    #[arg(long = "as", global = true, env = "RESHELVE_AS")]
    as_email: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and apply migrations
    Init,
    /// Run integrity and foreign key checks
    Check,
    /// Register a new user
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "RESHELVE_PASSWORD")]
        password: String,
    },
    /// Verify credentials and print the requester identity
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RESHELVE_PASSWORD")]
        password: String,
    },
    /// Change a user's role
    SetRole {
        user_id: i64,
        /// user or admin
        role: Role,
    },
    /// Delete a user account (self, or any as admin)
    DeleteUser { user_id: i64 },
    /// Catalog commands
    #[command(subcommand)]
    Books(BookCommands),
    /// Bookshelf commands
    #[command(subcommand)]
    Shelf(ShelfCommands),
    /// Tag commands
    #[command(subcommand)]
    Tags(TagCommands),
    /// Comment commands
    #[command(subcommand)]
    Comments(CommentCommands),
    /// Reading log commands
    #[command(subcommand)]
    Logs(LogCommands),
}

#[derive(Args)]
struct BookFields {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    #[arg(long)]
    genre: String,
    #[arg(long)]
    cover_url: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    year: Option<i32>,
}

impl From<BookFields> for NewBook {
    fn from(fields: BookFields) -> Self {
        NewBook {
            title: fields.title,
            author: fields.author,
            genre: fields.genre,
            cover_url: fields.cover_url,
            description: fields.description,
            published_year: fields.year,
        }
    }
}

#[derive(Subcommand)]
enum BookCommands {
    List,
    /// Show a book with your shelf state for it
    Show { book_id: i64 },
    Add(BookFields),
    Update {
        book_id: i64,
        #[command(flatten)]
        fields: BookFields,
    },
    Remove { book_id: i64 },
}

#[derive(Subcommand)]
enum ShelfCommands {
    List,
    Add { book_id: i64 },
    Show { entry_id: i64 },
    Remove { entry_id: i64 },
}

#[derive(Subcommand)]
enum TagCommands {
    List,
    Create { name: String },
    Rename { tag_id: i64, name: String },
    Delete { tag_id: i64 },
    /// Replace all tags on an entry (no ids clears it)
    Set { entry_id: i64, tag_ids: Vec<i64> },
    /// Show tags assigned to an entry
    Entry { entry_id: i64 },
    /// Remove one tag from an entry
    Untag { entry_id: i64, tag_id: i64 },
}

#[derive(Subcommand)]
enum CommentCommands {
    List { entry_id: i64 },
    Add { entry_id: i64, content: String },
    Edit { comment_id: i64, content: String },
    Delete { comment_id: i64 },
}

#[derive(Args)]
struct LogFields {
    #[arg(long)]
    start: i32,
    #[arg(long)]
    end: i32,
    #[arg(long)]
    minutes: Option<i32>,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    date: Option<chrono::NaiveDate>,
}

impl From<LogFields> for NewReadingLog {
    fn from(fields: LogFields) -> Self {
        NewReadingLog {
            start_page: fields.start,
            end_page: fields.end,
            duration_minutes: fields.minutes,
            date: fields.date,
        }
    }
}

#[derive(Subcommand)]
enum LogCommands {
    List { entry_id: i64 },
    Add {
        entry_id: i64,
        #[command(flatten)]
        fields: LogFields,
    },
    Edit {
        log_id: i64,
        #[command(flatten)]
        fields: LogFields,
    },
    Delete { log_id: i64 },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_done(message: &str) -> Result<()> {
    print_json(&serde_json::json!({ "message": message }))
}

/// Resolve `--as` into a requester; the operator is trusted to impersonate
async fn acting_user(db: &Database, email: Option<&str>) -> Result<Requester> {
    let email = email.context("this command needs --as <EMAIL> (or RESHELVE_AS)")?;
    let user = users::find_user_by_email(db.pool(), email)
        .await?
        .with_context(|| format!("no user with email {}", email))?;
    Ok(Requester::from(user))
}

async fn run(cli: Cli, db: &Database) -> Result<()> {
    let hasher = Argon2Hasher::new();
    let as_email = cli.as_email.as_deref();

    match cli.command {
        Commands::Init => {
            let path = db.path().map(|p| p.display().to_string()).unwrap_or_default();
            print_json(&serde_json::json!({ "database": path, "status": "ready" }))
        }
        Commands::Check => {
            let ok = db.check_integrity().await?;
            print_json(&serde_json::json!({ "integrity_ok": ok }))?;
            if !ok {
                anyhow::bail!("database integrity check failed");
            }
            Ok(())
        }
        Commands::Register { email, username, password } => {
            let user = auth::register(db, &hasher, &email, &username, &password).await?;
            print_json(&user)
        }
        Commands::Login { email, password } => {
            let requester = auth::login(db, &hasher, &email, &password).await?;
            print_json(&requester)
        }
        Commands::SetRole { user_id, role } => print_json(&auth::set_role(db, user_id, role).await?),
        Commands::DeleteUser { user_id } => {
            let requester = acting_user(db, as_email).await?;
            auth::delete_user(db, &requester, user_id).await?;
            print_done("User deleted")
        }
        Commands::Books(command) => match command {
            BookCommands::List => print_json(&catalog::list_books(db).await?),
            BookCommands::Show { book_id } => {
                let requester = acting_user(db, as_email).await?;
                print_json(&shelf::get_book_detail(db, &requester, book_id).await?)
            }
            BookCommands::Add(fields) => {
                let requester = acting_user(db, as_email).await?;
                print_json(&catalog::create_book(db, &requester, &fields.into()).await?)
            }
            BookCommands::Update { book_id, fields } => {
                let requester = acting_user(db, as_email).await?;
                print_json(&catalog::update_book(db, &requester, book_id, &fields.into()).await?)
            }
            BookCommands::Remove { book_id } => {
                let requester = acting_user(db, as_email).await?;
                catalog::delete_book(db, &requester, book_id).await?;
                print_done("Book deleted")
            }
        },
        Commands::Shelf(command) => {
            let requester = acting_user(db, as_email).await?;
            match command {
                ShelfCommands::List => print_json(&shelf::list_shelf(db, &requester).await?),
                ShelfCommands::Add { book_id } => {
                    print_json(&shelf::add_to_shelf(db, &requester, book_id).await?)
                }
                ShelfCommands::Show { entry_id } => {
                    print_json(&shelf::get_bookshelf_entry_detail(db, &requester, entry_id).await?)
                }
                ShelfCommands::Remove { entry_id } => {
                    shelf::remove_from_shelf(db, &requester, entry_id).await?;
                    print_done("Book removed from bookshelf")
                }
            }
        }
        Commands::Tags(command) => {
            let requester = acting_user(db, as_email).await?;
            match command {
                TagCommands::List => print_json(&shelf::list_visible_tags(db, &requester).await?),
                TagCommands::Create { name } => {
                    print_json(&shelf::create_tag(db, &requester, &name).await?)
                }
                TagCommands::Rename { tag_id, name } => {
                    match shelf::update_tag(db, &requester, tag_id, &name).await? {
                        Some(tag) => print_json(&tag),
                        None => Err(ReshelveError::not_found("Tag not found").into()),
                    }
                }
                TagCommands::Delete { tag_id } => {
                    if !shelf::delete_tag(db, &requester, tag_id).await? {
                        return Err(ReshelveError::not_found("Tag not found").into());
                    }
                    print_done("Tag deleted")
                }
                TagCommands::Set { entry_id, tag_ids } => {
                    print_json(&shelf::set_tags_for_entry(db, &requester, entry_id, &tag_ids).await?)
                }
                TagCommands::Entry { entry_id } => {
                    print_json(&shelf::list_entry_tags(db, &requester, entry_id).await?)
                }
                TagCommands::Untag { entry_id, tag_id } => {
                    let removed = shelf::remove_tag_from_entry(db, &requester, entry_id, tag_id).await?;
                    print_json(&serde_json::json!({ "removed": removed }))
                }
            }
        }
        Commands::Comments(command) => {
            let requester = acting_user(db, as_email).await?;
            match command {
                CommentCommands::List { entry_id } => {
                    print_json(&shelf::list_comments(db, &requester, entry_id).await?)
                }
                CommentCommands::Add { entry_id, content } => {
                    print_json(&shelf::add_comment(db, &requester, entry_id, &content).await?)
                }
                CommentCommands::Edit { comment_id, content } => {
                    print_json(&shelf::update_comment(db, &requester, comment_id, &content).await?)
                }
                CommentCommands::Delete { comment_id } => {
                    shelf::delete_comment(db, &requester, comment_id).await?;
                    print_done("Comment deleted")
                }
            }
        }
        Commands::Logs(command) => {
            let requester = acting_user(db, as_email).await?;
            match command {
                LogCommands::List { entry_id } => {
                    print_json(&shelf::list_reading_logs(db, &requester, entry_id).await?)
                }
                LogCommands::Add { entry_id, fields } => {
                    print_json(&shelf::add_reading_log(db, &requester, entry_id, &fields.into()).await?)
                }
                LogCommands::Edit { log_id, fields } => {
                    print_json(&shelf::update_reading_log(db, &requester, log_id, &fields.into()).await?)
                }
                LogCommands::Delete { log_id } => {
                    shelf::delete_reading_log(db, &requester, log_id).await?;
                    print_done("Reading log deleted")
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let db = Database::from_config(&config)
        .await
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let outcome = run(cli, &db).await;
    db.close().await?;

    if let Err(err) = outcome {
        if let Some(core_err) = err.downcast_ref::<ReshelveError>() {
            eprintln!("error ({}): {}", core_err.status_code(), core_err.user_message());
            std::process::exit(1);
        }
        return Err(err);
    }
    Ok(())
}
