//! CLI administration tool for golinks.
//!
//! Runs the same stores as the server directly against the database, for
//! bootstrapping users, repairing links and quick inspection.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations
//! cargo run --bin admin -- db migrate
//!
//! # Bootstrap an admin user
//! cargo run --bin admin -- user login --provider github --subject 42 --email jane@example.com --admin
//!
//! # Create a link owned by that user
//! cargo run --bin admin -- link create docs https://docs.example.com --owner <uuid>
//!
//! # Tag it
//! cargo run --bin admin -- link tags docs "Engineering" "Onboarding"
//!
//! # View statistics
//! cargo run --bin admin -- stats
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL, MySQL or SQLite connection string
//! - `DB_DIALECT` (optional): overrides the dialect inferred from the URL

use golinks::application::services::{LinkService, TagService, UserService};
use golinks::domain::entities::{Link, Role, UserLogin};
use golinks::domain::repositories::ClickRepository;
use golinks::infrastructure::database::{Database, Dialect, PoolSettings};
use golinks::infrastructure::persistence::{
    SqlClickRepository, SqlLinkRepository, SqlTagRepository, SqlUserRepository,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use uuid::Uuid;

/// Number of recent clicks printed by `link show`.
const RECENT_CLICKS: i64 = 5;

/// CLI tool for managing golinks.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Inspect the tag taxonomy
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a link
    Create {
        slug: String,
        url: String,

        /// Primary owner's user id
        #[arg(short, long)]
        owner: Uuid,

        #[arg(short, long, default_value = "")]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show a link with owners, tags and recent clicks
    Show { slug: String },

    /// List links owned or co-owned by a user
    List {
        #[arg(short, long)]
        owner: Uuid,
    },

    /// Delete a link and everything attached to it
    Delete {
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Replace a link's tags (no names clears them)
    Tags { slug: String, names: Vec<String> },

    /// Add a co-owner
    AddOwner { slug: String, user_id: Uuid },

    /// Remove a co-owner
    RemoveOwner { slug: String, user_id: Uuid },
}

#[derive(Subcommand)]
enum TagAction {
    /// List tags in use with link counts
    List {
        /// Include tags no link uses
        #[arg(short, long)]
        all: bool,
    },

    /// Autocomplete tags by prefix
    Suggest {
        prefix: String,

        #[arg(short, long)]
        limit: Option<i64>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create or refresh a user as a login would
    Login {
        #[arg(long)]
        provider: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        email: String,

        /// Display name (defaults to the email)
        #[arg(long, default_value = "")]
        name: String,

        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let dialect = match std::env::var("DB_DIALECT") {
        Ok(name) => name.parse::<Dialect>()?,
        Err(_) => Dialect::from_url(&database_url)?,
    };

    let db = Database::connect(&database_url, dialect, &PoolSettings::default())
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &db).await?,
        Commands::Tag { action } => handle_tag_action(action, &db).await?,
        Commands::User { action } => handle_user_action(action, &db).await?,
        Commands::Stats => handle_stats(&db).await?,
        Commands::Db { action } => handle_db_action(action, &db).await?,
    }

    db.close().await;
    Ok(())
}

/// Dispatches link commands.
async fn handle_link_action(action: LinkAction, db: &Database) -> Result<()> {
    let links = LinkService::new(Arc::new(SqlLinkRepository::new(db)));

    match action {
        LinkAction::Create {
            slug,
            url,
            owner,
            title,
            description,
        } => {
            let link = links
                .create(&slug, &url, &title, &description, owner)
                .await?;
            println!("{}", "✅ Link created".green().bold());
            println!();
            print_link(&link);
        }
        LinkAction::Show { slug } => {
            let link = links.get_by_slug(&slug).await?;
            print_link(&link);
            print_clicks(&link, db).await?;
        }
        LinkAction::List { owner } => {
            let owned = links.list_by_owner(owner).await?;
            list_links(&owned, owner);
        }
        LinkAction::Delete { slug, yes } => {
            let link = links.get_by_slug(&slug).await?;
            print_link(&link);

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete this link, its owners, tags and clicks?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            links.delete(link.id).await?;
            println!("{}", "✅ Link deleted".green().bold());
        }
        LinkAction::Tags { slug, names } => {
            let link = links.get_by_slug(&slug).await?;
            let tags = links.set_tags(link.id, names).await?;

            if tags.is_empty() {
                println!("{}", "✅ Tags cleared".green().bold());
            } else {
                let slugs: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();
                println!(
                    "{} {}",
                    "✅ Tags set:".green().bold(),
                    slugs.join(", ").cyan()
                );
            }
        }
        LinkAction::AddOwner { slug, user_id } => {
            let link = links.get_by_slug(&slug).await?;
            links.add_owner(link.id, user_id).await?;
            println!("{}", "✅ Co-owner added".green().bold());
        }
        LinkAction::RemoveOwner { slug, user_id } => {
            let link = links.get_by_slug(&slug).await?;
            links.remove_owner(link.id, user_id).await?;
            println!("{}", "✅ Co-owner removed".green().bold());
        }
    }

    Ok(())
}

fn print_link(link: &Link) {
    println!("  Slug:    {}", link.slug.cyan().bold());
    println!("  URL:     {}", link.url.bright_white());
    if !link.title.is_empty() {
        println!("  Title:   {}", link.title);
    }
    println!("  ID:      {}", link.id.to_string().bright_black());
    println!(
        "  Updated: {}",
        link.updated_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );

    for owner in &link.owners {
        let label = if owner.is_primary {
            "primary".green()
        } else {
            "co-owner".yellow()
        };
        println!("  Owner:   {} ({})", owner.user_id, label);
    }

    if !link.tags.is_empty() {
        println!("  Tags:    {}", link.tag_slugs().join(", ").cyan());
    }
    println!();
}

async fn print_clicks(link: &Link, db: &Database) -> Result<()> {
    let clicks = SqlClickRepository::new(db);

    let total = clicks.count_for_link(link.id).await?;
    println!("  Clicks:  {}", total.to_string().bright_green().bold());

    for click in clicks.recent_for_link(link.id, RECENT_CLICKS).await? {
        println!(
            "    {}  {}",
            click
                .clicked_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .bright_black(),
            click.referrer.as_deref().unwrap_or("-")
        );
    }
    println!();

    Ok(())
}

/// Prints a table of links.
///
/// # Output Format
///
/// ```text
///   Slug                 Role       URL
///   ──────────────────────────────────────────────────────────────
///   docs                 primary    https://docs.example.com/
/// ```
fn list_links(links: &[Link], owner: Uuid) {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return;
    }

    println!(
        "  {:<20} {:<10} {}",
        "Slug".bright_white().bold(),
        "Role".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in links {
        let role = match link.primary_owner() {
            Some(primary) if primary.user_id == owner => "primary".green(),
            _ => "co-owner".yellow(),
        };
        println!("  {:<20} {:<10} {}", link.slug.cyan(), role, link.url);
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();
}

async fn handle_tag_action(action: TagAction, db: &Database) -> Result<()> {
    let tags = TagService::new(Arc::new(SqlTagRepository::new(db)));

    match action {
        TagAction::List { all: false } => {
            println!("{}", "🏷️  Tags in use".bright_blue().bold());
            println!();
            for entry in tags.list_with_counts().await? {
                println!(
                    "  {:<30} {}",
                    entry.tag.slug.cyan(),
                    entry.link_count.to_string().bright_green()
                );
            }
        }
        TagAction::List { all: true } => {
            println!("{}", "🏷️  All tags".bright_blue().bold());
            println!();
            for tag in tags.list().await? {
                println!("  {:<30} {}", tag.slug.cyan(), tag.name);
            }
        }
        TagAction::Suggest { prefix, limit } => {
            for tag in tags.suggest(&prefix, limit).await? {
                println!("  {:<30} {}", tag.slug.cyan(), tag.name);
            }
        }
    }
    println!();

    Ok(())
}

async fn handle_user_action(action: UserAction, db: &Database) -> Result<()> {
    let users = UserService::new(Arc::new(SqlUserRepository::new(db)));

    match action {
        UserAction::Login {
            provider,
            subject,
            email,
            name,
            admin,
        } => {
            let user = users
                .login(UserLogin {
                    provider,
                    subject,
                    email,
                    display_name: name,
                    role: if admin { Role::Admin } else { Role::User },
                })
                .await?;

            println!("{}", "✅ User saved".green().bold());
            println!();
            println!("  ID:    {}", user.id.to_string().bright_yellow().bold());
            println!("  Name:  {} ({})", user.display_name.cyan(), user.display_name_slug);
            println!("  Email: {}", user.email);
            println!("  Role:  {}", user.role);
            println!();
        }
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Total number of clicks
/// - Number of users and tags
async fn handle_stats(db: &Database) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count = LinkService::new(Arc::new(SqlLinkRepository::new(db)))
        .count_all()
        .await?;

    let mut counts = Vec::new();
    for table in ["click_events", "users", "tags"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await?;
        counts.push(count);
    }

    println!(
        "  Links:  {}",
        links_count.to_string().bright_green().bold()
    );
    println!("  Clicks: {}", counts[0].to_string().bright_green().bold());
    println!("  Users:  {}", counts[1].to_string().bright_green().bold());
    println!("  Tags:   {}", counts[2].to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, db: &Database) -> Result<()> {
    match action {
        DbAction::Check => {
            println!(
                "{} ({})",
                "🔍 Checking database connection...".bright_blue(),
                db.dialect()
            );

            db.ping().await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "📦 Applying migrations...".bright_blue());

            db.migrate().await.context("Migration failed")?;

            println!("{}", "✅ Schema up to date".green().bold());
        }
    }

    Ok(())
}
