use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use concierge::concierge::Concierge;
use concierge::config::ProviderArgs;
use concierge::consts::{DEFAULT_HISTORY_LIMIT, DEFAULT_SEARCH_LIMIT, default_db_path};
use concierge::history::History;
use concierge::history::sqlite::SqliteHistory;
use concierge::logging;
use concierge::quota::QuotaTracker;
use concierge::relay::{QueryRequest, Relay};
use concierge::server::{self, AppState};
use concierge::store::SqliteStore;

#[derive(Parser)]
#[command(name = "concierge", version, about = "AI search concierge for Adalcci Interior.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database for the quota store and search history (use :memory: for ephemeral)
    #[arg(short, long, global = true, env = "CONCIERGE_DB")]
    db: Option<String>,

    /// Free searches per visitor per 24 hours
    #[arg(short, long, global = true, env = "CONCIERGE_SEARCH_LIMIT", default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: u32,

    #[command(flatten)]
    providers: ProviderArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the search endpoint over HTTP
    Serve {
        #[arg(long, env = "CONCIERGE_HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, env = "CONCIERGE_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Ask a single question
    Ask {
        /// The question
        query: String,

        /// Ask as a signed-in user (skips the visitor limit, saves history)
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Show how many free searches are left
    Quota,
    /// Show or clear a signed-in user's search history
    History {
        user: String,

        #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        count: usize,

        #[arg(long, default_value_t = false)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.command {
        Command::Serve { .. } => "info",
        _ => "warn",
    };
    logging::init(level);

    let db = resolve_db(cli.db.as_deref())?;

    match cli.command {
        Command::Serve { host, port } => {
            let relay = Relay::new(cli.providers.select()?);
            let history: Arc<dyn History> = Arc::new(SqliteHistory::open(&db)?);
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid listen address {host}:{port}"))?;
            server::serve(addr, AppState::new(relay).with_history(history)).await
        }
        Command::Ask { query, user } => {
            let relay = Relay::new(cli.providers.select()?);
            let quota = QuotaTracker::with_limit(Arc::new(SqliteStore::open(&db)?), cli.limit);
            let concierge =
                Concierge::new(relay, quota).with_history(Arc::new(SqliteHistory::open(&db)?));

            let request = QueryRequest {
                text: query,
                caller_id: user,
            };
            let answer = concierge.search(&request).await?;

            println!("{}", answer.text);
            if request.caller().is_none() {
                println!(
                    "\n[{} of {} free searches left today]",
                    concierge.quota().remaining(),
                    cli.limit
                );
            }
            Ok(())
        }
        Command::Quota => {
            let quota = QuotaTracker::with_limit(Arc::new(SqliteStore::open(&db)?), cli.limit);
            println!(
                "used {} of {}, {} remaining",
                quota.used_count(),
                quota.limit(),
                quota.remaining()
            );
            Ok(())
        }
        Command::History { user, count, clear } => {
            let history = SqliteHistory::open(&db)?;
            if clear {
                history.clear_user(&user).await?;
                println!("cleared history for {user}");
                return Ok(());
            }

            let entries = history.for_user(&user, count).await?;
            if entries.is_empty() {
                println!("no searches yet for {user}");
            }
            for entry in entries {
                println!(
                    "[{}] ({}) {}\n=> {}\n",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.provider,
                    entry.query,
                    entry.response
                );
            }
            Ok(())
        }
    }
}

/// Resolve the database path, creating its directory if needed.
fn resolve_db(db: Option<&str>) -> Result<String> {
    let path = match db {
        Some(":memory:") => return Ok(":memory:".to_string()),
        Some(path) => Path::new(path).to_path_buf(),
        None => default_db_path()?,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    path.to_str()
        .map(String::from)
        .context("database path is not valid UTF-8")
}
