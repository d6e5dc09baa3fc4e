//! Pantry CLI
//!
//! Terminal front end for the friends graph:
//!
//! 1. **friends**: a subject's friends and, for another signed-in viewer,
//!    friends of friends.
//!
//! 2. **request**: send a friend request as the signed-in viewer.
//!
//! 3. **seed**: write profiles and edges into the local store.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;

use pantry_core::friends::FriendshipStatus;
use pantry_core::storage::Database;
use pantry_core::{
    BackendConfig, ExpandedFriend, FriendsService, FriendsView, Profile, RemoteConfig,
    StaticViewer, ViewerProvider,
};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "pantry", version, about = "Pantry social graph client")]
struct Args {
    /// Which backend to talk to
    #[arg(long, value_enum, default_value_t = Backend::Local, env = "PANTRY_BACKEND")]
    backend: Backend,

    /// Local database file (defaults to the user data directory)
    #[arg(long, env = "PANTRY_DB")]
    database: Option<PathBuf>,

    /// Disable the local expanded-friends procedure (local backend only)
    #[arg(long)]
    no_rpc: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Embedded SQLite
    Local,
    /// Hosted backend from PANTRY_URL / PANTRY_ANON_KEY
    Remote,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show someone's friends
    Friends {
        /// Whose friends to show
        subject: String,
        /// Signed-in viewer
        #[arg(long, env = "PANTRY_VIEWER")]
        viewer: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Send a friend request
    Request {
        /// Who to send it to
        target: String,
        /// Signed-in viewer
        #[arg(long, env = "PANTRY_VIEWER")]
        viewer: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write fixtures into the local store
    #[command(subcommand)]
    Seed(SeedCommand),
}

#[derive(Subcommand, Debug)]
enum SeedCommand {
    /// Create or update a profile
    Profile {
        /// Account id
        id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Create a friendship edge
    Edge {
        requester: String,
        addressee: String,
        #[arg(long, value_enum, default_value_t = StatusArg::Accepted)]
        status: StatusArg,
        /// RFC 3339 creation time (defaults to now)
        #[arg(long)]
        created_at: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StatusArg {
    Pending,
    Accepted,
    Rejected,
    Blocked,
}

impl From<StatusArg> for FriendshipStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => FriendshipStatus::Pending,
            StatusArg::Accepted => FriendshipStatus::Accepted,
            StatusArg::Rejected => FriendshipStatus::Rejected,
            StatusArg::Blocked => FriendshipStatus::Blocked,
        }
    }
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pantry=info,pantry_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Friends {
            ref subject,
            ref viewer,
            json,
        } => {
            let viewer = StaticViewer::from_option(viewer.clone())?;
            let service = FriendsService::new(pantry_core::connect(&backend_config(&args)?).await?);

            let view = service
                .load_view(subject, viewer.current_viewer().as_deref())
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
        }
        Command::Request {
            ref target,
            ref viewer,
            json,
        } => {
            let viewer = StaticViewer::from_option(viewer.clone())?;
            let service = FriendsService::new(pantry_core::connect(&backend_config(&args)?).await?);

            let outcome = service
                .send_request(viewer.current_viewer().as_deref(), target)
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.message());
            }
            if outcome.is_error() {
                bail!("friend request to {} failed", target);
            }
        }
        Command::Seed(ref seed) => {
            if args.backend != Backend::Local {
                bail!("seeding is only supported for the local backend");
            }
            let path = database_path(&args)?;
            let db = Database::open(Some(path.as_str())).await?;
            run_seed(&db, seed)?;
        }
    }

    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn backend_config(args: &Args) -> Result<BackendConfig> {
    Ok(match args.backend {
        Backend::Local => BackendConfig::Local {
            database_path: Some(database_path(args)?),
            rpc_enabled: !args.no_rpc,
        },
        Backend::Remote if args.no_rpc => {
            bail!("--no-rpc only applies to the local backend")
        }
        Backend::Remote => BackendConfig::Remote(RemoteConfig::from_env()),
    })
}

fn database_path(args: &Args) -> Result<String> {
    let path = match &args.database {
        Some(path) => path.clone(),
        None => {
            let dir = dirs::data_dir()
                .ok_or_else(|| eyre!("no data directory; pass --database"))?
                .join("pantry");
            std::fs::create_dir_all(&dir)
                .wrap_err_with(|| format!("creating {}", dir.display()))?;
            dir.join("pantry.db")
        }
    };
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| eyre!("database path is not valid UTF-8"))
}

fn run_seed(db: &Database, seed: &SeedCommand) -> Result<()> {
    match seed {
        SeedCommand::Profile {
            id,
            username,
            name,
            email,
        } => {
            let profile = Profile::with_all(id.clone(), username.clone(), name.clone(), email.clone())?;
            db.upsert_profile(&profile)?;
            println!("Stored profile {}", profile.display_label());
        }
        SeedCommand::Edge {
            requester,
            addressee,
            status,
            created_at,
        } => {
            let edge = db.insert_edge(requester, addressee, (*status).into(), created_at.as_deref())?;
            println!(
                "Stored edge #{} {} -> {} ({})",
                edge.id,
                edge.requester_id,
                edge.addressee_id,
                edge.status.as_str()
            );
        }
    }
    Ok(())
}

fn print_view(view: &FriendsView) {
    println!("Friends of {} ({})", view.subject, view.direct.len());
    print_friends(&view.direct);

    if !view.friends_of_friends.is_empty() {
        println!();
        println!("Friends of friends ({})", view.friends_of_friends.len());
        print_friends(&view.friends_of_friends);
    }
}

fn print_friends(friends: &[ExpandedFriend]) {
    if friends.is_empty() {
        println!("  (none)");
        return;
    }
    for friend in friends {
        match &friend.created_at {
            Some(since) => println!("  {:<24} since {}", friend.display_label(), since),
            None => println!("  {}", friend.display_label()),
        }
    }
}
