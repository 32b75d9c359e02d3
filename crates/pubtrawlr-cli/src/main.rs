use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use pubtrawlr_api::{ClientConfig, PollOutcome, PubTrawlr};
use pubtrawlr_session::Session;

#[derive(Parser)]
#[command(name = "pubtrawlr", version, about = "PubTrawlr search and chat client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage your chat rooms
    #[command(subcommand)]
    Rooms(RoomsCommand),
    /// Run a search
    Search { text: String },
    /// Suggest completions for a partial query
    Autocomplete { text: String },
    /// Poll a job endpoint until it reports `complete`, then print its payload
    Poll {
        endpoint: String,
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Print the signed-in identity, fetching a token if needed
    Whoami,
    /// Forget the stored token and identity
    Logout,
}

#[derive(Subcommand)]
enum RoomsCommand {
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        search: String,
        #[arg(long)]
        name: String,
    },
    Delete { id: i64 },
    Rename { id: i64, name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays parseable JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pubtrawlr=info,pubtrawlr_api=info,pubtrawlr_session=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Config
    let config = ClientConfig::from_env()?;
    let session_path: PathBuf = std::env::var("PUBTRAWLR_SESSION_DB")
        .unwrap_or_else(|_| "pubtrawlr-session.db".into())
        .into();

    let session = Session::open(&session_path)
        .with_context(|| format!("opening session store {}", session_path.display()))?;
    let client = PubTrawlr::new(&config, session);

    match cli.command {
        Command::Rooms(cmd) => rooms(&client, cmd).await?,
        Command::Search { text } => print_json(&client.search.search(&text).await?)?,
        Command::Autocomplete { text } => print_json(&client.search.autocomplete(&text).await?)?,
        Command::Poll {
            endpoint,
            interval_ms,
        } => poll(&client, endpoint, interval_ms.map(Duration::from_millis)).await?,
        Command::Whoami => {
            // Building headers refreshes a missing or expired token
            client.auth.headers().await;
            match client.session().identity() {
                Some(identity) => print_json(&identity)?,
                None => bail!("not signed in: the identity service returned no token"),
            }
        }
        Command::Logout => {
            client.session().clear()?;
            info!("Session cleared");
        }
    }

    Ok(())
}

async fn rooms(client: &PubTrawlr, cmd: RoomsCommand) -> anyhow::Result<()> {
    match cmd {
        RoomsCommand::List => {
            let rooms = client.chatrooms.list().await.context("listing chat rooms")?;
            print_json(&rooms)
        }
        RoomsCommand::Create {
            title,
            search,
            name,
        } => {
            let room = client
                .chatrooms
                .create(&title, &search, &name)
                .await
                .context("creating chat room")?;
            print_json(&room)
        }
        RoomsCommand::Delete { id } => {
            client.chatrooms.delete(id).await.context("deleting chat room")?;
            info!("Deleted chat room {}", id);
            Ok(())
        }
        RoomsCommand::Rename { id, name } => {
            client
                .chatrooms
                .rename(id, &name)
                .await
                .context("renaming chat room")?;
            info!("Renamed chat room {} to '{}'", id, name);
            Ok(())
        }
    }
}

async fn poll(client: &PubTrawlr, endpoint: String, interval: Option<Duration>) -> anyhow::Result<()> {
    let on_complete = |payload: serde_json::Value| {
        if let Err(e) = print_json(&payload) {
            eprintln!("Failed to print poll result: {}", e);
        }
    };
    let handle = match interval {
        Some(interval) => client.poll_every(endpoint, interval, on_complete),
        None => client.poll(endpoint, on_complete),
    };

    let stop = handle.cancel_token();
    let outcome = tokio::select! {
        outcome = handle.join() => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping poll...");
            stop.cancel();
            PollOutcome::Cancelled
        }
    };

    match outcome {
        PollOutcome::Completed => Ok(()),
        PollOutcome::Failed(e) => Err(e).context("polling stopped"),
        PollOutcome::Cancelled => bail!("polling cancelled before the job completed"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
