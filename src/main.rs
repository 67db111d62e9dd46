use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use refile::commands;
use refile::models::Output;
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "refile")]
#[command(version, about = "CLI for filing Outlook mail into folders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with an Outlook REST bearer token
    Auth {
        /// Bearer token for the Outlook REST API
        token: String,
    },

    /// List resources
    #[command(subcommand)]
    List(ListCommands),

    /// Fuzzy-search folders by name or path
    Search {
        /// Search query
        query: String,
    },

    /// Interactively pick a destination folder for an email
    Pick {
        /// Email ID
        item_id: String,
    },

    /// Move an email to a folder
    Move {
        /// Email ID
        item_id: String,

        /// Destination folder id, name, or fuzzy path
        #[arg(long)]
        to: String,
    },

    /// Force-refresh the folder cache
    Refresh,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// List folders with their full paths, sorted
    Folders {
        /// Bypass the cache and refetch
        #[arg(long)]
        refresh: bool,
    },

    /// List recently used destination folders
    Recent,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Auth { token } => commands::auth(&token).await,

        Commands::List(cmd) => match cmd {
            ListCommands::Folders { refresh } => commands::list_folders(refresh).await,
            ListCommands::Recent => commands::list_recent().await,
        },

        Commands::Search { query } => commands::search(&query).await,

        Commands::Pick { item_id } => commands::pick(&item_id).await,

        Commands::Move { item_id, to } => commands::move_email(&item_id, &to).await,

        Commands::Refresh => commands::refresh().await,

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "refile", &mut io::stdout());
            return;
        }
    };

    if let Err(e) = result {
        Output::<()>::error(e.to_string()).print();
        std::process::exit(1);
    }
}
