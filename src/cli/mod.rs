//! CLI entry point for Stanza.

pub mod auth;
pub mod poems;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::auth::{FileStorage, SessionCoordinator, TokenStore};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::Result;

/// Stanza command-line client
#[derive(Parser, Debug)]
#[command(name = "stanza", version, about = "Stanza poetry service client")]
pub struct Cli {
    /// Config file (defaults to ~/.stanza/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session management
    Auth(AuthArgs),
    /// Browse poems
    Poems(PoemsArgs),
}

#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Print the URL that starts the OAuth sign-in
    LoginUrl(LoginUrlArgs),
    /// Finish sign-in with the URL the browser was redirected to
    Callback(CallbackArgs),
    /// Show what is stored locally
    Status,
    /// Fetch the signed-in user from the server
    Whoami,
    /// Exchange the refresh token for a new pair now
    Refresh,
    /// Sign out here and on the server
    Logout,
}

#[derive(Parser, Debug)]
pub struct LoginUrlArgs {
    /// Page to land on after signing in
    #[arg(long)]
    pub redirect_to: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CallbackArgs {
    /// Full callback URL (or just its query string)
    pub url: String,

    /// Skip seeding the profile from the identity provider
    #[arg(long)]
    pub no_profile_sync: bool,
}

#[derive(Parser, Debug)]
pub struct PoemsArgs {
    #[command(subcommand)]
    pub command: PoemsCommands,
}

#[derive(Subcommand, Debug)]
pub enum PoemsCommands {
    /// List poems, one page at a time
    List(ListArgs),
    /// Show one poem
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    #[arg(short, long, default_value_t = 12)]
    pub limit: u32,

    /// Filter by text
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    pub id: String,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load config and build a session backed by the on-disk store.
    pub fn session(&self) -> Result<SessionCoordinator> {
        let path = self.config.clone().unwrap_or_else(ClientConfig::default_path);
        let config = ClientConfig::load_from_path(path)?;
        let store = TokenStore::new(Arc::new(FileStorage::new(config.storage_dir.clone())));
        Ok(SessionCoordinator::new(ApiClient::new(config, store)?))
    }
}

/// Run the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let session = cli.session()?;
    match cli.command {
        Commands::Auth(args) => match args.command {
            AuthCommands::LoginUrl(args) => auth::handle_login_url(&session, args.redirect_to.as_deref()),
            AuthCommands::Callback(args) => {
                auth::handle_callback(&session, &args.url, !args.no_profile_sync).await
            }
            AuthCommands::Status => auth::handle_status(&session),
            AuthCommands::Whoami => auth::handle_whoami(&session).await,
            AuthCommands::Refresh => auth::handle_refresh(&session).await,
            AuthCommands::Logout => auth::handle_logout(&session).await,
        },
        Commands::Poems(args) => match args.command {
            PoemsCommands::List(args) => poems::handle_list(&session, &args).await,
            PoemsCommands::Show(args) => poems::handle_show(&session, &args.id).await,
        },
    }
}
