//! `itam` - terminal console for the asset inventory.

use clap::{Args, Parser, Subcommand};

use itam_core::{AssetCategory, AssetId, AssetStatus, RoleId, UserId};

mod commands;

/// IT asset inventory console
#[derive(Parser, Debug)]
#[command(name = "itam")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and persist the session token
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "ITAM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the stored token
    Logout,

    /// Show the signed-in user and role
    Whoami,

    /// List the navigation entries visible to the current role
    Nav,

    /// Resolve a path the way the router would
    Open { path: String },

    /// Asset records
    Assets {
        #[command(subcommand)]
        command: AssetCommands,
    },

    /// User administration
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AssetCommands {
    /// List assets, optionally filtered
    List {
        /// Substring of the asset code
        #[arg(long)]
        code: Option<String>,
        /// Substring of the IP address
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        category: Option<AssetCategory>,
        #[arg(long)]
        status: Option<AssetStatus>,
    },

    /// Show one asset
    Show { id: AssetId },

    /// Create an asset
    Create {
        /// Asset code (unique)
        code: String,
        #[command(flatten)]
        fields: AssetFields,
    },

    /// Edit an asset; unspecified fields keep their value
    Update {
        id: AssetId,
        #[arg(long)]
        code: Option<String>,
        #[command(flatten)]
        fields: AssetFields,
    },

    /// Delete an asset after confirming on stdin
    Delete {
        id: AssetId,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct AssetFields {
    #[arg(long)]
    pub category: Option<AssetCategory>,
    #[arg(long)]
    pub status: Option<AssetStatus>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub serial: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub dept: Option<String>,
    #[arg(long)]
    pub ip: Option<String>,
    #[arg(long)]
    pub mac: Option<String>,
    #[arg(long)]
    pub firmware: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List user accounts
    List,

    /// List roles and their capabilities
    Roles,

    /// Create an account
    Create {
        username: String,
        /// Role id (defaults to the first role)
        #[arg(long)]
        role: Option<RoleId>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        dept: Option<String>,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Edit an account; the password only changes when given
    Update {
        id: UserId,
        #[arg(long)]
        role: Option<RoleId>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        dept: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Enable or disable an account
    Toggle { id: UserId },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    itam_observability::init(log_level);

    let result: anyhow::Result<()> = async {
        let console = commands::Console::open(cli.json).await?;
        match cli.command {
            Commands::Login { username, password } => console.login(&username, password).await,
            Commands::Logout => console.logout(),
            Commands::Whoami => console.whoami(),
            Commands::Nav => console.nav(),
            Commands::Open { path } => console.open_path(&path),
            Commands::Assets { command } => console.assets(command).await,
            Commands::Users { command } => console.users(command).await,
        }
    }
    .await;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
