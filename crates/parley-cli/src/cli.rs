use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use parley_types::UserId;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley: ordered group chat over WebSockets",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the chat server
    Serve(ServeArgs),
    /// Generate a signing key pair
    Keygen,
    /// Issue a capability token offline
    Token(TokenArgs),
    /// Check a capability token offline
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Order posts in-process instead of through an external log
    #[arg(long, conflicts_with = "log_addr")]
    pub local_only: bool,
    /// Address of the external ordered log
    #[arg(long)]
    pub log_addr: Option<SocketAddr>,
    #[arg(long, requires = "log_addr")]
    pub topic: Option<String>,
    /// Directory of static files served at /
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
    /// Messages retained for resuming listeners
    #[arg(long)]
    pub backlog: Option<usize>,
    /// Enable POST /exit
    #[arg(long)]
    pub allow_remote_exit: bool,
}

#[derive(Args)]
pub struct TokenArgs {
    /// Hex signing key
    #[arg(long)]
    pub key: String,
    #[arg(long)]
    pub user: UserId,
    #[arg(long, default_value_t = 600_000)]
    pub ttl_ms: u64,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Hex verifying key
    #[arg(long)]
    pub public_key: String,
    pub token: String,
}
