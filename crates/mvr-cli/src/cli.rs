use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mvr",
    about = "mvr -- Maven-style repository server",
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the repository server
    Serve(ServeArgs),
    /// Print the repository path of an artifact coordinate
    Path(PathArgs),
    /// Print the coordinate addressed by a repository path
    Parse(ParseArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on, overrides the configuration file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Serve files from this directory instead of memory
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct PathArgs {
    /// group:artifact:extension[:classifier]:version
    pub coordinate: String,
}

#[derive(Args)]
pub struct ParseArgs {
    /// Repository-relative path
    pub path: String,
}
