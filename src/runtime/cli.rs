use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "musify")]
#[command(about = "Scan the media index and answer the audio channel like the UI layer would")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dispatch `getSongs` on the audio channel and print the replies as JSON.
    Scan(ScanArgs),
    /// Walk directories and write what they contain into a SQLite media index.
    Index(IndexArgs),
    /// Print the effective settings as TOML.
    Config,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directories to index. Overrides `index.roots`.
    pub roots: Vec<PathBuf>,

    /// Query this SQLite media index instead of walking directories.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Platform API level. Overrides `permission.api_level`.
    #[arg(long)]
    pub api_level: Option<u32>,

    /// Start with the read permission not granted.
    #[arg(long)]
    pub deny: bool,

    /// Grant the permission when it is requested.
    #[arg(long, requires = "deny")]
    pub grant_on_request: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Directories to walk.
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,

    /// SQLite database to (re)write.
    #[arg(long)]
    pub db: PathBuf,
}
