//! CLI argument parsing for stypes.

use clap::Parser;
use std::path::PathBuf;

/// stypes - fetch TypeScript declaration files for a dependency manifest
#[derive(Parser, Debug)]
#[command(name = "stypes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Packages to resolve, as name or name@range
    pub packages: Vec<String>,

    /// Project package.json (default ./package.json when no packages are given)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Also resolve devDependencies
    #[arg(long)]
    pub dev: bool,

    /// Also resolve peerDependencies
    #[arg(long)]
    pub peer: bool,

    /// Write files under this directory instead of printing JSON
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// CDN base URL
    #[arg(long, env = "STYPES_CDN")]
    pub cdn: Option<String>,

    /// Metadata API base URL
    #[arg(long, env = "STYPES_DATA")]
    pub data: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}
