use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ctxcap",
    about = "Capture, merge, and audit tracking context data",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture documents from a JSON-lines file and print the report
    Capture(CaptureArgs),
    /// Replay host events from a JSON-lines file through the bridge
    Bridge(BridgeArgs),
    /// Show the resolved configuration
    Config(ConfigArgs),
}

#[derive(Args, Clone, Copy, Debug, Default)]
pub struct StopArgs {
    /// Report the raw documents without merging
    #[arg(long)]
    pub no_merge: bool,
    /// Match keys case-sensitively while merging
    #[arg(long)]
    pub case_sensitive: bool,
}

#[derive(Args)]
pub struct CaptureArgs {
    /// One JSON object per line; a `null` line is a document without data
    pub input: PathBuf,
    #[command(flatten)]
    pub stop: StopArgs,
}

#[derive(Args)]
pub struct BridgeArgs {
    /// One host event per line
    pub input: PathBuf,
    #[command(flatten)]
    pub stop: StopArgs,
    /// Print every outbound request
    #[arg(long)]
    pub show_requests: bool,
}

#[derive(Args)]
pub struct ConfigArgs {}
