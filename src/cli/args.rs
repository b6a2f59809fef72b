use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aircast")]
#[command(about = "Capture audio in a fixed, validated format", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the one in the user config directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print version information
    Version,
    /// Show the configured capture format
    Format(FormatCliArgs),
    /// Show the format of a WAV file
    Probe(ProbeCliArgs),
    /// List available capture devices
    Devices,
    /// Record the configured source into a WAV file
    Record(RecordCliArgs),
}

#[derive(ClapArgs, Debug)]
pub struct FormatCliArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ProbeCliArgs {
    /// WAV file to inspect
    pub file: PathBuf,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct RecordCliArgs {
    /// Output WAV file
    pub output: PathBuf,
    /// Stop after this many seconds (default: until the source ends)
    #[arg(short, long)]
    pub seconds: Option<f64>,
}
