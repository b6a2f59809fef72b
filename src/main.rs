use aircast::{
    cli::{
        handle_devices_command, handle_format_command, handle_probe_command,
        handle_record_command, Cli, CliCommand,
    },
    config::Config,
};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let load_config = || match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match cli.command {
        CliCommand::Version => {
            println!("aircast {}", env!("CARGO_PKG_VERSION"));
        }
        CliCommand::Format(args) => handle_format_command(&load_config()?, args)?,
        CliCommand::Probe(args) => handle_probe_command(args)?,
        CliCommand::Devices => handle_devices_command()?,
        CliCommand::Record(args) => handle_record_command(&load_config()?, args)?,
    }

    Ok(())
}
