pub mod args;
pub mod format;
pub mod record;

pub use args::{Cli, CliCommand};
pub use format::{handle_format_command, handle_probe_command};
pub use record::handle_record_command;

use crate::audio;
use anyhow::Result;

pub fn handle_devices_command() -> Result<()> {
    let devices = audio::list_input_devices()?;
    if devices.is_empty() {
        println!("No capture devices found.");
        return Ok(());
    }

    for name in devices {
        println!("{name}");
    }
    Ok(())
}
