//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paneltool")]
#[command(author, version, about = "Panel TCON identification and firmware backup", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Bus to use: an i2c-dev node path, or "dummy" for the in-memory
    /// emulator
    #[arg(short, long, default_value = "/dev/i2c-4", global = true)]
    pub device: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the EDID and check whether the panel is supported
    Probe,

    /// Read the panel firmware version and Vcom
    Ident,

    /// Back up the firmware from the panel to a file
    Backup {
        /// Output file path
        output: PathBuf,
    },

    /// Write a firmware variant to the panel (not implemented)
    Flash {
        /// Firmware variant to write
        variant: String,
    },
}
