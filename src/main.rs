//! paneltool - Panel TCON identification and firmware backup
//!
//! A bring-up/recovery utility for Sharp panels driven by Novatek
//! TCONs. It verifies the panel identity from its EDID, loads the
//! per-panel configuration describing the firmware store, and backs
//! the firmware image up to a file.
//!
//! # Flow
//!
//! Identity verification gates everything: an unsupported panel aborts
//! before any configuration is touched. The verified model code then
//! selects `firmware/<code>/model.ini`, whose addressing parameters
//! drive the firmware reader. Firmware *writing* is not implemented.

mod buses;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use paneltool_core::{config, edid};
use std::io::Write;
use std::path::PathBuf;

/// Base directory of per-panel configuration files.
const FIRMWARE_DIR: &str = "firmware";
/// Per-panel configuration file name.
const CONFIG_NAME: &str = "model.ini";
/// Presence of this variable suppresses the confirmation prompt.
const NONINTERACTIVE_ENV: &str = "PANELTOOL_NONINTERACTIVE";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let mut bus = buses::open_bus(&cli.device)?;

    // Identity gates everything downstream.
    let record = edid::verify(bus.as_mut())?;
    println!(
        "Panel EDID indicates SHP {:04x} {}\n",
        record.panel_id, record.panel_code
    );

    if matches!(cli.command, Commands::Probe) {
        return Ok(());
    }

    let path: PathBuf = [FIRMWARE_DIR, &record.panel_code, CONFIG_NAME]
        .iter()
        .collect();
    let cfg = config::load(&path)?;
    println!("{}", cfg);

    if let Commands::Flash { variant } = &cli.command {
        return Err(format!("firmware flashing ({}) is not implemented", variant).into());
    }

    if !confirm()? {
        println!("Exiting.");
        return Ok(());
    }

    match cli.command {
        Commands::Ident => commands::ident::run_ident(bus.as_mut(), &cfg),
        Commands::Backup { output } => commands::backup::run_backup(bus.as_mut(), &cfg, &output),
        // Probe and Flash returned above.
        Commands::Probe | Commands::Flash { .. } => Ok(()),
    }
}

/// Interactive "type to confirm" safety prompt. Returns false if the
/// operator declined.
fn confirm() -> Result<bool, Box<dyn std::error::Error>> {
    if std::env::var_os(NONINTERACTIVE_ENV).is_some() {
        return Ok(true);
    }

    print!(
        "               /!\\ WARNING WARNING WARNING /!\\\n\
         PANELTOOL IS THIRD-PARTY SOFTWARE PROVIDED WITH ABSOLUTELY\n\
         NO WARRANTY, EXPRESS OR IMPLIED, INCLUDING THE WARRANTY OF NOT TEMPORARILY\n\
         OR PERMANENTLY MAKING YOUR HARDWARE UNUSABLE. USE AT YOUR OWN RISK.\n\
         \n\
         Do you want to proceed? Type \"I understand\" to continue: "
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    if answer.trim_end() == "I understand" {
        println!();
        Ok(true)
    } else {
        Ok(false)
    }
}
