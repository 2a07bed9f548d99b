//! Ident command implementation

use paneltool_core::bus::PanelBus;
use paneltool_core::config::TconConfig;
use paneltool_core::tcon;

/// Run the ident command: read back the firmware version and Vcom
/// bytes named by the configuration.
pub fn run_ident(
    bus: &mut dyn PanelBus,
    cfg: &TconConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = tcon::ident(bus, cfg)?;

    println!("Current panel firmware:");
    println!("  version {:x}.{:02x}", id.major, id.minor);
    println!("  Vcom {:02x}", id.vcom);
    println!();

    Ok(())
}
