//! Backup command implementation

use paneltool_core::bus::PanelBus;
use paneltool_core::config::TconConfig;
use paneltool_core::error::Error;
use paneltool_core::tcon;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run the backup command: bulk-read the firmware store and write the
/// image to `output`.
pub fn run_backup(
    bus: &mut dyn PanelBus,
    cfg: &TconConfig,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Reading firmware");
    let image = tcon::read_all(bus, cfg)?;

    let persist = |source: std::io::Error| Error::PersistenceFailed {
        path: output.display().to_string(),
        source,
    };
    let mut file = File::create(output).map_err(persist)?;
    file.write_all(&image).map_err(persist)?;

    println!("Wrote {} bytes to {}", image.len(), output.display());
    Ok(())
}
