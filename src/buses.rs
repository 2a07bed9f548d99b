//! Bus backend selection
//!
//! Dispatches the `--device` value to one of the compiled-in bus
//! backends.

use paneltool_core::bus::PanelBus;

/// Open the bus named by `device`: `dummy` selects the in-memory
/// emulator, anything else is treated as an i2c-dev node path.
#[allow(unused_variables)]
pub fn open_bus(device: &str) -> Result<Box<dyn PanelBus>, Box<dyn std::error::Error>> {
    #[cfg(feature = "dummy")]
    if device == "dummy" {
        log::info!("Using the in-memory dummy panel");
        return Ok(Box::new(paneltool_dummy::DummyPanel::demo()));
    }

    #[cfg(feature = "linux-i2c")]
    {
        let bus = paneltool_linux_i2c::LinuxI2c::open(device)?;
        return Ok(Box::new(bus));
    }

    #[allow(unreachable_code)]
    Err(format!("no bus backend compiled in for {}", device).into())
}
