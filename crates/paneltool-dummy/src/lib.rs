//! paneltool-dummy - In-memory panel emulator
//!
//! This crate provides a dummy bus that emulates a panel in memory: an
//! EDID block at the DDC address and a firmware EEPROM exposed as
//! consecutive small devices, the way the NT71394 flow expects. It's
//! useful for testing and development without real hardware.

use paneltool_core::bus::{decode_offset, PanelBus};
use paneltool_core::error::{Error, Result};

/// Size of the emulated EDID block.
pub const EDID_LEN: usize = 128;

/// Configuration for the emulated panel
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Bus address serving the EDID block
    pub edid_addr: u8,
    /// First bus address of the firmware EEPROM pages
    pub tcon_addr: u8,
    /// Bytes served per consecutive bus address
    pub page_size: usize,
    /// Total firmware store size in bytes
    pub eeprom_size: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            edid_addr: 0x50,
            tcon_addr: 0x60,
            page_size: 256,
            eeprom_size: 512,
        }
    }
}

/// In-memory panel emulator
pub struct DummyPanel {
    config: DummyConfig,
    edid: [u8; EDID_LEN],
    eeprom: Vec<u8>,
    transactions: usize,
}

impl DummyPanel {
    /// Create an emulated panel with the given EDID and firmware image
    pub fn new(config: DummyConfig, edid: [u8; EDID_LEN], eeprom: Vec<u8>) -> Self {
        Self {
            config,
            edid,
            eeprom,
            transactions: 0,
        }
    }

    /// Create a demo panel: a valid Sharp EDID naming the `DUMMY`
    /// model and a firmware store filled with a recognizable pattern
    pub fn demo() -> Self {
        let config = DummyConfig::default();
        let mut eeprom = vec![0u8; config.eeprom_size];
        for (i, byte) in eeprom.iter_mut().enumerate() {
            *byte = (i / config.page_size.max(1)) as u8;
        }
        // Plausible version/Vcom bytes for the ident command
        eeprom[0x20] = 0x01;
        eeprom[0x21] = 0x07;
        eeprom[0x22] = 0x46;
        Self::new(config, build_edid(0x14B8, "DUMMY"), eeprom)
    }

    /// Number of transactions submitted so far
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// Emulated firmware store contents
    pub fn eeprom(&self) -> &[u8] {
        &self.eeprom
    }

    /// Mutable access to the emulated firmware store
    pub fn eeprom_mut(&mut self) -> &mut [u8] {
        &mut self.eeprom
    }

    fn serve(&self, source: &[u8], start: usize, segments: &mut [&mut [u8]]) -> bool {
        let mut cursor = start;
        for segment in segments.iter_mut() {
            if cursor + segment.len() > source.len() {
                return false;
            }
            segment.copy_from_slice(&source[cursor..cursor + segment.len()]);
            cursor += segment.len();
        }
        true
    }
}

impl PanelBus for DummyPanel {
    fn write_read(&mut self, addr: u8, offset: &[u8], segments: &mut [&mut [u8]]) -> Result<()> {
        self.transactions += 1;
        let start = decode_offset(offset) as usize;
        let total: usize = segments.iter().map(|s| s.len()).sum();
        log::trace!("dummy: read {:02x} @ {:04x} ({} bytes)", addr, start, total);

        let fail = Error::TransactionFailed {
            addr,
            offset: start as u16,
            len: total,
        };

        if addr == self.config.edid_addr {
            if self.serve(&self.edid, start, segments) {
                return Ok(());
            }
            return Err(fail);
        }

        // Firmware pages at consecutive addresses; each page is its own
        // small device, so a segment must not run past the page end.
        let pages = self.eeprom.len() / self.config.page_size.max(1);
        if addr >= self.config.tcon_addr && (addr as usize) < self.config.tcon_addr as usize + pages
        {
            let page = (addr - self.config.tcon_addr) as usize;
            let base = page * self.config.page_size;
            let page_data = &self.eeprom[base..base + self.config.page_size];
            // The device's internal counter wraps within the page, so a
            // multi-segment read re-serves the page from the cursor.
            let mut cursor = start;
            for segment in segments.iter_mut() {
                for byte in segment.iter_mut() {
                    if page_data.is_empty() {
                        return Err(fail);
                    }
                    *byte = page_data[cursor % page_data.len()];
                    cursor += 1;
                }
            }
            return Ok(());
        }

        // Nothing at this address
        Err(fail)
    }
}

/// Build a minimally valid Sharp EDID image carrying the given product
/// code and display-name descriptor (in the last slot)
pub fn build_edid(product: u16, name: &str) -> [u8; EDID_LEN] {
    let mut edid = [0u8; EDID_LEN];
    edid[..8].copy_from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    // "SHP" vendor signature
    edid[8] = 0x4D;
    edid[9] = 0x10;
    edid[10..12].copy_from_slice(&product.to_le_bytes());

    // Display-name descriptor in slot 3 (0x36 + 3 * 0x12)
    let base = 0x36 + 3 * 0x12;
    edid[base + 3] = 0xFE;
    let text = &mut edid[base + 5..base + 5 + 13];
    text.fill(b' ');
    for (dst, src) in text.iter_mut().zip(name.bytes()) {
        *dst = src;
    }
    if name.len() < 13 {
        text[name.len()] = 0x0A;
    }
    edid
}

#[cfg(test)]
mod tests {
    use super::*;
    use paneltool_core::bus;

    #[test]
    fn serves_the_edid_block() {
        let mut panel = DummyPanel::demo();
        let mut edid = [0u8; EDID_LEN];
        bus::read_offset8(&mut panel, 0x50, 0, &mut edid).unwrap();
        assert_eq!(&edid[..8], &[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
        assert_eq!(panel.transactions(), 1);
    }

    #[test]
    fn verify_accepts_the_demo_edid() {
        let mut panel = DummyPanel::demo();
        let record = paneltool_core::edid::verify(&mut panel).unwrap();
        assert_eq!(record.panel_id, 0x14B8);
        assert_eq!(record.panel_code, "DUMMY");
    }

    #[test]
    fn serves_eeprom_pages_at_consecutive_addresses() {
        let mut panel = DummyPanel::demo();
        let mut buf = [0xFFu8; 4];
        bus::read_offset8(&mut panel, 0x60, 0x10, &mut buf).unwrap();
        assert_eq!(buf, [0x00; 4]);
        bus::read_offset8(&mut panel, 0x61, 0x10, &mut buf).unwrap();
        assert_eq!(buf, [0x01; 4]);
    }

    #[test]
    fn unknown_address_fails_the_transaction() {
        let mut panel = DummyPanel::demo();
        let mut buf = [0u8; 1];
        assert!(bus::read_offset8(&mut panel, 0x23, 0, &mut buf).is_err());
    }

    #[test]
    fn edid_read_past_end_fails() {
        let mut panel = DummyPanel::demo();
        let mut buf = [0u8; 64];
        assert!(bus::read_offset8(&mut panel, 0x50, 0x70, &mut buf).is_err());
    }
}
