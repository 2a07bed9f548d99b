//! Panel identity verification from the EDID block
//!
//! Fetches the fixed 128-byte EDID from the DDC address and decodes the
//! fields this tool cares about: the vendor signature, the product
//! code, and the short model code carried in a display-name descriptor.

use crate::bus::{self, PanelBus};
use crate::error::{Error, IdentityError, Result};

/// Bus address of the DDC EDID store.
const EDID_ADDR: u8 = 0x50;
/// Size of the base EDID block.
const EDID_LEN: usize = 128;
/// Fixed EDID header magic.
const EDID_MAGIC: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
/// EISA vendor signature for "SHP" (Sharp), as stored at bytes 8-9.
const VENDOR_SHP: [u8; 2] = [0x4D, 0x10];

/// Offset of the first 18-byte descriptor slot.
const DESC_BASE: usize = 0x36;
/// Size of one descriptor slot.
const DESC_LEN: usize = 0x12;
/// Number of descriptor slots in the base block.
const DESC_COUNT: usize = 4;
/// Display descriptor tag for an alphanumeric data string.
const TAG_DISPLAY_NAME: u8 = 0xFE;
/// Offset of the name text within a display-name slot.
const NAME_OFFSET: usize = 5;
/// Length of the model code within the name text.
const NAME_LEN: usize = 5;

/// Identity decoded from a panel's EDID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdidRecord {
    /// Vendor product code, little-endian at EDID bytes 10-11.
    pub panel_id: u16,
    /// Short model code from the display-name descriptor, up to 5
    /// ASCII characters.
    pub panel_code: String,
}

/// Read the EDID over the bus and decode the panel identity.
pub fn verify<M: PanelBus + ?Sized>(bus: &mut M) -> Result<EdidRecord> {
    let mut edid = [0u8; EDID_LEN];
    bus::read_offset8(bus, EDID_ADDR, 0, &mut edid)?;
    let record = decode(&edid)?;
    log::debug!(
        "Panel EDID indicates SHP {:04x} {}",
        record.panel_id,
        record.panel_code
    );
    Ok(record)
}

/// Decode a raw EDID block into an [`EdidRecord`].
pub fn decode(edid: &[u8; EDID_LEN]) -> Result<EdidRecord> {
    if edid[..EDID_MAGIC.len()] != EDID_MAGIC {
        return Err(Error::IdentityRejected(IdentityError::CorruptedDescriptor));
    }

    if edid[8..10] != VENDOR_SHP {
        return Err(Error::IdentityRejected(IdentityError::UnsupportedVendor));
    }

    let panel_id = u16::from_le_bytes([edid[10], edid[11]]);

    // Scan the four descriptor slots for a display-name descriptor
    // (00 00 xx FE). Later slots overwrite earlier matches.
    let mut name: Option<&[u8]> = None;
    for i in 0..DESC_COUNT {
        let desc = &edid[DESC_BASE + DESC_LEN * i..DESC_BASE + DESC_LEN * (i + 1)];
        if !(desc[0] == 0 && desc[1] == 0 && desc[3] == TAG_DISPLAY_NAME) {
            continue;
        }
        name = Some(&desc[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
    }

    let panel_code = match name {
        Some(raw) => trim_name(raw),
        None => String::new(),
    };
    if panel_code.is_empty() {
        return Err(Error::IdentityRejected(IdentityError::MissingPanelName));
    }

    Ok(EdidRecord {
        panel_id,
        panel_code,
    })
}

/// Strip the terminator and padding EDID text strings carry (0x0A,
/// then spaces; unused slots may be NUL).
fn trim_name(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim_end_matches(['\n', ' ', '\0']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_edid(product: u16, name: &str) -> [u8; EDID_LEN] {
        let mut edid = [0u8; EDID_LEN];
        edid[..8].copy_from_slice(&EDID_MAGIC);
        edid[8..10].copy_from_slice(&VENDOR_SHP);
        edid[10..12].copy_from_slice(&product.to_le_bytes());
        set_name_descriptor(&mut edid, 3, name);
        edid
    }

    fn set_name_descriptor(edid: &mut [u8; EDID_LEN], slot: usize, name: &str) {
        let base = DESC_BASE + DESC_LEN * slot;
        edid[base] = 0;
        edid[base + 1] = 0;
        edid[base + 3] = TAG_DISPLAY_NAME;
        let mut text = [b' '; NAME_LEN];
        for (dst, src) in text.iter_mut().zip(name.bytes()) {
            *dst = src;
        }
        if name.len() < NAME_LEN {
            text[name.len()] = b'\n';
        }
        edid[base + NAME_OFFSET..base + NAME_OFFSET + NAME_LEN].copy_from_slice(&text);
    }

    #[test]
    fn decodes_product_code_little_endian() {
        let edid = valid_edid(0x14B8, "LQ134");
        let record = decode(&edid).unwrap();
        assert_eq!(record.panel_id, 0x14B8);
        assert_eq!(record.panel_code, "LQ134");
    }

    #[test]
    fn short_name_is_trimmed() {
        let edid = valid_edid(1, "AB1");
        assert_eq!(decode(&edid).unwrap().panel_code, "AB1");
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut edid = valid_edid(1, "LQ134");
        edid[0] = 0xFF;
        assert!(matches!(
            decode(&edid),
            Err(Error::IdentityRejected(IdentityError::CorruptedDescriptor))
        ));
    }

    #[test]
    fn wrong_vendor_is_rejected() {
        let mut edid = valid_edid(1, "LQ134");
        edid[8] = 0x10;
        edid[9] = 0xAC;
        assert!(matches!(
            decode(&edid),
            Err(Error::IdentityRejected(IdentityError::UnsupportedVendor))
        ));
    }

    #[test]
    fn missing_name_descriptor_is_rejected() {
        let mut edid = [0u8; EDID_LEN];
        edid[..8].copy_from_slice(&EDID_MAGIC);
        edid[8..10].copy_from_slice(&VENDOR_SHP);
        assert!(matches!(
            decode(&edid),
            Err(Error::IdentityRejected(IdentityError::MissingPanelName))
        ));
    }

    #[test]
    fn padding_only_name_is_rejected() {
        // A descriptor holding nothing but terminator and padding
        // trims to an empty code and counts as missing.
        let edid = valid_edid(1, "");
        assert!(matches!(
            decode(&edid),
            Err(Error::IdentityRejected(IdentityError::MissingPanelName))
        ));
    }

    #[test]
    fn last_matching_descriptor_wins() {
        let mut edid = valid_edid(1, "FIRST");
        set_name_descriptor(&mut edid, 0, "FIRST");
        set_name_descriptor(&mut edid, 2, "LAST1");
        // Slot 3 was set by valid_edid; overwrite it so slot 2 and 3
        // disagree and ascending order decides.
        set_name_descriptor(&mut edid, 3, "LAST2");
        assert_eq!(decode(&edid).unwrap().panel_code, "LAST2");
    }

    struct EdidBus {
        edid: [u8; EDID_LEN],
        requests: Vec<(u8, Vec<u8>, usize)>,
    }

    impl PanelBus for EdidBus {
        fn write_read(
            &mut self,
            addr: u8,
            offset: &[u8],
            segments: &mut [&mut [u8]],
        ) -> crate::Result<()> {
            self.requests
                .push((addr, offset.to_vec(), segments.iter().map(|s| s.len()).sum()));
            for segment in segments.iter_mut() {
                let len = segment.len().min(EDID_LEN);
                segment[..len].copy_from_slice(&self.edid[..len]);
            }
            Ok(())
        }
    }

    #[test]
    fn verify_reads_128_bytes_from_ddc_address() {
        let mut bus = EdidBus {
            edid: valid_edid(0xBEEF, "LQ134"),
            requests: vec![],
        };
        let record = verify(&mut bus).unwrap();
        assert_eq!(record.panel_id, 0xBEEF);
        assert_eq!(bus.requests, vec![(0x50, vec![0x00], 128)]);
    }
}
