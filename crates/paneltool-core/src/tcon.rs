//! TCON firmware store access
//!
//! Maps logical firmware offsets to bus transactions according to the
//! configured access flow and performs the bulk read-back used for
//! firmware backup.

use crate::bus::{self, PanelBus};
use crate::config::{TconConfig, TconKind};
use crate::error::{Error, Result};

/// Length of one read segment in the verified bulk transaction.
const SEGMENT_LEN: usize = 256;
/// Number of read segments in the verified bulk transaction.
const SEGMENT_COUNT: usize = 2;

/// Version and Vcom bytes read back from the firmware store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareIdent {
    /// Major firmware version.
    pub major: u8,
    /// Minor firmware version.
    pub minor: u8,
    /// Vcom calibration byte.
    pub vcom: u8,
}

/// Read `buf.len()` bytes starting at logical firmware `offset`,
/// applying the per-flow address mapping.
pub fn read_at<M: PanelBus + ?Sized>(
    bus: &mut M,
    cfg: &TconConfig,
    offset: u16,
    buf: &mut [u8],
) -> Result<()> {
    match cfg.kind {
        TconKind::Nt71394 if cfg.write_chunk > 0 => {
            // Instead of a single large EEPROM at address A, the part
            // exposes many small (write_chunk long) EEPROMs at
            // addresses A, A+1, A+2...
            let addr = cfg.address.wrapping_add((offset as usize / cfg.write_chunk) as u8);
            let offset = (offset as usize % cfg.write_chunk) as u16;
            bus::read_offset8(bus, addr, offset, buf)
        }
        kind => Err(Error::UnsupportedAccessFlow(kind)),
    }
}

/// Bulk read of the whole firmware store.
///
/// Only the NT71394 flow is implemented, and only as the exact
/// transaction the part is known to accept: a single offset-0 address
/// phase followed by two back-to-back 256-byte read segments. Image
/// sizes other than 512 bytes have no verified transaction shape yet.
/// Every other flow fails before any transaction is issued.
pub fn read_all<M: PanelBus + ?Sized>(bus: &mut M, cfg: &TconConfig) -> Result<Vec<u8>> {
    if cfg.kind != TconKind::Nt71394 {
        return Err(Error::UnsupportedAccessFlow(cfg.kind));
    }
    if cfg.size != SEGMENT_COUNT * SEGMENT_LEN {
        return Err(Error::UnverifiedImageSize {
            kind: cfg.kind,
            size: cfg.size,
        });
    }

    log::debug!("Reading firmware ({} bytes)", cfg.size);
    let mut image = vec![0u8; cfg.size];
    let (front, back) = image.split_at_mut(SEGMENT_LEN);
    bus.write_read(cfg.address, &[0], &mut [front, back])?;
    Ok(image)
}

/// Generalized chunked read: steps `read_chunk` bytes at a time over
/// the whole store via [`read_at`], with a short tail chunk.
///
/// Kept separate from [`read_all`] so the verified two-segment
/// transaction stays byte-comparable against known-good captures while
/// the remaining flows grow real algorithms.
pub fn read_all_chunked<M: PanelBus + ?Sized>(bus: &mut M, cfg: &TconConfig) -> Result<Vec<u8>> {
    if cfg.read_chunk == 0 {
        return Err(Error::UnsupportedAccessFlow(cfg.kind));
    }

    let mut image = vec![0u8; cfg.size];
    let mut offset = 0usize;
    while offset < cfg.size {
        let len = cfg.read_chunk.min(cfg.size - offset);
        read_at(bus, cfg, offset as u16, &mut image[offset..offset + len])?;
        offset += len;
    }
    Ok(image)
}

/// Read back the firmware version and Vcom bytes.
pub fn ident<M: PanelBus + ?Sized>(bus: &mut M, cfg: &TconConfig) -> Result<FirmwareIdent> {
    let mut byte = [0u8; 1];

    read_at(bus, cfg, cfg.major_version_offset, &mut byte)?;
    let major = byte[0];
    read_at(bus, cfg, cfg.minor_version_offset, &mut byte)?;
    let minor = byte[0];
    read_at(bus, cfg, cfg.vcom_offset, &mut byte)?;
    let vcom = byte[0];

    log::debug!("Panel firmware version {:x}.{:02x}, Vcom {:02x}", major, minor, vcom);
    Ok(FirmwareIdent { major, minor, vcom })
}
