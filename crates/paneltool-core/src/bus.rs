//! Bus transaction abstraction
//!
//! Every access to the panel is one combined transaction: an
//! address-phase write carrying the device offset, followed by one or
//! more data-phase read segments, all addressed to the same 7-bit
//! target with no bus release in between. The targets have no internal
//! addressing latch that survives a bus release, so splitting the
//! phases into separate transactions does not work.

use crate::error::Result;

/// Offset-addressing width of the address phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetWidth {
    /// One offset byte on the wire.
    Bits8,
    /// Two offset bytes on the wire, big-endian.
    Bits16,
}

/// Encode a device offset for the address phase.
///
/// Returns the encoded bytes and how many of them are used. 8-bit mode
/// emits the low byte only: an offset beyond 8-bit range is narrowed,
/// an addressing limitation inherited from the target protocol rather
/// than a checked error.
pub fn encode_offset(width: OffsetWidth, offset: u16) -> ([u8; 2], usize) {
    match width {
        OffsetWidth::Bits8 => ([offset as u8, 0], 1),
        OffsetWidth::Bits16 => (offset.to_be_bytes(), 2),
    }
}

/// Recover the device offset from an encoded address phase.
///
/// Used by transports to report which offset a failed transaction
/// addressed.
pub fn decode_offset(encoded: &[u8]) -> u16 {
    match *encoded {
        [low] => low as u16,
        [high, low] => u16::from_be_bytes([high, low]),
        _ => 0,
    }
}

/// A duplex bus capable of combined write-then-read transactions.
///
/// Implementations submit the whole transaction atomically. Zero-length
/// segments and out-of-range addresses are passed through unvalidated;
/// whatever the caller supplies goes on the wire.
pub trait PanelBus {
    /// Submit one combined transaction: an address-phase write of
    /// `offset`, then the given read segments back to back, all at the
    /// 7-bit address `addr`.
    fn write_read(&mut self, addr: u8, offset: &[u8], segments: &mut [&mut [u8]]) -> Result<()>;
}

/// Single-segment read with an explicit offset width.
pub fn read<M: PanelBus + ?Sized>(
    bus: &mut M,
    addr: u8,
    width: OffsetWidth,
    offset: u16,
    buf: &mut [u8],
) -> Result<()> {
    let (encoded, len) = encode_offset(width, offset);
    log::trace!(
        "bus: read {:02x} @ {:04x} ({} bytes, {:?})",
        addr,
        offset,
        buf.len(),
        width
    );
    bus.write_read(addr, &encoded[..len], &mut [buf])
}

/// Single-segment read with a 1-byte offset phase.
pub fn read_offset8<M: PanelBus + ?Sized>(
    bus: &mut M,
    addr: u8,
    offset: u16,
    buf: &mut [u8],
) -> Result<()> {
    read(bus, addr, OffsetWidth::Bits8, offset, buf)
}

/// Single-segment read with a 2-byte offset phase.
pub fn read_offset16<M: PanelBus + ?Sized>(
    bus: &mut M,
    addr: u8,
    offset: u16,
    buf: &mut [u8],
) -> Result<()> {
    read(bus, addr, OffsetWidth::Bits16, offset, buf)
}
