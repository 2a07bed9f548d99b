//! Per-panel configuration files
//!
//! Line-oriented `KEY=value` text with `[section]` headers and `;`
//! comments, e.g.:
//!
//! ```text
//! ; LQ134 panel configuration
//! [panel]
//! APP_CAPTION=Sharp 13.4 FHD+
//! TCON_INIT_FLOW=1
//! TCON_ADDR=0xC0
//! EEPROM_SIZE=512
//! ```
//!
//! Parsing is a character-level state machine. Section names are
//! accepted but otherwise unused; keys live in a single implicit
//! global namespace. Unknown keys are ignored. Carriage returns are
//! dropped before any state dispatch.

use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;

/// Usable capacity of each lexical accumulator (section, key, value).
const FIELD_MAX: usize = 63;
/// Length of the diagnostic context reported on parse failure.
const CONTEXT_LEN: usize = 63;

/// TCON access flow: the per-panel-family algorithm for mapping a
/// logical firmware offset to a bus address and device offset.
///
/// Only [`TconKind::Nt71394`] has an implemented read path; the others
/// are recognized by the parser but fail with
/// [`Error::UnsupportedAccessFlow`] when a transfer is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TconKind {
    /// NT71897 with an external 24C32 EEPROM.
    Nt71897_24c32,
    /// NT71394 with its firmware store exposed as many small EEPROMs
    /// at consecutive bus addresses.
    Nt71394,
    /// NT71897 notebook variant.
    Nt71897Nb,
    /// NT71395.
    Nt71395,
}

impl TconKind {
    /// Map a `TCON_INIT_FLOW` value to its access flow.
    pub fn from_flow(flow: u64) -> Option<Self> {
        match flow {
            0 => Some(Self::Nt71897_24c32),
            1 => Some(Self::Nt71394),
            2 => Some(Self::Nt71897Nb),
            3 => Some(Self::Nt71395),
            _ => None,
        }
    }

    /// The `TCON_INIT_FLOW` value selecting this flow.
    pub fn flow(self) -> u8 {
        match self {
            Self::Nt71897_24c32 => 0,
            Self::Nt71394 => 1,
            Self::Nt71897Nb => 2,
            Self::Nt71395 => 3,
        }
    }

    /// Part-family name for operator output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nt71897_24c32 => "NT71897_24C32",
            Self::Nt71394 => "NT71394",
            Self::Nt71897Nb => "NT71897NB",
            Self::Nt71395 => "NT71395",
        }
    }
}

impl fmt::Display for TconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to address one panel family's firmware store.
///
/// Immutable once loaded. All numeric fields keep whatever width their
/// key's value narrowed to; no range validation happens beyond that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TconConfig {
    /// Display name, free text, non-semantic.
    pub caption: String,
    /// Access flow the firmware reader must use.
    pub kind: TconKind,
    /// 7-bit bus address of the TCON (the configured 8-bit read/write
    /// address with the R/W bit dropped).
    pub address: u8,
    /// Total firmware image size in bytes.
    pub size: usize,
    /// Maximum bytes per read transaction segment.
    pub read_chunk: usize,
    /// Maximum bytes per write transaction segment.
    pub write_chunk: usize,
    /// Firmware offset of the major version byte.
    pub major_version_offset: u16,
    /// Firmware offset of the minor version byte.
    pub minor_version_offset: u16,
    /// Firmware offset of the Vcom byte.
    pub vcom_offset: u16,
}

impl Default for TconConfig {
    fn default() -> Self {
        Self {
            caption: String::new(),
            kind: TconKind::Nt71897_24c32,
            address: 0,
            size: 0,
            read_chunk: 0,
            write_chunk: 0,
            major_version_offset: 0,
            minor_version_offset: 0,
            vcom_offset: 0,
        }
    }
}

impl fmt::Display for TconConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration for {}:", self.caption)?;
        writeln!(f, "  TCON access flow:      {}", self.kind.name())?;
        writeln!(f, "  TCON address:          {:02x}", self.address)?;
        writeln!(f, "  EEPROM size:           {:04x}", self.size)?;
        writeln!(f, "  EEPROM read buf size:  {:04x}", self.read_chunk)?;
        writeln!(f, "  EEPROM write buf size: {:04x}", self.write_chunk)?;
        writeln!(f, "  major version offset:  {:04x}", self.major_version_offset)?;
        writeln!(f, "  minor version offset:  {:04x}", self.minor_version_offset)?;
        writeln!(f, "  Vcom offset:           {:04x}", self.vcom_offset)
    }
}

impl TconConfig {
    /// Serialize back to the configuration grammar. Reparsing the
    /// result yields an identical record.
    pub fn to_config_string(&self) -> String {
        let mut out = String::new();
        out.push_str("[panel]\n");
        out.push_str(&format!("APP_CAPTION={}\n", self.caption));
        out.push_str(&format!("TCON_INIT_FLOW={}\n", self.kind.flow()));
        out.push_str(&format!("TCON_ADDR=0x{:02X}\n", (self.address as u16) << 1));
        out.push_str(&format!("EEPROM_SIZE={}\n", self.size));
        out.push_str(&format!("EEPROM_RD_BUF_SIZE={}\n", self.read_chunk));
        out.push_str(&format!("EEPROM_WR_BUF_SIZE={}\n", self.write_chunk));
        out.push_str(&format!("MAJOR_VER_ADDR=0x{:04X}\n", self.major_version_offset));
        out.push_str(&format!("MINOR_VER_ADDR=0x{:04X}\n", self.minor_version_offset));
        out.push_str(&format!("VCOM_ADDR=0x{:04X}\n", self.vcom_offset));
        out
    }
}

/// Load and parse a configuration file.
pub fn load(path: &Path) -> Result<TconConfig> {
    let text = std::fs::read(path).map_err(|source| Error::ConfigNotFound {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Parsing configuration {}", path.display());
    parse(&text)
}

/// Parse configuration text.
pub fn parse(input: &[u8]) -> Result<TconConfig> {
    Parser::new(input).run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Begin,
    Comment,
    Section,
    Key,
    Eq,
    Value,
}

type FieldBuf = heapless::Vec<u8, FIELD_MAX>;

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    section: FieldBuf,
    key: FieldBuf,
    value: FieldBuf,
    /// Position of the first key character, for error context.
    key_at: usize,
    cfg: TconConfig,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            section: FieldBuf::new(),
            key: FieldBuf::new(),
            value: FieldBuf::new(),
            key_at: 0,
            cfg: TconConfig::default(),
        }
    }

    fn run(mut self) -> Result<TconConfig> {
        let mut state = State::Begin;

        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            self.pos += 1;
            if c == b'\r' {
                continue;
            }

            match state {
                State::Begin => {
                    if c == b' ' || c == b'\n' {
                        // skip
                    } else if c == b';' {
                        state = State::Comment;
                    } else if c == b'[' {
                        state = State::Section;
                        self.section.clear();
                    } else if c.is_ascii_alphanumeric() {
                        state = State::Key;
                        self.key.clear();
                        // Re-consume as the first key character.
                        self.pos -= 1;
                        self.key_at = self.pos;
                    } else {
                        return Err(self.malformed_at_current());
                    }
                }

                State::Comment => {
                    if c == b'\n' {
                        state = State::Begin;
                    }
                }

                State::Section => {
                    if c.is_ascii_alphanumeric() || c == b'_' {
                        push(&mut self.section, c, "section name")?;
                    } else if c == b']' {
                        // The rest of the line is discardable.
                        state = State::Comment;
                    } else {
                        return Err(self.malformed_at_current());
                    }
                }

                State::Key => {
                    if c == b' ' {
                        // padding before '='
                    } else if c.is_ascii_alphanumeric() || c == b'_' {
                        push(&mut self.key, c, "key")?;
                    } else if c == b'=' {
                        state = State::Eq;
                    } else {
                        return Err(self.malformed_at_current());
                    }
                }

                State::Eq => {
                    if c == b' ' {
                        // padding after '='
                    } else {
                        state = State::Value;
                        self.value.clear();
                        self.pos -= 1;
                    }
                }

                State::Value => {
                    if c != b'\n' {
                        push(&mut self.value, c, "value")?;
                    } else {
                        self.apply()?;
                        state = State::Begin;
                    }
                }
            }
        }

        // End of input mid-token is accepted: the loader simply stops
        // and any in-flight pair is dropped.
        log::debug!("{}", self.cfg);
        Ok(self.cfg)
    }

    /// Dispatch a completed `(key, value)` pair.
    fn apply(&mut self) -> Result<()> {
        match self.key.as_slice() {
            b"APP_CAPTION" => {
                self.cfg.caption = String::from_utf8_lossy(&self.value).into_owned();
            }
            b"TCON_INIT_FLOW" => {
                let flow = parse_int(&self.value);
                match TconKind::from_flow(flow) {
                    Some(kind) => self.cfg.kind = kind,
                    None => {
                        log::error!(
                            "Unknown TCON_INIT_FLOW value {}",
                            String::from_utf8_lossy(&self.value)
                        );
                        return Err(self.malformed(self.key_at));
                    }
                }
            }
            b"TCON_ADDR" => {
                // The configured value is the 8-bit read/write address;
                // drop the R/W bit.
                self.cfg.address = (parse_int(&self.value) >> 1) as u8;
            }
            b"EEPROM_SIZE" => self.cfg.size = parse_int(&self.value) as usize,
            b"EEPROM_RD_BUF_SIZE" => self.cfg.read_chunk = parse_int(&self.value) as usize,
            b"EEPROM_WR_BUF_SIZE" => self.cfg.write_chunk = parse_int(&self.value) as usize,
            b"MAJOR_VER_ADDR" => self.cfg.major_version_offset = parse_int(&self.value) as u16,
            b"MINOR_VER_ADDR" => self.cfg.minor_version_offset = parse_int(&self.value) as u16,
            b"VCOM_ADDR" => self.cfg.vcom_offset = parse_int(&self.value) as u16,
            // Unknown keys are accepted and ignored.
            _ => {}
        }
        Ok(())
    }

    /// Failure at the character just consumed: context starts one
    /// character before it.
    fn malformed_at_current(&self) -> Error {
        let failed = self.pos.saturating_sub(1);
        self.malformed(failed.saturating_sub(1))
    }

    /// Failure with context starting at an explicit position.
    fn malformed(&self, start: usize) -> Error {
        let start = start.min(self.input.len());
        let end = (start + CONTEXT_LEN).min(self.input.len());
        Error::ConfigMalformed {
            context: String::from_utf8_lossy(&self.input[start..end]).into_owned(),
        }
    }
}

/// Checked append to a bounded accumulator.
fn push(buf: &mut FieldBuf, c: u8, field: &'static str) -> Result<()> {
    buf.push(c).map_err(|_| Error::FieldTooLong {
        field,
        limit: FIELD_MAX,
    })
}

/// `strtol(value, NULL, 0)` equivalent: an optional sign, then `0x`
/// selects hex, a leading zero octal, otherwise decimal; the longest
/// valid prefix is parsed and anything unparsable yields 0. Negative
/// values wrap into the unsigned domain the way a two's-complement
/// narrowing would, so they never alias a small flow number. Values
/// are narrowed to their destination field's width without range
/// checks.
fn parse_int(value: &[u8]) -> u64 {
    let text = String::from_utf8_lossy(value);
    let mut s = text.trim();
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    let magnitude = u64::from_str_radix(&digits[..end], radix).unwrap_or(0);
    if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static [u8] {
        b"; test panel\n\
          [panel]\n\
          APP_CAPTION=Sharp 13.4 FHD+\n\
          TCON_INIT_FLOW=1\n\
          TCON_ADDR=0xC0\n\
          EEPROM_SIZE=512\n\
          EEPROM_RD_BUF_SIZE=256\n\
          EEPROM_WR_BUF_SIZE=256\n\
          MAJOR_VER_ADDR=0x20\n\
          MINOR_VER_ADDR=0x21\n\
          VCOM_ADDR=0x22\n"
    }

    #[test]
    fn parses_a_complete_file() {
        let cfg = parse(sample()).unwrap();
        assert_eq!(cfg.caption, "Sharp 13.4 FHD+");
        assert_eq!(cfg.kind, TconKind::Nt71394);
        assert_eq!(cfg.address, 0x60);
        assert_eq!(cfg.size, 512);
        assert_eq!(cfg.read_chunk, 256);
        assert_eq!(cfg.write_chunk, 256);
        assert_eq!(cfg.major_version_offset, 0x20);
        assert_eq!(cfg.minor_version_offset, 0x21);
        assert_eq!(cfg.vcom_offset, 0x22);
    }

    #[test]
    fn init_flow_selects_all_four_kinds() {
        for (flow, kind) in [
            (0, TconKind::Nt71897_24c32),
            (1, TconKind::Nt71394),
            (2, TconKind::Nt71897Nb),
            (3, TconKind::Nt71395),
        ] {
            let text = format!("TCON_INIT_FLOW={}\n", flow);
            assert_eq!(parse(text.as_bytes()).unwrap().kind, kind);
        }
    }

    #[test]
    fn out_of_range_init_flow_fails_with_key_context() {
        let err = parse(b"TCON_INIT_FLOW=7\n").unwrap_err();
        match err {
            Error::ConfigMalformed { context } => {
                assert!(context.starts_with("TCON_INIT_FLOW"), "context: {context:?}");
            }
            other => panic!("expected ConfigMalformed, got {other:?}"),
        }
    }

    #[test]
    fn negative_init_flow_is_rejected() {
        let err = parse(b"TCON_INIT_FLOW=-1\n").unwrap_err();
        match err {
            Error::ConfigMalformed { context } => {
                assert!(context.starts_with("TCON_INIT_FLOW"), "context: {context:?}");
            }
            other => panic!("expected ConfigMalformed, got {other:?}"),
        }
    }

    #[test]
    fn signed_values_wrap_like_a_narrowing() {
        assert_eq!(parse(b"MAJOR_VER_ADDR=-1\n").unwrap().major_version_offset, 0xFFFF);
        assert_eq!(parse(b"EEPROM_SIZE=+512\n").unwrap().size, 512);
    }

    #[test]
    fn tcon_addr_drops_the_rw_bit() {
        let cfg = parse(b"TCON_ADDR=0xA0\n").unwrap();
        assert_eq!(cfg.address, 0x50);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = parse(b"FANCY_NEW_KEY=17\nEEPROM_SIZE=512\n").unwrap();
        assert_eq!(cfg.size, 512);
        assert_eq!(cfg, {
            let mut expected = TconConfig::default();
            expected.size = 512;
            expected
        });
    }

    #[test]
    fn decimal_hex_and_octal_values_parse() {
        assert_eq!(parse(b"EEPROM_SIZE=512\n").unwrap().size, 512);
        assert_eq!(parse(b"EEPROM_SIZE=0x200\n").unwrap().size, 512);
        assert_eq!(parse(b"EEPROM_SIZE=01000\n").unwrap().size, 512);
    }

    #[test]
    fn spaces_around_equals_are_padding() {
        let cfg = parse(b"EEPROM_SIZE   =   512\n").unwrap();
        assert_eq!(cfg.size, 512);
    }

    #[test]
    fn carriage_returns_are_dropped() {
        let cfg = parse(b"[panel]\r\nEEPROM_SIZE=512\r\n").unwrap();
        assert_eq!(cfg.size, 512);
    }

    #[test]
    fn section_line_tail_is_discarded() {
        let cfg = parse(b"[panel] trailing junk\nEEPROM_SIZE=2\n").unwrap();
        assert_eq!(cfg.size, 2);
    }

    #[test]
    fn garbage_at_line_start_fails_with_context() {
        let err = parse(b"@oops\n").unwrap_err();
        match err {
            Error::ConfigMalformed { context } => assert_eq!(context, "@oops\n"),
            other => panic!("expected ConfigMalformed, got {other:?}"),
        }
    }

    #[test]
    fn bad_section_character_fails() {
        assert!(matches!(
            parse(b"[pa nel]\n"),
            Err(Error::ConfigMalformed { .. })
        ));
    }

    #[test]
    fn eof_mid_value_is_not_an_error() {
        // Documented gap: a truncated trailing line is silently
        // dropped rather than rejected.
        let cfg = parse(b"EEPROM_SIZE=512").unwrap();
        assert_eq!(cfg.size, 0);
    }

    #[test]
    fn overlong_key_is_rejected() {
        let mut text = vec![b'K'; FIELD_MAX + 1];
        text.extend_from_slice(b"=1\n");
        assert!(matches!(
            parse(&text),
            Err(Error::FieldTooLong { field: "key", .. })
        ));
    }

    #[test]
    fn overlong_value_is_rejected() {
        let mut text = b"APP_CAPTION=".to_vec();
        text.extend(std::iter::repeat(b'x').take(FIELD_MAX + 1));
        text.push(b'\n');
        assert!(matches!(
            parse(&text),
            Err(Error::FieldTooLong { field: "value", .. })
        ));
    }

    #[test]
    fn round_trips_through_serialization() {
        let cfg = parse(sample()).unwrap();
        let reparsed = parse(cfg.to_config_string().as_bytes()).unwrap();
        assert_eq!(cfg, reparsed);
    }

    #[test]
    fn value_width_narrowing_is_silent() {
        // Documented existing behavior: overflowing the destination
        // width truncates rather than failing.
        let cfg = parse(b"MAJOR_VER_ADDR=0x12345\n").unwrap();
        assert_eq!(cfg.major_version_offset, 0x2345);
    }
}
