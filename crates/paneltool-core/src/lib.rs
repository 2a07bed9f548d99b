//! paneltool-core - Core library for panel TCON identification and
//! firmware access
//!
//! This crate provides the pieces the `paneltool` CLI is built from:
//!
//! - [`bus`] - the combined write-then-read bus transaction abstraction
//! - [`edid`] - panel identity verification from the EDID block
//! - [`config`] - the per-panel configuration file format and parser
//! - [`tcon`] - bulk firmware read-back and version identification
//!
//! The crate is transport-agnostic: anything implementing
//! [`bus::PanelBus`] can drive it, whether a real i2c-dev node or an
//! in-memory emulator.
//!
//! # Example
//!
//! ```ignore
//! use paneltool_core::{bus::PanelBus, config, edid, tcon};
//! use std::path::Path;
//!
//! fn backup<M: PanelBus>(bus: &mut M) -> paneltool_core::Result<Vec<u8>> {
//!     let record = edid::verify(bus)?;
//!     let path = format!("firmware/{}/model.ini", record.panel_code);
//!     let cfg = config::load(Path::new(&path))?;
//!     tcon::read_all(bus, &cfg)
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod config;
pub mod edid;
pub mod error;
pub mod tcon;

pub use error::{Error, Result};
