//! paneltool-linux-i2c - Linux i2c-dev support
//!
//! This crate provides bus access through the Linux `/dev/i2c-N`
//! character devices, using the `I2C_RDWR` ioctl so that the offset
//! write and the data reads of one transaction stay on the bus as a
//! single combined message (repeated start, no stop in between).
//!
//! # System Requirements
//!
//! - Linux kernel with i2c-dev support enabled (`CONFIG_I2C_CHARDEV`)
//! - An adapter reporting `I2C_FUNC_I2C` (plain I2C, not just SMBus)
//! - Read/write access to `/dev/i2c-N` (usually root or the `i2c`
//!   group)

pub mod device;
pub mod error;

// Re-exports
pub use device::LinuxI2c;
pub use error::{LinuxI2cError, Result};
