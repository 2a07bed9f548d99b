//! Linux i2c-dev device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the
//! `PanelBus` trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use paneltool_core::bus::{decode_offset, PanelBus};
use paneltool_core::error::{Error as CoreError, Result as CoreResult};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Adapter functionality bit for plain I2C transactions
const I2C_FUNC_I2C: libc::c_ulong = 0x0000_0001;

/// Message flag: this segment is a read
const I2C_M_RD: u16 = 0x0001;

/// Linux i2c-dev ioctl constants
mod ioctl {
    use nix::ioctl_read_bad;
    use nix::ioctl_write_ptr_bad;

    // Old-style ioctl numbers from <linux/i2c-dev.h>; these predate
    // the _IO() encoding scheme and are used verbatim.
    const I2C_FUNCS: libc::c_ulong = 0x0705;
    const I2C_RDWR: libc::c_ulong = 0x0707;

    ioctl_read_bad!(i2c_funcs, I2C_FUNCS, libc::c_ulong);
    ioctl_write_ptr_bad!(i2c_rdwr, I2C_RDWR, super::I2cRdwrIoctlData);
}

/// Mirror of the kernel's `struct i2c_msg`
#[repr(C)]
struct I2cMsg {
    addr: u16,
    flags: u16,
    len: u16,
    buf: *mut u8,
}

/// Mirror of the kernel's `struct i2c_rdwr_ioctl_data`
#[repr(C)]
struct I2cRdwrIoctlData {
    msgs: *mut I2cMsg,
    nmsgs: u32,
}

/// Linux I2C bus using the i2c-dev interface
///
/// This struct implements the `PanelBus` trait for Linux systems using
/// the `/dev/i2c-N` device interface.
pub struct LinuxI2c {
    /// File handle for the i2c-dev device
    file: File,
    /// Device path, kept for diagnostics
    path: String,
}

impl LinuxI2c {
    /// Open an i2c-dev device and check adapter capability
    pub fn open(path: &str) -> Result<Self> {
        log::debug!("linux_i2c: Opening device {}", path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    LinuxI2cError::PermissionDenied {
                        path: path.to_string(),
                    }
                } else {
                    LinuxI2cError::OpenFailed {
                        path: path.to_string(),
                        source: e,
                    }
                }
            })?;

        let fd = file.as_raw_fd();

        // The combined write-then-read transaction needs a true I2C
        // adapter; SMBus-only adapters cannot issue it.
        let mut funcs: libc::c_ulong = 0;
        unsafe {
            ioctl::i2c_funcs(fd, &mut funcs).map_err(|e| {
                LinuxI2cError::FuncsQueryFailed(std::io::Error::from_raw_os_error(e as i32))
            })?;
        }
        if funcs & I2C_FUNC_I2C == 0 {
            return Err(LinuxI2cError::NotI2cCapable {
                path: path.to_string(),
            });
        }

        log::info!("linux_i2c: Opened {}", path);

        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    /// Submit one combined transaction via the I2C_RDWR ioctl
    fn i2c_transfer(
        &mut self,
        addr: u8,
        offset: &[u8],
        segments: &mut [&mut [u8]],
    ) -> Result<()> {
        let fd = self.file.as_raw_fd();

        let mut msgs = Vec::with_capacity(1 + segments.len());
        msgs.push(I2cMsg {
            addr: addr as u16,
            flags: 0,
            len: offset.len() as u16,
            buf: offset.as_ptr() as *mut u8,
        });
        for segment in segments.iter_mut() {
            msgs.push(I2cMsg {
                addr: addr as u16,
                flags: I2C_M_RD,
                len: segment.len() as u16,
                buf: segment.as_mut_ptr(),
            });
        }

        let rdwr = I2cRdwrIoctlData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };

        let ret = unsafe { ioctl::i2c_rdwr(fd, &rdwr) };
        if let Err(e) = ret {
            return Err(LinuxI2cError::TransferFailed(
                std::io::Error::from_raw_os_error(e as i32),
            ));
        }

        Ok(())
    }
}

impl PanelBus for LinuxI2c {
    fn write_read(&mut self, addr: u8, offset: &[u8], segments: &mut [&mut [u8]]) -> CoreResult<()> {
        let total: usize = segments.iter().map(|s| s.len()).sum();

        self.i2c_transfer(addr, offset, segments).map_err(|e| {
            log::debug!("linux_i2c: transaction on {} failed: {}", self.path, e);
            CoreError::TransactionFailed {
                addr,
                offset: decode_offset(offset),
                len: total,
            }
        })
    }
}
