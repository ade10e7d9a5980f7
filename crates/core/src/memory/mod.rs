//! Physical memory.
//!
//! The simulator sees a single flat RAM window. This module provides:
//! 1. **Access Trait:** `Memory`, the read/write primitive used by handlers,
//!    the decoder and the expression evaluator.
//! 2. **RAM Device:** `Ram`, a little-endian window over a `DramBuffer`.

/// Lazily committed RAM backing buffer.
pub mod buffer;

use crate::common::MemError;

pub use buffer::DramBuffer;

/// Physical memory access primitive.
///
/// Values are little-endian and zero-extended to 64 bits. Valid widths are
/// 1, 2, 4 and 8 bytes.
pub trait Memory {
    /// Reads `len` bytes at `addr`.
    ///
    /// # Errors
    ///
    /// Returns `MemError` if the access leaves physical memory or the width is invalid.
    fn read(&self, addr: u64, len: usize) -> Result<u64, MemError>;

    /// Writes the low `len` bytes of `val` at `addr`.
    ///
    /// # Errors
    ///
    /// Returns `MemError` if the access leaves physical memory or the width is invalid.
    fn write(&mut self, addr: u64, len: usize, val: u64) -> Result<(), MemError>;

    /// Copies a byte image into memory at `addr`.
    ///
    /// # Errors
    ///
    /// Returns `MemError::OutOfBounds` if the image does not fit.
    fn load(&mut self, addr: u64, bytes: &[u8]) -> Result<(), MemError>;
}

/// Flat RAM mapped at `base`.
#[derive(Debug)]
pub struct Ram {
    base: u64,
    buf: DramBuffer,
}

impl Ram {
    /// Creates a zeroed RAM of `size` bytes starting at physical address `base`.
    pub fn new(base: u64, size: usize) -> Self {
        Self {
            base,
            buf: DramBuffer::new(size),
        }
    }

    /// First valid physical address.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// One past the last valid physical address.
    pub fn end(&self) -> u64 {
        self.base + self.buf.len() as u64
    }

    fn range(&self, addr: u64, len: usize) -> Result<std::ops::Range<usize>, MemError> {
        let out_of_bounds = MemError::OutOfBounds {
            addr,
            len,
            base: self.base,
            end: self.end(),
        };
        let offset = addr.checked_sub(self.base).ok_or_else(|| out_of_bounds.clone())?;
        let offset = usize::try_from(offset).map_err(|_| out_of_bounds.clone())?;
        match offset.checked_add(len) {
            Some(stop) if stop <= self.buf.len() => Ok(offset..stop),
            _ => Err(out_of_bounds),
        }
    }
}

fn check_width(len: usize) -> Result<(), MemError> {
    match len {
        1 | 2 | 4 | 8 => Ok(()),
        _ => Err(MemError::BadWidth(len)),
    }
}

impl Memory for Ram {
    fn read(&self, addr: u64, len: usize) -> Result<u64, MemError> {
        check_width(len)?;
        let range = self.range(addr, len)?;
        let mut bytes = [0u8; 8];
        bytes[..len].copy_from_slice(&self.buf.as_slice()[range]);
        Ok(u64::from_le_bytes(bytes))
    }

    fn write(&mut self, addr: u64, len: usize, val: u64) -> Result<(), MemError> {
        check_width(len)?;
        let range = self.range(addr, len)?;
        self.buf.as_mut_slice()[range].copy_from_slice(&val.to_le_bytes()[..len]);
        Ok(())
    }

    fn load(&mut self, addr: u64, bytes: &[u8]) -> Result<(), MemError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let range = self.range(addr, bytes.len())?;
        self.buf.as_mut_slice()[range].copy_from_slice(bytes);
        Ok(())
    }
}
