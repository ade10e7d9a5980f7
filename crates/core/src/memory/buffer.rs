//! RAM backing buffer.
//!
//! On Unix the buffer is an anonymous `mmap` mapping, so pages are only
//! committed by the host when the guest touches them. Elsewhere it is a
//! zeroed heap allocation.

use std::slice;

/// Owned, zero-initialised byte buffer backing the guest RAM.
#[derive(Debug)]
pub struct DramBuffer {
    ptr: *mut u8,
    size: usize,
    is_mmap: bool,
}

impl DramBuffer {
    /// Allocates a zeroed buffer of `size` bytes.
    ///
    /// Falls back to a heap allocation when the mapping cannot be created.
    pub fn new(size: usize) -> Self {
        #[cfg(unix)]
        {
            if size > 0 {
                // SAFETY: anonymous private mapping with no fixed address; the
                // result is checked against MAP_FAILED before use.
                let ptr = unsafe {
                    libc::mmap(
                        std::ptr::null_mut(),
                        size,
                        libc::PROT_READ | libc::PROT_WRITE,
                        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                        -1,
                        0,
                    )
                };
                if ptr != libc::MAP_FAILED {
                    return Self {
                        ptr: ptr.cast::<u8>(),
                        size,
                        is_mmap: true,
                    };
                }
                tracing::warn!(size, "mmap failed, falling back to a heap buffer");
            }
        }

        let boxed = vec![0u8; size].into_boxed_slice();
        Self {
            ptr: Box::into_raw(boxed).cast::<u8>(),
            size,
            is_mmap: false,
        }
    }

    /// Returns the size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Borrows the whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `size` initialised bytes for the lifetime of `self`.
        unsafe { slice::from_raw_parts(self.ptr, self.size) }
    }

    /// Mutably borrows the whole buffer.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr, self.size) }
    }
}

impl Drop for DramBuffer {
    fn drop(&mut self) {
        if self.is_mmap {
            #[cfg(unix)]
            {
                // SAFETY: the mapping was created by `mmap` with exactly `size` bytes.
                let _ = unsafe { libc::munmap(self.ptr.cast(), self.size) };
            }
            return;
        }
        // SAFETY: the pointer came from `Box::into_raw` on a boxed slice of `size` bytes.
        drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.ptr, self.size)) });
    }
}
