//! Guest image loading.
//!
//! This module places a program in physical memory. It handles:
//! 1. **Raw binaries:** Copied byte for byte to the RAM base.
//! 2. **ELF64 images:** `PT_LOAD` segments copied to their addresses; the entry
//!    point and function symbols are returned for the engine and the call tracer.
//! 3. **Built-in program:** A five-word program used when no image is given.

use std::fs;
use std::path::Path;

use object::read::elf::ElfFile64;
use object::{Endianness, Object, ObjectSegment, ObjectSymbol, SymbolKind};

use crate::common::SimError;
use crate::memory::Memory;
use crate::sim::symbols::{Symbol, SymbolTable};

/// ELF identification magic.
const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// The program loaded when no image is given.
///
/// Stores zero to `base + 16`, loads it back into `a0` and halts with
/// `ebreak`, which reports a good trap. The last word is the byte it overwrites.
pub const BUILTIN_IMAGE: [u32; 5] = [
    0x0000_0297, // auipc t0, 0
    0x0002_8823, // sb    zero, 16(t0)
    0x0102_c503, // lbu   a0, 16(t0)
    0x0010_0073, // ebreak
    0xdead_beef, // data
];

/// What a loaded image contributes besides memory contents.
#[derive(Clone, Debug, Default)]
pub struct LoadedImage {
    /// Entry point, for images that carry one.
    pub entry: Option<u64>,
    /// Bytes copied into memory.
    pub size: usize,
    /// Function symbols, empty for raw images.
    pub symbols: SymbolTable,
}

/// Loads the built-in program at `base`.
///
/// # Errors
///
/// Returns `SimError::Memory` if the program does not fit at `base`.
pub fn load_builtin(mem: &mut dyn Memory, base: u64) -> Result<LoadedImage, SimError> {
    let bytes: Vec<u8> = BUILTIN_IMAGE.iter().flat_map(|w| w.to_le_bytes()).collect();
    mem.load(base, &bytes)?;
    Ok(LoadedImage {
        entry: None,
        size: bytes.len(),
        symbols: SymbolTable::default(),
    })
}

/// Reads an image file and loads it.
///
/// # Errors
///
/// Returns `SimError::Io` if the file cannot be read, otherwise see `load_bytes`.
pub fn load_file(path: &Path, mem: &mut dyn Memory, base: u64) -> Result<LoadedImage, SimError> {
    let bytes = fs::read(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let image = load_bytes(&bytes, mem, base)?;
    tracing::info!(path = %path.display(), size = image.size, "image loaded");
    Ok(image)
}

/// Loads an in-memory image, ELF or raw.
///
/// # Arguments
///
/// * `bytes` - Image contents; ELF is recognised by its magic.
/// * `mem` - Destination memory.
/// * `base` - Load address of raw images.
///
/// # Errors
///
/// Returns `SimError::Elf` for malformed ELF files and `SimError::Memory` if
/// any part of the image falls outside physical memory.
pub fn load_bytes(bytes: &[u8], mem: &mut dyn Memory, base: u64) -> Result<LoadedImage, SimError> {
    if bytes.starts_with(ELF_MAGIC) {
        return load_elf(bytes, mem);
    }
    mem.load(base, bytes)?;
    Ok(LoadedImage {
        entry: None,
        size: bytes.len(),
        symbols: SymbolTable::default(),
    })
}

fn load_elf(bytes: &[u8], mem: &mut dyn Memory) -> Result<LoadedImage, SimError> {
    let elf =
        ElfFile64::<Endianness>::parse(bytes).map_err(|e| SimError::Elf(e.to_string()))?;

    let mut size = 0;
    for segment in elf.segments() {
        let data = segment.data().map_err(|e| SimError::Elf(e.to_string()))?;
        if data.is_empty() {
            continue;
        }
        tracing::debug!(addr = segment.address(), len = data.len(), "loading segment");
        mem.load(segment.address(), data)?;
        size += data.len();
    }

    let symbols = elf
        .symbols()
        .filter(|sym| sym.kind() == SymbolKind::Text && sym.size() > 0)
        .filter_map(|sym| {
            let name = sym.name().ok()?;
            Some(Symbol::new(name, sym.address(), sym.size()))
        })
        .collect();

    Ok(LoadedImage {
        entry: Some(elf.entry()),
        size,
        symbols: SymbolTable::new(symbols),
    })
}
