//! # Image Loading Tests
//!
//! Raw binaries, hand-built ELF64 images and the built-in program.

use std::io::Write;
use std::path::Path;

use pretty_assertions::assert_eq;
use rvdb_core::common::SimError;
use rvdb_core::config::Config;
use rvdb_core::memory::{Memory, Ram};
use rvdb_core::sim::loader::{self, BUILTIN_IMAGE};
use rvdb_core::{Engine, Rv64};
use tempfile::NamedTempFile;

use crate::common::harness::{ADDI_A0, EBREAK, SharedBuf, init_tracing};

const BASE: u64 = 0x8000_0000;

fn temp_image(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

/// A minimal little-endian RISC-V ELF64 executable with one `PT_LOAD` segment
/// and no section headers.
fn elf_image(entry: u64, vaddr: u64, payload: &[u8]) -> Vec<u8> {
    const EHDR: u64 = 64;
    const PHDR: u64 = 56;
    let mut elf = Vec::new();

    elf.extend_from_slice(b"\x7fELF");
    elf.extend_from_slice(&[2, 1, 1, 0]);
    elf.extend_from_slice(&[0; 8]);
    elf.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    elf.extend_from_slice(&0xf3u16.to_le_bytes()); // EM_RISCV
    elf.extend_from_slice(&1u32.to_le_bytes());
    elf.extend_from_slice(&entry.to_le_bytes());
    elf.extend_from_slice(&EHDR.to_le_bytes()); // e_phoff
    elf.extend_from_slice(&0u64.to_le_bytes()); // e_shoff
    elf.extend_from_slice(&0u32.to_le_bytes());
    elf.extend_from_slice(&(EHDR as u16).to_le_bytes());
    elf.extend_from_slice(&(PHDR as u16).to_le_bytes());
    elf.extend_from_slice(&1u16.to_le_bytes()); // e_phnum
    elf.extend_from_slice(&64u16.to_le_bytes());
    elf.extend_from_slice(&0u16.to_le_bytes());
    elf.extend_from_slice(&0u16.to_le_bytes());
    assert_eq!(elf.len() as u64, EHDR);

    let len = payload.len() as u64;
    elf.extend_from_slice(&1u32.to_le_bytes()); // PT_LOAD
    elf.extend_from_slice(&5u32.to_le_bytes()); // R+X
    elf.extend_from_slice(&(EHDR + PHDR).to_le_bytes());
    elf.extend_from_slice(&vaddr.to_le_bytes());
    elf.extend_from_slice(&vaddr.to_le_bytes());
    elf.extend_from_slice(&len.to_le_bytes());
    elf.extend_from_slice(&len.to_le_bytes());
    elf.extend_from_slice(&4u64.to_le_bytes());
    assert_eq!(elf.len() as u64, EHDR + PHDR);

    elf.extend_from_slice(payload);
    elf
}

fn words(program: &[u32]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn raw_image_lands_at_base() {
    let mut ram = Ram::new(BASE, 4096);
    let image = loader::load_bytes(&[0x13, 0x00, 0x00, 0x00], &mut ram, BASE).unwrap();
    assert_eq!(image.size, 4);
    assert_eq!(image.entry, None);
    assert!(image.symbols.is_empty());
    assert_eq!(ram.read(BASE, 4).unwrap(), 0x13);
}

#[test]
fn raw_image_too_large_is_rejected() {
    let mut ram = Ram::new(BASE, 4);
    let err = loader::load_bytes(&[0; 8], &mut ram, BASE).unwrap_err();
    assert!(matches!(err, SimError::Memory(_)));
}

#[test]
fn elf_segments_and_entry() {
    let payload = words(&[ADDI_A0, EBREAK]);
    let elf = elf_image(BASE + 0x100, BASE + 0x100, &payload);

    let mut ram = Ram::new(BASE, 4096);
    let image = loader::load_bytes(&elf, &mut ram, BASE).unwrap();
    assert_eq!(image.entry, Some(BASE + 0x100));
    assert_eq!(image.size, 8);
    assert_eq!(ram.read(BASE + 0x100, 4).unwrap(), u64::from(ADDI_A0));
    assert_eq!(ram.read(BASE + 0x104, 4).unwrap(), u64::from(EBREAK));
    assert_eq!(ram.read(BASE, 4).unwrap(), 0);
}

#[test]
fn truncated_elf_is_rejected() {
    let elf = elf_image(BASE, BASE, &words(&[EBREAK]));
    let mut ram = Ram::new(BASE, 4096);
    let err = loader::load_bytes(&elf[..40], &mut ram, BASE).unwrap_err();
    assert!(matches!(err, SimError::Elf(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let mut ram = Ram::new(BASE, 4096);
    let err = loader::load_file(Path::new("/nonexistent/rvdb/image.bin"), &mut ram, BASE)
        .unwrap_err();
    assert!(matches!(err, SimError::Io { .. }));
}

#[test]
fn builtin_program_layout() {
    let mut ram = Ram::new(BASE, 4096);
    let image = loader::load_builtin(&mut ram, BASE).unwrap();
    assert_eq!(image.size, BUILTIN_IMAGE.len() * 4);
    assert_eq!(ram.read(BASE + 16, 4).unwrap(), 0xdead_beef);
}

#[test]
fn boot_starts_at_elf_entry() {
    init_tracing();
    let file = temp_image(&elf_image(BASE + 0x40, BASE + 0x40, &words(&[ADDI_A0, EBREAK])));
    let out = SharedBuf::default();
    let mut engine = Engine::boot(Rv64::new(), &Config::default(), Some(file.path()))
        .unwrap()
        .with_output(out.clone());

    assert_eq!(engine.machine().cpu.pc, BASE + 0x40);
    let _ = engine.run(u64::MAX);
    assert_eq!(engine.state().halt_ret, 1);
    assert!(out.contents().contains("HIT BAD TRAP"));
}

#[test]
fn boot_starts_raw_images_at_start_pc() {
    init_tracing();
    let file = temp_image(&words(&[ADDI_A0, ADDI_A0, EBREAK]));
    let mut config = Config::default();
    config.general.start_pc = Some(BASE + 4);
    let mut engine = Engine::boot(Rv64::new(), &config, Some(file.path()))
        .unwrap()
        .with_output(SharedBuf::default());

    let _ = engine.run(u64::MAX);
    assert_eq!(engine.stats().instructions, 2);
    assert_eq!(engine.evaluate("$a0"), Ok(1));
}

#[test]
fn boot_follows_a_moved_ram_base() {
    init_tracing();
    let config = Config::from_json(r#"{ "general": { "ram_base": 4096, "ram_size": 65536 } }"#)
        .unwrap();
    let out = SharedBuf::default();
    let mut engine = Engine::boot(Rv64::new(), &config, None)
        .unwrap()
        .with_output(out.clone());

    assert_eq!(engine.machine().cpu.pc, 0x1000);
    let _ = engine.run(u64::MAX);
    assert!(engine.state().is_good_exit());
    assert!(out.contents().contains("HIT GOOD TRAP"));
}
