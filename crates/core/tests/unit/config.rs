//! # Configuration Tests
//!
//! Defaults and JSON loading, including partial documents and files on disk.

use std::fs;
use std::io::Write;

use pretty_assertions::assert_eq;
use rvdb_core::common::SimError;
use rvdb_core::config::{Config, GeneralConfig, TraceConfig};
use tempfile::NamedTempFile;

#[test]
fn general_defaults() {
    let general = GeneralConfig::default();
    assert_eq!(general.ram_base, 0x8000_0000);
    assert_eq!(general.ram_size, 128 * 1024 * 1024);
    assert_eq!(general.start_pc, None);
    assert_eq!(general.entry_pc(), 0x8000_0000);
    assert!(!general.batch);
}

#[test]
fn trace_defaults() {
    let trace = TraceConfig::default();
    assert!(trace.itrace);
    assert!(trace.iringbuf);
    assert_eq!(trace.ringbuf_size, 16);
    assert_eq!(trace.print_step_limit, 10);
    assert!(!trace.ftrace);
    assert!(trace.watchpoints);
    assert!(!trace.difftest);
}

#[test]
fn empty_document_is_the_default() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.general.ram_base, GeneralConfig::default().ram_base);
    assert_eq!(config.trace.ringbuf_size, TraceConfig::default().ringbuf_size);
}

#[test]
fn partial_document_keeps_other_defaults() {
    let config = Config::from_json(
        r#"{
            "general": { "ram_size": 4096, "batch": true },
            "trace": { "ftrace": true, "ringbuf_size": 4 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.general.ram_size, 4096);
    assert!(config.general.batch);
    assert_eq!(config.general.ram_base, 0x8000_0000);
    assert!(config.trace.ftrace);
    assert_eq!(config.trace.ringbuf_size, 4);
    assert!(config.trace.itrace);
}

#[test]
fn start_pc_follows_a_moved_ram_base() {
    let config = Config::from_json(r#"{ "general": { "ram_base": 4096, "ram_size": 65536 } }"#)
        .unwrap();
    assert_eq!(config.general.ram_base, 0x1000);
    assert_eq!(config.general.start_pc, None);
    assert_eq!(config.general.entry_pc(), 0x1000);
}

#[test]
fn malformed_document_is_rejected() {
    let err = Config::from_json(r#"{ "general": { "ram_size": "big" } }"#).unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
    assert!(err.to_string().starts_with("invalid configuration:"));
}

#[test]
fn loads_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{ "general": { "start_pc": 2147483660 } }"#)
        .unwrap();
    file.flush().unwrap();

    let text = fs::read_to_string(file.path()).unwrap();
    let config = Config::from_json(&text).unwrap();
    assert_eq!(config.general.start_pc, Some(0x8000_000c));
    assert_eq!(config.general.entry_pc(), 0x8000_000c);
}
