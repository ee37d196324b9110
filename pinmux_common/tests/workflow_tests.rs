//! End-to-end tests: chip file on disk → store → export → sink.

use pinmux_common::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CHIP_JSON: &str = r#"{
    "meta": { "name": "DemoMCU", "description": "48-pin demo part" },
    "pins": {
        "PA1": { "type": "gpio", "functions": ["GPIO", "UART_TX"] },
        "PB2": { "type": "gpio", "functions": ["GPIO", "SPI_CLK", "A,B"] },
        "NRST": { "type": "reset", "functions": [] },
        "VDD": { "type": "power", "functions": [] }
    },
    "package": {
        "name": "QFN48",
        "pins": [
            { "name": "PA1", "number": "10" },
            { "name": "PB2", "number": "2" },
            { "name": "NRST", "number": "7" },
            { "name": "VDD", "number": 1 },
            { "name": "EPAD", "number": "EP" }
        ]
    }
}"#;

/// Write the demo chip definition into `dir` and return its path.
fn write_chip(dir: &Path, file_name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, content).unwrap();
    path
}

fn loaded_store(dir: &Path) -> PinMuxStore {
    let chip = ChipDefinition::load(&write_chip(dir, "demo.json", CHIP_JSON)).unwrap();
    let mut store = PinMuxStore::new();
    store.load_chip(chip);
    store
}

#[test]
fn test_load_assign_export_to_directory() {
    let tmp = TempDir::new().unwrap();
    let mut store = loaded_store(tmp.path());

    store.set_pin_function("PA1", "UART_TX");
    store.set_pin_function("PB2", "A,B");
    store.set_pin_function("PB2", "SPI_MOSI"); // unsupported, ignored

    let out_dir = tmp.path().join("out");
    let mut sink = DirectorySink::new(&out_dir);
    let chip = store.current_chip().unwrap();
    let delivery = ReportExporter::default()
        .export_to(chip, &store.snapshot(), &mut sink)
        .unwrap();

    let Delivery::File(path) = delivery else {
        panic!("directory sink must report a file");
    };
    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("DemoMCU_PinMux_"));
    assert!(file_name.ends_with(".csv"));
    // DemoMCU_PinMux_ + 19 timestamp chars + .csv
    assert_eq!(file_name.len(), "DemoMCU_PinMux_".len() + 19 + ".csv".len());

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "Pin Name,Physical Number,Type,Configured Function\n\
         VDD,1,power,\n\
         PB2,2,gpio,\"A,B\"\n\
         NRST,7,reset,\n\
         PA1,10,gpio,UART_TX\n\
         EPAD,EP,unknown,"
    );
}

#[test]
fn test_chip_swap_drops_assignments() {
    let tmp = TempDir::new().unwrap();
    let mut store = loaded_store(tmp.path());
    store.set_pin_function("PA1", "GPIO");

    let toml_path = write_chip(
        tmp.path(),
        "other.toml",
        r#"
[meta]
name = "OtherMCU"

[pins.PA1]
type = "gpio"
functions = ["GPIO"]

[[package.pins]]
name = "PA1"
number = "1"
"#,
    );
    store.load_chip(ChipDefinition::load(&toml_path).unwrap());

    assert!(store.assignments().is_empty());
    assert_eq!(store.pin_configuration("PA1"), None);
    assert_eq!(store.physical_pins().len(), 1);
    assert_eq!(store.pin_type("NRST"), "unknown");
}

#[test]
fn test_assignment_only_when_supported() {
    let tmp = TempDir::new().unwrap();
    let mut store = loaded_store(tmp.path());

    for pin in ["PA1", "PB2", "NRST", "VDD", "EPAD", "MISSING"] {
        for function in ["GPIO", "UART_TX", "SPI_CLK", "A,B", "BOGUS"] {
            let before = store.pin_configuration(pin).map(str::to_string);
            let supported = store.pin_functions(pin).iter().any(|f| f == function);
            store.set_pin_function(pin, function);
            let after = store.pin_configuration(pin).map(str::to_string);
            if supported {
                assert_eq!(after.as_deref(), Some(function));
            } else {
                assert_eq!(after, before, "{pin}/{function} must not change state");
            }
        }
    }
}

#[test]
fn test_export_leaves_store_and_chip_untouched() {
    let tmp = TempDir::new().unwrap();
    let mut store = loaded_store(tmp.path());
    store.set_pin_function("PA1", "UART_TX");

    let physical_before = store.physical_pins().to_vec();
    let chip = store.current_chip().unwrap().clone();
    let mut sink = WriterSink::new(Vec::new());
    ReportExporter::default()
        .export_to(&chip, &store.snapshot(), &mut sink)
        .unwrap();

    assert_eq!(store.physical_pins(), physical_before.as_slice());
    assert_eq!(store.pin_configuration("PA1"), Some("UART_TX"));
}

#[test]
fn test_repeated_exports_identical_content() {
    let tmp = TempDir::new().unwrap();
    let mut store = loaded_store(tmp.path());
    store.set_pin_function("PB2", "SPI_CLK");

    let chip = store.current_chip().unwrap();
    let exporter = ReportExporter::default();
    let a = exporter.export(chip, &store.snapshot());
    let b = exporter.export(chip, &store.snapshot());
    assert_eq!(a.content, b.content);
}

#[test]
fn test_loading_bad_definition_fails() {
    let tmp = TempDir::new().unwrap();
    let path = write_chip(tmp.path(), "broken.json", "{ not json");
    assert!(matches!(
        ChipDefinition::load(&path),
        Err(ChipError::Parse(_))
    ));
}
