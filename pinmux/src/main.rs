//! # PinMux CLI
//!
//! Loads a chip definition, applies pin function assignments and exports the
//! resulting pin multiplexing table as CSV.
//!
//! # Usage
//!
//! ```bash
//! # Show what each physical pin can do
//! pinmux pins --chip chips/stm32f103c8.json
//!
//! # Assign functions and write <Chip>_PinMux_<timestamp>.csv into reports/
//! pinmux export --chip chips/stm32f103c8.json -a PA9=USART1_TX -a PA10=USART1_RX --out-dir reports
//!
//! # Print the report instead, verbose logging
//! pinmux -v export --chip chips/stm32f103c8.json -a PA9=USART1_TX --stdout
//! ```

#![deny(warnings)]

use clap::{Parser, Subcommand};
use pinmux_common::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// PinMux - pin multiplexing configurator
#[derive(Parser, Debug)]
#[command(name = "pinmux")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Assign alternate functions to chip pins and export the result as CSV")]
#[command(long_about = None)]
struct Args {
    /// Tool configuration file. Defaults are used when it does not exist.
    #[arg(short, long, global = true, default_value = "pinmux.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List physical pins with their type and supported functions.
    Pins {
        /// Chip definition file (.json or .toml)
        #[arg(long, value_name = "FILE")]
        chip: PathBuf,
    },

    /// Apply pin assignments and export the CSV report.
    Export {
        /// Chip definition file (.json or .toml)
        #[arg(long, value_name = "FILE")]
        chip: PathBuf,

        /// Pin assignment, `PIN=FUNCTION`. `PIN=` resets the pin to default.
        /// Can be given multiple times; later assignments win.
        #[arg(short = 'a', long = "assign", value_name = "PIN=FUNCTION", value_parser = parse_assignment)]
        assignments: Vec<Assignment>,

        /// Report directory, overrides `[export] output_dir`.
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Write the report to stdout instead of a file.
        #[arg(long, conflicts_with = "out_dir")]
        stdout: bool,
    },
}

/// One `PIN=FUNCTION` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Assignment {
    pin: String,
    function: String,
}

fn parse_assignment(arg: &str) -> Result<Assignment, String> {
    let (pin, function) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected PIN=FUNCTION, got {arg:?}"))?;
    let pin = pin.trim();
    if pin.is_empty() {
        return Err(format!("missing pin name in {arg:?}"));
    }
    Ok(Assignment {
        pin: pin.to_string(),
        function: function.trim().to_string(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("pinmux failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = PinMuxConfig::load_or_default(&args.config);
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);
    let config = config?;

    debug!(
        service = %config.shared.service_name,
        "configuration from {}",
        args.config.display()
    );

    match args.command {
        Command::Pins { chip } => {
            let store = load_store(&chip)?;
            print_pins(&store, &mut std::io::stdout().lock())?;
        }
        Command::Export {
            chip,
            assignments,
            out_dir,
            stdout,
        } => {
            let mut store = load_store(&chip)?;
            apply_assignments(&mut store, &assignments);

            let exporter = ReportExporter::new(config.export.delimiter);
            let delivery = if stdout {
                let mut sink = WriterSink::new(std::io::stdout().lock());
                let delivery = export(&store, &exporter, &mut sink)?;
                println!();
                delivery
            } else {
                let dir = out_dir.unwrap_or(config.export.output_dir);
                export(&store, &exporter, &mut DirectorySink::new(dir))?
            };
            if let Delivery::File(path) = delivery {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

/// Load the chip definition into a fresh store.
fn load_store(chip_path: &Path) -> Result<PinMuxStore, ChipError> {
    let mut store = PinMuxStore::new();
    store.load_chip(ChipDefinition::load(chip_path)?);
    Ok(store)
}

/// Apply CLI assignments in order. Rejected ones are logged and skipped.
fn apply_assignments(store: &mut PinMuxStore, assignments: &[Assignment]) -> usize {
    let mut applied = 0;
    for assignment in assignments {
        match store.try_set_pin_function(&assignment.pin, &assignment.function) {
            Ok(()) => applied += 1,
            Err(e) => warn!(
                "skipping {}={}: {e}",
                assignment.pin, assignment.function
            ),
        }
    }
    info!(
        "{applied}/{} assignments applied, {} pins configured",
        assignments.len(),
        store.assignments().len()
    );
    applied
}

fn export<S: ReportSink + ?Sized>(
    store: &PinMuxStore,
    exporter: &ReportExporter,
    sink: &mut S,
) -> Result<Delivery, Box<dyn std::error::Error>> {
    let chip = store.current_chip().ok_or(AssignError::NoChipLoaded)?;
    Ok(exporter.export_to(chip, &store.snapshot(), sink)?)
}

/// One line per physical pin, package order.
fn print_pins(store: &PinMuxStore, out: &mut impl Write) -> std::io::Result<()> {
    if let Some(chip) = store.current_chip() {
        writeln!(
            out,
            "{} ({} physical pins)",
            chip.meta.name,
            store.physical_pins().len()
        )?;
    }
    for pin in store.pin_details() {
        let functions = if pin.functions.is_empty() {
            "-".to_string()
        } else {
            pin.functions.join(", ")
        };
        writeln!(
            out,
            "{:>5}  {:<12} {:<8} {}",
            pin.number, pin.name, pin.pin_type, functions
        )?;
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured.into()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
