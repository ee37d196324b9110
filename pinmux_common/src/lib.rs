//! PinMux Common Library
//!
//! Chip definitions, the pin multiplexing configuration store and CSV report
//! export shared by all PinMux front ends.
//!
//! # Module Structure
//!
//! - [`chip`] - Chip definition types and JSON/TOML loading
//! - [`store`] - Pin → function assignment state with validation
//! - [`export`] - Delimited report rendering and file naming
//! - [`sink`] - Report delivery (directory, writer)
//! - [`config`] - Tool configuration loading
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust,no_run
//! use pinmux_common::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = PinMuxStore::new();
//! store.load_chip(ChipDefinition::load(Path::new("stm32f103c8.json"))?);
//! store.set_pin_function("PA9", "USART1_TX");
//!
//! let chip = store.current_chip().expect("loaded above");
//! let mut sink = DirectorySink::new("reports");
//! ReportExporter::default().export_to(chip, &store.snapshot(), &mut sink)?;
//! # Ok(())
//! # }
//! ```

pub mod chip;
pub mod config;
pub mod export;
pub mod prelude;
pub mod sink;
pub mod store;
