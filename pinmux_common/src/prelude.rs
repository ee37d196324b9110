//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use pinmux_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use pinmux_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, ExportConfig, PinMuxConfig, SharedConfig};

// ─── Chip Definitions ───────────────────────────────────────────────
pub use crate::chip::{ChipDefinition, ChipError, PhysicalPin, PinCapability, UNKNOWN_PIN_TYPE};

// ─── Store ──────────────────────────────────────────────────────────
pub use crate::store::{AssignError, PinAssignments, PinDetail, PinMuxStore};

// ─── Export ─────────────────────────────────────────────────────────
pub use crate::export::{Report, ReportExporter};
pub use crate::sink::{Delivery, DeliveryError, DirectorySink, ReportSink, WriterSink};
