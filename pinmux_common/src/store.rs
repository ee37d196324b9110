//! Pin multiplexing configuration store.
//!
//! [`PinMuxStore`] owns the loaded [`ChipDefinition`] and the pin → function
//! assignment map. The map only ever holds validated, non-empty selections;
//! a pin without an entry is at its default.
//!
//! Rejected writes leave the store untouched. [`PinMuxStore::set_pin_function`]
//! swallows the rejection, [`PinMuxStore::try_set_pin_function`] reports it.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::chip::{ChipDefinition, PhysicalPin, UNKNOWN_PIN_TYPE};

/// Pin name → selected function.
pub type PinAssignments = BTreeMap<String, String>;

// ─── Error Types ────────────────────────────────────────────────────

/// Reason a pin assignment was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    /// No chip definition is loaded.
    #[error("no chip definition loaded")]
    NoChipLoaded,

    /// Pin name is absent from the chip's capability table.
    #[error("pin '{pin}' is not declared by the chip")]
    PinNotFound { pin: String },

    /// Function is not in the pin's capability list.
    #[error("pin '{pin}' does not support function '{function}'")]
    FunctionNotSupported { pin: String, function: String },
}

// ─── PinDetail ──────────────────────────────────────────────────────

/// Presentable view of one physical pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinDetail {
    pub name: String,
    /// Package position label.
    pub number: String,
    /// Declared type, or `"unknown"`.
    pub pin_type: String,
    /// Supported functions in definition order.
    pub functions: Vec<String>,
    /// Current selection, `None` when at default.
    pub configured: Option<String>,
}

// ─── PinMuxStore ────────────────────────────────────────────────────

/// Authoritative pin multiplexing state for one chip.
#[derive(Debug, Clone, Default)]
pub struct PinMuxStore {
    current_chip: Option<ChipDefinition>,
    assignments: PinAssignments,
}

impl PinMuxStore {
    /// Create an empty store with no chip loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded chip and drop every assignment.
    ///
    /// Assignments are cleared even when `chip` equals the current one.
    pub fn load_chip(&mut self, chip: ChipDefinition) {
        debug!(
            chip = %chip.meta.name,
            dropped = self.assignments.len(),
            "chip loaded, assignments reset"
        );
        self.current_chip = Some(chip);
        self.assignments.clear();
    }

    /// Whether a chip definition is loaded.
    pub fn is_loaded(&self) -> bool {
        self.current_chip.is_some()
    }

    pub fn current_chip(&self) -> Option<&ChipDefinition> {
        self.current_chip.as_ref()
    }

    /// Assign `function` to `pin_name`, or clear the pin when `function`
    /// is empty.
    ///
    /// Unsupported requests are ignored; the store is left as it was.
    pub fn set_pin_function(&mut self, pin_name: &str, function: &str) {
        if let Err(e) = self.try_set_pin_function(pin_name, function) {
            debug!(pin = pin_name, function, "pin assignment ignored: {e}");
        }
    }

    /// Same state transition as [`Self::set_pin_function`], with the
    /// rejection reason returned.
    ///
    /// Clearing a pin that has no entry (including an undeclared pin)
    /// succeeds as long as a chip is loaded.
    pub fn try_set_pin_function(&mut self, pin_name: &str, function: &str) -> Result<(), AssignError> {
        let Some(chip) = &self.current_chip else {
            return Err(AssignError::NoChipLoaded);
        };

        if function.is_empty() {
            if self.assignments.remove(pin_name).is_some() {
                debug!(pin = pin_name, "pin reset to default");
            }
            return Ok(());
        }

        let Some(capability) = chip.capability(pin_name) else {
            return Err(AssignError::PinNotFound {
                pin: pin_name.to_string(),
            });
        };
        if !capability.functions.iter().any(|f| f == function) {
            return Err(AssignError::FunctionNotSupported {
                pin: pin_name.to_string(),
                function: function.to_string(),
            });
        }

        debug!(pin = pin_name, function, "pin assigned");
        self.assignments
            .insert(pin_name.to_string(), function.to_string());
        Ok(())
    }

    /// Current selection for `pin_name`; `None` means default.
    pub fn pin_configuration(&self, pin_name: &str) -> Option<&str> {
        self.assignments.get(pin_name).map(String::as_str)
    }

    /// Functions `pin_name` supports, in definition order.
    ///
    /// Empty when no chip is loaded or the pin is undeclared.
    pub fn pin_functions(&self, pin_name: &str) -> &[String] {
        self.current_chip
            .as_ref()
            .and_then(|chip| chip.capability(pin_name))
            .map(|cap| cap.functions.as_slice())
            .unwrap_or(&[])
    }

    /// Declared type of `pin_name`, or `"unknown"`.
    pub fn pin_type(&self, pin_name: &str) -> &str {
        self.current_chip
            .as_ref()
            .map(|chip| chip.pin_type(pin_name))
            .unwrap_or(UNKNOWN_PIN_TYPE)
    }

    /// The chip's package pins verbatim; empty when no chip is loaded.
    pub fn physical_pins(&self) -> &[PhysicalPin] {
        self.current_chip
            .as_ref()
            .map(|chip| chip.package.pins.as_slice())
            .unwrap_or(&[])
    }

    /// Borrow the live assignment map.
    pub fn assignments(&self) -> &PinAssignments {
        &self.assignments
    }

    /// Owned copy of the assignment map, for export.
    pub fn snapshot(&self) -> PinAssignments {
        self.assignments.clone()
    }

    /// Metadata for every physical pin, in package order.
    pub fn pin_details(&self) -> Vec<PinDetail> {
        self.physical_pins()
            .iter()
            .map(|pin| PinDetail {
                name: pin.name.clone(),
                number: pin.number.clone(),
                pin_type: self.pin_type(&pin.name).to_string(),
                functions: self.pin_functions(&pin.name).to_vec(),
                configured: self.pin_configuration(&pin.name).map(str::to_string),
            })
            .collect()
    }
}
