//! Chip definition types and loading (JSON or TOML).
//!
//! A chip definition describes, independently of each other:
//! - `pins`: the capability table, pin name → `{ type, functions }`
//! - `package.pins`: the physical layout, ordered `{ name, number }` records
//!
//! The two collections are not cross-checked. A physical pin whose name has
//! no capability entry is accepted and resolves to the `"unknown"` type at
//! lookup time.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Type reported for pins without a capability entry.
pub const UNKNOWN_PIN_TYPE: &str = "unknown";

// ─── Error Types ────────────────────────────────────────────────────

/// Chip definition loading error.
#[derive(Debug, Error)]
pub enum ChipError {
    /// Definition file not found at the given path.
    #[error("chip definition not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Reading the file failed for another reason.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON/TOML parsing failed.
    #[error("failed to parse chip definition: {0}")]
    Parse(String),

    /// File extension is neither `.json` nor `.toml`.
    #[error("unsupported chip definition format {0:?} (expected .json or .toml)")]
    UnsupportedFormat(String),
}

// ─── Definition ─────────────────────────────────────────────────────

/// Descriptive chip metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipMeta {
    /// Chip identifier, used to name exported reports.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// What a single pin is able to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinCapability {
    /// Electrical class, e.g. `"gpio"`, `"power"`, `"reset"`.
    #[serde(rename = "type")]
    pub pin_type: String,

    /// Selectable functions, in display order.
    #[serde(default)]
    pub functions: Vec<String>,
}

/// A package position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalPin {
    /// Pin name, expected to match a key of [`ChipDefinition::pins`].
    pub name: String,

    /// Position label. Usually numeric (`"12"`), but BGA style labels
    /// (`"A3"`) occur too. Integers in the source file are accepted.
    #[serde(deserialize_with = "deserialize_pin_number")]
    pub number: String,
}

impl PhysicalPin {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPinNumber {
    Text(String),
    Integer(i64),
}

fn deserialize_pin_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawPinNumber::deserialize(deserializer)? {
        RawPinNumber::Text(s) => s,
        RawPinNumber::Integer(n) => n.to_string(),
    })
}

/// Physical package description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name, e.g. `"LQFP48"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Physical pins in definition order.
    #[serde(default)]
    pub pins: Vec<PhysicalPin>,
}

/// Static description of a chip: metadata, pin capabilities, package layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipDefinition {
    pub meta: ChipMeta,

    /// Capability table keyed by pin name.
    #[serde(default)]
    pub pins: BTreeMap<String, PinCapability>,

    #[serde(default)]
    pub package: Package,
}

impl ChipDefinition {
    /// Parse from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, ChipError> {
        serde_json::from_str(json_str).map_err(|e| ChipError::Parse(e.to_string()))
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ChipError> {
        toml::from_str(toml_str).map_err(|e| ChipError::Parse(e.to_string()))
    }

    /// Load a definition file, choosing the parser from the file extension.
    pub fn load(path: &Path) -> Result<Self, ChipError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if ext != "json" && ext != "toml" {
            return Err(ChipError::UnsupportedFormat(ext));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ChipError::FileNotFound(path.to_path_buf())
            } else {
                ChipError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let chip = if ext == "json" {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        tracing::info!(
            chip = %chip.meta.name,
            capabilities = chip.pins.len(),
            physical = chip.package.pins.len(),
            "loaded chip definition from {}",
            path.display()
        );
        Ok(chip)
    }

    /// Capability entry for `pin_name`, if declared.
    pub fn capability(&self, pin_name: &str) -> Option<&PinCapability> {
        self.pins.get(pin_name)
    }

    /// Declared type of `pin_name`, or [`UNKNOWN_PIN_TYPE`].
    pub fn pin_type(&self, pin_name: &str) -> &str {
        self.capability(pin_name)
            .map(|cap| cap.pin_type.as_str())
            .unwrap_or(UNKNOWN_PIN_TYPE)
    }
}
