//! CSV report export.
//!
//! One row per physical pin, sorted by package position:
//!
//! ```text
//! Pin Name,Physical Number,Type,Configured Function
//! PB2,2,gpio,SPI_CLK
//! PA1,10,gpio,
//! ```
//!
//! A field containing the delimiter is wrapped in double quotes. Nothing
//! else is escaped, so a field with an embedded `"` is written as is.
//! Rows are joined with `\n` without a trailing newline.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::chip::{ChipDefinition, PhysicalPin};
use crate::sink::{Delivery, DeliveryError, ReportSink};
use crate::store::PinAssignments;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Column titles of the first row.
pub const HEADER: [&str; 4] = ["Pin Name", "Physical Number", "Type", "Configured Function"];

/// Timestamp layout used in report file names (`2026-10-18T09-05-03`).
const FILENAME_TIMESTAMP: &str = "%Y-%m-%dT%H-%M-%S";

/// A rendered report and the name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub filename: String,
    pub content: String,
}

/// Renders chip + assignments into a delimited text report.
#[derive(Debug, Clone, Copy)]
pub struct ReportExporter {
    delimiter: char,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl ReportExporter {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Render the report body.
    ///
    /// `chip.package.pins` is not reordered; sorting happens on a copy.
    pub fn render(&self, chip: &ChipDefinition, assignments: &PinAssignments) -> String {
        let mut pins: Vec<&PhysicalPin> = chip.package.pins.iter().collect();
        pins.sort_by(|a, b| compare_pin_numbers(&a.number, &b.number));

        let mut rows = Vec::with_capacity(pins.len() + 1);
        rows.push(self.row(HEADER));
        for pin in pins {
            let function = assignments.get(&pin.name).map(String::as_str).unwrap_or("");
            rows.push(self.row([
                pin.name.as_str(),
                pin.number.as_str(),
                chip.pin_type(&pin.name),
                function,
            ]));
        }
        rows.join("\n")
    }

    /// `{chip}_PinMux_{YYYY-MM-DDTHH-MM-SS}.csv`, time in UTC.
    pub fn filename(chip: &ChipDefinition, at: DateTime<Utc>) -> String {
        format!(
            "{}_PinMux_{}.csv",
            chip.meta.name,
            at.format(FILENAME_TIMESTAMP)
        )
    }

    /// Build the report, stamped with the current time.
    pub fn export(&self, chip: &ChipDefinition, assignments: &PinAssignments) -> Report {
        self.export_at(chip, assignments, Utc::now())
    }

    /// Build the report, stamped with `at`.
    pub fn export_at(
        &self,
        chip: &ChipDefinition,
        assignments: &PinAssignments,
        at: DateTime<Utc>,
    ) -> Report {
        Report {
            filename: Self::filename(chip, at),
            content: self.render(chip, assignments),
        }
    }

    /// Build the report and hand it to `sink`.
    pub fn export_to<S: ReportSink + ?Sized>(
        &self,
        chip: &ChipDefinition,
        assignments: &PinAssignments,
        sink: &mut S,
    ) -> Result<Delivery, DeliveryError> {
        let report = self.export(chip, assignments);
        let delivery = sink.deliver(&report)?;
        info!(
            chip = %chip.meta.name,
            pins = chip.package.pins.len(),
            configured = assignments.len(),
            "report exported: {delivery}"
        );
        Ok(delivery)
    }

    fn row(&self, fields: [&str; 4]) -> String {
        let mut line = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                line.push(self.delimiter);
            }
            line.push_str(&escape_field(field, self.delimiter));
        }
        line
    }
}

/// Quote `field` if it contains `delimiter`.
pub fn escape_field(field: &str, delimiter: char) -> Cow<'_, str> {
    if field.contains(delimiter) {
        Cow::Owned(format!("\"{field}\""))
    } else {
        Cow::Borrowed(field)
    }
}

/// Order two package position labels.
///
/// Labels with an integer prefix (`"7"`, `" 12"`, `"-1"`, `"3b"`) compare by
/// that integer; labels without one compare as strings. Any integer label
/// sorts before any non-integer label, so `["A3", "10", "B1", "2"]` orders
/// as `2, 10, A3, B1`.
pub fn compare_pin_numbers(a: &str, b: &str) -> Ordering {
    match (leading_integer(a), leading_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Integer prefix of `s` after leading whitespace and an optional sign.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let magnitude = digits[..len].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}
