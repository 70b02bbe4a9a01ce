// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Preview statistics for a deployment.
//!
//! The upload tool prints sizes with decimal multipliers ("14.96 kB" is
//! 14 960 bytes, not 15 319), so both parsing and formatting go through the
//! same decimal unit table.

use crate::{diagnostic::Diagnostic, record::FileRecord};

use serde::{Deserialize, Serialize};

/// Decimal size units, smallest first.
pub const SIZE_UNITS: [(&str, u64); 4] = [
    ("B", 1),
    ("kB", 1_000),
    ("MB", 1_000_000),
    ("GB", 1_000_000_000),
];

/// Aggregate figures shown before publishing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewStats {
    pub file_count: usize,
    pub total_bytes: u64,
    pub total_bytes_human: String,
}

/// Summarize records into preview statistics.
///
/// Records whose size cannot be read count as zero bytes and are reported
/// through [`Diagnostic::UnparseableSize`].
pub fn summarize<'r>(
    records: impl IntoIterator<Item = &'r FileRecord>,
) -> (PreviewStats, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut file_count = 0;
    let mut total_bytes: u64 = 0;

    for record in records {
        file_count += 1;
        match parse_size(&record.size_text) {
            Ok(bytes) => total_bytes = total_bytes.saturating_add(bytes),
            Err(_) => diagnostics.push(Diagnostic::UnparseableSize {
                path: record.path.clone(),
                size_text: record.size_text.clone(),
            }),
        }
    }

    let stats = PreviewStats {
        file_count,
        total_bytes,
        total_bytes_human: format_size(total_bytes),
    };

    (stats, diagnostics)
}

/// Parse human-readable size into bytes.
///
/// A missing unit means bytes.
///
/// # Errors
///
/// - Return [`SizeError::Mantissa`] if the number part is not a
///   non-negative decimal.
/// - Return [`SizeError::Unit`] if the unit is not in [`SIZE_UNITS`].
pub fn parse_size(text: &str) -> Result<u64> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (mantissa, unit) = text.split_at(split);
    let unit = match unit.trim() {
        "" => "B",
        unit => unit,
    };

    let value: f64 = mantissa
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| SizeError::Mantissa(text.to_string()))?;
    let (_, multiplier) = SIZE_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .ok_or_else(|| SizeError::Unit(unit.to_string()))?;

    Ok((value * *multiplier as f64).round() as u64)
}

/// Format bytes as human-readable size.
///
/// Picks the smallest unit that keeps the mantissa below 1000 after rounding
/// to two decimals. Anything below 1000 bytes is shown as whole bytes.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1_000 {
        return format!("{bytes} B");
    }

    let scaled_units = &SIZE_UNITS[1..];
    for (position, (name, multiplier)) in scaled_units.iter().enumerate() {
        let mantissa = round_cents(bytes as f64 / *multiplier as f64);
        if mantissa < 1_000.0 || position + 1 == scaled_units.len() {
            return format!("{mantissa:.2} {name}");
        }
    }

    unreachable!("size unit table has at least one scaled unit")
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Size parsing error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SizeError {
    /// Number part of size is not a valid decimal.
    #[error("invalid size number in {0:?}")]
    Mantissa(String),

    /// Unit is not a known decimal unit.
    #[error("unknown size unit {0:?}")]
    Unit(String),
}

/// Friendly result alias :3
pub type Result<T, E = SizeError> = std::result::Result<T, E>;
