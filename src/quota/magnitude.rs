// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Conversion of human-entered limits such as "10", "2.5G" or "-1Mb" into
//! counts of base units.
//!
//! Block limits are counted in 1024-byte blocks, so a "K" suffix is the base
//! unit itself and every further suffix multiplies by 1024. Inode limits are
//! plain counts and their suffixes are decimal: "K" is 1000, "M" is 1000².
//!
//! Fractional values are rounded to the nearest integer, halves away from
//! zero. A leading sign is kept in the result; it is not a relative change.

use regex::Regex;

use crate::{
    errors::{QuotaError, QuotaResult},
    quota::types::{LimitField, MagnitudeKind},
};

lazy_static! {
    static ref MAGNITUDE: Regex =
        Regex::new(r"^([+-])?([0-9]+(?:\.[0-9]+)?)(K|Kb|M|Mb|G|Gb|T|Tb)?$")
            .expect("magnitude pattern is a valid regular expression");
}

/// The multiplier a suffix stands for. None is a bare number.
fn scale(kind: MagnitudeKind, suffix: Option<&str>) -> i64 {
    let power: u32 = match suffix {
        Some("K" | "Kb") => 1,
        Some("M" | "Mb") => 2,
        Some("G" | "Gb") => 3,
        Some("T" | "Tb") => 4,
        _ => 0,
    };
    match kind {
        MagnitudeKind::Blocks => 1024_i64.pow(power.saturating_sub(1)),
        MagnitudeKind::Inodes => 1000_i64.pow(power),
    }
}

/// Scale an unsigned decimal number. Integers are scaled exactly.
fn scale_number(number: &str, factor: i64) -> Option<i64> {
    if number.contains('.') {
        let scaled = (number.parse::<f64>().ok()? * factor as f64).round();
        if (0.0..i64::MAX as f64).contains(&scaled) {
            Some(scaled as i64)
        } else {
            None
        }
    } else {
        number.parse::<i64>().ok()?.checked_mul(factor)
    }
}

/// Parse a magnitude of the given kind into a signed count of base units.
/// Returns None if the value does not match the grammar or the result does
/// not fit in an i64.
pub fn parse_magnitude(value: &str, kind: MagnitudeKind) -> Option<i64> {
    let captures = MAGNITUDE.captures(value)?;
    let factor = scale(kind, captures.get(3).map(|m| m.as_str()));
    let magnitude = scale_number(&captures[2], factor)?;
    match captures.get(1).map(|m| m.as_str()) {
        Some("-") => magnitude.checked_neg(),
        _ => Some(magnitude),
    }
}

/// Parse the value requested for a limit, scaled by the limit's kind.
pub fn parse_limit(field: LimitField, value: &str) -> QuotaResult<i64> {
    parse_magnitude(value, field.kind()).ok_or_else(|| QuotaError::InvalidMagnitude {
        field: field.to_string(),
        value: value.to_owned(),
    })
}
