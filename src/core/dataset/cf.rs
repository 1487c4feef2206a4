//! CF conventions decoding
//!
//! Applied to every variable as it is loaded: fill and missing values become
//! NaN, `scale_factor`/`add_offset` are applied, and variables whose `units`
//! read `<unit> since <date>` on a standard calendar become date-times.

use super::model::Values;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Decoding-relevant attributes of one variable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CfAttributes {
    pub fill_value: Option<f64>,
    pub missing_value: Option<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
    pub units: Option<String>,
    pub calendar: Option<String>,
}

impl CfAttributes {
    fn needs_mask_and_scale(&self) -> bool {
        self.fill_value.is_some()
            || self.missing_value.is_some()
            || self.scale_factor.is_some()
            || self.add_offset.is_some()
    }

    fn standard_calendar(&self) -> bool {
        match self.calendar.as_deref().map(str::to_ascii_lowercase) {
            None => true,
            Some(c) => matches!(c.as_str(), "standard" | "gregorian" | "proleptic_gregorian"),
        }
    }
}

/// Decode raw values according to their CF attributes
pub fn decode(values: Values, attrs: &CfAttributes) -> Values {
    let time_units = if attrs.standard_calendar() {
        attrs.units.as_deref().and_then(TimeUnits::parse)
    } else {
        None
    };

    if !attrs.needs_mask_and_scale() && time_units.is_none() {
        return values;
    }

    let numbers = mask_and_scale(&values, attrs);
    match time_units {
        Some(units) => Values::DateTime(numbers.into_iter().map(|v| units.to_datetime(v)).collect()),
        None => Values::F64(numbers),
    }
}

fn mask_and_scale(values: &Values, attrs: &CfAttributes) -> Vec<f64> {
    let scale = attrs.scale_factor.unwrap_or(1.0);
    let offset = attrs.add_offset.unwrap_or(0.0);

    values
        .to_f64_vec()
        .into_iter()
        .map(|raw| {
            let is_missing = [attrs.fill_value, attrs.missing_value]
                .iter()
                .flatten()
                .any(|marker| raw == *marker);
            if is_missing {
                f64::NAN
            } else {
                raw * scale + offset
            }
        })
        .collect()
}

/// Parsed `<unit> since <reference>` time units
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnits {
    unit_millis: f64,
    reference: NaiveDateTime,
}

impl TimeUnits {
    /// Parse CF time units, e.g. `hours since 1970-01-01 00:00:00`
    ///
    /// Only UTC references are accepted.
    pub fn parse(units: &str) -> Option<Self> {
        let re = Regex::new(
            r"(?i)^\s*(days?|d|hours?|hrs?|h|minutes?|mins?|seconds?|secs?|s)\s+since\s+(\d{1,4}-\d{1,2}-\d{1,2})(?:[ T](\d{1,2}:\d{1,2}(?::\d{1,2}(?:\.\d+)?)?))?\s*(?:Z|UTC|[+-]0{1,2}(?::?00)?)?\s*$",
        )
        .ok()?;
        let caps = re.captures(units)?;

        let unit = caps.get(1)?.as_str().to_ascii_lowercase();
        let unit_millis = match unit.as_str() {
            "day" | "days" | "d" => 86_400_000.0,
            "hour" | "hours" | "hr" | "hrs" | "h" => 3_600_000.0,
            "minute" | "minutes" | "min" | "mins" => 60_000.0,
            _ => 1_000.0,
        };

        let date = NaiveDate::parse_from_str(caps.get(2)?.as_str(), "%Y-%m-%d").ok()?;
        let reference = match caps.get(3) {
            Some(time) => ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
                .iter()
                .find_map(|fmt| chrono::NaiveTime::parse_from_str(time.as_str(), fmt).ok())
                .map(|t| date.and_time(t))?,
            None => date.and_hms_opt(0, 0, 0)?,
        };

        Some(Self {
            unit_millis,
            reference,
        })
    }

    /// Convert an offset in these units to a date-time
    pub fn to_datetime(&self, value: f64) -> Option<NaiveDateTime> {
        if !value.is_finite() {
            return None;
        }
        let millis = (value * self.unit_millis).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        self.reference
            .checked_add_signed(Duration::milliseconds(millis as i64))
    }
}
