//! # Presentation (pt-BR)
//!
//! Display formatting for the fixed pt-BR locale, kept apart from the
//! calculator so the numbers stay unrounded until they are shown.
//!
//! - Thousands separator `.`, decimal separator `,`
//! - Currency `R$ 1.234,56`
//! - Tank volume rounded up, capture/demand/autonomy to the nearest integer
//!
//! The report exporter consumes these strings as-is, so whatever is decided
//! here is what ends up in the PDF.
//!
//! ## Example
//!
//! ```rust
//! use cistern_core::presentation::{format_currency, format_number};
//!
//! assert_eq!(format_number(13_333.333, 0), "13.333");
//! assert_eq!(format_currency(73.0), "R$ 73,00");
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::sizing::{SizingInput, SizingResult};
use crate::errors::{CalcError, CalcResult};
use crate::regions::RegionRainfall;

/// Currency symbol for the fixed locale
pub const CURRENCY_SYMBOL: &str = "R$";

/// Format a number with pt-BR separators and a fixed number of decimals.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    // "-0" and "-0,00" read as noise
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{}{},{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format a number with up to `max_decimals` decimals, dropping trailing zeros.
pub fn format_number_trimmed(value: f64, max_decimals: usize) -> String {
    let full = format_number(value, max_decimals);
    if max_decimals == 0 || !full.contains(',') {
        return full;
    }
    full.trim_end_matches('0').trim_end_matches(',').to_string()
}

/// Format a currency amount with two decimals (e.g., `R$ 1.234,50`).
pub fn format_currency(value: f64) -> String {
    format!("{} {}", CURRENCY_SYMBOL, format_number(value, 2))
}

/// Parse a user-entered decimal number.
///
/// Accepts pt-BR entry (`1.234,5`, `1234,5`) and plain dot-decimal entry
/// (`1234.5`). When a comma is present, dots are thousands separators.
/// Returns `None` for blank or non-numeric text (including `inf`/`NaN`).
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
    {
        return None;
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    normalized.parse::<f64>().ok()
}

/// Build a [`SizingInput`] from raw form entry.
///
/// A missing or blank region, or non-numeric area/demand text, fails with
/// `InvalidInput`. Range checks happen in the calculator.
pub fn parse_entry(region: Option<&str>, area_text: &str, demand_text: &str) -> CalcResult<SizingInput> {
    let region = match region.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Err(CalcError::invalid_input("region", "", "Region must be selected")),
    };

    let area = parse_decimal(area_text).ok_or_else(|| {
        CalcError::invalid_input("catchment_area_m2", area_text, "Catchment area must be a number")
    })?;
    let demand = parse_decimal(demand_text).ok_or_else(|| {
        CalcError::invalid_input("daily_demand_liters", demand_text, "Daily demand must be a number")
    })?;

    Ok(SizingInput::new(region, area, demand))
}

/// Display strings for the five sizing metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedSizing {
    /// Tank volume, rounded up (e.g., "6.570 L")
    pub tank_volume: String,
    /// Tank volume in cubic meters, two decimals (e.g., "6,57 m³")
    pub tank_volume_m3: String,
    /// Monthly savings (e.g., "R$ 73,00")
    pub monthly_savings: String,
    /// Average monthly capture (e.g., "13.333 L/mês")
    pub monthly_capture: String,
    /// Monthly demand (e.g., "9.125 L/mês")
    pub monthly_demand: String,
    /// Autonomy (e.g., "22 dias")
    pub autonomy: String,
}

impl FormattedSizing {
    pub fn from_result(result: &SizingResult) -> Self {
        let autonomy_days = result.autonomy_days.round();
        let day_unit = if autonomy_days == 1.0 { "dia" } else { "dias" };

        FormattedSizing {
            tank_volume: format!("{} L", format_number(result.tank_volume_liters.ceil(), 0)),
            tank_volume_m3: format!("{} m³", format_number(result.tank_volume_m3(), 2)),
            monthly_savings: format_currency(result.monthly_savings),
            monthly_capture: format!("{} L/mês", format_number(result.monthly_capture_avg_liters.round(), 0)),
            monthly_demand: format!("{} L/mês", format_number(result.monthly_demand_liters.round(), 0)),
            autonomy: format!("{} {}", format_number(autonomy_days, 0), day_unit),
        }
    }
}

/// Echo of what the user entered, formatted for display and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEcho {
    /// Region display name (e.g., "Sul")
    pub region_name: String,
    /// Annual rainfall of the region (e.g., "1.600 mm/ano")
    pub annual_rainfall: String,
    /// Catchment area (e.g., "100 m²")
    pub catchment_area: String,
    /// Daily demand (e.g., "300 L/dia")
    pub daily_demand: String,
}

impl InputEcho {
    pub fn new(region: &RegionRainfall, input: &SizingInput) -> Self {
        InputEcho {
            region_name: region.name.clone(),
            annual_rainfall: format!("{} mm/ano", format_number_trimmed(region.annual_rainfall_mm, 1)),
            catchment_area: format!("{} m²", format_number_trimmed(input.catchment_area_m2, 2)),
            daily_demand: format!("{} L/dia", format_number_trimmed(input.daily_demand_liters, 2)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::sizing::calculate;
    use crate::regions::RegionTable;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1.000");
        assert_eq!(format_number(1_234_567.891, 2), "1.234.567,89");
        assert_eq!(format_number(-1234.5, 1), "-1.234,5");
        assert_eq!(format_number(-0.001, 2), "0,00");
    }

    #[test]
    fn test_format_number_trimmed() {
        assert_eq!(format_number_trimmed(100.0, 2), "100");
        assert_eq!(format_number_trimmed(100.5, 2), "100,5");
        assert_eq!(format_number_trimmed(1250.25, 2), "1.250,25");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(73.0), "R$ 73,00");
        assert_eq!(format_currency(1234.567), "R$ 1.234,57");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("100"), Some(100.0));
        assert_eq!(parse_decimal(" 100,5 "), Some(100.5));
        assert_eq!(parse_decimal("1.234,5"), Some(1234.5));
        assert_eq!(parse_decimal("1234.5"), Some(1234.5));
        assert_eq!(parse_decimal("-3"), Some(-3.0));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("1.234.567"), None);
    }

    #[test]
    fn test_parse_entry() {
        let input = parse_entry(Some("sul"), "100", "300,0").unwrap();
        assert_eq!(input, SizingInput::new("sul", 100.0, 300.0));
    }

    #[test]
    fn test_parse_entry_rejects_missing_region() {
        let err = parse_entry(None, "100", "300").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(parse_entry(Some("  "), "100", "300").is_err());
    }

    #[test]
    fn test_parse_entry_rejects_non_numeric() {
        let err = parse_entry(Some("sul"), "cem", "300").unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "catchment_area_m2"));
        let err = parse_entry(Some("sul"), "100", "").unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "daily_demand_liters"));
    }

    #[test]
    fn test_formatted_reference_scenario() {
        let regions = RegionTable::builtin();
        let result = calculate(&SizingInput::new("sul", 100.0, 300.0), &regions).unwrap();
        let formatted = FormattedSizing::from_result(&result);

        assert_eq!(formatted.tank_volume, "6.570 L");
        assert_eq!(formatted.tank_volume_m3, "6,57 m³");
        assert_eq!(formatted.monthly_savings, "R$ 73,00");
        assert_eq!(formatted.monthly_capture, "13.333 L/mês");
        assert_eq!(formatted.monthly_demand, "9.125 L/mês");
        assert_eq!(formatted.autonomy, "22 dias");
    }

    #[test]
    fn test_tank_volume_rounds_up() {
        let result = SizingResult {
            tank_volume_liters: 1200.2,
            monthly_savings: 0.0,
            monthly_capture_avg_liters: 0.0,
            monthly_demand_liters: 0.0,
            autonomy_days: 1.2,
        };
        let formatted = FormattedSizing::from_result(&result);
        assert_eq!(formatted.tank_volume, "1.201 L");
        assert_eq!(formatted.autonomy, "1 dia");
    }

    #[test]
    fn test_input_echo() {
        let regions = RegionTable::builtin();
        let region = regions.lookup("sul").unwrap();
        let echo = InputEcho::new(region, &SizingInput::new("sul", 100.5, 300.0));
        assert_eq!(echo.region_name, "Sul");
        assert_eq!(echo.annual_rainfall, "1.600 mm/ano");
        assert_eq!(echo.catchment_area, "100,5 m²");
        assert_eq!(echo.daily_demand, "300 L/dia");
    }
}
