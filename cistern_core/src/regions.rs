//! # Region Rainfall Table
//!
//! Annual precipitation per region. The table is an immutable value that
//! callers build once (built-in or from a config file, see
//! [`crate::config`]) and pass explicitly to the calculator.
//!
//! ## Example
//!
//! ```rust
//! use cistern_core::regions::RegionTable;
//!
//! let regions = RegionTable::builtin();
//! let sul = regions.lookup("sul").unwrap();
//! assert_eq!(sul.annual_rainfall_mm, 1600.0);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::Millimeters;

/// One row of the rainfall table.
///
/// ## JSON Example
///
/// ```json
/// { "key": "sul", "name": "Sul", "annual_rainfall_mm": 1600.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRainfall {
    /// Identifier used on the command line and in config files (e.g., "sul")
    pub key: String,

    /// Display name shown to the user and printed in reports
    pub name: String,

    /// Average annual precipitation in millimeters
    pub annual_rainfall_mm: f64,
}

impl RegionRainfall {
    pub fn new(key: impl Into<String>, name: impl Into<String>, annual_rainfall_mm: f64) -> Self {
        RegionRainfall {
            key: key.into(),
            name: name.into(),
            annual_rainfall_mm,
        }
    }

    /// Annual rainfall as a typed depth
    pub fn annual_rainfall(&self) -> Millimeters {
        Millimeters(self.annual_rainfall_mm)
    }
}

/// Built-in table of Brazilian macro-regions (average annual rainfall).
static BUILTIN_REGIONS: Lazy<RegionTable> = Lazy::new(|| RegionTable {
    rows: vec![
        RegionRainfall::new("norte", "Norte", 2300.0),
        RegionRainfall::new("nordeste-litoral", "Nordeste - Litoral", 1500.0),
        RegionRainfall::new("semiarido", "Nordeste - Semiárido", 650.0),
        RegionRainfall::new("centro-oeste", "Centro-Oeste", 1500.0),
        RegionRainfall::new("sudeste", "Sudeste", 1400.0),
        RegionRainfall::new("sul", "Sul", 1600.0),
    ],
});

/// Ordered, immutable mapping from region key to rainfall.
///
/// Row order is preserved; it is the order regions are offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegionTable {
    rows: Vec<RegionRainfall>,
}

impl RegionTable {
    /// Build a table, validating every row.
    ///
    /// Rejects an empty table, blank or duplicate keys, blank names and
    /// rainfall that is not a finite positive number.
    pub fn new(rows: Vec<RegionRainfall>) -> CalcResult<Self> {
        if rows.is_empty() {
            return Err(CalcError::invalid_input(
                "regions",
                "[]",
                "Region table must contain at least one region",
            ));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.key.trim().is_empty() {
                return Err(CalcError::invalid_input(
                    format!("regions[{}].key", i),
                    row.key.clone(),
                    "Region key must not be blank",
                ));
            }
            if rows[..i].iter().any(|prev| prev.key == row.key) {
                return Err(CalcError::invalid_input(
                    format!("regions[{}].key", i),
                    row.key.clone(),
                    "Duplicate region key",
                ));
            }
            if row.name.trim().is_empty() {
                return Err(CalcError::invalid_input(
                    format!("regions[{}].name", i),
                    row.name.clone(),
                    "Region name must not be blank",
                ));
            }
            if !row.annual_rainfall_mm.is_finite() || row.annual_rainfall_mm <= 0.0 {
                return Err(CalcError::invalid_input(
                    format!("regions[{}].annual_rainfall_mm", i),
                    row.annual_rainfall_mm.to_string(),
                    "Annual rainfall must be a positive number",
                ));
            }
        }

        Ok(RegionTable { rows })
    }

    /// The built-in Brazilian macro-region table.
    pub fn builtin() -> Self {
        BUILTIN_REGIONS.clone()
    }

    /// Find a region by key.
    pub fn get(&self, key: &str) -> Option<&RegionRainfall> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Find a region by key, failing with `InvalidInput` when the key is
    /// blank (nothing selected) or not in the table.
    pub fn lookup(&self, key: &str) -> CalcResult<&RegionRainfall> {
        if key.trim().is_empty() {
            return Err(CalcError::invalid_input("region", key, "Region must be selected"));
        }
        self.get(key).ok_or_else(|| {
            CalcError::invalid_input(
                "region",
                key,
                format!("Unknown region; expected one of: {}", self.keys().collect::<Vec<_>>().join(", ")),
            )
        })
    }

    /// Iterate rows in table order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionRainfall> {
        self.rows.iter()
    }

    /// Iterate region keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        RegionTable::builtin()
    }
}
