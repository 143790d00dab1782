//! # Calculator Configuration
//!
//! Optional TOML file overriding the sizing constants and/or the region
//! rainfall table. Anything left out falls back to the defaults.
//!
//! ## File Format
//!
//! ```toml
//! [parameters]
//! tank_fraction = 0.06
//! price_per_liter = 0.008
//! runoff_coefficient = 1.0
//!
//! [[regions]]
//! key = "sul"
//! name = "Sul"
//! annual_rainfall_mm = 1600.0
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cistern_core::config::CalculatorConfig;
//!
//! let config = CalculatorConfig::from_toml_str(
//!     "[parameters]\nrunoff_coefficient = 0.85\n",
//!     "inline",
//! ).unwrap();
//!
//! assert_eq!(config.parameters.runoff_coefficient, 0.85);
//! assert!(config.region_table().unwrap().get("sul").is_some());
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calculations::sizing::SizingParameters;
use crate::errors::{CalcError, CalcResult};
use crate::regions::{RegionRainfall, RegionTable};

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculatorConfig {
    /// Sizing constants
    #[serde(default)]
    pub parameters: SizingParameters,

    /// Region rows; when empty the built-in table is used
    #[serde(default)]
    pub regions: Vec<RegionRainfall>,
}

impl CalculatorConfig {
    /// Parse configuration text. `source` names the origin in error messages.
    pub fn from_toml_str(text: &str, source: &str) -> CalcResult<Self> {
        let config: CalculatorConfig =
            toml::from_str(text).map_err(|e| CalcError::config_error(source, e.message()))?;

        config
            .parameters
            .validate()
            .map_err(|e| CalcError::config_error(source, e.to_string()))?;
        config
            .region_table()
            .map_err(|e| CalcError::config_error(source, e.to_string()))?;

        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read config", path.display().to_string(), e.to_string()))?;

        let config = Self::from_toml_str(&text, &path.display().to_string())?;
        log::info!(
            "Loaded configuration from {} ({} custom regions)",
            path.display(),
            config.regions.len()
        );
        Ok(config)
    }

    /// Build the region table this configuration describes.
    pub fn region_table(&self) -> CalcResult<RegionTable> {
        if self.regions.is_empty() {
            Ok(RegionTable::builtin())
        } else {
            RegionTable::new(self.regions.clone())
        }
    }
}
