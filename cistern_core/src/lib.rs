//! # cistern_core - Rainwater Tank Sizing Engine
//!
//! `cistern_core` sizes a rainwater storage tank with the German practical
//! method (ABNT NBR 15527) from a region's mean annual rainfall, the roof
//! catchment area and the daily non-potable water demand. All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Unrounded Results**: Rounding happens only in [`presentation`]
//!
//! ## Quick Start
//!
//! ```rust
//! use cistern_core::{calculate, RegionTable, SizingInput};
//!
//! let regions = RegionTable::builtin();
//! let input = SizingInput::new("sul", 100.0, 300.0);
//! let result = calculate(&input, &regions).unwrap();
//!
//! assert_eq!(result.tank_volume_liters, 6570.0);
//! assert_eq!(result.monthly_savings, 73.0);
//!
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The sizing calculation
//! - [`regions`] - Region rainfall table
//! - [`config`] - TOML overrides for constants and regions
//! - [`presentation`] - pt-BR formatting and form-entry parsing
//! - [`equations`] - Equation registry for the methodology appendix
//! - [`pdf`] - PDF report rendering
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod config;
pub mod equations;
pub mod errors;
pub mod pdf;
pub mod presentation;
pub mod regions;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, calculate_with, SizingInput, SizingParameters, SizingResult};
pub use config::CalculatorConfig;
pub use errors::{CalcError, CalcResult};
pub use regions::{RegionRainfall, RegionTable};
