//! # Sizing Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable, unrounded)
//! - `calculate(input, ...) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`sizing`] - Rainwater tank volume, savings, capture, demand and autonomy

pub mod sizing;

pub use sizing::{
    calculate, calculate_with, LimitingFactor, SizingInput, SizingParameters, SizingResult,
};
