//! # Tank Sizing Calculation
//!
//! Sizes a rainwater storage tank with the German practical method of
//! ABNT NBR 15527: the tank holds 6% of the smaller of the annual rainwater
//! capture and the annual demand.
//!
//! ## Assumptions
//!
//! - 1 mm of rain over 1 m² of catchment yields 1 L
//! - Year of 365 days, monthly values are annual values / 12
//! - Run-off losses are NOT applied unless `runoff_coefficient` < 1.0
//! - No rounding here; display rounding lives in [`crate::presentation`]
//!
//! ## Example
//!
//! ```rust
//! use cistern_core::calculations::sizing::{calculate, SizingInput};
//! use cistern_core::regions::RegionTable;
//!
//! let regions = RegionTable::builtin();
//! let input = SizingInput::new("sul", 100.0, 300.0);
//!
//! let result = calculate(&input, &regions).unwrap();
//! assert!((result.tank_volume_liters - 6570.0).abs() < 1e-6);
//! assert!((result.autonomy_days - 21.9).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::regions::RegionTable;
use crate::units::{CubicMeters, Days, Liters, LitersPerDay, SquareMeters};

/// Fraction of the limiting annual volume stored in the tank
pub const DEFAULT_TANK_FRACTION: f64 = 0.06;

/// Water tariff in currency per liter (8.00 per m³)
pub const DEFAULT_PRICE_PER_LITER: f64 = 0.008;

/// Run-off coefficient applied to the raw capture (1.0 = not applied)
pub const DEFAULT_RUNOFF_COEFFICIENT: f64 = 1.0;

/// Run-off coefficient quoted by the published methodology text
pub const DOCUMENTED_RUNOFF_COEFFICIENT: f64 = 0.85;

/// Input parameters for a sizing run.
///
/// ## JSON Example
///
/// ```json
/// {
///   "region": "sul",
///   "catchment_area_m2": 100.0,
///   "daily_demand_liters": 300.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingInput {
    /// Region key in the rainfall table (e.g., "sul")
    pub region: String,

    /// Roof/surface area collecting rain, in square meters
    pub catchment_area_m2: f64,

    /// Water consumption in liters per day
    pub daily_demand_liters: f64,
}

impl SizingInput {
    pub fn new(region: impl Into<String>, catchment_area_m2: f64, daily_demand_liters: f64) -> Self {
        SizingInput {
            region: region.into(),
            catchment_area_m2,
            daily_demand_liters,
        }
    }

    /// Validate input parameters against a region table.
    pub fn validate(&self, regions: &RegionTable) -> CalcResult<()> {
        regions.lookup(&self.region)?;
        if !self.catchment_area_m2.is_finite() {
            return Err(CalcError::invalid_input(
                "catchment_area_m2",
                self.catchment_area_m2.to_string(),
                "Catchment area must be a finite number",
            ));
        }
        if self.catchment_area_m2 <= 0.0 {
            return Err(CalcError::invalid_input(
                "catchment_area_m2",
                self.catchment_area_m2.to_string(),
                "Catchment area must be positive",
            ));
        }
        if !self.daily_demand_liters.is_finite() {
            return Err(CalcError::invalid_input(
                "daily_demand_liters",
                self.daily_demand_liters.to_string(),
                "Daily demand must be a finite number",
            ));
        }
        if self.daily_demand_liters <= 0.0 {
            return Err(CalcError::invalid_input(
                "daily_demand_liters",
                self.daily_demand_liters.to_string(),
                "Daily demand must be positive",
            ));
        }
        Ok(())
    }

    pub fn catchment_area(&self) -> SquareMeters {
        SquareMeters(self.catchment_area_m2)
    }

    pub fn daily_demand(&self) -> LitersPerDay {
        LitersPerDay(self.daily_demand_liters)
    }
}

/// Fixed constants of the sizing method.
///
/// Defaults reproduce the published calculator exactly. Every field can be
/// overridden from the `[parameters]` section of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingParameters {
    /// Share of the limiting annual volume kept in storage
    pub tank_fraction: f64,

    /// Tariff used to value the rainwater, in currency per liter
    pub price_per_liter: f64,

    /// Fraction of rainfall actually collected after losses
    pub runoff_coefficient: f64,
}

impl Default for SizingParameters {
    fn default() -> Self {
        SizingParameters {
            tank_fraction: DEFAULT_TANK_FRACTION,
            price_per_liter: DEFAULT_PRICE_PER_LITER,
            runoff_coefficient: DEFAULT_RUNOFF_COEFFICIENT,
        }
    }
}

impl SizingParameters {
    /// Default constants with a different run-off coefficient
    pub fn with_runoff_coefficient(mut self, coefficient: f64) -> Self {
        self.runoff_coefficient = coefficient;
        self
    }

    /// True when capture is reduced by a run-off coefficient
    pub fn applies_runoff(&self) -> bool {
        self.runoff_coefficient < 1.0
    }

    /// Tariff expressed per cubic meter
    pub fn price_per_cubic_meter(&self) -> f64 {
        self.price_per_liter * crate::units::LITERS_PER_CUBIC_METER
    }

    pub fn validate(&self) -> CalcResult<()> {
        if !self.tank_fraction.is_finite() || self.tank_fraction <= 0.0 || self.tank_fraction > 1.0 {
            return Err(CalcError::invalid_input(
                "tank_fraction",
                self.tank_fraction.to_string(),
                "Tank fraction must be greater than 0 and at most 1",
            ));
        }
        if !self.price_per_liter.is_finite() || self.price_per_liter < 0.0 {
            return Err(CalcError::invalid_input(
                "price_per_liter",
                self.price_per_liter.to_string(),
                "Price per liter must be zero or positive",
            ));
        }
        if !self.runoff_coefficient.is_finite()
            || self.runoff_coefficient <= 0.0
            || self.runoff_coefficient > 1.0
        {
            return Err(CalcError::invalid_input(
                "runoff_coefficient",
                self.runoff_coefficient.to_string(),
                "Run-off coefficient must be greater than 0 and at most 1",
            ));
        }
        Ok(())
    }
}

/// Which annual volume bounds the tank size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitingFactor {
    /// Rain capture is smaller than demand
    Capture,
    /// Demand is smaller than (or equal to) rain capture
    Demand,
}

impl LimitingFactor {
    pub fn display_name(&self) -> &'static str {
        match self {
            LimitingFactor::Capture => "captação de chuva",
            LimitingFactor::Demand => "demanda de água",
        }
    }
}

/// Results from a sizing run. Unrounded.
///
/// ## JSON Example
///
/// ```json
/// {
///   "tank_volume_liters": 6570.0,
///   "monthly_savings": 73.0,
///   "monthly_capture_avg_liters": 13333.333333333334,
///   "monthly_demand_liters": 9125.0,
///   "autonomy_days": 21.9
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    /// Recommended storage volume (L)
    pub tank_volume_liters: f64,

    /// Estimated tariff savings per month (currency)
    pub monthly_savings: f64,

    /// Average rainwater captured per month (L)
    pub monthly_capture_avg_liters: f64,

    /// Water consumed per month (L)
    pub monthly_demand_liters: f64,

    /// Days a full tank supplies the daily demand
    pub autonomy_days: f64,
}

impl SizingResult {
    /// The annual volume that bounded the design.
    ///
    /// Monthly values are annual values / 12, so comparing them preserves
    /// the annual ordering. Ties go to demand.
    pub fn limiting_factor(&self) -> LimitingFactor {
        if self.monthly_demand_liters <= self.monthly_capture_avg_liters {
            LimitingFactor::Demand
        } else {
            LimitingFactor::Capture
        }
    }

    pub fn tank_volume_m3(&self) -> f64 {
        CubicMeters::from(Liters(self.tank_volume_liters)).value()
    }
}

/// Size a tank with the default constants.
///
/// # Arguments
///
/// * `input` - Region, catchment area and daily demand
/// * `regions` - Rainfall table the region key is resolved against
///
/// # Returns
///
/// * `Ok(SizingResult)` - The five derived metrics
/// * `Err(CalcError::InvalidInput)` - Region missing/unknown, or area/demand
///   not a finite positive number
pub fn calculate(input: &SizingInput, regions: &RegionTable) -> CalcResult<SizingResult> {
    calculate_with(input, regions, &SizingParameters::default())
}

/// Size a tank with explicit constants.
pub fn calculate_with(
    input: &SizingInput,
    regions: &RegionTable,
    params: &SizingParameters,
) -> CalcResult<SizingResult> {
    input.validate(regions)?;
    params.validate()?;

    let region = regions.lookup(&input.region)?;
    let daily_demand = input.daily_demand();

    let annual_capture: Liters = region.annual_rainfall() * input.catchment_area() * params.runoff_coefficient;
    let monthly_capture = annual_capture.per_month();

    let annual_demand = daily_demand.over_year();
    let monthly_demand = annual_demand.per_month();

    let tank_volume = annual_capture.min(annual_demand) * params.tank_fraction;
    let monthly_used = monthly_capture.min(monthly_demand);
    let monthly_savings = monthly_used.value() * params.price_per_liter;
    let autonomy: Days = tank_volume / daily_demand;

    log::debug!(
        "sized tank for region '{}': capture {:.1} L/yr, demand {:.1} L/yr, tank {:.1} L",
        region.key,
        annual_capture.value(),
        annual_demand.value(),
        tank_volume.value()
    );

    Ok(SizingResult {
        tank_volume_liters: tank_volume.value(),
        monthly_savings,
        monthly_capture_avg_liters: monthly_capture.value(),
        monthly_demand_liters: monthly_demand.value(),
        autonomy_days: autonomy.value(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::RegionRainfall;
    use proptest::prelude::*;

    fn test_regions() -> RegionTable {
        RegionTable::new(vec![
            RegionRainfall::new("chuvosa", "Região Chuvosa", 1600.0),
            RegionRainfall::new("seca", "Região Seca", 400.0),
        ])
        .unwrap()
    }

    fn reference_scenario() -> SizingInput {
        SizingInput::new("chuvosa", 100.0, 300.0)
    }

    #[test]
    fn test_reference_scenario() {
        let result = calculate(&reference_scenario(), &test_regions()).unwrap();

        // capture = 1600 * 100 = 160,000 L; demand = 300 * 365 = 109,500 L
        assert!((result.tank_volume_liters - 6570.0).abs() < 1e-6);
        assert!((result.monthly_capture_avg_liters - 13_333.333).abs() < 0.001);
        assert!((result.monthly_demand_liters - 9125.0).abs() < 1e-9);
        assert!((result.monthly_savings - 73.0).abs() < 1e-9);
        assert!((result.autonomy_days - 21.9).abs() < 1e-9);
        assert_eq!(result.limiting_factor(), LimitingFactor::Demand);
    }

    #[test]
    fn test_capture_limited_scenario() {
        // capture = 400 * 50 = 20,000 L < demand = 200 * 365 = 73,000 L
        let input = SizingInput::new("seca", 50.0, 200.0);
        let result = calculate(&input, &test_regions()).unwrap();

        assert!((result.tank_volume_liters - 1200.0).abs() < 1e-9);
        assert!((result.monthly_savings - 20_000.0 / 12.0 * 0.008).abs() < 1e-9);
        assert!((result.autonomy_days - 6.0).abs() < 1e-9);
        assert_eq!(result.limiting_factor(), LimitingFactor::Capture);
    }

    #[test]
    fn test_equal_capture_and_demand_is_demand_limited() {
        // capture = 365 * 100 = 36,500 L = demand = 100 * 365
        let regions = RegionTable::new(vec![RegionRainfall::new("r", "R", 365.0)]).unwrap();
        let result = calculate(&SizingInput::new("r", 100.0, 100.0), &regions).unwrap();

        assert_eq!(result.monthly_capture_avg_liters, result.monthly_demand_liters);
        assert_eq!(result.limiting_factor(), LimitingFactor::Demand);
        assert!((result.tank_volume_liters - 2190.0).abs() < 1e-9);
    }

    #[test]
    fn test_tank_volume_m3() {
        let result = calculate(&reference_scenario(), &test_regions()).unwrap();
        assert!((result.tank_volume_m3() - 6.57).abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_rejected() {
        let mut input = reference_scenario();
        input.catchment_area_m2 = 0.0;
        let err = calculate(&input, &test_regions()).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "catchment_area_m2"));
    }

    #[test]
    fn test_zero_demand_rejected() {
        let mut input = reference_scenario();
        input.daily_demand_liters = 0.0;
        let err = calculate(&input, &test_regions()).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "daily_demand_liters"));
    }

    #[test]
    fn test_negative_and_non_finite_rejected() {
        for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut input = reference_scenario();
            input.catchment_area_m2 = bad;
            assert!(calculate(&input, &test_regions()).is_err(), "area {} accepted", bad);

            let mut input = reference_scenario();
            input.daily_demand_liters = bad;
            assert!(calculate(&input, &test_regions()).is_err(), "demand {} accepted", bad);
        }
    }

    #[test]
    fn test_unselected_region_rejected() {
        let mut input = reference_scenario();
        input.region = String::new();
        let err = calculate(&input, &test_regions()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_unknown_region_rejected() {
        let mut input = reference_scenario();
        input.region = "sul".to_string();
        assert!(calculate(&input, &test_regions()).is_err());
    }

    #[test]
    fn test_documented_runoff_coefficient_reduces_capture() {
        let params = SizingParameters::default().with_runoff_coefficient(DOCUMENTED_RUNOFF_COEFFICIENT);
        let result = calculate_with(&reference_scenario(), &test_regions(), &params).unwrap();

        // capture = 160,000 * 0.85 = 136,000 L, still above demand
        assert!((result.monthly_capture_avg_liters - 136_000.0 / 12.0).abs() < 1e-6);
        assert!((result.tank_volume_liters - 6570.0).abs() < 1e-6);
        assert!(params.applies_runoff());
        assert!(!SizingParameters::default().applies_runoff());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let input = reference_scenario();
        let regions = test_regions();

        let mut params = SizingParameters::default();
        params.tank_fraction = 0.0;
        assert!(calculate_with(&input, &regions, &params).is_err());

        let mut params = SizingParameters::default();
        params.price_per_liter = -0.01;
        assert!(calculate_with(&input, &regions, &params).is_err());

        let params = SizingParameters::default().with_runoff_coefficient(1.2);
        assert!(calculate_with(&input, &regions, &params).is_err());
    }

    #[test]
    fn test_price_per_cubic_meter() {
        assert!((SizingParameters::default().price_per_cubic_meter() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_parameters_deserialize_with_defaults() {
        let params: SizingParameters = serde_json::from_str(r#"{"runoff_coefficient": 0.85}"#).unwrap();
        assert_eq!(params.tank_fraction, DEFAULT_TANK_FRACTION);
        assert_eq!(params.price_per_liter, DEFAULT_PRICE_PER_LITER);
        assert_eq!(params.runoff_coefficient, 0.85);
    }

    #[test]
    fn test_result_serialization() {
        let result = calculate(&reference_scenario(), &test_regions()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("tank_volume_liters"));
        assert!(json.contains("autonomy_days"));
        let roundtrip: SizingResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, roundtrip);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        #[test]
        fn property_tank_volume_formula(
            rain in 1.0f64..4000.0,
            area in 0.1f64..5000.0,
            demand in 0.1f64..10_000.0,
        ) {
            let regions = RegionTable::new(vec![RegionRainfall::new("r", "R", rain)]).unwrap();
            let result = calculate(&SizingInput::new("r", area, demand), &regions).unwrap();

            let expected_tank = 0.06 * (rain * area).min(demand * 365.0);
            let expected_savings = (rain * area / 12.0).min(demand * 365.0 / 12.0) * 0.008;
            prop_assert!((result.tank_volume_liters - expected_tank).abs() <= expected_tank * 1e-12);
            prop_assert!((result.monthly_savings - expected_savings).abs() <= expected_savings * 1e-12);
            prop_assert_eq!(result.autonomy_days, result.tank_volume_liters / demand);
        }

        #[test]
        fn property_area_monotonic(
            rain in 1.0f64..4000.0,
            area in 0.1f64..5000.0,
            extra in 0.0f64..5000.0,
            demand in 0.1f64..10_000.0,
        ) {
            let regions = RegionTable::new(vec![RegionRainfall::new("r", "R", rain)]).unwrap();
            let small = calculate(&SizingInput::new("r", area, demand), &regions).unwrap();
            let large = calculate(&SizingInput::new("r", area + extra, demand), &regions).unwrap();
            prop_assert!(large.tank_volume_liters >= small.tank_volume_liters);
            prop_assert!(large.tank_volume_liters <= 0.06 * demand * 365.0 * (1.0 + 1e-12));
        }

        #[test]
        fn property_idempotent(
            rain in 1.0f64..4000.0,
            area in 0.1f64..5000.0,
            demand in 0.1f64..10_000.0,
        ) {
            let regions = RegionTable::new(vec![RegionRainfall::new("r", "R", rain)]).unwrap();
            let input = SizingInput::new("r", area, demand);
            let first = calculate(&input, &regions).unwrap();
            let second = calculate(&input, &regions).unwrap();
            prop_assert_eq!(first.tank_volume_liters.to_bits(), second.tank_volume_liters.to_bits());
            prop_assert_eq!(first.monthly_savings.to_bits(), second.monthly_savings.to_bits());
            prop_assert_eq!(first.monthly_capture_avg_liters.to_bits(), second.monthly_capture_avg_liters.to_bits());
            prop_assert_eq!(first.monthly_demand_liters.to_bits(), second.monthly_demand_liters.to_bits());
            prop_assert_eq!(first.autonomy_days.to_bits(), second.autonomy_days.to_bits());
        }
    }
}
