//! Caller-supplied simulation inputs and their coercion rules
//!
//! Form submissions deliver numbers as JSON numbers or as strings. Every
//! numeric field goes through the same parse-or-zero rule; nothing here
//! returns an error.

mod history;

pub use history::{derive_historical_costs, HistoryPolicy};

use serde::{Deserialize, Serialize};

use crate::simulation::{
    BadYearSettings, ProgramToggles, DEFAULT_ITERATIONS, MAX_COST, MAX_ITERATIONS, MAX_RATE,
};

/// A numeric form field that may arrive as a number or as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    /// Parsed value, or `None` when the field is not a finite number
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            NumericField::Number(n) => Some(*n),
            NumericField::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed.filter(|v| v.is_finite())
    }
}

impl From<f64> for NumericField {
    fn from(value: f64) -> Self {
        NumericField::Number(value)
    }
}

impl From<&str> for NumericField {
    fn from(value: &str) -> Self {
        NumericField::Text(value.to_string())
    }
}

/// Parse-or-zero for an optional field
pub fn parse_or_zero(field: Option<&NumericField>) -> f64 {
    field.and_then(NumericField::value).unwrap_or(0.0)
}

/// Raw inputs for one "Run Simulation" action
///
/// Field aliases accept the key names used by the saved workbench payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationInputs {
    /// Renewal rate increases in percent, most recent first
    #[serde(default)]
    pub renewal1: Option<NumericField>,
    #[serde(default)]
    pub renewal2: Option<NumericField>,
    #[serde(default)]
    pub renewal3: Option<NumericField>,

    /// Current annualized cost
    #[serde(default)]
    pub current_cost: Option<NumericField>,

    #[serde(default)]
    pub iterations: Option<NumericField>,

    /// Explicit volatility fraction; skips estimation from renewals
    #[serde(default, alias = "volatility_pct")]
    pub volatility_override: Option<NumericField>,

    /// Actual past-year costs, most recent first
    #[serde(default, alias = "hist_cost1")]
    pub historical_cost1: Option<NumericField>,
    #[serde(default, alias = "hist_cost2")]
    pub historical_cost2: Option<NumericField>,
    #[serde(default, alias = "hist_cost3")]
    pub historical_cost3: Option<NumericField>,

    #[serde(default)]
    pub use_self_insured: bool,
    #[serde(default, alias = "use_rbp")]
    pub use_reference_based: bool,
    #[serde(default)]
    pub use_map: bool,

    /// "1 in N simulated years is a bad year"
    #[serde(default)]
    pub bad_year_frequency: Option<NumericField>,
    /// Spike bounds in percent
    #[serde(default)]
    pub bad_year_increase_min: Option<NumericField>,
    #[serde(default)]
    pub bad_year_increase_max: Option<NumericField>,
}

/// Inputs after coercion, with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInputs {
    /// Renewal rates as fractions; unparsable entries dropped
    pub renewals: Vec<f64>,
    pub current_cost: f64,
    pub iterations: usize,
    pub volatility_override: Option<f64>,
    /// Positive historical costs in input order
    pub historical_costs: Vec<f64>,
    pub toggles: ProgramToggles,
    pub bad_year: BadYearSettings,
}

impl SimulationInputs {
    /// Renewal percentages in input order, unparsable entries dropped
    pub fn renewal_percents(&self) -> Vec<f64> {
        [&self.renewal1, &self.renewal2, &self.renewal3]
            .into_iter()
            .filter_map(|f| f.as_ref().and_then(NumericField::value))
            .collect()
    }

    /// Program toggles as supplied
    pub fn toggles(&self) -> ProgramToggles {
        ProgramToggles {
            self_insured: self.use_self_insured,
            reference_based: self.use_reference_based,
            map: self.use_map,
        }
    }

    /// Replace the historical cost fields with the given values (missing slots cleared)
    pub fn set_historical_costs(&mut self, costs: &[f64]) {
        let slot = |i: usize| costs.get(i).copied().map(NumericField::Number);
        self.historical_cost1 = slot(0);
        self.historical_cost2 = slot(1);
        self.historical_cost3 = slot(2);
    }

    /// Coerce all fields and apply defaults
    pub fn parse(&self) -> ParsedInputs {
        let rate = |r: f64| r.clamp(-MAX_RATE, MAX_RATE);

        let renewals = self
            .renewal_percents()
            .into_iter()
            .map(|p| rate(p / 100.0))
            .collect();

        let current_cost = parse_or_zero(self.current_cost.as_ref()).clamp(0.0, MAX_COST);

        let iterations = match self.iterations.as_ref().and_then(NumericField::value) {
            Some(n) if n >= 1.0 => (n.floor() as usize).min(MAX_ITERATIONS),
            _ => DEFAULT_ITERATIONS,
        };

        let volatility_override = self
            .volatility_override
            .as_ref()
            .and_then(NumericField::value)
            .map(rate);

        let historical_costs = [
            &self.historical_cost1,
            &self.historical_cost2,
            &self.historical_cost3,
        ]
        .into_iter()
        .map(|f| parse_or_zero(f.as_ref()))
        .filter(|&c| c > 0.0)
        .map(|c| c.min(MAX_COST))
        .collect();

        let defaults = BadYearSettings::default();
        let frequency = match self.bad_year_frequency.as_ref().and_then(NumericField::value) {
            Some(n) if n >= 1.0 => n.floor() as usize,
            _ => defaults.frequency,
        };
        let percent_or = |field: &Option<NumericField>, fallback: f64| {
            match field.as_ref().and_then(NumericField::value) {
                Some(p) if p > 0.0 => rate(p / 100.0),
                _ => fallback,
            }
        };

        ParsedInputs {
            renewals,
            current_cost,
            iterations,
            volatility_override,
            historical_costs,
            toggles: self.toggles(),
            bad_year: BadYearSettings {
                frequency,
                increase_min: percent_or(&self.bad_year_increase_min, defaults.increase_min),
                increase_max: percent_or(&self.bad_year_increase_max, defaults.increase_max),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_field_coercion() {
        assert_eq!(NumericField::from(5.0).value(), Some(5.0));
        assert_eq!(NumericField::from(" 7.5 ").value(), Some(7.5));
        assert_eq!(NumericField::from("abc").value(), None);
        assert_eq!(NumericField::from("").value(), None);
        assert_eq!(NumericField::from(f64::NAN).value(), None);
        assert_eq!(parse_or_zero(None), 0.0);
        assert_eq!(parse_or_zero(Some(&NumericField::from("n/a"))), 0.0);
    }

    #[test]
    fn test_defaults_applied() {
        let parsed = SimulationInputs::default().parse();

        assert!(parsed.renewals.is_empty());
        assert_eq!(parsed.current_cost, 0.0);
        assert_eq!(parsed.iterations, DEFAULT_ITERATIONS);
        assert_eq!(parsed.volatility_override, None);
        assert!(parsed.historical_costs.is_empty());
        assert_eq!(parsed.bad_year, BadYearSettings::default());
    }

    #[test]
    fn test_non_positive_iterations_fall_back() {
        for raw in ["0", "-50", "lots"] {
            let inputs = SimulationInputs {
                iterations: Some(raw.into()),
                ..Default::default()
            };
            assert_eq!(inputs.parse().iterations, DEFAULT_ITERATIONS, "iterations = {raw:?}");
        }

        let capped = SimulationInputs {
            iterations: Some(5_000_000.0.into()),
            ..Default::default()
        };
        assert_eq!(capped.parse().iterations, MAX_ITERATIONS);
    }

    #[test]
    fn test_renewals_drop_invalid_not_zero_fill() {
        let inputs = SimulationInputs {
            renewal1: Some("5".into()),
            renewal2: Some("bad".into()),
            renewal3: Some(0.0.into()),
            ..Default::default()
        };
        let parsed = inputs.parse();
        assert_eq!(parsed.renewals, vec![0.05, 0.0]);
    }

    #[test]
    fn test_historical_costs_exclude_non_positive() {
        let inputs = SimulationInputs {
            historical_cost1: Some(95_000.0.into()),
            historical_cost2: Some((-10.0).into()),
            historical_cost3: Some("88000".into()),
            ..Default::default()
        };
        assert_eq!(inputs.parse().historical_costs, vec![95_000.0, 88_000.0]);
    }

    #[test]
    fn test_bad_year_settings_parsed_as_fractions() {
        let inputs = SimulationInputs {
            bad_year_frequency: Some("4".into()),
            bad_year_increase_min: Some(20.0.into()),
            bad_year_increase_max: Some("0".into()),
            ..Default::default()
        };
        let settings = inputs.parse().bad_year;
        assert_eq!(settings.frequency, 4);
        assert!((settings.increase_min - 0.20).abs() < 1e-12);
        assert!((settings.increase_max - 0.40).abs() < 1e-12);
    }

    #[test]
    fn test_huge_values_capped() {
        let inputs = SimulationInputs {
            current_cost: Some("1e308".into()),
            renewal1: Some(1e308.into()),
            volatility_override: Some("1e300".into()),
            historical_cost1: Some("1e308".into()),
            bad_year_increase_max: Some(1e308.into()),
            ..Default::default()
        };
        let parsed = inputs.parse();

        assert_eq!(parsed.current_cost, MAX_COST);
        assert_eq!(parsed.renewals, vec![MAX_RATE]);
        assert_eq!(parsed.volatility_override, Some(MAX_RATE));
        assert_eq!(parsed.historical_costs, vec![MAX_COST]);
        assert_eq!(parsed.bad_year.increase_max, MAX_RATE);
    }

    #[test]
    fn test_deserialize_mixed_payload() {
        let json = r#"{
            "renewal1": "5", "renewal2": 7, "renewal3": null,
            "current_cost": "100000",
            "hist_cost1": 95000,
            "volatility_pct": 0.1,
            "use_self_insured": true, "use_rbp": true
        }"#;
        let inputs: SimulationInputs = serde_json::from_str(json).unwrap();
        let parsed = inputs.parse();

        assert_eq!(parsed.renewals, vec![0.05, 0.07]);
        assert_eq!(parsed.current_cost, 100_000.0);
        assert_eq!(parsed.historical_costs, vec![95_000.0]);
        assert_eq!(parsed.volatility_override, Some(0.1));
        assert!(parsed.toggles.self_insured && parsed.toggles.reference_based);
        assert!(!parsed.toggles.map);
    }
}
