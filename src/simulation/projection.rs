//! Deterministic what-if and forward projections
//!
//! Neither is sampled. Historical costs are known, and the forward point
//! uses the mean renewal rate, so its values will not match the simulated
//! means exactly.

use serde::{Deserialize, Serialize};

use super::discount::DiscountStack;
use super::volatility::mean;

/// One historical year run through the discount stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalYear {
    #[serde(alias = "yearCost")]
    pub year_cost: f64,
    pub self_if_in_place: f64,
    pub ref_if_in_place: f64,
    pub map_if_in_place: f64,
}

impl HistoricalYear {
    /// What the full stack would have saved that year
    pub fn savings(&self) -> f64 {
        self.year_cost - self.map_if_in_place
    }
}

/// Apply the stack to each historical cost, keeping input order
pub fn back_project(costs: &[f64], stack: &DiscountStack) -> Vec<HistoricalYear> {
    costs
        .iter()
        .map(|&year_cost| {
            let tiers = stack.apply(year_cost);
            HistoricalYear {
                year_cost,
                self_if_in_place: tiers.self_insured,
                ref_if_in_place: tiers.reference_based,
                map_if_in_place: tiers.map_drug,
            }
        })
        .collect()
}

pub fn total_savings(years: &[HistoricalYear]) -> f64 {
    years.iter().map(HistoricalYear::savings).sum()
}

/// Next-year point estimate per scenario tier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForwardProjection {
    pub baseline: f64,
    pub self_insured: f64,
    pub reference: f64,
    pub map_drug: f64,
}

/// `current_cost * (1 + mean renewal)`, then the discount stack
pub fn project_forward(
    current_cost: f64,
    renewals: &[f64],
    stack: &DiscountStack,
) -> ForwardProjection {
    let next_year = current_cost * (1.0 + mean(renewals));
    let tiers = stack.apply(next_year);

    ForwardProjection {
        baseline: next_year,
        self_insured: tiers.self_insured,
        reference: tiers.reference_based,
        map_drug: tiers.map_drug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ProgramToggles;
    use approx::assert_relative_eq;

    #[test]
    fn test_back_projection_per_year() {
        let stack = DiscountStack::doctrine(ProgramToggles::all());
        let years = back_project(&[100_000.0, 90_000.0], &stack);

        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year_cost, 100_000.0);
        assert_relative_eq!(years[0].self_if_in_place, 75_000.0, max_relative = 1e-12);
        assert_relative_eq!(years[0].ref_if_in_place, 63_750.0, max_relative = 1e-12);
        assert_relative_eq!(years[0].map_if_in_place, 40_800.0, max_relative = 1e-12);

        // 59.2% saved each year
        assert_relative_eq!(total_savings(&years), 0.592 * 190_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_no_history_no_savings() {
        let stack = DiscountStack::doctrine(ProgramToggles::all());
        assert!(back_project(&[], &stack).is_empty());
        assert_eq!(total_savings(&[]), 0.0);
    }

    #[test]
    fn test_forward_uses_mean_growth() {
        let stack = DiscountStack::doctrine(ProgramToggles::all());
        let p = project_forward(100_000.0, &[0.05, 0.07, 0.06], &stack);

        assert_relative_eq!(p.baseline, 106_000.0, max_relative = 1e-12);
        assert_relative_eq!(p.self_insured, 79_500.0, max_relative = 1e-12);
        assert_relative_eq!(p.reference, 67_575.0, max_relative = 1e-12);
        assert_relative_eq!(p.map_drug, 43_248.0, max_relative = 1e-12);
    }

    #[test]
    fn test_forward_without_renewals_is_flat() {
        let stack = DiscountStack::doctrine(ProgramToggles::none());
        let p = project_forward(50_000.0, &[], &stack);
        assert_eq!(p.baseline, 50_000.0);
        assert_eq!(p.map_drug, 50_000.0);
    }
}
