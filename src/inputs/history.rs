//! Derive past-year costs from the current cost and renewal history
//!
//! Used to pre-fill the historical cost fields. The simulation's own
//! what-if savings run on whatever historical costs end up supplied.

use super::SimulationInputs;

/// Whether derived history overrides caller-supplied history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    /// Derived values replace the historical cost fields
    #[default]
    Locked,
    /// Caller-supplied values are kept as-is
    Editable,
}

/// Walk backward from the current cost through each renewal increase
///
/// `renewals` is positional, most recent first. Renewals above 1 are read
/// as percentages, otherwise as fractions. Nothing is derived unless both
/// the current cost and the most recent renewal are positive; later
/// non-positive renewals are skipped.
pub fn derive_historical_costs(current_cost: f64, renewals: &[f64]) -> Vec<f64> {
    match renewals.first() {
        Some(&latest) if current_cost > 0.0 && latest > 0.0 => {}
        _ => return Vec::new(),
    }

    let mut prev = current_cost;
    renewals
        .iter()
        .filter(|&&r| r > 0.0)
        .take(3)
        .map(|&r| if r > 1.0 { r / 100.0 } else { r })
        .map(|rate| {
            prev /= 1.0 + rate;
            prev
        })
        .collect()
}

impl SimulationInputs {
    /// Fill historical cost fields from the renewal history according to `policy`
    ///
    /// Returns the derived costs whether or not they were applied.
    pub fn apply_derived_history(&mut self, policy: HistoryPolicy) -> Vec<f64> {
        let current_cost = super::parse_or_zero(self.current_cost.as_ref());
        let renewals = [&self.renewal1, &self.renewal2, &self.renewal3]
            .map(|f| super::parse_or_zero(f.as_ref()));
        let derived = derive_historical_costs(current_cost, &renewals);

        if policy == HistoryPolicy::Locked && !derived.is_empty() {
            log::debug!("pre-filling {} historical costs from renewals", derived.len());
            self.set_historical_costs(&derived);
        }

        derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_walks_backward_through_renewals() {
        let costs = derive_historical_costs(110_250.0, &[5.0, 5.0]);
        assert_eq!(costs.len(), 2);
        assert_relative_eq!(costs[0], 105_000.0, max_relative = 1e-12);
        assert_relative_eq!(costs[1], 100_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_fraction_and_percent_forms_agree() {
        let pct = derive_historical_costs(100_000.0, &[10.0]);
        let frac = derive_historical_costs(100_000.0, &[0.10]);
        assert_relative_eq!(pct[0], frac[0], max_relative = 1e-12);
    }

    #[test]
    fn test_nothing_derived_without_cost_or_renewals() {
        assert!(derive_historical_costs(0.0, &[5.0]).is_empty());
        assert!(derive_historical_costs(100_000.0, &[]).is_empty());
        assert!(derive_historical_costs(100_000.0, &[0.0, -3.0]).is_empty());
    }

    #[test]
    fn test_nothing_derived_without_latest_renewal() {
        assert!(derive_historical_costs(100_000.0, &[0.0, 5.0, 6.0]).is_empty());
        assert!(derive_historical_costs(100_000.0, &[-2.0, 5.0]).is_empty());

        let costs = derive_historical_costs(100_000.0, &[5.0, 0.0, 5.0]);
        assert_eq!(costs.len(), 2);
        assert_relative_eq!(costs[1], 100_000.0 / 1.05 / 1.05, max_relative = 1e-12);
    }

    #[test]
    fn test_missing_latest_renewal_keeps_supplied_history() {
        let mut inputs = SimulationInputs {
            current_cost: Some(100_000.0.into()),
            renewal2: Some(5.0.into()),
            historical_cost1: Some(90_000.0.into()),
            ..Default::default()
        };

        let derived = inputs.apply_derived_history(HistoryPolicy::Locked);
        assert!(derived.is_empty());
        assert_eq!(inputs.parse().historical_costs, vec![90_000.0]);
    }

    #[test]
    fn test_locked_overrides_editable_keeps() {
        let base = SimulationInputs {
            current_cost: Some(100_000.0.into()),
            renewal1: Some(5.0.into()),
            historical_cost1: Some(1.0.into()),
            historical_cost2: Some(2.0.into()),
            ..Default::default()
        };

        let mut locked = base.clone();
        let derived = locked.apply_derived_history(HistoryPolicy::Locked);
        assert_eq!(derived.len(), 1);
        assert_eq!(locked.parse().historical_costs, derived);

        let mut editable = base.clone();
        editable.apply_derived_history(HistoryPolicy::Editable);
        assert_eq!(editable.parse().historical_costs, vec![1.0, 2.0]);
    }
}
