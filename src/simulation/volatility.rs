//! Volatility estimate for the per-iteration cost multiplier

/// Used when there is neither an override nor any renewal history
pub const DEFAULT_VOLATILITY: f64 = 0.15;

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around the mean, 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Volatility fraction for the sampler
///
/// An override is returned unchanged. Otherwise the population standard
/// deviation of the renewal fractions, or [`DEFAULT_VOLATILITY`] when there
/// are none. Three points rarely make a meaningful deviation; the formula is
/// kept as-is so results line up with existing sales configurations.
pub fn estimate_volatility(renewals: &[f64], override_volatility: Option<f64>) -> f64 {
    match override_volatility {
        Some(v) => v,
        None if renewals.is_empty() => DEFAULT_VOLATILITY,
        None => population_std_dev(renewals),
    }
}
