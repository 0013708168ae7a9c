//! Human-readable summary of a simulation result

use super::bad_year::{BadYearSettings, BadYearStats};
use super::discount::{DiscountLayer, DiscountStack};
use super::projection::ForwardProjection;

/// US currency with thousands separators, e.g. `$1,234.56` / `-$1,234.56`
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Everything the narrative reports on
pub struct NarrativeInputs<'a> {
    pub stack: &'a DiscountStack,
    pub historical_years: usize,
    pub total_historical_savings: f64,
    pub projection: &'a ForwardProjection,
    pub bad_years: &'a BadYearStats,
    pub bad_year_settings: &'a BadYearSettings,
    pub iterations: usize,
}

/// Build the narrative block shown to prospects
pub fn synthesize(n: &NarrativeInputs<'_>) -> String {
    let programs: Vec<String> = n.stack.active_layers().map(DiscountLayer::label).collect();
    let programs = if programs.is_empty() {
        "None".to_string()
    } else {
        programs.join(", ")
    };

    let history = if n.historical_years > 0 {
        format!(
            "Had these programs been active over the past {} year{}, total savings ≈ {}.",
            n.historical_years,
            if n.historical_years == 1 { "" } else { "s" },
            format_currency(n.total_historical_savings)
        )
    } else {
        "No historical costs were supplied for a what-if comparison.".to_string()
    };

    let p = n.projection;
    let b = n.bad_years;

    format!(
        "Applied programs: {programs}.\n\n\
         {history}\n\
         Looking ahead, current projection ≈ {}; with sequential savings: self-insured ≈ {}; reference ≈ {}; MAP Drug ≈ {}.\n\n\
         Bad Year Impact: In {} of {} simulations ({:.1}%), costs spiked by an average of {:.1}% ({:.0}–{:.0}% range). \
         This added approximately {} in unexpected costs across all simulations, averaging {} per bad year event. \
         At 1 in {} years, the chance of at least one bad year over the next 3 years is {:.1}%.",
        format_currency(p.baseline),
        format_currency(p.self_insured),
        format_currency(p.reference),
        format_currency(p.map_drug),
        b.count,
        n.iterations,
        b.share_of(n.iterations) * 100.0,
        b.avg_spike_pct,
        n.bad_year_settings.increase_min * 100.0,
        n.bad_year_settings.increase_max * 100.0,
        format_currency(b.total_extra_cost),
        format_currency(b.avg_extra_per_bad_year),
        b.frequency,
        b.three_year_probability() * 100.0,
    )
}
