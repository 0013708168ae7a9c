//! Sequential discount stacking
//!
//! Programs apply in a fixed order (self-insured, reference-based, MAP),
//! each multiplying the running cost left by the previous one. A disabled
//! layer passes the running cost through unchanged, so every tier always
//! has a value.

use serde::{Deserialize, Serialize};

use crate::assumptions::DoctrineConstants;

/// Discount programs in stacking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Program {
    SelfInsured,
    ReferenceBased,
    MapDrug,
}

/// Which programs the operator switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgramToggles {
    pub self_insured: bool,
    pub reference_based: bool,
    pub map: bool,
}

impl ProgramToggles {
    pub fn all() -> Self {
        Self {
            self_insured: true,
            reference_based: true,
            map: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.self_insured || self.reference_based || self.map
    }
}

/// One step of the stack: `cost *= 1 - rate * applies_to` when enabled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountLayer {
    pub program: Program,
    pub enabled: bool,
    /// Discount on the affected share
    pub rate: f64,
    /// Share of total cost the discount touches (1.0 = all of it)
    pub applies_to: f64,
}

impl DiscountLayer {
    pub fn factor(&self) -> f64 {
        if self.enabled {
            1.0 - self.rate * self.applies_to
        } else {
            1.0
        }
    }

    /// Display name with the discount, e.g. "Self-Insured (-25%)"
    pub fn label(&self) -> String {
        match self.program {
            Program::SelfInsured => format!("Self-Insured (-{}%)", whole_percent(self.rate)),
            Program::ReferenceBased => {
                format!("Reference-Based Pricing (-{}%)", whole_percent(self.rate))
            }
            Program::MapDrug => format!(
                "MAP Drug Savings (-{}% of {}% drug spend)",
                whole_percent(self.rate),
                whole_percent(self.applies_to)
            ),
        }
    }
}

fn whole_percent(fraction: f64) -> String {
    let pct = (fraction * 10_000.0).round() / 100.0;
    if pct.fract() == 0.0 {
        format!("{:.0}", pct)
    } else {
        format!("{}", pct)
    }
}

/// Costs after each layer, in stacking order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierCosts {
    pub self_insured: f64,
    pub reference_based: f64,
    pub map_drug: f64,
}

/// The ordered discount layers for one run
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountStack {
    layers: [DiscountLayer; 3],
}

impl DiscountStack {
    pub fn new(constants: &DoctrineConstants, toggles: ProgramToggles) -> Self {
        Self {
            layers: [
                DiscountLayer {
                    program: Program::SelfInsured,
                    enabled: toggles.self_insured,
                    rate: constants.self_insured_discount.effective(),
                    applies_to: 1.0,
                },
                DiscountLayer {
                    program: Program::ReferenceBased,
                    enabled: toggles.reference_based,
                    rate: constants.reference_discount.effective(),
                    applies_to: 1.0,
                },
                DiscountLayer {
                    program: Program::MapDrug,
                    enabled: toggles.map,
                    rate: constants.map_discount.effective(),
                    applies_to: constants.drug_pct.effective(),
                },
            ],
        }
    }

    /// Doctrine constants with the given toggles
    pub fn doctrine(toggles: ProgramToggles) -> Self {
        Self::new(&DoctrineConstants::doctrine(), toggles)
    }

    pub fn layers(&self) -> &[DiscountLayer] {
        &self.layers
    }

    pub fn active_layers(&self) -> impl Iterator<Item = &DiscountLayer> {
        self.layers.iter().filter(|l| l.enabled)
    }

    /// Run `cost` through the layers, keeping the running cost after each
    pub fn apply(&self, cost: f64) -> TierCosts {
        let mut tiers = [cost; 3];
        let mut running = cost;
        for (layer, slot) in self.layers.iter().zip(tiers.iter_mut()) {
            running *= layer.factor();
            *slot = running;
        }

        let [self_insured, reference_based, map_drug] = tiers;
        TierCosts {
            self_insured,
            reference_based,
            map_drug,
        }
    }
}
