//! Doctrine constants for the discount programs
//!
//! The literal defaults below are the sales doctrine. A constants table can
//! override any of them; an inactive or missing row keeps the default.

pub mod loader;

pub use loader::{load_constants, load_constants_from_reader, DEFAULT_CONSTANTS_PATH};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Share of total cost that is drug spend
pub const DEFAULT_DRUG_PCT: f64 = 0.60;
/// Self-insured discount on total cost
pub const DEFAULT_SELF_INSURED_DISCOUNT: f64 = 0.25;
/// Reference-based pricing discount on total cost
pub const DEFAULT_REFERENCE_DISCOUNT: f64 = 0.15;
/// MAP discount on the drug share
pub const DEFAULT_MAP_DISCOUNT: f64 = 0.60;

/// One named, toggleable constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedConstant {
    pub name: String,
    pub value: f64,
    pub default: f64,
    pub description: String,
    pub active: bool,
    pub category: String,
}

impl NamedConstant {
    fn doctrine(name: &str, default: f64, description: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            value: default,
            default,
            description: description.to_string(),
            active: true,
            category: category.to_string(),
        }
    }

    /// Value used by the engine: the override when active, else the default
    pub fn effective(&self) -> f64 {
        if self.active {
            self.value
        } else {
            self.default
        }
    }
}

/// Container for all discount constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctrineConstants {
    pub drug_pct: NamedConstant,
    pub self_insured_discount: NamedConstant,
    pub reference_discount: NamedConstant,
    pub map_discount: NamedConstant,
}

impl DoctrineConstants {
    /// Constants matching the sales doctrine
    pub fn doctrine() -> Self {
        Self {
            drug_pct: NamedConstant::doctrine(
                "drug_pct",
                DEFAULT_DRUG_PCT,
                "Share of total cost attributed to drug spend",
                "assumption",
            ),
            self_insured_discount: NamedConstant::doctrine(
                "self_insured_discount",
                DEFAULT_SELF_INSURED_DISCOUNT,
                "Savings from moving to a self-insured plan",
                "discount",
            ),
            reference_discount: NamedConstant::doctrine(
                "rbp_discount",
                DEFAULT_REFERENCE_DISCOUNT,
                "Savings from reference-based pricing",
                "discount",
            ),
            map_discount: NamedConstant::doctrine(
                "map_discount",
                DEFAULT_MAP_DISCOUNT,
                "Savings on drug spend from the MAP program",
                "discount",
            ),
        }
    }

    /// Load overrides from a constants CSV in the default location
    pub fn from_csv() -> crate::Result<Self> {
        Self::from_csv_path(Path::new(DEFAULT_CONSTANTS_PATH))
    }

    /// Load overrides from a constants CSV at `path`
    pub fn from_csv_path(path: &Path) -> crate::Result<Self> {
        load_constants(path)
    }

    /// Look up a constant by its table name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut NamedConstant> {
        self.iter_mut().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedConstant> {
        [
            &self.drug_pct,
            &self.self_insured_discount,
            &self.reference_discount,
            &self.map_discount,
        ]
        .into_iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut NamedConstant> {
        [
            &mut self.drug_pct,
            &mut self.self_insured_discount,
            &mut self.reference_discount,
            &mut self.map_discount,
        ]
        .into_iter()
    }
}

impl Default for DoctrineConstants {
    fn default() -> Self {
        Self::doctrine()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctrine_values() {
        let c = DoctrineConstants::doctrine();
        assert_eq!(c.self_insured_discount.effective(), 0.25);
        assert_eq!(c.reference_discount.effective(), 0.15);
        assert_eq!(c.map_discount.effective(), 0.60);
        assert_eq!(c.drug_pct.effective(), 0.60);
    }

    #[test]
    fn test_inactive_constant_uses_default() {
        let mut c = DoctrineConstants::doctrine();
        let map = c.get_mut("map_discount").unwrap();
        map.value = 0.40;
        assert_eq!(map.effective(), 0.40);

        map.active = false;
        assert_eq!(map.effective(), DEFAULT_MAP_DISCOUNT);
    }

    #[test]
    fn test_unknown_name_not_found() {
        let mut c = DoctrineConstants::doctrine();
        assert!(c.get_mut("hospital_pct").is_none());
    }
}
