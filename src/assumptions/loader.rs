//! CSV-based constants loader
//!
//! Reads the constants table export:
//! `constant_name,constant_value,description,active,category`

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::DoctrineConstants;
use crate::error::{Error, Result};

/// Default path to the constants table
pub const DEFAULT_CONSTANTS_PATH: &str = "data/montecarlo_constants.csv";

/// Raw CSV row matching the constants table columns
#[derive(Debug, Deserialize)]
struct ConstantRow {
    constant_name: String,
    #[serde(default)]
    constant_value: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    category: Option<String>,
}

/// Load constants from a CSV file, starting from the doctrine defaults
pub fn load_constants(path: &Path) -> Result<DoctrineConstants> {
    let file = File::open(path).map_err(|source| Error::ConstantsIo {
        path: path.to_path_buf(),
        source,
    })?;
    load_constants_from_reader(file)
}

/// Load constants from any CSV source
pub fn load_constants_from_reader<R: Read>(reader: R) -> Result<DoctrineConstants> {
    let mut constants = DoctrineConstants::doctrine();
    let mut reader = csv::Reader::from_reader(reader);

    for result in reader.deserialize() {
        let row: ConstantRow = result?;
        let name = row.constant_name.trim();

        let Some(constant) = constants.get_mut(name) else {
            log::warn!("ignoring unknown constant {:?}", name);
            continue;
        };

        // A row without a value cannot override anything
        let Some(value) = row.constant_value else {
            constant.active = false;
            continue;
        };

        if !(0.0..=1.0).contains(&value) {
            return Err(Error::ConstantOutOfRange {
                name: name.to_string(),
                value,
            });
        }

        constant.value = value;
        constant.active = row.active.unwrap_or(true);
        if let Some(description) = row.description.filter(|d| !d.is_empty()) {
            constant.description = description;
        }
        if let Some(category) = row.category.filter(|c| !c.is_empty()) {
            constant.category = category;
        }
    }

    Ok(constants)
}
