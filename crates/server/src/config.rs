// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility catalog loading.
//!
//! The catalog is a JSON document:
//!
//! ```json
//! {
//!   "facilities": [
//!     {
//!       "id": "central",
//!       "name": "Complejo Central",
//!       "opening": "08:00",
//!       "closing": "23:00",
//!       "fields": {
//!         "5v5": { "instances": 3, "price_per_hour": "25.00" }
//!       }
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use fieldbook::Catalog;
use fieldbook_domain::{
    DomainError, Facility, FacilityId, FieldType, Money, parse_time,
};
use serde::Deserialize;

/// Errors raised while loading the catalog.
#[derive(Debug)]
pub enum ConfigError {
    /// The catalog file could not be read.
    Io(std::io::Error),
    /// The catalog file is not valid JSON for the expected shape.
    Parse(serde_json::Error),
    /// A facility entry failed validation.
    Invalid {
        /// The offending facility id.
        facility_id: String,
        /// The validation failure.
        error: DomainError,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Failed to read catalog: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse catalog: {e}"),
            Self::Invalid { facility_id, error } => {
                write!(f, "Invalid facility '{facility_id}': {error}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    facilities: Vec<FacilityEntry>,
}

#[derive(Debug, Deserialize)]
struct FacilityEntry {
    id: String,
    name: String,
    opening: String,
    closing: String,
    fields: BTreeMap<String, FieldEntry>,
}

#[derive(Debug, Deserialize)]
struct FieldEntry {
    instances: u32,
    price_per_hour: String,
}

impl FacilityEntry {
    fn into_facility(self) -> Result<Facility, DomainError> {
        let mut counts: BTreeMap<FieldType, u32> = BTreeMap::new();
        let mut prices: BTreeMap<FieldType, Money> = BTreeMap::new();
        for (name, field) in self.fields {
            let field_type: FieldType = FieldType::new(&name)?;
            prices.insert(field_type.clone(), Money::parse(&field.price_per_hour)?);
            counts.insert(field_type, field.instances);
        }

        Facility::new(
            FacilityId::new(&self.id)?,
            &self.name,
            parse_time(&self.opening)?,
            parse_time(&self.closing)?,
            counts,
            prices,
        )
    }
}

/// Parses a catalog document.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, a facility is invalid, or two
/// facilities share an id.
pub fn parse_catalog(json: &str) -> Result<Catalog, ConfigError> {
    let file: CatalogFile = serde_json::from_str(json).map_err(ConfigError::Parse)?;

    let mut facilities: Vec<Facility> = Vec::with_capacity(file.facilities.len());
    for entry in file.facilities {
        let facility_id: String = entry.id.clone();
        facilities.push(
            entry
                .into_facility()
                .map_err(|error| ConfigError::Invalid { facility_id, error })?,
        );
    }

    Catalog::new(facilities).map_err(|error| ConfigError::Invalid {
        facility_id: String::from("<catalog>"),
        error,
    })
}

/// Reads and parses a catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let json: String = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_catalog(&json)
}

const DEMO_CATALOG: &str = r#"{
  "facilities": [
    {
      "id": "central",
      "name": "Complejo Central",
      "opening": "08:00",
      "closing": "23:00",
      "fields": {
        "5v5": { "instances": 3, "price_per_hour": "25.00" },
        "7v7": { "instances": 2, "price_per_hour": "40.00" },
        "padel": { "instances": 4, "price_per_hour": "12.50" }
      }
    }
  ]
}"#;

/// The catalog used when no file is configured.
///
/// # Errors
///
/// Never fails in practice; the built-in document is validated like any other.
pub fn demo_catalog() -> Result<Catalog, ConfigError> {
    parse_catalog(DEMO_CATALOG)
}
