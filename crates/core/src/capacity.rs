// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only access to facility capacity and pricing.

use fieldbook_domain::{DomainError, Facility, FacilityId, FieldType, Money};
use std::collections::HashMap;

/// Read-only access to facility metadata.
///
/// Implementations must be side-effect free. Facility metadata is owned by
/// an external collaborator; this system never writes it.
pub trait CapacityProvider {
    /// Looks up a facility.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::FacilityNotFound` if the facility is unknown.
    fn facility(&self, facility_id: &FacilityId) -> Result<&Facility, DomainError>;

    /// Returns the configured instance count for a field type.
    ///
    /// # Errors
    ///
    /// Returns an error if the facility is unknown or does not offer the
    /// field type.
    fn capacity(&self, facility_id: &FacilityId, field_type: &FieldType) -> Result<u32, DomainError> {
        self.facility(facility_id)?.instance_count(field_type)
    }

    /// Returns the hourly price for a field type.
    ///
    /// # Errors
    ///
    /// Returns an error if the facility is unknown or does not offer the
    /// field type.
    fn price_per_hour(
        &self,
        facility_id: &FacilityId,
        field_type: &FieldType,
    ) -> Result<Money, DomainError> {
        self.facility(facility_id)?.price_per_hour(field_type)
    }
}

/// An immutable in-memory facility catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    facilities: HashMap<FacilityId, Facility>,
}

impl Catalog {
    /// Builds a catalog from validated facilities.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFacilityId` if two facilities share an id.
    pub fn new(facilities: Vec<Facility>) -> Result<Self, DomainError> {
        let mut by_id: HashMap<FacilityId, Facility> = HashMap::with_capacity(facilities.len());
        for facility in facilities {
            let id: FacilityId = facility.id().clone();
            if by_id.insert(id.clone(), facility).is_some() {
                return Err(DomainError::InvalidFacilityId(format!(
                    "Facility id '{id}' is listed more than once"
                )));
            }
        }
        Ok(Self { facilities: by_id })
    }

    /// Returns all facilities, ordered by id.
    #[must_use]
    pub fn facilities(&self) -> Vec<&Facility> {
        let mut facilities: Vec<&Facility> = self.facilities.values().collect();
        facilities.sort_by(|a, b| a.id().cmp(b.id()));
        facilities
    }

    /// Returns the number of facilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Returns true if the catalog has no facilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

impl CapacityProvider for Catalog {
    fn facility(&self, facility_id: &FacilityId) -> Result<&Facility, DomainError> {
        self.facilities
            .get(facility_id)
            .ok_or_else(|| DomainError::FacilityNotFound(facility_id.to_string()))
    }
}
