// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility metadata.
//!
//! A facility offers one or more field types, each with a fixed number of
//! interchangeable instances and an hourly price. Metadata is owned by an
//! external catalog; this crate only validates and reads it.

use crate::error::DomainError;
use crate::types::{FacilityId, FieldType, Money, Timeslot};
use std::collections::BTreeMap;
use time::Time;

/// A venue with per-field-type instance counts and prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    id: FacilityId,
    name: String,
    opening: Time,
    closing: Time,
    instance_count: BTreeMap<FieldType, u32>,
    price_per_hour: BTreeMap<FieldType, Money>,
}

impl Facility {
    /// Creates a validated facility.
    ///
    /// # Arguments
    ///
    /// * `id` - The facility identifier
    /// * `name` - The display name
    /// * `opening` - The time the first slot may start
    /// * `closing` - The time the last slot must end by
    /// * `instance_count` - Number of instances per field type
    /// * `price_per_hour` - Hourly price per field type
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty
    /// - `opening` is not before `closing`
    /// - A field type appears in only one of the two mappings
    pub fn new(
        id: FacilityId,
        name: &str,
        opening: Time,
        closing: Time,
        instance_count: BTreeMap<FieldType, u32>,
        price_per_hour: BTreeMap<FieldType, Money>,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidFacilityName(String::from(
                "Facility name cannot be empty",
            )));
        }

        if opening >= closing {
            return Err(DomainError::InvalidOpeningHours { opening, closing });
        }

        let unmatched: Option<&FieldType> = instance_count
            .keys()
            .find(|field_type| !price_per_hour.contains_key(*field_type))
            .or_else(|| {
                price_per_hour
                    .keys()
                    .find(|field_type| !instance_count.contains_key(*field_type))
            });
        if let Some(field_type) = unmatched {
            return Err(DomainError::InconsistentFieldMappings {
                facility_id: id.to_string(),
                field_type: field_type.to_string(),
            });
        }

        Ok(Self {
            id,
            name: name.trim().to_string(),
            opening,
            closing,
            instance_count,
            price_per_hour,
        })
    }

    /// Returns the facility identifier.
    #[must_use]
    pub const fn id(&self) -> &FacilityId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the opening time.
    #[must_use]
    pub const fn opening(&self) -> Time {
        self.opening
    }

    /// Returns the closing time.
    #[must_use]
    pub const fn closing(&self) -> Time {
        self.closing
    }

    /// Returns the field types offered, in name order.
    pub fn field_types(&self) -> impl Iterator<Item = &FieldType> {
        self.instance_count.keys()
    }

    /// Returns the configured number of instances for a field type.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownFieldType` if the field type is not offered.
    pub fn instance_count(&self, field_type: &FieldType) -> Result<u32, DomainError> {
        self.instance_count
            .get(field_type)
            .copied()
            .ok_or_else(|| self.unknown_field_type(field_type))
    }

    /// Returns the hourly price for a field type.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownFieldType` if the field type is not offered.
    pub fn price_per_hour(&self, field_type: &FieldType) -> Result<Money, DomainError> {
        self.price_per_hour
            .get(field_type)
            .copied()
            .ok_or_else(|| self.unknown_field_type(field_type))
    }

    /// Checks that a slot lies entirely within opening hours.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SlotOutsideOpeningHours` if the slot starts before
    /// opening or ends after closing.
    pub fn validate_slot(&self, timeslot: &Timeslot) -> Result<(), DomainError> {
        let start: Time = timeslot.start();
        // Time arithmetic wraps at midnight; a 23:00 slot can never end by closing.
        let ends_in_time: bool =
            start.hour() < 23 && start + Timeslot::DURATION <= self.closing;

        if start < self.opening || !ends_in_time {
            return Err(DomainError::SlotOutsideOpeningHours {
                start,
                opening: self.opening,
                closing: self.closing,
            });
        }
        Ok(())
    }

    fn unknown_field_type(&self, field_type: &FieldType) -> DomainError {
        DomainError::UnknownFieldType {
            facility_id: self.id.to_string(),
            field_type: field_type.to_string(),
        }
    }
}
