// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Facility identifier is empty or invalid.
    InvalidFacilityId(String),
    /// Facility name is empty or invalid.
    InvalidFacilityName(String),
    /// Field type name is empty or invalid.
    InvalidFieldType(String),
    /// The facility does not exist in the catalog.
    FacilityNotFound(String),
    /// The field type is not offered by the facility.
    UnknownFieldType {
        /// The facility identifier.
        facility_id: String,
        /// The requested field type.
        field_type: String,
    },
    /// The facility's capacity and price mappings disagree on their keys.
    InconsistentFieldMappings {
        /// The facility identifier.
        facility_id: String,
        /// The field type present in only one mapping.
        field_type: String,
    },
    /// Opening hours are invalid.
    InvalidOpeningHours {
        /// The opening time.
        opening: time::Time,
        /// The closing time.
        closing: time::Time,
    },
    /// A monetary amount could not be parsed or is negative.
    InvalidAmount(String),
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse time from string.
    TimeParseError {
        /// The invalid time string.
        time_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Slots are one hour long and must start on the hour.
    SlotNotOnTheHour(time::Time),
    /// The slot falls outside the facility's opening hours.
    SlotOutsideOpeningHours {
        /// The requested slot start.
        start: time::Time,
        /// The facility opening time.
        opening: time::Time,
        /// The facility closing time.
        closing: time::Time,
    },
    /// Customer email is empty or malformed.
    InvalidEmail(String),
    /// Customer name is empty.
    InvalidCustomerName(String),
    /// Reservation state string is not recognised.
    InvalidReservationState {
        /// The invalid state value.
        state: String,
    },
    /// A reservation state transition is not permitted.
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The requested state.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// Only pending reservations may request a payment preference.
    PreferenceNotAllowed {
        /// The reservation identifier.
        reservation_id: i64,
        /// The reservation's current state.
        state: String,
    },
    /// A different payment preference is already attached.
    PreferenceAlreadyAttached {
        /// The reservation identifier.
        reservation_id: i64,
        /// The attached preference.
        existing: String,
    },
    /// A paid reservation must carry the payment id and method.
    MissingPaymentDetails {
        /// The reservation identifier.
        reservation_id: i64,
        /// The missing field.
        field: &'static str,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFacilityId(msg) => write!(f, "Invalid facility id: {msg}"),
            Self::InvalidFacilityName(msg) => write!(f, "Invalid facility name: {msg}"),
            Self::InvalidFieldType(msg) => write!(f, "Invalid field type: {msg}"),
            Self::FacilityNotFound(id) => write!(f, "Facility '{id}' not found"),
            Self::UnknownFieldType {
                facility_id,
                field_type,
            } => {
                write!(
                    f,
                    "Field type '{field_type}' is not offered by facility '{facility_id}'"
                )
            }
            Self::InconsistentFieldMappings {
                facility_id,
                field_type,
            } => {
                write!(
                    f,
                    "Facility '{facility_id}' lists field type '{field_type}' in only one of its capacity and price mappings"
                )
            }
            Self::InvalidOpeningHours { opening, closing } => {
                write!(
                    f,
                    "Opening time {opening} must be before closing time {closing}"
                )
            }
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {msg}"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimeParseError { time_string, error } => {
                write!(f, "Failed to parse time '{time_string}': {error}")
            }
            Self::SlotNotOnTheHour(start) => {
                write!(f, "Slots start on the hour, got {start}")
            }
            Self::SlotOutsideOpeningHours {
                start,
                opening,
                closing,
            } => {
                write!(
                    f,
                    "Slot starting at {start} is outside opening hours {opening}-{closing}"
                )
            }
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidCustomerName(msg) => write!(f, "Invalid customer name: {msg}"),
            Self::InvalidReservationState { state } => {
                write!(f, "Invalid reservation state: '{state}'")
            }
            Self::InvalidStateTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::PreferenceNotAllowed {
                reservation_id,
                state,
            } => {
                write!(
                    f,
                    "Reservation {reservation_id} is {state}; only pending reservations can be paid"
                )
            }
            Self::PreferenceAlreadyAttached {
                reservation_id,
                existing,
            } => {
                write!(
                    f,
                    "Reservation {reservation_id} already has payment preference '{existing}'"
                )
            }
            Self::MissingPaymentDetails {
                reservation_id,
                field,
            } => {
                write!(
                    f,
                    "Reservation {reservation_id} cannot be marked paid without {field}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
