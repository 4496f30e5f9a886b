// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use fieldbook::CoreError;
use fieldbook_domain::DomainError;
use fieldbook_payments::GatewayError;
use fieldbook_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Every instance of the field type is taken for the slot.
    NoCapacity {
        /// The requested slot.
        slot: String,
        /// The configured instance count.
        capacity: u32,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The request conflicts with data recorded by another request.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The payment gateway could not be reached in time.
    GatewayUnavailable {
        /// A description of the failure.
        message: String,
    },
    /// The payment gateway refused the request.
    GatewayRejected {
        /// A description of the refusal.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::NoCapacity { slot, capacity } => {
                write!(f, "No capacity left for {slot} (all {capacity} instances held)")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::GatewayUnavailable { message } => {
                write!(f, "Payment gateway unavailable: {message}")
            }
            Self::GatewayRejected { message } => {
                write!(f, "Payment gateway rejected the request: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidFacilityId(msg) => ApiError::InvalidInput {
            field: String::from("facility_id"),
            message: msg,
        },
        DomainError::InvalidFacilityName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidFieldType(msg) => ApiError::InvalidInput {
            field: String::from("field_type"),
            message: msg,
        },
        DomainError::FacilityNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Facility"),
            message: format!("Facility '{id}' does not exist"),
        },
        DomainError::UnknownFieldType {
            facility_id,
            field_type,
        } => ApiError::ResourceNotFound {
            resource_type: String::from("Field type"),
            message: format!("Facility '{facility_id}' does not offer '{field_type}'"),
        },
        DomainError::InconsistentFieldMappings {
            facility_id,
            field_type,
        } => ApiError::Internal {
            message: format!(
                "Facility '{facility_id}' has inconsistent configuration for '{field_type}'"
            ),
        },
        DomainError::InvalidOpeningHours { opening, closing } => ApiError::Internal {
            message: format!("Invalid opening hours {opening}-{closing}"),
        },
        DomainError::InvalidAmount(msg) => ApiError::InvalidInput {
            field: String::from("amount"),
            message: msg,
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
        DomainError::TimeParseError { time_string, error } => ApiError::InvalidInput {
            field: String::from("time"),
            message: format!("Failed to parse time '{time_string}': {error}"),
        },
        DomainError::SlotNotOnTheHour(start) => ApiError::InvalidInput {
            field: String::from("time"),
            message: format!("Slots start on the hour, got {start}"),
        },
        DomainError::SlotOutsideOpeningHours {
            start,
            opening,
            closing,
        } => ApiError::InvalidInput {
            field: String::from("time"),
            message: format!("Slot at {start} is outside opening hours {opening}-{closing}"),
        },
        DomainError::InvalidEmail(msg) => ApiError::InvalidInput {
            field: String::from("customer_email"),
            message: msg,
        },
        DomainError::InvalidCustomerName(msg) => ApiError::InvalidInput {
            field: String::from("customer_name"),
            message: msg,
        },
        DomainError::InvalidReservationState { state } => ApiError::Internal {
            message: format!("Unrecognised reservation state '{state}'"),
        },
        DomainError::InvalidStateTransition { from, to, reason } => {
            ApiError::DomainRuleViolation {
                rule: String::from("reservation_lifecycle"),
                message: format!("Cannot move reservation from {from} to {to}: {reason}"),
            }
        }
        DomainError::PreferenceNotAllowed {
            reservation_id,
            state,
        } => ApiError::DomainRuleViolation {
            rule: String::from("preference_requires_pending"),
            message: format!(
                "Reservation {reservation_id} is {state}; only pending reservations can be paid"
            ),
        },
        DomainError::PreferenceAlreadyAttached {
            reservation_id,
            existing,
        } => ApiError::Conflict {
            message: format!(
                "Reservation {reservation_id} already has payment preference '{existing}'"
            ),
        },
        DomainError::MissingPaymentDetails {
            reservation_id,
            field,
        } => ApiError::DomainRuleViolation {
            rule: String::from("paid_requires_payment_details"),
            message: format!("Reservation {reservation_id} cannot be paid without {field}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::NoCapacity { slot, capacity } => ApiError::NoCapacity { slot, capacity },
        CoreError::PaymentAmountMismatch {
            reservation_id,
            expected,
            actual,
        } => ApiError::DomainRuleViolation {
            rule: String::from("payment_matches_price"),
            message: format!(
                "Payment of {actual} for reservation {reservation_id} does not match price {expected}"
            ),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::TransitionRejected(core_err) => translate_core_error(core_err),
        PersistenceError::ReservationNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Reservation"),
            message: format!("Reservation {id} does not exist"),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        PersistenceError::PreferenceConflict(preference_id) => ApiError::Conflict {
            message: format!("Payment preference '{preference_id}' is already in use"),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

/// Translates a gateway error into an API error.
#[must_use]
pub fn translate_gateway_error(err: GatewayError) -> ApiError {
    match err {
        GatewayError::Unavailable(message) => ApiError::GatewayUnavailable { message },
        GatewayError::Rejected(message) => ApiError::GatewayRejected { message },
    }
}
