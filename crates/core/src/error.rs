// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook_domain::{DomainError, Money};

/// Errors that can occur during allocation and state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// Every instance of the field type is held for the slot.
    NoCapacity {
        /// The slot that was requested.
        slot: String,
        /// The configured instance count.
        capacity: u32,
    },
    /// An approved payment does not match the snapshotted price.
    PaymentAmountMismatch {
        /// The reservation identifier.
        reservation_id: i64,
        /// The price snapshotted at booking time.
        expected: Money,
        /// The amount the gateway reported.
        actual: Money,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::NoCapacity { slot, capacity } => {
                write!(f, "No capacity left for {slot} (capacity {capacity})")
            }
            Self::PaymentAmountMismatch {
                reservation_id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Payment for reservation {reservation_id} was {actual}, expected {expected}"
                )
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
