// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation state tracking and transition logic.
//!
//! This module defines the reservation lifecycle and which transitions are
//! legal. Transitions only move forward; cancellation is legal from any
//! non-terminal state. The persisted and externally exposed representation
//! is the lowercase Spanish state name.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationState {
    /// Created, awaiting payment. Holds capacity.
    #[serde(rename = "pendiente")]
    Pending,
    /// Manually confirmed or payment in process. Holds capacity.
    #[serde(rename = "confirmada")]
    Confirmed,
    /// Payment approved. Terminal, holds capacity.
    #[serde(rename = "pagada")]
    Paid,
    /// Payment rejected by the gateway. Terminal.
    #[serde(rename = "rechazada")]
    Rejected,
    /// Cancelled by an operator, the customer, or hold expiry. Terminal.
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl ReservationState {
    /// States that count against a field type's instance limit.
    pub const CAPACITY_HOLDING: [Self; 3] = [Self::Pending, Self::Confirmed, Self::Paid];

    /// Returns the string representation of the state.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Confirmed => "confirmada",
            Self::Paid => "pagada",
            Self::Rejected => "rechazada",
            Self::Cancelled => "cancelada",
        }
    }

    /// Parses a state from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidReservationState` if the string is not a valid state.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pendiente" => Ok(Self::Pending),
            "confirmada" => Ok(Self::Confirmed),
            "pagada" => Ok(Self::Paid),
            "rechazada" => Ok(Self::Rejected),
            "cancelada" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidReservationState {
                state: s.to_string(),
            }),
        }
    }

    /// Returns true if this state is terminal (cannot transition to another state).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Rejected | Self::Cancelled)
    }

    /// Returns true if a reservation in this state occupies its instance label.
    #[must_use]
    pub const fn holds_capacity(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Paid)
    }

    /// Validates if a transition from this state to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_state: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStateTransition {
                from: self.as_str().to_string(),
                to: new_state.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            Self::Pending => matches!(
                new_state,
                Self::Confirmed | Self::Paid | Self::Rejected | Self::Cancelled
            ),
            Self::Confirmed => matches!(new_state, Self::Paid | Self::Rejected | Self::Cancelled),
            Self::Paid | Self::Rejected | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStateTransition {
                from: self.as_str().to_string(),
                to: new_state.as_str().to_string(),
                reason: "transition not permitted by reservation lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for ReservationState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
