// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook_audit::TransitionRecord;
use fieldbook_domain::{Reservation, ReservationState};

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The reservation after the transition.
    pub reservation: Reservation,
    /// The audit record describing this transition.
    pub record: TransitionRecord,
}

/// Why a command left a reservation untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoChangeReason {
    /// The reservation already reflects the command.
    AlreadyApplied,
    /// The reservation is terminal and cannot change.
    AlreadyTerminal(ReservationState),
    /// A different payment is already recorded for the reservation.
    ConflictingPayment {
        /// The recorded payment id.
        existing: String,
        /// The payment id that was refused.
        incoming: String,
    },
    /// The gateway reported a status this system does not act on.
    UnknownGatewayStatus(String),
    /// The reported status would move the reservation backwards.
    OutOfOrder {
        /// The current state.
        current: ReservationState,
        /// The state the report pointed at.
        target: ReservationState,
    },
    /// The reservation does not qualify for the command (e.g. hold expiry).
    NotEligible,
}

impl std::fmt::Display for NoChangeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyApplied => write!(f, "already applied"),
            Self::AlreadyTerminal(state) => write!(f, "reservation is already {state}"),
            Self::ConflictingPayment { existing, incoming } => {
                write!(
                    f,
                    "payment {incoming} conflicts with recorded payment {existing}"
                )
            }
            Self::UnknownGatewayStatus(status) => write!(f, "unknown gateway status '{status}'"),
            Self::OutOfOrder { current, target } => {
                write!(f, "stale update from {current} back to {target}")
            }
            Self::NotEligible => write!(f, "not eligible"),
        }
    }
}

/// The outcome of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The reservation changed and the change must be persisted.
    Applied(TransitionResult),
    /// Nothing to persist.
    Unchanged(NoChangeReason),
}

impl TransitionOutcome {
    /// Returns true if the reservation changed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}
