// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment status as reported by the external gateway.

use crate::reservation_state::ReservationState;
use crate::types::Money;
use serde::{Deserialize, Serialize};

/// Payment status values the gateway reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayPaymentStatus {
    /// Funds captured.
    Approved,
    /// Funds authorised but not yet captured.
    Authorized,
    /// Under review by the gateway.
    InProcess,
    /// Awaiting customer action.
    Pending,
    /// Declined.
    Rejected,
    /// Cancelled before completion.
    Cancelled,
    /// Any status this system does not act on.
    Other(String),
}

impl GatewayPaymentStatus {
    /// Parses the gateway's wire value. Unknown values are preserved.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" => Self::Approved,
            "authorized" => Self::Authorized,
            "in_process" => Self::InProcess,
            "pending" => Self::Pending,
            "rejected" => Self::Rejected,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(value.to_string()),
        }
    }

    /// Returns the gateway's wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "approved",
            Self::Authorized => "authorized",
            Self::InProcess => "in_process",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Other(value) => value,
        }
    }

    /// The reservation state this status drives a reservation towards.
    ///
    /// `None` means the status is not acted on.
    #[must_use]
    pub const fn target_state(&self) -> Option<ReservationState> {
        match self {
            Self::Approved => Some(ReservationState::Paid),
            Self::Authorized | Self::InProcess => Some(ReservationState::Confirmed),
            Self::Pending => Some(ReservationState::Pending),
            Self::Rejected | Self::Cancelled => Some(ReservationState::Rejected),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative payment details fetched from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReport {
    /// Gateway payment identifier.
    pub payment_id: String,
    /// Reported status.
    pub status: GatewayPaymentStatus,
    /// Amount charged.
    pub amount: Money,
    /// The reference we attached to the preference (the reservation id).
    pub external_reference: Option<String>,
    /// The preference this payment belongs to.
    pub preference_id: Option<String>,
    /// Payment method type, e.g. `credit_card`.
    pub payment_method: Option<String>,
}
