// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook_domain::PaymentReport;
use time::OffsetDateTime;

/// A command represents operator, customer, gateway or system intent as data only.
///
/// Commands are the only way to request a change to an existing reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationCommand {
    /// Manually confirm a pending reservation.
    Confirm,
    /// Cancel a non-terminal reservation, releasing its instance.
    Cancel {
        /// Free-text reason recorded in the audit trail.
        reason: String,
    },
    /// Cancel a pending hold that never saw a payment.
    ExpireHold {
        /// Holds created before this instant are expired.
        cutoff: OffsetDateTime,
    },
    /// Attach the gateway preference created for a pending reservation.
    AttachPreference {
        /// Gateway preference identifier.
        preference_id: String,
        /// Checkout URL for the customer.
        redirect_url: String,
    },
    /// Apply an authoritative payment status fetched from the gateway.
    RecordPayment {
        /// The fetched payment.
        report: PaymentReport,
    },
}

impl ReservationCommand {
    /// The audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Confirm => "Confirm",
            Self::Cancel { .. } => "Cancel",
            Self::ExpireHold { .. } => "ExpireHold",
            Self::AttachPreference { .. } => "AttachPreference",
            Self::RecordPayment { .. } => "RecordPayment",
        }
    }
}
