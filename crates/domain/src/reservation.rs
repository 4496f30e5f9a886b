// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::reservation_state::ReservationState;
use crate::types::{Customer, Money, SlotKey};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A persisted reservation.
///
/// The slot, instance, customer and price are fixed at creation. Only the
/// payment fields and the state change afterwards, and only through
/// validated transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Ledger-assigned identifier.
    pub id: i64,
    /// The facility, field type and timeslot this reservation occupies.
    pub slot: SlotKey,
    /// The 1-based instance index within the field type.
    pub instance_number: u32,
    /// The human-readable instance label, e.g. `5v5 — Instance 2`.
    pub instance_label: String,
    /// The customer, held by value.
    pub customer: Customer,
    /// Price snapshotted at booking time.
    pub price: Money,
    /// Payment method reported by the gateway.
    pub payment_method: Option<String>,
    /// Gateway payment identifier.
    pub external_payment_id: Option<String>,
    /// Gateway preference identifier used for webhook correlation.
    pub preference_id: Option<String>,
    /// Checkout URL returned with the preference.
    pub payment_redirect_url: Option<String>,
    /// Current lifecycle state.
    pub state: ReservationState,
    /// When the reservation was created (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the reservation last changed (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Reservation {
    /// Returns true if this reservation occupies its instance label.
    #[must_use]
    pub const fn holds_capacity(&self) -> bool {
        self.state.holds_capacity()
    }

    /// Returns true if a preference has already been attached.
    #[must_use]
    pub const fn has_preference(&self) -> bool {
        self.preference_id.is_some()
    }

    /// Checks the invariants every stored reservation must satisfy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingPaymentDetails` if the reservation is
    /// paid but lacks the payment id or method.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.state == ReservationState::Paid {
            if self.external_payment_id.is_none() {
                return Err(DomainError::MissingPaymentDetails {
                    reservation_id: self.id,
                    field: "external_payment_id",
                });
            }
            if self.payment_method.is_none() {
                return Err(DomainError::MissingPaymentDetails {
                    reservation_id: self.id,
                    field: "payment_method",
                });
            }
        }
        Ok(())
    }
}

/// A reservation that has been granted an instance but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// The slot being booked.
    pub slot: SlotKey,
    /// The granted instance index.
    pub instance_number: u32,
    /// The granted instance label.
    pub instance_label: String,
    /// The customer.
    pub customer: Customer,
    /// Price snapshot.
    pub price: Money,
    /// Creation time.
    pub created_at: OffsetDateTime,
}

impl NewReservation {
    /// Builds the stored form once the ledger has assigned an id.
    ///
    /// New reservations always start `PENDING` with no payment details.
    #[must_use]
    pub fn into_reservation(self, id: i64) -> Reservation {
        Reservation {
            id,
            slot: self.slot,
            instance_number: self.instance_number,
            instance_label: self.instance_label,
            customer: self.customer,
            price: self.price,
            payment_method: None,
            external_payment_id: None,
            preference_id: None,
            payment_redirect_url: None,
            state: ReservationState::Pending,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
