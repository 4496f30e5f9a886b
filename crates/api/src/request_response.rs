// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates are `YYYY-MM-DD`, times `HH:MM`, amounts decimal strings such as
//! `"25.00"` and timestamps RFC 3339 in UTC.

use fieldbook_audit::TransitionRecord;
use fieldbook_domain::{Reservation, format_timestamp};
use serde::{Deserialize, Serialize};

/// Identifies one bookable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotQuery {
    /// The facility identifier.
    pub facility_id: String,
    /// The field type, e.g. `5v5`.
    pub field_type: String,
    /// The slot date.
    pub date: String,
    /// The slot start time.
    pub time: String,
}

/// API response describing remaining capacity for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// The facility identifier.
    pub facility_id: String,
    /// The field type.
    pub field_type: String,
    /// The slot date.
    pub date: String,
    /// The slot start time.
    pub time: String,
    /// Configured instance count.
    pub capacity: u32,
    /// Instances currently held.
    pub held: u32,
    /// Instances still free.
    pub available: u32,
    /// Price of the slot.
    pub price: String,
}

/// API request to book a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// The facility identifier.
    pub facility_id: String,
    /// The field type.
    pub field_type: String,
    /// The slot date.
    pub date: String,
    /// The slot start time.
    pub time: String,
    /// Customer email.
    pub customer_email: String,
    /// Customer name.
    pub customer_name: String,
    /// Optional customer phone number.
    #[serde(default)]
    pub customer_phone: Option<String>,
}

/// A reservation as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationResponse {
    /// The reservation identifier.
    pub reservation_id: i64,
    /// The facility identifier.
    pub facility_id: String,
    /// The field type.
    pub field_type: String,
    /// The slot date.
    pub date: String,
    /// The slot start time.
    pub time: String,
    /// The granted instance index.
    pub instance_number: u32,
    /// The granted instance label.
    pub instance_label: String,
    /// Customer email.
    pub customer_email: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer phone.
    pub customer_phone: Option<String>,
    /// Price snapshotted at booking time.
    pub price: String,
    /// Lifecycle state (`pendiente`, `confirmada`, `pagada`, `rechazada`, `cancelada`).
    pub state: String,
    /// Payment method reported by the gateway.
    pub payment_method: Option<String>,
    /// Gateway payment identifier.
    pub external_payment_id: Option<String>,
    /// Gateway preference identifier.
    pub preference_id: Option<String>,
    /// Checkout URL.
    pub payment_redirect_url: Option<String>,
    /// Creation time.
    pub created_at: String,
    /// Last change time.
    pub updated_at: String,
}

impl From<&Reservation> for ReservationResponse {
    fn from(reservation: &Reservation) -> Self {
        Self {
            reservation_id: reservation.id,
            facility_id: reservation.slot.facility_id.to_string(),
            field_type: reservation.slot.field_type.to_string(),
            date: reservation.slot.timeslot.date_string(),
            time: reservation.slot.timeslot.start_string(),
            instance_number: reservation.instance_number,
            instance_label: reservation.instance_label.clone(),
            customer_email: reservation.customer.email.clone(),
            customer_name: reservation.customer.name.clone(),
            customer_phone: reservation.customer.phone.clone(),
            price: reservation.price.to_string(),
            state: reservation.state.to_string(),
            payment_method: reservation.payment_method.clone(),
            external_payment_id: reservation.external_payment_id.clone(),
            preference_id: reservation.preference_id.clone(),
            payment_redirect_url: reservation.payment_redirect_url.clone(),
            created_at: format_timestamp(reservation.created_at),
            updated_at: format_timestamp(reservation.updated_at),
        }
    }
}

/// API request to confirm a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmReservationRequest {
    /// The operator confirming the reservation.
    pub actor_id: String,
}

/// API request to cancel a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReservationRequest {
    /// Who is cancelling: an operator id, or the customer's email.
    pub actor_id: String,
    /// `admin` or `customer`. Defaults to `admin`.
    #[serde(default)]
    pub actor_type: Option<String>,
    /// Why the reservation is being cancelled.
    pub reason: String,
}

/// API response for a state-changing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResponse {
    /// The reservation after the request.
    pub reservation: ReservationResponse,
    /// False if the request was a no-op.
    pub changed: bool,
    /// A human-readable summary.
    pub message: String,
}

/// One entry of a reservation's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecordResponse {
    /// The state before the change, absent for creation.
    pub previous_state: Option<String>,
    /// The state after the change.
    pub new_state: String,
    /// Who made the change.
    pub actor_id: String,
    /// The kind of actor.
    pub actor_type: String,
    /// The request or event that caused the change.
    pub cause_id: String,
    /// Description of the cause.
    pub cause_description: String,
    /// The action name.
    pub action: String,
    /// Action details.
    pub details: Option<String>,
    /// When the change happened.
    pub at: String,
}

impl From<&TransitionRecord> for TransitionRecordResponse {
    fn from(record: &TransitionRecord) -> Self {
        Self {
            previous_state: record.previous_state.map(|s| s.to_string()),
            new_state: record.new_state.to_string(),
            actor_id: record.actor.id.clone(),
            actor_type: record.actor.actor_type.clone(),
            cause_id: record.cause.id.clone(),
            cause_description: record.cause.description.clone(),
            action: record.action.name.clone(),
            details: record.action.details.clone(),
            at: format_timestamp(record.at),
        }
    }
}

/// API response listing a reservation's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationHistoryResponse {
    /// The reservation identifier.
    pub reservation_id: i64,
    /// Transitions, oldest first.
    pub transitions: Vec<TransitionRecordResponse>,
}

/// API response listing a facility's reservations for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScheduleResponse {
    /// The facility identifier.
    pub facility_id: String,
    /// The date.
    pub date: String,
    /// Reservations in slot order.
    pub reservations: Vec<ReservationResponse>,
}

/// API request for a payment checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePreferenceRequest {
    /// The reservation to pay for.
    pub reservation_id: i64,
    /// Payer display name. Defaults to the customer name.
    #[serde(default)]
    pub payer: Option<String>,
    /// The amount the client expects to pay; must equal the reservation price.
    pub amount: String,
}

/// API response for a payment checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePreferenceResponse {
    /// The reservation identifier.
    pub reservation_id: i64,
    /// Gateway preference identifier.
    pub preference_id: String,
    /// Where to send the payer.
    pub redirect_url: String,
}

/// Result of one hold-expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpireHoldsResponse {
    /// Reservations that were cancelled.
    pub expired: Vec<i64>,
    /// Candidates that changed before they could be expired.
    pub skipped: Vec<i64>,
}
