// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for Fieldbook.
//!
//! Requests arrive as plain DTOs, are parsed into domain types, run through
//! the core rules against the ledger, and leave as DTOs or an [`ApiError`].
//! Transport concerns (HTTP status codes, routing) live in the server.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handlers;
mod payment;
mod reconcile;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_gateway_error,
    translate_persistence_error,
};
pub use handlers::{
    HOLD_EXPIRY_ACTOR, cancel_reservation, check_availability, confirm_reservation,
    create_booking, expire_stale_holds, get_reservation, get_reservation_history,
    list_reservations_for_day,
};
pub use payment::create_payment_preference;
pub use reconcile::{
    IgnoreReason, ReconcileError, ReconcileOutcome, WebhookDelivery, WebhookReconciler,
};
pub use request_response::{
    AvailabilityResponse, CancelReservationRequest, ConfirmReservationRequest,
    CreateBookingRequest, CreatePreferenceRequest, CreatePreferenceResponse,
    DayScheduleResponse, ExpireHoldsResponse, ReservationHistoryResponse, ReservationResponse,
    SlotQuery, TransitionRecordResponse, TransitionResponse,
};
