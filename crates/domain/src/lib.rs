// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod facility;
mod payment;
mod reservation;
mod reservation_state;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use facility::Facility;
pub use payment::{GatewayPaymentStatus, PaymentReport};
pub use reservation::{NewReservation, Reservation};
pub use reservation_state::ReservationState;
pub use types::{
    Customer, FacilityId, FieldType, Money, SlotKey, Timeslot, format_date, format_time,
    format_timestamp, parse_date, parse_time, parse_timestamp,
};
pub use validation::{validate_customer, validate_email};
