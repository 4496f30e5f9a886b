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

mod allocate;
mod apply;
mod capacity;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use allocate::{
    BookingTerms, Grant, ReservationDraft, allocate, booking_terms, count_available,
    lowest_free_instance,
};
pub use apply::apply;
pub use capacity::{CapacityProvider, Catalog};
pub use command::ReservationCommand;
pub use error::CoreError;
pub use state::{NoChangeReason, TransitionOutcome, TransitionResult};
