// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The payment gateway boundary.
//!
//! This crate knows how to talk to the external payment provider and how to
//! authenticate the notifications it sends back. It never touches the
//! reservation ledger; callers decide what a fetched payment means.

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

mod amount;
mod error;
mod gateway;
mod http;
mod memory;
mod notification;
mod signature;

pub use amount::{amount_to_money, money_to_amount};
pub use error::{GatewayError, NotificationError, SignatureError};
pub use gateway::{PaymentGateway, Preference, PreferenceRequest};
pub use http::{HttpGatewayConfig, HttpPaymentGateway};
pub use memory::InMemoryGateway;
pub use notification::{PAYMENT_TOPIC, PaymentNotification};
pub use signature::{DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER, SignatureVerifier};
