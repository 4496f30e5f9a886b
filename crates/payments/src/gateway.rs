// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::GatewayError;
use fieldbook_domain::{Money, PaymentReport};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// What the gateway needs to issue a checkout for one reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRequest {
    /// Sent as the external reference and echoed back on payments.
    pub reservation_id: i64,
    /// Line item title shown to the payer.
    pub title: String,
    /// Payer email.
    pub payer_email: String,
    /// Payer display name.
    pub payer_name: String,
    /// Amount to charge.
    pub amount: Money,
}

/// A checkout issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// Gateway preference identifier.
    pub preference_id: String,
    /// Where to send the payer.
    pub redirect_url: String,
}

/// Abstraction over the external payment provider.
///
/// A call that returns an error must be treated as not having happened:
/// callers never assume a preference exists unless they hold a
/// [`Preference`].
pub trait PaymentGateway: Send + Sync {
    /// Issues a checkout preference.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unavailable` on network failure or timeout and
    /// `GatewayError::Rejected` if the gateway refuses the request.
    fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> BoxFuture<'_, Result<Preference, GatewayError>>;

    /// Fetches the authoritative state of a payment.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unavailable` on network failure or timeout and
    /// `GatewayError::Rejected` if the payment is unknown or unreadable.
    fn fetch_payment(&self, payment_id: &str)
    -> BoxFuture<'_, Result<PaymentReport, GatewayError>>;
}
