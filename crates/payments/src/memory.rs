// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Deterministic in-process gateway for development and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use fieldbook_domain::PaymentReport;
use futures::future::BoxFuture;
use tracing::info;

use crate::error::GatewayError;
use crate::gateway::{PaymentGateway, Preference, PreferenceRequest};

#[derive(Debug, Default)]
struct GatewayState {
    next_preference: u64,
    preferences: Vec<(Preference, PreferenceRequest)>,
    payments: HashMap<String, PaymentReport>,
    unavailable: bool,
    fetch_count: usize,
}

/// A [`PaymentGateway`] that keeps everything in memory.
///
/// Preferences are issued as `pref-1`, `pref-2`, … Payments must be seeded
/// with [`InMemoryGateway::set_payment`] before they can be fetched.
#[derive(Debug)]
pub struct InMemoryGateway {
    checkout_base: String,
    state: Mutex<GatewayState>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::with_checkout_base("https://checkout.invalid/pay")
    }

    /// Creates an empty gateway issuing redirect URLs under `checkout_base`.
    #[must_use]
    pub fn with_checkout_base(checkout_base: &str) -> Self {
        Self {
            checkout_base: checkout_base.trim_end_matches('/').to_string(),
            state: Mutex::new(GatewayState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, GatewayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores (or replaces) the report returned for a payment id.
    pub fn set_payment(&self, report: PaymentReport) {
        self.state().payments.insert(report.payment_id.clone(), report);
    }

    /// Makes every call fail with `GatewayError::Unavailable` while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// Number of `fetch_payment` calls so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.state().fetch_count
    }

    /// Preferences issued so far, with the requests that produced them.
    #[must_use]
    pub fn preferences(&self) -> Vec<(Preference, PreferenceRequest)> {
        self.state().preferences.clone()
    }
}

impl PaymentGateway for InMemoryGateway {
    fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> BoxFuture<'_, Result<Preference, GatewayError>> {
        let result = {
            let mut state = self.state();
            if state.unavailable {
                Err(GatewayError::Unavailable(String::from(
                    "in-memory gateway is offline",
                )))
            } else {
                state.next_preference += 1;
                let preference_id: String = format!("pref-{}", state.next_preference);
                let preference = Preference {
                    redirect_url: format!("{}/{preference_id}", self.checkout_base),
                    preference_id,
                };
                info!(
                    reservation_id = request.reservation_id,
                    preference_id = %preference.preference_id,
                    "Issued in-memory preference"
                );
                state.preferences.push((preference.clone(), request));
                Ok(preference)
            }
        };
        Box::pin(async move { result })
    }

    fn fetch_payment(
        &self,
        payment_id: &str,
    ) -> BoxFuture<'_, Result<PaymentReport, GatewayError>> {
        let result = {
            let mut state = self.state();
            state.fetch_count += 1;
            if state.unavailable {
                Err(GatewayError::Unavailable(String::from(
                    "in-memory gateway is offline",
                )))
            } else {
                state.payments.get(payment_id).cloned().ok_or_else(|| {
                    GatewayError::Rejected(format!("unknown payment {payment_id}"))
                })
            }
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fieldbook_domain::{GatewayPaymentStatus, Money};

    fn request(reservation_id: i64) -> PreferenceRequest {
        PreferenceRequest {
            reservation_id,
            title: String::from("5v5"),
            payer_email: String::from("ana@example.com"),
            payer_name: String::from("Ana"),
            amount: Money::parse("25.00").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_preferences_are_numbered() {
        let gateway = InMemoryGateway::with_checkout_base("https://pay.example/checkout/");

        let first = gateway.create_preference(request(1)).await.unwrap();
        let second = gateway.create_preference(request(2)).await.unwrap();

        assert_eq!(first.preference_id, "pref-1");
        assert_eq!(first.redirect_url, "https://pay.example/checkout/pref-1");
        assert_eq!(second.preference_id, "pref-2");
        assert_eq!(gateway.preferences().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_seeded_payment() {
        let gateway = InMemoryGateway::new();
        gateway.set_payment(PaymentReport {
            payment_id: String::from("P1"),
            status: GatewayPaymentStatus::Approved,
            amount: Money::parse("25.00").unwrap(),
            external_reference: Some(String::from("1")),
            preference_id: Some(String::from("pref-1")),
            payment_method: Some(String::from("account_money")),
        });

        let report = gateway.fetch_payment("P1").await.unwrap();
        assert_eq!(report.status, GatewayPaymentStatus::Approved);
        assert!(matches!(
            gateway.fetch_payment("P2").await,
            Err(GatewayError::Rejected(_))
        ));
        assert_eq!(gateway.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_offline_gateway() {
        let gateway = InMemoryGateway::new();
        gateway.set_unavailable(true);

        let err = gateway.create_preference(request(1)).await.unwrap_err();
        assert!(err.is_transient());
        assert!(gateway.preferences().is_empty());

        gateway.set_unavailable(false);
        assert_eq!(
            gateway.create_preference(request(1)).await.unwrap().preference_id,
            "pref-1"
        );
    }
}
