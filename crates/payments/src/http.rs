// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP client for a Mercado Pago style checkout API.

use std::time::Duration;

use fieldbook_domain::{GatewayPaymentStatus, PaymentReport};
use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::amount::{amount_to_money, money_to_amount};
use crate::error::GatewayError;
use crate::gateway::{PaymentGateway, Preference, PreferenceRequest};

/// Connection settings for [`HttpPaymentGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// API root, e.g. `https://api.mercadopago.com`.
    pub base_url: String,
    /// Bearer token.
    pub access_token: String,
    /// Where the gateway should deliver payment notifications.
    pub notification_url: Option<String>,
    /// Where the payer returns after checkout.
    pub return_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// [`PaymentGateway`] backed by the provider's REST API.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    config: HttpGatewayConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpPaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPaymentGateway")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct PreferenceBody<'a> {
    items: [ItemBody<'a>; 1],
    payer: PayerBody<'a>,
    external_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    back_urls: Option<BackUrls<'a>>,
}

#[derive(Serialize)]
struct ItemBody<'a> {
    title: &'a str,
    quantity: u32,
    unit_price: f64,
}

#[derive(Serialize)]
struct PayerBody<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct BackUrls<'a> {
    success: &'a str,
    failure: &'a str,
    pending: &'a str,
}

#[derive(Deserialize)]
struct PreferenceResponse {
    id: String,
    init_point: String,
}

#[derive(Deserialize)]
struct PaymentResponse {
    id: serde_json::Value,
    status: String,
    transaction_amount: f64,
    external_reference: Option<String>,
    preference_id: Option<String>,
    payment_type_id: Option<String>,
}

impl PaymentResponse {
    fn into_report(self) -> Result<PaymentReport, GatewayError> {
        let payment_id: String = match self.id {
            serde_json::Value::String(id) => id,
            serde_json::Value::Number(id) => id.to_string(),
            other => {
                return Err(GatewayError::Rejected(format!(
                    "unexpected payment id {other}"
                )));
            }
        };
        let amount = amount_to_money(self.transaction_amount).ok_or_else(|| {
            GatewayError::Rejected(format!(
                "invalid transaction amount {}",
                self.transaction_amount
            ))
        })?;

        Ok(PaymentReport {
            payment_id,
            status: GatewayPaymentStatus::parse(&self.status),
            amount,
            external_reference: self.external_reference.filter(|r| !r.is_empty()),
            preference_id: self.preference_id.filter(|p| !p.is_empty()),
            payment_method: self.payment_type_id,
        })
    }
}

fn transport_error(context: &str, err: &reqwest::Error) -> GatewayError {
    GatewayError::Unavailable(format!("{context}: {err}"))
}

async fn status_error(context: &str, response: reqwest::Response) -> GatewayError {
    let status: StatusCode = response.status();
    let body: String = response.text().await.unwrap_or_default();
    let message: String = format!("{context} failed ({status}): {body}");

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        GatewayError::Unavailable(message)
    } else {
        GatewayError::Rejected(message)
    }
}

impl HttpPaymentGateway {
    /// Creates a client for the configured gateway.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unavailable` if the HTTP client cannot be built.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }
}

impl PaymentGateway for HttpPaymentGateway {
    fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> BoxFuture<'_, Result<Preference, GatewayError>> {
        Box::pin(async move {
            let body = PreferenceBody {
                items: [ItemBody {
                    title: &request.title,
                    quantity: 1,
                    unit_price: money_to_amount(request.amount),
                }],
                payer: PayerBody {
                    email: &request.payer_email,
                    name: &request.payer_name,
                },
                external_reference: request.reservation_id.to_string(),
                notification_url: self.config.notification_url.as_deref(),
                back_urls: self.config.return_url.as_deref().map(|url| BackUrls {
                    success: url,
                    failure: url,
                    pending: url,
                }),
            };

            debug!(reservation_id = request.reservation_id, "Creating payment preference");
            let response = self
                .client
                .post(self.url("/checkout/preferences"))
                .bearer_auth(&self.config.access_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| transport_error("create preference", &e))?;

            if !response.status().is_success() {
                let err = status_error("create preference", response).await;
                warn!(reservation_id = request.reservation_id, error = %err, "Gateway refused preference");
                return Err(err);
            }

            let created: PreferenceResponse = response.json().await.map_err(|e| {
                GatewayError::Rejected(format!("invalid preference response: {e}"))
            })?;

            info!(
                reservation_id = request.reservation_id,
                preference_id = %created.id,
                "Payment preference created"
            );
            Ok(Preference {
                preference_id: created.id,
                redirect_url: created.init_point,
            })
        })
    }

    fn fetch_payment(
        &self,
        payment_id: &str,
    ) -> BoxFuture<'_, Result<PaymentReport, GatewayError>> {
        let payment_id: String = payment_id.to_string();
        Box::pin(async move {
            let response = self
                .client
                .get(self.url(&format!("/v1/payments/{payment_id}")))
                .bearer_auth(&self.config.access_token)
                .send()
                .await
                .map_err(|e| transport_error("fetch payment", &e))?;

            if !response.status().is_success() {
                return Err(status_error("fetch payment", response).await);
            }

            let payment: PaymentResponse = response
                .json()
                .await
                .map_err(|e| GatewayError::Rejected(format!("invalid payment response: {e}")))?;
            let report: PaymentReport = payment.into_report()?;

            debug!(payment_id = %report.payment_id, status = %report.status, "Fetched payment");
            Ok(report)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use fieldbook_domain::Money;
    use serde_json::json;

    async fn spawn_gateway(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn gateway(base_url: String) -> HttpPaymentGateway {
        HttpPaymentGateway::new(HttpGatewayConfig {
            base_url,
            access_token: String::from("test-token"),
            notification_url: Some(String::from("https://fields.example/payment/notification")),
            return_url: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn request() -> PreferenceRequest {
        PreferenceRequest {
            reservation_id: 7,
            title: String::from("5v5 — Instance 1, 2024-06-01 18:00"),
            payer_email: String::from("ana@example.com"),
            payer_name: String::from("Ana"),
            amount: Money::parse("25.00").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_preference_sends_reference_and_token() {
        let app = Router::new().route(
            "/checkout/preferences",
            post(|headers: HeaderMap, axum::Json(body): axum::Json<serde_json::Value>| async move {
                assert_eq!(
                    headers.get("authorization").unwrap(),
                    "Bearer test-token"
                );
                assert_eq!(body["external_reference"], "7");
                assert_eq!(body["items"][0]["unit_price"], 25.0);
                assert_eq!(
                    body["notification_url"],
                    "https://fields.example/payment/notification"
                );
                axum::Json(json!({
                    "id": "pref-abc",
                    "init_point": "https://checkout.example/pref-abc"
                }))
            }),
        );
        let base = spawn_gateway(app).await;

        let preference = gateway(base).create_preference(request()).await.unwrap();

        assert_eq!(preference.preference_id, "pref-abc");
        assert_eq!(preference.redirect_url, "https://checkout.example/pref-abc");
    }

    #[tokio::test]
    async fn test_fetch_payment_maps_fields() {
        let app = Router::new().route(
            "/v1/payments/{id}",
            get(|Path(id): Path<String>| async move {
                axum::Json(json!({
                    "id": id.parse::<u64>().unwrap(),
                    "status": "approved",
                    "transaction_amount": 25.0,
                    "external_reference": "7",
                    "preference_id": "pref-abc",
                    "payment_type_id": "credit_card"
                }))
            }),
        );
        let base = spawn_gateway(app).await;

        let report = gateway(base).fetch_payment("123456").await.unwrap();

        assert_eq!(report.payment_id, "123456");
        assert_eq!(report.status, GatewayPaymentStatus::Approved);
        assert_eq!(report.amount.cents(), 2500);
        assert_eq!(report.external_reference.as_deref(), Some("7"));
        assert_eq!(report.preference_id.as_deref(), Some("pref-abc"));
        assert_eq!(report.payment_method.as_deref(), Some("credit_card"));
    }

    #[tokio::test]
    async fn test_server_errors_are_transient() {
        let app = Router::new().route(
            "/v1/payments/{id}",
            get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = spawn_gateway(app).await;

        let err = gateway(base).fetch_payment("1").await.unwrap_err();

        assert!(err.is_transient(), "{err}");
    }

    #[tokio::test]
    async fn test_client_errors_are_permanent() {
        let app = Router::new().route(
            "/v1/payments/{id}",
            get(|| async { (axum::http::StatusCode::NOT_FOUND, "no such payment") }),
        );
        let base = spawn_gateway(app).await;

        let err = gateway(base).fetch_payment("1").await.unwrap_err();

        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_unavailable() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(format!("http://{addr}"))
            .create_preference(request())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Unavailable(_)));
    }
}
