// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Webhook payment reconciliation.
//!
//! A notification is only a hint: its signature is checked, the payment it
//! names is fetched from the gateway, and the fetched report is applied to
//! the reservation in one atomic read-modify-write. Replays, duplicates and
//! reports for terminal reservations are acknowledged as `Ignored`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fieldbook::{CoreError, NoChangeReason, ReservationCommand, apply};
use fieldbook_audit::{Actor, Cause};
use fieldbook_domain::{Money, PaymentReport, Reservation, ReservationState};
use fieldbook_payments::{
    GatewayError, NotificationError, PaymentGateway, PaymentNotification, SignatureError,
    SignatureVerifier,
};
use fieldbook_persistence::{LedgerUpdate, Persistence, PersistenceError};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// One inbound webhook request, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookDelivery {
    /// The `x-signature` header.
    pub signature: Option<String>,
    /// The `x-request-id` header.
    pub request_id: Option<String>,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Raw request body.
    pub body: Vec<u8>,
}

/// Why a verified notification caused no change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The notification is about something other than a payment.
    UnsupportedTopic(String),
    /// The state machine had nothing to apply.
    NoChange(NoChangeReason),
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedTopic(topic) => write!(f, "unsupported topic '{topic}'"),
            Self::NoChange(reason) => write!(f, "{reason}"),
        }
    }
}

/// The result of reconciling one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The reservation changed.
    Applied {
        /// The reservation identifier.
        reservation_id: i64,
        /// The state before the notification.
        previous_state: ReservationState,
        /// The state after the notification.
        state: ReservationState,
    },
    /// The notification was valid but changed nothing.
    Ignored {
        /// The reservation, when one was resolved.
        reservation_id: Option<i64>,
        /// Why nothing changed.
        reason: IgnoreReason,
    },
}

/// Reconciliation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The signature is missing, malformed, wrong, or stale.
    InvalidSignature(SignatureError),
    /// The notification could not be parsed.
    MalformedNotification(NotificationError),
    /// No reservation carries the payment's preference.
    UnknownReservation {
        /// The payment the notification named.
        payment_id: String,
        /// The preference it was correlated with, if any.
        preference_id: Option<String>,
    },
    /// The payment's external reference names a different reservation.
    CorrelationMismatch {
        /// The reservation resolved from the preference.
        reservation_id: i64,
        /// What the payment claims to be for.
        external_reference: String,
    },
    /// An approved payment does not match the snapshotted price.
    AmountMismatch {
        /// The reservation identifier.
        reservation_id: i64,
        /// The snapshotted price.
        expected: Money,
        /// The amount the gateway reported.
        actual: Money,
    },
    /// The gateway could not produce the payment.
    Gateway(GatewayError),
    /// The ledger failed.
    Ledger(PersistenceError),
}

impl ReconcileError {
    /// Returns true if the provider should retry the delivery later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Gateway(err) => err.is_transient(),
            Self::Ledger(err) => !matches!(
                err,
                PersistenceError::TransitionRejected(_)
                    | PersistenceError::ReservationNotFound(_)
                    | PersistenceError::CorruptRecord(_)
            ),
            Self::InvalidSignature(_)
            | Self::MalformedNotification(_)
            | Self::UnknownReservation { .. }
            | Self::CorrelationMismatch { .. }
            | Self::AmountMismatch { .. } => false,
        }
    }
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature(err) => write!(f, "Invalid signature: {err}"),
            Self::MalformedNotification(err) => write!(f, "Malformed notification: {err}"),
            Self::UnknownReservation {
                payment_id,
                preference_id,
            } => match preference_id {
                Some(preference_id) => write!(
                    f,
                    "No reservation for preference '{preference_id}' (payment {payment_id})"
                ),
                None => write!(f, "Payment {payment_id} carries no preference"),
            },
            Self::CorrelationMismatch {
                reservation_id,
                external_reference,
            } => write!(
                f,
                "Payment references '{external_reference}' but its preference belongs to reservation {reservation_id}"
            ),
            Self::AmountMismatch {
                reservation_id,
                expected,
                actual,
            } => write!(
                f,
                "Payment of {actual} for reservation {reservation_id} does not match price {expected}"
            ),
            Self::Gateway(err) => write!(f, "Gateway error: {err}"),
            Self::Ledger(err) => write!(f, "Ledger error: {err}"),
        }
    }
}

impl std::error::Error for ReconcileError {}

/// Applies payment notifications to the ledger.
#[derive(Clone)]
pub struct WebhookReconciler {
    ledger: Arc<Mutex<Persistence>>,
    gateway: Arc<dyn PaymentGateway>,
    verifier: SignatureVerifier,
    gateway_timeout: Duration,
}

impl std::fmt::Debug for WebhookReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookReconciler")
            .field("verifier", &self.verifier)
            .field("gateway_timeout", &self.gateway_timeout)
            .finish_non_exhaustive()
    }
}

impl WebhookReconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(
        ledger: Arc<Mutex<Persistence>>,
        gateway: Arc<dyn PaymentGateway>,
        verifier: SignatureVerifier,
        gateway_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            gateway,
            verifier,
            gateway_timeout,
        }
    }

    async fn find_by_preference(
        &self,
        preference_id: &str,
    ) -> Result<Option<Reservation>, ReconcileError> {
        self.ledger
            .lock()
            .await
            .find_by_preference_id(preference_id)
            .map_err(ReconcileError::Ledger)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentReport, ReconcileError> {
        tokio::time::timeout(self.gateway_timeout, self.gateway.fetch_payment(payment_id))
            .await
            .map_err(|_| {
                ReconcileError::Gateway(GatewayError::Unavailable(format!(
                    "no answer within {}s",
                    self.gateway_timeout.as_secs()
                )))
            })?
            .map_err(ReconcileError::Gateway)
    }

    /// Reconciles one notification.
    ///
    /// Nothing is written unless every check passes.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature or notification is invalid, the
    /// payment cannot be tied to exactly one reservation, the amount is
    /// wrong, or the gateway or ledger fail.
    pub async fn reconcile(
        &self,
        delivery: &WebhookDelivery,
        now: OffsetDateTime,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let outcome = self.reconcile_inner(delivery, now).await;
        match &outcome {
            Ok(ReconcileOutcome::Applied {
                reservation_id,
                previous_state,
                state,
            }) => info!(reservation_id, from = %previous_state, to = %state, "Payment reconciled"),
            Ok(ReconcileOutcome::Ignored {
                reservation_id,
                reason,
            }) => info!(?reservation_id, %reason, "Notification ignored"),
            Err(err) if err.is_transient() => {
                warn!(error = %err, "Notification failed, provider should retry");
            }
            Err(err) => warn!(error = %err, "Notification rejected"),
        }
        outcome
    }

    async fn reconcile_inner(
        &self,
        delivery: &WebhookDelivery,
        now: OffsetDateTime,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        // Fail closed before looking at the payload.
        if delivery
            .signature
            .as_deref()
            .is_none_or(|s| s.trim().is_empty())
        {
            return Err(ReconcileError::InvalidSignature(SignatureError::Missing));
        }

        // The signature covers the payment id, so it has to be parsed first.
        let notification: PaymentNotification =
            PaymentNotification::parse(&delivery.query, &delivery.body)
                .map_err(ReconcileError::MalformedNotification)?;
        self.verifier
            .verify(
                delivery.signature.as_deref(),
                delivery.request_id.as_deref(),
                &notification.payment_id,
                now,
            )
            .map_err(ReconcileError::InvalidSignature)?;

        if !notification.is_payment() {
            return Ok(ReconcileOutcome::Ignored {
                reservation_id: None,
                reason: IgnoreReason::UnsupportedTopic(
                    notification.topic.clone().unwrap_or_default(),
                ),
            });
        }

        let unknown = |preference_id: Option<String>| ReconcileError::UnknownReservation {
            payment_id: notification.payment_id.clone(),
            preference_id,
        };

        // Resolve early when the notification names its preference, so that
        // notifications for unknown reservations never reach the gateway.
        let mut reservation: Option<Reservation> = None;
        if let Some(preference_id) = &notification.preference_id {
            reservation = Some(
                self.find_by_preference(preference_id)
                    .await?
                    .ok_or_else(|| unknown(Some(preference_id.clone())))?,
            );
        }

        let report: PaymentReport = self.fetch_payment(&notification.payment_id).await?;
        debug!(payment_id = %report.payment_id, status = %report.status, "Fetched authoritative payment");

        if let (Some(named), Some(fetched)) = (&notification.preference_id, &report.preference_id)
            && named != fetched
        {
            return Err(unknown(Some(fetched.clone())));
        }

        let reservation: Reservation = match reservation {
            Some(reservation) => reservation,
            None => {
                let preference_id: &str =
                    report.preference_id.as_deref().ok_or_else(|| unknown(None))?;
                self.find_by_preference(preference_id)
                    .await?
                    .ok_or_else(|| unknown(Some(preference_id.to_string())))?
            }
        };

        if let Some(reference) = &report.external_reference
            && reference.trim() != reservation.id.to_string()
        {
            return Err(ReconcileError::CorrelationMismatch {
                reservation_id: reservation.id,
                external_reference: reference.clone(),
            });
        }
        // The notification's own preference_id is unsigned. The fetched
        // payment must tie itself to the reservation.
        if report.preference_id.is_none() && report.external_reference.is_none() {
            return Err(unknown(notification.preference_id.clone()));
        }

        let cause: Cause = Cause::new(
            delivery
                .request_id
                .clone()
                .unwrap_or_else(|| format!("payment-{}", report.payment_id)),
            format!("Payment notification for {}", report.payment_id),
        );
        let mut previous_state: ReservationState = reservation.state;
        let update: LedgerUpdate = self
            .ledger
            .lock()
            .await
            .update_reservation(reservation.id, |current| {
                previous_state = current.state;
                apply(
                    current,
                    ReservationCommand::RecordPayment { report },
                    Actor::gateway(),
                    cause,
                    now,
                )
            })
            .map_err(|err| match err {
                PersistenceError::TransitionRejected(CoreError::PaymentAmountMismatch {
                    reservation_id,
                    expected,
                    actual,
                }) => ReconcileError::AmountMismatch {
                    reservation_id,
                    expected,
                    actual,
                },
                other => ReconcileError::Ledger(other),
            })?;

        Ok(match update {
            LedgerUpdate::Applied(updated) => ReconcileOutcome::Applied {
                reservation_id: updated.id,
                previous_state,
                state: updated.state,
            },
            LedgerUpdate::Unchanged {
                reservation,
                reason,
            } => ReconcileOutcome::Ignored {
                reservation_id: Some(reservation.id),
                reason: IgnoreReason::NoChange(reason),
            },
        })
    }
}
