// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment checkout creation.
//!
//! The ledger lock is taken twice: once to read the reservation and once to
//! attach the preference. It is released while the gateway is called.

use std::time::Duration;

use fieldbook::{CoreError, ReservationCommand, apply};
use fieldbook_audit::{Actor, Cause};
use fieldbook_domain::{DomainError, Money, Reservation, ReservationState};
use fieldbook_payments::{PaymentGateway, Preference, PreferenceRequest};
use fieldbook_persistence::{Persistence, PersistenceError};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{
    ApiError, translate_domain_error, translate_gateway_error, translate_persistence_error,
};
use crate::request_response::{CreatePreferenceRequest, CreatePreferenceResponse};

fn stored_preference(reservation: &Reservation) -> Option<CreatePreferenceResponse> {
    match (&reservation.preference_id, &reservation.payment_redirect_url) {
        (Some(preference_id), Some(redirect_url)) => Some(CreatePreferenceResponse {
            reservation_id: reservation.id,
            preference_id: preference_id.clone(),
            redirect_url: redirect_url.clone(),
        }),
        _ => None,
    }
}

/// Issues (or returns the already issued) payment checkout for a reservation.
///
/// Only `pendiente` reservations can be paid for, and the requested amount
/// must equal the price snapshotted at booking. Nothing is written unless
/// the gateway returned a preference.
///
/// # Errors
///
/// Returns an error if:
/// - The reservation does not exist or is not pending
/// - The amount is malformed or differs from the price
/// - The gateway is unavailable, times out, or refuses the request
/// - The ledger write fails
pub async fn create_payment_preference(
    ledger: &Mutex<Persistence>,
    gateway: &dyn PaymentGateway,
    request: CreatePreferenceRequest,
    gateway_timeout: Duration,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CreatePreferenceResponse, ApiError> {
    let amount: Money = Money::parse(&request.amount).map_err(translate_domain_error)?;

    let reservation: Reservation = ledger
        .lock()
        .await
        .get_reservation(request.reservation_id)
        .map_err(translate_persistence_error)?;

    // A stored checkout is only handed out while the reservation can still be paid.
    if reservation.state != ReservationState::Pending {
        return Err(translate_domain_error(DomainError::PreferenceNotAllowed {
            reservation_id: reservation.id,
            state: reservation.state.to_string(),
        }));
    }
    if let Some(existing) = stored_preference(&reservation) {
        info!(
            reservation_id = reservation.id,
            preference_id = %existing.preference_id,
            "Returning existing payment preference"
        );
        return Ok(existing);
    }
    if amount != reservation.price {
        return Err(ApiError::InvalidInput {
            field: String::from("amount"),
            message: format!(
                "Amount {amount} does not match the reservation price {}",
                reservation.price
            ),
        });
    }

    let preference_request: PreferenceRequest = PreferenceRequest {
        reservation_id: reservation.id,
        title: format!(
            "{} {} {}",
            reservation.instance_label,
            reservation.slot.timeslot.date_string(),
            reservation.slot.timeslot.start_string()
        ),
        payer_email: reservation.customer.email.clone(),
        payer_name: request
            .payer
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| reservation.customer.name.clone()),
        amount: reservation.price,
    };

    let preference: Preference = tokio::time::timeout(
        gateway_timeout,
        gateway.create_preference(preference_request),
    )
    .await
    .map_err(|_| ApiError::GatewayUnavailable {
        message: format!("no answer within {}s", gateway_timeout.as_secs()),
    })?
    .map_err(translate_gateway_error)?;

    let actor: Actor = Actor::customer(&reservation.customer.email);
    let command: ReservationCommand = ReservationCommand::AttachPreference {
        preference_id: preference.preference_id.clone(),
        redirect_url: preference.redirect_url.clone(),
    };

    let mut persistence = ledger.lock().await;
    let result = persistence.update_reservation(reservation.id, |current| {
        apply(current, command, actor, cause, now)
    });

    match result {
        Ok(update) => stored_preference(update.reservation()).ok_or_else(|| ApiError::Internal {
            message: format!("Reservation {} lost its preference", reservation.id),
        }),
        Err(PersistenceError::TransitionRejected(CoreError::DomainViolation(
            DomainError::PreferenceAlreadyAttached { .. },
        ))) => {
            // A concurrent request attached its preference first; ours is never used.
            warn!(
                reservation_id = reservation.id,
                orphaned_preference = %preference.preference_id,
                "Preference raced with another request"
            );
            let current: Reservation = persistence
                .get_reservation(reservation.id)
                .map_err(translate_persistence_error)?;
            stored_preference(&current).ok_or_else(|| ApiError::Internal {
                message: format!("Reservation {} has no usable preference", reservation.id),
            })
        }
        Err(e) => Err(translate_persistence_error(e)),
    }
}
