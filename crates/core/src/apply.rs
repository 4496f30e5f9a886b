// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::ReservationCommand;
use crate::error::CoreError;
use crate::state::{NoChangeReason, TransitionOutcome, TransitionResult};
use fieldbook_audit::{Action, Actor, Cause, TransitionRecord};
use fieldbook_domain::{DomainError, PaymentReport, Reservation, ReservationState};
use time::OffsetDateTime;

/// Applies a command to a reservation, producing the changed reservation and
/// its audit record.
///
/// This function is pure: it performs no I/O, and the input reservation is
/// never modified. The caller persists an `Applied` outcome atomically.
///
/// # Arguments
///
/// * `reservation` - The current reservation (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The time of the change
///
/// # Returns
///
/// * `Ok(TransitionOutcome::Applied)` with the new reservation and record
/// * `Ok(TransitionOutcome::Unchanged)` when there is nothing to do
/// * `Err(CoreError)` if the command is refused
///
/// # Errors
///
/// Returns an error if:
/// - The transition is not permitted by the reservation lifecycle
/// - A different preference is already attached, or the reservation is not pending
/// - An approved payment's amount differs from the reservation price
/// - A paid reservation would lack its payment id or method
pub fn apply(
    reservation: &Reservation,
    command: ReservationCommand,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionOutcome, CoreError> {
    let action_name: &'static str = command.action_name();
    match command {
        ReservationCommand::Confirm => {
            if reservation.state == ReservationState::Confirmed {
                return Ok(TransitionOutcome::Unchanged(NoChangeReason::AlreadyApplied));
            }
            reservation
                .state
                .validate_transition(ReservationState::Confirmed)?;

            let mut updated: Reservation = reservation.clone();
            updated.state = ReservationState::Confirmed;
            Ok(applied(
                reservation,
                updated,
                Action::new(String::from(action_name), None),
                actor,
                cause,
                now,
            ))
        }
        ReservationCommand::Cancel { reason } => {
            reservation
                .state
                .validate_transition(ReservationState::Cancelled)?;

            let mut updated: Reservation = reservation.clone();
            updated.state = ReservationState::Cancelled;
            Ok(applied(
                reservation,
                updated,
                Action::new(String::from(action_name), Some(reason)),
                actor,
                cause,
                now,
            ))
        }
        ReservationCommand::ExpireHold { cutoff } => {
            let eligible: bool = reservation.state == ReservationState::Pending
                && reservation.external_payment_id.is_none()
                && reservation.created_at < cutoff;
            if !eligible {
                return Ok(TransitionOutcome::Unchanged(NoChangeReason::NotEligible));
            }

            let mut updated: Reservation = reservation.clone();
            updated.state = ReservationState::Cancelled;
            Ok(applied(
                reservation,
                updated,
                Action::new(
                    String::from(action_name),
                    Some(format!("Hold created at {} expired", reservation.created_at)),
                ),
                actor,
                cause,
                now,
            ))
        }
        ReservationCommand::AttachPreference {
            preference_id,
            redirect_url,
        } => {
            if let Some(existing) = &reservation.preference_id {
                if *existing == preference_id {
                    return Ok(TransitionOutcome::Unchanged(NoChangeReason::AlreadyApplied));
                }
                return Err(CoreError::DomainViolation(
                    DomainError::PreferenceAlreadyAttached {
                        reservation_id: reservation.id,
                        existing: existing.clone(),
                    },
                ));
            }
            if reservation.state != ReservationState::Pending {
                return Err(CoreError::DomainViolation(
                    DomainError::PreferenceNotAllowed {
                        reservation_id: reservation.id,
                        state: reservation.state.to_string(),
                    },
                ));
            }

            let mut updated: Reservation = reservation.clone();
            updated.preference_id = Some(preference_id.clone());
            updated.payment_redirect_url = Some(redirect_url);
            Ok(applied(
                reservation,
                updated,
                Action::new(
                    String::from(action_name),
                    Some(format!("Preference {preference_id}")),
                ),
                actor,
                cause,
                now,
            ))
        }
        ReservationCommand::RecordPayment { report } => {
            record_payment(reservation, report, action_name, actor, cause, now)
        }
    }
}

/// Decides how an authoritative payment report changes a reservation.
///
/// Terminal reservations, conflicting payment ids, unknown statuses and
/// stale reports all leave the reservation unchanged.
fn record_payment(
    reservation: &Reservation,
    report: PaymentReport,
    action_name: &'static str,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionOutcome, CoreError> {
    if reservation.state.is_terminal() {
        return Ok(TransitionOutcome::Unchanged(
            NoChangeReason::AlreadyTerminal(reservation.state),
        ));
    }

    if let Some(existing) = &reservation.external_payment_id
        && *existing != report.payment_id
    {
        return Ok(TransitionOutcome::Unchanged(
            NoChangeReason::ConflictingPayment {
                existing: existing.clone(),
                incoming: report.payment_id,
            },
        ));
    }

    let Some(target) = report.status.target_state() else {
        return Ok(TransitionOutcome::Unchanged(
            NoChangeReason::UnknownGatewayStatus(report.status.as_str().to_string()),
        ));
    };

    if target == ReservationState::Paid && report.amount != reservation.price {
        return Err(CoreError::PaymentAmountMismatch {
            reservation_id: reservation.id,
            expected: reservation.price,
            actual: report.amount,
        });
    }

    let mut updated: Reservation = reservation.clone();
    updated.external_payment_id = Some(report.payment_id.clone());
    if report.payment_method.is_some() {
        updated.payment_method.clone_from(&report.payment_method);
    }

    if target == reservation.state {
        if updated == *reservation {
            return Ok(TransitionOutcome::Unchanged(NoChangeReason::AlreadyApplied));
        }
    } else {
        if reservation.state.validate_transition(target).is_err() {
            return Ok(TransitionOutcome::Unchanged(NoChangeReason::OutOfOrder {
                current: reservation.state,
                target,
            }));
        }
        updated.state = target;
    }
    updated.validate()?;

    let details: String = format!(
        "Payment {} reported {}",
        report.payment_id,
        report.status.as_str()
    );
    Ok(applied(
        reservation,
        updated,
        Action::new(String::from(action_name), Some(details)),
        actor,
        cause,
        now,
    ))
}

fn applied(
    before: &Reservation,
    mut after: Reservation,
    action: Action,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> TransitionOutcome {
    after.updated_at = now;
    let record: TransitionRecord = TransitionRecord::new(
        Some(before.id),
        Some(before.state),
        after.state,
        actor,
        cause,
        action,
        now,
    );
    TransitionOutcome::Applied(TransitionResult {
        reservation: after,
        record,
    })
}
