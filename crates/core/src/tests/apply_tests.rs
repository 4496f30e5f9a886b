// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    BOOKED_AT, create_test_actor, create_test_cause, create_test_reservation,
};
use crate::{
    CoreError, NoChangeReason, ReservationCommand, TransitionOutcome, TransitionResult, apply,
};
use fieldbook_audit::Actor;
use fieldbook_domain::{DomainError, Reservation, ReservationState};
use time::{Duration, OffsetDateTime};

fn later() -> OffsetDateTime {
    BOOKED_AT + Duration::minutes(5)
}

fn expect_applied(outcome: TransitionOutcome) -> TransitionResult {
    match outcome {
        TransitionOutcome::Applied(result) => result,
        TransitionOutcome::Unchanged(reason) => panic!("expected a change, got {reason}"),
    }
}

#[test]
fn test_confirm_pending_reservation() {
    let reservation: Reservation = create_test_reservation(ReservationState::Pending);

    let result: TransitionResult = expect_applied(
        apply(
            &reservation,
            ReservationCommand::Confirm,
            create_test_actor(),
            create_test_cause(),
            later(),
        )
        .unwrap(),
    );

    assert_eq!(result.reservation.state, ReservationState::Confirmed);
    assert_eq!(result.reservation.updated_at, later());
    assert_eq!(result.record.previous_state, Some(ReservationState::Pending));
    assert_eq!(result.record.new_state, ReservationState::Confirmed);
    assert_eq!(result.record.reservation_id, Some(1));
    assert_eq!(result.record.action.name, "Confirm");
}

#[test]
fn test_apply_does_not_mutate_input() {
    let reservation: Reservation = create_test_reservation(ReservationState::Pending);
    let before: Reservation = reservation.clone();

    let _ = apply(
        &reservation,
        ReservationCommand::Confirm,
        create_test_actor(),
        create_test_cause(),
        later(),
    )
    .unwrap();

    assert_eq!(reservation, before);
}

#[test]
fn test_confirm_is_idempotent() {
    let reservation: Reservation = create_test_reservation(ReservationState::Confirmed);

    let outcome: TransitionOutcome = apply(
        &reservation,
        ReservationCommand::Confirm,
        create_test_actor(),
        create_test_cause(),
        later(),
    )
    .unwrap();

    assert_eq!(
        outcome,
        TransitionOutcome::Unchanged(NoChangeReason::AlreadyApplied)
    );
}

#[test]
fn test_confirm_terminal_reservation_fails() {
    let reservation: Reservation = create_test_reservation(ReservationState::Cancelled);

    let result = apply(
        &reservation,
        ReservationCommand::Confirm,
        create_test_actor(),
        create_test_cause(),
        later(),
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidStateTransition { .. }
        ))
    ));
}

#[test]
fn test_cancel_from_each_non_terminal_state() {
    for state in [ReservationState::Pending, ReservationState::Confirmed] {
        let reservation: Reservation = create_test_reservation(state);

        let result: TransitionResult = expect_applied(
            apply(
                &reservation,
                ReservationCommand::Cancel {
                    reason: String::from("customer called"),
                },
                create_test_actor(),
                create_test_cause(),
                later(),
            )
            .unwrap(),
        );

        assert_eq!(result.reservation.state, ReservationState::Cancelled);
        assert!(!result.reservation.holds_capacity());
        assert_eq!(
            result.record.action.details,
            Some(String::from("customer called"))
        );
    }
}

#[test]
fn test_cancel_terminal_reservation_fails() {
    for state in [
        ReservationState::Paid,
        ReservationState::Rejected,
        ReservationState::Cancelled,
    ] {
        let reservation: Reservation = create_test_reservation(state);
        let result = apply(
            &reservation,
            ReservationCommand::Cancel {
                reason: String::from("late"),
            },
            create_test_actor(),
            create_test_cause(),
            later(),
        );
        assert!(result.is_err(), "cancelling {state} should fail");
    }
}

#[test]
fn test_expire_stale_hold() {
    let reservation: Reservation = create_test_reservation(ReservationState::Pending);

    let result: TransitionResult = expect_applied(
        apply(
            &reservation,
            ReservationCommand::ExpireHold {
                cutoff: BOOKED_AT + Duration::minutes(1),
            },
            Actor::system("hold-sweeper"),
            create_test_cause(),
            later(),
        )
        .unwrap(),
    );

    assert_eq!(result.reservation.state, ReservationState::Cancelled);
    assert_eq!(result.record.action.name, "ExpireHold");
    assert_eq!(result.record.actor.actor_type, "system");
}

#[test]
fn test_expire_hold_skips_fresh_or_paying_reservations() {
    let fresh: Reservation = create_test_reservation(ReservationState::Pending);
    let mut paying: Reservation = create_test_reservation(ReservationState::Pending);
    paying.external_payment_id = Some(String::from("P1"));
    let confirmed: Reservation = create_test_reservation(ReservationState::Confirmed);

    let cases = [
        (fresh, BOOKED_AT),
        (paying, later()),
        (confirmed, later()),
    ];
    for (reservation, cutoff) in cases {
        let outcome: TransitionOutcome = apply(
            &reservation,
            ReservationCommand::ExpireHold { cutoff },
            Actor::system("hold-sweeper"),
            create_test_cause(),
            later(),
        )
        .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Unchanged(NoChangeReason::NotEligible)
        );
    }
}

fn attach(reservation: &Reservation, preference_id: &str) -> Result<TransitionOutcome, CoreError> {
    apply(
        reservation,
        ReservationCommand::AttachPreference {
            preference_id: String::from(preference_id),
            redirect_url: format!("https://pay.example/checkout/{preference_id}"),
        },
        Actor::customer("ana@example.com"),
        create_test_cause(),
        later(),
    )
}

#[test]
fn test_attach_preference_to_pending_reservation() {
    let mut reservation: Reservation = create_test_reservation(ReservationState::Pending);
    reservation.preference_id = None;
    reservation.payment_redirect_url = None;

    let result: TransitionResult = expect_applied(attach(&reservation, "pref-9").unwrap());

    assert_eq!(result.reservation.preference_id, Some(String::from("pref-9")));
    assert_eq!(
        result.reservation.payment_redirect_url,
        Some(String::from("https://pay.example/checkout/pref-9"))
    );
    assert_eq!(result.reservation.state, ReservationState::Pending);
    assert_eq!(result.record.action.name, "AttachPreference");
}

#[test]
fn test_attach_same_preference_is_idempotent() {
    let reservation: Reservation = create_test_reservation(ReservationState::Pending);
    assert_eq!(
        attach(&reservation, "pref-1").unwrap(),
        TransitionOutcome::Unchanged(NoChangeReason::AlreadyApplied)
    );
}

#[test]
fn test_preference_is_set_once() {
    let reservation: Reservation = create_test_reservation(ReservationState::Pending);
    assert!(matches!(
        attach(&reservation, "pref-2"),
        Err(CoreError::DomainViolation(
            DomainError::PreferenceAlreadyAttached { .. }
        ))
    ));
}

#[test]
fn test_attach_preference_requires_pending() {
    let mut reservation: Reservation = create_test_reservation(ReservationState::Confirmed);
    reservation.preference_id = None;
    assert!(matches!(
        attach(&reservation, "pref-9"),
        Err(CoreError::DomainViolation(
            DomainError::PreferenceNotAllowed { .. }
        ))
    ));
}
