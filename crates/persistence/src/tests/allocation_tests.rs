// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{
    BOOKED_AT, book, create_test_catalog, create_test_draft, create_test_persistence,
    create_test_slot, run_command,
};
use crate::{Availability, PersistenceError};
use fieldbook::{CoreError, ReservationCommand};
use fieldbook_audit::{Actor, TransitionRecord};
use fieldbook_domain::{DomainError, FacilityId, Reservation, ReservationState};
use time::macros::date;

#[test]
fn test_first_allocation_gets_instance_one() {
    let mut persistence = create_test_persistence();

    let reservation: Reservation = book(&mut persistence, "ana@example.com");

    assert_eq!(reservation.instance_number, 1);
    assert_eq!(reservation.instance_label, "5v5 — Instance 1");
    assert_eq!(reservation.state, ReservationState::Pending);
    assert_eq!(reservation.price.cents(), 2500);
    assert_eq!(reservation.created_at, BOOKED_AT);
    assert!(reservation.external_payment_id.is_none());
    assert!(reservation.preference_id.is_none());
}

#[test]
fn test_allocations_take_successive_labels_until_full() {
    let mut persistence = create_test_persistence();

    let first = book(&mut persistence, "a@example.com");
    let second = book(&mut persistence, "b@example.com");
    let third = book(&mut persistence, "c@example.com");

    assert_eq!(
        [
            first.instance_number,
            second.instance_number,
            third.instance_number
        ],
        [1, 2, 3]
    );

    let result = persistence.allocate_reservation(
        &create_test_catalog(),
        create_test_draft(create_test_slot("5v5", "18:00"), "d@example.com"),
    );
    assert!(matches!(
        result,
        Err(PersistenceError::TransitionRejected(CoreError::NoCapacity { capacity: 3, .. }))
    ));
}

#[test]
fn test_failed_allocation_writes_nothing() {
    let mut persistence = create_test_persistence();
    let slot = create_test_slot("padel", "18:00");

    persistence
        .allocate_reservation(&create_test_catalog(), create_test_draft(slot.clone(), "a@example.com"))
        .unwrap();
    let refused = persistence.allocate_reservation(
        &create_test_catalog(),
        create_test_draft(slot, "b@example.com"),
    );

    assert!(refused.is_err());
    let day = persistence
        .list_reservations_for_day(&FacilityId::new("norte").unwrap(), date!(2024 - 06 - 01))
        .unwrap();
    assert_eq!(day.len(), 1);
}

#[test]
fn test_cancelled_label_is_reused() {
    let mut persistence = create_test_persistence();
    let _first = book(&mut persistence, "a@example.com");
    let second = book(&mut persistence, "b@example.com");
    let _third = book(&mut persistence, "c@example.com");

    run_command(
        &mut persistence,
        second.id,
        ReservationCommand::Cancel {
            reason: String::from("customer request"),
        },
        Actor::admin("admin-1"),
    )
    .unwrap();

    let replacement = book(&mut persistence, "d@example.com");
    assert_eq!(replacement.instance_number, 2);
    assert_eq!(replacement.instance_label, "5v5 — Instance 2");
}

#[test]
fn test_availability_counts_only_holding_states() {
    let mut persistence = create_test_persistence();
    let catalog = create_test_catalog();
    let slot = create_test_slot("5v5", "18:00");

    let paid_candidate = book(&mut persistence, "a@example.com");
    let cancelled = book(&mut persistence, "b@example.com");

    run_command(
        &mut persistence,
        paid_candidate.id,
        ReservationCommand::Confirm,
        Actor::admin("admin-1"),
    )
    .unwrap();
    run_command(
        &mut persistence,
        cancelled.id,
        ReservationCommand::Cancel {
            reason: String::from("no-show"),
        },
        Actor::admin("admin-1"),
    )
    .unwrap();

    let availability: Availability = persistence.availability(&catalog, &slot).unwrap();
    assert_eq!(
        availability,
        Availability {
            capacity: 3,
            held: 1,
            available: 2,
        }
    );
    assert_eq!(persistence.held_instances(&slot).unwrap(), vec![1]);
}

#[test]
fn test_slots_are_independent() {
    let mut persistence = create_test_persistence();
    let catalog = create_test_catalog();

    let evening = persistence
        .allocate_reservation(
            &catalog,
            create_test_draft(create_test_slot("padel", "18:00"), "a@example.com"),
        )
        .unwrap();
    let later = persistence
        .allocate_reservation(
            &catalog,
            create_test_draft(create_test_slot("padel", "19:00"), "a@example.com"),
        )
        .unwrap();

    assert_eq!(evening.instance_number, 1);
    assert_eq!(later.instance_number, 1);
}

#[test]
fn test_allocation_validates_slot_and_customer() {
    let mut persistence = create_test_persistence();
    let catalog = create_test_catalog();

    let closed = persistence.allocate_reservation(
        &catalog,
        create_test_draft(create_test_slot("5v5", "23:00"), "a@example.com"),
    );
    assert!(matches!(
        closed,
        Err(PersistenceError::TransitionRejected(CoreError::DomainViolation(
            DomainError::SlotOutsideOpeningHours { .. }
        )))
    ));

    let bad_email = persistence.allocate_reservation(
        &catalog,
        create_test_draft(create_test_slot("5v5", "18:00"), "not-an-email"),
    );
    assert!(matches!(
        bad_email,
        Err(PersistenceError::TransitionRejected(CoreError::DomainViolation(
            DomainError::InvalidEmail(_)
        )))
    ));

    let unknown = persistence.allocate_reservation(
        &catalog,
        create_test_draft(create_test_slot("tennis", "18:00"), "a@example.com"),
    );
    assert!(matches!(
        unknown,
        Err(PersistenceError::TransitionRejected(CoreError::DomainViolation(
            DomainError::UnknownFieldType { .. }
        )))
    ));
}

#[test]
fn test_allocation_records_creation() {
    let mut persistence = create_test_persistence();
    let reservation = book(&mut persistence, "ana@example.com");

    let history: Vec<TransitionRecord> =
        persistence.get_transition_history(reservation.id).unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reservation_id, Some(reservation.id));
    assert_eq!(history[0].previous_state, None);
    assert_eq!(history[0].new_state, ReservationState::Pending);
    assert_eq!(history[0].action.name, "CreateReservation");
    assert_eq!(history[0].actor.id, "ana@example.com");
    assert_eq!(history[0].at, BOOKED_AT);
}

#[test]
fn test_get_missing_reservation() {
    let mut persistence = create_test_persistence();

    assert_eq!(
        persistence.get_reservation(42),
        Err(PersistenceError::ReservationNotFound(42))
    );
}
