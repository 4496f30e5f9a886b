// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    NOW, book, create_test_booking_request, create_test_catalog, create_test_cause,
    create_test_persistence, create_test_slot_query,
};
use crate::{
    ApiError, CancelReservationRequest, ConfirmReservationRequest, HOLD_EXPIRY_ACTOR,
    cancel_reservation, check_availability, confirm_reservation, create_booking,
    expire_stale_holds, get_reservation, get_reservation_history, list_reservations_for_day,
};
use time::Duration;

fn admin_cancel(reason: &str) -> CancelReservationRequest {
    CancelReservationRequest {
        actor_id: String::from("admin-1"),
        actor_type: None,
        reason: String::from(reason),
    }
}

#[test]
fn test_two_bookings_then_no_capacity() {
    let mut persistence = create_test_persistence();

    let first = book(&mut persistence, "a@example.com");
    let second = book(&mut persistence, "b@example.com");
    let third = create_booking(
        &mut persistence,
        &create_test_catalog(),
        create_test_booking_request("c@example.com"),
        create_test_cause(),
        NOW,
    );

    assert_eq!(first.instance_label, "5v5 — Instance 1");
    assert_eq!(second.instance_label, "5v5 — Instance 2");
    assert_eq!(first.state, "pendiente");
    assert_eq!(first.price, "25.00");
    assert!(matches!(
        third,
        Err(ApiError::NoCapacity { capacity: 2, .. })
    ));
}

#[test]
fn test_availability_reflects_bookings() {
    let mut persistence = create_test_persistence();
    let catalog = create_test_catalog();

    let before = check_availability(&mut persistence, &catalog, &create_test_slot_query()).unwrap();
    assert_eq!((before.capacity, before.held, before.available), (2, 0, 2));
    assert_eq!(before.price, "25.00");

    book(&mut persistence, "a@example.com");
    let after = check_availability(&mut persistence, &catalog, &create_test_slot_query()).unwrap();
    assert_eq!((after.held, after.available), (1, 1));
}

#[test]
fn test_availability_validation_errors() {
    let mut persistence = create_test_persistence();
    let catalog = create_test_catalog();

    let mut unknown = create_test_slot_query();
    unknown.facility_id = String::from("sur");
    assert!(matches!(
        check_availability(&mut persistence, &catalog, &unknown),
        Err(ApiError::ResourceNotFound { .. })
    ));

    let mut off_hour = create_test_slot_query();
    off_hour.time = String::from("18:30");
    assert!(matches!(
        check_availability(&mut persistence, &catalog, &off_hour),
        Err(ApiError::InvalidInput { field, .. }) if field == "time"
    ));

    let mut bad_date = create_test_slot_query();
    bad_date.date = String::from("2024-13-01");
    assert!(matches!(
        check_availability(&mut persistence, &catalog, &bad_date),
        Err(ApiError::InvalidInput { field, .. }) if field == "date"
    ));
}

#[test]
fn test_booking_rejects_bad_customer() {
    let mut persistence = create_test_persistence();
    let mut request = create_test_booking_request("ana@example.com");
    request.customer_name = String::from("  ");

    let result = create_booking(
        &mut persistence,
        &create_test_catalog(),
        request,
        create_test_cause(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { field, .. }) if field == "customer_name"
    ));
}

#[test]
fn test_confirm_and_cancel() {
    let mut persistence = create_test_persistence();
    let booked = book(&mut persistence, "ana@example.com");

    let confirmed = confirm_reservation(
        &mut persistence,
        booked.reservation_id,
        &ConfirmReservationRequest {
            actor_id: String::from("admin-1"),
        },
        create_test_cause(),
        NOW,
    )
    .unwrap();
    assert!(confirmed.changed);
    assert_eq!(confirmed.reservation.state, "confirmada");

    let again = confirm_reservation(
        &mut persistence,
        booked.reservation_id,
        &ConfirmReservationRequest {
            actor_id: String::from("admin-1"),
        },
        create_test_cause(),
        NOW,
    )
    .unwrap();
    assert!(!again.changed);

    let cancelled = cancel_reservation(
        &mut persistence,
        booked.reservation_id,
        admin_cancel("rain"),
        create_test_cause(),
        NOW,
    )
    .unwrap();
    assert_eq!(cancelled.reservation.state, "cancelada");

    let refused = cancel_reservation(
        &mut persistence,
        booked.reservation_id,
        admin_cancel("again"),
        create_test_cause(),
        NOW,
    );
    assert!(matches!(
        refused,
        Err(ApiError::DomainRuleViolation { rule, .. }) if rule == "reservation_lifecycle"
    ));
}

#[test]
fn test_customer_can_only_cancel_own_reservation() {
    let mut persistence = create_test_persistence();
    let booked = book(&mut persistence, "ana@example.com");

    let stranger = cancel_reservation(
        &mut persistence,
        booked.reservation_id,
        CancelReservationRequest {
            actor_id: String::from("eve@example.com"),
            actor_type: Some(String::from("customer")),
            reason: String::from("mischief"),
        },
        create_test_cause(),
        NOW,
    );
    assert!(matches!(
        stranger,
        Err(ApiError::DomainRuleViolation { rule, .. }) if rule == "customer_owns_reservation"
    ));

    let owner = cancel_reservation(
        &mut persistence,
        booked.reservation_id,
        CancelReservationRequest {
            actor_id: String::from("ANA@example.com"),
            actor_type: Some(String::from("customer")),
            reason: String::from("cannot make it"),
        },
        create_test_cause(),
        NOW,
    )
    .unwrap();
    assert_eq!(owner.reservation.state, "cancelada");

    let history = get_reservation_history(&mut persistence, booked.reservation_id).unwrap();
    let last = history.transitions.last().unwrap();
    assert_eq!(last.actor_id, "ana@example.com");
    assert_eq!(last.actor_type, "customer");
}

#[test]
fn test_unknown_actor_type() {
    let mut persistence = create_test_persistence();
    let booked = book(&mut persistence, "ana@example.com");

    let result = cancel_reservation(
        &mut persistence,
        booked.reservation_id,
        CancelReservationRequest {
            actor_id: String::from("x"),
            actor_type: Some(String::from("robot")),
            reason: String::from("?"),
        },
        create_test_cause(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { field, .. }) if field == "actor_type"
    ));
}

#[test]
fn test_get_and_history() {
    let mut persistence = create_test_persistence();
    let booked = book(&mut persistence, "ana@example.com");

    let fetched = get_reservation(&mut persistence, booked.reservation_id).unwrap();
    assert_eq!(fetched, booked);
    assert_eq!(fetched.created_at, "2024-06-01T12:00:00Z");

    let history = get_reservation_history(&mut persistence, booked.reservation_id).unwrap();
    assert_eq!(history.transitions.len(), 1);
    assert_eq!(history.transitions[0].previous_state, None);
    assert_eq!(history.transitions[0].new_state, "pendiente");
    assert_eq!(history.transitions[0].action, "CreateReservation");

    assert!(matches!(
        get_reservation(&mut persistence, 999),
        Err(ApiError::ResourceNotFound { .. })
    ));
    assert!(matches!(
        get_reservation_history(&mut persistence, 999),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_day_schedule() {
    let mut persistence = create_test_persistence();
    let catalog = create_test_catalog();
    book(&mut persistence, "a@example.com");
    book(&mut persistence, "b@example.com");

    let day = list_reservations_for_day(&mut persistence, &catalog, "norte", "2024-06-01").unwrap();
    assert_eq!(day.reservations.len(), 2);
    assert_eq!(day.reservations[0].instance_number, 1);

    let empty = list_reservations_for_day(&mut persistence, &catalog, "norte", "2024-06-02").unwrap();
    assert!(empty.reservations.is_empty());

    assert!(matches!(
        list_reservations_for_day(&mut persistence, &catalog, "sur", "2024-06-01"),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_expire_stale_holds_frees_capacity() {
    let mut persistence = create_test_persistence();
    let catalog = create_test_catalog();
    let stale = book(&mut persistence, "a@example.com");
    let kept = book(&mut persistence, "b@example.com");
    confirm_reservation(
        &mut persistence,
        kept.reservation_id,
        &ConfirmReservationRequest {
            actor_id: String::from("admin-1"),
        },
        create_test_cause(),
        NOW,
    )
    .unwrap();

    let later = NOW + Duration::minutes(45);
    let swept = expire_stale_holds(&mut persistence, later - Duration::minutes(30), later).unwrap();

    assert_eq!(swept.expired, vec![stale.reservation_id]);
    assert!(swept.skipped.is_empty());

    let history = get_reservation_history(&mut persistence, stale.reservation_id).unwrap();
    let last = history.transitions.last().unwrap();
    assert_eq!(last.new_state, "cancelada");
    assert_eq!(last.actor_id, HOLD_EXPIRY_ACTOR);
    assert_eq!(last.actor_type, "system");

    let replacement = book(&mut persistence, "c@example.com");
    assert_eq!(replacement.instance_number, 1);

    let availability =
        check_availability(&mut persistence, &catalog, &create_test_slot_query()).unwrap();
    assert_eq!(availability.available, 0);
}

#[test]
fn test_fresh_holds_are_not_expired() {
    let mut persistence = create_test_persistence();
    book(&mut persistence, "a@example.com");

    let swept =
        expire_stale_holds(&mut persistence, NOW - Duration::minutes(30), NOW).unwrap();

    assert!(swept.expired.is_empty());
}
