// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Catalog, ReservationDraft};
use fieldbook_audit::{Actor, Cause};
use fieldbook_domain::{
    Customer, Facility, FacilityId, FieldType, GatewayPaymentStatus, Money, PaymentReport,
    Reservation, ReservationState, SlotKey, Timeslot,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::{datetime, time};

pub const BOOKED_AT: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);

pub fn create_test_actor() -> Actor {
    Actor::admin("admin-123")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn create_test_facility() -> Facility {
    let mut counts: BTreeMap<FieldType, u32> = BTreeMap::new();
    counts.insert(FieldType::new("5v5").unwrap(), 2);
    counts.insert(FieldType::new("padel").unwrap(), 0);
    let mut prices: BTreeMap<FieldType, Money> = BTreeMap::new();
    prices.insert(FieldType::new("5v5").unwrap(), Money::parse("25.00").unwrap());
    prices.insert(FieldType::new("padel").unwrap(), Money::parse("12.50").unwrap());

    Facility::new(
        FacilityId::new("norte").unwrap(),
        "Complejo Norte",
        time!(8:00),
        time!(23:00),
        counts,
        prices,
    )
    .unwrap()
}

pub fn create_test_catalog() -> Catalog {
    Catalog::new(vec![create_test_facility()]).unwrap()
}

pub fn create_test_slot(field_type: &str, start: &str) -> SlotKey {
    SlotKey::new(
        FacilityId::new("norte").unwrap(),
        FieldType::new(field_type).unwrap(),
        Timeslot::parse("2024-06-01", start).unwrap(),
    )
}

pub fn create_test_customer() -> Customer {
    Customer::new(
        String::from("ana@example.com"),
        String::from("Ana"),
        Some(String::from("+54 11 5555 0000")),
    )
}

pub fn create_test_draft() -> ReservationDraft {
    ReservationDraft {
        slot: create_test_slot("5v5", "18:00"),
        customer: create_test_customer(),
        actor: Actor::customer("ana@example.com"),
        cause: Cause::new(String::from("req-1"), String::from("Booking request")),
        requested_at: BOOKED_AT,
    }
}

pub fn create_test_reservation(state: ReservationState) -> Reservation {
    Reservation {
        id: 1,
        slot: create_test_slot("5v5", "18:00"),
        instance_number: 1,
        instance_label: String::from("5v5 — Instance 1"),
        customer: create_test_customer(),
        price: Money::parse("25.00").unwrap(),
        payment_method: None,
        external_payment_id: None,
        preference_id: Some(String::from("pref-1")),
        payment_redirect_url: Some(String::from("https://pay.example/checkout/pref-1")),
        state,
        created_at: BOOKED_AT,
        updated_at: BOOKED_AT,
    }
}

pub fn create_test_report(payment_id: &str, status: &str) -> PaymentReport {
    PaymentReport {
        payment_id: String::from(payment_id),
        status: GatewayPaymentStatus::parse(status),
        amount: Money::parse("25.00").unwrap(),
        external_reference: Some(String::from("1")),
        preference_id: Some(String::from("pref-1")),
        payment_method: Some(String::from("credit_card")),
    }
}
