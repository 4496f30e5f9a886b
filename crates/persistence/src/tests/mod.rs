// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod allocation_tests;
mod concurrency_tests;

use crate::{LedgerUpdate, Persistence};
use fieldbook::{Catalog, ReservationCommand, ReservationDraft, apply};
use fieldbook_audit::{Actor, Cause};
use fieldbook_domain::{
    Customer, Facility, FacilityId, FieldType, Money, Reservation, SlotKey, Timeslot,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::{datetime, time};

pub const BOOKED_AT: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);
pub const LATER: OffsetDateTime = datetime!(2024-06-01 12:05:00 UTC);

/// Facility `norte`: three 5v5 fields at 25.00 and one padel court at 12.50.
pub fn create_test_facility() -> Facility {
    let mut counts: BTreeMap<FieldType, u32> = BTreeMap::new();
    counts.insert(FieldType::new("5v5").unwrap(), 3);
    counts.insert(FieldType::new("padel").unwrap(), 1);
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

pub fn create_test_customer(email: &str) -> Customer {
    Customer::new(String::from(email), String::from("Ana"), None)
}

pub fn create_test_draft(slot: SlotKey, email: &str) -> ReservationDraft {
    ReservationDraft {
        slot,
        customer: create_test_customer(email),
        actor: Actor::customer(email),
        cause: Cause::new(String::from("req-1"), String::from("Booking request")),
        requested_at: BOOKED_AT,
    }
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

/// Books the 18:00 5v5 slot for the given customer.
pub fn book(persistence: &mut Persistence, email: &str) -> Reservation {
    persistence
        .allocate_reservation(
            &create_test_catalog(),
            create_test_draft(create_test_slot("5v5", "18:00"), email),
        )
        .expect("allocation should succeed")
}

/// Runs a command through the state machine against the ledger.
pub fn run_command(
    persistence: &mut Persistence,
    reservation_id: i64,
    command: ReservationCommand,
    actor: Actor,
) -> Result<LedgerUpdate, crate::PersistenceError> {
    persistence.update_reservation(reservation_id, |current| {
        apply(
            current,
            command,
            actor,
            Cause::new(String::from("req-2"), String::from("Test command")),
            LATER,
        )
    })
}
