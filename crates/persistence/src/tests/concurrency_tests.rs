// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Races between independent connections to one database file.

use super::{
    LATER, book, create_test_catalog, create_test_draft, create_test_slot, run_command,
};
use crate::{LedgerUpdate, Persistence, PersistenceError};
use fieldbook::{CoreError, NoChangeReason, ReservationCommand, apply};
use fieldbook_audit::{Actor, Cause};
use fieldbook_domain::{
    GatewayPaymentStatus, Money, PaymentReport, Reservation, ReservationState,
};
use std::path::{Path, PathBuf};
use std::sync::Barrier;
use std::sync::atomic::{AtomicU64, Ordering};

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn temp_database_path(name: &str) -> PathBuf {
    let n = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "fieldbook_{name}_{}_{n}.sqlite3",
        std::process::id()
    ))
}

pub fn remove_database(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

fn race(field_type: &str, contenders: usize) -> Vec<Result<Reservation, PersistenceError>> {
    let path = temp_database_path("race");
    // Open sequentially so only the first connection runs the migrations.
    let mut connections: Vec<Persistence> = (0..contenders)
        .map(|_| Persistence::new_with_file(&path).unwrap())
        .collect();

    let catalog = create_test_catalog();
    let barrier = Barrier::new(contenders);
    let results: Vec<Result<Reservation, PersistenceError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = connections
            .iter_mut()
            .enumerate()
            .map(|(i, persistence)| {
                let catalog = &catalog;
                let barrier = &barrier;
                scope.spawn(move || {
                    let draft = create_test_draft(
                        create_test_slot(field_type, "20:00"),
                        &format!("player{i}@example.com"),
                    );
                    barrier.wait();
                    persistence.allocate_reservation(catalog, draft)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    drop(connections);
    remove_database(&path);
    results
}

#[test]
fn test_concurrent_allocations_never_exceed_capacity() {
    let results = race("5v5", 8);

    let mut granted: Vec<u32> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|reservation| reservation.instance_number)
        .collect();
    granted.sort_unstable();

    assert_eq!(granted, vec![1, 2, 3]);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(
                e,
                PersistenceError::TransitionRejected(CoreError::NoCapacity { .. })
            ))
    );
}

#[test]
fn test_last_instance_goes_to_exactly_one_contender() {
    let results = race("padel", 2);

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
}

#[test]
fn test_duplicate_payment_deliveries_apply_once() {
    let path = temp_database_path("payment_race");
    let contenders = 6;
    let mut connections: Vec<Persistence> = (0..contenders)
        .map(|_| Persistence::new_with_file(&path).unwrap())
        .collect();

    let reservation_id: i64 = book(&mut connections[0], "ana@example.com").id;
    run_command(
        &mut connections[0],
        reservation_id,
        ReservationCommand::AttachPreference {
            preference_id: String::from("pref-1"),
            redirect_url: String::from("https://pay.example/checkout/pref-1"),
        },
        Actor::customer("ana@example.com"),
    )
    .unwrap();

    let barrier = Barrier::new(contenders);
    let updates: Vec<LedgerUpdate> = std::thread::scope(|scope| {
        let handles: Vec<_> = connections
            .iter_mut()
            .enumerate()
            .map(|(i, persistence)| {
                let barrier = &barrier;
                scope.spawn(move || {
                    let report = PaymentReport {
                        payment_id: String::from("P1"),
                        status: GatewayPaymentStatus::Approved,
                        amount: Money::parse("25.00").unwrap(),
                        external_reference: Some(reservation_id.to_string()),
                        preference_id: Some(String::from("pref-1")),
                        payment_method: Some(String::from("credit_card")),
                    };
                    barrier.wait();
                    persistence
                        .update_reservation_by_preference("pref-1", |current| {
                            apply(
                                current,
                                ReservationCommand::RecordPayment { report },
                                Actor::gateway(),
                                Cause::new(
                                    format!("delivery-{i}"),
                                    String::from("Payment notification"),
                                ),
                                LATER,
                            )
                        })
                        .unwrap()
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let applied = updates
        .iter()
        .filter(|u| matches!(u, LedgerUpdate::Applied(_)))
        .count();
    assert_eq!(applied, 1);
    assert!(updates.iter().all(|u| match u {
        LedgerUpdate::Applied(r) => r.state == ReservationState::Paid,
        LedgerUpdate::Unchanged { reason, .. } => {
            *reason == NoChangeReason::AlreadyTerminal(ReservationState::Paid)
        }
    }));

    let history = connections[0].get_transition_history(reservation_id).unwrap();
    let paid_records = history
        .iter()
        .filter(|r| r.new_state == ReservationState::Paid)
        .count();
    assert_eq!(paid_records, 1);

    drop(connections);
    remove_database(&path);
}
