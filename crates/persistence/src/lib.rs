// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation ledger for Fieldbook.
//!
//! The ledger is the single source of truth for which field instances are
//! occupied. It is built on Diesel with the `SQLite` backend.
//!
//! ## Atomicity
//!
//! Every write runs inside a `BEGIN IMMEDIATE` transaction, which takes the
//! database write lock before anything is read. Allocation reads the held
//! set, plans the grant and inserts the row under that lock, so two
//! concurrent allocations for the same slot serialize. State transitions
//! re-read the reservation under the lock before deciding, so a duplicate
//! webhook delivery observes the already-applied state.
//!
//! Other connections (including other processes) wait up to the busy
//! timeout for the lock. File databases run in WAL mode so readers never
//! block on the writer.
//!
//! ## Testing
//!
//! `new_in_memory()` creates a fresh shared-cache in-memory database per
//! call. Multi-connection race tests use a temporary database file.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use diesel::connection::Connection;
use fieldbook::{
    BookingTerms, CapacityProvider, CoreError, Grant, NoChangeReason, ReservationDraft,
    TransitionOutcome, allocate, booking_terms, count_available,
};
use fieldbook_audit::TransitionRecord;
use fieldbook_domain::{FacilityId, Reservation, SlotKey};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::{BUSY_TIMEOUT_MS, HELD_INSTANCE_INDEX, MIGRATIONS};
pub use error::PersistenceError;

/// Remaining capacity for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// Configured instance count.
    pub capacity: u32,
    /// Instances held by capacity-holding reservations.
    pub held: u32,
    /// Instances still free.
    pub available: u32,
}

/// The result of an atomic read-modify-write on a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerUpdate {
    /// The change was committed.
    Applied(Reservation),
    /// Nothing was written.
    Unchanged {
        /// The reservation as read under the lock.
        reservation: Reservation,
        /// Why nothing changed.
        reason: NoChangeReason,
    },
}

impl LedgerUpdate {
    /// Returns the reservation as it stands after the update.
    #[must_use]
    pub const fn reservation(&self) -> &Reservation {
        match self {
            Self::Applied(reservation) | Self::Unchanged { reservation, .. } => reservation,
        }
    }
}

/// Persistence adapter for the reservation ledger.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_ledger_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// Several adapters (in one or many processes) may open the same file;
    /// writes serialize on the database lock.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    /// Verifies that the held-instance backstop index exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is missing.
    pub fn verify_capacity_index(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_capacity_index(&mut self.conn)
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Returns remaining capacity for a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the facility or field type is unknown, or if the
    /// query fails.
    pub fn availability<P: CapacityProvider + ?Sized>(
        &mut self,
        provider: &P,
        slot: &SlotKey,
    ) -> Result<Availability, PersistenceError> {
        let capacity: u32 = provider
            .capacity(&slot.facility_id, &slot.field_type)
            .map_err(CoreError::from)?;
        let held: Vec<u32> = queries::reservations::held_instances(&mut self.conn, slot)?;
        let available: u32 = count_available(capacity, held.len());

        Ok(Availability {
            capacity,
            held: u32::try_from(held.len()).unwrap_or(u32::MAX),
            available,
        })
    }

    /// Returns the instance numbers currently held for a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn held_instances(&mut self, slot: &SlotKey) -> Result<Vec<u32>, PersistenceError> {
        queries::reservations::held_instances(&mut self.conn, slot)
    }

    /// Atomically grants the lowest free instance for a slot and stores a
    /// `PENDING` reservation together with its creation record.
    ///
    /// The held set is read, the grant planned and both rows inserted inside
    /// one immediate transaction. A failed allocation writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request fails validation (`TransitionRejected(DomainViolation)`)
    /// - Every instance is held (`TransitionRejected(NoCapacity)`)
    /// - The database write fails
    pub fn allocate_reservation<P: CapacityProvider + ?Sized>(
        &mut self,
        provider: &P,
        draft: ReservationDraft,
    ) -> Result<Reservation, PersistenceError> {
        let terms: BookingTerms = booking_terms(provider, &draft.slot, &draft.customer)?;

        let reservation: Reservation = self.conn.immediate_transaction(|conn| {
            let held: Vec<u32> = queries::reservations::held_instances(conn, &draft.slot)?;
            let grant: Grant = allocate(&terms, &held, draft)?;

            let reservation_id: i64 =
                mutations::reservations::insert_reservation(conn, &grant.reservation)?;
            mutations::transitions::insert_transition(conn, reservation_id, &grant.record)?;

            queries::reservations::get_reservation(conn, reservation_id)
        })?;

        info!(
            reservation_id = reservation.id,
            instance_label = %reservation.instance_label,
            "Allocated instance"
        );
        Ok(reservation)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Atomically reads a reservation, decides a change and writes it.
    ///
    /// `decide` sees the reservation as read under the write lock. An
    /// `Applied` outcome is written together with its transition record; an
    /// error from `decide` rolls back and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The reservation does not exist
    /// - `decide` refuses the change (`TransitionRejected`)
    /// - The database write fails
    pub fn update_reservation<F>(
        &mut self,
        reservation_id: i64,
        decide: F,
    ) -> Result<LedgerUpdate, PersistenceError>
    where
        F: FnOnce(&Reservation) -> Result<TransitionOutcome, CoreError>,
    {
        self.conn.immediate_transaction(|conn| {
            let current: Reservation = queries::reservations::get_reservation(conn, reservation_id)?;
            write_outcome(conn, current, decide)
        })
    }

    /// Like [`Self::update_reservation`], locating the reservation by its
    /// payment preference.
    ///
    /// Returns `Ok(None)` if no reservation carries the preference.
    ///
    /// # Errors
    ///
    /// Returns an error if `decide` refuses the change or the database fails.
    pub fn update_reservation_by_preference<F>(
        &mut self,
        preference_id: &str,
        decide: F,
    ) -> Result<Option<LedgerUpdate>, PersistenceError>
    where
        F: FnOnce(&Reservation) -> Result<TransitionOutcome, CoreError>,
    {
        self.conn.immediate_transaction(|conn| {
            let Some(current) = queries::reservations::find_by_preference_id(conn, preference_id)?
            else {
                return Ok(None);
            };
            write_outcome(conn, current, decide).map(Some)
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Retrieves a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ReservationNotFound` if it does not exist.
    pub fn get_reservation(&mut self, reservation_id: i64) -> Result<Reservation, PersistenceError> {
        queries::reservations::get_reservation(&mut self.conn, reservation_id)
    }

    /// Looks up a reservation by its payment preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_by_preference_id(
        &mut self,
        preference_id: &str,
    ) -> Result<Option<Reservation>, PersistenceError> {
        queries::reservations::find_by_preference_id(&mut self.conn, preference_id)
    }

    /// Lists every reservation for a facility on a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_reservations_for_day(
        &mut self,
        facility_id: &FacilityId,
        date: Date,
    ) -> Result<Vec<Reservation>, PersistenceError> {
        queries::reservations::list_for_day(&mut self.conn, facility_id, date)
    }

    /// Returns ids of unpaid pending holds created before `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn stale_pending_ids(
        &mut self,
        cutoff: OffsetDateTime,
    ) -> Result<Vec<i64>, PersistenceError> {
        queries::reservations::stale_pending_ids(&mut self.conn, cutoff)
    }

    /// Returns the audit trail of a reservation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_transition_history(
        &mut self,
        reservation_id: i64,
    ) -> Result<Vec<TransitionRecord>, PersistenceError> {
        queries::transitions::history_for_reservation(&mut self.conn, reservation_id)
    }
}

fn write_outcome<F>(
    conn: &mut SqliteConnection,
    current: Reservation,
    decide: F,
) -> Result<LedgerUpdate, PersistenceError>
where
    F: FnOnce(&Reservation) -> Result<TransitionOutcome, CoreError>,
{
    match decide(&current)? {
        TransitionOutcome::Unchanged(reason) => {
            debug!(reservation_id = current.id, %reason, "No change to reservation");
            Ok(LedgerUpdate::Unchanged {
                reservation: current,
                reason,
            })
        }
        TransitionOutcome::Applied(result) => {
            mutations::reservations::update_reservation(conn, &current, &result.reservation)?;
            mutations::transitions::insert_transition(conn, current.id, &result.record)?;
            let stored: Reservation = queries::reservations::get_reservation(conn, current.id)?;
            Ok(LedgerUpdate::Applied(stored))
        }
    }
}
