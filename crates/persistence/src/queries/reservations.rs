// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldbook_domain::{FacilityId, Reservation, ReservationState, SlotKey, format_timestamp};
use num_traits::ToPrimitive;
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::data_models::ReservationRow;
use crate::diesel_schema::reservations;
use crate::error::PersistenceError;

fn holding_states() -> [&'static str; 3] {
    ReservationState::CAPACITY_HOLDING.map(|state| state.as_str())
}

/// Returns the instance numbers held by capacity-holding reservations for a slot.
///
/// # Errors
///
/// Returns an error if the query fails or a stored instance number is invalid.
pub fn held_instances(
    conn: &mut SqliteConnection,
    slot: &SlotKey,
) -> Result<Vec<u32>, PersistenceError> {
    let numbers: Vec<i32> = reservations::table
        .filter(reservations::facility_id.eq(slot.facility_id.as_str()))
        .filter(reservations::field_type.eq(slot.field_type.as_str()))
        .filter(reservations::slot_date.eq(slot.timeslot.date_string()))
        .filter(reservations::slot_time.eq(slot.timeslot.start_string()))
        .filter(reservations::state.eq_any(holding_states()))
        .select(reservations::instance_number)
        .order(reservations::instance_number.asc())
        .load::<i32>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("held_instances: {e}")))?;

    debug!(slot = %slot, held = numbers.len(), "Loaded held instances");

    numbers
        .into_iter()
        .map(|n| {
            n.to_u32().ok_or_else(|| {
                PersistenceError::CorruptRecord(format!("instance number {n} for {slot}"))
            })
        })
        .collect()
}

/// Retrieves a reservation by id.
///
/// # Errors
///
/// Returns `PersistenceError::ReservationNotFound` if no such reservation exists.
pub fn get_reservation(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> Result<Reservation, PersistenceError> {
    let row: Option<ReservationRow> = reservations::table
        .filter(reservations::reservation_id.eq(reservation_id))
        .select(ReservationRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_reservation: {e}")))?;

    row.ok_or(PersistenceError::ReservationNotFound(reservation_id))?
        .into_domain()
}

/// Looks up the reservation a gateway preference belongs to.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if no reservation
/// carries the preference.
pub fn find_by_preference_id(
    conn: &mut SqliteConnection,
    preference_id: &str,
) -> Result<Option<Reservation>, PersistenceError> {
    reservations::table
        .filter(reservations::preference_id.eq(preference_id))
        .select(ReservationRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_by_preference_id: {e}")))?
        .map(ReservationRow::into_domain)
        .transpose()
}

/// Lists every reservation for a facility on a date, in slot order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_day(
    conn: &mut SqliteConnection,
    facility_id: &FacilityId,
    date: Date,
) -> Result<Vec<Reservation>, PersistenceError> {
    reservations::table
        .filter(reservations::facility_id.eq(facility_id.as_str()))
        .filter(reservations::slot_date.eq(fieldbook_domain::format_date(date)))
        .order((
            reservations::slot_time.asc(),
            reservations::field_type.asc(),
            reservations::instance_number.asc(),
            reservations::reservation_id.asc(),
        ))
        .select(ReservationRow::as_select())
        .load::<ReservationRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_for_day: {e}")))?
        .into_iter()
        .map(ReservationRow::into_domain)
        .collect()
}

/// Returns ids of pending reservations without a payment created before `cutoff`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn stale_pending_ids(
    conn: &mut SqliteConnection,
    cutoff: OffsetDateTime,
) -> Result<Vec<i64>, PersistenceError> {
    reservations::table
        .filter(reservations::state.eq(ReservationState::Pending.as_str()))
        .filter(reservations::external_payment_id.is_null())
        .filter(reservations::created_at.lt(format_timestamp(cutoff)))
        .order(reservations::reservation_id.asc())
        .select(reservations::reservation_id)
        .load::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("stale_pending_ids: {e}")))
}
