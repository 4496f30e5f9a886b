// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use fieldbook_domain::{NewReservation, Reservation, format_timestamp};
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::NewReservationRow;
use crate::diesel_schema::reservations;
use crate::error::PersistenceError;

/// Inserts a newly granted reservation and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails, including when the held-instance
/// index rejects a duplicate label.
pub fn insert_reservation(
    conn: &mut SqliteConnection,
    reservation: &NewReservation,
) -> Result<i64, PersistenceError> {
    let row: NewReservationRow = NewReservationRow::from_domain(reservation)?;

    diesel::insert_into(reservations::table)
        .values(&row)
        .execute(conn)?;

    let reservation_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        reservation_id,
        slot = %reservation.slot,
        instance_label = %reservation.instance_label,
        "Reservation created"
    );

    Ok(reservation_id)
}

/// Writes the mutable columns of a reservation.
///
/// The update only matches while the stored state still equals
/// `before.state`. Slot, instance, customer and price are never written.
///
/// # Errors
///
/// Returns an error if:
/// - The preference id is already used by another reservation
/// - The stored row no longer matches `before`
/// - The update fails
pub fn update_reservation(
    conn: &mut SqliteConnection,
    before: &Reservation,
    after: &Reservation,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        reservations::table
            .filter(reservations::reservation_id.eq(before.id))
            .filter(reservations::state.eq(before.state.as_str())),
    )
    .set((
        reservations::payment_method.eq(after.payment_method.as_deref()),
        reservations::external_payment_id.eq(after.external_payment_id.as_deref()),
        reservations::preference_id.eq(after.preference_id.as_deref()),
        reservations::payment_redirect_url.eq(after.payment_redirect_url.as_deref()),
        reservations::state.eq(after.state.as_str()),
        reservations::updated_at.eq(format_timestamp(after.updated_at)),
    ))
    .execute(conn)
    .map_err(|e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            PersistenceError::PreferenceConflict(after.preference_id.clone().unwrap_or_default())
        }
        other => PersistenceError::from(other),
    })?;

    if updated != 1 {
        return Err(PersistenceError::DatabaseError(format!(
            "Reservation {} changed underneath an update",
            before.id
        )));
    }

    info!(
        reservation_id = before.id,
        from = %before.state,
        to = %after.state,
        "Reservation updated"
    );
    Ok(())
}
