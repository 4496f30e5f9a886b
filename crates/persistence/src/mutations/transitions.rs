// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldbook_audit::TransitionRecord;

use crate::data_models::NewTransitionRow;
use crate::diesel_schema::reservation_transitions;
use crate::error::PersistenceError;

/// Appends a transition record for a reservation.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. the reservation does not exist).
pub fn insert_transition(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    record: &TransitionRecord,
) -> Result<(), PersistenceError> {
    diesel::insert_into(reservation_transitions::table)
        .values(&NewTransitionRow::from_domain(reservation_id, record))
        .execute(conn)?;
    Ok(())
}
