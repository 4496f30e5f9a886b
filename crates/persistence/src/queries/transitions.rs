// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldbook_audit::TransitionRecord;

use crate::data_models::TransitionRow;
use crate::diesel_schema::reservation_transitions;
use crate::error::PersistenceError;

/// Returns the audit trail of a reservation, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn history_for_reservation(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> Result<Vec<TransitionRecord>, PersistenceError> {
    reservation_transitions::table
        .filter(reservation_transitions::reservation_id.eq(reservation_id))
        .order(reservation_transitions::transition_id.asc())
        .select(TransitionRow::as_select())
        .load::<TransitionRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("history_for_reservation: {e}")))?
        .into_iter()
        .map(TransitionRow::into_domain)
        .collect()
}
