// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversion to and from domain values.

use crate::diesel_schema::{reservation_transitions, reservations};
use crate::error::PersistenceError;
use diesel::prelude::*;
use fieldbook_audit::{Action, Actor, Cause, TransitionRecord};
use fieldbook_domain::{
    Customer, FacilityId, FieldType, Money, NewReservation, Reservation, ReservationState,
    SlotKey, Timeslot, format_timestamp, parse_timestamp,
};
use num_traits::ToPrimitive;

/// A stored reservation row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReservationRow {
    pub reservation_id: i64,
    pub facility_id: String,
    pub field_type: String,
    pub slot_date: String,
    pub slot_time: String,
    pub instance_number: i32,
    pub instance_label: String,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub price_cents: i64,
    pub payment_method: Option<String>,
    pub external_payment_id: Option<String>,
    pub preference_id: Option<String>,
    pub payment_redirect_url: Option<String>,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ReservationRow {
    /// Rebuilds the domain reservation, validating every stored value.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if a column cannot be parsed.
    pub fn into_domain(self) -> Result<Reservation, PersistenceError> {
        let id: i64 = self.reservation_id;
        let corrupt = |what: &str, err: &dyn std::fmt::Display| {
            PersistenceError::CorruptRecord(format!("reservation {id}: {what}: {err}"))
        };

        let slot: SlotKey = SlotKey::new(
            FacilityId::new(&self.facility_id).map_err(|e| corrupt("facility_id", &e))?,
            FieldType::new(&self.field_type).map_err(|e| corrupt("field_type", &e))?,
            Timeslot::parse(&self.slot_date, &self.slot_time).map_err(|e| corrupt("slot", &e))?,
        );
        let instance_number: u32 = self.instance_number.to_u32().ok_or_else(|| {
            corrupt("instance_number", &self.instance_number)
        })?;

        Ok(Reservation {
            id,
            slot,
            instance_number,
            instance_label: self.instance_label,
            customer: Customer::new(self.customer_email, self.customer_name, self.customer_phone),
            price: Money::from_cents(self.price_cents).map_err(|e| corrupt("price_cents", &e))?,
            payment_method: self.payment_method,
            external_payment_id: self.external_payment_id,
            preference_id: self.preference_id,
            payment_redirect_url: self.payment_redirect_url,
            state: self
                .state
                .parse::<ReservationState>()
                .map_err(|e| corrupt("state", &e))?,
            created_at: parse_timestamp(&self.created_at).map_err(|e| corrupt("created_at", &e))?,
            updated_at: parse_timestamp(&self.updated_at).map_err(|e| corrupt("updated_at", &e))?,
        })
    }
}

/// Insertable form of a newly granted reservation.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow {
    pub facility_id: String,
    pub field_type: String,
    pub slot_date: String,
    pub slot_time: String,
    pub instance_number: i32,
    pub instance_label: String,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub price_cents: i64,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
}

impl NewReservationRow {
    /// Builds the insertable row. New reservations are always `PENDING`.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance number does not fit the column.
    pub fn from_domain(reservation: &NewReservation) -> Result<Self, PersistenceError> {
        let instance_number: i32 = reservation.instance_number.to_i32().ok_or_else(|| {
            PersistenceError::QueryFailed(format!(
                "instance number {} out of range",
                reservation.instance_number
            ))
        })?;
        let created_at: String = format_timestamp(reservation.created_at);

        Ok(Self {
            facility_id: reservation.slot.facility_id.to_string(),
            field_type: reservation.slot.field_type.to_string(),
            slot_date: reservation.slot.timeslot.date_string(),
            slot_time: reservation.slot.timeslot.start_string(),
            instance_number,
            instance_label: reservation.instance_label.clone(),
            customer_email: reservation.customer.email.trim().to_string(),
            customer_name: reservation.customer.name.trim().to_string(),
            customer_phone: reservation.customer.phone.clone(),
            price_cents: reservation.price.cents(),
            state: ReservationState::Pending.as_str().to_string(),
            created_at: created_at.clone(),
            updated_at: created_at,
        })
    }
}

/// A stored transition row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservation_transitions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransitionRow {
    pub transition_id: i64,
    pub reservation_id: i64,
    pub previous_state: Option<String>,
    pub new_state: String,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action_name: String,
    pub action_details: Option<String>,
    pub occurred_at: String,
}

impl TransitionRow {
    /// Rebuilds the audit record.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if a column cannot be parsed.
    pub fn into_domain(self) -> Result<TransitionRecord, PersistenceError> {
        let id: i64 = self.transition_id;
        let corrupt = |what: &str, err: &dyn std::fmt::Display| {
            PersistenceError::CorruptRecord(format!("transition {id}: {what}: {err}"))
        };

        let previous_state: Option<ReservationState> = self
            .previous_state
            .as_deref()
            .map(str::parse::<ReservationState>)
            .transpose()
            .map_err(|e| corrupt("previous_state", &e))?;

        Ok(TransitionRecord::new(
            Some(self.reservation_id),
            previous_state,
            self.new_state
                .parse::<ReservationState>()
                .map_err(|e| corrupt("new_state", &e))?,
            Actor::new(self.actor_id, self.actor_type),
            Cause::new(self.cause_id, self.cause_description),
            Action::new(self.action_name, self.action_details),
            parse_timestamp(&self.occurred_at).map_err(|e| corrupt("occurred_at", &e))?,
        ))
    }
}

/// Insertable form of a transition record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservation_transitions)]
pub struct NewTransitionRow {
    pub reservation_id: i64,
    pub previous_state: Option<String>,
    pub new_state: String,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action_name: String,
    pub action_details: Option<String>,
    pub occurred_at: String,
}

impl NewTransitionRow {
    /// Builds the insertable row for a record bound to `reservation_id`.
    #[must_use]
    pub fn from_domain(reservation_id: i64, record: &TransitionRecord) -> Self {
        Self {
            reservation_id,
            previous_state: record.previous_state.map(|s| s.as_str().to_string()),
            new_state: record.new_state.as_str().to_string(),
            actor_id: record.actor.id.clone(),
            actor_type: record.actor.actor_type.clone(),
            cause_id: record.cause.id.clone(),
            cause_description: record.cause.description.clone(),
            action_name: record.action.name.clone(),
            action_details: record.action.details.clone(),
            occurred_at: format_timestamp(record.at),
        }
    }
}
