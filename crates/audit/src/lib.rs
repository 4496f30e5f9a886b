// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use fieldbook_domain::ReservationState;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change:
/// a customer, an operator, the payment gateway or a background task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (`customer`, `admin`, `gateway` or `system`).
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// A customer acting on their own booking, identified by email.
    #[must_use]
    pub fn customer(email: &str) -> Self {
        Self::new(email.to_string(), String::from("customer"))
    }

    /// An operator acting administratively.
    #[must_use]
    pub fn admin(id: &str) -> Self {
        Self::new(id.to_string(), String::from("admin"))
    }

    /// The payment gateway, via a verified notification.
    #[must_use]
    pub fn gateway() -> Self {
        Self::new(String::from("payment-gateway"), String::from("gateway"))
    }

    /// A background task of this system.
    #[must_use]
    pub fn system(task: &str) -> Self {
        Self::new(task.to_string(), String::from("system"))
    }
}

/// Represents the reason or trigger for an action.
///
/// A cause describes why a state change was initiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, payment ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`CreateReservation`", "`RecordPayment`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// An immutable record of one reservation state change.
///
/// Every successful change to a reservation, creation included, produces
/// exactly one record, written in the same transaction as the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The reservation, once the ledger has assigned an id.
    pub reservation_id: Option<i64>,
    /// The state before the change; `None` at creation.
    pub previous_state: Option<ReservationState>,
    /// The state after the change.
    pub new_state: ReservationState,
    /// The actor who initiated this change.
    pub actor: Actor,
    /// The cause or reason for this change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// When the change happened (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl TransitionRecord {
    /// Creates a new `TransitionRecord`.
    ///
    /// # Arguments
    ///
    /// * `reservation_id` - The reservation, if already persisted
    /// * `previous_state` - The state before the change
    /// * `new_state` - The state after the change
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `at` - When the change happened
    #[must_use]
    pub const fn new(
        reservation_id: Option<i64>,
        previous_state: Option<ReservationState>,
        new_state: ReservationState,
        actor: Actor,
        cause: Cause,
        action: Action,
        at: OffsetDateTime,
    ) -> Self {
        Self {
            reservation_id,
            previous_state,
            new_state,
            actor,
            cause,
            action,
            at,
        }
    }

    /// Returns the record bound to the given reservation id.
    #[must_use]
    pub fn for_reservation(mut self, reservation_id: i64) -> Self {
        self.reservation_id = Some(reservation_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn create_test_record() -> TransitionRecord {
        TransitionRecord::new(
            None,
            None,
            ReservationState::Pending,
            Actor::customer("ana@example.com"),
            Cause::new(String::from("req-456"), String::from("Booking request")),
            Action::new(String::from("CreateReservation"), None),
            datetime!(2024-06-01 12:00:00 UTC),
        )
    }

    #[test]
    fn test_actor_creation_requires_all_fields() {
        let actor: Actor = Actor::new(String::from("op-1"), String::from("admin"));

        assert_eq!(actor.id, "op-1");
        assert_eq!(actor.actor_type, "admin");
    }

    #[test]
    fn test_actor_helpers_set_type() {
        assert_eq!(Actor::customer("ana@example.com").actor_type, "customer");
        assert_eq!(Actor::admin("op-1").actor_type, "admin");
        assert_eq!(Actor::gateway().actor_type, "gateway");
        assert_eq!(Actor::system("hold-sweeper").actor_type, "system");
        assert_eq!(Actor::system("hold-sweeper").id, "hold-sweeper");
    }

    #[test]
    fn test_cause_creation_requires_all_fields() {
        let cause: Cause = Cause::new(String::from("req-456"), String::from("User request"));

        assert_eq!(cause.id, "req-456");
        assert_eq!(cause.description, "User request");
    }

    #[test]
    fn test_action_creation_with_details() {
        let action: Action = Action::new(
            String::from("Cancel"),
            Some(String::from("customer called")),
        );

        assert_eq!(action.name, "Cancel");
        assert_eq!(action.details, Some(String::from("customer called")));
    }

    #[test]
    fn test_record_binds_reservation_id() {
        let record: TransitionRecord = create_test_record();
        assert_eq!(record.reservation_id, None);

        let bound: TransitionRecord = record.clone().for_reservation(42);
        assert_eq!(bound.reservation_id, Some(42));
        assert_eq!(bound.new_state, record.new_state);
        assert_eq!(bound.actor, record.actor);
    }

    #[test]
    fn test_creation_record_has_no_previous_state() {
        let record: TransitionRecord = create_test_record();
        assert_eq!(record.previous_state, None);
        assert_eq!(record.action.name, "CreateReservation");
    }
}
