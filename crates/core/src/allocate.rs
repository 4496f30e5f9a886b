// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Slot allocation.
//!
//! Allocation is planned here from the set of instance numbers currently
//! held for a slot. Reading that set and storing the granted reservation
//! must happen in one atomic unit; that is the ledger's job.

use crate::capacity::CapacityProvider;
use crate::error::CoreError;
use fieldbook_audit::{Action, Actor, Cause, TransitionRecord};
use fieldbook_domain::{
    Customer, Money, NewReservation, ReservationState, SlotKey, validate_customer,
};
use time::OffsetDateTime;

/// What a facility charges and offers for a requested slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTerms {
    /// Configured instance count for the field type.
    pub capacity: u32,
    /// Price of one slot, snapshotted onto the reservation.
    pub price: Money,
}

/// A booking request that has not yet been granted an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    /// The requested slot.
    pub slot: SlotKey,
    /// The customer making the booking.
    pub customer: Customer,
    /// Who is making the request.
    pub actor: Actor,
    /// Why the request was made.
    pub cause: Cause,
    /// When the request was made.
    pub requested_at: OffsetDateTime,
}

/// A granted allocation, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// The reservation to store.
    pub reservation: NewReservation,
    /// The creation record to store with it.
    pub record: TransitionRecord,
}

/// Validates a booking request against facility metadata.
///
/// # Errors
///
/// Returns an error if:
/// - The facility is unknown
/// - The field type is not offered by the facility
/// - The slot falls outside opening hours
/// - The customer's identity fields are invalid
pub fn booking_terms<P: CapacityProvider + ?Sized>(
    provider: &P,
    slot: &SlotKey,
    customer: &Customer,
) -> Result<BookingTerms, CoreError> {
    let capacity: u32 = provider.capacity(&slot.facility_id, &slot.field_type)?;
    let price: Money = provider.price_per_hour(&slot.facility_id, &slot.field_type)?;
    provider
        .facility(&slot.facility_id)?
        .validate_slot(&slot.timeslot)?;
    validate_customer(customer)?;

    Ok(BookingTerms { capacity, price })
}

/// Returns the lowest instance number in `1..=capacity` not in `held`.
///
/// Returns `None` when the held set is already at or above capacity.
#[must_use]
pub fn lowest_free_instance(capacity: u32, held: &[u32]) -> Option<u32> {
    if held_count(held) >= capacity {
        return None;
    }
    (1..=capacity).find(|instance| !held.contains(instance))
}

/// Remaining capacity, saturating at zero.
#[must_use]
pub fn count_available(capacity: u32, held: usize) -> u32 {
    capacity.saturating_sub(u32::try_from(held).unwrap_or(u32::MAX))
}

/// Plans the allocation of the lowest free instance to a draft.
///
/// # Arguments
///
/// * `terms` - Capacity and price for the requested slot
/// * `held` - Instance numbers currently held by capacity-holding reservations
/// * `draft` - The booking request
///
/// # Errors
///
/// Returns `CoreError::NoCapacity` if every instance is held.
pub fn allocate(
    terms: &BookingTerms,
    held: &[u32],
    draft: ReservationDraft,
) -> Result<Grant, CoreError> {
    let Some(instance_number) = lowest_free_instance(terms.capacity, held) else {
        return Err(CoreError::NoCapacity {
            slot: draft.slot.to_string(),
            capacity: terms.capacity,
        });
    };

    let instance_label: String = draft.slot.field_type.instance_label(instance_number);
    let action: Action = Action::new(
        String::from("CreateReservation"),
        Some(format!("Granted {instance_label} for {}", draft.slot)),
    );
    let record: TransitionRecord = TransitionRecord::new(
        None,
        None,
        ReservationState::Pending,
        draft.actor,
        draft.cause,
        action,
        draft.requested_at,
    );

    Ok(Grant {
        reservation: NewReservation {
            slot: draft.slot,
            instance_number,
            instance_label,
            customer: draft.customer,
            price: terms.price,
            created_at: draft.requested_at,
        },
        record,
    })
}

fn held_count(held: &[u32]) -> u32 {
    u32::try_from(held.len()).unwrap_or(u32::MAX)
}
