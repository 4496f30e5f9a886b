// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Synchronous API handlers over the reservation ledger.
//!
//! Each handler parses its request into domain types, runs the core rules
//! through the ledger and maps every error through the `translate_*`
//! functions. Reservations only change through
//! [`Persistence::allocate_reservation`] and [`Persistence::update_reservation`].

use fieldbook::{CapacityProvider, ReservationCommand, ReservationDraft, apply};
use fieldbook_audit::{Actor, Cause};
use fieldbook_domain::{
    Customer, Facility, FacilityId, FieldType, Money, Reservation, SlotKey, Timeslot, parse_date,
};
use fieldbook_persistence::{Availability, LedgerUpdate, Persistence};
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    AvailabilityResponse, CancelReservationRequest, ConfirmReservationRequest,
    CreateBookingRequest, DayScheduleResponse, ExpireHoldsResponse, ReservationHistoryResponse,
    ReservationResponse, SlotQuery, TransitionRecordResponse, TransitionResponse,
};

/// Actor recorded for hold expiry.
pub const HOLD_EXPIRY_ACTOR: &str = "hold-expiry";

fn parse_slot(
    facility_id: &str,
    field_type: &str,
    date: &str,
    time: &str,
) -> Result<SlotKey, ApiError> {
    let facility_id: FacilityId = FacilityId::new(facility_id).map_err(translate_domain_error)?;
    let field_type: FieldType = FieldType::new(field_type).map_err(translate_domain_error)?;
    let timeslot: Timeslot = Timeslot::parse(date, time).map_err(translate_domain_error)?;
    Ok(SlotKey::new(facility_id, field_type, timeslot))
}

fn transition_response(update: &LedgerUpdate) -> TransitionResponse {
    match update {
        LedgerUpdate::Applied(reservation) => TransitionResponse {
            reservation: ReservationResponse::from(reservation),
            changed: true,
            message: format!("Reservation {} is now {}", reservation.id, reservation.state),
        },
        LedgerUpdate::Unchanged {
            reservation,
            reason,
        } => TransitionResponse {
            reservation: ReservationResponse::from(reservation),
            changed: false,
            message: format!("No change: {reason}"),
        },
    }
}

/// Reports remaining capacity for a slot.
///
/// # Errors
///
/// Returns an error if:
/// - The slot is malformed or outside opening hours
/// - The facility or field type is unknown
/// - The ledger cannot be read
pub fn check_availability(
    persistence: &mut Persistence,
    provider: &dyn CapacityProvider,
    query: &SlotQuery,
) -> Result<AvailabilityResponse, ApiError> {
    let slot: SlotKey = parse_slot(&query.facility_id, &query.field_type, &query.date, &query.time)?;

    let facility: &Facility = provider
        .facility(&slot.facility_id)
        .map_err(translate_domain_error)?;
    facility
        .validate_slot(&slot.timeslot)
        .map_err(translate_domain_error)?;
    let price: Money = facility
        .price_per_hour(&slot.field_type)
        .map_err(translate_domain_error)?;

    let availability: Availability = persistence
        .availability(provider, &slot)
        .map_err(translate_persistence_error)?;

    Ok(AvailabilityResponse {
        facility_id: slot.facility_id.to_string(),
        field_type: slot.field_type.to_string(),
        date: slot.timeslot.date_string(),
        time: slot.timeslot.start_string(),
        capacity: availability.capacity,
        held: availability.held,
        available: availability.available,
        price: price.to_string(),
    })
}

/// Books the lowest free instance of a slot for a customer.
///
/// The new reservation is `pendiente` and holds its instance until it is
/// paid, cancelled, rejected or expires.
///
/// # Errors
///
/// Returns an error if:
/// - The request fails validation
/// - The facility or field type is unknown
/// - Every instance is held (`ApiError::NoCapacity`)
/// - The ledger write fails
pub fn create_booking(
    persistence: &mut Persistence,
    provider: &dyn CapacityProvider,
    request: CreateBookingRequest,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ReservationResponse, ApiError> {
    let slot: SlotKey = parse_slot(
        &request.facility_id,
        &request.field_type,
        &request.date,
        &request.time,
    )?;
    let customer: Customer = Customer::new(
        request.customer_email.trim().to_string(),
        request.customer_name.trim().to_string(),
        request
            .customer_phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    );

    let draft: ReservationDraft = ReservationDraft {
        actor: Actor::customer(&customer.email),
        slot,
        customer,
        cause,
        requested_at: now,
    };

    let reservation: Reservation = persistence
        .allocate_reservation(provider, draft)
        .map_err(translate_persistence_error)?;

    Ok(ReservationResponse::from(&reservation))
}

/// Retrieves a reservation.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the reservation does not exist.
pub fn get_reservation(
    persistence: &mut Persistence,
    reservation_id: i64,
) -> Result<ReservationResponse, ApiError> {
    persistence
        .get_reservation(reservation_id)
        .map(|reservation| ReservationResponse::from(&reservation))
        .map_err(translate_persistence_error)
}

/// Retrieves a reservation's audit trail.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the reservation does not exist.
pub fn get_reservation_history(
    persistence: &mut Persistence,
    reservation_id: i64,
) -> Result<ReservationHistoryResponse, ApiError> {
    // Distinguish an unknown reservation from an empty trail.
    persistence
        .get_reservation(reservation_id)
        .map_err(translate_persistence_error)?;

    let transitions: Vec<TransitionRecordResponse> = persistence
        .get_transition_history(reservation_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(TransitionRecordResponse::from)
        .collect();

    Ok(ReservationHistoryResponse {
        reservation_id,
        transitions,
    })
}

/// Lists a facility's reservations for one day.
///
/// # Errors
///
/// Returns an error if the facility is unknown or the date is malformed.
pub fn list_reservations_for_day(
    persistence: &mut Persistence,
    provider: &dyn CapacityProvider,
    facility_id: &str,
    date: &str,
) -> Result<DayScheduleResponse, ApiError> {
    let facility_id: FacilityId = FacilityId::new(facility_id).map_err(translate_domain_error)?;
    provider
        .facility(&facility_id)
        .map_err(translate_domain_error)?;
    let date: Date = parse_date(date).map_err(translate_domain_error)?;

    let reservations: Vec<ReservationResponse> = persistence
        .list_reservations_for_day(&facility_id, date)
        .map_err(translate_persistence_error)?
        .iter()
        .map(ReservationResponse::from)
        .collect();

    Ok(DayScheduleResponse {
        facility_id: facility_id.to_string(),
        date: fieldbook_domain::format_date(date),
        reservations,
    })
}

/// Manually confirms a pending reservation.
///
/// # Errors
///
/// Returns an error if the reservation does not exist or is terminal.
pub fn confirm_reservation(
    persistence: &mut Persistence,
    reservation_id: i64,
    request: &ConfirmReservationRequest,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResponse, ApiError> {
    let actor: Actor = Actor::admin(&request.actor_id);
    let update: LedgerUpdate = persistence
        .update_reservation(reservation_id, |current| {
            apply(current, ReservationCommand::Confirm, actor, cause, now)
        })
        .map_err(translate_persistence_error)?;

    info!(reservation_id, changed = matches!(update, LedgerUpdate::Applied(_)), "Confirm handled");
    Ok(transition_response(&update))
}

/// Cancels a reservation, releasing its instance.
///
/// Customers may only cancel their own reservations.
///
/// # Errors
///
/// Returns an error if:
/// - The reservation does not exist or is terminal
/// - The actor type is unknown
/// - A customer tries to cancel someone else's reservation
pub fn cancel_reservation(
    persistence: &mut Persistence,
    reservation_id: i64,
    request: CancelReservationRequest,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResponse, ApiError> {
    let actor: Actor = match request.actor_type.as_deref().unwrap_or("admin") {
        "admin" => Actor::admin(&request.actor_id),
        "customer" => {
            let reservation: Reservation = persistence
                .get_reservation(reservation_id)
                .map_err(translate_persistence_error)?;
            if !reservation
                .customer
                .email
                .eq_ignore_ascii_case(request.actor_id.trim())
            {
                return Err(ApiError::DomainRuleViolation {
                    rule: String::from("customer_owns_reservation"),
                    message: format!(
                        "Reservation {reservation_id} does not belong to '{}'",
                        request.actor_id
                    ),
                });
            }
            Actor::customer(&reservation.customer.email)
        }
        other => {
            return Err(ApiError::InvalidInput {
                field: String::from("actor_type"),
                message: format!("Unknown actor type '{other}', expected admin or customer"),
            });
        }
    };

    let reason: String = request.reason;
    let update: LedgerUpdate = persistence
        .update_reservation(reservation_id, |current| {
            apply(current, ReservationCommand::Cancel { reason }, actor, cause, now)
        })
        .map_err(translate_persistence_error)?;

    info!(reservation_id, "Reservation cancelled");
    Ok(transition_response(&update))
}

/// Cancels every unpaid pending hold created before `cutoff`.
///
/// Each expiry is its own atomic transition. A reservation that is paid,
/// confirmed or cancelled between the scan and its transition is skipped.
///
/// # Errors
///
/// Returns an error if the candidate scan fails.
pub fn expire_stale_holds(
    persistence: &mut Persistence,
    cutoff: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<ExpireHoldsResponse, ApiError> {
    let candidates: Vec<i64> = persistence
        .stale_pending_ids(cutoff)
        .map_err(translate_persistence_error)?;

    let mut response: ExpireHoldsResponse = ExpireHoldsResponse::default();
    for reservation_id in candidates {
        let cause: Cause = Cause::new(
            format!("hold-expiry-{reservation_id}"),
            String::from("Payment hold timed out"),
        );
        let result = persistence.update_reservation(reservation_id, |current| {
            apply(
                current,
                ReservationCommand::ExpireHold { cutoff },
                Actor::system(HOLD_EXPIRY_ACTOR),
                cause,
                now,
            )
        });

        match result {
            Ok(LedgerUpdate::Applied(reservation)) => {
                info!(
                    reservation_id,
                    instance_label = %reservation.instance_label,
                    "Expired unpaid hold"
                );
                response.expired.push(reservation_id);
            }
            Ok(LedgerUpdate::Unchanged { .. }) => response.skipped.push(reservation_id),
            Err(e) => {
                warn!(reservation_id, error = %e, "Failed to expire hold");
                response.skipped.push(reservation_id);
            }
        }
    }

    Ok(response)
}
