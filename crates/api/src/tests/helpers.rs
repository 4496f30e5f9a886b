// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::collections::BTreeMap;

use fieldbook::Catalog;
use fieldbook_audit::Cause;
use fieldbook_domain::{Facility, FacilityId, FieldType, Money};
use fieldbook_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::{datetime, time};

use crate::{CreateBookingRequest, ReservationResponse, SlotQuery, create_booking};

pub const NOW: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

/// Facility `norte` with two 5v5 fields at 25.00.
pub fn create_test_catalog() -> Catalog {
    let mut counts: BTreeMap<FieldType, u32> = BTreeMap::new();
    counts.insert(FieldType::new("5v5").unwrap(), 2);
    let mut prices: BTreeMap<FieldType, Money> = BTreeMap::new();
    prices.insert(FieldType::new("5v5").unwrap(), Money::parse("25.00").unwrap());

    let facility = Facility::new(
        FacilityId::new("norte").unwrap(),
        "Complejo Norte",
        time!(8:00),
        time!(23:00),
        counts,
        prices,
    )
    .unwrap();
    Catalog::new(vec![facility]).unwrap()
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_slot_query() -> SlotQuery {
    SlotQuery {
        facility_id: String::from("norte"),
        field_type: String::from("5v5"),
        date: String::from("2024-06-01"),
        time: String::from("18:00"),
    }
}

pub fn create_test_booking_request(email: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        facility_id: String::from("norte"),
        field_type: String::from("5v5"),
        date: String::from("2024-06-01"),
        time: String::from("18:00"),
        customer_email: String::from(email),
        customer_name: String::from("Ana"),
        customer_phone: None,
    }
}

pub fn book(persistence: &mut Persistence, email: &str) -> ReservationResponse {
    create_booking(
        persistence,
        &create_test_catalog(),
        create_test_booking_request(email),
        create_test_cause(),
        NOW,
    )
    .expect("booking should succeed")
}

pub const GATEWAY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);
pub const WEBHOOK_SECRET: &str = "test-secret";

pub fn create_test_ledger() -> std::sync::Arc<tokio::sync::Mutex<Persistence>> {
    std::sync::Arc::new(tokio::sync::Mutex::new(create_test_persistence()))
}

pub fn create_test_verifier() -> fieldbook_payments::SignatureVerifier {
    fieldbook_payments::SignatureVerifier::new(WEBHOOK_SECRET, 300)
}

pub fn create_preference_request(reservation_id: i64) -> crate::CreatePreferenceRequest {
    crate::CreatePreferenceRequest {
        reservation_id,
        payer: None,
        amount: String::from("25.00"),
    }
}

/// An authoritative report for payment `payment_id` against a reservation.
pub fn create_payment_report(
    payment_id: &str,
    status: &str,
    amount: &str,
    reservation_id: i64,
    preference_id: &str,
) -> fieldbook_domain::PaymentReport {
    fieldbook_domain::PaymentReport {
        payment_id: String::from(payment_id),
        status: fieldbook_domain::GatewayPaymentStatus::parse(status),
        amount: Money::parse(amount).unwrap(),
        external_reference: Some(reservation_id.to_string()),
        preference_id: Some(String::from(preference_id)),
        payment_method: Some(String::from("credit_card")),
    }
}

/// A correctly signed `?type=payment&data.id=...` delivery.
pub fn signed_delivery(payment_id: &str, request_id: &str) -> crate::WebhookDelivery {
    let signature: String = create_test_verifier()
        .sign(payment_id, Some(request_id), NOW.unix_timestamp())
        .unwrap();
    let mut query = std::collections::HashMap::new();
    query.insert(String::from("type"), String::from("payment"));
    query.insert(String::from("data.id"), String::from(payment_id));
    crate::WebhookDelivery {
        signature: Some(signature),
        request_id: Some(String::from(request_id)),
        query,
        body: Vec::new(),
    }
}
