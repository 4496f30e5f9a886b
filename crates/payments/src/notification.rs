// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parsing of inbound payment notifications.
//!
//! The gateway delivers either a GET with query parameters or a POST with a
//! JSON body, sometimes both. Only the identifiers are taken from the
//! notification; the payment status is always fetched from the gateway.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::NotificationError;

/// Topic of notifications about payments.
pub const PAYMENT_TOPIC: &str = "payment";

/// The identifiers carried by one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    /// Notification topic, if the gateway sent one.
    pub topic: Option<String>,
    /// The payment (or other resource) id the notification is about.
    pub payment_id: String,
    /// Correlation reference, if the notification carried one.
    pub preference_id: Option<String>,
}

fn json_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn query_string(query: &HashMap<String, String>, key: &str) -> Option<String> {
    query
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl PaymentNotification {
    /// Extracts the identifiers from a query string and an optional JSON body.
    ///
    /// Query parameters take precedence over the body.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-empty body is not JSON or no payment id can
    /// be found.
    pub fn parse(
        query: &HashMap<String, String>,
        body: &[u8],
    ) -> Result<Self, NotificationError> {
        let body: Option<Value> = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice(body)
                    .map_err(|e| NotificationError::InvalidBody(e.to_string()))?,
            )
        };
        let body_field = |pointer: &str| json_string(body.as_ref().and_then(|b| b.pointer(pointer)));

        let payment_id: String = query_string(query, "data.id")
            .or_else(|| query_string(query, "id"))
            .or_else(|| body_field("/data/id"))
            .ok_or(NotificationError::MissingPaymentId)?;

        let topic: Option<String> = query_string(query, "type")
            .or_else(|| query_string(query, "topic"))
            .or_else(|| body_field("/type"))
            .or_else(|| body_field("/topic"));

        let preference_id: Option<String> =
            query_string(query, "preference_id").or_else(|| body_field("/preference_id"));

        Ok(Self {
            topic,
            payment_id,
            preference_id,
        })
    }

    /// Returns true unless the notification names a topic other than payments.
    #[must_use]
    pub fn is_payment(&self) -> bool {
        self.topic
            .as_deref()
            .is_none_or(|topic| topic.eq_ignore_ascii_case(PAYMENT_TOPIC))
    }
}
