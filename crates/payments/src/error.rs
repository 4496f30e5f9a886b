// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Failures talking to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Network failure, timeout, or a server-side gateway error.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
    /// The gateway refused the request or answered with something unusable.
    #[error("payment gateway rejected the request: {0}")]
    Rejected(String),
}

impl GatewayError {
    /// Returns true if retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Reasons a webhook signature is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature header is missing")]
    Missing,
    #[error("signature header is malformed: {0}")]
    Malformed(String),
    #[error("signature does not match")]
    Mismatch,
    #[error("signature timestamp {timestamp} is outside the tolerance window (now {now})")]
    Expired { timestamp: i64, now: i64 },
    #[error("failed to initialize hmac")]
    InvalidKey,
}

/// Reasons a webhook payload cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("notification body is not valid JSON: {0}")]
    InvalidBody(String),
    #[error("notification carries no payment id")]
    MissingPaymentId,
}
