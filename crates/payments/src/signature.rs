// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Webhook signature verification.
//!
//! The gateway signs each notification with a shared secret and sends
//!
//! ```text
//! x-signature: ts=<unix seconds>,v1=<hex hmac-sha256>
//! ```
//!
//! where the MAC covers `id:<payment id>;request-id:<x-request-id>;ts:<ts>;`.
//! The `request-id:` segment is left out when the request carried no
//! `x-request-id` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Default maximum age of a signature timestamp.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Verifies (and, for tests and tooling, produces) webhook signatures.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
    tolerance_secs: u64,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish_non_exhaustive()
    }
}

fn manifest(payment_id: &str, request_id: Option<&str>, timestamp: i64) -> String {
    match request_id {
        Some(request_id) => format!("id:{payment_id};request-id:{request_id};ts:{timestamp};"),
        None => format!("id:{payment_id};ts:{timestamp};"),
    }
}

fn parse_header(header: &str) -> Result<(i64, Vec<u8>), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut digest: Option<Vec<u8>> = None;

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(SignatureError::Malformed(format!("'{part}' is not key=value")));
        };
        match key.trim() {
            "ts" => {
                timestamp = Some(value.trim().parse().map_err(|_| {
                    SignatureError::Malformed(format!("'{value}' is not a timestamp"))
                })?);
            }
            "v1" => {
                digest = Some(hex::decode(value.trim()).map_err(|e| {
                    SignatureError::Malformed(format!("v1 is not hex: {e}"))
                })?);
            }
            _ => {}
        }
    }

    match (timestamp, digest) {
        (Some(timestamp), Some(digest)) => Ok((timestamp, digest)),
        (None, _) => Err(SignatureError::Malformed(String::from("missing ts"))),
        (_, None) => Err(SignatureError::Malformed(String::from("missing v1"))),
    }
}

impl SignatureVerifier {
    /// Creates a verifier for the shared secret.
    ///
    /// A `tolerance_secs` of 0 disables the timestamp age check.
    #[must_use]
    pub fn new(secret: &str, tolerance_secs: u64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            tolerance_secs,
        }
    }

    fn mac(&self) -> Result<HmacSha256, SignatureError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| SignatureError::InvalidKey)
    }

    /// Builds the header value the gateway would send.
    ///
    /// # Errors
    ///
    /// Returns an error if the HMAC cannot be keyed with the secret.
    pub fn sign(
        &self,
        payment_id: &str,
        request_id: Option<&str>,
        timestamp: i64,
    ) -> Result<String, SignatureError> {
        let mut mac: HmacSha256 = self.mac()?;
        mac.update(manifest(payment_id, request_id, timestamp).as_bytes());
        let digest: String = hex::encode(mac.finalize().into_bytes());
        Ok(format!("ts={timestamp},v1={digest}"))
    }

    /// Checks a signature header against the payment id it claims to cover.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is missing or malformed, the MAC does
    /// not match, or the timestamp is outside the tolerance window. An HMAC
    /// that cannot be keyed is reported as [`SignatureError::InvalidKey`].
    pub fn verify(
        &self,
        header: Option<&str>,
        request_id: Option<&str>,
        payment_id: &str,
        now: OffsetDateTime,
    ) -> Result<(), SignatureError> {
        let header: &str = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(SignatureError::Missing)?;
        let (timestamp, digest) = parse_header(header)?;

        let mut mac: HmacSha256 = self.mac()?;
        mac.update(manifest(payment_id, request_id, timestamp).as_bytes());
        mac.verify_slice(&digest)
            .map_err(|_| SignatureError::Mismatch)?;

        if self.tolerance_secs > 0 {
            let now_secs: i64 = now.unix_timestamp();
            if now_secs.abs_diff(timestamp) > self.tolerance_secs {
                return Err(SignatureError::Expired {
                    timestamp,
                    now: now_secs,
                });
            }
        }

        debug!(payment_id, "Webhook signature verified");
        Ok(())
    }
}
