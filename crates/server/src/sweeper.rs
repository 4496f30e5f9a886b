// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background expiry of unpaid holds.
//!
//! Pending reservations that never recorded a payment are cancelled once
//! they are older than the hold timeout, returning their instance to the
//! pool.

use std::sync::Arc;
use std::time::Duration;

use fieldbook_api::{ApiError, ExpireHoldsResponse, expire_stale_holds};
use fieldbook_persistence::Persistence;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Periodically cancels stale holds.
pub struct HoldSweeper {
    ledger: Arc<Mutex<Persistence>>,
    hold_timeout: Duration,
    interval: Duration,
}

impl HoldSweeper {
    /// Creates a sweeper that runs every 60 seconds.
    pub const fn new(ledger: Arc<Mutex<Persistence>>, hold_timeout: Duration) -> Self {
        Self {
            ledger,
            hold_timeout,
            interval: Duration::from_secs(60),
        }
    }

    /// Sets how often the sweep runs.
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns the sweep loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                match self.run_once(OffsetDateTime::now_utc()).await {
                    Ok(swept) if !swept.expired.is_empty() || !swept.skipped.is_empty() => {
                        info!(
                            expired = swept.expired.len(),
                            skipped = swept.skipped.len(),
                            "Hold sweep finished"
                        );
                    }
                    Ok(_) => debug!("Hold sweep found nothing to expire"),
                    Err(e) => warn!(error = %e, "Hold sweep failed"),
                }
            }
        })
    }

    /// Runs one sweep as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate scan fails.
    pub async fn run_once(&self, now: OffsetDateTime) -> Result<ExpireHoldsResponse, ApiError> {
        let cutoff: OffsetDateTime = now - self.hold_timeout;
        let mut persistence = self.ledger.lock().await;
        expire_stale_holds(&mut persistence, cutoff, now)
    }
}
