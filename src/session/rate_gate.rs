//! Cooldown between acquisition cycles
//!
//! The gate is a single persisted timestamp: the earliest moment the next
//! cycle may start. Reads and the later write are not atomic, so two cycles
//! started in the same instant can both pass.

use crate::{Result, error::format_error, storage::StateStore};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RateGate {
    state: StateStore,
}

impl RateGate {
    pub fn new(state: StateStore) -> Self {
        Self { state }
    }

    /// Time left until the gate opens, or `None` when it is open
    pub async fn remaining(&self, now: DateTime<Utc>) -> Result<Option<Duration>> {
        Ok(self
            .state
            .next_unblock()
            .await?
            .filter(|next| *next > now)
            .map(|next| next - now))
    }

    /// Whether a new cycle may start at `now`
    ///
    /// An absent record means the gate has never been armed.
    pub async fn should_proceed(&self, now: DateTime<Utc>) -> Result<bool> {
        Ok(self.remaining(now).await?.is_none())
    }

    /// Close the gate for `cooldown_secs` starting at `now`
    pub async fn arm(&self, now: DateTime<Utc>, cooldown_secs: u64) -> Result<DateTime<Utc>> {
        let next = i64::try_from(cooldown_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|cooldown| now.checked_add_signed(cooldown))
            .ok_or_else(|| crate::Error::validation("cooldown_secs", "Cooldown is out of range"))?;
        self.state.set_next_unblock(next).await?;
        debug!("Rate gate armed until {}", next);
        Ok(next)
    }

    /// Open the gate immediately
    pub async fn reset(&self) -> Result<()> {
        self.state.clear_next_unblock().await?;
        debug!("Rate gate reset");
        Ok(())
    }

    /// Guard that arms the gate even if the caller is dropped before
    /// calling [`ArmGuard::arm`]
    pub fn arm_on_drop(&self, cooldown_secs: u64) -> ArmGuard {
        ArmGuard {
            gate: self.clone(),
            cooldown_secs,
            armed: false,
        }
    }
}

/// Arms a [`RateGate`] exactly once per acquisition attempt
///
/// Dropped unarmed, the guard spawns the write on the current tokio runtime.
/// Outside a runtime the gate stays open and a warning is logged.
#[derive(Debug)]
pub struct ArmGuard {
    gate: RateGate,
    cooldown_secs: u64,
    armed: bool,
}

impl ArmGuard {
    /// Arm the gate starting now
    pub async fn arm(mut self) -> Result<DateTime<Utc>> {
        let result = self.gate.arm(Utc::now(), self.cooldown_secs).await;
        self.armed = true;
        result
    }
}

impl Drop for ArmGuard {
    fn drop(&mut self) {
        if self.armed {
            return;
        }

        // Can't await in drop
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let gate = self.gate.clone();
                let cooldown_secs = self.cooldown_secs;
                let now = Utc::now();
                handle.spawn(async move {
                    if let Err(e) = gate.arm(now, cooldown_secs).await {
                        warn!("Could not arm rate gate: {}", format_error(&e));
                    }
                });
            }
            Err(_) => warn!("Acquisition dropped outside a runtime, rate gate left open"),
        }
    }
}
