//! Simulation time: a millisecond-scale logical clock with a real-world
//! epoch, advanced in fixed tick increments.
//!
//! `now_ms` is in **simulation milliseconds**; time 0 maps to the wall-clock
//! instant captured at scenario build (`epoch`). Delivery windows and zone
//! activity windows are absolute wall-clock times, so comparisons go through
//! [`SimulationClock::now_utc`].

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One second in simulation milliseconds.
pub const ONE_SEC_MS: u64 = 1000;
/// One minute in simulation milliseconds.
pub const ONE_MIN_MS: u64 = 60 * ONE_SEC_MS;
/// Default tick increment: 5 simulated minutes.
pub const DEFAULT_TICK_MS: u64 = 5 * ONE_MIN_MS;

/// Dispatcher pacing selected by the control collaborator. The core itself
/// is speed-agnostic; this only maps the recognized values to wall-clock
/// tick periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SimulationSpeed {
    /// Wall-clock milliseconds between tick dispatches.
    pub fn period_ms(self) -> u64 {
        match self {
            Self::Slow => 2000,
            Self::Normal => 1000,
            Self::Fast => 500,
        }
    }
}

/// Process-wide logical clock. Ticks are serialized by the runner; nothing
/// in the core reads wall-clock time after construction.
#[derive(Debug, Clone, Resource)]
pub struct SimulationClock {
    now_ms: u64,
    tick_ms: u64,
    ticks: u64,
    epoch: DateTime<Utc>,
}

impl SimulationClock {
    /// Clock anchored at `epoch`, with the default 5-minute tick.
    pub fn with_epoch(epoch: DateTime<Utc>) -> Self {
        Self {
            now_ms: 0,
            tick_ms: DEFAULT_TICK_MS,
            ticks: 0,
            epoch,
        }
    }

    /// Override the tick increment (milliseconds). Zero is rejected.
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        assert!(tick_ms > 0, "tick increment must be positive");
        self.tick_ms = tick_ms;
        self
    }

    /// Current simulation time in milliseconds since the epoch.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Current simulation time as a wall-clock instant.
    pub fn now_utc(&self) -> DateTime<Utc> {
        self.epoch + Duration::milliseconds(self.now_ms as i64)
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Number of ticks advanced so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance one tick and return the new current instant.
    pub fn advance(&mut self) -> DateTime<Utc> {
        self.now_ms = self.now_ms.saturating_add(self.tick_ms);
        self.ticks += 1;
        self.now_utc()
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::with_epoch(Utc::now())
    }
}
