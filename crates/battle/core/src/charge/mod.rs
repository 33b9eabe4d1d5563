//! Charge (ATB) meter and readiness state machine.
//!
//! Every combatant carries a [`ChargeMeter`] that accumulates a fixed amount of
//! charge per global tick:
//!
//! ```text
//! Charging ──(meter reaches MAX)──▶ Ready ──(consume(cost))──▶ Charging
//! ```
//!
//! Crossing into `MAX` emits a single [`Readiness`] carrying the activation
//! time. The meter never resets on its own: the scheduler consumes the cost
//! of the chosen action once that action finishes, and any excess charge
//! carries over.

mod entropy;

pub use entropy::{assign_bands, band_bounds, band_width, sample_initial_charge, seed_charge_entropy};

use crate::error::ConfigError;
use crate::state::{CombatantId, Tick};

/// Readiness state of a charge meter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChargeState {
    Charging,
    Ready { activation_time: f64 },
}

/// Emitted exactly once when a meter crosses into `MAX`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Readiness {
    /// Fractional tick at which the meter actually reached `MAX`.
    pub activation_time: f64,
}

/// Per-combatant charge meter.
#[derive(Clone, Debug, PartialEq)]
pub struct ChargeMeter {
    value: f64,
    rate: f64,
    state: ChargeState,
}

impl ChargeMeter {
    /// Full meter.
    pub const MAX: f64 = 100.0;

    /// Creates an empty meter charging `rate` per tick.
    pub fn new(owner: CombatantId, rate: f64) -> Result<Self, ConfigError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::InvalidChargeRate { combatant: owner, rate });
        }
        Ok(Self {
            value: 0.0,
            rate,
            state: ChargeState::Charging,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn state(&self) -> ChargeState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ChargeState::Ready { .. })
    }

    /// Overwrites the stored charge (clamped to `[0, MAX]`) without touching
    /// the readiness state. Used by entropy seeding before the first tick.
    pub fn seed(&mut self, value: f64) {
        self.value = value.clamp(0.0, Self::MAX);
    }

    /// Advances the meter by one tick. `now` is the tick being entered.
    ///
    /// Returns the readiness signal if this tick moved the meter from
    /// `Charging` into `MAX`. The activation time is `now` minus the share of
    /// this tick that was not needed to fill the meter, so two combatants
    /// filling on the same tick are ordered by who filled first.
    pub fn tick(&mut self, now: Tick) -> Option<Readiness> {
        let before = self.value;
        self.value = (before + self.rate).min(Self::MAX);

        if self.state != ChargeState::Charging || self.value < Self::MAX {
            return None;
        }

        let overshoot = (before + self.rate - Self::MAX).max(0.0);
        let activation_time = now.as_time() - overshoot / self.rate;
        self.state = ChargeState::Ready { activation_time };
        Some(Readiness { activation_time })
    }

    /// Subtracts an action's cost (clamped at zero) and returns to charging.
    pub fn consume(&mut self, cost: f64) {
        self.value = (self.value - cost.max(0.0)).max(0.0);
        self.state = ChargeState::Charging;
    }

    /// Returns a ready meter to charging without spending anything, so the
    /// next tick signals readiness again. Used for forfeited turns.
    pub fn rearm(&mut self) {
        self.state = ChargeState::Charging;
    }

    /// Charge value for smooth readouts between ticks.
    ///
    /// When the clock is halted the stored value is returned verbatim;
    /// otherwise it is extrapolated by `tick_progress` (the fraction of the
    /// current tick interval that has elapsed, in `[0, 1]`).
    pub fn current_computed_ct(&self, clock_running: bool, tick_progress: f64) -> f64 {
        if !clock_running {
            return self.value;
        }
        (self.value + self.rate * tick_progress.clamp(0.0, 1.0)).min(Self::MAX)
    }
}
