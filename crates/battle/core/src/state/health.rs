//! Current vs. forecasted health.
//!
//! Forecasting happens optimistically the moment an action locks its targets,
//! so targeting queries and UI can reason about "would this kill the target"
//! before any effect resolves. Actual health only moves when a hurt/heal pulse
//! lands. Once every lock on a combatant is released the forecast is snapped
//! back to actual health.

/// Health ledger for a single combatant.
///
/// Invariant: `current <= max` and `forecast <= max` at all times.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthLedger {
    current: u32,
    max: u32,
    forecast: u32,
}

impl HealthLedger {
    /// Creates a ledger at full health.
    pub const fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            forecast: max,
        }
    }

    /// Creates a ledger with explicit current health (clamped to `max`).
    pub fn with_current(current: u32, max: u32) -> Self {
        let current = current.min(max);
        Self {
            current,
            max,
            forecast: current,
        }
    }

    pub const fn current(&self) -> u32 {
        self.current
    }

    pub const fn max(&self) -> u32 {
        self.max
    }

    pub const fn forecast(&self) -> u32 {
        self.forecast
    }

    /// A combatant is alive iff current health is above zero.
    pub const fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// True when in-flight damage is projected to finish this combatant.
    pub const fn is_forecast_dead(&self) -> bool {
        self.forecast == 0
    }

    /// Forecasted health as a floored percentage of max.
    pub fn forecast_percent(&self) -> u32 {
        if self.max == 0 {
            return 0;
        }
        ((100 * u64::from(self.forecast)) / u64::from(self.max)) as u32
    }

    /// Projects incoming damage. Clamped at zero.
    pub fn forecast_damage(&mut self, amount: u32) {
        self.forecast = self.forecast.saturating_sub(amount);
    }

    /// Projects incoming restoration. Clamped at max.
    pub fn forecast_restoration(&mut self, amount: u32) {
        self.forecast = self.forecast.saturating_add(amount).min(self.max);
    }

    /// Applies damage to current health and returns the amount actually taken.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.current);
        self.current -= taken;
        taken
    }

    /// Applies restoration to current health and returns the amount actually
    /// restored. Dead combatants are not revived by restoration.
    pub fn apply_restoration(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let restored = amount.min(self.max - self.current);
        self.current += restored;
        restored
    }

    /// Snaps the forecast back to actual health.
    pub fn reconcile(&mut self) {
        self.forecast = self.current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn percent_is_floored() {
        let mut ledger = HealthLedger::new(30);
        ledger.forecast_damage(11);
        // 19 / 30 = 63.33%
        assert_eq!(ledger.forecast_percent(), 63);
    }

    #[test]
    fn damage_is_capped_at_current_health() {
        let mut ledger = HealthLedger::with_current(5, 40);
        assert_eq!(ledger.apply_damage(12), 5);
        assert!(!ledger.is_alive());
    }

    #[test]
    fn restoration_does_not_revive() {
        let mut ledger = HealthLedger::with_current(0, 40);
        assert_eq!(ledger.apply_restoration(10), 0);
        assert_eq!(ledger.current(), 0);
    }

    #[test]
    fn reconcile_snaps_forecast_to_current() {
        let mut ledger = HealthLedger::new(40);
        ledger.forecast_damage(25);
        assert_eq!(ledger.forecast(), 15);
        ledger.reconcile();
        assert_eq!(ledger.forecast(), 40);
    }

    #[derive(Debug, Clone)]
    enum ForecastOp {
        Damage(u32),
        Restore(u32),
    }

    fn forecast_op() -> impl Strategy<Value = ForecastOp> {
        prop_oneof![
            any::<u32>().prop_map(ForecastOp::Damage),
            any::<u32>().prop_map(ForecastOp::Restore),
        ]
    }

    proptest! {
        #[test]
        fn forecast_stays_within_bounds(
            max in 1u32..10_000,
            ops in proptest::collection::vec(forecast_op(), 0..64),
        ) {
            let mut ledger = HealthLedger::new(max);
            for op in ops {
                match op {
                    ForecastOp::Damage(amount) => ledger.forecast_damage(amount),
                    ForecastOp::Restore(amount) => ledger.forecast_restoration(amount),
                }
                prop_assert!(ledger.forecast() <= ledger.max());
            }
        }
    }
}
