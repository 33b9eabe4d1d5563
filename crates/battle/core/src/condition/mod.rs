//! Declarative conditions and the targeting engine that evaluates them.
//!
//! A [`Condition`] names a unit pool (party or enemy) and optionally a
//! comparator/threshold. [`get_targets`] evaluates it against the current
//! roster and returns a ranked, filtered or shuffled list of combatant ids.
//! Conditions are stateless and re-evaluated on every check; nothing is cached
//! because health changes between checks.

mod targeting;

pub use targeting::get_targets;

use crate::state::Alignment;

/// Comparison operator for threshold conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparator {
    LessThan,
    GreaterThan,
}

impl Comparator {
    pub fn holds(self, value: u32, threshold: u32) -> bool {
        match self {
            Self::LessThan => value < threshold,
            Self::GreaterThan => value > threshold,
        }
    }
}

/// Numeric or relative threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Threshold {
    Value(u32),
    /// Rank the whole pool, lowest first.
    Lowest,
    /// Rank the whole pool, highest first.
    Highest,
}

/// Which health figure a resource condition inspects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HealthStat {
    Max,
    Forecasted,
}

/// Formation shapes for positional conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formation {
    DensestLine,
    DensestCell,
}

/// Gating predicate / target selector.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// Every targetable unit of the pool, in random order.
    Any { unit_pool: Alignment },

    /// Health-based filter and ranking.
    ResourceThreshold {
        unit_pool: Alignment,
        stat: HealthStat,
        comparator: Comparator,
        threshold: Threshold,
        /// Compare forecasted health as a floored percentage of max.
        is_percent: bool,
    },

    /// Head-count gate. Declared, not evaluated.
    UnitQuantity {
        unit_pool: Alignment,
        comparator: Comparator,
        quantity: u32,
    },

    /// Formation-based targeting. Declared, not evaluated.
    UnitPositional {
        unit_pool: Alignment,
        formation: Formation,
    },
}

impl Condition {
    pub const fn any(unit_pool: Alignment) -> Self {
        Self::Any { unit_pool }
    }

    /// Forecasted health (percent or raw) compared against a threshold.
    pub const fn forecast_below(unit_pool: Alignment, threshold: u32, is_percent: bool) -> Self {
        Self::ResourceThreshold {
            unit_pool,
            stat: HealthStat::Forecasted,
            comparator: Comparator::LessThan,
            threshold: Threshold::Value(threshold),
            is_percent,
        }
    }

    /// Whole pool ranked by forecasted health, lowest first.
    pub const fn lowest_health(unit_pool: Alignment) -> Self {
        Self::ResourceThreshold {
            unit_pool,
            stat: HealthStat::Forecasted,
            comparator: Comparator::LessThan,
            threshold: Threshold::Lowest,
            is_percent: false,
        }
    }

    pub fn unit_pool(&self) -> Alignment {
        match self {
            Self::Any { unit_pool }
            | Self::ResourceThreshold { unit_pool, .. }
            | Self::UnitQuantity { unit_pool, .. }
            | Self::UnitPositional { unit_pool, .. } => *unit_pool,
        }
    }

    /// Short label used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Any { .. } => "any",
            Self::ResourceThreshold { .. } => "resourceThreshold",
            Self::UnitQuantity { .. } => "unitQuantity",
            Self::UnitPositional { .. } => "unitPositional",
        }
    }
}
