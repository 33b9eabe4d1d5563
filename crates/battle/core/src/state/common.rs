use std::fmt;

/// Opaque identifier for a combatant within one battle session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side a combatant fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum Alignment {
    Party,
    Enemy,
}

impl Alignment {
    /// Returns the alignment on the other side of the field.
    pub const fn opposing(self) -> Self {
        match self {
            Self::Party => Self::Enemy,
            Self::Enemy => Self::Party,
        }
    }
}

/// Discrete step of the global battle clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    /// Ticks elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The tick as a fractional timestamp, the unit activation times use.
    pub fn as_time(self) -> f64 {
        self.0 as f64
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Position in world space, as reported by the placement collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

impl WorldPosition {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Mean position of the given points, or `None` for an empty set.
    pub fn centroid<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = WorldPosition>,
    {
        let (sum_x, sum_y, count) = points
            .into_iter()
            .fold((0.0_f32, 0.0_f32, 0_u32), |(x, y, n), p| (x + p.x, y + p.y, n + 1));

        (count > 0).then(|| Self::new(sum_x / count as f32, sum_y / count as f32))
    }
}
