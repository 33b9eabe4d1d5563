/// How the scheduler advances the logic clock between dequeues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum ClockMode {
    /// One dequeue attempt per tick; the clock halts while the head entry is
    /// ineligible and resumes once it is consumed.
    #[default]
    Wait,
    /// Free-running: dequeue eagerly every tick and never halt.
    Active,
}

/// Battle configuration and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Wall-clock length of one logic tick, in milliseconds.
    pub tick_rate_ms: u64,

    pub clock_mode: ClockMode,

    /// Delay between a resolved player prompt and resuming the clock.
    pub prompt_debounce_ms: u64,

    /// Await an intent cue visual before firing strategem actions.
    pub intent_cue: bool,

    /// Per-topic capacity of the event bus.
    pub event_buffer_size: usize,
}

impl BattleConfig {
    pub const DEFAULT_TICK_RATE_MS: u64 = 100;
    pub const DEFAULT_PROMPT_DEBOUNCE_MS: u64 = 250;
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 128;

    pub fn new() -> Self {
        Self {
            tick_rate_ms: Self::DEFAULT_TICK_RATE_MS,
            clock_mode: ClockMode::Wait,
            prompt_debounce_ms: Self::DEFAULT_PROMPT_DEBOUNCE_MS,
            intent_cue: false,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
        }
    }

    pub fn with_clock_mode(mut self, clock_mode: ClockMode) -> Self {
        self.clock_mode = clock_mode;
        self
    }

    pub fn with_tick_rate_ms(mut self, tick_rate_ms: u64) -> Self {
        self.tick_rate_ms = tick_rate_ms.max(1);
        self
    }

    pub fn tick_rate(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn prompt_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.prompt_debounce_ms)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
