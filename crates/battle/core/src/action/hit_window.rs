//! Frame-driven hit sequencing.
//!
//! Damage and restore effects land inside frame windows of the active visual.
//! [`HitWindowQueue`] consumes those windows one at a time: the next window is
//! armed only after the current one's `end` frame has been seen. Multi-hit
//! combos therefore visit each window exactly once, in order.

use std::collections::VecDeque;

/// Inclusive frame range `[start, end]` of one hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitWindow {
    pub start: u32,
    pub end: u32,
}

impl HitWindow {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Output of the queue for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitSignal {
    /// Apply hit `index` (`startHurt` / `startHeal`).
    Start { index: usize },
    /// Close hit `index` (`endHurt` / `endHeal`).
    End { index: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WindowState {
    Waiting,
    Open,
}

/// FIFO of pending hit windows.
#[derive(Clone, Debug)]
pub struct HitWindowQueue {
    pending: VecDeque<(usize, HitWindow)>,
    state: WindowState,
}

impl HitWindowQueue {
    pub fn new(windows: impl IntoIterator<Item = HitWindow>) -> Self {
        Self {
            pending: windows.into_iter().enumerate().collect(),
            state: WindowState::Waiting,
        }
    }

    /// True once every window has been closed.
    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Feeds one frame event.
    ///
    /// Frames are compared with `>=` so a visual that skips frames still opens
    /// and closes the window it jumped over.
    pub fn on_frame(&mut self, frame: u32) -> Vec<HitSignal> {
        let mut signals = Vec::new();
        while let Some(&(index, window)) = self.pending.front() {
            match self.state {
                WindowState::Waiting if frame >= window.start => {
                    self.state = WindowState::Open;
                    signals.push(HitSignal::Start { index });
                }
                WindowState::Open if frame >= window.end => {
                    self.state = WindowState::Waiting;
                    self.pending.pop_front();
                    signals.push(HitSignal::End { index });
                }
                _ => break,
            }
        }
        signals
    }

    /// Opens and closes every remaining window at once. Used when the visual
    /// finished (or never emitted frames) before all windows were visited.
    pub fn flush(&mut self) -> Vec<HitSignal> {
        let mut signals = Vec::with_capacity(self.pending.len() * 2);
        while let Some((index, _)) = self.pending.pop_front() {
            if self.state == WindowState::Waiting {
                signals.push(HitSignal::Start { index });
            }
            self.state = WindowState::Waiting;
            signals.push(HitSignal::End { index });
        }
        signals
    }
}
