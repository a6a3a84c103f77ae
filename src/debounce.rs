//! Push button debouncing.
//!
//! A button cycle is low→high: the filter waits for the line to go low,
//! optionally trusts that low level for a fixed window, then waits for it to go high again.
//!
//! Debouncing is purely time-gated: while the window runs, the level is not looked at.
//! A short low glitch followed by a steady high will therefore still complete a cycle
//! once the window has elapsed.

use embassy_time::{Duration, Instant};


/// How the filter treats the low phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum DebounceMode {
    /// No filtering: every low→high cycle on the raw line is a cycle
    Simple,
    /// After the line goes low, ignore it for `window`, then wait for it to go high
    Debounced { window: Duration },
}

impl DebounceMode {
    /// Mode selected by the level of the configuration pin (high = debounced)
    pub fn from_select_level(high: bool, window: Duration) -> Self {
        if high {
            Self::Debounced { window }
        } else {
            Self::Simple
        }
    }
}


/// Where the filter is in the button cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Phase {
    WaitForLow,
    /// Low seen at `since`; waiting for the debounce window to elapse
    DebounceWait { since: Instant },
    WaitForHigh,
}


/// Clean transitions produced by the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Edge {
    /// The low level was accepted
    Falling,
    /// The line went back high: the cycle is complete
    Rising,
}


/// Edges produced by a single sample.
/// Phases fall through, so both can happen at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, defmt::Format)]
pub struct Edges {
    pub falling: bool,
    pub rising: bool,
}

impl Edges {
    pub fn contains(&self, edge: Edge) -> bool {
        match edge {
            Edge::Falling => self.falling,
            Edge::Rising => self.rising,
        }
    }
}


/// Debounce state machine for one input.
///
/// Feed it one raw level per poll with [`DebounceFilter::sample`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceFilter {
    mode: DebounceMode,
    phase: Phase,
}

impl DebounceFilter {
    pub const fn new(mode: DebounceMode) -> Self {
        Self { mode, phase: Phase::WaitForLow }
    }

    /// Process one sample of the raw level taken at `now`.
    ///
    /// The same sample is checked against every phase in cycle order,
    /// so one call may move through several phases.
    pub fn sample(&mut self, high: bool, now: Instant) -> Edges {
        let mut edges = Edges::default();

        if self.phase == Phase::WaitForLow && !high {
            match self.mode {
                DebounceMode::Simple => {
                    self.phase = Phase::WaitForHigh;
                    edges.falling = true;
                }
                DebounceMode::Debounced { .. } => {
                    self.phase = Phase::DebounceWait { since: now };
                }
            }
        }

        // The level is not checked here
        if let (Phase::DebounceWait { since }, DebounceMode::Debounced { window }) = (self.phase, self.mode) {
            if now.saturating_duration_since(since) >= window {
                self.phase = Phase::WaitForHigh;
                edges.falling = true;
            }
        }

        if self.phase == Phase::WaitForHigh && high {
            self.phase = Phase::WaitForLow;
            edges.rising = true;
        }

        edges
    }
}
