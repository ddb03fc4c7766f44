//! Adaptive axis ceiling for one series group.
//!
//! The ceiling jumps up immediately when an observation exceeds it, so
//! graphs never clip. It only comes down after a full window of observations
//! that stay below half of it, and then by a bounded step per tick, toward
//! the largest observation still inside the window.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct AutoScaler {
    floor: u64,
    ceiling: u64,
    /// Number of ticks a quiet period must last before decaying, and the
    /// length of the observation history the decay target is taken from.
    window: usize,
    /// Each decay step removes `1 / decay_divisor` of the excess.
    decay_divisor: u64,
    recent: VecDeque<u64>,
    quiet_ticks: usize,
}

impl AutoScaler {
    pub const DEFAULT_WINDOW: usize = 30;
    pub const DEFAULT_DECAY_DIVISOR: u64 = 8;

    pub fn new(floor: u64) -> Self {
        Self::with_smoothing(floor, Self::DEFAULT_WINDOW, Self::DEFAULT_DECAY_DIVISOR)
    }

    /// Creates a scaler with explicit smoothing. `window` and
    /// `decay_divisor` are raised to at least 1.
    pub fn with_smoothing(floor: u64, window: usize, decay_divisor: u64) -> Self {
        let window = window.max(1);
        Self {
            floor,
            ceiling: floor,
            window,
            decay_divisor: decay_divisor.max(1),
            recent: VecDeque::with_capacity(window),
            quiet_ticks: 0,
        }
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    pub fn floor(&self) -> u64 {
        self.floor
    }

    /// Updates the minimum ceiling. Raising it above the current ceiling
    /// lifts the ceiling with it.
    pub fn set_floor(&mut self, floor: u64) {
        self.floor = floor;
        self.ceiling = self.ceiling.max(floor);
    }

    /// Feeds the largest value of this tick and returns the new ceiling.
    pub fn update(&mut self, observed: u64) -> u64 {
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(observed);

        if observed > self.ceiling {
            self.ceiling = observed;
            self.quiet_ticks = 0;
            return self.ceiling;
        }

        if observed.saturating_mul(2) < self.ceiling {
            self.quiet_ticks += 1;
        } else {
            self.quiet_ticks = 0;
        }

        if self.quiet_ticks >= self.window {
            let recent_max = self.recent.iter().copied().max().unwrap_or(0);
            let target = self.floor.max(recent_max);
            if self.ceiling > target {
                let step = ((self.ceiling - target) / self.decay_divisor).max(1);
                self.ceiling = (self.ceiling - step).max(target);
            }
        }

        self.ceiling
    }

    /// Forgets all history and drops the ceiling back to the floor.
    pub fn reset(&mut self) {
        self.ceiling = self.floor;
        self.recent.clear();
        self.quiet_ticks = 0;
    }

    /// Approximate heap usage in bytes.
    pub fn footprint(&self) -> usize {
        self.recent.capacity() * std::mem::size_of::<u64>()
    }
}
