//! Delta computation over cumulative counters.
//!
//! Counter-based providers (network, disk, CPU) feed their per-category
//! cumulative totals through [`CounterDeltas`] once per tick. This module is
//! the single place where counter regressions and first-tick spikes are
//! handled.

use tracing::debug;

/// Compute u64 delta, returning `None` on counter regression (reset, device
/// replaced or wraparound).
pub fn du64(curr: u64, prev: u64) -> Option<u64> {
    curr.checked_sub(prev)
}

/// Per-category previous values for a fixed number of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterDeltas<const N: usize> {
    last: [u64; N],
}

impl<const N: usize> Default for CounterDeltas<N> {
    fn default() -> Self {
        Self { last: [0; N] }
    }
}

impl<const N: usize> CounterDeltas<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns this tick's cumulative totals into per-tick deltas.
    ///
    /// On `first_call` every delta is zero, since there is no previous value
    /// to diff against. A category whose counter went backwards reports zero
    /// for this tick while the others compute normally. `current` always
    /// becomes the new baseline.
    pub fn update(&mut self, current: [u64; N], first_call: bool) -> [u64; N] {
        let mut diff = [0u64; N];

        if !first_call {
            for (i, slot) in diff.iter_mut().enumerate() {
                match du64(current[i], self.last[i]) {
                    Some(d) => *slot = d,
                    None => debug!(
                        category = i,
                        previous = self.last[i],
                        current = current[i],
                        "counter went backwards, clamping delta to zero"
                    ),
                }
            }
        }

        self.last = current;
        diff
    }

    /// Baseline stored by the last update.
    pub fn last(&self) -> &[u64; N] {
        &self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_du64() {
        assert_eq!(du64(10, 4), Some(6));
        assert_eq!(du64(4, 4), Some(0));
        assert_eq!(du64(3, 4), None);
    }

    #[test]
    fn test_first_call_suppresses_spike() {
        let mut deltas = CounterDeltas::<3>::new();
        let diff = deltas.update([1_000_000, 500, u64::MAX], true);
        assert_eq!(diff, [0, 0, 0]);
        assert_eq!(deltas.last(), &[1_000_000, 500, u64::MAX]);
    }

    #[test]
    fn test_monotonic_counters_diff_exactly() {
        let mut deltas = CounterDeltas::<2>::new();
        deltas.update([100, 200], true);
        assert_eq!(deltas.update([150, 260], false), [50, 60]);
        assert_eq!(deltas.update([150, 300], false), [0, 40]);
    }

    #[test]
    fn test_regression_clamps_only_that_category() {
        let mut deltas = CounterDeltas::<3>::new();
        deltas.update([1000, 500, 10], true);

        let diff = deltas.update([20, 650, 30], false);
        assert_eq!(diff, [0, 150, 20]);

        // new baseline makes recovery self-correcting
        assert_eq!(deltas.update([70, 700, 30], false), [50, 50, 0]);
    }

    #[test]
    fn test_two_source_network_scenario() {
        // inbound, outbound, local summed over interfaces A and B
        let mut deltas = CounterDeltas::<3>::new();

        let t0 = deltas.update([1000 + 200, 500 + 100, 0], true);
        assert_eq!(t0, [0, 0, 0]);

        let t1 = deltas.update([1500 + 260, 650 + 140, 0], false);
        assert_eq!(t1, [560, 190, 0]);

        // A restarts, B unchanged
        let t2 = deltas.update([50 + 260, 20 + 140, 0], false);
        assert_eq!(t2, [0, 0, 0]);
    }
}
