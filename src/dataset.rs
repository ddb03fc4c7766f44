//! Bounded per-series sample history.

use std::collections::{TryReserveError, VecDeque};

use serde::Serialize;

/// How a provider's values relate to the underlying counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetMode {
    /// Instantaneous levels (memory in use, load, temperature).
    Absolute,
    /// Per-tick differences of cumulative counters (traffic, disk I/O, CPU time).
    Delta,
}

/// Error returned when a tick's values do not match the series count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub expected: usize,
    pub got: usize,
}

impl std::fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected {} values, got {}", self.expected, self.got)
    }
}

impl std::error::Error for ShapeMismatch {}

/// Fixed-capacity ring buffer per series. All series always hold the same
/// number of samples: a row is appended whole or not at all.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    mode: DatasetMode,
    capacity: usize,
    /// Milliseconds between ticks, used to turn per-tick deltas into rates.
    interval_ms: u64,
    series: Vec<VecDeque<u64>>,
}

impl Dataset {
    /// Creates an empty dataset. Storage grows with the rows pushed.
    pub fn new(n_series: usize, capacity: usize, mode: DatasetMode, interval_ms: u64) -> Self {
        Self {
            mode,
            capacity: capacity.max(1),
            interval_ms: interval_ms.max(1),
            series: (0..n_series).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Creates a dataset with storage for `capacity` rows reserved up front.
    /// Fails instead of aborting when that much memory is not available.
    pub fn allocate(
        n_series: usize,
        capacity: usize,
        mode: DatasetMode,
        interval_ms: u64,
    ) -> Result<Self, TryReserveError> {
        let mut dataset = Self::new(n_series, capacity, mode, interval_ms);
        for series in &mut dataset.series {
            series.try_reserve_exact(dataset.capacity)?;
        }
        Ok(dataset)
    }

    pub fn mode(&self) -> DatasetMode {
        self.mode
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn n_series(&self) -> usize {
        self.series.len()
    }

    /// Number of committed rows.
    pub fn len(&self) -> usize {
        self.series.first().map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends one row, evicting the oldest when full.
    pub fn push(&mut self, values: &[u64]) -> Result<(), ShapeMismatch> {
        if values.len() != self.series.len() {
            return Err(ShapeMismatch {
                expected: self.series.len(),
                got: values.len(),
            });
        }
        for (series, &value) in self.series.iter_mut().zip(values) {
            if series.len() == self.capacity {
                series.pop_front();
            }
            series.push_back(value);
        }
        Ok(())
    }

    /// Value of `series`, `age` rows back from the newest (0 is the newest).
    pub fn value(&self, series: usize, age: usize) -> Option<u64> {
        let s = self.series.get(series)?;
        let idx = s.len().checked_sub(age + 1)?;
        s.get(idx).copied()
    }

    /// Newest value of `series`, or 0 when nothing was committed yet.
    pub fn latest(&self, series: usize) -> u64 {
        self.value(series, 0).unwrap_or(0)
    }

    /// Values of `series` from oldest to newest.
    pub fn series(&self, series: usize) -> impl Iterator<Item = u64> + '_ {
        self.series.get(series).into_iter().flatten().copied()
    }

    /// Largest value of the newest row.
    pub fn latest_row_max(&self) -> u64 {
        (0..self.n_series())
            .map(|s| self.latest(s))
            .max()
            .unwrap_or(0)
    }

    /// Scales a per-tick value to a per-second rate.
    pub fn per_second(&self, value: u64) -> u64 {
        ((value as u128 * 1000) / self.interval_ms as u128) as u64
    }

    pub fn clear(&mut self) {
        for series in &mut self.series {
            series.clear();
        }
    }

    /// Approximate heap usage in bytes.
    pub fn footprint(&self) -> usize {
        self.series
            .iter()
            .map(|s| s.capacity() * std::mem::size_of::<u64>())
            .sum::<usize>()
            + self.series.capacity() * std::mem::size_of::<VecDeque<u64>>()
    }
}
