use std::collections::VecDeque;

use crate::rotation::Orientation;

/// Number of samples kept when no capacity is given
pub const DEFAULT_CAPACITY: usize = 100;

/// Rolling window of the most recent roll, pitch and yaw samples.
///
/// Once full, every append evicts exactly one sample, the oldest one, so the
/// length stays pinned at the capacity.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<Orientation>,
    capacity: usize,
}

/// Roll, pitch and yaw channels of a [`SampleHistory`] in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySnapshot {
    pub roll: Vec<f64>,
    pub pitch: Vec<f64>,
    pub yaw: Vec<f64>,
}

impl HistorySnapshot {
    pub fn len(&self) -> usize {
        self.roll.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roll.is_empty()
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SampleHistory {
    /// Create an empty history. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, roll: f64, pitch: f64, yaw: f64) {
        self.push(Orientation::new(roll, pitch, yaw));
    }

    pub fn push(&mut self, orientation: Orientation) {
        self.samples.push_back(orientation);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        let mut snapshot = HistorySnapshot {
            roll: Vec::with_capacity(self.samples.len()),
            pitch: Vec::with_capacity(self.samples.len()),
            yaw: Vec::with_capacity(self.samples.len()),
        };
        for sample in &self.samples {
            snapshot.roll.push(sample.roll);
            snapshot.pitch.push(sample.pitch);
            snapshot.yaw.push(sample.yaw);
        }
        snapshot
    }

    pub fn latest(&self) -> Option<&Orientation> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Fixed-length window of single values for the legacy one-number protocol.
///
/// The window starts filled with a constant, so it always holds exactly
/// `capacity` values and the chart has a full x-range from the first frame.
#[derive(Debug, Clone)]
pub struct ScalarHistory {
    values: VecDeque<f64>,
    capacity: usize,
}

impl Default for ScalarHistory {
    fn default() -> Self {
        Self::prefilled(DEFAULT_CAPACITY, 0.0)
    }
}

impl ScalarHistory {
    pub fn prefilled(capacity: usize, fill: f64) -> Self {
        let capacity = capacity.max(1);
        let mut values = VecDeque::with_capacity(capacity + 1);
        values.extend(std::iter::repeat(fill).take(capacity));
        Self { values, capacity }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Smallest and largest finite value in the window
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
