//! Bounded rolling history of throughput samples.

use std::collections::VecDeque;
use std::sync::RwLock;

/// Default number of samples kept: one per tick at the default cadence,
/// so roughly 17 minutes of transfer.
pub const DEFAULT_CAPACITY: usize = 1000;

/// One instantaneous throughput measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputSample {
    pub bytes_per_sec: i64,
    /// Epoch millis of the tick that produced the sample.
    pub taken_at_millis: i64,
}

/// Fixed-capacity FIFO buffer of [`ThroughputSample`]s.
///
/// The ticker task is the only writer; any number of readers take cheap
/// owned snapshots for rendering. Insertion order is chronological order,
/// and once the capacity is reached the oldest sample is evicted.
#[derive(Debug)]
pub struct SampleHistory {
    capacity: usize,
    samples: RwLock<VecDeque<ThroughputSample>>,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be non-zero");
        Self {
            capacity,
            samples: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a sample, evicting the oldest one when full. O(1) amortized.
    pub fn push(&self, sample: ThroughputSample) {
        let mut samples = self.samples.write().unwrap();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    /// Ordered copy of the current samples, oldest first.
    pub fn snapshot(&self) -> Vec<ThroughputSample> {
        self.samples.read().unwrap().iter().copied().collect()
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: i64) -> ThroughputSample {
        ThroughputSample {
            bytes_per_sec: n * 100,
            taken_at_millis: n,
        }
    }

    #[test]
    fn keeps_insertion_order() {
        let history = SampleHistory::new(10);
        for n in 0..5 {
            history.push(sample(n));
        }
        let snap = history.snapshot();
        assert_eq!(snap.len(), 5);
        for (i, s) in snap.iter().enumerate() {
            assert_eq!(s.taken_at_millis, i as i64);
        }
    }

    #[test]
    fn never_exceeds_capacity() {
        let history = SampleHistory::new(4);
        for n in 0..100 {
            history.push(sample(n));
            assert!(history.len() <= 4);
        }
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn evicts_oldest_first() {
        let history = SampleHistory::new(3);
        for n in 0..5 {
            history.push(sample(n));
        }
        let snap = history.snapshot();
        let stamps: Vec<i64> = snap.iter().map(|s| s.taken_at_millis).collect();
        assert_eq!(stamps, vec![2, 3, 4]);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let history = SampleHistory::new(3);
        history.push(sample(1));
        let snap = history.snapshot();
        history.push(sample(2));
        assert_eq!(snap.len(), 1);
        assert_eq!(history.len(), 2);
    }
}
