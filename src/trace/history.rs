// Trace history with bounded capacity

use super::record::StepRecord;
use std::collections::VecDeque;

/// Default number of steps a session keeps
pub const DEFAULT_TRACE_CAPACITY: usize = 10_000;

/// Ordered record of executed steps
///
/// When bounded, appending past the capacity evicts the oldest entries so the
/// history always holds the most recent `capacity` steps in append order.
#[derive(Debug, Clone)]
pub struct TraceHistory {
    records: VecDeque<StepRecord>,
    capacity: Option<usize>,
}

impl TraceHistory {
    /// Create a history; `None` or `Some(0)` means unbounded
    pub fn new(capacity: Option<usize>) -> Self {
        TraceHistory {
            records: VecDeque::new(),
            capacity: capacity.filter(|&n| n > 0),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Add a step, evicting from the front if over capacity
    pub fn push(&mut self, record: StepRecord) {
        self.records.push_back(record);
        self.evict();
    }

    /// Change the capacity; shrinking drops the oldest entries immediately
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity.filter(|&n| n > 0);
        self.evict();
    }

    fn evict(&mut self) {
        if let Some(max) = self.capacity {
            while self.records.len() > max {
                self.records.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Get a record by index (0 is the oldest retained step)
    pub fn get(&self, index: usize) -> Option<&StepRecord> {
        self.records.get(index)
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.iter()
    }

    /// Independent copy of the retained steps
    pub fn to_vec(&self) -> Vec<StepRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl Default for TraceHistory {
    fn default() -> Self {
        Self::new(Some(DEFAULT_TRACE_CAPACITY))
    }
}
