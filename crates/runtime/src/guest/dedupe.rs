//! Bounded memory of applied outcome keys.
use std::collections::{HashSet, VecDeque};

use battle_core::OutcomeKey;

/// Remembers the most recent `capacity` outcome keys.
#[derive(Clone, Debug)]
pub struct DedupeWindow {
    capacity: usize,
    order: VecDeque<OutcomeKey>,
    seen: HashSet<OutcomeKey>,
}

impl DedupeWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, key: &OutcomeKey) -> bool {
        self.seen.contains(key)
    }

    /// Records `key`, evicting the oldest key once the window is full.
    ///
    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, key: OutcomeKey) -> bool {
        if !self.seen.insert(key.clone()) {
            return false;
        }
        self.order.push_back(key);
        if self.order.len() > self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.seen.remove(&oldest);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
