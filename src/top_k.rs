//! Bounded selection of the largest items seen in a stream.
//!
//! [`TopKSelector`] keeps a min-heap of at most K entries. The root is the
//! entry that would be evicted next: the smallest weight and, among equal
//! weights, the one seen last. Ties are therefore won by the first item seen.
//!
//! # Examples
//!
//! ```
//! use dirsort::top_k::TopKSelector;
//!
//! let mut selector = TopKSelector::new(3);
//! for size in [5u64, 3, 9, 1, 7] {
//!     selector.offer(size);
//! }
//! assert_eq!(selector.drain(), vec![9, 7, 5]);
//! ```

use crate::file_record::FileRecord;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Anything ranked by a numeric weight.
pub trait Weighted {
    fn weight(&self) -> u64;
}

impl Weighted for FileRecord {
    fn weight(&self) -> u64 {
        self.size
    }
}

impl Weighted for u64 {
    fn weight(&self) -> u64 {
        *self
    }
}

#[derive(Debug, Clone)]
struct Ranked<T> {
    weight: u64,
    sequence: u64,
    item: T,
}

impl<T> Ranked<T> {
    /// Heavier ranks higher; among equal weights, earlier ranks higher.
    fn key(&self) -> (u64, Reverse<u64>) {
        (self.weight, Reverse(self.sequence))
    }
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Retains the `capacity` heaviest items offered so far.
#[derive(Debug, Clone)]
pub struct TopKSelector<T> {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked<T>>>,
    next_sequence: u64,
}

impl<T: Weighted> TopKSelector<T> {
    /// A selector keeping at most `capacity` items. Zero is allowed.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offers an item in O(log K).
    ///
    /// The item is kept if fewer than K items are held or it outranks the
    /// current smallest, which is then evicted.
    pub fn offer(&mut self, item: T) {
        let ranked = Ranked {
            weight: item.weight(),
            sequence: self.next_sequence,
            item,
        };
        self.next_sequence += 1;

        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(ranked));
            return;
        }
        if let Some(mut smallest) = self.heap.peek_mut()
            && ranked > smallest.0
        {
            *smallest = Reverse(ranked);
        }
    }

    /// Consumes the selector, returning items heaviest first.
    pub fn drain(self) -> Vec<T> {
        // Ascending order of `Reverse` is descending rank.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(ranked)| ranked.item)
            .collect()
    }

    /// Combines two selectors into one with the capacity of `self`.
    ///
    /// Items held by `self` count as seen before those held by `other`.
    pub fn merge(self, other: Self) -> Self {
        let mut merged = Self::new(self.capacity);
        for item in self.drain().into_iter().chain(other.drain()) {
            merged.offer(item);
        }
        merged
    }
}

impl<T: Weighted + Clone> TopKSelector<T> {
    /// The held items heaviest first, leaving the selector untouched.
    pub fn snapshot(&self) -> Vec<T> {
        let mut ranked: Vec<&Ranked<T>> = self.heap.iter().map(|Reverse(r)| r).collect();
        ranked.sort_by(|a, b| b.cmp(a));
        ranked.into_iter().map(|r| r.item.clone()).collect()
    }
}

impl<T: Weighted> Extend<T> for TopKSelector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.offer(item);
        }
    }
}
