//! Ringbuffer module for tracking historical samples.
//!
//! This module provides a fixed-size ringbuffer with predictable memory usage.
//! Storage is allocated once at construction; pushing into a full buffer
//! overwrites the oldest slot, so appends stay O(1).

/// A circular buffer with fixed capacity.
#[derive(Debug, Clone)]
pub struct Ringbuffer<T> {
    entries: Vec<T>,
    capacity: usize,
    write_index: usize,
    count: usize,
}

impl<T: Copy + Default> Ringbuffer<T> {
    /// Creates a new ringbuffer with the specified capacity.
    ///
    /// A capacity of zero is bumped to one so `push` never divides by zero.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = Vec::with_capacity(capacity);
        entries.resize(capacity, T::default());

        Self {
            entries,
            capacity,
            write_index: 0,
            count: 0,
        }
    }

    /// Pushes a new entry into the ringbuffer.
    ///
    /// If the buffer is full, the oldest entry will be overwritten.
    pub fn push(&mut self, entry: T) {
        self.entries[self.write_index] = entry;
        self.write_index = (self.write_index + 1) % self.capacity;

        if self.count < self.capacity {
            self.count += 1;
        }
    }

    /// Returns all entries in chronological order (oldest to newest).
    pub fn get_history(&self) -> Vec<T> {
        if self.count == 0 {
            return Vec::new();
        }

        let mut result = Vec::with_capacity(self.count);

        if self.count < self.capacity {
            // Buffer not yet full, entries are in order from 0 to count-1
            result.extend_from_slice(&self.entries[0..self.count]);
        } else {
            // Buffer is full, oldest entry sits at write_index
            result.extend_from_slice(&self.entries[self.write_index..]);
            result.extend_from_slice(&self.entries[0..self.write_index]);
        }

        result
    }

    /// Returns the current number of entries in the buffer.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns the maximum capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
