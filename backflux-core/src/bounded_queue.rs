// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use std::collections::VecDeque;

const MAX_PREALLOCATION: usize = 1024;

/// A fixed-capacity FIFO shared between the thread delivering elements and
/// the thread draining them.
///
/// [`BoundedQueue::offer`] refuses, rather than grows, once the capacity is
/// reached and hands the element back to the caller.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity.min(MAX_PREALLOCATION))),
            capacity,
        }
    }

    /// Appends `item`, or returns it when the queue is full.
    ///
    /// # Errors
    ///
    /// Gives the item back when the queue already holds `capacity` elements.
    pub fn offer(&self, item: T) -> Result<(), T> {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            return Err(item);
        }
        items.push_back(item);
        Ok(())
    }

    pub fn poll(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every queued element and returns how many there were.
    pub fn clear(&self) -> usize {
        let drained: Vec<T> = self.items.lock().drain(..).collect();
        drained.len()
    }
}
