//! Fixed-capacity ring buffer
//!
//! Head/tail ring with one slot reserved: the buffer is empty when
//! `head == tail`, so a buffer of `N` slots holds at most `N - 1` items.
//! The port uses one instance for outbound and one for inbound bytes.

/// Ring buffer of `N` slots (`N - 1` usable)
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    storage: [T; N],
    /// Next slot to write
    head: usize,
    /// Next slot to read
    tail: usize,
}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    /// Create an empty buffer with every slot initialized to `fill`
    pub const fn new(fill: T) -> Self {
        assert!(N >= 2, "ring buffer needs at least two slots");
        Self {
            storage: [fill; N],
            head: 0,
            tail: 0,
        }
    }

    /// Maximum number of items the buffer can hold
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of unread items
    pub fn len(&self) -> usize {
        (N + self.head - self.tail) % N
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Check if the buffer is full
    pub fn is_full(&self) -> bool {
        (self.head + 1) % N == self.tail
    }

    /// Free slots left before the buffer is full
    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Append an item
    ///
    /// Returns `false` and leaves the buffer untouched if it is full.
    pub fn push(&mut self, item: T) -> bool {
        let next = (self.head + 1) % N;
        if next == self.tail {
            return false;
        }
        self.storage[self.head] = item;
        self.head = next;
        true
    }

    /// Remove the oldest item
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.storage[self.tail];
        self.tail = (self.tail + 1) % N;
        Some(item)
    }

    /// Look at the oldest item without removing it
    pub fn peek(&self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(self.storage[self.tail])
        }
    }

    /// Discard all pending items (tail catches up with head)
    pub fn clear(&mut self) {
        self.tail = self.head;
    }

    /// Discard all pending items and rewind both indices to slot 0
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}
