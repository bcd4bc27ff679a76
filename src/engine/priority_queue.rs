// Binary min-heap priority queue.
// Ordering primitive for cost- and time-based selection: the navigation
// frontier and the spawn scheduler both sit on top of it.
//
// Layout: 0-indexed Vec, parent = (i-1)/2, children = 2i+1, 2i+2.

use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// `dequeue` called with nothing enqueued. Check `is_empty`/`peek` first.
    #[error("dequeue on an empty priority queue")]
    Empty,
    #[error("heap index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

// ============================================================================
// PRIORITY QUEUE
// ============================================================================

/// Min-priority queue over any totally ordered `T`.
///
/// `peek`/`dequeue` always yield a minimum according to `T: Ord`.
/// Equal elements come out in an unspecified order. If a caller needs FIFO
/// among ties, it must fold a sequence number into `T`'s ordering
/// (see `ScheduledSpawn`).
///
/// The `Ord` impl must stay stable while an element is enqueued; a
/// non-total order leaves the heap layout undefined.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    heap: Vec<T>,
}

impl<T: Ord> PriorityQueue<T> {
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// A minimum element without removing it. `None` when empty.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    /// Insert `item`, restoring the heap property with a sift-up.
    pub fn enqueue(&mut self, item: T) {
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
    }

    /// Remove and return a minimum element.
    ///
    /// Fails with `QueueError::Empty` instead of handing back a default,
    /// and leaves the queue untouched in that case.
    pub fn dequeue(&mut self) -> Result<T, QueueError> {
        if self.heap.is_empty() {
            return Err(QueueError::Empty);
        }
        let min = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Ok(min)
    }

    /// Drop every element. Keeps the allocation.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Raw heap-array slot. This is layout order, NOT priority order:
    /// only index 0 is guaranteed to be a minimum.
    pub fn get(&self, index: usize) -> Result<&T, QueueError> {
        self.heap.get(index).ok_or(QueueError::IndexOutOfRange {
            index,
            len: self.heap.len(),
        })
    }

    /// Iterate the raw heap array (layout order, for diagnostics).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.heap.iter()
    }

    /// Remove one element equal to `item`, if present.
    ///
    /// O(n) scan. Re-ranking an enqueued element is done by removing it and
    /// enqueueing the updated value.
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let index = self.heap.iter().position(|x| x == item)?;
        let removed = self.heap.swap_remove(index);
        if index < self.heap.len() {
            // The moved-in tail element may be out of place in either direction.
            let settled = self.sift_up(index);
            if settled == index {
                self.sift_down(index);
            }
        }
        Some(removed)
    }

    /// Consume the queue, returning its elements in ascending order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Ok(item) = self.dequeue() {
            out.push(item);
        }
        out
    }

    // ------------------------------------------------------------------------
    // Heap maintenance
    // ------------------------------------------------------------------------

    /// Move the element at `index` toward the root while its parent is
    /// strictly greater. Returns the index it settled at.
    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[parent] > self.heap[index] {
                self.heap.swap(parent, index);
                index = parent;
            } else {
                break;
            }
        }
        index
    }

    /// Move the element at `index` toward the leaves while a child is smaller.
    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            if left >= len {
                break;
            }

            // Children against each other first, then the winner against the parent.
            let child = if right < len && self.heap[right] < self.heap[left] {
                right
            } else {
                left
            };
            if self.heap[child] < self.heap[index] {
                self.heap.swap(index, child);
                index = child;
            } else {
                break;
            }
        }
    }
}

impl<T: Ord> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for PriorityQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.heap.reserve(iter.size_hint().0);
        for item in iter {
            self.enqueue(item);
        }
    }
}

impl<T: Ord> FromIterator<T> for PriorityQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}
