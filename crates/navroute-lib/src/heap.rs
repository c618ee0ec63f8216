//! Binary min-heap used as the open set of the route search.
//!
//! Unlike [`std::collections::BinaryHeap`] this heap supports changing the
//! cost of an entry that is already queued. Lookups for `contains` and
//! `change` scan the backing vector, which is fast enough for the few thousand
//! open nodes a route search typically holds.

/// Min-cost priority queue.
#[derive(Debug, Clone)]
pub struct Heap<T> {
    entries: Vec<HeapEntry<T>>,
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry<T> {
    cost: f32,
    data: T,
}

impl<T> Default for Heap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: PartialEq> Heap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Insert `data` with the given cost.
    pub fn push(&mut self, data: T, cost: f32) {
        self.entries.push(HeapEntry { cost, data });
        self.sift_up(self.entries.len() - 1);
    }

    /// Remove and return the entry with the lowest cost.
    pub fn pop(&mut self) -> Option<T> {
        self.pop_with_cost().map(|(data, _)| data)
    }

    /// Remove the entry with the lowest cost and return it together with its cost.
    pub fn pop_with_cost(&mut self) -> Option<(T, f32)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let entry = self.entries.pop()?;
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((entry.data, entry.cost))
    }

    /// Lowest cost entry without removing it.
    pub fn peek(&self) -> Option<(&T, f32)> {
        self.entries.first().map(|entry| (&entry.data, entry.cost))
    }

    pub fn contains(&self, data: &T) -> bool {
        self.position(data).is_some()
    }

    /// Cost of a queued entry.
    pub fn cost(&self, data: &T) -> Option<f32> {
        self.position(data).map(|index| self.entries[index].cost)
    }

    /// Update the cost of a queued entry. Returns `false` if `data` is not queued.
    pub fn change(&mut self, data: &T, cost: f32) -> bool {
        let Some(index) = self.position(data) else {
            return false;
        };

        let old_cost = self.entries[index].cost;
        self.entries[index].cost = cost;
        if cost < old_cost {
            self.sift_up(index);
        } else if cost > old_cost {
            self.sift_down(index);
        }
        true
    }

    fn position(&self, data: &T) -> Option<usize> {
        self.entries.iter().position(|entry| entry.data == *data)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].cost < self.entries[parent].cost {
                self.entries.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.entries[left].cost < self.entries[smallest].cost {
                smallest = left;
            }
            if right < len && self.entries[right].cost < self.entries[smallest].cost {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.entries.swap(index, smallest);
            index = smallest;
        }
    }
}
