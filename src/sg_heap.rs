//! Binary min-heap with a pluggable tie-break
//!
//! The heap stores `(content, priority)` pairs in a flat array laid out as a
//! complete binary tree: children of slot `i` live at `2i + 1` and `2i + 2`,
//! the parent at `(i - 1) / 2`. The smallest priority sits at the root. When
//! two priorities are equal the [`TieBreak`] supplied at construction decides
//! which element comes out first.

use std::cmp::Ordering;

use crate::sg_interface::{Priority, SimError};

/// Capacity used by [`PriorityHeap::new`]
pub const DEFAULT_HEAP_CAPACITY: usize = 20;

/// Secondary order consulted when two heap entries share a priority
///
/// `Ordering::Less` means `a` leaves the heap before `b`. The order must be
/// consistent: asking twice about the same pair must give the same answer,
/// otherwise the heap order is undefined.
pub trait TieBreak<T> {
    fn tie_break(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> TieBreak<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn tie_break(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Treats every tie as equal
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTieBreak;

impl<T> TieBreak<T> for NoTieBreak {
    fn tie_break(&self, _a: &T, _b: &T) -> Ordering {
        Ordering::Equal
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeapEntry<T> {
    pub content: T,
    pub priority: Priority,
}

pub struct PriorityHeap<T, B> {
    entries: Vec<HeapEntry<T>>,
    // logical capacity, doubled on overflow
    capacity: usize,
    tie_break: B,
}

impl<T, B: TieBreak<T>> PriorityHeap<T, B> {
    pub fn new(tie_break: B) -> Self {
        Self::with_capacity(DEFAULT_HEAP_CAPACITY, tie_break)
    }

    pub fn with_capacity(capacity: usize, tie_break: B) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            tie_break,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn peek(&self) -> Option<&HeapEntry<T>> {
        self.entries.first()
    }

    pub fn priority_at(&self, index: usize) -> Result<Priority, SimError> {
        self.entries
            .get(index)
            .map(|entry| entry.priority)
            .ok_or(SimError::HeapIndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Slot of the first entry (in array order) matching `predicate`
    pub fn position<P>(&self, mut predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.entries.iter().position(|entry| predicate(&entry.content))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeapEntry<T>> {
        self.entries.iter()
    }

    /// Insert `content`, doubling the capacity when the array is full
    pub fn push(&mut self, content: T, priority: Priority) {
        if self.entries.len() >= self.capacity {
            self.grow();
        }

        self.entries.push(HeapEntry { content, priority });
        let last = self.entries.len() - 1;
        self.sift_up(last);
    }

    /// Remove and return the entry that orders first
    pub fn pop(&mut self) -> Result<HeapEntry<T>, SimError> {
        if self.entries.is_empty() {
            return Err(SimError::EmptyHeap);
        }

        // move the last entry into the root, then let it sink
        let top = self.entries.swap_remove(0);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }

        Ok(top)
    }

    pub fn increase_key(&mut self, index: usize, delta: Priority) -> Result<(), SimError> {
        self.adjust_key(index, delta)
    }

    pub fn decrease_key(&mut self, index: usize, delta: Priority) -> Result<(), SimError> {
        self.adjust_key(index, -delta)
    }

    /// Heap order holds for every non-root slot
    pub fn is_heap(&self) -> bool {
        (1..self.entries.len()).all(|i| !self.precedes(i, Self::parent(i)))
    }

    fn adjust_key(&mut self, index: usize, delta: Priority) -> Result<(), SimError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(SimError::HeapIndexOutOfRange { index, len })?;
        entry.priority += delta;

        // the tie-break is opaque, so the entry may need to move either way
        if self.sift_up(index) == index {
            self.sift_down(index);
        }

        Ok(())
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity * 2;
        let mut grown = Vec::with_capacity(new_capacity);
        grown.append(&mut self.entries);
        self.entries = grown;
        self.capacity = new_capacity;
    }

    /// Does the entry at `a` leave the heap before the entry at `b`?
    fn precedes(&self, a: usize, b: usize) -> bool {
        let (left, right) = (&self.entries[a], &self.entries[b]);
        match left.priority.cmp(&right.priority) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => {
                self.tie_break.tie_break(&left.content, &right.content) == Ordering::Less
            }
        }
    }

    fn parent(index: usize) -> usize {
        (index - 1) / 2
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = Self::parent(index);
            if !self.precedes(index, parent) {
                break;
            }
            self.entries.swap(index, parent);
            index = parent;
        }
        index
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            if left >= len {
                break;
            }

            let first_child = if right < len && self.precedes(right, left) {
                right
            } else {
                left
            };

            if !self.precedes(first_child, index) {
                break;
            }
            self.entries.swap(index, first_child);
            index = first_child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn drain<T, B: TieBreak<T>>(heap: &mut PriorityHeap<T, B>) -> Vec<HeapEntry<T>> {
        let mut out = Vec::new();
        while !heap.is_empty() {
            out.push(heap.pop().unwrap());
        }
        out
    }

    #[test]
    fn test_pop_returns_ascending_priorities() {
        let mut heap = PriorityHeap::new(NoTieBreak);
        for (i, p) in [50, 10, 40, 20, 30].iter().enumerate() {
            heap.push(i, *p);
        }

        let priorities: Vec<Priority> = drain(&mut heap).iter().map(|e| e.priority).collect();
        assert_eq!(priorities, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_pop_empty_heap_fails() {
        let mut heap: PriorityHeap<u8, NoTieBreak> = PriorityHeap::new(NoTieBreak);
        assert_eq!(heap.pop(), Err(SimError::EmptyHeap));
    }

    #[test]
    fn test_tie_break_orders_equal_priorities() {
        // larger payload first on ties
        let mut heap = PriorityHeap::new(|a: &u32, b: &u32| b.cmp(a));
        heap.push(1, 7);
        heap.push(9, 7);
        heap.push(4, 7);
        heap.push(100, 8);

        let contents: Vec<u32> = drain(&mut heap).iter().map(|e| e.content).collect();
        assert_eq!(contents, vec![9, 4, 1, 100]);
    }

    #[test]
    fn test_capacity_doubles_on_overflow() {
        let mut heap = PriorityHeap::with_capacity(2, NoTieBreak);
        assert_eq!(heap.capacity(), 2);

        heap.push('a', 3);
        heap.push('b', 2);
        assert_eq!(heap.capacity(), 2);

        heap.push('c', 1);
        assert_eq!(heap.capacity(), 4);
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.peek().map(|e| e.content), Some('c'));

        for i in 0..10 {
            heap.push('z', i);
        }
        assert_eq!(heap.capacity(), 16);
        assert!(heap.is_heap());
    }

    #[test]
    fn test_key_changes_restore_order() {
        let mut heap = PriorityHeap::new(NoTieBreak);
        for i in 0..10 {
            heap.push(i, (i as Priority) * 10);
        }

        // push the current minimum to the back
        heap.increase_key(0, 1000).unwrap();
        assert!(heap.is_heap());
        assert_eq!(heap.peek().map(|e| e.content), Some(1));

        // pull the entry holding payload 9 to the front
        let slot = heap.position(|c| *c == 9).unwrap();
        heap.decrease_key(slot, 200).unwrap();
        assert!(heap.is_heap());
        assert_eq!(heap.peek().map(|e| (e.content, e.priority)), Some((9, -110)));
    }

    #[test]
    fn test_key_change_out_of_range() {
        let mut heap = PriorityHeap::new(NoTieBreak);
        heap.push((), 1);

        assert_eq!(
            heap.increase_key(3, 1),
            Err(SimError::HeapIndexOutOfRange { index: 3, len: 1 })
        );
        assert_eq!(
            heap.priority_at(1),
            Err(SimError::HeapIndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_heap_invariant_under_random_operations() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut heap = PriorityHeap::with_capacity(1, |a: &u32, b: &u32| a.cmp(b));
        let mut popped = 0;

        for step in 0..2000u32 {
            match rng.gen_range(0..10) {
                0..=4 => heap.push(step, rng.gen_range(-50..50)),
                5..=6 => {
                    if heap.pop().is_ok() {
                        popped += 1;
                    }
                }
                7 if !heap.is_empty() => {
                    let slot = rng.gen_range(0..heap.len());
                    heap.increase_key(slot, rng.gen_range(0..40)).unwrap();
                }
                8 if !heap.is_empty() => {
                    let slot = rng.gen_range(0..heap.len());
                    heap.decrease_key(slot, rng.gen_range(0..40)).unwrap();
                }
                _ => {}
            }
            assert!(heap.is_heap(), "heap order broken at step {}", step);
        }

        assert!(popped > 0);

        // a full drain comes out sorted by (priority, payload)
        let drained: Vec<(Priority, u32)> = drain(&mut heap)
            .into_iter()
            .map(|e| (e.priority, e.content))
            .collect();
        let mut sorted = drained.clone();
        sorted.sort();
        assert_eq!(drained, sorted);
    }
}
