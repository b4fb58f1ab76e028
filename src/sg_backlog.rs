// repair backlog: FIFO of nodes waiting for a defender

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::sg_interface::{NodeId, SimError};

/// FIFO of node ids with constant-time membership checks
///
/// Membership is counted per push, so a node pushed twice stays a member
/// until it has been popped twice. `capacity` bounds both the node ids and
/// the number of queued entries.
pub struct RepairBacklog {
    queue: VecDeque<NodeId>,
    queued: HashMap<NodeId, usize>,
    capacity: usize,
    peak: usize,
}

impl RepairBacklog {
    /// Backlog for node ids `0..capacity`
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            queued: HashMap::with_capacity(capacity),
            capacity,
            peak: 0,
        }
    }

    pub fn push(&mut self, node: NodeId) -> Result<(), SimError> {
        if node >= self.capacity {
            return Err(SimError::UnknownNode(node));
        }
        if self.queue.len() >= self.capacity {
            return Err(SimError::BacklogFull(self.capacity));
        }
        self.queue.push_back(node);
        *self.queued.entry(node).or_insert(0) += 1;
        self.peak = self.peak.max(self.queue.len());
        Ok(())
    }

    pub fn pop(&mut self) -> Result<NodeId, SimError> {
        let node = self.queue.pop_front().ok_or(SimError::EmptyBacklog)?;
        if let Some(count) = self.queued.get_mut(&node) {
            *count -= 1;
            if *count == 0 {
                self.queued.remove(&node);
            }
        }
        Ok(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.queued.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Longest the queue has been
    pub fn peak(&self) -> usize {
        self.peak
    }
}
