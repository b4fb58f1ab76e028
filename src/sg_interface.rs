use std::fmt;

// node ids index straight into the graph arena
pub type NodeId = usize;
pub type Cost = i64;
pub type SimTime = i64;
pub type Priority = i64;

/// What an event does when it is processed.
///
/// Every effect is split in two: a deploy reserves a point in time, the
/// matching execute applies the effect at that time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    DeployAttack,
    ExecuteAttack,
    DeployFix,
    ExecuteFix,
    DeployRebuild,
    ExecuteRebuild,
}

impl Action {
    /// Rank used when two events share a timestamp: higher ranks are processed first.
    pub fn rank(self) -> u8 {
        match self {
            Action::ExecuteAttack => 5,
            Action::DeployAttack => 4,
            Action::ExecuteFix => 3,
            Action::DeployFix => 2,
            Action::ExecuteRebuild => 1,
            Action::DeployRebuild => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::DeployAttack => "Deploy_Attack",
            Action::ExecuteAttack => "Execute_Attack",
            Action::DeployFix => "Deploy_Fix",
            Action::ExecuteFix => "Execute_Fix",
            Action::DeployRebuild => "Deploy_Rebuild",
            Action::ExecuteRebuild => "Execute_Rebuild",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    pub action: Action,
    pub target: Option<NodeId>,
}

impl Event {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            target: None,
        }
    }

    pub fn targeting(action: Action, target: NodeId) -> Self {
        Self {
            action,
            target: Some(target),
        }
    }
}

/// An event as it was handled by the simulation loop, stamped with its time
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProcessedEvent {
    pub time: SimTime,
    pub action: Action,
    pub target: Option<NodeId>,
}

impl ProcessedEvent {
    /// Stable byte encoding, fed into the run digest
    pub fn to_bytes(&self) -> [u8; 17] {
        let mut out = [0u8; 17];
        out[..8].copy_from_slice(&self.time.to_le_bytes());
        out[8] = self.action.rank();
        // u64::MAX marks "no target"
        let target = self.target.map(|t| t as u64).unwrap_or(u64::MAX);
        out[9..].copy_from_slice(&target.to_le_bytes());
        out
    }
}

impl fmt::Display for ProcessedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(target) => write!(f, "{}({}, {})", self.action.label(), self.time, target),
            None => write!(f, "{}({})", self.action.label(), self.time),
        }
    }
}

/// Errors raised by the heap, the graph and the simulation loop
///
/// `EmptyHeap`, `EmptyBacklog` and `HeapIndexOutOfRange` indicate a bug in
/// the caller; the event protocol never produces them in a healthy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Pop on a heap with no elements
    EmptyHeap,

    /// Pop on a repair backlog with no queued nodes
    EmptyBacklog,

    /// Push on a repair backlog already holding one entry per node
    BacklogFull(usize),

    /// Heap slot outside the occupied range
    HeapIndexOutOfRange { index: usize, len: usize },

    /// Node id outside `0..num_nodes`
    UnknownNode(NodeId),

    /// An execute event that needs a target node arrived without one
    MissingTarget(Action),

    /// Hand-supplied cost matrix is not square, symmetric or zero on the diagonal
    InvalidCostMatrix(String),

    /// Malformed process arguments or configuration values
    InvalidArgument(String),

    /// Scheduling `delay` after `now` does not fit in `SimTime`
    TimeOverflow { now: SimTime, delay: SimTime },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EmptyHeap => write!(f, "pop from an empty heap"),
            SimError::EmptyBacklog => write!(f, "pop from an empty repair backlog"),
            SimError::BacklogFull(capacity) => {
                write!(f, "repair backlog is full ({} entries)", capacity)
            }
            SimError::HeapIndexOutOfRange { index, len } => {
                write!(f, "heap index {} out of range (len {})", index, len)
            }
            SimError::UnknownNode(id) => write!(f, "unknown node {}", id),
            SimError::MissingTarget(action) => write!(f, "{} without a target", action.label()),
            SimError::InvalidCostMatrix(reason) => write!(f, "invalid cost matrix: {}", reason),
            SimError::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
            SimError::TimeOverflow { now, delay } => {
                write!(f, "event time overflows: {} + {}", now, delay)
            }
        }
    }
}

impl std::error::Error for SimError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_ranks_are_distinct_and_ordered() {
        let ordered = [
            Action::ExecuteAttack,
            Action::DeployAttack,
            Action::ExecuteFix,
            Action::DeployFix,
            Action::ExecuteRebuild,
            Action::DeployRebuild,
        ];

        for pair in ordered.windows(2) {
            assert!(pair[0].rank() > pair[1].rank(), "{:?} should outrank {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_processed_event_display() {
        let with_target = ProcessedEvent {
            time: 120,
            action: Action::ExecuteAttack,
            target: Some(3),
        };
        assert_eq!(with_target.to_string(), "Execute_Attack(120, 3)");

        let without_target = ProcessedEvent {
            time: 40,
            action: Action::DeployRebuild,
            target: None,
        };
        assert_eq!(without_target.to_string(), "Deploy_Rebuild(40)");
    }

    #[test]
    fn test_processed_event_bytes_distinguish_missing_target() {
        let a = ProcessedEvent {
            time: 1,
            action: Action::DeployFix,
            target: None,
        };
        let b = ProcessedEvent {
            target: Some(0),
            ..a
        };
        assert_ne!(a.to_bytes(), b.to_bytes());
    }
}
