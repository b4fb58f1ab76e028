//! # mst-siege - Self-Healing Network Siege Simulator
//!
//! A discrete-event simulation of a weighted network under sustained attack.
//! Attackers compromise hosts, defenders repair them, and a minimum spanning
//! structure over the healthy hosts is rebuilt and re-routed around the damage.
//!
//! ## Core Components
//!
//! - **PriorityHeap**: binary min-heap with a pluggable tie-break
//! - **EventClock**: the heap keyed by simulated time, ties broken by action rank
//! - **NetworkGraph**: cost matrix, live spanning structure, attack/repair transitions
//! - **RepairBacklog**: FIFO of damaged nodes with constant-time membership
//! - **Simulator**: the deploy/execute event loop tying it all together
//!
//! ## Usage
//!
//! ```no_run
//! use siege::{SimulationConfig, Simulator};
//!
//! let config = SimulationConfig {
//!     num_attackers: 2,
//!     num_defenders: 1,
//!     num_nodes: 20,
//!     seed: 42,
//!     ..Default::default()
//! };
//!
//! let result = Simulator::new(config)?.run()?;
//! result.print_summary();
//! # Ok::<(), siege::SimError>(())
//! ```
//!
//! Runs are deterministic: the same configuration always yields the same event
//! sequence, summarised by `SimulationResult::trace_digest`.

// Event ordering
pub mod sg_clock;
pub mod sg_heap;

// Network model
pub mod sg_backlog;
pub mod sg_graph;
pub mod sg_matrix;

pub mod sg_config;
pub mod sg_interface;
pub mod sg_report;
pub mod sg_simulator;
pub mod sg_stats;

// Re-export commonly used types
pub use sg_config::{Scenario, ScenarioMeta, SimulationConfig, USAGE};
pub use sg_graph::{Edge, NetworkConfig, NetworkGraph, Node};
pub use sg_interface::{Action, Cost, Event, NodeId, ProcessedEvent, SimError, SimTime};
pub use sg_simulator::Simulator;
pub use sg_stats::{SimStats, SimulationResult};
