//! Statistics and results for a simulation run

use crate::sg_interface::{Action, ProcessedEvent, SimTime};
use crate::sg_matrix::SymMatrix;

/// Counters collected while the event loop runs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimStats {
    pub events_processed: usize,
    pub attacks_executed: usize,
    pub fixes_executed: usize,
    pub rebuilds_executed: usize,

    /// Attacks after which the structure was found partitioned
    pub partitions_detected: usize,

    /// DeployFix events that found nothing to repair
    pub idle_patrols: usize,

    pub peak_backlog: usize,
}

impl SimStats {
    pub fn record(&mut self, action: Action) {
        self.events_processed += 1;
        match action {
            Action::ExecuteAttack => self.attacks_executed += 1,
            Action::ExecuteFix => self.fixes_executed += 1,
            Action::ExecuteRebuild => self.rebuilds_executed += 1,
            _ => {}
        }
    }
}

/// Processed-event log plus a running blake3 digest of it
pub struct EventTrace {
    events: Vec<ProcessedEvent>,
    hasher: blake3::Hasher,
    keep_events: bool,
}

impl EventTrace {
    pub fn new(keep_events: bool) -> Self {
        Self {
            events: Vec::new(),
            hasher: blake3::Hasher::new(),
            keep_events,
        }
    }

    pub fn record(&mut self, event: ProcessedEvent) {
        self.hasher.update(&event.to_bytes());
        if self.keep_events {
            self.events.push(event);
        }
    }

    pub fn digest(&self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }

    pub fn into_events(self) -> Vec<ProcessedEvent> {
        self.events
    }
}

/// Simulation result
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub seed: u64,
    pub num_nodes: usize,
    pub completed_attacks: usize,

    /// Simulated time of the last processed event
    pub final_time: SimTime,

    pub stats: SimStats,

    /// Structure matrix when the run stopped
    pub final_structure: SymMatrix,
    pub final_structure_cost: i64,
    pub eligible_nodes: usize,
    pub backlog_remaining: usize,

    /// Every processed event, empty unless trace recording was enabled
    pub trace: Vec<ProcessedEvent>,

    /// blake3 over the processed-event sequence, hex encoded
    pub trace_digest: String,
}

impl SimulationResult {
    /// Print a summary of the simulation results
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Siege Simulation Results                        ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  Seed: {}", self.seed);
        println!("  Nodes: {}", self.num_nodes);
        println!("  Final time: {}\n", self.final_time);

        println!("Event Statistics:");
        println!("  Events processed: {}", self.stats.events_processed);
        println!("  Attacks executed: {}", self.stats.attacks_executed);
        println!("  Fixes executed: {}", self.stats.fixes_executed);
        println!("  Rebuilds executed: {}", self.stats.rebuilds_executed);
        println!("  Partitions detected: {}", self.stats.partitions_detected);
        println!("  Idle defender patrols: {}", self.stats.idle_patrols);
        println!();

        println!("Network State:");
        println!(
            "  Eligible nodes: {}/{}",
            self.eligible_nodes, self.num_nodes
        );
        println!("  Structure cost: {}", self.final_structure_cost);
        println!(
            "  Repair backlog: {} remaining (peak {})",
            self.backlog_remaining, self.stats.peak_backlog
        );
        println!();

        println!("Trace digest: {}", self.trace_digest);
    }
}
