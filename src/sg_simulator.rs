//! Siege simulation runner
//!
//! A single-threaded fetch/process loop over the [`EventClock`]. Attackers
//! compromise random nodes, defenders drain the [`RepairBacklog`], and the
//! spanning structure is rebuilt whenever it falls apart or a node is fixed.
//!
//! Every effect is a deploy/execute pair:
//!
//! | processed        | schedules                                                   |
//! |------------------|-------------------------------------------------------------|
//! | `DeployAttack`   | `ExecuteAttack` on a random node after the attack interval  |
//! | `ExecuteAttack`  | `DeployRebuild` if partitioned, next `DeployAttack` now     |
//! | `DeployFix`      | `ExecuteFix` after the fix interval (or another patrol)     |
//! | `ExecuteFix`     | `DeployRebuild`, next `DeployFix` now                       |
//! | `DeployRebuild`  | `ExecuteRebuild` after the rebuild delay                    |
//! | `ExecuteRebuild` | nothing                                                     |

use log::{debug, info, trace};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sg_backlog::RepairBacklog;
use crate::sg_clock::EventClock;
use crate::sg_config::SimulationConfig;
use crate::sg_graph::NetworkGraph;
use crate::sg_interface::{Action, Event, NodeId, ProcessedEvent, SimError, SimTime};
use crate::sg_stats::{EventTrace, SimStats, SimulationResult};

const PROGRESS_EVERY: usize = 250;

pub struct Simulator {
    config: SimulationConfig,
    clock: EventClock,
    network: NetworkGraph,
    backlog: RepairBacklog,

    rng: StdRng,
    attack_interval: Uniform<SimTime>,
    fix_interval: Uniform<SimTime>,

    // at most one rebuild may be pending
    rebuild_in_flight: bool,
    // ExecuteFix events scheduled but not yet processed
    fixes_in_flight: usize,
    completed_attacks: usize,
    started: bool,

    stats: SimStats,
    trace: EventTrace,
}

impl Simulator {
    /// Generate the network from the config and prepare a run
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let network = NetworkGraph::generate(config.num_nodes, config.seed, &config.network)?;
        Self::with_network(config, network)
    }

    /// Run over a prepared network; `config.num_nodes` is taken from it
    pub fn with_network(
        mut config: SimulationConfig,
        network: NetworkGraph,
    ) -> Result<Self, SimError> {
        config.num_nodes = network.num_nodes();
        config.validate()?;

        let (attack_lo, attack_hi) = config.attack_interval;
        let (fix_lo, fix_hi) = config.fix_interval;

        Ok(Self {
            clock: EventClock::new(),
            backlog: RepairBacklog::new(network.num_nodes()),
            network,
            rng: StdRng::seed_from_u64(config.seed),
            attack_interval: Uniform::new_inclusive(attack_lo, attack_hi),
            fix_interval: Uniform::new_inclusive(fix_lo, fix_hi),
            rebuild_in_flight: false,
            fixes_in_flight: 0,
            completed_attacks: 0,
            started: false,
            stats: SimStats::default(),
            trace: EventTrace::new(config.record_trace),
            config,
        })
    }

    pub fn network(&self) -> &NetworkGraph {
        &self.network
    }

    pub fn backlog(&self) -> &RepairBacklog {
        &self.backlog
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn completed_attacks(&self) -> usize {
        self.completed_attacks
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Main simulation loop
    pub fn run(mut self) -> Result<SimulationResult, SimError> {
        info!(
            "starting simulation: {} attackers, {} defenders, {} nodes, seed {}",
            self.config.num_attackers,
            self.config.num_defenders,
            self.config.num_nodes,
            self.config.seed
        );

        while self.completed_attacks < self.config.attack_limit {
            self.step()?;
        }

        info!(
            "attacks finished at t={} after {} events",
            self.clock.now(),
            self.stats.events_processed
        );
        Ok(self.into_result())
    }

    /// Fetch the next event and process it
    pub fn step(&mut self) -> Result<ProcessedEvent, SimError> {
        if !self.started {
            self.start()?;
        }

        let (time, event) = self.clock.fetch()?;
        let subject = self.process(event)?;

        let processed = ProcessedEvent {
            time,
            action: event.action,
            target: event.target.or(subject),
        };
        debug!("{}", processed);
        self.stats.record(event.action);
        self.trace.record(processed);
        Ok(processed)
    }

    fn start(&mut self) -> Result<(), SimError> {
        self.started = true;
        for _ in 0..self.config.num_attackers {
            self.schedule_deploy_attack()?;
        }
        for _ in 0..self.config.num_defenders {
            self.schedule_deploy_fix()?;
        }
        Ok(())
    }

    /// Returns the node the event acted on when the event itself named none
    fn process(&mut self, event: Event) -> Result<Option<NodeId>, SimError> {
        match event.action {
            Action::DeployAttack => self.process_deploy_attack(),
            Action::ExecuteAttack => {
                let target = event.target.ok_or(SimError::MissingTarget(event.action))?;
                self.process_execute_attack(target)
            }
            Action::DeployFix => self.process_deploy_fix(),
            Action::ExecuteFix => self.process_execute_fix(),
            Action::DeployRebuild => self.process_deploy_rebuild(),
            Action::ExecuteRebuild => self.process_execute_rebuild(),
        }
    }

    // ------------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------------

    fn schedule_deploy_attack(&mut self) -> Result<(), SimError> {
        self.clock.schedule_after(0, Event::new(Action::DeployAttack))
    }

    fn schedule_deploy_fix(&mut self) -> Result<(), SimError> {
        self.clock.schedule_after(0, Event::new(Action::DeployFix))
    }

    /// Deploy a rebuild now unless one is already on its way
    fn request_rebuild(&mut self) -> Result<(), SimError> {
        if self.rebuild_in_flight {
            trace!("rebuild already pending at t={}", self.clock.now());
            return Ok(());
        }
        self.rebuild_in_flight = true;
        self.clock.schedule_after(0, Event::new(Action::DeployRebuild))
    }

    // ------------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------------

    fn process_deploy_attack(&mut self) -> Result<Option<NodeId>, SimError> {
        let target = self.rng.gen_range(0..self.network.num_nodes());
        let delay = self.attack_interval.sample(&mut self.rng);
        self.clock
            .schedule_after(delay, Event::targeting(Action::ExecuteAttack, target))?;
        Ok(Some(target))
    }

    fn process_execute_attack(&mut self, target: NodeId) -> Result<Option<NodeId>, SimError> {
        let former_neighbors = self.network.mark_attacked(target)?;

        for node in std::iter::once(target).chain(former_neighbors) {
            if !self.backlog.contains(node) {
                self.backlog.push(node)?;
            }
        }

        if self.network.is_partitioned() {
            self.stats.partitions_detected += 1;
            self.request_rebuild()?;
        }

        self.schedule_deploy_attack()?;
        self.completed_attacks += 1;

        if self.completed_attacks % PROGRESS_EVERY == 0 {
            info!(
                "{} attacks at t={}: {} eligible nodes, backlog {}",
                self.completed_attacks,
                self.clock.now(),
                self.network.eligible_count(),
                self.backlog.len()
            );
        }
        Ok(None)
    }

    fn process_deploy_fix(&mut self) -> Result<Option<NodeId>, SimError> {
        let delay = self.fix_interval.sample(&mut self.rng);

        // only commit to a repair the backlog can actually supply
        if self.backlog.len() > self.fixes_in_flight {
            self.fixes_in_flight += 1;
            self.clock.schedule_after(delay, Event::new(Action::ExecuteFix))?;
        } else {
            trace!("defender idle at t={}", self.clock.now());
            self.stats.idle_patrols += 1;
            self.clock.schedule_after(delay, Event::new(Action::DeployFix))?;
        }
        Ok(None)
    }

    fn process_execute_fix(&mut self) -> Result<Option<NodeId>, SimError> {
        self.fixes_in_flight = self.fixes_in_flight.saturating_sub(1);

        let node = self.backlog.pop()?;
        self.network.mark_fixed(node)?;
        self.request_rebuild()?;
        self.schedule_deploy_fix()?;
        Ok(Some(node))
    }

    fn process_deploy_rebuild(&mut self) -> Result<Option<NodeId>, SimError> {
        self.clock
            .schedule_after(self.config.rebuild_delay, Event::new(Action::ExecuteRebuild))?;
        Ok(None)
    }

    fn process_execute_rebuild(&mut self) -> Result<Option<NodeId>, SimError> {
        self.network.rebuild_structure();
        self.rebuild_in_flight = false;
        Ok(None)
    }

    fn into_result(self) -> SimulationResult {
        let mut stats = self.stats;
        stats.peak_backlog = self.backlog.peak();

        SimulationResult {
            seed: self.config.seed,
            num_nodes: self.network.num_nodes(),
            completed_attacks: self.completed_attacks,
            final_time: self.clock.now(),
            stats,
            final_structure: self.network.structure().clone(),
            final_structure_cost: self.network.structure_cost(),
            eligible_nodes: self.network.eligible_count(),
            backlog_remaining: self.backlog.len(),
            trace_digest: self.trace.digest(),
            trace: self.trace.into_events(),
        }
    }
}
