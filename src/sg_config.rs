//! Configuration for a siege simulation run

use std::fs;
use std::path::Path;

use crate::sg_graph::NetworkConfig;
use crate::sg_interface::{SimError, SimTime};

pub const USAGE: &str = "Usage: simulate <num_attackers> <num_defenders> <num_nodes> <seed>";

/// Largest accepted interval bound or rebuild delay
pub const MAX_DELAY: SimTime = 1_000_000_000;

/// Main configuration for a simulation run
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Attackers working in parallel, each with its own deploy/execute cycle
    pub num_attackers: usize,

    /// Defenders draining the repair backlog
    pub num_defenders: usize,

    /// Hosts in the network
    pub num_nodes: usize,

    /// Seeds both network generation and the event stream
    pub seed: u64,

    /// The run stops after this many executed attacks
    pub attack_limit: usize,

    /// Inclusive range for the delay between deploying and executing an attack
    pub attack_interval: (SimTime, SimTime),

    /// Inclusive range for the time a defender spends on one repair
    pub fix_interval: (SimTime, SimTime),

    /// Delay between deploying and executing a structure rebuild
    pub rebuild_delay: SimTime,

    /// Keep every processed event in the result (the digest is always computed)
    pub record_trace: bool,

    /// Network generation parameters
    pub network: NetworkConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_attackers: 1,
            num_defenders: 1,
            num_nodes: 10,
            seed: 0,
            attack_limit: 2000,
            attack_interval: (100, 1000),
            fix_interval: (1000, 2000),
            rebuild_delay: 20,
            record_trace: true,
            network: NetworkConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse `<num_attackers> <num_defenders> <num_nodes> <seed>` (program name excluded)
    pub fn from_args(args: &[String]) -> Result<Self, SimError> {
        if args.len() != 4 {
            return Err(SimError::InvalidArgument(format!(
                "expected 4 arguments, got {}",
                args.len()
            )));
        }

        let config = Self {
            num_attackers: parse_count("num_attackers", &args[0])?,
            num_defenders: parse_count("num_defenders", &args[1])?,
            num_nodes: parse_count("num_nodes", &args[2])?,
            seed: args[3].trim().parse().map_err(|_| {
                SimError::InvalidArgument(format!("seed '{}' is not an unsigned integer", args[3]))
            })?,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a bare config block from YAML; missing keys keep their defaults,
    /// unknown keys are rejected. Scenario files go through [`Scenario`].
    pub fn from_yaml(yaml: &str) -> Result<Self, SimError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| SimError::InvalidArgument(format!("bad scenario: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_attackers == 0 {
            return Err(SimError::InvalidArgument(
                "at least one attacker is required".to_string(),
            ));
        }
        if self.num_nodes < 2 {
            return Err(SimError::InvalidArgument(format!(
                "a network needs at least 2 nodes, got {}",
                self.num_nodes
            )));
        }
        if self.attack_limit == 0 {
            return Err(SimError::InvalidArgument(
                "attack_limit must be positive".to_string(),
            ));
        }
        check_interval("attack_interval", self.attack_interval)?;
        check_interval("fix_interval", self.fix_interval)?;
        if !(0..=MAX_DELAY).contains(&self.rebuild_delay) {
            return Err(SimError::InvalidArgument(format!(
                "rebuild_delay {} must be within 0..={}",
                self.rebuild_delay, MAX_DELAY
            )));
        }
        self.network.validate()
    }
}

fn parse_count(name: &str, raw: &str) -> Result<usize, SimError> {
    raw.trim().parse().map_err(|_| {
        SimError::InvalidArgument(format!("{} '{}' is not a non-negative integer", name, raw))
    })
}

fn check_interval(name: &str, (lo, hi): (SimTime, SimTime)) -> Result<(), SimError> {
    // a zero-length interval would let an idle defender spin at one instant
    if lo < 1 || lo > hi || hi > MAX_DELAY {
        return Err(SimError::InvalidArgument(format!(
            "{} ({}, {}) must be positive, ordered and at most {}",
            name, lo, hi, MAX_DELAY
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hypothesis: Option<String>,
}

/// A scenario file: an optional `meta` block and a required `config` block
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub meta: ScenarioMeta,
    pub config: SimulationConfig,
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> Result<Self, SimError> {
        let scenario: Self = serde_yaml::from_str(yaml)
            .map_err(|e| SimError::InvalidArgument(format!("bad scenario: {}", e)))?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let yaml = fs::read_to_string(path).map_err(|e| {
            SimError::InvalidArgument(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&yaml)
    }

    /// `meta.name`, or the file stem when the scenario has none
    pub fn display_name(&self, path: &Path) -> String {
        match (&self.meta.name, path.file_stem()) {
            (Some(name), _) => name.clone(),
            (None, Some(stem)) => stem.to_string_lossy().into_owned(),
            (None, None) => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_args_parses_counts() {
        let config = SimulationConfig::from_args(&args(&["3", "2", "25", "1234"])).unwrap();

        assert_eq!(config.num_attackers, 3);
        assert_eq!(config.num_defenders, 2);
        assert_eq!(config.num_nodes, 25);
        assert_eq!(config.seed, 1234);
        assert_eq!(config.attack_limit, 2000);
    }

    #[test]
    fn test_from_args_wrong_count() {
        assert!(matches!(
            SimulationConfig::from_args(&args(&["1", "1", "5"])),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(matches!(
            SimulationConfig::from_args(&args(&["1", "1", "5", "0", "extra"])),
            Err(SimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_args_rejects_non_integers() {
        for bad in [
            ["x", "1", "5", "0"],
            ["1", "1.5", "5", "0"],
            ["1", "1", "-5", "0"],
            ["1", "1", "5", "seed"],
        ] {
            assert!(
                matches!(
                    SimulationConfig::from_args(&args(&bad)),
                    Err(SimError::InvalidArgument(_))
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_from_args_rejects_unusable_values() {
        // no attackers: the run could never end
        assert!(SimulationConfig::from_args(&args(&["0", "1", "5", "0"])).is_err());
        assert!(SimulationConfig::from_args(&args(&["1", "1", "1", "0"])).is_err());
        // defenders may be absent
        assert!(SimulationConfig::from_args(&args(&["1", "0", "5", "0"])).is_ok());
    }

    #[test]
    fn test_from_yaml_keeps_defaults() {
        let yaml = "
num_attackers: 2
num_nodes: 8
seed: 77
attack_limit: 50
fix_interval: [300, 400]
network:
  cost_range: [-20, 40]
";
        let config = SimulationConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.num_attackers, 2);
        assert_eq!(config.num_defenders, 1);
        assert_eq!(config.num_nodes, 8);
        assert_eq!(config.attack_limit, 50);
        assert_eq!(config.fix_interval, (300, 400));
        assert_eq!(config.attack_interval, (100, 1000));
        assert_eq!(config.network.cost_range, (-20, 40));
        assert_eq!(config.network.patch_cost_range, (1, 100));
    }

    #[test]
    fn test_from_yaml_rejects_unknown_keys() {
        assert!(matches!(
            SimulationConfig::from_yaml("num_nodez: 40\n"),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(SimulationConfig::from_yaml("network:\n  cost_rang: [1, 2]\n").is_err());
    }

    #[test]
    fn test_bundled_scenario_loads_its_config_block() {
        let yaml = include_str!("../scenarios/dense_network.yaml");
        let scenario = Scenario::from_yaml(yaml).unwrap();

        assert_eq!(scenario.config.num_nodes, 40);
        assert_eq!(scenario.config.num_defenders, 3);
        assert_eq!(scenario.config.fix_interval, (200, 400));
        assert_eq!(scenario.config.network.cost_range, (-20, 100));
        assert!(scenario.meta.name.is_some());

        // the wrapper is not a bare config
        assert!(SimulationConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_scenario_requires_config_block() {
        assert!(Scenario::from_yaml("meta:\n  name: empty\n").is_err());
        assert!(Scenario::from_yaml("config:\n  seed: 3\nextra: 1\n").is_err());

        let scenario = Scenario::from_yaml("config:\n  seed: 3\n").unwrap();
        assert_eq!(scenario.meta, ScenarioMeta::default());
        assert_eq!(scenario.config.seed, 3);
        assert_eq!(scenario.display_name(Path::new("scenarios/plain.yaml")), "plain");
    }

    #[test]
    fn test_delays_are_capped() {
        let too_long = SimulationConfig {
            attack_interval: (100, MAX_DELAY + 1),
            ..SimulationConfig::default()
        };
        assert!(too_long.validate().is_err());

        let slow_rebuild = SimulationConfig {
            rebuild_delay: MAX_DELAY + 1,
            ..SimulationConfig::default()
        };
        assert!(slow_rebuild.validate().is_err());

        let at_cap = SimulationConfig {
            fix_interval: (MAX_DELAY, MAX_DELAY),
            rebuild_delay: MAX_DELAY,
            ..SimulationConfig::default()
        };
        assert!(at_cap.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_rejects_inverted_interval() {
        let yaml = "attack_interval: [50, 10]\n";
        assert!(matches!(
            SimulationConfig::from_yaml(yaml),
            Err(SimError::InvalidArgument(_))
        ));
    }
}
