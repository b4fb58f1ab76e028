// Scenario Runner - run siege scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/default.yaml
//   cargo run --bin scenario_runner scenarios/          (every .yaml/.yml in the directory)
//   cargo run --bin scenario_runner scenarios/ --seed 42

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;

use siege::{Scenario, SimError, Simulator};

fn main() {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Warn).env().init() {
        eprintln!("logger init failed: {}", e);
    }

    let args: Vec<String> = env::args().collect();
    let (path, seed) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: scenario_runner <scenario.yaml | directory/> [--seed N]");
            process::exit(1);
        }
    };

    let outcome = if path.is_dir() {
        scenario_files(&path).and_then(|files| run_all(&files, seed))
    } else {
        run_scenario(&path, seed)
    };

    if let Err(e) = outcome {
        error!("{}", e);
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<(PathBuf, Option<u64>), SimError> {
    match args {
        [_, path] => Ok((PathBuf::from(path), None)),
        [_, path, flag, raw] if flag == "--seed" => {
            let seed = raw.parse().map_err(|_| {
                SimError::InvalidArgument(format!("seed '{}' is not an unsigned integer", raw))
            })?;
            Ok((PathBuf::from(path), Some(seed)))
        }
        _ => Err(SimError::InvalidArgument(
            "expected a scenario path and an optional --seed".to_string(),
        )),
    }
}

/// Scenario files in `dir`, sorted by name
fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>, SimError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        SimError::InvalidArgument(format!("cannot list {}: {}", dir.display(), e))
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(SimError::InvalidArgument(format!(
            "no scenario files in {}",
            dir.display()
        )));
    }
    Ok(files)
}

fn run_all(files: &[PathBuf], seed: Option<u64>) -> Result<(), SimError> {
    println!("Running {} scenario(s)", files.len());
    for (i, path) in files.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, files.len(), path.display());
        run_scenario(path, seed)?;
    }
    println!("\nAll scenarios complete.");
    Ok(())
}

fn run_scenario(path: &Path, seed: Option<u64>) -> Result<(), SimError> {
    let scenario = Scenario::load(path)?;

    println!("\n=== {} ===", scenario.display_name(path));
    if let Some(ref desc) = scenario.meta.description {
        println!("{}", desc);
    }
    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis: {}", hypothesis);
    }

    let mut config = scenario.config;
    if let Some(seed) = seed {
        config.seed = seed;
    }

    info!(
        "{} attackers, {} defenders, {} nodes, limit {}, seed {}",
        config.num_attackers,
        config.num_defenders,
        config.num_nodes,
        config.attack_limit,
        config.seed
    );

    let result = Simulator::new(config)?.run()?;
    result.print_summary();
    Ok(())
}
