// Network generator - print a random cost matrix and its spanning structure
//
// Usage:
//   cargo run --bin generate 12
//   cargo run --bin generate 12 7   (fixed seed)

use std::env;

use log::info;
use simple_logger::SimpleLogger;

use siege::sg_report::render_network;
use siege::{NetworkConfig, NetworkGraph};

fn main() {
    if let Err(e) = SimpleLogger::new().env().init() {
        eprintln!("logger init failed: {}", e);
    }

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <num_nodes> [<seed>]", args[0]);
        std::process::exit(1);
    }

    let num_nodes: usize = args[1].parse().unwrap_or_else(|e| {
        eprintln!("Invalid node count {}: {}", args[1], e);
        std::process::exit(1);
    });

    let seed: u64 = match args.get(2) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            eprintln!("Invalid seed {}: {}", raw, e);
            std::process::exit(1);
        }),
        None => rand::random(),
    };

    info!("generating {} nodes with seed {}", num_nodes, seed);

    match NetworkGraph::generate(num_nodes, seed, &NetworkConfig::default()) {
        Ok(graph) => {
            println!("Seed: {}\n", seed);
            print!("{}", render_network(&graph));
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
