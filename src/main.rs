use std::env;
use std::process;

use log::{error, LevelFilter};
use simple_logger::SimpleLogger;

use siege::sg_report::render_structure;
use siege::{SimError, SimulationConfig, Simulator, USAGE};

fn main() {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).env().init() {
        eprintln!("logger init failed: {}", e);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let config = match SimulationConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        error!("simulation aborted: {}", e);
        process::exit(1);
    }
}

fn run(config: SimulationConfig) -> Result<(), SimError> {
    println!("STARTING SIMULATION");

    let result = Simulator::new(config)?.run()?;

    println!("ATTACK FINISHED");
    result.print_summary();

    println!("\nFinal structure:");
    print!("{}", render_structure(&result.final_structure));
    Ok(())
}
