//! Headless timing of serial vs parallel candidate evaluation

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use massing_growth::{EvaluationMode, GrowthError, LayerStack, Scenario};

/// Grow a whole stack; returns (milliseconds, total cells)
fn time_run(
    scenario: &Scenario,
    mode: EvaluationMode,
    seed: u64,
) -> Result<(f64, usize), GrowthError> {
    let mut stack = LayerStack::new(scenario.clone().into_setup()?)?.with_mode(mode);
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();
    stack.run(&mut rng, &mut ());
    Ok((start.elapsed().as_secs_f64() * 1000.0, stack.total_cells()))
}

fn main() -> Result<(), GrowthError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Massing Growth Benchmark ===\n");

    let layer_counts = [1, 4, 8, 12];
    let seeds = [1, 2, 3];

    println!(
        "{:>8} {:>12} {:>12} {:>10} {:>8}",
        "Layers", "Serial", "Parallel", "Speedup", "Cells"
    );
    println!("{:-<56}", "");

    for layers in layer_counts {
        let scenario = Scenario {
            layer_count: Value::from(layers),
            ..Scenario::demo()
        };
        let mut serial_ms = 0.0;
        let mut parallel_ms = 0.0;
        let mut cells = 0;
        for seed in seeds {
            let (s_ms, s_cells) = time_run(&scenario, EvaluationMode::Serial, seed)?;
            let (p_ms, p_cells) = time_run(&scenario, EvaluationMode::Parallel, seed)?;
            if s_cells != p_cells {
                eprintln!("seed {seed}: serial grew {s_cells} cells, parallel {p_cells}");
            }
            serial_ms += s_ms;
            parallel_ms += p_ms;
            cells += s_cells;
        }
        let runs = seeds.len() as f64;
        let (serial_ms, parallel_ms) = (serial_ms / runs, parallel_ms / runs);
        let speedup = if parallel_ms > 0.0 { serial_ms / parallel_ms } else { 0.0 };
        println!(
            "{:>8} {:>10.1}ms {:>10.1}ms {:>9.2}x {:>8}",
            layers,
            serial_ms,
            parallel_ms,
            speedup,
            cells / seeds.len()
        );
    }

    println!("\n=== Threads ===");
    println!("rayon pool: {} threads", rayon::current_num_threads());
    Ok(())
}
