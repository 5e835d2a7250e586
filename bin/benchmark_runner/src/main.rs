use common::{
    load_config, HistoryBuffer, InputEvent, Point2D, Simulation, SimulationConfig, TickRecord,
};
use criterion::{black_box, Criterion};
use std::env;

fn analyze_results_detailed(results: &[TickRecord], name: &str) {
    if results.is_empty() {
        println!("{}: No results to analyze", name);
        return;
    }

    let total = results.len();
    let lateness_us: Vec<f64> = results
        .iter()
        .map(|r| r.lateness_ns as f64 / 1000.0)
        .collect();
    let avg_late = lateness_us.iter().sum::<f64>() / total as f64;
    let max_late = lateness_us.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

    let speeds: Vec<f64> = results
        .iter()
        .map(|r| (r.force_x * r.force_x + r.force_y * r.force_y).sqrt())
        .collect();
    let max_speed = speeds.iter().fold(0.0f64, |a, &b| a.max(b));

    let relocations = results
        .windows(2)
        .filter(|w| (w[0].target_x, w[0].target_y) != (w[1].target_x, w[1].target_y))
        .count();

    let last = &results[total - 1];
    let distance = ((last.target_x - last.x).powi(2) + (last.target_y - last.y).powi(2)).sqrt();

    println!("\n=== {} Detailed Analysis ===", name);
    println!("Total ticks: {}", total);
    println!("Wake-up lateness (μs): avg={:.2}, max={:.2}", avg_late, max_late);
    println!("Max speed: {:.3} px/tick", max_speed);
    println!("Target relocations: {}", relocations);
    println!(
        "Final position: ({:.2}, {:.2}), {:.2} px from target",
        last.x, last.y, distance
    );
}

fn benchmark_controller(c: &mut Criterion, config: &SimulationConfig) {
    let sim = match Simulation::new(config.clone()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let controller = sim.controller().clone();
    let mut history = HistoryBuffer::new(config.agent.memory_len);
    for i in 0..config.agent.memory_len {
        history.push(Point2D::new(i as f64 * 0.5, i as f64 * 0.25));
    }
    let target = config.target;
    let position = config.agent.initial_position;

    c.bench_function("pid_compute_full_history", |b| {
        b.iter(|| controller.compute(black_box(target), black_box(position), black_box(&history)));
    });
}

fn benchmark_frame(c: &mut Criterion, config: &SimulationConfig) {
    let mut sim = match Simulation::new(config.clone()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let no_events: [InputEvent; 0] = [];
    c.bench_function("simulation_frame", |b| {
        b.iter(|| black_box(sim.frame(black_box(&no_events))));
    });
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: benchmark_runner <config_file> [threaded|async|both] [--criterion]");
        eprintln!("Example: benchmark_runner configs/scenario_baseline.toml both");
        eprintln!("Example: benchmark_runner configs/scenario_baseline.toml both --criterion");
        std::process::exit(1);
    }

    let config_path = &args[1];
    let mode = args.get(2).map(|s| s.as_str()).unwrap_or("both");
    let use_criterion = args.iter().any(|a| a == "--criterion");

    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    if use_criterion {
        config.run.enable_logging = false;
    }

    println!("========================================");
    println!("PID Drone Simulation Benchmark");
    println!("========================================");
    println!("Config: {}", config_path);
    println!("Frame: {}x{}", config.frame.width, config.frame.height);
    println!(
        "Gains: kp={} ki={} kd={}",
        config.gains.kp, config.gains.ki, config.gains.kd
    );
    println!("Tick rate: {} Hz", config.tick_rate_hz);
    println!("Memory length: {}", config.agent.memory_len);
    match config.run.max_ticks {
        Some(max) => println!("Tick limit: {}", max),
        None => println!("Tick limit: none (script must quit)"),
    }
    println!("========================================\n");

    if use_criterion {
        let mut criterion = Criterion::default()
            .sample_size(50)
            .measurement_time(std::time::Duration::from_secs(5));

        println!("Running controller benchmarks...");
        benchmark_controller(&mut criterion, &config);
        benchmark_frame(&mut criterion, &config);
        criterion.final_summary();

        println!("\n========================================");
        println!("Criterion statistical analysis complete!");
        println!("Check the target/criterion directory for detailed HTML reports.");
        println!("========================================");
        return;
    }

    if mode == "threaded" || mode == "both" {
        println!("Running THREADED simulation...");
        let start = std::time::Instant::now();
        match threaded_impl::run_experiment(config.clone()) {
            Ok(recorder) => {
                println!("Threaded run completed in {:.2} seconds", start.elapsed().as_secs_f64());
                analyze_results_detailed(&recorder.get_results(), "THREADED");
                match recorder.save_to_csv("threaded_trajectory.csv") {
                    Ok(_) => println!("Trajectory saved to threaded_trajectory.csv"),
                    Err(e) => eprintln!("Failed to save threaded CSV: {}", e),
                }
            }
            Err(e) => eprintln!("Threaded run failed: {}", e),
        }
    }

    if mode == "async" || mode == "both" {
        println!("\nRunning ASYNC simulation...");
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("Failed to start tokio runtime: {}", e);
                std::process::exit(1);
            }
        };
        let start = std::time::Instant::now();
        match rt.block_on(async_impl::run_experiment(config.clone())) {
            Ok(recorder) => {
                println!("Async run completed in {:.2} seconds", start.elapsed().as_secs_f64());
                analyze_results_detailed(&recorder.get_results(), "ASYNC");
                match recorder.save_to_csv("async_trajectory.csv") {
                    Ok(_) => println!("Trajectory saved to async_trajectory.csv"),
                    Err(e) => eprintln!("Failed to save async CSV: {}", e),
                }
            }
            Err(e) => eprintln!("Async run failed: {}", e),
        }
    }

    println!("\n========================================");
    println!("Benchmark complete!");
    println!("========================================");
}
