mod menu;

use common::{load_config, SimResult, SimulationConfig, TickRecord};

const DEFAULT_CONFIG: &str = "configs/scenario_baseline.toml";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("===========================================");
    println!("Welcome to the PID Drone Simulator");
    println!("===========================================");

    loop {
        menu::show_menu();

        match menu::get_user_choice() {
            Some(1) => report(run_threaded_demo()),
            Some(2) => report(run_async_demo()),
            Some(3) => report(export_trajectory()),
            Some(4) => launch_visualiser(),
            Some(5) | None => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please select 1-5."),
        }
    }
}

fn report(result: SimResult<()>) {
    if let Err(e) = result {
        log::error!("{}", e);
    }
    menu::wait_for_enter();
}

fn demo_config() -> SimResult<SimulationConfig> {
    let mut config = load_config(DEFAULT_CONFIG)?;
    config.run.enable_logging = true;

    println!(
        "Configuration: {}x{} frame, gains kp={} ki={} kd={}, {} Hz, {} scripted events",
        config.frame.width,
        config.frame.height,
        config.gains.kp,
        config.gains.ki,
        config.gains.kd,
        config.tick_rate_hz,
        config.run.script.len()
    );
    Ok(config)
}

fn run_threaded_demo() -> SimResult<()> {
    println!("\n=== Running Threaded Scenario ===");
    let config = demo_config()?;
    let recorder = threaded_impl::run_experiment(config)?;
    display_results(&recorder.get_results(), recorder.late_frames());
    Ok(())
}

fn run_async_demo() -> SimResult<()> {
    println!("\n=== Running Async Scenario ===");
    let config = demo_config()?;
    let rt = tokio::runtime::Runtime::new()?;
    let recorder = rt.block_on(async_impl::run_experiment(config))?;
    display_results(&recorder.get_results(), recorder.late_frames());
    Ok(())
}

fn export_trajectory() -> SimResult<()> {
    println!("\n=== Export Trajectory ===");
    let config_path = menu::prompt("Config file", DEFAULT_CONFIG);
    let output = menu::prompt("Output CSV", "trajectory.csv");

    let mut config = load_config(&config_path)?;
    config.run.enable_logging = false;

    let recorder = threaded_impl::run_experiment(config)?;
    let rows = recorder.save_to_csv(&output)?;
    println!("Wrote {} ticks to {}", rows, output);
    Ok(())
}

fn launch_visualiser() {
    println!("\n=== Launching Visualiser ===");
    println!("Note: Close the window (or press Esc) to return to menu");

    // The window needs its own event loop on the main thread of its process.
    match std::process::Command::new("cargo")
        .args(["run", "--release", "--bin", "visualiser", DEFAULT_CONFIG])
        .status()
    {
        Ok(status) if status.success() => {
            println!("Visualiser closed.");
        }
        Ok(status) => {
            println!("Visualiser exited with status: {}", status);
        }
        Err(e) => {
            println!("Failed to launch visualiser: {}", e);
            println!("Make sure the visualiser binary is available.");
        }
    }

    menu::wait_for_enter();
}

fn display_results(results: &[TickRecord], late_frames: usize) {
    if results.is_empty() {
        println!("No results to display.");
        return;
    }

    let first = &results[0];
    let last = &results[results.len() - 1];
    let relocations = results
        .windows(2)
        .filter(|w| (w[0].target_x, w[0].target_y) != (w[1].target_x, w[1].target_y))
        .count();

    println!("\n=== Scenario Results ===");
    println!("Total Ticks: {}", results.len());
    println!("Late Frames: {}", late_frames);
    println!("Start: ({:.2}, {:.2})", first.x, first.y);
    println!("End: ({:.2}, {:.2}) force ({:.3}, {:.3})", last.x, last.y, last.force_x, last.force_y);
    println!("Target: ({:.2}, {:.2}) after {} relocations", last.target_x, last.target_y, relocations);
    println!("History Length: {}", last.history_len);
}
