use std::io::{self, BufRead, Write};

pub fn show_menu() {
    println!("\n===========================================");
    println!("PID Drone Simulator");
    println!("===========================================");
    println!("Select an option:");
    println!("1. Threaded Scenario Demo");
    println!("2. Async Scenario Demo");
    println!("3. Export Trajectory (CSV)");
    println!("4. Interactive Visualiser");
    println!("5. Exit");
    println!("===========================================");
    print!("Choice (1-5): ");
    let _ = io::stdout().flush();
}

/// `None` on unreadable input or end of stdin.
pub fn get_user_choice() -> Option<u32> {
    let line = read_line()?;
    line.trim().parse::<u32>().ok()
}

pub fn prompt(message: &str, default: &str) -> String {
    print!("{} [{}]: ", message, default);
    let _ = io::stdout().flush();
    match read_line() {
        Some(line) if !line.trim().is_empty() => line.trim().to_string(),
        _ => default.to_string(),
    }
}

pub fn wait_for_enter() {
    println!("\nPress Enter to return to menu...");
    let _ = read_line();
}

fn read_line() -> Option<String> {
    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input),
    }
}
