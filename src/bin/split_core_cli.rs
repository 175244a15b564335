use std::process;

use split_core::{cli::run_cli, config::ConfigManager, init_with_filter};

fn main() {
    let filter = ConfigManager::new()
        .and_then(|manager| manager.load())
        .map(|config| config.log_filter)
        .ok();
    init_with_filter(filter.as_deref());

    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
