//! Color Follower - Main Entry Point

use std::io::BufRead;
use std::process::ExitCode;

use clap::Parser;
use follower::{exit_status, init_logging, run_session, Cli, FollowerConfig, StopSignal};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config_path();
    let mut config = match FollowerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    config.motors.dry_run |= cli.dry_run;

    init_logging(&config.logging);
    info!("=== Color Follower v{} ===", env!("CARGO_PKG_VERSION"));

    let signal = StopSignal::new();
    spawn_exit_listeners(&signal);

    let result = match tokio::task::spawn_blocking(move || run_session(&config, &signal)).await {
        Ok(result) => result,
        Err(e) => Err(anyhow::Error::new(e).context("Control thread failed")),
    };
    ExitCode::from(exit_status(&result))
}

/// Ctrl-C interrupts; a `q` line on stdin requests a quit
fn spawn_exit_listeners(signal: &StopSignal) {
    let interrupt = signal.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Program stopped by user");
                interrupt.interrupt();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    // Plain thread: a blocked stdin read must not hold up runtime shutdown
    let quit = signal.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().eq_ignore_ascii_case("q") => {
                    info!("Quit requested");
                    quit.request_quit();
                    return;
                }
                Ok(_) => {}
                Err(_) => return,
            }
        }
    });
}
