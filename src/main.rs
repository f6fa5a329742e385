//! Squash Ball entry point
//!
//! Sets up logging and hands control to the platform loop.

use std::process::ExitCode;

use squash_ball::Settings;

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filter) => {
            builder.parse_filters(&filter);
        }
        Err(_) => {
            builder
                .filter_level(log::LevelFilter::Info)
                // wgpu is chatty at info
                .filter_module("wgpu_core", log::LevelFilter::Warn)
                .filter_module("wgpu_hal", log::LevelFilter::Warn)
                .filter_module("naga", log::LevelFilter::Warn);
        }
    }
    builder.init();
}

fn main() -> ExitCode {
    init_logging();
    log::info!("Squash Ball starting...");

    match squash_ball::platform::run(Settings::default()) {
        Ok(()) => {
            log::info!("Squash Ball exited cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}
