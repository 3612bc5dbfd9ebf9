//! Setup and initialization functions for CLI
//!
//! Thread pool sizing and logging setup, run once at startup.

use tracing_subscriber::EnvFilter;

/// Configure rayon global thread pool once at startup
pub fn configure_thread_pool(jobs: usize) {
    let workers = get_worker_count(jobs);
    let builder = rayon::ThreadPoolBuilder::new().num_threads(workers);

    match builder.build_global() {
        Ok(()) => log::info!("Using {} worker threads", workers),
        // Already configured
        Err(e) => log::debug!("Thread pool already configured: {}", e),
    }
}

/// Get the number of worker threads to use
pub fn get_worker_count(jobs: usize) -> usize {
    if jobs == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    } else {
        jobs
    }
}

/// Default filter directive for a `-v` count.
pub fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "pulsemap=warn",
        1 => "pulsemap=info",
        2 => "pulsemap=debug",
        _ => "pulsemap=trace",
    }
}

/// Install a stderr `tracing` subscriber. `RUST_LOG` wins over `-v`.
///
/// `log` records from library modules are forwarded to the same subscriber.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbosity)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(e) = result {
        eprintln!("Note: logging already initialized: {}", e);
    }
}
