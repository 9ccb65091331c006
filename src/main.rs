// Thermo Monitor entry point
// Wires config → logging → pipeline and runs until Ctrl-C

use tokio::sync::watch;
use tracing::{error, info, warn};

use thermo_monitor::core::{setup_logging, MonitorConfig};
use thermo_monitor::layer1::UniformGenerator;
use thermo_monitor::Monitor;

#[tokio::main]
async fn main() {
    let config = MonitorConfig::default();
    setup_logging(&config.monitoring);

    match config.summary_json() {
        Ok(summary) => info!(config = %summary, "Starting thermo monitor"),
        Err(e) => warn!(error = %e, "Could not render config summary"),
    }

    let generator = Box::new(UniformGenerator::new(&config.sensor));
    let mut monitor = match Monitor::build(&config, generator) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            let _ = shutdown_tx.send(true);
        }
    });

    let sensor_stats = monitor.run(shutdown_rx).await;

    let chain_stats = monitor.chain.lock().get_stats();
    let log_stats = monitor.log.get_stats();
    info!(
        readings = sensor_stats.readings_emitted,
        completed = chain_stats.readings_completed,
        halted = chain_stats.readings_halted,
        notifications = chain_stats.total_notifications,
        faults = log_stats.faults,
        "Thermo monitor stopped"
    );
}
