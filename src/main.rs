//! FreqZone Analyzer CLI
//!
//! Batch analysis of band-trigger CSV logs, plus a live OSC monitor.

use clap::{Parser, Subcommand};
use freqzone_analyzer::{
    config::Config,
    core::Aggregate,
    log::read_log,
    receiver::{Monitor, ENERGY_ADDR, TRIGGER_ADDR},
    render::{chatter_recovery_chart, rate_chart, write_chart, Producer},
    VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "freqzone-analyze")]
#[command(version = VERSION)]
#[command(about = "Analyze FreqZone band-trigger logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bin trigger logs into rate, chatter and recovery chart data
    Analyze {
        /// CSV logs (t_ms,condition,mode,band,...)
        #[arg(required = true)]
        logs: Vec<PathBuf>,

        /// Bin width in milliseconds (default 1000, config file overridable)
        #[arg(long)]
        bin_ms: Option<u32>,

        /// Where to write the chart documents (default current directory)
        #[arg(long, short)]
        outdir: Option<PathBuf>,
    },

    /// Listen for live /bandTrigger and /bandEnergy messages
    Listen {
        /// UDP port (default 9000, config file overridable)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            logs,
            bin_ms,
            outdir,
        } => cmd_analyze(&logs, bin_ms, outdir),
        Commands::Listen { port } => cmd_listen(port),
        Commands::Config => cmd_config(),
    }
}

fn cmd_analyze(logs: &[PathBuf], bin_ms: Option<u32>, outdir: Option<PathBuf>) {
    let config = Config::load().unwrap_or_default();
    let bin_ms = bin_ms.unwrap_or(config.bin_ms);
    let outdir = outdir.unwrap_or_else(|| config.output_dir.clone());

    if bin_ms == 0 {
        eprintln!("Error: --bin-ms must be positive");
        std::process::exit(1);
    }

    let mut aggregate = Aggregate::new();
    for path in logs {
        // Bad rows inside a log are tolerated; an unreadable file is not.
        let log = match read_log(path) {
            Ok(log) => log,
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                std::process::exit(1);
            }
        };
        println!(
            "Read {}: {} events, {} markers, {} conditions",
            path.display(),
            log.events().len(),
            log.markers().len(),
            log.conditions().len()
        );
        aggregate.add_log(&log);
    }

    if let Err(e) = std::fs::create_dir_all(&outdir) {
        eprintln!("Error creating {}: {e}", outdir.display());
        std::process::exit(1);
    }

    let run_id = Uuid::new_v4();
    let charts = [
        (
            "rates.json",
            serde_json::to_value(rate_chart(
                &aggregate.events_by_condition,
                bin_ms,
                Producer::new(run_id),
            )),
        ),
        (
            "rates_by_band.json",
            serde_json::to_value(rate_chart(
                &aggregate.events_by_band,
                bin_ms,
                Producer::new(run_id),
            )),
        ),
        (
            "chatter.json",
            serde_json::to_value(chatter_recovery_chart(
                &aggregate.chatter_by_condition,
                &aggregate.recovery_by_condition,
                Producer::new(run_id),
            )),
        ),
        (
            "chatter_by_band.json",
            serde_json::to_value(chatter_recovery_chart(
                &aggregate.chatter_by_band,
                &aggregate.recovery_by_band,
                Producer::new(run_id),
            )),
        ),
    ];

    for (name, chart) in charts {
        let chart = match chart {
            Ok(chart) => chart,
            Err(e) => {
                eprintln!("Error serializing {name}: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = write_chart(&chart, &outdir.join(name)) {
            eprintln!("Error writing {name}: {e}");
            std::process::exit(1);
        }
    }

    println!(
        "Wrote rates(.json/_by_band) and chatter(.json/_by_band) to {}",
        outdir
            .canonicalize()
            .unwrap_or_else(|_| outdir.clone())
            .display()
    );
}

fn cmd_listen(port: Option<u16>) {
    let config = Config::load().unwrap_or_default();
    let port = port.unwrap_or(config.listen_port);

    let mut monitor = match Monitor::bind(port) {
        Ok(monitor) => monitor,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = monitor.start() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    println!("Listening on UDP {port} for {TRIGGER_ADDR} and {ENERGY_ADDR} ...");
    println!("Press Ctrl+C to stop");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let receiver = monitor.receiver().clone();
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(msg) => println!("{msg}"),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    println!();
    println!("Stopping monitor...");
    monitor.stop();
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
