//! multiloadd - system load sampler daemon.
//!
//! Activates a set of providers, samples them on a fixed interval and logs
//! each published frame, or prints it as one JSON object per line.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use multiload::caption::CaptionComponent;
use multiload::collector::{RealFs, ShellRunner};
use multiload::config::{DaemonConfig, GraphConfig};
use multiload::fmt::{FmtStyle, format_bytes};
use multiload::provider::{ProviderConfig, registry};
use multiload::sampler::{Frame, Sampler};

/// Footprint summary is logged every this many ticks.
const STATS_EVERY: u64 = 60;

/// System load sampler daemon.
#[derive(Parser)]
#[command(name = "multiloadd", about = "System load sampler daemon", version)]
struct Args {
    /// Sampling interval in milliseconds. Overrides the config file.
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Samples kept per series. Overrides the config file.
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Comma-separated providers to activate (e.g. "cpu,net,mem").
    /// Replaces the graphs of the config file. Default is every provider.
    #[arg(short, long, value_delimiter = ',')]
    providers: Option<Vec<String>>,

    /// JSON config file with interval, capacity and per-graph settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print every frame as a JSON line on stdout instead of logging captions.
    #[arg(long)]
    json: bool,

    /// List available providers with their settings and exit.
    #[arg(long)]
    list_providers: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["multiloadd", "multiload"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_providers() {
    for descriptor in registry::registry() {
        println!("{:<6} {}", descriptor.name, descriptor.description);
        let mut config = ProviderConfig::new();
        if (descriptor.init)(&mut config).is_err() {
            continue;
        }
        for entry in config.entries() {
            println!(
                "         {} = {:?}  ({})",
                entry.key,
                entry.value.to_persisted(),
                entry.help
            );
        }
    }
}

/// Resolves the effective configuration from the optional file and CLI overrides.
fn resolve_config(args: &Args) -> Result<DaemonConfig, multiload::config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => DaemonConfig::load(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(interval_ms) = args.interval_ms {
        config.interval_ms = interval_ms;
    }
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if let Some(providers) = &args.providers {
        config.graphs = providers
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(GraphConfig::new)
            .collect();
    }
    if config.graphs.is_empty() {
        config.graphs = registry::names().map(GraphConfig::new).collect();
    }
    config.validate()?;
    Ok(config)
}

/// Logs the latest caption of every graph.
fn log_frame(frame: &Frame) {
    for graph in &frame.graphs {
        if graph.paused {
            continue;
        }
        match &graph.error {
            Some(e) => warn!("{}: {} ({:?})", graph.label, e.message, e.severity),
            None => {
                let body = graph.caption.get(CaptionComponent::Body).replace('\n', "; ");
                info!("{}: {}", graph.caption.get(CaptionComponent::Title), body);
                debug!(
                    "{}: {} (ceiling {})",
                    graph.label,
                    graph.caption.get(CaptionComponent::Footer),
                    graph.ceiling
                );
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.list_providers {
        print_providers();
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose, args.quiet);

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("multiloadd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}ms, capacity={}, graphs={}",
        config.interval_ms,
        config.capacity,
        config.graphs.len()
    );

    let sampler = match Sampler::spawn(
        config.sampler_options(),
        Arc::new(RealFs::new()),
        Arc::new(ShellRunner),
    ) {
        Ok(sampler) => sampler,
        Err(e) => {
            error!("Failed to start sampler: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut active = 0;
    for graph in &config.graphs {
        match sampler.activate(&graph.provider, &graph.settings_list()) {
            Ok(id) => {
                active += 1;
                info!("Graph {}: {}", id, graph.provider);
            }
            Err(e) => warn!("Graph '{}' not activated: {}", graph.provider, e),
        }
    }
    if active == 0 {
        error!("No graph could be activated");
        return ExitCode::FAILURE;
    }

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    let notifier = sampler.notifier();
    let wake = notifier.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
        wake.signal();
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting sampling loop");

    let mut last_tick = 0;
    while running.load(Ordering::SeqCst) {
        notifier.wait();
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let frame = sampler.latest();
        if frame.tick == last_tick {
            continue;
        }
        last_tick = frame.tick;

        if args.json {
            match serde_json::to_string(frame.as_ref()) {
                Ok(line) => println!("{}", line),
                Err(e) => error!("Failed to serialize frame {}: {}", frame.tick, e),
            }
        } else {
            log_frame(&frame);
        }

        if frame.tick.is_multiple_of(STATS_EVERY) {
            let footprint: usize = frame.graphs.iter().map(|g| g.footprint).sum();
            info!(
                "Memory stats: {} graphs, footprint {}",
                frame.graphs.len(),
                format_bytes(footprint as u64, FmtStyle::Detail)
            );
        }
    }

    info!("Shutting down...");
    sampler.shutdown();
    info!("multiloadd stopped");
    ExitCode::SUCCESS
}
