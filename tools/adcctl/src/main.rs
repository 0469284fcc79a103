//! adcctl - inspect and sample ADC devices from the command line
//!
//! Runs against the host board: the SwiftIO preset by default, or the JSON
//! board description given with `--config` or `SWIFTHAL_ADC_CONFIG`.

mod report;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hal::registry::AdcRegistry;
use hal_host::BoardConfig;

use report::{DeviceReport, Formatter, SampleReport};

#[derive(Parser, Debug)]
#[command(name = "adcctl")]
#[command(about = "List, inspect and sample ADC devices", long_about = None)]
#[command(version)]
struct Args {
    /// JSON board description (defaults to $SWIFTHAL_ADC_CONFIG, then the SwiftIO preset)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print one JSON object per line
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the number of ADC devices
    Count,
    /// Show characteristics of one device, or all of them
    Info {
        /// Device id
        id: Option<usize>,
    },
    /// Take blocking samples from one device
    Read {
        /// Device id
        id: usize,
        /// Number of samples
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Delay between samples, in milliseconds
        #[arg(short, long, default_value_t = 0)]
        interval_ms: u64,
        /// Print volts instead of raw codes
        #[arg(long)]
        volts: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let registry = bring_up(args.config.as_ref())?;

    match args.command {
        Command::Count => {
            println!("{}", registry.device_count());
            Ok(())
        }
        Command::Info { id } => info(registry, id, &Formatter::new(args.json, false)),
        Command::Read {
            id,
            count,
            interval_ms,
            volts,
        } => read(
            registry,
            id,
            count,
            Duration::from_millis(interval_ms),
            &Formatter::new(args.json, volts),
        ),
    }
}

fn bring_up(config: Option<&PathBuf>) -> Result<&'static AdcRegistry> {
    match config {
        Some(path) => {
            let board = BoardConfig::from_path(path)?;
            hal_host::install(&board).context("failed to install board")
        }
        None => hal_host::install_from_env().context("failed to install board"),
    }
}

fn info(registry: &AdcRegistry, id: Option<usize>, formatter: &Formatter) -> Result<()> {
    let ids = match id {
        Some(id) => id..id.saturating_add(1),
        None => 0..registry.device_count(),
    };

    for id in ids {
        let handle = registry
            .open(id)
            .with_context(|| format!("failed to open adc{id}"))?;
        let info = registry.info(&handle);
        registry
            .close(handle)
            .with_context(|| format!("failed to close adc{id}"))?;

        let info = info.with_context(|| format!("failed to query adc{id}"))?;
        println!("{}", formatter.device(&DeviceReport { id, info }));
    }
    Ok(())
}

fn read(
    registry: &AdcRegistry,
    id: usize,
    count: usize,
    interval: Duration,
    formatter: &Formatter,
) -> Result<()> {
    let handle = registry
        .open(id)
        .with_context(|| format!("failed to open adc{id}"))?;

    let mut failures = 0;
    let info = registry.info(&handle);
    if let Ok(info) = &info {
        for index in 0..count {
            if index > 0 && !interval.is_zero() {
                thread::sleep(interval);
            }

            match registry.read(&handle) {
                Ok(raw) => {
                    let sample = SampleReport::new(id, index, raw, info);
                    println!("{}", formatter.sample(&sample));
                }
                Err(err) => {
                    log::warn!("adc{id} sample {index}: {err}");
                    failures += 1;
                }
            }
        }
    }

    registry
        .close(handle)
        .with_context(|| format!("failed to close adc{id}"))?;
    info.with_context(|| format!("failed to query adc{id}"))?;

    if count > 0 && failures == count {
        bail!("all {count} conversions on adc{id} failed");
    }
    Ok(())
}
