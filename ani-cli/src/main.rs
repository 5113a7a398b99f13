//! Analog Input Multiplexer CLI
//!
//! Loads a device description, builds the multiplexer on a simulated board
//! driven through GPIO selector lines and a real settle delay, then performs
//! the requested reads and prints the board counters.

mod request;
mod settings;

use std::path::PathBuf;

use ani_hal::{GpioSelector, Quantity, StdDelay};
use ani_mux::MuxDeviceBuilder;
use ani_sim::{SimBoard, SimClock};
use anyhow::{Context, Result};
use clap::Parser;

use request::ReadRequest;
use settings::Settings;

/// Read multiplexed analog inputs on a simulated board
#[derive(Parser, Debug)]
#[command(name = "animux")]
#[command(about = "Read multiplexed analog input channels", long_about = None)]
#[command(version)]
struct Args {
    /// Device description (default: $XDG_CONFIG_HOME/animux/device.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read to perform, raw:N or scale:N (can be repeated)
    #[arg(short, long, value_name = "QUANTITY:CHANNEL")]
    read: Vec<ReadRequest>,

    /// Number of passes over the read list
    #[arg(long, default_value_t = 1)]
    repeat: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "animux=info,ani_mux=info,ani_sim=info".into()),
        )
        .init();

    tracing::info!("Starting animux {}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load(args.config.as_deref()).context("failed to load device")?;
    let lines = settings.line_count()?;

    let board = SimBoard::from_config(settings.board_config(), SimClock::wall());
    let selector = GpioSelector::new(board.pins(lines)).context("failed to set up selector")?;
    let device = MuxDeviceBuilder::new(settings.device.clone())
        .selector(selector)
        .parent(board.parent())
        .delay(StdDelay)
        .build()
        .context("failed to build mux device")?;

    // Without explicit reads, sample every channel once
    let reads = if args.read.is_empty() {
        device
            .channels()
            .iter()
            .map(|d| ReadRequest {
                quantity: Quantity::Raw,
                channel: d.index,
            })
            .collect()
    } else {
        args.read
    };

    for _ in 0..args.repeat {
        for request in &reads {
            let sample = device
                .read(request.channel, request.quantity)
                .with_context(|| format!("{} failed", request))?;
            println!("{} {}", request, sample);
        }
    }

    let stats = board.stats();
    println!(
        "switches={} line-writes={} raw-reads={} scale-reads={} stale-samples={}",
        stats.switches,
        stats.line_writes,
        stats.raw_reads,
        stats.scale_reads,
        stats.stale_samples
    );

    Ok(())
}
