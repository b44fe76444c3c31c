// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use mtclink::config::Config;
use mtclink::media;
use mtclink::midi::{print_ports, MidirSink, SinkAdapter};
use mtclink::mtc::{self, QuarterFrameGenerator};
use mtclink::offsets::OffsetTable;
use mtclink::transport::{SharedTimeline, TransportTracker};

fn print_usage() {
    println!("mtclink - MIDI Time Code from the system media session");
    println!();
    println!("Usage: mtclink [CONFIG] [OPTIONS]");
    println!();
    println!("Arguments:");
    println!("  CONFIG                  Path to the JSON config file (default: config.json)");
    println!();
    println!("Options:");
    println!("  --list-midi             List available MIDI output ports");
    println!("  --help                  Show this help message");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--list-midi") => {
            print_ports()?;
            return Ok(());
        }
        Some("--help") | Some("-h") => {
            print_usage();
            return Ok(());
        }
        _ => {}
    }

    let config_path = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&config_path)?;
    info!(
        "Loaded {} with {} configured songs, frame rate {:?}",
        config_path,
        config.songs.len(),
        config.frame_rate
    );

    let sink = MidirSink::connect_with_selection(config.midi_device.as_deref())?;

    let timeline = SharedTimeline::new();
    let offsets = Arc::new(OffsetTable::from_config(&config));
    let tracker = TransportTracker::new(timeline.clone(), offsets);
    let generator = QuarterFrameGenerator::new(config.frame_rate);

    let (sample_tx, sample_rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let emitter = tokio::spawn(mtc::generator::run(
        generator,
        timeline,
        SinkAdapter::new(sink),
        shutdown_rx.clone(),
    ));
    let tracking = tokio::spawn(tracker.run(sample_rx, shutdown_rx));

    tokio::select! {
        result = media::run_media_listener(sample_tx) => {
            if let Err(err) = result {
                warn!("Media listener stopped: {}", err);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    // Stop both periodic activities before dropping the MIDI connection
    let _ = shutdown_tx.send(true);
    let _ = emitter.await;
    let _ = tracking.await;

    Ok(())
}
