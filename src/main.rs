use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use rust_handfusion::alignment::GateOutcome;
use rust_handfusion::config::FusionConfig;
use rust_handfusion::device::{DeviceHub, DeviceId, PoseSink};
use rust_handfusion::io::{RecordedDevice, Recording};
use rust_handfusion::system::FusionSystem;

const USAGE: &str = "usage: handfusion-replay <config.yaml | -> <reference.csv> <device.csv> [device.csv ...]";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_handfusion=info,handfusion_replay=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        bail!("{USAGE}");
    }

    let config = match args[0].as_str() {
        "-" => FusionConfig::default(),
        path => FusionConfig::load(path)?,
    };

    let mut devices = Vec::with_capacity(args.len() - 1);
    for (i, path) in args[1..].iter().enumerate() {
        let recording = Recording::load(path)?;
        println!("{}: {} frames from {}", DeviceId(i as u32), recording.len(), path);
        devices.push(RecordedDevice::new(DeviceId(i as u32), recording));
    }

    let mut hub = DeviceHub::new();
    let ids = devices.iter().map(|d| d.id()).collect();
    let mut system = FusionSystem::new(config, ids).context("Failed to build fusion system")?;

    let mut ticks = 0usize;
    let mut solves = 0usize;
    let mut fused_hands = 0usize;
    loop {
        let mut published = false;
        for device in &mut devices {
            published |= device.publish_next(&mut hub);
        }
        if !published {
            break;
        }

        let result = system.tick(&mut hub)?;
        ticks += 1;
        fused_hands += result.frame.hands().len();

        for report in &result.alignment {
            match &report.outcome {
                GateOutcome::Realigned { max_distance, .. } => {
                    solves += 1;
                    info!(device = %report.device, max_distance, "Realigned");
                }
                GateOutcome::Converged { max_distance } => {
                    info!(device = %report.device, max_distance, "Aligned");
                }
                GateOutcome::Skipped(_) => {}
            }
        }
    }

    if ticks == 0 {
        warn!("Recordings contained no frames");
    }

    println!("Replayed {ticks} ticks, {solves} solves, {fused_hands} fused hands");
    for aligner in system.aligners() {
        let pose = hub.device_world_transform(aligner.target());
        let (angle, shift) = pose.magnitude();
        println!(
            "{} -> {}: aligned={} rotation={:.2} deg translation={:.3}",
            aligner.target(),
            aligner.source(),
            aligner.registration().aligned,
            angle.to_degrees(),
            shift
        );
    }
    Ok(())
}
