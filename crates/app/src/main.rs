mod config;
mod pattern;
mod transform;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use relay::{Pipeline, ProcessingBridge};

use config::RelayConfig;
use pattern::TestPattern;
use transform::{Grayscale, Identity, SobelEdges};

#[derive(Parser, Debug)]
#[command(about = "Relay synthetic camera frames through a transform onto a GPU quad.")]
struct Args {
    /// Path to a JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capture tick interval in milliseconds (overrides the config).
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Source frame size as WxH (overrides the config).
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Which transform to inject into the processing bridge.
    #[arg(long, value_enum, default_value_t = TransformKind::Edges)]
    transform: TransformKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TransformKind {
    Identity,
    Grayscale,
    Edges,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RelayConfig::read_from_file(path)
            .with_context(|| format!("Failed to read config from `{}`.", path.display()))?,
        None => RelayConfig::default(),
    };
    if let Some(interval_ms) = args.interval_ms {
        config.interval_ms = interval_ms;
    }
    if let Some((width, height)) = args.size {
        config.width = width;
        config.height = height;
    }

    log::info!(
        "Relaying {}x{} frames every {}ms through the {:?} transform.",
        config.width,
        config.height,
        config.interval_ms,
        args.transform
    );

    // The bridge boxes the capability internally, so each arm yields
    // the same type.
    let bridge = match args.transform {
        TransformKind::Identity => ProcessingBridge::new(Identity),
        TransformKind::Grayscale => ProcessingBridge::new(Grayscale),
        TransformKind::Edges => ProcessingBridge::new(SobelEdges::default()),
    };

    let pipeline = Pipeline::new(
        TestPattern::new(config.width, config.height),
        bridge,
        Duration::from_millis(config.interval_ms),
    );

    engine::run(pipeline)
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("`{s}` is not a WxH size"))?;

    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("`{part}` is not a positive integer"))
    };

    Ok((parse(w)?, parse(h)?))
}
