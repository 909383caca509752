// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! zxview entry point
//!
//! Runs the presentation pipeline headless against the built-in demo engine,
//! logging telemetry once per second. Useful for checking frame pacing and
//! audio backpressure on a machine without opening a window.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use zxview::core::demo::DemoEmulator;
use zxview::frontend::audio::{AudioDevice, NullAudioDevice};
use zxview::frontend::file_picker::FixedFilePicker;
use zxview::frontend::input::{KeyMapping, DEFAULT_INPUT_CONFIG};
use zxview::frontend::telemetry::TelemetrySnapshot;
use zxview::frontend::{PipelineConfig, PipelineController, PipelineParts, PixelFormat};

#[derive(Parser, Debug)]
#[command(name = "zxview", version, about = "ZX Spectrum presentation pipeline runner")]
struct Args {
    /// Pipeline configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Key binding file (TOML)
    #[arg(long, default_value = DEFAULT_INPUT_CONFIG)]
    input_config: PathBuf,

    /// Program image to load after start-up
    #[arg(short, long)]
    program: Option<PathBuf>,

    /// How long to run, in seconds
    #[arg(short, long, default_value_t = 5)]
    seconds: u64,

    /// Pacing delay override
    #[arg(short, long)]
    delay: Option<u32>,

    /// Surface pixel format override (rgba8888, bgra8888)
    #[arg(long)]
    pixel_format: Option<PixelFormat>,

    /// Discard audio instead of opening an output device
    #[arg(long)]
    no_audio: bool,

    /// Print final telemetry as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    telemetry: TelemetrySnapshot,
    frames_drawn: u64,
    program: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Config: {}", path.display());
            PipelineConfig::load(path)?
        }
        None => PipelineConfig::default(),
    };
    config.apply_env()?;
    if let Some(delay) = args.delay {
        config.delay = delay;
    }
    if let Some(format) = args.pixel_format {
        config.surface.format = format;
    }
    config.validate()?;

    let (audio_device, sample_rate) = open_audio(&config, args.no_audio);
    let emulator = Arc::new(DemoEmulator::with_dimensions(
        config.surface.width,
        config.surface.height,
        sample_rate,
    ));

    let parts = PipelineParts::new(emulator, audio_device)
        .with_key_mapping(KeyMapping::with_config_path(&args.input_config))
        .with_file_picker(Box::new(FixedFilePicker::new(args.program.clone())))
        .with_invalidate(Box::new(|| log::trace!("Repaint requested")));

    let pipeline = PipelineController::start(&config, parts)?;

    if args.program.is_some() {
        // A failed load is logged and the demo keeps running
        let _ = pollster::block_on(pipeline.load());
    }

    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    while Instant::now() < deadline {
        let remaining = deadline.saturating_duration_since(Instant::now());
        std::thread::sleep(remaining.min(Duration::from_secs(1)));
        let telemetry = pipeline.telemetry();
        log::info!(
            "{} {} (repaints: {})",
            telemetry.fps_text().unwrap_or_else(|| "FPS:----".to_string()),
            telemetry
                .lost_sound_frames_text()
                .unwrap_or_else(|| "SND:---".to_string()),
            pipeline.surface().repaint_count()
        );
    }

    pipeline.stop();

    if args.json {
        let report = Report {
            telemetry: pipeline.telemetry().snapshot(),
            frames_drawn: pipeline.surface().repaint_count(),
            program: args.program,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Open the configured output device, falling back to discarding audio
fn open_audio(config: &PipelineConfig, disabled: bool) -> (Arc<dyn AudioDevice>, u32) {
    if disabled {
        return (Arc::new(NullAudioDevice), config.audio.sample_rate);
    }

    #[cfg(feature = "audio")]
    {
        use zxview::frontend::audio::CpalAudioDevice;

        match CpalAudioDevice::open(config.audio.channels, config.audio.queue_limit) {
            Ok(device) => {
                let rate = device.sample_rate();
                return (Arc::new(device), rate);
            }
            Err(e) => log::warn!("Audio disabled: {}", e),
        }
    }

    (Arc::new(NullAudioDevice), config.audio.sample_rate)
}
