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

//! Built-in demo engine
//!
//! A stand-in [`Emulator`] that produces moving color bars and a square-wave
//! tone on two channels. It exercises the whole presentation pipeline without
//! a real machine behind it and makes no attempt at hardware accuracy.
//!
//! - Holding Space mutes the tone.
//! - Loading a file uses its bytes to seed the bar pattern.
//! - Dump logs the current state.

use crate::core::cancel::CancellationToken;
use crate::core::emulator::{Emulator, EmulatorEvents, PacingDelay};
use crate::core::error::{PipelineError, Result};
use crate::core::frame::{
    AudioBuffer, ChannelId, Frame, SCREEN_HEIGHT, SCREEN_WIDTH, SPECTRUM_PALETTE,
};
use crate::core::keys::SpectrumKey;
use crossbeam_channel::RecvTimeoutError;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Frames per second of the emulated display
const FRAME_RATE: u32 = 50;

/// Beeper channel
pub const BEEPER_CHANNEL: ChannelId = 0;

/// Secondary tone channel
pub const AY_CHANNEL: ChannelId = 1;

/// Border width around the paper area, in pixels
const BORDER: usize = 48;

/// Converts wall-clock time into a sample count
///
/// The total owed is computed from the start instant, so fractional samples
/// carry over between ticks instead of being lost or duplicated.
#[derive(Debug, Clone)]
struct SampleClock {
    sample_rate: u32,
    start: Instant,
    emitted: u64,
}

impl SampleClock {
    fn new(sample_rate: u32, start: Instant) -> Self {
        Self {
            sample_rate,
            start,
            emitted: 0,
        }
    }

    /// Samples owed per channel for the time elapsed up to `now`
    fn due(&mut self, now: Instant) -> usize {
        let elapsed = now.saturating_duration_since(self.start).as_nanos();
        let total = (elapsed * self.sample_rate as u128 / 1_000_000_000) as u64;
        let due = total.saturating_sub(self.emitted);
        self.emitted = self.emitted.max(total);
        due as usize
    }
}

#[derive(Debug, Default)]
struct DemoState {
    seed: u8,
    program: Option<PathBuf>,
    pressed: HashSet<SpectrumKey>,
    frames: u64,
}

/// Demo engine producing synthetic video and audio
pub struct DemoEmulator {
    width: usize,
    height: usize,
    sample_rate: u32,
    state: Mutex<DemoState>,
}

impl DemoEmulator {
    /// Create a demo engine with the full Spectrum screen size
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Output sample rate used to size audio buffers
    pub fn new(sample_rate: u32) -> Self {
        Self::with_dimensions(SCREEN_WIDTH, SCREEN_HEIGHT, sample_rate)
    }

    /// Create a demo engine producing frames of the given size
    pub fn with_dimensions(width: usize, height: usize, sample_rate: u32) -> Self {
        Self {
            width,
            height,
            sample_rate,
            state: Mutex::new(DemoState::default()),
        }
    }

    /// Number of frames produced so far
    pub fn frames_produced(&self) -> u64 {
        self.state.lock().frames
    }

    /// Whether `key` is currently held
    pub fn is_pressed(&self, key: SpectrumKey) -> bool {
        self.state.lock().pressed.contains(&key)
    }

    /// Path of the last successfully loaded program
    pub fn program(&self) -> Option<PathBuf> {
        self.state.lock().program.clone()
    }

    fn render(&self, sequence: u64, seed: u8) -> Result<Frame> {
        let bar_width = (self.width / 8).max(1);
        let scroll = (sequence / 4) as usize;
        let border_color = (sequence / FRAME_RATE as u64 % 8) as u8;

        let mut pixels = vec![0u8; self.width * self.height];
        for (y, row) in pixels.chunks_mut(self.width.max(1)).enumerate() {
            let in_paper_rows = y >= BORDER && y + BORDER < self.height;
            for (x, pixel) in row.iter_mut().enumerate() {
                let in_paper = in_paper_rows && x >= BORDER && x + BORDER < self.width;
                *pixel = if in_paper {
                    // Bright bars
                    8 + ((x / bar_width + scroll + seed as usize) % 8) as u8
                } else {
                    border_color
                };
            }
        }

        Frame::new(sequence, SPECTRUM_PALETTE, self.width, self.height, pixels)
    }

    fn tone(
        &self,
        channel: ChannelId,
        frequency: u32,
        amplitude: i16,
        count: usize,
        phase: &mut u32,
    ) -> AudioBuffer {
        let half_period = (self.sample_rate / frequency.max(1) / 2).max(1);

        let samples: Vec<i16> = (0..count)
            .map(|_| {
                let high = (*phase / half_period) % 2 == 0;
                *phase = phase.wrapping_add(1);
                if high {
                    amplitude
                } else {
                    -amplitude
                }
            })
            .collect();

        AudioBuffer::new(channel, samples)
    }
}

impl Emulator for DemoEmulator {
    fn run(
        &self,
        pacing: &PacingDelay,
        cancel: &CancellationToken,
        events: &mut dyn EmulatorEvents,
    ) {
        log::info!(
            "Demo engine running ({}x{}, {} Hz)",
            self.width,
            self.height,
            self.sample_rate
        );

        let mut sequence = 0u64;
        let mut clock = SampleClock::new(self.sample_rate, Instant::now());
        let mut beeper_phase = 0u32;
        let mut ay_phase = 0u32;

        while !cancel.is_cancelled() {
            sequence += 1;

            let (seed, muted) = {
                let mut state = self.state.lock();
                state.frames = sequence;
                (state.seed, state.pressed.contains(&SpectrumKey::Space))
            };

            match self.render(sequence, seed) {
                Ok(frame) => events.on_frame(frame),
                Err(e) => log::error!("Demo frame {} rejected: {}", sequence, e),
            }

            // Audio follows wall-clock time, whatever the tick rate
            let count = clock.due(Instant::now());
            if count > 0 {
                let amplitude = if muted { 0 } else { 4096 };
                let beeper = self.tone(BEEPER_CHANNEL, 440, amplitude, count, &mut beeper_phase);
                let ay = self.tone(AY_CHANNEL, 220, amplitude / 2, count, &mut ay_phase);
                events.on_audio(beeper);
                events.on_audio(ay);
            }

            let delay = pacing.get();
            if delay > 0 {
                // Sleep that wakes up early on cancellation
                match cancel
                    .signal()
                    .recv_timeout(Duration::from_millis(delay as u64))
                {
                    Err(RecvTimeoutError::Timeout) | Ok(()) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        }

        log::info!("Demo engine stopped after {} frames", sequence);
    }

    fn key_down(&self, key: SpectrumKey) {
        log::trace!("Key down: {:?}", key);
        self.state.lock().pressed.insert(key);
    }

    fn key_up(&self, key: SpectrumKey) {
        log::trace!("Key up: {:?}", key);
        self.state.lock().pressed.remove(&key);
    }

    fn load(&self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).map_err(|source| PipelineError::LoadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        if bytes.is_empty() {
            return Err(PipelineError::LoadFailed {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "empty program image"),
            });
        }

        let seed = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)) % 8;

        let mut state = self.state.lock();
        state.seed = seed;
        state.program = Some(path.to_path_buf());
        log::info!("Loaded {} ({} bytes, seed {})", path.display(), bytes.len(), seed);
        Ok(())
    }

    fn dump(&self) {
        let state = self.state.lock();
        log::info!(
            "Demo dump: frames={} seed={} program={:?} pressed={:?}",
            state.frames,
            state.seed,
            state.program,
            state.pressed
        );
    }
}
