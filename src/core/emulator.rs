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

//! Emulation engine contract
//!
//! The presentation pipeline never looks inside the engine. It drives it
//! through [`Emulator`] and receives its output through [`EmulatorEvents`],
//! which the pipeline passes into [`Emulator::run`]. Each notification has
//! exactly one consumer.

use crate::core::cancel::CancellationToken;
use crate::core::error::Result;
use crate::core::frame::{AudioBuffer, Frame};
use crate::core::keys::SpectrumKey;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

/// Default pacing delay
pub const DEFAULT_DELAY: u32 = 10;

/// Receiver of engine output
///
/// Called on the emulation thread. Implementations must not block.
pub trait EmulatorEvents {
    /// A frame finished rendering
    fn on_frame(&mut self, frame: Frame);

    /// An audio quantum is ready (zero or more per frame)
    fn on_audio(&mut self, buffer: AudioBuffer);
}

/// Emulation engine driven by the pipeline
///
/// All methods take `&self`: `run` executes on the emulation thread while the
/// UI thread calls the others concurrently. Engines synchronize their own
/// state.
pub trait Emulator: Send + Sync {
    /// Run until `cancel` is signaled
    ///
    /// The engine reads `pacing` every tick to throttle itself and reports
    /// frames and audio through `events`.
    fn run(
        &self,
        pacing: &PacingDelay,
        cancel: &CancellationToken,
        events: &mut dyn EmulatorEvents,
    );

    fn key_down(&self, key: SpectrumKey);

    fn key_up(&self, key: SpectrumKey);

    /// Replace the running program
    ///
    /// On error the previous program keeps running.
    fn load(&self, path: &Path) -> Result<()>;

    /// Emit a diagnostic snapshot (fire-and-forget)
    fn dump(&self);
}

/// Emission-rate throttle shared between the UI and the emulation loop
///
/// Written by the UI, read once per emulation tick. Plain relaxed atomic:
/// the next tick picks up the latest value.
#[derive(Debug)]
pub struct PacingDelay(AtomicU32);

impl PacingDelay {
    pub fn new(delay: u32) -> Self {
        Self(AtomicU32::new(delay))
    }

    #[inline]
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, delay: u32) {
        self.0.store(delay, Ordering::Relaxed);
    }
}

impl Default for PacingDelay {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}
