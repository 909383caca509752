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

//! Presentation pipeline
//!
//! Decouples a running emulator from display and audio output. The emulator,
//! the drawer and the audio player each run on their own thread; the
//! emulator never waits for either consumer.
//!
//! # Architecture
//!
//! - [`mailbox`]: latest-wins single-slot frame handoff
//! - [`audio_queue`]: closable unbounded FIFO of audio buffers
//! - [`blitter`]: indexed frame to packed RGBA/BGRA pixels
//! - [`telemetry`]: FPS and lost audio buffer sampling
//! - [`pipeline`]: thread ownership, wiring and start/stop
//!
//! Host collaborators: [`surface`], [`audio`], [`input`], [`file_picker`],
//! configured through [`config`].

pub mod audio;
pub mod audio_queue;
pub mod blitter;
pub mod config;
pub mod file_picker;
pub mod input;
pub mod mailbox;
pub mod pipeline;
pub mod surface;
pub mod telemetry;

pub use config::PipelineConfig;
pub use pipeline::{PipelineController, PipelineParts, PipelineState};
pub use surface::{FrameSurface, PixelFormat};
