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

//! zxview: real-time presentation pipeline for a ZX Spectrum emulator front-end
//!
//! The emulation engine, the display renderer and the audio renderer each run
//! at their own pace on their own thread. Frames travel through a latest-wins
//! mailbox, audio through an unbounded queue, and all three threads share one
//! cancellation signal.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`core`]: Engine-facing types (frames, audio buffers, keys, the emulator contract)
//! - [`frontend`]: The presentation pipeline and its host collaborators
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zxview::core::demo::DemoEmulator;
//! use zxview::frontend::audio::NullAudioDevice;
//! use zxview::frontend::{PipelineConfig, PipelineController, PipelineParts};
//!
//! let emulator = Arc::new(DemoEmulator::new(44_100));
//! let parts = PipelineParts::new(emulator, Arc::new(NullAudioDevice));
//! let pipeline = PipelineController::start(&PipelineConfig::default(), parts)?;
//! // ... run the host event loop ...
//! pipeline.stop();
//! # Ok::<(), zxview::PipelineError>(())
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`core::error::Result<T>`] which is an alias for
//! `Result<T, PipelineError>`. Cancellation is reported separately through
//! [`core::cancel::Cancelled`] because it is how worker loops end normally.

pub mod core;
pub mod frontend;

// Re-export commonly used types
pub use core::error::{PipelineError, Result};
