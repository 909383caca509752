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

//! Error types for the presentation pipeline
//!
//! Every fallible operation in this crate returns [`Result<T>`], an alias for
//! `Result<T, PipelineError>`. Cancellation is not part of this
//! enum, see [`crate::core::cancel::Cancelled`].

use crate::frontend::surface::PixelFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The render surface uses a pixel layout the blitter cannot produce
    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(PixelFormat),

    /// A frame was constructed with inconsistent dimensions or palette indices
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// The destination surface cannot hold the frame being drawn
    #[error("Surface too small: frame is {frame_width}x{frame_height}, surface is {surface_width}x{surface_height}")]
    SurfaceTooSmall {
        frame_width: usize,
        frame_height: usize,
        surface_width: usize,
        surface_height: usize,
    },

    /// An audio buffer was pushed after the queue was closed
    #[error("Audio queue is closed")]
    QueueClosed,

    /// The emulator rejected a program image
    #[error("Failed to load program {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio device error: {0}")]
    Audio(String),

    /// A worker thread could not be started
    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
