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

//! Pipeline configuration
//!
//! Loaded from TOML; every field has a default so a partial file (or none at
//! all) is valid. Environment variables override the file:
//!
//! | Variable                   | Field              |
//! |----------------------------|--------------------|
//! | `ZXVIEW_DELAY`             | `delay`            |
//! | `ZXVIEW_PIXEL_FORMAT`      | `surface.format`   |
//! | `ZXVIEW_FRAME_TIMEOUT_MS`  | `frame_timeout_ms` |

use crate::core::emulator::DEFAULT_DELAY;
use crate::core::error::{PipelineError, Result};
use crate::core::frame::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::frontend::audio::DEFAULT_QUEUE_LIMIT;
use crate::frontend::mailbox::DEFAULT_TAKE_TIMEOUT;
use crate::frontend::surface::PixelFormat;
use crate::frontend::telemetry::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DELAY: &str = "ZXVIEW_DELAY";
pub const ENV_PIXEL_FORMAT: &str = "ZXVIEW_PIXEL_FORMAT";
pub const ENV_FRAME_TIMEOUT_MS: &str = "ZXVIEW_FRAME_TIMEOUT_MS";

/// Render surface settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            format: PixelFormat::Rgba8888,
        }
    }
}

/// Audio output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Requested sample rate (the device may negotiate another)
    pub sample_rate: u32,
    /// Logical channels mixed by the device
    pub channels: usize,
    /// Per-channel backlog, in samples, before buffers are dropped
    pub queue_limit: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            queue_limit: DEFAULT_QUEUE_LIMIT,
        }
    }
}

/// Top-level pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on a single drawer wait, in milliseconds
    pub frame_timeout_ms: u64,
    /// Ticks per telemetry sample
    pub telemetry_window: u32,
    /// Initial pacing delay handed to the engine
    pub delay: u32,
    pub surface: SurfaceConfig,
    pub audio: AudioConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_timeout_ms: DEFAULT_TAKE_TIMEOUT.as_millis() as u64,
            telemetry_window: DEFAULT_WINDOW,
            delay: DEFAULT_DELAY,
            surface: SurfaceConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| {
                PipelineError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_DELAY) {
            self.delay = parse_var(ENV_DELAY, &value)?;
        }
        if let Some(value) = lookup(ENV_PIXEL_FORMAT) {
            self.surface.format = parse_var(ENV_PIXEL_FORMAT, &value)?;
        }
        if let Some(value) = lookup(ENV_FRAME_TIMEOUT_MS) {
            self.frame_timeout_ms = parse_var(ENV_FRAME_TIMEOUT_MS, &value)?;
        }
        self.validate()
    }

    /// Reject values the pipeline cannot run with
    ///
    /// The pixel format is not checked here: an unsupported format is a
    /// drawer failure, reported when the first frame is blitted.
    pub fn validate(&self) -> Result<()> {
        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(PipelineError::Config(format!(
                "surface must not be empty ({}x{})",
                self.surface.width, self.surface.height
            )));
        }
        if self.telemetry_window == 0 {
            return Err(PipelineError::Config(
                "telemetry_window must be greater than 0".to_string(),
            ));
        }
        if self.audio.sample_rate == 0 {
            return Err(PipelineError::Config(
                "audio.sample_rate must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| PipelineError::Config(format!("invalid {}='{}': {}", name, value, e)))
}
