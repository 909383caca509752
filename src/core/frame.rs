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

//! Frame and audio buffer types
//!
//! These are the two payloads the emulation engine hands to the presentation
//! pipeline. Both are immutable once produced.

use crate::core::error::{PipelineError, Result};

/// Visible screen width including border, in pixels
pub const SCREEN_WIDTH: usize = 352;

/// Visible screen height including border, in pixels
pub const SCREEN_HEIGHT: usize = 312;

/// Number of entries in a frame palette
pub const PALETTE_SIZE: usize = 16;

/// A single palette color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Fixed-size palette mapping color index to RGB triple
pub type Palette = [Rgb; PALETTE_SIZE];

/// Standard ZX Spectrum palette (8 normal colors followed by 8 bright colors)
pub const SPECTRUM_PALETTE: Palette = [
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0x00, 0x00, 0xD7),
    Rgb::new(0xD7, 0x00, 0x00),
    Rgb::new(0xD7, 0x00, 0xD7),
    Rgb::new(0x00, 0xD7, 0x00),
    Rgb::new(0x00, 0xD7, 0xD7),
    Rgb::new(0xD7, 0xD7, 0x00),
    Rgb::new(0xD7, 0xD7, 0xD7),
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0x00, 0x00, 0xFF),
    Rgb::new(0xFF, 0x00, 0x00),
    Rgb::new(0xFF, 0x00, 0xFF),
    Rgb::new(0x00, 0xFF, 0x00),
    Rgb::new(0x00, 0xFF, 0xFF),
    Rgb::new(0xFF, 0xFF, 0x00),
    Rgb::new(0xFF, 0xFF, 0xFF),
];

/// One rendered video frame
///
/// Holds a sequence number, a palette and one palette index per pixel in
/// row-major order. Every index is validated against the palette at
/// construction, so consumers can index the palette without bounds checks
/// failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    sequence: u64,
    palette: Palette,
    width: usize,
    height: usize,
    pixels: Box<[u8]>,
}

impl Frame {
    /// Create a new frame
    ///
    /// # Arguments
    ///
    /// * `sequence` - Monotonically increasing frame number
    /// * `palette` - Palette used to resolve pixel indices
    /// * `width` - Frame width in pixels
    /// * `height` - Frame height in pixels
    /// * `pixels` - `width * height` palette indices, row-major
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidFrame`] if the pixel count does not
    /// match the dimensions or an index falls outside the palette.
    ///
    /// # Example
    ///
    /// ```
    /// use zxview::core::frame::{Frame, SPECTRUM_PALETTE};
    ///
    /// let frame = Frame::new(1, SPECTRUM_PALETTE, 2, 1, vec![0, 15]).unwrap();
    /// assert_eq!(frame.sequence(), 1);
    /// assert_eq!(frame.pixels().len(), 2);
    /// ```
    pub fn new(
        sequence: u64,
        palette: Palette,
        width: usize,
        height: usize,
        pixels: impl Into<Box<[u8]>>,
    ) -> Result<Self> {
        let pixels = pixels.into();
        let expected = width.checked_mul(height).ok_or_else(|| {
            PipelineError::InvalidFrame(format!("dimensions {}x{} overflow", width, height))
        })?;

        if pixels.len() != expected {
            return Err(PipelineError::InvalidFrame(format!(
                "expected {} pixels for {}x{}, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }

        if let Some(pos) = pixels.iter().position(|&i| i as usize >= PALETTE_SIZE) {
            return Err(PipelineError::InvalidFrame(format!(
                "palette index {} at pixel {} exceeds palette size {}",
                pixels[pos], pos, PALETTE_SIZE
            )));
        }

        Ok(Self {
            sequence,
            palette,
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Palette indices, row-major
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Audio channel identifier (e.g. beeper, AY)
pub type ChannelId = usize;

/// Samples for one playback quantum on one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    channel: ChannelId,
    samples: Box<[i16]>,
}

impl AudioBuffer {
    pub fn new(channel: ChannelId, samples: impl Into<Box<[i16]>>) -> Self {
        Self {
            channel,
            samples: samples.into(),
        }
    }

    #[inline]
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    #[inline]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }
}
