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

//! Render surface
//!
//! The drawer thread writes into a [`FrameSurface`] while holding its lock and
//! then asks the host to repaint. The host reads the same buffer (again under
//! the lock) when it presents.

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Packed 32-bit pixel layouts a host surface may declare
///
/// Names give the byte order in memory; words are stored little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Bytes R, G, B, A
    Rgba8888,
    /// Bytes B, G, R, A
    Bgra8888,
    /// 16-bit 5:6:5, not producible by the blitter
    Rgb565,
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Rgba8888 => "rgba8888",
            PixelFormat::Bgra8888 => "bgra8888",
            PixelFormat::Rgb565 => "rgb565",
        };
        f.write_str(name)
    }
}

impl FromStr for PixelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgba8888" | "rgba" => Ok(PixelFormat::Rgba8888),
            "bgra8888" | "bgra" => Ok(PixelFormat::Bgra8888),
            "rgb565" => Ok(PixelFormat::Rgb565),
            other => Err(format!("unknown pixel format '{}'", other)),
        }
    }
}

/// Pixel storage of a surface
///
/// `stride` is the distance between rows, in pixels, and is at least `width`.
#[derive(Debug, Clone)]
pub struct SurfaceBuffer {
    format: PixelFormat,
    width: usize,
    height: usize,
    stride: usize,
    pixels: Vec<u32>,
}

impl SurfaceBuffer {
    /// Create a zeroed buffer
    ///
    /// A `stride` smaller than `width` is raised to `width`.
    pub fn new(format: PixelFormat, width: usize, height: usize, stride: usize) -> Self {
        let stride = stride.max(width);
        Self {
            format,
            width,
            height,
            stride,
            pixels: vec![0; stride * height],
        }
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Packed pixel words including row padding
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Pixel word at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.stride + x).copied()
    }

    /// Raw bytes, e.g. for uploading to a texture
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Host repaint hook
pub type RepaintFn = Box<dyn Fn() + Send + Sync>;

/// Lockable pixel buffer shared between the drawer thread and the host
pub struct FrameSurface {
    buffer: Mutex<SurfaceBuffer>,
    invalidate: RepaintFn,
    repaints: AtomicU64,
}

impl FrameSurface {
    /// Create a surface
    ///
    /// # Arguments
    ///
    /// * `buffer` - Initial pixel storage; its format is fixed for the lifetime of the surface
    /// * `invalidate` - Called after every blit to schedule a repaint on the host
    pub fn new(buffer: SurfaceBuffer, invalidate: RepaintFn) -> Self {
        Self {
            buffer: Mutex::new(buffer),
            invalidate,
            repaints: AtomicU64::new(0),
        }
    }

    /// Acquire exclusive access to the pixel buffer
    ///
    /// The lock is released when the guard is dropped.
    pub fn lock(&self) -> MutexGuard<'_, SurfaceBuffer> {
        self.buffer.lock()
    }

    pub fn format(&self) -> PixelFormat {
        self.buffer.lock().format()
    }

    /// Ask the host to repaint
    pub fn request_repaint(&self) {
        self.repaints.fetch_add(1, Ordering::Relaxed);
        (self.invalidate)();
    }

    /// Number of repaint requests so far
    pub fn repaint_count(&self) -> u64 {
        self.repaints.load(Ordering::Relaxed)
    }
}
