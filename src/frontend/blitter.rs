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

//! Pixel blitter
//!
//! Converts an indexed [`Frame`] into packed 32-bit pixels in a
//! [`SurfaceBuffer`]. The destination layout is resolved once per frame into a
//! palette lookup table, after which each pixel is a single table lookup.
//!
//! # Layouts
//!
//! | Format     | Word (little-endian)          |
//! |------------|-------------------------------|
//! | `Rgba8888` | `A << 24 \| B << 16 \| G << 8 \| R` |
//! | `Bgra8888` | `A << 24 \| R << 16 \| G << 8 \| B` |
//!
//! Alpha is always 0xFF. Any other layout fails with
//! [`PipelineError::UnsupportedPixelFormat`].

use crate::core::error::{PipelineError, Result};
use crate::core::frame::{Frame, Rgb, PALETTE_SIZE};
use crate::frontend::surface::{PixelFormat, SurfaceBuffer};

const OPAQUE: u32 = 0xFF00_0000;

/// Pack a color for an RGBA8888 surface
#[inline]
pub fn pack_rgba(c: Rgb) -> u32 {
    OPAQUE | (c.b as u32) << 16 | (c.g as u32) << 8 | c.r as u32
}

/// Pack a color for a BGRA8888 surface
#[inline]
pub fn pack_bgra(c: Rgb) -> u32 {
    OPAQUE | (c.r as u32) << 16 | (c.g as u32) << 8 | c.b as u32
}

/// Resolve the frame palette into packed words for `format`
fn lookup_table(frame: &Frame, format: PixelFormat) -> Result<[u32; PALETTE_SIZE]> {
    let pack: fn(Rgb) -> u32 = match format {
        PixelFormat::Rgba8888 => pack_rgba,
        PixelFormat::Bgra8888 => pack_bgra,
        other => return Err(PipelineError::UnsupportedPixelFormat(other)),
    };

    let mut table = [0u32; PALETTE_SIZE];
    for (slot, &color) in table.iter_mut().zip(frame.palette().iter()) {
        *slot = pack(color);
    }
    Ok(table)
}

/// Draw `frame` into the top-left corner of `dst`
///
/// The caller holds the surface lock for the duration of the call.
///
/// # Errors
///
/// - [`PipelineError::UnsupportedPixelFormat`] if `dst` is not RGBA8888 or BGRA8888
/// - [`PipelineError::SurfaceTooSmall`] if the frame does not fit
///
/// # Example
///
/// ```
/// use zxview::core::frame::{Frame, Rgb, PALETTE_SIZE};
/// use zxview::frontend::blitter::blit;
/// use zxview::frontend::surface::{PixelFormat, SurfaceBuffer};
///
/// let mut palette = [Rgb::default(); PALETTE_SIZE];
/// palette[0] = Rgb::new(10, 20, 30);
/// let frame = Frame::new(1, palette, 1, 1, vec![0]).unwrap();
///
/// let mut dst = SurfaceBuffer::new(PixelFormat::Rgba8888, 1, 1, 1);
/// blit(&frame, &mut dst).unwrap();
/// assert_eq!(dst.pixel(0, 0), Some(0xFF1E_140A));
/// ```
pub fn blit(frame: &Frame, dst: &mut SurfaceBuffer) -> Result<()> {
    let table = lookup_table(frame, dst.format())?;

    if frame.width() > dst.width() || frame.height() > dst.height() {
        return Err(PipelineError::SurfaceTooSmall {
            frame_width: frame.width(),
            frame_height: frame.height(),
            surface_width: dst.width(),
            surface_height: dst.height(),
        });
    }

    if frame.width() == 0 {
        return Ok(());
    }

    let width = frame.width();
    let stride = dst.stride();
    let rows = frame.pixels().chunks_exact(width);
    for (src_row, dst_row) in rows.zip(dst.pixels_mut().chunks_mut(stride)) {
        for (out, &index) in dst_row[..width].iter_mut().zip(src_row) {
            // Indices are validated against the palette when the frame is built
            *out = table[index as usize];
        }
    }

    Ok(())
}
