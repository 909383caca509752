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

//! Blitter throughput on a full Spectrum frame

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use zxview::core::frame::{Frame, PALETTE_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, SPECTRUM_PALETTE};
use zxview::frontend::blitter::blit;
use zxview::frontend::surface::{PixelFormat, SurfaceBuffer};

fn spectrum_frame() -> Frame {
    let pixels: Vec<u8> = (0..SCREEN_WIDTH * SCREEN_HEIGHT)
        .map(|i| (i / 7 % PALETTE_SIZE) as u8)
        .collect();
    Frame::new(1, SPECTRUM_PALETTE, SCREEN_WIDTH, SCREEN_HEIGHT, pixels).unwrap()
}

fn bench_blit(c: &mut Criterion) {
    let frame = spectrum_frame();
    let mut group = c.benchmark_group("blit");
    group.throughput(Throughput::Elements((SCREEN_WIDTH * SCREEN_HEIGHT) as u64));

    for format in [PixelFormat::Rgba8888, PixelFormat::Bgra8888] {
        // Padded stride exercises the row-by-row path
        for stride in [SCREEN_WIDTH, SCREEN_WIDTH + 32] {
            let mut surface = SurfaceBuffer::new(format, SCREEN_WIDTH, SCREEN_HEIGHT, stride);
            group.bench_with_input(
                BenchmarkId::new(format.to_string(), stride),
                &frame,
                |b, frame| b.iter(|| blit(black_box(frame), &mut surface).unwrap()),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_blit);
criterion_main!(benches);
