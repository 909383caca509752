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

//! Property tests for the handoff primitives, the blitter and telemetry

use proptest::prelude::*;
use std::time::Duration;
use zxview::core::cancel::CancellationToken;
use zxview::core::frame::{AudioBuffer, Frame, PALETTE_SIZE, SPECTRUM_PALETTE};
use zxview::frontend::audio_queue::AudioQueue;
use zxview::frontend::blitter::{blit, pack_bgra, pack_rgba};
use zxview::frontend::mailbox::FrameMailbox;
use zxview::frontend::surface::{PixelFormat, SurfaceBuffer};
use zxview::frontend::telemetry::{frames_per_second, AudioLossSampler};

fn frame(sequence: u64) -> Frame {
    Frame::new(sequence, SPECTRUM_PALETTE, 1, 1, vec![0u8]).unwrap()
}

#[derive(Debug, Clone)]
enum MailboxOp {
    Publish,
    Take,
}

fn mailbox_op() -> impl Strategy<Value = MailboxOp> {
    prop_oneof![Just(MailboxOp::Publish), Just(MailboxOp::Take)]
}

proptest! {
    /// A take always yields the newest frame published since the last take
    #[test]
    fn prop_mailbox_yields_latest(ops in prop::collection::vec(mailbox_op(), 0..200)) {
        let mailbox = FrameMailbox::new();
        let mut next = 1u64;
        let mut pending: Option<u64> = None;
        let mut last_taken = 0u64;

        for op in ops {
            match op {
                MailboxOp::Publish => {
                    mailbox.publish(frame(next));
                    pending = Some(next);
                    next += 1;
                }
                MailboxOp::Take => {
                    let taken = mailbox.try_take().map(|f| f.sequence());
                    prop_assert_eq!(taken, pending.take());
                    if let Some(seq) = taken {
                        prop_assert!(seq > last_taken);
                        last_taken = seq;
                    }
                }
            }
            prop_assert_eq!(mailbox.has_pending(), pending.is_some());
        }
    }

    /// Everything pushed before close is drained, in order, with nothing extra
    #[test]
    fn prop_queue_drains_everything_in_order(
        buffers in prop::collection::vec(
            (0usize..4, prop::collection::vec(any::<i16>(), 1..16)),
            0..64,
        )
    ) {
        let queue = AudioQueue::new();
        let cancel = CancellationToken::new();

        for (channel, samples) in &buffers {
            queue.push(AudioBuffer::new(*channel, samples.clone())).unwrap();
        }
        queue.close();
        prop_assert!(queue.push(AudioBuffer::new(0, vec![0])).is_err());

        let drained: Vec<(usize, Vec<i16>)> = queue
            .drain(&cancel)
            .map(|b| (b.channel(), b.samples().to_vec()))
            .collect();
        prop_assert_eq!(drained, buffers);
    }

    /// Every surface pixel inside the frame matches the packed palette color
    #[test]
    fn prop_blit_matches_palette(
        width in 1usize..24,
        height in 1usize..24,
        pad in 0usize..8,
        bgra in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let pixels: Vec<u8> = (0..width * height)
            .map(|i| ((seed.wrapping_add(i as u64 * 7)) % PALETTE_SIZE as u64) as u8)
            .collect();
        let frame = Frame::new(1, SPECTRUM_PALETTE, width, height, pixels.clone()).unwrap();

        let format = if bgra { PixelFormat::Bgra8888 } else { PixelFormat::Rgba8888 };
        let mut surface = SurfaceBuffer::new(format, width + pad, height + pad, width + pad);
        blit(&frame, &mut surface).unwrap();

        for y in 0..height {
            for x in 0..width {
                let color = SPECTRUM_PALETTE[pixels[y * width + x] as usize];
                let expected = if bgra { pack_bgra(color) } else { pack_rgba(color) };
                prop_assert_eq!(surface.pixel(x, y), Some(expected));
            }
        }
    }

    /// Lost count equals the number of refused buffers in each full window
    #[test]
    fn prop_loss_counts_refusals(
        accepted in prop::collection::vec(any::<bool>(), 1..300),
        window in 1u32..50,
    ) {
        let mut sampler = AudioLossSampler::new(window);
        let mut reports = Vec::new();
        for &ok in &accepted {
            if let Some(lost) = sampler.tick(ok) {
                reports.push(lost);
            }
        }

        let expected: Vec<u32> = accepted
            .chunks_exact(window as usize)
            .map(|chunk| chunk.iter().filter(|&&ok| !ok).count() as u32)
            .collect();
        prop_assert_eq!(reports, expected);
    }

    #[test]
    fn prop_fps_never_exceeds_frame_count_per_second(
        frames in 1u32..1000,
        millis in 1000u64..10_000,
    ) {
        let fps = frames_per_second(frames, Duration::from_millis(millis));
        prop_assert!(fps <= frames);
    }
}

#[test]
fn test_mailbox_sequences_increase_across_threads() {
    use std::sync::Arc;
    use std::thread;

    let mailbox = Arc::new(FrameMailbox::new());
    let cancel = CancellationToken::new();

    let producer = {
        let mailbox = Arc::clone(&mailbox);
        thread::spawn(move || {
            for seq in 1..=5_000u64 {
                mailbox.publish(frame(seq));
            }
        })
    };

    let mut last = 0u64;
    while last < 5_000 {
        match mailbox.take_latest(Duration::from_secs(5), &cancel) {
            Ok(Some(f)) => {
                assert!(f.sequence() > last, "{} after {}", f.sequence(), last);
                last = f.sequence();
            }
            Ok(None) => panic!("producer stalled at {}", last),
            Err(_) => unreachable!(),
        }
    }

    producer.join().unwrap();
    assert!(!mailbox.has_pending());
}
