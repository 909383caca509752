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

//! Audio playback devices
//!
//! The audio thread hands every [`AudioBuffer`](crate::core::frame::AudioBuffer)
//! to an [`AudioDevice`]. A device may refuse a buffer when it is backed up;
//! refusals feed the lost-audio telemetry and are never retried.
//!
//! - [`NullAudioDevice`]: accepts and discards everything (headless runs)
//! - [`CpalAudioDevice`]: mixes per-channel queues into the default output
//!   stream (feature `audio`)

use crate::core::frame::ChannelId;
use std::collections::VecDeque;

#[cfg(feature = "audio")]
pub use cpal_device::CpalAudioDevice;

/// Default per-channel queue limit, in samples
pub const DEFAULT_QUEUE_LIMIT: usize = 8192;

/// Sound output used by the audio thread
///
/// Methods take `&self`: `play` runs on the audio thread while `reset` may be
/// called from the UI thread. Resources are released on drop.
pub trait AudioDevice: Send + Sync {
    /// Queue `samples` on `channel`
    ///
    /// Returns `false` if the device dropped the buffer because of backpressure.
    fn play(&self, samples: &[i16], channel: ChannelId) -> bool;

    /// Discard anything queued, e.g. after a new program is loaded
    fn reset(&self);
}

/// Device that accepts and discards every buffer
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioDevice;

impl AudioDevice for NullAudioDevice {
    fn play(&self, _samples: &[i16], _channel: ChannelId) -> bool {
        true
    }

    fn reset(&self) {}
}

/// Per-channel sample queues mixed down to a single stream
///
/// Each channel holds at most `limit` samples; a buffer that would overflow
/// its channel is refused as a whole.
#[derive(Debug, Clone)]
pub struct ChannelMixer {
    channels: Vec<VecDeque<i16>>,
    limit: usize,
}

impl ChannelMixer {
    pub fn new(channels: usize, limit: usize) -> Self {
        Self {
            channels: vec![VecDeque::new(); channels],
            limit,
        }
    }

    /// Queue a buffer on `channel`
    ///
    /// Returns `false` for an unknown channel or when the buffer does not fit.
    pub fn push(&mut self, samples: &[i16], channel: ChannelId) -> bool {
        let Some(queue) = self.channels.get_mut(channel) else {
            log::warn!("Audio buffer for unknown channel {}", channel);
            return false;
        };

        if queue.len() + samples.len() > self.limit {
            return false;
        }

        queue.extend(samples.iter().copied());
        true
    }

    /// Pop and mix the next sample of every channel
    ///
    /// Channels that ran dry contribute silence.
    pub fn next_sample(&mut self) -> i16 {
        self.channels
            .iter_mut()
            .filter_map(VecDeque::pop_front)
            .fold(0i16, i16::saturating_add)
    }

    /// Samples queued on `channel`
    pub fn queued(&self, channel: ChannelId) -> usize {
        self.channels.get(channel).map_or(0, VecDeque::len)
    }

    pub fn clear(&mut self) {
        self.channels.iter_mut().for_each(VecDeque::clear);
    }
}

#[cfg(feature = "audio")]
mod cpal_device {
    use super::{AudioDevice, ChannelMixer};
    use crate::core::error::{PipelineError, Result};
    use crate::core::frame::ChannelId;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use crossbeam_channel::Sender;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};

    /// Playback through the default `cpal` output device
    ///
    /// `cpal::Stream` is not `Send` on every platform, so the stream lives on
    /// a dedicated thread that only waits for shutdown. The data callback and
    /// [`AudioDevice::play`] meet at a shared [`ChannelMixer`].
    pub struct CpalAudioDevice {
        mixer: Arc<Mutex<ChannelMixer>>,
        sample_rate: u32,
        shutdown: Option<Sender<()>>,
        worker: Option<JoinHandle<()>>,
    }

    impl CpalAudioDevice {
        /// Open the default output device
        ///
        /// # Arguments
        ///
        /// * `channels` - Number of logical input channels to mix
        /// * `queue_limit` - Per-channel backlog, in samples, before buffers are refused
        ///
        /// # Errors
        ///
        /// Returns [`PipelineError::Audio`] if no usable output device exists.
        pub fn open(channels: usize, queue_limit: usize) -> Result<Self> {
            let mixer = Arc::new(Mutex::new(ChannelMixer::new(channels, queue_limit)));
            let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
            let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<u32>>(1);

            let stream_mixer = Arc::clone(&mixer);
            let worker = thread::Builder::new()
                .name("cpal-output".to_string())
                .spawn(move || match build_stream(stream_mixer) {
                    Ok((stream, rate)) => {
                        let _ = ready_tx.send(Ok(rate));
                        // Returns once the sender is dropped
                        let _ = shutdown_rx.recv();
                        drop(stream);
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                })
                .map_err(|source| PipelineError::ThreadSpawn {
                    name: "cpal-output",
                    source,
                })?;

            let sample_rate = match ready_rx.recv() {
                Ok(Ok(rate)) => rate,
                Ok(Err(e)) => {
                    let _ = worker.join();
                    return Err(e);
                }
                Err(_) => {
                    let _ = worker.join();
                    return Err(PipelineError::Audio(
                        "output thread exited during setup".to_string(),
                    ));
                }
            };

            log::info!("Audio output opened at {} Hz", sample_rate);

            Ok(Self {
                mixer,
                sample_rate,
                shutdown: Some(shutdown_tx),
                worker: Some(worker),
            })
        }

        /// Output sample rate negotiated with the device
        pub fn sample_rate(&self) -> u32 {
            self.sample_rate
        }
    }

    impl AudioDevice for CpalAudioDevice {
        fn play(&self, samples: &[i16], channel: ChannelId) -> bool {
            self.mixer.lock().push(samples, channel)
        }

        fn reset(&self) {
            self.mixer.lock().clear();
        }
    }

    impl Drop for CpalAudioDevice {
        fn drop(&mut self) {
            drop(self.shutdown.take());
            if let Some(worker) = self.worker.take() {
                if worker.join().is_err() {
                    log::error!("Audio output thread panicked");
                }
            }
            log::debug!("Audio output closed");
        }
    }

    fn build_stream(mixer: Arc<Mutex<ChannelMixer>>) -> Result<(cpal::Stream, u32)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PipelineError::Audio("no output device available".to_string()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| PipelineError::Audio(format!("no supported output config: {}", e)))?;

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let channels = config.channels as usize;
        let err_fn = |err| log::error!("cpal stream error: {}", err);

        let stream = match sample_format {
            cpal::SampleFormat::I16 => device.build_output_stream(
                &config,
                move |data: &mut [i16], _| {
                    let mut mixer = mixer.lock();
                    for frame in data.chunks_mut(channels) {
                        frame.fill(mixer.next_sample());
                    }
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::U16 => device.build_output_stream(
                &config,
                move |data: &mut [u16], _| {
                    let mut mixer = mixer.lock();
                    for frame in data.chunks_mut(channels) {
                        frame.fill((mixer.next_sample() as i32 + 32768) as u16);
                    }
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    let mut mixer = mixer.lock();
                    for frame in data.chunks_mut(channels) {
                        frame.fill(mixer.next_sample() as f32 / 32768.0);
                    }
                },
                err_fn,
                None,
            ),
            other => {
                return Err(PipelineError::Audio(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(|e| PipelineError::Audio(format!("failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| PipelineError::Audio(format!("failed to start stream: {}", e)))?;

        Ok((stream, config.sample_rate.0))
    }
}
