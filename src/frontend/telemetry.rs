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

//! Performance telemetry
//!
//! Two samplers turn per-loop tick counts into display figures every
//! `window` ticks (100 by default):
//!
//! - [`FpsSampler`] on the drawer thread: `window / elapsed_seconds`, truncated
//! - [`AudioLossSampler`] on the audio thread: `window - buffers_played`
//!
//! Results land in [`Telemetry`], a pair of single-writer scalars the UI polls
//! or subscribes to. Each field has exactly one writer, so the values are
//! plain relaxed atomics and a reader may observe a slightly stale figure.

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of ticks per sample
pub const DEFAULT_WINDOW: u32 = 100;

/// Marker for "no sample yet"
const UNSET: u64 = u64::MAX;

/// Frames per second over `frames` drawn in `elapsed`, truncated
///
/// A zero-length window saturates to `u32::MAX`.
pub fn frames_per_second(frames: u32, elapsed: Duration) -> u32 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return u32::MAX;
    }
    // Float-to-int casts saturate
    (frames as f64 / secs) as u32
}

/// Drawer-side FPS sampler
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use zxview::frontend::telemetry::FpsSampler;
///
/// let start = Instant::now();
/// let mut sampler = FpsSampler::new(100, start);
/// let mut sample = None;
/// for i in 1..=100u32 {
///     sample = sampler.tick(start + Duration::from_millis(20) * i);
/// }
/// assert_eq!(sample, Some(50));
/// ```
#[derive(Debug, Clone)]
pub struct FpsSampler {
    window: u32,
    ticks: u64,
    window_start: Instant,
}

impl FpsSampler {
    /// # Panics
    ///
    /// Panics if `window` is 0
    pub fn new(window: u32, start: Instant) -> Self {
        assert!(window > 0, "telemetry window must be greater than 0");
        Self {
            window,
            ticks: 0,
            window_start: start,
        }
    }

    /// Count one drawn frame at `now`
    ///
    /// Returns the FPS figure when this tick completes a window.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        self.ticks += 1;
        if self.ticks % self.window as u64 != 0 {
            return None;
        }

        let elapsed = now.saturating_duration_since(self.window_start);
        self.window_start = now;
        Some(frames_per_second(self.window, elapsed))
    }

    /// Total frames counted
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Audio-side lost buffer sampler
#[derive(Debug, Clone)]
pub struct AudioLossSampler {
    window: u32,
    submitted: u64,
    played_in_window: u32,
}

impl AudioLossSampler {
    /// # Panics
    ///
    /// Panics if `window` is 0
    pub fn new(window: u32) -> Self {
        assert!(window > 0, "telemetry window must be greater than 0");
        Self {
            window,
            submitted: 0,
            played_in_window: 0,
        }
    }

    /// Count one submitted buffer and whether the device accepted it
    ///
    /// Returns the lost count when this tick completes a window, then starts
    /// a new window.
    pub fn tick(&mut self, accepted: bool) -> Option<u32> {
        self.submitted += 1;
        if accepted {
            self.played_in_window += 1;
        }

        if self.submitted % self.window as u64 != 0 {
            return None;
        }

        let lost = self.window - self.played_in_window;
        self.played_in_window = 0;
        Some(lost)
    }

    /// Total buffers submitted
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

/// Observable telemetry property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryProperty {
    Fps,
    LostSoundFrames,
}

impl fmt::Display for TelemetryProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryProperty::Fps => f.write_str("FPS"),
            TelemetryProperty::LostSoundFrames => f.write_str("LostSoundFrames"),
        }
    }
}

/// Property-changed callback, invoked on the writer's thread
pub type PropertyChangedFn = Box<dyn Fn(TelemetryProperty) + Send + Sync>;

type SharedListener = Arc<dyn Fn(TelemetryProperty) + Send + Sync>;

/// Point-in-time copy of both figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub fps: Option<u32>,
    pub lost_sound_frames: Option<u32>,
}

/// Published FPS and lost-audio figures
pub struct Telemetry {
    fps: AtomicU64,
    lost_sound_frames: AtomicU64,
    listener: RwLock<Option<SharedListener>>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            fps: AtomicU64::new(UNSET),
            lost_sound_frames: AtomicU64::new(UNSET),
            listener: RwLock::new(None),
        }
    }

    /// Register the property-changed callback, replacing any previous one
    ///
    /// The callback runs without any telemetry lock held, so it may read the
    /// values or register a new callback.
    pub fn on_property_changed(&self, listener: PropertyChangedFn) {
        *self.listener.write() = Some(Arc::from(listener));
    }

    /// Publish a new FPS figure (drawer thread only)
    pub fn set_fps(&self, fps: u32) {
        self.fps.store(fps as u64, Ordering::Relaxed);
        self.notify(TelemetryProperty::Fps);
    }

    /// Publish a new lost-buffer figure (audio thread only)
    pub fn set_lost_sound_frames(&self, lost: u32) {
        self.lost_sound_frames.store(lost as u64, Ordering::Relaxed);
        self.notify(TelemetryProperty::LostSoundFrames);
    }

    pub fn fps(&self) -> Option<u32> {
        load(&self.fps)
    }

    pub fn lost_sound_frames(&self) -> Option<u32> {
        load(&self.lost_sound_frames)
    }

    /// FPS as display text, e.g. `FPS:0050`
    pub fn fps_text(&self) -> Option<String> {
        self.fps().map(|fps| format!("FPS:{:04}", fps))
    }

    /// Lost buffers as display text, e.g. `SND:003`
    pub fn lost_sound_frames_text(&self) -> Option<String> {
        self.lost_sound_frames()
            .map(|lost| format!("SND:{:03}", lost))
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            fps: self.fps(),
            lost_sound_frames: self.lost_sound_frames(),
        }
    }

    fn notify(&self, property: TelemetryProperty) {
        log::debug!("{} updated", property);
        // Clone out so the read lock is released before the call
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            listener(property);
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

fn load(value: &AtomicU64) -> Option<u32> {
    match value.load(Ordering::Relaxed) {
        UNSET => None,
        v => Some(v as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_fps_after_100_frames_in_two_seconds() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(100, start);

        for _ in 0..99 {
            assert_eq!(sampler.tick(start + Duration::from_secs(1)), None);
        }
        assert_eq!(sampler.tick(start + Duration::from_secs(2)), Some(50));
        assert_eq!(sampler.ticks(), 100);
    }

    #[test]
    fn test_fps_window_restarts_from_last_sample() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(10, start);

        for _ in 0..10 {
            sampler.tick(start + Duration::from_secs(1));
        }
        let mut sample = None;
        for _ in 0..10 {
            sample = sampler.tick(start + Duration::from_millis(1500));
        }
        assert_eq!(sample, Some(20));
    }

    #[test]
    fn test_fps_truncates() {
        assert_eq!(frames_per_second(100, Duration::from_millis(3000)), 33);
        assert_eq!(frames_per_second(100, Duration::ZERO), u32::MAX);
    }

    #[test]
    fn test_lost_audio_97_of_100() {
        let mut sampler = AudioLossSampler::new(100);
        let mut sample = None;
        for i in 0..100 {
            sample = sampler.tick(i >= 3);
        }
        assert_eq!(sample, Some(3));
        assert_eq!(sampler.submitted(), 100);
    }

    #[test]
    fn test_lost_audio_window_resets() {
        let mut sampler = AudioLossSampler::new(10);
        for _ in 0..10 {
            sampler.tick(false);
        }
        let mut sample = None;
        for _ in 0..10 {
            sample = sampler.tick(true);
        }
        assert_eq!(sample, Some(0));
    }

    #[test]
    fn test_telemetry_starts_unset() {
        let telemetry = Telemetry::new();
        assert_eq!(telemetry.fps(), None);
        assert_eq!(telemetry.fps_text(), None);
        assert_eq!(telemetry.snapshot(), TelemetrySnapshot::default());
    }

    #[test]
    fn test_telemetry_text_format() {
        let telemetry = Telemetry::new();
        telemetry.set_fps(50);
        telemetry.set_lost_sound_frames(3);
        assert_eq!(telemetry.fps_text().as_deref(), Some("FPS:0050"));
        assert_eq!(telemetry.lost_sound_frames_text().as_deref(), Some("SND:003"));
    }

    #[test]
    fn test_property_changed_notifications() {
        let telemetry = Telemetry::new();
        let fps_events = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fps_events);
        telemetry.on_property_changed(Box::new(move |property| {
            if property == TelemetryProperty::Fps {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }));

        telemetry.set_fps(60);
        telemetry.set_lost_sound_frames(0);
        telemetry.set_fps(61);

        assert_eq!(fps_events.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_listener_may_replace_itself() {
        let telemetry = Arc::new(Telemetry::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&telemetry);
        let counter = Arc::clone(&calls);
        telemetry.on_property_changed(Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            assert!(inner.fps().is_some());
            let replaced = Arc::clone(&counter);
            inner.on_property_changed(Box::new(move |_| {
                replaced.fetch_add(10, Ordering::Relaxed);
            }));
        }));

        let writer = Arc::clone(&telemetry);
        std::thread::spawn(move || {
            writer.set_fps(50);
            writer.set_fps(51);
        })
        .join()
        .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 11);
    }
}
