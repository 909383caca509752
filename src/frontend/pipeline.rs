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

//! Pipeline controller
//!
//! Owns the three worker threads of the presentation pipeline and the state
//! they share:
//!
//! ```text
//!  emulation thread ──publish──▶ FrameMailbox ──take_latest──▶ drawer thread ──▶ FrameSurface
//!         │                                                                          │
//!         └────────push───────▶ AudioQueue ────drain─────▶ audio thread ──▶ AudioDevice
//! ```
//!
//! # Lifecycle
//!
//! `Created → Running → Stopping → Stopped`. [`PipelineController::start`]
//! spawns all three threads and returns a running controller.
//! [`PipelineController::stop`] (also run on drop) cancels, closes the audio
//! queue, joins emulation, drawer and audio threads in that order and then
//! releases the shared resources. Only the first call does anything.

use crate::core::cancel::{CancellationToken, Cancelled};
use crate::core::emulator::{Emulator, EmulatorEvents, PacingDelay};
use crate::core::error::{PipelineError, Result};
use crate::core::frame::{AudioBuffer, Frame};
use crate::frontend::audio::AudioDevice;
use crate::frontend::audio_queue::AudioQueue;
use crate::frontend::blitter::blit;
use crate::frontend::config::PipelineConfig;
use crate::frontend::file_picker::{DialogFilePicker, FilePicker};
use crate::frontend::input::{InputConfig, KeyMapping};
use crate::frontend::mailbox::FrameMailbox;
use crate::frontend::surface::{FrameSurface, RepaintFn, SurfaceBuffer};
use crate::frontend::telemetry::{AudioLossSampler, FpsSampler, Telemetry};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use winit::keyboard::KeyCode;

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Created,
    Running,
    Stopping,
    Stopped,
}

/// External collaborators wired into the pipeline
pub struct PipelineParts {
    pub emulator: Arc<dyn Emulator>,
    pub audio_device: Arc<dyn AudioDevice>,
    pub file_picker: Box<dyn FilePicker>,
    pub key_mapping: KeyMapping,
    /// Schedules a repaint on the host after each drawn frame
    pub invalidate: RepaintFn,
}

impl PipelineParts {
    /// Parts with the native file dialog, default key bindings and no repaint hook
    pub fn new(emulator: Arc<dyn Emulator>, audio_device: Arc<dyn AudioDevice>) -> Self {
        Self {
            emulator,
            audio_device,
            file_picker: Box::new(DialogFilePicker::new()),
            key_mapping: KeyMapping::from_config(InputConfig::default_config()),
            invalidate: Box::new(|| {}),
        }
    }

    pub fn with_file_picker(mut self, file_picker: Box<dyn FilePicker>) -> Self {
        self.file_picker = file_picker;
        self
    }

    pub fn with_key_mapping(mut self, key_mapping: KeyMapping) -> Self {
        self.key_mapping = key_mapping;
        self
    }

    pub fn with_invalidate(mut self, invalidate: RepaintFn) -> Self {
        self.invalidate = invalidate;
        self
    }
}

struct Workers {
    emulation: JoinHandle<()>,
    drawer: JoinHandle<Result<()>>,
    audio: JoinHandle<()>,
}

/// Three-thread presentation pipeline
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use zxview::core::demo::DemoEmulator;
/// use zxview::frontend::audio::NullAudioDevice;
/// use zxview::frontend::config::PipelineConfig;
/// use zxview::frontend::pipeline::{PipelineController, PipelineParts};
///
/// let parts = PipelineParts::new(Arc::new(DemoEmulator::new(44_100)), Arc::new(NullAudioDevice));
/// let pipeline = PipelineController::start(&PipelineConfig::default(), parts)?;
/// std::thread::sleep(std::time::Duration::from_secs(1));
/// println!("{:?}", pipeline.telemetry().fps_text());
/// pipeline.stop();
/// # Ok::<(), zxview::PipelineError>(())
/// ```
pub struct PipelineController {
    state: Mutex<PipelineState>,
    cancel: CancellationToken,
    mailbox: Arc<FrameMailbox>,
    audio_queue: Arc<AudioQueue>,
    surface: Arc<FrameSurface>,
    telemetry: Arc<Telemetry>,
    pacing: Arc<PacingDelay>,
    emulator: Arc<dyn Emulator>,
    audio_device: Mutex<Option<Arc<dyn AudioDevice>>>,
    file_picker: Box<dyn FilePicker>,
    key_mapping: KeyMapping,
    workers: Mutex<Option<Workers>>,
}

impl PipelineController {
    /// Start the pipeline
    ///
    /// Spawns the emulation, drawer and audio threads and registers the
    /// emulator's frame and audio output with the mailbox and queue.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Config`] if `config` is invalid
    /// - [`PipelineError::ThreadSpawn`] if a worker thread cannot be created;
    ///   threads already started are cancelled and joined first
    pub fn start(config: &PipelineConfig, parts: PipelineParts) -> Result<Self> {
        config.validate()?;

        let cancel = CancellationToken::new();
        let mailbox = Arc::new(FrameMailbox::new());
        let audio_queue = Arc::new(AudioQueue::new());
        let telemetry = Arc::new(Telemetry::new());
        let pacing = Arc::new(PacingDelay::new(config.delay));
        let surface = Arc::new(FrameSurface::new(
            SurfaceBuffer::new(
                config.surface.format,
                config.surface.width,
                config.surface.height,
                config.surface.width,
            ),
            parts.invalidate,
        ));

        let abort = || {
            cancel.cancel();
            audio_queue.close();
        };

        let emulation = {
            let emulator = Arc::clone(&parts.emulator);
            let pacing = Arc::clone(&pacing);
            let cancel = cancel.clone();
            let mut sink = PipelineSink {
                mailbox: Arc::clone(&mailbox),
                audio_queue: Arc::clone(&audio_queue),
            };
            spawn_worker("emulation", move || {
                emulator.run(&pacing, &cancel, &mut sink);
                log::debug!("Emulation loop exited");
            })?
        };

        let drawer = {
            let ctx = DrawerContext {
                mailbox: Arc::clone(&mailbox),
                surface: Arc::clone(&surface),
                telemetry: Arc::clone(&telemetry),
                cancel: cancel.clone(),
                timeout: config.frame_timeout(),
                window: config.telemetry_window,
            };
            match spawn_worker("drawer", move || run_drawer(ctx)) {
                Ok(handle) => handle,
                Err(e) => {
                    abort();
                    join_worker("emulation", emulation);
                    return Err(e);
                }
            }
        };

        let audio = {
            let queue = Arc::clone(&audio_queue);
            let device = Arc::clone(&parts.audio_device);
            let telemetry = Arc::clone(&telemetry);
            let cancel = cancel.clone();
            let window = config.telemetry_window;
            match spawn_worker("audio", move || {
                run_audio(&queue, device.as_ref(), &telemetry, &cancel, window)
            }) {
                Ok(handle) => handle,
                Err(e) => {
                    abort();
                    join_worker("emulation", emulation);
                    join_drawer(drawer);
                    return Err(e);
                }
            }
        };

        log::info!(
            "Pipeline running ({}x{} {}, delay {})",
            config.surface.width,
            config.surface.height,
            config.surface.format,
            config.delay
        );

        Ok(Self {
            state: Mutex::new(PipelineState::Running),
            cancel,
            mailbox,
            audio_queue,
            surface,
            telemetry,
            pacing,
            emulator: parts.emulator,
            audio_device: Mutex::new(Some(parts.audio_device)),
            file_picker: parts.file_picker,
            key_mapping: parts.key_mapping,
            workers: Mutex::new(Some(Workers {
                emulation,
                drawer,
                audio,
            })),
        })
    }

    /// Stop the pipeline and release its resources
    ///
    /// Idempotent: calls after the first return immediately.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock();
            match *state {
                PipelineState::Stopping | PipelineState::Stopped => return,
                PipelineState::Created | PipelineState::Running => {
                    *state = PipelineState::Stopping;
                }
            }
        }

        log::info!("Stopping pipeline");

        self.cancel.cancel();
        self.audio_queue.close();

        if let Some(workers) = self.workers.lock().take() {
            join_worker("emulation", workers.emulation);
            join_drawer(workers.drawer);
            join_worker("audio", workers.audio);
        }

        self.mailbox.clear();
        let discarded = self.audio_queue.clear();
        if discarded > 0 {
            log::debug!("Discarded {} queued audio buffers", discarded);
        }
        drop(self.audio_device.lock().take());

        *self.state.lock() = PipelineState::Stopped;
        log::info!("Pipeline stopped");
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Running
    }

    /// Forward a key press to the emulator
    ///
    /// Every Spectrum key bound to `key` is pressed, in binding order.
    pub fn key_down(&self, key: KeyCode) {
        for &spectrum in self.key_mapping.map(key) {
            self.emulator.key_down(spectrum);
        }
    }

    /// Forward a key release to the emulator
    pub fn key_up(&self, key: KeyCode) {
        for &spectrum in self.key_mapping.map(key) {
            self.emulator.key_up(spectrum);
        }
    }

    /// Ask the emulator for a diagnostic dump
    pub fn dump(&self) {
        self.emulator.dump();
    }

    /// Ask the user for a program and load it
    ///
    /// # Returns
    ///
    /// - `Ok(Some(path))` if a program was loaded
    /// - `Ok(None)` if the user cancelled the picker
    /// - `Err(_)` if loading failed; the previous program keeps running
    pub async fn load(&self) -> Result<Option<PathBuf>> {
        let Some(path) = self.file_picker.ask_file().await else {
            log::debug!("Load cancelled");
            return Ok(None);
        };

        self.load_path(&path)?;
        Ok(Some(path))
    }

    /// Load a program from `path` and reset the audio device
    pub fn load_path(&self, path: &Path) -> Result<()> {
        if let Err(e) = self.emulator.load(path) {
            log::error!("{}", e);
            return Err(e);
        }

        let device = self.audio_device.lock().clone();
        if let Some(device) = device {
            device.reset();
        }
        log::info!("Loaded {}", path.display());
        Ok(())
    }

    /// Current pacing delay
    pub fn delay(&self) -> u32 {
        self.pacing.get()
    }

    /// Change the pacing delay; the emulator picks it up on its next tick
    pub fn set_delay(&self, delay: u32) {
        self.pacing.set(delay);
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Surface the drawer renders into
    pub fn surface(&self) -> &FrameSurface {
        &self.surface
    }

    pub fn key_mapping(&self) -> &KeyMapping {
        &self.key_mapping
    }
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Routes engine output into the mailbox and the audio queue
struct PipelineSink {
    mailbox: Arc<FrameMailbox>,
    audio_queue: Arc<AudioQueue>,
}

impl EmulatorEvents for PipelineSink {
    fn on_frame(&mut self, frame: Frame) {
        self.mailbox.publish(frame);
    }

    fn on_audio(&mut self, buffer: AudioBuffer) {
        if let Err(e) = self.audio_queue.push(buffer) {
            // Only happens while stopping
            log::trace!("Dropping audio buffer: {}", e);
        }
    }
}

/// State owned by the drawer thread
pub(crate) struct DrawerContext {
    pub(crate) mailbox: Arc<FrameMailbox>,
    pub(crate) surface: Arc<FrameSurface>,
    pub(crate) telemetry: Arc<Telemetry>,
    pub(crate) cancel: CancellationToken,
    pub(crate) timeout: Duration,
    pub(crate) window: u32,
}

/// Drawer loop: wait for the newest frame, blit it, request a repaint
///
/// Returns `Ok(())` on cancellation. A blit failure (e.g. unsupported pixel
/// format) ends the loop with that error.
pub(crate) fn run_drawer(ctx: DrawerContext) -> Result<()> {
    let mut fps = FpsSampler::new(ctx.window, Instant::now());

    loop {
        let frame = match ctx.mailbox.take_latest(ctx.timeout, &ctx.cancel) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(Cancelled) => break,
        };

        if let Some(value) = fps.tick(Instant::now()) {
            ctx.telemetry.set_fps(value);
        }

        {
            let mut buffer = ctx.surface.lock();
            blit(&frame, &mut buffer)?;
        }
        ctx.surface.request_repaint();
    }

    log::debug!("Drawer loop exited after {} frames", fps.ticks());
    Ok(())
}

/// Audio loop: play every queued buffer in order and sample the loss rate
pub(crate) fn run_audio(
    queue: &AudioQueue,
    device: &dyn AudioDevice,
    telemetry: &Telemetry,
    cancel: &CancellationToken,
    window: u32,
) {
    let mut lost = AudioLossSampler::new(window);

    for buffer in queue.drain(cancel) {
        let accepted = device.play(buffer.samples(), buffer.channel());
        if let Some(value) = lost.tick(accepted) {
            telemetry.set_lost_sound_frames(value);
        }
    }

    log::debug!("Audio loop exited after {} buffers", lost.submitted());
}

fn spawn_worker<T, F>(name: &'static str, body: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(format!("zx-{}", name))
        .spawn(body)
        .map_err(|source| PipelineError::ThreadSpawn { name, source })
}

fn join_worker(name: &'static str, handle: JoinHandle<()>) {
    if handle.join().is_err() {
        log::error!("{}", PipelineError::WorkerPanicked(name));
    }
}

fn join_drawer(handle: JoinHandle<Result<()>>) {
    match handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::error!("Drawer stopped early: {}", e),
        Err(_) => log::error!("{}", PipelineError::WorkerPanicked("drawer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::SPECTRUM_PALETTE;
    use crate::core::keys::SpectrumKey;
    use crate::frontend::audio::NullAudioDevice;
    use crate::frontend::file_picker::FixedFilePicker;
    use crate::frontend::surface::PixelFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine that idles until cancelled and records key and load calls
    #[derive(Default)]
    struct IdleEmulator {
        keys: Mutex<Vec<(SpectrumKey, bool)>>,
        loads: Mutex<Vec<PathBuf>>,
        dumps: AtomicUsize,
        fail_load: bool,
    }

    impl Emulator for IdleEmulator {
        fn run(
            &self,
            _pacing: &PacingDelay,
            cancel: &CancellationToken,
            _events: &mut dyn EmulatorEvents,
        ) {
            let _ = cancel.signal().recv();
        }

        fn key_down(&self, key: SpectrumKey) {
            self.keys.lock().push((key, true));
        }

        fn key_up(&self, key: SpectrumKey) {
            self.keys.lock().push((key, false));
        }

        fn load(&self, path: &Path) -> Result<()> {
            if self.fail_load {
                return Err(PipelineError::LoadFailed {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                });
            }
            self.loads.lock().push(path.to_path_buf());
            Ok(())
        }

        fn dump(&self) {
            self.dumps.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[derive(Default)]
    struct CountingDevice {
        resets: AtomicUsize,
    }

    impl AudioDevice for CountingDevice {
        fn play(&self, _samples: &[i16], _channel: usize) -> bool {
            true
        }

        fn reset(&self) {
            self.resets.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Accepts all but the first `reject` buffers of every window of 100
    struct LossyDevice {
        played: AtomicUsize,
        reject: usize,
    }

    impl AudioDevice for LossyDevice {
        fn play(&self, _samples: &[i16], _channel: usize) -> bool {
            let n = self.played.fetch_add(1, Ordering::Relaxed);
            n % 100 >= self.reject
        }

        fn reset(&self) {}
    }

    fn small_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.surface.width = 4;
        config.surface.height = 4;
        config.frame_timeout_ms = 10;
        config
    }

    fn frame(sequence: u64) -> Frame {
        Frame::new(sequence, SPECTRUM_PALETTE, 2, 2, vec![1, 2, 3, 4]).unwrap()
    }

    fn drawer_context(
        format: PixelFormat,
        timeout: Duration,
    ) -> (DrawerContext, CancellationToken) {
        let cancel = CancellationToken::new();
        let ctx = DrawerContext {
            mailbox: Arc::new(FrameMailbox::new()),
            surface: Arc::new(FrameSurface::new(
                SurfaceBuffer::new(format, 2, 2, 2),
                Box::new(|| {}),
            )),
            telemetry: Arc::new(Telemetry::new()),
            cancel: cancel.clone(),
            timeout,
            window: 100,
        };
        (ctx, cancel)
    }

    #[test]
    fn test_drawer_keeps_waiting_without_frames() {
        let (ctx, cancel) = drawer_context(PixelFormat::Rgba8888, Duration::from_millis(5));
        let mailbox = Arc::clone(&ctx.mailbox);
        let surface = Arc::clone(&ctx.surface);
        let handle = thread::spawn(move || run_drawer(ctx));

        // Several timeouts pass with nothing to draw
        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());
        assert_eq!(surface.repaint_count(), 0);

        mailbox.publish(frame(1));
        let deadline = Instant::now() + Duration::from_secs(5);
        while surface.repaint_count() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(surface.repaint_count(), 1);

        cancel.cancel();
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn test_drawer_fails_on_unsupported_format() {
        let (ctx, _cancel) = drawer_context(PixelFormat::Rgb565, Duration::from_secs(5));
        ctx.mailbox.publish(frame(1));

        let result = run_drawer(ctx);
        assert!(matches!(
            result,
            Err(PipelineError::UnsupportedPixelFormat(PixelFormat::Rgb565))
        ));
    }

    #[test]
    fn test_drawer_exits_on_cancel() {
        let (ctx, cancel) = drawer_context(PixelFormat::Rgba8888, Duration::from_secs(60));
        cancel.cancel();
        assert!(run_drawer(ctx).is_ok());
    }

    #[test]
    fn test_audio_loop_reports_lost_buffers() {
        let queue = AudioQueue::new();
        let telemetry = Telemetry::new();
        let cancel = CancellationToken::new();
        let device = LossyDevice {
            played: AtomicUsize::new(0),
            reject: 3,
        };

        for _ in 0..100 {
            queue.push(AudioBuffer::new(0, vec![0; 4])).unwrap();
        }
        queue.close();

        run_audio(&queue, &device, &telemetry, &cancel, 100);

        assert_eq!(telemetry.lost_sound_frames(), Some(3));
        assert_eq!(telemetry.lost_sound_frames_text().as_deref(), Some("SND:003"));
        assert_eq!(device.played.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_start_and_stop_twice() {
        let parts = PipelineParts::new(
            Arc::new(IdleEmulator::default()),
            Arc::new(NullAudioDevice),
        );
        let pipeline = PipelineController::start(&small_config(), parts).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Running);

        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);

        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        assert!(!pipeline.is_running());
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let mut config = small_config();
        config.telemetry_window = 0;
        let parts = PipelineParts::new(
            Arc::new(IdleEmulator::default()),
            Arc::new(NullAudioDevice),
        );

        assert!(matches!(
            PipelineController::start(&config, parts),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_key_forwarding_expands_chords() {
        let emulator = Arc::new(IdleEmulator::default());
        let parts = PipelineParts::new(emulator.clone(), Arc::new(NullAudioDevice));
        let pipeline = PipelineController::start(&small_config(), parts).unwrap();

        pipeline.key_down(KeyCode::ArrowLeft);
        pipeline.key_up(KeyCode::ArrowLeft);
        pipeline.key_down(KeyCode::F12);
        pipeline.stop();

        assert_eq!(
            *emulator.keys.lock(),
            vec![
                (SpectrumKey::CapsShift, true),
                (SpectrumKey::Key5, true),
                (SpectrumKey::CapsShift, false),
                (SpectrumKey::Key5, false),
            ]
        );
    }

    #[test]
    fn test_load_resets_audio_device() {
        let emulator = Arc::new(IdleEmulator::default());
        let device = Arc::new(CountingDevice::default());
        let parts = PipelineParts::new(emulator.clone(), device.clone())
            .with_file_picker(Box::new(FixedFilePicker::new(Some(PathBuf::from("game.z80")))));
        let pipeline = PipelineController::start(&small_config(), parts).unwrap();

        let loaded = pollster::block_on(pipeline.load()).unwrap();

        assert_eq!(loaded, Some(PathBuf::from("game.z80")));
        assert_eq!(*emulator.loads.lock(), vec![PathBuf::from("game.z80")]);
        assert_eq!(device.resets.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_cancelled_pick_does_nothing() {
        let emulator = Arc::new(IdleEmulator::default());
        let device = Arc::new(CountingDevice::default());
        let parts = PipelineParts::new(emulator.clone(), device.clone())
            .with_file_picker(Box::new(FixedFilePicker::default()));
        let pipeline = PipelineController::start(&small_config(), parts).unwrap();

        assert_eq!(pollster::block_on(pipeline.load()).unwrap(), None);
        assert!(emulator.loads.lock().is_empty());
        assert_eq!(device.resets.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_failed_load_keeps_device_state() {
        let emulator = Arc::new(IdleEmulator {
            fail_load: true,
            ..Default::default()
        });
        let device = Arc::new(CountingDevice::default());
        let parts = PipelineParts::new(emulator, device.clone());
        let pipeline = PipelineController::start(&small_config(), parts).unwrap();

        assert!(pipeline.load_path(Path::new("bad.tap")).is_err());
        assert_eq!(device.resets.load(Ordering::Relaxed), 0);
        assert!(pipeline.is_running());
    }

    #[test]
    fn test_delay_and_dump() {
        let emulator = Arc::new(IdleEmulator::default());
        let parts = PipelineParts::new(emulator.clone(), Arc::new(NullAudioDevice));
        let pipeline = PipelineController::start(&small_config(), parts).unwrap();

        assert_eq!(pipeline.delay(), 10);
        pipeline.set_delay(2);
        assert_eq!(pipeline.delay(), 2);

        pipeline.dump();
        assert_eq!(emulator.dumps.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_stop_releases_audio_device() {
        let device = Arc::new(CountingDevice::default());
        let parts = PipelineParts::new(Arc::new(IdleEmulator::default()), device.clone());
        let pipeline = PipelineController::start(&small_config(), parts).unwrap();
        assert!(Arc::strong_count(&device) > 1);

        pipeline.stop();
        assert_eq!(Arc::strong_count(&device), 1);
    }
}
