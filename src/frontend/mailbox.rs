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

//! Latest-wins frame mailbox
//!
//! A single slot holding the most recently published [`Frame`]. Publishing
//! never blocks and replaces any frame the drawer has not taken yet, so the
//! drawer always sees the newest frame and skips the ones it was too slow for.
//!
//! The slot is an atomic pointer exchanged with a single `swap`. A
//! capacity-one channel acts as a binary wake hint: a burst of publishes
//! collapses into one wake, and the reader always re-checks the slot rather
//! than trusting the hint.

use crate::core::cancel::{CancellationToken, Cancelled};
use crate::core::frame::Frame;
use crossbeam_channel::{select, Receiver, Sender};
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::time::{Duration, Instant};

/// Default bound on a single `take_latest` wait
pub const DEFAULT_TAKE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Single-slot, overwrite-on-publish frame handoff
///
/// Supports any number of publishers and one reader.
pub struct FrameMailbox {
    /// Owned `Box<Frame>` or null
    slot: AtomicPtr<Frame>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl FrameMailbox {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = crossbeam_channel::bounded(1);
        Self {
            slot: AtomicPtr::new(ptr::null_mut()),
            wake_tx,
            wake_rx,
        }
    }

    /// Publish a frame, discarding any unread predecessor
    ///
    /// Never blocks.
    pub fn publish(&self, frame: Frame) {
        let fresh = Box::into_raw(Box::new(frame));
        let stale = self.slot.swap(fresh, Ordering::AcqRel);
        if !stale.is_null() {
            log::trace!("Dropping undrawn frame");
            // SAFETY: a non-null slot value always comes from `Box::into_raw`
            // and the swap made us its only owner.
            drop(unsafe { Box::from_raw(stale) });
        }
        // Full means a wake is already pending
        let _ = self.wake_tx.try_send(());
    }

    /// Take the pending frame without waiting
    pub fn try_take(&self) -> Option<Frame> {
        let taken = self.slot.swap(ptr::null_mut(), Ordering::AcqRel);
        if taken.is_null() {
            None
        } else {
            // SAFETY: see `publish`
            Some(*unsafe { Box::from_raw(taken) })
        }
    }

    /// Wait for a frame published since the previous take
    ///
    /// # Arguments
    ///
    /// * `timeout` - Upper bound on the wait
    /// * `cancel` - Aborts the wait when signaled
    ///
    /// # Returns
    ///
    /// - `Ok(Some(frame))` with the newest frame
    /// - `Ok(None)` if the timeout elapsed with nothing to draw
    /// - `Err(Cancelled)` if cancellation was signaled
    pub fn take_latest(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<Frame>, Cancelled> {
        let deadline = Instant::now() + timeout;

        loop {
            cancel.check()?;

            if let Some(frame) = self.try_take() {
                return Ok(Some(frame));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            select! {
                // Hint only: the slot may already be empty again
                recv(self.wake_rx) -> _ => continue,
                recv(cancel.signal()) -> _ => return Err(Cancelled),
                default(remaining) => return Ok(self.try_take()),
            }
        }
    }

    /// Whether a frame is waiting to be taken
    pub fn has_pending(&self) -> bool {
        !self.slot.load(Ordering::Acquire).is_null()
    }

    /// Drop any pending frame and wake hint
    pub fn clear(&self) {
        drop(self.try_take());
        while self.wake_rx.try_recv().is_ok() {}
    }
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FrameMailbox {
    fn drop(&mut self) {
        drop(self.try_take());
    }
}
