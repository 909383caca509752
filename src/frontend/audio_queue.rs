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

//! Closable unbounded audio queue
//!
//! The emulation thread pushes [`AudioBuffer`]s without ever blocking; the
//! audio thread consumes them in order through [`AudioQueue::drain`]. Nothing
//! is dropped: once the queue is closed the consumer still receives every
//! buffer pushed before the close, then the iteration ends.
//!
//! Backed by an unbounded `crossbeam_channel`. The queue owns the only
//! sender, so closing it is just dropping that sender.

use crate::core::cancel::CancellationToken;
use crate::core::error::{PipelineError, Result};
use crate::core::frame::AudioBuffer;
use crossbeam_channel::{select, Receiver, Sender};
use parking_lot::RwLock;

pub struct AudioQueue {
    sender: RwLock<Option<Sender<AudioBuffer>>>,
    receiver: Receiver<AudioBuffer>,
}

impl AudioQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender: RwLock::new(Some(sender)),
            receiver,
        }
    }

    /// Enqueue a buffer
    ///
    /// Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::QueueClosed`] after [`close`](Self::close).
    pub fn push(&self, buffer: AudioBuffer) -> Result<()> {
        match self.sender.read().as_ref() {
            Some(sender) => sender.send(buffer).map_err(|_| PipelineError::QueueClosed),
            None => Err(PipelineError::QueueClosed),
        }
    }

    /// Mark the end of the stream
    ///
    /// Idempotent. Returns `true` if this call closed the queue.
    pub fn close(&self) -> bool {
        self.sender.write().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Number of buffers waiting to be consumed
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Consume buffers in FIFO order
    ///
    /// The iterator blocks while the queue is empty and open. It ends once the
    /// queue is closed and drained, or as soon as `cancel` is signaled.
    pub fn drain<'a>(&'a self, cancel: &'a CancellationToken) -> Drain<'a> {
        Drain {
            receiver: &self.receiver,
            cancel,
        }
    }

    /// Discard everything still queued
    pub fn clear(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

impl Default for AudioQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocking consumer returned by [`AudioQueue::drain`]
pub struct Drain<'a> {
    receiver: &'a Receiver<AudioBuffer>,
    cancel: &'a CancellationToken,
}

impl Iterator for Drain<'_> {
    type Item = AudioBuffer;

    fn next(&mut self) -> Option<AudioBuffer> {
        if self.cancel.is_cancelled() {
            return None;
        }

        select! {
            // Err means closed and drained
            recv(self.receiver) -> buffer => buffer.ok(),
            recv(self.cancel.signal()) -> _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn buffer(n: i16) -> AudioBuffer {
        AudioBuffer::new(0, vec![n])
    }

    #[test]
    fn test_push_close_drain_in_order() {
        let queue = AudioQueue::new();
        let cancel = CancellationToken::new();

        for n in 0..10 {
            queue.push(buffer(n)).unwrap();
        }
        assert_eq!(queue.len(), 10);
        assert!(queue.close());

        let drained: Vec<i16> = queue.drain(&cancel).map(|b| b.samples()[0]).collect();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_close_is_idempotent() {
        let queue = AudioQueue::new();
        assert!(queue.close());
        assert!(!queue.close());
        assert!(queue.is_closed());
    }

    #[test]
    fn test_push_after_close_fails() {
        let queue = AudioQueue::new();
        queue.close();
        assert!(matches!(
            queue.push(buffer(1)),
            Err(PipelineError::QueueClosed)
        ));
    }

    #[test]
    fn test_drain_stops_on_cancel_while_blocked() {
        let queue = Arc::new(AudioQueue::new());
        let cancel = CancellationToken::new();

        let consumer = {
            let queue = Arc::clone(&queue);
            let cancel = cancel.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let count = queue.drain(&cancel).count();
                (count, start.elapsed())
            })
        };

        queue.push(buffer(1)).unwrap();
        thread::sleep(Duration::from_millis(30));
        cancel.cancel();

        let (count, elapsed) = consumer.join().unwrap();
        assert_eq!(count, 1);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_drain_yields_nothing_once_cancelled() {
        let queue = AudioQueue::new();
        let cancel = CancellationToken::new();
        queue.push(buffer(1)).unwrap();
        cancel.cancel();

        assert_eq!(queue.drain(&cancel).count(), 0);
    }

    #[test]
    fn test_concurrent_producer_delivers_everything() {
        let queue = Arc::new(AudioQueue::new());
        let cancel = CancellationToken::new();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for n in 0..1000 {
                    queue.push(buffer(n)).unwrap();
                }
                queue.close();
            })
        };

        let drained: Vec<i16> = queue.drain(&cancel).map(|b| b.samples()[0]).collect();
        producer.join().unwrap();

        assert_eq!(drained, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_clear_empties_queue() {
        let queue = AudioQueue::new();
        queue.push(buffer(1)).unwrap();
        queue.push(buffer(2)).unwrap();
        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }
}
