use ringbuffer::{AllocRingBuffer, RingBuffer};

use crate::state::Snapshot;

/// The last few frames of a session, newest last. Written by the loop after
/// each tick, read only by exporters.
pub struct History {
    frames: AllocRingBuffer<Snapshot>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        History { frames: AllocRingBuffer::new(capacity.max(1)) }
    }

    pub fn push(&mut self, frame: Snapshot) {
        self.frames.enqueue(frame);
    }

    /// `steps_back(0)` is the newest frame, `steps_back(1)` the one before.
    pub fn steps_back(&self, steps: usize) -> Option<&Snapshot> {
        self.frames.iter().rev().nth(steps)
    }

    /// The oldest frame still held.
    pub fn oldest(&self) -> Option<&Snapshot> {
        self.frames.iter().next()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
