//! Lock-Free Frame Intake Buffer
//!
//! SPSC ring buffer connecting the pose-engine callback thread (producer) to
//! the analysis loop (consumer). The producer never blocks: when the analysis
//! loop falls behind, new frames are dropped and counted. Dropping is safe
//! because the analysis tick is rate-limited; only the freshest frame inside
//! each analysis window is ever looked at.

use super::LandmarkFrame;
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default frame buffer capacity (must be a power of 2).
pub const DEFAULT_CAPACITY: usize = 256;

/// Frame buffer statistics for monitoring.
#[derive(Debug, Default)]
pub struct FrameBufferStats {
    /// Total frames pushed by the pose engine
    pub frames_pushed: AtomicU64,
    /// Frames dropped due to a full buffer
    pub frames_dropped: AtomicU64,
    /// Frames consumed by the analysis loop
    pub frames_consumed: AtomicU64,
}

/// Lock-free ring buffer for landmark frames.
pub struct FrameRingBuffer {
    producer: Option<Producer<LandmarkFrame>>,
    consumer: Option<Consumer<LandmarkFrame>>,
    stats: Arc<FrameBufferStats>,
}

impl FrameRingBuffer {
    /// Create a buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a buffer with the given capacity.
    ///
    /// # Panics
    /// Panics if capacity is not a power of 2.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "Frame buffer capacity must be a power of 2"
        );
        let (producer, consumer) = RingBuffer::new(capacity);
        Self {
            producer: Some(producer),
            consumer: Some(consumer),
            stats: Arc::new(FrameBufferStats::default()),
        }
    }

    /// Split into producer and consumer halves.
    ///
    /// Called once: the producer goes to the pose-engine callback, the
    /// consumer to the analysis loop.
    pub fn split(mut self) -> (FrameProducer, FrameConsumer) {
        let producer = self.producer.take().expect("Producer already taken");
        let consumer = self.consumer.take().expect("Consumer already taken");
        (
            FrameProducer {
                inner: producer,
                stats: Arc::clone(&self.stats),
            },
            FrameConsumer {
                inner: consumer,
                stats: Arc::clone(&self.stats),
            },
        )
    }

    /// Get a handle to the statistics.
    pub fn stats(&self) -> Arc<FrameBufferStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for FrameRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half (pose-engine callback thread).
pub struct FrameProducer {
    inner: Producer<LandmarkFrame>,
    stats: Arc<FrameBufferStats>,
}

impl FrameProducer {
    /// Whether at least one slot is free.
    #[inline]
    pub fn has_capacity(&self) -> bool {
        self.inner.slots() > 0
    }

    /// Push a frame. Lock-free, never blocks.
    ///
    /// Returns true if stored, false if the buffer was full and the frame
    /// was dropped.
    #[inline]
    pub fn push(&mut self, frame: LandmarkFrame) -> bool {
        match self.inner.push(frame) {
            Ok(()) => {
                self.stats.frames_pushed.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

/// Consumer half (analysis loop).
pub struct FrameConsumer {
    inner: Consumer<LandmarkFrame>,
    stats: Arc<FrameBufferStats>,
}

impl FrameConsumer {
    /// Pop a single frame, if one is available.
    #[inline]
    pub fn pop(&mut self) -> Option<LandmarkFrame> {
        match self.inner.pop() {
            Ok(frame) => {
                self.stats.frames_consumed.fetch_add(1, Ordering::Relaxed);
                Some(frame)
            }
            Err(_) => None,
        }
    }

    /// Drain up to `max` frames.
    pub fn pop_batch(&mut self, max: usize) -> Vec<LandmarkFrame> {
        let mut batch = Vec::with_capacity(max.min(32));
        while batch.len() < max {
            match self.pop() {
                Some(frame) => batch.push(frame),
                None => break,
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimestampMs;

    fn frame(ts: u64) -> LandmarkFrame {
        LandmarkFrame::empty(TimestampMs::from_millis(ts))
    }

    #[test]
    fn test_push_pop_preserves_order() {
        let buffer = FrameRingBuffer::with_capacity(8);
        let (mut producer, mut consumer) = buffer.split();

        for i in 0..5 {
            assert!(producer.push(frame(i * 100)));
        }

        for i in 0..5 {
            let f = consumer.pop().expect("frame present");
            assert_eq!(f.timestamp_ms.as_millis(), i * 100);
        }
        assert!(consumer.pop().is_none());
    }

    #[test]
    fn test_full_buffer_drops_and_counts() {
        let buffer = FrameRingBuffer::with_capacity(4);
        let stats = buffer.stats();
        let (mut producer, _consumer) = buffer.split();

        for i in 0..6 {
            producer.push(frame(i));
        }

        assert_eq!(stats.frames_pushed.load(Ordering::Relaxed), 4);
        assert_eq!(stats.frames_dropped.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_pop_batch_limits() {
        let buffer = FrameRingBuffer::with_capacity(16);
        let stats = buffer.stats();
        let (mut producer, mut consumer) = buffer.split();

        for i in 0..10 {
            producer.push(frame(i));
        }

        let batch = consumer.pop_batch(4);
        assert_eq!(batch.len(), 4);
        let rest = consumer.pop_batch(100);
        assert_eq!(rest.len(), 6);
        assert_eq!(stats.frames_consumed.load(Ordering::Relaxed), 10);
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_non_power_of_two_capacity_panics() {
        let _ = FrameRingBuffer::with_capacity(100);
    }

    #[test]
    fn test_cross_thread_flow() {
        let buffer = FrameRingBuffer::with_capacity(64);
        let (mut producer, mut consumer) = buffer.split();

        let handle = std::thread::spawn(move || {
            for i in 0..50 {
                while !producer.push(frame(i)) {
                    std::thread::yield_now();
                }
            }
        });

        let mut seen = 0;
        while seen < 50 {
            if consumer.pop().is_some() {
                seen += 1;
            } else {
                std::thread::yield_now();
            }
        }
        handle.join().unwrap();
        assert_eq!(seen, 50);
    }
}
