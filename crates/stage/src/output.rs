//! The channel's consumer side.
//!
//! Consumers receive every flattened output frame in registration order.
//! A consumer that fails is removed from the set and logged; the rest of
//! the chain keeps receiving frames.

use tracing::warn;

use fc_common::{ChannelError, VideoFrame};

/// A sink for rendered frames (device output, file writer, audio out).
pub trait FrameConsumer: Send {
    /// Short name for diagnostics.
    fn name(&self) -> &str;

    /// Deliver one frame. Must not block longer than one frame interval.
    fn send(&mut self, frame: &VideoFrame) -> Result<(), ChannelError>;
}

/// Ordered set of consumers attached to one channel.
#[derive(Default)]
pub struct ConsumerSet {
    consumers: Vec<Box<dyn FrameConsumer>>,
}

impl ConsumerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, consumer: Box<dyn FrameConsumer>) {
        self.consumers.push(consumer);
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// Deliver `frame` to every consumer in order. Consumers that fail
    /// are dropped from the set. Returns the number of successful
    /// deliveries.
    pub fn publish(&mut self, frame: &VideoFrame) -> usize {
        self.consumers.retain_mut(|consumer| {
            match consumer.send(frame) {
                Ok(()) => true,
                Err(error) => {
                    warn!(consumer = consumer.name(), error = %error,
                        "Removed consumer after send failure");
                    false
                }
            }
        });
        self.consumers.len()
    }
}
