//! The producer capability set.
//!
//! Everything the stage knows about a frame source is this trait. Concrete
//! producers (file, image, scene, ...) are registered by the surrounding
//! layer; the in-core ones are `empty`, `color`, and the transition.

use std::sync::Arc;

use fc_common::{FormatDesc, FrameFactory, ProducerError, VideoFrame};

/// Result of asking a producer for its next frame.
///
/// Exhaustion is not an error: it is the producer's normal way of saying
/// "no more frames", and triggers auto-advance or repeat-last in the
/// stage. Failures are carried in the `Err` arm of the surrounding
/// `Result` and absorbed by the stage's failure barrier.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutcome {
    Frame(VideoFrame),
    Exhausted,
}

impl RenderOutcome {
    pub fn into_frame(self) -> Option<VideoFrame> {
        match self {
            Self::Frame(frame) => Some(frame),
            Self::Exhausted => None,
        }
    }
}

/// A pull-mode source of frames for a channel.
///
/// Contract per tick: `render_frame` is called at most once, in tick
/// order, and must not block longer than one frame interval in steady
/// state. `initialize` and `set_leading_producer` are ordered strictly
/// before the first `render_frame` in a producer's current role.
pub trait FrameProducer: Send {
    /// Short name for diagnostics (`"empty"`, `"color"`, `"transition"`).
    fn name(&self) -> &str;

    /// The channel format this producer renders for.
    fn format(&self) -> &FormatDesc;

    /// Late-bind the frame factory. Called once before the first
    /// `render_frame` in each role the producer takes.
    fn initialize(&mut self, _factory: Arc<dyn FrameFactory>) -> Result<(), ProducerError> {
        Ok(())
    }

    /// Produce the next frame, signal exhaustion, or fail.
    fn render_frame(&mut self) -> Result<RenderOutcome, ProducerError>;

    /// Move out the producer this one hands over to on exhaustion.
    /// Absent by default: exhaustion without a following producer makes
    /// the stage repeat the last emitted frame.
    fn take_following(&mut self) -> Option<BoxedProducer> {
        None
    }

    /// Advisory back-reference to the producer being retired in favor of
    /// this one. The default drops it; the transition producer stores it
    /// as its outgoing side. Ownership transfer keeps the producer graph
    /// acyclic.
    fn set_leading_producer(&mut self, _leading: BoxedProducer) {}
}

pub type BoxedProducer = Box<dyn FrameProducer>;

#[cfg(test)]
mod tests {
    use super::*;
    use fc_common::{ImageBuffer, Resolution, VideoFormat};

    struct OneShot {
        format: FormatDesc,
        fired: bool,
    }

    impl FrameProducer for OneShot {
        fn name(&self) -> &str {
            "one-shot"
        }

        fn format(&self) -> &FormatDesc {
            &self.format
        }

        fn render_frame(&mut self) -> Result<RenderOutcome, ProducerError> {
            if self.fired {
                return Ok(RenderOutcome::Exhausted);
            }
            self.fired = true;
            Ok(RenderOutcome::Frame(VideoFrame::new(
                ImageBuffer::blank(Resolution::new(2, 2)),
                vec![0; 4],
            )))
        }
    }

    #[test]
    fn default_capability_set() {
        let mut producer = OneShot {
            format: FormatDesc::new(VideoFormat::Pal),
            fired: false,
        };
        assert!(producer.take_following().is_none());

        let outcome = producer.render_frame().unwrap();
        assert!(outcome.into_frame().is_some());
        assert_eq!(producer.render_frame().unwrap(), RenderOutcome::Exhausted);
    }

    #[test]
    fn exhausted_into_frame_is_none() {
        assert!(RenderOutcome::Exhausted.into_frame().is_none());
    }
}
