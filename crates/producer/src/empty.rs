//! The empty producer: a black frame every tick, forever.
//!
//! Every channel starts on it, `stop()` returns to it, and the stage falls
//! back to it when a failed producer has no replacement. It never exhausts
//! and never fails.

use fc_common::{FormatDesc, ProducerError, VideoFrame};

use crate::producer::{BoxedProducer, FrameProducer, RenderOutcome};

pub struct EmptyProducer {
    format: FormatDesc,
    frame: VideoFrame,
}

impl EmptyProducer {
    pub fn new(format: FormatDesc) -> Self {
        let frame = VideoFrame::black(&format);
        Self { format, frame }
    }

    pub fn boxed(format: FormatDesc) -> BoxedProducer {
        Box::new(Self::new(format))
    }
}

impl FrameProducer for EmptyProducer {
    fn name(&self) -> &str {
        "empty"
    }

    fn format(&self) -> &FormatDesc {
        &self.format
    }

    fn render_frame(&mut self) -> Result<RenderOutcome, ProducerError> {
        Ok(RenderOutcome::Frame(self.frame.clone()))
    }
}
