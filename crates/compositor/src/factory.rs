//! CPU frame allocation.

use fc_common::{FormatDesc, FrameFactory, FrameTag, ImageBuffer, PixelDesc, VideoFrame};

/// Allocates blank CPU-backed frames for one channel format.
///
/// The `FrameTag` pooling hint is accepted but unused: CPU allocation is
/// cheap enough that frames are built fresh each call.
pub struct SoftwareFrameFactory {
    format: FormatDesc,
}

impl SoftwareFrameFactory {
    pub fn new(format: FormatDesc) -> Self {
        Self { format }
    }
}

impl FrameFactory for SoftwareFrameFactory {
    fn create_frame(&self, _tag: FrameTag, desc: &PixelDesc) -> VideoFrame {
        VideoFrame::new(
            ImageBuffer::blank(desc.resolution),
            vec![0; self.format.audio_samples_per_frame()],
        )
    }

    fn format(&self) -> &FormatDesc {
        &self.format
    }
}
