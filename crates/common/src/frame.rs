//! The per-tick video+audio data carrier.
//!
//! A `VideoFrame` is produced once per tick by a producer and flows
//! unchanged through the stage to the mixer and the consumers. Frames are
//! single-assignment: the `with_*` builders return a new frame sharing the
//! image payload, and compositing aggregates inputs into a new frame
//! instead of mutating them.

use std::sync::Arc;

use crate::format::FormatDesc;
use crate::types::Resolution;

/// Texture coordinate window, GL orientation: `top = 1`, `bottom = 0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// The identity window covering the whole image.
    pub const UNIT: Self = Self {
        left: 0.0,
        top: 1.0,
        right: 1.0,
        bottom: 0.0,
    };

    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_unit(&self) -> bool {
        *self == Self::UNIT
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::UNIT
    }
}

/// RGBA8 image payload, shared between the frames derived from it.
///
/// Stands in for an opaque GPU texture handle: producers write it once
/// through [`data_mut`](Self::data_mut) while uniquely owned, everything
/// downstream only reads it.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    resolution: Resolution,
    data: Arc<Vec<u8>>,
}

impl ImageBuffer {
    /// A zeroed (black, transparent-alpha-zero) image.
    pub fn blank(resolution: Resolution) -> Self {
        Self {
            resolution,
            data: Arc::new(vec![0; resolution.rgba_byte_size()]),
        }
    }

    /// An image filled with a single RGBA color.
    pub fn solid(resolution: Resolution, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(resolution.rgba_byte_size());
        for _ in 0..resolution.pixel_count() {
            data.extend_from_slice(&rgba);
        }
        Self {
            resolution,
            data: Arc::new(data),
        }
    }

    /// Wrap existing RGBA8 pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `data` does not match the resolution's byte size.
    pub fn from_data(resolution: Resolution, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            resolution.rgba_byte_size(),
            "pixel data does not match resolution"
        );
        Self {
            resolution,
            data: Arc::new(data),
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Writable pixel access. Copies only if the payload is shared.
    pub fn data_mut(&mut self) -> &mut [u8] {
        let v: &mut Vec<u8> = Arc::make_mut(&mut self.data);
        v.as_mut_slice()
    }
}

impl PartialEq for ImageBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.resolution == other.resolution
            && (Arc::ptr_eq(&self.data, &other.data) || self.data == other.data)
    }
}

/// What a frame carries: a leaf image, or an ordered back-to-front list of
/// child frames for the mixer to flatten.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameContent {
    Image(ImageBuffer),
    Composite(Vec<VideoFrame>),
}

/// An immutable produced video+audio unit with the geometry and alpha
/// attributes the mixer honors.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    content: FrameContent,
    /// Interleaved 16-bit signed PCM; length is fixed by the channel format.
    audio: Arc<Vec<i16>>,
    alpha: f64,
    translate: (f64, f64),
    texcoords: Rect,
}

impl VideoFrame {
    pub fn new(image: ImageBuffer, audio: Vec<i16>) -> Self {
        Self {
            content: FrameContent::Image(image),
            audio: Arc::new(audio),
            alpha: 1.0,
            translate: (0.0, 0.0),
            texcoords: Rect::UNIT,
        }
    }

    /// Aggregate child frames back-to-front for the mixer to flatten.
    pub fn composite(children: Vec<VideoFrame>) -> Self {
        Self {
            content: FrameContent::Composite(children),
            audio: Arc::new(Vec::new()),
            alpha: 1.0,
            translate: (0.0, 0.0),
            texcoords: Rect::UNIT,
        }
    }

    /// The black frame of a channel format: zeroed image, silent audio.
    pub fn black(format: &FormatDesc) -> Self {
        Self::new(
            ImageBuffer::blank(format.resolution),
            vec![0; format.audio_samples_per_frame()],
        )
    }

    // ── Attribute builders (single-assignment) ───────────────────────

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_translate(mut self, tx: f64, ty: f64) -> Self {
        self.translate = (tx, ty);
        self
    }

    pub fn with_texcoords(mut self, texcoords: Rect) -> Self {
        self.texcoords = texcoords;
        self
    }

    pub fn with_audio(mut self, audio: Vec<i16>) -> Self {
        self.audio = Arc::new(audio);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn content(&self) -> &FrameContent {
        &self.content
    }

    pub fn image(&self) -> Option<&ImageBuffer> {
        match &self.content {
            FrameContent::Image(image) => Some(image),
            FrameContent::Composite(_) => None,
        }
    }

    /// Writable access to a leaf image payload, for producers filling a
    /// freshly created frame.
    pub fn image_mut(&mut self) -> Option<&mut ImageBuffer> {
        match &mut self.content {
            FrameContent::Image(image) => Some(image),
            FrameContent::Composite(_) => None,
        }
    }

    /// Child frames, back-to-front. Empty for leaf frames.
    pub fn children(&self) -> &[VideoFrame] {
        match &self.content {
            FrameContent::Image(_) => &[],
            FrameContent::Composite(children) => children,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.content, FrameContent::Composite(_))
    }

    pub fn audio(&self) -> &[i16] {
        &self.audio
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    pub fn texcoords(&self) -> Rect {
        self.texcoords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::VideoFormat;

    fn leaf() -> VideoFrame {
        VideoFrame::new(
            ImageBuffer::solid(Resolution::new(4, 4), [10, 20, 30, 255]),
            vec![100; 8],
        )
    }

    #[test]
    fn defaults_are_identity() {
        let frame = leaf();
        assert_eq!(frame.alpha(), 1.0);
        assert_eq!(frame.translate(), (0.0, 0.0));
        assert!(frame.texcoords().is_unit());
        assert!(!frame.is_composite());
    }

    #[test]
    fn builders_share_image_payload() {
        let frame = leaf();
        let shifted = frame.clone().with_translate(-0.5, 0.0).with_alpha(0.25);

        assert_eq!(shifted.translate(), (-0.5, 0.0));
        assert_eq!(shifted.alpha(), 0.25);
        // The original frame is untouched.
        assert_eq!(frame.translate(), (0.0, 0.0));
        assert_eq!(frame.alpha(), 1.0);
        // The payload is the same allocation.
        assert_eq!(frame.image().unwrap(), shifted.image().unwrap());
    }

    #[test]
    fn black_frame_matches_format() {
        let format = FormatDesc::new(VideoFormat::Pal);
        let frame = VideoFrame::black(&format);
        assert_eq!(frame.image().unwrap().resolution(), format.resolution);
        assert_eq!(frame.audio().len(), format.audio_samples_per_frame());
        assert!(frame.audio().iter().all(|&s| s == 0));
        assert!(frame.image().unwrap().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn black_frames_are_byte_identical() {
        let format = FormatDesc::new(VideoFormat::Pal);
        assert_eq!(VideoFrame::black(&format), VideoFrame::black(&format));
    }

    #[test]
    fn composite_holds_children_in_order() {
        let back = leaf();
        let front = leaf().with_alpha(0.5);
        let composite = VideoFrame::composite(vec![back.clone(), front.clone()]);

        assert!(composite.is_composite());
        assert_eq!(composite.children().len(), 2);
        assert_eq!(composite.children()[0], back);
        assert_eq!(composite.children()[1], front);
        assert!(composite.image().is_none());
    }

    #[test]
    fn image_data_mut_copies_on_shared_write() {
        let mut image = ImageBuffer::solid(Resolution::new(2, 2), [1, 2, 3, 4]);
        let original = image.clone();
        image.data_mut()[0] = 99;
        assert_eq!(image.data()[0], 99);
        assert_eq!(original.data()[0], 1);
    }

    #[test]
    #[should_panic(expected = "does not match resolution")]
    fn from_data_rejects_wrong_size() {
        let _ = ImageBuffer::from_data(Resolution::new(2, 2), vec![0; 3]);
    }

    #[test]
    fn unit_rect_is_gl_oriented() {
        let unit = Rect::UNIT;
        assert_eq!(unit.left, 0.0);
        assert_eq!(unit.top, 1.0);
        assert_eq!(unit.right, 1.0);
        assert_eq!(unit.bottom, 0.0);
    }
}
