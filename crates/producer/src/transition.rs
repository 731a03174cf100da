//! Timed transition between an outgoing and an incoming producer.
//!
//! The transition producer is itself a producer: it wraps the incoming
//! `dest` (required) and the outgoing `source` (handed over by the stage
//! via `set_leading_producer` at swap time), renders both concurrently
//! each tick, and composes them according to the transition type. After
//! `duration` frames it exhausts and the stage advances to `dest` through
//! the normal following-producer mechanism.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use fc_common::audio::{scale_volume, UNITY_VOLUME};
use fc_common::{FormatDesc, FrameFactory, ProducerError, Rect, VideoFrame};

use crate::producer::{BoxedProducer, FrameProducer, RenderOutcome};

/// How many times a child slot may auto-advance to its following producer
/// within a single tick. Keeps a chain of zero-frame producers from
/// blowing the frame deadline.
const MAX_CHILD_ADVANCES: usize = 8;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionType {
    #[default]
    Cut,
    Mix,
    Slide,
    Push,
    Wipe,
}

/// Only slide, push, and wipe are directional.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionDirection {
    #[default]
    FromLeft,
    FromRight,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionInfo {
    pub transition_type: TransitionType,
    pub direction: TransitionDirection,
    /// Length of the transition in frames. Must be positive.
    pub duration: u32,
}

impl TransitionInfo {
    pub fn new(transition_type: TransitionType, duration: u32) -> Self {
        Self {
            transition_type,
            direction: TransitionDirection::default(),
            duration,
        }
    }

    pub fn with_direction(mut self, direction: TransitionDirection) -> Self {
        self.direction = direction;
        self
    }
}

pub struct TransitionProducer {
    dest: Option<BoxedProducer>,
    source: Option<BoxedProducer>,
    info: TransitionInfo,
    format: FormatDesc,
    current_frame: u32,
    factory: Option<Arc<dyn FrameFactory>>,
}

impl TransitionProducer {
    /// A transition needs its incoming side up front; the outgoing side
    /// arrives later via `set_leading_producer`.
    pub fn new(
        dest: Option<BoxedProducer>,
        info: TransitionInfo,
        format: FormatDesc,
    ) -> Result<Self, ProducerError> {
        let dest = dest.ok_or_else(|| {
            ProducerError::invalid_argument("transition requires a dest producer")
        })?;
        if info.duration == 0 {
            return Err(ProducerError::invalid_argument(
                "transition duration must be > 0",
            ));
        }
        Ok(Self {
            dest: Some(dest),
            source: None,
            info,
            format,
            current_frame: 0,
            factory: None,
        })
    }

    pub fn info(&self) -> TransitionInfo {
        self.info
    }

    /// Compose the non-cut transition types; cut returns the source frame
    /// from `render_frame` without ever composing.
    fn compose(
        &self,
        dest: Option<VideoFrame>,
        source: Option<VideoFrame>,
        progress: f64,
    ) -> RenderOutcome {
        debug_assert_ne!(self.info.transition_type, TransitionType::Cut);
        let Some(dest) = dest else {
            return RenderOutcome::Exhausted;
        };

        let volume = (progress * 256.0) as i32;
        let dest_audio = scale_volume(dest.audio(), volume);
        let dest = dest.with_audio(dest_audio);
        let source = source.map(|frame| {
            let audio = scale_volume(frame.audio(), UNITY_VOLUME - volume);
            frame.with_audio(audio)
        });

        let slide = slide_offset(self.info.direction, progress);
        let (dest, source) = match self.info.transition_type {
            TransitionType::Cut => unreachable!("cut exhausts before composing"),
            TransitionType::Mix => (dest.with_alpha(progress), source),
            TransitionType::Slide => (dest.with_translate(slide, 0.0), source),
            TransitionType::Push => (
                dest.with_translate(slide, 0.0),
                source.map(|frame| {
                    frame.with_translate(push_offset(self.info.direction, progress), 0.0)
                }),
            ),
            TransitionType::Wipe => (
                dest.with_translate(slide, 0.0)
                    .with_texcoords(wipe_window(self.info.direction, progress)),
                source,
            ),
        };

        let mut children = Vec::with_capacity(2);
        if let Some(source) = source {
            children.push(source);
        }
        children.push(dest);
        RenderOutcome::Frame(VideoFrame::composite(children))
    }
}

impl FrameProducer for TransitionProducer {
    fn name(&self) -> &str {
        "transition"
    }

    fn format(&self) -> &FormatDesc {
        &self.format
    }

    fn initialize(&mut self, factory: Arc<dyn FrameFactory>) -> Result<(), ProducerError> {
        if let Some(dest) = self.dest.as_mut() {
            dest.initialize(Arc::clone(&factory))?;
        }
        self.factory = Some(factory);
        Ok(())
    }

    fn render_frame(&mut self) -> Result<RenderOutcome, ProducerError> {
        if self.current_frame >= self.info.duration {
            return Ok(RenderOutcome::Exhausted);
        }

        // Progress uses the pre-increment count so that frame k of a
        // duration-D transition blends at exactly k/D.
        let progress = self.current_frame as f64 / self.info.duration as f64;
        self.current_frame += 1;

        if self.info.transition_type == TransitionType::Cut {
            // A cut shows the outgoing side for one frame and exhausts,
            // leaving dest untouched so it starts from its first frame.
            self.current_frame = self.info.duration;
            return Ok(match render_child(&mut self.source, self.factory.as_ref()) {
                Some(frame) => RenderOutcome::Frame(frame),
                None => RenderOutcome::Exhausted,
            });
        }

        let Self {
            dest,
            source,
            factory,
            ..
        } = self;
        let factory = factory.clone();
        let (dest_frame, source_frame) = rayon::join(
            || render_child(dest, factory.as_ref()),
            || render_child(source, factory.as_ref()),
        );

        Ok(self.compose(dest_frame, source_frame, progress))
    }

    fn take_following(&mut self) -> Option<BoxedProducer> {
        self.dest.take()
    }

    fn set_leading_producer(&mut self, leading: BoxedProducer) {
        self.source = Some(leading);
    }
}

/// Render one child slot behind a failure barrier.
///
/// A failing child is detached from the transition; an exhausted child
/// auto-advances to its own following producer. Either way the transition
/// keeps running with whatever is left.
fn render_child(
    slot: &mut Option<BoxedProducer>,
    factory: Option<&Arc<dyn FrameFactory>>,
) -> Option<VideoFrame> {
    for _ in 0..=MAX_CHILD_ADVANCES {
        let producer = slot.as_mut()?;
        match producer.render_frame() {
            Ok(RenderOutcome::Frame(frame)) => return Some(frame),
            Ok(RenderOutcome::Exhausted) => {
                let Some(mut following) = producer.take_following() else {
                    return None;
                };
                if let Some(factory) = factory {
                    if let Err(error) = following.initialize(Arc::clone(factory)) {
                        warn!(producer = following.name(), error = %error, "Removed producer from transition");
                        *slot = None;
                        return None;
                    }
                }
                if let Some(exhausted) = slot.take() {
                    following.set_leading_producer(exhausted);
                }
                *slot = Some(following);
            }
            Err(error) => {
                warn!(producer = producer.name(), error = %error, "Removed producer from transition");
                *slot = None;
                return None;
            }
        }
    }
    None
}

fn slide_offset(direction: TransitionDirection, progress: f64) -> f64 {
    match direction {
        TransitionDirection::FromLeft => -1.0 + progress,
        TransitionDirection::FromRight => 1.0 - progress,
    }
}

fn push_offset(direction: TransitionDirection, progress: f64) -> f64 {
    match direction {
        TransitionDirection::FromLeft => progress,
        TransitionDirection::FromRight => -progress,
    }
}

fn wipe_window(direction: TransitionDirection, progress: f64) -> Rect {
    match direction {
        TransitionDirection::FromLeft => Rect::new(-1.0 + progress, 1.0, progress, 0.0),
        TransitionDirection::FromRight => Rect::new(1.0 - progress, 1.0, 2.0 - progress, 0.0),
    }
}
