//! The per-channel producer state machine.
//!
//! The stage holds exactly one current producer at all times (the empty
//! producer when idle), stages pending swaps from `load`, promotes them on
//! `play` (optionally wrapped in a transition), and produces exactly one
//! frame per `tick`. `tick` is total: producer failures and exhaustion are
//! absorbed into auto-advance or repeat-last and never reach the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use fc_common::{ChannelId, FormatDesc, FrameFactory, ProducerError, VideoFrame};
use fc_producer::{
    BoxedProducer, EmptyProducer, FrameProducer, RenderOutcome, TransitionInfo, TransitionProducer,
};

struct PendingLoad {
    producer: BoxedProducer,
    transition: Option<TransitionInfo>,
}

pub struct Stage {
    index: ChannelId,
    format: FormatDesc,
    factory: Arc<dyn FrameFactory>,
    current: BoxedProducer,
    pending: Option<PendingLoad>,
    last_frame: Option<VideoFrame>,
    ticks: u64,
}

impl Stage {
    pub fn new(index: ChannelId, format: FormatDesc, factory: Arc<dyn FrameFactory>) -> Self {
        let current = EmptyProducer::boxed(format.clone());
        Self {
            index,
            format,
            factory,
            current,
            pending: None,
            last_frame: None,
            ticks: 0,
        }
    }

    pub fn index(&self) -> ChannelId {
        self.index
    }

    pub fn format(&self) -> &FormatDesc {
        &self.format
    }

    /// Name of the producer currently on air.
    pub fn current_name(&self) -> &str {
        self.current.name()
    }

    /// Ticks fired so far; equals the number of frames emitted.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Stage a producer for the next `play`, optionally behind a
    /// transition. Synchronous; no frames are produced.
    pub fn load(&mut self, producer: BoxedProducer, transition: Option<TransitionInfo>) {
        debug!(channel = %self.index, producer = producer.name(), "Loaded pending producer");
        self.pending = Some(PendingLoad {
            producer,
            transition,
        });
    }

    /// Promote the pending producer to current. With transition info the
    /// incoming producer is wrapped in a [`TransitionProducer`] and the
    /// retiring producer handed to it as the outgoing side. Construction
    /// errors (absent dest, zero duration) surface to the caller; without
    /// a pending load this is a no-op.
    pub fn play(&mut self) -> Result<(), ProducerError> {
        let Some(PendingLoad {
            producer,
            transition,
        }) = self.pending.take()
        else {
            return Ok(());
        };

        match transition {
            Some(info) => {
                let mut transition =
                    TransitionProducer::new(Some(producer), info, self.format.clone())?;
                transition.initialize(Arc::clone(&self.factory))?;
                let previous = std::mem::replace(&mut self.current, Box::new(transition));
                self.current.set_leading_producer(previous);
            }
            None => {
                let mut incoming = producer;
                incoming.initialize(Arc::clone(&self.factory))?;
                self.current = incoming;
            }
        }
        debug!(channel = %self.index, producer = self.current.name(), "Producer promoted to current");
        Ok(())
    }

    /// Replace the current producer with the empty producer.
    pub fn stop(&mut self) {
        self.current = EmptyProducer::boxed(self.format.clone());
        debug!(channel = %self.index, "Stopped");
    }

    /// Produce exactly one frame for the channel clock. Never fails:
    /// producer errors and exhaustion degrade to auto-advance or
    /// repeat-last.
    pub fn tick(&mut self) -> VideoFrame {
        let frame = self
            .render_current()
            .unwrap_or_else(|| self.repeat_last());
        self.ticks += 1;
        self.last_frame = Some(frame.clone());
        frame
    }

    /// Failure recovery and exhaustion auto-advance each get one retry
    /// per tick, so a tick makes at most three render calls (initial plus
    /// one of each recovery kind) and still meets its deadline.
    fn render_current(&mut self) -> Option<VideoFrame> {
        let mut may_recover_failure = true;
        let mut may_advance = true;
        loop {
            match self.current.render_frame() {
                Ok(RenderOutcome::Frame(frame)) => return Some(frame),
                Ok(RenderOutcome::Exhausted) => {
                    if !may_advance {
                        return None;
                    }
                    may_advance = false;
                    let Some(mut following) = self.current.take_following() else {
                        return None;
                    };
                    if let Err(error) = following.initialize(Arc::clone(&self.factory)) {
                        warn!(channel = %self.index, producer = following.name(), error = %error,
                            "Following producer failed to initialize");
                        return None;
                    }
                    let exhausted = std::mem::replace(&mut self.current, following);
                    self.current.set_leading_producer(exhausted);
                    debug!(channel = %self.index, producer = self.current.name(),
                        "Advanced to following producer");
                }
                Err(error) => {
                    if !may_recover_failure {
                        return None;
                    }
                    may_recover_failure = false;
                    warn!(channel = %self.index, producer = self.current.name(), error = %error,
                        "Producer failed; removing from channel");
                    let mut failed = std::mem::replace(
                        &mut self.current,
                        EmptyProducer::boxed(self.format.clone()),
                    );
                    if let Some(mut following) = failed.take_following() {
                        match following.initialize(Arc::clone(&self.factory)) {
                            Ok(()) => self.current = following,
                            Err(error) => {
                                warn!(channel = %self.index, producer = following.name(), error = %error,
                                    "Replacement producer failed to initialize");
                            }
                        }
                    }
                }
            }
        }
    }

    fn repeat_last(&self) -> VideoFrame {
        self.last_frame
            .clone()
            .unwrap_or_else(|| VideoFrame::black(&self.format))
    }
}
