//! One output channel: stage + clock + consumers on a dedicated thread.
//!
//! Architecture:
//!
//! ```text
//! Control surface             Driver thread (one per channel)
//! ┌──────────────┐           ┌─────────────────────────────┐
//! │ load/play/.. │── cmds ──▶│ drain commands              │
//! │ add_consumer │  channel  │ wait for tick               │
//! │ shutdown     │           │ stage.tick -> mixer.flatten │
//! └──────────────┘           │ publish to consumers        │
//!                            └─────────────────────────────┘
//! ```
//!
//! Commands are drained only at tick boundaries, which serializes them
//! against in-progress ticks. Channels share nothing; cross-channel
//! ordering is undefined by design.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use fc_common::{ChannelError, ChannelId, FormatDesc, FrameFactory, ImageMixer};
use fc_producer::{BoxedProducer, TransitionInfo};

use crate::clock::ChannelClock;
use crate::output::{ConsumerSet, FrameConsumer};
use crate::stage::Stage;

enum ChannelCommand {
    Load {
        producer: BoxedProducer,
        transition: Option<TransitionInfo>,
    },
    Play,
    Stop,
    AddConsumer(Box<dyn FrameConsumer>),
    Shutdown,
}

/// Driver counters, readable from any thread.
#[derive(Clone, Debug, Default)]
pub struct ChannelStats {
    /// Ticks fired (frames published) so far.
    pub ticks: u64,
    /// Ticks that exceeded the frame interval.
    pub overruns: u64,
}

/// A playout channel running on its own driver thread.
pub struct VideoChannel {
    index: ChannelId,
    format: FormatDesc,
    commands: Sender<ChannelCommand>,
    driver: Option<JoinHandle<()>>,
    stats: Arc<Mutex<ChannelStats>>,
}

impl VideoChannel {
    pub fn spawn(
        index: ChannelId,
        format: FormatDesc,
        factory: Arc<dyn FrameFactory>,
        mixer: Arc<dyn ImageMixer>,
    ) -> Result<Self, ChannelError> {
        let (commands, inbox) = channel::unbounded();
        let stats = Arc::new(Mutex::new(ChannelStats::default()));

        let driver = {
            let format = format.clone();
            let stats = Arc::clone(&stats);
            thread::Builder::new()
                .name(format!("fc-{index}"))
                .spawn(move || drive(index, format, factory, mixer, inbox, stats))
                .map_err(|e| ChannelError::DriverSpawn {
                    index,
                    reason: e.to_string(),
                })?
        };
        info!(channel = %index, format = %format, "Channel started");

        Ok(Self {
            index,
            format,
            commands,
            driver: Some(driver),
            stats,
        })
    }

    pub fn index(&self) -> ChannelId {
        self.index
    }

    pub fn format(&self) -> &FormatDesc {
        &self.format
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats.lock().clone()
    }

    /// Stage a producer for the next `play`. Takes effect at the next
    /// tick boundary.
    pub fn load(
        &self,
        producer: BoxedProducer,
        transition: Option<TransitionInfo>,
    ) -> Result<(), ChannelError> {
        self.send(ChannelCommand::Load {
            producer,
            transition,
        })
    }

    pub fn play(&self) -> Result<(), ChannelError> {
        self.send(ChannelCommand::Play)
    }

    pub fn stop(&self) -> Result<(), ChannelError> {
        self.send(ChannelCommand::Stop)
    }

    pub fn add_consumer(&self, consumer: Box<dyn FrameConsumer>) -> Result<(), ChannelError> {
        self.send(ChannelCommand::AddConsumer(consumer))
    }

    /// Stop the driver thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn send(&self, command: ChannelCommand) -> Result<(), ChannelError> {
        self.commands
            .send(command)
            .map_err(|_| ChannelError::ShutDown { index: self.index })
    }

    fn shutdown_inner(&mut self) {
        if let Some(driver) = self.driver.take() {
            let _ = self.commands.send(ChannelCommand::Shutdown);
            if driver.join().is_err() {
                error!(channel = %self.index, "Channel driver panicked");
            }
        }
    }
}

impl Drop for VideoChannel {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

fn drive(
    index: ChannelId,
    format: FormatDesc,
    factory: Arc<dyn FrameFactory>,
    mixer: Arc<dyn ImageMixer>,
    inbox: Receiver<ChannelCommand>,
    stats: Arc<Mutex<ChannelStats>>,
) {
    let mut stage = Stage::new(index, format.clone(), factory);
    let mut output = ConsumerSet::new();
    let mut clock = ChannelClock::for_format(&format);
    debug!(channel = %index, "Channel driver running");

    loop {
        // Commands take effect between ticks only.
        loop {
            match inbox.try_recv() {
                Ok(ChannelCommand::Load {
                    producer,
                    transition,
                }) => stage.load(producer, transition),
                Ok(ChannelCommand::Play) => {
                    if let Err(error) = stage.play() {
                        warn!(channel = %index, error = %error, "Play rejected");
                    }
                }
                Ok(ChannelCommand::Stop) => stage.stop(),
                Ok(ChannelCommand::AddConsumer(consumer)) => output.add(consumer),
                Ok(ChannelCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    debug!(channel = %index, ticks = stage.ticks(), "Channel driver stopping");
                    return;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if let Some(late) = clock.wait_for_tick() {
            warn!(channel = %index, late_us = late.as_micros() as u64, "Tick overrun");
            stats.lock().overruns += 1;
        }

        let frame = stage.tick();
        let frame = mixer.composite(frame);
        output.publish(&frame);
        stats.lock().ticks += 1;
    }
}
