//! `fc-producer`: pull-mode frame sources for the framecast playout engine.
//!
//! A channel's stage drives a stack of [`FrameProducer`]s: the active
//! producer is asked for exactly one frame per tick and may hand over to a
//! following producer when it runs out. The [`TransitionProducer`] is the
//! specialized producer that blends an outgoing and an incoming producer
//! for a fixed number of frames.
//!
//! Producers are plugged in by name through the [`ProducerRegistry`]; the
//! parameter parsing that fills it lives in the surrounding control layer.

pub mod color;
pub mod empty;
pub mod producer;
pub mod registry;
pub mod transition;

// Re-export primary API
pub use color::ColorProducer;
pub use empty::EmptyProducer;
pub use producer::{BoxedProducer, FrameProducer, RenderOutcome};
pub use registry::ProducerRegistry;
pub use transition::{TransitionDirection, TransitionInfo, TransitionProducer, TransitionType};
