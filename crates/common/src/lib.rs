//! `fc-common`: shared types, traits, and errors for the framecast playout engine.
//!
//! This crate is the foundation that all other engine crates depend on.
//! It defines the core abstractions:
//!
//! - **Types**: `ChannelId`, `Rational`, `Resolution` (newtypes for safety)
//! - **Format**: `VideoFormat`, `FormatDesc`, `PixelFormat`, `PixelDesc`
//! - **Frame**: `VideoFrame`, `ImageBuffer`, `Rect` (the per-tick data carrier)
//! - **Audio**: integer gain scaling and saturating sample mixing
//! - **Boundaries**: `FrameFactory`, `ImageMixer` (consumed interfaces)
//! - **Errors**: `ProducerError`, `ChannelError` (thiserror-based)
//! - **Config**: `ChannelConfig`

pub mod audio;
pub mod config;
pub mod error;
pub mod format;
pub mod frame;
pub mod mixer;
pub mod types;

// Re-export commonly used items at crate root
pub use config::ChannelConfig;
pub use error::{ChannelError, ProducerError};
pub use format::{FormatDesc, PixelDesc, PixelFormat, VideoFormat};
pub use frame::{FrameContent, ImageBuffer, Rect, VideoFrame};
pub use mixer::{FrameFactory, FrameTag, ImageMixer};
pub use types::{ChannelId, Rational, Resolution};
