//! `fc-compositor`: deterministic CPU implementations of the mixer boundary.
//!
//! The production image mixer lives on the GPU behind the
//! [`ImageMixer`](fc_common::ImageMixer) trait; this crate provides the
//! software reference used by headless channels and the test suites. The
//! flatten order per leaf is texcoords window, then translate, then alpha,
//! then additive layering back-to-front.

pub mod factory;
pub mod mixer;

// Re-export primary API
pub use factory::SoftwareFrameFactory;
pub use mixer::SoftwareMixer;
