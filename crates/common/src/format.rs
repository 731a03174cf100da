//! Channel video format descriptors.
//!
//! A channel is locked to one `FormatDesc` for its lifetime. The descriptor
//! fixes the frame cadence, the output resolution, and the audio layout,
//! which in turn fixes the exact number of audio samples every produced
//! frame must carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::types::{Rational, Resolution};

/// Named video modes a channel can run in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoFormat {
    Pal,
    Ntsc,
    Hd720p50,
    Hd1080p25,
    Hd1080p50,
}

impl VideoFormat {
    /// Parse a video-mode name as it appears in channel configuration
    /// (e.g. `"PAL"`, `"720p5000"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PAL" => Some(Self::Pal),
            "NTSC" => Some(Self::Ntsc),
            "720p5000" => Some(Self::Hd720p50),
            "1080p2500" => Some(Self::Hd1080p25),
            "1080p5000" => Some(Self::Hd1080p50),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pal => "PAL",
            Self::Ntsc => "NTSC",
            Self::Hd720p50 => "720p5000",
            Self::Hd1080p25 => "1080p2500",
            Self::Hd1080p50 => "1080p5000",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable per-channel format: resolution, frame rate, and audio layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDesc {
    pub format: VideoFormat,
    pub resolution: Resolution,
    pub fps: Rational,
    /// Audio sample rate in Hz.
    pub audio_sample_rate: u32,
    /// Interleaved audio channel count.
    pub audio_channels: u16,
}

impl FormatDesc {
    pub fn new(format: VideoFormat) -> Self {
        let (resolution, fps) = match format {
            VideoFormat::Pal => (Resolution::PAL, Rational::FPS_25),
            VideoFormat::Ntsc => (Resolution::NTSC, Rational::FPS_29_97),
            VideoFormat::Hd720p50 => (Resolution::HD720, Rational::FPS_50),
            VideoFormat::Hd1080p25 => (Resolution::HD1080, Rational::FPS_25),
            VideoFormat::Hd1080p50 => (Resolution::HD1080, Rational::FPS_50),
        };
        Self {
            format,
            resolution,
            fps,
            audio_sample_rate: 48_000,
            audio_channels: 2,
        }
    }

    /// Total interleaved samples per frame: `rate / fps * channels`.
    /// Exact for integer rates; rounded for fractional NTSC rates.
    pub fn audio_samples_per_frame(&self) -> usize {
        let per_channel =
            (self.audio_sample_rate as f64 * self.fps.den as f64 / self.fps.num as f64).round();
        per_channel as usize * self.audio_channels as usize
    }

    /// Wall-clock duration of one frame.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(self.fps.den as f64 / self.fps.num as f64)
    }

    /// The pixel descriptor of a full-raster output frame.
    pub fn pixel_desc(&self) -> PixelDesc {
        PixelDesc {
            format: PixelFormat::Rgba8,
            resolution: self.resolution,
        }
    }
}

impl fmt::Display for FormatDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} @ {})", self.format, self.resolution, self.fps)
    }
}

/// Pixel storage layout of an image payload.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    #[default]
    Rgba8,
    Bgra8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
        }
    }
}

/// Describes the pixel payload a producer asks the frame factory for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelDesc {
    pub format: PixelFormat,
    pub resolution: Resolution,
}

impl PixelDesc {
    pub fn byte_size(&self) -> usize {
        self.resolution.pixel_count() as usize * self.format.bytes_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pal_descriptor() {
        let desc = FormatDesc::new(VideoFormat::Pal);
        assert_eq!(desc.resolution, Resolution::PAL);
        assert_eq!(desc.fps, Rational::FPS_25);
        // 48000 / 25 * 2
        assert_eq!(desc.audio_samples_per_frame(), 3840);
        assert_eq!(desc.frame_interval(), Duration::from_millis(40));
    }

    #[test]
    fn ntsc_audio_samples_rounded() {
        let desc = FormatDesc::new(VideoFormat::Ntsc);
        // 48000 * 1001 / 30000 = 1601.6 -> 1602 per channel
        assert_eq!(desc.audio_samples_per_frame(), 3204);
    }

    #[test]
    fn hd_descriptors() {
        let desc = FormatDesc::new(VideoFormat::Hd1080p50);
        assert_eq!(desc.resolution, Resolution::HD1080);
        assert_eq!(desc.audio_samples_per_frame(), 1920);
        assert_eq!(desc.frame_interval(), Duration::from_millis(20));
    }

    #[test]
    fn format_names_roundtrip() {
        for format in [
            VideoFormat::Pal,
            VideoFormat::Ntsc,
            VideoFormat::Hd720p50,
            VideoFormat::Hd1080p25,
            VideoFormat::Hd1080p50,
        ] {
            assert_eq!(VideoFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(VideoFormat::from_name("1080i5000"), None);
    }

    #[test]
    fn pixel_desc_byte_size() {
        let desc = FormatDesc::new(VideoFormat::Hd720p50).pixel_desc();
        assert_eq!(desc.byte_size(), 1280 * 720 * 4);
    }

    #[test]
    fn display_formats() {
        let desc = FormatDesc::new(VideoFormat::Pal);
        assert_eq!(desc.to_string(), "PAL (720x576 @ 25)");
    }
}
