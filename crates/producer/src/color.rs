//! Solid-color producer.
//!
//! Fills a factory-allocated frame with one RGBA color and emits it every
//! tick with silent audio. Accepts `#RRGGBB`, `#AARRGGBB`, or a named
//! color as its parameter.

use std::sync::Arc;

use fc_common::{FormatDesc, FrameFactory, FrameTag, ProducerError, VideoFrame};

use crate::producer::{FrameProducer, RenderOutcome};

pub struct ColorProducer {
    format: FormatDesc,
    color: [u8; 4],
    tag: FrameTag,
    frame: Option<VideoFrame>,
}

impl ColorProducer {
    pub fn new(format: FormatDesc, color_spec: &str) -> Result<Self, ProducerError> {
        Ok(Self::from_rgba(format, parse_color(color_spec)?))
    }

    pub fn from_rgba(format: FormatDesc, color: [u8; 4]) -> Self {
        Self {
            format,
            color,
            tag: FrameTag::next(),
            frame: None,
        }
    }

    pub fn color(&self) -> [u8; 4] {
        self.color
    }
}

impl FrameProducer for ColorProducer {
    fn name(&self) -> &str {
        "color"
    }

    fn format(&self) -> &FormatDesc {
        &self.format
    }

    fn initialize(&mut self, factory: Arc<dyn FrameFactory>) -> Result<(), ProducerError> {
        let mut frame = factory.create_frame(self.tag, &self.format.pixel_desc());
        if let Some(image) = frame.image_mut() {
            for pixel in image.data_mut().chunks_exact_mut(4) {
                pixel.copy_from_slice(&self.color);
            }
        }
        self.frame = Some(frame);
        Ok(())
    }

    fn render_frame(&mut self) -> Result<RenderOutcome, ProducerError> {
        match &self.frame {
            Some(frame) => Ok(RenderOutcome::Frame(frame.clone())),
            None => Err(ProducerError::failed(self.name(), "not initialized")),
        }
    }
}

/// Parse a color parameter: `#RRGGBB`, `#AARRGGBB`, or a named color.
pub fn parse_color(spec: &str) -> Result<[u8; 4], ProducerError> {
    match spec.to_ascii_lowercase().as_str() {
        "black" => return Ok([0, 0, 0, 255]),
        "white" => return Ok([255, 255, 255, 255]),
        "red" => return Ok([255, 0, 0, 255]),
        "green" => return Ok([0, 255, 0, 255]),
        "blue" => return Ok([0, 0, 255, 255]),
        "yellow" => return Ok([255, 255, 0, 255]),
        "cyan" => return Ok([0, 255, 255, 255]),
        "magenta" => return Ok([255, 0, 255, 255]),
        "orange" => return Ok([255, 165, 0, 255]),
        "gray" | "grey" => return Ok([128, 128, 128, 255]),
        _ => {}
    }

    let hex = spec.strip_prefix('#').ok_or_else(|| {
        ProducerError::invalid_argument(format!("unknown color \"{spec}\""))
    })?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ProducerError::invalid_argument(format!(
            "invalid hex color \"{spec}\""
        )));
    }
    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| ProducerError::invalid_argument(format!("invalid hex color \"{spec}\"")))
    };
    match hex.len() {
        6 => Ok([parse(0..2)?, parse(2..4)?, parse(4..6)?, 255]),
        8 => Ok([parse(2..4)?, parse(4..6)?, parse(6..8)?, parse(0..2)?]),
        _ => Err(ProducerError::invalid_argument(format!(
            "invalid hex color \"{spec}\""
        ))),
    }
}
