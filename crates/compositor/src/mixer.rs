//! CPU flatten of a frame tree.
//!
//! Geometry model: translate is in frame-size units ((-1, 0) moves a
//! layer one full frame width left), the texcoords rectangle is a GL
//! oriented sampling window (top = 1, bottom = 0), and layers add onto
//! the output back-to-front with per-channel saturation. Out-of-window
//! samples are transparent. Attribute clamping happens here, not in the
//! producers.

use tracing::trace;

use fc_common::audio::mix_into;
use fc_common::{
    FormatDesc, FrameContent, ImageBuffer, ImageMixer, Rect, Resolution, VideoFrame,
};

pub struct SoftwareMixer {
    format: FormatDesc,
}

impl SoftwareMixer {
    pub fn new(format: FormatDesc) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &FormatDesc {
        &self.format
    }
}

impl ImageMixer for SoftwareMixer {
    fn composite(&self, frame: VideoFrame) -> VideoFrame {
        let mut layers = Vec::new();
        collect_layers(&frame, 1.0, (0.0, 0.0), &mut layers);
        trace!(layers = layers.len(), "Flattening frame tree");

        let mut image = ImageBuffer::blank(self.format.resolution);
        let mut audio = vec![0i16; self.format.audio_samples_per_frame()];
        for layer in &layers {
            draw_layer(&mut image, layer);
            mix_into(&mut audio, layer.audio);
        }

        VideoFrame::new(image, audio)
    }
}

/// A leaf of the frame tree with its effective (inherited) attributes.
struct Layer<'a> {
    image: &'a ImageBuffer,
    audio: &'a [i16],
    alpha: f64,
    translate: (f64, f64),
    texcoords: Rect,
}

fn collect_layers<'a>(
    frame: &'a VideoFrame,
    alpha: f64,
    translate: (f64, f64),
    out: &mut Vec<Layer<'a>>,
) {
    let alpha = alpha * frame.alpha();
    let translate = (
        translate.0 + frame.translate().0,
        translate.1 + frame.translate().1,
    );
    match frame.content() {
        FrameContent::Image(image) => out.push(Layer {
            image,
            audio: frame.audio(),
            alpha,
            translate,
            texcoords: frame.texcoords(),
        }),
        FrameContent::Composite(children) => {
            for child in children {
                collect_layers(child, alpha, translate, out);
            }
        }
    }
}

fn draw_layer(out: &mut ImageBuffer, layer: &Layer<'_>) {
    let alpha = layer.alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let Resolution { width, height } = out.resolution();
    let src_res = layer.image.resolution();
    let src = layer.image.data();
    let tex = layer.texcoords;
    let data = out.data_mut();

    for y in 0..height {
        // Pixel centers, measured from the top of the raster.
        let v = (y as f64 + 0.5) / height as f64;
        let v_frame = v - layer.translate.1;
        if !(0.0..1.0).contains(&v_frame) {
            continue;
        }
        // Map through the GL-oriented window, back to a row from the top.
        let t = tex.top + v_frame * (tex.bottom - tex.top);
        let s = 1.0 - t;
        if !(0.0..1.0).contains(&s) {
            continue;
        }
        let src_y = (s * src_res.height as f64) as u32;

        for x in 0..width {
            let u = (x as f64 + 0.5) / width as f64;
            let u_frame = u - layer.translate.0;
            if !(0.0..1.0).contains(&u_frame) {
                continue;
            }
            let u_t = tex.left + u_frame * (tex.right - tex.left);
            if !(0.0..1.0).contains(&u_t) {
                continue;
            }
            let src_x = (u_t * src_res.width as f64) as u32;

            let src_idx = ((src_y * src_res.width + src_x) * 4) as usize;
            let dst_idx = ((y * width + x) * 4) as usize;
            for c in 0..4 {
                let contribution = (src[src_idx + c] as f64 * alpha).round() as u16;
                let sum = data[dst_idx + c] as u16 + contribution;
                data[dst_idx + c] = sum.min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_common::VideoFormat;

    fn small_format() -> FormatDesc {
        FormatDesc {
            resolution: Resolution::new(4, 2),
            ..FormatDesc::new(VideoFormat::Pal)
        }
    }

    fn solid_frame(format: &FormatDesc, rgba: [u8; 4], sample: i16) -> VideoFrame {
        VideoFrame::new(
            ImageBuffer::solid(format.resolution, rgba),
            vec![sample; format.audio_samples_per_frame()],
        )
    }

    /// An image whose red channel encodes the column index.
    fn column_ramp(resolution: Resolution) -> ImageBuffer {
        let mut data = vec![0u8; resolution.rgba_byte_size()];
        for y in 0..resolution.height {
            for x in 0..resolution.width {
                let idx = ((y * resolution.width + x) * 4) as usize;
                data[idx] = x as u8;
                data[idx + 3] = 255;
            }
        }
        ImageBuffer::from_data(resolution, data)
    }

    fn red_at(frame: &VideoFrame, x: u32, y: u32) -> u8 {
        let image = frame.image().unwrap();
        let idx = ((y * image.resolution().width + x) * 4) as usize;
        image.data()[idx]
    }

    #[test]
    fn identity_composite_is_lossless() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let input = solid_frame(&format, [10, 200, 30, 255], 123);

        let output = mixer.composite(input.clone());

        assert_eq!(output.image().unwrap().data(), input.image().unwrap().data());
        assert_eq!(output.audio(), input.audio());
        assert_eq!(output.alpha(), 1.0);
        assert!(output.texcoords().is_unit());
    }

    #[test]
    fn single_child_composite_is_lossless() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let input = solid_frame(&format, [1, 2, 3, 255], -77);

        let output = mixer.composite(VideoFrame::composite(vec![input.clone()]));

        assert_eq!(output.image().unwrap().data(), input.image().unwrap().data());
        assert_eq!(output.audio(), input.audio());
    }

    #[test]
    fn alpha_scales_contribution() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let input = solid_frame(&format, [100, 100, 100, 255], 0).with_alpha(0.5);

        let output = mixer.composite(input);
        assert_eq!(red_at(&output, 0, 0), 50);
    }

    #[test]
    fn zero_alpha_draws_nothing() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let input = solid_frame(&format, [255, 255, 255, 255], 0).with_alpha(0.0);

        let output = mixer.composite(input);
        assert!(output.image().unwrap().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn layers_add_and_saturate() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let back = solid_frame(&format, [200, 30, 0, 255], 0);
        let front = solid_frame(&format, [200, 30, 0, 255], 0);

        let output = mixer.composite(VideoFrame::composite(vec![back, front]));
        // 200 + 200 saturates, 30 + 30 does not.
        let image = output.image().unwrap();
        assert_eq!(image.data()[0], 255);
        assert_eq!(image.data()[1], 60);
    }

    #[test]
    fn full_translate_moves_layer_off_screen() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let input = solid_frame(&format, [255, 255, 255, 255], 0).with_translate(1.0, 0.0);

        let output = mixer.composite(input);
        assert!(output.image().unwrap().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn half_translate_shows_half_the_layer() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let ramp = VideoFrame::new(
            column_ramp(format.resolution),
            vec![0; format.audio_samples_per_frame()],
        );

        let output = mixer.composite(ramp.with_translate(0.5, 0.0));
        // Left half untouched, right half shows the source's left half.
        assert_eq!(red_at(&output, 0, 0), 0);
        assert_eq!(red_at(&output, 1, 0), 0);
        assert_eq!(red_at(&output, 2, 0), 0);
        assert_eq!(red_at(&output, 3, 0), 1);
        // Alpha channel confirms where the layer actually landed.
        let image = output.image().unwrap();
        assert_eq!(image.data()[2 * 4 + 3], 255);
        assert_eq!(image.data()[3], 0);
    }

    #[test]
    fn wipe_window_reveals_without_shifting_pixels() {
        // A from-right wipe at half progress: translate +0.5 with the
        // matching texcoord window samples the source's own right half
        // into the raster's right half.
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let ramp = VideoFrame::new(
            column_ramp(format.resolution),
            vec![0; format.audio_samples_per_frame()],
        );

        let output = mixer.composite(
            ramp.with_translate(0.5, 0.0)
                .with_texcoords(Rect::new(0.5, 1.0, 1.5, 0.0)),
        );

        assert_eq!(red_at(&output, 0, 0), 0);
        assert_eq!(red_at(&output, 1, 0), 0);
        assert_eq!(red_at(&output, 2, 0), 2);
        assert_eq!(red_at(&output, 3, 0), 3);
    }

    #[test]
    fn nested_alpha_multiplies() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let leaf = solid_frame(&format, [100, 0, 0, 255], 0).with_alpha(0.5);
        let tree = VideoFrame::composite(vec![leaf]).with_alpha(0.5);

        let output = mixer.composite(tree);
        assert_eq!(red_at(&output, 0, 0), 25);
    }

    #[test]
    fn audio_mixes_with_saturation() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let back = solid_frame(&format, [0, 0, 0, 0], 20_000);
        let front = solid_frame(&format, [0, 0, 0, 0], 20_000);

        let output = mixer.composite(VideoFrame::composite(vec![back, front]));
        assert!(output.audio().iter().all(|&s| s == i16::MAX));
    }

    #[test]
    fn oversized_alpha_is_clamped() {
        let format = small_format();
        let mixer = SoftwareMixer::new(format.clone());
        let input = solid_frame(&format, [100, 0, 0, 255], 0).with_alpha(4.0);

        let output = mixer.composite(input);
        assert_eq!(red_at(&output, 0, 0), 100);
    }
}
