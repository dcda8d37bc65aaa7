use anyhow::Result;
use fast_image_resize as fr;
use fr::images::Image;

use crate::capture::Frame;

/// Scales camera frames into the terminal's pixel grid.
///
/// Aspect ratio is preserved; the scaled frame is centered on a black canvas
/// of exactly `target_width x target_height` (letterboxed). Because both the
/// canvas and the source frame are sampled at their centers, the crosshair
/// and the sampling window always point at the same spot.
pub struct PreviewScaler {
    target_width: u32,
    target_height: u32,
}

impl PreviewScaler {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    /// RGB24 canvas of the target size, letterboxed.
    pub fn scale(&self, frame: &Frame) -> Result<Vec<u8>> {
        let scale_w = self.target_width as f64 / frame.width as f64;
        let scale_h = self.target_height as f64 / frame.height as f64;
        let scale = scale_w.min(scale_h);

        let new_w = (((frame.width as f64 * scale).round() as u32).max(1)).min(self.target_width);
        let new_h = (((frame.height as f64 * scale).round() as u32).max(1)).min(self.target_height);

        let src_image = Image::from_vec_u8(
            frame.width,
            frame.height,
            frame.buffer.clone(),
            fr::PixelType::U8x3,
        )?;

        let mut dst_image = Image::new(new_w, new_h, fr::PixelType::U8x3);

        let mut resizer = fr::Resizer::new();
        resizer.resize(&src_image, &mut dst_image, None)?;

        // Center on the canvas
        let mut canvas = vec![0u8; (self.target_width * self.target_height * 3) as usize];
        let x_off = ((self.target_width - new_w) / 2) as usize;
        let y_off = ((self.target_height - new_h) / 2) as usize;
        let row_bytes = new_w as usize * 3;

        for y in 0..new_h as usize {
            let src_offset = y * row_bytes;
            let dst_offset = ((y_off + y) * self.target_width as usize + x_off) * 3;
            canvas[dst_offset..dst_offset + row_bytes]
                .copy_from_slice(&dst_image.buffer()[src_offset..src_offset + row_bytes]);
        }

        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn uniform_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(
            vec![value; (width * height * 3) as usize],
            width,
            height,
            Duration::ZERO,
        )
    }

    #[test]
    fn test_canvas_has_target_size() {
        let scaler = PreviewScaler::new(8, 6);
        let canvas = scaler.scale(&uniform_frame(64, 48, 100)).unwrap();
        assert_eq!(canvas.len(), 8 * 6 * 3);
    }

    #[test]
    fn test_same_aspect_fills_canvas() {
        // 4x4 white down to 2x2: no letterbox bars, color preserved
        let scaler = PreviewScaler::new(2, 2);
        let canvas = scaler.scale(&uniform_frame(4, 4, 255)).unwrap();
        assert!(canvas.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_wide_frame_letterboxes_vertically() {
        // 8x2 white into a 4x4 canvas: scaled to 4x1, bars above and below
        let scaler = PreviewScaler::new(4, 4);
        let canvas = scaler.scale(&uniform_frame(8, 2, 255)).unwrap();

        let row = |y: usize| &canvas[y * 4 * 3..(y + 1) * 4 * 3];
        assert!(row(0).iter().all(|&b| b == 0));
        assert!(row(1).iter().all(|&b| b == 255));
        assert!(row(3).iter().all(|&b| b == 0));
    }
}
