use core::fmt;

use crate::capture::Frame;
use crate::sampler::color::SampledColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// The clamped window covered zero pixels (point outside the frame,
    /// zero region size, or a frame shorter than its header claims).
    EmptyWindow,
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::EmptyWindow => f.write_str("sampling window covered no pixels"),
        }
    }
}

impl std::error::Error for SampleError {}

/// Average the RGB channels of a square window around `(x, y)`.
///
/// The window is `region_size` pixels on a side, clamped to the frame bounds,
/// so sampling near an edge shrinks it rather than reading out of range.
/// Channel averages are integer-rounded.
pub fn sample_region(
    frame: &Frame,
    x: u32,
    y: u32,
    region_size: u32,
) -> Result<SampledColor, SampleError> {
    let half = region_size / 2;

    let min_x = x.saturating_sub(half);
    let min_y = y.saturating_sub(half);
    let max_x = (x + half).min(frame.width);
    let max_y = (y + half).min(frame.height);

    let mut r_total: u64 = 0;
    let mut g_total: u64 = 0;
    let mut b_total: u64 = 0;
    let mut pixel_count: u64 = 0;

    for py in min_y..max_y {
        for px in min_x..max_x {
            let Some((r, g, b)) = frame.pixel(px, py) else {
                continue;
            };
            r_total += r as u64;
            g_total += g as u64;
            b_total += b as u64;
            pixel_count += 1;
        }
    }

    if pixel_count == 0 {
        return Err(SampleError::EmptyWindow);
    }

    let avg = |total: u64| ((total + pixel_count / 2) / pixel_count) as u8;

    Ok(SampledColor::new(avg(r_total), avg(g_total), avg(b_total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn uniform_frame(width: u32, height: u32, rgb: (u8, u8, u8)) -> Frame {
        let mut buffer = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            buffer.extend_from_slice(&[rgb.0, rgb.1, rgb.2]);
        }
        Frame::new(buffer, width, height, Duration::ZERO)
    }

    #[test]
    fn test_uniform_window_returns_exact_color() {
        let frame = uniform_frame(32, 32, (250, 10, 10));
        let color = sample_region(&frame, 16, 16, 10).unwrap();
        assert_eq!(color.as_tuple(), (250, 10, 10));
        assert_eq!(color.hex_string(), "#FA0A0A");
    }

    #[test]
    fn test_average_of_mixed_window() {
        // 2x2 frame: one white pixel, three black; region covers all four
        let mut frame = uniform_frame(2, 2, (0, 0, 0));
        frame.buffer[0] = 255;
        frame.buffer[1] = 255;
        frame.buffer[2] = 255;

        let color = sample_region(&frame, 1, 1, 2).unwrap();
        // 255 / 4 = 63.75, rounds to 64
        assert_eq!(color.as_tuple(), (64, 64, 64));
    }

    #[test]
    fn test_edge_point_clamps_window() {
        let frame = uniform_frame(16, 16, (1, 2, 3));

        // Corner: only the bottom-right quadrant of the window is in bounds
        let color = sample_region(&frame, 0, 0, 10).unwrap();
        assert_eq!(color.as_tuple(), (1, 2, 3));

        // Far edge
        let color = sample_region(&frame, 15, 15, 10).unwrap();
        assert_eq!(color.as_tuple(), (1, 2, 3));
    }

    #[test]
    fn test_point_outside_frame_fails() {
        let frame = uniform_frame(8, 8, (9, 9, 9));
        assert_eq!(sample_region(&frame, 100, 4, 10), Err(SampleError::EmptyWindow));
        assert_eq!(sample_region(&frame, 4, 100, 10), Err(SampleError::EmptyWindow));
    }

    #[test]
    fn test_zero_region_fails() {
        let frame = uniform_frame(8, 8, (9, 9, 9));
        assert_eq!(sample_region(&frame, 4, 4, 0), Err(SampleError::EmptyWindow));
    }

    #[test]
    fn test_region_larger_than_frame() {
        let frame = uniform_frame(4, 4, (40, 50, 60));
        let color = sample_region(&frame, 2, 2, 100).unwrap();
        assert_eq!(color.as_tuple(), (40, 50, 60));
    }
}
