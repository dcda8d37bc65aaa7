use rayon::prelude::*;

use super::cell::CellData;

/// Folds an RGB24 pixel grid into half-block terminal cells.
///
/// `width` and `height` are in pixels; each output cell covers one column and
/// two rows, so the cell grid is `width x height / 2`.
pub struct FrameProcessor {
    pub width: usize,
    pub height: usize,
}

impl FrameProcessor {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width * (self.height / 2)
    }

    pub fn process_frame(&self, pixel_data: &[u8]) -> Vec<CellData> {
        let mut cells = vec![CellData::default(); self.cell_count()];
        self.process_frame_into(pixel_data, &mut cells);
        cells
    }

    pub fn process_frame_into(&self, pixel_data: &[u8], cells: &mut [CellData]) {
        let w = self.width;
        let term_height = self.height / 2;

        if cells.len() != w * term_height {
            return;
        }

        let chunk_size = if w * term_height > 10000 {
            2000
        } else {
            (w * term_height / rayon::current_num_threads().max(1)).max(1)
        };

        cells
            .par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(|(chunk_idx, chunk)| {
                let start_idx = chunk_idx * chunk_size;

                for (i, cell) in chunk.iter_mut().enumerate() {
                    let idx = start_idx + i;
                    let cx = idx % w;
                    let cy = idx / w;

                    let py_top = cy * 2;
                    let py_bottom = cy * 2 + 1;

                    let get_pixel = |x: usize, y: usize| -> (u8, u8, u8) {
                        let offset = (y * w + x) * 3;
                        if offset + 2 < pixel_data.len() {
                            (pixel_data[offset], pixel_data[offset + 1], pixel_data[offset + 2])
                        } else {
                            (0, 0, 0)
                        }
                    };

                    *cell = CellData {
                        char: '▀',
                        fg: get_pixel(cx, py_top),
                        bg: get_pixel(cx, py_bottom),
                    };
                }
            });
    }

    /// Invert the cells along the center crosshair: `arm` cells out in each
    /// direction horizontally, plus the center column one cell up and down.
    pub fn overlay_crosshair(&self, cells: &mut [CellData], arm: usize) {
        let term_height = self.height / 2;
        if cells.len() != self.width * term_height || term_height == 0 {
            return;
        }

        let cx = self.width / 2;
        let cy = term_height / 2;

        let mut invert = |x: usize, y: usize| {
            if x < self.width && y < term_height {
                let idx = y * self.width + x;
                cells[idx] = cells[idx].inverted();
            }
        };

        for dx in 1..=arm {
            invert(cx.saturating_sub(dx), cy);
            invert(cx + dx, cy);
        }
        // A cell is two pixels tall, so one cell per vertical arm
        invert(cx, cy.saturating_sub(1));
        invert(cx, cy + 1);
        invert(cx, cy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_block_fold() {
        let proc = FrameProcessor::new(2, 4);
        let mut frame = vec![0u8; 2 * 4 * 3];
        // row 0 red
        frame[0] = 255;
        frame[3] = 255;
        // row 1 green
        frame[7] = 255;
        frame[10] = 255;
        // row 2 blue
        frame[14] = 255;
        frame[17] = 255;
        // row 3 yellow
        frame[18] = 255;
        frame[19] = 255;
        frame[21] = 255;
        frame[22] = 255;

        let cells = proc.process_frame(&frame);
        assert_eq!(cells.len(), 2 * 2);

        assert_eq!(cells[0].char, '▀');
        assert_eq!(cells[0].fg, (255, 0, 0));
        assert_eq!(cells[0].bg, (0, 255, 0));
        assert_eq!(cells[2].fg, (0, 0, 255));
        assert_eq!(cells[2].bg, (255, 255, 0));
    }

    #[test]
    fn test_crosshair_inverts_center() {
        let proc = FrameProcessor::new(8, 8);
        let frame = vec![0u8; 8 * 8 * 3];
        let mut cells = proc.process_frame(&frame);

        proc.overlay_crosshair(&mut cells, 2);

        // Center cell (4, 2) inverted from black to white
        let center = cells[2 * 8 + 4];
        assert_eq!(center.fg, (255, 255, 255));
        assert_eq!(center.bg, (255, 255, 255));

        // Horizontal arm
        assert_eq!(cells[2 * 8 + 2].fg, (255, 255, 255));
        assert_eq!(cells[2 * 8 + 6].fg, (255, 255, 255));

        // Beyond the arm stays untouched
        assert_eq!(cells[2 * 8 + 7].fg, (0, 0, 0));
        assert_eq!(cells[0].fg, (0, 0, 0));
    }
}
