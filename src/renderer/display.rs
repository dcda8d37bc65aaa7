use anyhow::Result;
use crossterm::{
    cursor,
    style::Print,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use std::io::{BufWriter, Stdout, Write};

use super::cell::CellData;

/// Rows at the bottom reserved for the hex readout / key hints.
pub const STATUS_ROWS: u16 = 2;

/// Owns the raw-mode terminal and renders cell diffs as TrueColor ANSI.
///
/// Dropping it restores the cursor, the main screen buffer and cooked mode.
pub struct DisplayManager {
    stdout: BufWriter<Stdout>,
    last_cells: Option<Vec<CellData>>,
    render_buffer: Vec<u8>,
}

impl DisplayManager {
    pub fn new() -> Result<Self> {
        // Large output buffer keeps a full-frame redraw to one syscall
        let stdout = BufWriter::with_capacity(1024 * 1024, std::io::stdout());
        let mut dm = Self {
            stdout,
            last_cells: None,
            render_buffer: Vec::with_capacity(1024 * 1024),
        };

        dm.initialize_terminal()?;

        Ok(dm)
    }

    fn initialize_terminal(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.execute(EnterAlternateScreen)?;
        self.stdout.execute(cursor::Hide)?;

        // Disable line wrapping so edge cells never scroll the screen
        self.stdout.execute(Print("\x1b[?7l"))?;

        // Synchronized updates (DECSM 2026): terminal holds partial frames
        self.stdout.execute(Print("\x1b[?2026h"))?;

        Ok(())
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    /// Columns x cell rows available for the preview grid.
    pub fn preview_area(&self) -> Result<(u16, u16)> {
        let (cols, rows) = self.size()?;
        Ok((cols, rows.saturating_sub(STATUS_ROWS)))
    }

    /// Forget the previous frame so the next render redraws everything.
    pub fn invalidate(&mut self) {
        self.last_cells = None;
    }

    #[inline(always)]
    fn write_u8_fast(buffer: &mut Vec<u8>, mut n: u8) {
        if n >= 100 {
            buffer.push(b'0' + (n / 100));
            n %= 100;
            buffer.push(b'0' + (n / 10));
            buffer.push(b'0' + (n % 10));
        } else if n >= 10 {
            buffer.push(b'0' + (n / 10));
            buffer.push(b'0' + (n % 10));
        } else {
            buffer.push(b'0' + n);
        }
    }

    #[inline(always)]
    fn write_u16_fast(buffer: &mut Vec<u8>, n: u16) {
        let mut digits = [0u8; 5];
        let mut len = 0;
        let mut value = n;
        loop {
            digits[len] = b'0' + (value % 10) as u8;
            value /= 10;
            len += 1;
            if value == 0 {
                break;
            }
        }
        while len > 0 {
            len -= 1;
            buffer.push(digits[len]);
        }
    }

    /// Diff `cells` against the previously rendered frame and emit only the
    /// changes, with zero allocation on the hot path.
    pub fn render_diff(&mut self, cells: &[CellData], width: usize) -> Result<()> {
        self.render_buffer.clear();
        let buffer = &mut self.render_buffer;

        buffer.extend_from_slice(b"\x1b[?2026h");

        let mut force_redraw = false;
        if self.last_cells.as_ref().map(|v| v.len()).unwrap_or(0) != cells.len() {
            buffer.extend_from_slice(b"\x1b[2J");
            self.last_cells = Some(vec![CellData::default(); cells.len()]);
            force_redraw = true;
        }

        let last_cells = match &mut self.last_cells {
            Some(v) => v,
            None => return Ok(()),
        };

        let (term_cols, term_rows) = terminal::size().unwrap_or((80, 24));
        let view_rows = term_rows.saturating_sub(STATUS_ROWS);

        let content_width = width as u16;
        let content_height = (cells.len() / width.max(1)) as u16;

        let offset_x = if term_cols > content_width {
            (term_cols - content_width) / 2
        } else {
            0
        };
        let offset_y = if view_rows > content_height {
            (view_rows - content_height) / 2
        } else {
            0
        };

        let mut last_fg: Option<(u8, u8, u8)> = None;
        let mut last_bg: Option<(u8, u8, u8)> = None;

        // Virtual cursor; -1 forces a move escape
        let mut cursor_x: i32 = -1;
        let mut cursor_y: i32 = -1;

        for (i, cell) in cells.iter().enumerate() {
            let old_cell = &last_cells[i];

            let is_different = force_redraw
                || cell.char != old_cell.char
                || cell.fg != old_cell.fg
                || cell.bg != old_cell.bg;

            if !is_different {
                cursor_x = -1;
                continue;
            }

            let x = (i % width) as u16;
            let y = (i / width) as u16;

            let target_x = x + offset_x;
            let target_y = y + offset_y;

            if target_x >= term_cols || target_y >= view_rows {
                cursor_x = -1;
                continue;
            }

            if cursor_x != target_x as i32 || cursor_y != target_y as i32 {
                buffer.extend_from_slice(b"\x1b[");
                Self::write_u16_fast(buffer, target_y + 1);
                buffer.push(b';');
                Self::write_u16_fast(buffer, target_x + 1);
                buffer.push(b'H');

                cursor_x = target_x as i32;
                cursor_y = target_y as i32;
            }

            if Some(cell.fg) != last_fg {
                buffer.extend_from_slice(b"\x1b[38;2;");
                Self::write_u8_fast(buffer, cell.fg.0);
                buffer.push(b';');
                Self::write_u8_fast(buffer, cell.fg.1);
                buffer.push(b';');
                Self::write_u8_fast(buffer, cell.fg.2);
                buffer.push(b'm');
                last_fg = Some(cell.fg);
            }
            if Some(cell.bg) != last_bg {
                buffer.extend_from_slice(b"\x1b[48;2;");
                Self::write_u8_fast(buffer, cell.bg.0);
                buffer.push(b';');
                Self::write_u8_fast(buffer, cell.bg.1);
                buffer.push(b';');
                Self::write_u8_fast(buffer, cell.bg.2);
                buffer.push(b'm');
                last_bg = Some(cell.bg);
            }

            let mut encoded = [0u8; 4];
            buffer.extend_from_slice(cell.char.encode_utf8(&mut encoded).as_bytes());

            last_cells[i] = *cell;
            cursor_x += 1;
        }

        buffer.extend_from_slice(b"\x1b[0m");
        buffer.extend_from_slice(b"\x1b[?2026l");

        self.stdout.write_all(buffer)?;
        self.stdout.flush()?;

        Ok(())
    }

    /// Draw the readout line and the key-hint line at the bottom.
    ///
    /// `swatch` paints a block of the current color next to the text.
    pub fn draw_status(
        &mut self,
        readout: &str,
        swatch: Option<(u8, u8, u8)>,
        hints: &str,
    ) -> Result<()> {
        let (_, term_rows) = terminal::size().unwrap_or((80, 24));
        if term_rows < STATUS_ROWS {
            return Ok(());
        }

        let readout_row = term_rows - STATUS_ROWS + 1;
        let hint_row = term_rows;

        let mut line = format!("\x1b[{};1H\x1b[0m\x1b[2K {}", readout_row, readout);
        if let Some((r, g, b)) = swatch {
            line.push_str(&format!("  \x1b[48;2;{};{};{}m      \x1b[0m", r, g, b));
        }
        line.push_str(&format!("\x1b[{};1H\x1b[2K\x1b[2m {}\x1b[0m", hint_row, hints));

        self.stdout.write_all(line.as_bytes())?;
        self.stdout.flush()?;

        Ok(())
    }
}

impl Drop for DisplayManager {
    fn drop(&mut self) {
        let _ = self.stdout.execute(Print("\x1b[?2026l"));
        let _ = self.stdout.execute(Print("\x1b[?7h"));
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
