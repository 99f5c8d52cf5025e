use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        if x < self.w && y < self.h {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn clear(&mut self, p: Pixel) {
        self.px.fill(p);
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: i32, y: i32) -> Option<Pixel> {
        if x < 0 || y < 0 || x as u32 >= self.w || y as u32 >= self.h {
            return None;
        }
        Some(self.px[self.idx(x as u32, y as u32)])
    }
    pub(crate) fn blend_over(&mut self, x: i32, y: i32, src: Pixel) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];

        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }

    /// Filled disc centred at `(cx, cy)`, shaded toward the rim.
    pub(crate) fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, col: Pixel) {
        if radius <= 0.0 {
            return;
        }
        let (x0, x1) = ((cx - radius).floor() as i32, (cx + radius).ceil() as i32);
        let (y0, y1) = ((cy - radius).floor() as i32, (cy + radius).ceil() as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > radius {
                    continue;
                }
                let t = 1.0 - dist / radius;
                let a = (col.a as f32 * (0.55 + 0.45 * t)).clamp(0.0, 255.0) as u8;
                self.blend_over(x, y, Pixel { a, ..col });
            }
        }
    }

    /// Circle outline of the given stroke width, centred on `radius`.
    pub(crate) fn stroke_ring(&mut self, cx: f32, cy: f32, radius: f32, stroke: f32, col: Pixel) {
        let half = stroke / 2.0;
        let outer = radius + half;
        if radius <= 0.0 || outer <= 0.0 {
            return;
        }
        let (x0, x1) = ((cx - outer).floor() as i32, (cx + outer).ceil() as i32);
        let (y0, y1) = ((cy - outer).floor() as i32, (cy + outer).ceil() as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                if (dist - radius).abs() <= half {
                    self.blend_over(x, y, col);
                }
            }
        }
    }
}

/// Rectangle in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rect {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) w: u16,
    pub(crate) h: u16,
}

impl Rect {
    pub(crate) fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }

    /// Same area in braille sub-pixels.
    pub(crate) fn to_viewport(self) -> Viewport {
        Viewport {
            x: self.x as i32 * 2,
            y: self.y as i32 * 4,
            w: self.w as i32 * 2,
            h: self.h as i32 * 4,
        }
    }
}

/// Rectangle in braille sub-pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) w: i32,
    pub(crate) h: i32,
}

impl Viewport {
    pub(crate) fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let prev = CellBuffer::new(cols, rows);
        let cur = CellBuffer::new(cols, rows);

        // Braille: 2×4 pixels per cell
        let canvas = PixelCanvas::new(cols as u32 * 2, rows as u32 * 4);

        Ok(Self {
            out,
            cols,
            rows,
            prev,
            cur,
            canvas,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            DisableMouseCapture,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.canvas = PixelCanvas::new(c as u32 * 2, r as u32 * 4);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Terminal bell; flushed with the next frame.
    pub(crate) fn bell(&mut self) -> anyhow::Result<()> {
        queue!(self.out, Print('\x07'))?;
        Ok(())
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

/// Converts the inked part of `canvas` into braille cells; cells with no
/// ink are left untouched so text drawn earlier survives.
pub(crate) fn canvas_to_cells(
    canvas: &PixelCanvas,
    out: &mut CellBuffer,
    enable_color: bool,
    bg: Color,
) {
    let cols = out.w as u32;
    let rows = out.h as u32;

    for cy in 0..rows {
        for cx in 0..cols {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut mask: u8 = 0;
            let mut sum_r: u32 = 0;
            let mut sum_g: u32 = 0;
            let mut sum_b: u32 = 0;
            let mut ink_count: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = px0 + dx;
                    let y = py0 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[canvas.idx(x, y)];

                    // threshold: treat alpha as ink
                    if p.a >= 32 {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        ink_count += 1;
                    }
                }
            }

            if ink_count == 0 {
                continue;
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');
            let fg = if enable_color {
                Color::Rgb {
                    r: (sum_r / ink_count) as u8,
                    g: (sum_g / ink_count) as u8,
                    b: (sum_b / ink_count) as u8,
                }
            } else {
                Color::White
            };

            out.set(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

/// Text centred horizontally inside `area`, truncated to its width.
pub(crate) fn draw_text_centered(buf: &mut CellBuffer, area: Rect, y: u16, s: &str, fg: Color) {
    let text: String = s.chars().take(area.w as usize).collect();
    let len = text.chars().count() as u16;
    let x = area.x + (area.w - len) / 2;
    draw_text(buf, x, y, &text, fg, Color::Black);
}

pub(crate) fn draw_frame(buf: &mut CellBuffer, area: Rect, fg: Color) {
    if area.w < 2 || area.h < 2 {
        return;
    }
    let cell = |ch| Cell {
        ch,
        fg,
        bg: Color::Black,
    };
    let (x1, y1) = (area.x + area.w - 1, area.y + area.h - 1);
    for x in area.x..=x1 {
        buf.set(x, area.y, cell('─'));
        buf.set(x, y1, cell('─'));
    }
    for y in area.y..=y1 {
        buf.set(area.x, y, cell('│'));
        buf.set(x1, y, cell('│'));
    }
    buf.set(area.x, area.y, cell('┌'));
    buf.set(x1, area.y, cell('┐'));
    buf.set(area.x, y1, cell('└'));
    buf.set(x1, y1, cell('┘'));
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Pixel = Pixel {
        r: 255,
        g: 0,
        b: 0,
        a: 255,
    };

    #[test]
    fn blend_outside_canvas_is_ignored() {
        let mut c = PixelCanvas::new(4, 4);
        c.blend_over(-1, 0, RED);
        c.blend_over(4, 4, RED);
        assert!(c.px.iter().all(|p| p.a == 0));
    }

    #[test]
    fn ring_leaves_center_empty() {
        let mut c = PixelCanvas::new(40, 40);
        c.stroke_ring(20.0, 20.0, 15.0, 2.0, RED);
        assert_eq!(c.get(20, 20).map(|p| p.a), Some(0));
        assert_eq!(c.get(34, 20).map(|p| p.a), Some(255));
    }

    #[test]
    fn inked_canvas_becomes_braille() {
        let mut c = PixelCanvas::new(2, 4);
        c.blend_over(0, 0, RED);
        let mut buf = CellBuffer::new(1, 1);
        canvas_to_cells(&c, &mut buf, true, Color::Black);
        let cell = buf.get(0, 0).unwrap();
        assert_eq!(cell.ch, '\u{2801}');
        assert_eq!(cell.fg, Color::Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn empty_canvas_keeps_text() {
        let c = PixelCanvas::new(8, 4);
        let mut buf = CellBuffer::new(4, 1);
        draw_text(&mut buf, 0, 0, "hey!", Color::White, Color::Black);
        canvas_to_cells(&c, &mut buf, true, Color::Black);
        let s: String = buf.cells.iter().map(|c| c.ch).collect();
        assert_eq!(s, "hey!");
    }

    #[test]
    fn centered_text_is_truncated() {
        let mut buf = CellBuffer::new(10, 1);
        let area = Rect {
            x: 2,
            y: 0,
            w: 4,
            h: 1,
        };
        draw_text_centered(&mut buf, area, 0, "Watermelon", Color::White);
        let s: String = buf.cells.iter().map(|c| c.ch).collect();
        assert_eq!(s, "  Wate    ");
    }
}
