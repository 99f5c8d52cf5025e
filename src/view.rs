use crate::catalog::{Catalog, ItemId};
use crate::clock::format_seconds;
use crate::render::{
    canvas_to_cells, draw_frame, draw_text, draw_text_centered, Cell, CellBuffer, PixelCanvas,
    Rect,
};
use crate::session::{Cue, Phase, ScoreColor, SessionStats, TargetStatus, View};
use crate::tile::Tile;
use crossterm::style::Color;

const HEADER_ROWS: u16 = 7;
const START_LABEL: &str = "[ Start ]";

/// Slot keys, in grid order.
pub(crate) const SLOT_KEYS: [char; 10] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) start: Rect,
    pub(crate) grid: Rect,
    pub(crate) tiles: Vec<Rect>,
}

/// Splits a `cols`×`rows` screen into header, start control and an
/// evenly divided tile grid.
pub(crate) fn layout(cols: u16, rows: u16, columns: usize, tiles: usize) -> Layout {
    let start = Rect {
        x: 1,
        y: 5,
        w: (START_LABEL.len() as u16).min(cols.saturating_sub(1)),
        h: 1,
    };
    // one column each side and one row below for the cue frame
    let grid = Rect {
        x: 1,
        y: HEADER_ROWS.min(rows),
        w: cols.saturating_sub(2),
        h: rows.saturating_sub(HEADER_ROWS + 2),
    };

    let mut rects = Vec::with_capacity(tiles);
    if tiles > 0 {
        let per_row = columns.clamp(1, tiles);
        let grid_rows = tiles.div_ceil(per_row);
        let tw = grid.w / per_row as u16;
        let th = grid.h / grid_rows as u16;
        for i in 0..tiles {
            let (c, r) = ((i % per_row) as u16, (i / per_row) as u16);
            rects.push(Rect {
                x: grid.x + c * tw,
                y: grid.y + r * th,
                w: tw,
                h: th,
            });
        }
    }

    Layout {
        start,
        grid,
        tiles: rects,
    }
}

pub(crate) struct DrawContext<'a> {
    pub(crate) catalog: &'a Catalog,
    pub(crate) stats: SessionStats,
    pub(crate) phase: Phase,
    pub(crate) flash: Option<Cue>,
    pub(crate) enable_color: bool,
    pub(crate) show_help: bool,
}

/// Terminal side of the game screen.
pub(crate) struct BoardView {
    columns: usize,
    tiles: Vec<Tile>,
    title: String,
    targets: Vec<TargetStatus>,
    score: (String, ScoreColor),
    start_enabled: bool,
    layout: Option<Layout>,
    dirty: bool,
}

impl BoardView {
    pub(crate) fn new(columns: usize) -> Self {
        Self {
            columns,
            tiles: Vec::new(),
            title: "Press Start".to_string(),
            targets: Vec::new(),
            score: (String::new(), ScoreColor::Neutral),
            start_enabled: true,
            layout: None,
            dirty: true,
        }
    }

    pub(crate) fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    #[cfg(test)]
    pub(crate) fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Whether anything changed since the last call. Drains every tile's
    /// redraw request.
    pub(crate) fn take_dirty(&mut self) -> bool {
        let tiles = self
            .tiles
            .iter_mut()
            .fold(false, |acc, t| t.take_redraw() | acc);
        std::mem::replace(&mut self.dirty, false) | tiles
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn relayout(&mut self, cols: u16, rows: u16) {
        let next = layout(cols, rows, self.columns, self.tiles.len());
        if self.layout.as_ref() != Some(&next) {
            self.layout = Some(next);
            self.dirty = true;
        }
    }

    pub(crate) fn tile_at(&self, x: u16, y: u16) -> Option<ItemId> {
        let layout = self.layout.as_ref()?;
        layout
            .tiles
            .iter()
            .zip(&self.tiles)
            .find(|(r, _)| r.contains(x, y))
            .map(|(_, t)| t.item())
    }

    pub(crate) fn tile_in_slot(&self, slot: usize) -> Option<ItemId> {
        self.tiles.get(slot).map(Tile::item)
    }

    pub(crate) fn start_at(&self, x: u16, y: u16) -> bool {
        self.layout.as_ref().is_some_and(|l| l.start.contains(x, y))
    }

    pub(crate) fn draw(&self, buf: &mut CellBuffer, canvas: &mut PixelCanvas, ctx: &DrawContext) {
        let bg = Color::Black;
        buf.clear(bg);
        canvas.clear(Default::default());

        draw_text(buf, 1, 0, "Seek & Tap", Color::White, bg);
        draw_text(buf, 1, 2, &self.title, Color::White, bg);

        let mut x = 1u16;
        for t in &self.targets {
            let label = format!("[{}]", t.name);
            let fg = if t.found { Color::Cyan } else { Color::Red };
            draw_text(buf, x, 3, &label, fg, bg);
            x = x.saturating_add(label.chars().count() as u16 + 2);
        }

        let (score, tone) = &self.score;
        let score_fg = match tone {
            ScoreColor::Neutral => Color::White,
            ScoreColor::Highlight => Color::Red,
        };
        draw_text(buf, 1, 4, score, score_fg, bg);
        if let Some(best) = ctx.stats.best_ms {
            let best = format!("Best: {}", format_seconds(best));
            let bx = buf.w.saturating_sub(best.len() as u16 + 1);
            draw_text(buf, bx, 4, &best, Color::Yellow, bg);
        }

        let Some(layout) = &self.layout else {
            return;
        };

        let start_fg = if self.start_enabled {
            Color::Green
        } else {
            Color::DarkGrey
        };
        draw_text(buf, layout.start.x, layout.start.y, START_LABEL, start_fg, bg);

        let frame_fg = match ctx.flash {
            Some(Cue::Start) => Color::Yellow,
            Some(Cue::Correct) => Color::Green,
            Some(Cue::Incorrect) => Color::Red,
            None => Color::DarkGrey,
        };
        let frame = Rect {
            x: layout.grid.x - 1,
            y: layout.grid.y.saturating_sub(1),
            w: layout.grid.w + 2,
            h: layout.grid.h + 2,
        };
        draw_frame(buf, frame, frame_fg);

        let mut glyphs = Vec::with_capacity(self.tiles.len());
        for (i, (rect, tile)) in layout.tiles.iter().zip(&self.tiles).enumerate() {
            let Some(entry) = ctx.catalog.entry(tile.item()) else {
                continue;
            };
            if rect.w < 3 || rect.h < 3 {
                continue;
            }
            // one cell margin on each side, bottom row for the label
            let image = Rect {
                x: rect.x + 1,
                y: rect.y + 1,
                w: rect.w - 2,
                h: rect.h - 2,
            };
            tile.draw(canvas, image.to_viewport(), entry);
            glyphs.push((image.x + image.w / 2, image.y + image.h / 2, entry));

            let key = SLOT_KEYS.get(i).copied().unwrap_or(' ');
            let label = format!("{key} {}", entry.name);
            let fg = if tile.highlighted() {
                Color::Red
            } else {
                Color::Grey
            };
            draw_text_centered(buf, *rect, rect.y + rect.h - 1, &label, fg);
        }

        canvas_to_cells(canvas, buf, ctx.enable_color, bg);

        // glyph goes over the braille disc, in the disc's colour
        for (gx, gy, entry) in glyphs {
            let disc = if ctx.enable_color {
                Color::Rgb {
                    r: entry.color.r,
                    g: entry.color.g,
                    b: entry.color.b,
                }
            } else {
                Color::White
            };
            buf.set(
                gx,
                gy,
                Cell {
                    ch: entry.glyph,
                    fg: Color::Black,
                    bg: disc,
                },
            );
        }

        if ctx.show_help {
            draw_help(buf);
        }

        let hint = match ctx.phase {
            Phase::Idle => "Keys: enter start | h help | q quit",
            Phase::InRound => "Keys: 1-0 or click to tap | h help | q quit",
        };
        draw_text(buf, 1, buf.h.saturating_sub(1), hint, Color::DarkGrey, bg);
    }
}

fn draw_help(buf: &mut CellBuffer) {
    let body = [
        "Find every item named above the grid.",
        "Tap a tile with the mouse or its number key.",
        "",
        "Found items turn cyan and get a red ring.",
        "A wrong tile, or one already found, rings",
        "the bell.",
        "",
        "The clock stops when the last item is found.",
        "",
        "h or Esc closes this box.",
    ];
    let w = 50u16.min(buf.w.saturating_sub(2));
    let h = (body.len() as u16 + 4).min(buf.h.saturating_sub(2));
    let area = Rect {
        x: (buf.w - w) / 2,
        y: (buf.h - h) / 2,
        w,
        h,
    };
    for y in area.y..area.y + area.h {
        draw_text(buf, area.x, y, &" ".repeat(area.w as usize), Color::White, Color::Black);
    }
    draw_frame(buf, area, Color::White);
    draw_text(buf, area.x + 2, area.y + 1, "How to play", Color::White, Color::Black);
    for (i, line) in body.iter().enumerate() {
        let y = area.y + 3 + i as u16;
        if y + 1 >= area.y + area.h {
            break;
        }
        draw_text(buf, area.x + 2, y, line, Color::White, Color::Black);
    }
}

impl View for BoardView {
    fn render_tiles(&mut self, order: &[ItemId]) {
        self.tiles.truncate(order.len());
        for (i, &item) in order.iter().enumerate() {
            match self.tiles.get_mut(i) {
                Some(tile) => tile.bind(item),
                None => self.tiles.push(Tile::new(item)),
            }
        }
        self.layout = None;
        self.dirty = true;
    }

    fn set_tile_highlighted(&mut self, item: ItemId, on: bool) {
        if let Some(tile) = self.tiles.iter_mut().find(|t| t.item() == item) {
            tile.set_highlighted(on);
        }
    }

    fn set_status_title(&mut self, text: &str) {
        self.title = text.to_string();
        self.dirty = true;
    }

    fn set_status_targets(&mut self, targets: &[TargetStatus]) {
        self.targets = targets.to_vec();
        self.dirty = true;
    }

    fn set_score_text(&mut self, text: &str, color: ScoreColor) {
        self.score = (text.to_string(), color);
        self.dirty = true;
    }

    fn set_start_enabled(&mut self, enabled: bool) {
        self.start_enabled = enabled;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::session::SessionStats;

    fn board_with(order: &[usize]) -> BoardView {
        let mut v = BoardView::new(5);
        let ids: Vec<ItemId> = order.iter().copied().map(ItemId).collect();
        v.render_tiles(&ids);
        v.relayout(80, 24);
        v
    }

    fn row_text(buf: &CellBuffer, y: u16) -> String {
        (0..buf.w).filter_map(|x| buf.get(x, y)).map(|c| c.ch).collect()
    }

    #[test]
    fn ten_tiles_make_a_five_by_two_grid() {
        let l = layout(80, 24, 5, 10);
        assert_eq!(l.tiles.len(), 10);
        assert_eq!(l.grid.h, 15);
        assert_eq!(l.tiles[0], Rect { x: 1, y: 7, w: 15, h: 7 });
        assert_eq!(l.tiles[9], Rect { x: 61, y: 14, w: 15, h: 7 });
    }

    #[test]
    fn tiny_screen_does_not_panic() {
        let l = layout(3, 2, 5, 10);
        assert!(l.tiles.iter().all(|r| r.w == 0 || r.h == 0));
        let mut v = board_with(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        v.relayout(3, 2);
        let cat = Catalog::fruits();
        let mut buf = CellBuffer::new(3, 2);
        let mut canvas = PixelCanvas::new(6, 8);
        let ctx = DrawContext {
            catalog: &cat,
            stats: SessionStats::default(),
            phase: Phase::Idle,
            flash: None,
            enable_color: true,
            show_help: true,
        };
        v.draw(&mut buf, &mut canvas, &ctx);
    }

    #[test]
    fn clicks_and_slots_map_to_items() {
        let v = board_with(&[7, 2, 9, 0, 1, 3, 4, 5, 6, 8]);
        assert_eq!(v.tile_at(1, 7), Some(ItemId(7)));
        assert_eq!(v.tile_at(17, 8), Some(ItemId(2)));
        assert_eq!(v.tile_at(75, 20), Some(ItemId(8)));
        assert_eq!(v.tile_at(0, 7), None);
        assert_eq!(v.tile_at(10, 2), None);
        assert_eq!(v.tile_in_slot(2), Some(ItemId(9)));
        assert_eq!(v.tile_in_slot(10), None);
        assert!(v.start_at(3, 5));
        assert!(!v.start_at(3, 6));
    }

    #[test]
    fn highlight_marks_view_dirty_once() {
        let mut v = board_with(&[0, 1, 2]);
        assert!(v.take_dirty());
        assert!(!v.take_dirty());
        v.set_tile_highlighted(ItemId(1), true);
        assert!(v.tiles()[1].highlighted());
        assert!(v.take_dirty());
        assert!(!v.take_dirty());
        v.set_tile_highlighted(ItemId(9), true);
        assert!(!v.take_dirty());
    }

    #[test]
    fn new_tiles_start_unhighlighted() {
        let mut v = board_with(&[0, 1]);
        v.set_tile_highlighted(ItemId(0), true);
        v.render_tiles(&[ItemId(1), ItemId(0)]);
        assert!(v.tiles().iter().all(|t| !t.highlighted()));
    }

    #[test]
    fn status_lines_are_drawn() {
        let mut v = board_with(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        v.set_status_title("Find 2 items");
        v.set_status_targets(&[
            TargetStatus { name: "Apple", found: true },
            TargetStatus { name: "Pear", found: false },
        ]);
        v.set_score_text("Clear time: 1.50 s", ScoreColor::Highlight);
        let cat = Catalog::fruits();
        let mut buf = CellBuffer::new(80, 24);
        let mut canvas = PixelCanvas::new(160, 96);
        let ctx = DrawContext {
            catalog: &cat,
            stats: SessionStats {
                best_ms: Some(1200),
                ..SessionStats::default()
            },
            phase: Phase::InRound,
            flash: Some(Cue::Correct),
            enable_color: true,
            show_help: false,
        };
        v.draw(&mut buf, &mut canvas, &ctx);

        assert!(row_text(&buf, 2).starts_with(" Find 2 items"));
        assert!(row_text(&buf, 3).starts_with(" [Apple]  [Pear]"));
        assert_eq!(buf.get(2, 3).map(|c| c.fg), Some(Color::Cyan));
        assert_eq!(buf.get(11, 3).map(|c| c.fg), Some(Color::Red));
        assert!(row_text(&buf, 4).contains("Clear time: 1.50 s"));
        assert!(row_text(&buf, 4).trim_end().ends_with("Best: 1.20 s"));
        assert!(row_text(&buf, 13).contains("1 Apple"));
        assert_eq!(buf.get(0, 6).map(|c| c.fg), Some(Color::Green));
    }

    #[test]
    fn glyph_marks_the_center_of_each_image() {
        let mut v = board_with(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        v.relayout(80, 24);
        let cat = Catalog::fruits();
        let mut buf = CellBuffer::new(80, 24);
        let mut canvas = PixelCanvas::new(160, 96);
        let mut ctx = DrawContext {
            catalog: &cat,
            stats: SessionStats::default(),
            phase: Phase::InRound,
            flash: None,
            enable_color: true,
            show_help: false,
        };
        v.draw(&mut buf, &mut canvas, &ctx);

        // tile 0 spans x 1..16, y 7..14; its image is x 2..15, y 8..13
        let apple = buf.get(8, 10).unwrap();
        assert_eq!(apple.ch, 'A');
        assert_eq!(apple.bg, Color::Rgb { r: 230, g: 40, b: 50 });
        // tile 1 starts at x 16
        assert_eq!(buf.get(23, 10).map(|c| c.ch), Some('B'));

        ctx.enable_color = false;
        v.draw(&mut buf, &mut canvas, &ctx);
        assert_eq!(buf.get(8, 10).map(|c| (c.ch, c.bg)), Some(('A', Color::White)));
    }
}
