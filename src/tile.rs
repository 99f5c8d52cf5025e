use crate::catalog::{CatalogEntry, ItemId};
use crate::render::{Pixel, PixelCanvas, Viewport};

/// Ring stroke width, in sub-pixels.
pub(crate) const RING_STROKE: f32 = 2.0;
/// Gap between the ring's centre line and the tile edge. Must be at least
/// half the stroke so the ring stays inside the tile.
pub(crate) const RING_INSET: f32 = 2.0;

const RING_COLOR: Pixel = Pixel {
    r: 255,
    g: 30,
    b: 30,
    a: 255,
};

/// One grid cell showing a single item.
#[derive(Clone, Debug)]
pub(crate) struct Tile {
    item: ItemId,
    highlighted: bool,
    needs_redraw: bool,
}

impl Tile {
    pub(crate) fn new(item: ItemId) -> Self {
        Self {
            item,
            highlighted: false,
            needs_redraw: true,
        }
    }

    pub(crate) fn bind(&mut self, item: ItemId) {
        self.item = item;
        self.highlighted = false;
        self.needs_redraw = true;
    }

    pub(crate) fn item(&self) -> ItemId {
        self.item
    }

    pub(crate) fn highlighted(&self) -> bool {
        self.highlighted
    }

    pub(crate) fn set_highlighted(&mut self, on: bool) {
        self.highlighted = on;
        self.needs_redraw = true;
    }

    /// Returns whether a redraw was requested since the last call.
    pub(crate) fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.needs_redraw, false)
    }

    pub(crate) fn draw(&self, canvas: &mut PixelCanvas, vp: Viewport, entry: &CatalogEntry) {
        let (cx, cy) = vp.center();
        let ring_r = ring_radius(vp.w as f32, vp.h as f32);
        canvas.fill_disc(cx, cy, image_radius(vp.w as f32, vp.h as f32), entry.color);
        if self.highlighted {
            canvas.stroke_ring(cx, cy, ring_r, RING_STROKE, RING_COLOR);
        }
    }
}

/// Radius of the item disc; independent of the ring so tiles too small
/// for a ring still show their item.
pub(crate) fn image_radius(w: f32, h: f32) -> f32 {
    w.min(h) * 0.35
}

/// Radius of the highlight ring for a `w`×`h` tile.
pub(crate) fn ring_radius(w: f32, h: f32) -> f32 {
    (w.min(h) / 2.0 - RING_INSET).max(0.0)
}
