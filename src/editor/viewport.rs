//! Pan/zoom transform between canvas (world) and screen coordinates.

use egui::{Pos2, Rect, Vec2};

pub const DEFAULT_MIN_ZOOM: f32 = 0.25;
pub const DEFAULT_MAX_ZOOM: f32 = 2.0;

/// Screen padding kept around the content by `zoom_to_fit`.
const FIT_PADDING: f32 = 40.0;

/// `screen = origin + pan + world * zoom`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left of the canvas widget on screen, refreshed every frame.
    pub origin: Pos2,
    pub pan: Vec2,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }
}

impl Viewport {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        let min_zoom = if min_zoom > 0.0 { min_zoom } else { DEFAULT_MIN_ZOOM };
        let max_zoom = max_zoom.max(min_zoom);
        Self {
            origin: Pos2::ZERO,
            pan: Vec2::ZERO,
            zoom: 1.0_f32.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        self.origin + self.pan + world.to_vec2() * self.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        ((screen - self.origin - self.pan) / self.zoom).to_pos2()
    }

    pub fn world_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.world_to_screen(rect.min), self.world_to_screen(rect.max))
    }

    /// Multiply the zoom by `factor`, keeping the world point under
    /// `anchor` (a screen position) fixed.
    pub fn zoom_by(&mut self, factor: f32, anchor: Pos2) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let world = self.screen_to_world(anchor);
        self.set_zoom(self.zoom * factor);
        self.pan = anchor - self.origin - world.to_vec2() * self.zoom;
    }

    /// Unbounded pan in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Fit `content` (world) into `screen` with some padding.
    pub fn zoom_to_fit(&mut self, content: Rect, screen: Rect) {
        if !content.is_positive() {
            self.reset();
            return;
        }
        let avail = (screen.size() - Vec2::splat(2.0 * FIT_PADDING)).max(Vec2::splat(1.0));
        let zoom = (avail.x / content.width()).min(avail.y / content.height());
        self.set_zoom(zoom);
        self.pan = screen.center() - self.origin - content.center().to_vec2() * self.zoom;
    }

    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.set_zoom(1.0);
    }
}

/// Bounding box of blocks given their top-left corners and a common size.
pub fn content_rect(positions: impl IntoIterator<Item = Pos2>, block_size: Vec2) -> Option<Rect> {
    positions
        .into_iter()
        .map(|p| Rect::from_min_size(p, block_size))
        .reduce(|a, b| a.union(b))
}
