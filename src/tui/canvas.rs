//! Mapping between terminal cells, canvas space and layout space.
//!
//! Canvas space has its origin at the top-left of the drawing area, one unit
//! per column horizontally and [`ROW_UNITS`] per row vertically, so that a
//! terminal cell (roughly twice as tall as wide) is square in canvas units.

use comment_tree::tree::Viewport;
use ratatui::layout::Rect;

/// Canvas units per terminal row.
pub const ROW_UNITS: f64 = 2.0;

/// Rows kept free above the post node.
const TOP_MARGIN_ROWS: f64 = 2.0;

/// Zoom and pan chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Canvas units per layout unit.
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl ViewState {
    pub const MIN_ZOOM: f64 = 0.02;
    pub const MAX_ZOOM: f64 = 1.0;

    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 0.1,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// Drawing surface for one frame.
#[derive(Debug, Clone, Copy)]
pub struct TreeCanvas {
    pub area: Rect,
    pub viewport: Viewport,
}

impl TreeCanvas {
    /// The post node sits centred near the top; `root_y` is its layout `y`.
    pub fn new(area: Rect, view: &ViewState, root_y: f64) -> Self {
        let viewport = Viewport {
            center_x: f64::from(area.width) / 2.0,
            center_y: TOP_MARGIN_ROWS.mul_add(ROW_UNITS, -root_y * view.zoom),
            scale: view.zoom,
            offset_x: view.pan_x,
            offset_y: view.pan_y,
        };
        Self { area, viewport }
    }

    pub fn width_units(&self) -> f64 {
        f64::from(self.area.width)
    }

    pub fn height_units(&self) -> f64 {
        f64::from(self.area.height) * ROW_UNITS
    }

    /// Centre of a terminal cell in canvas space, if it lies in the area.
    pub fn cell_to_canvas(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let inside = column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height;
        inside.then(|| {
            (
                f64::from(column - self.area.x) + 0.5,
                (f64::from(row - self.area.y) + 0.5) * ROW_UNITS,
            )
        })
    }

    /// Layout coordinates to the y-up coordinates ratatui's canvas uses.
    pub fn to_draw(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.viewport.to_canvas(x, y);
        (cx, self.height_units() - cy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_lands_below_top_margin() {
        let canvas = TreeCanvas::new(Rect::new(0, 0, 80, 20), &ViewState::default(), -100.0);
        let (x, y) = canvas.viewport.to_canvas(0.0, -100.0);
        assert!((x - 40.0).abs() < 1e-9);
        assert!((y - TOP_MARGIN_ROWS * ROW_UNITS).abs() < 1e-9);
    }

    #[test]
    fn test_cell_mapping_respects_area() {
        let canvas = TreeCanvas::new(Rect::new(10, 5, 20, 10), &ViewState::default(), 0.0);
        assert_eq!(canvas.cell_to_canvas(10, 5), Some((0.5, 1.0)));
        assert_eq!(canvas.cell_to_canvas(12, 7), Some((2.5, 5.0)));
        assert_eq!(canvas.cell_to_canvas(9, 5), None);
        assert_eq!(canvas.cell_to_canvas(30, 5), None);
        assert_eq!(canvas.cell_to_canvas(10, 15), None);
    }

    #[test]
    fn test_draw_coordinates_flip_vertically() {
        let canvas = TreeCanvas::new(Rect::new(0, 0, 80, 20), &ViewState::default(), 0.0);
        let (_, top) = canvas.to_draw(0.0, 0.0);
        let (_, lower) = canvas.to_draw(0.0, 100.0);
        assert!(top > lower, "larger layout y is drawn lower on screen");
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewState::default();
        view.zoom_by(1000.0);
        assert!((view.zoom - ViewState::MAX_ZOOM).abs() < f64::EPSILON);
        view.zoom_by(0.0);
        assert!((view.zoom - ViewState::MIN_ZOOM).abs() < f64::EPSILON);
    }
}
