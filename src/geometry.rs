use serde::Serialize;

/// Axis-aligned rectangle in canvas units, stored by its two corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn mid_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    /// Half-open containment, so vertically stacked siblings never both claim
    /// the row they share.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Shrink every side by `amount`, collapsing to the centre rather than
    /// inverting when the rectangle is too small.
    pub fn inset(&self, amount: f64) -> Self {
        let dx = amount.min(self.width() / 2.0);
        let dy = amount.min(self.height() / 2.0);
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 - dx, self.y1 - dy)
    }
}
