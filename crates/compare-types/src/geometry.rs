use serde::{Deserialize, Serialize};

/// Rectangle in page space (PDF points, top-left origin as reported by the viewer)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal slice between two fractions of the width (0.0 to 1.0)
    ///
    /// Used to narrow a line rectangle to the part covered by a sub-range of
    /// its text. Fractions are clamped so the slice never leaves the rectangle.
    pub fn slice_horizontal(&self, start: f64, end: f64) -> PdfRect {
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(start, 1.0);
        PdfRect {
            x: self.x + self.width * start,
            y: self.y,
            width: self.width * (end - start),
            height: self.height,
        }
    }

    /// Smallest rectangle containing both inputs
    pub fn union(&self, other: &PdfRect) -> PdfRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        PdfRect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}
