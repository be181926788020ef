//! Pixel-space geometry.

use serde::{Deserialize, Serialize};

/// Bounding rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge x-coordinate
    pub x: f64,
    /// Top edge y-coordinate
    pub y: f64,
    /// Rectangle width
    pub width: f64,
    /// Rectangle height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    /// Rectangle area in pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Compute Intersection over Union with another rectangle.
    pub fn iou(&self, other: &Rect) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Lower-third sub-rectangle (the mouth region of a face box).
    pub fn lower_third(&self) -> Rect {
        let third = self.height / 3.0;
        Rect {
            x: self.x,
            y: self.y + 2.0 * third,
            width: self.width,
            height: third,
        }
    }

    /// Check the rectangle has positive extent and lies within a frame.
    pub fn is_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x2() <= frame_width as f64 + 1e-6
            && self.y2() <= frame_height as f64 + 1e-6
    }
}

/// Integer crop rectangle, always within source bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge x-coordinate
    pub x: u32,
    /// Top edge y-coordinate
    pub y: u32,
    /// Crop width
    pub width: u32,
    /// Crop height
    pub height: u32,
}

impl CropRect {
    /// Create a new crop rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x as f64 + self.width as f64 / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y as f64 + self.height as f64 / 2.0
    }

    /// Width/height ratio.
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Check the crop lies fully within a frame of the given size.
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.saturating_add(self.width) <= frame_width
            && self.y.saturating_add(self.height) <= frame_height
    }
}

impl std::fmt::Display for CropRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_iou_partial_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);

        // Intersection: 50x50 = 2500
        // Union: 10000 + 10000 - 2500 = 17500
        let iou = a.iou(&b);
        assert!((iou - 2500.0 / 17500.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_iou_disjoint() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(100.0, 100.0, 50.0, 50.0);

        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_rect_iou_identical() {
        let a = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_lower_third() {
        let face = Rect::new(100.0, 90.0, 60.0, 90.0);
        let mouth = face.lower_third();

        assert_eq!(mouth.x, 100.0);
        assert_eq!(mouth.y, 150.0);
        assert_eq!(mouth.width, 60.0);
        assert_eq!(mouth.height, 30.0);
    }

    #[test]
    fn test_crop_rect_fits_within() {
        let crop = CropRect::new(100, 0, 608, 1080);
        assert!(crop.fits_within(1920, 1080));
        assert!(!crop.fits_within(600, 1080));
        assert!(!crop.fits_within(1920, 1000));
    }

    #[test]
    fn test_crop_rect_aspect() {
        let crop = CropRect::new(0, 0, 1080, 1920);
        assert!((crop.aspect() - 0.5625).abs() < 1e-9);
    }

    #[test]
    fn test_crop_rect_display() {
        let crop = CropRect::new(656, 0, 608, 1080);
        assert_eq!(crop.to_string(), "608x1080+656+0");
    }
}
