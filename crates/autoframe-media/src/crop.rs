//! Fixed-aspect crop window computation.
//!
//! Converts a face position into a crop rectangle at the target aspect
//! ratio. Crops keep full source height and shift horizontally; a source
//! too narrow for the target width collapses to a degraded full-width
//! window that the renderer pads.

use autoframe_models::{CropRect, Rect, Resolution};

/// A computed crop window plus whether it met the target aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    pub crop: CropRect,
    pub degraded: bool,
}

/// Maps face positions to crop windows within one source frame.
pub struct CropMapper {
    target_ratio: f64,
    frame_width: u32,
    frame_height: u32,
}

impl CropMapper {
    /// Create a mapper for one source geometry and output resolution.
    pub fn new(target_resolution: Resolution, frame_width: u32, frame_height: u32) -> Self {
        Self {
            target_ratio: target_resolution.aspect(),
            frame_width,
            frame_height,
        }
    }

    /// Crop centered on a face box.
    pub fn plan_for_face(&self, face: &Rect) -> CropPlan {
        self.plan_centered(face.cx())
    }

    /// Centered crop used when no face drives the framing.
    pub fn default_plan(&self) -> CropPlan {
        self.plan_centered(self.frame_width as f64 / 2.0)
    }

    /// Full-height crop at the target aspect, horizontally centered on
    /// `center_x`, clamped by shifting into source bounds.
    pub fn plan_centered(&self, center_x: f64) -> CropPlan {
        let crop_height = even_floor(self.frame_height);
        let crop_width = even_round(crop_height as f64 * self.target_ratio);

        if crop_width > self.frame_width {
            return self.degraded_plan();
        }

        let max_x = self.frame_width - crop_width;
        let x = (center_x - crop_width as f64 / 2.0).round().max(0.0) as u32;
        let x = x.min(max_x);
        let y = (self.frame_height - crop_height) / 2;

        CropPlan {
            crop: CropRect::new(x, y, crop_width, crop_height),
            degraded: false,
        }
    }

    /// Source narrower than the target width: full source width, centered
    /// vertically. Output framing no longer follows the face.
    fn degraded_plan(&self) -> CropPlan {
        let crop_width = even_floor(self.frame_width);
        let wanted_height = even_round(crop_width as f64 / self.target_ratio);
        let crop_height = wanted_height.min(even_floor(self.frame_height));
        let y = (self.frame_height - crop_height) / 2;

        CropPlan {
            crop: CropRect::new(0, y, crop_width, crop_height),
            degraded: true,
        }
    }
}

// Even dimensions are required by most codecs.
fn even_floor(v: u32) -> u32 {
    v & !1
}

fn even_round(v: f64) -> u32 {
    ((v.round() as u32) / 2) * 2
}
