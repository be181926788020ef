//! Portrait frame rendering.
//!
//! Applies the selected crop to each frame and scales it to the output
//! resolution. The pixel work sits behind [`FrameResampler`] so tests and
//! alternate scalers can be substituted; any failure is fatal for the run
//! and carries the failing frame index.

use std::sync::Arc;

use autoframe_models::{CropRect, Resolution};

use crate::error::{MediaError, MediaResult};
use crate::frame::Frame;

/// Pixel resampling seam.
pub trait FrameResampler: Send + Sync {
    /// Scale `crop` of `frame` to the target resolution.
    fn resample(&self, frame: &Frame, crop: CropRect, target: Resolution) -> MediaResult<Frame>;
}

/// Built-in nearest-neighbor resampler.
///
/// Crops at the target aspect stretch to fill the output. A crop whose
/// aspect does not match (degraded mode) is scaled to fit and padded
/// symmetrically with the configured fill value.
pub struct NearestResampler {
    padding_value: u8,
}

impl NearestResampler {
    /// Create a resampler with black padding.
    pub fn new() -> Self {
        Self { padding_value: 0 }
    }

    /// Set the padding fill value (0 = black, 128 = gray).
    pub fn with_padding_value(mut self, value: u8) -> Self {
        self.padding_value = value;
        self
    }
}

impl Default for NearestResampler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameResampler for NearestResampler {
    fn resample(&self, frame: &Frame, crop: CropRect, target: Resolution) -> MediaResult<Frame> {
        if !crop.fits_within(frame.width(), frame.height()) {
            return Err(MediaError::resample_failed(
                frame.index,
                format!(
                    "crop {} exceeds source bounds {}x{}",
                    crop,
                    frame.width(),
                    frame.height()
                ),
            ));
        }
        if target.width == 0 || target.height == 0 {
            return Err(MediaError::resample_failed(
                frame.index,
                format!("invalid target resolution {}", target),
            ));
        }

        let (out_w, out_h) = (target.width, target.height);
        let mut out = vec![self.padding_value; out_w as usize * out_h as usize];

        // Matching aspect fills the frame; mismatch letterboxes.
        let (dst_x, dst_y, dst_w, dst_h) = if (crop.aspect() - target.aspect()).abs() < 0.01 {
            (0, 0, out_w, out_h)
        } else {
            let scale =
                (out_w as f64 / crop.width as f64).min(out_h as f64 / crop.height as f64);
            let w = ((crop.width as f64 * scale).round() as u32).clamp(1, out_w);
            let h = ((crop.height as f64 * scale).round() as u32).clamp(1, out_h);
            ((out_w - w) / 2, (out_h - h) / 2, w, h)
        };

        let src = frame.luma();
        for dy in 0..dst_h {
            let sy = crop.y + ((dy as u64 * crop.height as u64) / dst_h as u64) as u32;
            let row_start = (dst_y + dy) as usize * out_w as usize + dst_x as usize;
            for dx in 0..dst_w {
                let sx = crop.x + ((dx as u64 * crop.width as u64) / dst_w as u64) as u32;
                if let Some(value) = src.get(sx, sy) {
                    out[row_start + dx as usize] = value;
                }
            }
        }

        Frame::from_luma(frame.index, frame.timestamp, out_w, out_h, out)
    }
}

/// Renders the per-frame crop stream to portrait output frames.
pub struct PortraitRenderer {
    resampler: Arc<dyn FrameResampler>,
    target: Resolution,
}

impl PortraitRenderer {
    /// Create a renderer around a resampler implementation.
    pub fn new(resampler: Arc<dyn FrameResampler>, target: Resolution) -> Self {
        Self { resampler, target }
    }

    /// Create a renderer backed by the built-in nearest-neighbor scaler.
    pub fn with_default_resampler(target: Resolution) -> Self {
        Self::new(Arc::new(NearestResampler::new()), target)
    }

    /// Output resolution this renderer produces.
    pub fn target(&self) -> Resolution {
        self.target
    }

    /// Resample one frame's crop. Failures abort the run.
    pub fn render(&self, frame: &Frame, crop: CropRect) -> MediaResult<Frame> {
        self.resampler
            .resample(frame, crop, self.target)
            .map_err(|e| match e {
                err @ MediaError::Resample { .. } => err,
                other => MediaError::resample_failed(frame.index, other.to_string()),
            })
    }
}
