//! Configuration for the reframing pipeline.

use serde::{Deserialize, Serialize};

use autoframe_models::Resolution;

use crate::error::{MediaError, MediaResult};

/// Configuration for a reframing run.
///
/// Defaults assume 30 fps talking-head footage; the frame-count fields scale
/// with the source frame rate, not wall time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeConfig {
    // === Output ===
    /// Output resolution; also fixes the crop aspect ratio (default: 1080x1920)
    pub target_resolution: Resolution,

    // === Face Detection ===
    /// Minimum confidence for a detection to be considered (default: 0.5)
    pub min_confidence: f64,

    // === Tracking ===
    /// IoU threshold for matching a detection to a track (default: 0.3)
    pub iou_threshold: f64,

    /// Frames an unseen track survives before destruction (default: 30)
    pub idle_timeout_frames: u32,

    // === Activity Scoring ===
    /// Ring-buffer capacity of mouth-motion samples per track (default: 15)
    pub activity_window: usize,

    /// Samples required before a track's score is defined (default: 2)
    pub min_activity_samples: usize,

    // === Shot Selection ===
    /// Challenger score must reach this multiple of the active score (default: 3.0)
    pub switch_threshold: f64,

    /// Minimum frames a shot holds before a voluntary cut (default: 210, ~7s at 30fps)
    pub min_frames_before_switch: u64,

    /// Consecutive qualifying frames a challenger must sustain (default: 5)
    pub debounce_run_length: u32,

    // === Crop Stabilization ===
    /// Face-center samples collected before the crop locks to their median (default: 10)
    pub crop_median_window: usize,

    /// Re-center once the median center drifts past this fraction of crop width (default: 0.15)
    pub recenter_tolerance: f64,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            target_resolution: Resolution::PORTRAIT_1080,
            min_confidence: 0.5,
            iou_threshold: 0.3,
            idle_timeout_frames: 30,
            activity_window: 15,
            min_activity_samples: 2,
            switch_threshold: 3.0,
            min_frames_before_switch: 210,
            debounce_run_length: 5,
            crop_median_window: 10,
            recenter_tolerance: 0.15,
        }
    }
}

impl ReframeConfig {
    /// Responsive configuration for fast-paced multi-speaker footage.
    /// Cuts sooner and tolerates shorter holds.
    pub fn responsive() -> Self {
        Self {
            min_frames_before_switch: 90,
            debounce_run_length: 3,
            switch_threshold: 2.0,
            ..Default::default()
        }
    }

    /// Steady configuration for long-form interviews.
    /// Holds shots longer and demands clearer dominance before cutting.
    pub fn steady() -> Self {
        Self {
            min_frames_before_switch: 300,
            switch_threshold: 4.0,
            idle_timeout_frames: 60,
            ..Default::default()
        }
    }

    /// Validate the configuration before a run starts.
    pub fn validate(&self) -> MediaResult<()> {
        if self.target_resolution.width == 0 || self.target_resolution.height == 0 {
            return Err(MediaError::invalid_config(format!(
                "target resolution must be nonzero, got {}",
                self.target_resolution
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(MediaError::invalid_config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(MediaError::invalid_config(format!(
                "iou_threshold must be within (0, 1], got {}",
                self.iou_threshold
            )));
        }
        if self.idle_timeout_frames == 0 {
            return Err(MediaError::invalid_config(
                "idle_timeout_frames must be at least 1",
            ));
        }
        if self.min_activity_samples == 0 {
            return Err(MediaError::invalid_config(
                "min_activity_samples must be at least 1",
            ));
        }
        if self.activity_window < self.min_activity_samples {
            return Err(MediaError::invalid_config(format!(
                "activity_window ({}) must hold at least min_activity_samples ({})",
                self.activity_window, self.min_activity_samples
            )));
        }
        if self.switch_threshold < 1.0 {
            return Err(MediaError::invalid_config(format!(
                "switch_threshold must be at least 1.0, got {}",
                self.switch_threshold
            )));
        }
        if self.debounce_run_length == 0 {
            return Err(MediaError::invalid_config(
                "debounce_run_length must be at least 1",
            ));
        }
        if self.crop_median_window == 0 {
            return Err(MediaError::invalid_config(
                "crop_median_window must be at least 1",
            ));
        }
        if self.recenter_tolerance <= 0.0 {
            return Err(MediaError::invalid_config(format!(
                "recenter_tolerance must be positive, got {}",
                self.recenter_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ReframeConfig::default().validate().is_ok());
        assert!(ReframeConfig::responsive().validate().is_ok());
        assert!(ReframeConfig::steady().validate().is_ok());
    }

    #[test]
    fn test_switch_threshold_below_one_rejected() {
        let config = ReframeConfig {
            switch_threshold: 0.9,
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("switch_threshold"));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let config = ReframeConfig {
            target_resolution: Resolution::new(0, 1920),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_smaller_than_min_samples_rejected() {
        let config = ReframeConfig {
            activity_window: 1,
            min_activity_samples: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = ReframeConfig::steady();
        let json = serde_json::to_string(&config).unwrap();
        let back: ReframeConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.min_frames_before_switch, 300);
        assert_eq!(back.switch_threshold, 4.0);
    }
}
