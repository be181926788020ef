//! Per-frame progress reporting.

use serde::{Deserialize, Serialize};

/// Progress information for a reframing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReframeProgress {
    /// Last frame processed (0-based)
    pub frame: u64,
    /// Total frames in the source, when the container reports one
    pub total_frames: Option<u64>,
    /// Timestamp of the last frame in seconds
    pub timestamp: f64,
    /// Wall-clock time spent so far in milliseconds
    pub elapsed_ms: u64,
}

impl ReframeProgress {
    /// Calculate progress percentage, when the total frame count is known.
    pub fn percentage(&self) -> Option<f64> {
        let total = self.total_frames?;
        if total == 0 {
            return None;
        }
        Some((((self.frame + 1) as f64 / total as f64) * 100.0).min(100.0))
    }

    /// Estimate remaining wall-clock seconds from per-frame throughput.
    pub fn eta_seconds(&self) -> Option<f64> {
        let total = self.total_frames?;
        let done = self.frame + 1;
        if total <= done {
            return Some(0.0);
        }
        if self.elapsed_ms == 0 {
            return None;
        }
        let per_frame_ms = self.elapsed_ms as f64 / done as f64;
        Some((total - done) as f64 * per_frame_ms / 1000.0)
    }
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ReframeProgress) + Send + 'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = ReframeProgress {
            frame: 49,
            total_frames: Some(100),
            ..Default::default()
        };

        assert!((progress.percentage().unwrap() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_percentage_unknown_total() {
        let progress = ReframeProgress {
            frame: 10,
            total_frames: None,
            ..Default::default()
        };

        assert!(progress.percentage().is_none());
    }

    #[test]
    fn test_eta_from_throughput() {
        let progress = ReframeProgress {
            frame: 49,
            total_frames: Some(100),
            elapsed_ms: 5000,
            ..Default::default()
        };

        // 50 frames in 5s leaves 50 frames at 100ms each
        let eta = progress.eta_seconds().unwrap();
        assert!((eta - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_eta_complete() {
        let progress = ReframeProgress {
            frame: 99,
            total_frames: Some(100),
            elapsed_ms: 1000,
            ..Default::default()
        };

        assert_eq!(progress.eta_seconds(), Some(0.0));
    }
}
