//! The Shot artifact emitted by a reframing run.

use serde::{Deserialize, Serialize};

use crate::face::TrackId;
use crate::rect::CropRect;

/// A maximal contiguous run of output frames sharing one stabilized crop.
///
/// `track_id` is `None` for default-crop segments where no tracked speaker
/// qualified. Shots of one run are contiguous, non-overlapping and ordered
/// by `start_frame`; every frame of the run belongs to exactly one Shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    /// Speaker track this shot holds on, if any
    pub track_id: Option<TrackId>,
    /// Stabilized crop applied for the whole shot
    pub crop: CropRect,
    /// First frame of the shot (inclusive)
    pub start_frame: u64,
    /// Last frame of the shot (inclusive)
    pub end_frame: u64,
}

impl Shot {
    /// Create a new shot.
    pub fn new(track_id: Option<TrackId>, crop: CropRect, start_frame: u64, end_frame: u64) -> Self {
        Self {
            track_id,
            crop,
            start_frame,
            end_frame,
        }
    }

    /// Number of frames covered by the shot.
    pub fn frame_len(&self) -> u64 {
        self.end_frame - self.start_frame + 1
    }

    /// Check a sequence of shots is contiguous and ordered.
    pub fn are_contiguous(shots: &[Shot]) -> bool {
        shots
            .windows(2)
            .all(|pair| pair[0].end_frame + 1 == pair[1].start_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop() -> CropRect {
        CropRect::new(656, 0, 608, 1080)
    }

    #[test]
    fn test_frame_len_inclusive() {
        let shot = Shot::new(Some(0), crop(), 10, 10);
        assert_eq!(shot.frame_len(), 1);

        let shot = Shot::new(Some(0), crop(), 0, 209);
        assert_eq!(shot.frame_len(), 210);
    }

    #[test]
    fn test_contiguity_check() {
        let shots = vec![
            Shot::new(None, crop(), 0, 4),
            Shot::new(Some(0), crop(), 5, 299),
            Shot::new(Some(1), crop(), 300, 500),
        ];
        assert!(Shot::are_contiguous(&shots));

        let gapped = vec![
            Shot::new(Some(0), crop(), 0, 4),
            Shot::new(Some(1), crop(), 6, 10),
        ];
        assert!(!Shot::are_contiguous(&gapped));
    }

    #[test]
    fn test_shot_serialization_is_stable() {
        let shot = Shot::new(Some(2), crop(), 0, 209);
        let a = serde_json::to_string(&shot).unwrap();
        let b = serde_json::to_string(&shot).unwrap();

        assert_eq!(a, b);
        assert!(a.contains("\"track_id\":2"));
    }
}
