//! Face detection and tracking records.

use serde::{Deserialize, Serialize};

use crate::rect::Rect;

/// Persistent identity of a tracked face within one run.
pub type TrackId = u32;

/// A raw face detection for a single frame, before track association.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding rectangle in source coordinates
    pub rect: Rect,
    /// Detector confidence (0.0-1.0)
    pub confidence: f64,
}

impl Detection {
    /// Create a new detection.
    pub fn new(rect: Rect, confidence: f64) -> Self {
        Self { rect, confidence }
    }
}

/// A face box bound to a persistent track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    /// Track the box belongs to
    pub track_id: TrackId,
    /// Bounding rectangle in source coordinates
    pub rect: Rect,
    /// Detector confidence (0.0-1.0)
    pub confidence: f64,
    /// Frame the box was observed on
    pub frame_index: u64,
}

impl FaceBox {
    /// Create a new tracked face box.
    pub fn new(track_id: TrackId, rect: Rect, confidence: f64, frame_index: u64) -> Self {
        Self {
            track_id,
            rect,
            confidence,
            frame_index,
        }
    }
}
