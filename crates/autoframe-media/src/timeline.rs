//! Shot timeline schema and export.
//!
//! The shot list is the run's one structured artifact: which track each
//! span of output frames followed and the crop it was rendered with.
//! Serialization is deterministic so identical runs export identical
//! bytes.
//!
//! # Schema
//! ```json
//! {
//!   "version": "1.0",
//!   "video_info": { "width": 1920, "height": 1080, "fps": 30.0, "total_frames": 1800 },
//!   "config": { "switch_threshold": 3.0, "min_frames_before_switch": 210 },
//!   "shots": [
//!     { "track_id": 0, "crop": {"x": 656, "y": 0, "width": 608, "height": 1080},
//!       "start_frame": 0, "end_frame": 449 }
//!   ],
//!   "stats": { "frames_processed": 1800, "shot_count": 4, "detection_failures": 0 }
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use autoframe_models::{Shot, TrackId};

use crate::config::ReframeConfig;
use crate::error::MediaResult;
use crate::source::VideoInfo;

/// Schema version for compatibility checking.
pub const TIMELINE_VERSION: &str = "1.0";

/// Run statistics captured alongside the shot list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineStats {
    /// Total frames processed
    pub frames_processed: u64,
    /// Number of shots in the run
    pub shot_count: usize,
    /// Number of transitions between consecutive shots
    pub cut_count: usize,
    /// Tracks allocated over the run
    pub tracks_seen: u64,
    /// Frames where detection failed and degraded to zero faces
    pub detection_failures: u64,
    /// Whether any frame used a degraded (padded) crop
    pub degraded_mode_used: bool,
    /// Mean shot length in frames
    pub mean_shot_frames: f64,
}

/// Complete shot timeline for one processed video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotTimeline {
    /// Schema version
    pub version: String,
    /// Source video information
    pub video_info: VideoInfo,
    /// Configuration the run used
    pub config: ReframeConfig,
    /// Shots ordered by start frame, contiguous
    pub shots: Vec<Shot>,
    /// Run statistics
    pub stats: TimelineStats,
}

impl ShotTimeline {
    /// Build a timeline from a finished run.
    pub fn new(
        video_info: VideoInfo,
        config: ReframeConfig,
        shots: Vec<Shot>,
        stats: TimelineStats,
    ) -> Self {
        Self {
            version: TIMELINE_VERSION.to_string(),
            video_info,
            config,
            shots,
            stats,
        }
    }

    /// Unique track ids appearing in the shot list, ascending.
    pub fn track_ids(&self) -> Vec<TrackId> {
        let mut ids: Vec<TrackId> = self.shots.iter().filter_map(|s| s.track_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Shot covering a frame, if any.
    pub fn shot_for_frame(&self, frame: u64) -> Option<&Shot> {
        self.shots
            .iter()
            .find(|s| s.start_frame <= frame && frame <= s.end_frame)
    }

    /// Pretty JSON export.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Compact JSON export.
    pub fn to_json_compact(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Write the timeline next to the output video.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> MediaResult<()> {
        let json = self.to_json()?;
        let mut file = std::fs::File::create(path.as_ref())?;
        file.write_all(json.as_bytes())?;

        info!(
            path = %path.as_ref().display(),
            shots = self.shots.len(),
            "wrote shot timeline"
        );
        Ok(())
    }
}

/// Compute run statistics from a shot list.
pub fn stats_for_run(
    shots: &[Shot],
    frames_processed: u64,
    tracks_seen: u64,
    detection_failures: u64,
    degraded_mode_used: bool,
) -> TimelineStats {
    let total_shot_frames: u64 = shots.iter().map(|s| s.frame_len()).sum();
    let mean_shot_frames = if shots.is_empty() {
        0.0
    } else {
        total_shot_frames as f64 / shots.len() as f64
    };

    TimelineStats {
        frames_processed,
        shot_count: shots.len(),
        cut_count: shots.len().saturating_sub(1),
        tracks_seen,
        detection_failures,
        degraded_mode_used,
        mean_shot_frames,
    }
}
