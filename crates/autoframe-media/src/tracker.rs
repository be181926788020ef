//! IoU-based speaker tracker.
//!
//! Maintains persistent face identities across frames by greedy
//! Intersection-over-Union matching, tolerates short occlusions through an
//! idle timeout, and aggregates per-track mouth activity into windowed
//! scores. Containers are BTree-based so identical inputs replay to
//! identical outputs.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use autoframe_models::{Detection, FaceBox, Rect, TrackId};

use crate::activity::{ActivityWindow, MouthActivityScorer};
use crate::config::ReframeConfig;
use crate::frame::Frame;

/// One scored track visible on the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackObservation {
    /// Face box observed this frame
    pub face: FaceBox,
    /// Windowed activity score
    pub score: f64,
}

/// Per-frame tracker output consumed by the shot selector.
#[derive(Debug, Clone, Default)]
pub struct FrameObservations {
    /// Frame the observations belong to
    pub frame_index: u64,
    /// Tracks visible this frame with a defined activity score
    pub candidates: BTreeMap<TrackId, TrackObservation>,
    /// All tracks alive after this frame, including idle and unscored ones
    pub live: BTreeSet<TrackId>,
}

impl FrameObservations {
    /// Highest-scoring candidate; ties resolve to the lowest track id.
    pub fn best(&self) -> Option<(TrackId, &TrackObservation)> {
        let mut best: Option<(TrackId, &TrackObservation)> = None;
        for (&id, obs) in &self.candidates {
            match best {
                Some((_, current)) if obs.score <= current.score => {}
                _ => best = Some((id, obs)),
            }
        }
        best
    }

    /// Whether a track is still alive (visible or idle).
    pub fn is_live(&self, track_id: TrackId) -> bool {
        self.live.contains(&track_id)
    }
}

#[derive(Debug)]
struct Track {
    last_rect: Rect,
    age: u32,
    window: ActivityWindow,
}

/// Greedy IoU tracker with per-track activity windows.
pub struct SpeakerTracker {
    iou_threshold: f64,
    idle_timeout: u32,
    window_capacity: usize,
    min_samples: usize,
    tracks: BTreeMap<TrackId, Track>,
    scorer: MouthActivityScorer,
    next_track_id: TrackId,
}

impl SpeakerTracker {
    /// Create a tracker from pipeline configuration.
    pub fn new(config: &ReframeConfig) -> Self {
        Self {
            iou_threshold: config.iou_threshold,
            idle_timeout: config.idle_timeout_frames,
            window_capacity: config.activity_window,
            min_samples: config.min_activity_samples,
            tracks: BTreeMap::new(),
            scorer: MouthActivityScorer::new(),
            next_track_id: 0,
        }
    }

    /// Associate one frame's detections and produce selector observations.
    ///
    /// Detection order decides new-track id assignment; among existing
    /// tracks, IoU ties resolve to the lowest id.
    pub fn observe(&mut self, frame: &Frame, detections: &[Detection]) -> FrameObservations {
        let frame_index = frame.index;

        // Greedy IoU matching against each track's last box
        let mut matches: Vec<(usize, TrackId)> = Vec::new();
        let mut unmatched_dets: Vec<usize> = Vec::new();
        let mut unmatched_tracks: BTreeSet<TrackId> = self.tracks.keys().copied().collect();

        for (det_idx, det) in detections.iter().enumerate() {
            let mut best_iou = -1.0;
            let mut best_track: Option<TrackId> = None;

            for &track_id in &unmatched_tracks {
                if let Some(track) = self.tracks.get(&track_id) {
                    let iou = det.rect.iou(&track.last_rect);
                    if iou >= self.iou_threshold && iou > best_iou {
                        best_iou = iou;
                        best_track = Some(track_id);
                    }
                }
            }

            match best_track {
                Some(track_id) => {
                    matches.push((det_idx, track_id));
                    unmatched_tracks.remove(&track_id);
                }
                None => unmatched_dets.push(det_idx),
            }
        }

        let mut visible: Vec<(TrackId, usize)> = Vec::with_capacity(detections.len());

        // Update matched tracks
        for (det_idx, track_id) in matches {
            let det = &detections[det_idx];
            if let Some(track) = self.tracks.get_mut(&track_id) {
                track.last_rect = det.rect;
                track.age = 0;
            }
            visible.push((track_id, det_idx));
        }

        // Allocate new tracks for unmatched detections
        for det_idx in unmatched_dets {
            let det = &detections[det_idx];
            let track_id = self.next_track_id;
            self.next_track_id += 1;

            self.tracks.insert(
                track_id,
                Track {
                    last_rect: det.rect,
                    age: 0,
                    window: ActivityWindow::new(self.window_capacity, self.min_samples),
                },
            );
            debug!(track_id, frame = frame_index, "opened new track");
            visible.push((track_id, det_idx));
        }

        // Sample mouth motion for every visible track
        for &(track_id, det_idx) in &visible {
            let rect = detections[det_idx].rect;
            if let Some(sample) = self.scorer.sample(track_id, &rect, frame) {
                if let Some(track) = self.tracks.get_mut(&track_id) {
                    track.window.push(sample);
                }
            }
        }

        // Age unmatched tracks; destroy once past the idle timeout
        let mut destroyed: Vec<TrackId> = Vec::new();
        for &track_id in &unmatched_tracks {
            if let Some(track) = self.tracks.get_mut(&track_id) {
                track.age += 1;
                if track.age > self.idle_timeout {
                    destroyed.push(track_id);
                }
            }
        }
        for track_id in destroyed {
            self.tracks.remove(&track_id);
            self.scorer.drop_track(track_id);
            debug!(track_id, frame = frame_index, "track destroyed after idle timeout");
        }

        // Assemble observations
        let mut candidates = BTreeMap::new();
        for &(track_id, det_idx) in &visible {
            let det = &detections[det_idx];
            if let Some(score) = self.tracks.get(&track_id).and_then(|t| t.window.score()) {
                candidates.insert(
                    track_id,
                    TrackObservation {
                        face: FaceBox::new(track_id, det.rect, det.confidence, frame_index),
                        score,
                    },
                );
            }
        }

        FrameObservations {
            frame_index,
            candidates,
            live: self.tracks.keys().copied().collect(),
        }
    }

    /// Number of live tracks (visible or idle).
    pub fn live_track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Total number of tracks allocated since the tracker was created,
    /// including tracks that have since been destroyed.
    pub fn tracks_allocated(&self) -> u64 {
        u64::from(self.next_track_id)
    }

    /// Reset all tracker state.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.scorer.reset();
        self.next_track_id = 0;
    }
}
