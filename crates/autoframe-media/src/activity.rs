//! Mouth-motion activity scoring.
//!
//! Speaking likelihood is estimated visually: the lower third of a face box
//! is compared against the same track's previous mouth region, and the mean
//! absolute luma difference becomes one activity sample. Samples feed a
//! per-track ring buffer whose mean is the track's activity score.

use std::collections::{BTreeMap, VecDeque};

use autoframe_models::{Rect, TrackId};

use crate::frame::{Frame, LumaPatch};

/// Fixed-size ring buffer of mouth-motion samples for one track.
#[derive(Debug, Clone)]
pub struct ActivityWindow {
    samples: VecDeque<f64>,
    capacity: usize,
    min_samples: usize,
}

impl ActivityWindow {
    /// Create an empty window.
    pub fn new(capacity: usize, min_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            min_samples,
        }
    }

    /// Push a sample, evicting the oldest once full.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Window mean, defined once enough samples exist.
    ///
    /// Tracks without a defined score are excluded from shot candidacy.
    pub fn score(&self) -> Option<f64> {
        if self.samples.len() < self.min_samples {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }
}

/// Computes per-track mouth-motion samples by frame differencing.
#[derive(Debug, Default)]
pub struct MouthActivityScorer {
    /// Previous mouth patch per track
    prev_patches: BTreeMap<TrackId, LumaPatch>,
}

impl MouthActivityScorer {
    /// Create a new scorer with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample mouth motion for a track sighted on `frame`.
    ///
    /// Returns None on the first sighting of a track (nothing to compare
    /// against) or when the mouth region falls outside the frame. The
    /// stored patch survives idle gaps, so a track reappearing within its
    /// idle timeout is compared against its last sighting.
    pub fn sample(&mut self, track_id: TrackId, face_rect: &Rect, frame: &Frame) -> Option<f64> {
        let mouth = face_rect.lower_third();
        let current = frame.luma().extract(mouth)?;

        let sample = self
            .prev_patches
            .get(&track_id)
            .map(|prev| mean_abs_diff(prev, &current));
        self.prev_patches.insert(track_id, current);
        sample
    }

    /// Discard stored state for a destroyed track.
    pub fn drop_track(&mut self, track_id: TrackId) {
        self.prev_patches.remove(&track_id);
    }

    /// Reset all state.
    pub fn reset(&mut self) {
        self.prev_patches.clear();
    }
}

/// Mean absolute intensity difference over the overlapping extent of two
/// patches, normalized by the compared area.
///
/// Consecutive sightings can differ in box size; comparing the shared
/// top-left extent avoids resampling while staying deterministic.
fn mean_abs_diff(a: &LumaPatch, b: &LumaPatch) -> f64 {
    let width = a.width.min(b.width) as usize;
    let height = a.height.min(b.height) as usize;
    if width == 0 || height == 0 {
        return 0.0;
    }

    let mut sum = 0u64;
    for y in 0..height {
        let row_a = &a.data[y * a.width as usize..y * a.width as usize + width];
        let row_b = &b.data[y * b.width as usize..y * b.width as usize + width];
        for (pa, pb) in row_a.iter().zip(row_b) {
            sum += pa.abs_diff(*pb) as u64;
        }
    }

    sum as f64 / (width * height) as f64
}
