//! Hysteresis-gated shot selection.
//!
//! Decides per frame which track the output crop follows, cutting between
//! speakers the way an operator would rather than chasing every score
//! wobble. A cut requires the challenger to dominate the active track's
//! score, the active shot to have held for a minimum dwell, and the
//! challenger to sustain both for a debounce run of consecutive frames.
//! Losing the active track overrides the dwell gate outright.

use std::collections::VecDeque;

use tracing::{debug, info};

use autoframe_models::{CropRect, Resolution, Shot, TrackId};

use crate::config::ReframeConfig;
use crate::crop::{CropMapper, CropPlan};
use crate::tracker::{FrameObservations, TrackObservation};

/// State of a shot currently being held.
#[derive(Debug, Clone)]
struct HoldState {
    active_track_id: TrackId,
    active_score: f64,
    active_crop: CropRect,
    crop_degraded: bool,
    start_frame: u64,
    frames_since_last_switch: u64,
    candidate_track_id: Option<TrackId>,
    candidate_run_length: u32,
    // Crop stabilization: face centers seen this shot, anchor locks to
    // their median once enough have accumulated
    center_samples: VecDeque<f64>,
    sightings: usize,
    anchor_locked: bool,
}

#[derive(Debug, Clone)]
enum SelectorState {
    NoActiveTrack,
    Holding(HoldState),
}

/// Per-frame shot decision state machine.
///
/// State is scoped to one processing run; frames must be fed in order.
pub struct ShotSelector {
    switch_threshold: f64,
    min_frames_before_switch: u64,
    debounce_run_length: u32,
    crop_median_window: usize,
    recenter_tolerance: f64,
    mapper: CropMapper,
    default_plan: CropPlan,
    state: SelectorState,
    shots: Vec<Shot>,
    default_start: Option<u64>,
    last_frame: Option<u64>,
}

impl ShotSelector {
    /// Create a selector for one source geometry.
    pub fn new(config: &ReframeConfig, source_width: u32, source_height: u32) -> Self {
        let mapper = CropMapper::new(config.target_resolution, source_width, source_height);
        let default_plan = mapper.default_plan();

        Self {
            switch_threshold: config.switch_threshold,
            min_frames_before_switch: config.min_frames_before_switch,
            debounce_run_length: config.debounce_run_length,
            crop_median_window: config.crop_median_window,
            recenter_tolerance: config.recenter_tolerance,
            mapper,
            default_plan,
            state: SelectorState::NoActiveTrack,
            shots: Vec::new(),
            default_start: None,
            last_frame: None,
        }
    }

    /// Convenience constructor from a [`Resolution`] pair.
    pub fn for_source(config: &ReframeConfig, source: Resolution) -> Self {
        Self::new(config, source.width, source.height)
    }

    /// Track the output currently follows, if any.
    pub fn active_track(&self) -> Option<TrackId> {
        match &self.state {
            SelectorState::Holding(hold) => Some(hold.active_track_id),
            SelectorState::NoActiveTrack => None,
        }
    }

    /// Apply one frame of observations and return the crop to render.
    pub fn advance(&mut self, obs: &FrameObservations) -> CropPlan {
        let frame = obs.frame_index;
        self.last_frame = Some(frame);

        // A destroyed active track forces the shot closed regardless of
        // dwell; the frame is then reprocessed without an active track.
        if let SelectorState::Holding(hold) = &self.state {
            if !obs.is_live(hold.active_track_id) {
                info!(
                    track_id = hold.active_track_id,
                    frame, "active track lost, closing shot"
                );
                self.shots.push(Shot::new(
                    Some(hold.active_track_id),
                    hold.active_crop,
                    hold.start_frame,
                    frame.saturating_sub(1),
                ));
                self.state = SelectorState::NoActiveTrack;
            }
        }

        if matches!(self.state, SelectorState::NoActiveTrack) {
            return match obs.best() {
                Some((track_id, top)) => {
                    let top = *top;
                    self.close_default_segment(frame);
                    self.open_shot(track_id, &top, frame)
                }
                None => {
                    if self.default_start.is_none() {
                        self.default_start = Some(frame);
                    }
                    self.default_plan
                }
            };
        }

        self.advance_holding(obs)
    }

    /// Close any open segment and return the final shot list.
    pub fn finish(mut self) -> Vec<Shot> {
        let Some(last) = self.last_frame else {
            return self.shots;
        };

        match self.state {
            SelectorState::Holding(hold) => {
                self.shots.push(Shot::new(
                    Some(hold.active_track_id),
                    hold.active_crop,
                    hold.start_frame,
                    last,
                ));
            }
            SelectorState::NoActiveTrack => {
                if let Some(start) = self.default_start.take() {
                    self.shots
                        .push(Shot::new(None, self.default_plan.crop, start, last));
                }
            }
        }

        self.shots
    }

    fn advance_holding(&mut self, obs: &FrameObservations) -> CropPlan {
        let frame = obs.frame_index;

        let SelectorState::Holding(hold) = &mut self.state else {
            return self.default_plan;
        };

        hold.frames_since_last_switch += 1;

        // Refresh score and crop anchor from this frame's sighting of the
        // active track; an idle-but-alive track keeps its last score.
        if let Some(active_obs) = obs.candidates.get(&hold.active_track_id) {
            hold.active_score = active_obs.score;
            let re_anchored = update_anchor(
                &self.mapper,
                hold,
                self.crop_median_window,
                self.recenter_tolerance,
                active_obs.face.rect.cx(),
            );
            if re_anchored {
                debug!(
                    track_id = hold.active_track_id,
                    frame,
                    crop = %hold.active_crop,
                    "crop re-anchored"
                );
            }
        }

        let mut cut: Option<(TrackId, TrackObservation)> = None;
        match obs.best() {
            Some((best_id, best)) if best_id != hold.active_track_id => {
                let dominant = best.score >= self.switch_threshold * hold.active_score;
                let dwell_elapsed = hold.frames_since_last_switch >= self.min_frames_before_switch;

                if dominant && dwell_elapsed {
                    if hold.candidate_track_id == Some(best_id) {
                        hold.candidate_run_length += 1;
                    } else {
                        hold.candidate_track_id = Some(best_id);
                        hold.candidate_run_length = 1;
                    }
                    if hold.candidate_run_length > self.debounce_run_length {
                        cut = Some((best_id, *best));
                    }
                } else {
                    hold.candidate_track_id = None;
                    hold.candidate_run_length = 0;
                }
            }
            _ => {
                hold.candidate_track_id = None;
                hold.candidate_run_length = 0;
            }
        }

        let Some((to_id, to_obs)) = cut else {
            return CropPlan {
                crop: hold.active_crop,
                degraded: hold.crop_degraded,
            };
        };

        let from = hold.active_track_id;
        self.shots.push(Shot::new(
            Some(from),
            hold.active_crop,
            hold.start_frame,
            frame - 1,
        ));
        info!(from, to = to_id, frame, "cut committed");
        self.open_shot(to_id, &to_obs, frame)
    }

    fn open_shot(&mut self, track_id: TrackId, top: &TrackObservation, frame: u64) -> CropPlan {
        let plan = self.mapper.plan_for_face(&top.face.rect);

        let mut center_samples = VecDeque::with_capacity(self.crop_median_window);
        center_samples.push_back(top.face.rect.cx());

        self.state = SelectorState::Holding(HoldState {
            active_track_id: track_id,
            active_score: top.score,
            active_crop: plan.crop,
            crop_degraded: plan.degraded,
            start_frame: frame,
            frames_since_last_switch: 0,
            candidate_track_id: None,
            candidate_run_length: 0,
            center_samples,
            sightings: 1,
            anchor_locked: self.crop_median_window <= 1,
        });

        debug!(track_id, frame, crop = %plan.crop, "shot opened");
        plan
    }

    fn close_default_segment(&mut self, frame: u64) {
        if let Some(start) = self.default_start.take() {
            if start < frame {
                self.shots
                    .push(Shot::new(None, self.default_plan.crop, start, frame - 1));
            }
        }
    }
}

/// Feed one face-center sample into the hold state. Returns true when the
/// crop moved: either the initial median lock or a drift re-center.
fn update_anchor(
    mapper: &CropMapper,
    hold: &mut HoldState,
    median_window: usize,
    tolerance: f64,
    center_x: f64,
) -> bool {
    hold.center_samples.push_back(center_x);
    if hold.center_samples.len() > median_window {
        hold.center_samples.pop_front();
    }
    hold.sightings += 1;

    if !hold.anchor_locked {
        if hold.sightings < median_window {
            return false;
        }
        let plan = mapper.plan_centered(median(&hold.center_samples));
        hold.active_crop = plan.crop;
        hold.crop_degraded = plan.degraded;
        hold.anchor_locked = true;
        return true;
    }

    let target = median(&hold.center_samples);
    let drift = (target - hold.active_crop.cx()).abs();
    if drift > tolerance * hold.active_crop.width as f64 {
        let plan = mapper.plan_centered(target);
        hold.active_crop = plan.crop;
        hold.crop_degraded = plan.degraded;
        return true;
    }
    false
}

fn median(samples: &VecDeque<f64>) -> f64 {
    let mut sorted: Vec<f64> = samples.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoframe_models::{FaceBox, Rect};
    use std::collections::{BTreeMap, BTreeSet};

    const SOURCE_W: u32 = 1920;
    const SOURCE_H: u32 = 1080;

    fn test_config() -> ReframeConfig {
        ReframeConfig {
            min_frames_before_switch: 0,
            ..Default::default()
        }
    }

    /// Build observations from (track_id, center_x, score) triples.
    fn obs(frame: u64, entries: &[(TrackId, f64, f64)]) -> FrameObservations {
        let mut candidates = BTreeMap::new();
        let mut live = BTreeSet::new();
        for &(id, cx, score) in entries {
            let rect = Rect::new(cx - 30.0, 60.0, 60.0, 90.0);
            candidates.insert(
                id,
                TrackObservation {
                    face: FaceBox::new(id, rect, 0.9, frame),
                    score,
                },
            );
            live.insert(id);
        }
        FrameObservations {
            frame_index: frame,
            candidates,
            live,
        }
    }

    /// Observations where some tracks are alive but unscored this frame.
    fn obs_with_idle(
        frame: u64,
        entries: &[(TrackId, f64, f64)],
        idle: &[TrackId],
    ) -> FrameObservations {
        let mut o = obs(frame, entries);
        o.live.extend(idle.iter().copied());
        o
    }

    #[test]
    fn test_no_candidates_yields_single_default_shot() {
        let mut selector = ShotSelector::new(&test_config(), SOURCE_W, SOURCE_H);
        let expected = selector.default_plan;

        for frame in 0..100 {
            let plan = selector.advance(&obs(frame, &[]));
            assert_eq!(plan, expected);
        }

        let shots = selector.finish();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].track_id, None);
        assert_eq!(shots[0].start_frame, 0);
        assert_eq!(shots[0].end_frame, 99);
    }

    #[test]
    fn test_empty_run_produces_no_shots() {
        let selector = ShotSelector::new(&test_config(), SOURCE_W, SOURCE_H);
        assert!(selector.finish().is_empty());
    }

    #[test]
    fn test_first_candidate_ends_default_segment() {
        let mut selector = ShotSelector::new(&test_config(), SOURCE_W, SOURCE_H);

        for frame in 0..5 {
            selector.advance(&obs(frame, &[]));
        }
        for frame in 5..10 {
            selector.advance(&obs(frame, &[(0, 700.0, 1.0)]));
            assert_eq!(selector.active_track(), Some(0));
        }

        let shots = selector.finish();
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].track_id, None);
        assert_eq!((shots[0].start_frame, shots[0].end_frame), (0, 4));
        assert_eq!(shots[1].track_id, Some(0));
        assert_eq!((shots[1].start_frame, shots[1].end_frame), (5, 9));
        assert!(Shot::are_contiguous(&shots));
    }

    #[test]
    fn test_spike_shorter_than_debounce_does_not_cut() {
        let mut selector = ShotSelector::new(&test_config(), SOURCE_W, SOURCE_H);

        for frame in 0..10 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0), (1, 1400.0, 0.5)]));
        }
        // Track 1 dominates for exactly 4 frames, one short of the debounce
        for frame in 10..14 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
        }
        for frame in 14..20 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0), (1, 1400.0, 0.5)]));
            assert_eq!(selector.active_track(), Some(0));
        }

        let shots = selector.finish();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].track_id, Some(0));
    }

    #[test]
    fn test_sustained_spike_cuts_on_sixth_qualifying_frame() {
        let mut selector = ShotSelector::new(&test_config(), SOURCE_W, SOURCE_H);

        for frame in 0..10 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0), (1, 1400.0, 0.5)]));
        }
        // Six consecutive qualifying frames; the cut lands on the sixth
        for frame in 10..16 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
            if frame < 15 {
                assert_eq!(selector.active_track(), Some(0), "no cut before frame 15");
            }
        }
        assert_eq!(selector.active_track(), Some(1));

        for frame in 16..20 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
        }

        let shots = selector.finish();
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].track_id, Some(0));
        assert_eq!(shots[0].end_frame, 14);
        assert_eq!(shots[1].track_id, Some(1));
        assert_eq!(shots[1].start_frame, 15);
        assert!(Shot::are_contiguous(&shots));
    }

    #[test]
    fn test_interrupted_run_restarts_debounce() {
        let config = ReframeConfig {
            min_frames_before_switch: 0,
            debounce_run_length: 2,
            ..Default::default()
        };
        let mut selector = ShotSelector::new(&config, SOURCE_W, SOURCE_H);

        selector.advance(&obs(0, &[(0, 600.0, 1.0), (1, 1400.0, 0.5)]));
        // Two qualifying frames, then a reset, then the run restarts
        selector.advance(&obs(1, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
        selector.advance(&obs(2, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
        selector.advance(&obs(3, &[(0, 600.0, 1.0), (1, 1400.0, 0.5)]));
        assert_eq!(selector.active_track(), Some(0));

        selector.advance(&obs(4, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
        selector.advance(&obs(5, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
        assert_eq!(selector.active_track(), Some(0));
        selector.advance(&obs(6, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
        assert_eq!(selector.active_track(), Some(1));

        let shots = selector.finish();
        assert_eq!(shots[0].end_frame, 5);
        assert_eq!(shots[1].start_frame, 6);
    }

    #[test]
    fn test_no_cut_before_dwell_elapsed() {
        let config = ReframeConfig {
            min_frames_before_switch: 8,
            debounce_run_length: 1,
            ..Default::default()
        };
        let mut selector = ShotSelector::new(&config, SOURCE_W, SOURCE_H);

        // Track 1 dominates from the start, but the dwell gate holds
        for frame in 0..20 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0), (1, 1400.0, 10.0)]));
        }

        let shots = selector.finish();
        assert_eq!(shots.len(), 2);
        assert!(
            shots[0].frame_len() >= 8,
            "first shot held only {} frames",
            shots[0].frame_len()
        );
        assert!(Shot::are_contiguous(&shots));
    }

    #[test]
    fn test_track_loss_forces_transition() {
        let mut selector = ShotSelector::new(&ReframeConfig::default(), SOURCE_W, SOURCE_H);

        for frame in 0..10 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0), (1, 1400.0, 0.8)]));
        }
        // Track 0 destroyed; despite the 210-frame dwell, track 1 takes over
        for frame in 10..15 {
            selector.advance(&obs(frame, &[(1, 1400.0, 0.8)]));
            assert_eq!(selector.active_track(), Some(1));
        }

        let shots = selector.finish();
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].track_id, Some(0));
        assert_eq!(shots[0].end_frame, 9);
        assert_eq!(shots[1].track_id, Some(1));
        assert_eq!(shots[1].start_frame, 10);
        assert!(Shot::are_contiguous(&shots));
    }

    #[test]
    fn test_track_loss_without_candidates_goes_default() {
        let mut selector = ShotSelector::new(&ReframeConfig::default(), SOURCE_W, SOURCE_H);

        for frame in 0..10 {
            selector.advance(&obs(frame, &[(0, 600.0, 1.0)]));
        }
        for frame in 10..15 {
            selector.advance(&obs(frame, &[]));
            assert_eq!(selector.active_track(), None);
        }

        let shots = selector.finish();
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].track_id, Some(0));
        assert_eq!(shots[1].track_id, None);
        assert_eq!((shots[1].start_frame, shots[1].end_frame), (10, 14));
        assert!(Shot::are_contiguous(&shots));
    }

    #[test]
    fn test_idle_active_track_holds_shot() {
        let mut selector = ShotSelector::new(&test_config(), SOURCE_W, SOURCE_H);

        let opening = selector.advance(&obs(0, &[(0, 600.0, 1.0)]));
        // Alive but invisible for a stretch; shot and crop must hold
        for frame in 1..6 {
            let plan = selector.advance(&obs_with_idle(frame, &[], &[0]));
            assert_eq!(plan.crop, opening.crop);
            assert_eq!(selector.active_track(), Some(0));
        }
        selector.advance(&obs(6, &[(0, 600.0, 1.0)]));

        let shots = selector.finish();
        assert_eq!(shots.len(), 1);
        assert_eq!((shots[0].start_frame, shots[0].end_frame), (0, 6));
    }

    #[test]
    fn test_crop_locks_to_median_center() {
        let config = ReframeConfig {
            min_frames_before_switch: 0,
            crop_median_window: 3,
            ..Default::default()
        };
        let mut selector = ShotSelector::new(&config, SOURCE_W, SOURCE_H);

        selector.advance(&obs(0, &[(0, 400.0, 1.0)]));
        selector.advance(&obs(1, &[(0, 500.0, 1.0)]));
        // Third sighting locks the anchor to the median of {400, 500, 480}
        let locked = selector.advance(&obs(2, &[(0, 480.0, 1.0)]));

        let mapper = CropMapper::new(Resolution::PORTRAIT_1080, SOURCE_W, SOURCE_H);
        assert_eq!(locked.crop, mapper.plan_centered(480.0).crop);

        // Small wobble afterwards leaves the crop alone
        let held = selector.advance(&obs(3, &[(0, 470.0, 1.0)]));
        assert_eq!(held.crop, locked.crop);
    }

    #[test]
    fn test_crop_recenters_on_drift() {
        let config = ReframeConfig {
            min_frames_before_switch: 0,
            crop_median_window: 1,
            ..Default::default()
        };
        let mut selector = ShotSelector::new(&config, SOURCE_W, SOURCE_H);

        let opening = selector.advance(&obs(0, &[(0, 400.0, 1.0)]));
        assert_eq!(opening.crop.x, 96);

        // 80 px of drift sits inside the 15% tolerance band (91.2 px)
        let held = selector.advance(&obs(1, &[(0, 480.0, 1.0)]));
        assert_eq!(held.crop, opening.crop);

        // 100 px exceeds it; the crop re-centers without ending the shot
        let moved = selector.advance(&obs(2, &[(0, 500.0, 1.0)]));
        assert_ne!(moved.crop, opening.crop);
        assert_eq!(moved.crop.x, 196);

        let shots = selector.finish();
        assert_eq!(shots.len(), 1, "re-centering must not split the shot");
    }

    #[test]
    fn test_replay_is_byte_identical() {
        let run = || {
            let mut selector = ShotSelector::new(&test_config(), SOURCE_W, SOURCE_H);
            for frame in 0..40 {
                let score_b = if (12..24).contains(&frame) { 9.0 } else { 0.4 };
                selector.advance(&obs(
                    frame,
                    &[(0, 520.0, 1.1), (1, 1380.0, score_b)],
                ));
            }
            serde_json::to_vec(&selector.finish()).unwrap()
        };

        assert_eq!(run(), run());
    }
}
