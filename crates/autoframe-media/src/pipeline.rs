//! End-to-end reframing pipeline.
//!
//! Wires the stages together: decode, face detection, speaker tracking,
//! shot selection, and portrait rendering. Detection runs on its own task
//! and feeds the main loop through a bounded channel, so decode and
//! detection overlap rendering without ever reordering frames.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use uuid::Uuid;

use autoframe_models::{Detection, Shot};

use crate::config::ReframeConfig;
use crate::detector::{detect_degraded, FaceDetector};
use crate::error::{MediaError, MediaResult};
use crate::frame::Frame;
use crate::fs_utils;
use crate::progress::{ProgressCallback, ReframeProgress};
use crate::render::{FrameResampler, PortraitRenderer};
use crate::selector::ShotSelector;
use crate::source::MediaBackend;
use crate::timeline::{stats_for_run, ShotTimeline};
use crate::tracker::SpeakerTracker;

/// How many detected frames may queue between the detection stage and the
/// rendering loop before decode stalls.
const DETECT_QUEUE_DEPTH: usize = 8;

/// One reframing job.
///
/// Carries the per-run callbacks, so it has no `Clone`; build a fresh
/// request per run.
pub struct ReframeRequest {
    /// Source video path.
    pub input_path: PathBuf,
    /// Final output path. The pipeline writes to a temp file beside it and
    /// renames only after the whole run succeeds.
    pub output_path: PathBuf,
    /// Optional path for the shot timeline JSON artifact.
    pub timeline_path: Option<PathBuf>,
    /// Run configuration.
    pub config: ReframeConfig,
    /// Optional per-frame progress callback.
    pub progress: Option<ProgressCallback>,
    /// Optional cancellation receiver; send `true` to stop between frames.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl ReframeRequest {
    /// Build a request with the default configuration.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input.into(),
            output_path: output.into(),
            timeline_path: None,
            config: ReframeConfig::default(),
            progress: None,
            cancel: None,
        }
    }

    /// Replace the run configuration.
    pub fn with_config(mut self, config: ReframeConfig) -> Self {
        self.config = config;
        self
    }

    /// Also write the shot timeline JSON to `path`.
    pub fn with_timeline(mut self, path: impl Into<PathBuf>) -> Self {
        self.timeline_path = Some(path.into());
        self
    }

    /// Attach a per-frame progress callback.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Attach a cancellation receiver. A cancelled run returns
    /// [`MediaError::Cancelled`] and leaves no output behind.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel_rx);
        self
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeReport {
    /// Unique id assigned to this run, present in its log records.
    pub run_id: String,
    /// Final shot list, contiguous over the processed frames.
    pub shots: Vec<Shot>,
    /// Frames read, rendered, and written.
    pub frames_processed: u64,
    /// Tracks allocated over the run, including destroyed ones.
    pub tracks_seen: u64,
    /// Frames where detection failed and degraded to zero faces.
    pub detection_failures: u64,
    /// True when any frame fell back to the degraded full-width crop.
    pub degraded_mode_used: bool,
    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
}

/// A decoded frame with its detections, in stream order.
struct DetectedFrame {
    frame: Frame,
    detections: Vec<Detection>,
    detection_failed: bool,
}

/// Reframes landscape video to portrait by cutting between speakers.
///
/// The pipeline is reusable across runs; backend, detector, and resampler
/// are injected once at construction.
pub struct ReframePipeline {
    backend: Arc<dyn MediaBackend>,
    detector: Arc<dyn FaceDetector>,
    resampler: Arc<dyn FrameResampler>,
}

impl ReframePipeline {
    /// Create a pipeline from its three external seams.
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        detector: Arc<dyn FaceDetector>,
        resampler: Arc<dyn FrameResampler>,
    ) -> Self {
        Self {
            backend,
            detector,
            resampler,
        }
    }

    /// Run one job to completion and return its report.
    pub async fn process_video(&self, request: ReframeRequest) -> MediaResult<ReframeReport> {
        request.config.validate()?;

        let ReframeRequest {
            input_path,
            output_path,
            timeline_path,
            config,
            progress,
            cancel,
        } = request;

        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        info!(
            run_id = %run_id,
            input = %input_path.display(),
            output = %output_path.display(),
            "starting reframe run"
        );

        let mut source = self.backend.open_source(&input_path).await?;
        let video_info = source.info().clone();

        let mut tracker = SpeakerTracker::new(&config);
        let mut selector = ShotSelector::new(&config, video_info.width, video_info.height);
        let renderer = PortraitRenderer::new(self.resampler.clone(), config.target_resolution);

        let temp_path = fs_utils::temp_output_path(&output_path);
        let mut sink = self
            .backend
            .create_sink(&temp_path, config.target_resolution, video_info.fps)
            .await?;

        // Detection stage. A single task preserves stream order; the
        // bounded channel caps how far decode runs ahead of rendering.
        let (tx, mut rx) = mpsc::channel::<MediaResult<DetectedFrame>>(DETECT_QUEUE_DEPTH);
        let detector = self.detector.clone();
        let detect_cancel = cancel.clone();
        let min_confidence = config.min_confidence;
        let detect_task = tokio::spawn(async move {
            loop {
                if stage_cancelled(&detect_cancel) {
                    let _ = tx.send(Err(MediaError::Cancelled)).await;
                    break;
                }
                match source.next_frame().await {
                    Ok(Some(frame)) => {
                        let (detections, detection_failed) =
                            detect_degraded(detector.as_ref(), &frame, min_confidence).await;
                        let item = DetectedFrame {
                            frame,
                            detections,
                            detection_failed,
                        };
                        if tx.send(Ok(item)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        let _ = tx.send(Err(err)).await;
                        break;
                    }
                }
            }
        });

        let mut frames_processed = 0u64;
        let mut detection_failures = 0u64;
        let mut degraded_mode_used = false;
        let mut abort: Option<MediaError> = None;

        while let Some(item) = rx.recv().await {
            let detected = match item {
                Ok(detected) => detected,
                Err(err) => {
                    abort = Some(err);
                    break;
                }
            };
            if stage_cancelled(&cancel) {
                abort = Some(MediaError::Cancelled);
                break;
            }

            if detected.detection_failed {
                detection_failures += 1;
            }

            let observations = tracker.observe(&detected.frame, &detected.detections);
            let plan = selector.advance(&observations);
            degraded_mode_used |= plan.degraded;

            match renderer.render(&detected.frame, plan.crop) {
                Ok(rendered) => {
                    if let Err(err) = sink.write_frame(&rendered).await {
                        abort = Some(err);
                        break;
                    }
                }
                Err(err) => {
                    abort = Some(err);
                    break;
                }
            }

            frames_processed += 1;
            if let Some(callback) = &progress {
                callback(ReframeProgress {
                    frame: detected.frame.index,
                    total_frames: video_info.total_frames,
                    timestamp: detected.frame.timestamp,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
            }
        }

        // Closing the channel unblocks the detection stage if it is
        // mid-send, then reap it.
        drop(rx);
        let _ = detect_task.await;

        if let Some(err) = abort {
            drop(sink);
            let _ = tokio::fs::remove_file(&temp_path).await;
            warn!(run_id = %run_id, error = %err, "reframe run aborted");
            return Err(err);
        }

        if let Err(err) = sink.finish().await {
            drop(sink);
            let _ = tokio::fs::remove_file(&temp_path).await;
            warn!(run_id = %run_id, error = %err, "output sink failed to finalize");
            return Err(err);
        }
        drop(sink);

        let shots = selector.finish();
        let tracks_seen = tracker.tracks_allocated();

        // Stage both artifacts fully before renaming either, so a failed
        // run leaves nothing behind.
        let timeline_temp = match &timeline_path {
            Some(timeline_path) => {
                let stats = stats_for_run(
                    &shots,
                    frames_processed,
                    tracks_seen,
                    detection_failures,
                    degraded_mode_used,
                );
                let timeline =
                    ShotTimeline::new(video_info.clone(), config.clone(), shots.clone(), stats);
                let temp = fs_utils::temp_output_path(timeline_path);
                if let Err(err) = timeline.write_to_file(&temp) {
                    let _ = tokio::fs::remove_file(&temp).await;
                    let _ = tokio::fs::remove_file(&temp_path).await;
                    return Err(err);
                }
                Some(temp)
            }
            None => None,
        };

        if let Err(err) = fs_utils::move_file(&temp_path, &output_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            if let Some(temp) = &timeline_temp {
                let _ = tokio::fs::remove_file(temp).await;
            }
            return Err(err);
        }

        if let (Some(temp), Some(timeline_dst)) = (&timeline_temp, &timeline_path) {
            if let Err(err) = fs_utils::move_file(temp, timeline_dst).await {
                let _ = tokio::fs::remove_file(temp).await;
                let _ = tokio::fs::remove_file(&output_path).await;
                return Err(err);
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            frames = frames_processed,
            shots = shots.len(),
            tracks = tracks_seen,
            degraded = degraded_mode_used,
            elapsed_ms,
            "reframe run complete"
        );

        Ok(ReframeReport {
            run_id,
            shots,
            frames_processed,
            tracks_seen,
            detection_failures,
            degraded_mode_used,
            elapsed_ms,
        })
    }
}

fn stage_cancelled(cancel_rx: &Option<watch::Receiver<bool>>) -> bool {
    if let Some(rx) = cancel_rx {
        *rx.borrow()
    } else {
        false
    }
}
