//! Face detection seam.
//!
//! The detection model stays outside the core. Implementations wrap whatever
//! backend the host application ships; the pipeline treats a backend failure
//! as a frame with zero faces, never as a fatal condition.

use async_trait::async_trait;
use tracing::warn;

use autoframe_models::Detection;

use crate::error::MediaResult;
use crate::frame::Frame;

/// Core trait for face detection backends.
///
/// `detect` is stateless across calls: implementations must not carry
/// per-frame state between invocations.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a frame. Zero or more boxes, unordered.
    async fn detect(&self, frame: &Frame) -> MediaResult<Vec<Detection>>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Run detection with recoverable-failure semantics.
///
/// Backend errors degrade the frame to zero faces; the caller gets the
/// number of failures via the returned flag. Detections below
/// `min_confidence` are dropped.
pub(crate) async fn detect_degraded(
    detector: &dyn FaceDetector,
    frame: &Frame,
    min_confidence: f64,
) -> (Vec<Detection>, bool) {
    match detector.detect(frame).await {
        Ok(mut detections) => {
            detections.retain(|d| d.confidence >= min_confidence);
            (detections, false)
        }
        Err(err) => {
            warn!(
                detector = detector.name(),
                frame = frame.index,
                error = %err,
                "face detection failed, treating frame as empty"
            );
            (Vec::new(), true)
        }
    }
}
