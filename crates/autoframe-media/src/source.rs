//! Frame source and sink seams.
//!
//! Decoding and encoding stay outside the core: a `MediaBackend` opens a
//! `FrameSource` for reading decoded frames in order and a `FrameSink` for
//! receiving rendered ones. Implementations wrap whatever decoder/encoder
//! the host application uses; tests substitute deterministic stubs.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use autoframe_models::Resolution;

use crate::error::MediaResult;
use crate::frame::Frame;

/// Source video information, known at open time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Total frame count, when the container reports one
    pub total_frames: Option<u64>,
}

impl VideoInfo {
    /// Create video information for a source.
    pub fn new(width: u32, height: u32, fps: f64, total_frames: Option<u64>) -> Self {
        Self {
            width,
            height,
            fps,
            total_frames,
        }
    }
}

/// Ordered, single-consumer stream of decoded frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Information about the opened source.
    fn info(&self) -> &VideoInfo;

    /// Next frame in stream order, or None at end of stream.
    ///
    /// Frames arrive with strictly increasing indices; the source never
    /// reorders or skips.
    async fn next_frame(&mut self) -> MediaResult<Option<Frame>>;
}

/// Receiver for rendered output frames.
#[async_trait]
pub trait FrameSink: Send {
    /// Write one rendered frame.
    async fn write_frame(&mut self, frame: &Frame) -> MediaResult<()>;

    /// Flush and close the sink. Must be called exactly once on success.
    async fn finish(&mut self) -> MediaResult<()>;
}

/// Factory for frame sources and sinks, keyed by filesystem path.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Open a source for reading decoded frames.
    async fn open_source(&self, path: &Path) -> MediaResult<Box<dyn FrameSource>>;

    /// Create a sink writing rendered frames to `path`.
    async fn create_sink(
        &self,
        path: &Path,
        resolution: Resolution,
        fps: f64,
    ) -> MediaResult<Box<dyn FrameSink>>;
}
