#![deny(unreachable_patterns)]
//! Speaker-tracking portrait reframing.
//!
//! This crate provides:
//! - Pluggable frame sources, sinks, and face detection backends
//! - Mouth-activity scoring and IoU-based speaker tracking
//! - Hysteresis-gated shot selection that cuts, never pans
//! - Portrait crop mapping with degraded-mode fallback
//! - An end-to-end pipeline with cancellation and progress reporting

pub mod activity;
pub mod config;
pub mod crop;
pub mod detector;
pub mod error;
pub mod frame;
pub mod fs_utils;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod selector;
pub mod source;
pub mod timeline;
pub mod tracker;

pub use activity::{ActivityWindow, MouthActivityScorer};
pub use config::ReframeConfig;
pub use crop::{CropMapper, CropPlan};
pub use detector::FaceDetector;
pub use error::{MediaError, MediaResult};
pub use frame::{Frame, LumaPatch, PlaneView};
pub use pipeline::{ReframePipeline, ReframeReport, ReframeRequest};
pub use progress::{ProgressCallback, ReframeProgress};
pub use render::{FrameResampler, NearestResampler, PortraitRenderer};
pub use selector::ShotSelector;
pub use source::{FrameSink, FrameSource, MediaBackend, VideoInfo};
pub use timeline::{stats_for_run, ShotTimeline, TimelineStats, TIMELINE_VERSION};
pub use tracker::{FrameObservations, SpeakerTracker, TrackObservation};
