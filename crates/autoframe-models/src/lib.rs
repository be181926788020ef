//! Shared data models for the AutoFrame reframing engine.
//!
//! This crate provides Serde-serializable types for:
//! - Pixel-space geometry (bounding rects, crop rects)
//! - Aspect ratios and output resolutions
//! - Face detections and tracked face boxes
//! - The Shot artifact emitted by a reframing run

pub mod aspect;
pub mod face;
pub mod rect;
pub mod shot;

// Re-export common types
pub use aspect::{AspectRatio, Resolution};
pub use face::{Detection, FaceBox, TrackId};
pub use rect::{CropRect, Rect};
pub use shot::Shot;
