//! Decoded frame representation.
//!
//! Frames own their luma plane behind an `Arc`, so cloning a frame for the
//! detection stage is a reference-count bump, not a pixel copy. The core
//! never mutates a frame; the resampler produces new ones.

use std::sync::Arc;

use autoframe_models::Rect;

use crate::error::{MediaError, MediaResult};

/// A decoded video frame with a shared luma plane.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position in the stream (0-based)
    pub index: u64,
    /// Presentation timestamp in seconds
    pub timestamp: f64,
    width: u32,
    height: u32,
    stride: usize,
    data: Arc<[u8]>,
}

impl Frame {
    /// Create a frame from a tightly packed luma plane.
    pub fn from_luma(
        index: u64,
        timestamp: f64,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> MediaResult<Self> {
        Self::from_luma_with_stride(index, timestamp, width, height, width as usize, data)
    }

    /// Create a frame from a luma plane with row padding.
    pub fn from_luma_with_stride(
        index: u64,
        timestamp: f64,
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
    ) -> MediaResult<Self> {
        if width == 0 || height == 0 {
            return Err(MediaError::internal(format!(
                "invalid frame dimensions {}x{}",
                width, height
            )));
        }
        if stride < width as usize || data.len() < stride * height as usize {
            return Err(MediaError::internal(format!(
                "luma plane too small: {} bytes for {}x{} stride {}",
                data.len(),
                width,
                height,
                stride
            )));
        }
        Ok(Self {
            index,
            timestamp,
            width,
            height,
            stride,
            data: data.into(),
        })
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the luma plane.
    pub fn luma(&self) -> PlaneView<'_> {
        PlaneView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}

/// Bounds-checked view into a luma plane.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> PlaneView<'a> {
    /// Plane width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the byte at a pixel position, or None when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.stride + x as usize).copied()
    }

    /// Get one row trimmed to the visible width.
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        Some(&self.data[start..start + self.width as usize])
    }

    /// Copy a sub-region into an owned patch, clipping to plane bounds.
    ///
    /// Returns None when the clipped region is empty.
    pub fn extract(&self, region: Rect) -> Option<LumaPatch> {
        let x0 = region.x.max(0.0).floor() as u32;
        let y0 = region.y.max(0.0).floor() as u32;
        let x1 = (region.x2().ceil().max(0.0) as u32).min(self.width);
        let y1 = (region.y2().ceil().max(0.0) as u32).min(self.height);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        let w = x1 - x0;
        let h = y1 - y0;
        let mut data = Vec::with_capacity((w * h) as usize);
        for y in y0..y1 {
            let row = self.row(y)?;
            data.extend_from_slice(&row[x0 as usize..x1 as usize]);
        }

        Some(LumaPatch {
            width: w,
            height: h,
            data,
        })
    }
}

/// Owned copy of a luma sub-region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaPatch {
    /// Patch width in pixels
    pub width: u32,
    /// Patch height in pixels
    pub height: u32,
    /// Tightly packed luma bytes, row-major
    pub data: Vec<u8>,
}

impl LumaPatch {
    /// Get the byte at a patch position, or None when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y * self.width + x) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let data: Vec<u8> = (0..width as usize * height as usize)
            .map(|i| (i % 251) as u8)
            .collect();
        Frame::from_luma(0, 0.0, width, height, data).unwrap()
    }

    #[test]
    fn test_frame_rejects_short_buffer() {
        let result = Frame::from_luma(0, 0.0, 100, 100, vec![0u8; 99]);
        assert!(result.is_err());
    }

    #[test]
    fn test_frame_clone_shares_pixels() {
        let frame = gradient_frame(64, 48);
        let clone = frame.clone();

        assert_eq!(clone.luma().get(10, 10), frame.luma().get(10, 10));
    }

    #[test]
    fn test_plane_view_bounds() {
        let frame = gradient_frame(10, 10);
        let view = frame.luma();

        assert!(view.get(9, 9).is_some());
        assert_eq!(view.get(10, 0), None);
        assert_eq!(view.get(0, 10), None);
    }

    #[test]
    fn test_stride_padding_is_skipped() {
        // 4 visible columns, 2 padding bytes per row
        let data = vec![
            1, 2, 3, 4, 99, 99, //
            5, 6, 7, 8, 99, 99,
        ];
        let frame = Frame::from_luma_with_stride(0, 0.0, 4, 2, 6, data).unwrap();
        let view = frame.luma();

        assert_eq!(view.row(0), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(view.get(3, 1), Some(8));
        assert_eq!(view.get(4, 0), None);
    }

    #[test]
    fn test_extract_clips_to_bounds() {
        let frame = gradient_frame(20, 20);
        let view = frame.luma();

        let patch = view.extract(Rect::new(15.0, 15.0, 10.0, 10.0)).unwrap();
        assert_eq!(patch.width, 5);
        assert_eq!(patch.height, 5);
        assert_eq!(patch.get(0, 0), view.get(15, 15));
    }

    #[test]
    fn test_extract_outside_bounds_is_none() {
        let frame = gradient_frame(20, 20);
        let view = frame.luma();

        assert!(view.extract(Rect::new(25.0, 0.0, 5.0, 5.0)).is_none());
        assert!(view.extract(Rect::new(0.0, 0.0, 0.0, 0.0)).is_none());
    }
}
