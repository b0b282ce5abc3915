//! Sparse point sampling of a candidate rectangle's border and interior.
//!
//! Nothing here scans a full region: every sampler walks a stride grid whose
//! spacing scales with the rectangle, so the cost per candidate stays roughly
//! constant regardless of its size.

use marker_scan_common::frame::{Frame, Rect};

use crate::luma::LumaSampler;

/// Thickness of the dark frame stripped off before looking at the interior.
pub const EDGE_THICKNESS: i32 = 3;

/// Stride used inside the central sampling windows.
const WINDOW_STRIDE: usize = 2;

/// Samples luminance from one frame.
#[derive(Clone, Copy)]
pub struct RegionSampler<'a> {
    frame: &'a Frame,
    luma: LumaSampler,
}

impl<'a> RegionSampler<'a> {
    pub fn new(frame: &'a Frame, luma: LumaSampler) -> Self {
        Self { frame, luma }
    }

    pub fn frame(&self) -> &'a Frame {
        self.frame
    }

    #[inline]
    fn at(&self, x: i32, y: i32) -> u8 {
        self.luma.at(self.frame, x, y)
    }

    /// The four outermost edges of `rect`.
    ///
    /// Left and right columns are walked every `max(1, h / divisor)` rows,
    /// top and bottom rows every `max(1, w / divisor)` columns.
    pub fn border(&self, rect: &Rect, divisor: i32) -> Vec<u8> {
        let mut samples = Vec::new();
        let row_step = stride(rect.h, divisor);
        let col_step = stride(rect.w, divisor);

        for x in [rect.x, rect.right()] {
            for y in (rect.y..rect.y + rect.h).step_by(row_step) {
                samples.push(self.at(x, y));
            }
        }
        for y in [rect.y, rect.bottom()] {
            for x in (rect.x..rect.x + rect.w).step_by(col_step) {
                samples.push(self.at(x, y));
            }
        }
        samples
    }

    /// A square of side `min(w, h) / 3` centred on `inner`, every other pixel.
    pub fn center_window(&self, inner: &Rect) -> Vec<u8> {
        let (cx, cy) = inner.center();
        let half = inner.w.min(inner.h) / 3 / 2;
        let mut samples = Vec::new();
        for x in (cx - half..=cx + half).step_by(WINDOW_STRIDE) {
            for y in (cy - half..=cy + half).step_by(WINDOW_STRIDE) {
                samples.push(self.at(x, y));
            }
        }
        samples
    }

    /// The whole of `inner` on a coarse grid, `max(1, side / 10)` apart.
    pub fn interior_grid(&self, inner: &Rect) -> Vec<u8> {
        let col_step = stride(inner.w, 10);
        let row_step = stride(inner.h, 10);
        let mut samples = Vec::new();
        for x in (inner.x..inner.x + inner.w).step_by(col_step) {
            for y in (inner.y..inner.y + inner.h).step_by(row_step) {
                samples.push(self.at(x, y));
            }
        }
        samples
    }

    /// Every other pixel of `inner` that falls within `min(w, h) / 3` of its
    /// center on both axes.
    pub fn central_square(&self, inner: &Rect) -> Vec<u8> {
        let (cx, cy) = inner.center();
        let radius = inner.w.min(inner.h) / 3;
        let mut samples = Vec::new();
        for x in (inner.x..inner.x + inner.w).step_by(WINDOW_STRIDE) {
            if (x - cx).abs() > radius {
                continue;
            }
            for y in (inner.y..inner.y + inner.h).step_by(WINDOW_STRIDE) {
                if (y - cy).abs() <= radius {
                    samples.push(self.at(x, y));
                }
            }
        }
        samples
    }
}

/// `max(1, extent / divisor)` as a step size.
fn stride(extent: i32, divisor: i32) -> usize {
    (extent / divisor).max(1) as usize
}

/// Arithmetic mean, `None` for an empty set.
pub fn mean(samples: &[u8]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: u64 = samples.iter().map(|&v| v as u64).sum();
    Some(sum as f64 / samples.len() as f64)
}
