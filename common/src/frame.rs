use std::fmt;

use crate::pixel::{EncodedPixel, PixelFormat};

/// An axis-aligned rectangle, origin top-left, as reported by a shape detector.
///
/// Coordinates are signed: detectors may report boxes that hang off the frame
/// edge, and every read through [`Frame::sample`] is bounds-checked anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether both far edges, `x + w` and `y + h`, are representable.
    pub fn fits(&self) -> bool {
        self.x.checked_add(self.w).is_some() && self.y.checked_add(self.h).is_some()
    }

    /// Integer center, `(x + w/2, y + h/2)`.
    pub fn center(&self) -> (i32, i32) {
        (
            self.x.saturating_add(self.w / 2),
            self.y.saturating_add(self.h / 2),
        )
    }

    /// Shrink by `edge` pixels on every side. Returns `None` when nothing is left.
    pub fn inset(&self, edge: i32) -> Option<Rect> {
        let w = self.w.saturating_sub(edge.saturating_mul(2)).max(0);
        let h = self.h.saturating_sub(edge.saturating_mul(2)).max(0);
        if w <= 0 || h <= 0 {
            return None;
        }
        Some(Rect::new(
            self.x.saturating_add(edge),
            self.y.saturating_add(edge),
            w,
            h,
        ))
    }

    /// Last column inside the rect, saturating at the `i32` range.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w).saturating_sub(1)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h).saturating_sub(1)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.w, self.h)
    }
}

/// One camera frame: a row-major grid of encoded pixels plus capture metadata.
///
/// The grid is only reachable through bounds-checked point queries. Reads
/// outside `[0, width) x [0, height)` return [`EncodedPixel::Absent`].
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<EncodedPixel>,
    pub captured_at_ms: i64,
    pub seq: u64,
}

impl Frame {
    /// Wrap an existing pixel buffer. The buffer length must equal `width * height`.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Vec<EncodedPixel>,
    ) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(FrameError::SizeMismatch {
                got: pixels.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
            captured_at_ms: chrono::Utc::now().timestamp_millis(),
            seq: 0,
        })
    }

    /// A frame where every pixel holds `fill`.
    pub fn filled(width: u32, height: u32, format: PixelFormat, fill: EncodedPixel) -> Self {
        Self {
            width,
            height,
            format,
            pixels: vec![fill; width as usize * height as usize],
            captured_at_ms: chrono::Utc::now().timestamp_millis(),
            seq: 0,
        }
    }

    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || (x as u32) >= self.width || (y as u32) >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Bounds-checked read. Out-of-range coordinates yield `Absent`.
    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> EncodedPixel {
        match self.index(x, y) {
            Some(i) => self.pixels[i],
            None => EncodedPixel::Absent,
        }
    }

    /// Bounds-checked write. Returns `false` if the point is outside the frame.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, pixel: EncodedPixel) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = pixel;
                true
            }
            None => false,
        }
    }

    pub fn pixels(&self) -> &[EncodedPixel] {
        &self.pixels
    }

    /// File stem for archiving this frame, e.g. `frame_20260218T093000000Z_000042`.
    pub fn snapshot_name(&self, prefix: &str) -> String {
        let dt = chrono::DateTime::from_timestamp_millis(self.captured_at_ms)
            .unwrap_or_else(chrono::Utc::now);
        format!(
            "{prefix}{ts}_{seq:06}",
            ts = dt.format("%Y%m%dT%H%M%S%3fZ"),
            seq = self.seq
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("pixel buffer holds {got} pixels, expected {expected} for {width}x{height}")]
    SizeMismatch {
        got: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}
