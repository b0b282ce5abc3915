//! Synthetic scene painting for demo sources and tests.

use crate::frame::{Frame, Rect};
use crate::pixel::{EncodedPixel, PixelFormat};

/// A marker to paint: dark frame of `ring` pixels around a light interior,
/// optionally with a dark square glyph centered inside.
#[derive(Debug, Clone, Copy)]
pub struct MarkerSpec {
    pub rect: Rect,
    pub ring: i32,
    pub border_level: u8,
    pub interior_level: u8,
    /// Side length and grey level of a centered glyph, if any.
    pub glyph: Option<(i32, u8)>,
}

impl MarkerSpec {
    pub fn solid(rect: Rect) -> Self {
        Self {
            rect,
            ring: 3,
            border_level: 20,
            interior_level: 220,
            glyph: None,
        }
    }

    pub fn with_glyph(rect: Rect, side: i32) -> Self {
        Self {
            glyph: Some((side, 0)),
            ..Self::solid(rect)
        }
    }
}

/// Grey-level painter over a [`Frame`] of any pixel format.
pub struct Scene {
    frame: Frame,
}

impl Scene {
    pub fn new(width: u32, height: u32, format: PixelFormat, background: u8) -> Self {
        let fill = EncodedPixel::from_rgb([background; 3], format);
        Self {
            frame: Frame::filled(width, height, format, fill),
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, level: u8) -> &mut Self {
        let px = EncodedPixel::from_rgb([level; 3], self.frame.format());
        for y in rect.y..rect.y + rect.h {
            for x in rect.x..rect.x + rect.w {
                self.frame.put(x, y, px);
            }
        }
        self
    }

    pub fn marker(&mut self, spec: &MarkerSpec) -> &mut Self {
        let r = spec.rect;
        self.fill_rect(r, spec.border_level);
        if let Some(inner) = r.inset(spec.ring) {
            self.fill_rect(inner, spec.interior_level);
        }
        if let Some((side, level)) = spec.glyph {
            let (cx, cy) = r.center();
            self.fill_rect(Rect::new(cx - side / 2, cy - side / 2, side, side), level);
        }
        self
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }
}
