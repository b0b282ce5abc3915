//! Candidate rectangle search.
//!
//! Camera SDKs usually ship their own rectangle finder; [`RectFinder`] is the
//! seam for plugging one in. [`DarkOutlineFinder`] is a small built-in one so
//! the scanner runs against plain image files.

use marker_scan_common::frame::{Frame, Rect};
use tracing::debug;

use crate::luma::LumaSampler;

/// Produces axis-aligned candidate boxes for one frame.
pub trait RectFinder: Send {
    /// `threshold` is the minimum edge strength a box needs to be reported.
    fn find_rects(&self, frame: &Frame, threshold: u32) -> Vec<Rect>;
}

/// Bounding boxes of 4-connected dark components with a strong outline.
///
/// A pixel is dark when its luminance is below `dark_level`. A component's box
/// is reported when the sum, over every pixel on the box perimeter, of
/// `|inside - one pixel further out|` reaches the threshold. Boxes are emitted
/// in raster order of each component's first pixel.
#[derive(Debug, Clone, Copy)]
pub struct DarkOutlineFinder {
    pub dark_level: u8,
    pub min_side: i32,
    luma: LumaSampler,
}

impl DarkOutlineFinder {
    pub fn new(dark_level: u8, luma: LumaSampler) -> Self {
        Self {
            dark_level,
            min_side: 4,
            luma,
        }
    }
}

struct LumaGrid {
    width: usize,
    height: usize,
    values: Vec<u8>,
}

impl LumaGrid {
    fn from_frame(frame: &Frame, luma: LumaSampler) -> Self {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let values = frame.pixels().iter().map(|&p| luma.luminance(p)).collect();
        Self {
            width,
            height,
            values,
        }
    }

    /// Out-of-frame reads are black, like every other sampler.
    fn at(&self, x: i32, y: i32) -> i32 {
        if x < 0 || y < 0 || (x as usize) >= self.width || (y as usize) >= self.height {
            return 0;
        }
        self.values[y as usize * self.width + x as usize] as i32
    }

    fn edge_magnitude(&self, r: &Rect) -> u64 {
        let mut sum = 0u64;
        for x in r.x..=r.right() {
            sum += self.at(x, r.y).abs_diff(self.at(x, r.y - 1)) as u64;
            sum += self.at(x, r.bottom()).abs_diff(self.at(x, r.bottom() + 1)) as u64;
        }
        for y in r.y..=r.bottom() {
            sum += self.at(r.x, y).abs_diff(self.at(r.x - 1, y)) as u64;
            sum += self.at(r.right(), y).abs_diff(self.at(r.right() + 1, y)) as u64;
        }
        sum
    }
}

impl RectFinder for DarkOutlineFinder {
    fn find_rects(&self, frame: &Frame, threshold: u32) -> Vec<Rect> {
        let grid = LumaGrid::from_frame(frame, self.luma);
        let (w, h) = (grid.width, grid.height);
        let mut visited = vec![false; w * h];
        let mut stack = Vec::new();
        let mut rects = Vec::new();
        let mut components = 0usize;

        for start in 0..w * h {
            if visited[start] || grid.values[start] >= self.dark_level {
                continue;
            }
            components += 1;
            visited[start] = true;
            stack.push(start);
            let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
            let (mut max_x, mut max_y) = (0usize, 0usize);

            while let Some(i) = stack.pop() {
                let (x, y) = (i % w, i / w);
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                let mut visit = |n: usize| {
                    if !visited[n] && grid.values[n] < self.dark_level {
                        visited[n] = true;
                        stack.push(n);
                    }
                };
                if x > 0 {
                    visit(i - 1);
                }
                if x + 1 < w {
                    visit(i + 1);
                }
                if y > 0 {
                    visit(i - w);
                }
                if y + 1 < h {
                    visit(i + w);
                }
            }

            let rect = Rect::new(
                min_x as i32,
                min_y as i32,
                (max_x - min_x + 1) as i32,
                (max_y - min_y + 1) as i32,
            );
            if rect.w < self.min_side || rect.h < self.min_side {
                continue;
            }
            if grid.edge_magnitude(&rect) >= threshold as u64 {
                rects.push(rect);
            }
        }

        debug!(
            seq = frame.seq,
            components,
            candidates = rects.len(),
            threshold,
            "candidate search"
        );
        rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker_scan_common::pixel::PixelFormat;
    use marker_scan_common::scene::{MarkerSpec, Scene};

    fn finder() -> DarkOutlineFinder {
        DarkOutlineFinder::new(100, LumaSampler::default())
    }

    #[test]
    fn blank_frame_has_no_candidates() {
        let frame = Scene::new(64, 48, PixelFormat::Rgb565, 255).into_frame();
        assert!(finder().find_rects(&frame, 0).is_empty());
    }

    #[test]
    fn finds_marker_outline() {
        let mut scene = Scene::new(80, 80, PixelFormat::Grayscale, 255);
        let rect = Rect::new(10, 10, 60, 60);
        scene.marker(&MarkerSpec::solid(rect));
        assert_eq!(finder().find_rects(scene.frame(), 8000), vec![rect]);
    }

    #[test]
    fn glyph_is_a_separate_candidate() {
        let mut scene = Scene::new(80, 80, PixelFormat::Grayscale, 255);
        let rect = Rect::new(10, 10, 60, 60);
        scene.marker(&MarkerSpec::with_glyph(rect, 16));
        let found = finder().find_rects(scene.frame(), 8000);
        assert_eq!(found, vec![rect, Rect::new(32, 32, 16, 16)]);
    }

    #[test]
    fn threshold_filters_weak_outlines() {
        let mut scene = Scene::new(80, 80, PixelFormat::Grayscale, 255);
        scene.marker(&MarkerSpec::solid(Rect::new(10, 10, 60, 60)));
        assert!(finder().find_rects(scene.frame(), 1_000_000).is_empty());
    }

    #[test]
    fn specks_are_ignored() {
        let mut scene = Scene::new(40, 40, PixelFormat::Grayscale, 255);
        scene.fill_rect(Rect::new(5, 5, 2, 2), 0);
        assert!(finder().find_rects(scene.frame(), 0).is_empty());
    }
}
