use marker_scan_common::config::MAX_MARKER_RADIUS;
use marker_scan_common::frame::{Frame, Rect};
use marker_scan_common::pixel::EncodedPixel;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot outline degenerate or out-of-range rectangle {0}")]
    Degenerate(Rect),
}

/// Draws annotations into a frame before it is displayed.
pub trait Renderer: Send {
    fn draw_outline(
        &self,
        frame: &mut Frame,
        rect: &Rect,
        color: [u8; 3],
        thickness: u32,
    ) -> Result<(), RenderError>;

    fn draw_filled_marker(
        &self,
        frame: &mut Frame,
        center: (i32, i32),
        radius: u32,
        color: [u8; 3],
    ) -> Result<(), RenderError>;
}

/// Writes straight into the frame's pixel grid in the frame's own encoding.
/// Anything outside the frame is clipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameRenderer;

impl Renderer for FrameRenderer {
    fn draw_outline(
        &self,
        frame: &mut Frame,
        rect: &Rect,
        color: [u8; 3],
        thickness: u32,
    ) -> Result<(), RenderError> {
        if rect.w <= 0 || rect.h <= 0 || !rect.fits() {
            return Err(RenderError::Degenerate(*rect));
        }
        let px = EncodedPixel::from_rgb(color, frame.format());
        // Successive rings grow inward.
        let rings = i32::try_from(thickness.max(1)).unwrap_or(i32::MAX);
        for t in 0..rings {
            let (x0, y0) = (rect.x + t, rect.y + t);
            let (x1, y1) = (rect.right() - t, rect.bottom() - t);
            if x0 > x1 || y0 > y1 {
                break;
            }
            for x in x0..=x1 {
                frame.put(x, y0, px);
                frame.put(x, y1, px);
            }
            for y in y0..=y1 {
                frame.put(x0, y, px);
                frame.put(x1, y, px);
            }
        }
        Ok(())
    }

    fn draw_filled_marker(
        &self,
        frame: &mut Frame,
        center: (i32, i32),
        radius: u32,
        color: [u8; 3],
    ) -> Result<(), RenderError> {
        let px = EncodedPixel::from_rgb(color, frame.format());
        let r = i64::from(radius.min(MAX_MARKER_RADIUS));
        let (cx, cy) = (i64::from(center.0), i64::from(center.1));
        // Only the part of the disk that lands inside the frame is walked.
        let (x0, x1) = ((cx - r).max(0), (cx + r).min(i64::from(frame.width()) - 1));
        let (y0, y1) = ((cy - r).max(0), (cy + r).min(i64::from(frame.height()) - 1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r * r {
                    frame.put(x as i32, y as i32, px);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker_scan_common::pixel::{Channels, PixelFormat};
    use marker_scan_common::scene::Scene;

    const GREEN: [u8; 3] = [0, 255, 0];

    fn green() -> EncodedPixel {
        EncodedPixel::Channels(Channels::rgb(0, 255, 0))
    }

    #[test]
    fn outline_colors_corners_and_leaves_inside() {
        let mut frame = Scene::new(40, 40, PixelFormat::Rgb888, 0).into_frame();
        FrameRenderer
            .draw_outline(&mut frame, &Rect::new(5, 5, 10, 10), GREEN, 2)
            .unwrap();
        for (x, y) in [(5, 5), (14, 5), (5, 14), (14, 14), (6, 6), (13, 13)] {
            assert_eq!(frame.sample(x, y), green(), "({x}, {y})");
        }
        assert_ne!(frame.sample(7, 7), green());
        assert_ne!(frame.sample(15, 15), green());
    }

    #[test]
    fn outline_clips_at_frame_edge() {
        let mut frame = Scene::new(10, 10, PixelFormat::Rgb565, 0).into_frame();
        FrameRenderer
            .draw_outline(&mut frame, &Rect::new(-5, -5, 20, 20), GREEN, 1)
            .unwrap();
        assert_eq!(frame.sample(0, 0), EncodedPixel::Packed565(0));
    }

    #[test]
    fn degenerate_outline_is_an_error() {
        let mut frame = Scene::new(10, 10, PixelFormat::Rgb565, 0).into_frame();
        assert!(FrameRenderer
            .draw_outline(&mut frame, &Rect::new(1, 1, 0, 5), GREEN, 1)
            .is_err());
    }

    #[test]
    fn huge_marker_fills_frame_without_overflow() {
        let mut frame = Scene::new(8, 8, PixelFormat::Rgb888, 0).into_frame();
        FrameRenderer
            .draw_filled_marker(&mut frame, (i32::MAX, i32::MIN), u32::MAX, GREEN)
            .unwrap();
        FrameRenderer
            .draw_filled_marker(&mut frame, (4, 4), u32::MAX, GREEN)
            .unwrap();
        assert_eq!(frame.sample(0, 0), green());
        assert_eq!(frame.sample(7, 7), green());
    }

    #[test]
    fn out_of_range_outline_is_an_error() {
        let mut frame = Scene::new(10, 10, PixelFormat::Rgb565, 0).into_frame();
        assert!(matches!(
            FrameRenderer.draw_outline(&mut frame, &Rect::new(i32::MAX - 3, 0, 10, 10), GREEN, 1),
            Err(RenderError::Degenerate(_))
        ));
        FrameRenderer
            .draw_outline(&mut frame, &Rect::new(1, 1, 6, 6), GREEN, u32::MAX)
            .unwrap();
        assert_eq!(frame.sample(4, 4), green());
    }

    #[test]
    fn filled_marker_is_a_disk() {
        let mut frame = Scene::new(20, 20, PixelFormat::Rgb888, 0).into_frame();
        FrameRenderer
            .draw_filled_marker(&mut frame, (10, 10), 3, GREEN)
            .unwrap();
        assert_eq!(frame.sample(10, 10), green());
        assert_eq!(frame.sample(13, 10), green());
        assert_eq!(frame.sample(10, 7), green());
        assert_ne!(frame.sample(13, 13), green());
    }
}
