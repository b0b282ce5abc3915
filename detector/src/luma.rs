use marker_scan_common::frame::Frame;
use marker_scan_common::pixel::{
    expand5, expand6, unpack_rgb565, weighted_luma, weighted_sum, EncodedPixel, Rgb565Scaling,
};

/// Converts encoded pixels to an 8-bit luminance.
///
/// Absent pixels, out-of-bounds samples and malformed channel tuples all read
/// as 0. Nothing here fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LumaSampler {
    scaling: Rgb565Scaling,
}

impl LumaSampler {
    pub fn new(scaling: Rgb565Scaling) -> Self {
        Self { scaling }
    }

    pub fn scaling(&self) -> Rgb565Scaling {
        self.scaling
    }

    pub fn luminance(&self, pixel: EncodedPixel) -> u8 {
        match pixel {
            EncodedPixel::Absent => 0,
            EncodedPixel::Packed565(v) => {
                let (r, g, b) = unpack_rgb565(v);
                match self.scaling {
                    Rgb565Scaling::Expanded => weighted_luma(expand5(r), expand6(g), expand5(b)),
                    // Raw channel magnitudes never exceed 63, so this stays small.
                    Rgb565Scaling::Raw => weighted_sum(r as u32, g as u32, b as u32) as u8,
                }
            }
            EncodedPixel::Channels(c) => match c.as_slice() {
                [r, g, b, ..] => weighted_luma(*r, *g, *b),
                [v] => *v,
                _ => 0,
            },
        }
    }

    /// Luminance at `(x, y)`, 0 outside the frame.
    #[inline]
    pub fn at(&self, frame: &Frame, x: i32, y: i32) -> u8 {
        self.luminance(frame.sample(x, y))
    }
}

/// Luminance with the default (expanded) 5-6-5 handling.
pub fn luminance(pixel: EncodedPixel) -> u8 {
    LumaSampler::default().luminance(pixel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker_scan_common::pixel::{Channels, PixelFormat};

    #[test]
    fn packed_extremes() {
        assert_eq!(luminance(EncodedPixel::Packed565(0x0000)), 0);
        assert_eq!(luminance(EncodedPixel::Packed565(0xFFFF)), 255);
    }

    #[test]
    fn packed_raw_matches_reference_arithmetic() {
        let raw = LumaSampler::new(Rgb565Scaling::Raw);
        // (31*299 + 63*587 + 31*114) / 1000 = 49784 / 1000
        assert_eq!(raw.luminance(EncodedPixel::Packed565(0xFFFF)), 49);
        // pure red: 31*299/1000 = 9.269
        assert_eq!(raw.luminance(EncodedPixel::Packed565(0xF800)), 9);
        // pure green: 63*587/1000 = 36.981
        assert_eq!(raw.luminance(EncodedPixel::Packed565(0x07E0)), 36);
    }

    #[test]
    fn packed_output_always_in_range() {
        for scaling in [Rgb565Scaling::Expanded, Rgb565Scaling::Raw] {
            let sampler = LumaSampler::new(scaling);
            let mut max = 0u8;
            for v in 0..=u16::MAX {
                max = max.max(sampler.luminance(EncodedPixel::Packed565(v)));
            }
            let expected = match scaling {
                Rgb565Scaling::Expanded => 255,
                Rgb565Scaling::Raw => 49,
            };
            assert_eq!(max, expected);
        }
    }

    #[test]
    fn channel_tuples() {
        let rgb = |r, g, b| EncodedPixel::Channels(Channels::rgb(r, g, b));
        assert_eq!(luminance(rgb(255, 255, 255)), 255);
        assert_eq!(luminance(rgb(0, 0, 0)), 0);
        // 100*299 + 150*587 + 200*114 = 140750
        assert_eq!(luminance(rgb(100, 150, 200)), 140);
        let rgba = EncodedPixel::Channels(Channels::new(&[100, 150, 200, 7]).unwrap());
        assert_eq!(luminance(rgba), 140);
        assert_eq!(luminance(EncodedPixel::Channels(Channels::gray(77))), 77);
    }

    #[test]
    fn malformed_and_absent_read_black() {
        assert_eq!(luminance(EncodedPixel::Absent), 0);
        let empty = EncodedPixel::Channels(Channels::new(&[]).unwrap());
        let pair = EncodedPixel::Channels(Channels::new(&[200, 200]).unwrap());
        assert_eq!(luminance(empty), 0);
        assert_eq!(luminance(pair), 0);
    }

    #[test]
    fn out_of_bounds_matches_absent() {
        let frame = Frame::filled(
            4,
            4,
            PixelFormat::Rgb888,
            EncodedPixel::Channels(Channels::rgb(255, 255, 255)),
        );
        let sampler = LumaSampler::default();
        assert_eq!(sampler.at(&frame, 1, 1), 255);
        for (x, y) in [(-1, 0), (4, 0), (0, 4), (0, -9)] {
            assert_eq!(sampler.at(&frame, x, y), luminance(EncodedPixel::Absent));
        }
    }
}
