use serde::Deserialize;

/// Layout in which a frame source delivers pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 16-bit packed 5-6-5 red/green/blue.
    Rgb565,
    /// Three 8-bit channels.
    Rgb888,
    /// One 8-bit channel, already a luminance value.
    Grayscale,
}

/// How packed 5-6-5 channels are brought to the 8-bit domain before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rgb565Scaling {
    /// Bit-replicate each channel to 8 bits, so 0xFFFF is full white (255).
    #[default]
    Expanded,
    /// Weight the raw 5/6-bit channel values. Output tops out at 49 and is
    /// biased toward green; kept for bit-compatibility with older firmware.
    Raw,
}

/// Up to four 8-bit channels as delivered by a tuple-style frame source.
///
/// A length of 1 is a grey level, 3 or 4 is RGB(A). Any other length is a
/// malformed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    len: u8,
    values: [u8; 4],
}

impl Channels {
    /// Returns `None` if more than four channels are supplied.
    pub fn new(values: &[u8]) -> Option<Self> {
        if values.len() > 4 {
            return None;
        }
        let mut buf = [0u8; 4];
        buf[..values.len()].copy_from_slice(values);
        Some(Self {
            len: values.len() as u8,
            values: buf,
        })
    }

    pub fn gray(value: u8) -> Self {
        Self {
            len: 1,
            values: [value, 0, 0, 0],
        }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            len: 3,
            values: [r, g, b, 0],
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A single pixel as stored in a [`Frame`](crate::frame::Frame).
///
/// The variant is fixed when the frame is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodedPixel {
    Packed565(u16),
    Channels(Channels),
    /// Missing or out-of-bounds sample. Always reads as black.
    #[default]
    Absent,
}

impl EncodedPixel {
    /// Encode an 8-bit RGB color in the given frame layout.
    pub fn from_rgb(rgb: [u8; 3], format: PixelFormat) -> Self {
        let [r, g, b] = rgb;
        match format {
            PixelFormat::Rgb565 => EncodedPixel::Packed565(pack_rgb565(r, g, b)),
            PixelFormat::Rgb888 => EncodedPixel::Channels(Channels::rgb(r, g, b)),
            PixelFormat::Grayscale => {
                EncodedPixel::Channels(Channels::gray(weighted_luma(r, g, b)))
            }
        }
    }

    /// Decode to 8-bit RGB for display. Absent and malformed pixels are black.
    pub fn to_rgb8(&self) -> [u8; 3] {
        match self {
            EncodedPixel::Packed565(v) => {
                let (r, g, b) = unpack_rgb565(*v);
                [expand5(r), expand6(g), expand5(b)]
            }
            EncodedPixel::Channels(c) => match c.as_slice() {
                [v] => [*v, *v, *v],
                [r, g, b, ..] => [*r, *g, *b],
                _ => [0, 0, 0],
            },
            EncodedPixel::Absent => [0, 0, 0],
        }
    }
}

/// Fixed-point ITU-R BT.601 weighting, truncated: `(299 R + 587 G + 114 B) / 1000`.
#[inline]
pub fn weighted_luma(r: u8, g: u8, b: u8) -> u8 {
    weighted_sum(r as u32, g as u32, b as u32) as u8
}

/// Same weighting over arbitrary channel magnitudes.
#[inline]
pub fn weighted_sum(r: u32, g: u32, b: u32) -> u32 {
    (r * 299 + g * 587 + b * 114) / 1000
}

/// Split a packed value into its 5-bit red, 6-bit green and 5-bit blue fields.
#[inline]
pub fn unpack_rgb565(v: u16) -> (u8, u8, u8) {
    let r = ((v >> 11) & 0x1F) as u8;
    let g = ((v >> 5) & 0x3F) as u8;
    let b = (v & 0x1F) as u8;
    (r, g, b)
}

#[inline]
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

#[inline]
pub fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

#[inline]
pub fn expand6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_reject_more_than_four() {
        assert!(Channels::new(&[1, 2, 3, 4, 5]).is_none());
        assert_eq!(Channels::new(&[7, 8]).unwrap().as_slice(), &[7, 8]);
        assert!(Channels::new(&[]).unwrap().is_empty());
    }

    #[test]
    fn rgb565_pack_unpack_extremes() {
        assert_eq!(pack_rgb565(255, 255, 255), 0xFFFF);
        assert_eq!(unpack_rgb565(0xFFFF), (31, 63, 31));
        assert_eq!(unpack_rgb565(0xF800), (31, 0, 0));
        assert_eq!(unpack_rgb565(0x07E0), (0, 63, 0));
        assert_eq!(unpack_rgb565(0x001F), (0, 0, 31));
    }

    #[test]
    fn expansion_reaches_full_range() {
        assert_eq!(expand5(31), 255);
        assert_eq!(expand6(63), 255);
        assert_eq!(expand5(0), 0);
    }

    #[test]
    fn encode_per_format() {
        assert_eq!(
            EncodedPixel::from_rgb([255, 255, 255], PixelFormat::Rgb565),
            EncodedPixel::Packed565(0xFFFF)
        );
        assert_eq!(
            EncodedPixel::from_rgb([0, 255, 0], PixelFormat::Rgb888),
            EncodedPixel::Channels(Channels::rgb(0, 255, 0))
        );
        // 0.587 * 255 = 149.685, truncated
        assert_eq!(
            EncodedPixel::from_rgb([0, 255, 0], PixelFormat::Grayscale),
            EncodedPixel::Channels(Channels::gray(149))
        );
    }

    #[test]
    fn decode_malformed_is_black() {
        let two = EncodedPixel::Channels(Channels::new(&[200, 200]).unwrap());
        assert_eq!(two.to_rgb8(), [0, 0, 0]);
        assert_eq!(EncodedPixel::Absent.to_rgb8(), [0, 0, 0]);
        assert_eq!(EncodedPixel::Channels(Channels::gray(9)).to_rgb8(), [9, 9, 9]);
    }
}
