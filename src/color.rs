//! Pixel formats and color ordering
//!
//! The GC9D01 accepts 16-bit (RGB565) or 18-bit (RGB666) pixels, with the red
//! and blue channels in either order.
//!
//! | Format | COLMOD | Bytes per pixel |
//! |--------|--------|-----------------|
//! | RGB565 | 0x55   | 2               |
//! | RGB666 | 0x66   | 3               |
//!
//! Pixels are written most-significant byte first on the wire. Draw buffers
//! that are filled in host byte order need `swap_bytes` set on the display so
//! the renderer emits big-endian words.
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::color::{rgb565_bytes, PixelFormat};
//! use embedded_graphics_core::pixelcolor::{Rgb565, RgbColor};
//!
//! assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
//! assert_eq!(rgb565_bytes(Rgb565::RED, true), [0xF8, 0x00]);
//! assert_eq!(rgb565_bytes(Rgb565::RED, false), [0x00, 0xF8]);
//! ```

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_graphics_core::pixelcolor::raw::{RawData, RawU16};

/// Order of the red and blue channels in panel RAM
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    /// Red in the most significant bits
    Rgb,
    /// Blue in the most significant bits (the eye modules are wired BGR)
    #[default]
    Bgr,
}

/// Pixel format on the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16 bits per pixel
    #[default]
    Rgb565,
    /// 18 bits per pixel, sent as three bytes
    Rgb666,
}

impl PixelFormat {
    /// Look up a format from its bits-per-pixel value
    pub fn from_bits(bits_per_pixel: u8) -> Option<Self> {
        match bits_per_pixel {
            16 => Some(Self::Rgb565),
            18 => Some(Self::Rgb666),
            _ => None,
        }
    }

    /// Bits per pixel
    pub fn bits_per_pixel(self) -> u8 {
        match self {
            Self::Rgb565 => 16,
            Self::Rgb666 => 18,
        }
    }

    /// Bytes per pixel on the wire
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Rgb666 => 3,
        }
    }

    /// Parameter for the COLMOD (0x3A) command
    pub fn colmod(self) -> u8 {
        match self {
            Self::Rgb565 => 0x55,
            Self::Rgb666 => 0x66,
        }
    }
}

/// Encode an RGB565 color as two bytes
///
/// With `swap_bytes` the high byte comes first, which is the order the panel
/// expects over SPI.
pub fn rgb565_bytes(color: Rgb565, swap_bytes: bool) -> [u8; 2] {
    let raw = RawU16::from(color).into_inner();
    if swap_bytes {
        raw.to_be_bytes()
    } else {
        raw.to_le_bytes()
    }
}
