//! Strip rendering via embedded-graphics
//!
//! This module provides [`StripTarget`], a [`DrawTarget`] over one draw
//! buffer. A frame is rendered strip by strip: each strip is a rectangle of
//! the display at most `buffer_lines` tall, and every drawing operation is
//! clipped to it. Pixels land in the buffer as RGB565 bytes in the order
//! the panel expects.
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::StripTarget;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::pixelcolor::Rgb565;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//!
//! let mut buffer = [0u8; 160 * 2 * 2];
//! // Rows 10 and 11 of a 160x160 display
//! let strip = Rectangle::new(Point::new(0, 10), Size::new(160, 2));
//! let mut target = match StripTarget::new(&mut buffer, Size::new(160, 160), strip, true) {
//!     Some(target) => target,
//!     None => return,
//! };
//!
//! // Only the part inside the strip is written
//! let _ = Rectangle::new(Point::new(0, 0), Size::new(1, 20))
//!     .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
//!     .draw(&mut target);
//! assert_eq!(&buffer[..2], &[0xF8, 0x00]);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::Rgb565,
    primitives::{PointsIter, Rectangle},
    Pixel,
};

use crate::color::rgb565_bytes;

const BYTES_PER_PIXEL: usize = 2;

/// Draw target covering one strip of a display
pub struct StripTarget<'a> {
    buffer: &'a mut [u8],
    display: Size,
    area: Rectangle,
    swap_bytes: bool,
}

impl<'a> StripTarget<'a> {
    /// Wrap `buffer` as the strip `area` of a display of size `display`
    ///
    /// Returns `None` if `area` is empty or the buffer cannot hold it.
    pub fn new(
        buffer: &'a mut [u8],
        display: Size,
        area: Rectangle,
        swap_bytes: bool,
    ) -> Option<Self> {
        let pixels = area.size.width as usize * area.size.height as usize;
        if pixels == 0 || buffer.len() < pixels * BYTES_PER_PIXEL {
            return None;
        }
        Some(Self {
            buffer,
            display,
            area,
            swap_bytes,
        })
    }

    /// Strip rectangle in display coordinates
    pub fn area(&self) -> Rectangle {
        self.area
    }

    /// Bytes of the buffer covered by the strip
    pub fn byte_len(&self) -> usize {
        self.area.size.width as usize * self.area.size.height as usize * BYTES_PER_PIXEL
    }

    fn offset(&self, point: Point) -> Option<usize> {
        if !self.area.contains(point) {
            return None;
        }
        let x = (point.x - self.area.top_left.x) as usize;
        let y = (point.y - self.area.top_left.y) as usize;
        Some((y * self.area.size.width as usize + x) * BYTES_PER_PIXEL)
    }

    fn put(&mut self, offset: usize, bytes: [u8; 2]) {
        if let Some(dst) = self.buffer.get_mut(offset..offset + BYTES_PER_PIXEL) {
            dst.copy_from_slice(&bytes);
        }
    }
}

impl DrawTarget for StripTarget<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(offset) = self.offset(point) {
                self.put(offset, rgb565_bytes(color, self.swap_bytes));
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.area);
        if clipped.size.width == 0 || clipped.size.height == 0 {
            return Ok(());
        }
        let bytes = rgb565_bytes(color, self.swap_bytes);
        for point in clipped.points() {
            if let Some(offset) = self.offset(point) {
                self.put(offset, bytes);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let bytes = rgb565_bytes(color, self.swap_bytes);
        let len = self.byte_len();
        if let Some(strip) = self.buffer.get_mut(..len) {
            for pixel in strip.chunks_exact_mut(BYTES_PER_PIXEL) {
                pixel.copy_from_slice(&bytes);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for StripTarget<'_> {
    fn size(&self) -> Size {
        self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::PrimitiveStyle;

    fn strip(y: i32, lines: u32) -> Rectangle {
        Rectangle::new(Point::new(0, y), Size::new(4, lines))
    }

    #[test]
    fn test_new_rejects_short_buffer() {
        let mut buffer = [0u8; 15];
        assert!(StripTarget::new(&mut buffer, Size::new(4, 4), strip(0, 2), true).is_none());
    }

    #[test]
    fn test_size_is_display_size() {
        let mut buffer = [0u8; 16];
        let target = StripTarget::new(&mut buffer, Size::new(4, 4), strip(2, 2), true).unwrap();
        assert_eq!(target.size(), Size::new(4, 4));
        assert_eq!(target.byte_len(), 16);
    }

    #[test]
    fn test_pixels_outside_strip_are_clipped() {
        let mut buffer = [0u8; 16];
        let mut target =
            StripTarget::new(&mut buffer, Size::new(4, 4), strip(2, 2), true).unwrap();
        Pixel(Point::new(0, 0), Rgb565::WHITE)
            .draw(&mut target)
            .unwrap();
        Pixel(Point::new(1, 2), Rgb565::RED).draw(&mut target).unwrap();
        Pixel(Point::new(-1, 3), Rgb565::RED).draw(&mut target).unwrap();
        assert_eq!(buffer[..2], [0, 0]);
        assert_eq!(buffer[2..4], [0xF8, 0x00]);
    }

    #[test]
    fn test_fill_solid_clips_to_strip() {
        let mut buffer = [0u8; 16];
        let mut target =
            StripTarget::new(&mut buffer, Size::new(4, 4), strip(2, 2), false).unwrap();
        Rectangle::new(Point::new(3, 0), Size::new(1, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::BLUE))
            .draw(&mut target)
            .unwrap();
        // Column 3 of both strip rows, little-endian
        assert_eq!(buffer[6..8], [0x1F, 0x00]);
        assert_eq!(buffer[14..16], [0x1F, 0x00]);
        assert_eq!(buffer[..6], [0u8; 6]);
    }

    #[test]
    fn test_clear_fills_only_strip_bytes() {
        let mut buffer = [0u8; 20];
        let mut target =
            StripTarget::new(&mut buffer, Size::new(4, 4), strip(0, 2), true).unwrap();
        target.clear(Rgb565::WHITE).unwrap();
        assert!(buffer[..16].iter().all(|b| *b == 0xFF));
        assert_eq!(buffer[16..], [0u8; 4]);
    }
}
