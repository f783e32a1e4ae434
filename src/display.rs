//! Display registration types
//!
//! A display is the GUI-side view of a bound panel: resolution, draw buffer
//! geometry, flush mode and orientation. [`DisplayConfig`] is passed to
//! [`Gui::register`](crate::gui::Gui::register), which hands back a
//! [`DisplayHandle`].

use embedded_graphics_core::geometry::Size;

use crate::color::PixelFormat;
use crate::error::RegistrationError;
use crate::rotation::Orientation;

/// How the flush completion reaches the GUI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlushMode {
    /// The caller wires the panel transport to the display's flush slot
    /// later, through [`Gui::attach_flush`](crate::gui::Gui::attach_flush)
    #[default]
    Manual,
    /// Registration wires the flush slot itself and forces full refresh
    PortManaged,
}

/// Registration parameters of one display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Horizontal resolution
    pub hor_res: u16,
    /// Vertical resolution
    pub ver_res: u16,
    /// Draw buffer height in lines
    pub buffer_lines: u16,
    /// Two buffers used alternately
    pub double_buffer: bool,
    /// Buffers live in DMA-capable memory
    pub dma_capable: bool,
    /// Buffers live in external RAM
    pub external_memory: bool,
    /// Emit each RGB565 pixel high byte first
    pub swap_bytes: bool,
    /// Redraw the whole frame on every change
    pub full_refresh: bool,
    /// Orientation the panel was bound with
    pub orientation: Orientation,
    /// Pixel format of the draw buffers
    pub pixel_format: PixelFormat,
    /// Flush completion wiring
    pub flush_mode: FlushMode,
}

impl DisplayConfig {
    /// Logical size after axis swap
    pub fn logical_size(&self) -> Size {
        let (w, h) = self.orientation.logical_size(self.hor_res, self.ver_res);
        Size::new(w as u32, h as u32)
    }

    /// Bytes in one strip of `buffer_lines` full-width rows
    pub fn strip_bytes(&self) -> usize {
        let width = self.logical_size().width as usize;
        width * self.buffer_lines as usize * self.pixel_format.bytes_per_pixel()
    }

    /// Check the config against the draw buffer and the bus limit
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::UnsupportedPixelFormat`] for anything but RGB565
    /// - [`RegistrationError::InvalidBuffer`] if the buffer cannot hold one strip
    /// - [`RegistrationError::ExceedsMaxTransfer`] if one strip exceeds `max_transfer`
    pub fn validate(
        &self,
        buffer_len: usize,
        max_transfer: usize,
    ) -> Result<(), RegistrationError> {
        if self.pixel_format != PixelFormat::Rgb565 {
            return Err(RegistrationError::UnsupportedPixelFormat {
                bits_per_pixel: self.pixel_format.bits_per_pixel(),
            });
        }
        let height = self.logical_size().height as u16;
        let required = self.strip_bytes();
        if self.buffer_lines == 0 || self.buffer_lines > height || buffer_len < required {
            return Err(RegistrationError::InvalidBuffer {
                required,
                provided: buffer_len,
            });
        }
        if required > max_transfer {
            return Err(RegistrationError::ExceedsMaxTransfer {
                required,
                max: max_transfer,
            });
        }
        Ok(())
    }
}

/// Reference to a registered display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayHandle(pub(crate) u8);

impl DisplayHandle {
    /// Registration index
    pub fn index(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;

    fn config() -> DisplayConfig {
        Builder::new()
            .build()
            .unwrap()
            .display_config(Orientation::default())
    }

    #[test]
    fn test_default_display_config() {
        let config = config();
        assert_eq!(config.logical_size(), Size::new(160, 160));
        assert_eq!(config.strip_bytes(), 51_200);
        assert_eq!(config.flush_mode, FlushMode::Manual);
        assert!(!config.full_refresh);
        assert!(config.swap_bytes);
    }

    #[test]
    fn test_validate_buffer_and_transfer() {
        let config = config();
        assert!(config.validate(51_200, 51_200).is_ok());
        assert_eq!(
            config.validate(51_199, 51_200),
            Err(RegistrationError::InvalidBuffer {
                required: 51_200,
                provided: 51_199
            })
        );
        assert_eq!(
            config.validate(51_200, 4096),
            Err(RegistrationError::ExceedsMaxTransfer {
                required: 51_200,
                max: 4096
            })
        );
    }

    #[test]
    fn test_validate_rejects_rgb666() {
        let config = DisplayConfig {
            pixel_format: PixelFormat::Rgb666,
            ..config()
        };
        assert_eq!(
            config.validate(usize::MAX, usize::MAX),
            Err(RegistrationError::UnsupportedPixelFormat { bits_per_pixel: 18 })
        );
    }
}
