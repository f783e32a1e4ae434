//! Panel orientation and MADCTL encoding
//!
//! The GC9D01 maps framebuffer coordinates to panel RAM through the MADCTL
//! register. Three bits select the scan direction:
//!
//! - **MY** (0x80): mirror rows
//! - **MX** (0x40): mirror columns
//! - **MV** (0x20): exchange rows and columns
//!
//! A fourth bit (**BGR**, 0x08) selects the color order and is carried along
//! whenever MADCTL is rewritten.
//!
//! ## Rotation Modes
//!
//! - **Rotate0**: native orientation
//! - **Rotate90**: MV + MX
//! - **Rotate180**: MX + MY
//! - **Rotate270**: MV + MY
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::{ColorSpace, Orientation, Rotation};
//!
//! let native = Orientation::default();
//! assert_eq!(native.madctl(ColorSpace::Bgr), 0x08);
//!
//! let turned = Orientation::from(Rotation::Rotate90);
//! assert_eq!(turned.madctl(ColorSpace::Rgb), 0x60);
//! ```

use crate::color::ColorSpace;
use crate::command::{MADCTL_BGR, MADCTL_MV, MADCTL_MX, MADCTL_MY};

/// Display rotation relative to native orientation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

/// Scan direction flags of one panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Orientation {
    /// Mirror along the X axis
    pub mirror_x: bool,
    /// Mirror along the Y axis
    pub mirror_y: bool,
    /// Exchange X and Y
    pub swap_xy: bool,
}

impl Orientation {
    /// Create orientation flags
    pub const fn new(mirror_x: bool, mirror_y: bool, swap_xy: bool) -> Self {
        Self {
            mirror_x,
            mirror_y,
            swap_xy,
        }
    }

    /// MADCTL register value for these flags
    pub fn madctl(&self, color_space: ColorSpace) -> u8 {
        let mut value = 0;
        if self.mirror_y {
            value |= MADCTL_MY;
        }
        if self.mirror_x {
            value |= MADCTL_MX;
        }
        if self.swap_xy {
            value |= MADCTL_MV;
        }
        if color_space == ColorSpace::Bgr {
            value |= MADCTL_BGR;
        }
        value
    }

    /// Logical (width, height) for a panel of native `width` x `height`
    pub fn logical_size(&self, width: u16, height: u16) -> (u16, u16) {
        if self.swap_xy {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl From<Rotation> for Orientation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Rotate0 => Self::new(false, false, false),
            Rotation::Rotate90 => Self::new(true, false, true),
            Rotation::Rotate180 => Self::new(true, true, false),
            Rotation::Rotate270 => Self::new(false, true, true),
        }
    }
}
