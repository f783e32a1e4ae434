//! GC9D01 command definitions
//!
//! Command bytes understood by the GC9D01 round-panel controller. Commands are
//! sent with the DC pin low and their parameters with DC high, each as a
//! separate chip-select cycle.
//!
//! ## Command Structure
//!
//! 1. Assert CS
//! 2. Set DC low, send the command word
//! 3. Set DC high, send parameter words (if any)
//! 4. Deassert CS
//!
//! ## Example
//!
//! ```rust,no_run
//! use dual_eye_display::{command, PanelIo};
//! # use core::convert::Infallible;
//! # use dual_eye_display::FlushSlot;
//! # struct MockIo;
//! # impl PanelIo for MockIo {
//! #     type Error = Infallible;
//! #     fn tx_param(&mut self, _command: u8, _params: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn tx_color(&mut self, _command: u8, _pixels: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn attach_flush_slot(&mut self, _slot: &'static FlushSlot) {}
//! #     fn flush_slot(&self) -> Option<&'static FlushSlot> { None }
//! # }
//! # let mut io = MockIo;
//! // Wake the controller
//! let _ = io.tx_param(command::SLPOUT, &[]);
//!
//! // 16 bits per pixel
//! let _ = io.tx_param(command::COLMOD, &[0x55]);
//! ```

// System control commands

/// Software reset (0x01)
///
/// Returns every register to its power-on default. Wait 5ms before the next
/// command and 120ms before sleep-out.
pub const SWRESET: u8 = 0x01;

/// Sleep in (0x10)
pub const SLPIN: u8 = 0x10;

/// Sleep out (0x11)
///
/// Starts the internal oscillator and DC/DC converter. Wait 120ms before
/// sending display-on.
pub const SLPOUT: u8 = 0x11;

/// Display inversion off (0x20)
pub const INVOFF: u8 = 0x20;

/// Display inversion on (0x21)
pub const INVON: u8 = 0x21;

/// Display off (0x28)
pub const DISPOFF: u8 = 0x28;

/// Display on (0x29)
pub const DISPON: u8 = 0x29;

// Memory access commands

/// Column address set (0x2A)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB], end inclusive.
pub const CASET: u8 = 0x2A;

/// Row address set (0x2B)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB], end inclusive.
pub const RASET: u8 = 0x2B;

/// Memory write (0x2C)
///
/// Followed by pixel data for the window set with CASET/RASET.
pub const RAMWR: u8 = 0x2C;

/// Memory access control (0x36)
///
/// Requires 1 byte, see the `MADCTL_*` bits.
pub const MADCTL: u8 = 0x36;

/// Interface pixel format (0x3A)
///
/// Requires 1 byte: 0x55 = 16 bpp, 0x66 = 18 bpp
pub const COLMOD: u8 = 0x3A;

// Vendor register access

/// Inter register enable 1 (0xFE)
pub const INTER_REG_ENABLE1: u8 = 0xFE;

/// Inter register enable 2 (0xEF)
pub const INTER_REG_ENABLE2: u8 = 0xEF;

// MADCTL bits

/// Row address order (mirror Y)
pub const MADCTL_MY: u8 = 0x80;

/// Column address order (mirror X)
pub const MADCTL_MX: u8 = 0x40;

/// Row/column exchange (swap XY)
pub const MADCTL_MV: u8 = 0x20;

/// BGR color order
pub const MADCTL_BGR: u8 = 0x08;

/// One entry of a controller init table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitCommand {
    /// Command byte
    pub command: u8,
    /// Parameter bytes
    pub params: &'static [u8],
    /// Delay after the command in milliseconds
    pub delay_ms: u32,
}

impl InitCommand {
    /// Create an init table entry
    pub const fn new(command: u8, params: &'static [u8], delay_ms: u32) -> Self {
        Self {
            command,
            params,
            delay_ms,
        }
    }
}

/// Vendor init table for the GC9D01 160x160 eye modules
///
/// Unlocks the vendor registers, programs power, gate timing and gamma. Pixel
/// format, orientation and sleep-out are sent separately by
/// [`Gc9d01::init`](crate::panel::Gc9d01::init).
pub const GC9D01_VENDOR_INIT: &[InitCommand] = &[
    InitCommand::new(INTER_REG_ENABLE1, &[], 0),
    InitCommand::new(INTER_REG_ENABLE2, &[], 0),
    InitCommand::new(0x80, &[0xFF], 0),
    InitCommand::new(0x81, &[0xFF], 0),
    InitCommand::new(0x82, &[0xFF], 0),
    InitCommand::new(0x83, &[0xFF], 0),
    InitCommand::new(0x84, &[0xFF], 0),
    InitCommand::new(0x85, &[0xFF], 0),
    InitCommand::new(0x86, &[0xFF], 0),
    InitCommand::new(0x87, &[0xFF], 0),
    InitCommand::new(0x88, &[0xFF], 0),
    InitCommand::new(0x89, &[0xFF], 0),
    InitCommand::new(0x8A, &[0xFF], 0),
    InitCommand::new(0x8B, &[0xFF], 0),
    InitCommand::new(0x8C, &[0xFF], 0),
    InitCommand::new(0x8D, &[0xFF], 0),
    InitCommand::new(0x8E, &[0xFF], 0),
    InitCommand::new(0x8F, &[0xFF], 0),
    InitCommand::new(0xEC, &[0x01], 0),
    InitCommand::new(0x74, &[0x02, 0x0E, 0x00, 0x00, 0x00, 0x00, 0x00], 0),
    InitCommand::new(0x98, &[0x3E], 0),
    InitCommand::new(0x99, &[0x3E], 0),
    InitCommand::new(0xB5, &[0x0D, 0x0D], 0),
    InitCommand::new(0x60, &[0x38, 0x0F, 0x79, 0x67], 0),
    InitCommand::new(0x61, &[0x38, 0x11, 0x79, 0x67], 0),
    InitCommand::new(0x64, &[0x38, 0x17, 0x71, 0x5F, 0x79, 0x67], 0),
    InitCommand::new(0x65, &[0x38, 0x13, 0x71, 0x5B, 0x79, 0x67], 0),
    InitCommand::new(0x6A, &[0x00, 0x00], 0),
    InitCommand::new(0x6C, &[0x22, 0x02, 0x22, 0x02, 0x22, 0x22, 0x50], 0),
    InitCommand::new(
        0x6E,
        &[
            0x03, 0x03, 0x01, 0x01, 0x00, 0x00, 0x0F, 0x0F, 0x0D, 0x0D, 0x0B, 0x0B, 0x09, 0x09,
            0x00, 0x00, 0x00, 0x00, 0x0A, 0x0A, 0x0C, 0x0C, 0x0E, 0x0E, 0x10, 0x10, 0x00, 0x00,
            0x02, 0x02, 0x04, 0x04,
        ],
        0,
    ),
    InitCommand::new(0xBF, &[0x01], 0),
    InitCommand::new(0xF9, &[0x40], 0),
    InitCommand::new(0x9B, &[0x3B], 0),
    InitCommand::new(0x93, &[0x33, 0x7F, 0x00], 0),
    InitCommand::new(0x7E, &[0x30], 0),
    InitCommand::new(0x70, &[0x0D, 0x02, 0x08, 0x0D, 0x02, 0x08], 0),
    InitCommand::new(0x71, &[0x0D, 0x02, 0x08], 0),
    InitCommand::new(0x91, &[0x0E, 0x09], 0),
    InitCommand::new(0xC3, &[0x19], 0),
    InitCommand::new(0xC4, &[0x19], 0),
    InitCommand::new(0xC9, &[0x3C], 0),
    // Gamma
    InitCommand::new(0xF0, &[0x53, 0x15, 0x0A, 0x04, 0x00, 0x3E], 0),
    InitCommand::new(0xF2, &[0x53, 0x15, 0x0A, 0x04, 0x00, 0x3A], 0),
    InitCommand::new(0xF1, &[0x56, 0xA8, 0x7F, 0x33, 0x34, 0x5F], 0),
    InitCommand::new(0xF3, &[0x52, 0xA4, 0x7F, 0x33, 0x34, 0xDF], 0),
];
