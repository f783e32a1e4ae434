//! Panel transport abstraction
//!
//! This module provides the [`PanelIo`] trait, the transport handle a
//! [`Gc9d01`](crate::panel::Gc9d01) talks through, and [`SpiPanelIo`], its
//! implementation over an embedded-hal [`SpiDevice`] plus a data/command pin.
//!
//! ## Hardware Requirements
//!
//! Each panel needs:
//! - an SPI device (MOSI + SCK, with its own chip-select)
//! - a **DC** pin: Data/Command select (output, may be shared between panels)
//!
//! ## Color transfers
//!
//! [`PanelIo::tx_color`] is the only call that moves pixel data. When it
//! returns `Ok`, the transfer has completed and the transport posts the
//! "color transmission done" event to the attached
//! [`FlushSlot`], handing the draw buffer back to the renderer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dual_eye_display::{Builder, PanelIo, SpiPanelIo};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut io = SpiPanelIo::new(MockSpi, MockPin, &config.io, config.bus.max_transfer_bytes);
//!
//! // Sleep out, then 16-bit pixels
//! let _ = io.tx_param(0x11, &[]);
//! let _ = io.tx_param(0x3A, &[0x55]);
//! ```

use core::fmt::Debug;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::config::{PanelIoConfig, WordWidth};
use crate::flush::FlushSlot;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Parameter bytes widened per SPI write in 16-bit mode
const WIDE_CHUNK: usize = 32;

/// Transport handle between a panel driver and the bus
///
/// ## Implementing
///
/// For most cases, use the provided [`SpiPanelIo`]. Implement this trait
/// yourself for DMA-driven transports where the color transfer completes
/// asynchronously; such a transport must call
/// [`FlushSlot::on_color_trans_done`] from its completion interrupt.
pub trait PanelIo {
    /// Error type for transport operations
    type Error: Debug;

    /// Send a command followed by its parameters
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn tx_param(&mut self, command: u8, params: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Send a command followed by pixel data
    ///
    /// Pixel bytes are sent as-is regardless of the parameter word width.
    /// On completion the attached flush slot, if any, is signalled.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails, or if the payload
    /// exceeds the bus max transfer.
    fn tx_color(&mut self, command: u8, pixels: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Route "color transmission done" events to `slot`
    fn attach_flush_slot(&mut self, slot: &'static FlushSlot);

    /// Slot currently receiving completion events
    fn flush_slot(&self) -> Option<&'static FlushSlot>;
}

/// Errors that can occur at the transport level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
    /// Color payload larger than the bus max transfer
    TransferTooLarge {
        /// Payload length in bytes
        len: usize,
        /// Bus max transfer in bytes
        max: usize,
    },
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::TransferTooLarge { len, max } => {
                write!(f, "Transfer of {len} bytes exceeds max transfer of {max}")
            }
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// SPI transport for one GC9D01 panel
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`], owning the panel's chip-select
/// * `DC` - Data/Command pin implementing [`OutputPin`]
pub struct SpiPanelIo<SPI, DC> {
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    cmd_bits: WordWidth,
    param_bits: WordWidth,
    max_transfer: usize,
    slot: Option<&'static FlushSlot>,
}

impl<SPI, DC> SpiPanelIo<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    /// Create a transport
    ///
    /// `max_transfer` is the bus limit for a single color transfer.
    pub fn new(spi: SPI, dc: DC, config: &PanelIoConfig, max_transfer: usize) -> Self {
        Self {
            spi,
            dc,
            cmd_bits: config.cmd_bits,
            param_bits: config.param_bits,
            max_transfer,
            slot: None,
        }
    }

    /// Bus limit for a single color transfer
    pub fn max_transfer(&self) -> usize {
        self.max_transfer
    }

    /// Release the SPI device and DC pin
    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }

    fn write_words(
        &mut self,
        bytes: &[u8],
        width: WordWidth,
    ) -> InterfaceResult<(), InterfaceError<SPI::Error, DC::Error>> {
        match width {
            WordWidth::Bits8 => self.spi.write(bytes).map_err(InterfaceError::Spi),
            WordWidth::Bits16 => {
                let mut wide = [0u8; WIDE_CHUNK * 2];
                for chunk in bytes.chunks(WIDE_CHUNK) {
                    for (i, byte) in chunk.iter().enumerate() {
                        wide[i * 2] = 0;
                        wide[i * 2 + 1] = *byte;
                    }
                    self.spi
                        .write(&wide[..chunk.len() * 2])
                        .map_err(InterfaceError::Spi)?;
                }
                Ok(())
            }
        }
    }

    fn send_command(
        &mut self,
        command: u8,
    ) -> InterfaceResult<(), InterfaceError<SPI::Error, DC::Error>> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.write_words(&[command], self.cmd_bits)
    }
}

impl<SPI, DC> PanelIo for SpiPanelIo<SPI, DC>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin,
    DC::Error: Debug,
{
    type Error = InterfaceError<SPI::Error, DC::Error>;

    fn tx_param(&mut self, command: u8, params: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.send_command(command)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(InterfaceError::Pin)?;
            self.write_words(params, self.param_bits)?;
        }
        Ok(())
    }

    fn tx_color(&mut self, command: u8, pixels: &[u8]) -> InterfaceResult<(), Self::Error> {
        if pixels.len() > self.max_transfer {
            return Err(InterfaceError::TransferTooLarge {
                len: pixels.len(),
                max: self.max_transfer,
            });
        }
        self.send_command(command)?;
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(pixels).map_err(InterfaceError::Spi)?;

        // Blocking write: the transfer is done once `write` returns
        if let Some(slot) = self.slot {
            slot.on_color_trans_done();
        }
        Ok(())
    }

    fn attach_flush_slot(&mut self, slot: &'static FlushSlot) {
        self.slot = Some(slot);
    }

    fn flush_slot(&self) -> Option<&'static FlushSlot> {
        self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use embedded_hal::digital::ErrorType;
    use embedded_hal::spi::{ErrorType as SpiErrorType, Operation};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Dc(bool),
        Write(Vec<u8>),
    }

    type Log = RefCell<Vec<Event>>;

    struct MockSpi<'a>(&'a Log);
    struct MockPin<'a>(&'a Log);

    impl SpiErrorType for MockSpi<'_> {
        type Error = core::convert::Infallible;
    }

    impl SpiDevice for MockSpi<'_> {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.0.borrow_mut().push(Event::Write(bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    impl ErrorType for MockPin<'_> {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for MockPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().push(Event::Dc(false));
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().push(Event::Dc(true));
            Ok(())
        }
    }

    fn io<'a>(log: &'a Log, cmd_bits: u8, param_bits: u8) -> SpiPanelIo<MockSpi<'a>, MockPin<'a>> {
        let config = Builder::new()
            .cmd_bits(cmd_bits)
            .param_bits(param_bits)
            .build()
            .unwrap();
        SpiPanelIo::new(MockSpi(log), MockPin(log), &config.io, 8)
    }

    #[test]
    fn test_command_then_params_8bit() {
        let log = Log::default();
        let mut io = io(&log, 8, 8);
        io.tx_param(0x3A, &[0x55]).unwrap();
        assert_eq!(
            log.into_inner(),
            alloc::vec![
                Event::Dc(false),
                Event::Write(alloc::vec![0x3A]),
                Event::Dc(true),
                Event::Write(alloc::vec![0x55]),
            ]
        );
    }

    #[test]
    fn test_command_without_params_leaves_dc_low() {
        let log = Log::default();
        let mut io = io(&log, 8, 8);
        io.tx_param(0x11, &[]).unwrap();
        assert_eq!(
            log.into_inner(),
            alloc::vec![Event::Dc(false), Event::Write(alloc::vec![0x11])]
        );
    }

    #[test]
    fn test_16bit_words_are_big_endian() {
        let log = Log::default();
        let mut io = io(&log, 16, 16);
        io.tx_param(0x2A, &[0x00, 0x9F]).unwrap();
        assert_eq!(
            log.into_inner(),
            alloc::vec![
                Event::Dc(false),
                Event::Write(alloc::vec![0x00, 0x2A]),
                Event::Dc(true),
                Event::Write(alloc::vec![0x00, 0x00, 0x00, 0x9F]),
            ]
        );
    }

    #[test]
    fn test_color_data_is_not_widened() {
        let log = Log::default();
        let mut io = io(&log, 16, 16);
        io.tx_color(0x2C, &[0xF8, 0x00]).unwrap();
        let events = log.into_inner();
        assert_eq!(events[3], Event::Write(alloc::vec![0xF8, 0x00]));
    }

    #[test]
    fn test_color_larger_than_max_transfer_is_rejected() {
        let log = Log::default();
        let mut io = io(&log, 8, 8);
        let result = io.tx_color(0x2C, &[0u8; 9]);
        assert!(matches!(
            result,
            Err(InterfaceError::TransferTooLarge { len: 9, max: 8 })
        ));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_color_done_signals_attached_slot() {
        static SLOT: FlushSlot = FlushSlot::new();
        let log = Log::default();
        let mut io = io(&log, 8, 8);
        assert!(io.flush_slot().is_none());
        io.attach_flush_slot(&SLOT);

        SLOT.submit().unwrap();
        io.tx_color(0x2C, &[0u8; 4]).unwrap();
        assert!(!SLOT.is_in_flight());
        assert_eq!(SLOT.completed(), 1);
    }
}
