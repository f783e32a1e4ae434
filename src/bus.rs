//! Shared SPI bus
//!
//! Both eyes hang off one SPI bus: they share SCLK, MOSI and the
//! data/command line, and differ only in chip-select. [`SharedBus`] owns the
//! bus and the DC pin behind `RefCell`s and hands out one [`SpiPanelIo`] per
//! chip-select, each built on an `embedded-hal-bus` [`RefCellDevice`].
//!
//! The bus is claimed through a [`BusClaim`], normally a `static`, so a
//! second initialization while the first bus is alive fails instead of
//! silently creating two owners of the same peripheral. Dropping the
//! [`SharedBus`] releases the claim.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dual_eye_display::{Builder, BusClaim, SharedBus};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::SpiBus;
//! # struct MockBus;
//! # impl embedded_hal::spi::ErrorType for MockBus { type Error = Infallible; }
//! # impl SpiBus for MockBus {
//! #     fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! static SPI2: BusClaim = BusClaim::new();
//!
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let bus = match SharedBus::initialize(&SPI2, MockBus, MockPin, &config.bus, config.strip_bytes()) {
//!     Ok(bus) => bus,
//!     Err(_) => return,
//! };
//! let left = bus.panel_io(MockPin, &config.io);
//! let right = bus.panel_io(MockPin, &config.io);
//! # let _ = (left, right);
//! ```

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal::spi::{ErrorType as SpiErrorType, SpiBus};
use embedded_hal_bus::spi::{DeviceError, NoDelay, RefCellDevice};

use crate::config::{BusConfig, PanelIoConfig};
use crate::error::BusInitError;
use crate::interface::{InterfaceError, SpiPanelIo};

/// Transport of one panel on a [`SharedBus`]
pub type BusPanelIo<'b, BUS, CS, DC> =
    SpiPanelIo<RefCellDevice<'b, BUS, CS, NoDelay>, SharedPin<'b, DC>>;

/// Transport error of a [`BusPanelIo`]
pub type BusIoError<BUS, CS, DC> = InterfaceError<
    DeviceError<<BUS as SpiErrorType>::Error, <CS as ErrorType>::Error>,
    <DC as ErrorType>::Error,
>;

/// Exclusive-ownership marker for one SPI host
#[derive(Debug)]
pub struct BusClaim {
    claimed: AtomicBool,
}

impl BusClaim {
    /// Create an unclaimed marker
    pub const fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
        }
    }

    /// Whether a live [`SharedBus`] holds this claim
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.claimed.store(false, Ordering::Release);
    }
}

impl Default for BusClaim {
    fn default() -> Self {
        Self::new()
    }
}

/// Output pin shared by several transports
///
/// Used for the data/command line, which is wired to every panel.
pub struct SharedPin<'a, P> {
    pin: &'a RefCell<P>,
}

impl<'a, P> SharedPin<'a, P> {
    /// Wrap a shared pin
    pub fn new(pin: &'a RefCell<P>) -> Self {
        Self { pin }
    }
}

impl<P: ErrorType> ErrorType for SharedPin<'_, P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for SharedPin<'_, P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.borrow_mut().set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.borrow_mut().set_high()
    }
}

/// One SPI bus shared by all panels
pub struct SharedBus<'c, BUS, DC> {
    claim: &'c BusClaim,
    bus: RefCell<BUS>,
    dc: RefCell<DC>,
    config: BusConfig,
}

impl<'c, BUS, DC> SharedBus<'c, BUS, DC>
where
    BUS: SpiBus,
    DC: OutputPin,
{
    /// Validate the bus configuration and take ownership of the bus
    ///
    /// `flush_bytes` is the largest single flush the displays will issue; the
    /// configured max transfer must hold it.
    ///
    /// # Errors
    ///
    /// - [`BusInitError::InvalidPins`] if a bus pin is used twice
    /// - [`BusInitError::TransferTooSmall`] if one flush does not fit a transfer
    /// - [`BusInitError::AlreadyClaimed`] if `claim` is held by a live bus
    pub fn initialize(
        claim: &'c BusClaim,
        bus: BUS,
        dc: DC,
        config: &BusConfig,
        flush_bytes: usize,
    ) -> Result<Self, BusInitError> {
        log::info!(
            "Initialize SPI bus (SCLK GPIO{}, MOSI GPIO{}, max transfer {} bytes)",
            config.sclk,
            config.mosi,
            config.max_transfer_bytes
        );
        config.validate(flush_bytes)?;
        if !claim.try_claim() {
            log::error!("SPI bus already claimed");
            return Err(BusInitError::AlreadyClaimed);
        }
        Ok(Self {
            claim,
            bus: RefCell::new(bus),
            dc: RefCell::new(dc),
            config: *config,
        })
    }

    /// Bus parameters fixed at initialization
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Largest single transfer in bytes
    pub fn max_transfer(&self) -> usize {
        self.config.max_transfer_bytes
    }

    /// Build the transport for the panel selected by `cs`
    ///
    /// # Errors
    ///
    /// Returns the chip-select pin error, wrapped as a transport error, if
    /// `cs` cannot be driven inactive.
    pub fn panel_io<CS>(
        &self,
        cs: CS,
        config: &PanelIoConfig,
    ) -> Result<BusPanelIo<'_, BUS, CS, DC>, BusIoError<BUS, CS, DC>>
    where
        CS: OutputPin,
    {
        let device = RefCellDevice::new_no_delay(&self.bus, cs)
            .map_err(|e| InterfaceError::Spi(DeviceError::Cs(e)))?;
        Ok(SpiPanelIo::new(
            device,
            SharedPin::new(&self.dc),
            config,
            self.config.max_transfer_bytes,
        ))
    }
}

impl<BUS, DC> Drop for SharedBus<'_, BUS, DC> {
    fn drop(&mut self) {
        self.claim.release();
        log::info!("SPI bus released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::interface::PanelIo;
    use alloc::vec::Vec;
    use core::convert::Infallible;

    #[derive(Default)]
    struct MockBus {
        written: Vec<u8>,
    }

    impl embedded_hal::spi::ErrorType for MockBus {
        type Error = Infallible;
    }

    impl SpiBus for MockBus {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }
        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(words);
            Ok(())
        }
        fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }
        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }
        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct MockPin;

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_second_initialize_is_rejected_until_drop() {
        static CLAIM: BusClaim = BusClaim::new();
        let config = Builder::new().build().unwrap();

        let first = SharedBus::initialize(
            &CLAIM,
            MockBus::default(),
            MockPin,
            &config.bus,
            config.strip_bytes(),
        )
        .unwrap();
        assert!(CLAIM.is_claimed());

        let second = SharedBus::initialize(
            &CLAIM,
            MockBus::default(),
            MockPin,
            &config.bus,
            config.strip_bytes(),
        );
        assert!(matches!(second, Err(BusInitError::AlreadyClaimed)));

        drop(first);
        assert!(!CLAIM.is_claimed());
    }

    #[test]
    fn test_invalid_config_does_not_claim() {
        static CLAIM: BusClaim = BusClaim::new();
        let config = Builder::new().max_transfer_bytes(16).build().unwrap();

        let result = SharedBus::initialize(
            &CLAIM,
            MockBus::default(),
            MockPin,
            &config.bus,
            config.strip_bytes(),
        );
        assert!(matches!(
            result,
            Err(BusInitError::TransferTooSmall { provided: 16, .. })
        ));
        assert!(!CLAIM.is_claimed());
    }

    #[test]
    fn test_panel_ios_share_one_bus() {
        static CLAIM: BusClaim = BusClaim::new();
        let config = Builder::new().build().unwrap();
        let bus = SharedBus::initialize(
            &CLAIM,
            MockBus::default(),
            MockPin,
            &config.bus,
            config.strip_bytes(),
        )
        .unwrap();

        let mut left = bus.panel_io(MockPin, &config.io).unwrap();
        let mut right = bus.panel_io(MockPin, &config.io).unwrap();
        assert_eq!(left.max_transfer(), 51_200);

        left.tx_param(0x11, &[]).unwrap();
        right.tx_param(0x29, &[]).unwrap();
        drop((left, right));

        assert_eq!(bus.bus.borrow().written, alloc::vec![0x11, 0x29]);
    }
}
