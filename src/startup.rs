//! Board bring-up
//!
//! [`startup`] runs the fixed sequence that takes both eyes from power-on to
//! registered displays:
//!
//! 1. pulse the shared reset line
//! 2. bind every configured panel, keeping them dark
//! 3. switch all panels on together
//! 4. register one manual-flush display per panel
//! 5. wire each panel's transfer completion to its display
//!
//! Any failure aborts the sequence. Startup has no degraded mode: the error
//! names the panel involved and the caller is expected to stop there.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dual_eye_display::{
//!     Builder, BusClaim, DrawBuffers, FlushRegistry, Gui, PanelSet, SharedBus, startup,
//! };
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
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
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! static SPI2: BusClaim = BusClaim::new();
//! static FLUSH: FlushRegistry<2> = FlushRegistry::new();
//!
//! let config = match Builder::new().buffer_lines(16).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let bus = match SharedBus::initialize(&SPI2, MockBus, MockPin, &config.bus, config.strip_bytes()) {
//!     Ok(bus) => bus,
//!     Err(_) => return,
//! };
//! let mut panels = PanelSet::<_, 2>::new();
//! let mut gui: Gui<[u8; 5120], 2> = Gui::new(&FLUSH, bus.max_transfer());
//! let mut reset = MockPin;
//! let buffers = [
//!     DrawBuffers::double([0u8; 5120], [0u8; 5120]),
//!     DrawBuffers::double([0u8; 5120], [0u8; 5120]),
//! ];
//!
//! let displays = startup(
//!     &config,
//!     &mut panels,
//!     &mut gui,
//!     &mut reset,
//!     |_descriptor| bus.panel_io(MockPin, &config.io),
//!     buffers,
//!     &mut delay,
//! );
//! if let Err(e) = displays {
//!     log::error!("{:?} failed to start", e.panel());
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::binding::{PanelDescriptor, PanelSet, PowerPolicy, pulse_reset_line};
use crate::config::Config;
use crate::display::DisplayHandle;
use crate::error::{RegistrationError, StartupError};
use crate::flush::DrawBuffers;
use crate::gui::Gui;
use crate::interface::PanelIo;

/// Bring up every panel in `config` and register its display
///
/// `acquire` builds the transport for a descriptor, typically
/// [`SharedBus::panel_io`](crate::SharedBus::panel_io) with that panel's
/// chip-select. `buffers` supplies one set of draw buffers per panel, in
/// bind order.
///
/// Returns the display handles in bind order.
///
/// # Errors
///
/// - [`StartupError::ResetLine`] if the reset pin cannot be driven
/// - [`StartupError::Bind`] for the first panel that fails to bind or power on
/// - [`StartupError::Registration`] if a display cannot be registered or wired
pub fn startup<I, A, RST, D, B, const P: usize, const N: usize>(
    config: &Config,
    panels: &mut PanelSet<I, P>,
    gui: &mut Gui<B, N>,
    reset_line: &mut RST,
    mut acquire: A,
    buffers: impl IntoIterator<Item = DrawBuffers<B>>,
    delay: &mut D,
) -> Result<Vec<DisplayHandle, N>, StartupError<I::Error>>
where
    I: PanelIo,
    A: FnMut(&PanelDescriptor) -> Result<I, I::Error>,
    RST: OutputPin,
    D: DelayNs,
    B: AsMut<[u8]> + AsRef<[u8]>,
{
    log::info!("starting {} panels", config.panels.len());
    pulse_reset_line(reset_line, delay).map_err(|_| {
        log::error!("shared reset line failed");
        StartupError::ResetLine
    })?;

    for descriptor in &config.panels {
        panels.bind(
            descriptor,
            config.dimensions,
            &config.panel,
            PowerPolicy::DeferUntilAllBound,
            || acquire(descriptor),
            delay,
        )?;
    }
    panels.power_on_all()?;

    let mut handles = Vec::new();
    let mut buffers = buffers.into_iter();
    for descriptor in &config.panels {
        let registration = |source: RegistrationError| {
            log::error!("{}: {}", descriptor.label, source);
            StartupError::Registration {
                panel: descriptor.label,
                source,
            }
        };
        let draw_buffers = buffers.next().ok_or_else(|| {
            registration(RegistrationError::InvalidBuffer {
                required: config.strip_bytes(),
                provided: 0,
            })
        })?;
        let handle = gui
            .register(
                descriptor.ordinal,
                config.display_config(descriptor.orientation),
                draw_buffers,
            )
            .map_err(registration)?;
        gui.attach_flush(handle, panels).map_err(registration)?;
        handles
            .push(handle)
            .map_err(|_| registration(RegistrationError::RegistryFull { capacity: N }))?;
    }

    log::info!("{} displays ready", handles.len());
    Ok(handles)
}
