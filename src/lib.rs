//! Dual GC9D01 Display Driver
//!
//! Brings up two 160x160 GC9D01 round LCDs ("eyes") that share one SPI bus,
//! one data/command line and one reset line, and drives them from a small
//! strip-based renderer.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support, bus sharing via `embedded-hal-bus`
//! - Per-panel bind sequence with failure isolation between panels
//! - Flush handshake between renderer and transport with single or double
//!   draw buffers
//! - `embedded-graphics` rendering of animated images and labels
//! - Tick and service loop behind an `embassy-sync` lock
//! - Thread-backed tick timer and GUI task spawning (with `std` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dual_eye_display::scene::{AnimationSource, EyeScene, build_eye_scenes};
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
//! static FRAME: [u8; 32 * 32 * 2] = [0; 32 * 32 * 2];
//! static EYE: AnimationSource = AnimationSource::new(32, 32, 100, &[&FRAME]);
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
//! let mut chip_selects = [MockPin, MockPin].into_iter();
//!
//! let displays = startup(
//!     &config,
//!     &mut panels,
//!     &mut gui,
//!     &mut MockPin,
//!     |_descriptor| bus.panel_io(chip_selects.next().unwrap_or(MockPin), &config.io),
//!     [
//!         DrawBuffers::double([0u8; 5120], [0u8; 5120]),
//!         DrawBuffers::double([0u8; 5120], [0u8; 5120]),
//!     ],
//!     &mut delay,
//! );
//! let displays = match displays {
//!     Ok(displays) => displays,
//!     Err(_) => return,
//! };
//!
//! let eyes = [
//!     EyeScene { display: displays[0], animation: &EYE, label: "L" },
//!     EyeScene { display: displays[1], animation: &EYE, label: "R" },
//! ];
//! if build_eye_scenes(&mut gui, &eyes).is_err() {
//!     return;
//! }
//! let _ = gui.render_pass(&mut panels, 0);
//! ```

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(test)]
extern crate alloc;

/// Panel bring-up and the set of bound panels
pub mod binding;
/// Shared SPI bus and per-panel transports
pub mod bus;
/// Pixel formats and color order
pub mod color;
/// GC9D01 command definitions
pub mod command;
/// Board configuration types and builder
pub mod config;
/// Display registration types
pub mod display;
/// Error types for the driver
pub mod error;
/// Renderer/transport buffer handshake
pub mod flush;
/// Strip rendering via embedded-graphics
pub mod graphics;
/// Display registry and render pass
pub mod gui;
/// Panel transport abstraction
pub mod interface;
/// GC9D01 panel handle
pub mod panel;
/// Rotation and MADCTL orientation flags
pub mod rotation;
/// Screens and widgets
pub mod scene;
/// GUI lock, tick timer and service loop
pub mod service;
/// Board bring-up sequence
pub mod startup;
/// Millisecond tick source
pub mod tick;

pub use binding::{BoundPanel, PanelDescriptor, PanelSet, PowerPolicy, bind_panel, pulse_reset_line};
pub use bus::{BusClaim, BusIoError, BusPanelIo, SharedBus, SharedPin};
pub use color::{ColorSpace, PixelFormat};
pub use config::{
    Builder, BusConfig, Config, Dimensions, MAX_COLUMNS, MAX_PANELS, MAX_ROWS, PanelDevConfig,
    PanelIoConfig, TaskConfig, WordWidth,
};
pub use display::{DisplayConfig, DisplayHandle, FlushMode};
pub use error::{
    BindError, BindStage, BuilderError, BusInitError, FlushError, PanelError, RegistrationError,
    RenderError, SceneError, ServiceError, StartupError,
};
pub use flush::{BufferOwner, DrawBuffers, FlushHandle, FlushRegistry, FlushSlot};
pub use graphics::StripTarget;
pub use gui::{DisplayContext, Gui};
pub use interface::{InterfaceError, PanelIo, SpiPanelIo};
pub use panel::{Gc9d01, PanelState};
pub use rotation::{Orientation, Rotation};
pub use startup::startup;
