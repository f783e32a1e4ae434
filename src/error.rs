//! Error types for the driver
//!
//! Every startup-path failure maps to one of three categories:
//!
//! - [`BusInitError`] - the shared SPI bus could not be claimed
//! - [`BindError`] - a panel's transport or panel handle could not be built or configured
//! - [`RegistrationError`] - a panel could not be registered as a display
//!
//! [`StartupError`] wraps all three so a firmware entry point can log one line
//! naming the failing panel and abort. The remaining types cover configuration
//! ([`BuilderError`]), panel operations ([`PanelError`]), the flush handshake
//! ([`FlushError`]), rendering ([`RenderError`]), scene building ([`SceneError`])
//! and the service loop ([`ServiceError`]).
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::{Builder, BuilderError, Dimensions};
//!
//! // Too large for the GC9D01
//! let result = Dimensions::new(240, 240);
//! assert!(matches!(result, Err(BuilderError::InvalidDimensions { .. })));
//!
//! // Command words must be 8 or 16 bits wide
//! let result = Builder::new().cmd_bits(12).build();
//! assert!(matches!(result, Err(BuilderError::InvalidBitWidth { bits: 12 })));
//! ```

use core::fmt::{self, Debug};

/// Maximum rows driven by the GC9D01 controller
pub const MAX_ROWS: u16 = 160;

/// Maximum columns driven by the GC9D01 controller
pub const MAX_COLUMNS: u16 = 160;

/// Errors that can occur when building configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuilderError {
    /// Dimensions outside `1..=MAX_ROWS` x `1..=MAX_COLUMNS`
    InvalidDimensions {
        /// Number of rows (height) requested
        rows: u16,
        /// Number of columns (width) requested
        cols: u16,
    },
    /// The same GPIO is assigned to more than one signal
    PinConflict {
        /// The GPIO number used twice
        pin: u8,
    },
    /// Command or parameter width is neither 8 nor 16 bits
    InvalidBitWidth {
        /// Requested width in bits
        bits: u8,
    },
    /// Transaction queue depth of zero
    InvalidQueueDepth,
    /// Draw buffer height is zero or taller than the panel
    InvalidBufferLines {
        /// Requested buffer height in lines
        lines: u16,
        /// Panel height in rows
        rows: u16,
    },
    /// More panels than the configuration can hold
    TooManyPanels {
        /// Maximum number of panels
        max: usize,
    },
    /// Bits per pixel not supported by the controller
    UnsupportedPixelFormat {
        /// Requested bits per pixel
        bits_per_pixel: u8,
    },
    /// Two panels share a bus ordinal
    DuplicateOrdinal {
        /// The repeated ordinal
        ordinal: u8,
    },
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { rows, cols } => write!(
                f,
                "Invalid dimensions {rows}x{cols} (max {MAX_ROWS}x{MAX_COLUMNS})"
            ),
            Self::PinConflict { pin } => write!(f, "GPIO{pin} assigned more than once"),
            Self::InvalidBitWidth { bits } => {
                write!(f, "Invalid word width {bits} bits (expected 8 or 16)")
            }
            Self::InvalidQueueDepth => write!(f, "Transaction queue depth must be at least 1"),
            Self::InvalidBufferLines { lines, rows } => {
                write!(f, "Invalid draw buffer height {lines} (panel has {rows} rows)")
            }
            Self::TooManyPanels { max } => write!(f, "At most {max} panels are supported"),
            Self::UnsupportedPixelFormat { bits_per_pixel } => {
                write!(f, "Unsupported pixel format: {bits_per_pixel} bits per pixel")
            }
            Self::DuplicateOrdinal { ordinal } => {
                write!(f, "Panel ordinal {ordinal} used more than once")
            }
        }
    }
}

impl core::error::Error for BuilderError {}

/// Errors raised while claiming the shared SPI bus
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BusInitError {
    /// The bus is already owned by a live [`SharedBus`](crate::bus::SharedBus)
    AlreadyClaimed,
    /// A bus pin is reused or collides with another bus signal
    InvalidPins {
        /// The offending GPIO number
        pin: u8,
    },
    /// The maximum transfer size cannot hold one flush
    TransferTooSmall {
        /// Bytes needed by the largest flush
        required: usize,
        /// Bytes configured on the bus
        provided: usize,
    },
}

impl fmt::Display for BusInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyClaimed => write!(f, "SPI bus already claimed"),
            Self::InvalidPins { pin } => write!(f, "Invalid SPI pin assignment (GPIO{pin})"),
            Self::TransferTooSmall { required, provided } => write!(
                f,
                "Max transfer too small: required {required} bytes, provided {provided}"
            ),
        }
    }
}

impl core::error::Error for BusInitError {}

/// Errors that can occur when driving a panel
///
/// Generic over the transport error so callers can match on the underlying
/// SPI or GPIO failure.
#[derive(Debug)]
pub enum PanelError<E> {
    /// Transport error (SPI/GPIO)
    Io(E),
    /// Operation issued before the controller was initialized
    ///
    /// Power-on and pixel writes are only valid after `init`.
    NotInitialized,
    /// Bits per pixel not supported by the controller
    UnsupportedPixelFormat {
        /// Requested bits per pixel
        bits_per_pixel: u8,
    },
    /// Draw area is empty or outside the panel
    InvalidArea {
        /// First column (inclusive)
        x_start: u16,
        /// First row (inclusive)
        y_start: u16,
        /// Last column (exclusive)
        x_end: u16,
        /// Last row (exclusive)
        y_end: u16,
    },
    /// Pixel payload does not match the draw area
    PayloadSize {
        /// Bytes the area needs
        required: usize,
        /// Bytes provided
        provided: usize,
    },
    /// The panel set has no room for another panel
    SetFull {
        /// Capacity of the set
        capacity: usize,
    },
    /// A panel with this ordinal is already bound
    OrdinalInUse {
        /// The repeated ordinal
        ordinal: u8,
    },
}

impl<E: Debug> fmt::Display for PanelError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Transport error: {e:?}"),
            Self::NotInitialized => write!(f, "Panel not initialized"),
            Self::UnsupportedPixelFormat { bits_per_pixel } => {
                write!(f, "Unsupported pixel format: {bits_per_pixel} bits per pixel")
            }
            Self::InvalidArea {
                x_start,
                y_start,
                x_end,
                y_end,
            } => write!(
                f,
                "Invalid draw area: ({x_start},{y_start})..({x_end},{y_end})"
            ),
            Self::PayloadSize { required, provided } => write!(
                f,
                "Pixel payload mismatch: required {required} bytes, provided {provided}"
            ),
            Self::SetFull { capacity } => write!(f, "Panel set full ({capacity} panels)"),
            Self::OrdinalInUse { ordinal } => write!(f, "Panel ordinal {ordinal} already bound"),
        }
    }
}

impl<E: Debug> core::error::Error for PanelError<E> {}

/// Step of the bind sequence at which a panel failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindStage {
    /// Building the command/data transport
    Transport,
    /// Building the panel handle on top of the transport
    PanelConstruction,
    /// Controller reset
    Reset,
    /// Controller init sequence
    Init,
    /// Color inversion
    InvertColor,
    /// Mirror flags
    Mirror,
    /// Axis swap
    SwapXy,
    /// Display power-on
    PowerOn,
}

impl fmt::Display for BindStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::PanelConstruction => "panel construction",
            Self::Reset => "reset",
            Self::Init => "init",
            Self::InvertColor => "invert color",
            Self::Mirror => "mirror",
            Self::SwapXy => "swap xy",
            Self::PowerOn => "power on",
        };
        f.write_str(name)
    }
}

/// A panel failed to bind
///
/// Any handles acquired for the failing panel have already been released when
/// this error is returned.
#[derive(Debug)]
pub struct BindError<E> {
    /// Label of the failing panel
    pub panel: &'static str,
    /// Position of the panel on the bus
    pub ordinal: u8,
    /// Step that failed
    pub stage: BindStage,
    /// Underlying failure
    pub source: PanelError<E>,
}

impl<E: Debug> fmt::Display for BindError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (panel {}): {} failed: {}",
            self.panel, self.ordinal, self.stage, self.source
        )
    }
}

impl<E: Debug> core::error::Error for BindError<E> {}

/// Errors raised while registering a display
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegistrationError {
    /// No free display or flush slot
    RegistryFull {
        /// Number of displays the registry can hold
        capacity: usize,
    },
    /// No bound panel with this ordinal
    UnknownPanel {
        /// Requested panel ordinal
        ordinal: u8,
    },
    /// No registered display with this handle
    UnknownDisplay {
        /// Requested display index
        index: u8,
    },
    /// Draw buffer is too small for the configured strip
    InvalidBuffer {
        /// Bytes one strip needs
        required: usize,
        /// Bytes provided
        provided: usize,
    },
    /// One strip is larger than the bus can transfer at once
    ExceedsMaxTransfer {
        /// Bytes one strip needs
        required: usize,
        /// Bus maximum transfer in bytes
        max: usize,
    },
    /// The renderer only produces RGB565
    UnsupportedPixelFormat {
        /// Requested bits per pixel
        bits_per_pixel: u8,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistryFull { capacity } => {
                write!(f, "Display registry full ({capacity} displays)")
            }
            Self::UnknownPanel { ordinal } => write!(f, "No panel bound at ordinal {ordinal}"),
            Self::UnknownDisplay { index } => write!(f, "No display registered at {index}"),
            Self::InvalidBuffer { required, provided } => write!(
                f,
                "Draw buffer too small: required {required} bytes, provided {provided}"
            ),
            Self::ExceedsMaxTransfer { required, max } => write!(
                f,
                "Strip of {required} bytes exceeds bus max transfer of {max}"
            ),
            Self::UnsupportedPixelFormat { bits_per_pixel } => {
                write!(f, "Renderer does not support {bits_per_pixel} bits per pixel")
            }
        }
    }
}

impl core::error::Error for RegistrationError {}

/// Errors in the renderer/transport buffer handshake
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlushError {
    /// A transfer is still in flight on this slot
    Busy,
    /// The panel transport has no completion slot attached
    Unwired,
    /// No flush slot with this index
    UnknownSlot {
        /// Requested slot index
        index: u8,
    },
}

impl fmt::Display for FlushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "Draw buffer still owned by the transport"),
            Self::Unwired => write!(f, "Flush completion not wired to the transport"),
            Self::UnknownSlot { index } => write!(f, "No flush slot at {index}"),
        }
    }
}

impl core::error::Error for FlushError {}

/// Errors raised by a render pass
#[derive(Debug)]
pub enum RenderError<E> {
    /// Writing pixels to a panel failed
    Panel {
        /// Index of the display being rendered
        display: u8,
        /// Underlying failure
        source: PanelError<E>,
    },
    /// The buffer handshake failed
    Flush(FlushError),
    /// Display state is inconsistent with the panel set
    Registration(RegistrationError),
}

impl<E: Debug> fmt::Display for RenderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Panel { display, source } => write!(f, "Display {display}: {source}"),
            Self::Flush(e) => write!(f, "Flush: {e}"),
            Self::Registration(e) => write!(f, "Registration: {e}"),
        }
    }
}

impl<E: Debug> core::error::Error for RenderError<E> {}

/// Errors raised while building a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneError {
    /// The screen has no room for another widget
    TooManyWidgets {
        /// Widget capacity of a screen
        capacity: usize,
    },
    /// Label text does not fit the label buffer
    TextTooLong {
        /// Maximum label length in bytes
        capacity: usize,
    },
    /// No widget with this id on the screen
    UnknownWidget {
        /// Requested widget index
        index: u8,
    },
    /// No screen loaded on the display
    NoScreen,
    /// The display handle is not registered
    Registration(RegistrationError),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyWidgets { capacity } => {
                write!(f, "Screen full ({capacity} widgets)")
            }
            Self::TextTooLong { capacity } => {
                write!(f, "Label text longer than {capacity} bytes")
            }
            Self::UnknownWidget { index } => write!(f, "No widget at {index}"),
            Self::NoScreen => write!(f, "No screen loaded"),
            Self::Registration(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for SceneError {}

impl From<RegistrationError> for SceneError {
    fn from(e: RegistrationError) -> Self {
        Self::Registration(e)
    }
}

/// Errors raised by the GUI service loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceError {
    /// Servicing requested before the tick timer runs
    TickNotRunning,
    /// The tick timer was already started
    AlreadyStarted,
    /// The tick timer refused to start
    TimerStart,
    /// GUI state is already borrowed by the calling context
    LockBusy,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TickNotRunning => write!(f, "Tick timer not running"),
            Self::AlreadyStarted => write!(f, "Tick timer already started"),
            Self::TimerStart => write!(f, "Tick timer failed to start"),
            Self::LockBusy => write!(f, "GUI state already locked"),
        }
    }
}

impl core::error::Error for ServiceError {}

/// Fatal startup failure
///
/// Startup has no degraded mode: the caller logs [`StartupError::panel`] and
/// aborts.
#[derive(Debug)]
pub enum StartupError<E> {
    /// The shared bus could not be claimed
    Bus(BusInitError),
    /// The shared reset line could not be driven
    ResetLine,
    /// A panel failed to bind
    Bind(BindError<E>),
    /// A bound panel could not be registered as a display
    Registration {
        /// Label of the affected panel
        panel: &'static str,
        /// Underlying failure
        source: RegistrationError,
    },
}

impl<E> StartupError<E> {
    /// Label of the panel that failed, if the failure is panel-specific
    pub fn panel(&self) -> Option<&'static str> {
        match self {
            Self::Bind(e) => Some(e.panel),
            Self::Registration { panel, .. } => Some(panel),
            Self::Bus(_) | Self::ResetLine => None,
        }
    }
}

impl<E: Debug> fmt::Display for StartupError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "Bus init failed: {e}"),
            Self::ResetLine => write!(f, "Reset line could not be driven"),
            Self::Bind(e) => write!(f, "Bind failed: {e}"),
            Self::Registration { panel, source } => {
                write!(f, "{panel}: registration failed: {source}")
            }
        }
    }
}

impl<E: Debug> core::error::Error for StartupError<E> {}

impl<E> From<BusInitError> for StartupError<E> {
    fn from(e: BusInitError) -> Self {
        Self::Bus(e)
    }
}

impl<E> From<BindError<E>> for StartupError<E> {
    fn from(e: BindError<E>) -> Self {
        Self::Bind(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_bind_error_names_panel_and_stage() {
        let err: BindError<()> = BindError {
            panel: "RIGHT EYE",
            ordinal: 1,
            stage: BindStage::PanelConstruction,
            source: PanelError::UnsupportedPixelFormat { bits_per_pixel: 24 },
        };
        let text = err.to_string();
        assert!(text.starts_with("RIGHT EYE (panel 1): panel construction failed"));
    }

    #[test]
    fn test_startup_error_panel_label() {
        let err: StartupError<()> = StartupError::Registration {
            panel: "LEFT EYE",
            source: RegistrationError::RegistryFull { capacity: 2 },
        };
        assert_eq!(err.panel(), Some("LEFT EYE"));

        let err: StartupError<()> = BusInitError::AlreadyClaimed.into();
        assert_eq!(err.panel(), None);
    }
}
