//! Configuration types and builder
//!
//! [`Builder`] collects every board-level constant of the two-eye module
//! (resolution, pin map, SPI timing, draw buffer geometry, tick and service
//! periods, GUI task parameters) and validates them in [`Builder::build`].
//! The defaults describe the ESP32-S3 board with two 160x160 GC9D01 panels on
//! one SPI bus.
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::{Builder, Dimensions};
//!
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! assert_eq!(config.dimensions, Dimensions { rows: 160, cols: 160 });
//! assert_eq!(config.panels.len(), 2);
//! assert_eq!(config.bus.max_transfer_bytes, 160 * 160 * 2);
//! ```

use embedded_hal::spi::{MODE_0, Mode};
use heapless::Vec;

use crate::binding::PanelDescriptor;
use crate::color::{ColorSpace, PixelFormat};
use crate::command::InitCommand;
use crate::display::{DisplayConfig, FlushMode};
pub use crate::error::{BuilderError, BusInitError, MAX_COLUMNS, MAX_ROWS};
use crate::rotation::Orientation;

/// Maximum number of panels sharing the bus
pub const MAX_PANELS: usize = 2;

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Number of rows (vertical resolution)
    pub rows: u16,
    /// Number of columns (horizontal resolution)
    pub cols: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero or
    /// larger than the controller's 160 lines.
    pub fn new(rows: u16, cols: u16) -> Result<Self, BuilderError> {
        if rows == 0 || rows > MAX_ROWS || cols == 0 || cols > MAX_COLUMNS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Number of pixels in one frame
    pub fn pixel_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Bytes in a full-width strip of `lines` rows
    pub fn strip_bytes(&self, lines: u16, format: PixelFormat) -> usize {
        self.cols as usize * lines as usize * format.bytes_per_pixel()
    }
}

/// Width of command and parameter words on the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WordWidth {
    /// 8-bit words
    #[default]
    Bits8,
    /// 16-bit words, most significant byte first
    Bits16,
}

impl WordWidth {
    /// Look up a width from a bit count
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(Self::Bits8),
            16 => Some(Self::Bits16),
            _ => None,
        }
    }

    /// Width in bits
    pub fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
        }
    }
}

/// Shared SPI bus parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusConfig {
    /// Clock GPIO
    pub sclk: u8,
    /// Data-out GPIO
    pub mosi: u8,
    /// Data-in GPIO, `None` when not connected
    pub miso: Option<u8>,
    /// Quad-SPI WP GPIO, `None` when not connected
    pub quad_wp: Option<u8>,
    /// Quad-SPI HD GPIO, `None` when not connected
    pub quad_hd: Option<u8>,
    /// Largest single transfer in bytes
    pub max_transfer_bytes: usize,
}

impl BusConfig {
    /// Check the pin map and that one flush of `flush_bytes` fits a transfer
    pub fn validate(&self, flush_bytes: usize) -> Result<(), BusInitError> {
        let pins = [
            Some(self.sclk),
            Some(self.mosi),
            self.miso,
            self.quad_wp,
            self.quad_hd,
        ];
        for (i, pin) in pins.iter().enumerate() {
            let Some(pin) = pin else { continue };
            if pins[i + 1..].contains(&Some(*pin)) {
                return Err(BusInitError::InvalidPins { pin: *pin });
            }
        }
        if self.max_transfer_bytes < flush_bytes {
            return Err(BusInitError::TransferTooSmall {
                required: flush_bytes,
                provided: self.max_transfer_bytes,
            });
        }
        Ok(())
    }
}

/// Per-panel transport parameters
///
/// Every panel on the bus uses the same values; only the chip-select differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelIoConfig {
    /// Data/command GPIO, shared by all panels
    pub dc_gpio: u8,
    /// Pixel clock in Hz
    pub pixel_clock_hz: u32,
    /// SPI clock polarity and phase
    pub spi_mode: Mode,
    /// Command word width
    pub cmd_bits: WordWidth,
    /// Parameter word width
    pub param_bits: WordWidth,
    /// Transactions the HAL may queue
    pub queue_depth: u8,
}

/// Panel controller parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelDevConfig {
    /// Hardware reset GPIO, shared by all panels
    pub reset_gpio: Option<u8>,
    /// Color order in panel RAM
    pub color_space: ColorSpace,
    /// Bits per pixel on the wire (16 or 18)
    pub bits_per_pixel: u8,
    /// Replacement for the built-in vendor init table
    pub init_commands: Option<&'static [InitCommand]>,
}

impl Default for PanelDevConfig {
    fn default() -> Self {
        Self {
            reset_gpio: Some(45),
            color_space: ColorSpace::Bgr,
            bits_per_pixel: 16,
            init_commands: None,
        }
    }
}

/// GUI task parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskConfig {
    /// Task name
    pub name: &'static str,
    /// Stack size in bytes
    pub stack_size: usize,
    /// Scheduler priority
    pub priority: u8,
    /// Core the task is pinned to, `None` for no affinity
    pub core: Option<u8>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            name: "lv_ui_task",
            stack_size: 8 * 1024,
            priority: 5,
            core: Some(1),
        }
    }
}

/// Complete board configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Panel resolution
    pub dimensions: Dimensions,
    /// Pixel format shared by panels and renderer
    pub pixel_format: PixelFormat,
    /// Shared bus parameters
    pub bus: BusConfig,
    /// Per-panel transport parameters
    pub io: PanelIoConfig,
    /// Panel controller parameters
    pub panel: PanelDevConfig,
    /// Draw buffer height in lines
    pub buffer_lines: u16,
    /// Allocate a second draw buffer per display
    pub double_buffer: bool,
    /// Tick timer period in milliseconds
    pub tick_period_ms: u32,
    /// Service loop period in milliseconds
    pub service_period_ms: u32,
    /// GUI task parameters
    pub task: TaskConfig,
    /// Panels on the bus, in bind order
    pub panels: Vec<PanelDescriptor, MAX_PANELS>,
}

impl Config {
    /// Bytes in one flush strip
    pub fn strip_bytes(&self) -> usize {
        self.dimensions
            .strip_bytes(self.buffer_lines, self.pixel_format)
    }

    /// Display registration parameters for a panel with `orientation`
    pub fn display_config(&self, orientation: Orientation) -> DisplayConfig {
        DisplayConfig {
            hor_res: self.dimensions.cols,
            ver_res: self.dimensions.rows,
            buffer_lines: self.buffer_lines,
            double_buffer: self.double_buffer,
            dma_capable: true,
            external_memory: false,
            swap_bytes: true,
            full_refresh: false,
            orientation,
            pixel_format: self.pixel_format,
            flush_mode: FlushMode::Manual,
        }
    }
}

/// Builder for constructing the board configuration
///
/// # Example
///
/// ```rust,no_run
/// use dual_eye_display::{Builder, Orientation, PanelDescriptor};
///
/// let config = match Builder::new()
///     .buffer_lines(40)
///     .clear_panels()
///     .panel(PanelDescriptor::new(10, "ONLY EYE", Orientation::default(), 0))
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    dimensions: Dimensions,
    bits_per_pixel: u8,
    color_space: ColorSpace,
    sclk: u8,
    mosi: u8,
    dc: u8,
    reset: Option<u8>,
    max_transfer_bytes: Option<usize>,
    pixel_clock_hz: u32,
    spi_mode: Mode,
    cmd_bits: u8,
    param_bits: u8,
    queue_depth: u8,
    buffer_lines: u16,
    double_buffer: bool,
    tick_period_ms: u32,
    service_period_ms: u32,
    task: TaskConfig,
    init_commands: Option<&'static [InitCommand]>,
    panels: Vec<PanelDescriptor, MAX_PANELS>,
    overflow: bool,
}

impl Default for Builder {
    fn default() -> Self {
        let mut panels = Vec::new();
        let _ = panels.push(PanelDescriptor::new(
            47,
            "LEFT EYE",
            Orientation::default(),
            0,
        ));
        let _ = panels.push(PanelDescriptor::new(
            48,
            "RIGHT EYE",
            Orientation::default(),
            1,
        ));
        Self {
            dimensions: Dimensions {
                rows: 160,
                cols: 160,
            },
            bits_per_pixel: 16,
            color_space: ColorSpace::Bgr,
            sclk: 39,
            mosi: 38,
            dc: 40,
            reset: Some(45),
            max_transfer_bytes: None,
            pixel_clock_hz: 80_000_000,
            spi_mode: MODE_0,
            cmd_bits: 8,
            param_bits: 8,
            queue_depth: 10,
            buffer_lines: 160,
            double_buffer: true,
            tick_period_ms: 1,
            service_period_ms: 10,
            task: TaskConfig::default(),
            init_commands: None,
            panels,
            overflow: false,
        }
    }
}

impl Builder {
    /// Create a new Builder with the two-eye board defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel dimensions
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = dims;
        self
    }

    /// Set bits per pixel (16 or 18)
    pub fn bits_per_pixel(mut self, bits: u8) -> Self {
        self.bits_per_pixel = bits;
        self
    }

    /// Set panel color order
    pub fn color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    /// Set the SPI clock GPIO
    pub fn sclk(mut self, pin: u8) -> Self {
        self.sclk = pin;
        self
    }

    /// Set the SPI data-out GPIO
    pub fn mosi(mut self, pin: u8) -> Self {
        self.mosi = pin;
        self
    }

    /// Set the shared data/command GPIO
    pub fn dc(mut self, pin: u8) -> Self {
        self.dc = pin;
        self
    }

    /// Set the shared reset GPIO, `None` if reset is not wired
    pub fn reset(mut self, pin: Option<u8>) -> Self {
        self.reset = pin;
        self
    }

    /// Override the bus max transfer size
    ///
    /// Defaults to one full strip. A smaller value is rejected when the bus
    /// is initialized.
    pub fn max_transfer_bytes(mut self, bytes: usize) -> Self {
        self.max_transfer_bytes = Some(bytes);
        self
    }

    /// Set the pixel clock in Hz
    pub fn pixel_clock_hz(mut self, hz: u32) -> Self {
        self.pixel_clock_hz = hz;
        self
    }

    /// Set the SPI mode
    pub fn spi_mode(mut self, mode: Mode) -> Self {
        self.spi_mode = mode;
        self
    }

    /// Set the command word width in bits
    pub fn cmd_bits(mut self, bits: u8) -> Self {
        self.cmd_bits = bits;
        self
    }

    /// Set the parameter word width in bits
    pub fn param_bits(mut self, bits: u8) -> Self {
        self.param_bits = bits;
        self
    }

    /// Set the transaction queue depth
    pub fn queue_depth(mut self, depth: u8) -> Self {
        self.queue_depth = depth;
        self
    }

    /// Set the draw buffer height in lines
    pub fn buffer_lines(mut self, lines: u16) -> Self {
        self.buffer_lines = lines;
        self
    }

    /// Enable or disable the second draw buffer
    pub fn double_buffer(mut self, enabled: bool) -> Self {
        self.double_buffer = enabled;
        self
    }

    /// Set the tick period in milliseconds
    pub fn tick_period_ms(mut self, ms: u32) -> Self {
        self.tick_period_ms = ms;
        self
    }

    /// Set the service loop period in milliseconds
    pub fn service_period_ms(mut self, ms: u32) -> Self {
        self.service_period_ms = ms;
        self
    }

    /// Set GUI task parameters
    pub fn task(mut self, task: TaskConfig) -> Self {
        self.task = task;
        self
    }

    /// Replace the vendor init table
    pub fn init_commands(mut self, commands: &'static [InitCommand]) -> Self {
        self.init_commands = Some(commands);
        self
    }

    /// Remove the default panels
    pub fn clear_panels(mut self) -> Self {
        self.panels.clear();
        self.overflow = false;
        self
    }

    /// Append a panel
    pub fn panel(mut self, descriptor: PanelDescriptor) -> Self {
        if self.panels.push(descriptor).is_err() {
            self.overflow = true;
        }
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns a [`BuilderError`] naming the first invalid setting.
    pub fn build(self) -> Result<Config, BuilderError> {
        let pixel_format = PixelFormat::from_bits(self.bits_per_pixel).ok_or(
            BuilderError::UnsupportedPixelFormat {
                bits_per_pixel: self.bits_per_pixel,
            },
        )?;
        let cmd_bits = WordWidth::from_bits(self.cmd_bits).ok_or(BuilderError::InvalidBitWidth {
            bits: self.cmd_bits,
        })?;
        let param_bits =
            WordWidth::from_bits(self.param_bits).ok_or(BuilderError::InvalidBitWidth {
                bits: self.param_bits,
            })?;
        if self.queue_depth == 0 {
            return Err(BuilderError::InvalidQueueDepth);
        }
        if self.buffer_lines == 0 || self.buffer_lines > self.dimensions.rows {
            return Err(BuilderError::InvalidBufferLines {
                lines: self.buffer_lines,
                rows: self.dimensions.rows,
            });
        }
        if self.overflow {
            return Err(BuilderError::TooManyPanels { max: MAX_PANELS });
        }
        for (i, panel) in self.panels.iter().enumerate() {
            if self.panels[..i].iter().any(|p| p.ordinal == panel.ordinal) {
                return Err(BuilderError::DuplicateOrdinal {
                    ordinal: panel.ordinal,
                });
            }
        }

        let mut pins: Vec<u8, { 4 + MAX_PANELS }> = Vec::new();
        let fixed = [Some(self.sclk), Some(self.mosi), Some(self.dc), self.reset];
        let chip_selects = self.panels.iter().map(|p| Some(p.cs_gpio));
        for pin in fixed.into_iter().chain(chip_selects).flatten() {
            if pins.contains(&pin) {
                return Err(BuilderError::PinConflict { pin });
            }
            let _ = pins.push(pin);
        }

        let strip_bytes = self.dimensions.strip_bytes(self.buffer_lines, pixel_format);

        Ok(Config {
            dimensions: self.dimensions,
            pixel_format,
            bus: BusConfig {
                sclk: self.sclk,
                mosi: self.mosi,
                miso: None,
                quad_wp: None,
                quad_hd: None,
                max_transfer_bytes: self.max_transfer_bytes.unwrap_or(strip_bytes),
            },
            io: PanelIoConfig {
                dc_gpio: self.dc,
                pixel_clock_hz: self.pixel_clock_hz,
                spi_mode: self.spi_mode,
                cmd_bits,
                param_bits,
                queue_depth: self.queue_depth,
            },
            panel: PanelDevConfig {
                reset_gpio: self.reset,
                color_space: self.color_space,
                bits_per_pixel: self.bits_per_pixel,
                init_commands: self.init_commands,
            },
            buffer_lines: self.buffer_lines,
            double_buffer: self.double_buffer,
            tick_period_ms: self.tick_period_ms,
            service_period_ms: self.service_period_ms,
            task: self.task,
            panels: self.panels,
        })
    }
}
