//! GC9D01 panel driver

use embedded_hal::delay::DelayNs;

use crate::color::{ColorSpace, PixelFormat};
use crate::command::{
    CASET, COLMOD, DISPOFF, DISPON, GC9D01_VENDOR_INIT, INVOFF, INVON, InitCommand, MADCTL, RAMWR,
    RASET, SLPOUT, SWRESET,
};
use crate::config::{Dimensions, PanelDevConfig};
use crate::error::PanelError;
use crate::interface::PanelIo;
use crate::rotation::Orientation;

type PanelResult<E> = core::result::Result<(), PanelError<E>>;

/// Delay after software reset before the next command
const RESET_DELAY_MS: u32 = 5;

/// Delay after sleep-out before display-on
const SLEEP_OUT_DELAY_MS: u32 = 120;

/// Controller state, advanced by reset and init
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelState {
    /// Handle created, nothing sent yet
    Created,
    /// Software reset issued; registers are at defaults
    Reset,
    /// Init sequence sent; orientation and power may be changed
    Initialized,
}

/// Panel handle for one GC9D01 controller
///
/// Owns its transport. Orientation, inversion and power state are tracked
/// here and pushed to the controller as each setter is called.
pub struct Gc9d01<I>
where
    I: PanelIo,
{
    io: I,
    dimensions: Dimensions,
    color_space: ColorSpace,
    pixel_format: PixelFormat,
    init_commands: &'static [InitCommand],
    orientation: Orientation,
    state: PanelState,
    inverted: bool,
    is_display_on: bool,
}

impl<I> Gc9d01<I>
where
    I: PanelIo,
{
    /// Create a panel handle on top of a transport
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::UnsupportedPixelFormat`] unless the device config
    /// asks for 16 or 18 bits per pixel. The transport is dropped in that case.
    pub fn new(
        io: I,
        dimensions: Dimensions,
        config: &PanelDevConfig,
    ) -> Result<Self, PanelError<I::Error>> {
        let pixel_format = PixelFormat::from_bits(config.bits_per_pixel).ok_or(
            PanelError::UnsupportedPixelFormat {
                bits_per_pixel: config.bits_per_pixel,
            },
        )?;
        Ok(Self {
            io,
            dimensions,
            color_space: config.color_space,
            pixel_format,
            init_commands: config.init_commands.unwrap_or(GC9D01_VENDOR_INIT),
            orientation: Orientation::default(),
            state: PanelState::Created,
            inverted: false,
            is_display_on: false,
        })
    }

    /// Software reset
    ///
    /// Discards all controller configuration. Only this panel is affected;
    /// the shared hardware reset line is pulsed separately.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> PanelResult<I::Error> {
        self.send(SWRESET, &[])?;
        delay.delay_ms(RESET_DELAY_MS);
        self.state = PanelState::Reset;
        self.is_display_on = false;
        self.inverted = false;
        self.orientation = Orientation::default();
        Ok(())
    }

    /// Send the init sequence and wake the controller
    ///
    /// Runs the vendor table, then pixel format, MADCTL and sleep-out.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> PanelResult<I::Error> {
        for entry in self.init_commands {
            self.send(entry.command, entry.params)?;
            if entry.delay_ms > 0 {
                delay.delay_ms(entry.delay_ms);
            }
        }
        self.send(COLMOD, &[self.pixel_format.colmod()])?;
        self.write_madctl()?;
        self.send(SLPOUT, &[])?;
        delay.delay_ms(SLEEP_OUT_DELAY_MS);
        self.state = PanelState::Initialized;
        Ok(())
    }

    /// Enable or disable color inversion
    pub fn invert_color(&mut self, invert: bool) -> PanelResult<I::Error> {
        self.send(if invert { INVON } else { INVOFF }, &[])?;
        self.inverted = invert;
        Ok(())
    }

    /// Set the mirror flags
    pub fn mirror(&mut self, mirror_x: bool, mirror_y: bool) -> PanelResult<I::Error> {
        self.orientation.mirror_x = mirror_x;
        self.orientation.mirror_y = mirror_y;
        self.write_madctl()
    }

    /// Exchange the X and Y axes
    pub fn swap_xy(&mut self, swap: bool) -> PanelResult<I::Error> {
        self.orientation.swap_xy = swap;
        self.write_madctl()
    }

    /// Turn the display output on or off
    ///
    /// # Errors
    ///
    /// Turning on returns [`PanelError::NotInitialized`] before
    /// [`init`](Self::init) has completed.
    pub fn disp_on_off(&mut self, on: bool) -> PanelResult<I::Error> {
        if on && self.state != PanelState::Initialized {
            return Err(PanelError::NotInitialized);
        }
        self.send(if on { DISPON } else { DISPOFF }, &[])?;
        self.is_display_on = on;
        Ok(())
    }

    /// Write pixels into the window `[x_start, x_end) x [y_start, y_end)`
    ///
    /// End coordinates are exclusive. `pixels` must hold exactly one pixel
    /// per position in the window, in the panel's pixel format.
    pub fn draw_bitmap(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
        pixels: &[u8],
    ) -> PanelResult<I::Error> {
        if self.state != PanelState::Initialized {
            return Err(PanelError::NotInitialized);
        }
        let (width, height) = self
            .orientation
            .logical_size(self.dimensions.cols, self.dimensions.rows);
        if x_start >= x_end || y_start >= y_end || x_end > width || y_end > height {
            return Err(PanelError::InvalidArea {
                x_start,
                y_start,
                x_end,
                y_end,
            });
        }
        let required = (x_end - x_start) as usize
            * (y_end - y_start) as usize
            * self.pixel_format.bytes_per_pixel();
        if pixels.len() != required {
            return Err(PanelError::PayloadSize {
                required,
                provided: pixels.len(),
            });
        }

        let [xs_hi, xs_lo] = x_start.to_be_bytes();
        let [xe_hi, xe_lo] = (x_end - 1).to_be_bytes();
        self.send(CASET, &[xs_hi, xs_lo, xe_hi, xe_lo])?;
        let [ys_hi, ys_lo] = y_start.to_be_bytes();
        let [ye_hi, ye_lo] = (y_end - 1).to_be_bytes();
        self.send(RASET, &[ys_hi, ys_lo, ye_hi, ye_lo])?;

        self.io.tx_color(RAMWR, pixels).map_err(PanelError::Io)
    }

    /// Panel resolution
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Pixel format on the wire
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Current orientation flags
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Controller state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Whether color inversion is enabled
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Whether the display output is on
    pub fn is_display_on(&self) -> bool {
        self.is_display_on
    }

    /// Access the transport
    pub fn io(&self) -> &I {
        &self.io
    }

    /// Access the transport mutably
    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    /// Delete the panel handle, returning its transport
    pub fn release(self) -> I {
        self.io
    }

    fn write_madctl(&mut self) -> PanelResult<I::Error> {
        let value = self.orientation.madctl(self.color_space);
        self.send(MADCTL, &[value])
    }

    fn send(&mut self, command: u8, params: &[u8]) -> PanelResult<I::Error> {
        self.io.tx_param(command, params).map_err(PanelError::Io)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::flush::FlushSlot;
    use alloc::vec::Vec;

    #[derive(Debug, Default)]
    pub(crate) struct MockInterface {
        pub(crate) commands: Vec<u8>,
        pub(crate) command_data: Vec<(u8, Vec<u8>)>,
        pub(crate) color_bytes: usize,
        pub(crate) slot: Option<&'static FlushSlot>,
    }

    impl PanelIo for MockInterface {
        type Error = core::convert::Infallible;

        fn tx_param(&mut self, command: u8, params: &[u8]) -> Result<(), Self::Error> {
            self.commands.push(command);
            self.command_data.push((command, params.to_vec()));
            Ok(())
        }

        fn tx_color(&mut self, command: u8, pixels: &[u8]) -> Result<(), Self::Error> {
            self.commands.push(command);
            self.color_bytes += pixels.len();
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

    pub(crate) struct MockDelay;
    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn test_panel() -> Gc9d01<MockInterface> {
        let dims = Dimensions::new(160, 160).unwrap();
        Gc9d01::new(MockInterface::default(), dims, &PanelDevConfig::default()).unwrap()
    }

    fn ready_panel() -> Gc9d01<MockInterface> {
        let mut panel = test_panel();
        panel.init(&mut MockDelay).unwrap();
        panel.io_mut().commands.clear();
        panel.io_mut().command_data.clear();
        panel
    }

    #[test]
    fn test_new_rejects_24bpp() {
        let dims = Dimensions::new(160, 160).unwrap();
        let config = PanelDevConfig {
            bits_per_pixel: 24,
            ..PanelDevConfig::default()
        };
        let result = Gc9d01::new(MockInterface::default(), dims, &config);
        assert!(matches!(
            result,
            Err(PanelError::UnsupportedPixelFormat { bits_per_pixel: 24 })
        ));
    }

    #[test]
    fn test_reset_sends_swreset() {
        let mut panel = test_panel();
        panel.reset(&mut MockDelay).unwrap();
        assert_eq!(panel.io().commands, alloc::vec![SWRESET]);
        assert_eq!(panel.state(), PanelState::Reset);
    }

    #[test]
    fn test_init_ends_with_format_orientation_and_sleep_out() {
        let mut panel = test_panel();
        panel.init(&mut MockDelay).unwrap();
        let sent = &panel.io().command_data;
        let tail = &sent[sent.len() - 3..];
        assert_eq!(tail[0], (COLMOD, alloc::vec![0x55]));
        assert_eq!(tail[1], (MADCTL, alloc::vec![0x08]));
        assert_eq!(tail[2], (SLPOUT, alloc::vec![]));
        assert_eq!(sent.len(), GC9D01_VENDOR_INIT.len() + 3);
        assert_eq!(panel.state(), PanelState::Initialized);
    }

    #[test]
    fn test_init_uses_custom_table() {
        static TABLE: [InitCommand; 1] = [InitCommand::new(0xB0, &[0x01], 0)];
        let dims = Dimensions::new(160, 160).unwrap();
        let config = PanelDevConfig {
            init_commands: Some(&TABLE),
            ..PanelDevConfig::default()
        };
        let mut panel = Gc9d01::new(MockInterface::default(), dims, &config).unwrap();
        panel.init(&mut MockDelay).unwrap();
        assert_eq!(panel.io().commands, alloc::vec![0xB0, COLMOD, MADCTL, SLPOUT]);
    }

    #[test]
    fn test_power_on_before_init_is_rejected() {
        let mut panel = test_panel();
        panel.reset(&mut MockDelay).unwrap();
        let result = panel.disp_on_off(true);
        assert!(matches!(result, Err(PanelError::NotInitialized)));
        assert!(!panel.io().commands.contains(&DISPON));
        assert!(!panel.is_display_on());
    }

    #[test]
    fn test_power_off_allowed_any_time() {
        let mut panel = test_panel();
        panel.disp_on_off(false).unwrap();
        assert_eq!(panel.io().commands, alloc::vec![DISPOFF]);
    }

    #[test]
    fn test_mirror_and_swap_update_madctl() {
        let mut panel = ready_panel();
        panel.mirror(true, false).unwrap();
        panel.swap_xy(true).unwrap();
        assert_eq!(
            panel.io().command_data,
            alloc::vec![(MADCTL, alloc::vec![0x48]), (MADCTL, alloc::vec![0x68])]
        );
    }

    #[test]
    fn test_invert_color() {
        let mut panel = ready_panel();
        panel.invert_color(false).unwrap();
        panel.invert_color(true).unwrap();
        assert_eq!(panel.io().commands, alloc::vec![INVOFF, INVON]);
        assert!(panel.is_inverted());
    }

    #[test]
    fn test_draw_bitmap_sets_inclusive_window() {
        let mut panel = ready_panel();
        let pixels = alloc::vec![0u8; 160 * 10 * 2];
        panel.draw_bitmap(0, 150, 160, 160, &pixels).unwrap();
        assert_eq!(
            &panel.io().command_data[..],
            &[
                (CASET, alloc::vec![0x00, 0x00, 0x00, 0x9F]),
                (RASET, alloc::vec![0x00, 0x96, 0x00, 0x9F]),
            ]
        );
        assert_eq!(panel.io().commands.last(), Some(&RAMWR));
        assert_eq!(panel.io().color_bytes, pixels.len());
    }

    #[test]
    fn test_draw_bitmap_validates_area_and_payload() {
        let mut panel = ready_panel();
        assert!(matches!(
            panel.draw_bitmap(10, 0, 10, 1, &[]),
            Err(PanelError::InvalidArea { .. })
        ));
        assert!(matches!(
            panel.draw_bitmap(0, 0, 161, 1, &[]),
            Err(PanelError::InvalidArea { .. })
        ));
        assert!(matches!(
            panel.draw_bitmap(0, 0, 2, 2, &[0u8; 7]),
            Err(PanelError::PayloadSize {
                required: 8,
                provided: 7
            })
        ));
        assert!(panel.io().commands.is_empty());
    }
}
