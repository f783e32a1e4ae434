//! Panel bring-up
//!
//! Binding turns a [`PanelDescriptor`] and a transport into a ready
//! [`BoundPanel`]. The sequence is fixed:
//!
//! 1. build the [`Gc9d01`] handle on the transport
//! 2. software reset
//! 3. init
//! 4. color inversion off
//! 5. mirror flags from the descriptor
//! 6. axis swap from the descriptor
//! 7. display on, unless deferred by [`PowerPolicy::DeferUntilAllBound`]
//!
//! When a step fails, the panel handle is released, then the transport, and
//! the error carries the panel label and the failing [`BindStage`]. Panels
//! already held in a [`PanelSet`] are never touched by a later failure.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dual_eye_display::{Builder, PanelSet, PowerPolicy};
//! # use core::convert::Infallible;
//! # use dual_eye_display::{FlushSlot, PanelIo};
//! # use embedded_hal::delay::DelayNs;
//! # struct MockIo;
//! # impl PanelIo for MockIo {
//! #     type Error = Infallible;
//! #     fn tx_param(&mut self, _command: u8, _params: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn tx_color(&mut self, _command: u8, _pixels: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn attach_flush_slot(&mut self, _slot: &'static FlushSlot) {}
//! #     fn flush_slot(&self) -> Option<&'static FlushSlot> { None }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut panels: PanelSet<MockIo, 2> = PanelSet::new();
//! for descriptor in &config.panels {
//!     let bound = panels.bind(
//!         descriptor,
//!         config.dimensions,
//!         &config.panel,
//!         PowerPolicy::DeferUntilAllBound,
//!         || Ok(MockIo),
//!         &mut delay,
//!     );
//!     if bound.is_err() {
//!         return;
//!     }
//! }
//! let _ = panels.power_on_all();
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::{Dimensions, PanelDevConfig};
use crate::error::{BindError, BindStage, PanelError};
use crate::interface::PanelIo;
use crate::panel::Gc9d01;
use crate::rotation::Orientation;

/// Low time of the shared hardware reset pulse
const RESET_PULSE_MS: u32 = 10;

/// Settle time after releasing hardware reset
const RESET_SETTLE_MS: u32 = 120;

/// Static description of one panel on the bus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelDescriptor {
    /// Chip-select GPIO
    pub cs_gpio: u8,
    /// Human-readable name used in diagnostics
    pub label: &'static str,
    /// Mirror and swap flags applied at bind time
    pub orientation: Orientation,
    /// Position on the bus, starting at 0
    pub ordinal: u8,
}

impl PanelDescriptor {
    /// Describe a panel
    pub const fn new(
        cs_gpio: u8,
        label: &'static str,
        orientation: Orientation,
        ordinal: u8,
    ) -> Self {
        Self {
            cs_gpio,
            label,
            orientation,
            ordinal,
        }
    }
}

/// When a bound panel is switched on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PowerPolicy {
    /// Display on as the last bind step
    #[default]
    Immediate,
    /// Leave the display off; [`PanelSet::power_on_all`] switches all panels together
    DeferUntilAllBound,
}

/// A configured panel and the descriptor it was bound from
pub struct BoundPanel<I>
where
    I: PanelIo,
{
    descriptor: PanelDescriptor,
    panel: Gc9d01<I>,
}

impl<I> BoundPanel<I>
where
    I: PanelIo,
{
    /// Descriptor the panel was bound from
    pub fn descriptor(&self) -> &PanelDescriptor {
        &self.descriptor
    }

    /// Panel label
    pub fn label(&self) -> &'static str {
        self.descriptor.label
    }

    /// Panel ordinal
    pub fn ordinal(&self) -> u8 {
        self.descriptor.ordinal
    }

    /// Panel handle
    pub fn panel(&self) -> &Gc9d01<I> {
        &self.panel
    }

    /// Panel handle, mutably
    pub fn panel_mut(&mut self) -> &mut Gc9d01<I> {
        &mut self.panel
    }

    /// Tear down in order: panel handle first, then its transport
    pub fn release(self) -> I {
        self.panel.release()
    }
}

/// Drive the shared hardware reset line through one reset pulse
///
/// Issued once for all panels, before any of them is bound.
pub fn pulse_reset_line<P, D>(reset: &mut P, delay: &mut D) -> Result<(), P::Error>
where
    P: OutputPin,
    D: DelayNs,
{
    reset.set_low()?;
    delay.delay_ms(RESET_PULSE_MS);
    reset.set_high()?;
    delay.delay_ms(RESET_SETTLE_MS);
    Ok(())
}

/// Bind one panel on an already-built transport
///
/// # Errors
///
/// Returns a [`BindError`] naming the failing stage. The panel handle and
/// transport have both been dropped by then.
pub fn bind_panel<I, D>(
    io: I,
    descriptor: &PanelDescriptor,
    dimensions: Dimensions,
    dev: &PanelDevConfig,
    policy: PowerPolicy,
    delay: &mut D,
) -> Result<BoundPanel<I>, BindError<I::Error>>
where
    I: PanelIo,
    D: DelayNs,
{
    log::info!("{}: install LCD driver", descriptor.label);
    let mut panel = Gc9d01::new(io, dimensions, dev)
        .map_err(|source| failed(descriptor, BindStage::PanelConstruction, source))?;

    match configure(&mut panel, descriptor, policy, delay) {
        Ok(()) => Ok(BoundPanel {
            descriptor: *descriptor,
            panel,
        }),
        Err((stage, source)) => {
            let io = panel.release();
            drop(io);
            Err(failed(descriptor, stage, source))
        }
    }
}

fn configure<I, D>(
    panel: &mut Gc9d01<I>,
    descriptor: &PanelDescriptor,
    policy: PowerPolicy,
    delay: &mut D,
) -> Result<(), (BindStage, PanelError<I::Error>)>
where
    I: PanelIo,
    D: DelayNs,
{
    let orientation = descriptor.orientation;
    panel.reset(delay).map_err(|e| (BindStage::Reset, e))?;
    panel.init(delay).map_err(|e| (BindStage::Init, e))?;
    panel
        .invert_color(false)
        .map_err(|e| (BindStage::InvertColor, e))?;
    panel
        .mirror(orientation.mirror_x, orientation.mirror_y)
        .map_err(|e| (BindStage::Mirror, e))?;
    panel
        .swap_xy(orientation.swap_xy)
        .map_err(|e| (BindStage::SwapXy, e))?;
    if policy == PowerPolicy::Immediate {
        panel
            .disp_on_off(true)
            .map_err(|e| (BindStage::PowerOn, e))?;
    }
    Ok(())
}

fn failed<E: core::fmt::Debug>(
    descriptor: &PanelDescriptor,
    stage: BindStage,
    source: PanelError<E>,
) -> BindError<E> {
    log::error!("{}: {} failed: {}", descriptor.label, stage, source);
    BindError {
        panel: descriptor.label,
        ordinal: descriptor.ordinal,
        stage,
        source,
    }
}

/// Panels bound so far, at most `N`
pub struct PanelSet<I, const N: usize>
where
    I: PanelIo,
{
    panels: Vec<BoundPanel<I>, N>,
}

impl<I, const N: usize> PanelSet<I, N>
where
    I: PanelIo,
{
    /// Create an empty set
    pub fn new() -> Self {
        Self { panels: Vec::new() }
    }

    /// Acquire a transport for `descriptor` and bind it
    ///
    /// `acquire` builds the transport. On any failure only this panel's
    /// handles are released; panels already in the set stay bound.
    ///
    /// Returns the number of bound panels.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`]. A full set, or an ordinal that is already
    /// bound, fails at [`BindStage::Transport`] before `acquire` is called.
    pub fn bind<F, D>(
        &mut self,
        descriptor: &PanelDescriptor,
        dimensions: Dimensions,
        dev: &PanelDevConfig,
        policy: PowerPolicy,
        acquire: F,
        delay: &mut D,
    ) -> Result<usize, BindError<I::Error>>
    where
        F: FnOnce() -> Result<I, I::Error>,
        D: DelayNs,
    {
        if self.panels.is_full() {
            return Err(failed(
                descriptor,
                BindStage::Transport,
                PanelError::SetFull { capacity: N },
            ));
        }
        if self.get(descriptor.ordinal).is_some() {
            return Err(failed(
                descriptor,
                BindStage::Transport,
                PanelError::OrdinalInUse {
                    ordinal: descriptor.ordinal,
                },
            ));
        }

        log::info!("{}: install panel IO", descriptor.label);
        let io = acquire()
            .map_err(|e| failed(descriptor, BindStage::Transport, PanelError::Io(e)))?;
        let bound = bind_panel(io, descriptor, dimensions, dev, policy, delay)?;

        if let Err(bound) = self.panels.push(bound) {
            drop(bound.release());
            return Err(failed(
                descriptor,
                BindStage::Transport,
                PanelError::SetFull { capacity: N },
            ));
        }
        Ok(self.panels.len())
    }

    /// Switch every bound panel on
    ///
    /// # Errors
    ///
    /// Stops at the first panel that fails, with [`BindStage::PowerOn`].
    pub fn power_on_all(&mut self) -> Result<(), BindError<I::Error>> {
        for bound in &mut self.panels {
            if let Err(source) = bound.panel.disp_on_off(true) {
                return Err(failed(&bound.descriptor, BindStage::PowerOn, source));
            }
        }
        log::info!("{} panels on", self.panels.len());
        Ok(())
    }

    /// Panel with the given ordinal
    pub fn get(&self, ordinal: u8) -> Option<&BoundPanel<I>> {
        self.panels.iter().find(|p| p.ordinal() == ordinal)
    }

    /// Panel with the given ordinal, mutably
    pub fn get_mut(&mut self, ordinal: u8) -> Option<&mut BoundPanel<I>> {
        self.panels.iter_mut().find(|p| p.ordinal() == ordinal)
    }

    /// Bound panels in bind order
    pub fn iter(&self) -> impl Iterator<Item = &BoundPanel<I>> {
        self.panels.iter()
    }

    /// Number of bound panels
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether no panel is bound
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

impl<I, const N: usize> Default for PanelSet<I, N>
where
    I: PanelIo,
{
    fn default() -> Self {
        Self::new()
    }
}
