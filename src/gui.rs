//! Display registry and render pass
//!
//! [`Gui`] owns one entry per registered display: its [`DisplayConfig`],
//! its draw buffers, its flush slot and the [`Screen`] loaded on it. Panels
//! themselves stay in the caller's [`PanelSet`]; a display refers to its
//! panel by ordinal.
//!
//! A render pass walks every display with a loaded screen, advances its
//! animations and redraws the dirty area strip by strip. Each strip is
//! rendered into the current draw buffer, handed to the transport through
//! the display's [`FlushSlot`](crate::flush::FlushSlot), and the renderer
//! only touches that buffer again once the transport reported completion.
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::{Builder, DrawBuffers, FlushRegistry, Gui, Orientation};
//!
//! static FLUSH: FlushRegistry<2> = FlushRegistry::new();
//!
//! let config = match Builder::new().buffer_lines(40).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut gui: Gui<[u8; 12_800], 2> = Gui::new(&FLUSH, config.bus.max_transfer_bytes);
//! let display = gui.register(
//!     0,
//!     config.display_config(Orientation::default()),
//!     DrawBuffers::single([0u8; 12_800]),
//! );
//! assert!(display.is_ok());
//! assert_eq!(gui.active_display(), display.ok());
//! ```

use embedded_graphics_core::{
    geometry::{Point, Size},
    primitives::Rectangle,
};
use heapless::Vec;

use crate::binding::PanelSet;
use crate::display::{DisplayConfig, DisplayHandle, FlushMode};
use crate::error::{FlushError, RegistrationError, RenderError};
use crate::flush::{DrawBuffers, FlushHandle, FlushRegistry};
use crate::graphics::StripTarget;
use crate::interface::PanelIo;
use crate::scene::Screen;

struct DisplayEntry<B> {
    panel_ordinal: u8,
    config: DisplayConfig,
    buffers: DrawBuffers<B>,
    flush: FlushHandle,
    screen: Option<Screen>,
    wired: bool,
}

/// Registered displays, at most `N`
pub struct Gui<B, const N: usize> {
    registry: &'static FlushRegistry<N>,
    displays: Vec<DisplayEntry<B>, N>,
    active: Option<DisplayHandle>,
    max_transfer: usize,
}

impl<B, const N: usize> Gui<B, N>
where
    B: AsMut<[u8]> + AsRef<[u8]>,
{
    /// Create an empty GUI whose flush slots come from `registry`
    ///
    /// `max_transfer` is the bus limit every strip must fit.
    pub fn new(registry: &'static FlushRegistry<N>, max_transfer: usize) -> Self {
        Self {
            registry,
            displays: Vec::new(),
            active: None,
            max_transfer,
        }
    }

    /// Register the display of panel `panel_ordinal` in manual flush mode
    ///
    /// The first registered display becomes active. Its flush completion is
    /// not wired yet; call [`attach_flush`](Self::attach_flush) before the
    /// first render pass.
    ///
    /// # Errors
    ///
    /// Fails if the config does not fit `buffers` or the bus limit, or if no
    /// flush slot is left.
    pub fn register(
        &mut self,
        panel_ordinal: u8,
        config: DisplayConfig,
        buffers: DrawBuffers<B>,
    ) -> Result<DisplayHandle, RegistrationError> {
        let config = DisplayConfig {
            flush_mode: FlushMode::Manual,
            double_buffer: buffers.is_double(),
            ..config
        };
        self.insert(panel_ordinal, config, buffers)
    }

    /// Register a display and wire its flush completion in one step
    ///
    /// Port-managed displays always redraw the full frame.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::UnknownPanel`] if `panel_ordinal` is not bound,
    /// otherwise as [`register`](Self::register).
    pub fn register_port_managed<I, const P: usize>(
        &mut self,
        panels: &mut PanelSet<I, P>,
        panel_ordinal: u8,
        config: DisplayConfig,
        buffers: DrawBuffers<B>,
    ) -> Result<DisplayHandle, RegistrationError>
    where
        I: PanelIo,
    {
        if panels.get(panel_ordinal).is_none() {
            return Err(RegistrationError::UnknownPanel {
                ordinal: panel_ordinal,
            });
        }
        let config = DisplayConfig {
            flush_mode: FlushMode::PortManaged,
            full_refresh: true,
            double_buffer: buffers.is_double(),
            ..config
        };
        let handle = self.insert(panel_ordinal, config, buffers)?;
        self.attach_flush(handle, panels)?;
        Ok(handle)
    }

    fn insert(
        &mut self,
        panel_ordinal: u8,
        config: DisplayConfig,
        buffers: DrawBuffers<B>,
    ) -> Result<DisplayHandle, RegistrationError> {
        config.validate(buffers.len(), self.max_transfer)?;
        if self.displays.is_full() {
            return Err(RegistrationError::RegistryFull { capacity: N });
        }
        let flush = self.registry.allocate()?;
        let handle = DisplayHandle(self.displays.len() as u8);
        let entry = DisplayEntry {
            panel_ordinal,
            config,
            buffers,
            flush,
            screen: None,
            wired: false,
        };
        if self.displays.push(entry).is_err() {
            return Err(RegistrationError::RegistryFull { capacity: N });
        }
        if self.active.is_none() {
            self.active = Some(handle);
        }
        log::info!(
            "display {} registered on panel {} ({}x{}, {} lines, {})",
            handle.0,
            panel_ordinal,
            config.hor_res,
            config.ver_res,
            config.buffer_lines,
            if config.double_buffer { "double" } else { "single" },
        );
        Ok(handle)
    }

    /// Point the panel transport's completion notification at the display's
    /// flush slot
    ///
    /// # Errors
    ///
    /// [`RegistrationError::UnknownDisplay`] or
    /// [`RegistrationError::UnknownPanel`].
    pub fn attach_flush<I, const P: usize>(
        &mut self,
        handle: DisplayHandle,
        panels: &mut PanelSet<I, P>,
    ) -> Result<(), RegistrationError>
    where
        I: PanelIo,
    {
        let registry = self.registry;
        let entry = self
            .displays
            .get_mut(handle.0 as usize)
            .ok_or(RegistrationError::UnknownDisplay { index: handle.0 })?;
        let bound = panels
            .get_mut(entry.panel_ordinal)
            .ok_or(RegistrationError::UnknownPanel {
                ordinal: entry.panel_ordinal,
            })?;
        let slot = registry
            .slot(entry.flush)
            .map_err(|_| RegistrationError::UnknownDisplay { index: handle.0 })?;
        bound.panel_mut().io_mut().attach_flush_slot(slot);
        entry.wired = true;
        log::info!("display {} flush wired to {}", handle.0, bound.label());
        Ok(())
    }

    /// Make `handle` the active display
    ///
    /// # Errors
    ///
    /// [`RegistrationError::UnknownDisplay`] for an unregistered handle.
    pub fn set_active_display(&mut self, handle: DisplayHandle) -> Result<(), RegistrationError> {
        self.entry(handle)?;
        self.active = Some(handle);
        Ok(())
    }

    /// Currently active display
    pub fn active_display(&self) -> Option<DisplayHandle> {
        self.active
    }

    /// Run `f` with `handle` as the active display
    ///
    /// The previously active display is restored afterwards.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::UnknownDisplay`] for an unregistered handle.
    pub fn with_display<R>(
        &mut self,
        handle: DisplayHandle,
        f: impl FnOnce(&mut DisplayContext<'_>) -> R,
    ) -> Result<R, RegistrationError> {
        let previous = self.active;
        let entry = self
            .displays
            .get_mut(handle.0 as usize)
            .ok_or(RegistrationError::UnknownDisplay { index: handle.0 })?;
        self.active = Some(handle);
        let mut ctx = DisplayContext {
            handle,
            size: entry.config.logical_size(),
            screen: &mut entry.screen,
        };
        let result = f(&mut ctx);
        self.active = previous;
        Ok(result)
    }

    /// Registration parameters of a display
    pub fn display_config(&self, handle: DisplayHandle) -> Result<&DisplayConfig, RegistrationError> {
        self.entry(handle).map(|entry| &entry.config)
    }

    /// Screen loaded on a display
    pub fn screen(&self, handle: DisplayHandle) -> Option<&Screen> {
        self.entry(handle).ok().and_then(|entry| entry.screen.as_ref())
    }

    /// Screen loaded on a display, mutably
    pub fn screen_mut(&mut self, handle: DisplayHandle) -> Option<&mut Screen> {
        self.displays
            .get_mut(handle.0 as usize)
            .and_then(|entry| entry.screen.as_mut())
    }

    /// Whether the display's flush completion is wired
    pub fn is_wired(&self, handle: DisplayHandle) -> bool {
        self.entry(handle).is_ok_and(|entry| entry.wired)
    }

    /// Number of registered displays
    pub fn len(&self) -> usize {
        self.displays.len()
    }

    /// Whether no display is registered
    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    /// Advance animations by `elapsed_ms` and flush every dirty area
    ///
    /// Returns the number of strips written.
    ///
    /// # Errors
    ///
    /// - [`FlushError::Unwired`] if a display with a dirty screen has no
    ///   completion wiring
    /// - [`RegistrationError::UnknownPanel`] if a display's panel is gone
    /// - [`RenderError::Panel`] if the panel rejects the pixels; the strip's
    ///   buffer is handed back to the renderer
    pub fn render_pass<I, const P: usize>(
        &mut self,
        panels: &mut PanelSet<I, P>,
        elapsed_ms: u32,
    ) -> Result<usize, RenderError<I::Error>>
    where
        I: PanelIo,
    {
        let registry = self.registry;
        let mut strips = 0;

        for (index, entry) in self.displays.iter_mut().enumerate() {
            let Some(screen) = entry.screen.as_mut() else {
                continue;
            };
            screen.advance(elapsed_ms);
            if !screen.is_dirty() {
                continue;
            }
            if !entry.wired {
                return Err(RenderError::Flush(FlushError::Unwired));
            }
            let bound = panels.get_mut(entry.panel_ordinal).ok_or(
                RenderError::Registration(RegistrationError::UnknownPanel {
                    ordinal: entry.panel_ordinal,
                }),
            )?;
            let slot = registry.slot(entry.flush).map_err(RenderError::Flush)?;
            let Some(dirty) = screen.take_dirty() else {
                continue;
            };

            let size = entry.config.logical_size();
            let area = if entry.config.full_refresh {
                Rectangle::new(Point::zero(), size)
            } else {
                dirty
            };
            let lines = u32::from(entry.config.buffer_lines).max(1);
            let double = entry.buffers.is_double();
            let bottom = area.top_left.y + area.size.height as i32;
            let mut y = area.top_left.y;

            while y < bottom {
                let height = lines.min((bottom - y) as u32);
                let strip = Rectangle::new(
                    Point::new(area.top_left.x, y),
                    Size::new(area.size.width, height),
                );
                if !double {
                    slot.wait_reclaimable();
                }

                let unsent = Rectangle::new(
                    strip.top_left,
                    Size::new(area.size.width, (bottom - y) as u32),
                );
                let buffer = entry.buffers.render_buffer();
                let required = strip.size.width as usize
                    * height as usize
                    * entry.config.pixel_format.bytes_per_pixel();
                let provided = buffer.len();
                let Some(mut target) =
                    StripTarget::new(&mut *buffer, size, strip, entry.config.swap_bytes)
                else {
                    screen.invalidate(unsent);
                    return Err(RenderError::Registration(RegistrationError::InvalidBuffer {
                        required,
                        provided,
                    }));
                };
                match screen.draw(&mut target) {
                    Ok(()) => {}
                    Err(never) => match never {},
                }
                let len = target.byte_len();

                slot.wait_reclaimable();
                if let Err(e) = slot.submit() {
                    screen.invalidate(unsent);
                    return Err(RenderError::Flush(e));
                }
                let x0 = strip.top_left.x as u16;
                let y0 = strip.top_left.y as u16;
                let x1 = x0 + strip.size.width as u16;
                let y1 = y0 + height as u16;
                if let Err(source) =
                    bound
                        .panel_mut()
                        .draw_bitmap(x0, y0, x1, y1, &buffer[..len])
                {
                    slot.abandon();
                    screen.invalidate(unsent);
                    log::error!("display {}: flush failed: {}", index, source);
                    return Err(RenderError::Panel {
                        display: index as u8,
                        source,
                    });
                }
                entry.buffers.flip();
                strips += 1;
                y += height as i32;
            }
        }
        Ok(strips)
    }

    fn entry(&self, handle: DisplayHandle) -> Result<&DisplayEntry<B>, RegistrationError> {
        self.displays
            .get(handle.0 as usize)
            .ok_or(RegistrationError::UnknownDisplay { index: handle.0 })
    }
}

/// Scope of [`Gui::with_display`]
pub struct DisplayContext<'a> {
    handle: DisplayHandle,
    size: Size,
    screen: &'a mut Option<Screen>,
}

impl DisplayContext<'_> {
    /// Display this context targets
    pub fn handle(&self) -> DisplayHandle {
        self.handle
    }

    /// Logical size of the display
    pub fn size(&self) -> Size {
        self.size
    }

    /// Create an empty screen sized for this display
    pub fn create_screen(&self) -> Screen {
        Screen::new(self.size)
    }

    /// Make `screen` the display's content, replacing any previous one
    pub fn load_screen(&mut self, mut screen: Screen) {
        screen.invalidate_all();
        *self.screen = Some(screen);
    }

    /// Screen currently loaded
    pub fn screen_mut(&mut self) -> Option<&mut Screen> {
        self.screen.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::tests::{MockError, TrackedIo};
    use crate::binding::{PanelDescriptor, PowerPolicy};
    use crate::command::{CASET, RAMWR};
    use crate::config::{Builder, Config};
    use crate::error::PanelError;
    use crate::panel::tests::{MockDelay, MockInterface};
    use crate::rotation::Orientation;
    use crate::scene::tests::BLINK;
    use crate::scene::{Align, build_eye_scenes, EyeScene};
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec as StdVec;
    use core::cell::RefCell;

    type Buf = StdVec<u8>;

    fn registry() -> &'static FlushRegistry<2> {
        Box::leak(Box::new(FlushRegistry::new()))
    }

    fn config(lines: u16) -> Config {
        Builder::new().buffer_lines(lines).build().unwrap()
    }

    fn buffers(config: &Config, double: bool) -> DrawBuffers<Buf> {
        let len = config.strip_bytes();
        if double {
            DrawBuffers::double(vec![0; len], vec![0; len])
        } else {
            DrawBuffers::single(vec![0; len])
        }
    }

    fn panels(config: &Config) -> PanelSet<MockInterface, 2> {
        let mut panels = PanelSet::new();
        for descriptor in &config.panels {
            panels
                .bind(
                    descriptor,
                    config.dimensions,
                    &config.panel,
                    PowerPolicy::Immediate,
                    || Ok(MockInterface::default()),
                    &mut MockDelay,
                )
                .unwrap();
        }
        panels
    }

    fn io(panels: &PanelSet<MockInterface, 2>, ordinal: u8) -> &MockInterface {
        panels.get(ordinal).unwrap().panel().io()
    }

    fn count(commands: &[u8], command: u8) -> usize {
        commands.iter().filter(|c| **c == command).count()
    }

    #[test]
    fn test_first_registered_display_is_active() {
        let config = config(40);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        assert_eq!(gui.active_display(), None);
        let left = gui
            .register(0, config.display_config(Orientation::default()), buffers(&config, true))
            .unwrap();
        let right = gui
            .register(1, config.display_config(Orientation::default()), buffers(&config, true))
            .unwrap();
        assert_eq!(gui.active_display(), Some(left));

        gui.set_active_display(right).unwrap();
        gui.set_active_display(right).unwrap();
        assert_eq!(gui.active_display(), Some(right));
        assert_eq!(
            gui.set_active_display(DisplayHandle(5)),
            Err(RegistrationError::UnknownDisplay { index: 5 })
        );
    }

    #[test]
    fn test_register_rejects_short_buffer_and_full_registry() {
        let config = config(40);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let short = DrawBuffers::single(vec![0; 100]);
        assert_eq!(
            gui.register(0, config.display_config(Orientation::default()), short)
                .err(),
            Some(RegistrationError::InvalidBuffer {
                required: 12_800,
                provided: 100
            })
        );
        for ordinal in 0..2 {
            gui.register(
                ordinal,
                config.display_config(Orientation::default()),
                buffers(&config, false),
            )
            .unwrap();
        }
        assert_eq!(
            gui.register(0, config.display_config(Orientation::default()), buffers(&config, false))
                .err(),
            Some(RegistrationError::RegistryFull { capacity: 2 })
        );
    }

    #[test]
    fn test_with_display_restores_active() {
        let config = config(40);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let left = gui
            .register(0, config.display_config(Orientation::default()), buffers(&config, false))
            .unwrap();
        let right = gui
            .register(1, config.display_config(Orientation::default()), buffers(&config, false))
            .unwrap();

        let seen = gui
            .with_display(right, |ctx| {
                let screen = ctx.create_screen();
                ctx.load_screen(screen);
                ctx.handle()
            })
            .unwrap();
        assert_eq!(seen, right);
        assert_eq!(gui.active_display(), Some(left));
        assert!(gui.screen(right).is_some());
        assert!(gui.screen(left).is_none());
    }

    #[test]
    fn test_render_unwired_display_fails() {
        let config = config(40);
        let mut panels = panels(&config);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let left = gui
            .register(0, config.display_config(Orientation::default()), buffers(&config, false))
            .unwrap();
        gui.with_display(left, |ctx| {
            let screen = ctx.create_screen();
            ctx.load_screen(screen);
        })
        .unwrap();

        let result = gui.render_pass(&mut panels, 0);
        assert!(matches!(result, Err(RenderError::Flush(FlushError::Unwired))));
        // The dirty area survives for the next pass
        assert!(gui.screen(left).unwrap().is_dirty());
    }

    #[test]
    fn test_full_frame_renders_in_strips() {
        let config = config(40);
        let mut panels = panels(&config);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let left = gui
            .register(0, config.display_config(Orientation::default()), buffers(&config, true))
            .unwrap();
        gui.attach_flush(left, &mut panels).unwrap();
        gui.with_display(left, |ctx| {
            let screen = ctx.create_screen();
            ctx.load_screen(screen);
        })
        .unwrap();

        let before = count(&io(&panels, 0).commands, RAMWR);
        assert_eq!(gui.render_pass(&mut panels, 0).unwrap(), 4);
        let io = io(&panels, 0);
        assert_eq!(count(&io.commands, RAMWR) - before, 4);
        assert_eq!(io.color_bytes, 160 * 160 * 2);

        let slot = gui.registry.slot(gui.displays[0].flush).unwrap();
        assert_eq!(slot.submitted(), 4);
        assert_eq!(slot.completed(), 4);
        assert!(!slot.is_in_flight());

        // Nothing changed, nothing flushed
        assert_eq!(gui.render_pass(&mut panels, 0).unwrap(), 0);
    }

    #[test]
    fn test_partial_refresh_flushes_dirty_area_only() {
        let config = config(40);
        let mut panels = panels(&config);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let left = gui
            .register(0, config.display_config(Orientation::default()), buffers(&config, false))
            .unwrap();
        gui.attach_flush(left, &mut panels).unwrap();
        gui.with_display(left, |ctx| {
            let mut screen = ctx.create_screen();
            let gif = screen.add_animation(&BLINK).unwrap();
            screen.align(gif, Align::Center, 0, 0).unwrap();
            ctx.load_screen(screen);
        })
        .unwrap();
        gui.render_pass(&mut panels, 0).unwrap();
        let flushed = io(&panels, 0).color_bytes;

        // One frame step redraws the 4x4 animation only
        assert_eq!(gui.render_pass(&mut panels, 50).unwrap(), 1);
        let io = io(&panels, 0);
        assert_eq!(io.color_bytes - flushed, 4 * 4 * 2);
        let (_, window) = io
            .command_data
            .iter()
            .rev()
            .find(|(command, _)| *command == CASET)
            .unwrap();
        assert_eq!(window, &vec![0, 78, 0, 81]);
    }

    #[test]
    fn test_port_managed_forces_full_refresh() {
        let config = config(160);
        let mut panels = panels(&config);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let right = gui
            .register_port_managed(
                &mut panels,
                1,
                config.display_config(Orientation::default()),
                buffers(&config, false),
            )
            .unwrap();
        let display = gui.display_config(right).unwrap();
        assert!(display.full_refresh);
        assert_eq!(display.flush_mode, FlushMode::PortManaged);
        assert!(gui.is_wired(right));
        assert!(io(&panels, 1).flush_slot().is_some());

        gui.with_display(right, |ctx| {
            let screen = ctx.create_screen();
            ctx.load_screen(screen);
        })
        .unwrap();
        gui.render_pass(&mut panels, 0).unwrap();
        gui.screen_mut(right)
            .unwrap()
            .invalidate(Rectangle::new(Point::new(5, 5), Size::new(2, 2)));
        gui.render_pass(&mut panels, 0).unwrap();
        assert_eq!(io(&panels, 1).color_bytes, 2 * 160 * 160 * 2);
        assert_eq!(io(&panels, 0).color_bytes, 0);
    }

    #[test]
    fn test_register_port_managed_unknown_panel() {
        let config = config(40);
        let mut panels: PanelSet<MockInterface, 2> = PanelSet::new();
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let result = gui.register_port_managed(
            &mut panels,
            0,
            config.display_config(Orientation::default()),
            buffers(&config, false),
        );
        assert_eq!(result.err(), Some(RegistrationError::UnknownPanel { ordinal: 0 }));
        assert!(gui.registry.is_empty());
    }

    #[test]
    fn test_panel_failure_returns_buffer_to_renderer() {
        let config = config(40);
        let dropped = Rc::new(RefCell::new(StdVec::new()));
        let mut panels: PanelSet<TrackedIo, 2> = PanelSet::new();
        panels
            .bind(
                &PanelDescriptor::new(47, "LEFT EYE", Orientation::new(false, false, false), 0),
                config.dimensions,
                &config.panel,
                PowerPolicy::Immediate,
                || Ok(TrackedIo::new("left", Some(CASET), &dropped)),
                &mut MockDelay,
            )
            .unwrap();
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let left = gui
            .register(0, config.display_config(Orientation::default()), buffers(&config, false))
            .unwrap();
        gui.attach_flush(left, &mut panels).unwrap();
        gui.with_display(left, |ctx| {
            let screen = ctx.create_screen();
            ctx.load_screen(screen);
        })
        .unwrap();

        let result = gui.render_pass(&mut panels, 0);
        assert!(matches!(
            result,
            Err(RenderError::Panel {
                display: 0,
                source: PanelError::Io(MockError)
            })
        ));
        let slot = gui.registry.slot(gui.displays[0].flush).unwrap();
        assert!(!slot.is_in_flight());

        // Nothing reached the panel, so the whole frame is still owed
        let screen = gui.screen_mut(left).unwrap();
        assert!(screen.is_dirty());
        assert_eq!(
            screen.take_dirty(),
            Some(Rectangle::new(Point::zero(), Size::new(160, 160)))
        );
    }

    #[test]
    fn test_short_strip_buffer_reports_its_length() {
        let config = config(40);
        let mut panels = panels(&config);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let left = gui
            .register(0, config.display_config(Orientation::default()), buffers(&config, false))
            .unwrap();
        gui.attach_flush(left, &mut panels).unwrap();
        gui.with_display(left, |ctx| {
            let screen = ctx.create_screen();
            ctx.load_screen(screen);
        })
        .unwrap();
        gui.displays[0].buffers = DrawBuffers::single(vec![0; 10]);

        let result = gui.render_pass(&mut panels, 0);
        assert!(matches!(
            result,
            Err(RenderError::Registration(RegistrationError::InvalidBuffer {
                required: 12800,
                provided: 10,
            }))
        ));
        assert!(gui.screen(left).unwrap().is_dirty());
    }

    #[test]
    fn test_build_eye_scenes() {
        let config = config(40);
        let mut panels = panels(&config);
        let mut gui: Gui<Buf, 2> = Gui::new(registry(), config.strip_bytes());
        let left = gui
            .register(0, config.display_config(Orientation::default()), buffers(&config, true))
            .unwrap();
        let right = gui
            .register(1, config.display_config(Orientation::default()), buffers(&config, true))
            .unwrap();
        gui.attach_flush(left, &mut panels).unwrap();
        gui.attach_flush(right, &mut panels).unwrap();
        gui.set_active_display(right).unwrap();

        build_eye_scenes(
            &mut gui,
            &[
                EyeScene {
                    display: left,
                    animation: &BLINK,
                    label: "L",
                },
                EyeScene {
                    display: right,
                    animation: &BLINK,
                    label: "R",
                },
            ],
        )
        .unwrap();
        assert_eq!(gui.active_display(), Some(left));

        for (handle, text) in [(left, "L"), (right, "R")] {
            let screen = gui.screen(handle).unwrap();
            assert_eq!(screen.widget_count(), 2);
            let gif = screen.widget_area(crate::scene::WidgetId(0)).unwrap();
            let label = screen.widget_area(crate::scene::WidgetId(1)).unwrap();
            assert_eq!(gif.top_left, Point::new(78, 78));
            assert_eq!(label.top_left, Point::new(77, 92));
            assert_eq!(
                screen.label_text(crate::scene::WidgetId(1)).unwrap(),
                Some(text)
            );
        }

        assert_eq!(gui.render_pass(&mut panels, 0).unwrap(), 8);
    }
}
