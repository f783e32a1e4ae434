//! Per-display scenes
//!
//! A [`Screen`] is the widget tree of one display: a background color plus a
//! handful of widgets, each an animated image or a text label. Widgets are
//! placed with [`Align`] either relative to the screen ([`Screen::align`])
//! or to another widget ([`Screen::align_to`]). Every change to a widget
//! invalidates the area it covered and the area it now covers; the render
//! pass redraws only that region.
//!
//! Animations play pre-decoded frames of raw big-endian RGB565.
//!
//! ## Example
//!
//! ```
//! use dual_eye_display::scene::{Align, AnimationSource, Screen};
//! use embedded_graphics::prelude::*;
//!
//! static FRAME: [u8; 8] = [0xFF; 8];
//! static EYE: AnimationSource = AnimationSource::new(2, 2, 100, &[&FRAME]);
//!
//! let mut screen = Screen::new(Size::new(160, 160));
//! let gif = match screen.add_animation(&EYE) {
//!     Ok(id) => id,
//!     Err(_) => return,
//! };
//! let label = match screen.add_label("L") {
//!     Ok(id) => id,
//!     Err(_) => return,
//! };
//! let _ = screen.align(gif, Align::Center, 0, 0);
//! let _ = screen.align_to(label, gif, Align::OutBottomMid, 0, 10);
//!
//! let area = match screen.widget_area(label) {
//!     Ok(area) => area,
//!     Err(_) => return,
//! };
//! assert_eq!(area.top_left, Point::new(77, 91));
//! ```

use embedded_graphics::{
    image::{Image, ImageRawBE},
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    text::{Baseline, Text},
};
use embedded_graphics_core::{
    Drawable,
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::{Rgb565, RgbColor},
    primitives::Rectangle,
};
use heapless::{String, Vec};

use crate::display::DisplayHandle;
use crate::error::SceneError;
use crate::gui::Gui;

/// Widgets per screen
pub const MAX_WIDGETS: usize = 4;

/// Bytes per label
pub const LABEL_CAPACITY: usize = 16;

const GLYPH_WIDTH: u32 = 6;
const GLYPH_HEIGHT: u32 = 10;

/// Pre-decoded animation frames
///
/// Each frame is `width * height` pixels of big-endian RGB565.
#[derive(Debug)]
pub struct AnimationSource {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Time each frame is shown
    pub frame_duration_ms: u32,
    /// Frame data
    pub frames: &'static [&'static [u8]],
}

impl AnimationSource {
    /// Describe an animation
    pub const fn new(
        width: u32,
        height: u32,
        frame_duration_ms: u32,
        frames: &'static [&'static [u8]],
    ) -> Self {
        Self {
            width,
            height,
            frame_duration_ms,
            frames,
        }
    }

    /// Frame size
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Widget placement relative to a base rectangle
///
/// `Out*` variants place the widget outside the base, touching its edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    /// Top-left corner
    TopLeft,
    /// Top edge, centered
    TopMid,
    /// Top-right corner
    TopRight,
    /// Left edge, centered
    LeftMid,
    /// Centered
    Center,
    /// Right edge, centered
    RightMid,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom edge, centered
    BottomMid,
    /// Bottom-right corner
    BottomRight,
    /// Above the base, centered
    OutTopMid,
    /// Below the base, centered
    OutBottomMid,
    /// Left of the base, centered
    OutLeftMid,
    /// Right of the base, centered
    OutRightMid,
}

impl Align {
    /// Top-left corner for a widget of `size` placed against `base`
    pub fn place(self, base: Rectangle, size: Size) -> Point {
        let bx = base.top_left.x;
        let by = base.top_left.y;
        let bw = base.size.width as i32;
        let bh = base.size.height as i32;
        let w = size.width as i32;
        let h = size.height as i32;
        let mid_x = bx + (bw - w) / 2;
        let mid_y = by + (bh - h) / 2;

        let (x, y) = match self {
            Self::TopLeft => (bx, by),
            Self::TopMid => (mid_x, by),
            Self::TopRight => (bx + bw - w, by),
            Self::LeftMid => (bx, mid_y),
            Self::Center => (mid_x, mid_y),
            Self::RightMid => (bx + bw - w, mid_y),
            Self::BottomLeft => (bx, by + bh - h),
            Self::BottomMid => (mid_x, by + bh - h),
            Self::BottomRight => (bx + bw - w, by + bh - h),
            Self::OutTopMid => (mid_x, by - h),
            Self::OutBottomMid => (mid_x, by + bh),
            Self::OutLeftMid => (bx - w, mid_y),
            Self::OutRightMid => (bx + bw, mid_y),
        };
        Point::new(x, y)
    }
}

/// Index of a widget on its screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WidgetId(pub(crate) u8);

impl WidgetId {
    /// Widget index
    pub fn index(self) -> u8 {
        self.0
    }
}

#[derive(Debug)]
enum WidgetKind {
    Animation {
        source: &'static AnimationSource,
        frame: usize,
        shown_ms: u32,
    },
    Label {
        text: String<LABEL_CAPACITY>,
    },
}

#[derive(Debug)]
struct Widget {
    kind: WidgetKind,
    position: Point,
}

impl Widget {
    fn size(&self) -> Size {
        match &self.kind {
            WidgetKind::Animation { source, .. } => source.size(),
            WidgetKind::Label { text } => {
                Size::new(GLYPH_WIDTH * text.chars().count() as u32, GLYPH_HEIGHT)
            }
        }
    }

    fn area(&self) -> Rectangle {
        Rectangle::new(self.position, self.size())
    }

    /// Advance an animation; returns whether the visible frame changed
    fn advance(&mut self, elapsed_ms: u32) -> bool {
        let WidgetKind::Animation {
            source,
            frame,
            shown_ms,
        } = &mut self.kind
        else {
            return false;
        };
        if source.frame_duration_ms == 0 || source.frames.len() < 2 {
            return false;
        }
        *shown_ms = shown_ms.saturating_add(elapsed_ms);
        let steps = *shown_ms / source.frame_duration_ms;
        if steps == 0 {
            return false;
        }
        *shown_ms %= source.frame_duration_ms;
        let before = *frame;
        *frame = (*frame + steps as usize) % source.frames.len();
        *frame != before
    }

    fn draw<D>(&self, target: &mut D, color: Rgb565) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        match &self.kind {
            WidgetKind::Animation { source, frame, .. } => {
                let Some(data) = source.frames.get(*frame) else {
                    return Ok(());
                };
                let raw = ImageRawBE::<Rgb565>::new(data, source.width);
                Image::new(&raw, self.position).draw(target)
            }
            WidgetKind::Label { text } => {
                let style = MonoTextStyle::new(&FONT_6X10, color);
                Text::with_baseline(text.as_str(), self.position, style, Baseline::Top).draw(target)?;
                Ok(())
            }
        }
    }
}

/// Widget tree of one display
#[derive(Debug)]
pub struct Screen {
    size: Size,
    background: Rgb565,
    foreground: Rgb565,
    widgets: Vec<Widget, MAX_WIDGETS>,
    dirty: Option<Rectangle>,
}

impl Screen {
    /// Create an empty screen covering a display of `size`
    ///
    /// A new screen is entirely dirty.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            background: Rgb565::BLACK,
            foreground: Rgb565::WHITE,
            widgets: Vec::new(),
            dirty: Some(Rectangle::new(Point::zero(), size)),
        }
    }

    /// Screen size
    pub fn size(&self) -> Size {
        self.size
    }

    /// Screen rectangle
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size)
    }

    /// Background color
    pub fn background(&self) -> Rgb565 {
        self.background
    }

    /// Set the background color
    pub fn set_background(&mut self, color: Rgb565) {
        self.background = color;
        self.invalidate_all();
    }

    /// Set the label text color
    pub fn set_foreground(&mut self, color: Rgb565) {
        self.foreground = color;
        self.invalidate_all();
    }

    /// Add an animated image at the top-left corner
    pub fn add_animation(
        &mut self,
        source: &'static AnimationSource,
    ) -> Result<WidgetId, SceneError> {
        self.push(WidgetKind::Animation {
            source,
            frame: 0,
            shown_ms: 0,
        })
    }

    /// Add a text label at the top-left corner
    pub fn add_label(&mut self, text: &str) -> Result<WidgetId, SceneError> {
        let text = String::try_from(text).map_err(|()| SceneError::TextTooLong {
            capacity: LABEL_CAPACITY,
        })?;
        self.push(WidgetKind::Label { text })
    }

    /// Replace the text of a label
    pub fn set_label_text(&mut self, id: WidgetId, text: &str) -> Result<(), SceneError> {
        let new_text = String::try_from(text).map_err(|()| SceneError::TextTooLong {
            capacity: LABEL_CAPACITY,
        })?;
        let old = self.widget_area(id)?;
        if let Some(Widget {
            kind: WidgetKind::Label { text },
            ..
        }) = self.widgets.get_mut(id.0 as usize)
        {
            *text = new_text;
        }
        self.invalidate(old);
        let new = self.widget_area(id)?;
        self.invalidate(new);
        Ok(())
    }

    /// Place a widget relative to the screen
    pub fn align(&mut self, id: WidgetId, align: Align, dx: i32, dy: i32) -> Result<(), SceneError> {
        let base = self.bounds();
        self.place(id, base, align, dx, dy)
    }

    /// Place a widget relative to another widget
    pub fn align_to(
        &mut self,
        id: WidgetId,
        base: WidgetId,
        align: Align,
        dx: i32,
        dy: i32,
    ) -> Result<(), SceneError> {
        let base = self.widget_area(base)?;
        self.place(id, base, align, dx, dy)
    }

    /// Area covered by a widget
    pub fn widget_area(&self, id: WidgetId) -> Result<Rectangle, SceneError> {
        self.widgets
            .get(id.0 as usize)
            .map(Widget::area)
            .ok_or(SceneError::UnknownWidget { index: id.0 })
    }

    /// Number of widgets
    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Current frame index of an animation, `None` for labels
    pub fn animation_frame(&self, id: WidgetId) -> Result<Option<usize>, SceneError> {
        let widget = self
            .widgets
            .get(id.0 as usize)
            .ok_or(SceneError::UnknownWidget { index: id.0 })?;
        Ok(match widget.kind {
            WidgetKind::Animation { frame, .. } => Some(frame),
            WidgetKind::Label { .. } => None,
        })
    }

    /// Text of a label, `None` for animations
    pub fn label_text(&self, id: WidgetId) -> Result<Option<&str>, SceneError> {
        let widget = self
            .widgets
            .get(id.0 as usize)
            .ok_or(SceneError::UnknownWidget { index: id.0 })?;
        Ok(match &widget.kind {
            WidgetKind::Label { text } => Some(text.as_str()),
            WidgetKind::Animation { .. } => None,
        })
    }

    /// Advance all animations by `elapsed_ms`, invalidating changed frames
    pub fn advance(&mut self, elapsed_ms: u32) {
        let mut changed: Option<Rectangle> = None;
        for widget in &mut self.widgets {
            if widget.advance(elapsed_ms) {
                changed = Some(union(changed, widget.area()));
            }
        }
        if let Some(area) = changed {
            self.invalidate(area);
        }
    }

    /// Mark an area for redraw
    pub fn invalidate(&mut self, area: Rectangle) {
        let area = area.intersection(&self.bounds());
        if area.is_zero_sized() {
            return;
        }
        self.dirty = Some(union(self.dirty, area));
    }

    /// Mark the whole screen for redraw
    pub fn invalidate_all(&mut self) {
        self.dirty = Some(self.bounds());
    }

    /// Whether anything needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Take the area that needs redrawing
    pub fn take_dirty(&mut self) -> Option<Rectangle> {
        self.dirty.take()
    }

    /// Draw background and widgets; the target clips
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        target.clear(self.background)?;
        for widget in &self.widgets {
            widget.draw(target, self.foreground)?;
        }
        Ok(())
    }

    fn push(&mut self, kind: WidgetKind) -> Result<WidgetId, SceneError> {
        let id = WidgetId(self.widgets.len() as u8);
        let widget = Widget {
            kind,
            position: Point::zero(),
        };
        let area = widget.area();
        self.widgets
            .push(widget)
            .map_err(|_| SceneError::TooManyWidgets {
                capacity: MAX_WIDGETS,
            })?;
        self.invalidate(area);
        Ok(id)
    }

    fn place(
        &mut self,
        id: WidgetId,
        base: Rectangle,
        align: Align,
        dx: i32,
        dy: i32,
    ) -> Result<(), SceneError> {
        let old = self.widget_area(id)?;
        let position = align.place(base, old.size) + Point::new(dx, dy);
        if let Some(widget) = self.widgets.get_mut(id.0 as usize) {
            widget.position = position;
        }
        self.invalidate(old);
        self.invalidate(Rectangle::new(position, old.size));
        Ok(())
    }
}

fn union(a: Option<Rectangle>, b: Rectangle) -> Rectangle {
    let Some(a) = a else { return b };
    let (Some(a_br), Some(b_br)) = (a.bottom_right(), b.bottom_right()) else {
        return if a.is_zero_sized() { b } else { a };
    };
    let top_left = Point::new(a.top_left.x.min(b.top_left.x), a.top_left.y.min(b.top_left.y));
    let bottom_right = Point::new(a_br.x.max(b_br.x), a_br.y.max(b_br.y));
    Rectangle::with_corners(top_left, bottom_right)
}

/// One eye of the demo scene
#[derive(Clone, Copy, Debug)]
pub struct EyeScene {
    /// Display the eye is shown on
    pub display: DisplayHandle,
    /// Animation centered on the screen
    pub animation: &'static AnimationSource,
    /// Label placed 10 px below the animation
    pub label: &'static str,
}

/// Build one screen per eye and load it on its display
///
/// Each screen gets its animation centered and its label 10 px below the
/// animation. The first eye's display is active again afterwards.
pub fn build_eye_scenes<B, const N: usize>(
    gui: &mut Gui<B, N>,
    eyes: &[EyeScene],
) -> Result<(), SceneError>
where
    B: AsMut<[u8]> + AsRef<[u8]>,
{
    for eye in eyes {
        gui.with_display(eye.display, |ctx| {
            let mut screen = ctx.create_screen();
            let gif = screen.add_animation(eye.animation)?;
            screen.align(gif, Align::Center, 0, 0)?;
            let label = screen.add_label(eye.label)?;
            screen.align_to(label, gif, Align::OutBottomMid, 0, 10)?;
            ctx.load_screen(screen);
            Ok::<(), SceneError>(())
        })??;
        log::info!("scene {} loaded on display {}", eye.label, eye.display.index());
    }
    if let Some(first) = eyes.first() {
        gui.set_active_display(first.display)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    static FRAME_A: [u8; 32] = [0xF8; 32];
    static FRAME_B: [u8; 32] = [0x07; 32];
    pub(crate) static BLINK: AnimationSource =
        AnimationSource::new(4, 4, 50, &[&FRAME_A, &FRAME_B]);

    #[test]
    fn test_align_center_and_out_bottom_mid() {
        let mut screen = Screen::new(Size::new(160, 160));
        let gif = screen.add_animation(&BLINK).unwrap();
        screen.align(gif, Align::Center, 0, 0).unwrap();
        assert_eq!(
            screen.widget_area(gif).unwrap(),
            Rectangle::new(Point::new(78, 78), Size::new(4, 4))
        );

        let label = screen.add_label("R").unwrap();
        screen
            .align_to(label, gif, Align::OutBottomMid, 0, 10)
            .unwrap();
        // 6x10 glyph, centered under the 4px image, 10px below its bottom edge
        assert_eq!(
            screen.widget_area(label).unwrap(),
            Rectangle::new(Point::new(77, 92), Size::new(6, 10))
        );
    }

    #[test]
    fn test_align_variants() {
        let base = Rectangle::new(Point::new(10, 10), Size::new(20, 20));
        let size = Size::new(4, 4);
        assert_eq!(Align::TopLeft.place(base, size), Point::new(10, 10));
        assert_eq!(Align::BottomRight.place(base, size), Point::new(26, 26));
        assert_eq!(Align::OutTopMid.place(base, size), Point::new(18, 6));
        assert_eq!(Align::OutRightMid.place(base, size), Point::new(30, 18));
    }

    #[test]
    fn test_widget_capacity_and_text_length() {
        let mut screen = Screen::new(Size::new(160, 160));
        for _ in 0..MAX_WIDGETS {
            screen.add_label("x").unwrap();
        }
        assert_eq!(
            screen.add_label("y"),
            Err(SceneError::TooManyWidgets {
                capacity: MAX_WIDGETS
            })
        );

        let mut screen = Screen::new(Size::new(160, 160));
        assert_eq!(
            screen.add_label("this label is far too long"),
            Err(SceneError::TextTooLong {
                capacity: LABEL_CAPACITY
            })
        );
    }

    #[test]
    fn test_unknown_widget() {
        let mut screen = Screen::new(Size::new(160, 160));
        let result = screen.align(WidgetId(3), Align::Center, 0, 0);
        assert_eq!(result, Err(SceneError::UnknownWidget { index: 3 }));
    }

    #[test]
    fn test_advance_invalidates_only_animation() {
        let mut screen = Screen::new(Size::new(160, 160));
        let gif = screen.add_animation(&BLINK).unwrap();
        screen.align(gif, Align::Center, 0, 0).unwrap();
        screen.take_dirty();

        screen.advance(49);
        assert!(!screen.is_dirty());
        assert_eq!(screen.animation_frame(gif).unwrap(), Some(0));

        screen.advance(1);
        assert_eq!(screen.animation_frame(gif).unwrap(), Some(1));
        assert_eq!(
            screen.take_dirty(),
            Some(Rectangle::new(Point::new(78, 78), Size::new(4, 4)))
        );

        // Two whole frames in one step land on the same frame
        screen.advance(100);
        assert_eq!(screen.animation_frame(gif).unwrap(), Some(1));
        assert!(!screen.is_dirty());
    }

    #[test]
    fn test_set_label_text_invalidates_old_and_new_area() {
        let mut screen = Screen::new(Size::new(160, 160));
        let label = screen.add_label("ab").unwrap();
        screen.take_dirty();
        screen.set_label_text(label, "abcd").unwrap();
        assert_eq!(screen.label_text(label).unwrap(), Some("abcd"));
        assert_eq!(
            screen.take_dirty(),
            Some(Rectangle::new(Point::zero(), Size::new(24, 10)))
        );
    }

    #[test]
    fn test_union_spans_both() {
        let a = Rectangle::new(Point::new(0, 0), Size::new(2, 2));
        let b = Rectangle::new(Point::new(5, 5), Size::new(1, 1));
        assert_eq!(
            union(Some(a), b),
            Rectangle::new(Point::zero(), Size::new(6, 6))
        );
        assert_eq!(union(None, b), b);
    }
}
