/// Panel geometry and the mapping from raw window input to session events

use minifb::Key;

use crate::analysis::{ThresholdMode, ThresholdState};

/// Height of the control strip below the image, in pixels
pub const CONTROL_HEIGHT: usize = 150;

/// Gap around the image and inside the control strip
const MARGIN: usize = 10;

/// Extra vertical slack when grabbing the slider track
const TRACK_GRAB: f32 = 6.0;

/// A user intent, independent of whether it came from a key or the mouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    SetThreshold(u8),
    Nudge(i16),
    SetMode(ThresholdMode),
    ToggleMode,
}

impl ControlEvent {
    /// The state that results from applying this event to `state`. Threshold
    /// moves saturate at 0 and 255.
    pub fn applied_to(self, state: &ThresholdState) -> ThresholdState {
        let mut next = *state;
        match self {
            ControlEvent::SetThreshold(t) => next.threshold = t,
            ControlEvent::Nudge(delta) => {
                next.threshold = (state.threshold as i16)
                    .saturating_add(delta)
                    .clamp(0, u8::MAX as i16) as u8;
            }
            ControlEvent::SetMode(mode) => next.mode = mode,
            ControlEvent::ToggleMode => next.mode = state.mode.toggled(),
        }
        next
    }
}

/// Axis-aligned rectangle in window pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && px < self.right() as f32
            && py >= self.y as f32
            && py < self.bottom() as f32
    }
}

/// Where every element of the panel goes for a given window size.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelLayout {
    pub width: usize,
    pub height: usize,

    /// Scaled image, aspect preserved and centered above the controls
    pub image: Rect,

    /// Top-left of the status line
    pub status: (i32, i32),

    /// Top-left of the caption
    pub caption: (i32, i32),

    pub slider_track: Rect,
    pub swatch: Rect,
    pub radio_above: Rect,
    pub radio_below: Rect,
}

impl PanelLayout {
    /// Lay out a `width` x `height` window showing an image of `image_dims`
    /// (width, height).
    pub fn new(width: usize, height: usize, image_dims: (usize, usize)) -> Self {
        let image_area_h = height.saturating_sub(CONTROL_HEIGHT + 2 * MARGIN).max(1);
        let image_area_w = width.saturating_sub(2 * MARGIN).max(1);

        let (img_w, img_h) = (image_dims.0.max(1) as f32, image_dims.1.max(1) as f32);
        let scale = (image_area_w as f32 / img_w).min(image_area_h as f32 / img_h);
        let (fit_w, fit_h) = (
            ((img_w * scale).floor() as u32).max(1),
            ((img_h * scale).floor() as u32).max(1),
        );
        let image = Rect::new(
            (MARGIN + (image_area_w - fit_w as usize) / 2) as i32,
            (MARGIN + (image_area_h - fit_h as usize) / 2) as i32,
            fit_w,
            fit_h,
        );

        let strip_y = height.saturating_sub(CONTROL_HEIGHT) as i32;
        let w = width as f32;
        let frac = |f: f32| (w * f).round() as i32;

        let slider_track = Rect::new(frac(0.2), strip_y + 78, (frac(0.6).max(2)) as u32, 8);
        let swatch = Rect::new(
            frac(0.82),
            strip_y + 70,
            (frac(0.05).max(16)) as u32,
            24,
        );
        let radio_w = (frac(0.1).max(60)) as u32;
        let radio_above = Rect::new(frac(0.4), strip_y + 118, radio_w, 22);
        let radio_below = Rect::new(radio_above.right(), strip_y + 118, radio_w, 22);

        Self {
            width,
            height,
            image,
            status: (MARGIN as i32, strip_y + 4),
            caption: (MARGIN as i32, strip_y + 26),
            slider_track,
            swatch,
            radio_above,
            radio_below,
        }
    }

    /// Threshold selected by a click at horizontal position `px` on the track.
    pub fn threshold_at(&self, px: f32) -> u8 {
        let span = (self.slider_track.w - 1).max(1) as f32;
        let t = (px - self.slider_track.x as f32) / span;
        (t.clamp(0.0, 1.0) * u8::MAX as f32).round() as u8
    }

    /// Horizontal center of the slider knob for `threshold`.
    pub fn knob_x(&self, threshold: u8) -> i32 {
        let span = (self.slider_track.w - 1) as f32;
        self.slider_track.x + (threshold as f32 / u8::MAX as f32 * span).round() as i32
    }

    /// Map a mouse press at (`px`, `py`) to the control under it.
    pub fn hit_test(&self, px: f32, py: f32) -> Option<ControlEvent> {
        let grab = Rect::new(
            self.slider_track.x - TRACK_GRAB as i32,
            self.slider_track.y - TRACK_GRAB as i32,
            self.slider_track.w + 2 * TRACK_GRAB as u32,
            self.slider_track.h + 2 * TRACK_GRAB as u32,
        );

        if grab.contains(px, py) {
            Some(ControlEvent::SetThreshold(self.threshold_at(px)))
        } else if self.radio_above.contains(px, py) {
            Some(ControlEvent::SetMode(ThresholdMode::Above))
        } else if self.radio_below.contains(px, py) {
            Some(ControlEvent::SetMode(ThresholdMode::Below))
        } else {
            None
        }
    }
}

/// Tracks the left mouse button across frames. A press that lands on the
/// slider keeps driving it until release, wherever the pointer wanders.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerCapture {
    held: bool,
    dragging_slider: bool,
}

impl PointerCapture {
    pub fn dragging_slider(&self) -> bool {
        self.dragging_slider
    }

    /// Feed one frame of mouse input.
    ///
    /// Parameters
    /// - `layout` - Geometry for the current window size
    /// - `pos` - Pointer position, if known
    /// - `down` - Whether the left button is held this frame
    ///
    /// Returns
    /// - The control event this frame produces, if any
    pub fn update(
        &mut self,
        layout: &PanelLayout,
        pos: Option<(f32, f32)>,
        down: bool,
    ) -> Option<ControlEvent> {
        if !down {
            self.held = false;
            self.dragging_slider = false;
            return None;
        }

        let new_press = !self.held;
        self.held = true;
        let (px, py) = pos?;

        if self.dragging_slider {
            return Some(ControlEvent::SetThreshold(layout.threshold_at(px)));
        }
        if !new_press {
            return None;
        }

        let event = layout.hit_test(px, py)?;
        self.dragging_slider = matches!(event, ControlEvent::SetThreshold(_));
        Some(event)
    }
}

/// Keyboard bindings for the threshold and mode controls.
pub fn key_event(key: Key) -> Option<ControlEvent> {
    match key {
        Key::Left | Key::Down => Some(ControlEvent::Nudge(-1)),
        Key::Right | Key::Up => Some(ControlEvent::Nudge(1)),
        Key::PageDown => Some(ControlEvent::Nudge(-10)),
        Key::PageUp => Some(ControlEvent::Nudge(10)),
        Key::Home => Some(ControlEvent::SetThreshold(0)),
        Key::End => Some(ControlEvent::SetThreshold(u8::MAX)),
        Key::A => Some(ControlEvent::SetMode(ThresholdMode::Above)),
        Key::B => Some(ControlEvent::SetMode(ThresholdMode::Below)),
        Key::Tab | Key::M => Some(ControlEvent::ToggleMode),
        _ => None,
    }
}
