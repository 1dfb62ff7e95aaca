/// Draws the session panel and runs the interactive window loop

use image::{
    RgbImage,
    imageops::{self, FilterType},
};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use plotters::{coord::Shift, prelude::*};
use screen_size::get_primary_screen_size as get_screen_size;
use tracing::{debug, info};

use crate::{
    analysis::ThresholdMode,
    error::{Error, Result},
    session::{
        InteractiveSession,
        controls::{CONTROL_HEIGHT, PanelLayout, PointerCapture, Rect, key_event},
    },
};

pub const WINDOW_TITLE: &str = "MRI Fat Analysis – L3-L4 Region";
const CAPTION: &str = "Red pixels represent potential fat infiltration based on threshold.";
const SLIDER_LABEL: &str = "Grayscale Threshold (Fat cutoff)";

/// Screen size assumed when the primary screen cannot be queried
const FALLBACK_SCREEN: (usize, usize) = (960, 720);

const FONT: &str = "sans-serif";
const PANEL_BG: RGBColor = RGBColor(245, 245, 245);
const TRACK: RGBColor = RGBColor(200, 200, 200);
const ACCENT: RGBColor = RGBColor(31, 119, 180);

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn render_err<E: std::fmt::Display>(err: E) -> Error {
    Error::Render(err.to_string())
}

/// Pack an RGB byte canvas into the `0RGB` words minifb expects.
pub fn pack_rgb(canvas: &[u8]) -> Vec<u32> {
    canvas
        .chunks_exact(3)
        .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | (px[2] as u32))
        .collect()
}

/// Copy `highlighted`, scaled to `target`, into an RGB canvas of `canvas_w` pixels per row.
fn blit_image(canvas: &mut [u8], canvas_w: usize, highlighted: &RgbImage, target: &Rect) {
    let scaled = imageops::resize(highlighted, target.w, target.h, FilterType::Nearest);
    let row_bytes = target.w as usize * 3;

    for (y, row) in scaled.as_raw().chunks_exact(row_bytes).enumerate() {
        let start = ((target.y as usize + y) * canvas_w + target.x as usize) * 3;
        if let Some(dst) = canvas.get_mut(start..start + row_bytes) {
            dst.copy_from_slice(row);
        }
    }
}

fn draw_legend(root: &Panel<'_>, image: &Rect) -> Result<()> {
    let (x, y) = (image.x + 8, image.y + 8);

    root.draw(&Rectangle::new([(x, y), (x + 78, y + 22)], WHITE.filled()))
        .map_err(render_err)?;
    root.draw(&Rectangle::new(
        [(x, y), (x + 78, y + 22)],
        ShapeStyle::from(&RGBColor(128, 128, 128)).stroke_width(1),
    ))
    .map_err(render_err)?;
    root.draw_text("Fat pixels", &(FONT, 14).into_font().color(&RED), (x + 6, y + 4))
        .map_err(render_err)?;

    Ok(())
}

fn draw_slider(root: &Panel<'_>, layout: &PanelLayout, threshold: u8) -> Result<()> {
    let track = &layout.slider_track;
    let label = (FONT, 13).into_font().color(&BLACK);

    root.draw_text(SLIDER_LABEL, &label, (track.x, track.y - 20))
        .map_err(render_err)?;
    root.draw(&Rectangle::new(
        [(track.x, track.y), (track.right(), track.bottom())],
        TRACK.filled(),
    ))
    .map_err(render_err)?;

    let knob = layout.knob_x(threshold);
    root.draw(&Rectangle::new(
        [(track.x, track.y), (knob, track.bottom())],
        ACCENT.filled(),
    ))
    .map_err(render_err)?;
    root.draw(&Circle::new(
        (knob, track.y + track.h as i32 / 2),
        7,
        ACCENT.filled(),
    ))
    .map_err(render_err)?;
    root.draw_text(&threshold.to_string(), &label, (track.right() + 10, track.y - 4))
        .map_err(render_err)?;

    Ok(())
}

fn draw_swatch(root: &Panel<'_>, swatch: &Rect, color: [u8; 3]) -> Result<()> {
    root.draw_text(
        "Threshold Color",
        &(FONT, 11).into_font().color(&BLACK),
        (swatch.x - 10, swatch.y - 16),
    )
    .map_err(render_err)?;
    root.draw(&Rectangle::new(
        [(swatch.x, swatch.y), (swatch.right(), swatch.bottom())],
        RGBColor(color[0], color[1], color[2]).filled(),
    ))
    .map_err(render_err)?;

    Ok(())
}

fn draw_mode_selector(root: &Panel<'_>, layout: &PanelLayout, mode: ThresholdMode) -> Result<()> {
    let text = (FONT, 13).into_font().color(&BLACK);

    root.draw_text(
        "Fat if pixel is...",
        &text,
        (layout.radio_above.x, layout.radio_above.y - 18),
    )
    .map_err(render_err)?;

    for (rect, option) in [
        (&layout.radio_above, ThresholdMode::Above),
        (&layout.radio_below, ThresholdMode::Below),
    ] {
        let center = (rect.x + 10, rect.y + rect.h as i32 / 2);

        root.draw(&Circle::new(center, 6, ShapeStyle::from(&BLACK).stroke_width(1)))
            .map_err(render_err)?;
        if option == mode {
            root.draw(&Circle::new(center, 4, ACCENT.filled()))
                .map_err(render_err)?;
        }
        root.draw_text(&option.to_string(), &text, (rect.x + 22, rect.y + 3))
            .map_err(render_err)?;
    }

    Ok(())
}

/// Render the whole panel for the session's current state.
///
/// Parameters
/// - `session` - The session whose result and state are shown
/// - `layout` - Geometry for the current window size
///
/// Returns
/// - One `0RGB` word per window pixel, row-major
pub fn render_panel(session: &InteractiveSession, layout: &PanelLayout) -> Result<Vec<u32>> {
    let (w, h) = (layout.width, layout.height);
    let mut canvas = vec![255u8; w * h * 3];

    blit_image(&mut canvas, w, &session.result().highlighted, &layout.image);

    {
        let root = BitMapBackend::with_buffer(&mut canvas, (w as u32, h as u32)).into_drawing_area();
        let strip_y = h.saturating_sub(CONTROL_HEIGHT) as i32;

        root.draw(&Rectangle::new(
            [(0, strip_y), (w as i32, h as i32)],
            PANEL_BG.filled(),
        ))
        .map_err(render_err)?;

        draw_legend(&root, &layout.image)?;

        root.draw_text(
            &session.status_line(),
            &(FONT, 15).into_font().color(&BLACK),
            layout.status,
        )
        .map_err(render_err)?;
        root.draw_text(
            CAPTION,
            &(FONT, 12).into_font().color(&RGBColor(90, 90, 90)),
            layout.caption,
        )
        .map_err(render_err)?;

        draw_slider(&root, layout, session.state().threshold)?;
        draw_swatch(&root, &layout.swatch, session.swatch_color())?;
        draw_mode_selector(&root, layout, session.state().mode)?;

        root.present().map_err(render_err)?;
    }

    Ok(pack_rgb(&canvas))
}

/// Half the screen width, with the height following the image aspect but
/// never taller than the screen.
pub fn initial_window_size(screen: (usize, usize), image: (usize, usize)) -> (usize, usize) {
    let (screen_w, screen_h) = screen;
    let init_w = (screen_w / 2).max(1);
    let aspect = image.1.max(1) as f32 / image.0.max(1) as f32;
    let init_h = (init_w as f32 * aspect) as usize + CONTROL_HEIGHT;

    (init_w, init_h.min(screen_h.max(CONTROL_HEIGHT + 1)))
}

/// Open the analysis window and run until it is closed. Every key press or
/// click is applied to the session and repainted before the next input is
/// read.
pub fn run(mut session: InteractiveSession) -> Result<()> {
    let (img_w, img_h) = session.dimensions();

    let screen = get_screen_size()
        .map(|(w, h)| (w as usize, h as usize))
        .unwrap_or(FALLBACK_SCREEN);
    let (init_w, init_h) = initial_window_size(screen, (img_w, img_h));

    let mut window = Window::new(
        WINDOW_TITLE,
        init_w,
        init_h,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    info!("Opened {}x{} analysis window", init_w, init_h);

    let mut layout = PanelLayout::new(init_w, init_h, (img_w, img_h));
    let mut buffer = render_panel(&session, &layout)?;
    let mut pointer = PointerCapture::default();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let mut dirty = false;

        // get current window size
        let (win_w, win_h) = window.get_size();
        if (win_w, win_h) != (layout.width, layout.height) && win_w > 0 && win_h > 0 {
            layout = PanelLayout::new(win_w, win_h, (img_w, img_h));
            dirty = true;
        }

        for key in window.get_keys_pressed(KeyRepeat::Yes) {
            if let Some(event) = key_event(key) {
                session.apply(event);
                dirty = true;
            }
        }

        let mode = if pointer.dragging_slider() {
            MouseMode::Clamp
        } else {
            MouseMode::Discard
        };
        let down = window.get_mouse_down(MouseButton::Left);
        if let Some(event) = pointer.update(&layout, window.get_mouse_pos(mode), down) {
            // a held drag re-reports the same value every frame
            let before = *session.state();
            if event.applied_to(&before) != before {
                session.apply(event);
                debug!("Mouse moved controls to {:?}", session.state());
                dirty = true;
            }
        }

        if dirty {
            buffer = render_panel(&session, &layout)?;
        }

        window.update_with_buffer(&buffer, layout.width, layout.height)?;
    }

    info!("Analysis window closed");
    Ok(())
}
