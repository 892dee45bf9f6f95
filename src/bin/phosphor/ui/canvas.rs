//! Half-block pixel canvas.
//!
//! Backs the scope's [`Surface`] with an RGB framebuffer at twice the cell
//! height: every terminal cell shows two vertically stacked pixels through
//! the upper-half-block glyph, foreground for the top pixel and background
//! for the bottom one. Cells are roughly twice as tall as they are wide,
//! so the resulting pixels come out close to square.
//!
//! Text is kept out of the framebuffer and overlaid at cell resolution
//! when the canvas is rendered into the terminal buffer.

use phosphor_synth::scope::{Path, PathCmd, Point, Rgba, StrokeStyle, Surface, TextAlign};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

/// Line segments each quadratic curve is flattened into.
const CURVE_SEGMENTS: usize = 16;

pub struct PixelCanvas {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 3]>,
    /// Per-stroke coverage mask so one stroke blends each pixel once.
    mask: Vec<bool>,
    texts: Vec<TextRun>,
}

struct TextRun {
    text: String,
    x: f32,
    y: f32,
    align: TextAlign,
    color: Rgba,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize, clear: Rgba) -> Self {
        let mut canvas = Self {
            width,
            height,
            pixels: vec![[0.0; 3]; width * height],
            mask: vec![false; width * height],
            texts: Vec::new(),
        };
        canvas.clear(clear);
        canvas
    }

    /// Match the canvas to `width` x `height` pixels. A size change clears
    /// to `clear`; the same size keeps the current frame.
    pub fn ensure_size(&mut self, width: usize, height: usize, clear: Rgba) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![[0.0; 3]; width * height];
        self.mask = vec![false; width * height];
        self.clear(clear);
    }

    /// Set every pixel and drop any text overlay.
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(channels(color));
        self.texts.clear();
    }

    fn cell_color(&self, x: usize, y: usize) -> Color {
        let [r, g, b] = self.pixels[y * self.width + x];
        Color::Rgb(to_byte(r), to_byte(g), to_byte(b))
    }

    fn plot(&mut self, x: f32, y: f32, color: Rgba) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let px = x.round();
        let py = y.round();
        if px < 0.0 || py < 0.0 || px >= self.width as f32 || py >= self.height as f32 {
            return;
        }
        let idx = py as usize * self.width + px as usize;
        if self.mask[idx] {
            return;
        }
        self.mask[idx] = true;
        blend(&mut self.pixels[idx], color);
    }

    /// Filled disc for strokes wider than one pixel.
    fn stamp(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        let x0 = (cx - radius).floor();
        let x1 = (cx + radius).ceil();
        let y0 = (cy - radius).floor();
        let y1 = (cy + radius).ceil();
        let r2 = radius * radius;

        let mut y = y0;
        while y <= y1 {
            let mut x = x0;
            while x <= x1 {
                let dx = x - cx;
                let dy = y - cy;
                if dx * dx + dy * dy <= r2 {
                    self.plot(x, y, color);
                }
                x += 1.0;
            }
            y += 1.0;
        }
    }

    fn stroke_segment(&mut self, a: Point, b: Point, width: f32, color: Rgba) {
        if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
            return;
        }
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let steps = (dx.abs().max(dy.abs()).ceil() as usize).max(1);

        if width <= 1.0 {
            // Single-pixel line; sub-pixel widths thin out via coverage.
            let color = color.with_alpha(color.a * width.clamp(0.0, 1.0));
            for s in 0..=steps {
                let t = s as f32 / steps as f32;
                self.plot(a.x + dx * t, a.y + dy * t, color);
            }
        } else {
            let radius = width / 2.0;
            for s in 0..=steps {
                let t = s as f32 / steps as f32;
                self.stamp(a.x + dx * t, a.y + dy * t, radius, color);
            }
        }
    }

    /// One pass over a command list. The coverage mask is reset per pass,
    /// so a translucent stroke reads as one even layer no matter how its
    /// segments overlap.
    fn stroke_pass(&mut self, cmds: &[PathCmd], width: f32, color: Rgba) {
        self.mask.fill(false);
        let mut cursor = Point::new(0.0, 0.0);
        for cmd in cmds {
            match *cmd {
                PathCmd::MoveTo(p) => cursor = p,
                PathCmd::LineTo(p) => {
                    self.stroke_segment(cursor, p, width, color);
                    cursor = p;
                }
                PathCmd::QuadTo { control, to } => {
                    let mut from = cursor;
                    for s in 1..=CURVE_SEGMENTS {
                        let t = s as f32 / CURVE_SEGMENTS as f32;
                        let p = quad_point(cursor, control, to, t);
                        self.stroke_segment(from, p, width, color);
                        from = p;
                    }
                    cursor = to;
                }
            }
        }
    }
}

impl Surface for PixelCanvas {
    fn width(&self) -> f32 {
        self.width as f32
    }

    fn height(&self) -> f32 {
        self.height as f32
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if ![x, y, w, h].iter().all(|v| v.is_finite()) {
            return;
        }
        // An opaque fill of the whole surface starts a fresh frame.
        if x <= 0.0 && y <= 0.0 && w >= self.width as f32 && h >= self.height as f32 && color.a >= 1.0
        {
            self.clear(color);
            return;
        }
        let x0 = x.max(0.0) as usize;
        let y0 = y.max(0.0) as usize;
        let x1 = (((x + w).ceil()).max(0.0) as usize).min(self.width);
        let y1 = (((y + h).ceil()).max(0.0) as usize).min(self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                blend(&mut self.pixels[py * self.width + px], color);
            }
        }
    }

    fn fill_radial_gradient(
        &mut self,
        cx: f32,
        cy: f32,
        inner_radius: f32,
        outer_radius: f32,
        inner: Rgba,
        outer: Rgba,
    ) {
        let span = (outer_radius - inner_radius).max(f32::EPSILON);
        for py in 0..self.height {
            for px in 0..self.width {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let t = (((dx * dx + dy * dy).sqrt() - inner_radius) / span).clamp(0.0, 1.0);
                blend(
                    &mut self.pixels[py * self.width + px],
                    lerp_rgba(inner, outer, t),
                );
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, style: StrokeStyle) {
        // Shadow blur reads as two soft halo passes under the core stroke,
        // scaled down to cell resolution.
        if let Some(glow) = style.glow {
            self.stroke_pass(
                path.commands(),
                style.width + glow.blur * 0.4,
                glow.color.with_alpha(glow.color.a * 0.06),
            );
            self.stroke_pass(
                path.commands(),
                style.width + glow.blur * 0.15,
                glow.color.with_alpha(glow.color.a * 0.15),
            );
        }
        self.stroke_pass(path.commands(), style.width, style.color);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, align: TextAlign, color: Rgba) {
        self.texts.push(TextRun {
            text: text.to_string(),
            x,
            y,
            align,
            color,
        });
    }
}

impl Widget for &PixelCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            let top = row as usize * 2;
            let bottom = top + 1;
            for col in 0..area.width {
                let x = col as usize;
                if x >= self.width || top >= self.height {
                    continue;
                }
                let fg = self.cell_color(x, top);
                let bg = if bottom < self.height {
                    self.cell_color(x, bottom)
                } else {
                    fg
                };
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol("▀");
                    cell.set_fg(fg);
                    cell.set_bg(bg);
                }
            }
        }

        for run in &self.texts {
            if !run.x.is_finite() || !run.y.is_finite() {
                continue;
            }
            let row = (run.y / 2.0).round();
            if row < 0.0 || row >= area.height as f32 {
                continue;
            }
            let row = area.y + row as u16;

            let len = run.text.chars().count() as i64;
            let start = match run.align {
                TextAlign::Left => run.x.round() as i64,
                TextAlign::Right => run.x.round() as i64 - len,
            };
            let fg = Color::Rgb(run.color.r, run.color.g, run.color.b);
            for (i, ch) in run.text.chars().enumerate() {
                let col = start + i as i64;
                if col < 0 || col >= area.width as i64 {
                    continue;
                }
                if let Some(cell) = buf.cell_mut((area.x + col as u16, row)) {
                    cell.set_char(ch);
                    cell.set_fg(fg);
                }
            }
        }
    }
}

fn channels(color: Rgba) -> [f32; 3] {
    [
        color.r as f32 / 255.0,
        color.g as f32 / 255.0,
        color.b as f32 / 255.0,
    ]
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Source-over blend of `color` onto an opaque destination pixel.
fn blend(dst: &mut [f32; 3], color: Rgba) {
    let a = color.a.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    for (d, s) in dst.iter_mut().zip(channels(color)) {
        *d += (s - *d) * a;
    }
}

fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgba::new(
        lerp(a.r, b.r),
        lerp(a.g, b.g),
        lerp(a.b, b.b),
        a.a + (b.a - a.a) * t,
    )
}

fn quad_point(from: Point, control: Point, to: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
        u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
    )
}
