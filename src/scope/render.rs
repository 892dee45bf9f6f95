/*
    CRT-style oscilloscope frame.

    Every frame repaints from scratch in a fixed order: an opaque
    background wash followed by a translucent black pass (a leftover from
    a persistence-trail effect; the opaque wash underneath means it only
    deepens the background, and the look depends on it), then the
    engineering grid, a center baseline, the glowing waveform trace,
    horizontal scanlines, a vignette, and finally the frequency readout.

    The trace is the only element passed through barrel distortion. The
    grid stays rectilinear, which is what sells the "curved glass over a
    flat reticle" look of an analog scope.
*/

use crate::scope::surface::{Glow, Path, Point, Rgba, StrokeStyle, Surface, TextAlign};

/// Colors and proportions of the scope face.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeTheme {
    pub background: Rgba,
    /// Trace, glow and readout color.
    pub accent: Rgba,
    pub trail: Rgba,
    pub grid: Rgba,
    pub baseline: Rgba,
    pub scanline: Rgba,
    pub scanline_spacing: f32,
    pub vignette_alpha: f32,
    /// Vertical divisions of the reticle; horizontal count follows from
    /// the aspect ratio so cells stay square.
    pub divisions: u32,
    pub trace_width: f32,
    pub glow_blur: f32,
    /// Barrel distortion strength applied to the trace.
    pub distortion: f32,
}

impl Default for ScopeTheme {
    fn default() -> Self {
        Self {
            background: Rgba::opaque(0x11, 0x22, 0x22),
            accent: Rgba::opaque(0x00, 0xff, 0xff),
            trail: Rgba::new(0, 0, 0, 0.1),
            grid: Rgba::opaque(0, 0, 0),
            baseline: Rgba::new(100, 100, 100, 0.5),
            scanline: Rgba::new(0, 0, 0, 0.3),
            scanline_spacing: 3.0,
            vignette_alpha: 0.4,
            divisions: 8,
            trace_width: 3.0,
            glow_blur: 15.0,
            distortion: 0.1,
        }
    }
}

/// Push a point away from the surface center, more the farther out it
/// already is. `strength` zero is the identity; the center never moves.
pub fn barrel_distort(p: Point, width: f32, height: f32, strength: f32) -> Point {
    let cx = width / 2.0;
    let cy = height / 2.0;
    let nx = (p.x - cx) / cx;
    let ny = (p.y - cy) / cy;
    let r2 = nx * nx + ny * ny;
    let factor = 1.0 + strength * r2;
    Point::new(nx * factor * cx + cx, ny * factor * cy + cy)
}

/// Draws one complete scope frame from a byte waveform.
#[derive(Debug, Default)]
pub struct ScopeRenderer {
    theme: ScopeTheme,
}

impl ScopeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: ScopeTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &ScopeTheme {
        &self.theme
    }

    /// Paint a full frame. `samples` are unsigned bytes centered on 128;
    /// only the first eighth of them is traced, which at audio rates shows
    /// a handful of cycles instead of a smear. `frequency` is the readout
    /// value; `None` renders the idle placeholder.
    pub fn render<S: Surface>(&self, samples: &[u8], frequency: Option<f32>, surface: &mut S) {
        let w = surface.width();
        let h = surface.height();
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        surface.fill_rect(0.0, 0.0, w, h, self.theme.background);
        surface.fill_rect(0.0, 0.0, w, h, self.theme.trail);

        self.draw_grid(surface, w, h);

        // Reference line for the zero crossing, over the grid.
        surface.stroke_line(
            Point::new(0.0, h / 2.0),
            Point::new(w, h / 2.0),
            StrokeStyle::thin(self.theme.baseline, 1.0),
        );

        self.draw_trace(surface, samples, w, h);
        self.draw_scanlines(surface, w, h);

        surface.fill_radial_gradient(
            w / 2.0,
            h / 2.0,
            w / 4.0,
            w * 0.7,
            Rgba::TRANSPARENT,
            Rgba::new(0, 0, 0, self.theme.vignette_alpha),
        );

        self.draw_readout(surface, frequency, w, h);
    }

    fn draw_grid<S: Surface>(&self, surface: &mut S, w: f32, h: f32) {
        let divisions = self.theme.divisions;
        if divisions == 0 {
            return;
        }
        let style = StrokeStyle::thin(self.theme.grid, 0.5);
        let div_height = h / divisions as f32;
        let horizontal_divisions = ((w / div_height).floor() as u32).max(1);

        // Horizontal rules, each carrying minor tick marks. Ticks that
        // would land on a major vertical line are dropped, except at the
        // two edges.
        for i in 0..=divisions {
            let y = h * i as f32 / divisions as f32;
            surface.stroke_line(Point::new(0.0, y), Point::new(w, y), style);

            let subdivisions = horizontal_divisions * 4;
            let tick_spacing = w / subdivisions as f32;
            for j in 0..=subdivisions {
                if j % 4 == 0 && j != 0 && j != subdivisions {
                    continue;
                }
                let x = tick_spacing * j as f32;
                surface.stroke_line(Point::new(x, y - 2.0), Point::new(x, y + 2.0), style);
            }
        }

        // Vertical rules with their own ticks.
        let grid_unit_width = w / horizontal_divisions as f32;
        for i in 0..=horizontal_divisions {
            let x = grid_unit_width * i as f32;
            surface.stroke_line(Point::new(x, 0.0), Point::new(x, h), style);

            let subdivisions = divisions * 4;
            let tick_spacing = h / subdivisions as f32;
            for j in 0..=subdivisions {
                if j % 4 == 0 && j != 0 && j != subdivisions {
                    continue;
                }
                let y = tick_spacing * j as f32;
                surface.stroke_line(Point::new(x - 2.0, y), Point::new(x + 2.0, y), style);
            }
        }

        // Center crosshair, slightly heavier.
        let crosshair = StrokeStyle::thin(self.theme.grid, 1.0);
        surface.stroke_line(Point::new(0.0, h / 2.0), Point::new(w, h / 2.0), crosshair);
        surface.stroke_line(Point::new(w / 2.0, 0.0), Point::new(w / 2.0, h), crosshair);
    }

    fn draw_trace<S: Surface>(&self, surface: &mut S, samples: &[u8], w: f32, h: f32) {
        let display_length = samples.len() / 8;
        if display_length < 3 {
            return;
        }
        let slice_width = w / display_length as f32;
        let trace_y = |byte: u8| byte as f32 / 128.0 * h / 2.0;
        let distort = |x: f32, y: f32| barrel_distort(Point::new(x, y), w, h, self.theme.distortion);

        let mut x = 0.0f32;
        let mut y = trace_y(samples[0]);

        let mut path = Path::new();
        path.move_to(distort(x, y));

        // Each segment curves toward the sample after next; the control
        // point reuses the previous y, which rounds the trace at the cost
        // of trailing the data by one sample.
        for i in 1..display_length - 2 {
            let xc = (x + slice_width + x + slice_width * 2.0) / 2.0;
            let yc = trace_y(samples[i + 1]);
            path.quad_to(distort(x + slice_width, y), distort(xc, yc));

            x += slice_width;
            y = trace_y(samples[i]);
        }

        let y_last = trace_y(samples[display_length - 1]);
        path.quad_to(distort(x + slice_width, y), distort(w, y_last));

        surface.stroke_path(
            &path,
            StrokeStyle {
                color: self.theme.accent,
                width: self.theme.trace_width,
                glow: Some(Glow {
                    color: self.theme.accent,
                    blur: self.theme.glow_blur,
                }),
            },
        );
    }

    fn draw_scanlines<S: Surface>(&self, surface: &mut S, w: f32, h: f32) {
        let style = StrokeStyle::thin(self.theme.scanline, 1.0);
        let mut y = 0.0;
        while y < h {
            surface.stroke_line(Point::new(0.0, y), Point::new(w, y), style);
            y += self.theme.scanline_spacing;
        }
    }

    fn draw_readout<S: Surface>(&self, surface: &mut S, frequency: Option<f32>, w: f32, h: f32) {
        let text = match frequency {
            Some(hz) => format!("{hz:.2} Hz"),
            None => "--- Hz".to_string(),
        };
        surface.draw_text(&text, w - 10.0, h - 10.0, TextAlign::Right, self.theme.accent);
    }
}
