//! The drawing surface the renderer targets.
//!
//! The scope never rasterizes pixels itself; it issues fills, stroked
//! paths, one radial gradient and one line of text per frame against this
//! trait. The demo binary backs it with a terminal pixel canvas; tests use
//! a recording surface and assert on the issued operations.

/// An RGB color with a 0..=1 alpha, the way canvas-style hosts take it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One drawing command of a stroked path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic curve from the current point.
    QuadTo { control: Point, to: Point },
}

/// A polyline/curve chain built command by command, stroked as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cmds: Vec<PathCmd>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.cmds.push(PathCmd::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.cmds.push(PathCmd::LineTo(p));
        self
    }

    pub fn quad_to(&mut self, control: Point, to: Point) -> &mut Self {
        self.cmds.push(PathCmd::QuadTo { control, to });
        self
    }

    pub fn commands(&self) -> &[PathCmd] {
        &self.cmds
    }
}

/// Glow halo rendered behind a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgba,
    pub blur: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f32,
    pub glow: Option<Glow>,
}

impl StrokeStyle {
    pub const fn thin(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            glow: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// A 2D raster target.
///
/// `width`/`height` are re-read every frame, which is how host resizes
/// reach the renderer.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Fill a rectangle, alpha-blending over what is already there.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);

    /// Radial gradient fill over the whole surface: `inner` at
    /// `inner_radius` from the center point fading to `outer` at
    /// `outer_radius` and beyond.
    fn fill_radial_gradient(
        &mut self,
        cx: f32,
        cy: f32,
        inner_radius: f32,
        outer_radius: f32,
        inner: Rgba,
        outer: Rgba,
    );

    fn stroke_path(&mut self, path: &Path, style: StrokeStyle);

    /// Single text run anchored at (x, y).
    fn draw_text(&mut self, text: &str, x: f32, y: f32, align: TextAlign, color: Rgba);

    /// Convenience for the many single-segment strokes the grid issues.
    fn stroke_line(&mut self, from: Point, to: Point, style: StrokeStyle) {
        let mut path = Path::new();
        path.move_to(from).line_to(to);
        self.stroke_path(&path, style);
    }
}
