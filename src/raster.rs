//! Software canvas that paints onto an [`RgbaImage`]. Used for headless
//! snapshots of the view.
//!
//! Content surfaces are composited with `image`. Lines and arrows go through
//! a `vello_cpu` render context; its premultiplied output is blended onto the
//! target before the next surface is drawn, so paint order is kept.

use crate::canvas::{rounded_corners, ArrowPaint, ArrowStyle, Canvas};
use crate::geometry::{ArrowPath, Point, Rect, Side};
use crate::options::Color;
use image::{imageops, Pixel, Rgba, RgbaImage};
use log::{debug, trace};
use vello_cpu::kurbo::{self, BezPath, Shape, Stroke};
use vello_cpu::{peniko, Pixmap, RenderContext};

pub struct RasterCanvas {
    target: RgbaImage,
    /// `None` when the target is empty or too large for the vector backend.
    ctx: Option<RenderContext>,
    pending: bool,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let ctx = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Some(RenderContext::new(w, h)),
            _ => {
                debug!("No vector layer for a {}x{} canvas", width, height);
                None
            }
        };
        Self {
            target: RgbaImage::from_pixel(width, height, Rgba(background.to_rgba())),
            ctx,
            pending: false,
        }
    }

    pub fn image(&mut self) -> &RgbaImage {
        self.flush();
        &self.target
    }

    pub fn into_image(mut self) -> RgbaImage {
        self.flush();
        self.target
    }

    fn bounds(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.target.width()),
            f64::from(self.target.height()),
        )
    }

    /// The vector context with `color` as its paint.
    fn vectors(&mut self, color: Color) -> Option<&mut RenderContext> {
        let ctx = self.ctx.as_mut()?;
        let [r, g, b, a] = color.to_rgba();
        ctx.set_paint(peniko::Color::from_rgba8(r, g, b, a));
        self.pending = true;
        Some(ctx)
    }

    /// Blends everything drawn through the vector context onto the target.
    fn flush(&mut self) {
        if !std::mem::take(&mut self.pending) {
            return;
        }
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        ctx.flush();
        let mut layer = Pixmap::new(ctx.width(), ctx.height());
        ctx.render_to_pixmap(&mut layer);
        ctx.reset();

        let width = usize::from(layer.width());
        for (i, px) in layer.data_as_u8_slice().chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let (x, y) = ((i % width) as u32, (i / width) as u32);
            self.target.get_pixel_mut(x, y).blend(&unpremultiply(px));
        }
    }
}

impl Canvas for RasterCanvas {
    type Surface = RgbaImage;

    fn draw_surface(&mut self, side: Side, surface: &RgbaImage, clip: Option<Rect>) {
        self.flush();
        let surface_bounds = kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(surface.width()),
            f64::from(surface.height()),
        );
        let mut area = self.bounds().intersect(surface_bounds);
        if let Some(clip) = clip {
            area = area.intersect(to_kurbo(clip));
        }
        if area.width() <= 0.0 || area.height() <= 0.0 {
            trace!("Raster surface {:?} fully clipped", side);
            return;
        }
        trace!("Raster surface {:?} in {:?}", side, area);

        let (x, y) = (area.x0 as u32, area.y0 as u32);
        let visible =
            imageops::crop_imm(surface, x, y, area.width() as u32, area.height() as u32).to_image();
        imageops::overlay(&mut self.target, &visible, i64::from(x), i64::from(y));
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        let Some(ctx) = self.vectors(color) else {
            return;
        };
        let width = f64::from(width.max(1.0));
        if from.x == to.x {
            let x = f64::from(from.x);
            ctx.fill_rect(&kurbo::Rect::new(
                x - width / 2.0,
                f64::from(from.y.min(to.y)),
                x + width / 2.0,
                f64::from(from.y.max(to.y)),
            ));
        } else {
            let line = kurbo::Line::new(to_kurbo_point(from), to_kurbo_point(to));
            ctx.set_stroke(Stroke::new(width).with_caps(kurbo::Cap::Butt));
            ctx.stroke_path(&line.to_path(0.1));
        }
    }

    fn draw_arrow(&mut self, _side: Side, arrow: &ArrowPath, paint: &ArrowPaint) {
        let outline = arrow_outline(arrow, paint.corner_radius);
        let Some(ctx) = self.vectors(paint.color) else {
            return;
        };
        match paint.style {
            ArrowStyle::Fill => ctx.fill_path(&outline),
            ArrowStyle::Stroke { width } => {
                ctx.set_stroke(Stroke::new(f64::from(width)));
                ctx.stroke_path(&outline);
            }
        }
    }

    fn draw_text(&mut self, side: Side, text: &str, origin: Point, _color: Color, _size: f32) {
        // Glyph rasterization is left to real text backends.
        trace!("Skipping {:?} label {:?} at {:?}", side, text, origin);
    }
}

/// Closed arrow outline with each corner replaced by a quadratic curve.
fn arrow_outline(arrow: &ArrowPath, radius: f32) -> BezPath {
    let corners = rounded_corners(arrow, radius);
    let point = |[x, y]: [f32; 2]| kurbo::Point::new(f64::from(x), f64::from(y));

    let mut path = BezPath::new();
    path.move_to(point(corners[0].exit));
    for corner in corners[1..].iter().chain(&corners[..1]) {
        path.line_to(point(corner.entry));
        if !corner.is_sharp() {
            path.quad_to(point(corner.apex), point(corner.exit));
        }
    }
    path.close_path();
    path
}

fn to_kurbo(rect: Rect) -> kurbo::Rect {
    kurbo::Rect::new(
        f64::from(rect.left),
        f64::from(rect.top),
        f64::from(rect.right),
        f64::from(rect.bottom),
    )
}

fn to_kurbo_point(point: Point) -> kurbo::Point {
    kurbo::Point::new(f64::from(point.x), f64::from(point.y))
}

fn unpremultiply(px: &[u8]) -> Rgba<u8> {
    let alpha = u16::from(px[3]);
    let channel = |c: u8| ((u16::from(c) * 255 + alpha / 2) / alpha).min(255) as u8;
    Rgba([channel(px[0]), channel(px[1]), channel(px[2]), px[3]])
}
