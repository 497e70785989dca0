//! Drawing backend contract for [`DelimiterSurface::render`](crate::DelimiterSurface::render),
//! plus a canvas that records what was drawn.

use crate::geometry::{ArrowPath, Point, Rect, Side};
use crate::options::Color;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrowStyle {
    Fill,
    Stroke { width: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowPaint {
    pub color: Color,
    pub style: ArrowStyle,
    /// Radius used to round the triangle's corners. Zero keeps them sharp.
    pub corner_radius: f32,
}

/// One corner of an arrow outline after rounding. The outline arrives at
/// `entry`, bends toward `apex` along a quadratic curve and leaves from `exit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedCorner {
    pub entry: [f32; 2],
    pub apex: [f32; 2],
    pub exit: [f32; 2],
}

impl RoundedCorner {
    pub fn is_sharp(&self) -> bool {
        self.entry == self.apex && self.exit == self.apex
    }

    /// Point on the corner curve, `t` running from `entry` (0) to `exit` (1).
    pub fn at(&self, t: f32) -> [f32; 2] {
        let u = 1.0 - t;
        std::array::from_fn(|i| {
            u * u * self.entry[i] + 2.0 * u * t * self.apex[i] + t * t * self.exit[i]
        })
    }
}

/// Rounds every corner of `arrow` by cutting `radius` off both adjacent
/// edges. The cut never exceeds half an edge.
pub fn rounded_corners(arrow: &ArrowPath, radius: f32) -> [RoundedCorner; 3] {
    let points = arrow.points.map(|p| [p.x as f32, p.y as f32]);
    std::array::from_fn(|i| {
        let apex = points[i];
        RoundedCorner {
            entry: toward(apex, points[(i + 2) % 3], radius),
            apex,
            exit: toward(apex, points[(i + 1) % 3], radius),
        }
    })
}

fn toward(from: [f32; 2], to: [f32; 2], distance: f32) -> [f32; 2] {
    let (dx, dy) = (to[0] - from[0], to[1] - from[1]);
    let length = dx.hypot(dy);
    if distance.is_nan() || distance <= 0.0 || length == 0.0 {
        return from;
    }
    let t = distance.min(length / 2.0) / length;
    [from[0] + dx * t, from[1] + dy * t]
}

/// Something the view can paint onto. Coordinates are view pixels with the
/// origin at the top-left corner.
pub trait Canvas {
    type Surface;

    /// Draws a content surface over the full view bounds, restricted to `clip`
    /// when given.
    fn draw_surface(&mut self, side: Side, surface: &Self::Surface, clip: Option<Rect>);

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32);

    fn draw_arrow(&mut self, side: Side, arrow: &ArrowPath, paint: &ArrowPaint);

    /// `origin` is the start of the text baseline.
    fn draw_text(&mut self, side: Side, text: &str, origin: Point, color: Color, size: f32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Surface {
        side: Side,
        clip: Option<Rect>,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    Arrow {
        side: Side,
        path: ArrowPath,
        paint: ArrowPaint,
    },
    Text {
        side: Side,
        text: String,
        origin: Point,
        color: Color,
        size: f32,
    },
}

/// Records draw calls in order without rasterizing anything.
#[derive(Debug)]
pub struct RecordingCanvas<S> {
    pub commands: Vec<DrawCommand>,
    _surface: PhantomData<fn(&S)>,
}

impl<S> RecordingCanvas<S> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            _surface: PhantomData,
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn arrows(&self) -> impl Iterator<Item = (Side, &ArrowPath)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Arrow { side, path, .. } => Some((*side, path)),
            _ => None,
        })
    }

    pub fn surface(&self, side: Side) -> Option<Option<Rect>> {
        self.commands.iter().find_map(|cmd| match cmd {
            DrawCommand::Surface { side: s, clip } if *s == side => Some(*clip),
            _ => None,
        })
    }

    pub fn text(&self, side: Side) -> Option<(&str, Point)> {
        self.commands.iter().find_map(|cmd| match cmd {
            DrawCommand::Text {
                side: s,
                text,
                origin,
                ..
            } if *s == side => Some((text.as_str(), *origin)),
            _ => None,
        })
    }
}

impl<S> Default for RecordingCanvas<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Canvas for RecordingCanvas<S> {
    type Surface = S;

    fn draw_surface(&mut self, side: Side, _surface: &S, clip: Option<Rect>) {
        self.commands.push(DrawCommand::Surface { side, clip });
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn draw_arrow(&mut self, side: Side, arrow: &ArrowPath, paint: &ArrowPaint) {
        self.commands.push(DrawCommand::Arrow {
            side,
            path: *arrow,
            paint: *paint,
        });
    }

    fn draw_text(&mut self, side: Side, text: &str, origin: Point, color: Color, size: f32) {
        self.commands.push(DrawCommand::Text {
            side,
            text: text.to_string(),
            origin,
            color,
            size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_call_order() {
        let mut canvas: RecordingCanvas<()> = RecordingCanvas::new();
        canvas.draw_surface(Side::Left, &(), None);
        canvas.draw_line(Point::new(5, 0), Point::new(5, 10), Color::WHITE, 3.0);
        canvas.draw_surface(Side::Right, &(), Some(Rect::new(6, 0, 10, 10)));

        assert_eq!(canvas.commands.len(), 3);
        assert_eq!(canvas.surface(Side::Left), Some(None));
        assert_eq!(canvas.surface(Side::Right), Some(Some(Rect::new(6, 0, 10, 10))));
        assert_eq!(canvas.arrows().count(), 0);

        canvas.clear();
        assert!(canvas.commands.is_empty());
    }

    fn arrow() -> ArrowPath {
        ArrowPath {
            points: [Point::new(40, 10), Point::new(0, 0), Point::new(0, 20)],
        }
    }

    #[test]
    fn zero_radius_keeps_corners_sharp() {
        for corner in rounded_corners(&arrow(), 0.0) {
            assert!(corner.is_sharp());
        }
    }

    #[test]
    fn rounding_cuts_both_edges_of_the_tip() {
        let [tip, upper, lower] = rounded_corners(&arrow(), 5.0);
        assert_eq!(tip.apex, [40.0, 10.0]);
        assert!(tip.entry[0] < 40.0 && tip.entry[1] > 10.0);
        assert!(tip.exit[0] < 40.0 && tip.exit[1] < 10.0);
        assert_eq!(tip.at(0.0), tip.entry);
        assert_eq!(tip.at(1.0), tip.exit);

        // The base edge is 20 long, so a radius of 5 cuts 5 off it.
        assert_eq!(upper.exit, [0.0, 5.0]);
        assert_eq!(lower.entry, [0.0, 15.0]);
    }

    #[test]
    fn radius_is_limited_to_half_an_edge() {
        let [_, upper, lower] = rounded_corners(&arrow(), 500.0);
        assert_eq!(upper.exit, [0.0, 10.0]);
        assert_eq!(lower.entry, [0.0, 10.0]);
    }
}
