//! Integer geometry for the comparison view: points, rectangles, the arrow
//! triangles anchored to the delimiter and label placement.

/// Inset used for label placement, in density-independent units.
pub const MATERIAL_MARGIN_DP: f32 = 16.0;

/// Converts density-independent units to whole pixels.
pub fn dp_to_px(dp: f32, density: f32) -> i32 {
    (dp * density).round() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Edge-based rectangle, `right` and `bottom` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }
}

/// Which side of the delimiter something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Horizontal direction pointing away from the delimiter.
    fn outward(self) -> i32 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

/// A closed triangular path. `points[0]` is the tip, the other two form the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrowPath {
    pub points: [Point; 3],
}

impl ArrowPath {
    pub fn tip(&self) -> Point {
        self.points[0]
    }

    pub fn base(&self) -> [Point; 2] {
        [self.points[1], self.points[2]]
    }
}

/// Inputs for deriving both arrow triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowMetrics {
    pub delimiter_position: i32,
    pub delimiter_width: i32,
    pub arrow_margin: i32,
    pub arrow_width: i32,
    pub arrow_height: i32,
    pub height: i32,
}

/// Builds the arrow on `side` of the delimiter, pointing away from it and
/// vertically centered.
///
/// A drag leaves the delimiter wherever the pointer went, so offsets are
/// computed in `i64` and saturated back into the `i32` range.
pub fn arrow_path(side: Side, metrics: &ArrowMetrics) -> ArrowPath {
    let dir = i64::from(side.outward());
    let position = i64::from(metrics.delimiter_position);
    let base_offset = i64::from(metrics.delimiter_width / 2) + i64::from(metrics.arrow_margin);
    let tip_offset = base_offset + i64::from(metrics.arrow_width);
    let center_y = i64::from(metrics.height / 2);
    let half_height = i64::from(metrics.arrow_height / 2);
    let base_x = position + dir * base_offset;

    ArrowPath {
        points: [
            wide_point(position + dir * tip_offset, center_y),
            wide_point(base_x, center_y - half_height),
            wide_point(base_x, center_y + half_height),
        ],
    }
}

fn wide_point(x: i64, y: i64) -> Point {
    Point::new(saturate(x), saturate(y))
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// A label fits when both margins plus its width are strictly smaller than the
/// space available on its side.
pub fn label_fits(label_width: i32, available: i32, margin: i32) -> bool {
    i64::from(margin) * 2 + i64::from(label_width) < i64::from(available)
}

/// Where a label is drawn. `origin` is the text baseline start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPlacement {
    pub text: String,
    pub origin: Point,
    pub width: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(position: i32) -> ArrowMetrics {
        ArrowMetrics {
            delimiter_position: position,
            delimiter_width: 3,
            arrow_margin: 5,
            arrow_width: 12,
            arrow_height: 10,
            height: 200,
        }
    }

    #[test]
    fn left_arrow_points_left() {
        let arrow = arrow_path(Side::Left, &metrics(100));
        assert_eq!(arrow.tip(), Point::new(100 - 1 - 5 - 12, 100));
        assert_eq!(arrow.base(), [Point::new(94, 95), Point::new(94, 105)]);
    }

    #[test]
    fn right_arrow_mirrors_left() {
        for (dw, margin, aw) in [(0, 0, 0), (3, 5, 12), (7, 1, 30), (10, 20, 4)] {
            let m = ArrowMetrics {
                delimiter_width: dw,
                arrow_margin: margin,
                arrow_width: aw,
                ..metrics(150)
            };
            let left = arrow_path(Side::Left, &m);
            let right = arrow_path(Side::Right, &m);
            assert_eq!(left.tip().x - 150, -(right.tip().x - 150));
            assert_eq!(left.tip().y, right.tip().y);
            assert_eq!(left.base()[0].y, right.base()[0].y);
        }
    }

    #[test]
    fn label_fit_is_strict() {
        assert!(!label_fits(68, 100, 16));
        assert!(label_fits(67, 100, 16));
        assert!(!label_fits(0, 0, 16));
    }

    #[test]
    fn arrows_saturate_at_extreme_positions() {
        let right = arrow_path(Side::Right, &metrics(i32::MAX));
        assert_eq!(right.tip(), Point::new(i32::MAX, 100));
        assert_eq!(right.base()[0].x, i32::MAX);

        let left = arrow_path(Side::Left, &metrics(i32::MIN));
        assert_eq!(left.tip().x, i32::MIN);

        let long = arrow_path(
            Side::Right,
            &ArrowMetrics {
                arrow_width: i32::MAX,
                ..metrics(100)
            },
        );
        assert_eq!(long.tip().x, i32::MAX);
        assert_eq!(long.base()[0].x, 106);
    }

    #[test]
    fn huge_labels_never_fit() {
        assert!(!label_fits(i32::MAX, i32::MAX, 16));
        assert!(!label_fits(10, 100, i32::MAX));
    }

    #[test]
    fn dp_conversion_rounds() {
        assert_eq!(dp_to_px(16.0, 1.0), 16);
        assert_eq!(dp_to_px(16.0, 2.625), 42);
        assert_eq!(dp_to_px(5.0, 1.5), 8);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::new(10, 0, 20, 5);
        assert!(rect.contains(Point::new(10, 0)));
        assert!(!rect.contains(Point::new(20, 0)));
        assert_eq!(rect.width(), 10);
        assert!(Rect::new(5, 0, 5, 10).is_empty());
    }
}
