//! The comparison view's state: delimiter position, drag tracking and the
//! geometry derived from them.

use crate::canvas::{ArrowPaint, ArrowStyle, Canvas};
use crate::geometry::{
    arrow_path, dp_to_px, label_fits, ArrowMetrics, ArrowPath, LabelPlacement, Point, Rect, Side,
    MATERIAL_MARGIN_DP,
};
use crate::options::{TouchMode, ViewOptions};
use crate::surface::{SurfaceProvider, TextMeasure};
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// What the host should do with pointer capture after a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Unchanged,
    /// Keep delivering the gesture here; ancestors must not intercept it.
    Acquire,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchResponse {
    pub consumed: bool,
    pub capture: Capture,
}

impl TouchResponse {
    const REJECTED: Self = Self {
        consumed: false,
        capture: Capture::Unchanged,
    };

    const fn consumed(capture: Capture) -> Self {
        Self {
            consumed: true,
            capture,
        }
    }
}

/// Receives the delimiter position as a percentage of the view width.
///
/// The percentage is always within `0..=100`: a drag past either edge reports
/// the edge it went past, not the raw pointer position.
pub trait PositionListener {
    fn on_delimiter_position_update(&mut self, percentage: i32);
}

impl<F> PositionListener for F
where
    F: FnMut(i32),
{
    fn on_delimiter_position_update(&mut self, percentage: i32) {
        self(percentage)
    }
}

/// A left and a right layer separated by a draggable vertical delimiter.
///
/// The right layer is clipped to the area right of the delimiter, so moving
/// the delimiter reveals more or less of the left layer underneath. The host
/// forwards resizes and touches and calls [`render`](Self::render) whenever
/// [`take_redraw_request`](Self::take_redraw_request) reports a pending redraw.
pub struct DelimiterSurface<P: SurfaceProvider, M> {
    provider: P,
    measure: M,
    options: ViewOptions<P::Surface>,
    left_scaled: Option<P::Surface>,
    right_scaled: Option<P::Surface>,
    listener: Option<Box<dyn PositionListener>>,

    width: i32,
    height: i32,
    delimiter_position: i32,
    is_moving: bool,

    material_margin: i32,
    left_text_width: i32,
    right_text_width: i32,
    arrow_left: ArrowPath,
    arrow_right: ArrowPath,

    layout_pending: bool,
    redraw_requested: bool,
}

impl<P, M> DelimiterSurface<P, M>
where
    P: SurfaceProvider,
    M: TextMeasure,
{
    pub fn new(provider: P, measure: M, options: ViewOptions<P::Surface>) -> Self {
        let material_margin = dp_to_px(MATERIAL_MARGIN_DP, options.density);
        Self {
            provider,
            measure,
            options,
            left_scaled: None,
            right_scaled: None,
            listener: None,
            width: 0,
            height: 0,
            delimiter_position: 0,
            is_moving: false,
            material_margin,
            left_text_width: 0,
            right_text_width: 0,
            arrow_left: ArrowPath::default(),
            arrow_right: ArrowPath::default(),
            layout_pending: true,
            redraw_requested: true,
        }
    }

    /// Replaces the whole visual configuration. Nothing is re-measured until
    /// the next resize or render.
    pub fn configure(&mut self, options: ViewOptions<P::Surface>) {
        self.material_margin = dp_to_px(MATERIAL_MARGIN_DP, options.density);
        self.options = options;
        self.layout_pending = true;
        self.redraw_requested = true;
    }

    pub fn options(&self) -> &ViewOptions<P::Surface> {
        &self.options
    }

    /// Adopts new dimensions and re-centers the delimiter, discarding any
    /// previous drag position.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.width = width.min(i32::MAX as u32) as i32;
        self.height = height.min(i32::MAX as u32) as i32;
        self.delimiter_position = self.width / 2;
        debug!(
            "Resized to {}x{}, delimiter at {}",
            self.width, self.height, self.delimiter_position
        );
        self.relayout();
        self.redraw_requested = true;
    }

    fn relayout(&mut self) {
        let (left, right) = if self.width > 0 && self.height > 0 {
            self.provider.resize_pair(
                self.options.left_surface.as_ref(),
                self.options.right_surface.as_ref(),
                self.width as u32,
                self.height as u32,
            )
        } else {
            (None, None)
        };
        self.left_scaled = left;
        self.right_scaled = right;
        self.measure_labels();
        self.rebuild_arrows();
        self.layout_pending = false;
    }

    fn measure_labels(&mut self) {
        self.left_text_width = self.measure_text(Side::Left);
        self.right_text_width = self.measure_text(Side::Right);
    }

    fn measure_text(&self, side: Side) -> i32 {
        let text = match side {
            Side::Left => self.options.left_text.as_deref(),
            Side::Right => self.options.right_text.as_deref(),
        };
        text.map(|t| self.measure.text_width(t, self.options.text_size))
            .unwrap_or(0)
    }

    fn rebuild_arrows(&mut self) {
        let metrics = ArrowMetrics {
            delimiter_position: self.delimiter_position,
            delimiter_width: self.options.delimiter_width,
            arrow_margin: self.options.arrow_margin,
            arrow_width: self.options.arrow_width,
            arrow_height: self.options.arrow_height,
            height: self.height,
        };
        self.arrow_left = arrow_path(Side::Left, &metrics);
        self.arrow_right = arrow_path(Side::Right, &metrics);
    }

    pub fn handle_touch(&mut self, action: TouchAction, x: f32) -> TouchResponse {
        match action {
            TouchAction::Down => {
                if self.options.touch_mode == TouchMode::Delimiter && !self.within_padding(x) {
                    trace!(
                        "Ignoring press at {} outside delimiter band around {}",
                        x,
                        self.delimiter_position
                    );
                    return TouchResponse::REJECTED;
                }
                self.move_to(x);
                TouchResponse::consumed(Capture::Acquire)
            }
            TouchAction::Move => {
                self.move_to(x);
                TouchResponse::consumed(Capture::Unchanged)
            }
            TouchAction::Up | TouchAction::Cancel => {
                self.is_moving = false;
                self.redraw_requested = true;
                TouchResponse::consumed(Capture::Release)
            }
        }
    }

    fn within_padding(&self, x: f32) -> bool {
        let position = i64::from(self.delimiter_position);
        let padding = i64::from(self.options.delimiter_padding);
        let x = f64::from(x);
        x >= (position - padding) as f64 && x <= (position + padding) as f64
    }

    fn move_to(&mut self, x: f32) {
        self.is_moving = true;
        self.delimiter_position = x.round() as i32;
        if self.options.arrow_visible {
            self.rebuild_arrows();
        }
        self.notify_listener();
        self.redraw_requested = true;
    }

    /// Moves the delimiter to `percentage` of the width. Values outside
    /// `0..=100` are clamped.
    pub fn set_delimiter_position_percent(&mut self, percentage: i32) {
        let percentage = percentage.clamp(0, 100);
        self.delimiter_position = (percentage as i64 * self.width as i64 / 100) as i32;
        self.rebuild_arrows();
        self.notify_listener();
        self.redraw_requested = true;
    }

    /// Current delimiter position as a percentage of the width, or `None`
    /// while the view has no width.
    pub fn position_percent(&self) -> Option<i32> {
        if self.width == 0 {
            return None;
        }
        let position = self.delimiter_position.clamp(0, self.width);
        Some((position as i64 * 100 / self.width as i64) as i32)
    }

    fn notify_listener(&mut self) {
        let Some(percentage) = self.position_percent() else {
            return;
        };
        trace!("Delimiter at {}%", percentage);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_delimiter_position_update(percentage);
        }
    }

    pub fn set_listener(&mut self, listener: impl PositionListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn set_surface(&mut self, side: Side, surface: Option<P::Surface>) {
        let scaled = match &surface {
            Some(surface) if self.width > 0 && self.height > 0 => Some(self.provider.resize(
                surface,
                self.width as u32,
                self.height as u32,
            )),
            _ => None,
        };
        match side {
            Side::Left => {
                self.options.left_surface = surface;
                self.left_scaled = scaled;
            }
            Side::Right => {
                self.options.right_surface = surface;
                self.right_scaled = scaled;
            }
        }
        self.redraw_requested = true;
    }

    pub fn set_text(&mut self, side: Side, text: Option<String>) {
        match side {
            Side::Left => self.options.left_text = text,
            Side::Right => self.options.right_text = text,
        }
        let width = self.measure_text(side);
        match side {
            Side::Left => self.left_text_width = width,
            Side::Right => self.right_text_width = width,
        }
        self.redraw_requested = true;
    }

    /// Paints the current state. Out-of-range drag positions are corrected
    /// here and the corrected value is kept.
    pub fn render<C>(&mut self, canvas: &mut C)
    where
        C: Canvas<Surface = P::Surface>,
    {
        if self.layout_pending && self.width > 0 && self.height > 0 {
            self.relayout();
        }

        let clamped = self.delimiter_position.clamp(0, self.width);
        if clamped != self.delimiter_position {
            debug!(
                "Clamping delimiter {} into [0, {}]",
                self.delimiter_position, self.width
            );
            self.delimiter_position = clamped;
            self.rebuild_arrows();
        }
        let position = self.delimiter_position;

        if position > 0 {
            if let Some(left) = &self.left_scaled {
                canvas.draw_surface(Side::Left, left, None);
            }
        }

        canvas.draw_line(
            Point::new(position, 0),
            Point::new(position, self.height),
            self.options.delimiter_color,
            self.options.delimiter_width as f32,
        );

        let arrow_paint = self.arrows_shown().then(|| self.arrow_paint());
        if let Some(paint) = &arrow_paint {
            canvas.draw_arrow(Side::Left, &self.arrow_left, paint);
        }

        if let Some(label) = self.label_placement(Side::Left) {
            canvas.draw_text(
                Side::Left,
                &label.text,
                label.origin,
                self.options.text_color,
                self.options.text_size,
            );
        }

        if self.width - position > 0 {
            if let Some(right) = &self.right_scaled {
                canvas.draw_surface(Side::Right, right, Some(self.right_clip()));
            }
        }

        if let Some(paint) = &arrow_paint {
            canvas.draw_arrow(Side::Right, &self.arrow_right, paint);
        }

        if let Some(label) = self.label_placement(Side::Right) {
            canvas.draw_text(
                Side::Right,
                &label.text,
                label.origin,
                self.options.text_color,
                self.options.text_size,
            );
        }

        self.redraw_requested = false;
    }

    fn arrows_shown(&self) -> bool {
        self.options.arrow_visible && !self.is_moving
    }

    fn arrow_paint(&self) -> ArrowPaint {
        ArrowPaint {
            color: self.options.arrow_color,
            style: if self.options.arrow_fill {
                ArrowStyle::Fill
            } else {
                ArrowStyle::Stroke {
                    width: self.options.arrow_stroke_width as f32,
                }
            },
            corner_radius: self.options.arrow_corner_radius,
        }
    }

    /// Region the right layer is restricted to.
    pub fn right_clip(&self) -> Rect {
        let position = self.delimiter_position.clamp(0, self.width);
        Rect::new(
            position.saturating_add(self.options.delimiter_width / 2),
            0,
            self.width,
            self.height,
        )
    }

    /// Where the label on `side` goes, or `None` when there is no label or
    /// it does not fit next to the delimiter.
    pub fn label_placement(&self, side: Side) -> Option<LabelPlacement> {
        let position = self.delimiter_position.clamp(0, self.width);
        let margin = self.material_margin;
        let baseline = self.height.saturating_sub(margin);
        let (text, width, available, origin_x) = match side {
            Side::Left => (
                self.options.left_text.as_ref()?,
                self.left_text_width,
                position,
                margin,
            ),
            Side::Right => (
                self.options.right_text.as_ref()?,
                self.right_text_width,
                self.width - position,
                self.width
                    .saturating_sub(margin)
                    .saturating_sub(self.right_text_width),
            ),
        };
        label_fits(width, available, margin).then(|| LabelPlacement {
            text: text.clone(),
            origin: Point::new(origin_x, baseline),
            width,
        })
    }

    pub fn arrow(&self, side: Side) -> &ArrowPath {
        match side {
            Side::Left => &self.arrow_left,
            Side::Right => &self.arrow_right,
        }
    }

    /// The content surface for `side`, scaled to the current dimensions.
    pub fn surface(&self, side: Side) -> Option<&P::Surface> {
        match side {
            Side::Left => self.left_scaled.as_ref(),
            Side::Right => self.right_scaled.as_ref(),
        }
    }

    pub fn delimiter_position(&self) -> i32 {
        self.delimiter_position
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn touch_mode(&self) -> TouchMode {
        self.options.touch_mode
    }

    pub fn material_margin(&self) -> i32 {
        self.material_margin
    }

    /// Returns whether state changed since the last render, and resets the flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::surface::{FixedAdvanceMeasure, Unscaled};
    use std::cell::RefCell;
    use std::rc::Rc;

    type View = DelimiterSurface<Unscaled, FixedAdvanceMeasure>;

    fn view(options: ViewOptions<()>) -> View {
        DelimiterSurface::new(Unscaled, FixedAdvanceMeasure::default(), options)
    }

    #[test]
    fn resize_recenters_and_discards_drag() {
        let mut view = view(ViewOptions::default());
        view.on_resize(401, 100);
        assert_eq!(view.delimiter_position(), 200);

        view.handle_touch(TouchAction::Down, 30.0);
        view.handle_touch(TouchAction::Up, 30.0);
        assert_eq!(view.delimiter_position(), 30);

        view.on_resize(0, 0);
        assert_eq!(view.delimiter_position(), 0);
    }

    #[test]
    fn release_keeps_position_and_stops_moving() {
        let mut view = view(ViewOptions::default());
        view.on_resize(100, 100);
        view.handle_touch(TouchAction::Down, 10.0);
        assert!(view.is_moving());

        let response = view.handle_touch(TouchAction::Cancel, 90.0);
        assert_eq!(response, TouchResponse::consumed(Capture::Release));
        assert!(!view.is_moving());
        assert_eq!(view.delimiter_position(), 10);
    }

    #[test]
    fn padding_band_is_inclusive() {
        let mut view = view(ViewOptions {
            touch_mode: TouchMode::Delimiter,
            delimiter_padding: 20,
            ..ViewOptions::default()
        });
        view.on_resize(200, 100);

        assert!(view.handle_touch(TouchAction::Down, 120.0).consumed);
        view.handle_touch(TouchAction::Up, 120.0);
        assert!(view.handle_touch(TouchAction::Down, 100.0).consumed);
        view.handle_touch(TouchAction::Up, 100.0);
        assert!(!view.handle_touch(TouchAction::Down, 120.5).consumed);
    }

    #[test]
    fn padding_band_survives_extreme_positions() {
        let mut view = view(ViewOptions {
            touch_mode: TouchMode::Delimiter,
            delimiter_padding: i32::MAX,
            ..ViewOptions::default()
        });
        view.on_resize(200, 100);
        view.handle_touch(TouchAction::Move, -3.0e9);
        assert_eq!(view.delimiter_position(), i32::MIN);

        // The band around i32::MIN ends exactly at -1.
        assert!(!view.handle_touch(TouchAction::Down, 0.0).consumed);
        assert!(view.handle_touch(TouchAction::Down, -1.0).consumed);
        assert_eq!(view.delimiter_position(), -1);
    }

    #[test]
    fn drag_rounds_pointer_coordinate() {
        let mut view = view(ViewOptions::default());
        view.on_resize(100, 100);
        view.handle_touch(TouchAction::Down, 10.4);
        assert_eq!(view.delimiter_position(), 10);
        view.handle_touch(TouchAction::Move, 10.6);
        assert_eq!(view.delimiter_position(), 11);
    }

    #[test]
    fn arrows_follow_drag_when_visible() {
        let mut view = view(ViewOptions {
            arrow_visible: true,
            ..ViewOptions::default()
        });
        view.on_resize(300, 100);
        let before = view.arrow(Side::Right).tip().x;
        view.handle_touch(TouchAction::Down, 200.0);
        assert_eq!(view.arrow(Side::Right).tip().x, before + 50);
    }

    #[test]
    fn percent_is_clamped_and_notified() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut view = view(ViewOptions::default());
        view.set_listener(move |p: i32| sink.borrow_mut().push(p));
        view.on_resize(200, 100);

        view.set_delimiter_position_percent(150);
        assert_eq!(view.delimiter_position(), 200);
        view.set_delimiter_position_percent(-5);
        assert_eq!(view.delimiter_position(), 0);
        assert_eq!(*seen.borrow(), vec![100, 0]);
    }

    #[test]
    fn zero_width_skips_notification() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut view = view(ViewOptions::default());
        view.set_listener(move |p: i32| sink.borrow_mut().push(p));

        let response = view.handle_touch(TouchAction::Down, 40.0);
        assert!(response.consumed);
        assert_eq!(view.delimiter_position(), 40);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn configure_applies_on_next_render() {
        let mut view = view(ViewOptions::default());
        view.on_resize(400, 200);
        view.configure(ViewOptions {
            left_text: Some("Before".to_string()),
            ..ViewOptions::default()
        });
        // Not measured yet.
        assert_eq!(view.label_placement(Side::Left).map(|l| l.width), Some(0));

        let mut canvas = RecordingCanvas::new();
        view.render(&mut canvas);
        assert_eq!(view.delimiter_position(), 200);
        let label = view.label_placement(Side::Left).expect("left label");
        assert_eq!(label.width, 42);
        assert_eq!(canvas.text(Side::Left), Some(("Before", Point::new(16, 184))));
    }

    #[test]
    fn redraw_request_is_reset_by_render() {
        let mut view = view(ViewOptions::default());
        view.on_resize(100, 100);
        view.render(&mut RecordingCanvas::new());
        assert!(!view.take_redraw_request());

        view.handle_touch(TouchAction::Down, 20.0);
        assert!(view.take_redraw_request());
        assert!(!view.take_redraw_request());
    }
}
