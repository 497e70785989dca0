//! Visual configuration of the comparison view and its defaults.

use crate::geometry::dp_to_px;

/// Which region of the view starts a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchMode {
    /// A press anywhere moves the delimiter.
    #[default]
    All,
    /// Only presses within `delimiter_padding` of the delimiter are accepted.
    Delimiter,
}

/// Packed `0xAARRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const TRANSPARENT: Color = Color(0);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Components in `[r, g, b, a]` order.
    pub fn to_rgba(self) -> [u8; 4] {
        [
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8,
            self.alpha(),
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Visual configuration of a [`DelimiterSurface`](crate::DelimiterSurface).
///
/// Sizes are in pixels. Use [`ViewOptions::for_density`] to get the defaults
/// that are specified in density-independent units scaled for a display.
#[derive(Debug, Clone)]
pub struct ViewOptions<S> {
    pub delimiter_color: Color,
    pub delimiter_width: i32,
    pub delimiter_padding: i32,
    pub arrow_color: Color,
    pub arrow_visible: bool,
    pub arrow_width: i32,
    pub arrow_height: i32,
    pub arrow_stroke_width: i32,
    pub arrow_fill: bool,
    pub arrow_margin: i32,
    pub arrow_corner_radius: f32,
    pub text_color: Color,
    pub text_size: f32,
    pub left_text: Option<String>,
    pub right_text: Option<String>,
    pub touch_mode: TouchMode,
    pub left_surface: Option<S>,
    pub right_surface: Option<S>,
    /// Pixels per density-independent unit.
    pub density: f32,
}

impl<S> ViewOptions<S> {
    pub fn for_density(density: f32) -> Self {
        Self {
            delimiter_color: Color::WHITE,
            delimiter_width: 3,
            delimiter_padding: 20,
            arrow_color: Color::WHITE,
            arrow_visible: false,
            arrow_width: dp_to_px(12.0, density),
            arrow_height: dp_to_px(10.0, density),
            arrow_stroke_width: 5,
            arrow_fill: true,
            arrow_margin: dp_to_px(5.0, density),
            arrow_corner_radius: 0.0,
            text_color: Color::WHITE,
            text_size: 14.0 * density,
            left_text: None,
            right_text: None,
            touch_mode: TouchMode::All,
            left_surface: None,
            right_surface: None,
            density,
        }
    }
}

impl<S> Default for ViewOptions<S> {
    fn default() -> Self {
        Self::for_density(1.0)
    }
}
