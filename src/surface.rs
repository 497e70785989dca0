//! Collaborators the view relies on but does not implement itself: rescaling
//! content surfaces and measuring label text.

/// Produces a copy of a content surface scaled to the view's dimensions.
pub trait SurfaceProvider {
    type Surface;

    fn resize(&self, surface: &Self::Surface, width: u32, height: u32) -> Self::Surface;

    /// Rescales both sides at once. Providers with expensive surfaces can
    /// override this to do the work concurrently.
    fn resize_pair(
        &self,
        left: Option<&Self::Surface>,
        right: Option<&Self::Surface>,
        width: u32,
        height: u32,
    ) -> (Option<Self::Surface>, Option<Self::Surface>) {
        (
            left.map(|s| self.resize(s, width, height)),
            right.map(|s| self.resize(s, width, height)),
        )
    }
}

/// Measures the rendered pixel width of a label.
pub trait TextMeasure {
    fn text_width(&self, text: &str, size: f32) -> i32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f32) -> i32,
{
    fn text_width(&self, text: &str, size: f32) -> i32 {
        self(text, size)
    }
}

/// Approximates label width with a constant advance per character.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasure {
    /// Advance of one character as a fraction of the font size.
    pub advance: f32,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self { advance: 0.5 }
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn text_width(&self, text: &str, size: f32) -> i32 {
        (text.chars().count() as f32 * size * self.advance).round() as i32
    }
}

/// Provider for hosts whose surfaces are already the right size or are
/// scaled at draw time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unscaled;

impl SurfaceProvider for Unscaled {
    type Surface = ();

    fn resize(&self, _surface: &(), _width: u32, _height: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_advance_counts_chars() {
        let measure = FixedAdvanceMeasure::default();
        assert_eq!(measure.text_width("Before", 20.0), 60);
        assert_eq!(measure.text_width("", 20.0), 0);
        assert_eq!(measure.text_width("äö", 10.0), 10);
    }

    #[test]
    fn closures_measure_text() {
        let measure = |text: &str, _size: f32| text.len() as i32 * 7;
        assert_eq!(measure.text_width("abc", 12.0), 21);
    }
}
