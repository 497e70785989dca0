//! Before/after image comparison view: two layers split by a draggable
//! vertical delimiter.
//!
//! [`DelimiterSurface`] holds all state and geometry. Hosts feed it resizes
//! and pointer events and paint it through a [`Canvas`].

pub mod canvas;
pub mod config;
pub mod delimiter;
pub mod geometry;
pub mod image_loader;
pub mod options;
pub mod raster;
pub mod surface;

pub use canvas::{
    rounded_corners, ArrowPaint, ArrowStyle, Canvas, DrawCommand, RecordingCanvas, RoundedCorner,
};
pub use delimiter::{Capture, DelimiterSurface, PositionListener, TouchAction, TouchResponse};
pub use geometry::{ArrowPath, LabelPlacement, Point, Rect, Side};
pub use image_loader::{load_surface, ImageSurfaceProvider};
pub use options::{Color, TouchMode, ViewOptions};
pub use raster::RasterCanvas;
pub use surface::{FixedAdvanceMeasure, SurfaceProvider, TextMeasure};

/// The view as used with decoded images.
pub type ImageComparisonView = DelimiterSurface<ImageSurfaceProvider, FixedAdvanceMeasure>;

/// Renders the current state of `view` into a new image.
pub fn snapshot<M: TextMeasure>(
    view: &mut DelimiterSurface<ImageSurfaceProvider, M>,
    background: Color,
) -> image::RgbaImage {
    let mut canvas = RasterCanvas::new(
        view.width().max(0) as u32,
        view.height().max(0) as u32,
        background,
    );
    view.render(&mut canvas);
    canvas.into_image()
}
