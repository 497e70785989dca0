use crate::surface::SurfaceProvider;
use anyhow::{Context as _, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::{debug, info};
use std::path::Path;

/// Decodes an image file into an RGBA content surface.
pub fn load_surface(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref();
    info!("Loading content surface from: {}", path.display());
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve image path '{}'", path.display()))?;

    let image = image::open(&absolute)
        .with_context(|| format!("Failed to decode image '{}'", absolute.display()))?
        .into_rgba8();
    debug!(
        "Loaded {} ({}x{})",
        absolute.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Rescales [`RgbaImage`] surfaces, stretching them to fill the view.
#[derive(Debug, Clone, Copy)]
pub struct ImageSurfaceProvider {
    pub filter: FilterType,
}

impl Default for ImageSurfaceProvider {
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl SurfaceProvider for ImageSurfaceProvider {
    type Surface = RgbaImage;

    fn resize(&self, surface: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        if surface.dimensions() == (width, height) {
            return surface.clone();
        }
        debug!(
            "Rescaling surface {}x{} -> {}x{}",
            surface.width(),
            surface.height(),
            width,
            height
        );
        imageops::resize(surface, width, height, self.filter)
    }

    fn resize_pair(
        &self,
        left: Option<&RgbaImage>,
        right: Option<&RgbaImage>,
        width: u32,
        height: u32,
    ) -> (Option<RgbaImage>, Option<RgbaImage>) {
        rayon::join(
            || left.map(|s| self.resize(s, width, height)),
            || right.map(|s| self.resize(s, width, height)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn resize_pair_scales_both_sides() {
        let provider = ImageSurfaceProvider::default();
        let left = RgbaImage::from_pixel(8, 4, Rgba([255, 0, 0, 255]));
        let right = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 255, 255]));

        let (left, right) = provider.resize_pair(Some(&left), Some(&right), 20, 10);
        assert_eq!(left.map(|s| s.dimensions()), Some((20, 10)));
        let right = right.expect("right surface");
        assert_eq!(right.dimensions(), (20, 10));
        assert_eq!(right.get_pixel(10, 5), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn resize_pair_skips_missing_sides() {
        let provider = ImageSurfaceProvider::default();
        let right = RgbaImage::new(2, 2);
        let (left, right) = provider.resize_pair(None, Some(&right), 4, 4);
        assert!(left.is_none());
        assert!(right.is_some());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_surface("does/not/exist.png").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.png"));
    }
}
