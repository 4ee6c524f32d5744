//! Fit captured images into the available viewport.

use crate::types::{DisplayGeometry, Viewport};

/// Compute the display size of a `image_width` x `image_height` image inside `viewport`.
///
/// The result touches the viewport on one axis and fits inside it on the
/// other, keeping the image's aspect ratio. Returns `None` when any dimension
/// is zero, negative or not finite.
pub fn fit_to_viewport(image_width: f64, image_height: f64, viewport: Viewport) -> Option<DisplayGeometry> {
    let dims = [image_width, image_height, viewport.width, viewport.height];
    if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return None;
    }

    let image_aspect = image_width / image_height;
    let viewport_aspect = viewport.width / viewport.height;

    let geometry = if image_aspect > viewport_aspect {
        DisplayGeometry {
            width: viewport.width,
            height: (viewport.width / image_aspect).min(viewport.height),
        }
    } else {
        DisplayGeometry {
            width: (viewport.height * image_aspect).min(viewport.width),
            height: viewport.height,
        }
    };

    Some(geometry)
}

/// `fit_to_viewport` for integer pixel dimensions
pub fn fit_pixels(image_width: u32, image_height: u32, viewport: Viewport) -> Option<DisplayGeometry> {
    fit_to_viewport(image_width as f64, image_height as f64, viewport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_image_clamps_to_width() {
        let g = fit_to_viewport(1600.0, 900.0, Viewport::new(1000.0, 600.0)).unwrap();
        assert_eq!(g.width, 1000.0);
        assert!((g.height - 562.5).abs() < 1e-9);
    }

    #[test]
    fn test_tall_image_clamps_to_height() {
        let g = fit_to_viewport(480.0, 640.0, Viewport::new(1000.0, 600.0)).unwrap();
        assert_eq!(g.height, 600.0);
        assert!((g.width - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_aspect_fills_viewport() {
        let g = fit_to_viewport(320.0, 240.0, Viewport::new(800.0, 600.0)).unwrap();
        assert_eq!(g.width, 800.0);
        assert_eq!(g.height, 600.0);
    }

    #[test]
    fn test_scaled_viewport_height() {
        let viewport = Viewport::new(1000.0, 1000.0).scaled_height(0.6);
        let g = fit_pixels(1600, 900, viewport).unwrap();
        assert_eq!(g.width, 1000.0);
        assert!(g.height <= 600.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(fit_to_viewport(0.0, 100.0, Viewport::new(100.0, 100.0)).is_none());
        assert!(fit_to_viewport(100.0, 100.0, Viewport::new(100.0, 0.0)).is_none());
        assert!(fit_to_viewport(f64::NAN, 100.0, Viewport::new(100.0, 100.0)).is_none());
        assert!(fit_to_viewport(100.0, -1.0, Viewport::new(100.0, 100.0)).is_none());
    }
}
