//! Film Tile

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;

/// Stores the accumulated contribution of a pixel in a `FilmTile`.
#[derive(Copy, Clone, Default)]
pub struct FilmTilePixel {
    /// Sum of the radiance samples.
    pub contrib_sum: Spectrum,

    /// Sum of sample weights.
    pub weight_sum: Float,
}

/// Thread-local accumulation buffer for a region of the film. It is merged into the `Film` once the region is done.
pub struct FilmTile {
    /// Bounding box of the pixels in the tile.
    pixel_bounds: Bounds2i,

    /// The pixels.
    pub pixels: Vec<FilmTilePixel>,
}

impl FilmTile {
    /// Returns a new `FilmTile`.
    ///
    /// * `pixel_bounds` - Bounding box of the pixels in the tile.
    pub fn new(pixel_bounds: Bounds2i) -> Self {
        let n = max(0, pixel_bounds.area()) as usize;
        Self {
            pixel_bounds,
            pixels: vec![FilmTilePixel::default(); n],
        }
    }

    /// Returns the pixel bounds.
    pub fn get_pixel_bounds(&self) -> Bounds2i {
        self.pixel_bounds
    }

    /// Returns the offset of a pixel in the tile.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    pub fn get_pixel_offset(&self, p: &Point2i) -> usize {
        let width = self.pixel_bounds.p_max.x - self.pixel_bounds.p_min.x;
        ((p.x - self.pixel_bounds.p_min.x) + (p.y - self.pixel_bounds.p_min.y) * width) as usize
    }

    /// Add a radiance sample to a pixel of the tile.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    /// * `l` - The radiance sample.
    pub fn add_sample(&mut self, p: &Point2i, l: &Spectrum) {
        if !self.pixel_bounds.contains_exclusive(p) {
            return;
        }
        let offset = self.get_pixel_offset(p);
        let pixel = &mut self.pixels[offset];
        pixel.contrib_sum += *l;
        pixel.weight_sum += 1.0;
    }
}
