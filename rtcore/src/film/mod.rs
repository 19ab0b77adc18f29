//! Film

use crate::geometry::*;
use crate::image_io::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::sync::{PoisonError, RwLock};

mod film_tile;

// Re-export.
pub use film_tile::*;

/// Pixel data.
#[derive(Copy, Clone, Default, Debug)]
pub struct Pixel {
    /// Running sum of the RGB radiance samples deposited into the pixel.
    pub rgb_sum: [Float; 3],

    /// Holds the sum of sample weights deposited into the pixel.
    pub weight_sum: Float,
}

/// Models the sensing device in a simulated camera. Each pixel stores the average of the radiance samples deposited
/// into it (box reconstruction filter).
pub struct Film {
    /// The overall image resolution in pixels.
    pub full_resolution: Point2i,

    /// Filename of output image.
    pub filename: String,

    /// The bounds of the image in pixels.
    pub pixel_bounds: Bounds2i,

    /// Stores the image pixels.
    pixels: RwLock<Vec<Pixel>>,
}

impl Film {
    /// Create a new `Film` instance.
    ///
    /// * `resolution` - The overall image resolution in pixels.
    /// * `filename`   - Filename of output image.
    pub fn new(resolution: &Point2i, filename: &str) -> Self {
        let pixel_bounds = Bounds2i::new(Point2i::new(0, 0), *resolution);
        let n = pixel_bounds.area() as usize;

        Self {
            full_resolution: *resolution,
            filename: String::from(filename),
            pixel_bounds,
            pixels: RwLock::new(vec![Pixel::default(); n]),
        }
    }

    /// Returns the image resolution.
    pub fn get_resolution(&self) -> Point2i {
        self.full_resolution
    }

    /// Returns the offset of a pixel in the pixel storage.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    fn get_pixel_offset(&self, p: &Point2i) -> usize {
        assert!(self.pixel_bounds.contains_exclusive(p));
        let width = self.pixel_bounds.p_max.x - self.pixel_bounds.p_min.x;
        ((p.x - self.pixel_bounds.p_min.x) + (p.y - self.pixel_bounds.p_min.y) * width) as usize
    }

    /// Returns a `FilmTile` that stores the contributions for pixels in the specified region of the image.
    ///
    /// * `tile_bounds` - Tile region in the overall image.
    pub fn get_film_tile(&self, tile_bounds: &Bounds2i) -> FilmTile {
        FilmTile::new(tile_bounds.intersect(&self.pixel_bounds))
    }

    /// Merge the `FilmTile`'s pixel contribution into the image.
    ///
    /// * `tile` - The `FilmTile` to merge.
    pub fn merge_film_tile(&self, tile: &FilmTile) {
        let mut pixels = self.pixels.write().unwrap_or_else(PoisonError::into_inner);
        for p in tile.get_pixel_bounds() {
            let tile_pixel = &tile.pixels[tile.get_pixel_offset(&p)];
            let pixel = &mut pixels[self.get_pixel_offset(&p)];
            let rgb = tile_pixel.contrib_sum.to_rgb();
            for (i, c) in rgb.iter().enumerate() {
                pixel.rgb_sum[i] += c;
            }
            pixel.weight_sum += tile_pixel.weight_sum;
        }
    }

    /// Add a single radiance sample to a pixel.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    /// * `l` - The radiance sample.
    pub fn deposit(&self, p: &Point2i, l: &Spectrum) {
        if !self.pixel_bounds.contains_exclusive(p) {
            return;
        }
        let offset = self.get_pixel_offset(p);
        let rgb = l.to_rgb();
        let mut pixels = self.pixels.write().unwrap_or_else(PoisonError::into_inner);
        for (i, c) in rgb.iter().enumerate() {
            pixels[offset].rgb_sum[i] += c;
        }
        pixels[offset].weight_sum += 1.0;
    }

    /// Returns the current estimate of a pixel, i.e. the average of its samples.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    pub fn get_pixel_value(&self, p: &Point2i) -> Spectrum {
        let pixels = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
        let pixel = &pixels[self.get_pixel_offset(p)];
        if pixel.weight_sum > 0.0 {
            let inv_wt = 1.0 / pixel.weight_sum;
            Spectrum::from_rgb(
                pixel.rgb_sum[0] * inv_wt,
                pixel.rgb_sum[1] * inv_wt,
                pixel.rgb_sum[2] * inv_wt,
            )
        } else {
            Spectrum::default()
        }
    }

    /// Returns the number of samples deposited into a pixel.
    ///
    /// * `p` - The pixel coordinates with respect to the overall image.
    pub fn get_sample_count(&self, p: &Point2i) -> Float {
        let pixels = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
        pixels[self.get_pixel_offset(p)].weight_sum
    }

    /// Reset all pixels.
    pub fn clear(&self) {
        let mut pixels = self.pixels.write().unwrap_or_else(PoisonError::into_inner);
        pixels.iter_mut().for_each(|p| *p = Pixel::default());
    }

    /// Write the image to `filename`.
    pub fn write_image(&self) -> Result<(), String> {
        self.write_image_to(&self.filename)
    }

    /// Write the image to an output file.
    ///
    /// * `path` - Output path; the extension selects the file format.
    pub fn write_image_to(&self, path: &str) -> Result<(), String> {
        info!("Converting image to RGB and computing final pixel values");

        let mut rgb = Vec::with_capacity(3 * self.pixel_bounds.area() as usize);
        for p in self.pixel_bounds {
            rgb.extend_from_slice(&self.get_pixel_value(&p).to_rgb());
        }

        write_image(path, &rgb, &self.pixel_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn deposit_averages_samples() {
        let film = Film::new(&Point2i::new(2, 2), "out.png");
        let p = Point2i::new(1, 0);
        film.deposit(&p, &Spectrum::new(1.0));
        film.deposit(&p, &Spectrum::new(3.0));
        assert!(approx_eq!(Float, film.get_pixel_value(&p).average(), 2.0, epsilon = 1e-6));
        assert_eq!(film.get_sample_count(&p), 2.0);
        assert!(film.get_pixel_value(&Point2i::new(0, 0)).is_black());
    }

    #[test]
    fn merge_tile_adds_contributions() {
        let film = Film::new(&Point2i::new(4, 4), "out.exr");
        let bounds = Bounds2i::new(Point2i::new(2, 2), Point2i::new(4, 4));
        let mut tile = film.get_film_tile(&bounds);
        for p in bounds {
            tile.add_sample(&p, &Spectrum::new(0.5));
        }
        film.merge_film_tile(&tile);
        assert!(approx_eq!(Float, film.get_pixel_value(&Point2i::new(3, 3)).average(), 0.5, epsilon = 1e-6));
        assert_eq!(film.get_sample_count(&Point2i::new(1, 1)), 0.0);

        film.clear();
        assert_eq!(film.get_sample_count(&Point2i::new(3, 3)), 0.0);
    }

    #[test]
    fn deposit_outside_is_ignored() {
        let film = Film::new(&Point2i::new(2, 2), "out.png");
        film.deposit(&Point2i::new(5, 5), &Spectrum::new(1.0));
        for p in film.pixel_bounds {
            assert_eq!(film.get_sample_count(&p), 0.0);
        }
    }
}
