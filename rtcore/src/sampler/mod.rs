//! Sampler

use crate::camera::*;
use crate::geometry::*;
use crate::pbrt::*;

/// Stores the per-pixel sample bookkeeping shared by all samplers.
#[derive(Clone, Debug)]
pub struct SamplerData {
    /// Number of samples to generate for each pixel.
    pub samples_per_pixel: usize,

    /// Current pixel.
    pub current_pixel: Point2i,

    /// Index of the current sample within the current pixel.
    pub current_pixel_sample_index: usize,
}

impl SamplerData {
    /// Create a new `SamplerData`.
    ///
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    pub fn new(samples_per_pixel: usize) -> Self {
        Self {
            samples_per_pixel,
            current_pixel: Point2i::default(),
            current_pixel_sample_index: 0,
        }
    }

    /// Start working on a new pixel.
    ///
    /// * `p` - The pixel.
    pub fn start_pixel(&mut self, p: &Point2i) {
        self.current_pixel = *p;
        self.current_pixel_sample_index = 0;
    }

    /// Advance to the next sample of the current pixel. Returns `true` while
    /// `current_pixel_sample_index` < `samples_per_pixel`.
    pub fn start_next_sample(&mut self) -> bool {
        self.current_pixel_sample_index += 1;
        self.current_pixel_sample_index < self.samples_per_pixel
    }

    /// Set the index of the sample in the current pixel to generate next.
    ///
    /// * `sample_num` - The sample number.
    pub fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.current_pixel_sample_index = sample_num;
        self.current_pixel_sample_index < self.samples_per_pixel
    }
}

/// Sampler interface.
pub trait Sampler {
    /// Returns a shared reference underlying `SamplerData`.
    fn get_data(&self) -> &SamplerData;

    /// Returns a mutable reference to underlying `SamplerData`.
    fn get_data_mut(&mut self) -> &mut SamplerData;

    /// Generates a new instance of an initial `Sampler` for use by a rendering thread.
    ///
    /// * `seed` - The seed for the random number generator (if any).
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler>;

    /// This should be called when the rendering algorithm is ready to start working on a given pixel.
    ///
    /// * `p` - The pixel.
    fn start_pixel(&mut self, p: &Point2i) {
        self.get_data_mut().start_pixel(p);
    }

    /// Returns the sample value for the next dimension of the current sample vector.
    fn get_1d(&mut self) -> Float;

    /// Returns the sample value for the next two dimensions of the current sample vector.
    fn get_2d(&mut self) -> Point2f;

    /// Returns an initialized `CameraSample` for a given pixel.
    ///
    /// * `p_raster` - The pixel.
    fn get_camera_sample(&mut self, p_raster: &Point2i) -> CameraSample {
        let film_sample = self.get_2d();
        CameraSample::new(Point2f::new(
            p_raster.x as Float + film_sample.x,
            p_raster.y as Float + film_sample.y,
        ))
    }

    /// Reset the current sample dimension counter. Returns `true` if `current_pixel_sample_index` <
    /// `samples_per_pixel`; otherwise `false`.
    fn start_next_sample(&mut self) -> bool {
        self.get_data_mut().start_next_sample()
    }

    /// Set the index of the sample in the current pixel to generate next. Returns `true` if
    /// `current_pixel_sample_index` < `samples_per_pixel`; otherwise `false`.
    ///
    /// * `sample_num` - The sample number.
    fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.get_data_mut().set_sample_number(sample_num)
    }
}

// Implement `Sampler` so `Box<dyn Sampler>` can be passed around where `&mut dyn Sampler` can be used. Per-thread
// samplers are heap allocated trait objects returned from `Sampler::clone_sampler()`.
impl<S: Sampler + ?Sized> Sampler for Box<S> {
    #[inline]
    fn get_data(&self) -> &SamplerData {
        (**self).get_data()
    }

    #[inline]
    fn get_data_mut(&mut self) -> &mut SamplerData {
        (**self).get_data_mut()
    }

    #[inline]
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        (**self).clone_sampler(seed)
    }

    #[inline]
    fn start_pixel(&mut self, p: &Point2i) {
        (**self).start_pixel(p);
    }

    #[inline]
    fn get_1d(&mut self) -> Float {
        (**self).get_1d()
    }

    #[inline]
    fn get_2d(&mut self) -> Point2f {
        (**self).get_2d()
    }

    #[inline]
    fn get_camera_sample(&mut self, p_raster: &Point2i) -> CameraSample {
        (**self).get_camera_sample(p_raster)
    }

    #[inline]
    fn start_next_sample(&mut self) -> bool {
        (**self).start_next_sample()
    }

    #[inline]
    fn set_sample_number(&mut self, sample_num: usize) -> bool {
        (**self).set_sample_number(sample_num)
    }
}

/// Boxed `Sampler` prototype shared between rendering threads.
pub type BoxSampler = Box<dyn Sampler + Send + Sync>;
