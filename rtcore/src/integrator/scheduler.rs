//! Render Scheduler

use super::*;
use crate::app::create_progress_reporter;
use crate::camera::*;
use crate::film::*;
use crate::sampler::*;
use crate::scene::*;
use crate::tile::*;
use indicatif::ProgressBar;
use std::sync::Arc;

/// Drives tile-parallel rendering: worker threads pull tiles from the tile generator and deposit radiance
/// estimates into the film.
pub struct RenderScheduler {
    /// The camera.
    pub camera: ArcCamera,

    /// The film.
    pub film: Arc<Film>,

    /// Hands out the tiles of the image.
    pub tile_generator: BoxTileGenerator,

    /// Prototype sampler; each thread works with its own clone.
    pub sampler: BoxSampler,

    /// Total samples per pixel.
    pub spp: usize,

    /// Number of worker threads.
    pub n_threads: usize,

    /// Hide the progress bar.
    pub quiet: bool,
}

impl RenderScheduler {
    /// Create a new `RenderScheduler`.
    ///
    /// * `camera`         - The camera.
    /// * `film`           - The film.
    /// * `tile_generator` - Hands out the tiles of the image.
    /// * `sampler`        - Prototype sampler.
    /// * `spp`            - Total samples per pixel.
    /// * `n_threads`      - Number of worker threads.
    pub fn new(
        camera: ArcCamera,
        film: Arc<Film>,
        tile_generator: BoxTileGenerator,
        sampler: BoxSampler,
        spp: usize,
        n_threads: usize,
    ) -> Result<Self, String> {
        if n_threads == 0 {
            return Err(String::from("Number of render threads must be greater than 0"));
        }
        if spp == 0 {
            return Err(String::from("Samples per pixel must be greater than 0"));
        }

        Ok(Self {
            camera,
            film,
            tile_generator,
            sampler,
            spp,
            n_threads,
            quiet: false,
        })
    }

    /// Render all samples of every pixel in one pass.
    ///
    /// * `scene` - The scene.
    /// * `li`    - Radiance estimator for a camera ray.
    pub fn render<F>(&self, scene: &Scene, li: &F)
    where
        F: Fn(Ray, &Scene, &mut dyn Sampler) -> Spectrum + Sync,
    {
        self.render_pass(scene, 0, self.spp, li);
    }

    /// Render a range of samples for every pixel. Blocks until all worker threads have finished.
    ///
    /// * `scene`        - The scene.
    /// * `first_sample` - Index of the first sample of each pixel rendered in this pass.
    /// * `n_samples`    - Number of samples per pixel rendered in this pass.
    /// * `li`           - Radiance estimator for a camera ray.
    pub fn render_pass<F>(&self, scene: &Scene, first_sample: usize, n_samples: usize, li: &F)
    where
        F: Fn(Ray, &Scene, &mut dyn Sampler) -> Spectrum + Sync,
    {
        self.tile_generator.reset();

        let tile_count = self.tile_generator.generate_tiles().len();
        info!(
            "Rendering {tile_count} tiles, samples {first_sample}..{} with {} threads",
            first_sample + n_samples,
            self.n_threads
        );

        let progress = create_progress_reporter(tile_count as u64, self.quiet);
        progress.set_message(format!("Rendering {n_samples} spp"));

        let result = crossbeam::scope(|scope| {
            for thread_id in 0..self.n_threads {
                let progress = &progress;
                scope.spawn(move |_| {
                    self.render_per_thread(scene, thread_id, first_sample, n_samples, li, progress);
                });
            }
        });
        if result.is_err() {
            error!("A render thread panicked");
        }

        progress.finish_with_message("Pass complete");
    }

    /// Render tiles until the tile generator runs out.
    ///
    /// * `scene`        - The scene.
    /// * `thread_id`    - Index of the worker thread.
    /// * `first_sample` - Index of the first sample of each pixel.
    /// * `n_samples`    - Number of samples per pixel.
    /// * `li`           - Radiance estimator for a camera ray.
    /// * `progress`     - Progress reporter.
    fn render_per_thread<F>(
        &self,
        scene: &Scene,
        thread_id: usize,
        first_sample: usize,
        n_samples: usize,
        li: &F,
        progress: &ProgressBar,
    ) where
        F: Fn(Ray, &Scene, &mut dyn Sampler) -> Spectrum + Sync,
    {
        // Distinct seed for every thread of every pass.
        let seed = (first_sample * self.n_threads + thread_id) as u64;
        let mut sampler = self.sampler.clone_sampler(seed);

        while let Some(tile) = self.tile_generator.generate_next_tile() {
            debug!("Thread {thread_id} starting tile {:?}", tile.bounds);

            let mut film_tile = self.film.get_film_tile(&tile.bounds);
            for pixel in tile {
                sampler.start_pixel(&pixel);
                for sample in first_sample..first_sample + n_samples {
                    sampler.set_sample_number(sample);

                    let camera_sample = sampler.get_camera_sample(&pixel);
                    let ray = self.camera.generate_ray(&camera_sample);
                    let l = check_radiance(li(ray, scene, &mut *sampler), &pixel, sample);
                    film_tile.add_sample(&pixel, &l);
                }
            }
            self.film.merge_film_tile(&film_tile);
            progress.inc(1);
        }
    }
}

/// Replace radiance values that would corrupt the image with black.
///
/// * `l`      - Radiance estimate.
/// * `pixel`  - The pixel.
/// * `sample` - The sample number.
fn check_radiance(l: Spectrum, pixel: &Point2i, sample: usize) -> Spectrum {
    if l.has_nans() {
        error!(
            "Not-a-number radiance value returned for pixel ({}, {}), sample {}. Setting to black.",
            pixel.x, pixel.y, sample
        );
        Spectrum::default()
    } else if l.has_infs() {
        error!(
            "Infinite radiance value returned for pixel ({}, {}), sample {}. Setting to black.",
            pixel.x, pixel.y, sample
        );
        Spectrum::default()
    } else if l.has_negatives() {
        error!(
            "Negative radiance value {:?} returned for pixel ({}, {}), sample {}. Setting to black.",
            l, pixel.x, pixel.y, sample
        );
        Spectrum::default()
    } else {
        l
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_radiance_replaces_invalid_values() {
        let p = Point2i::new(0, 0);
        assert!(check_radiance(Spectrum::new(Float::NAN), &p, 0).is_black());
        assert!(check_radiance(Spectrum::new(INFINITY), &p, 0).is_black());
        assert!(check_radiance(Spectrum::from_rgb(1.0, -0.5, 0.0), &p, 0).is_black());
        assert_eq!(check_radiance(Spectrum::new(2.0), &p, 0), Spectrum::new(2.0));
    }
}
