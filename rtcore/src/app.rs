//! Application related stuff

use crate::geometry::*;
use crate::pbrt::*;
use crate::tile::DEFAULT_TILE_SIZE;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

/// Light transport algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum IntegratorKind {
    /// Surface only path tracing.
    Path,

    /// Path tracing through participating media.
    Volpath,

    /// Path tracing with an online learned guiding distribution.
    Guided,
}

/// Built-in demo scenes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Diffuse and mirror spheres lit by a spherical emitter and a point light.
    Spheres,

    /// A sphere of homogeneous fog lit by a point light.
    Fog,

    /// A glass sphere on a diffuse floor under an environment light.
    Glass,
}

/// Sample generators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SamplerKind {
    /// Independent uniform random samples.
    Random,

    /// Scrambled Halton sequence.
    Halton,
}

/// System wide options.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Number of threads to use for rendering.
    #[arg(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 1,
        help = "Use specified number of threads for rendering."
    )]
    n_threads: usize,

    /// Samples per pixel.
    #[arg(
        long = "spp",
        short = 's',
        value_name = "NUM",
        default_value_t = 16,
        help = "Number of samples per pixel."
    )]
    pub spp: usize,

    /// Tile size.
    #[arg(
        long = "tilesize",
        short = 'p',
        value_name = "NUM",
        default_value_t = DEFAULT_TILE_SIZE,
        help = "Size in pixels of square tiles rendered per thread."
    )]
    pub tile_size: usize,

    /// Light transport algorithm.
    #[arg(long, value_enum, default_value_t = IntegratorKind::Path, help = "Light transport algorithm.")]
    pub integrator: IntegratorKind,

    /// Demo scene.
    #[arg(long, value_enum, default_value_t = SceneKind::Spheres, help = "Built-in scene to render.")]
    pub scene: SceneKind,

    /// Sample generator.
    #[arg(long, value_enum, default_value_t = SamplerKind::Random, help = "Sample generator.")]
    pub sampler: SamplerKind,

    /// Path to the image file.
    #[arg(
        long = "outfile",
        short = 'o',
        value_name = "FILE",
        default_value = "render.png",
        help = "Write the final image to the given filename."
    )]
    pub image_file: String,

    /// Image resolution.
    #[arg(
        long,
        num_args = 2,
        value_names = ["WIDTH", "HEIGHT"],
        default_values_t = [320, 240],
        help = "Image resolution in pixels."
    )]
    pub resolution: Vec<Int>,

    /// Fraction of the samples per pixel used to train the guiding distribution.
    #[arg(
        long = "training-fraction",
        value_name = "FLOAT",
        default_value_t = 0.5,
        help = "Fraction of samples per pixel rendered while training path guiding."
    )]
    pub training_fraction: Float,

    /// Samples per pixel rendered in each guiding iteration.
    #[arg(
        long = "spp-per-iteration",
        value_name = "NUM",
        default_value_t = 4,
        help = "Samples per pixel rendered in each path guiding iteration."
    )]
    pub spp_per_iteration: usize,

    /// Suppress all text output other than error messages.
    #[arg(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => {
                warn!("Invalid nthreads");
                1
            }
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }

    /// Returns the image resolution.
    pub fn resolution(&self) -> Result<Point2i, String> {
        match self.resolution.as_slice() {
            [x, y] if *x > 0 && *y > 0 => Ok(Point2i::new(*x, *y)),
            r => Err(format!("Invalid resolution {r:?}")),
        }
    }
}

/// Returns a progress bar for a number of work items. The bar is hidden when `quiet` is set.
///
/// * `count` - Number of work items.
/// * `quiet` - Hide the progress bar.
pub fn create_progress_reporter(count: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template("{msg} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(count).with_style(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = Options::parse_from(["pbrt-guiding"]);
        assert_eq!(options.spp, 16);
        assert_eq!(options.threads(), 1);
        assert_eq!(options.integrator, IntegratorKind::Path);
        assert_eq!(options.resolution(), Ok(Point2i::new(320, 240)));
    }

    #[test]
    fn parses_flags() {
        let options = Options::parse_from([
            "pbrt-guiding",
            "--integrator",
            "guided",
            "--scene",
            "glass",
            "-s",
            "64",
            "--resolution",
            "64",
            "32",
            "--training-fraction",
            "0.25",
            "-t",
            "0",
        ]);
        assert_eq!(options.integrator, IntegratorKind::Guided);
        assert_eq!(options.scene, SceneKind::Glass);
        assert_eq!(options.spp, 64);
        assert_eq!(options.resolution(), Ok(Point2i::new(64, 32)));
        assert_eq!(options.training_fraction, 0.25);
        assert_eq!(options.threads(), 1);
    }
}
