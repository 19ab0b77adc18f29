#[macro_use]
extern crate log;

mod scenes;

use cameras::*;
use clap::Parser;
use integrators::guiding::*;
use integrators::*;
use rtcore::app::*;
use rtcore::camera::*;
use rtcore::film::*;
use rtcore::geometry::*;
use rtcore::integrator::*;
use rtcore::sampler::*;
use rtcore::tile::*;
use samplers::*;
use scenes::*;
use std::process;
use std::sync::Arc;
use std::time::Instant;

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    let options = Options::parse();
    if let Err(e) = render(&options) {
        error!("{e}");
        process::exit(1);
    }
}

fn render(options: &Options) -> Result<(), String> {
    let resolution = options.resolution()?;
    let demo = make_scene(options.scene)?;

    let camera: ArcCamera = Arc::new(PerspectiveCamera::new(
        demo.eye,
        demo.look_at,
        Vector3f::new(0.0, 1.0, 0.0),
        demo.fov,
        &resolution,
        None,
    )?);
    let film = Arc::new(Film::new(&resolution, &options.image_file));
    let tile_generator: BoxTileGenerator =
        Box::new(SequenceTileGenerator::new(&film.get_resolution(), options.tile_size)?);
    let sampler = make_sampler(options.sampler, options.spp, &resolution);

    let mut scheduler = RenderScheduler::new(
        camera,
        film,
        tile_generator,
        sampler,
        options.spp,
        options.threads(),
    )?;
    scheduler.quiet = options.quiet;

    let integrator = make_integrator(options, scheduler)?;

    let start = Instant::now();
    integrator.render(&demo.scene);
    info!("Rendering took {:.2?}", start.elapsed());

    integrator.save(&options.image_file)
}

/// Creates a sampler.
///
/// * `kind`       - The sampler.
/// * `spp`        - Samples per pixel.
/// * `resolution` - Image resolution.
fn make_sampler(kind: SamplerKind, spp: usize, resolution: &Point2i) -> BoxSampler {
    match kind {
        SamplerKind::Random => Box::new(RandomSampler::new(spp, None)),
        SamplerKind::Halton => Box::new(HaltonSampler::new(
            spp,
            Bounds2i::new(Point2i::new(0, 0), *resolution),
            HaltonSampler::default_permutations(),
        )),
    }
}

/// Creates an integrator.
///
/// * `options`   - System wide options.
/// * `scheduler` - Distributes the work over threads.
fn make_integrator(options: &Options, scheduler: RenderScheduler) -> Result<Box<dyn Integrator>, String> {
    match options.integrator {
        IntegratorKind::Path => {
            if options.scene == SceneKind::Fog {
                warn!("The path integrator ignores participating media");
            }
            Ok(Box::new(PathIntegrator::new(scheduler, SurfaceStrategy::default())))
        }
        IntegratorKind::Volpath => Ok(Box::new(VolPathIntegrator::new(scheduler, VolumeStrategy::default()))),
        IntegratorKind::Guided => {
            let config = GuidingConfig {
                training_fraction: options.training_fraction,
                spp_per_iteration: options.spp_per_iteration,
                ..Default::default()
            };
            Ok(Box::new(GuidedPathIntegrator::new(scheduler, config)?))
        }
    }
}
