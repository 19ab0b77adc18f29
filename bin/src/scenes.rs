//! Demo Scenes

use lights::*;
use materials::*;
use media::*;
use rtcore::app::SceneKind;
use rtcore::geometry::*;
use rtcore::light::*;
use rtcore::material::*;
use rtcore::medium::*;
use rtcore::pbrt::*;
use rtcore::primitive::*;
use rtcore::scene::*;
use rtcore::shape::*;
use rtcore::spectrum::*;
use shapes::*;
use std::sync::Arc;

/// A scene along with its viewpoint.
pub struct DemoScene {
    /// The scene.
    pub scene: Scene,

    /// Camera position.
    pub eye: Point3f,

    /// Point the camera looks at.
    pub look_at: Point3f,

    /// Field of view in degrees.
    pub fov: Float,
}

/// Collects primitives and lights of a scene under construction.
#[derive(Default)]
struct SceneBuilder {
    primitives: Vec<ArcPrimitive>,
    lights: Vec<ArcLight>,
}

impl SceneBuilder {
    /// Add a sphere.
    ///
    /// * `center`           - Center of the sphere.
    /// * `radius`           - Radius of the sphere.
    /// * `material`         - Surface material.
    /// * `l_emit`           - Emitted radiance; black for non-emitters.
    /// * `medium_interface` - Media inside and outside the sphere.
    fn sphere(
        &mut self,
        center: Point3f,
        radius: Float,
        material: ArcMaterial,
        l_emit: Spectrum,
        medium_interface: Option<MediumInterface>,
    ) -> Result<&mut Self, String> {
        let shape: ArcShape = Arc::new(Sphere::new(center, radius)?);
        let area_light = if l_emit.is_black() {
            None
        } else {
            let light: ArcLight = Arc::new(DiffuseAreaLight::new(l_emit, Arc::clone(&shape), false)?);
            self.lights.push(Arc::clone(&light));
            Some(light)
        };
        self.primitives.push(Arc::new(GeometricPrimitive::new(
            shape,
            material,
            area_light,
            medium_interface,
        )));
        Ok(self)
    }

    /// Add a light without geometry.
    ///
    /// * `light` - The light.
    fn light(&mut self, light: ArcLight) -> &mut Self {
        self.lights.push(light);
        self
    }

    /// Add a large diffuse ground sphere touching `y = 0`.
    fn floor(&mut self) -> Result<&mut Self, String> {
        let material: ArcMaterial = Arc::new(MatteMaterial::new(Spectrum::new(0.6)));
        self.sphere(Point3f::new(0.0, -1000.0, 0.0), 1000.0, material, Spectrum::default(), None)
    }

    fn build(self) -> Scene {
        Scene::new(Arc::new(PrimitiveList::new(self.primitives)), self.lights)
    }
}

/// Create one of the built-in scenes.
///
/// * `kind` - The scene.
pub fn make_scene(kind: SceneKind) -> Result<DemoScene, String> {
    info!("Building {kind:?} scene");
    let scene = match kind {
        SceneKind::Spheres => spheres()?,
        SceneKind::Fog => fog()?,
        SceneKind::Glass => glass()?,
    };
    Ok(DemoScene {
        scene,
        eye: Point3f::new(0.0, 2.0, -6.0),
        look_at: Point3f::new(0.0, 1.0, 0.0),
        fov: 45.0,
    })
}

fn spheres() -> Result<Scene, String> {
    let mut builder = SceneBuilder::default();
    builder.floor()?;
    builder.sphere(
        Point3f::new(-1.1, 1.0, 0.0),
        1.0,
        Arc::new(MatteMaterial::new(Spectrum::from_rgb(0.7, 0.2, 0.2))),
        Spectrum::default(),
        None,
    )?;
    builder.sphere(
        Point3f::new(1.1, 1.0, 0.0),
        1.0,
        Arc::new(MirrorMaterial::new(Spectrum::new(0.9))),
        Spectrum::default(),
        None,
    )?;
    builder.sphere(
        Point3f::new(0.0, 0.5, -1.5),
        0.5,
        Arc::new(ConductorMaterial::new(Spectrum::from_rgb(0.95, 0.65, 0.3), 0.15)?),
        Spectrum::default(),
        None,
    )?;
    builder.sphere(
        Point3f::new(0.0, 4.0, 1.5),
        0.5,
        Arc::new(MatteMaterial::new(Spectrum::default())),
        Spectrum::new(8.0),
        None,
    )?;
    builder.light(Arc::new(PointLight::new(Point3f::new(3.0, 5.0, -3.0), Spectrum::new(10.0))));
    Ok(builder.build())
}

fn fog() -> Result<Scene, String> {
    let fog: ArcMedium = Arc::new(HomogeneousMedium::new(
        Spectrum::new(0.05),
        Spectrum::from_rgb(0.6, 0.7, 0.8),
        0.3,
    )?);

    let mut builder = SceneBuilder::default();
    builder.floor()?;
    builder.sphere(
        Point3f::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(NullMaterial::new()),
        Spectrum::default(),
        Some(MediumInterface::new(Some(fog), None)),
    )?;
    builder
        .light(Arc::new(PointLight::new(Point3f::new(0.0, 4.0, -1.0), Spectrum::new(15.0))))
        .light(Arc::new(UniformInfiniteLight::new(Spectrum::new(0.05))));
    Ok(builder.build())
}

fn glass() -> Result<Scene, String> {
    let mut builder = SceneBuilder::default();
    builder.floor()?;
    builder.sphere(
        Point3f::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(GlassMaterial::new(Spectrum::new(1.0), Spectrum::new(1.0), 1.5)),
        Spectrum::default(),
        None,
    )?;
    builder.sphere(
        Point3f::new(-1.5, 0.5, 2.0),
        0.5,
        Arc::new(MatteMaterial::new(Spectrum::from_rgb(0.2, 0.4, 0.8))),
        Spectrum::default(),
        None,
    )?;
    builder.light(Arc::new(UniformInfiniteLight::new(Spectrum::new(1.0))));
    Ok(builder.build())
}
