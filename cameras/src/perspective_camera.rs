//! Perspective Camera

use rtcore::camera::*;
use rtcore::geometry::*;
use rtcore::medium::*;
use rtcore::pbrt::*;

/// Pinhole perspective camera. The field of view spans the shorter image axis.
pub struct PerspectiveCamera {
    /// Camera position.
    eye: Point3f,

    /// Camera space basis in world space: `s` points right, `t` points up and `n` looks forward.
    frame: Frame,

    /// Half extent of the image plane at distance 1 in x and y.
    screen: Point2f,

    /// Image resolution.
    resolution: Point2f,

    /// Scattering medium the camera lies in.
    medium: Option<ArcMedium>,
}

impl PerspectiveCamera {
    /// Create a new perspective camera.
    ///
    /// * `eye`        - Camera position.
    /// * `look_at`    - Point the camera looks at.
    /// * `up`         - Up direction.
    /// * `fov`        - The field-of-view angle in degrees.
    /// * `resolution` - Image resolution.
    /// * `medium`     - Scattering medium the camera lies in.
    pub fn new(
        eye: Point3f,
        look_at: Point3f,
        up: Vector3f,
        fov: Float,
        resolution: &Point2i,
        medium: Option<ArcMedium>,
    ) -> Result<Self, String> {
        if resolution.x <= 0 || resolution.y <= 0 {
            return Err(format!("Invalid camera resolution {} x {}", resolution.x, resolution.y));
        }
        if !(fov > 0.0 && fov < 180.0) {
            return Err(format!("Invalid field of view {fov}"));
        }

        let forward = look_at - eye;
        if forward.is_zero() {
            return Err(String::from("Camera position and look at point are the same"));
        }
        let forward = forward.normalize();
        let right = forward.cross(&up);
        if right.length_squared() == 0.0 {
            return Err(String::from("Up vector and viewing direction are parallel"));
        }
        let right = right.normalize();
        let true_up = right.cross(&forward);

        let tan_half = (fov.to_radians() / 2.0).tan();
        let aspect = resolution.x as Float / resolution.y as Float;
        let screen = if aspect > 1.0 {
            Point2f::new(aspect * tan_half, tan_half)
        } else {
            Point2f::new(tan_half, tan_half / aspect)
        };

        debug!("Perspective camera at {:?} looking at {:?}, fov {}", eye, look_at, fov);

        Ok(Self {
            eye,
            frame: Frame {
                s: right,
                t: true_up,
                n: forward,
            },
            screen,
            resolution: Point2f::from(*resolution),
            medium,
        })
    }
}

impl Camera for PerspectiveCamera {
    fn generate_ray(&self, sample: &CameraSample) -> Ray {
        // Raster y grows downwards.
        let sx = (2.0 * sample.p_film.x / self.resolution.x - 1.0) * self.screen.x;
        let sy = (1.0 - 2.0 * sample.p_film.y / self.resolution.y) * self.screen.y;
        let d = self.frame.to_world(&Vector3f::new(sx, sy, 1.0)).normalize();
        Ray::new(self.eye, d, INFINITY, self.medium.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, -1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            90.0,
            &Point2i::new(200, 100),
            None,
        )
        .unwrap()
    }

    #[test]
    fn center_ray_looks_forward() {
        let ray = camera().generate_ray(&CameraSample::new(Point2f::new(100.0, 50.0)));
        assert!(approx_eq!(Float, ray.d.z, -1.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, ray.d.length(), 1.0, epsilon = 1e-6));
    }

    #[test]
    fn corners_map_to_screen_extent() {
        let cam = camera();
        // Top right corner: x = aspect * tan(45°) = 2, y = 1.
        let ray = cam.generate_ray(&CameraSample::new(Point2f::new(200.0, 0.0)));
        let d = ray.d / -ray.d.z;
        assert!(approx_eq!(Float, d.x, 2.0, epsilon = 1e-4));
        assert!(approx_eq!(Float, d.y, 1.0, epsilon = 1e-4));
    }

    #[test]
    fn invalid_parameters() {
        let eye = Point3f::new(0.0, 0.0, 0.0);
        let up = Vector3f::new(0.0, 1.0, 0.0);
        let res = Point2i::new(10, 10);
        assert!(PerspectiveCamera::new(eye, eye, up, 60.0, &res, None).is_err());
        assert!(PerspectiveCamera::new(eye, Point3f::new(0.0, 1.0, 0.0), up, 60.0, &res, None).is_err());
        assert!(PerspectiveCamera::new(eye, Point3f::new(0.0, 0.0, 1.0), up, 0.0, &res, None).is_err());
        assert!(PerspectiveCamera::new(eye, Point3f::new(0.0, 0.0, 1.0), up, 60.0, &Point2i::new(0, 1), None).is_err());
    }
}
