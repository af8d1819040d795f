use foundation::math::Vec3;

use crate::picking::Ray;

/// Perspective camera on the +Z axis looking at the globe centre, +Y up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub distance: f64,
    pub fov_y_rad: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    pub fn new(distance: f64, fov_y_rad: f64, aspect: f64) -> Self {
        Self {
            distance,
            fov_y_rad,
            aspect,
            near: 0.01,
            far: 1000.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    /// Ray through pixel `(x_px, y_px)` of a `width × height` viewport
    /// (origin top-left).
    pub fn screen_ray(&self, x_px: f64, y_px: f64, width: f64, height: f64) -> Option<Ray> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let ndc_x = 2.0 * x_px / width - 1.0;
        let ndc_y = 1.0 - 2.0 * y_px / height;
        let half = (self.fov_y_rad * 0.5).tan();
        let dir = Vec3::new(ndc_x * half * self.aspect, ndc_y * half, -1.0).normalized()?;
        Some(Ray::new(self.position(), dir))
    }

    /// Column-major view-projection with depth in `[0, 1]`.
    pub fn view_proj(&self) -> [[f32; 4]; 4] {
        let f = 1.0 / (self.fov_y_rad * 0.5).tan();
        let range = self.near - self.far;
        let zz = self.far / range;
        let zw = self.near * self.far / range;
        // proj * translate(0, 0, -distance)
        [
            [(f / self.aspect) as f32, 0.0, 0.0, 0.0],
            [0.0, f as f32, 0.0, 0.0],
            [0.0, 0.0, zz as f32, -1.0],
            [
                0.0,
                0.0,
                (-self.distance * zz + zw) as f32,
                self.distance as f32,
            ],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::Camera;
    use foundation::math::Vec3;

    #[test]
    fn centre_pixel_looks_down_the_axis() {
        let cam = Camera::new(3.0, 1.0, 16.0 / 9.0);
        let ray = cam.screen_ray(800.0, 450.0, 1600.0, 900.0).expect("ray");
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 3.0));
        assert!(ray.dir.distance(Vec3::new(0.0, 0.0, -1.0)) < 1e-12);
    }

    #[test]
    fn top_left_ray_points_up_and_left() {
        let cam = Camera::new(3.0, 1.0, 1.0);
        let ray = cam.screen_ray(0.0, 0.0, 100.0, 100.0).expect("ray");
        assert!(ray.dir.x < 0.0 && ray.dir.y > 0.0 && ray.dir.z < 0.0);
        assert!(cam.screen_ray(0.0, 0.0, 0.0, 100.0).is_none());
    }

    #[test]
    fn globe_centre_projects_to_screen_centre() {
        let cam = Camera::new(3.0, 1.0, 1.5);
        let m = cam.view_proj();
        // clip = M * (0, 0, 0, 1) is the last column.
        let clip = m[3];
        assert!((clip[0] / clip[3]).abs() < 1e-6);
        assert!((clip[1] / clip[3]).abs() < 1e-6);
        let depth = clip[2] / clip[3];
        assert!(depth > 0.0 && depth < 1.0);
    }
}
