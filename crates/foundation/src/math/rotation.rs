use super::{Quat, Vec3};

/// Globe orientation as two Euler angles applied in `XYZ` order
/// (world = Rx(x) · Ry(y) · local).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Orientation {
    pub x_rad: f64,
    pub y_rad: f64,
}

impl Orientation {
    pub fn new(x_rad: f64, y_rad: f64) -> Self {
        Self { x_rad, y_rad }
    }

    /// Local (globe-fixed) to world.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        rotate_x(rotate_y(v, self.y_rad), self.x_rad)
    }

    /// World to local; the exact inverse of [`Orientation::rotate`].
    pub fn inverse_rotate(self, v: Vec3) -> Vec3 {
        rotate_y(rotate_x(v, -self.x_rad), -self.y_rad)
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), self.x_rad)
            .mul(Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), self.y_rad))
    }

    /// Orientation that brings the surface point at `(lng, lat)` to face the
    /// camera on the +Z axis. `near_y_rad` selects the equivalent yaw closest
    /// to the current one so transitions take the short way round.
    pub fn facing(lng_deg: f64, lat_deg: f64, near_y_rad: f64) -> Self {
        let x = lat_deg.to_radians();
        let y = -(lng_deg + 90.0).to_radians();
        Self::new(x, unwrap_near(y, near_y_rad))
    }
}

/// Shift `angle` by whole turns so it lies within half a turn of `reference`.
pub fn unwrap_near(angle: f64, reference: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let turns = ((reference - angle) / tau).round();
    angle + turns * tau
}

fn rotate_x(v: Vec3, a: f64) -> Vec3 {
    let (s, c) = a.sin_cos();
    Vec3::new(v.x, v.y * c - v.z * s, v.y * s + v.z * c)
}

fn rotate_y(v: Vec3, a: f64) -> Vec3 {
    let (s, c) = a.sin_cos();
    Vec3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}

#[cfg(test)]
mod tests {
    use super::{Orientation, unwrap_near};
    use crate::math::{Vec3, to_surface_point};

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        assert!(a.distance(b) <= eps, "expected {a:?} ~= {b:?}");
    }

    #[test]
    fn inverse_undoes_rotate() {
        let o = Orientation::new(0.4, -2.3);
        let v = Vec3::new(0.2, -0.7, 0.9);
        assert_vec_close(o.inverse_rotate(o.rotate(v)), v, 1e-12);
    }

    #[test]
    fn facing_brings_point_to_camera_axis() {
        for (lng, lat) in [(0.0, 0.0), (30.5, 50.4), (-120.0, -33.0), (179.0, 10.0)] {
            let o = Orientation::facing(lng, lat, 0.0);
            let world = o.rotate(to_surface_point(lng, lat, 1.0));
            assert_vec_close(world, Vec3::UNIT_Z, 1e-9);
        }
    }

    #[test]
    fn quaternion_matches_euler_rotation() {
        let o = Orientation::new(-0.8, 1.9);
        let v = Vec3::new(0.3, 0.5, -0.6);
        assert_vec_close(o.to_quat().rotate(v), o.rotate(v), 1e-12);
    }

    #[test]
    fn unwrap_picks_nearest_turn() {
        let tau = std::f64::consts::TAU;
        assert!((unwrap_near(0.1, 3.0 * tau) - (0.1 + 3.0 * tau)).abs() < 1e-12);
        assert!((unwrap_near(-3.0, 3.0) - (tau - 3.0)).abs() < 1e-12);
    }
}
