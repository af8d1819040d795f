use foundation::math::{Quat, Vec3};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn with_rotation(self, rotation: Quat) -> Self {
        Self { rotation, ..self }
    }

    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// This transform placed under a parent rotation about the origin.
    pub fn rotated_by(self, parent: Quat) -> Self {
        Self {
            position: parent.rotate(self.position),
            rotation: parent.mul(self.rotation),
            scale: self.scale,
        }
    }

    /// Column-major model matrix.
    pub fn to_matrix(&self) -> [[f32; 4]; 4] {
        let q = self.rotation;
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);
        let s = self.scale;
        let col = |c: [f64; 3]| [(c[0] * s) as f32, (c[1] * s) as f32, (c[2] * s) as f32, 0.0];
        [
            col([
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y + w * z),
                2.0 * (x * z - w * y),
            ]),
            col([
                2.0 * (x * y - w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z + w * x),
            ]),
            col([
                2.0 * (x * z + w * y),
                2.0 * (y * z - w * x),
                1.0 - 2.0 * (x * x + y * y),
            ]),
            [
                self.position.x as f32,
                self.position.y as f32,
                self.position.z as f32,
                1.0,
            ],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::{Quat, Vec3};

    #[test]
    fn identity_is_origin() {
        let transform = Transform::identity();
        assert_eq!(transform.position, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(transform.to_matrix()[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn matrix_agrees_with_quaternion_rotation() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), std::f64::consts::FRAC_PI_2);
        let m = Transform::translate(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(q)
            .with_scale(2.0)
            .to_matrix();
        // +X maps to -Z under a quarter turn about +Y.
        let x_axis = m[0];
        assert!((x_axis[0]).abs() < 1e-6);
        assert!((x_axis[2] + 2.0).abs() < 1e-6);
        assert_eq!(m[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn parent_rotation_moves_position_and_orientation() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), std::f64::consts::FRAC_PI_2);
        let t = Transform::translate(Vec3::new(1.0, 0.0, 0.0)).rotated_by(q);
        assert!(t.position.distance(Vec3::new(0.0, 1.0, 0.0)) < 1e-12);
        assert_eq!(t.rotation, q);
    }
}
