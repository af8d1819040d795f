//! Geographic <-> globe-surface conversion.
//!
//! The globe is a sphere centered at the origin with +Y through the north pole.
//! The x component is negated so longitude grows to the right when the
//! meridian at -90 faces the camera on +Z.

use super::{Quat, Vec3};

/// Globe radius in world units.
pub const GLOBE_RADIUS: f64 = 1.0;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

pub fn to_surface_point(lng: f64, lat: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lng + 180.0).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Vec3::new(
        -radius * sin_phi * cos_theta,
        radius * cos_phi,
        radius * sin_phi * sin_theta,
    )
}

/// Inverse of [`to_surface_point`]; the radius is discarded.
///
/// Longitude is returned in `[-180, 180)`. At the poles it is whatever the
/// floating-point residue of x/z gives and carries no meaning.
pub fn surface_point_to_lat_lng(point: Vec3) -> LatLng {
    let Some(n) = point.normalized() else {
        return LatLng::default();
    };

    let phi = n.y.clamp(-1.0, 1.0).acos();
    let theta = n.z.atan2(-n.x);

    let lat = 90.0 - phi.to_degrees();
    let mut lng = theta.to_degrees() - 180.0;
    if lng < -180.0 {
        lng += 360.0;
    }
    if lng >= 180.0 {
        lng -= 360.0;
    }
    LatLng::new(lat, lng)
}

/// Rotation that takes local +Z onto the outward surface normal at `(lng, lat)`.
///
/// Flat overlays (discs, rings) are authored in the XY plane; this lays them
/// tangent to the globe.
pub fn tangent_frame(lng: f64, lat: f64) -> Quat {
    let normal = to_surface_point(lng, lat, 1.0);
    Quat::from_unit_vectors(Vec3::UNIT_Z, normal)
}
