//! Latitude/longitude <-> unit-sphere conversions and tangent-plane helpers.
//!
//! Convention: +Y is geographic north, longitude increases toward +Z at the
//! prime meridian (which lies on +X).

use glam::Vec3;

/// Converts geographic coordinates (degrees) to a point on the unit sphere.
pub fn lat_lon_to_unit(latitude_deg: f32, longitude_deg: f32) -> Vec3 {
    let lat = latitude_deg.to_radians();
    let lon = longitude_deg.to_radians();
    Vec3::new(lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin())
}

/// Converts a unit-sphere point back to `(latitude, longitude)` in degrees.
pub fn unit_to_lat_lon(p: Vec3) -> (f32, f32) {
    let p = p.normalize_or_zero();
    let lat = p.y.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = p.z.atan2(p.x).to_degrees();
    (lat, lon)
}

/// Returns `(east, north)` tangent unit vectors at sphere point `p`.
///
/// Near the poles, where north is undefined, an arbitrary orthonormal basis is
/// returned.
pub fn local_tangent_basis(p: Vec3) -> (Vec3, Vec3) {
    let up = Vec3::Y;
    let mut north = up - p * up.dot(p);
    let nlen = north.length();
    if nlen < 1e-6 {
        let a = if p.x.abs() < 0.9 { Vec3::X } else { Vec3::Z };
        north = (a - p * a.dot(p)).normalize_or_zero();
    } else {
        north /= nlen;
    }
    let east = p.cross(north).normalize_or_zero();
    (east, north)
}

/// Great-circle angle between two unit vectors (radians).
pub fn angular_distance(a: Vec3, b: Vec3) -> f32 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Unit tangent at `from` pointing along the great circle toward `to`.
pub fn direction_toward(from: Vec3, to: Vec3) -> Vec3 {
    (to - from * from.dot(to)).normalize_or_zero()
}

/// Compass heading (degrees clockwise from north, in `[0, 360)`) of tangent
/// vector `dir` at sphere point `p`.
pub fn heading_deg(p: Vec3, dir: Vec3) -> f32 {
    let (east, north) = local_tangent_basis(p);
    let h = dir.dot(east).atan2(dir.dot(north)).to_degrees();
    h.rem_euclid(360.0)
}
