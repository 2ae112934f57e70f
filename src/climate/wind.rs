//! Simplified three-cell prevailing wind model.

use glam::Vec3;

use crate::geometry::local_tangent_basis;

/// ITCZ displacement (degrees) at full solstice for a 23.44° tilt.
const ITCZ_SHIFT_DEG: f32 = 10.0;
/// Mix of meridional flow into the zonal wind near the ITCZ.
const MERIDIONAL_STRENGTH: f32 = 0.25;

/// Prevailing wind at sphere point `p`: unit tangent direction and speed (m/s).
///
/// - 0–30°: easterlies
/// - 30–60°: westerlies
/// - 60–90°: polar easterlies
///
/// The ITCZ shifts toward the hemisphere the signed tilt points at, scaled by
/// `forcing` (0 annual, 1 solstice).
pub fn prevailing_wind(
    p: Vec3,
    latitude_rad: f32,
    tilt_deg: f32,
    forcing: f32,
    atmosphere_density: f32,
) -> (Vec3, f32) {
    let (east, north) = local_tangent_basis(p);
    let lat_deg = latitude_rad.to_degrees();

    let itcz = ITCZ_SHIFT_DEG * (tilt_deg / 23.44).clamp(-1.0, 1.0) * forcing;
    let rel_lat = lat_deg - itcz;
    let abs_lat = rel_lat.abs();

    let (zonal, base_speed) = if abs_lat < 30.0 {
        (-east, 6.0)
    } else if abs_lat < 60.0 {
        (east, 9.0)
    } else {
        (-east, 5.0)
    };

    let toward_itcz = if rel_lat >= 0.0 { -north } else { north };
    let tropics_w = (1.0 - (abs_lat / 30.0).clamp(0.0, 1.0)).powf(1.5);
    let m = MERIDIONAL_STRENGTH * tropics_w;

    let dir = (zonal * (1.0 - m) + toward_itcz * m).normalize_or_zero();
    let speed = base_speed * atmosphere_density.max(0.0).sqrt();
    (dir, speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::lat_lon_to_unit;

    #[test]
    fn trades_blow_west_and_westerlies_east() {
        let p = lat_lon_to_unit(15.0, 0.0);
        let (east, _) = local_tangent_basis(p);
        let (dir, _) = prevailing_wind(p, 15f32.to_radians(), 0.0, 0.0, 1.0);
        assert!(dir.dot(east) < 0.0);

        let p = lat_lon_to_unit(45.0, 0.0);
        let (east, _) = local_tangent_basis(p);
        let (dir, speed) = prevailing_wind(p, 45f32.to_radians(), 0.0, 0.0, 1.0);
        assert!(dir.dot(east) > 0.0);
        assert!(speed > 0.0);
    }

    #[test]
    fn thin_atmosphere_is_calmer() {
        let p = lat_lon_to_unit(45.0, 0.0);
        let (_, thick) = prevailing_wind(p, 45f32.to_radians(), 0.0, 0.0, 1.0);
        let (_, thin) = prevailing_wind(p, 45f32.to_radians(), 0.0, 0.0, 0.25);
        assert!(thin < thick);
    }
}
