//! Compass heading from the horizontal field components

/// Heading in degrees, in `[0, 360)`, measured from the X axis towards Y
///
/// Computed as `atan2(y, x)` converted to degrees, with negative angles
/// wrapped by adding 360. A zero vector gives 0°.
///
/// The sensor is assumed level: there is no tilt compensation, and the result
/// is a magnetic bearing (no declination correction).
#[must_use]
pub fn heading_degrees(x: f32, y: f32) -> f32 {
    let mut heading_deg = libm::atan2f(y, x).to_degrees();
    if heading_deg < 0.0 {
        heading_deg += 360.0;
    }
    // -0.00001 + 360.0 rounds to 360.0 in f32
    if heading_deg >= 360.0 {
        heading_deg -= 360.0;
    }
    heading_deg
}
