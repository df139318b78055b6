//! Ginzburg V pseudocylindrical world projection, raw form.
//!
//! Both axes are odd polynomials in latitude; longitude enters the x term
//! linearly. Coefficients follow the established TsNIIGAiK calibration.

/// x-polynomial coefficients (constant, phi^2, phi^4, phi^6 terms).
pub const GINZBURG5_XA: f64 = 2.583819;
pub const GINZBURG5_XB: f64 = -0.835827;
pub const GINZBURG5_XC: f64 = 0.170354;
pub const GINZBURG5_XD: f64 = -0.038094;
/// y-polynomial coefficients (constant, phi^2, phi^4 terms).
pub const GINZBURG5_YA: f64 = 1.543313;
pub const GINZBURG5_YB: f64 = -0.411435;
pub const GINZBURG5_YC: f64 = 0.082742;

/// Newton-iteration tolerance for the latitude inverse.
const INVERT_EPSILON: f64 = 1e-12;
/// Newton-iteration cap; the latitude polynomial is strictly monotonic on
/// [-pi/2, pi/2], so this is never reached for finite input.
const INVERT_MAX_ITERATIONS: u32 = 25;

/// Forward projection of radians to unscaled planar coordinates.
pub fn ginzburg5_forward(lambda_rad: f64, phi_rad: f64) -> (f64, f64) {
    let phi2 = phi_rad * phi_rad;
    let x = lambda_rad
        * (GINZBURG5_XA + phi2 * (GINZBURG5_XB + phi2 * (GINZBURG5_XC + phi2 * GINZBURG5_XD)));
    let y = phi_rad * (GINZBURG5_YA + phi2 * (GINZBURG5_YB + phi2 * GINZBURG5_YC));
    (x, y)
}

/// Inverse projection back to radians.
///
/// y depends on latitude alone, so latitude is recovered first by Newton
/// iteration and longitude follows by division.
pub fn ginzburg5_invert(x: f64, y: f64) -> (f64, f64) {
    let mut phi = y / GINZBURG5_YA;
    for _ in 0..INVERT_MAX_ITERATIONS {
        let phi2 = phi * phi;
        let fy = phi * (GINZBURG5_YA + phi2 * (GINZBURG5_YB + phi2 * GINZBURG5_YC)) - y;
        let dy = GINZBURG5_YA + phi2 * (3.0 * GINZBURG5_YB + 5.0 * GINZBURG5_YC * phi2);
        let step = fy / dy;
        phi -= step;
        if step.abs() < INVERT_EPSILON {
            break;
        }
    }

    let phi2 = phi * phi;
    let lambda = x
        / (GINZBURG5_XA + phi2 * (GINZBURG5_XB + phi2 * (GINZBURG5_XC + phi2 * GINZBURG5_XD)));
    (lambda, phi)
}
