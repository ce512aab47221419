//! Elliptical arc flattening.
//!
//! Endpoint-to-center conversion follows SVG 1.1 appendix F.6.5, including
//! the radius correction of F.6.6. The arc is then split into pieces of at
//! most a quarter turn, each approximated by one cubic with handle length
//! `4/3 * tan(θ/4)`.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::{DMat2, DVec2, dvec2};

/// Cubic segments `[c1, c2, end]` tracing the arc from `from` to `to`.
///
/// Coincident endpoints yield nothing. A zero radius yields a straight
/// segment expressed as a cubic.
pub fn to_cubics(
    from: DVec2,
    radii: DVec2,
    rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
    to: DVec2,
) -> Vec<[DVec2; 3]> {
    if from == to {
        return Vec::new();
    }
    let (mut rx, mut ry) = (radii.x.abs(), radii.y.abs());
    if rx == 0.0 || ry == 0.0 {
        return vec![[from, to, to]];
    }

    let rot = DMat2::from_angle(rotation_deg.to_radians());
    let p = rot.transpose() * ((from - to) / 2.0);

    let lambda = (p.x * p.x) / (rx * rx) + (p.y * p.y) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * p.y * p.y - ry * ry * p.x * p.x;
    let den = rx * rx * p.y * p.y + ry * ry * p.x * p.x;
    let mut coef = if den == 0.0 { 0.0 } else { (num / den).max(0.0).sqrt() };
    if large_arc == sweep {
        coef = -coef;
    }
    let center_p = dvec2(coef * rx * p.y / ry, -coef * ry * p.x / rx);
    let center = rot * center_p + (from + to) / 2.0;

    let v1 = dvec2((p.x - center_p.x) / rx, (p.y - center_p.y) / ry);
    let v2 = dvec2((-p.x - center_p.x) / rx, (-p.y - center_p.y) / ry);
    let theta1 = signed_angle(DVec2::X, v1);
    let mut sweep_angle = signed_angle(v1, v2);
    if !sweep && sweep_angle > 0.0 {
        sweep_angle -= TAU;
    } else if sweep && sweep_angle < 0.0 {
        sweep_angle += TAU;
    }

    let pieces = (sweep_angle.abs() / FRAC_PI_2 - 1e-9).ceil().max(1.0) as usize;
    let step = sweep_angle / pieces as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let point = |t: f64| center + rot * dvec2(rx * t.cos(), ry * t.sin());
    let tangent = |t: f64| rot * dvec2(-rx * t.sin(), ry * t.cos());

    (0..pieces)
        .map(|i| {
            let t0 = theta1 + step * i as f64;
            let t1 = t0 + step;
            let p0 = if i == 0 { from } else { point(t0) };
            let p1 = if i + 1 == pieces { to } else { point(t1) };
            [p0 + tangent(t0) * k, p1 - tangent(t1) * k, p1]
        })
        .collect()
}

fn signed_angle(u: DVec2, v: DVec2) -> f64 {
    u.perp_dot(v).atan2(u.dot(v))
}
