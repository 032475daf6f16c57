// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Closest point on triangle `abc` to `p` and its barycentric weights.
///
/// Follows the Voronoi-region classification from Ericson,
/// "Real-Time Collision Detection", section 5.1.5.
pub fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> (Point3<f64>, [f64; 3]) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (*a, [1.0, 0.0, 0.0]);
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (*b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (*c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, [0.0, 1.0 - w, w]);
    }

    let denom = va + vb + vc;
    if denom.abs() <= f64::EPSILON * (ab.norm_squared() + ac.norm_squared()) {
        // Degenerate triangle: fall back to the nearest edge
        return closest_on_degenerate(p, a, b, c);
    }
    let v = vb / denom;
    let w = vc / denom;
    (a + ab * v + ac * w, [1.0 - v - w, v, w])
}

fn closest_on_degenerate(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> (Point3<f64>, [f64; 3]) {
    let (q_ab, t_ab) = closest_point_on_segment(p, a, b);
    let (q_bc, t_bc) = closest_point_on_segment(p, b, c);
    let (q_ca, t_ca) = closest_point_on_segment(p, c, a);

    let candidates = [
        (q_ab, [1.0 - t_ab, t_ab, 0.0]),
        (q_bc, [0.0, 1.0 - t_bc, t_bc]),
        (q_ca, [t_ca, 0.0, 1.0 - t_ca]),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if (candidate.0 - p).norm_squared() < (best.0 - p).norm_squared() {
            best = *candidate;
        }
    }
    best
}

/// Closest point on segment `ab` to `p` and its parameter in `[0, 1]`
pub fn closest_point_on_segment(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
) -> (Point3<f64>, f64) {
    let ab = b - a;
    let length2 = ab.norm_squared();
    if length2 == 0.0 {
        return (*a, 0.0);
    }
    let t = clamp((p - a).dot(&ab) / length2, 0.0, 1.0);
    (a + ab * t, t)
}

/// Unit vector along `v`, or zero for a zero-length input
pub fn normalize_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    let norm = v.norm();
    if norm > 0.0 {
        v / norm
    } else {
        Vector3::zeros()
    }
}

/// Clamp a value between min and max
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
