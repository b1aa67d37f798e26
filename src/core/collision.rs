//! Pairwise disc collision resolution.
//!
//! A colliding pair is resolved in the frame of its line of centres: both
//! velocities are rotated so the first axis points from `a` to `b`, the normal
//! components are exchanged (equal mass) or mixed by the 1D elastic formula
//! (unequal mass), tangential components are kept, and the result is rotated
//! back. The pair is then pushed apart along the normal so it no longer overlaps.

use crate::core::particle::{Particle, DIM};

/// Unit collision normal from `a` to `b` as `(cos, sin)`.
///
/// Coincident centres have no line of centres. The fallback reconstructs the
/// pre-integration one from the relative velocity (`a` was behind `b` along
/// `v_a - v_b`), and uses +x when the pair is also at relative rest.
fn contact_normal(a: &Particle, b: &Particle, d: [f64; DIM]) -> (f64, f64) {
    let theta = if d[0] != 0.0 || d[1] != 0.0 {
        d[1].atan2(d[0])
    } else {
        let rel = [a.v[0] - b.v[0], a.v[1] - b.v[1]];
        if rel[0] != 0.0 || rel[1] != 0.0 {
            rel[1].atan2(rel[0])
        } else {
            0.0
        }
    };
    let (sin, cos) = theta.sin_cos();
    (cos, sin)
}

#[inline]
fn to_contact_frame(v: [f64; DIM], cos: f64, sin: f64) -> [f64; DIM] {
    [v[0] * cos + v[1] * sin, v[1] * cos - v[0] * sin]
}

#[inline]
fn to_world_frame(u: [f64; DIM], cos: f64, sin: f64) -> [f64; DIM] {
    [u[0] * cos - u[1] * sin, u[1] * cos + u[0] * sin]
}

/// Resolve `a` against `b` if their discs overlap.
///
/// Returns `true` when the pair was overlapping and has been resolved. After
/// the call the centres are exactly `r_a + r_b` apart (up to rounding) along
/// the collision normal. Wall containment is left to the caller.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle) -> bool {
    let d = [b.r[0] - a.r[0], b.r[1] - a.r[1]];
    let dist = d[0].hypot(d[1]);
    let contact = a.radius() + b.radius();
    if dist >= contact {
        return false;
    }

    let (cos, sin) = contact_normal(a, b, d);
    let ua = to_contact_frame(a.v, cos, sin);
    let ub = to_contact_frame(b.v, cos, sin);

    let (na, nb) = if a.mass == b.mass {
        (ub[0], ua[0])
    } else {
        let total = a.mass + b.mass;
        (
            ((a.mass - b.mass) * ua[0] + 2.0 * b.mass * ub[0]) / total,
            ((b.mass - a.mass) * ub[0] + 2.0 * a.mass * ua[0]) / total,
        )
    };

    a.v = to_world_frame([na, ua[1]], cos, sin);
    b.v = to_world_frame([nb, ub[1]], cos, sin);

    let push = (contact - dist) / 2.0;
    a.r[0] -= push * cos;
    a.r[1] -= push * sin;
    b.r[0] += push * cos;
    b.r[1] += push * sin;
    true
}
