//! Descartes' circle theorem, real and complex.
//!
//! For four mutually tangent circles with curvatures `k1..k4`:
//!
//! ```text
//! (k1 + k2 + k3 + k4)² = 2·(k1² + k2² + k3² + k4²)
//! ```
//!
//! and, with centers as complex numbers `zi`, the same relation holds for
//! the products `ki·zi`. Solving for the fourth circle gives two children
//! per triple. Once one solution is known, the other follows linearly
//! (`k + k' = 2·(k1 + k2 + k3)`), which is the daughter formula used for
//! every step of the recursion after seeding.
//!
//! Every function here is pure and deterministic.

use crate::circle::Circle;
use crate::complex::Complex;
use crate::error::GasketError;
use crate::tangency::tangency_residual;

/// Relative slack under which a negative discriminant is treated as round-off.
const DISCRIMINANT_SLACK: f64 = 1e-12;

/// Curvatures `(k4, k5)` of the two circles tangent to three mutually
/// tangent circles: `k1 + k2 + k3 ± 2·sqrt(k1k2 + k2k3 + k3k1)`.
///
/// `k4` is always the larger of the two.
pub fn curvatures_of_children(
    a1: &Circle,
    a2: &Circle,
    a3: &Circle,
) -> Result<(f64, f64), GasketError> {
    let (k1, k2, k3) = (a1.curvature(), a2.curvature(), a3.curvature());
    let p = k1 + k2 + k3;
    let products = [k1 * k2, k2 * k3, k3 * k1];
    let discriminant: f64 = products.iter().sum();
    if !discriminant.is_finite() {
        return Err(GasketError::domain(
            "curvatures_of_children",
            format!("non-finite discriminant from curvatures {k1}, {k2}, {k3}"),
        ));
    }

    let scale: f64 = products.iter().map(|v| v.abs()).sum();
    let discriminant = if discriminant < 0.0 {
        if -discriminant > DISCRIMINANT_SLACK * scale {
            return Err(GasketError::domain(
                "curvatures_of_children",
                format!(
                    "negative discriminant {discriminant} for curvatures {k1}, {k2}, {k3}"
                ),
            ));
        }
        0.0
    } else {
        discriminant
    };

    let q = 2.0 * discriminant.sqrt();
    Ok((p + q, p - q))
}

/// Centers `(z4, z5)` of the children with curvatures `k4` and `k5`:
///
/// ```text
/// p = k1·z1 + k2·z2 + k3·z3
/// q = 2·sqrt(k1k2·z1z2 + k2k3·z2z3 + k3k1·z3z1)
/// z4 = (p + q) / k4,   z5 = (p − q) / k5
/// ```
///
/// `q` is taken on the principal branch. That fixes `q` only up to sign
/// relative to the curvature ordering, so both pairings are scored against
/// the three ancestors and the one whose first child is tangent to them is
/// kept. The two children always use opposite signs.
pub fn children_centers(
    a1: &Circle,
    a2: &Circle,
    a3: &Circle,
    k4: f64,
    k5: f64,
) -> Result<(Complex, Complex), GasketError> {
    for (label, k) in [("k4", k4), ("k5", k5)] {
        if k == 0.0 || !k.is_finite() {
            return Err(GasketError::domain(
                "children_centers",
                format!("{label} = {k} cannot be a divisor; the child degenerates to a line"),
            ));
        }
    }

    let (k1, k2, k3) = (a1.curvature(), a2.curvature(), a3.curvature());
    let (z1, z2, z3) = (a1.z(), a2.z(), a3.z());

    let p = z1 * k1 + z2 * k2 + z3 * k3;
    let q = (z1 * z2 * (k1 * k2) + z2 * z3 * (k2 * k3) + z3 * z1 * (k3 * k1)).sqrt() * 2.0;

    let ancestors = [a1, a2, a3];
    let plus = (p + q) / k4;
    let minus = (p - q) / k4;
    let (z4, z5) = if fit(minus, k4, &ancestors) < fit(plus, k4, &ancestors) {
        (minus, (p + q) / k5)
    } else {
        (plus, (p - q) / k5)
    };

    if !(z4.is_finite() && z5.is_finite()) {
        return Err(GasketError::domain(
            "children_centers",
            format!("non-finite child center ({z4}, {z5})"),
        ));
    }
    Ok((z4, z5))
}

/// Summed tangency residual of a candidate center against the ancestors.
fn fit(z: Complex, k: f64, ancestors: &[&Circle; 3]) -> f64 {
    let candidate = Circle::from_complex(z, k, 0);
    ancestors
        .iter()
        .map(|a| tangency_residual(&candidate, a))
        .sum()
}

/// The two children of three mutually tangent circles.
///
/// Both are reported at the highest ancestor level, so children of
/// level-0 generators are level 0 as well.
pub fn complex_descartes(
    a1: &Circle,
    a2: &Circle,
    a3: &Circle,
) -> Result<(Circle, Circle), GasketError> {
    let (k4, k5) = curvatures_of_children(a1, a2, a3)?;
    let (z4, z5) = children_centers(a1, a2, a3, k4, k5)?;
    let level = a1.level().max(a2.level()).max(a3.level());
    Ok((
        Circle::from_complex(z4, k4, level),
        Circle::from_complex(z5, k5, level),
    ))
}

/// Curvature of the daughter of `mother` that replaces `a1`:
/// `2·(k_m + k_a2 + k_a3) − k_a1`.
///
/// `a1` is the other solution for the triple `(mother, a2, a3)`, which is
/// why one known circle yields exactly one new one.
pub fn daughter_curvature(mother: &Circle, a1: &Circle, a2: &Circle, a3: &Circle) -> f64 {
    2.0 * (mother.curvature() + a2.curvature() + a3.curvature()) - a1.curvature()
}

/// The daughter with a precomputed curvature `k`, one level below `mother`.
pub fn daughter_with_curvature(
    mother: &Circle,
    a1: &Circle,
    a2: &Circle,
    a3: &Circle,
    k: f64,
) -> Result<Circle, GasketError> {
    if k == 0.0 || !k.is_finite() {
        return Err(GasketError::domain(
            "daughter",
            format!("daughter curvature {k} of mother {mother} cannot be a divisor"),
        ));
    }
    let weighted =
        mother.z() * mother.curvature() + a2.z() * a2.curvature() + a3.z() * a3.curvature();
    let z = (weighted * 2.0 - a1.z() * a1.curvature()) / k;
    if !z.is_finite() {
        return Err(GasketError::domain(
            "daughter",
            format!("non-finite daughter center {z} of mother {mother}"),
        ));
    }
    Ok(Circle::from_complex(z, k, mother.level().saturating_add(1)))
}

/// The daughter of `mother` tangent to `mother`, `a2` and `a3`.
pub fn daughter(
    mother: &Circle,
    a1: &Circle,
    a2: &Circle,
    a3: &Circle,
) -> Result<Circle, GasketError> {
    let k = daughter_curvature(mother, a1, a2, a3);
    daughter_with_curvature(mother, a1, a2, a3, k)
}

/// How far four curvatures are from the Descartes relation, relative to
/// their squared magnitude. Zero for an exact Descartes quadruple.
pub fn descartes_residual(k: [f64; 4]) -> f64 {
    let sum: f64 = k.iter().sum();
    let squares: f64 = k.iter().map(|v| v * v).sum();
    (sum * sum - 2.0 * squares).abs() / squares.max(1.0)
}
