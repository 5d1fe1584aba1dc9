//! Tangency measurements, generator validation and the lineage audit.
//!
//! Two circles with signed radii `r_a = 1/k_a`, `r_b = 1/k_b` touch exactly
//! when the distance between their centers is `|r_a + r_b|`. The signed
//! form covers both external tangency (two positive radii) and internal
//! tangency against a bounding circle (one negative radius).

use crate::circle::Circle;
use crate::descartes::descartes_residual;
use crate::error::GasketError;
use crate::gasket::GasketBuilder;
use serde::Serialize;
use std::collections::BTreeMap;

/// Absolute tangency defect: `| |z_a − z_b| − |1/k_a + 1/k_b| |`.
pub fn tangency_residual(a: &Circle, b: &Circle) -> f64 {
    let distance = a.center().distance(b.center());
    (distance - (a.signed_radius() + b.signed_radius()).abs()).abs()
}

/// Tangency defect scaled by the size of the pair, `max(1, |r_a| + |r_b|)`.
pub fn relative_residual(a: &Circle, b: &Circle) -> f64 {
    tangency_residual(a, b) / (a.radius() + b.radius()).max(1.0)
}

pub fn is_tangent(a: &Circle, b: &Circle, tolerance: f64) -> bool {
    relative_residual(a, b) <= tolerance
}

/// Checks that three circles can generate a gasket: finite, non-zero
/// curvatures, at most one bounding circle, and every pair tangent within
/// `tolerance`.
pub fn validate_generators(generators: &[Circle; 3], tolerance: f64) -> Result<(), GasketError> {
    for (i, g) in generators.iter().enumerate() {
        if g.curvature() == 0.0 || !g.curvature().is_finite() {
            return Err(GasketError::InvalidConfiguration(format!(
                "generator {} has unsupported curvature {}",
                i + 1,
                g.curvature()
            )));
        }
        if !(g.x().is_finite() && g.y().is_finite()) {
            return Err(GasketError::InvalidConfiguration(format!(
                "generator {} has a non-finite center",
                i + 1
            )));
        }
    }

    let bounding = generators.iter().filter(|g| g.is_bounding()).count();
    if bounding > 1 {
        return Err(GasketError::InvalidConfiguration(format!(
            "{bounding} generators have negative curvature; at most one may enclose the others"
        )));
    }

    for (i, j) in [(0, 1), (1, 2), (2, 0)] {
        let residual = relative_residual(&generators[i], &generators[j]);
        if residual > tolerance {
            return Err(GasketError::InvalidConfiguration(format!(
                "generators {} and {} are not tangent (relative residual {residual:e}, tolerance {tolerance:e})",
                i + 1,
                j + 1
            )));
        }
    }
    Ok(())
}

/// Result of regenerating a gasket while checking every circle against the
/// ancestor triple it was derived from.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub max_level: u32,
    pub circle_count: usize,
    pub levels: BTreeMap<u32, usize>,
    pub tolerance: f64,
    /// Largest relative tangency residual between a circle and one of its
    /// three ancestors.
    pub max_residual: f64,
    pub worst_circle: Option<Circle>,
    pub max_descartes_residual: f64,
    /// Circles whose residual against some ancestor exceeds the tolerance.
    pub untangent_count: usize,
    /// Whether every daughter is strictly more curved than its mother.
    pub curvature_monotone: bool,
}

impl AuditReport {
    pub fn is_sound(&self) -> bool {
        self.untangent_count == 0
    }
}

/// Regenerate the builder's gasket and measure each circle against its
/// ancestor triple.
pub fn audit(builder: &GasketBuilder) -> Result<AuditReport, GasketError> {
    let tolerance = builder.tolerance();
    let mut report = AuditReport {
        max_level: builder.max_level(),
        circle_count: 3,
        levels: BTreeMap::new(),
        tolerance,
        max_residual: 0.0,
        worst_circle: None,
        max_descartes_residual: 0.0,
        untangent_count: 0,
        curvature_monotone: true,
    };
    for g in builder.generators() {
        *report.levels.entry(g.level()).or_default() += 1;
    }

    builder.for_each_descendant(|circle: &Circle, triple: &[Circle; 3]| {
        report.circle_count += 1;
        *report.levels.entry(circle.level()).or_default() += 1;

        let mut tangent = true;
        for ancestor in triple {
            let residual = relative_residual(circle, ancestor);
            if residual > report.max_residual {
                report.max_residual = residual;
                report.worst_circle = Some(*circle);
            }
            tangent &= residual <= tolerance;
        }
        if !tangent {
            report.untangent_count += 1;
        }

        let [m, a2, a3] = triple;
        let quadruple = [
            m.curvature(),
            a2.curvature(),
            a3.curvature(),
            circle.curvature(),
        ];
        report.max_descartes_residual = report
            .max_descartes_residual
            .max(descartes_residual(quadruple));

        // The first slot of a daughter's triple is its mother.
        if circle.level() > m.level() && circle.curvature() <= m.curvature() {
            report.curvature_monotone = false;
        }
    })?;

    tracing::debug!(
        circles = report.circle_count,
        max_residual = report.max_residual,
        untangent = report.untangent_count,
        "gasket audit finished"
    );
    Ok(report)
}
