//! Generator seeds.
//!
//! Constructors for triples of mutually tangent circles, so callers do not
//! have to solve the tangency conditions by hand. The named presets are the
//! configurations the CLI and config files refer to.

use crate::circle::{Circle, Point};
use crate::error::GasketError;
use crate::tangency::is_tangent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three equal circles of `radius` on an equilateral triangle of side
/// `2·radius`, centroid at the origin.
pub fn equal_triple(radius: f64) -> Result<[Circle; 3], GasketError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(GasketError::InvalidConfiguration(format!(
            "radius must be positive and finite, got {radius}"
        )));
    }
    let h = 2.0 * radius / 3f64.sqrt();
    let k = 1.0 / radius;
    Ok([
        Circle::generator(0.0, h, k),
        Circle::generator(-radius, -h / 2.0, k),
        Circle::generator(radius, -h / 2.0, k),
    ])
}

/// A bounding circle of `outer_radius` at the origin holding two circles
/// whose diameters split its horizontal diameter at `split ∈ (0, 1)`.
///
/// The bounding circle comes first, with negative curvature.
pub fn enclosed_pair(outer_radius: f64, split: f64) -> Result<[Circle; 3], GasketError> {
    if !(outer_radius.is_finite() && outer_radius > 0.0) {
        return Err(GasketError::InvalidConfiguration(format!(
            "outer radius must be positive and finite, got {outer_radius}"
        )));
    }
    if !(split > 0.0 && split < 1.0) {
        return Err(GasketError::InvalidConfiguration(format!(
            "split must lie strictly between 0 and 1, got {split}"
        )));
    }
    let r1 = split * outer_radius;
    let r2 = outer_radius - r1;
    Ok([
        Circle::generator(0.0, 0.0, -1.0 / outer_radius),
        Circle::generator(r1 - outer_radius, 0.0, 1.0 / r1),
        Circle::generator(outer_radius - r2, 0.0, 1.0 / r2),
    ])
}

/// Three externally tangent circles centered on the vertices of a triangle.
/// Each radius is the semi-perimeter minus the opposite side.
pub fn from_triangle(p1: Point, p2: Point, p3: Point) -> Result<[Circle; 3], GasketError> {
    let a = p2.distance(p3);
    let b = p1.distance(p3);
    let c = p1.distance(p2);
    let perimeter = a + b + c;
    let cross = (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x);
    if !perimeter.is_finite() || cross.abs() <= 1e-12 * perimeter * perimeter {
        return Err(GasketError::InvalidConfiguration(
            "triangle vertices are collinear or coincident".to_string(),
        ));
    }

    let s = perimeter / 2.0;
    let circle = |p: Point, opposite: f64| Circle::generator(p.x, p.y, 1.0 / (s - opposite));
    Ok([circle(p1, a), circle(p2, b), circle(p3, c)])
}

/// Place a second generator at `center`, tangent to the circle of
/// `first_radius` around `first_center`.
///
/// When `center` lies inside the first circle the second circle is
/// internally tangent and the first becomes the bounding circle (negative
/// curvature).
pub fn tangent_to(
    first_center: Point,
    first_radius: f64,
    center: Point,
) -> Result<[Circle; 2], GasketError> {
    if !(first_radius.is_finite() && first_radius > 0.0) {
        return Err(GasketError::InvalidConfiguration(format!(
            "first radius must be positive and finite, got {first_radius}"
        )));
    }
    let gap = center.distance(first_center) - first_radius;
    let radius = gap.abs();
    if radius == 0.0 || !radius.is_finite() {
        return Err(GasketError::InvalidConfiguration(
            "second center lies on the first circle".to_string(),
        ));
    }
    let k1 = if gap >= 0.0 {
        1.0 / first_radius
    } else {
        -1.0 / first_radius
    };
    Ok([
        Circle::generator(first_center.x, first_center.y, k1),
        Circle::generator(center.x, center.y, 1.0 / radius),
    ])
}

/// Complete a tangent pair (as returned by [`tangent_to`]) with a third
/// circle tangent to both.
///
/// Centers of such circles lie on a hyperbola branch with foci at the two
/// centers, or on an ellipse when `first` is the bounding circle. The third
/// center is where the ray from the second center through `toward` meets
/// that locus; its radius is the distance to the second center minus the
/// second radius.
pub fn third_tangent(
    first: &Circle,
    second: &Circle,
    toward: Point,
) -> Result<[Circle; 3], GasketError> {
    if second.is_bounding() || !second.curvature().is_finite() || first.curvature() == 0.0 {
        return Err(GasketError::InvalidConfiguration(
            "second circle must have positive finite curvature".to_string(),
        ));
    }
    if !is_tangent(first, second, 1e-9) {
        return Err(GasketError::InvalidConfiguration(
            "first and second circles are not tangent".to_string(),
        ));
    }

    let (c1, c2) = (first.center(), second.center());
    let (r1, r2) = (first.radius(), second.radius());
    let length = toward.distance(c2);
    if !(length.is_finite() && length > 0.0) {
        return Err(GasketError::InvalidConfiguration(
            "direction point coincides with the second center".to_string(),
        ));
    }
    let (ux, uy) = ((toward.x - c2.x) / length, (toward.y - c2.y) / length);
    let along = (c2.x - c1.x) * ux + (c2.y - c1.y) * uy;

    // Distance from the second center to the third along the ray.
    let reach = if first.is_bounding() {
        2.0 * r1 * r2 / (r1 + r2 + along)
    } else {
        2.0 * r1 * r2 / (r1 - r2 - along)
    };
    let r3 = reach - r2;
    if !(r3.is_finite() && r3 > 0.0) {
        return Err(GasketError::InvalidConfiguration(format!(
            "no circle tangent to both lies toward ({}, {})",
            toward.x, toward.y
        )));
    }

    Ok([
        *first,
        *second,
        Circle::generator(c2.x + reach * ux, c2.y + reach * uy, 1.0 / r3),
    ])
}

/// Named generator configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Three unit circles; children of curvature `3 ± 2√3`.
    EqualTriple,
    /// The integral `(-1, 2, 2)` packing inside a unit circle.
    EnclosedPair,
    /// Radii 1, 2 and 3 on a 3-4-5 right triangle.
    Triangle,
    /// Placed point by point: a bounding circle, a circle touching it from
    /// inside, and a third fitted between them.
    Construction,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Self::EqualTriple,
        Self::EnclosedPair,
        Self::Triangle,
        Self::Construction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::EqualTriple => "equal_triple",
            Self::EnclosedPair => "enclosed_pair",
            Self::Triangle => "triangle",
            Self::Construction => "construction",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::EqualTriple => "three unit circles on an equilateral triangle",
            Self::EnclosedPair => "bounding unit circle split by two radius-1/2 circles",
            Self::Triangle => "radii 1, 2, 3 centered on a 3-4-5 right triangle",
            Self::Construction => "radius-2 bounding circle, inner circle at (1, 0), third toward (0, 2)",
        }
    }

    pub fn generators(self) -> Result<[Circle; 3], GasketError> {
        match self {
            Self::EqualTriple => equal_triple(1.0),
            Self::EnclosedPair => enclosed_pair(1.0, 0.5),
            Self::Triangle => from_triangle(
                Point::new(0.0, 0.0),
                Point::new(3.0, 0.0),
                Point::new(0.0, 4.0),
            ),
            Self::Construction => {
                let [first, second] =
                    tangent_to(Point::new(0.0, 0.0), 2.0, Point::new(1.0, 0.0))?;
                third_tangent(&first, &second, Point::new(0.0, 2.0))
            }
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "equal_triple" | "equal" => Ok(Self::EqualTriple),
            "enclosed_pair" | "enclosed" => Ok(Self::EnclosedPair),
            "triangle" => Ok(Self::Triangle),
            "construction" => Ok(Self::Construction),
            _ => Err(format!(
                "unknown preset: {s} (expected one of equal_triple, enclosed_pair, triangle, construction)"
            )),
        }
    }
}
