//! The circle value type.
//!
//! A circle is identified by its center, its signed curvature and the
//! recursion level at which it was produced. Negative curvature marks a
//! circle that contains the rest of the configuration (an "inside-out"
//! bounding circle).
//!
//! Circles are plain `Copy` values. Ancestor relations are never stored on
//! the circle; the builder passes them down the recursion as arguments.

use crate::complex::Complex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the real plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<Complex> for Point {
    fn from(z: Complex) -> Self {
        Self::new(z.re, z.im)
    }
}

impl From<Point> for Complex {
    fn from(p: Point) -> Self {
        Complex::new(p.x, p.y)
    }
}

/// One circle of a gasket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CircleRecord", into = "CircleRecord")]
pub struct Circle {
    center: Point,
    curvature: f64,
    level: u32,
}

/// Flat wire shape: `{ x, y, curvature, level }`, with `level` optional.
#[derive(Serialize, Deserialize)]
struct CircleRecord {
    x: f64,
    y: f64,
    curvature: f64,
    #[serde(default)]
    level: u32,
}

impl From<CircleRecord> for Circle {
    fn from(r: CircleRecord) -> Self {
        Circle::new(r.x, r.y, r.curvature, r.level)
    }
}

impl From<Circle> for CircleRecord {
    fn from(c: Circle) -> Self {
        CircleRecord {
            x: c.center.x,
            y: c.center.y,
            curvature: c.curvature,
            level: c.level,
        }
    }
}

impl Circle {
    pub const fn new(x: f64, y: f64, curvature: f64, level: u32) -> Self {
        Self {
            center: Point::new(x, y),
            curvature,
            level,
        }
    }

    /// A level-0 circle, the conventional level for generators.
    pub const fn generator(x: f64, y: f64, curvature: f64) -> Self {
        Self::new(x, y, curvature, 0)
    }

    pub fn from_complex(z: Complex, curvature: f64, level: u32) -> Self {
        Self::new(z.re, z.im, curvature, level)
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn x(&self) -> f64 {
        self.center.x
    }

    pub fn y(&self) -> f64 {
        self.center.y
    }

    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// The center as a complex number `x + iy`.
    pub fn z(&self) -> Complex {
        self.center.into()
    }

    /// `|1/k|`; infinite for a zero-curvature (line) circle.
    pub fn radius(&self) -> f64 {
        (1.0 / self.curvature).abs()
    }

    /// `1/k`, negative for a bounding circle.
    pub fn signed_radius(&self) -> f64 {
        1.0 / self.curvature
    }

    /// True when the curvature is negative, i.e. this circle encloses the
    /// others.
    pub fn is_bounding(&self) -> bool {
        self.curvature < 0.0
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.center.x + dx, self.center.y + dy, self.curvature, self.level)
    }

    /// Scale about the origin. Tangency is preserved: centers scale by
    /// `factor` and curvatures by `1/factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.center.x * factor,
            self.center.y * factor,
            self.curvature / factor,
            self.level,
        )
    }

    /// The same circle with its orientation flipped.
    pub fn inverted(&self) -> Self {
        Self::new(self.center.x, self.center.y, -self.curvature, self.level)
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) k={} L{}",
            self.center.x, self.center.y, self.curvature, self.level
        )
    }
}

/// Parses `x,y,k`, yielding a level-0 circle.
impl std::str::FromStr for Circle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, k] = parts[..] else {
            return Err(format!("expected `x,y,k`, got `{s}`"));
        };
        let parse = |label: &str, value: &str| {
            value
                .parse::<f64>()
                .map_err(|e| format!("invalid {label} `{value}` in `{s}`: {e}"))
        };
        let (x, y, k) = (parse("x", x)?, parse("y", y)?, parse("curvature", k)?);
        if !(x.is_finite() && y.is_finite() && k.is_finite()) {
            return Err(format!("circle `{s}` must be finite"));
        }
        Ok(Circle::generator(x, y, k))
    }
}
