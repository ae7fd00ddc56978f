//! Common value types shared by shapes, paths and vehicles.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::GeometryError;

/// A point on the warehouse floor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a position, rejecting NaN or infinite coordinates.
    pub fn try_new(x: f64, y: f64) -> Result<Self, GeometryError> {
        if x.is_finite() && y.is_finite() {
            Ok(Self { x, y })
        } else {
            Err(GeometryError::NonFiniteCoordinate { x, y })
        }
    }

    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P({:.2}, {:.2})", self.x, self.y)
    }
}

impl std::ops::Add for Position {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Add<(f64, f64)> for Position {
    type Output = Self;
    fn add(self, (dx, dy): (f64, f64)) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::ops::Sub for Position {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Sub<(f64, f64)> for Position {
    type Output = Self;
    fn sub(self, (dx, dy): (f64, f64)) -> Self {
        Self {
            x: self.x - dx,
            y: self.y - dy,
        }
    }
}

impl TryFrom<(f64, f64)> for Position {
    type Error = GeometryError;
    fn try_from((x, y): (f64, f64)) -> Result<Self, Self::Error> {
        Self::try_new(x, y)
    }
}

impl TryFrom<[f64; 2]> for Position {
    type Error = GeometryError;
    fn try_from([x, y]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::try_new(x, y)
    }
}

/// Rows from tabular input; anything but exactly two finite numbers is rejected.
impl TryFrom<&[f64]> for Position {
    type Error = GeometryError;
    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        match values {
            [x, y] => Self::try_new(*x, *y),
            _ => Err(GeometryError::NonFiniteCoordinate {
                x: f64::NAN,
                y: f64::NAN,
            }),
        }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = GeometryError;
    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::try_from(values.as_slice())
    }
}

/// Heading angle in radians, always kept in (-π, π].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Orientation(f64);

impl Orientation {
    pub fn new(angle: f64) -> Self {
        Self(Self::normalize(angle))
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::new(degrees.to_radians())
    }

    pub fn radians(&self) -> f64 {
        self.0
    }

    pub fn set(&mut self, angle: f64) {
        self.0 = Self::normalize(angle);
    }

    /// Map any finite angle into (-π, π].
    pub fn normalize(angle: f64) -> f64 {
        let wrapped = angle.rem_euclid(2.0 * PI);
        if wrapped > PI {
            wrapped - 2.0 * PI
        } else {
            wrapped
        }
    }
}

impl std::ops::AddAssign<f64> for Orientation {
    fn add_assign(&mut self, delta: f64) {
        self.0 = Self::normalize(self.0 + delta);
    }
}

impl std::ops::SubAssign<f64> for Orientation {
    fn sub_assign(&mut self, delta: f64) {
        self.0 = Self::normalize(self.0 - delta);
    }
}

/// Slope of the line from `src` to `dest`.
///
/// A vertical line (same x) yields `f64::INFINITY` instead of failing.
pub fn slope(src: Position, dest: Position) -> f64 {
    let dx = dest.x - src.x;
    if dx == 0.0 {
        return f64::INFINITY;
    }
    (dest.y - src.y) / dx
}

/// Pose and velocity of a mobile unit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Kinematic {
    pub position: Position,
    pub orientation: Orientation,
    /// Displacement per tick.
    pub velocity: (f64, f64),
}

impl Kinematic {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            orientation: Orientation::default(),
            velocity: (0.0, 0.0),
        }
    }

    pub fn is_still(&self) -> bool {
        self.velocity == (0.0, 0.0)
    }

    /// Move to `to`, recording the displacement as velocity and heading.
    pub fn relocate(&mut self, to: Position) {
        let d = to - self.position;
        self.velocity = (d.x, d.y);
        if d.x != 0.0 || d.y != 0.0 {
            self.orientation.set(d.y.atan2(d.x));
        }
        self.position = to;
    }

    pub fn halt(&mut self) {
        self.velocity = (0.0, 0.0);
    }
}
