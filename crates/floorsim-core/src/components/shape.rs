//! Polygon footprints: axis-aligned rectangles and squares.
//!
//! All shapes are convex, so interference uses a separating-axis test and
//! containment reduces to "every inner vertex strictly inside every outer
//! edge". Both predicates return `false` for degenerate input (fewer than
//! three vertices, zero area, non-finite coordinates) so placement checks
//! stay total.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::common::Position;
use crate::error::GeometryError;

/// Where a shape's reference point sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefPointType {
    /// Geometric center.
    #[default]
    Center,
    /// Lower-left corner.
    Corner,
}

impl FromStr for RefPointType {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(RefPointType::Center),
            "corner" => Ok(RefPointType::Corner),
            other => Err(GeometryError::InvalidRefPointType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    Rectangle,
    Square,
}

/// The tagged variant of a footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Rectangle { length: f64, width: f64 },
    Square { side: f64 },
}

impl ShapeKind {
    /// (length along x, width along y)
    pub fn dimensions(&self) -> (f64, f64) {
        match *self {
            ShapeKind::Rectangle { length, width } => (length, width),
            ShapeKind::Square { side } => (side, side),
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeKind::Rectangle { .. } => ShapeType::Rectangle,
            ShapeKind::Square { .. } => ShapeType::Square,
        }
    }
}

/// Serializable form of a [`Shape`], matching the persisted snapshot layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    pub dimension: [f64; 2],
    #[serde(default)]
    pub ref_pt_type: RefPointType,
    #[serde(default)]
    pub buffer: f64,
    #[serde(default)]
    pub ref_pt: [f64; 2],
}

/// Anything with a closed polygon boundary.
pub trait Polygonal {
    /// Vertices in order; the last connects back to the first.
    fn boundary(&self) -> &[Position];

    /// Closed intersection test. Touching boundaries count.
    fn interferes<P: Polygonal + ?Sized>(&self, other: &P) -> bool {
        polygons_interfere(self.boundary(), other.boundary())
    }

    /// `inner` lies in the interior of `self`, not merely touching the edge.
    fn contains<P: Polygonal + ?Sized>(&self, inner: &P) -> bool {
        contains_properly(self.boundary(), inner.boundary())
    }
}

impl Polygonal for [Position] {
    fn boundary(&self) -> &[Position] {
        self
    }
}

/// An axis-aligned rectangular footprint anchored at a reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShapeRecord", into = "ShapeRecord")]
pub struct Shape {
    kind: ShapeKind,
    ref_type: RefPointType,
    reference: Position,
    buffer: f64,
    boundary: Vec<Position>,
}

impl Shape {
    pub fn rectangle(
        length: f64,
        width: f64,
        reference: Position,
        ref_type: RefPointType,
    ) -> Result<Self, GeometryError> {
        Self::build(ShapeKind::Rectangle { length, width }, ref_type, reference, 0.0)
    }

    pub fn square(
        side: f64,
        reference: Position,
        ref_type: RefPointType,
    ) -> Result<Self, GeometryError> {
        Self::build(ShapeKind::Square { side }, ref_type, reference, 0.0)
    }

    /// Set the buffer margin. Negative or NaN values are stored as zero.
    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = if buffer > 0.0 { buffer } else { 0.0 };
        self
    }

    fn build(
        kind: ShapeKind,
        ref_type: RefPointType,
        reference: Position,
        buffer: f64,
    ) -> Result<Self, GeometryError> {
        let (length, width) = kind.dimensions();
        let names = match kind {
            ShapeKind::Rectangle { .. } => ("Length", "Width"),
            ShapeKind::Square { .. } => ("Side", "Side"),
        };
        // `!(x > 0)` also catches NaN
        if !(length > 0.0) || !length.is_finite() {
            return Err(GeometryError::NonPositiveDimension { name: names.0, value: length });
        }
        if !(width > 0.0) || !width.is_finite() {
            return Err(GeometryError::NonPositiveDimension { name: names.1, value: width });
        }
        let reference = Position::try_new(reference.x, reference.y)?;

        let boundary = match ref_type {
            RefPointType::Corner => vec![
                reference,
                reference + (length, 0.0),
                reference + (length, width),
                reference + (0.0, width),
            ],
            RefPointType::Center => {
                let (hl, hw) = (length / 2.0, width / 2.0);
                vec![
                    reference + (-hl, -hw),
                    reference + (hl, -hw),
                    reference + (hl, hw),
                    reference + (-hl, hw),
                ]
            }
        };

        Ok(Self {
            kind,
            ref_type,
            reference,
            buffer: 0.0,
            boundary,
        }
        .with_buffer(buffer))
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn ref_type(&self) -> RefPointType {
        self.ref_type
    }

    pub fn reference(&self) -> Position {
        self.reference
    }

    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    /// Lower-left and upper-right corners.
    pub fn bounds(&self) -> (Position, Position) {
        let mut min = Position::new(f64::INFINITY, f64::INFINITY);
        let mut max = Position::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in &self.boundary {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }
        (min, max)
    }

    /// Rigid translation by `to - from`. The reference point moves by the same offset.
    pub fn translate(&mut self, from: Position, to: Position) {
        let offset = to - from;
        let delta = (offset.x, offset.y);
        for v in &mut self.boundary {
            *v = *v + delta;
        }
        self.reference = self.reference + delta;
    }

    /// A translated copy; `self` is untouched.
    pub fn translated(&self, from: Position, to: Position) -> Shape {
        let mut copy = self.clone();
        copy.translate(from, to);
        copy
    }

    pub fn record(&self) -> ShapeRecord {
        let (length, width) = self.kind.dimensions();
        ShapeRecord {
            shape_type: self.kind.shape_type(),
            dimension: [length, width],
            ref_pt_type: self.ref_type,
            buffer: self.buffer,
            ref_pt: self.reference.to_array(),
        }
    }

    pub fn from_record(record: &ShapeRecord) -> Result<Self, GeometryError> {
        let [length, width] = record.dimension;
        let reference = Position::try_from(record.ref_pt)?;
        let kind = match record.shape_type {
            ShapeType::Rectangle => ShapeKind::Rectangle { length, width },
            ShapeType::Square if length != width => {
                return Err(GeometryError::UnequalSquareSides { length, width });
            }
            ShapeType::Square => ShapeKind::Square { side: length },
        };
        Self::build(kind, record.ref_pt_type, reference, record.buffer)
    }

    /// Short phrase for people, e.g. "Rectangle of size (2x1)".
    pub fn description(&self) -> String {
        match self.kind {
            ShapeKind::Rectangle { length, width } => {
                format!("Rectangle of size ({}x{})", length, width)
            }
            ShapeKind::Square { side } => format!("Square of size ({})", side),
        }
    }
}

impl Polygonal for Shape {
    fn boundary(&self) -> &[Position] {
        &self.boundary
    }
}

impl TryFrom<ShapeRecord> for Shape {
    type Error = GeometryError;
    fn try_from(record: ShapeRecord) -> Result<Self, Self::Error> {
        Shape::from_record(&record)
    }
}

impl From<Shape> for ShapeRecord {
    fn from(shape: Shape) -> Self {
        shape.record()
    }
}

// ── Polygon predicates ──────────────────────────────────────────────────

fn is_usable(poly: &[Position]) -> bool {
    poly.len() >= 3 && poly.iter().all(|p| p.x.is_finite() && p.y.is_finite())
}

fn signed_area(poly: &[Position]) -> f64 {
    let n = poly.len();
    let mut acc = 0.0;
    for i in 0..n {
        let p = poly[i];
        let q = poly[(i + 1) % n];
        acc += p.x * q.y - q.x * p.y;
    }
    acc / 2.0
}

fn project(poly: &[Position], ax: f64, ay: f64) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for p in poly {
        let dot = p.x * ax + p.y * ay;
        lo = lo.min(dot);
        hi = hi.max(dot);
    }
    (lo, hi)
}

/// Separating-axis test for two convex polygons. Shared edges or corners
/// count as interference.
pub fn polygons_interfere(a: &[Position], b: &[Position]) -> bool {
    if !is_usable(a) || !is_usable(b) {
        return false;
    }
    for poly in [a, b] {
        let n = poly.len();
        for i in 0..n {
            let p = poly[i];
            let q = poly[(i + 1) % n];
            let (ax, ay) = (-(q.y - p.y), q.x - p.x);
            if ax == 0.0 && ay == 0.0 {
                continue;
            }
            let (min_a, max_a) = project(a, ax, ay);
            let (min_b, max_b) = project(b, ax, ay);
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
    }
    true
}

/// Every vertex of `inner` lies strictly inside the convex polygon `outer`.
pub fn contains_properly(outer: &[Position], inner: &[Position]) -> bool {
    if !is_usable(outer) || !is_usable(inner) {
        return false;
    }
    let area = signed_area(outer);
    if area == 0.0 {
        return false;
    }
    let orientation = area.signum();
    let n = outer.len();
    inner.iter().all(|v| {
        (0..n).all(|i| {
            let p = outer[i];
            let q = outer[(i + 1) % n];
            let cross = (q.x - p.x) * (v.y - p.y) - (q.y - p.y) * (v.x - p.x);
            cross * orientation > 0.0
        })
    })
}
