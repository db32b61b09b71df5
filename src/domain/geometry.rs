//! Planar geometry the growth engine consults through [`Region`].
//!
//! The engine never looks at vertices; it only asks whether a world point
//! lies inside a region, how far a point is from its outline, and where
//! its bounding box sits. [`Polygon`] and [`Polyline`] are the built-in
//! implementations used by scenario files.

use std::fmt;

use glam::DVec2;
use thiserror::Error;

/// Distances below this count as lying on an outline
const ON_OUTLINE_EPS: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("region needs at least {needed} vertices, got {got}")]
    TooFewVertices { needed: usize, got: usize },
    #[error("query point ({x}, {y}) is not finite")]
    NonFinitePoint { x: f64, y: f64 },
    #[error("region has non-finite coordinates")]
    NonFiniteGeometry,
    #[error("containment is undefined for an open curve")]
    OpenCurve,
}

/// A planar region or curve the constraint layer can query.
pub trait Region: Send + Sync + fmt::Debug {
    /// Strict containment: points on the outline are not inside
    fn contains_point(&self, p: DVec2) -> Result<bool, GeometryError>;

    /// Shortest distance from `p` to the outline
    fn distance_to(&self, p: DVec2) -> Result<f64, GeometryError>;

    /// `(min, max)` corners
    fn bounding_box(&self) -> Result<(DVec2, DVec2), GeometryError>;
}

/// Closed polygon; the last vertex connects back to the first.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<DVec2>,
}

impl Polygon {
    pub fn new(vertices: Vec<DVec2>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle spanning two corners
    pub fn rectangle(min: DVec2, max: DVec2) -> Self {
        Self::new(vec![
            DVec2::new(min.x, min.y),
            DVec2::new(max.x, min.y),
            DVec2::new(max.x, max.y),
            DVec2::new(min.x, max.y),
        ])
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    fn validate(&self) -> Result<(), GeometryError> {
        if self.vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices { needed: 3, got: self.vertices.len() });
        }
        if !self.vertices.iter().all(|v| v.is_finite()) {
            return Err(GeometryError::NonFiniteGeometry);
        }
        Ok(())
    }

    fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

impl Region for Polygon {
    fn contains_point(&self, p: DVec2) -> Result<bool, GeometryError> {
        self.validate()?;
        check_point(p)?;
        if self.distance_to(p)? < ON_OUTLINE_EPS {
            return Ok(false);
        }
        // Even-odd ray cast towards +x
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        Ok(inside)
    }

    fn distance_to(&self, p: DVec2) -> Result<f64, GeometryError> {
        self.validate()?;
        check_point(p)?;
        Ok(self
            .edges()
            .map(|(a, b)| segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min))
    }

    fn bounding_box(&self) -> Result<(DVec2, DVec2), GeometryError> {
        self.validate()?;
        Ok(bounds_of(&self.vertices))
    }
}

/// Open polyline. A single point is a valid (degenerate) curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    points: Vec<DVec2>,
}

impl Polyline {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    fn validate(&self) -> Result<(), GeometryError> {
        if self.points.is_empty() {
            return Err(GeometryError::TooFewVertices { needed: 1, got: 0 });
        }
        if !self.points.iter().all(|v| v.is_finite()) {
            return Err(GeometryError::NonFiniteGeometry);
        }
        Ok(())
    }
}

impl Region for Polyline {
    fn contains_point(&self, _p: DVec2) -> Result<bool, GeometryError> {
        Err(GeometryError::OpenCurve)
    }

    fn distance_to(&self, p: DVec2) -> Result<f64, GeometryError> {
        self.validate()?;
        check_point(p)?;
        if let [only] = self.points.as_slice() {
            return Ok(p.distance(*only));
        }
        Ok(self
            .points
            .windows(2)
            .map(|w| segment_distance(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min))
    }

    fn bounding_box(&self) -> Result<(DVec2, DVec2), GeometryError> {
        self.validate()?;
        Ok(bounds_of(&self.points))
    }
}

fn check_point(p: DVec2) -> Result<(), GeometryError> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinitePoint { x: p.x, y: p.y })
    }
}

fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn bounds_of(points: &[DVec2]) -> (DVec2, DVec2) {
    points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::rectangle(DVec2::ZERO, DVec2::new(10.0, 10.0))
    }

    #[test]
    fn test_polygon_containment() {
        let sq = square();
        assert_eq!(sq.contains_point(DVec2::new(5.0, 5.0)), Ok(true));
        assert_eq!(sq.contains_point(DVec2::new(11.0, 5.0)), Ok(false));
        // On the outline is not inside
        assert_eq!(sq.contains_point(DVec2::new(10.0, 5.0)), Ok(false));
    }

    #[test]
    fn test_concave_polygon() {
        // L-shape: the notch at the top right is outside
        let l = Polygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 5.0),
            DVec2::new(5.0, 5.0),
            DVec2::new(5.0, 10.0),
            DVec2::new(0.0, 10.0),
        ]);
        assert_eq!(l.contains_point(DVec2::new(2.0, 8.0)), Ok(true));
        assert_eq!(l.contains_point(DVec2::new(8.0, 8.0)), Ok(false));
    }

    #[test]
    fn test_polygon_distance_and_bounds() {
        let sq = square();
        let d = sq.distance_to(DVec2::new(5.0, 3.0)).unwrap();
        assert!((d - 3.0).abs() < 1e-12);
        let d = sq.distance_to(DVec2::new(13.0, 14.0)).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
        assert_eq!(sq.bounding_box(), Ok((DVec2::ZERO, DVec2::new(10.0, 10.0))));
    }

    #[test]
    fn test_degenerate_polygon_errors() {
        let line = Polygon::new(vec![DVec2::ZERO, DVec2::ONE]);
        assert!(matches!(
            line.contains_point(DVec2::ZERO),
            Err(GeometryError::TooFewVertices { needed: 3, got: 2 })
        ));
        assert!(matches!(
            square().contains_point(DVec2::new(f64::NAN, 0.0)),
            Err(GeometryError::NonFinitePoint { .. })
        ));
    }

    #[test]
    fn test_polyline_distance() {
        let line = Polyline::new(vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)]);
        assert!((line.distance_to(DVec2::new(5.0, 2.0)).unwrap() - 2.0).abs() < 1e-12);
        assert!((line.distance_to(DVec2::new(-3.0, 4.0)).unwrap() - 5.0).abs() < 1e-12);
        assert_eq!(line.contains_point(DVec2::ZERO), Err(GeometryError::OpenCurve));

        let point = Polyline::new(vec![DVec2::new(1.0, 1.0)]);
        assert!((point.distance_to(DVec2::new(4.0, 5.0)).unwrap() - 5.0).abs() < 1e-12);
    }
}
