use std::sync::Arc;

use glam::DVec2;

use super::constraints::GridFrame;
use super::geometry::Region;

/// Where a growth point pulls from.
#[derive(Clone, Debug)]
pub enum Attractor {
    Point(DVec2),
    Curve(Arc<dyn Region>),
}

/// Attractor (positive strength) or repeller (negative strength) with a
/// linear falloff that reaches zero at `radius` cells.
#[derive(Clone, Debug)]
pub struct GrowthPoint {
    pub attractor: Attractor,
    pub strength: f64,
    /// Influence radius in cells
    pub radius: f64,
}

impl GrowthPoint {
    pub fn point(position: DVec2, strength: f64, radius: f64) -> Self {
        Self { attractor: Attractor::Point(position), strength, radius }
    }

    pub fn curve(curve: Arc<dyn Region>, strength: f64, radius: f64) -> Self {
        Self { attractor: Attractor::Curve(curve), strength, radius }
    }

    /// Influence on the cell `(x, y)`; zero past the radius or when the
    /// curve cannot be queried
    pub fn influence(&self, frame: &GridFrame, x: i32, y: i32) -> f64 {
        let center = frame.cell_center(x, y);
        let dist = match &self.attractor {
            Attractor::Point(p) => center.distance(*p),
            Attractor::Curve(curve) => match curve.distance_to(center) {
                Ok(d) => d,
                Err(_) => return 0.0,
            },
        };
        let reach = self.radius * frame.cell_size();
        if !(reach > 0.0) || dist > reach {
            return 0.0;
        }
        self.strength * (1.0 - dist / reach)
    }
}
