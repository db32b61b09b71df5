//! Where cells may exist at all.
//!
//! Geometry is queried once per cell at build time and the answers are
//! kept in flat masks, so `is_allowed` during growth is a lookup.

use std::sync::Arc;

use glam::DVec2;
use rayon::prelude::*;
use tracing::debug;

use super::geometry::Region;
use super::grid::{CellMask, Pos};
use crate::error::GrowthError;

/// Maps grid cells to world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridFrame {
    origin: DVec2,
    cell_size: f64,
    cols: i32,
    rows: i32,
}

impl GridFrame {
    pub fn new(origin: DVec2, cell_size: f64, cols: i32, rows: i32) -> Self {
        Self { origin, cell_size, cols: cols.max(0), rows: rows.max(0) }
    }

    /// Frame covering the box `min..max`, one extra row and column past
    /// the rounded-up extent. Fails on a bad cell size or when the cell
    /// count would pass `max_cells`.
    pub fn covering(
        min: DVec2,
        max: DVec2,
        cell_size: f64,
        max_cells: u64,
    ) -> Result<Self, GrowthError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GrowthError::InvalidCellSize(cell_size));
        }
        let extent = (max - min).max(DVec2::ZERO);
        let cols = (extent.x / cell_size).ceil() + 1.0;
        let rows = (extent.y / cell_size).ceil() + 1.0;
        if !(cols * rows <= max_cells as f64) {
            return Err(GrowthError::GridTooLarge {
                cols: saturating_count(cols),
                rows: saturating_count(rows),
                limit: max_cells,
            });
        }
        Ok(Self::new(min, cell_size, cols as i32, rows as i32))
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// World position of the center of cell `(x, y)`
    pub fn cell_center(&self, x: i32, y: i32) -> DVec2 {
        self.origin + (DVec2::new(x as f64, y as f64) + 0.5) * self.cell_size
    }

    /// Cell containing a world position (may be out of bounds)
    pub fn world_to_cell(&self, p: DVec2) -> Pos {
        let local = ((p - self.origin) / self.cell_size).floor();
        (local.x as i32, local.y as i32)
    }
}

fn saturating_count(v: f64) -> u64 {
    if v.is_finite() { v as u64 } else { u64::MAX }
}

/// Immutable per-run legality masks.
#[derive(Debug)]
pub struct SpatialConstraints {
    frame: GridFrame,
    allowed: CellMask,
    obstacles: CellMask,
}

impl SpatialConstraints {
    /// Start building constraints bounded by a closed region. The grid
    /// frame is the region's bounding box.
    pub fn bounded_by(
        boundary: Arc<dyn Region>,
        cell_size: f64,
        max_cells: u64,
    ) -> Result<SpatialConstraintsBuilder, GrowthError> {
        let (min, max) = boundary.bounding_box()?;
        let frame = GridFrame::covering(min, max, cell_size, max_cells)?;
        let mut builder = SpatialConstraintsBuilder::new(frame);
        builder.boundary = Some(boundary);
        Ok(builder)
    }

    /// Start building constraints over an explicit frame with no boundary
    pub fn unbounded(frame: GridFrame) -> SpatialConstraintsBuilder {
        SpatialConstraintsBuilder::new(frame)
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.frame.cols, self.frame.rows)
    }

    /// Whether a cell may ever be alive
    pub fn is_allowed(&self, x: i32, y: i32) -> bool {
        self.allowed.contains(x, y)
    }

    pub fn allowed_count(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.obstacles.contains(x, y)
    }

    /// Cells blocked by an obstacle
    pub fn obstacle_cells(&self) -> &CellMask {
        &self.obstacles
    }

    /// Obstacle cells among the 4 neighbors of `(x, y)`
    pub fn adjacent_obstacles(&self, x: i32, y: i32) -> usize {
        super::grid::NEIGHBORS_4
            .iter()
            .filter(|(dx, dy)| self.is_obstacle(x + dx, y + dy))
            .count()
    }
}

pub struct SpatialConstraintsBuilder {
    frame: GridFrame,
    boundary: Option<Arc<dyn Region>>,
    membranes: Vec<Arc<dyn Region>>,
    obstacles: Vec<Arc<dyn Region>>,
    outer_lines: Vec<Arc<dyn Region>>,
    obstacle_clearance: f64,
    outer_line_clearance: f64,
}

impl SpatialConstraintsBuilder {
    fn new(frame: GridFrame) -> Self {
        Self {
            frame,
            boundary: None,
            membranes: Vec::new(),
            obstacles: Vec::new(),
            outer_lines: Vec::new(),
            obstacle_clearance: 1.0,
            outer_line_clearance: 0.5,
        }
    }

    /// Closed region whose interior is excluded
    pub fn membrane(mut self, region: Arc<dyn Region>) -> Self {
        self.membranes.push(region);
        self
    }

    /// Region or curve whose surroundings are blocked and penalized
    pub fn obstacle(mut self, region: Arc<dyn Region>) -> Self {
        self.obstacles.push(region);
        self
    }

    /// Curve that growth must keep clear of
    pub fn outer_line(mut self, curve: Arc<dyn Region>) -> Self {
        self.outer_lines.push(curve);
        self
    }

    /// Clearances in cells
    pub fn clearances(mut self, obstacle: f64, outer_line: f64) -> Self {
        self.obstacle_clearance = obstacle;
        self.outer_line_clearance = outer_line;
        self
    }

    /// Rasterize every region onto the frame.
    pub fn build(self) -> SpatialConstraints {
        let frame = self.frame;
        let cols = frame.cols;
        let n = frame.cell_count();

        // (allowed, obstacle) per cell, row-major
        let flags: Vec<(bool, bool)> = (0..n)
            .into_par_iter()
            .map(|i| {
                let (x, y) = ((i % cols as usize) as i32, (i / cols as usize) as i32);
                let center = frame.cell_center(x, y);
                let obstacle = self.blocks_as_obstacle(center);
                (!obstacle && self.admits(center), obstacle)
            })
            .collect();

        let rows = frame.rows;
        let mut allowed = CellMask::new(cols, rows);
        let mut obstacles = CellMask::new(cols, rows);
        for (i, (ok, blocked)) in flags.into_iter().enumerate() {
            let (x, y) = ((i % cols as usize) as i32, (i / cols as usize) as i32);
            if ok {
                allowed.insert(x, y);
            }
            if blocked {
                obstacles.insert(x, y);
            }
        }
        debug!(
            cols,
            rows,
            allowed = allowed.len(),
            obstacles = obstacles.len(),
            "rasterized spatial constraints"
        );
        SpatialConstraints { frame, allowed, obstacles }
    }

    fn blocks_as_obstacle(&self, p: DVec2) -> bool {
        let reach = self.obstacle_clearance * self.frame.cell_size;
        self.obstacles.iter().any(|o| {
            o.distance_to(p).is_ok_and(|d| d <= reach) || o.contains_point(p).unwrap_or(false)
        })
    }

    /// Boundary, membrane and outer-line checks. Query errors never block.
    fn admits(&self, p: DVec2) -> bool {
        if let Some(boundary) = &self.boundary {
            if !boundary.contains_point(p).unwrap_or(true) {
                return false;
            }
        }
        if self.membranes.iter().any(|m| m.contains_point(p).unwrap_or(false)) {
            return false;
        }
        let reach = self.outer_line_clearance * self.frame.cell_size;
        !self
            .outer_lines
            .iter()
            .any(|line| line.distance_to(p).is_ok_and(|d| d <= reach))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::{GeometryError, Polygon, Polyline};

    /// Region whose every query errors
    #[derive(Debug)]
    struct Broken;

    impl Region for Broken {
        fn contains_point(&self, _p: DVec2) -> Result<bool, GeometryError> {
            Err(GeometryError::NonFiniteGeometry)
        }
        fn distance_to(&self, _p: DVec2) -> Result<f64, GeometryError> {
            Err(GeometryError::NonFiniteGeometry)
        }
        fn bounding_box(&self) -> Result<(DVec2, DVec2), GeometryError> {
            Ok((DVec2::ZERO, DVec2::splat(9.0)))
        }
    }

    fn open_frame() -> GridFrame {
        GridFrame::new(DVec2::ZERO, 1.0, 10, 10)
    }

    #[test]
    fn test_frame_from_bounds() {
        let frame = GridFrame::covering(DVec2::ZERO, DVec2::new(30.0, 15.0), 3.0, 1_000).unwrap();
        assert_eq!((frame.cols(), frame.rows()), (11, 6));
        assert_eq!(frame.cell_center(0, 0), DVec2::new(1.5, 1.5));
        assert_eq!(frame.world_to_cell(DVec2::new(7.0, 3.1)), (2, 1));
        assert_eq!(frame.world_to_cell(DVec2::new(-0.1, 0.0)), (-1, 0));
    }

    #[test]
    fn test_cell_count_past_i32_range() {
        let frame = GridFrame::new(DVec2::ZERO, 1.0, 50_000, 50_000);
        assert_eq!(frame.cell_count(), 2_500_000_000);
    }

    #[test]
    fn test_frame_rejects_bad_input() {
        assert!(matches!(
            GridFrame::covering(DVec2::ZERO, DVec2::ONE, 0.0, 100),
            Err(GrowthError::InvalidCellSize(_))
        ));
        assert!(matches!(
            GridFrame::covering(DVec2::ZERO, DVec2::splat(1_000.0), 1.0, 300_000),
            Err(GrowthError::GridTooLarge { cols: 1001, rows: 1001, limit: 300_000 })
        ));
    }

    #[test]
    fn test_boundary_limits_allowed_cells() {
        let boundary = Arc::new(Polygon::rectangle(DVec2::ZERO, DVec2::new(9.0, 9.0)));
        let constraints = SpatialConstraints::bounded_by(boundary, 1.0, 1_000).unwrap().build();
        assert_eq!(constraints.dimensions(), (10, 10));
        assert!(constraints.is_allowed(0, 0));
        assert!(constraints.is_allowed(8, 8));
        // Center (9.5, 9.5) is past the boundary
        assert!(!constraints.is_allowed(9, 9));
        assert!(!constraints.is_allowed(-1, 0));
        assert_eq!(constraints.allowed_count(), 81);
    }

    #[test]
    fn test_membrane_and_outer_line_exclude() {
        let constraints = SpatialConstraints::unbounded(open_frame())
            .membrane(Arc::new(Polygon::rectangle(DVec2::new(2.0, 2.0), DVec2::new(4.0, 4.0))))
            .outer_line(Arc::new(Polyline::new(vec![DVec2::new(0.0, 8.0), DVec2::new(10.0, 8.0)])))
            .build();
        assert!(!constraints.is_allowed(2, 2));
        assert!(!constraints.is_allowed(3, 3));
        assert!(constraints.is_allowed(4, 4));
        // Centers at y = 7.5 and 8.5 are within half a cell of the line
        assert!(!constraints.is_allowed(0, 7));
        assert!(!constraints.is_allowed(0, 8));
        assert!(constraints.is_allowed(0, 6));
    }

    #[test]
    fn test_obstacle_blocks_with_clearance() {
        let constraints = SpatialConstraints::unbounded(open_frame())
            .obstacle(Arc::new(Polyline::new(vec![DVec2::new(5.0, 5.0)])))
            .build();
        // Center (4.5, 4.5) is ~0.71 from the point
        assert!(constraints.is_obstacle(4, 4));
        assert!(!constraints.is_allowed(4, 4));
        // Center (6.5, 5.5) is ~1.58 away
        assert!(!constraints.is_obstacle(6, 5));
        assert_eq!(constraints.obstacle_cells().len(), 4);
        assert_eq!(constraints.adjacent_obstacles(3, 4), 1);
        assert_eq!(constraints.adjacent_obstacles(3, 3), 0);
    }

    #[test]
    fn test_geometry_errors_fail_open() {
        let constraints = SpatialConstraints::bounded_by(Arc::new(Broken), 1.0, 1_000)
            .unwrap()
            .membrane(Arc::new(Broken))
            .obstacle(Arc::new(Broken))
            .outer_line(Arc::new(Broken))
            .build();
        assert_eq!(constraints.allowed_count(), 100);
        assert!(constraints.obstacle_cells().is_empty());
    }
}
