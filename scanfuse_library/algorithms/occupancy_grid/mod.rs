//! Confidence-capped occupancy grid
//!
//! Fixed-size grid of obstacle evidence counters. Every observation of an
//! obstacle inside a cell adds one to that cell, up to a configured maximum.
//! Counters never decrease and the grid never resizes.
//!
//! # Coordinates
//!
//! - `cx = floor(x / resolution) + offset_x`
//! - `cy = floor(-y / resolution) + offset_y` (y grows downwards, like a screen)
//!
//! Points landing outside `[0, width) x [0, height)` are dropped silently.
//!
//! # Example
//!
//! ```rust
//! use scanfuse_library::algorithms::occupancy_grid::OccupancyGrid;
//! use scanfuse_library::Vector2;
//!
//! let mut grid = OccupancyGrid::new(20, 20, 0.15); // 3m x 3m around the origin
//!
//! let applied = grid.accumulate([Vector2::new(0.2, 0.2), Vector2::new(50.0, 0.0)]);
//! assert_eq!(applied, 1);
//!
//! let (cx, cy) = grid.world_to_cell(Vector2::new(0.2, 0.2));
//! assert_eq!(grid.at(cx, cy), 1);
//! ```

use crate::messages::geometry::Vector2;
use serde::{Deserialize, Serialize};

/// Default cap for a single cell
pub const DEFAULT_MAX_CONFIDENCE: u32 = 100;

/// Grid geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// World units per cell
    pub resolution: f64,
    /// Cell column of world x = 0; defaults to `width / 2`
    pub offset_x: Option<i64>,
    /// Cell row of world y = 0; defaults to `width / 2`
    pub offset_y: Option<i64>,
    pub max_confidence: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            resolution: 0.15,
            offset_x: None,
            offset_y: None,
            max_confidence: DEFAULT_MAX_CONFIDENCE,
        }
    }
}

/// 2D grid of evidence counters, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    resolution: f64,
    offset: (i64, i64),
    max_confidence: u32,
    cells: Vec<u32>,
}

impl OccupancyGrid {
    /// Create an empty grid with default offsets and cap
    ///
    /// # Arguments
    /// * `width` - Grid width in cells
    /// * `height` - Grid height in cells
    /// * `resolution` - Cell size in world units
    pub fn new(width: usize, height: usize, resolution: f64) -> Self {
        Self::from_config(&GridConfig {
            width,
            height,
            resolution,
            ..Default::default()
        })
    }

    pub fn from_config(config: &GridConfig) -> Self {
        // Both axes are centred with the width, matching the deployed maps
        let centre = (config.width / 2) as i64;
        Self {
            width: config.width,
            height: config.height,
            resolution: config.resolution,
            offset: (
                config.offset_x.unwrap_or(centre),
                config.offset_y.unwrap_or(centre),
            ),
            max_confidence: config.max_confidence,
            cells: vec![0; config.width * config.height],
        }
    }

    /// Cell containing a world point (may be out of bounds)
    ///
    /// Non-finite coordinates saturate; use [`contains`](Self::contains)
    /// or [`accumulate`](Self::accumulate) to filter them.
    pub fn world_to_cell(&self, point: Vector2) -> (i64, i64) {
        let cx = ((point.x / self.resolution).floor() as i64).saturating_add(self.offset.0);
        let cy = ((-point.y / self.resolution).floor() as i64).saturating_add(self.offset.1);
        (cx, cy)
    }

    /// World coordinates of a cell centre
    pub fn cell_to_world(&self, cx: i64, cy: i64) -> Vector2 {
        Vector2::new(
            ((cx - self.offset.0) as f64 + 0.5) * self.resolution,
            -((cy - self.offset.1) as f64 + 0.5) * self.resolution,
        )
    }

    pub fn contains(&self, cx: i64, cy: i64) -> bool {
        cx >= 0 && cy >= 0 && (cx as u64) < self.width as u64 && (cy as u64) < self.height as u64
    }

    fn index(&self, cx: i64, cy: i64) -> Option<usize> {
        if self.contains(cx, cy) {
            Some(cy as usize * self.width + cx as usize)
        } else {
            None
        }
    }

    /// Add one unit of evidence to a cell, saturating at the cap
    ///
    /// Returns false when the cell is out of bounds and nothing changed.
    /// A cell already at the cap still counts as applied.
    pub fn increment(&mut self, cx: i64, cy: i64) -> bool {
        match self.index(cx, cy) {
            Some(idx) => {
                let cell = &mut self.cells[idx];
                if *cell < self.max_confidence {
                    *cell += 1;
                }
                true
            }
            None => false,
        }
    }

    /// Counter of a cell, 0 when out of bounds
    pub fn at(&self, cx: i64, cy: i64) -> u32 {
        self.get(cx, cy).unwrap_or(0)
    }

    /// Counter of a cell, `None` when out of bounds
    pub fn get(&self, cx: i64, cy: i64) -> Option<u32> {
        self.index(cx, cy).map(|idx| self.cells[idx])
    }

    /// Increment the cell under every point
    ///
    /// Returns how many points landed inside the grid. Non-finite points are
    /// dropped like out-of-range ones.
    pub fn accumulate<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = Vector2>,
    {
        let mut applied = 0;
        for point in points {
            if !point.is_finite() {
                continue;
            }
            let (cx, cy) = self.world_to_cell(point);
            if self.increment(cx, cy) {
                applied += 1;
            }
        }
        applied
    }

    /// Cells with at least `threshold` evidence, as `(cx, cy, value)`
    pub fn occupied_cells(&self, threshold: u32) -> Vec<(usize, usize, u32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &value)| value > 0 && value >= threshold)
            .map(|(idx, &value)| (idx % self.width, idx / self.width, value))
            .collect()
    }

    /// One row of counters, `None` past the last row
    pub fn row(&self, cy: usize) -> Option<&[u32]> {
        if cy < self.height {
            Some(&self.cells[cy * self.width..(cy + 1) * self.width])
        } else {
            None
        }
    }

    /// Sum of all counters
    pub fn total_evidence(&self) -> u64 {
        self.cells.iter().map(|&v| v as u64).sum()
    }

    /// Get grid dimensions
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn max_confidence(&self) -> u32 {
        self.max_confidence
    }

    pub fn offset(&self) -> (i64, i64) {
        self.offset
    }
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_create_grid() {
        let grid = OccupancyGrid::default();
        assert_eq!(grid.dimensions(), (20, 20));
        assert_relative_eq!(grid.resolution(), 0.15);
        assert_eq!(grid.offset(), (10, 10));
        assert_eq!(grid.total_evidence(), 0);
    }

    #[test]
    fn test_world_to_cell() {
        let grid = OccupancyGrid::new(20, 20, 0.5);
        assert_eq!(grid.world_to_cell(Vector2::new(0.0, 0.0)), (10, 10));
        assert_eq!(grid.world_to_cell(Vector2::new(0.6, 0.0)), (11, 10));
        // y is inverted: positive y moves up, to a smaller row
        assert_eq!(grid.world_to_cell(Vector2::new(0.0, 0.6)), (10, 8));
        assert_eq!(grid.world_to_cell(Vector2::new(-0.1, -0.1)), (9, 10));
    }

    #[test]
    fn test_height_offset_follows_width() {
        let grid = OccupancyGrid::new(40, 10, 1.0);
        assert_eq!(grid.offset(), (20, 20));
        assert_eq!(grid.world_to_cell(Vector2::new(0.0, 0.0)), (20, 20));
        assert!(!grid.contains(20, 20));
    }

    #[test]
    fn test_explicit_offsets() {
        let grid = OccupancyGrid::from_config(&GridConfig {
            width: 10,
            height: 10,
            resolution: 1.0,
            offset_x: Some(0),
            offset_y: Some(9),
            ..Default::default()
        });
        assert_eq!(grid.world_to_cell(Vector2::new(0.5, 0.5)), (0, 8));
    }

    #[test]
    fn test_cell_to_world_roundtrip() {
        let grid = OccupancyGrid::new(20, 20, 0.15);
        for (cx, cy) in [(0, 0), (10, 10), (19, 3)] {
            let centre = grid.cell_to_world(cx, cy);
            assert_eq!(grid.world_to_cell(centre), (cx, cy));
        }
    }

    #[test]
    fn test_increment_caps_at_max() {
        let mut grid = OccupancyGrid::default();
        for _ in 0..150 {
            assert!(grid.increment(3, 4));
        }
        assert_eq!(grid.at(3, 4), 100);
        assert_eq!(grid.total_evidence(), 100);
    }

    #[test]
    fn test_custom_cap() {
        let mut grid = OccupancyGrid::from_config(&GridConfig {
            max_confidence: 5,
            ..Default::default()
        });
        for _ in 0..10 {
            grid.increment(0, 0);
        }
        assert_eq!(grid.get(0, 0), Some(5));
    }

    #[test]
    fn test_out_of_bounds_dropped() {
        let mut grid = OccupancyGrid::default();
        assert!(!grid.increment(-1, 0));
        assert!(!grid.increment(0, 20));
        assert!(!grid.increment(20, 0));
        assert_eq!(grid.at(-1, 0), 0);
        assert_eq!(grid.get(20, 0), None);

        let applied = grid.accumulate([Vector2::new(100.0, 100.0), Vector2::new(-2.0, 0.0)]);
        assert_eq!(applied, 0);
        assert_eq!(grid.total_evidence(), 0);
    }

    #[test]
    fn test_non_finite_points_dropped() {
        let mut grid = OccupancyGrid::default();
        let applied = grid.accumulate([
            Vector2::new(f64::NAN, 0.0),
            Vector2::new(0.0, f64::INFINITY),
            Vector2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ]);
        assert_eq!(applied, 0);
        assert_eq!(grid.total_evidence(), 0);
    }

    #[test]
    fn test_accumulate_counts_in_bounds_points() {
        let mut grid = OccupancyGrid::default();
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(0.01, 0.01),
            Vector2::new(1.0, -1.0),
            Vector2::new(30.0, 0.0),
        ];
        assert_eq!(grid.accumulate(points), 3);
        assert_eq!(grid.total_evidence(), 3);

        let occupied = grid.occupied_cells(1);
        assert_eq!(occupied.len(), 3);
        assert!(occupied.contains(&(10, 10, 1)));
    }

    #[test]
    fn test_occupied_threshold() {
        let mut grid = OccupancyGrid::default();
        for _ in 0..5 {
            grid.increment(1, 1);
        }
        grid.increment(2, 2);

        assert_eq!(grid.occupied_cells(3), vec![(1, 1, 5)]);
        assert_eq!(grid.occupied_cells(0).len(), 2);
    }

    #[test]
    fn test_rows() {
        let mut grid = OccupancyGrid::new(4, 3, 1.0);
        grid.increment(2, 1);
        assert_eq!(grid.row(1), Some(&[0, 0, 1, 0][..]));
        assert!(grid.row(3).is_none());
    }
}
