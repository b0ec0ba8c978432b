/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for neighbour lookups.
 * It divides the canvas into a grid of cells at least as large as the
 * perception radius, so every neighbour of a boid lies in the 3x3 block of
 * cells around it. Brute force is fine at backdrop populations; the grid is
 * there for larger flocks where the quadratic cost starts to show.
 *
 * Boids outside the canvas (scattering ones) are clamped into the border
 * cells, both on insert and on query, which keeps the 3x3 guarantee intact.
 */

use nannou::prelude::*;

use crate::boid::Boid;

pub struct SpatialGrid {
    pub cell_size: f32,
    pub cols: usize,
    pub rows: usize,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, width: f32, height: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);

        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    // Convert canvas coordinates to clamped grid coordinates
    #[inline]
    fn cell_coords(&self, pos: Point2) -> (usize, usize) {
        let gx = (pos.x / self.cell_size).floor().clamp(0.0, (self.cols - 1) as f32) as usize;
        let gy = (pos.y / self.cell_size).floor().clamp(0.0, (self.rows - 1) as f32) as usize;
        (gx, gy)
    }

    // Clear the grid
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    // Insert a boid into the grid
    #[inline]
    pub fn insert(&mut self, boid_index: usize, position: Point2) {
        let (gx, gy) = self.cell_coords(position);
        self.cells[gy * self.cols + gx].push(boid_index);
    }

    pub fn rebuild(&mut self, boids: &[Boid]) {
        self.clear();
        for (i, boid) in boids.iter().enumerate() {
            self.insert(i, boid.position);
        }
    }

    // Boid indices within and adjacent to the cell containing the position
    pub fn nearby_indices(&self, position: Point2) -> Vec<usize> {
        let (gx, gy) = self.cell_coords(position);
        let mut result = Vec::new();

        for y in gy.saturating_sub(1)..=(gy + 1).min(self.rows - 1) {
            let row = y * self.cols;
            for x in gx.saturating_sub(1)..=(gx + 1).min(self.cols - 1) {
                result.extend_from_slice(&self.cells[row + x]);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn dimensions_cover_canvas() {
        let grid = SpatialGrid::new(70.0, 800.0, 600.0);
        assert_eq!(grid.cols, 12);
        assert_eq!(grid.rows, 9);

        let tiny = SpatialGrid::new(70.0, 0.0, 0.0);
        assert_eq!((tiny.cols, tiny.rows), (1, 1));
    }

    #[test]
    fn finds_every_neighbour_within_cell_size() {
        let mut rng = StdRng::seed_from_u64(11);
        let radius = 70.0;
        // Some boids well outside the canvas, as during scatter
        let boids: Vec<Boid> = (0..200)
            .map(|_| {
                let x = rng.gen_range(-300.0..1100.0);
                let y = rng.gen_range(-300.0..900.0);
                Boid::new(pt2(x, y), Vec2::ZERO)
            })
            .collect();

        let mut grid = SpatialGrid::new(radius, 800.0, 600.0);
        grid.rebuild(&boids);

        for boid in &boids {
            let nearby = grid.nearby_indices(boid.position);
            for (j, other) in boids.iter().enumerate() {
                if boid.position.distance(other.position) < radius {
                    assert!(nearby.contains(&j), "missed neighbour {j}");
                }
            }
        }
    }
}
