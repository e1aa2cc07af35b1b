//! Impact accumulator — the persistent intensity field behind the heatmap.
//!
//! Each hit stamps a radially-decaying footprint onto an N x N grid. The
//! footprint widens and intensifies with the accumulated intensity at the
//! impact cell, so clusters bloom instead of pin-pricking. Cells saturate at
//! `max_intensity`.

use deadeye::HeatmapSnapshot;

pub struct Heatmap {
    size: usize,
    cells: Vec<f32>,
    base_radius: i32,
    max_radius: i32,
    max_intensity: f32,
    spread_growth: f64,
}

impl Heatmap {
    pub fn new(size: usize, max_intensity: f32, spread_growth: f64) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
            base_radius: (size / 16) as i32,
            max_radius: (size / 4) as i32,
            max_intensity,
            spread_growth,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell(&self, x: usize, y: usize) -> f32 {
        self.cells[y * self.size + x]
    }

    /// Stamp one impact centered on `(x, y)`. Coordinates outside the field
    /// are clamped to the edge cell; callers are expected to have clamped
    /// already.
    pub fn apply_impact(&mut self, x: usize, y: usize) {
        let cx = x.min(self.size - 1) as i32;
        let cy = y.min(self.size - 1) as i32;

        // Accumulated intensity at the impact cell doubles as a local hit
        // density proxy: denser clusters get a wider, hotter footprint.
        let current_hits = self.cell(cx as usize, cy as usize).round() as i32;
        let radius = (self.base_radius + (current_hits as f64 * self.spread_growth).round() as i32)
            .clamp(self.base_radius, self.max_radius);

        let peak = 1.8 + current_hits as f64 * 0.1;
        let falloff = radius as f64 * 0.7;

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let px = cx + dx;
                let py = cy + dy;
                if px < 0 || px >= self.size as i32 || py < 0 || py >= self.size as i32 {
                    continue;
                }

                let distance = ((dx * dx + dy * dy) as f64).sqrt();
                if distance <= radius as f64 {
                    let intensity = ((-(distance / falloff).powi(2)).exp() * peak) as f32;
                    let idx = py as usize * self.size + px as usize;
                    self.cells[idx] = (self.cells[idx] + intensity).min(self.max_intensity);
                }
            }
        }
    }

    /// Zero every cell.
    pub fn reset(&mut self) {
        self.cells.fill(0.0);
    }

    pub fn snapshot(&self) -> HeatmapSnapshot {
        HeatmapSnapshot {
            size: self.size,
            max_intensity: self.max_intensity,
            cells: self.cells.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Heatmap {
        Heatmap::new(256, 30.0, 1.5)
    }

    #[test]
    fn impact_stays_within_base_radius_on_fresh_field() {
        let mut map = fresh();
        map.apply_impact(128, 128);

        assert!(map.cell(128, 128) > 0.0);
        // base radius for a 256 field is 16
        for y in 0..256usize {
            for x in 0..256usize {
                let dx = x as f64 - 128.0;
                let dy = y as f64 - 128.0;
                if (dx * dx + dy * dy).sqrt() > 16.0 {
                    assert_eq!(map.cell(x, y), 0.0, "cell ({x},{y}) outside radius touched");
                }
            }
        }
    }

    #[test]
    fn repeated_impacts_never_decrease_a_cell() {
        let mut map = fresh();
        let mut previous = 0.0;
        for _ in 0..50 {
            map.apply_impact(128, 128);
            let now = map.cell(128, 128);
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn cells_saturate_at_max_intensity() {
        let mut map = fresh();
        for _ in 0..200 {
            map.apply_impact(128, 128);
        }
        for y in 0..256usize {
            for x in 0..256usize {
                let v = map.cell(x, y);
                assert!((0.0..=30.0).contains(&v), "cell ({x},{y}) = {v}");
            }
        }
        assert_eq!(map.cell(128, 128), 30.0);
    }

    #[test]
    fn footprint_widens_with_cluster_density() {
        let mut map = fresh();
        map.apply_impact(128, 128);
        let lone = map.cell(128, 110); // 18 cells out, beyond the base radius
        assert_eq!(lone, 0.0);

        for _ in 0..20 {
            map.apply_impact(128, 128);
        }
        assert!(map.cell(128, 110) > 0.0, "dense cluster should spread wider");
    }

    #[test]
    fn edge_impact_does_not_panic() {
        let mut map = fresh();
        map.apply_impact(0, 0);
        map.apply_impact(255, 255);
        assert!(map.cell(0, 0) > 0.0);
        assert!(map.cell(255, 255) > 0.0);
    }

    #[test]
    fn out_of_range_center_is_clamped() {
        let mut map = fresh();
        map.apply_impact(400, 400);
        assert!(map.cell(255, 255) > 0.0);
    }

    #[test]
    fn reset_zeroes_every_cell() {
        let mut map = fresh();
        map.apply_impact(10, 200);
        map.apply_impact(128, 128);
        map.reset();
        assert!(map.snapshot().cells.iter().all(|&c| c == 0.0));
    }
}
