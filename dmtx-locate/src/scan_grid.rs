/// Fractal cross-pattern seed-pixel generator.
///
/// Visits a coarse 3x3-style cross of pixels first, then recurses into
/// quadrants of half the extent, so that a barcode anywhere in the image is
/// found within a bounded number of probes rather than a raster scan.
/// Mirrors `DmtxScanGrid`/`InitScanGrid`/`GetGridCoordinates`.
#[derive(Debug, Clone)]
pub struct ScanGrid {
    x_min: i64,
    x_max: i64,
    y_min: i64,
    y_max: i64,
    x_offset: i64,
    y_offset: i64,
    min_extent: i64,
    max_extent: i64,
    extent: i64,
    jump_size: i64,
    pixel_total: i64,
    start_pos: i64,
    pixel_count: i64,
    x_center: i64,
    y_center: i64,
    total: i64,
}

impl ScanGrid {
    /// Builds a grid covering `(x_min..=x_max, y_min..=y_max)`, with
    /// `scan_gap`/`scale` setting the coarsest level the fractal recursion
    /// stops refining past (a scan_gap smaller than the smallest module
    /// means the grid recurses down to single-pixel steps).
    pub fn new(x_min: i64, x_max: i64, y_min: i64, y_max: i64, scan_gap: i64, scale: i64) -> Self {
        let smallest_feature = scan_gap / scale.max(1);

        let x_extent = x_max - x_min;
        let y_extent = y_max - y_min;
        let max_extent_bound = x_extent.max(y_extent);

        let mut min_extent = 1;
        let mut extent = 1;
        while extent < max_extent_bound {
            if extent <= smallest_feature {
                min_extent = extent;
            }
            extent = ((extent + 1) * 2) - 1;
        }
        let max_extent = extent;

        let x_offset = (x_min + x_max - max_extent) / 2;
        let y_offset = (y_min + y_max - max_extent) / 2;

        let mut grid = Self {
            x_min,
            x_max,
            y_min,
            y_max,
            x_offset,
            y_offset,
            min_extent,
            max_extent,
            extent: max_extent,
            jump_size: 0,
            pixel_total: 0,
            start_pos: 0,
            pixel_count: 0,
            x_center: 0,
            y_center: 0,
            total: 1,
        };
        grid.set_derived_fields();
        grid
    }

    fn set_derived_fields(&mut self) {
        self.jump_size = self.extent + 1;
        self.pixel_total = 2 * self.extent - 1;
        self.start_pos = self.extent / 2;
        self.pixel_count = 0;
        self.x_center = self.start_pos;
        self.y_center = self.start_pos;
    }

    /// Returns the next location worth scanning, advancing internal
    /// progress past it. `None` once every level down to `min_extent` has
    /// been exhausted. Mirrors `PopGridLocation`.
    pub fn pop_location(&mut self) -> Option<(i64, i64)> {
        loop {
            match self.grid_coordinates() {
                GridStatus::Good(loc) => {
                    self.pixel_count += 1;
                    return Some(loc);
                }
                GridStatus::Bad => {
                    self.pixel_count += 1;
                }
                GridStatus::End => return None,
            }
        }
    }

    fn grid_coordinates(&mut self) -> GridStatus {
        if self.pixel_count >= self.pixel_total {
            self.pixel_count = 0;
            self.x_center += self.jump_size;
        }

        if self.x_center > self.max_extent {
            self.x_center = self.start_pos;
            self.y_center += self.jump_size;
        }

        if self.y_center > self.max_extent {
            self.total *= 4;
            self.extent /= 2;
            self.set_derived_fields();
        }

        if self.extent == 0 || self.extent < self.min_extent {
            return GridStatus::End;
        }

        let count = self.pixel_count;
        let half = self.pixel_total / 2;
        let quarter = half / 2;

        let (mut x, mut y) = if count == self.pixel_total - 1 {
            (self.x_center, self.y_center)
        } else if count < half {
            let x = self.x_center + if count < quarter { count - quarter } else { half - count };
            (x, self.y_center)
        } else {
            let count = count - half;
            let y = self.y_center + if count < quarter { count - quarter } else { half - count };
            (self.x_center, y)
        };

        x += self.x_offset;
        y += self.y_offset;

        if x < self.x_min || x > self.x_max || y < self.y_min || y > self.y_max {
            GridStatus::Bad
        } else {
            GridStatus::Good((x, y))
        }
    }
}

enum GridStatus {
    Good((i64, i64)),
    Bad,
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_center_before_exhausting() {
        let mut grid = ScanGrid::new(0, 63, 0, 63, 2, 1);
        let first = grid.pop_location();
        assert!(first.is_some());
    }

    #[test]
    fn eventually_terminates() {
        let mut grid = ScanGrid::new(0, 31, 0, 31, 2, 1);
        let mut count = 0;
        while grid.pop_location().is_some() {
            count += 1;
            assert!(count < 1_000_000, "scan grid did not terminate");
        }
    }

    #[test]
    fn every_location_is_in_bounds() {
        let mut grid = ScanGrid::new(5, 40, 5, 40, 3, 1);
        while let Some((x, y)) = grid.pop_location() {
            assert!((5..=40).contains(&x));
            assert!((5..=40).contains(&y));
        }
    }
}
