use bitflags::bitflags;

bitflags! {
    /// Per-scaled-pixel bookkeeping bits, one byte per cache cell.
    ///
    /// `VISITED` is set while the trail blazer is walking a candidate edge
    /// and cleared again once the trail has been converted into Hough
    /// votes; the same bit is reused permanently once a region has been
    /// fully decoded, via [`Cache::mark_consumed_rect`], so later scans skip
    /// its footprint. `ASSIGNED` marks a cell that has a direction nibble
    /// recorded. `UPSTREAM`/`DOWNSTREAM` each hold a 3-bit compass direction
    /// (0-7, see [`crate::flow::PATTERN_X`]/[`crate::flow::PATTERN_Y`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CacheFlags: u8 {
        /// Mid-blaze visited marker, later reused as "claimed by a decoded
        /// region".
        const VISITED = 0x80;
        /// Has a direction nibble assigned.
        const ASSIGNED = 0x40;
        /// Upstream direction nibble (bits 5-3).
        const UPSTREAM = 0x38;
        /// Downstream direction nibble (bits 2-0).
        const DOWNSTREAM = 0x07;
    }
}

/// A `width x height` byte grid of [`CacheFlags`], addressed in the
/// decoder's scaled coordinate space (image coordinates divided by
/// `scale`). Mirrors `dec->cache` plus `dmtxDecodeGetCache`.
#[derive(Debug, Clone)]
pub struct Cache {
    width: i64,
    height: i64,
    cells: Vec<u8>,
}

impl Cache {
    /// Builds an all-clear cache sized to `width x height` scaled pixels.
    pub fn new(width: i64, height: i64) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![0u8; len],
        }
    }

    /// Scaled width.
    pub fn width(&self) -> i64 {
        self.width
    }

    /// Scaled height.
    pub fn height(&self) -> i64 {
        self.height
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Reads the byte at `(x, y)`, or `None` if out of bounds (mirrors
    /// `dmtxDecodeGetCache` returning `NULL`).
    pub fn get(&self, x: i64, y: i64) -> Option<u8> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Mutable access to the byte at `(x, y)`.
    pub fn get_mut(&mut self, x: i64, y: i64) -> Option<&mut u8> {
        let idx = self.index(x, y)?;
        Some(&mut self.cells[idx])
    }

    /// Sets `VISITED` on every cell of `(x_start..x_end, y_start..y_end)`,
    /// clamped to bounds. Mirrors `CacheFillQuad`'s scanline fill, but over
    /// the axis-aligned bounding box rather than walking the quadrilateral's
    /// Bresenham edges, since this library's quad is always close to
    /// axis-aligned whitespace margin around a fitted region.
    pub fn mark_consumed_rect(&mut self, x_start: i64, y_start: i64, x_end: i64, y_end: i64) {
        let x_start = x_start.max(0);
        let y_start = y_start.max(0);
        let x_end = x_end.min(self.width);
        let y_end = y_end.min(self.height);
        for y in y_start..y_end {
            for x in x_start..x_end {
                if let Some(idx) = self.index(x, y) {
                    self.cells[idx] |= CacheFlags::VISITED.bits();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_none() {
        let cache = Cache::new(4, 4);
        assert_eq!(cache.get(-1, 0), None);
        assert_eq!(cache.get(4, 0), None);
    }

    #[test]
    fn mark_consumed_rect_sets_bit_only_within_bounds() {
        let mut cache = Cache::new(4, 4);
        cache.mark_consumed_rect(-2, -2, 2, 2);
        assert!(cache.get(0, 0).unwrap() & CacheFlags::VISITED.bits() != 0);
        assert!(cache.get(3, 3).unwrap() & CacheFlags::VISITED.bits() == 0);
    }
}
