use dmtx_raster::Raster;
use dmtx_symbol::SizeRequest;

use crate::cache::CacheFlags;
use crate::flow::{find_strongest_neighbor, get_point_flow, PointFlow};
use crate::region::{matrix_region_find_size, matrix_region_orientation, trail_blaze_continuous};
use crate::scan_grid::ScanGrid;
use crate::{Cache, Deadline, Region};

/// Knobs controlling the region search. Mirrors the subset of
/// `DmtxDecode`'s properties the locator reads: `edgeMin`/`edgeMax`
/// (collapsed here into `edge_thresh`), `scanGap`, and the expected symbol
/// size/shape.
#[derive(Debug, Clone, Copy)]
pub struct LocateOptions {
    /// Scaling factor between the raw raster and the decoder's working
    /// coordinate space (`1` processes every pixel).
    pub scale: i64,
    /// Minimum edge-flow magnitude a seed pixel must show, as a fraction of
    /// full contrast (`0.0..=1.0`). Mirrors `edgeThresh`.
    pub edge_thresh: f64,
    /// Minimum pixel spacing between candidate seed probes.
    pub scan_gap: i64,
    /// Expected symbol size or shape family.
    pub size_request: SizeRequest,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self { scale: 1, edge_thresh: 0.4, scan_gap: 2, size_request: SizeRequest::ShapeAuto }
    }
}

/// Drives the scan grid across a raster, handing back each distinct
/// symbol region it can fit, until the grid is exhausted or a [`Deadline`]
/// expires. Mirrors the per-image half of `DmtxDecode` plus
/// `dmtxRegionFindNext`.
pub struct Locator<'a> {
    raster: &'a Raster,
    cache: Cache,
    grid: ScanGrid,
    options: LocateOptions,
}

impl<'a> Locator<'a> {
    /// Builds a locator over `raster`, seeding the scan grid across its
    /// full (scaled) extent.
    pub fn new(raster: &'a Raster, options: LocateOptions) -> Self {
        let width = raster.width() as i64 / options.scale.max(1);
        let height = raster.height() as i64 / options.scale.max(1);
        let cache = Cache::new(width, height);
        let grid = ScanGrid::new(0, width - 1, 0, height - 1, options.scan_gap, options.scale);
        Self { raster, cache, grid, options }
    }

    /// Finds the next decodable region, or `None` once the scan grid is
    /// exhausted or `deadline` has expired. Mirrors
    /// `dmtxRegionFindNextDeterministic`/`dmtxRegionScanPixel`.
    pub fn find_next_region(&mut self, deadline: Option<&Deadline>) -> Option<Region> {
        let edge_threshold = (self.options.edge_thresh * 7.65 + 0.5) as i32;

        loop {
            if let Some(deadline) = deadline {
                if deadline.expired() {
                    return None;
                }
            }

            let loc = self.grid.pop_location()?;

            if self.cache.get(loc.0, loc.1).unwrap_or(0) & CacheFlags::VISITED.bits() != 0 {
                continue;
            }

            if let Some(region) = self.scan_pixel(loc, edge_threshold) {
                return Some(region);
            }
        }
    }

    fn scan_pixel(&mut self, loc: (i64, i64), edge_threshold: i32) -> Option<Region> {
        let channel_count = self.raster.channel_count().max(1);
        let mut best: Option<PointFlow> = None;
        for channel in 0..channel_count {
            let flow = get_point_flow(self.raster, self.options.scale, channel, loc, crate::flow::NEIGHBOR_NONE);
            if flow.mag < edge_threshold {
                continue;
            }
            if best.map(|b| flow.mag > b.mag).unwrap_or(true) {
                best = Some(flow);
            }
        }
        let flow_begin = best?;
        if flow_begin.mag < 10 {
            return None;
        }

        let forward = find_strongest_neighbor(self.raster, self.options.scale, &self.cache, flow_begin, 1);
        let backward = find_strongest_neighbor(self.raster, self.options.scale, &self.cache, flow_begin, -1);
        if forward.mag == 0 || backward.mag == 0 {
            return None;
        }

        let blaze = trail_blaze_continuous(self.raster, self.options.scale, &mut self.cache, flow_begin);

        let region =
            matrix_region_orientation(&self.cache, &blaze, flow_begin, self.options.size_request);

        let mut region = region?;
        matrix_region_find_size(self.raster, self.options.scale, &mut region, self.options.size_request)?;

        let x_min = blaze.loc_begin.0.min(blaze.final_pos.0).min(blaze.final_neg.0) - 2;
        let x_max = blaze.loc_begin.0.max(blaze.final_pos.0).max(blaze.final_neg.0) + 2;
        let y_min = blaze.loc_begin.1.min(blaze.final_pos.1).min(blaze.final_neg.1) - 2;
        let y_max = blaze.loc_begin.1.max(blaze.final_pos.1).max(blaze.final_neg.1) + 2;
        self.cache.mark_consumed_rect(x_min, y_min, x_max + 1, y_max + 1);

        Some(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_exhausts_a_blank_image_without_panicking() {
        let raster =
            Raster::new(vec![128u8; 32 * 32], 32, 32, dmtx_raster::PixelPacking::EightBppK).unwrap();
        let mut locator = Locator::new(&raster, LocateOptions::default());
        let region = locator.find_next_region(None);
        assert!(region.is_none());
    }
}
