//! Data Matrix region locator.
//!
//! Given a raster that may contain a Data Matrix symbol anywhere in it,
//! this crate finds candidate symbol regions: it seeds probe pixels across
//! the image in a coarse-to-fine fractal pattern ([`ScanGrid`]), measures
//! edge-flow strength at each probe ([`flow`]), blazes a trail along the
//! strongest nearby edge while recording direction at every pixel it
//! passes through ([`Cache`], [`region::trail_blaze_continuous`]), fits a
//! Hough line through that trail to find the edge's true orientation
//! ([`hough`]), and finally derives the perspective transform and symbol
//! size that together make up a [`Region`].
//!
//! # Safety
//! Unsafe code is forbidden via a crate-level attribute.

#![forbid(unsafe_code)]

mod bres;
mod cache;
mod flow;
mod follow;
mod hough;
mod locator;
mod region;
mod scan_grid;

use std::time::{Duration, Instant};

pub use bres::BresLine;
pub use cache::{Cache, CacheFlags};
pub use flow::{get_point_flow, PointFlow, NEIGHBOR_NONE};
pub use follow::{follow_seek, follow_seek_loc, follow_step, follow_step2, Follow};
pub use hough::{find_best_solid_line, find_best_solid_line2, find_travel_limits, hough_direction_tables, BestLine, HOUGH_RES};
pub use locator::{LocateOptions, Locator};
pub use region::{matrix_region_find_size, matrix_region_orientation, read_module_color, trail_blaze_continuous, Region, TrailBlaze};
pub use scan_grid::ScanGrid;

/// A wall-clock deadline a bounded search loop can poll, so a caller can
/// cap how long region location is allowed to keep trying candidate seed
/// pixels before giving up on a frame. Mirrors `dmtxTimeNow`/`dmtxTimeAdd`
/// plus the timeout check in `dmtxRegionFindNextDeterministic`.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self { at: Instant::now() + timeout }
    }

    /// Whether this deadline has already passed.
    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn deadline_after_zero_is_immediately_expired() {
        let deadline = Deadline::after(Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(1));
        assert!(deadline.expired());
    }

    #[test]
    fn deadline_in_the_future_has_not_expired() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(!deadline.expired());
    }
}
