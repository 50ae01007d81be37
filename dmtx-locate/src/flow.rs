use dmtx_raster::Raster;

/// Sentinel meaning "no neighbor direction", used as `PointFlow::arrive`
/// for a flow that was not reached by stepping from another pixel.
pub const NEIGHBOR_NONE: i32 = 8;

/// 8-compass neighbor offsets, starting northwest and going clockwise.
/// Mirrors `dmtxPatternX`/`dmtxPatternY`.
pub const PATTERN_X: [i64; 8] = [-1, 0, 1, 1, 1, 0, -1, -1];
/// See [`PATTERN_X`].
pub const PATTERN_Y: [i64; 8] = [-1, -1, -1, 0, 1, 1, 1, 0];

/// A point's strongest edge-flow direction, found by an 8-compass Sobel-like
/// convolution. Mirrors `DmtxPointFlow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointFlow {
    /// Color channel this flow was measured on.
    pub plane: usize,
    /// Direction (0-7, or [`NEIGHBOR_NONE`]) this flow was reached from.
    pub arrive: i32,
    /// Direction (0-7) flow continues toward.
    pub depart: i32,
    /// Strength of the strongest compass direction.
    pub mag: i32,
    /// Pixel location, in the decoder's scaled coordinate space.
    pub loc: (i64, i64),
}

impl PointFlow {
    /// The "no edge here" sentinel returned when a probe fails or no
    /// direction is strong enough. Mirrors `dmtxBlankEdge`.
    pub fn blank() -> Self {
        Self { plane: 0, arrive: NEIGHBOR_NONE, depart: 0, mag: 0, loc: (-1, -1) }
    }
}

/// Reads pixel `(x, y)` on `channel`, un-scaling back to raw raster
/// coordinates. Mirrors `dmtxDecodeGetPixelValue`.
pub fn get_pixel_value(raster: &Raster, scale: i64, x: i64, y: i64, channel: usize) -> Option<u8> {
    let raw_x = x * scale;
    let raw_y = y * scale;
    raster.get_pixel_value(raw_x, raw_y, channel).ok()
}

/// Measures the strongest edge-flow direction at `loc` on `color_plane`.
/// Mirrors `GetPointFlow`.
pub fn get_point_flow(
    raster: &Raster,
    scale: i64,
    color_plane: usize,
    loc: (i64, i64),
    arrive: i32,
) -> PointFlow {
    const COEFFICIENT: [i32; 8] = [0, 1, 2, 1, 0, -1, -2, -1];

    let mut color_pattern = [0i32; 8];
    for (pattern_idx, slot) in color_pattern.iter_mut().enumerate() {
        let x = loc.0 + PATTERN_X[pattern_idx];
        let y = loc.1 + PATTERN_Y[pattern_idx];
        match get_pixel_value(raster, scale, x, y, color_plane) {
            Some(v) => *slot = v as i32,
            None => return PointFlow::blank(),
        }
    }

    let mut mag = [0i32; 4];
    let mut compass_max = 0usize;
    for compass in 0..4 {
        for pattern_idx in 0..8 {
            let coefficient_idx = (pattern_idx + 8 - compass) % 8;
            let coefficient = COEFFICIENT[coefficient_idx];
            if coefficient == 0 {
                continue;
            }
            mag[compass] += coefficient * color_pattern[pattern_idx];
        }
        if compass != 0 && mag[compass].abs() > mag[compass_max].abs() {
            compass_max = compass;
        }
    }

    PointFlow {
        plane: color_plane,
        arrive,
        depart: if mag[compass_max] > 0 { compass_max as i32 + 4 } else { compass_max as i32 },
        mag: mag[compass_max].abs(),
        loc,
    }
}

/// Looks at `center`'s 8 neighbors in the direction implied by `sign` and
/// returns whichever has the strongest flow, subject to an angular-continuity
/// window (it must be within 1 compass step of the expected heading) and a
/// budget of at most 2 already-assigned neighbors tolerated before giving up.
/// Mirrors `FindStrongestNeighbor`.
pub fn find_strongest_neighbor(
    raster: &Raster,
    scale: i64,
    cache: &crate::Cache,
    center: PointFlow,
    sign: i32,
) -> PointFlow {
    let attempt = if sign < 0 { center.depart } else { (center.depart + 4) % 8 };

    let mut occupied = 0;
    let mut strongest: Option<(usize, PointFlow)> = None;

    for i in 0..8usize {
        let loc = (center.loc.0 + PATTERN_X[i], center.loc.1 + PATTERN_Y[i]);

        let cell = match cache.get(loc.0, loc.1) {
            Some(c) => c,
            None => continue,
        };

        if cell & crate::cache::CacheFlags::VISITED.bits() != 0 {
            occupied += 1;
            if occupied > 2 {
                return PointFlow::blank();
            }
            continue;
        }

        let mut attempt_diff = (attempt - i as i32).abs();
        if attempt_diff > 4 {
            attempt_diff = 8 - attempt_diff;
        }
        if attempt_diff > 1 {
            continue;
        }

        let flow = get_point_flow(raster, scale, center.plane, loc, i as i32);

        let take = match strongest {
            None => true,
            Some((best_i, best)) => flow.mag > best.mag || (flow.mag == best.mag && (i & 1) != 0),
        };
        if take {
            strongest = Some((i, flow));
        }
    }

    strongest.map(|(_, f)| f).unwrap_or_else(PointFlow::blank)
}
