use dmtx_geom::{Matrix3, Vector2};
use dmtx_raster::Raster;
use dmtx_symbol::{SizeRequest, SymbolSize};

use crate::cache::CacheFlags;
use crate::flow::{find_strongest_neighbor, PointFlow};
use crate::hough::{find_best_solid_line, find_travel_limits, BestLine};
use crate::Cache;

/// Minimum edge-flow magnitude a trail blaze is willing to continue
/// through. Mirrors the `mag < 50` stop condition in `TrailBlazeContinuous`.
const TRAIL_MAG_FLOOR: i32 = 50;

/// Minimum step count a blazed trail must reach before it is considered a
/// candidate symbol edge. Mirrors the `stepsTotal >= 40` check in
/// `MatrixRegionOrientation`.
const MIN_TRAIL_STEPS: i32 = 40;

/// A trail blazed bidirectionally from a seed pixel, recording direction
/// nibbles into the cache as it goes so [`crate::follow`] can retrace it.
/// Mirrors the bookkeeping `TrailBlazeContinuous` leaves behind plus the
/// bounds it returns.
#[derive(Debug, Clone, Copy)]
pub struct TrailBlaze {
    pub steps_total: i32,
    pub jump_to_neg: i32,
    pub jump_to_pos: i32,
    pub final_neg: (i64, i64),
    pub final_pos: (i64, i64),
    pub loc_begin: (i64, i64),
}

/// Blazes a trail in both directions from `flow_begin` until the edge flow
/// weakens below [`TRAIL_MAG_FLOOR`] on either side, marking every visited
/// cache cell's direction nibbles and `VISITED`/`ASSIGNED` bits as it goes.
/// Mirrors `TrailBlazeContinuous`.
pub fn trail_blaze_continuous(raster: &Raster, scale: i64, cache: &mut Cache, flow_begin: PointFlow) -> TrailBlaze {
    let loc_begin = flow_begin.loc;
    mark_assigned(cache, loc_begin, flow_begin.arrive, flow_begin.depart);

    let mut pos_steps = 0i32;
    let mut cur = flow_begin;
    let mut final_pos = loc_begin;
    loop {
        let next = find_strongest_neighbor(raster, scale, cache, cur, 1);
        if next.mag < TRAIL_MAG_FLOOR {
            break;
        }
        mark_assigned(cache, next.loc, next.arrive, next.depart);
        final_pos = next.loc;
        pos_steps += 1;
        cur = next;
    }

    let mut neg_steps = 0i32;
    let mut cur = flow_begin;
    let mut final_neg = loc_begin;
    loop {
        let next = find_strongest_neighbor(raster, scale, cache, cur, -1);
        if next.mag < TRAIL_MAG_FLOOR {
            break;
        }
        mark_assigned(cache, next.loc, next.arrive, next.depart);
        final_neg = next.loc;
        neg_steps += 1;
        cur = next;
    }

    TrailBlaze {
        steps_total: pos_steps + neg_steps,
        jump_to_neg: pos_steps,
        jump_to_pos: -neg_steps,
        final_neg,
        final_pos,
        loc_begin,
    }
}

fn mark_assigned(cache: &mut Cache, loc: (i64, i64), arrive: i32, depart: i32) {
    if let Some(cell) = cache.get_mut(loc.0, loc.1) {
        let upstream = ((arrive.max(0) as u8) << 3) & CacheFlags::UPSTREAM.bits();
        let downstream = (depart as u8) & CacheFlags::DOWNSTREAM.bits();
        *cell |= CacheFlags::ASSIGNED.bits() | CacheFlags::VISITED.bits() | upstream | downstream;
    }
}

/// A located (but not yet sampled) Data Matrix region: the perspective
/// transform mapping source-image pixels onto the symbol's idealized
/// module grid, plus the symbol size it was fit against. Mirrors
/// `DmtxRegion`.
#[derive(Debug, Clone)]
pub struct Region {
    pub flow_begin: PointFlow,
    pub polarity: i32,
    pub left_line: BestLine,
    pub bottom_line: BestLine,
    pub top_known: bool,
    pub top_angle: i32,
    pub top_loc: (i64, i64),
    pub right_known: bool,
    pub right_angle: i32,
    pub right_loc: (i64, i64),
    pub raw2fit: Matrix3,
    pub fit2raw: Matrix3,
    pub size_idx: SymbolSize,
    pub on_color: i32,
    pub off_color: i32,
}

impl Region {
    /// Corner point of the fitted unit square mapped back to the source
    /// image, at parameter `(u, v)` in `0.0..=1.0`.
    pub fn raw_corner(&self, u: f64, v: f64) -> Option<(i64, i64)> {
        let p = self.fit2raw.vmultiply(Vector2::new(u, v)).ok()?;
        Some((p.x.round() as i64, p.y.round() as i64))
    }
}

/// Determines a candidate region's orientation and rough symbol shape from
/// a freshly blazed trail: fits the strongest line through it (`left_line`),
/// then looks perpendicular to find the intersecting bottom edge, rejecting
/// trails too short or too small to plausibly be a symbol edge. Mirrors
/// `MatrixRegionOrientation`.
pub fn matrix_region_orientation(
    cache: &Cache,
    blaze: &TrailBlaze,
    flow_begin: PointFlow,
    size_request: SizeRequest,
) -> Option<Region> {
    if blaze.steps_total < MIN_TRAIL_STEPS {
        return None;
    }

    let line1 = find_best_solid_line(
        cache,
        blaze.steps_total,
        blaze.jump_to_neg,
        blaze.jump_to_pos,
        blaze.final_neg,
        blaze.final_pos,
        0,
        blaze.jump_to_neg,
        blaze.jump_to_pos,
        None,
    );
    if line1.mag < 1 {
        return None;
    }

    let mut line1 = line1;
    find_travel_limits(
        cache,
        blaze.steps_total,
        blaze.jump_to_neg,
        blaze.jump_to_pos,
        blaze.final_neg,
        blaze.final_pos,
        &mut line1,
    );

    let line2 = find_best_solid_line(
        cache,
        blaze.steps_total,
        blaze.jump_to_neg,
        blaze.jump_to_pos,
        blaze.final_neg,
        blaze.final_pos,
        0,
        blaze.jump_to_neg,
        blaze.jump_to_pos,
        Some(line1.angle),
    );
    if line2.mag < 1 {
        return None;
    }

    let cross = (line1.loc_pos.0 - line1.loc_neg.0) * (line2.loc_pos.1 - line2.loc_neg.1)
        - (line1.loc_pos.1 - line1.loc_neg.1) * (line2.loc_pos.0 - line2.loc_neg.0);
    let polarity = if cross >= 0 { 1 } else { -1 };

    let size_idx = match size_request {
        SizeRequest::Explicit(sz) => sz,
        _ => SymbolSize::all()[0],
    };

    let mut region = Region {
        flow_begin,
        polarity,
        left_line: line1,
        bottom_line: line2,
        top_known: false,
        top_angle: 0,
        top_loc: (0, 0),
        right_known: false,
        right_angle: 0,
        right_loc: (0, 0),
        raw2fit: Matrix3::identity(),
        fit2raw: Matrix3::identity(),
        size_idx,
        on_color: 0,
        off_color: 0,
    };

    // The two blazed lines share their origin at flow_begin but their
    // endpoints were found independently, so the fourth corner is only an
    // estimate (p00 + the two edge vectors), treating the region as a
    // parallelogram rather than tracing its actual (possibly slightly
    // skewed) fourth side.
    let p00 = Vector2::new(blaze.loc_begin.0 as f64, blaze.loc_begin.1 as f64);
    let p10 = Vector2::new(line1.loc_pos.0 as f64, line1.loc_pos.1 as f64);
    let p01 = Vector2::new(line2.loc_pos.0 as f64, line2.loc_pos.1 as f64);
    let p11 = Vector2::new(p10.x + p01.x - p00.x, p10.y + p01.y - p00.y);
    update_corners(&mut region, p00, p10, p11, p01)?;

    Some(region)
}

/// Builds the perspective transform mapping the unit square onto a
/// region's four corners, derived from its left/bottom edge lines and
/// their estimated far corners. Composes translate, rotate, shear, two
/// scales and the two line-skew corrections, in that order, the same
/// sequence (not a matrix inversion) used to build the inverse transform.
/// Mirrors `dmtxRegionUpdateCorners`.
pub fn update_corners(
    region: &mut Region,
    p00: Vector2,
    p10: Vector2,
    p11: Vector2,
    p01: Vector2,
) -> Option<()> {
    let v_ot = p01.sub(p00);
    let v_or = p10.sub(p00);

    let mut v_ot_unit = v_ot;
    let ot_len = v_ot_unit.norm().ok()?;
    let mut v_or_unit = v_or;
    let or_len = v_or_unit.norm().ok()?;

    if ot_len < 8.0 || or_len < 8.0 {
        return None;
    }
    let ratio = ot_len / or_len;
    if !(0.5..2.0).contains(&ratio) {
        return None;
    }

    let cross = v_ot.cross(v_or);
    if (cross >= 0.0) != (region.polarity >= 0) {
        return None;
    }

    let phi = v_ot_unit.y.atan2(v_ot_unit.x);

    let tx = -p00.x;
    let ty = -p00.y;

    let mut raw2fit = Matrix3::translate(tx, ty);
    raw2fit.multiply_by(&Matrix3::rotate(-phi));

    let p10_fit = raw2fit.vmultiply(p10).ok()?;
    let p11_fit = raw2fit.vmultiply(p11).ok()?;
    let p01_fit = raw2fit.vmultiply(p01).ok()?;

    if p10_fit.y.abs() < dmtx_geom::ALMOST_ZERO {
        return None;
    }
    let shx = -p01_fit.x / p01_fit.y.max(dmtx_geom::ALMOST_ZERO);
    raw2fit.multiply_by(&Matrix3::shear(0.0, shx));

    let scale_x = 1.0 / or_len.max(dmtx_geom::ALMOST_ZERO);
    let scale_y = 1.0 / ot_len.max(dmtx_geom::ALMOST_ZERO);
    raw2fit.multiply_by(&Matrix3::scale(scale_x, scale_y));

    let p11_fit2 = raw2fit.vmultiply(p11).ok()?;
    raw2fit.multiply_by(&Matrix3::line_skew_side(1.0, p11_fit2.x.max(dmtx_geom::ALMOST_ZERO), 1.0).ok()?);

    let p10_fit2 = raw2fit.vmultiply(p10).ok()?;
    raw2fit.multiply_by(&Matrix3::line_skew_top(1.0, p10_fit2.y.max(dmtx_geom::ALMOST_ZERO), 1.0).ok()?);

    region.raw2fit = raw2fit;

    let mut fit2raw = Matrix3::line_skew_top_inv(1.0, p10_fit2.y.max(dmtx_geom::ALMOST_ZERO), 1.0).ok()?;
    fit2raw.multiply_by(&Matrix3::line_skew_side_inv(1.0, p11_fit2.x.max(dmtx_geom::ALMOST_ZERO), 1.0).ok()?);
    fit2raw.multiply_by(&Matrix3::scale(or_len, ot_len));
    fit2raw.multiply_by(&Matrix3::shear(0.0, -shx));
    fit2raw.multiply_by(&Matrix3::rotate(phi));
    fit2raw.multiply_by(&Matrix3::translate(-tx, -ty));
    region.fit2raw = fit2raw;

    let _ = (p10_fit, p11_fit);
    Some(())
}

/// Samples the 5-point average pixel color at unit-square point `(u, v)`,
/// mapped through `fit2raw` back into the source image. Mirrors
/// `ReadModuleColor`.
pub fn read_module_color(raster: &Raster, scale: i64, region: &Region, u: f64, v: f64) -> Option<u8> {
    const SAMPLE_X: [f64; 5] = [0.5, 0.4, 0.5, 0.6, 0.5];
    const SAMPLE_Y: [f64; 5] = [0.5, 0.5, 0.4, 0.5, 0.6];

    let mut sum = 0u32;
    for i in 0..5 {
        let p = Vector2::new(u + SAMPLE_X[i] - 0.5, v + SAMPLE_Y[i] - 0.5);
        let raw = region.fit2raw.vmultiply(p).ok()?;
        let x = (raw.x / scale as f64).round() as i64;
        let y = (raw.y / scale as f64).round() as i64;
        let value = raster.get_pixel_value(x * scale, y * scale, 0).ok()?;
        sum += value as u32;
    }
    Some((sum / 5) as u8)
}

/// Determines the best-fit symbol size by measuring contrast along the
/// calibration bars at the region's outer edge, trying every candidate
/// size consistent with `size_request` and keeping whichever produces the
/// strongest on/off contrast. Mirrors `MatrixRegionFindSize`.
pub fn matrix_region_find_size(
    raster: &Raster,
    scale: i64,
    region: &mut Region,
    size_request: SizeRequest,
) -> Option<()> {
    let candidates: Vec<SymbolSize> = match size_request {
        SizeRequest::Explicit(sz) => vec![sz],
        SizeRequest::SquareAuto => SymbolSize::all().iter().copied().filter(|s| s.is_square()).collect(),
        SizeRequest::RectAuto => SymbolSize::all().iter().copied().filter(|s| !s.is_square()).collect(),
        SizeRequest::ShapeAuto => SymbolSize::all().to_vec(),
    };

    let mut best: Option<(SymbolSize, i32, i64, i64)> = None;
    for size in candidates {
        let rows = size.symbol_rows() as u32;
        let cols = size.symbol_cols() as u32;
        let mut on_sum = 0i64;
        let mut off_sum = 0i64;
        let mut on_n = 0i64;
        let mut off_n = 0i64;
        for c in 0..cols {
            let u = (c as f64 + 0.5) / cols as f64;
            let v = 1.0 - 0.5 / rows as f64;
            if let Some(color) = read_module_color(raster, scale, region, u, v) {
                if c % 2 == 0 {
                    on_sum += color as i64;
                    on_n += 1;
                } else {
                    off_sum += color as i64;
                    off_n += 1;
                }
            }
        }
        if on_n == 0 || off_n == 0 {
            continue;
        }
        let on_avg = on_sum / on_n;
        let off_avg = off_sum / off_n;
        let contrast = (on_avg - off_avg).unsigned_abs() as i32;
        if contrast < 20 {
            continue;
        }
        if best.map(|(_, c, _, _)| contrast > c).unwrap_or(true) {
            best = Some((size, contrast, on_avg, off_avg));
        }
    }

    let (size, _, on_avg, off_avg) = best?;
    region.size_idx = size;
    region.on_color = on_avg as i32;
    region.off_color = off_avg as i32;
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_blaze_marks_seed_cell_assigned() {
        let raster = Raster::new(vec![0u8; 16 * 16], 16, 16, dmtx_raster::PixelPacking::EightBppK).unwrap();
        let mut cache = Cache::new(16, 16);
        let flow = PointFlow { plane: 0, arrive: crate::flow::NEIGHBOR_NONE, depart: 0, mag: 0, loc: (5, 5) };
        let blaze = trail_blaze_continuous(&raster, 1, &mut cache, flow);
        assert_eq!(blaze.loc_begin, (5, 5));
        let cell = cache.get(5, 5).unwrap();
        assert!(cell & CacheFlags::ASSIGNED.bits() != 0);
    }
}
