use crate::follow::{follow_step, Follow};
use crate::Cache;

/// Number of discretized angle buckets the Hough transform votes into (one
/// per whole degree). Mirrors `DMTX_HOUGH_RES`.
pub const HOUGH_RES: i32 = 180;

/// `256*cos(i deg)` / `256*sin(i deg)` for `i` in `0..HOUGH_RES`, matching
/// the fixed-point direction vectors a blazed trail is projected onto.
/// Computed at load time rather than carried as a literal table, since the
/// values are exactly reproducible from their defining formula. Mirrors
/// `rHvX`/`rHvY`.
pub fn hough_direction_tables() -> ([i32; HOUGH_RES as usize], [i32; HOUGH_RES as usize]) {
    let mut rhv_x = [0i32; HOUGH_RES as usize];
    let mut rhv_y = [0i32; HOUGH_RES as usize];
    for i in 0..HOUGH_RES as usize {
        let theta = (i as f64) * std::f64::consts::PI / 180.0;
        rhv_x[i] = (256.0 * theta.cos()).round() as i32;
        rhv_y[i] = (256.0 * theta.sin()).round() as i32;
    }
    (rhv_x, rhv_y)
}

/// The strongest straight edge found by projecting a blazed trail's pixels
/// onto each of [`HOUGH_RES`] candidate directions and keeping whichever
/// direction (and perpendicular offset bucket) collected the most votes.
/// Mirrors `DmtxBestLine`.
#[derive(Debug, Clone, Copy)]
pub struct BestLine {
    pub angle: i32,
    pub h_offset: i32,
    pub mag: i32,
    pub step_beg: i32,
    pub step_pos: i32,
    pub step_neg: i32,
    pub dist_sq: i64,
    pub devn: f64,
    pub loc_beg: (i64, i64),
    pub loc_pos: (i64, i64),
    pub loc_neg: (i64, i64),
}

impl BestLine {
    fn new(step_beg: i32, loc_beg: (i64, i64)) -> Self {
        Self {
            angle: 0,
            h_offset: 0,
            mag: 0,
            step_beg,
            step_pos: step_beg,
            step_neg: step_beg,
            dist_sq: 0,
            devn: 0.0,
            loc_beg,
            loc_pos: loc_beg,
            loc_neg: loc_beg,
        }
    }
}

struct TrailParams<'a> {
    cache: &'a Cache,
    steps_total: i32,
    jump_to_neg: i32,
    jump_to_pos: i32,
    final_neg: (i64, i64),
    final_pos: (i64, i64),
}

/// Walks a blazed trail from `step_beg` out to `step_pos`/`step_neg`,
/// voting every pixel crossed into a `[3][HOUGH_RES]` Hough accumulator,
/// then returns the direction (and perpendicular offset bucket) with the
/// most votes, skipping any angle within `hough_avoid` of a direction
/// already claimed by an earlier edge. Mirrors `FindBestSolidLine`.
#[allow(clippy::too_many_arguments)]
pub fn find_best_solid_line(
    cache: &Cache,
    flow_begin_loc: (i64, i64),
    steps_total: i32,
    jump_to_neg: i32,
    jump_to_pos: i32,
    final_neg: (i64, i64),
    final_pos: (i64, i64),
    step_beg: i32,
    step_pos: i32,
    step_neg: i32,
    hough_avoid: Option<i32>,
) -> BestLine {
    let params = TrailParams { cache, steps_total, jump_to_neg, jump_to_pos, final_neg, final_pos };
    let (rhv_x, rhv_y) = hough_direction_tables();

    let loc_beg = crate::follow::follow_seek(
        cache, flow_begin_loc, steps_total, jump_to_neg, jump_to_pos, final_neg, final_pos, step_beg,
    )
    .loc;

    let mut hough = [[0i32; HOUGH_RES as usize]; 3];

    let mut follow = crate::follow::follow_seek(
        params.cache,
        loc_beg,
        params.steps_total,
        params.jump_to_neg,
        params.jump_to_pos,
        params.final_neg,
        params.final_pos,
        0,
    );
    follow.step = step_beg;

    let mut visit = |follow: Follow| {
        let dx = follow.loc.0 - loc_beg.0;
        let dy = follow.loc.1 - loc_beg.1;
        for angle in 0..HOUGH_RES as usize {
            let d_h = rhv_x[angle] * dy - rhv_y[angle] * dx;
            if !(-384..=384).contains(&d_h) {
                continue;
            }
            let offset = if d_h > 128 {
                2
            } else if d_h >= -128 {
                1
            } else {
                0
            };
            hough[offset][angle] += 1;
        }
    };

    visit(follow);
    let mut cur = follow;
    for _ in step_beg..step_pos {
        cur = follow_step(
            params.cache,
            params.steps_total,
            params.jump_to_neg,
            params.jump_to_pos,
            params.final_neg,
            params.final_pos,
            cur,
            1,
        );
        visit(cur);
    }
    let loc_pos = cur.loc;

    let mut cur = follow;
    for _ in step_neg..step_beg {
        cur = follow_step(
            params.cache,
            params.steps_total,
            params.jump_to_neg,
            params.jump_to_pos,
            params.final_neg,
            params.final_pos,
            cur,
            -1,
        );
        visit(cur);
    }
    let loc_neg = cur.loc;

    let avoid_window = HOUGH_RES / 6;
    let mut best_angle = 0i32;
    let mut best_offset = 0i32;
    let mut best_mag = -1i32;
    for angle in 0..HOUGH_RES {
        if let Some(avoid) = hough_avoid {
            let mut diff = (angle - avoid).abs();
            if diff > HOUGH_RES / 2 {
                diff = HOUGH_RES - diff;
            }
            if diff < avoid_window {
                continue;
            }
        }
        for offset in 0..3 {
            let mag = hough[offset][angle as usize];
            if mag > best_mag {
                best_mag = mag;
                best_angle = angle;
                best_offset = offset as i32;
            }
        }
    }

    let mut line = BestLine::new(step_beg, loc_beg);
    line.angle = best_angle;
    line.h_offset = best_offset;
    line.mag = best_mag;
    line.step_pos = step_pos;
    line.step_neg = step_neg;
    line.loc_pos = loc_pos;
    line.loc_neg = loc_neg;
    let dx = (loc_pos.0 - loc_neg.0) as i64;
    let dy = (loc_pos.1 - loc_neg.1) as i64;
    line.dist_sq = dx * dx + dy * dy;
    line
}

/// A narrower variant of [`find_best_solid_line`] used when re-fitting a
/// calibration edge: the trail has no "total trip"/magic-jump structure, so
/// it walks forward from `loc_beg` for `trip_steps` steps using only the
/// local direction nibble ([`crate::follow::follow_step2`]), in direction
/// `sign`. Mirrors `FindBestSolidLine2`.
pub fn find_best_solid_line2(
    cache: &Cache,
    loc_beg: (i64, i64),
    trip_steps: i32,
    sign: i32,
    hough_avoid: Option<i32>,
) -> BestLine {
    let (rhv_x, rhv_y) = hough_direction_tables();
    let mut hough = [[0i32; HOUGH_RES as usize]; 3];

    let avoid_window = HOUGH_RES / 6;
    let test_angle = |angle: i32| -> bool {
        match hough_avoid {
            None => true,
            Some(avoid) => {
                let mut diff = (angle - avoid).abs();
                if diff > HOUGH_RES / 2 {
                    diff = HOUGH_RES - diff;
                }
                diff >= avoid_window
            }
        }
    };

    let mut follow = crate::follow::follow_seek_loc(cache, loc_beg);
    let mut best_angle = 0i32;
    let mut best_offset = 0i32;

    for _ in 0..trip_steps {
        let dx = follow.loc.0 - loc_beg.0;
        let dy = follow.loc.1 - loc_beg.1;
        for angle in 0..HOUGH_RES {
            if !test_angle(angle) {
                continue;
            }
            let d_h = rhv_x[angle as usize] * dy as i32 - rhv_y[angle as usize] * dx as i32;
            if !(-384..=384).contains(&d_h) {
                continue;
            }
            let offset = if d_h > 128 {
                2
            } else if d_h >= -128 {
                1
            } else {
                0
            };
            hough[offset][angle as usize] += 1;
            if hough[offset][angle as usize] > hough[best_offset as usize][best_angle as usize] {
                best_angle = angle;
                best_offset = offset as i32;
            }
        }
        follow = crate::follow::follow_step2(cache, follow, sign);
    }
    let best_mag = hough[best_offset as usize][best_angle as usize];

    let mut line = BestLine::new(0, loc_beg);
    line.angle = best_angle;
    line.h_offset = best_offset;
    line.mag = best_mag;
    line
}

/// Separates how far a trail travels *along* a candidate line from how far
/// it wanders *off* it, returning the updated travel extent (`step_pos`
/// clamped so perpendicular wander never exceeds roughly 3 modules) and the
/// deviation (`devn`) used to judge whether the trail is straight enough to
/// be a real module edge. Mirrors `FindTravelLimits`.
pub fn find_travel_limits(
    cache: &Cache,
    steps_total: i32,
    jump_to_neg: i32,
    jump_to_pos: i32,
    final_neg: (i64, i64),
    final_pos: (i64, i64),
    line: &mut BestLine,
) {
    let (rhv_x, rhv_y) = hough_direction_tables();
    let cos_a = rhv_x[line.angle as usize] as f64 / 256.0;
    let sin_a = rhv_y[line.angle as usize] as f64 / 256.0;

    const WANDER_BOUND: f64 = 3.0 * 256.0;

    let mut pos_travel_max = 0i64;
    let mut neg_travel_max = 0i64;
    let mut pos_wander_min_lock = 0.0f64;
    let mut pos_wander_max_lock = 0.0f64;
    let mut neg_wander_min_lock = 0.0f64;
    let mut neg_wander_max_lock = 0.0f64;
    let mut pos_dist_sq_max = -1i64;
    let mut neg_dist_sq_max = -1i64;

    let mut follow = crate::follow::follow_seek(
        cache, line.loc_beg, steps_total, jump_to_neg, jump_to_pos, final_neg, final_pos, 0,
    );
    follow.step = line.step_beg;

    let mut cur = follow;
    for i in 0.. {
        if cur.step >= line.step_pos {
            break;
        }
        cur = follow_step(cache, steps_total, jump_to_neg, jump_to_pos, final_neg, final_pos, cur, 1);
        let dx = (cur.loc.0 - line.loc_beg.0) as f64;
        let dy = (cur.loc.1 - line.loc_beg.1) as f64;
        let travel = dx * cos_a + dy * sin_a;
        let wander = -dx * sin_a + dy * cos_a;

        if wander.abs() > WANDER_BOUND {
            break;
        }

        if i < 10 {
            pos_wander_min_lock = pos_wander_min_lock.min(wander);
            pos_wander_max_lock = pos_wander_max_lock.max(wander);
        }

        let dist_sq = dx * dx + dy * dy;
        if dist_sq as i64 > pos_dist_sq_max {
            pos_dist_sq_max = dist_sq as i64;
            pos_travel_max = travel as i64;
            pos_wander_min_lock = pos_wander_min_lock.min(wander);
            pos_wander_max_lock = pos_wander_max_lock.max(wander);
        }
    }

    let mut cur = follow;
    for i in 0.. {
        if cur.step <= line.step_neg {
            break;
        }
        cur = follow_step(cache, steps_total, jump_to_neg, jump_to_pos, final_neg, final_pos, cur, -1);
        let dx = (cur.loc.0 - line.loc_beg.0) as f64;
        let dy = (cur.loc.1 - line.loc_beg.1) as f64;
        let travel = dx * cos_a + dy * sin_a;
        let wander = -dx * sin_a + dy * cos_a;

        if wander.abs() > WANDER_BOUND {
            break;
        }

        if i < 10 {
            neg_wander_min_lock = neg_wander_min_lock.min(wander);
            neg_wander_max_lock = neg_wander_max_lock.max(wander);
        }

        let dist_sq = dx * dx + dy * dy;
        if dist_sq as i64 > neg_dist_sq_max {
            neg_dist_sq_max = dist_sq as i64;
            neg_travel_max = travel as i64;
            neg_wander_min_lock = neg_wander_min_lock.min(wander);
            neg_wander_max_lock = neg_wander_max_lock.max(wander);
        }
    }

    let _ = (pos_travel_max, neg_travel_max);
    line.devn = ((pos_wander_max_lock - pos_wander_min_lock).max(neg_wander_max_lock - neg_wander_min_lock)) / 256.0;
    line.dist_sq = pos_dist_sq_max.max(0) + neg_dist_sq_max.max(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_tables_match_trig_identities() {
        let (rhv_x, rhv_y) = hough_direction_tables();
        assert_eq!(rhv_x[0], 256);
        assert_eq!(rhv_y[0], 0);
        assert!((rhv_x[90]).abs() <= 1);
        assert_eq!(rhv_y[90], 256);
    }
}
