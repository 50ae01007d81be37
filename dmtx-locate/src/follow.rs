use crate::cache::CacheFlags;
use crate::flow::{PATTERN_X, PATTERN_Y};
use crate::Cache;

/// A cursor walking a blazed trail one step at a time, tracking signed
/// distance from the trail's seed pixel. Mirrors `DmtxFollow`.
#[derive(Debug, Clone, Copy)]
pub struct Follow {
    /// Current location.
    pub loc: (i64, i64),
    /// Signed step count from the trail seed (negative is "downstream").
    pub step: i32,
    /// Cache byte at `loc` (direction nibbles plus visited/assigned bits).
    pub neighbor: u8,
}

/// Positions a follower at the trail seed pixel. Mirrors `FollowSeekLoc`.
pub fn follow_seek_loc(cache: &Cache, loc: (i64, i64)) -> Follow {
    let neighbor = cache.get(loc.0, loc.1).expect("trail seed is always cached");
    Follow { loc, step: 0, neighbor }
}

/// Advances a single step along the trail in the direction implied by
/// `sign` (+1 downstream, -1 upstream), following the packed direction
/// nibbles left behind by [`crate::region::trail_blaze_continuous`] and
/// wrapping around at the trail's two magic endpoints. Mirrors `FollowStep`.
pub fn follow_step(
    cache: &Cache,
    steps_total: i32,
    jump_to_neg: i32,
    jump_to_pos: i32,
    final_neg: (i64, i64),
    final_pos: (i64, i64),
    follow_beg: Follow,
    sign: i32,
) -> Follow {
    debug_assert!(sign.abs() == 1);
    debug_assert!(follow_beg.neighbor & CacheFlags::ASSIGNED.bits() != 0);

    let factor = steps_total + 1;
    let step_mod = if sign > 0 {
        (factor + (follow_beg.step % factor)) % factor
    } else {
        (factor - (follow_beg.step % factor)) % factor
    };

    let loc = if sign > 0 && step_mod == jump_to_neg {
        final_neg
    } else if sign < 0 && step_mod == jump_to_pos {
        final_pos
    } else {
        let pattern_idx = if sign < 0 {
            (follow_beg.neighbor & CacheFlags::DOWNSTREAM.bits()) as usize
        } else {
            ((follow_beg.neighbor & CacheFlags::UPSTREAM.bits()) >> 3) as usize
        };
        (follow_beg.loc.0 + PATTERN_X[pattern_idx], follow_beg.loc.1 + PATTERN_Y[pattern_idx])
    };

    let neighbor = cache.get(loc.0, loc.1).expect("trail stays within cached bounds");
    Follow { loc, step: follow_beg.step + sign, neighbor }
}

/// Advances a single step using only the local direction nibble, without
/// the two-endpoint trail-wraparound logic (used for the gapped
/// calibration-edge trail, which has no "total trip" concept). Mirrors
/// `FollowStep2`.
pub fn follow_step2(cache: &Cache, follow_beg: Follow, sign: i32) -> Follow {
    debug_assert!(sign.abs() == 1);
    debug_assert!(follow_beg.neighbor & CacheFlags::ASSIGNED.bits() != 0);

    let pattern_idx = if sign < 0 {
        (follow_beg.neighbor & CacheFlags::DOWNSTREAM.bits()) as usize
    } else {
        ((follow_beg.neighbor & CacheFlags::UPSTREAM.bits()) >> 3) as usize
    };
    let loc = (follow_beg.loc.0 + PATTERN_X[pattern_idx], follow_beg.loc.1 + PATTERN_Y[pattern_idx]);
    let neighbor = cache.get(loc.0, loc.1).expect("trail stays within cached bounds");
    Follow { loc, step: follow_beg.step + sign, neighbor }
}

/// Seeks `seek` steps from the trail's seed pixel. Mirrors `FollowSeek`.
pub fn follow_seek(
    cache: &Cache,
    flow_begin_loc: (i64, i64),
    steps_total: i32,
    jump_to_neg: i32,
    jump_to_pos: i32,
    final_neg: (i64, i64),
    final_pos: (i64, i64),
    seek: i32,
) -> Follow {
    let mut follow = follow_seek_loc(cache, flow_begin_loc);
    let sign = if seek > 0 { 1 } else { -1 };
    let mut i = 0;
    while i != seek {
        follow = follow_step(cache, steps_total, jump_to_neg, jump_to_pos, final_neg, final_pos, follow, sign);
        i += sign;
    }
    follow
}
