/// Standard Bresenham line stepper, stepping one pixel at a time along the
/// line's dominant axis while accumulating error against the minor axis.
/// Mirrors `DmtxBresLine`/`BresLineInit`/`BresLineGetStep`/`BresLineStep`.
#[derive(Debug, Clone, Copy)]
pub struct BresLine {
    x_step: i64,
    y_step: i64,
    x_delta: i64,
    y_delta: i64,
    steep: bool,
    x_out: i64,
    y_out: i64,
    travel: i64,
    outward: i64,
    error: i64,
    loc: (i64, i64),
    loc0: (i64, i64),
    loc1: (i64, i64),
}

impl BresLine {
    /// Builds a stepper walking from `loc0` toward `loc1`, with `loc2`
    /// giving a third point used only to decide which perpendicular side is
    /// "outward" (via the sign of the cross product).
    pub fn new(loc0: (i64, i64), loc1: (i64, i64), loc2: (i64, i64)) -> Self {
        let x_delta = (loc1.0 - loc0.0).abs();
        let y_delta = (loc1.1 - loc0.1).abs();
        let steep = y_delta > x_delta;

        let (x_delta, y_delta) = if steep { (y_delta, x_delta) } else { (x_delta, y_delta) };

        let x_step = if loc1.0 > loc0.0 { 1 } else { -1 };
        let y_step = if loc1.1 > loc0.1 { 1 } else { -1 };

        let (x_step, y_step) = if steep { (y_step, x_step) } else { (x_step, y_step) };

        let cross = (loc1.0 - loc0.0) * (loc2.1 - loc0.1) - (loc1.1 - loc0.1) * (loc2.0 - loc0.0);
        let (x_out, y_out) = if steep {
            if cross > 0 { (1, 0) } else { (-1, 0) }
        } else if cross > 0 {
            (0, -1)
        } else {
            (0, 1)
        };

        Self {
            x_step,
            y_step,
            x_delta,
            y_delta,
            steep,
            x_out,
            y_out,
            travel: 0,
            outward: 0,
            error: x_delta / 2,
            loc: loc0,
            loc0,
            loc1,
        }
    }

    /// Current pixel location.
    pub fn loc(&self) -> (i64, i64) {
        self.loc
    }

    /// Steps the line forward (`is_forward = true`) or backward, returning
    /// the resulting location. Mirrors `BresLineGetStep` composed with
    /// `BresLineStep`.
    pub fn step(&mut self, is_forward: bool, is_travel: bool) -> (i64, i64) {
        if is_travel {
            self.travel += if is_forward { 1 } else { -1 };
        } else {
            self.outward += if is_forward { 1 } else { -1 };
        }

        let sign = if is_forward { 1 } else { -1 };

        if self.steep {
            self.loc.1 += self.y_step * sign;
        } else {
            self.loc.0 += self.x_step * sign;
        }

        self.error -= self.y_delta * sign;
        if self.error < 0 && sign > 0 {
            if self.steep {
                self.loc.0 += self.x_step;
            } else {
                self.loc.1 += self.y_step;
            }
            self.error += self.x_delta;
        } else if self.error >= self.x_delta && sign < 0 {
            if self.steep {
                self.loc.0 -= self.x_step;
            } else {
                self.loc.1 -= self.y_step;
            }
            self.error -= self.x_delta;
        }

        self.loc
    }

    /// Steps the line one pixel perpendicular to its travel direction
    /// ("outward"), in the direction away from the third reference point
    /// supplied to [`BresLine::new`].
    pub fn step_outward(&mut self) -> (i64, i64) {
        self.loc.0 += self.x_out;
        self.loc.1 += self.y_out;
        self.loc
    }

    /// The line's defining endpoints, as supplied to [`BresLine::new`].
    pub fn endpoints(&self) -> ((i64, i64), (i64, i64)) {
        (self.loc0, self.loc1)
    }

    /// Classifies `target` (an adjacent pixel the caller wants to steer
    /// toward) into a `(travel, outward)` pair: one step along the line's
    /// dominant axis plus a signed count of perpendicular steps needed to
    /// reach `target` after that travel step. Mirrors `BresLineGetStep`.
    pub fn classify_step(&self, target: (i64, i64)) -> (i32, i32) {
        let mut probe = *self;
        let travel = if self.steep {
            if self.y_step > 0 {
                target.1 - self.loc.1
            } else {
                self.loc.1 - target.1
            }
        } else if self.x_step > 0 {
            target.0 - self.loc.0
        } else {
            self.loc.0 - target.0
        };

        if travel > 0 {
            probe.step(true, true);
        } else if travel < 0 {
            probe.step(false, true);
        }

        let outward = if self.steep {
            if self.x_out > 0 {
                target.0 - probe.loc.0
            } else {
                probe.loc.0 - target.0
            }
        } else if self.y_out > 0 {
            target.1 - probe.loc.1
        } else {
            probe.loc.1 - target.1
        };

        (travel as i32, outward as i32)
    }

    /// Applies one travel step (`travel` is `-1`, `0` or `1`) followed by
    /// `outward` (clamped to non-negative) perpendicular steps in a single
    /// call. Mirrors `BresLineStep`.
    pub fn step_travel_outward(&mut self, travel: i32, outward: i32) {
        if travel > 0 {
            self.step(true, true);
        } else if travel < 0 {
            self.step(false, true);
        }
        for _ in 0..outward.max(0) {
            self.step_outward();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_shallow_line_toward_target() {
        let mut line = BresLine::new((0, 0), (10, 2), (0, 10));
        for _ in 0..10 {
            line.step(true, true);
        }
        assert_eq!(line.loc().0, 10);
    }

    #[test]
    fn steps_steep_line_toward_target() {
        let mut line = BresLine::new((0, 0), (2, 10), (10, 0));
        for _ in 0..10 {
            line.step(true, true);
        }
        assert_eq!(line.loc().1, 10);
    }
}
