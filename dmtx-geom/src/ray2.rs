use crate::{GeomError, Result, Vector2, ALMOST_ZERO};

/// A 2D ray: an origin point `p` plus a unit direction `v`.
///
/// Most operations on this type assume `v` is already unit length; build
/// rays through [`Ray2::new`] with an already-normalized direction, or call
/// [`Vector2::norm`] on the direction first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray2 {
    /// Origin point.
    pub p: Vector2,
    /// Unit direction.
    pub v: Vector2,
}

impl Ray2 {
    /// Builds a ray from an origin and a (assumed unit-length) direction.
    pub fn new(p: Vector2, v: Vector2) -> Self {
        Self { p, v }
    }

    /// Signed perpendicular distance from `q` to this ray's line.
    pub fn distance_from(&self, q: Vector2) -> f64 {
        debug_assert!((1.0 - self.v.mag()).abs() <= ALMOST_ZERO);
        self.v.cross(q.sub(self.p))
    }

    /// Signed distance along the ray's direction to the projection of `q`.
    pub fn distance_along(&self, q: Vector2) -> f64 {
        q.sub(self.p).dot(self.v)
    }

    /// Returns the point at parameter `t` along the ray: `p + t*v`.
    pub fn point_along(&self, t: f64) -> Vector2 {
        debug_assert!((1.0 - self.v.mag()).abs() <= ALMOST_ZERO);
        self.p.add(self.v.scale(t))
    }

    /// Intersects two rays, returning the intersection point.
    ///
    /// Fails if the rays are parallel (including anti-parallel).
    pub fn intersect(&self, other: &Ray2) -> Result<Vector2> {
        let denom = other.v.cross(self.v);
        if denom.abs() <= ALMOST_ZERO {
            return Err(GeomError::ParallelRays);
        }

        let w = other.p.sub(self.p);
        let numer = other.v.cross(w);

        Ok(self.point_along(numer / denom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_rays_intersect_at_origin() {
        let horiz = Ray2::new(Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0));
        let vert = Ray2::new(Vector2::new(0.0, -1.0), Vector2::new(0.0, 1.0));
        let point = horiz.intersect(&vert).unwrap();
        assert!((point.x - 0.0).abs() < 1e-12);
        assert!((point.y - 0.0).abs() < 1e-12);
    }

    #[test]
    fn parallel_rays_fail_to_intersect() {
        let a = Ray2::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
        let b = Ray2::new(Vector2::new(0.0, 1.0), Vector2::new(1.0, 0.0));
        assert_eq!(a.intersect(&b), Err(GeomError::ParallelRays));
    }

    #[test]
    fn distance_from_is_zero_on_the_line() {
        let ray = Ray2::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
        assert!(ray.distance_from(Vector2::new(5.0, 0.0)).abs() < 1e-12);
    }
}
