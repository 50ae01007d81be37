//! 2D vector and homogeneous-transform math.
//!
//! This crate provides the small set of geometric primitives the region
//! locator needs to track candidate symbol edges and to build the
//! perspective-correcting transform that maps a skewed quadrilateral in the
//! source image back onto an axis-aligned module grid: 2D vectors, rays, and
//! 3x3 homogeneous ("projective") matrices.
//!
//! # Safety
//! Unsafe code is forbidden via a crate-level attribute.

#![forbid(unsafe_code)]

use std::fmt;

mod matrix3;
mod ray2;
mod vector2;

pub use matrix3::Matrix3;
pub use ray2::Ray2;
pub use vector2::Vector2;

/// Values below this magnitude are treated as zero throughout this crate.
pub const ALMOST_ZERO: f64 = 0.000_000_01;

/// Errors produced by degenerate geometric operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomError {
    /// Two rays were parallel (or nearly so) and do not intersect.
    ParallelRays,
    /// A vector had near-zero magnitude where a unit direction was required.
    ZeroMagnitude,
}

impl fmt::Display for GeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParallelRays => write!(f, "rays are parallel and do not intersect"),
            Self::ZeroMagnitude => write!(f, "vector has near-zero magnitude"),
        }
    }
}

impl std::error::Error for GeomError {}

/// Result type for this crate's fallible geometric operations.
pub type Result<T> = std::result::Result<T, GeomError>;
