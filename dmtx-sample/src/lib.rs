//! Module color sampler.
//!
//! Turns a [`dmtx_locate::Region`] into a populated
//! [`dmtx_placement::MappingGrid`] by sampling every data-bearing module's
//! color through the region's fitted perspective transform.
//!
//! # Safety
//! Unsafe code is forbidden via a crate-level attribute.

#![forbid(unsafe_code)]

mod sampler;

pub use sampler::sample_region;
