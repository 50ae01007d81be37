//! ECC 200 module placement.
//!
//! This crate implements the zig-zag bijection between a symbol's codeword
//! bytes and its mapping grid of modules. The same traversal order is used
//! in both directions: during encoding it paints codeword bits onto modules,
//! during decoding it reads modules back off into codeword bits. Which
//! direction a given call performs is decided per-module by whether that
//! module has already been [`ModuleFlags::ASSIGNED`] a value.
//!
//! # Safety
//! Unsafe code is forbidden via a crate-level attribute.

#![forbid(unsafe_code)]

use std::fmt;

mod grid;
mod placement;

pub use grid::{MappingGrid, ModuleFlags};
pub use placement::place_ecc200;

/// Errors produced by module placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// The codeword buffer's length didn't match what the traversal
    /// produced or consumed.
    CodewordCountMismatch {
        /// Number of codewords the traversal actually visited.
        visited: usize,
        /// Number of codewords the caller's buffer expected.
        expected: usize,
    },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodewordCountMismatch { visited, expected } => write!(
                f,
                "placement traversal visited {visited} codewords, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Result type for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, PlacementError>;
