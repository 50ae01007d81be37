//! Data Matrix ECC 200 encoder and decoder.
//!
//! This crate is the glue that ties the lower-level `dmtx-*` crates into
//! the two public entry points a caller actually wants: [`encode`] turns a
//! byte string into a rendered [`Raster`](dmtx_raster::Raster), and
//! [`decode`] searches a raster for Data Matrix symbols and recovers their
//! original bytes.
//!
//! ```
//! use dmtx::{decode, encode, DecodeOptions, EncodeOptions};
//!
//! let raster = encode(b"Wikipedia", &EncodeOptions::default()).unwrap();
//! let messages = decode(&raster, &DecodeOptions::default());
//! assert_eq!(messages[0].output.as_slice(), b"Wikipedia");
//! ```
//!
//! # Safety
//! Unsafe code is forbidden via a crate-level attribute.

#![forbid(unsafe_code)]

mod decode;
mod encode;
mod options;
mod render;
mod rs_symbol;

pub use decode::{decode, Message};
pub use dmtx_encoding::{EncodeReason, Scheme, SchemeRequest};
pub use dmtx_locate::Deadline;
pub use dmtx_raster::{ImageFlip, PixelPacking, Raster, RasterError};
pub use dmtx_symbol::{SizeRequest, SymbolSize};
pub use encode::{encode, encode_mosaic, EncodeError};
pub use options::{DecodeError, DecodeOptions, EncodeOptions};
