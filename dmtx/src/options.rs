use std::fmt;

use dmtx_encoding::SchemeRequest;
use dmtx_raster::{ImageFlip, PixelPacking};
use dmtx_symbol::SizeRequest;

/// Knobs for [`crate::encode`]/[`crate::encode_mosaic`]. Mirrors the
/// settable fields of `DmtxEncode` (spec §6 "Encode options").
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Which encodation scheme(s) to try.
    pub scheme: SchemeRequest,
    /// Requested symbol size or shape family. [`SizeRequest::ShapeAuto`] is
    /// rejected by encode (mirrors `dmtxEncodeSetProp`'s explicit
    /// `DmtxSymbolShapeAuto` rejection); use [`SizeRequest::SquareAuto`] or
    /// [`SizeRequest::RectAuto`] instead.
    pub size_request: SizeRequest,
    /// Side length, in pixels, of one rendered module. Must be `>= 1`.
    pub module_size: u32,
    /// Width, in pixels, of the quiet-zone margin around the symbol.
    pub margin_size: u32,
    /// Pixel packing of the rendered output raster.
    pub pixel_packing: PixelPacking,
    /// Row order of the rendered output raster.
    pub image_flip: ImageFlip,
    /// Extra padding bytes appended to each output row.
    pub row_pad_bytes: u32,
    /// Input byte value to treat as the FNC1 Application Identifier
    /// sentinel, if any.
    pub fnc1: Option<u8>,
}

impl Default for EncodeOptions {
    /// Mirrors `dmtxEncodeCreate`'s defaults: `AutoBest` scheme,
    /// `SquareAuto` size, 5px modules, 10px margin, 24bpp RGB, no flip, no
    /// row padding, no FNC1.
    fn default() -> Self {
        Self {
            scheme: SchemeRequest::AutoBest,
            size_request: SizeRequest::SquareAuto,
            module_size: 5,
            margin_size: 10,
            pixel_packing: PixelPacking::TwentyFourBppRgb,
            image_flip: ImageFlip::empty(),
            row_pad_bytes: 0,
            fnc1: None,
        }
    }
}

/// Knobs for [`crate::decode`]. Mirrors the settable fields of
/// `DmtxDecode` plus the region-locator tunables on `DmtxRegion` (spec §6
/// "Decode options").
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Integer subsample divisor between the raw raster and the decoder's
    /// working coordinate space. `1` processes every pixel.
    pub scale: i64,
    /// Minimum edge-flow magnitude a seed pixel must show, as a fraction
    /// of full contrast (`0.0..=1.0`). Mirrors `edgeThresh`, which the
    /// source API takes as an integer percentage `1..=100`.
    pub edge_thresh: f64,
    /// Minimum pixel spacing between candidate seed probes. Must be
    /// `>= 1`.
    pub scan_gap: i64,
    /// Expected symbol size or shape family.
    pub size_request: SizeRequest,
    /// Input byte value to treat as the FNC1 Application Identifier
    /// sentinel, if any.
    pub fnc1: Option<u8>,
    /// Maximum number of symbol-level errors Reed-Solomon correction may
    /// fix per block before giving up on a region. `None` uses each
    /// size's `block_max_correctable`.
    pub corrections_max: Option<u16>,
    /// Wall-clock budget for the whole decode call. `None` runs until the
    /// scan grid is exhausted.
    pub timeout: Option<std::time::Duration>,
}

impl Default for DecodeOptions {
    /// Mirrors the source's effective defaults: `edgeThresh` 10%,
    /// `scanGap` 2px, no scaling, any shape, no FNC1 remapping, no
    /// correction cap, no timeout.
    fn default() -> Self {
        Self {
            scale: 1,
            edge_thresh: 0.10,
            scan_gap: 2,
            size_request: SizeRequest::ShapeAuto,
            fnc1: None,
            corrections_max: None,
            timeout: None,
        }
    }
}

/// Errors an out-of-range option setter can report. Mirrors the "Option
/// out of range" error kind (spec §7): the setter validates its argument
/// and leaves existing state untouched on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// `edge_thresh` was outside `1..=100` (source) / `0.0..=1.0` (here).
    EdgeThreshOutOfRange,
    /// `scan_gap` was less than 1.
    ScanGapOutOfRange,
    /// A size request of [`SizeRequest::ShapeAuto`] was passed to an
    /// encode-only setter that rejects it (mirrors `dmtxEncodeSetProp`).
    ShapeAutoNotValidForEncode,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::EdgeThreshOutOfRange => "edge_thresh must be in 0.0..=1.0",
            Self::ScanGapOutOfRange => "scan_gap must be at least 1",
            Self::ShapeAutoNotValidForEncode => "ShapeAuto is not a valid encode size request",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for DecodeError {}

impl EncodeOptions {
    /// Validates `size_request` the way `dmtxEncodeSetProp` does: a
    /// specific or square/rect auto request is accepted, `ShapeAuto` is
    /// rejected without mutating `self`.
    pub fn set_size_request(&mut self, size_request: SizeRequest) -> Result<(), DecodeError> {
        if size_request == SizeRequest::ShapeAuto {
            return Err(DecodeError::ShapeAutoNotValidForEncode);
        }
        self.size_request = size_request;
        Ok(())
    }
}

impl DecodeOptions {
    /// Validates and sets `edge_thresh`, mirroring the source's `1..=100`
    /// percentage range (expressed here as a `0.0..=1.0` fraction).
    pub fn set_edge_thresh(&mut self, edge_thresh: f64) -> Result<(), DecodeError> {
        if !(0.0..=1.0).contains(&edge_thresh) {
            return Err(DecodeError::EdgeThreshOutOfRange);
        }
        self.edge_thresh = edge_thresh;
        Ok(())
    }

    /// Validates and sets `scan_gap`.
    pub fn set_scan_gap(&mut self, scan_gap: i64) -> Result<(), DecodeError> {
        if scan_gap < 1 {
            return Err(DecodeError::ScanGapOutOfRange);
        }
        self.scan_gap = scan_gap;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_options_reject_shape_auto() {
        let mut opts = EncodeOptions::default();
        assert_eq!(
            opts.set_size_request(SizeRequest::ShapeAuto),
            Err(DecodeError::ShapeAutoNotValidForEncode)
        );
        assert_eq!(opts.size_request, SizeRequest::SquareAuto);
    }

    #[test]
    fn decode_options_reject_bad_edge_thresh() {
        let mut opts = DecodeOptions::default();
        assert_eq!(opts.set_edge_thresh(1.5), Err(DecodeError::EdgeThreshOutOfRange));
        assert!((opts.edge_thresh - 0.10).abs() < f64::EPSILON);
    }

    #[test]
    fn decode_options_reject_bad_scan_gap() {
        let mut opts = DecodeOptions::default();
        assert_eq!(opts.set_scan_gap(0), Err(DecodeError::ScanGapOutOfRange));
    }
}
