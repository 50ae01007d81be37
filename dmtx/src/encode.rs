//! Top-level encode entry points: input bytes to a rendered symbol raster.
//!
//! Mirrors `dmtxEncodeDataMatrix`/`dmtxEncodeDataMosaic` (`dmtxencode.c`):
//! pack the input into data codewords under the requested scheme, append
//! Reed-Solomon parity, place the codewords onto the mapping grid, then
//! paint the full symbol (finder bar, clock track, data) into a raster.

use dmtx_encoding::{encode_optimize_best, encode_single_scheme, EncodeError as SchemeError, SchemeRequest};
use dmtx_placement::{place_ecc200, MappingGrid, ModuleFlags};
use dmtx_raster::{Raster, RasterError};
use dmtx_symbol::{SizeRequest, SymbolSize};

use crate::options::EncodeOptions;
use crate::render::render_symbol;
use crate::rs_symbol::rs_encode_symbol;

/// Errors from [`encode`]/[`encode_mosaic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Packing `data` into codewords failed; see [`SchemeError`].
    Scheme(SchemeError),
    /// No symbol size large enough to carry all three mosaic planes was
    /// found within the requested shape/size family.
    MosaicSizeNotSatisfiable,
    /// Rendering the placed grid into a raster failed.
    Raster(RasterError),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheme(err) => write!(f, "{err}"),
            Self::MosaicSizeNotSatisfiable => {
                write!(f, "no symbol size holds all three mosaic color planes")
            }
            Self::Raster(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<SchemeError> for EncodeError {
    fn from(err: SchemeError) -> Self {
        Self::Scheme(err)
    }
}

impl From<RasterError> for EncodeError {
    fn from(err: RasterError) -> Self {
        Self::Raster(err)
    }
}

/// Encodes `data` into a single-color Data Matrix symbol, rendered as a
/// raster per `opts`. Mirrors `dmtxEncodeDataMatrix`.
pub fn encode(data: &[u8], opts: &EncodeOptions) -> Result<Raster, EncodeError> {
    let (size, codewords) = encode_data_codewords(data, opts.size_request, opts.scheme, opts.fnc1)?;
    let mut code = rs_encode_symbol(&codewords, size);

    let mut grid = MappingGrid::new(size.mapping_rows() as usize, size.mapping_cols() as usize);
    place_ecc200(&mut grid, &mut code).expect("codeword count matches mapping matrix size");

    let raster = render_symbol(size, &[(&grid, ModuleFlags::ON, 0)], opts)?;
    Ok(raster)
}

/// Encodes `data` as a Data Mosaic: splits the payload into three roughly
/// equal thirds and layers each onto its own color plane (red, green,
/// blue) of the same symbol, tripling the effective capacity of one
/// rendered raster. Mirrors `dmtxEncodeDataMosaic`.
pub fn encode_mosaic(data: &[u8], opts: &EncodeOptions) -> Result<Raster, EncodeError> {
    let third = data.len().div_ceil(3);
    let (red, rest) = data.split_at(third.min(data.len()));
    let (green, blue) = rest.split_at(third.min(rest.len()));

    let first_size = SymbolSize::find(third.try_into().unwrap_or(u16::MAX), opts.size_request)
        .ok_or(EncodeError::MosaicSizeNotSatisfiable)?;
    let candidates = mosaic_size_candidates(opts.size_request, first_size);

    for size in candidates {
        let request = SizeRequest::Explicit(size);
        let Ok((red_size, red_code)) = encode_data_codewords(red, request, opts.scheme, opts.fnc1) else {
            continue;
        };
        if red_size != size {
            continue;
        }
        let Ok((green_size, green_code)) = encode_data_codewords(green, request, opts.scheme, opts.fnc1) else {
            continue;
        };
        if green_size != size {
            continue;
        }
        let Ok((blue_size, blue_code)) = encode_data_codewords(blue, request, opts.scheme, opts.fnc1) else {
            continue;
        };
        if blue_size != size {
            continue;
        }

        let mut red_code = rs_encode_symbol(&red_code, size);
        let mut green_code = rs_encode_symbol(&green_code, size);
        let mut blue_code = rs_encode_symbol(&blue_code, size);

        let rows = size.mapping_rows() as usize;
        let cols = size.mapping_cols() as usize;
        let mut grid = MappingGrid::new(rows, cols);

        place_ecc200(&mut grid, &mut red_code).expect("codeword count matches mapping matrix size");

        // Reuse one grid across all three passes: each plane's ON result is
        // copied out into its own flag bit, then the grid is reset to a
        // fresh unassigned state before the next plane paints onto it.
        copy_on_into(&mut grid, rows, cols, ModuleFlags::ON_RED);
        clear_placement_state(&mut grid, rows, cols);

        place_ecc200(&mut grid, &mut green_code).expect("codeword count matches mapping matrix size");
        copy_on_into(&mut grid, rows, cols, ModuleFlags::ON_GREEN);
        clear_placement_state(&mut grid, rows, cols);

        place_ecc200(&mut grid, &mut blue_code).expect("codeword count matches mapping matrix size");
        copy_on_into(&mut grid, rows, cols, ModuleFlags::ON_BLUE);

        let planes = [
            (&grid, ModuleFlags::ON_RED, 0),
            (&grid, ModuleFlags::ON_GREEN, 1),
            (&grid, ModuleFlags::ON_BLUE, 2),
        ];
        let raster = render_symbol(size, &planes, opts)?;
        return Ok(raster);
    }

    log::debug!("no symbol size in the requested family holds all three mosaic planes");
    Err(EncodeError::MosaicSizeNotSatisfiable)
}

fn encode_data_codewords(
    data: &[u8],
    size_request: SizeRequest,
    scheme: SchemeRequest,
    fnc1: Option<u8>,
) -> Result<(SymbolSize, Vec<u8>), SchemeError> {
    match scheme {
        SchemeRequest::Single(scheme) => encode_single_scheme(data, size_request, scheme, fnc1),
        SchemeRequest::AutoBest => encode_optimize_best(data, size_request, fnc1),
        SchemeRequest::AutoFast => Err(SchemeError::AutoFastUnimplemented),
    }
}

/// Every size at or after `first` within `request`'s shape family, in
/// catalog order. Mirrors the `sizeIdxAttempt` retry loop in
/// `dmtxEncodeDataMosaic`.
fn mosaic_size_candidates(request: SizeRequest, first: SymbolSize) -> Vec<SymbolSize> {
    match request {
        SizeRequest::Explicit(size) => vec![size],
        SizeRequest::SquareAuto => SymbolSize::all().into_iter().filter(|s| s.is_square()).skip_while(|&s| s != first).collect(),
        SizeRequest::RectAuto => SymbolSize::all().into_iter().filter(|s| !s.is_square()).skip_while(|&s| s != first).collect(),
        SizeRequest::ShapeAuto => SymbolSize::all().into_iter().skip_while(|&s| s != first).collect(),
    }
}

/// Resets a grid cell back to the "unassigned" state `place_ecc200`'s
/// encode direction expects, clearing `ON` along with `ASSIGNED`/`VISITED`
/// -- otherwise a later color pass whose codeword bit is 0 at a module an
/// earlier pass turned on would leave that stale `ON` bit in place (`ON`
/// is only ever inserted, never cleared, by the placement traversal).
fn clear_placement_state(grid: &mut MappingGrid, rows: usize, cols: usize) {
    for row in 0..rows {
        for col in 0..cols {
            grid.get_mut(row, col).remove(ModuleFlags::ON | ModuleFlags::ASSIGNED | ModuleFlags::VISITED);
        }
    }
}

fn copy_on_into(grid: &mut MappingGrid, rows: usize, cols: usize, target: ModuleFlags) {
    for row in 0..rows {
        for col in 0..cols {
            if grid.get(row, col).contains(ModuleFlags::ON) {
                grid.insert(row, col, target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_renders_a_square_symbol_for_short_input() {
        // Plain ASCII needs exactly one codeword per non-digit byte, so
        // "Wikipedia" (9 bytes, no digit pairs) needs 9 data words -- the
        // smallest square holding that is Square16 (12 data words); Square14
        // (8) falls short. Pinning the scheme keeps this deterministic,
        // unlike AutoBest which could legitimately pick a smaller size.
        let opts = EncodeOptions {
            scheme: SchemeRequest::Single(dmtx_encoding::Scheme::Ascii),
            ..EncodeOptions::default()
        };
        let raster = encode(b"Wikipedia", &opts).unwrap();
        let size = SymbolSize::Square16;
        let width = 2 * opts.margin_size + size.symbol_cols() as u32 * opts.module_size;
        let height = 2 * opts.margin_size + size.symbol_rows() as u32 * opts.module_size;
        assert_eq!(raster.width(), width);
        assert_eq!(raster.height(), height);
    }

    #[test]
    fn encode_mosaic_renders_one_symbol_for_all_three_planes() {
        let opts = EncodeOptions::default();
        let raster = encode_mosaic(b"The quick brown fox jumps", &opts).unwrap();
        assert!(raster.width() > 0 && raster.height() > 0);
    }
}
