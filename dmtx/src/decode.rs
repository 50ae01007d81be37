//! Top-level decode entry point: a raster to the messages found in it.
//!
//! Mirrors the per-region half of `dmtxdecode.c`
//! (`dmtxDecodeMatrixRegion`/`dmtxDecodePopulatedArray`): the locator hands
//! back one region at a time, each is sampled into a mapping grid, folded
//! back through placement into codewords, corrected by Reed-Solomon, and
//! finally unpacked back into application bytes. A region that fails
//! Reed-Solomon correction is dropped and the scan continues; this mirrors
//! `dmtxDecodeMatrixRegion` returning `NULL` for one region without
//! aborting the caller's `dmtxRegionFindNext` loop.

use dmtx_locate::{Deadline, LocateOptions, Locator, Region};
use dmtx_placement::{place_ecc200, MappingGrid, ModuleFlags};
use dmtx_raster::Raster;
use dmtx_sample::sample_region;
use dmtx_symbol::SymbolSize;

use crate::options::DecodeOptions;
use crate::rs_symbol::rs_decode_symbol;

/// One successfully decoded Data Matrix message. Mirrors the fields of
/// `DmtxMessage` a caller actually wants back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Decoded application bytes.
    pub output: Vec<u8>,
    /// Number of trailing ASCII pad codewords the data stream carried.
    pub pad_count: usize,
    /// Symbol size the decoded region was fit against.
    pub size_idx: SymbolSize,
    /// Total number of symbol errors Reed-Solomon corrected across all
    /// interleaved blocks.
    pub corrections: usize,
}

/// Searches `raster` for every decodable Data Matrix region and returns
/// one [`Message`] per symbol found. Mirrors the `dmtxRegionFindNext` /
/// `dmtxDecodeMatrixRegion` loop a caller drives around `dmtxDecodeCreate`.
pub fn decode(raster: &Raster, opts: &DecodeOptions) -> Vec<Message> {
    let locate_opts = LocateOptions {
        scale: opts.scale,
        edge_thresh: opts.edge_thresh,
        scan_gap: opts.scan_gap,
        size_request: opts.size_request,
    };
    let deadline = opts.timeout.map(Deadline::after);

    let mut locator = Locator::new(raster, locate_opts);
    let mut messages = Vec::new();

    while let Some(region) = locator.find_next_region(deadline.as_ref()) {
        if let Some(message) = decode_region(raster, opts, &region) {
            messages.push(message);
        }
    }

    messages
}

fn decode_region(raster: &Raster, opts: &DecodeOptions, region: &Region) -> Option<Message> {
    let size = region.size_idx;
    let rows = size.mapping_rows() as usize;
    let cols = size.mapping_cols() as usize;

    let mut grid = MappingGrid::new(rows, cols);
    sample_region(raster, opts.scale, region, &mut grid);

    // `sample_region` only records color/confidence; placement's decode
    // direction additionally requires every data-bearing cell already
    // marked ASSIGNED (mirrors `PopulateArrayFromMatrix` setting
    // `DmtxModuleAssigned` on every tallied cell after the tally).
    for row in 0..rows {
        for col in 0..cols {
            grid.get_mut(row, col).insert(ModuleFlags::ASSIGNED);
        }
    }

    let mut code = vec![0u8; (size.symbol_data_words() + size.symbol_error_words()) as usize];
    place_ecc200(&mut grid, &mut code).ok()?;

    let corrections = rs_decode_symbol(&mut code, size, opts.corrections_max)
        .inspect_err(|()| log::debug!("dropping {size} region: Reed-Solomon correction failed"))
        .ok()?;

    let data = &code[..size.symbol_data_words() as usize];
    let output = dmtx_encoding::decode_data_stream(data, opts.fnc1);

    Some(Message {
        output: output.bytes,
        pad_count: output.pad_count,
        size_idx: size,
        corrections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use crate::options::EncodeOptions;

    #[test]
    fn decode_recovers_a_freshly_encoded_symbol() {
        let raster = encode(b"Wikipedia", &EncodeOptions::default()).unwrap();
        let messages = decode(&raster, &DecodeOptions::default());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].output, b"Wikipedia");
        assert_eq!(messages[0].corrections, 0);
    }

    #[test]
    fn decode_finds_nothing_in_a_blank_raster() {
        let raster =
            Raster::new(vec![255u8; 64 * 64 * 3], 64, 64, dmtx_raster::PixelPacking::TwentyFourBppRgb)
                .unwrap();
        let messages = decode(&raster, &DecodeOptions::default());
        assert!(messages.is_empty());
    }

    /// Spec scenario S4: 300 bytes leave 65 data words of slack in the
    /// symbol the optimizer/scheme picks, so the Base 256 chain does not
    /// exactly fill its capacity. This exercises the full RS + placement
    /// pipeline, unlike the scheme-only round trip in
    /// `dmtx_encoding::base256`'s tests, which would not have caught a
    /// codeword-count mismatch between the scheme codec and `rs_encode_symbol`.
    #[test]
    fn decode_recovers_a_non_perfect_fit_base256_symbol() {
        let input = vec![0xFFu8; 300];
        let opts = EncodeOptions {
            scheme: dmtx_encoding::SchemeRequest::Single(dmtx_encoding::Scheme::Base256),
            ..EncodeOptions::default()
        };
        let raster = encode(&input, &opts).unwrap();
        let messages = decode(&raster, &DecodeOptions::default());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].output, input);
        assert_eq!(messages[0].corrections, 0);
    }

    /// Base 256 chain landing exactly on a symbol's data-word capacity while
    /// its length header is still 1 byte (well under the 250-byte
    /// header-growth boundary): `complete_if_done_base256` must keep the
    /// chain's true length header here rather than take the 2-byte
    /// perfect-fit sentinel path.
    #[test]
    fn decode_recovers_a_perfect_fit_base256_symbol() {
        // Square16 holds 12 data words; an ASCII latch codeword plus a
        // 1-byte length header plus 10 data bytes fills it exactly.
        let size = dmtx_symbol::SymbolSize::Square16;
        let input = vec![0xABu8; size.symbol_data_words() as usize - 2];
        let opts = EncodeOptions {
            scheme: dmtx_encoding::SchemeRequest::Single(dmtx_encoding::Scheme::Base256),
            size_request: dmtx_symbol::SizeRequest::Explicit(size),
            ..EncodeOptions::default()
        };
        let raster = encode(&input, &opts).unwrap();
        let messages = decode(&raster, &DecodeOptions::default());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].output, input);
    }
}
