//! Block-interleaved Reed-Solomon over a whole symbol's codeword vector.
//!
//! [`dmtx_reedsolomon`] only knows how to encode/decode one contiguous
//! block; ECC 200 interleaves `size.interleaved_blocks()` blocks symbol-wide
//! (codeword `k` in the concatenated vector belongs to block `k mod
//! blocks`, at position `k div blocks`). This module de-interleaves,
//! delegates to [`RsBlock`] per block, and re-interleaves the result.
//! Mirrors `RsEncode`/`RsDecode` (spec §4.B); those two functions are not
//! present in the retrieved source (only their `dmtxstatic.h` declarations
//! are), so this is built directly from the spec's interleaving rule plus
//! `dmtx-reedsolomon`'s already-ported libfec block codec.

use dmtx_reedsolomon::{GfTables, RsBlock};
use dmtx_symbol::SymbolSize;

/// Appends Reed-Solomon parity to `data` (already `size.symbol_data_words()`
/// bytes long), returning the full interleaved `data + error` codeword
/// vector of length `size.symbol_data_words() + size.symbol_error_words()`.
pub(crate) fn rs_encode_symbol(data: &[u8], size: SymbolSize) -> Vec<u8> {
    debug_assert_eq!(data.len(), size.symbol_data_words() as usize);

    let gf = GfTables::new();
    let rs = RsBlock::new(&gf, size.block_error_words() as usize).expect("valid root count");
    let blocks = size.interleaved_blocks();

    let mut code = vec![0u8; (size.symbol_data_words() + size.symbol_error_words()) as usize];

    for block_idx in 0..blocks {
        let block_data = deinterleave_block(data, blocks, block_idx, size.block_data_size(block_idx).unwrap());
        let parity = rs.encode(&gf, &block_data);

        for (i, &byte) in block_data.iter().enumerate() {
            code[(i as u16 * blocks + block_idx) as usize] = byte;
        }
        let data_words = size.symbol_data_words();
        for (i, &byte) in parity.iter().enumerate() {
            code[(data_words + i as u16 * blocks + block_idx) as usize] = byte;
        }
    }

    code
}

/// Corrects `code` (a full interleaved `data + error` codeword vector) in
/// place. `corrections_max` caps how many symbol errors any single block
/// may have fixed; `None` allows up to `size.block_max_correctable()`.
///
/// Returns the total number of symbol errors corrected across all blocks,
/// or fails if any block is uncorrectable (spec §4.B step 8, §7
/// "RS uncorrectable").
pub(crate) fn rs_decode_symbol(
    code: &mut [u8],
    size: SymbolSize,
    corrections_max: Option<u16>,
) -> Result<usize, ()> {
    debug_assert_eq!(
        code.len(),
        (size.symbol_data_words() + size.symbol_error_words()) as usize
    );

    let gf = GfTables::new();
    let rs = RsBlock::new(&gf, size.block_error_words() as usize).expect("valid root count");
    let blocks = size.interleaved_blocks();
    let data_words = size.symbol_data_words();
    let limit = corrections_max.unwrap_or_else(|| size.block_max_correctable());

    let mut total_corrected = 0usize;

    for block_idx in 0..blocks {
        let block_data_size = size.block_data_size(block_idx).unwrap();
        let block_len = block_data_size as usize + rs.nroots();
        let mut block = vec![0u8; block_len];

        for i in 0..block_data_size {
            block[i as usize] = code[(i * blocks + block_idx) as usize];
        }
        for i in 0..rs.nroots() as u16 {
            block[block_data_size as usize + i as usize] =
                code[(data_words + i * blocks + block_idx) as usize];
        }

        let corrected = rs.decode(&gf, &mut block).map_err(|_| ())?;
        if corrected as u16 > limit {
            return Err(());
        }
        total_corrected += corrected;

        for i in 0..block_data_size {
            code[(i * blocks + block_idx) as usize] = block[i as usize];
        }
        for i in 0..rs.nroots() as u16 {
            code[(data_words + i * blocks + block_idx) as usize] = block[block_data_size as usize + i as usize];
        }
    }

    Ok(total_corrected)
}

fn deinterleave_block(data: &[u8], blocks: u16, block_idx: u16, block_data_size: u16) -> Vec<u8> {
    (0..block_data_size).map(|i| data[(i * blocks + block_idx) as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_without_errors() {
        let size = SymbolSize::Square18;
        let data: Vec<u8> = (0..size.symbol_data_words()).map(|i| (i * 7 + 3) as u8).collect();
        let mut code = rs_encode_symbol(&data, size);
        assert_eq!(code.len(), (size.symbol_data_words() + size.symbol_error_words()) as usize);

        let corrected = rs_decode_symbol(&mut code, size, None).unwrap();
        assert_eq!(corrected, 0);
        assert_eq!(&code[..data.len()], data.as_slice());
    }

    #[test]
    fn corrects_errors_up_to_the_per_block_bound() {
        let size = SymbolSize::Square32;
        let data: Vec<u8> = (0..size.symbol_data_words()).map(|i| (i * 13 + 1) as u8).collect();
        let mut code = rs_encode_symbol(&data, size);

        // Flip the maximum correctable count of bytes within a single
        // block's interleaved positions (stride = interleaved_blocks()).
        let blocks = size.interleaved_blocks();
        let max_fix = size.block_max_correctable();
        for i in 0..max_fix {
            let pos = (i * blocks) as usize;
            code[pos] ^= 0xFF;
        }

        let corrected = rs_decode_symbol(&mut code, size, None).unwrap();
        assert_eq!(corrected as u16, max_fix);
        assert_eq!(&code[..data.len()], data.as_slice());
    }

    #[test]
    fn uncorrectable_block_fails() {
        let size = SymbolSize::Square18;
        let data: Vec<u8> = (0..size.symbol_data_words()).map(|i| (i * 7 + 3) as u8).collect();
        let mut code = rs_encode_symbol(&data, size);

        let blocks = size.interleaved_blocks();
        let max_fix = size.block_max_correctable();
        for i in 0..=max_fix {
            let pos = (i * blocks) as usize;
            if pos < code.len() {
                code[pos] ^= 0xFF;
            }
        }

        assert!(rs_decode_symbol(&mut code, size, None).is_err());
    }
}
