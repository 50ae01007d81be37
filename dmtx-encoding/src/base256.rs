use dmtx_symbol::SizeRequest;

use crate::ascii::pad_remaining_in_ascii;
use crate::scheme::{check_size, encode_change_scheme, find_symbol_size, get_remaining_symbol_capacity};
use crate::stream::{EncodeStream, StreamStatus};
use crate::{EncodeReason, Scheme, StreamResult, UnlatchType};

/// Encodes the next Base 256 byte verbatim (every byte value is legal).
pub(crate) fn encode_next_chunk_base256(stream: &mut EncodeStream<'_>) -> StreamResult<()> {
    if !stream.input_has_next() {
        return Ok(());
    }

    let input_value = stream.input_advance_next()?;
    append_value_base256(stream, input_value)?;
    update_base256_chain_header(stream, None)
}

/// Appends one randomized Base 256 data byte, tracked by codeword position
/// within the symbol (not within the chain) for the randomizer's `position`
/// term.
pub(crate) fn append_value_base256(stream: &mut EncodeStream<'_>, value: u8) -> StreamResult<()> {
    stream.check_scheme(Scheme::Base256)?;

    let position = stream.output().len() as i64 + 1;
    let randomized = randomize_255_state(value, position);

    stream.output_chain_append(randomized)?;
    stream.bump_value_count(1);

    Ok(())
}

/// Resolves the Base 256 end-of-symbol rule: the length header is 1 byte
/// for chains of 249 bytes or fewer, 2 bytes (with a `249 +` marker) above
/// that — including the "perfect fit" special case where the data exactly
/// fills the symbol and the length header is implicitly zero.
pub(crate) fn complete_if_done_base256(
    stream: &mut EncodeStream<'_>,
    size_request: SizeRequest,
) -> StreamResult<()> {
    if stream.status() == StreamStatus::Complete {
        return Ok(());
    }

    if !stream.input_has_next() {
        let size_idx = check_size(stream, find_symbol_size(stream.output().len(), size_request))?;
        let remaining = get_remaining_symbol_capacity(stream.output().len(), Some(size_idx));
        let header_len = stream.output_chain_word_count() - stream.output_chain_value_count();

        if remaining == 0 && header_len == 2 {
            // Perfect fit with an already-grown 2-byte header: the header
            // encodes a length of 0, signaling "fill to end of symbol" to
            // the decoder. A perfect fit still carrying a 1-byte header
            // keeps its true length instead (falls through below).
            update_base256_chain_header(stream, Some(0))?;
            stream.mark_complete(size_idx);
        } else {
            // Normal case: rewrite the header with the chain's true
            // length, then unlatch to ASCII (implicitly -- Base 256 has no
            // unlatch codeword) and pad the rest of the symbol's capacity.
            // Mirrors `CompleteIfDoneBase256`'s `EncodeChangeScheme` +
            // `PadRemainingInAscii` pair.
            update_base256_chain_header(stream, None)?;
            encode_change_scheme(stream, Scheme::Ascii, UnlatchType::Explicit)?;
            pad_remaining_in_ascii(stream, size_idx)?;
            stream.mark_complete(size_idx);
        }
    }

    Ok(())
}

/// Rewrites the Base 256 chain's length header in place, growing it from a
/// 1-byte to a 2-byte header (shifting data bytes up by one) the moment the
/// chain crosses 249 data bytes.
///
/// `perfect_fit_length`, when `Some(0)`, forces a 1-byte zero header
/// regardless of chain length (the "fill to end of symbol" sentinel).
pub(crate) fn update_base256_chain_header(
    stream: &mut EncodeStream<'_>,
    perfect_fit_length: Option<u8>,
) -> StreamResult<()> {
    stream.check_scheme(Scheme::Base256)?;

    let data_len = stream.output_chain_value_count();

    if let Some(0) = perfect_fit_length {
        let header_index = stream.output().len() - stream.output_chain_word_count();
        let randomized = randomize_255_state(0, header_index as i64 + 1);
        stream.output_set(header_index, randomized)?;
        return Ok(());
    }

    if data_len == 0 {
        base256_output_chain_insert_first(stream, 0)?;
        return Ok(());
    }

    // The chain's header sits at its start: `output_chain_word_count`
    // already covers header bytes (1 or 2) plus `data_len` data bytes, so
    // this holds before and after the header grows -- unlike `output().len()
    // - data_len - 1`, which silently assumes a 1-byte header.
    let header_index = stream.output().len() - stream.output_chain_word_count();

    if data_len <= 249 {
        let randomized = randomize_255_state(data_len as u8, header_index as i64 + 1);
        stream.output_set(header_index, randomized)?;
    } else if data_len == 250 {
        // Growing past the 1-byte header's range: replace the single header
        // byte with a 2-byte header, re-randomizing both at their new
        // positions.
        let high = 249 + (data_len / 250) as u8;
        let low = (data_len % 250) as u8;
        let high_randomized = randomize_255_state(high, header_index as i64 + 1);
        stream.output_set(header_index, high_randomized)?;
        base256_output_chain_insert_first(stream, low)?;
    } else {
        let high = 249 + (data_len / 250) as u8;
        let low = (data_len % 250) as u8;
        let high_randomized = randomize_255_state(high, header_index as i64 + 1);
        let low_randomized = randomize_255_state(low, header_index as i64 + 2);
        stream.output_set(header_index, high_randomized)?;
        stream.output_set(header_index + 1, low_randomized)?;
    }

    Ok(())
}

/// Inserts `value` as a new first byte of the current chain (used when the
/// header grows from 1 to 2 bytes), shifting all following bytes up by one
/// and bumping the word count.
///
/// Every data byte already in the chain moves up one output position by
/// this insertion, which changes the `position` term its randomizer was
/// keyed on -- each is unrandomized at its old position and re-randomized
/// at its new one so the chain still reads back correctly. Mirrors
/// `Base256OutputChainInsertFirst`'s `UnRandomize255State`/
/// `Randomize255State` pair over the shifted tail.
pub(crate) fn base256_output_chain_insert_first(
    stream: &mut EncodeStream<'_>,
    value: u8,
) -> StreamResult<()> {
    let data_len = stream.output_chain_value_count();
    let chain_start = stream.output().len() - data_len;

    let randomized = randomize_255_state(value, chain_start as i64 + 1);
    stream.insert_at(chain_start, randomized);

    for old_idx in chain_start..chain_start + data_len {
        let new_idx = old_idx + 1;
        let shifted = stream.output()[new_idx];
        let original = unrandomize_255_state(shifted, old_idx as i64 + 1);
        let reshifted = randomize_255_state(original, new_idx as i64 + 1);
        stream.output_set(new_idx, reshifted)?;
    }

    Ok(())
}

/// `(v + 149 * position) mod 256` — the Base 256 scrambling function
/// (spec §4.E), applied to every header and data byte so that repeated
/// runs don't create long same-byte sequences in the symbol.
pub(crate) fn randomize_255_state(value: u8, position: i64) -> u8 {
    let pseudo_random = (149 * position) % 255 + 1;
    let tmp = value as i64 + pseudo_random;
    (if tmp > 255 { tmp - 256 } else { tmp }) as u8
}

/// Inverse of [`randomize_255_state`].
pub(crate) fn unrandomize_255_state(value: u8, position: i64) -> u8 {
    let pseudo_random = (149 * position) % 255 + 1;
    let tmp = value as i64 - pseudo_random;
    (if tmp < 0 { tmp + 256 } else { tmp }) as u8
}

/// Not used by the encoder chain directly (the header never shrinks once
/// grown mid-encode); kept so the module's surface mirrors the source's
/// `Base256OutputChainRemoveFirst` for symmetry with `insert_first`.
#[allow(dead_code)]
pub(crate) fn base256_output_chain_remove_first(stream: &mut EncodeStream<'_>) -> StreamResult<u8> {
    if stream.output().is_empty() {
        return Err(stream.mark_fatal(EncodeReason::EmptyOutputChain));
    }
    Ok(stream.remove_at(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_data_stream;
    use crate::scheme::encode_single_scheme;
    use dmtx_symbol::SizeRequest;

    #[test]
    fn randomize_255_state_round_trips() {
        for position in [1i64, 2, 100, 255, 1000] {
            for value in [0u8, 1, 149, 255] {
                let r = randomize_255_state(value, position);
                assert_eq!(unrandomize_255_state(r, position), value);
            }
        }
    }

    /// 250 bytes is exactly one past the 1-byte header's 249-byte range, so
    /// this crosses the header-growth boundary `update_base256_chain_header`
    /// handles at `data_len == 250`.
    #[test]
    fn base256_round_trips_at_250_byte_header_boundary() {
        let input: Vec<u8> = (0..250u32).map(|i| (i % 256) as u8).collect();
        let (_size, codewords) =
            encode_single_scheme(&input, SizeRequest::ShapeAuto, Scheme::Base256, None).unwrap();
        let decoded = decode_data_stream(&codewords, None);
        assert_eq!(decoded.bytes, input);
    }
}
