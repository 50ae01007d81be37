use dmtx_symbol::SizeRequest;

use crate::ascii::{append_value_ascii, pad_remaining_in_ascii};
use crate::scheme::{check_size, encode_change_scheme, find_symbol_size, get_remaining_symbol_capacity};
use crate::stream::{EncodeStream, StreamStatus};
use crate::{EncodeReason, Scheme, StreamResult, UnlatchType, VALUE_EDIFACT_UNLATCH};

/// Encodes one EDIFACT value (the unlatch value, or the next input byte
/// converted to its 6-bit EDIFACT representation) per call, same as the
/// source's per-chunk contract: a "chunk" here is always a single value.
pub(crate) fn encode_next_chunk_edifact(stream: &mut EncodeStream<'_>) -> StreamResult<()> {
    if !stream.input_has_next() {
        return Ok(());
    }

    let input_value = stream.input_advance_next()?;
    if input_value & 0x80 != 0 || !(32..=94).contains(&input_value) {
        return Err(stream.mark_invalid(EncodeReason::UnsupportedCharacter));
    }

    append_value_edifact(stream, input_value)
}

/// Packs 4 sequential 6-bit EDIFACT values into 3 output bytes, using
/// `output_chain_value_count % 4` to track which of the 4 positions this
/// value lands in.
pub(crate) fn append_value_edifact(stream: &mut EncodeStream<'_>, value: u8) -> StreamResult<()> {
    stream.check_scheme(Scheme::Edifact)?;

    // ASCII codepoints 32..=94 map to 6-bit EDIFACT values by inverting bit 5;
    // the unlatch value (31) is already in 6-bit form and passes through.
    let edifact_value = if value == VALUE_EDIFACT_UNLATCH {
        value
    } else {
        value ^ 0x20
    };

    let position = stream.output_chain_value_count() % 4;

    match position {
        0 => {
            stream.output_chain_append(edifact_value << 2)?;
        }
        1 => {
            let prev = stream.output_chain_remove_last()?;
            stream.output_chain_append(prev | (edifact_value >> 4))?;
            stream.output_chain_append(edifact_value << 4)?;
        }
        2 => {
            let prev = stream.output_chain_remove_last()?;
            stream.output_chain_append(prev | (edifact_value >> 2))?;
            stream.output_chain_append(edifact_value << 6)?;
        }
        3 => {
            let prev = stream.output_chain_remove_last()?;
            stream.output_chain_append(prev | edifact_value)?;
        }
        _ => unreachable!("position is always 0..4"),
    }

    stream.bump_value_count(1);

    Ok(())
}

/// Applies the EDIFACT end-of-symbol rules (spec §4.E table, conditions
/// a-f): an unlatch only fits cleanly at a byte boundary with enough
/// remaining capacity, otherwise the partial group is flushed as-is and
/// the symbol finishes in ASCII.
pub(crate) fn complete_if_done_edifact(
    stream: &mut EncodeStream<'_>,
    size_request: SizeRequest,
) -> StreamResult<()> {
    if stream.status() == StreamStatus::Complete {
        return Ok(());
    }

    if stream.input_has_next() {
        return Ok(());
    }

    let value_count = stream.output_chain_value_count();
    let complete_groups_bytes = (value_count / 4) * 3;
    let leftover_values = value_count % 4;

    // Condition (a): on a clean 4-value boundary, try an explicit unlatch.
    let size_idx_with_unlatch =
        find_symbol_size(stream.output().len() + if leftover_values == 0 { 1 } else { 0 }, size_request);
    let remaining_with_unlatch =
        get_remaining_symbol_capacity(stream.output().len(), size_idx_with_unlatch);

    if leftover_values == 0 && size_idx_with_unlatch.is_some() && remaining_with_unlatch >= 1 {
        append_value_edifact(stream, VALUE_EDIFACT_UNLATCH)?;
        let size_idx = check_size(stream, find_symbol_size(stream.output().len(), size_request))?;
        stream.set_current_scheme(Scheme::Ascii);
        stream.set_chain_counts(0, 0);
        pad_remaining_in_ascii(stream, size_idx)?;
        stream.mark_complete(size_idx);
        return Ok(());
    }

    // Condition where the partial group's bytes-so-far exactly fill the
    // symbol: flush without an unlatch codeword at all.
    let size_idx_exact = find_symbol_size(stream.output().len(), size_request);
    if let Some(size_idx) = size_idx_exact {
        let remaining = get_remaining_symbol_capacity(stream.output().len(), Some(size_idx));
        if remaining == 0 {
            stream.mark_complete(size_idx);
            return Ok(());
        }
    }

    let _ = complete_groups_bytes;

    // Otherwise finish in ASCII: unlatch only if a partial group remains
    // that needs to flush as ASCII bytes, then pad.
    encode_change_scheme(stream, Scheme::Ascii, UnlatchType::Implicit)?;
    let size_idx = check_size(stream, find_symbol_size(stream.output().len(), size_request))?;
    let _ = append_value_ascii; // kept available for symmetry with other completers
    pad_remaining_in_ascii(stream, size_idx)?;
    stream.mark_complete(size_idx);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_value_edifact_packs_four_values_into_three_bytes() {
        let input = [b'A', b'B', b'C', b'D'];
        let mut stream = EncodeStream::new(&input, None);
        stream.set_current_scheme(Scheme::Edifact);
        for _ in 0..4 {
            let v = stream.input_advance_next().unwrap();
            append_value_edifact(&mut stream, v).unwrap();
        }
        assert_eq!(stream.output().len(), 3);
    }
}
