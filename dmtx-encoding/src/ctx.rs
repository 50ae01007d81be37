use dmtx_symbol::SizeRequest;

use crate::ascii::{append_value_ascii, encode_tmp_remaining_in_ascii, pad_remaining_in_ascii};
use crate::scheme::{
    check_size, encode_change_scheme, find_symbol_size, get_remaining_symbol_capacity,
};
use crate::stream::{EncodeStream, StreamStatus};
use crate::{
    EncodeReason, Scheme, StreamResult, UnlatchType, VALUE_CTX_SHIFT1, VALUE_CTX_SHIFT2,
    VALUE_CTX_SHIFT3, VALUE_CTX_UNLATCH,
};

/// Encodes as many whole C40/Text/X12 triplets as the remaining input
/// allows, then hands off to the scheme's end-of-symbol completion rule
/// once 1 or 2 unwritten values remain.
pub(crate) fn encode_next_chunk_ctx(
    stream: &mut EncodeStream<'_>,
    size_request: SizeRequest,
) -> StreamResult<()> {
    let mut value_list: Vec<u8> = Vec::with_capacity(6);

    while stream.input_has_next() {
        if stream.current_scheme() == Scheme::X12 {
            let peeked = stream.input_peek_next()?;
            if stream.fnc1() == Some(peeked) {
                // X12 does not allow partial blocks: resend the last 1 or 2
                // values as ASCII, then the FNC1 byte itself.
                encode_change_scheme(stream, Scheme::Ascii, UnlatchType::Explicit)?;
                for _ in 0..(value_list.len() % 3) {
                    stream.input_advance_prev()?;
                }
                let mut remaining = value_list.len() % 3;
                while remaining > 0 {
                    let value = stream.input_advance_next()?;
                    append_value_ascii(stream, value + 1)?;
                    remaining -= 1;
                }
                stream.input_advance_next()?;
                append_value_ascii(stream, crate::VALUE_FNC1)?;
                return Ok(());
            }
        }

        let input_value = stream.input_advance_next()?;
        match push_ctx_values(&mut value_list, input_value, stream.current_scheme(), stream.fnc1())
        {
            Ok(()) => {}
            Err(()) => return Err(stream.mark_invalid(EncodeReason::UnsupportedCharacter)),
        }

        while value_list.len() >= 3 {
            append_values_ctx(stream, &value_list[..3])?;
            value_list.drain(..3);
        }

        if value_list.is_empty() {
            break;
        }
    }

    if !stream.input_has_next() && !value_list.is_empty() {
        if stream.current_scheme() == Scheme::X12 {
            complete_partial_x12(stream, &value_list, size_request)?;
        } else {
            complete_partial_c40_text(stream, &value_list, size_request)?;
        }
    }

    Ok(())
}

/// Packs a full triplet of 0..39 values into two codewords:
/// `(1600*a + 40*b + c + 1)` split into high/low bytes.
pub(crate) fn append_values_ctx(stream: &mut EncodeStream<'_>, triplet: &[u8]) -> StreamResult<()> {
    if !is_ctx(stream.current_scheme()) {
        return Err(stream.mark_fatal(EncodeReason::UnexpectedScheme));
    }
    if triplet.len() < 3 {
        return Err(stream.mark_fatal(EncodeReason::IncompleteValueList));
    }

    let pair_value =
        1600 * triplet[0] as u32 + 40 * triplet[1] as u32 + triplet[2] as u32 + 1;
    let cw0 = (pair_value / 256) as u8;
    let cw1 = (pair_value % 256) as u8;

    stream.output_chain_append(cw0)?;
    stream.output_chain_append(cw1)?;
    stream.bump_value_count(3);

    Ok(())
}

/// Appends the CTX unlatch codeword (254), requiring that the stream is on
/// a clean triplet boundary first.
pub(crate) fn append_unlatch_ctx(stream: &mut EncodeStream<'_>) -> StreamResult<()> {
    if !is_ctx(stream.current_scheme()) {
        return Err(stream.mark_fatal(EncodeReason::UnexpectedScheme));
    }
    if stream.output_chain_value_count() % 3 != 0 {
        return Err(stream.mark_invalid(EncodeReason::NotOnByteBoundary));
    }

    stream.output_chain_append(VALUE_CTX_UNLATCH)?;
    stream.bump_value_count(1);

    Ok(())
}

/// Completes C40/Text/X12 encoding once all input is consumed, choosing a
/// symbol size and padding/unlatching as needed.
pub(crate) fn complete_if_done_ctx(
    stream: &mut EncodeStream<'_>,
    size_request: SizeRequest,
) -> StreamResult<()> {
    if stream.status() == StreamStatus::Complete {
        return Ok(());
    }

    if !stream.input_has_next() {
        let size_idx = check_size(stream, find_symbol_size(stream.output().len(), size_request))?;
        let remaining = get_remaining_symbol_capacity(stream.output().len(), Some(size_idx));

        if remaining > 0 {
            encode_change_scheme(stream, Scheme::Ascii, UnlatchType::Explicit)?;
            pad_remaining_in_ascii(stream, size_idx)?;
        }

        stream.mark_complete(size_idx);
    }

    Ok(())
}

/// Resolves the 1-or-2-leftover-value end condition for C40/Text once
/// input is exhausted mid-triplet (spec §4.E table, conditions b/c/d).
pub(crate) fn complete_partial_c40_text(
    stream: &mut EncodeStream<'_>,
    value_list: &[u8],
    size_request: SizeRequest,
) -> StreamResult<()> {
    if !matches!(stream.current_scheme(), Scheme::C40 | Scheme::Text) {
        return Err(stream.mark_fatal(EncodeReason::UnexpectedScheme));
    }
    debug_assert!(value_list.len() == 1 || value_list.len() == 2);

    let size_idx2 = find_symbol_size(stream.output().len() + 2, size_request);
    let remaining2 = get_remaining_symbol_capacity(stream.output().len(), size_idx2);

    if value_list.len() == 2 && size_idx2.is_some() && remaining2 == 2 {
        let mut padded = value_list.to_vec();
        padded.push(VALUE_CTX_SHIFT1);
        append_values_ctx(stream, &padded)?;
        stream.mark_complete(size_idx2.expect("checked above"));
        return Ok(());
    }

    // Roll back the unwritten value(s) and finish via the ASCII fallback.
    stream.input_advance_prev()?;
    let input_value = stream.input_peek_next()?;

    let mut probe = Vec::with_capacity(4);
    let expanded = push_ctx_values(&mut probe, input_value, stream.current_scheme(), stream.fnc1())
        .is_ok();
    if value_list.len() == 2 && expanded && probe.len() == 1 {
        stream.input_advance_prev()?;
    }

    let ascii_tail = encode_tmp_remaining_in_ascii(stream);

    let size_idx1 = find_symbol_size(stream.output().len() + 1, size_request);
    let remaining1 = get_remaining_symbol_capacity(stream.output().len(), size_idx1);

    if ascii_tail.len() == 1 && size_idx1.is_some() && remaining1 == 1 {
        encode_change_scheme(stream, Scheme::Ascii, UnlatchType::Implicit)?;
        append_value_ascii(stream, ascii_tail[0])?;
        stream.set_input_cursor_to_end();
        stream.mark_complete(size_idx1.expect("checked above"));
    } else {
        encode_change_scheme(stream, Scheme::Ascii, UnlatchType::Explicit)?;
        for &byte in &ascii_tail {
            append_value_ascii(stream, byte)?;
        }
        let size_idx = check_size(stream, find_symbol_size(stream.output().len(), size_request))?;
        pad_remaining_in_ascii(stream, size_idx)?;
        stream.set_input_cursor_to_end();
        stream.mark_complete(size_idx);
    }

    Ok(())
}

/// X12 has no partial-block allowance: any 1-or-2 leftover value finishes
/// the symbol in ASCII.
pub(crate) fn complete_partial_x12(
    stream: &mut EncodeStream<'_>,
    value_list: &[u8],
    size_request: SizeRequest,
) -> StreamResult<()> {
    if stream.current_scheme() != Scheme::X12 {
        return Err(stream.mark_fatal(EncodeReason::UnexpectedScheme));
    }
    debug_assert!(value_list.len() == 1 || value_list.len() == 2);

    for _ in 0..value_list.len() {
        stream.input_advance_prev()?;
    }

    let ascii_tail = encode_tmp_remaining_in_ascii(stream);

    let size_idx = find_symbol_size(stream.output().len() + 1, size_request);
    let remaining = get_remaining_symbol_capacity(stream.output().len(), size_idx);

    if ascii_tail.len() == 1 && size_idx.is_some() && remaining == 1 {
        encode_change_scheme(stream, Scheme::Ascii, UnlatchType::Implicit)?;
        append_value_ascii(stream, ascii_tail[0])?;
        stream.set_input_cursor_to_end();
        stream.mark_complete(size_idx.expect("checked above"));
    } else {
        encode_change_scheme(stream, Scheme::Ascii, UnlatchType::Explicit)?;
        for &byte in &ascii_tail {
            append_value_ascii(stream, byte)?;
        }
        let size_idx = check_size(stream, find_symbol_size(stream.output().len(), size_request))?;
        pad_remaining_in_ascii(stream, size_idx)?;
        stream.set_input_cursor_to_end();
        stream.mark_complete(size_idx);
    }

    Ok(())
}

/// Whether 1 or 2 unwritten X12 values would remain if the rest of the
/// input were encoded as X12 right now (used to steer the optimizer and
/// the single-scheme dispatcher away from entering X12 with no legal
/// unlatch point).
pub(crate) fn partial_x12_chunk_remains(stream: &EncodeStream<'_>) -> StreamResult<bool> {
    let mut scratch = stream.clone();
    scratch.set_current_scheme(Scheme::X12);
    scratch.set_chain_counts(0, 0);

    let mut value_list: Vec<u8> = Vec::with_capacity(6);
    while scratch.input_has_next() {
        let input_value = match scratch.input_advance_next() {
            Ok(v) => v,
            Err(_) => return Ok(false),
        };

        if push_ctx_values(&mut value_list, input_value, Scheme::X12, scratch.fnc1()).is_err() {
            return Ok(false);
        }

        if value_list.len() >= 3 {
            return Ok(false);
        }
    }

    Ok(!value_list.is_empty())
}

/// Expands one input byte into 1-4 CTX values (basic-set value, or a shift
/// sentinel followed by a shifted-set value) for `target_scheme`. Returns
/// `Err(())` if `input_value` has no representation in `target_scheme`
/// (used both to reject input and, in the optimizer, to probe how many
/// values a byte would expand to).
pub(crate) fn push_ctx_values(
    value_list: &mut Vec<u8>,
    mut input_value: u8,
    target_scheme: Scheme,
    fnc1: Option<u8>,
) -> Result<(), ()> {
    debug_assert!(value_list.len() <= 2);

    if input_value > 127 && fnc1 != Some(input_value) {
        if target_scheme == Scheme::X12 {
            return Err(());
        }
        value_list.push(VALUE_CTX_SHIFT2);
        value_list.push(30);
        input_value -= 128;
    }

    if target_scheme == Scheme::X12 {
        match input_value {
            13 => value_list.push(0),
            42 => value_list.push(1),
            62 => value_list.push(2),
            32 => value_list.push(3),
            48..=57 => value_list.push(input_value - 44),
            65..=90 => value_list.push(input_value - 51),
            _ => return Err(()),
        }
        return Ok(());
    }

    // target_scheme is C40 or Text.
    if fnc1 == Some(input_value) {
        value_list.push(VALUE_CTX_SHIFT2);
        value_list.push(27);
    } else if input_value <= 31 {
        value_list.push(VALUE_CTX_SHIFT1);
        value_list.push(input_value);
    } else if input_value == 32 {
        value_list.push(3);
    } else if input_value <= 47 {
        value_list.push(VALUE_CTX_SHIFT2);
        value_list.push(input_value - 33);
    } else if input_value <= 57 {
        value_list.push(input_value - 44);
    } else if input_value <= 64 {
        value_list.push(VALUE_CTX_SHIFT2);
        value_list.push(input_value - 43);
    } else if input_value <= 90 && target_scheme == Scheme::C40 {
        value_list.push(input_value - 51);
    } else if input_value <= 90 && target_scheme == Scheme::Text {
        value_list.push(VALUE_CTX_SHIFT3);
        value_list.push(input_value - 64);
    } else if input_value <= 95 {
        value_list.push(VALUE_CTX_SHIFT2);
        value_list.push(input_value - 69);
    } else if input_value == 96 && target_scheme == Scheme::Text {
        value_list.push(VALUE_CTX_SHIFT3);
        value_list.push(0);
    } else if input_value <= 122 && target_scheme == Scheme::Text {
        value_list.push(input_value - 83);
    } else if input_value <= 127 {
        value_list.push(VALUE_CTX_SHIFT3);
        value_list.push(input_value - 96);
    } else {
        return Err(());
    }

    Ok(())
}

pub(crate) fn is_ctx(scheme: Scheme) -> bool {
    matches!(scheme, Scheme::C40 | Scheme::Text | Scheme::X12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_ctx_values_rejects_extended_ascii_in_x12() {
        let mut list = Vec::new();
        assert!(push_ctx_values(&mut list, 200, Scheme::X12, None).is_err());
    }

    #[test]
    fn push_ctx_values_maps_digit_to_basic_set() {
        let mut list = Vec::new();
        push_ctx_values(&mut list, b'5', Scheme::C40, None).unwrap();
        assert_eq!(list, vec![b'5' - 44]);
    }

    #[test]
    fn push_ctx_values_shifts_lowercase_in_c40() {
        let mut list = Vec::new();
        push_ctx_values(&mut list, b'a', Scheme::C40, None).unwrap();
        assert_eq!(list, vec![VALUE_CTX_SHIFT3, b'a' - 96]);
    }
}
