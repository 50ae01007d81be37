use dmtx_symbol::{SizeRequest, SymbolSize};

use crate::stream::EncodeStream;
use crate::{
    scheme::get_remaining_symbol_capacity, AsciiOption, EncodeReason, Scheme, StreamResult,
    VALUE_ASCII_PAD, VALUE_ASCII_UPPER_SHIFT, VALUE_FNC1,
};

/// Encodes the next ASCII chunk: one byte, or two digits collapsed into a
/// single codeword under [`AsciiOption::Compact`]/[`AsciiOption::Normal`].
pub(crate) fn encode_next_chunk_ascii(
    stream: &mut EncodeStream<'_>,
    option: AsciiOption,
) -> StreamResult<()> {
    if !stream.input_has_next() {
        return Ok(());
    }

    let v0 = stream.input_advance_next()?;

    let compact_digits = if matches!(option, AsciiOption::Compact | AsciiOption::Normal)
        && stream.input_has_next()
    {
        let v1 = stream.input_peek_next()?;
        if stream.fnc1() == Some(v1) {
            false
        } else {
            v0.is_ascii_digit() && v1.is_ascii_digit()
        }
    } else {
        false
    };

    if compact_digits {
        let v1 = stream.input_advance_next()?;
        let value = 10 * (v0 - b'0') + (v1 - b'0') + 130;
        append_value_ascii(stream, value)?;
    } else if option == AsciiOption::Compact {
        return Err(stream.mark_invalid(EncodeReason::CantCompactNonDigits));
    } else if stream.fnc1() == Some(v0) {
        append_value_ascii(stream, VALUE_FNC1)?;
    } else if v0 < 128 {
        append_value_ascii(stream, v0 + 1)?;
    } else {
        append_value_ascii(stream, VALUE_ASCII_UPPER_SHIFT)?;
        append_value_ascii(stream, v0 - 127)?;
    }

    Ok(())
}

/// Appends one ASCII codeword value, tracking chain progress. Called both
/// from the ASCII chunk encoder and from every other scheme's latch/unlatch
/// sequencing (all of which funnel through ASCII).
pub(crate) fn append_value_ascii(stream: &mut EncodeStream<'_>, value: u8) -> StreamResult<()> {
    stream.check_scheme(Scheme::Ascii)?;
    stream.output_chain_append(value)?;
    stream.bump_value_count(1);
    Ok(())
}

/// Completes the stream if no input remains: picks a symbol size and pads.
pub(crate) fn complete_if_done_ascii(
    stream: &mut EncodeStream<'_>,
    size_request: SizeRequest,
) -> StreamResult<()> {
    use crate::stream::StreamStatus;
    if stream.status() == StreamStatus::Complete {
        return Ok(());
    }

    if !stream.input_has_next() {
        let size_idx = match SymbolSize::find(stream.output().len() as u16, size_request) {
            Some(size) => size,
            None => return Err(stream.mark_invalid(EncodeReason::SizeNotFound)),
        };
        pad_remaining_in_ascii(stream, size_idx)?;
        stream.mark_complete(size_idx);
    }

    Ok(())
}

/// Pads the remainder of `size_idx`'s data capacity with ASCII pad
/// codewords: the first unrandomized, the rest position-randomized.
pub(crate) fn pad_remaining_in_ascii(
    stream: &mut EncodeStream<'_>,
    size_idx: SymbolSize,
) -> StreamResult<()> {
    stream.check_scheme(Scheme::Ascii)?;

    let mut remaining = get_remaining_symbol_capacity(stream.output().len(), Some(size_idx));

    if remaining > 0 {
        stream.output_chain_append(VALUE_ASCII_PAD)?;
        remaining -= 1;
    }

    while remaining > 0 {
        let pad_value = randomize_253_state(VALUE_ASCII_PAD, stream.output().len() as i64 + 1);
        stream.output_chain_append(pad_value)?;
        remaining -= 1;
    }

    Ok(())
}

/// Encodes the remaining input to a scratch ASCII stream without mutating
/// `stream`, used by C40/Text/X12/EDIFACT end-of-symbol logic to test-drive
/// how many codewords an ASCII fallback would need.
pub(crate) fn encode_tmp_remaining_in_ascii(stream: &EncodeStream<'_>) -> Vec<u8> {
    let mut scratch = stream.clone();
    scratch.set_current_scheme(Scheme::Ascii);
    scratch.set_chain_counts(0, 0);

    while scratch.input_has_next() {
        if encode_next_chunk_ascii(&mut scratch, AsciiOption::Normal).is_err() {
            break;
        }
        if !matches!(scratch.status(), crate::stream::StreamStatus::Encoding) {
            break;
        }
    }

    scratch.into_output()
}

/// `149 * position mod 253 + 1`, folded back into the 1..254 codeword
/// range used by ASCII pads (spec §4.E padding rule).
pub(crate) fn randomize_253_state(value: u8, position: i64) -> u8 {
    let pseudo_random = ((149 * position) % 253) + 1;
    let tmp = value as i64 + pseudo_random;
    (if tmp > 254 { tmp - 254 } else { tmp }) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn randomize_253_wraps_above_254() {
        assert_eq!(randomize_253_state(129, 1), 129 + 150);
    }

    #[test]
    fn single_scheme_ascii_collapses_digit_pairs() {
        let input = b"12345678";
        let size = crate::encode_single_scheme(
            input,
            SizeRequest::SquareAuto,
            Scheme::Ascii,
            None,
        )
        .unwrap();
        assert_eq!(size.1, [142, 164, 186, 208]);
    }
}
