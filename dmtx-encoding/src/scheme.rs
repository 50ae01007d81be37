use dmtx_symbol::{SizeRequest, SymbolSize};

use crate::ascii::{append_value_ascii, complete_if_done_ascii, encode_next_chunk_ascii};
use crate::base256::{
    append_value_base256, complete_if_done_base256, encode_next_chunk_base256,
    update_base256_chain_header,
};
use crate::ctx::{
    append_unlatch_ctx, complete_if_done_ctx, encode_next_chunk_ctx, partial_x12_chunk_remains,
};
use crate::edifact::{append_value_edifact, complete_if_done_edifact, encode_next_chunk_edifact};
use crate::stream::{EncodeStream, StreamStatus};
use crate::{
    AsciiOption, EncodeError, EncodeReason, Scheme, StreamResult, UnlatchType,
    VALUE_BASE256_LATCH, VALUE_C40_LATCH, VALUE_EDIFACT_LATCH, VALUE_EDIFACT_UNLATCH,
    VALUE_TEXT_LATCH, VALUE_X12_LATCH,
};

/// Encodes `input` end to end under a single fixed `scheme`.
///
/// Returns the chosen symbol size and the finished codeword vector (data
/// words only; Reed-Solomon parity is appended by the caller).
pub fn encode_single_scheme(
    input: &[u8],
    size_request: SizeRequest,
    scheme: Scheme,
    fnc1: Option<u8>,
) -> crate::Result<(SymbolSize, Vec<u8>)> {
    if input.is_empty() {
        return Err(EncodeError::EmptyInput);
    }

    let mut stream = EncodeStream::new(input, fnc1);

    // 1st FNC1 special case: encode before any scheme switch, matching the
    // source's EncodeSingleScheme entry sequence.
    if fnc1 == Some(input[0]) {
        let _ = stream.input_advance_next();
        let _ = append_value_ascii(&mut stream, crate::VALUE_FNC1);
    }

    while stream.status() == StreamStatus::Encoding {
        let _ = encode_next_chunk(&mut stream, scheme, AsciiOption::Normal, size_request);
    }

    if stream.status() != StreamStatus::Complete || stream.input_has_next() {
        return Err(match stream.reason() {
            Some(reason) => EncodeError::StreamFailed(reason),
            None => EncodeError::SizeNotSatisfiable,
        });
    }

    let size_idx = stream.size_idx().expect("complete stream records a size");
    Ok((size_idx, stream.into_output()))
}

/// Dispatches to the scheme-specific chunk encoder for `stream`'s current
/// scheme, switching scheme first if `scheme` differs.
pub(crate) fn encode_next_chunk(
    stream: &mut EncodeStream<'_>,
    mut scheme: Scheme,
    option: AsciiOption,
    size_request: SizeRequest,
) -> StreamResult<()> {
    // Prevent X12 from entering a state with no way to unlatch.
    if stream.current_scheme() != Scheme::X12
        && scheme == Scheme::X12
        && partial_x12_chunk_remains(stream)?
    {
        scheme = Scheme::Ascii;
    }

    if stream.current_scheme() != scheme {
        encode_change_scheme(stream, scheme, UnlatchType::Explicit)?;
        stream.check_scheme(scheme)?;
    }

    // EDIFACT may complete before writing its first word of a new chunk.
    if scheme == Scheme::Edifact {
        complete_if_done_edifact(stream, size_request)?;
    }

    match stream.current_scheme() {
        Scheme::Ascii => {
            encode_next_chunk_ascii(stream, option)?;
            complete_if_done_ascii(stream, size_request)?;
        }
        Scheme::C40 | Scheme::Text | Scheme::X12 => {
            encode_next_chunk_ctx(stream, size_request)?;
            complete_if_done_ctx(stream, size_request)?;
        }
        Scheme::Edifact => {
            encode_next_chunk_edifact(stream)?;
            complete_if_done_edifact(stream, size_request)?;
        }
        Scheme::Base256 => {
            encode_next_chunk_base256(stream)?;
            complete_if_done_base256(stream, size_request)?;
        }
    }

    Ok(())
}

/// Switches `stream` from its current scheme to `target_scheme`, routing
/// through an ASCII unlatch/latch pair as every scheme transition must.
pub(crate) fn encode_change_scheme(
    stream: &mut EncodeStream<'_>,
    target_scheme: Scheme,
    unlatch_type: UnlatchType,
) -> StreamResult<()> {
    if stream.current_scheme() == target_scheme {
        return Ok(());
    }

    match stream.current_scheme() {
        Scheme::C40 | Scheme::Text | Scheme::X12 => {
            if unlatch_type == UnlatchType::Explicit {
                append_unlatch_ctx(stream)?;
            }
        }
        Scheme::Edifact => {
            if unlatch_type == UnlatchType::Explicit {
                append_value_edifact(stream, VALUE_EDIFACT_UNLATCH)?;
            }
        }
        Scheme::Ascii | Scheme::Base256 => {}
    }
    stream.set_current_scheme(Scheme::Ascii);

    match target_scheme {
        Scheme::C40 => append_value_ascii(stream, VALUE_C40_LATCH)?,
        Scheme::Text => append_value_ascii(stream, VALUE_TEXT_LATCH)?,
        Scheme::X12 => append_value_ascii(stream, VALUE_X12_LATCH)?,
        Scheme::Edifact => append_value_ascii(stream, VALUE_EDIFACT_LATCH)?,
        Scheme::Base256 => append_value_ascii(stream, VALUE_BASE256_LATCH)?,
        Scheme::Ascii => stream.check_scheme(Scheme::Ascii)?,
    }
    stream.set_current_scheme(target_scheme);

    stream.set_chain_counts(0, 0);

    if target_scheme == Scheme::Base256 {
        update_base256_chain_header(stream, None)?;
    }

    Ok(())
}

/// Data-word capacity left in `size_idx` after `output_length` codewords,
/// or `None` if `size_idx` itself is undefined (mirrors
/// `GetRemainingSymbolCapacity`, which tolerates an unresolved size at some
/// call sites).
pub(crate) fn get_remaining_symbol_capacity(
    output_length: usize,
    size_idx: Option<SymbolSize>,
) -> i64 {
    match size_idx {
        Some(size) => size.symbol_data_words() as i64 - output_length as i64,
        None => i64::MIN,
    }
}

pub(crate) fn find_symbol_size(
    output_length: usize,
    size_request: SizeRequest,
) -> Option<SymbolSize> {
    SymbolSize::find(output_length as u16, size_request)
}

pub(crate) fn check_size(
    stream: &mut EncodeStream<'_>,
    size_idx: Option<SymbolSize>,
) -> StreamResult<SymbolSize> {
    match size_idx {
        Some(size) => Ok(size),
        None => Err(stream.mark_invalid(EncodeReason::SizeNotFound)),
    }
}
