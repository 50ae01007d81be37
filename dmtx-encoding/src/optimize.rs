use dmtx_symbol::{SizeRequest, SymbolSize};

use crate::ctx::{is_ctx, push_ctx_values};
use crate::scheme::encode_next_chunk;
use crate::stream::{EncodeStream, StreamStatus};
use crate::{AsciiOption, EncodeError, EncodeReason, Scheme};

/// One of the 17 parallel candidate states the optimizer races against each
/// other. Each scheme gets one state per possible input-byte phase offset
/// (1 for ASCII-full, 2 for compact-ASCII, 3 for C40/Text/X12, 4 for
/// EDIFACT), since a chunked scheme's efficiency depends on which input
/// byte its first chunk boundary lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SchemeState {
    AsciiFull,
    AsciiCompactOffset0,
    AsciiCompactOffset1,
    C40Offset0,
    C40Offset1,
    C40Offset2,
    TextOffset0,
    TextOffset1,
    TextOffset2,
    X12Offset0,
    X12Offset1,
    X12Offset2,
    EdifactOffset0,
    EdifactOffset1,
    EdifactOffset2,
    EdifactOffset3,
    Base256,
}

const ALL_STATES: [SchemeState; 17] = [
    SchemeState::AsciiFull,
    SchemeState::AsciiCompactOffset0,
    SchemeState::AsciiCompactOffset1,
    SchemeState::C40Offset0,
    SchemeState::C40Offset1,
    SchemeState::C40Offset2,
    SchemeState::TextOffset0,
    SchemeState::TextOffset1,
    SchemeState::TextOffset2,
    SchemeState::X12Offset0,
    SchemeState::X12Offset1,
    SchemeState::X12Offset2,
    SchemeState::EdifactOffset0,
    SchemeState::EdifactOffset1,
    SchemeState::EdifactOffset2,
    SchemeState::EdifactOffset3,
    SchemeState::Base256,
];

/// Races all 17 candidate scheme/phase-offset states one input byte at a
/// time and keeps whichever finishes with the fewest output codewords.
/// Mirrors `EncodeOptimizeBest`/`StreamAdvanceFromBest`: at every input
/// byte, every `targetState` that's due to start a new chunk looks across
/// *all* `fromState` candidates still encoding and adopts whichever one's
/// current-shortest continuation (that state's stream, advanced by one
/// target-scheme chunk) is shortest -- true per-byte cross-state dynamic
/// programming, not 17 independently-run schemes. This is what lets a long
/// digit run embedded in free text switch into C40 mid-stream and back to
/// ASCII, since the ASCII candidate's stream-so-far is a valid starting
/// point for the C40 candidate (and vice versa) at every chunk boundary.
pub fn encode_optimize_best(
    input: &[u8],
    size_request: SizeRequest,
    fnc1: Option<u8>,
) -> crate::Result<(SymbolSize, Vec<u8>)> {
    if input.is_empty() {
        return Err(EncodeError::EmptyInput);
    }

    let mut streams_best: Vec<EncodeStream<'_>> =
        ALL_STATES.iter().map(|_| EncodeStream::new(input, fnc1)).collect();

    let mut c40_value_count = 0usize;
    let mut text_value_count = 0usize;
    let mut x12_value_count = 0usize;

    for input_next in 0..input.len() {
        let mut streams_temp: Vec<EncodeStream<'_>> =
            ALL_STATES.iter().map(|_| EncodeStream::new(input, fnc1)).collect();

        stream_advance_from_best(&mut streams_temp, &streams_best, SchemeState::AsciiFull, size_request);

        advance_ascii_compact(
            &mut streams_temp,
            &streams_best,
            SchemeState::AsciiCompactOffset0,
            input_next,
            size_request,
        );
        advance_ascii_compact(
            &mut streams_temp,
            &streams_best,
            SchemeState::AsciiCompactOffset1,
            input_next,
            size_request,
        );

        advance_ctx(&mut streams_temp, &streams_best, SchemeState::C40Offset0, input_next, c40_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::C40Offset1, input_next, c40_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::C40Offset2, input_next, c40_value_count, size_request);

        advance_ctx(&mut streams_temp, &streams_best, SchemeState::TextOffset0, input_next, text_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::TextOffset1, input_next, text_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::TextOffset2, input_next, text_value_count, size_request);

        advance_ctx(&mut streams_temp, &streams_best, SchemeState::X12Offset0, input_next, x12_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::X12Offset1, input_next, x12_value_count, size_request);
        advance_ctx(&mut streams_temp, &streams_best, SchemeState::X12Offset2, input_next, x12_value_count, size_request);

        advance_edifact(&mut streams_temp, &streams_best, SchemeState::EdifactOffset0, input_next, size_request);
        advance_edifact(&mut streams_temp, &streams_best, SchemeState::EdifactOffset1, input_next, size_request);
        advance_edifact(&mut streams_temp, &streams_best, SchemeState::EdifactOffset2, input_next, size_request);
        advance_edifact(&mut streams_temp, &streams_best, SchemeState::EdifactOffset3, input_next, size_request);

        stream_advance_from_best(&mut streams_temp, &streams_best, SchemeState::Base256, size_request);

        for idx in 0..ALL_STATES.len() {
            if streams_best[idx].status() != StreamStatus::Complete {
                let temp = std::mem::replace(&mut streams_temp[idx], EncodeStream::new(input, fnc1));
                streams_best[idx] = temp;
            }
        }

        let mut c40_values = Vec::new();
        c40_value_count += match push_ctx_values(&mut c40_values, input[input_next], Scheme::C40, fnc1) {
            Ok(()) => c40_values.len(),
            Err(()) => 1,
        };

        let mut text_values = Vec::new();
        text_value_count += match push_ctx_values(&mut text_values, input[input_next], Scheme::Text, fnc1) {
            Ok(()) => text_values.len(),
            Err(()) => 1,
        };

        let mut x12_values = Vec::new();
        x12_value_count += match push_ctx_values(&mut x12_values, input[input_next], Scheme::X12, fnc1) {
            Ok(()) => x12_values.len(),
            Err(()) => 1,
        };
    }

    let winner = ALL_STATES
        .iter()
        .map(|state| best_at(&streams_best, *state))
        .filter(|stream| stream.status() == StreamStatus::Complete)
        .min_by_key(|stream| stream.output().len());

    match winner {
        Some(stream) => {
            let size_idx = stream.size_idx().expect("complete stream records a size");
            Ok((size_idx, stream.output().to_vec()))
        }
        None => Err(EncodeError::SizeNotSatisfiable),
    }
}

fn best_at<'a, 'b>(streams_best: &'a [EncodeStream<'b>], state: SchemeState) -> &'a EncodeStream<'b> {
    &streams_best[state_index(state)]
}

fn state_index(state: SchemeState) -> usize {
    ALL_STATES.iter().position(|s| *s == state).expect("state listed in ALL_STATES")
}

fn get_scheme(state: SchemeState) -> Scheme {
    match state {
        SchemeState::AsciiFull
        | SchemeState::AsciiCompactOffset0
        | SchemeState::AsciiCompactOffset1 => Scheme::Ascii,
        SchemeState::C40Offset0 | SchemeState::C40Offset1 | SchemeState::C40Offset2 => Scheme::C40,
        SchemeState::TextOffset0 | SchemeState::TextOffset1 | SchemeState::TextOffset2 => {
            Scheme::Text
        }
        SchemeState::X12Offset0 | SchemeState::X12Offset1 | SchemeState::X12Offset2 => Scheme::X12,
        SchemeState::EdifactOffset0
        | SchemeState::EdifactOffset1
        | SchemeState::EdifactOffset2
        | SchemeState::EdifactOffset3 => Scheme::Edifact,
        SchemeState::Base256 => Scheme::Base256,
    }
}

/// Whether switching from `from_state`'s current-shortest stream into
/// `target_state`'s scheme is worth trying at all: candidates already in
/// the same scheme at a *different* phase offset never compete with each
/// other directly (each offset advances itself via its own `Advance*`
/// call), but every state can always switch through `AsciiFull` and
/// `AsciiFull` can always switch into anything. Mirrors `ValidStateSwitch`.
fn valid_state_switch(from_state: SchemeState, target_state: SchemeState) -> bool {
    let from_scheme = get_scheme(from_state);
    let to_scheme = get_scheme(target_state);

    !(from_scheme == to_scheme
        && from_state != target_state
        && from_state != SchemeState::AsciiFull
        && target_state != SchemeState::AsciiFull)
}

fn ascii_option_for(state: SchemeState) -> AsciiOption {
    match state {
        SchemeState::AsciiFull => AsciiOption::Full,
        SchemeState::AsciiCompactOffset0 | SchemeState::AsciiCompactOffset1 => AsciiOption::Compact,
        _ => AsciiOption::Normal,
    }
}

/// Lets `target_state` adopt whichever still-encoding `from_state`
/// candidate's stream, advanced by one `target_state`-scheme chunk, comes
/// out shortest. Mirrors `StreamAdvanceFromBest`: it's safe to compare
/// output length directly because every `fromState` started on the same
/// input and has consumed the same number of input bytes by this point --
/// the only difference is how many latch/unlatch codewords each needed.
fn stream_advance_from_best<'a>(
    streams_temp: &mut [EncodeStream<'a>],
    streams_best: &[EncodeStream<'a>],
    target_state: SchemeState,
    size_request: SizeRequest,
) {
    let target_scheme = get_scheme(target_state);
    let option = ascii_option_for(target_state);
    let target_idx = state_index(target_state);

    for (from_idx, from_state) in ALL_STATES.iter().enumerate() {
        if streams_best[from_idx].status() != StreamStatus::Encoding
            || !valid_state_switch(*from_state, target_state)
        {
            continue;
        }

        let mut candidate = streams_best[from_idx].clone();
        let _ = encode_next_chunk(&mut candidate, target_scheme, option, size_request);

        let is_first = from_idx == 0;
        if is_first
            || (candidate.status() != StreamStatus::Invalid
                && candidate.output().len() < streams_temp[target_idx].output().len())
        {
            streams_temp[target_idx] = candidate;
        }
    }
}

/// Advances one of the two ASCII-compact phase-offset candidates, which
/// (unlike the free-running `AsciiFull`/Base256/CTX/EDIFACT states) only
/// ever starts a new chunk on its own parity of `input_next`. Mirrors
/// `AdvanceAsciiCompact`.
fn advance_ascii_compact<'a>(
    streams_temp: &mut [EncodeStream<'a>],
    streams_best: &[EncodeStream<'a>],
    target_state: SchemeState,
    input_next: usize,
    size_request: SizeRequest,
) {
    let target_idx = state_index(target_state);
    let is_start_state = match target_state {
        SchemeState::AsciiCompactOffset0 => input_next % 2 == 0,
        SchemeState::AsciiCompactOffset1 => input_next % 2 == 1,
        _ => unreachable!("advance_ascii_compact only called for the two compact offsets"),
    };

    let current = &streams_best[target_idx];
    if input_next < current.input_cursor() {
        streams_temp[target_idx] = current.clone();
    } else if is_start_state {
        stream_advance_from_best(streams_temp, streams_best, target_state, size_request);
    } else {
        let mut carried = current.clone();
        let _ = carried.mark_invalid(EncodeReason::Internal);
        streams_temp[target_idx] = carried;
    }
}

/// Advances one of the nine C40/Text/X12 phase-offset candidates, which
/// only starts a new chunk once its scheme's running CTX value count
/// (accumulated across input bytes so far, *not* the raw byte index) lands
/// back on a triplet boundary at this candidate's offset. Mirrors
/// `AdvanceCTX`.
fn advance_ctx<'a>(
    streams_temp: &mut [EncodeStream<'a>],
    streams_best: &[EncodeStream<'a>],
    target_state: SchemeState,
    input_next: usize,
    ctx_value_count: usize,
    size_request: SizeRequest,
) {
    debug_assert!(is_ctx(get_scheme(target_state)));

    let target_idx = state_index(target_state);
    let is_start_state = match target_state {
        SchemeState::C40Offset0 | SchemeState::TextOffset0 | SchemeState::X12Offset0 => {
            ctx_value_count % 3 == 0
        }
        SchemeState::C40Offset1 | SchemeState::TextOffset1 | SchemeState::X12Offset1 => {
            ctx_value_count % 3 == 1
        }
        SchemeState::C40Offset2 | SchemeState::TextOffset2 | SchemeState::X12Offset2 => {
            ctx_value_count % 3 == 2
        }
        _ => unreachable!("advance_ctx only called for the nine C40/Text/X12 offsets"),
    };

    let current = &streams_best[target_idx];
    if input_next < current.input_cursor() {
        streams_temp[target_idx] = current.clone();
    } else if is_start_state {
        stream_advance_from_best(streams_temp, streams_best, target_state, size_request);
    } else {
        let mut carried = current.clone();
        let _ = carried.mark_invalid(EncodeReason::Internal);
        streams_temp[target_idx] = carried;
    }
}

/// Advances one of the four EDIFACT phase-offset candidates. Unlike the
/// ASCII-compact/CTX offsets, a non-start-chunk round still tries to push
/// one more 6-bit value into the candidate's already-open EDIFACT chunk
/// rather than simply carrying it forward untouched. Mirrors
/// `AdvanceEdifact`.
fn advance_edifact<'a>(
    streams_temp: &mut [EncodeStream<'a>],
    streams_best: &[EncodeStream<'a>],
    target_state: SchemeState,
    input_next: usize,
    size_request: SizeRequest,
) {
    let target_idx = state_index(target_state);
    let is_start_state = match target_state {
        SchemeState::EdifactOffset0 => input_next % 4 == 0,
        SchemeState::EdifactOffset1 => input_next % 4 == 1,
        SchemeState::EdifactOffset2 => input_next % 4 == 2,
        SchemeState::EdifactOffset3 => input_next % 4 == 3,
        _ => unreachable!("advance_edifact only called for the four EDIFACT offsets"),
    };

    if is_start_state {
        stream_advance_from_best(streams_temp, streams_best, target_state, size_request);
        return;
    }

    let current = &streams_best[target_idx];
    let mut carried = current.clone();
    if current.status() == StreamStatus::Encoding && current.current_scheme() == Scheme::Edifact {
        let _ = encode_next_chunk(&mut carried, Scheme::Edifact, AsciiOption::Normal, size_request);
    } else {
        let _ = carried.mark_invalid(EncodeReason::Internal);
    }
    streams_temp[target_idx] = carried;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_best_picks_ascii_for_pure_digits() {
        let (size, codewords) =
            encode_optimize_best(b"12345678", SizeRequest::SquareAuto, None).unwrap();
        assert_eq!(codewords, vec![142, 164, 186, 208]);
        assert!(size.symbol_data_words() >= codewords.len() as u16);
    }

    #[test]
    fn optimize_best_switches_scheme_mid_stream_for_mixed_content() {
        // A long digit run embedded in free text should be cheaper to cross
        // into C40 for and back out of than to carry in plain ASCII the
        // whole way -- only possible if the optimizer lets candidates adopt
        // each other's continuations mid-stream.
        let input = b"aaaaaaaaaa1234567890bbbbbbbbbb";
        let (_size, mixed) = encode_optimize_best(input, SizeRequest::ShapeAuto, None).unwrap();
        let (_size_ascii, ascii_only) =
            crate::scheme::encode_single_scheme(input, SizeRequest::ShapeAuto, Scheme::Ascii, None)
                .unwrap();
        assert!(mixed.len() <= ascii_only.len());
    }
}
