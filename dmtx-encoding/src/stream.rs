use dmtx_symbol::SymbolSize;

use crate::{EncodeReason, Scheme, StreamAborted, StreamResult};

/// Lifecycle status of an in-progress [`EncodeStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Encoding is currently underway.
    Encoding,
    /// Encoding finished and `size_idx`/`output` are final.
    Complete,
    /// A scheme rule rejected the input (e.g. unsupported character); the
    /// stream is abandoned but no invariant was violated.
    Invalid,
    /// An internal invariant was violated; this should never happen on a
    /// correctly-driven stream.
    Fatal,
}

/// The encodation state machine described in spec §3 ("EncodeStream") and
/// §4.F. One `EncodeStream` drives a single scheme (or a single candidate
/// state in the optimizer's 17-way race) from an input byte slice to an
/// output codeword vector.
#[derive(Debug, Clone)]
pub struct EncodeStream<'a> {
    input: &'a [u8],
    input_next: usize,
    output: Vec<u8>,
    current_scheme: Scheme,
    output_chain_value_count: usize,
    output_chain_word_count: usize,
    status: StreamStatus,
    reason: Option<EncodeReason>,
    size_idx: Option<SymbolSize>,
    fnc1: Option<u8>,
}

impl<'a> EncodeStream<'a> {
    /// Starts a fresh stream over `input`, in ASCII, with an empty output.
    pub fn new(input: &'a [u8], fnc1: Option<u8>) -> Self {
        Self {
            input,
            input_next: 0,
            output: Vec::new(),
            current_scheme: Scheme::Ascii,
            output_chain_value_count: 0,
            output_chain_word_count: 0,
            status: StreamStatus::Encoding,
            reason: None,
            size_idx: None,
            fnc1,
        }
    }

    /// Replaces `self` with a deep copy of `other`'s progress, keeping
    /// `self`'s own `input`/`fnc1` (mirrors `StreamCopy`, used by the
    /// optimizer to fork/merge candidate streams that all read from the
    /// same input).
    pub fn copy_progress_from(&mut self, other: &EncodeStream<'a>) {
        self.input = other.input;
        self.input_next = other.input_next;
        self.output = other.output.clone();
        self.current_scheme = other.current_scheme;
        self.output_chain_value_count = other.output_chain_value_count;
        self.output_chain_word_count = other.output_chain_word_count;
        self.status = other.status;
        self.reason = other.reason;
        self.size_idx = other.size_idx;
        self.fnc1 = other.fnc1;
    }

    /// Current lifecycle status.
    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Reason the stream became [`StreamStatus::Invalid`] or
    /// [`StreamStatus::Fatal`], if any.
    pub fn reason(&self) -> Option<EncodeReason> {
        self.reason
    }

    /// Scheme currently driving `encode_next_chunk`.
    pub fn current_scheme(&self) -> Scheme {
        self.current_scheme
    }

    /// Sets the current scheme directly (used by the scheme-change
    /// sequencer once latch/unlatch codewords have been appended).
    pub(crate) fn set_current_scheme(&mut self, scheme: Scheme) {
        self.current_scheme = scheme;
    }

    /// Codewords produced so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consumes the stream and returns its output buffer.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Number of scheme *values* appended since the last scheme change
    /// (shifts, latches and unlatches count; Base 256 header bytes don't).
    pub fn output_chain_value_count(&self) -> usize {
        self.output_chain_value_count
    }

    /// Number of output codeword *bytes* appended since the last scheme
    /// change.
    pub fn output_chain_word_count(&self) -> usize {
        self.output_chain_word_count
    }

    pub(crate) fn set_chain_counts(&mut self, value_count: usize, word_count: usize) {
        self.output_chain_value_count = value_count;
        self.output_chain_word_count = word_count;
    }

    pub(crate) fn bump_value_count(&mut self, by: usize) {
        self.output_chain_value_count += by;
    }

    /// Symbol size chosen once the stream reaches
    /// [`StreamStatus::Complete`].
    pub fn size_idx(&self) -> Option<SymbolSize> {
        self.size_idx
    }

    /// Input byte value configured to stand in for FNC1, if any.
    pub fn fnc1(&self) -> Option<u8> {
        self.fnc1
    }

    /// Whether unconsumed input bytes remain.
    pub fn input_has_next(&self) -> bool {
        self.input_next < self.input.len()
    }

    /// Input cursor (count of bytes already consumed).
    pub fn input_cursor(&self) -> usize {
        self.input_next
    }

    /// Total length of the input slice.
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    pub(crate) fn set_input_cursor(&mut self, cursor: usize) {
        self.input_next = cursor;
    }

    /// Registers the input cursor as fully consumed (mirrors
    /// `stream->inputNext = stream->input->length;`, used by C40/Text/X12
    /// completion paths once the remainder has been encoded via a scratch
    /// ASCII stream).
    pub(crate) fn set_input_cursor_to_end(&mut self) {
        self.input_next = self.input.len();
    }

    /// Marks the stream complete with the given symbol size. A no-op if
    /// the stream is not currently [`StreamStatus::Encoding`] (mirrors
    /// `StreamMarkComplete`, which is deliberately idempotent so that a
    /// scheme's `complete_if_done` can be called speculatively).
    pub fn mark_complete(&mut self, size_idx: SymbolSize) {
        if self.status == StreamStatus::Encoding {
            self.size_idx = Some(size_idx);
            self.status = StreamStatus::Complete;
        }
    }

    /// Marks the stream invalid (a scheme rule rejected the input) and
    /// returns the propagation marker for `?`.
    pub fn mark_invalid(&mut self, reason: EncodeReason) -> StreamAborted {
        self.status = StreamStatus::Invalid;
        self.reason = Some(reason);
        StreamAborted
    }

    /// Marks the stream fatally broken (an internal invariant was
    /// violated) and returns the propagation marker for `?`.
    pub fn mark_fatal(&mut self, reason: EncodeReason) -> StreamAborted {
        self.status = StreamStatus::Fatal;
        self.reason = Some(reason);
        StreamAborted
    }

    /// Fails unless the stream is currently using `expected` (mirrors
    /// `CHKSCHEME`).
    pub fn check_scheme(&mut self, expected: Scheme) -> StreamResult<()> {
        if self.current_scheme != expected {
            return Err(self.mark_fatal(EncodeReason::UnexpectedScheme));
        }
        Ok(())
    }

    /// Appends `value` to the output chain (mirrors
    /// `StreamOutputChainAppend`).
    pub fn output_chain_append(&mut self, value: u8) -> StreamResult<()> {
        self.output.push(value);
        self.output_chain_word_count += 1;
        Ok(())
    }

    /// Pops and returns the most recently appended output byte (mirrors
    /// `StreamOutputChainRemoveLast`, used by EDIFACT to re-pack a partial
    /// byte).
    pub fn output_chain_remove_last(&mut self) -> StreamResult<u8> {
        if self.output_chain_word_count == 0 {
            return Err(self.mark_fatal(EncodeReason::EmptyOutputChain));
        }
        let value = self.output.pop().expect("chain word count tracked length");
        self.output_chain_word_count -= 1;
        Ok(value)
    }

    /// Overwrites the output byte at `index` (mirrors `StreamOutputSet`,
    /// used to rewrite a Base 256 length header after the fact).
    pub fn output_set(&mut self, index: usize, value: u8) -> StreamResult<()> {
        match self.output.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.mark_fatal(EncodeReason::OutOfBounds)),
        }
    }

    /// Inserts `value` at `index` in the output, shifting later bytes up
    /// and bumping the chain word count (used by Base 256 when its length
    /// header grows from 1 to 2 bytes).
    pub(crate) fn insert_at(&mut self, index: usize, value: u8) {
        self.output.insert(index, value);
        self.output_chain_word_count += 1;
    }

    /// Removes and returns the output byte at `index`, shifting later bytes
    /// down.
    pub(crate) fn remove_at(&mut self, index: usize) -> u8 {
        self.output_chain_word_count = self.output_chain_word_count.saturating_sub(1);
        self.output.remove(index)
    }

    /// Peeks at the next unconsumed input byte without advancing the
    /// cursor (mirrors `StreamInputPeekNext`).
    pub fn input_peek_next(&mut self) -> StreamResult<u8> {
        if !self.input_has_next() {
            return Err(self.mark_fatal(EncodeReason::OutOfBounds));
        }
        Ok(self.input[self.input_next])
    }

    /// Returns the next unconsumed input byte and advances the cursor
    /// (mirrors `StreamInputAdvanceNext`).
    pub fn input_advance_next(&mut self) -> StreamResult<u8> {
        let value = self.input_peek_next()?;
        if self.status == StreamStatus::Encoding {
            self.input_next += 1;
        }
        Ok(value)
    }

    /// Rewinds the cursor by one byte (mirrors `StreamInputAdvancePrev`).
    pub fn input_advance_prev(&mut self) -> StreamResult<()> {
        if self.input_next == 0 {
            return Err(self.mark_fatal(EncodeReason::OutOfBounds));
        }
        self.input_next -= 1;
        Ok(())
    }
}
