//! Data Matrix ECC 200 encodation schemes and the codeword-level codec.
//!
//! ECC 200 packs input bytes into codewords under one of six encodation
//! schemes (ASCII, C40, Text, X12, EDIFACT, Base 256). This crate implements
//! each scheme's chunked pack/unpack rules, the [`EncodeStream`] state
//! machine that drives a single scheme end to end, the 17-stream
//! [`optimize::encode_optimize_best`] optimizer that picks the shortest
//! mixed-scheme encoding, and [`decode::decode_data_stream`], the reverse
//! direction that turns a data-codeword slice back into bytes.
//!
//! # Safety
//! Unsafe code is forbidden via a crate-level attribute.

#![forbid(unsafe_code)]

use std::fmt;

mod ascii;
mod base256;
mod ctx;
mod decode;
mod edifact;
mod optimize;
mod scheme;
mod stream;

pub use decode::{decode_data_stream, DecodeOutput};
pub use optimize::encode_optimize_best;
pub use scheme::encode_single_scheme;
pub use stream::{EncodeStream, StreamStatus};

/// Codeword value that latches into C40 from ASCII.
pub const VALUE_C40_LATCH: u8 = 230;
/// Codeword value that latches into Text from ASCII.
pub const VALUE_TEXT_LATCH: u8 = 239;
/// Codeword value that latches into X12 from ASCII.
pub const VALUE_X12_LATCH: u8 = 238;
/// Codeword value that latches into EDIFACT from ASCII.
pub const VALUE_EDIFACT_LATCH: u8 = 240;
/// Codeword value that latches into Base 256 from ASCII.
pub const VALUE_BASE256_LATCH: u8 = 231;
/// Codeword value that unlatches C40/Text/X12 back to ASCII.
pub const VALUE_CTX_UNLATCH: u8 = 254;
/// 6-bit EDIFACT value that unlatches back to ASCII.
pub const VALUE_EDIFACT_UNLATCH: u8 = 31;
/// ASCII pad codeword.
pub const VALUE_ASCII_PAD: u8 = 129;
/// ASCII upper-shift codeword (next byte + 127).
pub const VALUE_ASCII_UPPER_SHIFT: u8 = 235;
/// ASCII codeword for the FNC1 Application Identifier sentinel.
pub const VALUE_FNC1: u8 = 232;
/// ASCII codeword for a Macro 05 header/trailer wrap.
pub const VALUE_05_MACRO: u8 = 236;
/// ASCII codeword for a Macro 06 header/trailer wrap.
pub const VALUE_06_MACRO: u8 = 237;

/// C40/Text/X12 in-triplet shift sentinel values (distinct from the 0..39
/// basic-set value range; these never appear as a *decoded* basic-set
/// value, only as a value pushed into the pre-triplet value list).
pub const VALUE_CTX_SHIFT1: u8 = 0;
/// See [`VALUE_CTX_SHIFT1`].
pub const VALUE_CTX_SHIFT2: u8 = 1;
/// See [`VALUE_CTX_SHIFT1`].
pub const VALUE_CTX_SHIFT3: u8 = 2;

/// One of the six ECC 200 encodation schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Default scheme: 1 byte -> 1 codeword, or 2 digits -> 1 codeword.
    Ascii,
    /// 3 input bytes -> 2 codewords, upper/punctuation case.
    C40,
    /// 3 input bytes -> 2 codewords, lower/punctuation case.
    Text,
    /// 3 input bytes -> 2 codewords, ANSI X12 EDI character set.
    X12,
    /// 4 input bytes -> 3 codewords, 6-bit packing.
    Edifact,
    /// 1 byte -> 1 codeword, randomized, with a length header.
    Base256,
}

/// How a caller wants the overall message scheme chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeRequest {
    /// Use a single scheme for the whole message.
    Single(Scheme),
    /// Run the 17-stream optimizer and keep the shortest result.
    AutoBest,
    /// Declared in the ECC 200 enum but never implemented upstream; see
    /// [`EncodeError::AutoFastUnimplemented`].
    AutoFast,
}

/// Whether an ASCII chunk should try to collapse two digits into one
/// codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsciiOption {
    /// Always use one codeword per byte.
    Full,
    /// Collapse two digits into one codeword, or mark the stream invalid if
    /// either value is not a digit.
    Compact,
    /// Collapse two digits into one codeword when both are present and
    /// digits; otherwise encode a single value.
    Normal,
}

/// Whether a scheme change emits an explicit unlatch codeword before
/// latching to the new scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlatchType {
    /// Emit the scheme's unlatch codeword/value.
    Explicit,
    /// Rely on an implicit unlatch (end of symbol data).
    Implicit,
}

/// Reason a stream was marked [`StreamStatus::Invalid`] or
/// [`StreamStatus::Fatal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeReason {
    /// Input byte has no representation in the current scheme.
    UnsupportedCharacter,
    /// `AsciiOption::Compact` was requested but the next value isn't a
    /// digit pair.
    CantCompactNonDigits,
    /// An unlatch was attempted mid-chunk, off a codeword boundary.
    NotOnByteBoundary,
    /// Attempted to pop from an empty output chain.
    EmptyOutputChain,
    /// Attempted to read or write past a buffer's bounds.
    OutOfBounds,
    /// A scheme-specific routine ran while the stream was in the wrong
    /// scheme.
    UnexpectedScheme,
    /// A CTX codeword pair was appended from an incomplete value triplet.
    IncompleteValueList,
    /// An internal helper received a state/target combination that should
    /// be unreachable.
    IllegalParameterValue,
    /// No symbol size can hold the data encoded so far.
    SizeNotFound,
    /// Unexpected internal condition (mirrors libdmtx's catch-all
    /// `DmtxErrorUnknown`).
    Internal,
}

impl fmt::Display for EncodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnsupportedCharacter => "unsupported character for current scheme",
            Self::CantCompactNonDigits => "cannot compact non-digit ASCII pair",
            Self::NotOnByteBoundary => "unlatch attempted off a codeword boundary",
            Self::EmptyOutputChain => "output chain is empty",
            Self::OutOfBounds => "index out of bounds",
            Self::UnexpectedScheme => "stream is not in the expected scheme",
            Self::IncompleteValueList => "value list is shorter than one chunk",
            Self::IllegalParameterValue => "illegal internal parameter value",
            Self::SizeNotFound => "no symbol size fits the encoded data",
            Self::Internal => "internal encodation error",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for EncodeReason {}

/// Errors from the top-level encode entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The input was empty; ECC 200 requires at least one data codeword.
    EmptyInput,
    /// The stream ended in [`StreamStatus::Invalid`] or
    /// [`StreamStatus::Fatal`].
    StreamFailed(EncodeReason),
    /// The requested symbol size cannot hold the input.
    SizeNotSatisfiable,
    /// `SchemeRequest::AutoFast` was requested; see source note in
    /// `dmtxencode.c` where this branch returns `DmtxUndefined` rather than
    /// implementing a heuristic.
    AutoFastUnimplemented,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "cannot encode an empty input"),
            Self::StreamFailed(reason) => write!(f, "encode stream failed: {reason}"),
            Self::SizeNotSatisfiable => write!(f, "requested symbol size cannot hold the input"),
            Self::AutoFastUnimplemented => {
                write!(f, "AutoFast scheme selection is not implemented upstream")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Result type for this crate's top-level fallible operations.
pub type Result<T> = std::result::Result<T, EncodeError>;

/// Marker propagated by [`StreamResult`] once a stream's status has already
/// recorded the failure reason; callers inspect `stream.status()` /
/// `stream.reason()` rather than this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamAborted;

/// Result type threaded through the scheme state machine: `Err` means the
/// stream's status/reason fields already explain what happened, and the
/// caller should stop driving this stream (mirrors the `CHKERR` early-return
/// macros in the source encoder).
pub type StreamResult<T> = std::result::Result<T, StreamAborted>;
