use crate::base256::unrandomize_255_state;
use crate::{
    Scheme, VALUE_05_MACRO, VALUE_06_MACRO, VALUE_ASCII_PAD, VALUE_ASCII_UPPER_SHIFT,
    VALUE_BASE256_LATCH, VALUE_C40_LATCH, VALUE_CTX_UNLATCH, VALUE_EDIFACT_LATCH,
    VALUE_EDIFACT_UNLATCH, VALUE_FNC1, VALUE_TEXT_LATCH, VALUE_X12_LATCH,
};

/// Result of [`decode_data_stream`]: the decoded byte payload plus the
/// number of trailing ASCII pad codewords consumed (spec §4.G).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutput {
    /// Decoded application data, with any Structured Append macro
    /// header/trailer already wrapped around it.
    pub bytes: Vec<u8>,
    /// Number of ASCII pad codewords found at the end of the data region.
    pub pad_count: usize,
}

/// Interprets `data` (the symbol's data codewords, parity already stripped
/// and corrected) back into application bytes, dispatching to each
/// scheme's decoder as latch codewords are encountered. Mirrors
/// `DecodeDataStream`.
pub fn decode_data_stream(data: &[u8], fnc1: Option<u8>) -> DecodeOutput {
    let mut output = Vec::with_capacity(data.len());
    let mut pad_count = 0usize;

    let macro_type = data.first().copied().filter(|&cw| cw == VALUE_05_MACRO || cw == VALUE_06_MACRO);
    if let Some(cw) = macro_type {
        push_output_macro_header(&mut output, cw);
    }

    let mut idx = 0usize;
    while idx < data.len() {
        let scheme = get_encodation_scheme(data[idx]);
        if scheme != Scheme::Ascii {
            idx += 1;
        }

        idx = match scheme {
            Scheme::Ascii => decode_scheme_ascii(data, idx, &mut output, fnc1, &mut pad_count),
            Scheme::C40 | Scheme::Text => {
                decode_scheme_c40_text(data, idx, &mut output, scheme, fnc1)
            }
            Scheme::X12 => decode_scheme_x12(data, idx, &mut output),
            Scheme::Edifact => decode_scheme_edifact(data, idx, &mut output),
            Scheme::Base256 => decode_scheme_base256(data, idx, &mut output),
        };
    }

    if macro_type.is_some() {
        push_output_macro_trailer(&mut output);
    }

    DecodeOutput { bytes: output, pad_count }
}

fn get_encodation_scheme(codeword: u8) -> Scheme {
    match codeword {
        VALUE_C40_LATCH => Scheme::C40,
        VALUE_TEXT_LATCH => Scheme::Text,
        VALUE_X12_LATCH => Scheme::X12,
        VALUE_EDIFACT_LATCH => Scheme::Edifact,
        VALUE_BASE256_LATCH => Scheme::Base256,
        _ => Scheme::Ascii,
    }
}

fn push_output_macro_header(output: &mut Vec<u8>, macro_type: u8) {
    output.extend_from_slice(b"[)>");
    output.push(30); // RS
    output.push(b'0');
    output.push(if macro_type == VALUE_05_MACRO { b'5' } else { b'6' });
    output.push(29); // GS
}

fn push_output_macro_trailer(output: &mut Vec<u8>) {
    output.push(30); // RS
    output.push(4); // EOT
}

/// Decodes a run of ASCII codewords starting at `idx`, returning the index
/// of the next undecoded codeword (where the scheme changed, or
/// `data.len()` if the pad codeword or end of data was reached).
fn decode_scheme_ascii(
    data: &[u8],
    mut idx: usize,
    output: &mut Vec<u8>,
    fnc1: Option<u8>,
    pad_count: &mut usize,
) -> usize {
    let mut upper_shift = false;

    while idx < data.len() {
        let codeword = data[idx];

        if get_encodation_scheme(codeword) != Scheme::Ascii {
            return idx;
        }
        idx += 1;

        if upper_shift {
            output.push(codeword.wrapping_add(127));
            upper_shift = false;
        } else if codeword == VALUE_ASCII_UPPER_SHIFT {
            upper_shift = true;
        } else if codeword == VALUE_ASCII_PAD {
            *pad_count = data.len() - idx;
            return data.len();
        } else if codeword == 0 || codeword >= 242 {
            return idx;
        } else if codeword <= 128 {
            output.push(codeword - 1);
        } else if codeword <= 229 {
            let digits = codeword - 130;
            output.push(digits / 10 + b'0');
            output.push(digits - (digits / 10) * 10 + b'0');
        } else if codeword == VALUE_FNC1 {
            if let Some(fnc1_byte) = fnc1 {
                output.push(fnc1_byte);
            }
        }
    }

    idx
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum C40TextShift {
    Basic,
    Shift1,
    Shift2,
    Shift3,
}

struct C40TextState {
    shift: C40TextShift,
    upper_shift: bool,
}

fn push_output_c40_text_word(output: &mut Vec<u8>, state: &mut C40TextState, value: u8) {
    output.push(if state.upper_shift { value.wrapping_add(128) } else { value });
    state.shift = C40TextShift::Basic;
    state.upper_shift = false;
}

/// Decodes a C40/Text-latched run, unpacking each pair of codewords into
/// up to 3 basic/shifted-set values before checking for an unlatch.
fn decode_scheme_c40_text(
    data: &[u8],
    mut idx: usize,
    output: &mut Vec<u8>,
    scheme: Scheme,
    fnc1: Option<u8>,
) -> usize {
    let mut state = C40TextState { shift: C40TextShift::Basic, upper_shift: false };

    if data.len().saturating_sub(idx) < 2 {
        return idx;
    }

    while idx < data.len() {
        let packed = (data[idx] as u32) << 8 | data[idx + 1] as u32;
        let values = [
            ((packed - 1) / 1600) as u8,
            (((packed - 1) / 40) % 40) as u8,
            ((packed - 1) % 40) as u8,
        ];
        idx += 2;

        for &value in &values {
            match state.shift {
                C40TextShift::Basic => {
                    if value <= 2 {
                        state.shift = match value {
                            0 => C40TextShift::Shift1,
                            1 => C40TextShift::Shift2,
                            _ => C40TextShift::Shift3,
                        };
                    } else if value == 3 {
                        push_output_c40_text_word(output, &mut state, b' ');
                    } else if value <= 13 {
                        push_output_c40_text_word(output, &mut state, value - 13 + b'9');
                    } else if value <= 39 {
                        let base = if scheme == Scheme::C40 { b'Z' } else { b'z' };
                        push_output_c40_text_word(output, &mut state, value.wrapping_sub(39).wrapping_add(base));
                    }
                }
                C40TextShift::Shift1 => {
                    push_output_c40_text_word(output, &mut state, value);
                }
                C40TextShift::Shift2 => {
                    if value <= 14 {
                        push_output_c40_text_word(output, &mut state, value + 33);
                    } else if value <= 21 {
                        push_output_c40_text_word(output, &mut state, value + 43);
                    } else if value <= 26 {
                        push_output_c40_text_word(output, &mut state, value + 69);
                    } else if value == 27 {
                        if let Some(fnc1_byte) = fnc1 {
                            push_output_c40_text_word(output, &mut state, fnc1_byte);
                        }
                    } else if value == 30 {
                        state.upper_shift = true;
                        state.shift = C40TextShift::Basic;
                    }
                }
                C40TextShift::Shift3 => {
                    if scheme == Scheme::C40 {
                        push_output_c40_text_word(output, &mut state, value + 96);
                    } else if value == 0 {
                        push_output_c40_text_word(output, &mut state, value + 96);
                    } else if value <= 26 {
                        push_output_c40_text_word(output, &mut state, value.wrapping_sub(26).wrapping_add(b'Z'));
                    } else {
                        push_output_c40_text_word(output, &mut state, value.wrapping_sub(31).wrapping_add(127));
                    }
                }
            }
        }

        if data.get(idx).copied() == Some(VALUE_CTX_UNLATCH) {
            return idx + 1;
        }
        if data.len().saturating_sub(idx) < 2 {
            return idx;
        }
    }

    idx
}

/// Decodes an X12-latched run the same way as C40/Text but with X12's
/// fixed character mapping and no shift sets.
fn decode_scheme_x12(data: &[u8], mut idx: usize, output: &mut Vec<u8>) -> usize {
    if data.len().saturating_sub(idx) < 2 {
        return idx;
    }

    while idx < data.len() {
        let packed = (data[idx] as u32) << 8 | data[idx + 1] as u32;
        let values = [
            ((packed - 1) / 1600) as u8,
            (((packed - 1) / 40) % 40) as u8,
            ((packed - 1) % 40) as u8,
        ];
        idx += 2;

        for &value in &values {
            match value {
                0 => output.push(13),
                1 => output.push(42),
                2 => output.push(62),
                3 => output.push(32),
                4..=13 => output.push(value + 44),
                14..=90 => output.push(value + 51),
                _ => {}
            }
        }

        if data.get(idx).copied() == Some(VALUE_CTX_UNLATCH) {
            return idx + 1;
        }
        if data.len().saturating_sub(idx) < 2 {
            return idx;
        }
    }

    idx
}

/// Decodes an EDIFACT-latched run, unpacking 3 bytes into 4 six-bit values
/// at a time and inverting bit 5 to recover the ASCII byte.
fn decode_scheme_edifact(data: &[u8], mut idx: usize, output: &mut Vec<u8>) -> usize {
    if data.len().saturating_sub(idx) < 3 {
        return idx;
    }

    while idx < data.len() {
        let b0 = data[idx];
        let b1 = data[idx + 1];
        let b2 = data[idx + 2];

        let unpacked = [
            (b0 & 0xfc) >> 2,
            (b0 & 0x03) << 4 | (b1 & 0xf0) >> 4,
            (b1 & 0x0f) << 2 | (b2 & 0xc0) >> 6,
            b2 & 0x3f,
        ];

        for (i, &value) in unpacked.iter().enumerate() {
            if i < 3 {
                idx += 1;
            }

            if value == VALUE_EDIFACT_UNLATCH {
                return idx;
            }

            output.push(value ^ (((value & 0x20) ^ 0x20) << 1));
        }

        if data.len().saturating_sub(idx) < 3 {
            return idx;
        }
    }

    idx
}

/// Decodes a Base 256-latched run: reads the 1-or-2-byte length header
/// (unrandomizing it first, since the header is scrambled like any other
/// Base 256 byte), then unrandomizes that many data bytes.
fn decode_scheme_base256(data: &[u8], mut idx: usize, output: &mut Vec<u8>) -> usize {
    let mut position = idx + 1;

    let d0 = unrandomize_255_state(data[idx], position as i64);
    idx += 1;
    position += 1;

    let end = if d0 == 0 {
        data.len()
    } else if d0 <= 249 {
        idx + d0 as usize
    } else {
        let d1 = unrandomize_255_state(data[idx], position as i64);
        idx += 1;
        position += 1;
        idx + (d0 as usize - 249) * 250 + d1 as usize
    };

    let end = end.min(data.len());

    while idx < end {
        output.push(unrandomize_255_state(data[idx], position as i64));
        idx += 1;
        position += 1;
    }

    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ascii_round_trips_digit_pairs() {
        let codewords = [142u8, 164, 186, 208];
        let result = decode_data_stream(&codewords, None);
        assert_eq!(result.bytes, b"12345678");
        assert_eq!(result.pad_count, 0);
    }

    #[test]
    fn decode_ascii_stops_at_pad() {
        let codewords = [b'A' + 1, VALUE_ASCII_PAD, VALUE_ASCII_PAD];
        let result = decode_data_stream(&codewords, None);
        assert_eq!(result.bytes, b"A");
        assert_eq!(result.pad_count, 1);
    }
}
