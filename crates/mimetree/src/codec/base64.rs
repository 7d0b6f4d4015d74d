//! Base64 transfer encoding (RFC 2045 section 6.8).

use super::{MAX_LINE_LEN, TransferCodec};

static ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Base64 codec.
///
/// Body encoding inserts a CRLF after every 76 output characters and after a
/// trailing partial line; [`Base64::without_line_breaks`] yields the single-line
/// form used inside encoded words.
#[derive(Debug, Clone, Copy)]
pub struct Base64 {
    line_breaks: bool,
}

impl Default for Base64 {
    fn default() -> Self {
        Self::new()
    }
}

impl Base64 {
    /// Creates the body-encoding codec with line breaks.
    #[must_use]
    pub const fn new() -> Self {
        Self { line_breaks: true }
    }

    /// Creates the single-line codec.
    #[must_use]
    pub const fn without_line_breaks() -> Self {
        Self { line_breaks: false }
    }
}

const fn decode_digit(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

impl TransferCodec for Base64 {
    fn encoded_len(&self, input: &[u8]) -> usize {
        let n = input.len();
        let mut len = n.div_ceil(3) * 4;
        if self.line_breaks {
            // A CRLF lands after every 19 full input triplets (76 output
            // characters), plus one after a trailing partial line.
            let triplets = n / 3;
            len += triplets / 19 * 2;
            if 4 * (triplets % 19) + n % 3 != 0 {
                len += 2;
            }
        }
        len
    }

    fn decoded_len(&self, input: &[u8]) -> usize {
        input.len() * 3 / 4 + 2
    }

    fn encode(&self, input: &[u8], output: &mut [u8]) -> usize {
        let mut out = 0;
        let mut line_len = 0;
        let mut carry = 0u8;
        let mut consumed = 0;
        for (i, &b) in input.iter().enumerate() {
            if out >= output.len() {
                break;
            }
            match i % 3 {
                0 => {
                    output[out] = ALPHABET[usize::from(b >> 2)];
                    out += 1;
                    carry = (b << 4) & 0x30;
                }
                1 => {
                    output[out] = ALPHABET[usize::from(carry | (b >> 4))];
                    out += 1;
                    carry = (b << 2) & 0x3c;
                }
                _ => {
                    output[out] = ALPHABET[usize::from(carry | (b >> 6))];
                    out += 1;
                    if out < output.len() {
                        output[out] = ALPHABET[usize::from(b & 0x3f)];
                        out += 1;
                        line_len += 1;
                    }
                }
            }
            line_len += 1;
            consumed = i + 1;
            if self.line_breaks && line_len >= MAX_LINE_LEN && out + 2 <= output.len() {
                output[out] = b'\r';
                output[out + 1] = b'\n';
                out += 2;
                line_len = 0;
            }
        }
        if consumed % 3 != 0 && out < output.len() {
            output[out] = ALPHABET[usize::from(carry)];
            out += 1;
            let pad = 3 - consumed % 3;
            if out + pad <= output.len() {
                for _ in 0..pad {
                    output[out] = b'=';
                    out += 1;
                }
            }
        }
        if self.line_breaks && line_len != 0 && out + 2 <= output.len() {
            output[out] = b'\r';
            output[out + 1] = b'\n';
            out += 2;
        }
        out
    }

    fn decode(&self, input: &[u8], output: &mut [u8]) -> usize {
        let mut out = 0;
        let mut phase = 0usize;
        let mut carry = 0u8;
        for &b in input {
            if out >= output.len() {
                break;
            }
            if b == b'\r' || b == b'\n' {
                continue;
            }
            // Padding and any other foreign byte end the stream.
            let Some(v) = decode_digit(b) else { break };
            match phase % 4 {
                0 => carry = v << 2,
                1 => {
                    output[out] = carry | (v >> 4);
                    out += 1;
                    carry = v << 4;
                }
                2 => {
                    output[out] = carry | (v >> 2);
                    out += 1;
                    carry = v << 6;
                }
                _ => {
                    output[out] = carry | v;
                    out += 1;
                }
            }
            phase += 1;
        }
        out
    }
}
