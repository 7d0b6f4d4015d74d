//! RFC 2047 encoded words for non-ASCII header text.

use super::{Base64, MAX_ENCODED_WORD_LEN, QuotedPrintable, TransferCodec};
use crate::chars;
use crate::scan;

static HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Inner encoding of an encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordEncoding {
    /// Base64 form (`?B?`).
    B,
    /// Quoted-printable form (`?Q?`).
    Q,
}

impl WordEncoding {
    /// Picks the shorter form for a unit of `len` bytes containing
    /// `non_ascii` bytes with the high bit set.
    ///
    /// Q wins whenever its escapes cost no more than the base64 expansion, or
    /// when non-ASCII bytes make up at most a fifth of the unit; mostly-ASCII
    /// text then stays readable in the raw header.
    #[must_use]
    pub fn select(len: usize, non_ascii: usize) -> Self {
        let q_size = len + non_ascii * 2;
        let b_size = len.div_ceil(3) * 4;
        if q_size <= b_size || non_ascii * 5 <= len {
            Self::Q
        } else {
            Self::B
        }
    }
}

/// Encoder producing `=?charset?B?...?=` / `=?charset?Q?...?=` words.
///
/// Input longer than one word allows is split into adjacent words joined by a
/// single space, each at most [`MAX_ENCODED_WORD_LEN`] bytes.
#[derive(Debug, Clone)]
pub struct EncodedWord {
    encoding: WordEncoding,
    charset: String,
}

impl EncodedWord {
    /// Creates an encoder for the given charset label.
    pub fn new(encoding: WordEncoding, charset: impl Into<String>) -> Self {
        Self {
            encoding,
            charset: charset.into(),
        }
    }

    /// True when the charset is too long to leave room for any payload.
    fn degenerate(&self) -> bool {
        self.charset.is_empty() || self.charset.len() + 7 + 4 > MAX_ENCODED_WORD_LEN
    }

    /// Exact number of bytes [`Self::encode`] writes for `input`.
    #[must_use]
    pub fn encoded_len(&self, input: &[u8]) -> usize {
        if input.is_empty() || self.degenerate() {
            return input.len();
        }
        let overhead = self.charset.len() + 7;
        match self.encoding {
            WordEncoding::B => {
                let block = (MAX_ENCODED_WORD_LEN - overhead) / 4 * 3;
                let codec = Base64::without_line_breaks();
                let words = input.len().div_ceil(block);
                input
                    .chunks(block)
                    .map(|chunk| codec.encoded_len(chunk))
                    .sum::<usize>()
                    + words * overhead
                    + (words - 1)
            }
            WordEncoding::Q => {
                let max_line = MAX_ENCODED_WORD_LEN - overhead;
                let mut out = 0;
                let mut line_len = 0;
                for &ch in input {
                    let width = q_width(ch);
                    if line_len + width > max_line {
                        out += 3;
                        line_len = 0;
                    }
                    if line_len == 0 {
                        out += self.charset.len() + 5;
                    }
                    line_len += width;
                    out += width;
                }
                out + 2
            }
        }
    }

    /// Encodes `input` into `output`, returning the bytes written.
    ///
    /// On insufficient capacity the encoder stops at a word boundary and
    /// returns the bytes produced so far.
    pub fn encode(&self, input: &[u8], output: &mut [u8]) -> usize {
        if input.is_empty() || self.degenerate() {
            let n = input.len().min(output.len());
            output[..n].copy_from_slice(&input[..n]);
            return n;
        }
        match self.encoding {
            WordEncoding::B => self.encode_b(input, output),
            WordEncoding::Q => self.encode_q(input, output),
        }
    }

    fn encode_b(&self, input: &[u8], output: &mut [u8]) -> usize {
        let overhead = self.charset.len() + 7;
        let block = (MAX_ENCODED_WORD_LEN - overhead) / 4 * 3;
        let codec = Base64::without_line_breaks();
        let mut out = 0;
        let mut pos = 0;
        while pos < input.len() {
            let chunk = &input[pos..(pos + block).min(input.len())];
            if out + overhead + codec.encoded_len(chunk) > output.len() {
                break;
            }
            out += self.word_header(&mut output[out..], b'B');
            out += codec.encode(chunk, &mut output[out..]);
            output[out] = b'?';
            output[out + 1] = b'=';
            out += 2;
            pos += chunk.len();
            if pos < input.len() {
                if out >= output.len() {
                    break;
                }
                output[out] = b' ';
                out += 1;
            }
        }
        out
    }

    fn encode_q(&self, input: &[u8], output: &mut [u8]) -> usize {
        let overhead = self.charset.len() + 7;
        let max_line = MAX_ENCODED_WORD_LEN - overhead;
        let mut out = 0;
        let mut line_len = 0;
        for &ch in input {
            let width = q_width(ch);
            if line_len + width > max_line {
                if out + 3 > output.len() {
                    break;
                }
                output[out..out + 3].copy_from_slice(b"?= ");
                out += 3;
                line_len = 0;
            }
            if line_len == 0 {
                if out + self.charset.len() + 7 > output.len() {
                    break;
                }
                out += self.word_header(&mut output[out..], b'Q');
            }
            line_len += width;
            if out + width > output.len() {
                break;
            }
            if width == 3 {
                output[out] = b'=';
                output[out + 1] = HEX[usize::from(ch >> 4)];
                output[out + 2] = HEX[usize::from(ch & 0x0f)];
            } else {
                output[out] = ch;
            }
            out += width;
        }
        if out + 2 <= output.len() {
            output[out] = b'?';
            output[out + 1] = b'=';
            out += 2;
        }
        out
    }

    fn word_header(&self, output: &mut [u8], flag: u8) -> usize {
        let cs = self.charset.as_bytes();
        output[0] = b'=';
        output[1] = b'?';
        output[2..2 + cs.len()].copy_from_slice(cs);
        let i = 2 + cs.len();
        output[i] = b'?';
        output[i + 1] = flag;
        output[i + 2] = b'?';
        i + 3
    }
}

const fn q_width(ch: u8) -> usize {
    if ch < 33 || ch > 126 || ch == b'=' || ch == b'?' || ch == b'_' {
        3
    } else {
        1
    }
}

/// Decodes every encoded word in `input`, copying plain runs through.
///
/// Whitespace between two adjacent encoded words is elided per RFC 2047.
/// Returns the bytes written and the charset label of the first encoded word,
/// if any.
pub fn decode_words(input: &[u8], output: &mut [u8]) -> (usize, Option<String>) {
    let mut charset: Option<String> = None;
    let mut out = 0;
    let mut pos = 0;
    while pos < input.len() && out < output.len() {
        let mut coding = 0u8;
        let mut payload = pos..input.len();
        let mut next = input.len();
        if input.len() - pos >= 2 && input[pos] == b'=' && input[pos + 1] == b'?' {
            if let Some(q1) = scan::find_byte(input, pos + 2, b'?') {
                if q1 + 3 < input.len() && input[q1 + 2] == b'?' {
                    coding = input[q1 + 1].to_ascii_lowercase();
                    let start = q1 + 3;
                    let end = scan::find(input, start, b"?=").unwrap_or(input.len());
                    payload = start..end;
                    next = (end + 2).min(input.len());
                    if charset.is_none() {
                        charset =
                            Some(String::from_utf8_lossy(&input[pos + 2..q1]).into_owned());
                    }
                }
            }
        }
        let written = match coding {
            b'b' => Base64::without_line_breaks().decode(&input[payload], &mut output[out..]),
            b'q' => QuotedPrintable::new().decode(&input[payload], &mut output[out..]),
            _ => {
                // Plain run up to the next possible encoded word.
                let word = scan::find(input, pos + 1, b"=?").unwrap_or(input.len());
                next = word;
                let mut start = pos;
                if word < input.len() && pos > 0 {
                    let mut sp = pos;
                    while sp < word && chars::is_space(input[sp]) {
                        sp += 1;
                    }
                    if sp == word {
                        start = word;
                    }
                }
                let n = (word - start).min(output.len() - out);
                output[out..out + n].copy_from_slice(&input[start..start + n]);
                n
            }
        };
        out += written;
        pos = next;
    }
    (out, charset)
}
