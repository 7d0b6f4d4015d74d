//! Quoted-printable transfer encoding (RFC 2045 section 6.7).

use super::{MAX_LINE_LEN, TransferCodec};
use crate::chars;

static HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Quoted-printable codec.
///
/// The default mode treats CRLF in the input as hard line breaks and copies
/// them through; [`QuotedPrintable::quoting_line_breaks`] escapes them instead,
/// producing a single logical line for binary-safe text.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotedPrintable {
    quote_line_breaks: bool,
}

impl QuotedPrintable {
    /// Creates the codec in hard-line-break mode.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            quote_line_breaks: false,
        }
    }

    /// Creates the codec that escapes CR and LF like any other unsafe byte.
    #[must_use]
    pub const fn quoting_line_breaks() -> Self {
        Self {
            quote_line_breaks: true,
        }
    }

    /// Decides how the byte at `pos` is emitted: `(quote, newline, blank)`.
    fn classify(self, input: &[u8], pos: usize) -> (bool, bool, bool) {
        let ch = input[pos];
        match ch {
            b'\t' | b' ' => {
                // Whitespace is unsafe when nothing visible follows it on the
                // line (RFC 2045 rule 3).
                let quote = pos + 1 == input.len()
                    || (!self.quote_line_breaks && input[pos + 1] == b'\r');
                (quote, false, true)
            }
            b'\r' | b'\n' if !self.quote_line_breaks => (false, true, false),
            b'.' if !self.quote_line_breaks => {
                // A dot alone on a line would terminate SMTP DATA.
                let quote = pos >= 2
                    && input[pos - 2..pos] == *b"\r\n"
                    && pos + 3 <= input.len()
                    && input[pos + 1..pos + 3] == *b"\r\n";
                (quote, false, false)
            }
            _ => (!(33..=126).contains(&ch) || ch == b'=', false, false),
        }
    }
}

impl TransferCodec for QuotedPrintable {
    fn encoded_len(&self, input: &[u8]) -> usize {
        let mut out = 0;
        let mut line_len = 0;
        let mut space: Option<usize> = None;
        for pos in 0..input.len() {
            let (quote, newline, blank) = self.classify(input, pos);
            if newline {
                line_len = 0;
                space = None;
            } else if blank && line_len > 0 {
                space = Some(out);
            }
            let width = if quote { 3 } else { 1 };
            if !newline && line_len + width >= MAX_LINE_LEN {
                line_len = match space {
                    Some(sp) if sp < out => out - (sp + 1),
                    _ => 0,
                };
                out += 3;
                space = None;
            }
            if quote {
                out += 3;
                line_len += 3;
            } else {
                out += 1;
                line_len = if newline { 0 } else { line_len + 1 };
            }
        }
        out
    }

    fn encode(&self, input: &[u8], output: &mut [u8]) -> usize {
        let mut out = 0;
        let mut line_len = 0;
        let mut space: Option<usize> = None;
        for pos in 0..input.len() {
            if out >= output.len() {
                break;
            }
            let ch = input[pos];
            let (quote, newline, blank) = self.classify(input, pos);
            if newline {
                line_len = 0;
                space = None;
            } else if blank && line_len > 0 {
                space = Some(out);
            }
            let width = if quote { 3 } else { 1 };
            // A soft break is always followed by the current byte, so it only
            // fits when that byte does too.
            if !newline && line_len + width >= MAX_LINE_LEN && out + 3 + width <= output.len() {
                match space {
                    Some(sp) if sp < out => {
                        // Reflow: break after the last whitespace so the soft
                        // break never splits a word.
                        let brk = sp + 1;
                        let tail = out - brk;
                        output.copy_within(brk..out, brk + 3);
                        output[brk] = b'=';
                        output[brk + 1] = b'\r';
                        output[brk + 2] = b'\n';
                        line_len = tail;
                    }
                    _ => {
                        output[out] = b'=';
                        output[out + 1] = b'\r';
                        output[out + 2] = b'\n';
                        line_len = 0;
                    }
                }
                out += 3;
                space = None;
            }
            if quote {
                if out + 3 <= output.len() {
                    output[out] = b'=';
                    output[out + 1] = HEX[usize::from(ch >> 4)];
                    output[out + 2] = HEX[usize::from(ch & 0x0f)];
                    out += 3;
                    line_len += 3;
                }
            } else {
                output[out] = ch;
                out += 1;
                line_len = if newline { 0 } else { line_len + 1 };
            }
        }
        out
    }

    fn decode(&self, input: &[u8], output: &mut [u8]) -> usize {
        let mut out = 0;
        let mut pos = 0;
        while pos < input.len() {
            if out >= output.len() {
                break;
            }
            let ch = input[pos];
            pos += 1;
            if ch != b'=' {
                output[out] = ch;
                out += 1;
                continue;
            }
            // A lone escape at the very end is dropped.
            if pos + 2 > input.len() {
                break;
            }
            let first = input[pos];
            pos += 1;
            if chars::is_hex_digit(first) {
                let hi = first - if first > b'9' { 0x37 } else { b'0' };
                let second = input[pos];
                pos += 1;
                let lo = second.wrapping_sub(if second > b'9' { 0x37 } else { b'0' });
                output[out] = (hi << 4) | (lo & 0x0f);
                out += 1;
            } else if first == b'\r' && input[pos] == b'\n' {
                // Soft line break.
                pos += 1;
            } else {
                // Malformed escape: keep the byte literally.
                output[out] = first;
                out += 1;
            }
        }
        out
    }
}
