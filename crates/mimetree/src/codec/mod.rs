//! Content-Transfer-Encoding codecs (RFC 2045).
//!
//! Every codec follows the same two-pass contract: [`TransferCodec::encoded_len`]
//! reports exactly how many bytes [`TransferCodec::encode`] writes for the same
//! input, so callers can pre-size a buffer once and fill it without
//! reallocation. Decoding is sized with the safe upper bound
//! [`TransferCodec::decoded_len`]; [`TransferCodec::decode`] returns the actual
//! count, which may be smaller.
//!
//! When the destination is too small, `encode` and `decode` stop writing at the
//! capacity limit and return the bytes produced so far. They never panic and
//! never write past the slice.

mod base64;
mod encoded_word;
mod quoted_printable;

pub use base64::Base64;
pub use encoded_word::{EncodedWord, WordEncoding, decode_words};
pub use quoted_printable::QuotedPrintable;

/// Maximum encoded line length (RFC 2045 section 6.7).
pub const MAX_LINE_LEN: usize = 76;

/// Maximum length of a single RFC 2047 encoded word.
pub const MAX_ENCODED_WORD_LEN: usize = 75;

/// A reversible byte transform used for `Content-Transfer-Encoding`.
///
/// The default implementations are the identity transform: bytes copy through
/// unchanged and both length estimates equal the input length.
pub trait TransferCodec {
    /// Exact number of bytes [`Self::encode`] writes for `input`.
    fn encoded_len(&self, input: &[u8]) -> usize {
        input.len()
    }

    /// Safe upper bound on the bytes [`Self::decode`] writes for `input`.
    fn decoded_len(&self, input: &[u8]) -> usize {
        input.len()
    }

    /// Encodes `input` into `output`, returning the bytes written.
    fn encode(&self, input: &[u8], output: &mut [u8]) -> usize {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        n
    }

    /// Decodes `input` into `output`, returning the bytes written.
    fn decode(&self, input: &[u8], output: &mut [u8]) -> usize {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        n
    }
}

/// Pass-through codec for unknown or absent transfer encodings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl TransferCodec for Identity {}

/// Line folder for the `7bit` and `8bit` encodings.
///
/// Leaves every byte unchanged but breaks lines longer than
/// [`MAX_LINE_LEN`], preferably at the last whitespace of the overlong line,
/// otherwise at the hard limit. Decoding copies verbatim; folds inserted by the
/// encoder are legitimate line breaks in the decoded text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SevenBit;

impl SevenBit {
    /// Creates the folding codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TransferCodec for SevenBit {
    fn encoded_len(&self, input: &[u8]) -> usize {
        let mut out = 0;
        let mut line_len = 0;
        let mut space: Option<usize> = None;
        for &ch in input {
            let newline = ch == b'\r' || ch == b'\n';
            if newline {
                line_len = 0;
                space = None;
            } else {
                if line_len > 0 && crate::chars::is_space(ch) {
                    space = Some(out);
                }
                if line_len >= MAX_LINE_LEN {
                    line_len = match space {
                        Some(sp) => out - sp,
                        None => 0,
                    };
                    out += 2;
                    space = None;
                }
                line_len += 1;
            }
            out += 1;
        }
        out
    }

    fn encode(&self, input: &[u8], output: &mut [u8]) -> usize {
        let mut out = 0;
        let mut line_len = 0;
        let mut space: Option<usize> = None;
        for &ch in input {
            if out >= output.len() {
                break;
            }
            let newline = ch == b'\r' || ch == b'\n';
            if newline {
                line_len = 0;
                space = None;
            } else {
                if line_len > 0 && crate::chars::is_space(ch) {
                    space = Some(out);
                }
                // A fold is always followed by the current byte, so it only
                // fits when three more bytes do.
                if line_len >= MAX_LINE_LEN && out + 2 < output.len() {
                    match space {
                        Some(sp) => {
                            // Move the tail down two bytes so the break lands
                            // in front of the last whitespace, which becomes
                            // the leading blank of the continuation line.
                            let tail = out - sp;
                            output.copy_within(sp..out, sp + 2);
                            output[sp] = b'\r';
                            output[sp + 1] = b'\n';
                            line_len = tail;
                        }
                        None => {
                            output[out] = b'\r';
                            output[out + 1] = b'\n';
                            line_len = 0;
                        }
                    }
                    out += 2;
                    space = None;
                }
                line_len += 1;
            }
            output[out] = ch;
            out += 1;
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn run(codec: &dyn TransferCodec, input: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; codec.encoded_len(input)];
        let n = codec.encode(input, &mut out);
        assert_eq!(n, out.len(), "encoded_len must be exact");
        out
    }

    #[test]
    fn identity_copies_verbatim() {
        let codec = Identity;
        assert_eq!(run(&codec, b"hello\r\nworld"), b"hello\r\nworld");
        let mut out = [0u8; 3];
        assert_eq!(codec.decode(b"abcdef", &mut out), 3);
        assert_eq!(&out, b"abc");
    }

    #[test]
    fn seven_bit_keeps_short_lines() {
        let input = b"short line\r\nanother\r\n";
        assert_eq!(run(&SevenBit::new(), input), input);
    }

    #[test]
    fn seven_bit_folds_at_last_whitespace() {
        let mut input = vec![b'a'; 70];
        input.extend_from_slice(b" tail-of-the-line-past-the-limit");
        let out = run(&SevenBit::new(), &input);
        let fold = scan_fold(&out);
        // Break falls in front of the whitespace, keeping the word intact.
        assert_eq!(out[fold + 2], b' ');
        assert!(out[..fold].iter().all(|&b| b == b'a'));
    }

    #[test]
    fn seven_bit_hard_splits_unbreakable_line() {
        let input = vec![b'x'; 100];
        let out = run(&SevenBit::new(), &input);
        assert_eq!(out.len(), 102);
        assert_eq!(&out[MAX_LINE_LEN..MAX_LINE_LEN + 2], b"\r\n");
    }

    #[test]
    fn seven_bit_resets_at_hard_line_breaks() {
        let mut input = vec![b'a'; 60];
        input.extend_from_slice(b"\r\n");
        input.extend(vec![b'b'; 60]);
        let out = run(&SevenBit::new(), &input);
        assert_eq!(out, input, "no line reaches the limit");
    }

    fn scan_fold(data: &[u8]) -> usize {
        data.windows(2)
            .position(|w| w == b"\r\n")
            .unwrap()
    }
}
