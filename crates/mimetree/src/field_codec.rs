//! Per-field header value codecs (RFC 2047).
//!
//! A field value is encoded as a sequence of units. The policy for the field's
//! name decides where units end and where folds may be inserted; units holding
//! non-ASCII bytes become encoded words, the rest copy verbatim.

use crate::chars;
use crate::codec::{EncodedWord, WordEncoding, decode_words};

/// Unit and fold rules for a class of header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldPolicy {
    /// Free text such as `Subject`: the whole value is a single unit.
    #[default]
    Text,
    /// Address lists such as `To`: fold after `,` and `:`.
    Address,
    /// Parameterized values such as `Content-Type`: fold after `;`.
    Parameter,
}

impl FieldPolicy {
    /// Sentinel delimiter state for this policy. Text uses a byte that can
    /// never match so the scan runs to the end of the value.
    const fn initial_delimiter(self) -> u8 {
        match self {
            Self::Text => 0xff,
            Self::Address | Self::Parameter => 0,
        }
    }

    const fn is_fold_char(self, ch: u8) -> bool {
        match self {
            Self::Text => false,
            Self::Address => matches!(ch, b',' | b':'),
            Self::Parameter => ch == b';',
        }
    }
}

/// Encoder/decoder for one header field value.
///
/// [`FieldCodec::encoded_len`] is exact for [`FieldCodec::encode`]; decoding
/// never produces more bytes than its input.
#[derive(Debug, Clone)]
pub struct FieldCodec {
    policy: FieldPolicy,
    charset: String,
    default_charset: String,
    folding: bool,
}

impl FieldCodec {
    /// Creates a codec with no charset and folding disabled.
    #[must_use]
    pub fn new(policy: FieldPolicy) -> Self {
        Self {
            policy,
            charset: String::new(),
            default_charset: String::new(),
            folding: false,
        }
    }

    /// Sets the field-specific charset label.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Sets the charset used when the field carries none of its own.
    #[must_use]
    pub fn with_default_charset(mut self, charset: impl Into<String>) -> Self {
        self.default_charset = charset.into();
        self
    }

    /// Enables fold-point insertion between units.
    #[must_use]
    pub const fn with_folding(mut self, folding: bool) -> Self {
        self.folding = folding;
        self
    }

    /// Overrides the field-specific charset in place.
    pub fn set_charset(&mut self, charset: impl Into<String>) {
        self.charset = charset.into();
    }

    /// The policy this codec applies.
    #[must_use]
    pub const fn policy(&self) -> FieldPolicy {
        self.policy
    }

    fn effective_charset(&self) -> &str {
        if self.charset.is_empty() {
            &self.default_charset
        } else {
            &self.charset
        }
    }

    /// Exact number of bytes [`Self::encode`] writes for `input`.
    #[must_use]
    pub fn encoded_len(&self, input: &[u8]) -> usize {
        let charset = self.effective_charset();
        if charset.is_empty() && !self.folding {
            return input.len();
        }
        let mut out = 0;
        let mut pos = 0;
        let mut delimiter = self.policy.initial_delimiter();
        while pos < input.len() {
            let (unit_len, non_ascii) = find_unit(&input[pos..], &mut delimiter);
            let unit = &input[pos..pos + unit_len];
            if non_ascii == 0 || charset.is_empty() {
                out += unit_len;
            } else {
                let word = EncodedWord::new(WordEncoding::select(unit_len, non_ascii), charset);
                out += word.encoded_len(unit);
            }
            pos += unit_len;
            if pos < input.len() {
                let delim = input[pos];
                out += 1;
                pos += 1;
                if self.folding && self.policy.is_fold_char(delim) {
                    out += 3;
                }
            }
        }
        out
    }

    /// Encodes `input` into `output`, returning the bytes written.
    pub fn encode(&self, input: &[u8], output: &mut [u8]) -> usize {
        let charset = self.effective_charset();
        if charset.is_empty() && !self.folding {
            let n = input.len().min(output.len());
            output[..n].copy_from_slice(&input[..n]);
            return n;
        }
        let mut out = 0;
        let mut pos = 0;
        let mut delimiter = self.policy.initial_delimiter();
        while pos < input.len() {
            let (unit_len, non_ascii) = find_unit(&input[pos..], &mut delimiter);
            let unit = &input[pos..pos + unit_len];
            if non_ascii == 0 || charset.is_empty() {
                let n = unit_len.min(output.len() - out);
                output[out..out + n].copy_from_slice(&unit[..n]);
                out += n;
            } else {
                let word = EncodedWord::new(WordEncoding::select(unit_len, non_ascii), charset);
                out += word.encode(unit, &mut output[out..]);
            }
            pos += unit_len;
            if pos < input.len() {
                let delim = input[pos];
                if out < output.len() {
                    output[out] = delim;
                    out += 1;
                }
                pos += 1;
                if self.folding
                    && self.policy.is_fold_char(delim)
                    && out + 3 <= output.len()
                {
                    output[out..out + 3].copy_from_slice(b"\r\n ");
                    out += 3;
                }
            }
        }
        out
    }

    /// Unfolds `input` and decodes every encoded word in it.
    ///
    /// Returns the decoded bytes and the charset label of the first encoded
    /// word, if any.
    #[must_use]
    pub fn decode(&self, input: &[u8]) -> (Vec<u8>, Option<String>) {
        let unfolded = unfold(input);
        let mut out = vec![0u8; unfolded.len()];
        let (n, charset) = decode_words(&unfolded, &mut out);
        out.truncate(n);
        (out, charset)
    }
}

/// Scans the longest prefix belonging to one unit, updating the open
/// quote/comment/angle state in `delimiter`.
///
/// Returns the unit length and the count of non-ASCII bytes in it.
fn find_unit(data: &[u8], delimiter: &mut u8) -> (usize, usize) {
    let mut non_ascii = 0;
    for (i, &ch) in data.iter().enumerate() {
        if chars::is_non_ascii(ch) {
            non_ascii += 1;
            continue;
        }
        if ch == *delimiter {
            *delimiter = 0;
            return (i, non_ascii);
        }
        if *delimiter == 0 && chars::is_delimiter(ch) {
            match ch {
                b'"' => *delimiter = b'"',
                b'(' => *delimiter = b')',
                b'<' => *delimiter = b'>',
                _ => {}
            }
            return (i, non_ascii);
        }
    }
    (data.len(), non_ascii)
}

/// Removes RFC 822 folding: each CRLF and the run of whitespace after it
/// collapse into a single space.
fn unfold(input: &[u8]) -> Vec<u8> {
    let mut field = input.to_vec();
    while let Some(pos) = rfind_crlf(&field) {
        let mut spaces = 0;
        while pos + 2 + spaces < field.len() && chars::is_space(field[pos + 2 + spaces]) {
            spaces += 1;
        }
        field.splice(pos..pos + 2 + spaces, [b' ']);
    }
    field
}

fn rfind_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).rposition(|w| w == b"\r\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(codec: &FieldCodec, input: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; codec.encoded_len(input)];
        let n = codec.encode(input, &mut out);
        assert_eq!(n, out.len(), "encoded_len must be exact");
        out
    }

    #[test]
    fn ascii_without_charset_copies_verbatim() {
        let codec = FieldCodec::new(FieldPolicy::Text);
        assert_eq!(encode(&codec, b"Meeting today"), b"Meeting today");
    }

    #[test]
    fn text_policy_encodes_whole_value_as_one_word() {
        let codec = FieldCodec::new(FieldPolicy::Text).with_charset("utf-8");
        let out = encode(&codec, b"caf\xc3\xa9 au lait");
        assert_eq!(out, b"=?utf-8?Q?caf=C3=A9=20au=20lait?=");
    }

    #[test]
    fn address_policy_leaves_angle_addr_intact() {
        let codec = FieldCodec::new(FieldPolicy::Address).with_charset("utf-8");
        let input = b"Jane Jones <jane@whatever.com>";
        assert_eq!(encode(&codec, input), input.as_slice());
    }

    #[test]
    fn address_policy_encodes_only_non_ascii_display_name() {
        let codec = FieldCodec::new(FieldPolicy::Address).with_charset("utf-8");
        let out = encode(&codec, b"Ren\xc3\xa9e <renee@example.com>");
        assert_eq!(out, b"=?utf-8?B?UmVuw6ll?= <renee@example.com>");
    }

    #[test]
    fn address_policy_folds_after_commas() {
        let codec = FieldCodec::new(FieldPolicy::Address).with_folding(true);
        let out = encode(&codec, b"a@x.com,b@y.com");
        assert_eq!(out, b"a@x.com,\r\n b@y.com");
    }

    #[test]
    fn parameter_policy_folds_after_semicolons() {
        let codec = FieldCodec::new(FieldPolicy::Parameter).with_folding(true);
        let out = encode(&codec, b"text/plain; charset=\"us-ascii\"");
        // The fold adds its own leading blank; the input's space stays.
        assert_eq!(out, b"text/plain;\r\n  charset=\"us-ascii\"");
    }

    #[test]
    fn default_charset_applies_when_field_has_none() {
        let codec = FieldCodec::new(FieldPolicy::Text).with_default_charset("utf-8");
        let out = encode(&codec, b"\xc3\xa9");
        assert!(out.starts_with(b"=?utf-8?"));
    }

    #[test]
    fn decode_unfolds_before_decoding_words() {
        let codec = FieldCodec::new(FieldPolicy::Address);
        let (decoded, charset) = codec.decode(b"a@x.com,\r\n b@y.com");
        assert_eq!(decoded, b"a@x.com, b@y.com");
        assert_eq!(charset, None);
    }

    #[test]
    fn decode_recovers_charset_and_text() {
        let codec = FieldCodec::new(FieldPolicy::Text);
        let (decoded, charset) = codec.decode(b"=?utf-8?Q?caf=C3=A9=20au=20lait?=");
        assert_eq!(decoded, b"caf\xc3\xa9 au lait");
        assert_eq!(charset.as_deref(), Some("utf-8"));
    }

    #[test]
    fn unfold_collapses_continuation_whitespace() {
        assert_eq!(unfold(b"a\r\n\t\t b"), b"a b");
        assert_eq!(unfold(b"a\r\nb"), b"a b");
        assert_eq!(unfold(b"one line"), b"one line");
    }

    #[test]
    fn unit_scan_tracks_quoted_regions() {
        let mut delim = 0u8;
        // Opens at the quote.
        assert_eq!(find_unit(b"ab \"c d\"", &mut delim), (2, 0));
        assert_eq!(delim, 0);
        // The space is the delimiter; next call opens the quote.
        assert_eq!(find_unit(b"\"c d\"", &mut delim), (0, 0));
        assert_eq!(delim, b'"');
        // Inside the quote, the space no longer delimits.
        assert_eq!(find_unit(b"c d\"", &mut delim), (3, 0));
        assert_eq!(delim, 0);
    }
}
