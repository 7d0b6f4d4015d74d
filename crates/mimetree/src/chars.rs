//! RFC 822 byte classification.
//!
//! Every classification applies to the 7-bit US-ASCII range only; bytes with
//! the high bit set belong to no class except [`is_non_ascii`].

const CONTROL: u8 = 0x01;
const SPACE: u8 = 0x02;
const PRINT: u8 = 0x04;
const PUNCT: u8 = 0x10;
const SPECIAL: u8 = 0x20;
const HEXDIGIT: u8 = 0x40;

const TABLE: [u8; 128] = build_table();

const fn classify(b: u8) -> u8 {
    match b {
        b'\t' | b'\n' | 0x0b | 0x0c | b'\r' => CONTROL | SPACE,
        0x00..=0x08 | 0x0e..=0x1f | 0x7f => CONTROL,
        b' ' => SPACE,
        b'0'..=b'9' | b'A'..=b'F' => PRINT | HEXDIGIT,
        b'G'..=b'Z' | b'a'..=b'z' => PRINT,
        b'"' | b'(' | b')' | b',' | b'.' | b':' | b';' | b'<' | b'=' | b'>' | b'@' | b'['
        | b'\\' | b']' => PUNCT | SPECIAL,
        _ => PUNCT,
    }
}

const fn build_table() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = classify(i as u8);
        i += 1;
    }
    table
}

const fn has(b: u8, flag: u8) -> bool {
    !is_non_ascii(b) && TABLE[b as usize] & flag != 0
}

/// Byte with the high bit set.
#[must_use]
pub const fn is_non_ascii(b: u8) -> bool {
    b & 0x80 != 0
}

/// ASCII control character (0x00-0x1F and DEL).
#[must_use]
pub const fn is_control(b: u8) -> bool {
    has(b, CONTROL)
}

/// Whitespace: HT, LF, VT, FF, CR, SP.
#[must_use]
pub const fn is_space(b: u8) -> bool {
    has(b, SPACE)
}

/// Alphanumeric character.
#[must_use]
pub const fn is_printable(b: u8) -> bool {
    has(b, PRINT)
}

/// Visible punctuation character.
#[must_use]
pub const fn is_punct(b: u8) -> bool {
    has(b, PUNCT)
}

/// RFC 822 special: `" ( ) , . : ; < = > @ [ \ ]`.
#[must_use]
pub const fn is_special(b: u8) -> bool {
    has(b, SPECIAL)
}

/// Uppercase hexadecimal digit.
#[must_use]
pub const fn is_hex_digit(b: u8) -> bool {
    has(b, HEXDIGIT)
}

/// Character that ends an encoding unit: whitespace or a special.
#[must_use]
pub const fn is_delimiter(b: u8) -> bool {
    is_space(b) || is_special(b)
}

/// Character that may appear in an RFC 2045 token.
#[must_use]
pub const fn is_token(b: u8) -> bool {
    is_non_ascii(b) || (b > b' ' && !is_special(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_class_covers_folding_whitespace() {
        for b in [b'\t', b'\n', 0x0b, 0x0c, b'\r', b' '] {
            assert!(is_space(b), "{b:#04x} should be whitespace");
        }
        assert!(!is_space(b'a'));
        assert!(!is_space(0xa0));
    }

    #[test]
    fn controls_exclude_space() {
        assert!(is_control(0x00));
        assert!(is_control(b'\r'));
        assert!(is_control(0x7f));
        assert!(!is_control(b' '));
        assert!(!is_control(b'A'));
    }

    #[test]
    fn hex_digits_are_uppercase_only() {
        for b in b"0123456789ABCDEF" {
            assert!(is_hex_digit(*b));
        }
        assert!(!is_hex_digit(b'a'));
        assert!(!is_hex_digit(b'G'));
    }

    #[test]
    fn specials_match_rfc_822() {
        for b in br#""(),.:;<=>@[\]"# {
            assert!(is_special(*b), "{} should be a special", *b as char);
        }
        assert!(!is_special(b'!'));
        assert!(!is_special(b'-'));
        assert!(!is_special(b'/'));
    }

    #[test]
    fn token_chars_allow_punctuation_but_not_specials() {
        assert!(is_token(b'a'));
        assert!(is_token(b'-'));
        assert!(is_token(b'/'));
        assert!(is_token(0xe9));
        assert!(!is_token(b' '));
        assert!(!is_token(b'='));
        assert!(!is_token(b'"'));
    }

    #[test]
    fn delimiters_are_spaces_and_specials() {
        assert!(is_delimiter(b' '));
        assert!(is_delimiter(b'<'));
        assert!(!is_delimiter(b'w'));
        assert!(!is_delimiter(b'!'));
    }
}
