//! A single header field: name, raw value, optional charset.

use std::borrow::Cow;

use crate::chars;
use crate::error::{Error, Result};
use crate::registry;
use crate::scan;

/// One `Name: value` header field.
///
/// The value is kept as raw bytes in its decoded form; the charset label (when
/// present) names the character set of those bytes but is never used to
/// convert them. Serialization applies the field codec registered for the
/// field's name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    name: String,
    value: Vec<u8>,
    charset: Option<String>,
}

impl Field {
    /// Creates an empty field with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Vec::new(),
            charset: None,
        }
    }

    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the field.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The raw decoded value bytes.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The value as text, replacing bytes invalid in UTF-8.
    #[must_use]
    pub fn value_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    /// Replaces the value bytes.
    pub fn set_value(&mut self, value: impl AsRef<[u8]>) {
        self.value = value.as_ref().to_vec();
    }

    /// The charset label of the value, if any.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Sets or clears the charset label.
    pub fn set_charset(&mut self, charset: Option<&str>) {
        self.charset = charset.map(str::to_owned);
    }

    /// The value up to its first `;`, with trailing whitespace trimmed; the
    /// whole value when it has no parameters.
    #[must_use]
    pub fn main_value(&self) -> &[u8] {
        let end = scan::find_byte(&self.value, 0, b';').unwrap_or(self.value.len());
        let mut end = end;
        while end > 0 && chars::is_space(self.value[end - 1]) {
            end -= 1;
        }
        &self.value[..end]
    }

    /// Looks up a parameter value by attribute name, without quotes.
    #[must_use]
    pub fn parameter(&self, attribute: &str) -> Option<String> {
        let (pos, len) = self.find_parameter(attribute)?;
        let mut raw = &self.value[pos..pos + len];
        if raw.first() == Some(&b'"') {
            raw = &raw[1..];
        }
        if raw.last() == Some(&b'"') {
            raw = &raw[..raw.len() - 1];
        }
        Some(String::from_utf8_lossy(raw).into_owned())
    }

    /// Sets a parameter, quoting the value and replacing any existing one.
    pub fn set_parameter(&mut self, attribute: &str, value: &str) {
        let mut quoted = Vec::with_capacity(value.len() + 2);
        if !value.starts_with('"') {
            quoted.push(b'"');
        }
        quoted.extend_from_slice(value.as_bytes());
        if value.len() < 2 || !value.ends_with('"') {
            quoted.push(b'"');
        }
        match self.find_parameter(attribute) {
            Some((pos, len)) => {
                self.value.splice(pos..pos + len, quoted);
            }
            None => {
                self.value.extend_from_slice(b"; ");
                self.value.extend_from_slice(attribute.as_bytes());
                self.value.push(b'=');
                self.value.extend_from_slice(&quoted);
            }
        }
    }

    /// Finds the `(offset, len)` of a parameter's raw value, quotes included.
    fn find_parameter(&self, attribute: &str) -> Option<(usize, usize)> {
        let v = &self.value;
        let attr = attribute.as_bytes();
        let mut i = scan::find_byte(v, 0, b';')?;
        while i < v.len() {
            while i < v.len() && (chars::is_space(v[i]) || v[i] == b';') {
                i += 1;
            }
            let name_start = i;
            let eq = scan::find_byte(v, i, b'=')?;
            i = eq + 1;
            let val_start = i;
            let val_end = if v.get(val_start) == Some(&b'"') {
                match scan::find_byte(v, val_start + 1, b'"') {
                    Some(close) => close + 1,
                    None => {
                        let mut e = val_start;
                        while e < v.len() && chars::is_token(v[e]) {
                            e += 1;
                        }
                        e
                    }
                }
            } else {
                let mut e = val_start;
                while e < v.len() && chars::is_token(v[e]) {
                    e += 1;
                }
                e
            };
            let boundary = name_start + attr.len();
            if boundary < v.len()
                && v[name_start..boundary].eq_ignore_ascii_case(attr)
                && (chars::is_space(v[boundary]) || v[boundary] == b'=')
            {
                return Some((val_start, val_end - val_start));
            }
            i = val_end;
        }
        None
    }

    /// Resets the field to an empty unnamed state.
    pub fn clear(&mut self) {
        self.name.clear();
        self.value.clear();
        self.charset = None;
    }

    fn codec(&self) -> crate::field_codec::FieldCodec {
        let mut codec = registry::field_codec(&self.name);
        if let Some(charset) = &self.charset {
            codec.set_charset(charset.clone());
        }
        codec
    }

    /// Exact number of bytes [`Self::store`] writes.
    #[must_use]
    pub fn length(&self) -> usize {
        self.name.len() + 4 + self.codec().encoded_len(&self.value)
    }

    /// Serializes `Name: encoded-value CRLF` into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] when `output` cannot hold the whole
    /// field line.
    pub fn store(&self, output: &mut [u8]) -> Result<usize> {
        let codec = self.codec();
        let encoded = codec.encoded_len(&self.value);
        let needed = self.name.len() + 4 + encoded;
        if output.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                available: output.len(),
            });
        }
        let name = self.name.as_bytes();
        output[..name.len()].copy_from_slice(name);
        output[name.len()..name.len() + 2].copy_from_slice(b": ");
        let start = name.len() + 2;
        let written = codec.encode(&self.value, &mut output[start..start + encoded]);
        output[start + written..start + written + 2].copy_from_slice(b"\r\n");
        Ok(start + written + 2)
    }

    /// Parses one field line (with any folded continuations) from `data`.
    ///
    /// Returns the bytes consumed from the start of `data`, or `Ok(0)` when
    /// `data` begins with the header-terminating blank line or holds no
    /// complete field line.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` keeps the signature uniform with
    /// the other deserializers.
    pub fn load(&mut self, data: &[u8]) -> Result<usize> {
        self.clear();
        let mut start = 0;
        while start < data.len() && chars::is_space(data[start]) {
            if data[start] == b'\r' {
                return Ok(0);
            }
            match scan::find_crlf(data, start) {
                Some(p) => start = p + 2,
                None => return Ok(0),
            }
        }
        if start >= data.len() {
            return Ok(0);
        }
        let mut colon = start;
        while colon < data.len()
            && data[colon] != b':'
            && data[colon] != b'\r'
            && data[colon] != b'\n'
        {
            colon += 1;
        }
        let mut value_start = start;
        if colon < data.len() && data[colon] == b':' {
            self.name = String::from_utf8_lossy(&data[start..colon]).into_owned();
            value_start = colon + 1;
        }
        while value_start < data.len() && (data[value_start] == b' ' || data[value_start] == b'\t')
        {
            value_start += 1;
        }
        let mut cursor = value_start;
        let value_end;
        loop {
            match scan::find_crlf(data, cursor) {
                Some(p) => {
                    cursor = p + 2;
                    if cursor >= data.len() || (data[cursor] != b' ' && data[cursor] != b'\t') {
                        value_end = p;
                        break;
                    }
                }
                None => return Ok(0),
            }
        }
        let (value, charset) = self.codec().decode(&data[value_start..value_end]);
        self.value = value;
        self.charset = charset;
        Ok(cursor)
    }
}
