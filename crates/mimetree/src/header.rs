//! An ordered RFC 822 header and its typed accessors.

use std::borrow::Cow;

use rand::Rng as _;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::filetype;
use crate::scan;

/// Top-level media class of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Media {
    /// `text/*`
    Text,
    /// `image/*`
    Image,
    /// `audio/*`
    Audio,
    /// `video/*`
    Video,
    /// `application/*`
    Application,
    /// `multipart/*`
    Multipart,
    /// `message/*`
    Message,
    /// Anything else.
    Other,
}

static MEDIA_TABLE: &[(&str, Media)] = &[
    ("text", Media::Text),
    ("image", Media::Image),
    ("audio", Media::Audio),
    ("video", Media::Video),
    ("application", Media::Application),
    ("multipart", Media::Multipart),
    ("message", Media::Message),
];

/// Ordered list of header fields.
///
/// Order is preserved through parsing and serialization, duplicates included;
/// name lookups are case-insensitive and return the first match.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    fields: Vec<Field>,
}

impl Header {
    /// Creates an empty header.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// The fields in serialization order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Mutable access to the field list.
    pub fn fields_mut(&mut self) -> &mut Vec<Field> {
        &mut self.fields
    }

    /// The first field with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Mutable access to the first field with the given name.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Inserts `field`, replacing the first existing field of the same name.
    pub fn set_field(&mut self, field: Field) {
        match self.field_mut(field.name()) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Sets a field's value and charset, creating the field when missing.
    pub fn set_field_value(&mut self, name: &str, value: impl AsRef<[u8]>, charset: Option<&str>) {
        match self.field_mut(name) {
            Some(field) => {
                field.set_value(value);
                field.set_charset(charset);
            }
            None => {
                let mut field = Field::new(name);
                field.set_value(value);
                field.set_charset(charset);
                self.fields.push(field);
            }
        }
    }

    /// The raw value of the first field with the given name.
    #[must_use]
    pub fn field_value(&self, name: &str) -> Option<&[u8]> {
        self.field(name).map(Field::value)
    }

    /// Removes every field with the given name.
    pub fn remove_field(&mut self, name: &str) {
        self.fields.retain(|f| !f.name().eq_ignore_ascii_case(name));
    }

    /// Sets a parameter on an existing field; false when the field is absent.
    pub fn set_parameter(&mut self, field_name: &str, attribute: &str, value: &str) -> bool {
        match self.field_mut(field_name) {
            Some(field) => {
                field.set_parameter(attribute, value);
                true
            }
            None => false,
        }
    }

    /// Reads a parameter of the named field.
    #[must_use]
    pub fn parameter(&self, field_name: &str, attribute: &str) -> Option<String> {
        self.field(field_name)?.parameter(attribute)
    }

    /// Sets the `Content-Type` value, keeping no previous parameters.
    pub fn set_content_type(&mut self, value: &str) {
        self.set_field_value("Content-Type", value, None);
    }

    /// The raw `Content-Type` value, parameters included.
    #[must_use]
    pub fn content_type(&self) -> Option<&[u8]> {
        self.field_value("Content-Type")
    }

    /// The media class of this entity; `text` when no type is declared.
    #[must_use]
    pub fn media(&self) -> Media {
        let value = self.field("Content-Type").map_or(&b"text"[..], Field::value);
        for (prefix, media) in MEDIA_TABLE {
            let bytes = prefix.as_bytes();
            if value.len() >= bytes.len() && value[..bytes.len()].eq_ignore_ascii_case(bytes) {
                return *media;
            }
        }
        Media::Other
    }

    /// The main type, `text` when no type is declared.
    #[must_use]
    pub fn main_type(&self) -> String {
        self.field("Content-Type").map_or_else(
            || "text".to_owned(),
            |field| {
                let value = field.main_value();
                let end = scan::find_byte(value, 0, b'/').unwrap_or(value.len());
                String::from_utf8_lossy(&value[..end]).into_owned()
            },
        )
    }

    /// The subtype, `plain` when no subtype is declared.
    #[must_use]
    pub fn sub_type(&self) -> String {
        self.field("Content-Type").map_or_else(
            || "plain".to_owned(),
            |field| {
                let value = field.main_value();
                scan::find_byte(value, 0, b'/').map_or_else(
                    || "plain".to_owned(),
                    |slash| String::from_utf8_lossy(&value[slash + 1..]).into_owned(),
                )
            },
        )
    }

    /// Sets the `charset` parameter, creating a `text/plain` type if needed.
    pub fn set_charset(&mut self, charset: &str) {
        if self.field("Content-Type").is_none() {
            self.set_content_type("text/plain");
        }
        self.set_parameter("Content-Type", "charset", charset);
    }

    /// The `charset` parameter of the content type.
    #[must_use]
    pub fn charset(&self) -> Option<String> {
        self.parameter("Content-Type", "charset")
    }

    /// Sets the `name` parameter, inferring a content type from the filename
    /// extension when none is declared yet.
    pub fn set_name(&mut self, filename: &str) {
        if self.field("Content-Type").is_none() {
            self.set_content_type(filetype::content_type_for(filename));
        }
        self.set_parameter("Content-Type", "name", filename);
    }

    /// The `name` parameter of the content type.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.parameter("Content-Type", "name")
    }

    /// Sets the multipart boundary, generating a random one for `None`.
    ///
    /// A non-multipart content type is rewritten to `multipart/mixed`.
    pub fn set_boundary(&mut self, boundary: Option<&str>) {
        let value = boundary.map_or_else(generate_boundary, str::to_owned);
        if self.media() != Media::Multipart {
            self.set_content_type("multipart/mixed");
        }
        self.set_parameter("Content-Type", "boundary", &value);
    }

    /// The multipart boundary, if declared.
    #[must_use]
    pub fn boundary(&self) -> Option<String> {
        self.parameter("Content-Type", "boundary")
    }

    /// Sets the `Content-Transfer-Encoding` field.
    pub fn set_transfer_encoding(&mut self, encoding: &str) {
        self.set_field_value("Content-Transfer-Encoding", encoding, None);
    }

    /// The declared transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> Option<Cow<'_, str>> {
        self.field("Content-Transfer-Encoding").map(Field::value_text)
    }

    /// Sets the `Content-Disposition` field.
    pub fn set_disposition(&mut self, disposition: &str) {
        self.set_field_value("Content-Disposition", disposition, None);
    }

    /// The raw `Content-Disposition` value.
    #[must_use]
    pub fn disposition(&self) -> Option<Cow<'_, str>> {
        self.field("Content-Disposition").map(Field::value_text)
    }

    /// The attachment filename: the disposition's `filename` parameter,
    /// falling back to the content type's `name`.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        self.parameter("Content-Disposition", "filename")
            .or_else(|| self.name())
    }

    /// Sets the `Content-Description` field.
    pub fn set_description(&mut self, description: &str) {
        self.set_field_value("Content-Description", description, None);
    }

    /// The `Content-Description` value.
    #[must_use]
    pub fn description(&self) -> Option<Cow<'_, str>> {
        self.field("Content-Description").map(Field::value_text)
    }

    /// True when no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Removes all fields.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Exact number of bytes [`Self::store`] writes.
    #[must_use]
    pub fn length(&self) -> usize {
        self.fields.iter().map(Field::length).sum::<usize>() + 2
    }

    /// Serializes every field and the terminating blank line into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] when `output` cannot hold the header.
    pub fn store(&self, output: &mut [u8]) -> Result<usize> {
        let mut out = 0;
        for field in &self.fields {
            out += field.store(&mut output[out..])?;
        }
        if output.len() < out + 2 {
            return Err(Error::BufferTooSmall {
                needed: out + 2,
                available: output.len(),
            });
        }
        output[out..out + 2].copy_from_slice(b"\r\n");
        Ok(out + 2)
    }

    /// Parses fields from `data` until the blank line that ends the header.
    ///
    /// Returns the bytes consumed, including the blank line when present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnterminatedField`] when a field line never reaches
    /// its CRLF terminator.
    pub fn load(&mut self, data: &[u8]) -> Result<usize> {
        self.fields.clear();
        let mut input = 0;
        while input < data.len() && data[input] != b'\r' {
            let mut field = Field::new("");
            let size = field.load(&data[input..])?;
            if size == 0 {
                return Err(Error::UnterminatedField);
            }
            tracing::trace!(name = field.name(), "parsed header field");
            input += size;
            self.fields.push(field);
        }
        Ok((input + 2).min(data.len()))
    }
}

fn generate_boundary() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "==_mimepart_{:06}.{:06}",
        rng.gen_range(0..1_000_000),
        rng.gen_range(0..1_000_000)
    )
}
