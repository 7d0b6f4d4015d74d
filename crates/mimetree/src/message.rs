//! The top-level message: an entity tree plus envelope conveniences.

use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Local, TimeZone};

use crate::body::Body;
use crate::error::Result;
use crate::field::Field;

const DATE_FORMAT: &str = "%a, %-d %b %Y %H:%M:%S %z";

/// A complete RFC 822 message.
///
/// Wraps the root [`Body`] and adds typed accessors for the envelope fields.
/// Dereferences to [`Body`] (and through it to the header), so the whole
/// entity API is available directly on the message.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    body: Body,
}

impl Deref for Message {
    type Target = Body;

    fn deref(&self) -> &Body {
        &self.body
    }
}

impl DerefMut for Message {
    fn deref_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Message {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The root entity.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable access to the root entity.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn text_field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.body.field(name).map(Field::value_text)
    }

    /// Sets the `From` field, optionally tagging a charset for its encoding.
    pub fn set_from(&mut self, value: impl AsRef<[u8]>, charset: Option<&str>) {
        self.body.set_field_value("From", value, charset);
    }

    /// The decoded `From` value.
    #[must_use]
    pub fn from(&self) -> Option<Cow<'_, str>> {
        self.text_field("From")
    }

    /// Sets the `To` field.
    pub fn set_to(&mut self, value: impl AsRef<[u8]>, charset: Option<&str>) {
        self.body.set_field_value("To", value, charset);
    }

    /// The decoded `To` value.
    #[must_use]
    pub fn to(&self) -> Option<Cow<'_, str>> {
        self.text_field("To")
    }

    /// Sets the `Cc` field.
    pub fn set_cc(&mut self, value: impl AsRef<[u8]>, charset: Option<&str>) {
        self.body.set_field_value("Cc", value, charset);
    }

    /// The decoded `Cc` value.
    #[must_use]
    pub fn cc(&self) -> Option<Cow<'_, str>> {
        self.text_field("Cc")
    }

    /// Sets the `Bcc` field.
    pub fn set_bcc(&mut self, value: impl AsRef<[u8]>, charset: Option<&str>) {
        self.body.set_field_value("Bcc", value, charset);
    }

    /// The decoded `Bcc` value.
    #[must_use]
    pub fn bcc(&self) -> Option<Cow<'_, str>> {
        self.text_field("Bcc")
    }

    /// Sets the `Subject` field.
    pub fn set_subject(&mut self, value: impl AsRef<[u8]>, charset: Option<&str>) {
        self.body.set_field_value("Subject", value, charset);
    }

    /// The decoded `Subject` value.
    #[must_use]
    pub fn subject(&self) -> Option<Cow<'_, str>> {
        self.text_field("Subject")
    }

    /// Sets the `Date` field in RFC 822 format.
    pub fn set_date<Tz>(&mut self, when: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let value = when.format(DATE_FORMAT).to_string();
        self.body.set_field_value("Date", value, None);
    }

    /// Stamps the `Date` field with the current local time.
    pub fn set_date_now(&mut self) {
        self.set_date(&Local::now());
    }

    /// The raw `Date` value.
    #[must_use]
    pub fn date(&self) -> Option<Cow<'_, str>> {
        self.text_field("Date")
    }

    /// Declares MIME conformance with a `MIME-Version: 1.0` field.
    pub fn set_version(&mut self) {
        self.body.set_field_value("MIME-Version", "1.0", None);
    }

    /// Exact number of bytes [`Self::store`] writes.
    #[must_use]
    pub fn length(&self) -> usize {
        self.body.length()
    }

    /// Serializes the message into `output`, returning the bytes written.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures from the entity tree.
    pub fn store(&self, output: &mut [u8]) -> Result<usize> {
        self.body.store(output)
    }

    /// Parses a message from `data`, returning the bytes consumed.
    ///
    /// # Errors
    ///
    /// Propagates parse failures from the entity tree.
    pub fn load(&mut self, data: &[u8]) -> Result<usize> {
        self.body.load(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn envelope_fields_round_trip() {
        let mut message = Message::new();
        message.set_from("alice@example.com", None);
        message.set_to("bob@example.com", None);
        message.set_subject("greetings", None);
        assert_eq!(message.from().as_deref(), Some("alice@example.com"));
        assert_eq!(message.to().as_deref(), Some("bob@example.com"));
        assert_eq!(message.subject().as_deref(), Some("greetings"));
        assert!(message.cc().is_none());
    }

    #[test]
    fn date_uses_rfc_822_format() {
        let mut message = Message::new();
        let offset = FixedOffset::east_opt(3600).unwrap();
        let when = offset.with_ymd_and_hms(2024, 1, 5, 8, 30, 0).unwrap();
        message.set_date(&when);
        assert_eq!(message.date().as_deref(), Some("Fri, 5 Jan 2024 08:30:00 +0100"));
    }

    #[test]
    fn version_field_is_fixed() {
        let mut message = Message::new();
        message.set_version();
        assert_eq!(message.field_value("MIME-Version"), Some(&b"1.0"[..]));
    }

    #[test]
    fn store_and_load_preserve_envelope() {
        let mut message = Message::new();
        message.set_from("alice@example.com", None);
        message.set_subject("hello", None);
        message.body_mut().set_payload("line one\r\nline two");

        let mut wire = vec![0u8; message.length()];
        let written = message.store(&mut wire).unwrap();
        assert_eq!(written, wire.len());

        let mut reread = Message::new();
        let consumed = reread.load(&wire).unwrap();
        assert_eq!(consumed, wire.len());
        assert_eq!(reread.from().as_deref(), Some("alice@example.com"));
        assert_eq!(reread.subject().as_deref(), Some("hello"));
        assert_eq!(reread.body().payload(), b"line one\r\nline two");
    }
}
