//! A node in the MIME entity tree: header, payload, child parts.

use std::ops::{Deref, DerefMut};

use crate::error::{Error, Result};
use crate::header::{Header, Media};
use crate::message::Message;
use crate::registry;
use crate::scan;

/// One MIME entity.
///
/// A leaf stores its decoded payload bytes; a multipart entity stores child
/// parts and (optionally) a preamble as its payload. `Body` dereferences to
/// [`Header`], so every header accessor is available on the node itself.
///
/// Serialization is two-pass: [`Body::length`] returns exactly the bytes
/// [`Body::store`] writes for the unchanged tree, so one allocation always
/// suffices.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    header: Header,
    payload: Vec<u8>,
    parts: Vec<Body>,
}

impl Deref for Body {
    type Target = Header;

    fn deref(&self) -> &Header {
        &self.header
    }
}

impl DerefMut for Body {
    fn deref_mut(&mut self) -> &mut Header {
        &mut self.header
    }
}

impl Body {
    /// Creates an empty entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entity's header.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Mutable access to the entity's header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// The decoded payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replaces the payload bytes.
    pub fn set_payload(&mut self, data: impl AsRef<[u8]>) {
        self.payload = data.as_ref().to_vec();
    }

    /// True for `text/*` entities (including untyped ones).
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.header.media() == Media::Text
    }

    /// True for `multipart/*` entities.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.header.media() == Media::Multipart
    }

    /// True for `message/*` entities.
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.header.media() == Media::Message
    }

    /// True when the entity carries a filename, marking it an attachment.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.header.filename().is_some()
    }

    /// Stores a whole message as this entity's payload and marks the entity
    /// `message/rfc822` unless it already has a `message` type.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures from the embedded message.
    pub fn set_message(&mut self, message: &Message) -> Result<()> {
        let mut buffer = vec![0u8; message.length()];
        let written = message.store(&mut buffer)?;
        buffer.truncate(written);
        self.payload = buffer;
        if self.header.media() != Media::Message {
            self.header.set_content_type("message/rfc822");
        }
        Ok(())
    }

    /// Parses the payload back into an embedded message.
    ///
    /// # Errors
    ///
    /// Propagates parse failures from the payload bytes.
    pub fn message(&self) -> Result<Message> {
        let mut message = Message::new();
        message.load(&self.payload)?;
        Ok(message)
    }

    /// The child parts in order.
    #[must_use]
    pub fn parts(&self) -> &[Self] {
        &self.parts
    }

    /// Mutable iteration over the child parts.
    pub fn parts_mut(&mut self) -> impl Iterator<Item = &mut Self> {
        self.parts.iter_mut()
    }

    /// Appends a child part created from the registry for `media_type`
    /// (empty means `text`) and returns it for configuration.
    pub fn create_part(&mut self, media_type: &str) -> &mut Self {
        let index = self.parts.len();
        self.parts.push(registry::create_body(media_type));
        &mut self.parts[index]
    }

    /// Inserts a child part at `index` (clamped to the part count).
    pub fn insert_part(&mut self, index: usize, media_type: &str) -> &mut Self {
        let index = index.min(self.parts.len());
        self.parts.insert(index, registry::create_body(media_type));
        &mut self.parts[index]
    }

    /// Detaches and returns the child part at `index`.
    pub fn erase_part(&mut self, index: usize) -> Option<Self> {
        (index < self.parts.len()).then(|| self.parts.remove(index))
    }

    /// Every leaf entity in the tree, depth first. Multipart nodes recurse
    /// into their children and are never listed themselves.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut list = Vec::new();
        self.collect_leaves(&mut list);
        list
    }

    fn collect_leaves<'a>(&'a self, list: &mut Vec<&'a Self>) {
        if self.is_multipart() {
            for part in &self.parts {
                part.collect_leaves(list);
            }
        } else {
            list.push(self);
        }
    }

    /// Every leaf entity carrying a filename.
    #[must_use]
    pub fn attachments(&self) -> Vec<&Self> {
        self.leaves()
            .into_iter()
            .filter(|leaf| leaf.is_attachment())
            .collect()
    }

    /// Resets the entity to the empty state.
    pub fn clear(&mut self) {
        self.header.clear();
        self.payload.clear();
        self.parts.clear();
    }

    fn codec(&self) -> Box<dyn crate::codec::TransferCodec + Send> {
        registry::transfer_codec(&self.header.transfer_encoding().unwrap_or_default())
    }

    /// Whether the first child's delimiter overlaps the CRLF already ending
    /// the serialized header/payload prefix.
    fn absorbs_first_delimiter(&self) -> bool {
        if self.payload.is_empty() {
            return true;
        }
        let codec = self.codec();
        let mut buffer = vec![0u8; codec.encoded_len(&self.payload)];
        let written = codec.encode(&self.payload, &mut buffer);
        written >= 2 && buffer[written - 2..written] == *b"\r\n"
    }

    /// Exact number of bytes [`Self::store`] writes.
    #[must_use]
    pub fn length(&self) -> usize {
        let mut length = self.header.length();
        length += self.codec().encoded_len(&self.payload);
        if self.parts.is_empty() {
            return length;
        }
        let boundary_len = self.header.boundary().map_or(0, |b| b.len());
        for part in &self.parts {
            length += boundary_len + 6 + part.length();
        }
        length += boundary_len + 8;
        if self.absorbs_first_delimiter() {
            length -= 2;
        }
        length
    }

    /// Serializes the entity (and its subtree) into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] when `output` cannot hold the
    /// serialized entity, and [`Error::MissingBoundary`] when a part-bearing
    /// entity declares no boundary.
    pub fn store(&self, output: &mut [u8]) -> Result<usize> {
        let mut out = self.header.store(output)?;
        let codec = self.codec();
        let encoded = codec.encoded_len(&self.payload);
        if output.len() - out < encoded {
            return Err(Error::BufferTooSmall {
                needed: out + encoded,
                available: output.len(),
            });
        }
        out += codec.encode(&self.payload, &mut output[out..]);
        if self.parts.is_empty() {
            return Ok(out);
        }
        let boundary = self.header.boundary().ok_or(Error::MissingBoundary)?;
        let delimiter = format!("\r\n--{boundary}\r\n");
        for (index, part) in self.parts.iter().enumerate() {
            if index == 0 && out >= 2 && output[out - 2..out] == *b"\r\n" {
                out -= 2;
            }
            if output.len() - out < delimiter.len() {
                return Err(Error::BufferTooSmall {
                    needed: out + delimiter.len(),
                    available: output.len(),
                });
            }
            output[out..out + delimiter.len()].copy_from_slice(delimiter.as_bytes());
            out += delimiter.len();
            out += part.store(&mut output[out..])?;
        }
        let closing = format!("\r\n--{boundary}--\r\n");
        if output.len() - out < closing.len() {
            return Err(Error::BufferTooSmall {
                needed: out + closing.len(),
                available: output.len(),
            });
        }
        output[out..out + closing.len()].copy_from_slice(closing.as_bytes());
        Ok(out + closing.len())
    }

    /// Parses an entity from `data`: header, decoded payload, and, for
    /// multipart entities, each child region between boundary lines.
    ///
    /// Returns the bytes consumed. Children parsed before a failing sibling
    /// remain attached.
    ///
    /// # Errors
    ///
    /// Propagates header parse failures from this entity or any child.
    pub fn load(&mut self, data: &[u8]) -> Result<usize> {
        let header_size = self.header.load(data)?;
        self.payload.clear();
        self.parts.clear();
        let mut pos = header_size;

        let mut payload_end = data.len();
        if self.header.media() == Media::Multipart {
            if let Some(boundary) = self.header.boundary() {
                let needle = format!("\r\n--{boundary}");
                payload_end = scan::find(data, pos.saturating_sub(2), needle.as_bytes())
                    .map_or(data.len(), |p| p + 2);
            }
        }
        let region = &data[pos..payload_end.max(pos)];
        if !region.is_empty() {
            let codec = self.codec();
            let mut buffer = vec![0u8; codec.decoded_len(region)];
            let written = codec.decode(region, &mut buffer);
            buffer.truncate(written);
            self.payload = buffer;
            pos = payload_end;
        }
        if pos >= data.len() {
            return Ok(data.len().min(pos));
        }

        let Some(boundary) = self.header.boundary() else {
            return Ok(pos);
        };
        let needle = format!("\r\n--{boundary}");
        let mut bound = scan::find(data, pos.saturating_sub(2), needle.as_bytes());
        while let Some(b1) = bound {
            // End of the boundary line; a boundary without one is truncated.
            let Some(line_break) = scan::find_crlf(data, b1 + 2) else {
                break;
            };
            let start = line_break + 2;
            let marker = b1 + needle.len();
            if data.len() >= marker + 2 && data[marker..marker + 2] == *b"--" {
                // Terminal boundary.
                return Ok(start);
            }
            let next = scan::find(data, start, needle.as_bytes());
            let region = &data[start..next.unwrap_or(data.len())];
            let mut probe = Header::new();
            let _ = probe.load(region);
            let mut child = registry::create_body(&probe.main_type());
            child.load(region)?;
            tracing::debug!(
                media_type = probe.main_type(),
                bytes = region.len(),
                "parsed multipart child"
            );
            self.parts.push(child);
            bound = next;
        }
        Ok(data.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store(body: &Body) -> Vec<u8> {
        let mut out = vec![0u8; body.length()];
        let n = body.store(&mut out).unwrap();
        assert_eq!(n, out.len(), "length must be exact");
        out
    }

    fn load(data: &[u8]) -> Body {
        let mut body = Body::new();
        let n = body.load(data).unwrap();
        assert_eq!(n, data.len());
        body
    }

    #[test]
    fn leaf_stores_header_then_payload() {
        let mut body = Body::new();
        body.set_content_type("text/plain");
        body.set_payload("Hello");
        assert_eq!(store(&body), b"Content-Type: text/plain\r\n\r\nHello");
    }

    #[test]
    fn leaf_payload_is_transfer_encoded() {
        let mut body = Body::new();
        body.set_transfer_encoding("base64");
        body.set_payload("foobar");
        let out = store(&body);
        assert_eq!(
            out,
            b"Content-Transfer-Encoding: base64\r\n\r\nZm9vYmFy\r\n"
        );
        let reread = load(&out);
        assert_eq!(reread.payload(), b"foobar");
    }

    #[test]
    fn multipart_wire_format_is_exact() {
        let mut body = Body::new();
        body.set_boundary(Some("b"));
        body.create_part("").set_payload("one");
        body.create_part("").set_payload("two");
        let expected: &[u8] = b"Content-Type: multipart/mixed; boundary=\"b\"\r\n\
            \r\n--b\r\n\
            \r\none\
            \r\n--b\r\n\
            \r\ntwo\
            \r\n--b--\r\n";
        assert_eq!(store(&body), expected);
    }

    #[test]
    fn multipart_round_trips() {
        let mut body = Body::new();
        body.set_boundary(Some("outer"));
        let part = body.create_part("");
        part.set_content_type("text/plain");
        part.set_payload("first part");
        let html = body.create_part("");
        html.set_content_type("text/html");
        html.set_payload("<p>second</p>");
        let wire = store(&body);

        let reread = load(&wire);
        assert_eq!(reread.parts().len(), 2);
        assert_eq!(reread.parts()[0].payload(), b"first part");
        assert_eq!(reread.parts()[1].payload(), b"<p>second</p>");
        assert_eq!(store(&reread), wire);
    }

    #[test]
    fn nested_multipart_round_trips() {
        let mut body = Body::new();
        body.set_boundary(Some("outer"));
        let alt = body.create_part("multipart");
        alt.set_boundary(Some("inner"));
        alt.create_part("").set_payload("plain");
        alt.create_part("").set_payload("rich");
        body.create_part("").set_payload("tail");
        let wire = store(&body);

        let reread = load(&wire);
        assert_eq!(reread.parts().len(), 2);
        assert_eq!(reread.parts()[0].parts().len(), 2);
        assert_eq!(reread.parts()[0].parts()[1].payload(), b"rich");
        assert_eq!(reread.parts()[1].payload(), b"tail");
        assert_eq!(store(&reread), wire);
    }

    #[test]
    fn preamble_before_first_boundary_becomes_payload() {
        let wire = b"Content-Type: multipart/mixed; boundary=\"b\"\r\n\r\n\
            This is the preamble.\
            \r\n--b\r\n\
            \r\npart\
            \r\n--b--\r\n";
        let mut body = Body::new();
        body.load(wire).unwrap();
        // The preamble region runs to the first delimiter's CRLF inclusive,
        // so storing the reloaded tree reproduces the input bytes.
        assert_eq!(body.payload(), b"This is the preamble.\r\n");
        assert_eq!(body.parts().len(), 1);
        assert_eq!(body.parts()[0].payload(), b"part");
    }

    #[test]
    fn missing_terminal_boundary_consumes_all_input() {
        let wire = b"Content-Type: multipart/mixed; boundary=\"b\"\r\n\r\n\
            \r\n--b\r\n\
            \r\nonly part";
        let mut body = Body::new();
        let n = body.load(wire).unwrap();
        assert_eq!(n, wire.len());
        assert_eq!(body.parts().len(), 1);
        assert_eq!(body.parts()[0].payload(), b"only part");
    }

    #[test]
    fn store_without_boundary_fails() {
        let mut body = Body::new();
        body.set_content_type("multipart/mixed");
        body.create_part("");
        let mut out = vec![0u8; 256];
        assert!(matches!(
            body.store(&mut out),
            Err(Error::MissingBoundary)
        ));
    }

    #[test]
    fn insert_and_erase_parts() {
        let mut body = Body::new();
        body.set_boundary(Some("b"));
        body.create_part("").set_payload("second");
        body.insert_part(0, "").set_payload("first");
        assert_eq!(body.parts()[0].payload(), b"first");
        let removed = body.erase_part(1).unwrap();
        assert_eq!(removed.payload(), b"second");
        assert_eq!(body.parts().len(), 1);
        assert!(body.erase_part(5).is_none());
    }

    #[test]
    fn attachments_are_found_recursively() {
        let mut body = Body::new();
        body.set_boundary(Some("b"));
        body.create_part("").set_payload("text");
        let attachment = body.create_part("");
        attachment.set_name("report.pdf");
        attachment.set_payload("%PDF-");
        assert_eq!(body.attachments().len(), 1);
        assert_eq!(
            body.attachments()[0].filename().as_deref(),
            Some("report.pdf")
        );
        assert!(!body.is_attachment());
    }

    #[test]
    fn terminal_boundary_without_parts_parses_empty() {
        let wire = b"Content-Type: multipart/mixed; boundary=\"b\"\r\n\
            \r\n--b--\r\n";
        let mut body = Body::new();
        let n = body.load(wire).unwrap();
        assert_eq!(n, wire.len());
        assert!(body.parts().is_empty());
        assert!(body.payload().is_empty());
    }

    #[test]
    fn leaf_listing_skips_multipart_nodes() {
        let mut body = Body::new();
        body.set_boundary(Some("outer"));
        let alt = body.create_part("multipart");
        alt.set_boundary(Some("inner"));
        alt.set_disposition("attachment; filename=\"inner.eml\"");
        alt.create_part("").set_payload("plain");
        body.create_part("").set_payload("tail");

        let leaves = body.leaves();
        assert_eq!(leaves.len(), 2);
        assert!(leaves.iter().all(|leaf| !leaf.is_multipart()));
        assert_eq!(leaves[0].payload(), b"plain");
        assert_eq!(leaves[1].payload(), b"tail");
        // The filename sits on an interior multipart node, so nothing in the
        // tree counts as an attachment.
        assert!(body.attachments().is_empty());
    }

    #[test]
    fn embedded_message_round_trips() {
        let mut inner = Message::new();
        inner.set_subject("inner", None);
        inner.body_mut().set_payload("nested text");

        let mut body = Body::new();
        body.set_message(&inner).unwrap();
        assert!(body.is_message());
        assert_eq!(body.content_type(), Some(&b"message/rfc822"[..]));

        let reread = body.message().unwrap();
        assert_eq!(reread.subject().as_deref(), Some("inner"));
        assert_eq!(reread.body().payload(), b"nested text");
    }
}
