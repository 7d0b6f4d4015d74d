//! # mimetree
//!
//! MIME message composition and decomposition per RFC 822 and RFC 2045-2049.
//!
//! ## Features
//!
//! - **Exact serialization**: `length()` pre-computes the byte count `store()`
//!   writes, so one allocation always suffices
//! - **Entity trees**: Recursive multipart bodies with boundary handling
//! - **Transfer codecs**: Base64, Quoted-Printable, 7bit folding, identity
//! - **Header encoding**: RFC 2047 encoded words with B/Q auto-selection
//! - **Field policies**: Structure-aware folding for address and parameter
//!   fields
//! - **Registries**: Pluggable codec, field-policy, and media-type tables
//!
//! ## Quick Start
//!
//! ### Composing a message
//!
//! ```ignore
//! use mimetree::Message;
//!
//! let mut message = Message::new();
//! message.set_date_now();
//! message.set_version();
//! message.set_from("Sara Smith <sara@whatever.com>", None);
//! message.set_to("Jane Jones <jane@whatever.com>", None);
//! message.set_subject("Meeting today", None);
//! message.set_payload("Testing ...");
//!
//! let mut wire = vec![0u8; message.length()];
//! let written = message.store(&mut wire)?;
//! assert_eq!(written, wire.len());
//! ```
//!
//! ### Parsing a message
//!
//! ```ignore
//! use mimetree::Message;
//!
//! let mut message = Message::new();
//! message.load(wire_bytes)?;
//! println!("Subject: {}", message.subject().unwrap_or_default());
//! for attachment in message.attachments() {
//!     println!("attachment: {:?}", attachment.filename());
//! }
//! ```
//!
//! ### Multipart bodies
//!
//! ```ignore
//! use mimetree::Message;
//!
//! let mut message = Message::new();
//! message.set_content_type("multipart/alternative");
//! message.set_boundary(None); // generates one
//! message.create_part("").set_payload("Testing ...");
//! let html = message.create_part("");
//! html.set_content_type("text/html");
//! html.set_payload("<p>Testing ...</p>");
//! ```
//!
//! ### Transfer codecs
//!
//! ```ignore
//! use mimetree::codec::{Base64, TransferCodec};
//!
//! let codec = Base64::new();
//! let mut out = vec![0u8; codec.encoded_len(data)];
//! let written = codec.encode(data, &mut out);
//! assert_eq!(written, out.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod codec;

mod body;
mod chars;
mod error;
mod field;
mod field_codec;
mod filetype;
mod header;
mod message;
mod registry;
mod scan;

pub use body::Body;
pub use error::{Error, Result};
pub use field::Field;
pub use field_codec::{FieldCodec, FieldPolicy};
pub use header::{Header, Media};
pub use message::Message;
pub use registry::{
    BodyFactory, CodecFactory, Registry, auto_folding, create_body, default_charset, field_codec,
    register_field_policy, register_media_type, register_transfer_codec, set_auto_folding,
    set_default_charset, transfer_codec,
};
