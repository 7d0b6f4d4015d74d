//! Registries binding names to codecs, field policies, and media types.
//!
//! A [`Registry`] owns three ordered name tables: transfer-encoding names to
//! codec factories, header-field names to [`FieldPolicy`] values, and media
//! type names to body factories. Registration prepends, so a later entry
//! shadows an earlier one of the same name; deregistering removes the name
//! entirely. Lookups never fail: unknown transfer encodings resolve to the
//! identity codec, unknown field names to the Text policy, and unknown media
//! types to a plain body node.
//!
//! The process-wide registry behind the module-level functions is what the
//! header and body types consult; it is guarded by an `RwLock` so lookups on
//! different trees proceed concurrently.

use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::body::Body;
use crate::codec::{Base64, Identity, QuotedPrintable, SevenBit, TransferCodec};
use crate::field_codec::{FieldCodec, FieldPolicy};

/// Factory producing a boxed transfer codec.
pub type CodecFactory = fn() -> Box<dyn TransferCodec + Send>;

/// Factory producing a body node for a media type.
pub type BodyFactory = fn() -> Body;

fn make_quoted_printable() -> Box<dyn TransferCodec + Send> {
    Box::new(QuotedPrintable::new())
}

fn make_base64() -> Box<dyn TransferCodec + Send> {
    Box::new(Base64::new())
}

fn make_seven_bit() -> Box<dyn TransferCodec + Send> {
    Box::new(SevenBit::new())
}

/// Name tables and cross-cutting encoding settings.
#[derive(Debug, Clone)]
pub struct Registry {
    codecs: Vec<(String, CodecFactory)>,
    policies: Vec<(String, FieldPolicy)>,
    media_types: Vec<(String, BodyFactory)>,
    default_charset: String,
    auto_folding: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry with the standard codec and policy bindings.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            codecs: Vec::new(),
            policies: Vec::new(),
            media_types: Vec::new(),
            default_charset: String::new(),
            auto_folding: false,
        };
        registry.register_transfer_codec("quoted-printable", Some(make_quoted_printable));
        registry.register_transfer_codec("base64", Some(make_base64));
        for name in ["Subject", "Comments", "Content-Description"] {
            registry.register_field_policy(name, Some(FieldPolicy::Text));
        }
        for name in [
            "From",
            "To",
            "Resent-To",
            "Cc",
            "Resent-Cc",
            "Bcc",
            "Resent-Bcc",
            "Reply-To",
            "Resent-Reply-To",
        ] {
            registry.register_field_policy(name, Some(FieldPolicy::Address));
        }
        for name in ["Content-Type", "Content-Disposition"] {
            registry.register_field_policy(name, Some(FieldPolicy::Parameter));
        }
        registry
    }

    /// Binds (or with `None`, unbinds) a transfer-encoding name.
    pub fn register_transfer_codec(&mut self, name: &str, factory: Option<CodecFactory>) {
        self.codecs.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        if let Some(factory) = factory {
            self.codecs.insert(0, (name.to_owned(), factory));
        }
    }

    /// Binds (or with `None`, unbinds) a header-field name to a policy.
    pub fn register_field_policy(&mut self, name: &str, policy: Option<FieldPolicy>) {
        self.policies.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        if let Some(policy) = policy {
            self.policies.insert(0, (name.to_owned(), policy));
        }
    }

    /// Binds (or with `None`, unbinds) a media type to a body factory.
    pub fn register_media_type(&mut self, name: &str, factory: Option<BodyFactory>) {
        self.media_types.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        if let Some(factory) = factory {
            self.media_types.insert(0, (name.to_owned(), factory));
        }
    }

    /// Resolves a `Content-Transfer-Encoding` name to a codec.
    ///
    /// An empty name means `7bit`; unknown names get the identity codec.
    #[must_use]
    pub fn transfer_codec(&self, name: &str) -> Box<dyn TransferCodec + Send> {
        let name = if name.is_empty() { "7bit" } else { name };
        self.codecs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map_or_else(|| Box::new(Identity) as Box<dyn TransferCodec + Send>, |(_, f)| f())
    }

    /// Builds the value codec for a header field, applying the field's policy
    /// and the registry's charset and folding settings.
    #[must_use]
    pub fn field_codec(&self, name: &str) -> FieldCodec {
        let policy = self
            .policies
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map_or(FieldPolicy::Text, |&(_, p)| p);
        FieldCodec::new(policy)
            .with_default_charset(self.default_charset.clone())
            .with_folding(self.auto_folding)
    }

    /// Creates a body node for a media type; empty means `text`.
    #[must_use]
    pub fn create_body(&self, media_type: &str) -> Body {
        let media_type = if media_type.is_empty() { "text" } else { media_type };
        self.media_types
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(media_type))
            .map_or_else(Body::new, |(_, f)| f())
    }

    /// Enables or disables automatic line folding.
    ///
    /// Enabling installs the folding codec for `7bit` and `8bit`; disabling
    /// removes those bindings, so unnamed encodings fall back to identity.
    pub fn set_auto_folding(&mut self, enabled: bool) {
        let factory = enabled.then_some(make_seven_bit as CodecFactory);
        self.register_transfer_codec("7bit", factory);
        self.register_transfer_codec("8bit", factory);
        self.auto_folding = enabled;
    }

    /// Whether automatic line folding is enabled.
    #[must_use]
    pub const fn auto_folding(&self) -> bool {
        self.auto_folding
    }

    /// Sets the charset applied to fields that carry none of their own.
    pub fn set_default_charset(&mut self, charset: impl Into<String>) {
        self.default_charset = charset.into();
    }

    /// The charset applied to fields that carry none of their own.
    #[must_use]
    pub fn default_charset(&self) -> &str {
        &self.default_charset
    }
}

static GLOBAL: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

fn read() -> RwLockReadGuard<'static, Registry> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Registry> {
    GLOBAL.write().unwrap_or_else(PoisonError::into_inner)
}

/// Resolves a transfer-encoding name against the process-wide registry.
#[must_use]
pub fn transfer_codec(name: &str) -> Box<dyn TransferCodec + Send> {
    read().transfer_codec(name)
}

/// Builds a field codec from the process-wide registry.
#[must_use]
pub fn field_codec(name: &str) -> FieldCodec {
    read().field_codec(name)
}

/// Creates a body node from the process-wide registry.
#[must_use]
pub fn create_body(media_type: &str) -> Body {
    read().create_body(media_type)
}

/// Binds a transfer-encoding name in the process-wide registry.
pub fn register_transfer_codec(name: &str, factory: Option<CodecFactory>) {
    write().register_transfer_codec(name, factory);
}

/// Binds a field policy in the process-wide registry.
pub fn register_field_policy(name: &str, policy: Option<FieldPolicy>) {
    write().register_field_policy(name, policy);
}

/// Binds a media type in the process-wide registry.
pub fn register_media_type(name: &str, factory: Option<BodyFactory>) {
    write().register_media_type(name, factory);
}

/// Enables or disables automatic line folding process-wide.
pub fn set_auto_folding(enabled: bool) {
    write().set_auto_folding(enabled);
}

/// Whether automatic line folding is enabled process-wide.
#[must_use]
pub fn auto_folding() -> bool {
    read().auto_folding()
}

/// Sets the process-wide default charset.
pub fn set_default_charset(charset: impl Into<String>) {
    write().set_default_charset(charset);
}

/// The process-wide default charset.
#[must_use]
pub fn default_charset() -> String {
    read().default_charset().to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn standard_codecs_resolve() {
        let registry = Registry::new();
        // Quoted-printable expands unsafe bytes; identity would not.
        assert_eq!(registry.transfer_codec("quoted-printable").encoded_len(b"\xff"), 3);
        assert_eq!(registry.transfer_codec("BASE64").encoded_len(b"ab"), 6);
    }

    #[test]
    fn unknown_codec_falls_back_to_identity() {
        let registry = Registry::new();
        assert_eq!(registry.transfer_codec("x-unknown").encoded_len(b"\xff\xff"), 2);
    }

    #[test]
    fn empty_name_means_seven_bit_when_folding() {
        let mut registry = Registry::new();
        let long = vec![b'x'; 100];
        assert_eq!(registry.transfer_codec("").encoded_len(&long), 100);
        registry.set_auto_folding(true);
        assert_eq!(registry.transfer_codec("").encoded_len(&long), 102);
        assert_eq!(registry.transfer_codec("8bit").encoded_len(&long), 102);
        registry.set_auto_folding(false);
        assert_eq!(registry.transfer_codec("8bit").encoded_len(&long), 100);
    }

    #[test]
    fn reregistration_shadows_and_none_unbinds() {
        let mut registry = Registry::new();
        registry.register_transfer_codec("base64", Some(|| Box::new(Identity)));
        assert_eq!(registry.transfer_codec("base64").encoded_len(b"ab"), 2);
        registry.register_transfer_codec("base64", None);
        // Unbound entirely, so lookups fall back to identity.
        assert_eq!(registry.transfer_codec("base64").encoded_len(b"ab"), 2);
    }

    #[test]
    fn field_policies_match_field_class() {
        let registry = Registry::new();
        assert_eq!(registry.field_codec("To").policy(), FieldPolicy::Address);
        assert_eq!(registry.field_codec("subject").policy(), FieldPolicy::Text);
        assert_eq!(
            registry.field_codec("Content-Type").policy(),
            FieldPolicy::Parameter
        );
        assert_eq!(registry.field_codec("X-Custom").policy(), FieldPolicy::Text);
    }

    #[test]
    fn field_codec_inherits_charset_and_folding() {
        let mut registry = Registry::new();
        registry.set_default_charset("utf-8");
        registry.set_auto_folding(true);
        let codec = registry.field_codec("Subject");
        let mut out = vec![0u8; codec.encoded_len(b"\xc3\xa9")];
        codec.encode(b"\xc3\xa9", &mut out);
        assert!(out.starts_with(b"=?utf-8?"));
    }

    #[test]
    fn unknown_media_type_creates_plain_body() {
        let registry = Registry::new();
        let body = registry.create_body("application");
        assert!(body.parts().is_empty());
    }
}
