//! # Core Stanza Types
//!
//! Defines the opaque message value exchanged with the transport.
//!
//! ## Entities
//!
//! - [`Stanza`]: One wire message (element name, namespace, routing hint,
//!   serialized body, attribute list)
//! - [`Attribute`]: A named attribute on a stanza, optionally namespaced
//! - [`StanzaKind`]: Informational classification of a stanza
//!
//! The correlation client treats the body as opaque; the only attribute it
//! ever reads or writes is [`ID_ATTRIBUTE`].

use serde::{Deserialize, Serialize};

/// Name of the attribute carrying the correlation identifier.
///
/// An outgoing request is stamped with a generated identifier under this
/// attribute; the remote peer echoes it on the reply so the dispatcher can
/// match the reply to its pending callback.
pub const ID_ATTRIBUTE: &str = "id";

/// A named attribute on a stanza.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Optional attribute namespace.
    pub namespace: Option<String>,
    /// Attribute value.
    pub value: String,
}

impl Attribute {
    /// Creates a new attribute without a namespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            value: value.into(),
        }
    }

    /// Creates a new namespaced attribute.
    pub fn with_namespace(
        name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            value: value.into(),
        }
    }
}

/// Informational classification of a stanza.
///
/// The classification is derived from the element name and is used for
/// logging and filtering only. Reply correlation is identical across kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StanzaKind {
    /// Request/response style exchange; a reply with the same id is expected.
    Iq,
    /// One-way notification.
    Message,
    /// Presence/status update.
    Presence,
}

impl StanzaKind {
    /// Classify a stanza kind from its element name.
    ///
    /// Unknown element names classify as [`StanzaKind::Message`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "iq" => Self::Iq,
            "presence" => Self::Presence,
            _ => Self::Message,
        }
    }

    /// The canonical element name for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iq => "iq",
            Self::Message => "message",
            Self::Presence => "presence",
        }
    }
}

/// One wire message.
///
/// # Fields
///
/// - `name`: Element name (`iq`, `message`, `presence`, ...)
/// - `namespace`: Element namespace
/// - `via`: Optional routing hint (account or connection the transport
///   should use); `None` lets the transport pick
/// - `payload`: Serialized stanza body, produced by the external codec
/// - `attributes`: Attribute list; the client only touches [`ID_ATTRIBUTE`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stanza {
    /// Element name.
    pub name: String,
    /// Element namespace.
    pub namespace: String,
    /// Optional routing hint for the transport.
    pub via: Option<String>,
    /// Serialized stanza body (opaque to the client).
    pub payload: String,
    /// Attribute list.
    pub attributes: Vec<Attribute>,
}

impl Stanza {
    /// Creates a new stanza with an empty body and no attributes.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            via: None,
            payload: String::new(),
            attributes: Vec::new(),
        }
    }

    /// Sets the routing hint.
    #[must_use]
    pub fn with_via(mut self, via: impl Into<String>) -> Self {
        self.via = Some(via.into());
        self
    }

    /// Sets the serialized body.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// The correlation identifier, if the stanza carries one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute(ID_ATTRIBUTE).map(|a| a.value.as_str())
    }

    /// Sets the correlation identifier, replacing any existing one.
    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        match self.attributes.iter_mut().find(|a| a.name == ID_ATTRIBUTE) {
            Some(attribute) => attribute.value = id,
            None => self.attributes.push(Attribute::new(ID_ATTRIBUTE, id)),
        }
    }

    /// Informational kind classification (see [`StanzaKind`]).
    #[must_use]
    pub fn kind(&self) -> StanzaKind {
        StanzaKind::from_name(&self.name)
    }
}
