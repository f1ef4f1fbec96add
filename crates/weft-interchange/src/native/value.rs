//! Type-erased native values for runtime dispatch.

use std::collections::HashMap;

use bytes::Bytes;
use derive_more::From;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{EnumDef, NativeType, RecordField, RecordType, TypeKey};
use crate::error::{InterchangeError, InterchangeResult};

/// An instance of a structural record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordValue {
    /// Fully-qualified name of the record type this value belongs to.
    pub type_name: String,
    /// Field values, in declaration order.
    pub fields: Vec<(String, NativeValue)>,
}

impl RecordValue {
    /// Creates a record value.
    pub fn new(type_name: impl Into<String>, fields: Vec<(&str, NativeValue)>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Looks up a field value by name.
    pub fn field(&self, name: &str) -> Option<&NativeValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// A member of an enumeration, carrying its defining type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    /// The enumeration this member belongs to.
    pub def: EnumDef,
    /// The member's string value.
    pub value: String,
}

impl EnumValue {
    /// Creates an enum member value.
    pub fn new(def: EnumDef, value: impl Into<String>) -> Self {
        Self {
            def,
            value: value.into(),
        }
    }
}

/// A protocol-style message: a named bag of JSON-shaped fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageValue {
    /// Fully-qualified message type name.
    pub type_name: String,
    /// Message fields.
    pub fields: serde_json::Map<String, JsonValue>,
}

impl MessageValue {
    /// Creates a message value.
    pub fn new(type_name: impl Into<String>, fields: serde_json::Map<String, JsonValue>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }
}

/// Whether a stream handle carries text or raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StreamKind {
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Binary,
}

/// A buffered stream handle crossing the wire as a blob reference.
///
/// A handle holds buffered contents before upload, a URI after, or both once
/// the contents have been fetched back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamHandle {
    /// Text or binary.
    pub kind: StreamKind,
    /// Location in the backing store, once uploaded.
    pub uri: Option<String>,
    /// Buffered contents, when held locally.
    pub contents: Option<Bytes>,
}

impl StreamHandle {
    /// A text handle over buffered contents.
    pub fn text(contents: impl Into<Bytes>) -> Self {
        Self {
            kind: StreamKind::Text,
            uri: None,
            contents: Some(contents.into()),
        }
    }

    /// A binary handle over buffered contents.
    pub fn binary(contents: impl Into<Bytes>) -> Self {
        Self {
            kind: StreamKind::Binary,
            uri: None,
            contents: Some(contents.into()),
        }
    }

    /// A handle referencing already-uploaded data.
    pub fn reference(kind: StreamKind, uri: impl Into<String>) -> Self {
        Self {
            kind,
            uri: Some(uri.into()),
            contents: None,
        }
    }
}

/// A value of a custom type with no structural transformer.
///
/// The payload is whatever JSON-shaped projection the authoring layer chose
/// for the type; the opaque fallback serializes it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueValue {
    /// Fully-qualified name of the custom type.
    pub type_name: String,
    /// The projected payload.
    pub data: JsonValue,
}

impl OpaqueValue {
    /// Creates an opaque value.
    pub fn new(type_name: impl Into<String>, data: JsonValue) -> Self {
        Self {
            type_name: type_name.into(),
            data,
        }
    }
}

/// Type-erased native value for runtime dispatch.
#[derive(Debug, Clone, PartialEq, From, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NativeValue {
    /// The absent value.
    None,
    /// 64-bit signed integer.
    #[from]
    Int(i64),
    /// 64-bit float.
    #[from]
    Float(f64),
    /// Boolean.
    #[from]
    Bool(bool),
    /// UTF-8 string.
    #[from]
    Str(String),
    /// Point in time.
    #[from]
    Datetime(Timestamp),
    /// Signed span of time.
    #[from]
    Duration(SignedDuration),
    /// Ordered list.
    #[from]
    List(Vec<NativeValue>),
    /// String-keyed map.
    #[from]
    Map(HashMap<String, NativeValue>),
    /// Record instance.
    #[from]
    Record(RecordValue),
    /// Enumeration member.
    #[from]
    Enum(EnumValue),
    /// Protocol-style message.
    #[from]
    Message(MessageValue),
    /// Stream handle.
    #[from]
    Stream(StreamHandle),
    /// Custom value with no structural transformer.
    #[from]
    Opaque(OpaqueValue),
}

impl NativeValue {
    /// The registry key this value dispatches on at runtime.
    pub fn type_key(&self) -> TypeKey {
        match self {
            NativeValue::None => TypeKey::None,
            NativeValue::Int(_) => TypeKey::Int,
            NativeValue::Float(_) => TypeKey::Float,
            NativeValue::Bool(_) => TypeKey::Bool,
            NativeValue::Str(_) => TypeKey::Str,
            NativeValue::Datetime(_) => TypeKey::Datetime,
            NativeValue::Duration(_) => TypeKey::Duration,
            NativeValue::List(_) => TypeKey::List,
            NativeValue::Map(_) => TypeKey::Map,
            NativeValue::Record(v) => TypeKey::Named(v.type_name.clone()),
            NativeValue::Enum(v) => TypeKey::Named(v.def.name.clone()),
            NativeValue::Message(v) => TypeKey::Named(v.type_name.clone()),
            NativeValue::Stream(h) => match h.kind {
                StreamKind::Text => TypeKey::TextStream,
                StreamKind::Binary => TypeKey::ByteStream,
            },
            NativeValue::Opaque(v) => TypeKey::Named(v.type_name.clone()),
        }
    }

    /// Recovers this value's runtime type.
    ///
    /// Container element types cannot be recovered by inspection and erase to
    /// [`NativeType::Unknown`]; callers that need them must supply hints.
    pub fn native_type(&self) -> NativeType {
        match self {
            NativeValue::None => NativeType::None,
            NativeValue::Int(_) => NativeType::Int,
            NativeValue::Float(_) => NativeType::Float,
            NativeValue::Bool(_) => NativeType::Bool,
            NativeValue::Str(_) => NativeType::Str,
            NativeValue::Datetime(_) => NativeType::Datetime,
            NativeValue::Duration(_) => NativeType::Duration,
            NativeValue::List(_) => NativeType::List(Box::new(NativeType::Unknown)),
            NativeValue::Map(_) => NativeType::Map(Box::new(NativeType::Unknown)),
            NativeValue::Record(v) => NativeType::Record(RecordType {
                name: v.type_name.clone(),
                fields: v
                    .fields
                    .iter()
                    .map(|(name, value)| RecordField {
                        name: name.clone(),
                        ty: value.native_type(),
                    })
                    .collect(),
            }),
            NativeValue::Enum(v) => NativeType::Enum(v.def.clone()),
            NativeValue::Message(v) => NativeType::Message(v.type_name.clone()),
            NativeValue::Stream(h) => match h.kind {
                StreamKind::Text => NativeType::TextStream,
                StreamKind::Binary => NativeType::ByteStream,
            },
            NativeValue::Opaque(v) => NativeType::Opaque(v.type_name.clone()),
        }
    }

    /// Projects this value to plain JSON, the shape used for opaque structs.
    ///
    /// Only JSON-expressible values convert; everything else is a conversion
    /// error, mirroring what a plain JSON dump of the host value would do.
    pub fn to_plain_json(&self) -> InterchangeResult<JsonValue> {
        match self {
            NativeValue::None => Ok(JsonValue::Null),
            NativeValue::Int(i) => Ok(JsonValue::from(*i)),
            NativeValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .ok_or_else(|| {
                    InterchangeError::conversion("float", "not representable in JSON")
                }),
            NativeValue::Bool(b) => Ok(JsonValue::Bool(*b)),
            NativeValue::Str(s) => Ok(JsonValue::String(s.clone())),
            NativeValue::List(items) => items
                .iter()
                .map(NativeValue::to_plain_json)
                .collect::<InterchangeResult<Vec<_>>>()
                .map(JsonValue::Array),
            NativeValue::Map(entries) => {
                let mut out = serde_json::Map::with_capacity(entries.len());
                for (k, v) in entries {
                    out.insert(k.clone(), v.to_plain_json()?);
                }
                Ok(JsonValue::Object(out))
            }
            other => Err(InterchangeError::conversion(
                other.native_type(),
                "not expressible as a plain JSON value",
            )),
        }
    }

    /// Lifts plain JSON into an untyped native value.
    pub fn from_plain_json(value: &JsonValue) -> NativeValue {
        match value {
            JsonValue::Null => NativeValue::None,
            JsonValue::Bool(b) => NativeValue::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => NativeValue::Int(i),
                None => NativeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => NativeValue::Str(s.clone()),
            JsonValue::Array(items) => {
                NativeValue::List(items.iter().map(NativeValue::from_plain_json).collect())
            }
            JsonValue::Object(entries) => NativeValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), NativeValue::from_plain_json(v)))
                    .collect(),
            ),
        }
    }
}
