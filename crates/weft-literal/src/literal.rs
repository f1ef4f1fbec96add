//! Wire values.
//!
//! A [`Literal`] is the portable form of one value: a scalar, an ordered
//! collection, or a string-keyed map, constructed once by an encode step and
//! immutable thereafter. The optional content hash feeds external cache-key
//! derivation and is never interpreted by the interchange layer itself.

use std::collections::HashMap;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::types::{BlobType, LiteralType};

/// A primitive scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "primitive", content = "value", rename_all = "snake_case")]
pub enum Primitive {
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// UTF-8 string.
    String(String),
    /// Point in time.
    Datetime(Timestamp),
    /// Signed span of time.
    Duration(SignedDuration),
}

/// Metadata carried alongside a blob reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobMetadata {
    /// Format and dimensionality of the referenced data.
    pub blob_type: BlobType,
}

/// A reference to offloaded binary data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    /// Blob metadata.
    pub metadata: BlobMetadata,
    /// Location of the data in the backing store.
    pub uri: String,
}

impl Blob {
    /// Creates a blob reference.
    pub fn new(blob_type: BlobType, uri: impl Into<String>) -> Self {
        Self {
            metadata: BlobMetadata { blob_type },
            uri: uri.into(),
        }
    }
}

/// A union-wrapped value: the winning variant's literal plus its wire type.
///
/// The stored type's structure tag records the name of the transformer that
/// produced the value, so decoding can go straight to the matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionValue {
    /// The encoded variant value.
    pub value: Literal,
    /// Wire type of the winning variant, tagged with the transformer name.
    pub stored_type: LiteralType,
}

/// A scalar wire value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scalar", content = "data", rename_all = "snake_case")]
pub enum Scalar {
    /// A primitive.
    Primitive(Primitive),
    /// A blob reference.
    Blob(Blob),
    /// An opaque JSON-shaped struct.
    Generic(serde_json::Map<String, serde_json::Value>),
    /// The absent value.
    None,
    /// A union-wrapped value.
    Union(Box<UnionValue>),
}

/// The shape of a wire value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "literal", content = "data", rename_all = "snake_case")]
pub enum LiteralValue {
    /// A scalar.
    Scalar(Scalar),
    /// An ordered sequence of values.
    Collection(Vec<Literal>),
    /// A string-keyed mapping of values. Insertion order is irrelevant.
    Map(HashMap<String, Literal>),
}

/// A portable wire value with an optional content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    /// The value itself.
    #[serde(flatten)]
    pub value: LiteralValue,
    /// Caller-derived content hash, used for external cache keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Literal {
    /// Wraps a scalar.
    pub fn scalar(scalar: Scalar) -> Self {
        Self {
            value: LiteralValue::Scalar(scalar),
            hash: None,
        }
    }

    /// Wraps an ordered collection.
    pub fn collection(items: Vec<Literal>) -> Self {
        Self {
            value: LiteralValue::Collection(items),
            hash: None,
        }
    }

    /// Wraps a string-keyed map.
    pub fn map(entries: HashMap<String, Literal>) -> Self {
        Self {
            value: LiteralValue::Map(entries),
            hash: None,
        }
    }

    /// An integer primitive literal.
    pub fn integer(v: i64) -> Self {
        Self::scalar(Scalar::Primitive(Primitive::Integer(v)))
    }

    /// A float primitive literal.
    pub fn float(v: f64) -> Self {
        Self::scalar(Scalar::Primitive(Primitive::Float(v)))
    }

    /// A boolean primitive literal.
    pub fn boolean(v: bool) -> Self {
        Self::scalar(Scalar::Primitive(Primitive::Boolean(v)))
    }

    /// A string primitive literal.
    pub fn string(v: impl Into<String>) -> Self {
        Self::scalar(Scalar::Primitive(Primitive::String(v.into())))
    }

    /// The none scalar literal.
    pub fn none() -> Self {
        Self::scalar(Scalar::None)
    }

    /// Returns the scalar, if this literal is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            LiteralValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the collection items, if this literal is a collection.
    pub fn as_collection(&self) -> Option<&[Literal]> {
        match &self.value {
            LiteralValue::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map entries, if this literal is a map.
    pub fn as_map(&self) -> Option<&HashMap<String, Literal>> {
        match &self.value {
            LiteralValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the primitive, if this literal is a primitive scalar.
    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self.as_scalar() {
            Some(Scalar::Primitive(p)) => Some(p),
            _ => None,
        }
    }

    /// Returns the blob reference, if this literal is a blob scalar.
    pub fn as_blob(&self) -> Option<&Blob> {
        match self.as_scalar() {
            Some(Scalar::Blob(b)) => Some(b),
            _ => None,
        }
    }

    /// Returns the generic struct, if this literal is one.
    pub fn as_generic(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self.as_scalar() {
            Some(Scalar::Generic(g)) => Some(g),
            _ => None,
        }
    }

    /// Returns the union value, if this literal is a union scalar.
    pub fn as_union(&self) -> Option<&UnionValue> {
        match self.as_scalar() {
            Some(Scalar::Union(u)) => Some(u),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let lit = Literal::integer(7);
        assert_eq!(lit.as_primitive(), Some(&Primitive::Integer(7)));
        assert!(lit.as_collection().is_none());

        let coll = Literal::collection(vec![Literal::boolean(true)]);
        assert_eq!(coll.as_collection().map(<[Literal]>::len), Some(1));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), Literal::string("x"));
        let lit = Literal::map(entries);

        let json = serde_json::to_string(&lit).unwrap();
        let back: Literal = serde_json::from_str(&json).unwrap();
        assert_eq!(lit, back);
    }
}
