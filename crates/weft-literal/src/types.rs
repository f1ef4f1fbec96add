//! The closed vocabulary of wire types.
//!
//! A [`LiteralType`] describes the portable shape of a value crossing a task
//! boundary. Exactly one structural kind is populated per type; tag, metadata
//! and annotation are orthogonal decorations that structural comparison must
//! ignore (see [`LiteralType::essence`]).

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Scalar kinds representable on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SimpleType {
    /// The absent value.
    None,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    String,
    /// Boolean.
    Boolean,
    /// Point in time.
    Datetime,
    /// Signed span of time.
    Duration,
    /// Opaque JSON-shaped struct.
    Struct,
}

/// Dimensionality of a blob reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlobDimensionality {
    /// A single object.
    Single,
    /// A directory-like prefix of objects.
    Multipart,
}

/// Format and dimensionality of a blob-typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobType {
    /// Free-form format descriptor (usually a media type).
    pub format: String,
    /// Single object or multipart prefix.
    pub dimensionality: BlobDimensionality,
}

impl BlobType {
    /// Creates a single-object blob type with the given format.
    pub fn single(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            dimensionality: BlobDimensionality::Single,
        }
    }
}

/// An enumeration wire type: the ordered set of legal string values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Legal values, in declaration order.
    pub values: Vec<String>,
}

/// A union wire type: the ordered candidate variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionType {
    /// Candidate variants, in declaration order.
    pub variants: Vec<LiteralType>,
}

/// A column of a structured dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetColumn {
    /// Column name.
    pub name: String,
    /// Column wire type.
    pub literal_type: LiteralType,
}

/// A structured-dataset wire type (tabular data with a declared schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDatasetType {
    /// Storage format (e.g. "parquet").
    pub format: String,
    /// Descriptor of an externally defined schema, if any.
    pub external_schema_type: String,
    /// Raw bytes of the external schema, if any.
    pub external_schema_bytes: Bytes,
    /// Declared columns, order-sensitive.
    pub columns: Vec<DatasetColumn>,
}

/// Structural identity attached to a wire type.
///
/// Carries the tag that disambiguates union variants and names record types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStructure {
    /// Free-form identity tag.
    pub tag: String,
}

/// The structural kind of a wire type. Exactly one variant per type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum LiteralTypeKind {
    /// A scalar kind.
    Simple(SimpleType),
    /// Ordered collection of a single element type.
    Collection(Box<LiteralType>),
    /// String-keyed map with a single value type.
    Map(Box<LiteralType>),
    /// Offloaded binary data.
    Blob(BlobType),
    /// Closed set of string values.
    Enum(EnumType),
    /// One of several candidate types.
    Union(UnionType),
    /// Tabular data with a declared schema.
    StructuredDataset(StructuredDatasetType),
}

/// A portable wire type: one structural kind plus optional decorations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralType {
    /// The structural kind.
    #[serde(flatten)]
    pub kind: LiteralTypeKind,
    /// Free-form key-value metadata (e.g. record field schemas).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Structural identity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<TypeStructure>,
    /// Arbitrary annotation payload supplied by the authoring layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<serde_json::Value>,
}

impl LiteralType {
    /// Creates an undecorated type from a structural kind.
    pub fn new(kind: LiteralTypeKind) -> Self {
        Self {
            kind,
            metadata: None,
            structure: None,
            annotation: None,
        }
    }

    /// A simple scalar type.
    pub fn simple(simple: SimpleType) -> Self {
        Self::new(LiteralTypeKind::Simple(simple))
    }

    /// A collection of the given element type.
    pub fn collection(element: LiteralType) -> Self {
        Self::new(LiteralTypeKind::Collection(Box::new(element)))
    }

    /// A string-keyed map with the given value type.
    pub fn map_value(value: LiteralType) -> Self {
        Self::new(LiteralTypeKind::Map(Box::new(value)))
    }

    /// A blob type.
    pub fn blob(blob: BlobType) -> Self {
        Self::new(LiteralTypeKind::Blob(blob))
    }

    /// An enumeration over the given values.
    pub fn enumeration(values: Vec<String>) -> Self {
        Self::new(LiteralTypeKind::Enum(EnumType { values }))
    }

    /// A union over the given variants.
    pub fn union(variants: Vec<LiteralType>) -> Self {
        Self::new(LiteralTypeKind::Union(UnionType { variants }))
    }

    /// A structured-dataset type.
    pub fn structured_dataset(sd: StructuredDatasetType) -> Self {
        Self::new(LiteralTypeKind::StructuredDataset(sd))
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attaches a structural identity tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.structure = Some(TypeStructure { tag: tag.into() });
        self
    }

    /// Attaches an annotation payload.
    pub fn with_annotation(mut self, annotation: serde_json::Value) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Returns the identity tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.structure.as_ref().map(|s| s.tag.as_str())
    }

    /// Returns the simple kind if this is a simple type.
    pub fn as_simple(&self) -> Option<SimpleType> {
        match self.kind {
            LiteralTypeKind::Simple(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the element type if this is a collection.
    pub fn as_collection(&self) -> Option<&LiteralType> {
        match &self.kind {
            LiteralTypeKind::Collection(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the value type if this is a map.
    pub fn as_map_value(&self) -> Option<&LiteralType> {
        match &self.kind {
            LiteralTypeKind::Map(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the union variants if this is a union.
    pub fn as_union(&self) -> Option<&UnionType> {
        match &self.kind {
            LiteralTypeKind::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Returns the blob type if this is a blob.
    pub fn as_blob(&self) -> Option<&BlobType> {
        match &self.kind {
            LiteralTypeKind::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the enum type if this is an enumeration.
    pub fn as_enum(&self) -> Option<&EnumType> {
        match &self.kind {
            LiteralTypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if this is a union type.
    pub fn is_union(&self) -> bool {
        matches!(self.kind, LiteralTypeKind::Union(_))
    }

    /// The structural form of this type with decorations stripped.
    ///
    /// Strips the top level only; castability recurses into nested types and
    /// strips each level as it compares it.
    pub fn essence(&self) -> LiteralType {
        LiteralType::new(self.kind.clone())
    }
}

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LiteralTypeKind::Simple(s) => write!(f, "{s}"),
            LiteralTypeKind::Collection(t) => write!(f, "collection<{t}>"),
            LiteralTypeKind::Map(t) => write!(f, "map<string, {t}>"),
            LiteralTypeKind::Blob(b) => write!(f, "blob<{}, {}>", b.format, b.dimensionality),
            LiteralTypeKind::Enum(e) => write!(f, "enum<{}>", e.values.join("|")),
            LiteralTypeKind::Union(u) => {
                write!(f, "union<")?;
                for (i, v) in u.variants.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ">")
            }
            LiteralTypeKind::StructuredDataset(sd) => {
                write!(f, "structured_dataset<{}>", sd.format)
            }
        }
    }
}
