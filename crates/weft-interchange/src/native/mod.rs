//! The native side of the interchange boundary.
//!
//! Tasks in a Weft pipeline exchange dynamically typed data: a value is a
//! [`NativeValue`], and its declared type is a [`NativeType`] descriptor. The
//! registry dispatches on the [`TypeKey`] derived from a descriptor.

mod value;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use value::{
    EnumValue, MessageValue, NativeValue, OpaqueValue, RecordValue, StreamHandle, StreamKind,
};

/// A single field of a record type, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Field name.
    pub name: String,
    /// Declared field type.
    pub ty: NativeType,
}

/// A structural record type: a named, ordered set of typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    /// Fully-qualified record name.
    pub name: String,
    /// Declared fields, in declaration order.
    pub fields: Vec<RecordField>,
}

impl RecordType {
    /// Creates a record type.
    pub fn new(name: impl Into<String>, fields: Vec<(&str, NativeType)>) -> Self {
        Self {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, ty)| RecordField {
                    name: name.into(),
                    ty,
                })
                .collect(),
        }
    }
}

/// A declared member of an enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumMember {
    /// String-valued member.
    Str(String),
    /// Integer-valued member.
    Int(i64),
}

impl fmt::Display for EnumMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumMember::Str(s) => f.write_str(s),
            EnumMember::Int(i) => write!(f, "{i}"),
        }
    }
}

/// A named enumeration type and its declared members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    /// Fully-qualified enumeration name.
    pub name: String,
    /// Declared members, in declaration order.
    pub values: Vec<EnumMember>,
}

impl EnumDef {
    /// Creates a string-valued enumeration definition.
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(|v| EnumMember::Str(v.into())).collect(),
        }
    }
}

/// A caller-supplied hash derivation attached to a native type.
///
/// When present, the engine populates the encoded literal's hash field by
/// invoking the method on the value being converted.
#[derive(Clone)]
pub struct HashMethod(Arc<dyn Fn(&NativeValue) -> String + Send + Sync>);

impl HashMethod {
    /// Wraps a hash function.
    pub fn new(f: impl Fn(&NativeValue) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Computes the hash of a value.
    pub fn calculate(&self, value: &NativeValue) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashMethod")
    }
}

impl PartialEq for HashMethod {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Decorations carried by an annotated native type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDecorations {
    /// Free-form annotation payloads forwarded onto the wire type.
    pub meta: Vec<serde_json::Value>,
    /// Optional hash derivation for encoded values.
    pub hash: Option<HashMethod>,
}

impl TypeDecorations {
    /// A single free-form annotation payload.
    pub fn meta(payload: serde_json::Value) -> Self {
        Self {
            meta: vec![payload],
            hash: None,
        }
    }

    /// A hash-method decoration.
    pub fn hash(method: HashMethod) -> Self {
        Self {
            meta: Vec::new(),
            hash: Some(method),
        }
    }
}

/// Registry key derived from a native type.
///
/// Primitives and stream handles key on themselves, parameterized types key
/// on their generic origin family, and named types (records, enumerations,
/// messages, opaque custom types) key on their fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// `int`.
    Int,
    /// `float`.
    Float,
    /// `bool`.
    Bool,
    /// `str`.
    Str,
    /// `datetime`.
    Datetime,
    /// `duration`.
    Duration,
    /// The unit type.
    None,
    /// The unknown type.
    Any,
    /// The list family.
    List,
    /// The string-keyed map family.
    Map,
    /// The union family.
    Union,
    /// The tuple family.
    Tuple,
    /// Text stream handles.
    TextStream,
    /// Binary stream handles.
    ByteStream,
    /// The enumeration family.
    Enum,
    /// The protocol-message family.
    Message,
    /// A named type.
    Named(String),
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Int => f.write_str("int"),
            TypeKey::Float => f.write_str("float"),
            TypeKey::Bool => f.write_str("bool"),
            TypeKey::Str => f.write_str("str"),
            TypeKey::Datetime => f.write_str("datetime"),
            TypeKey::Duration => f.write_str("duration"),
            TypeKey::None => f.write_str("none"),
            TypeKey::Any => f.write_str("any"),
            TypeKey::List => f.write_str("list"),
            TypeKey::Map => f.write_str("map"),
            TypeKey::Union => f.write_str("union"),
            TypeKey::Tuple => f.write_str("tuple"),
            TypeKey::TextStream => f.write_str("text_stream"),
            TypeKey::ByteStream => f.write_str("byte_stream"),
            TypeKey::Enum => f.write_str("enum"),
            TypeKey::Message => f.write_str("message"),
            TypeKey::Named(name) => f.write_str(name),
        }
    }
}

/// Runtime descriptor of a native type.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeType {
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Str,
    /// Point in time.
    Datetime,
    /// Signed span of time.
    Duration,
    /// The unit type.
    None,
    /// Element type that could not be recovered by inspection.
    Unknown,
    /// Univariate list.
    List(Box<NativeType>),
    /// String-keyed map with a single value type.
    Map(Box<NativeType>),
    /// Fixed-arity tuple. Restricted: tuples never cross the wire.
    Tuple(Vec<NativeType>),
    /// One of several candidate types.
    Union(Vec<NativeType>),
    /// Structural record.
    Record(RecordType),
    /// Named enumeration.
    Enum(EnumDef),
    /// Protocol-style message, identified by its fully-qualified name.
    Message(String),
    /// Buffered text stream handle.
    TextStream,
    /// Buffered binary stream handle.
    ByteStream,
    /// A custom type with no structural transformer, by name.
    Opaque(String),
    /// A type wrapped with decorations.
    Annotated(Box<NativeType>, TypeDecorations),
}

impl NativeType {
    /// `Union[t, None]`.
    pub fn optional(t: NativeType) -> NativeType {
        NativeType::Union(vec![t, NativeType::None])
    }

    /// Wraps a type with decorations.
    pub fn annotated(inner: NativeType, decorations: TypeDecorations) -> NativeType {
        NativeType::Annotated(Box::new(inner), decorations)
    }

    /// Returns the type with all annotation wrappers stripped.
    pub fn strip_annotations(&self) -> &NativeType {
        match self {
            NativeType::Annotated(inner, _) => inner.strip_annotations(),
            other => other,
        }
    }

    /// Returns true if this is a union including the unit type.
    pub fn is_optional(&self) -> bool {
        match self.strip_annotations() {
            NativeType::Union(variants) => variants.contains(&NativeType::None),
            _ => false,
        }
    }

    /// Returns true for parameterized (generic) types.
    pub fn is_parameterized(&self) -> bool {
        matches!(
            self,
            NativeType::List(_) | NativeType::Map(_) | NativeType::Union(_) | NativeType::Tuple(_)
        )
    }

    /// The registry key this type dispatches on.
    pub fn type_key(&self) -> TypeKey {
        match self {
            NativeType::Int => TypeKey::Int,
            NativeType::Float => TypeKey::Float,
            NativeType::Bool => TypeKey::Bool,
            NativeType::Str => TypeKey::Str,
            NativeType::Datetime => TypeKey::Datetime,
            NativeType::Duration => TypeKey::Duration,
            NativeType::None => TypeKey::None,
            NativeType::Unknown => TypeKey::Any,
            NativeType::List(_) => TypeKey::List,
            NativeType::Map(_) => TypeKey::Map,
            NativeType::Union(_) => TypeKey::Union,
            NativeType::Tuple(_) => TypeKey::Tuple,
            NativeType::Record(r) => TypeKey::Named(r.name.clone()),
            NativeType::Enum(e) => TypeKey::Named(e.name.clone()),
            NativeType::Message(name) => TypeKey::Named(name.clone()),
            NativeType::TextStream => TypeKey::TextStream,
            NativeType::ByteStream => TypeKey::ByteStream,
            NativeType::Opaque(name) => TypeKey::Named(name.clone()),
            NativeType::Annotated(inner, _) => inner.type_key(),
        }
    }

    /// The first hash-method decoration in the annotation chain, if any.
    pub fn hash_decoration(&self) -> Option<&HashMethod> {
        match self {
            NativeType::Annotated(inner, decorations) => decorations
                .hash
                .as_ref()
                .or_else(|| inner.hash_decoration()),
            _ => None,
        }
    }

    /// All free-form annotation payloads in the annotation chain.
    pub fn meta_decorations(&self) -> Vec<&serde_json::Value> {
        match self {
            NativeType::Annotated(inner, decorations) => {
                let mut metas: Vec<&serde_json::Value> = decorations.meta.iter().collect();
                metas.extend(inner.meta_decorations());
                metas
            }
            _ => Vec::new(),
        }
    }

    /// Shallow runtime instance check.
    ///
    /// Parameterized types defer to per-element checks in their transformers
    /// and always pass here.
    pub fn is_instance(&self, value: &NativeValue) -> bool {
        match (self.strip_annotations(), value) {
            (t, _) if t.is_parameterized() => true,
            (NativeType::Unknown, _) => true,
            (NativeType::Int, NativeValue::Int(_)) => true,
            (NativeType::Float, NativeValue::Float(_)) => true,
            (NativeType::Bool, NativeValue::Bool(_)) => true,
            (NativeType::Str, NativeValue::Str(_)) => true,
            (NativeType::Datetime, NativeValue::Datetime(_)) => true,
            (NativeType::Duration, NativeValue::Duration(_)) => true,
            (NativeType::None, NativeValue::None) => true,
            (NativeType::Record(r), NativeValue::Record(v)) => v.type_name == r.name,
            (NativeType::Enum(e), NativeValue::Enum(v)) => v.def.name == e.name,
            (NativeType::Message(name), NativeValue::Message(v)) => &v.type_name == name,
            (NativeType::TextStream, NativeValue::Stream(h)) => h.kind == StreamKind::Text,
            (NativeType::ByteStream, NativeValue::Stream(h)) => h.kind == StreamKind::Binary,
            (NativeType::Opaque(name), NativeValue::Opaque(v)) => &v.type_name == name,
            _ => false,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Int => f.write_str("int"),
            NativeType::Float => f.write_str("float"),
            NativeType::Bool => f.write_str("bool"),
            NativeType::Str => f.write_str("str"),
            NativeType::Datetime => f.write_str("datetime"),
            NativeType::Duration => f.write_str("duration"),
            NativeType::None => f.write_str("none"),
            NativeType::Unknown => f.write_str("unknown"),
            NativeType::List(t) => write!(f, "list<{t}>"),
            NativeType::Map(t) => write!(f, "map<str, {t}>"),
            NativeType::Tuple(items) => {
                f.write_str("tuple<")?;
                for (i, t) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{t}")?;
                }
                f.write_str(">")
            }
            NativeType::Union(variants) => {
                f.write_str("union<")?;
                for (i, t) in variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{t}")?;
                }
                f.write_str(">")
            }
            NativeType::Record(r) => f.write_str(&r.name),
            NativeType::Enum(e) => f.write_str(&e.name),
            NativeType::Message(name) => f.write_str(name),
            NativeType::TextStream => f.write_str("text_stream"),
            NativeType::ByteStream => f.write_str("byte_stream"),
            NativeType::Opaque(name) => f.write_str(name),
            NativeType::Annotated(inner, _) => write!(f, "annotated<{inner}>"),
        }
    }
}
