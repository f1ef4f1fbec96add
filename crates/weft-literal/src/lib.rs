#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod interface;
mod literal;
mod types;

pub use interface::{Variable, VariableMap};
pub use literal::{Blob, BlobMetadata, Literal, LiteralValue, Primitive, Scalar, UnionValue};
pub use types::{
    BlobDimensionality, BlobType, DatasetColumn, EnumType, LiteralType, LiteralTypeKind,
    SimpleType, StructuredDatasetType, TypeStructure, UnionType,
};
