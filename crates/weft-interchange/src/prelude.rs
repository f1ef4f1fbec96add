//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use weft_interchange::prelude::*;
//! ```

pub use weft_literal::{Literal, LiteralType, LiteralTypeKind, SimpleType, Variable, VariableMap};

pub use crate::context::{BlobStore, ConversionContext, MemoryStore};
pub use crate::engine::TypeEngine;
pub use crate::error::{InterchangeError, InterchangeResult};
pub use crate::native::{
    EnumDef, EnumValue, NativeType, NativeValue, RecordType, RecordValue, StreamHandle, TypeKey,
};
pub use crate::resolver::LiteralsResolver;
pub use crate::transformer::Transformer;
