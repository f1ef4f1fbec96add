#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod castable;
mod context;
mod engine;
mod error;
pub mod native;
mod registry;
mod resolver;
pub mod transform;
mod transformer;

#[doc(hidden)]
pub mod prelude;

pub use castable::are_castable;
pub use context::{BlobStore, ConversionContext, LocalDirStore, MemoryStore, StoreError};
pub use engine::TypeEngine;
pub use error::{InterchangeError, InterchangeResult};
pub use registry::{StructuralRule, TransformerRegistry};
pub use resolver::LiteralsResolver;
pub use transformer::{RestrictedTypeTransformer, SimpleTransformer, Transformer};

/// Tracing target for interchange operations.
pub const TRACING_TARGET: &str = "weft_interchange";
