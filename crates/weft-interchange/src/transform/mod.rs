//! Built-in transformers.
//!
//! One transformer per wire-shape family: simple scalars, lists, unions,
//! string-keyed maps, records, enumerations, protocol-style messages, stream
//! handles, and the opaque-serialization fallback.

mod enumeration;
mod list;
mod map;
mod message;
mod opaque;
mod record;
mod simple;
mod stream;
mod union;

use std::sync::Arc;

pub use enumeration::EnumTransformer;
pub use list::ListTransformer;
pub use map::MapTransformer;
pub use message::{MessageTransformer, PB_TYPE_KEY};
pub use opaque::{OPAQUE_FORMAT, OpaqueTransformer};
pub use record::RecordTransformer;
pub use stream::{BINARY_STREAM_FORMAT, StreamTransformer, TEXT_STREAM_FORMAT};
pub use union::UnionTransformer;

use crate::native::TypeKey;
use crate::registry::TransformerRegistry;

/// Registers the built-in transformers and restricted types.
///
/// Registration order is the declared walk order for reverse inference.
pub(crate) fn register_defaults(registry: &mut TransformerRegistry) {
    let mut register = |t: Arc<dyn crate::transformer::Transformer>| {
        registry
            .register(t, &[])
            .expect("built-in transformer keys cannot conflict");
    };

    for transformer in simple::transformers() {
        register(Arc::new(transformer));
    }
    register(Arc::new(ListTransformer));
    register(Arc::new(UnionTransformer));
    register(Arc::new(MapTransformer));
    register(Arc::new(StreamTransformer::text()));
    register(Arc::new(StreamTransformer::binary()));
    register(Arc::new(EnumTransformer));
    register(Arc::new(MessageTransformer));

    // Tuples stay restricted until the wire vocabulary grows a tuple kind.
    registry
        .register_restricted("untyped tuple", TypeKey::Tuple)
        .expect("built-in transformer keys cannot conflict");
}
