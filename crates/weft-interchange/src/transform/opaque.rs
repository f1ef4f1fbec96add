//! Opaque-serialization fallback.
//!
//! The last resort when no structural transformer applies: the native value
//! is serialized wholesale to JSON bytes and offloaded as a single-part
//! blob. This path loses structural type-safety guarantees; the registry
//! logs a warning when it first registers one of these.

use weft_literal::{Blob, BlobDimensionality, BlobType, Literal, LiteralType, Scalar};

use crate::context::ConversionContext;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue, TypeKey};
use crate::transformer::Transformer;

/// Blob format of opaque-serialized values.
pub const OPAQUE_FORMAT: &str = "OpaqueJson";

/// Fallback transformer for one native type with no structural match.
pub struct OpaqueTransformer {
    name: String,
    native: NativeType,
    key: TypeKey,
}

impl OpaqueTransformer {
    /// Creates the fallback transformer for a native type.
    pub fn new(ty: &NativeType) -> Self {
        let base = ty.strip_annotations();
        Self {
            name: format!("Opaque[{base}]"),
            native: base.clone(),
            key: base.type_key(),
        }
    }

    fn blob_type() -> BlobType {
        BlobType::single(OPAQUE_FORMAT)
    }
}

impl Transformer for OpaqueTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_key(&self) -> TypeKey {
        self.key.clone()
    }

    /// Anything serializes through the fallback; there is nothing to check.
    fn assert_type(&self, _ty: &NativeType, _value: &NativeValue) -> InterchangeResult<()> {
        Ok(())
    }

    fn get_literal_type(&self, _ty: &NativeType) -> InterchangeResult<LiteralType> {
        Ok(LiteralType::blob(Self::blob_type()))
    }

    fn to_literal(
        &self,
        ctx: &ConversionContext,
        value: &NativeValue,
        _ty: &NativeType,
        _expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        let data = serde_json::to_vec(value)?;
        let uri = ctx.store().put(&data)?;
        Ok(Literal::scalar(Scalar::Blob(Blob::new(Self::blob_type(), uri))))
    }

    fn to_native_value(
        &self,
        ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let blob = literal
            .as_blob()
            .ok_or_else(|| InterchangeError::conversion(ty, "literal is not a blob reference"))?;
        let data = ctx.store().get(&blob.uri)?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        match literal_type.as_blob() {
            Some(blob)
                if blob.format == OPAQUE_FORMAT
                    && blob.dimensionality == BlobDimensionality::Single =>
            {
                Ok(self.native.clone())
            }
            _ => Err(InterchangeError::NotReversible {
                wire_type: literal_type.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::OpaqueValue;

    #[test]
    fn test_round_trip_through_store() {
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::Opaque("demo.Custom".into());
        let transformer = OpaqueTransformer::new(&ty);

        let value = NativeValue::Opaque(OpaqueValue::new(
            "demo.Custom",
            serde_json::json!({"answer": 42}),
        ));
        let lt = transformer.get_literal_type(&ty).unwrap();
        let literal = transformer.to_literal(&ctx, &value, &ty, &lt).unwrap();
        let back = transformer.to_native_value(&ctx, &literal, &ty).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_guess_claims_only_its_format() {
        let ty = NativeType::Opaque("demo.Custom".into());
        let transformer = OpaqueTransformer::new(&ty);

        let own = LiteralType::blob(BlobType::single(OPAQUE_FORMAT));
        assert_eq!(transformer.guess_native_type(&own).unwrap(), ty);

        let other = LiteralType::blob(BlobType::single("text/plain"));
        assert!(transformer.guess_native_type(&other).is_err());
    }
}
