//! Protocol-style message transformer.
//!
//! Messages travel as a generic struct; the wire type's metadata records the
//! fully-qualified message name so the right message type can be rebuilt on
//! the other side.

use weft_literal::{Literal, LiteralType, Scalar, SimpleType};

use crate::context::ConversionContext;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{MessageValue, NativeType, NativeValue, TypeKey};
use crate::transformer::Transformer;

/// Metadata key holding the message's fully-qualified type name.
pub const PB_TYPE_KEY: &str = "pb_type";

/// Transformer for protocol-style messages.
pub struct MessageTransformer;

impl MessageTransformer {
    fn message_name(ty: &NativeType) -> InterchangeResult<&str> {
        match ty.strip_annotations() {
            NativeType::Message(name) => Ok(name),
            other => Err(InterchangeError::unsupported(other, "not a message type")),
        }
    }
}

impl Transformer for MessageTransformer {
    fn name(&self) -> &str {
        "message"
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::Message
    }

    fn get_literal_type(&self, ty: &NativeType) -> InterchangeResult<LiteralType> {
        let name = Self::message_name(ty)?;
        Ok(LiteralType::simple(SimpleType::Struct)
            .with_metadata(serde_json::json!({ PB_TYPE_KEY: name })))
    }

    fn to_literal(
        &self,
        _ctx: &ConversionContext,
        value: &NativeValue,
        ty: &NativeType,
        _expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        let name = Self::message_name(ty)?;
        let NativeValue::Message(message) = value else {
            return Err(InterchangeError::conversion(ty, "expected a message value"));
        };
        if message.type_name != name {
            return Err(InterchangeError::conversion(
                ty,
                format!("value belongs to message type {}", message.type_name),
            ));
        }
        Ok(Literal::scalar(Scalar::Generic(message.fields.clone())))
    }

    fn to_native_value(
        &self,
        _ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let name = Self::message_name(ty)?;
        let fields = literal.as_generic().ok_or_else(|| {
            InterchangeError::conversion(ty, "can only convert a generic literal to a message")
        })?;
        Ok(NativeValue::Message(MessageValue::new(name, fields.clone())))
    }

    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        if literal_type.as_simple() == Some(SimpleType::Struct) {
            if let Some(name) = literal_type
                .metadata
                .as_ref()
                .and_then(|m| m.get(PB_TYPE_KEY))
                .and_then(|v| v.as_str())
            {
                return Ok(NativeType::Message(name.to_string()));
            }
        }
        Err(InterchangeError::NotReversible {
            wire_type: literal_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_carries_type_name() {
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::Message("demo.Event".into());

        let mut fields = serde_json::Map::new();
        fields.insert("id".into(), serde_json::json!(7));
        let value = NativeValue::Message(MessageValue::new("demo.Event", fields));

        let lt = MessageTransformer.get_literal_type(&ty).unwrap();
        let literal = MessageTransformer.to_literal(&ctx, &value, &ty, &lt).unwrap();
        let back = MessageTransformer.to_native_value(&ctx, &literal, &ty).unwrap();
        assert_eq!(back, value);

        assert_eq!(
            MessageTransformer.guess_native_type(&lt).unwrap(),
            NativeType::Message("demo.Event".into())
        );
    }
}
