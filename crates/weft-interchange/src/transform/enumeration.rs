//! Enumeration transformer.
//!
//! Only string-valued enumerations cross the wire: the wire type lists every
//! legal value, and members travel as their string primitive.

use weft_literal::{Literal, LiteralType, Primitive};

use crate::context::ConversionContext;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{EnumDef, EnumMember, EnumValue, NativeType, NativeValue, TypeKey};
use crate::transformer::Transformer;

/// Transformer for named enumerations.
pub struct EnumTransformer;

impl EnumTransformer {
    fn definition(ty: &NativeType) -> InterchangeResult<&EnumDef> {
        match ty.strip_annotations() {
            NativeType::Enum(def) => Ok(def),
            other => Err(InterchangeError::unsupported(other, "not an enumeration type")),
        }
    }
}

impl Transformer for EnumTransformer {
    fn name(&self) -> &str {
        "enum"
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::Enum
    }

    fn get_literal_type(&self, ty: &NativeType) -> InterchangeResult<LiteralType> {
        let def = Self::definition(ty)?;
        match def.values.first() {
            Some(EnumMember::Str(_)) => {}
            _ => {
                return Err(InterchangeError::unsupported(
                    ty,
                    "only enumerations with string values are supported",
                ));
            }
        }
        Ok(LiteralType::enumeration(
            def.values.iter().map(EnumMember::to_string).collect(),
        ))
    }

    fn to_literal(
        &self,
        _ctx: &ConversionContext,
        value: &NativeValue,
        ty: &NativeType,
        _expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        let def = Self::definition(ty)?;
        let NativeValue::Enum(member) = value else {
            return Err(InterchangeError::conversion(ty, "expected an enum member"));
        };
        if !def
            .values
            .iter()
            .any(|v| matches!(v, EnumMember::Str(s) if *s == member.value))
        {
            return Err(InterchangeError::conversion(
                ty,
                format!("{} is not a declared value of {}", member.value, def.name),
            ));
        }
        Ok(Literal::string(member.value.clone()))
    }

    fn to_native_value(
        &self,
        _ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let def = Self::definition(ty)?;
        let Some(Primitive::String(value)) = literal.as_primitive() else {
            return Err(InterchangeError::conversion(
                ty,
                "literal is not a string primitive",
            ));
        };
        if !def
            .values
            .iter()
            .any(|v| matches!(v, EnumMember::Str(s) if s == value))
        {
            return Err(InterchangeError::conversion(
                ty,
                format!("{value} is not a declared value of {}", def.name),
            ));
        }
        Ok(NativeValue::Enum(EnumValue::new(def.clone(), value.clone())))
    }

    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        match literal_type.as_enum() {
            Some(enum_type) => Ok(NativeType::Enum(EnumDef {
                name: "enum".to_string(),
                values: enum_type
                    .values
                    .iter()
                    .map(|v| EnumMember::Str(v.clone()))
                    .collect(),
            })),
            None => Err(InterchangeError::NotReversible {
                wire_type: literal_type.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_must_be_a_string() {
        let def = EnumDef {
            name: "demo.Level".into(),
            values: vec![EnumMember::Int(1), EnumMember::Int(2)],
        };
        let err = EnumTransformer
            .get_literal_type(&NativeType::Enum(def))
            .unwrap_err();
        assert!(matches!(err, InterchangeError::UnsupportedType { .. }));
    }

    #[test]
    fn test_decode_validates_membership() {
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::Enum(EnumDef::new("demo.Color", ["RED", "GREEN"]));

        let ok = EnumTransformer
            .to_native_value(&ctx, &Literal::string("RED"), &ty)
            .unwrap();
        assert!(matches!(ok, NativeValue::Enum(m) if m.value == "RED"));

        assert!(
            EnumTransformer
                .to_native_value(&ctx, &Literal::string("BLUE"), &ty)
                .is_err()
        );
    }
}
