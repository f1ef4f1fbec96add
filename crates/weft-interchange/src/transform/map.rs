//! String-keyed map transformer.
//!
//! Maps with a declared value type get a structural map wire type and recurse
//! per entry. Maps whose value type cannot be recovered degrade to an opaque
//! JSON struct, and decoding such a struct yields a plain untyped mapping.

use std::collections::HashMap;

use weft_literal::{Literal, LiteralType, Scalar, SimpleType};

use crate::context::ConversionContext;
use crate::engine::TypeEngine;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue, TypeKey};
use crate::transformer::Transformer;

/// Transformer for string-keyed maps.
pub struct MapTransformer;

impl MapTransformer {
    fn value_type(ty: &NativeType) -> InterchangeResult<&NativeType> {
        match ty.strip_annotations() {
            NativeType::Map(value) => Ok(value),
            other => Err(InterchangeError::unsupported(
                other,
                "only string-keyed maps are supported",
            )),
        }
    }

    /// Encodes an untyped map as an opaque JSON struct.
    fn to_generic_literal(entries: &HashMap<String, NativeValue>) -> InterchangeResult<Literal> {
        let mut object = serde_json::Map::with_capacity(entries.len());
        for (key, value) in entries {
            object.insert(key.clone(), value.to_plain_json()?);
        }
        Ok(Literal::scalar(Scalar::Generic(object)))
    }
}

impl Transformer for MapTransformer {
    fn name(&self) -> &str {
        "map"
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::Map
    }

    fn get_literal_type(&self, ty: &NativeType) -> InterchangeResult<LiteralType> {
        let value_type = Self::value_type(ty)?;
        if *value_type == NativeType::Unknown {
            // no resolvable value type: degrade to an opaque struct
            return Ok(LiteralType::simple(SimpleType::Struct));
        }
        Ok(LiteralType::map_value(TypeEngine::to_literal_type(value_type)?))
    }

    fn to_literal(
        &self,
        ctx: &ConversionContext,
        value: &NativeValue,
        ty: &NativeType,
        expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        let NativeValue::Map(entries) = value else {
            return Err(InterchangeError::conversion(ty, "expected a map value"));
        };

        if expected.as_simple() == Some(SimpleType::Struct) {
            return Self::to_generic_literal(entries);
        }

        let value_type = Self::value_type(ty)?;
        if *value_type == NativeType::Unknown {
            return Self::to_generic_literal(entries);
        }
        let value_expected = match expected.as_map_value() {
            Some(t) => t.clone(),
            None => TypeEngine::to_literal_type(value_type)?,
        };

        let mut literals = HashMap::with_capacity(entries.len());
        for (key, entry) in entries {
            literals.insert(
                key.clone(),
                TypeEngine::to_literal(ctx, entry, value_type, &value_expected)?,
            );
        }
        Ok(Literal::map(literals))
    }

    fn to_native_value(
        &self,
        ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let value_type = Self::value_type(ty)?;

        if let Some(entries) = literal.as_map() {
            if *value_type == NativeType::Unknown {
                return Err(InterchangeError::conversion(
                    ty,
                    "cannot decode a literal map without a declared value type",
                ));
            }
            let mut values = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                values.insert(
                    key.clone(),
                    TypeEngine::to_native_value(ctx, entry, value_type)?,
                );
            }
            return Ok(NativeValue::Map(values));
        }

        if let Some(object) = literal.as_generic() {
            if *value_type == NativeType::Unknown {
                return Ok(NativeValue::Map(
                    object
                        .iter()
                        .map(|(k, v)| (k.clone(), NativeValue::from_plain_json(v)))
                        .collect(),
                ));
            }
            return Err(InterchangeError::conversion(
                ty,
                "opaque struct literal does not carry typed map entries",
            ));
        }

        Err(InterchangeError::conversion(ty, "literal is not a map"))
    }

    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        if let Some(value) = literal_type.as_map_value() {
            return Ok(NativeType::Map(Box::new(TypeEngine::guess_native_type(
                value,
            )?)));
        }
        // a bare struct with no metadata is an untyped mapping
        if literal_type.as_simple() == Some(SimpleType::Struct) && literal_type.metadata.is_none() {
            return Ok(NativeType::Map(Box::new(NativeType::Unknown)));
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
    fn test_untyped_map_degrades_to_struct() {
        let ty = NativeType::Map(Box::new(NativeType::Unknown));
        let lt = MapTransformer.get_literal_type(&ty).unwrap();
        assert_eq!(lt.as_simple(), Some(SimpleType::Struct));
    }

    #[test]
    fn test_generic_struct_decodes_to_untyped_map() {
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::Map(Box::new(NativeType::Unknown));

        let mut entries = HashMap::new();
        entries.insert("n".to_string(), NativeValue::Int(4));
        let value = NativeValue::Map(entries);

        let literal = MapTransformer
            .to_literal(&ctx, &value, &ty, &LiteralType::simple(SimpleType::Struct))
            .unwrap();
        assert!(literal.as_generic().is_some());

        let back = MapTransformer.to_native_value(&ctx, &literal, &ty).unwrap();
        assert_eq!(back, value);
    }
}
