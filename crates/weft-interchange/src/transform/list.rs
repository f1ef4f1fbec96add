//! Univariate list transformer.

use weft_literal::{Literal, LiteralType};

use crate::context::ConversionContext;
use crate::engine::TypeEngine;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue, TypeKey};
use crate::transformer::Transformer;

/// Transformer for univariate lists.
pub struct ListTransformer;

impl ListTransformer {
    /// Returns the declared element type of a list.
    fn element_type(ty: &NativeType) -> InterchangeResult<&NativeType> {
        match ty.strip_annotations() {
            NativeType::List(element) => {
                if **element == NativeType::Unknown {
                    Err(InterchangeError::unsupported(
                        ty,
                        "the element type of a list must be declared",
                    ))
                } else {
                    Ok(element)
                }
            }
            other => Err(InterchangeError::unsupported(
                other,
                "only univariate lists are supported",
            )),
        }
    }
}

impl Transformer for ListTransformer {
    fn name(&self) -> &str {
        "list"
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::List
    }

    fn get_literal_type(&self, ty: &NativeType) -> InterchangeResult<LiteralType> {
        let element = Self::element_type(ty)?;
        Ok(LiteralType::collection(TypeEngine::to_literal_type(element)?))
    }

    fn to_literal(
        &self,
        ctx: &ConversionContext,
        value: &NativeValue,
        ty: &NativeType,
        expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        let NativeValue::List(items) = value else {
            return Err(InterchangeError::conversion(ty, "expected a list value"));
        };
        let element = Self::element_type(ty)?;
        let element_expected = match expected.as_collection() {
            Some(t) => t.clone(),
            None => TypeEngine::to_literal_type(element)?,
        };

        let literals = items
            .iter()
            .map(|item| TypeEngine::to_literal(ctx, item, element, &element_expected))
            .collect::<InterchangeResult<Vec<_>>>()?;
        Ok(Literal::collection(literals))
    }

    fn to_native_value(
        &self,
        ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let items = literal
            .as_collection()
            .ok_or_else(|| InterchangeError::conversion(ty, "literal is not a collection"))?;
        let element = Self::element_type(ty)?;

        let values = items
            .iter()
            .map(|item| TypeEngine::to_native_value(ctx, item, element))
            .collect::<InterchangeResult<Vec<_>>>()?;
        Ok(NativeValue::List(values))
    }

    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        match literal_type.as_collection() {
            Some(element) => Ok(NativeType::List(Box::new(TypeEngine::guess_native_type(
                element,
            )?))),
            None => Err(InterchangeError::NotReversible {
                wire_type: literal_type.to_string(),
            }),
        }
    }
}
