//! Union transformer.
//!
//! Encoding tries every declared variant and counts successes: zero is a
//! conversion failure, two is a declared-variant design flaw surfaced as an
//! ambiguity error. The winning variant's wire type is tagged with its
//! transformer name so decoding can go straight to the right variant.

use weft_literal::{Literal, LiteralType, Scalar, UnionValue};

use crate::castable::are_castable;
use crate::context::ConversionContext;
use crate::engine::TypeEngine;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue, TypeKey};
use crate::transformer::Transformer;

const TRACING_TARGET: &str = "weft_interchange::union";

/// Transformer for unions (including optionals).
pub struct UnionTransformer;

impl UnionTransformer {
    fn variants(ty: &NativeType) -> InterchangeResult<&[NativeType]> {
        match ty.strip_annotations() {
            NativeType::Union(variants) => Ok(variants),
            other => Err(InterchangeError::unsupported(other, "not a union type")),
        }
    }

    /// Tries every variant against the literal, counting successes.
    fn try_all_variants(
        ctx: &ConversionContext,
        literal: &Literal,
        variants: &[NativeType],
    ) -> InterchangeResult<Option<NativeValue>> {
        let mut found: Option<(NativeValue, String)> = None;
        for variant in variants {
            let Ok(transformer) = TypeEngine::get_transformer(variant) else {
                continue;
            };
            match transformer.to_native_value(ctx, literal, variant) {
                Ok(value) => {
                    if let Some((_, first)) = &found {
                        return Err(InterchangeError::AmbiguousUnionMatch {
                            first: first.clone(),
                            second: transformer.name().to_string(),
                        });
                    }
                    found = Some((value, transformer.name().to_string()));
                }
                Err(error) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        variant = %variant,
                        %error,
                        "union variant did not accept the literal"
                    );
                }
            }
        }
        Ok(found.map(|(value, _)| value))
    }
}

impl Transformer for UnionTransformer {
    fn name(&self) -> &str {
        "union"
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::Union
    }

    fn get_literal_type(&self, ty: &NativeType) -> InterchangeResult<LiteralType> {
        let variants = Self::variants(ty)?
            .iter()
            .map(|variant| {
                let transformer = TypeEngine::get_transformer(variant)?;
                Ok(TypeEngine::to_literal_type(variant)?.with_tag(transformer.name()))
            })
            .collect::<InterchangeResult<Vec<_>>>()?;
        Ok(LiteralType::union(variants))
    }

    fn to_literal(
        &self,
        ctx: &ConversionContext,
        value: &NativeValue,
        ty: &NativeType,
        _expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        let mut found: Option<(Literal, LiteralType, String)> = None;

        for variant in Self::variants(ty)? {
            let Ok(transformer) = TypeEngine::get_transformer(variant) else {
                continue;
            };
            if transformer.type_assertions_enabled()
                && transformer.assert_type(variant, value).is_err()
            {
                continue;
            }
            let Ok(variant_expected) = TypeEngine::to_literal_type(variant) else {
                continue;
            };

            match transformer.to_literal(ctx, value, variant, &variant_expected) {
                Ok(literal) => {
                    if let Some((_, _, first)) = &found {
                        return Err(InterchangeError::AmbiguousUnionMatch {
                            first: first.clone(),
                            second: transformer.name().to_string(),
                        });
                    }
                    let stored_type = variant_expected.with_tag(transformer.name());
                    found = Some((literal, stored_type, transformer.name().to_string()));
                }
                Err(error) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        variant = %variant,
                        %error,
                        "union variant did not accept the value"
                    );
                }
            }
        }

        match found {
            Some((literal, stored_type, _)) => Ok(Literal::scalar(Scalar::Union(Box::new(
                UnionValue {
                    value: literal,
                    stored_type,
                },
            )))),
            None => Err(InterchangeError::conversion(
                ty,
                "no union variant accepted the value",
            )),
        }
    }

    fn to_native_value(
        &self,
        ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let variants = Self::variants(ty)?;

        let found = match literal.as_union() {
            Some(union_value) => {
                let tag = union_value.stored_type.tag();
                let mut directed: Option<NativeValue> = None;
                let mut attempted = false;

                if let Some(tag) = tag {
                    for variant in variants {
                        let Ok(transformer) = TypeEngine::get_transformer(variant) else {
                            continue;
                        };
                        if transformer.name() != tag {
                            continue;
                        }
                        let Ok(variant_type) = TypeEngine::to_literal_type(variant) else {
                            continue;
                        };
                        if !are_castable(&union_value.stored_type, &variant_type) {
                            continue;
                        }
                        attempted = true;
                        match transformer.to_native_value(ctx, &union_value.value, variant) {
                            Ok(value) => {
                                directed = Some(value);
                                break;
                            }
                            Err(error) => {
                                tracing::debug!(
                                    target: TRACING_TARGET,
                                    variant = %variant,
                                    %error,
                                    "tagged union variant did not accept the literal"
                                );
                            }
                        }
                    }
                }

                if directed.is_some() || attempted {
                    directed
                } else {
                    // tag absent or resolving to no variant: try them all
                    Self::try_all_variants(ctx, &union_value.value, variants)?
                }
            }
            None => Self::try_all_variants(ctx, literal, variants)?,
        };

        found.ok_or_else(|| {
            InterchangeError::conversion(ty, "no union variant accepted the literal")
        })
    }

    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        match literal_type.as_union() {
            Some(union) => Ok(NativeType::Union(
                union
                    .variants
                    .iter()
                    .map(TypeEngine::guess_native_type)
                    .collect::<InterchangeResult<Vec<_>>>()?,
            )),
            None => Err(InterchangeError::NotReversible {
                wire_type: literal_type.to_string(),
            }),
        }
    }
}
