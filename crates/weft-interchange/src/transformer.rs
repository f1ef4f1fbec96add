//! The transformer contract.
//!
//! A [`Transformer`] is the unit of conversion for one native type or type
//! family: it computes the wire type, encodes native values, decodes wire
//! values, and optionally reverse-infers a native type from a wire type.
//! Transformers are registered once and immutable afterwards, so they are
//! safe for unsynchronized concurrent use.

use weft_literal::{Literal, LiteralType, SimpleType};

use crate::context::ConversionContext;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue, TypeKey};

/// Conversion unit bound to one native type or type family.
pub trait Transformer: Send + Sync {
    /// Human-readable name; also the tag recorded on union variants.
    fn name(&self) -> &str;

    /// The registry key this transformer owns.
    fn type_key(&self) -> TypeKey;

    /// Whether the engine should run [`Transformer::assert_type`] before
    /// encoding.
    fn type_assertions_enabled(&self) -> bool {
        true
    }

    /// Checks that a runtime value is an instance of the declared type.
    ///
    /// The default is a shallow check; parameterized types pass and defer to
    /// per-element checks inside their transformer.
    fn assert_type(&self, ty: &NativeType, value: &NativeValue) -> InterchangeResult<()> {
        if ty.strip_annotations().is_instance(value) {
            Ok(())
        } else {
            Err(InterchangeError::conversion(
                ty,
                format!(
                    "value of type {} is not an instance of the declared type",
                    value.type_key()
                ),
            ))
        }
    }

    /// Computes the wire type for a native type.
    fn get_literal_type(&self, ty: &NativeType) -> InterchangeResult<LiteralType>;

    /// Encodes a native value, assumed to match the declared native type.
    fn to_literal(
        &self,
        ctx: &ConversionContext,
        value: &NativeValue,
        ty: &NativeType,
        expected: &LiteralType,
    ) -> InterchangeResult<Literal>;

    /// Decodes a wire value into the expected native type.
    fn to_native_value(
        &self,
        ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue>;

    /// Reverse-infers a native type from a wire type.
    ///
    /// Most transformers carry too little wire-type information to reverse
    /// and keep the default.
    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        Err(InterchangeError::NotReversible {
            wire_type: literal_type.to_string(),
        })
    }
}

/// A transformer for one simple scalar kind, built from plain functions.
pub struct SimpleTransformer {
    name: &'static str,
    key: TypeKey,
    native: NativeType,
    simple: SimpleType,
    encode: fn(&NativeValue) -> InterchangeResult<Literal>,
    decode: fn(&Literal) -> InterchangeResult<NativeValue>,
}

impl SimpleTransformer {
    /// Creates a simple transformer.
    pub fn new(
        name: &'static str,
        native: NativeType,
        simple: SimpleType,
        encode: fn(&NativeValue) -> InterchangeResult<Literal>,
        decode: fn(&Literal) -> InterchangeResult<NativeValue>,
    ) -> Self {
        Self {
            name,
            key: native.type_key(),
            native,
            simple,
            encode,
            decode,
        }
    }
}

impl Transformer for SimpleTransformer {
    fn name(&self) -> &str {
        self.name
    }

    fn type_key(&self) -> TypeKey {
        self.key.clone()
    }

    fn get_literal_type(&self, _ty: &NativeType) -> InterchangeResult<LiteralType> {
        Ok(LiteralType::simple(self.simple))
    }

    fn to_literal(
        &self,
        _ctx: &ConversionContext,
        value: &NativeValue,
        _ty: &NativeType,
        _expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        if value.type_key() != self.key {
            return Err(InterchangeError::conversion(
                &self.native,
                format!("expected a {} value, got {}", self.key, value.type_key()),
            ));
        }
        (self.encode)(value)
    }

    fn to_native_value(
        &self,
        _ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        if ty.strip_annotations().type_key() != self.key {
            return Err(InterchangeError::conversion(
                ty,
                format!("only {} is supported by this transformer", self.key),
            ));
        }
        (self.decode)(literal)
    }

    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        if literal_type.as_simple() == Some(self.simple) {
            Ok(self.native.clone())
        } else {
            Err(InterchangeError::NotReversible {
                wire_type: literal_type.to_string(),
            })
        }
    }
}

/// A transformer for types that must never produce a wire value.
///
/// Restricted types cannot be used as task inputs or outputs; every
/// operation fails.
pub struct RestrictedTypeTransformer {
    name: String,
    key: TypeKey,
}

impl RestrictedTypeTransformer {
    /// Creates a restricted transformer for the given key.
    pub fn new(name: impl Into<String>, key: TypeKey) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }

    fn restricted(&self) -> InterchangeError {
        InterchangeError::RestrictedType {
            native_type: self.key.to_string(),
        }
    }
}

impl Transformer for RestrictedTypeTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_key(&self) -> TypeKey {
        self.key.clone()
    }

    fn get_literal_type(&self, _ty: &NativeType) -> InterchangeResult<LiteralType> {
        Err(self.restricted())
    }

    fn to_literal(
        &self,
        _ctx: &ConversionContext,
        _value: &NativeValue,
        _ty: &NativeType,
        _expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        Err(self.restricted())
    }

    fn to_native_value(
        &self,
        _ctx: &ConversionContext,
        _literal: &Literal,
        _ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        Err(self.restricted())
    }
}
