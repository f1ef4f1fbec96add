//! Record transformer.
//!
//! Built lazily, one instance per record type: construction asks the registry
//! for one sub-transformer per declared field. The wire type is a struct
//! carrying each field's wire type as metadata and the record's
//! fully-qualified name as its structural tag. Values encode to a literal
//! map, walking fields in declaration order; decode requires every declared
//! field to be present.

use std::collections::HashMap;
use std::sync::Arc;

use weft_literal::{Literal, LiteralType, SimpleType};

use crate::context::ConversionContext;
use crate::engine::TypeEngine;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue, RecordType, RecordValue, TypeKey};
use crate::transformer::Transformer;

struct FieldSlot {
    name: String,
    ty: NativeType,
    transformer: Arc<dyn Transformer>,
}

/// Transformer for one structural record type.
pub struct RecordTransformer {
    name: String,
    record: RecordType,
    fields: Vec<FieldSlot>,
}

impl RecordTransformer {
    /// Builds the transformer for a record type, resolving one
    /// sub-transformer per declared field.
    pub fn new(record: &RecordType) -> InterchangeResult<Self> {
        let fields = record
            .fields
            .iter()
            .map(|field| {
                Ok(FieldSlot {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    transformer: TypeEngine::get_transformer(&field.ty)?,
                })
            })
            .collect::<InterchangeResult<Vec<_>>>()?;

        Ok(Self {
            name: format!("Record[{}]", record.name),
            record: record.clone(),
            fields,
        })
    }

    fn check_value<'v>(&self, value: &'v NativeValue) -> InterchangeResult<&'v RecordValue> {
        match value {
            NativeValue::Record(record) if record.type_name == self.record.name => Ok(record),
            NativeValue::Record(record) => Err(InterchangeError::conversion(
                &self.record.name,
                format!("value belongs to record type {}", record.type_name),
            )),
            _ => Err(InterchangeError::conversion(
                &self.record.name,
                "expected a record value",
            )),
        }
    }
}

impl Transformer for RecordTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::Named(self.record.name.clone())
    }

    fn assert_type(&self, _ty: &NativeType, value: &NativeValue) -> InterchangeResult<()> {
        let record = self.check_value(value)?;
        for slot in &self.fields {
            let field_value = record.field(&slot.name).ok_or_else(|| {
                InterchangeError::conversion(
                    &self.record.name,
                    format!("value is missing field {}", slot.name),
                )
            })?;
            if slot.transformer.type_assertions_enabled() {
                slot.transformer.assert_type(&slot.ty, field_value)?;
            }
        }
        Ok(())
    }

    fn get_literal_type(&self, _ty: &NativeType) -> InterchangeResult<LiteralType> {
        let mut field_types = serde_json::Map::with_capacity(self.fields.len());
        for slot in &self.fields {
            field_types.insert(
                slot.name.clone(),
                serde_json::to_value(TypeEngine::to_literal_type(&slot.ty)?)?,
            );
        }
        Ok(LiteralType::simple(SimpleType::Struct)
            .with_metadata(serde_json::Value::Object(field_types))
            .with_tag(&self.record.name))
    }

    fn to_literal(
        &self,
        ctx: &ConversionContext,
        value: &NativeValue,
        _ty: &NativeType,
        _expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        let record = self.check_value(value)?;

        let mut literals = HashMap::with_capacity(self.fields.len());
        for slot in &self.fields {
            let field_value = record.field(&slot.name).ok_or_else(|| {
                InterchangeError::conversion(
                    &self.record.name,
                    format!("value is missing field {}", slot.name),
                )
            })?;
            let field_expected = TypeEngine::to_literal_type(&slot.ty)?;
            literals.insert(
                slot.name.clone(),
                slot.transformer
                    .to_literal(ctx, field_value, &slot.ty, &field_expected)?,
            );
        }
        Ok(Literal::map(literals))
    }

    fn to_native_value(
        &self,
        ctx: &ConversionContext,
        literal: &Literal,
        _ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let entries = literal.as_map().ok_or_else(|| {
            InterchangeError::conversion(&self.record.name, "literal is not a map of fields")
        })?;

        let mut fields = Vec::with_capacity(self.fields.len());
        for slot in &self.fields {
            let field_literal = entries.get(&slot.name).ok_or_else(|| {
                InterchangeError::conversion(
                    &self.record.name,
                    format!("literal map is missing field {}", slot.name),
                )
            })?;
            fields.push((
                slot.name.clone(),
                slot.transformer
                    .to_native_value(ctx, field_literal, &slot.ty)?,
            ));
        }
        Ok(NativeValue::Record(RecordValue {
            type_name: self.record.name.clone(),
            fields,
        }))
    }

    fn guess_native_type(&self, literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        if literal_type.as_simple() == Some(SimpleType::Struct)
            && literal_type.tag() == Some(self.record.name.as_str())
        {
            return Ok(NativeType::Record(self.record.clone()));
        }
        Err(InterchangeError::NotReversible {
            wire_type: literal_type.to_string(),
        })
    }
}
