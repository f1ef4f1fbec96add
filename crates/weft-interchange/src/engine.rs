//! The stateless conversion facade.

use std::collections::HashMap;
use std::sync::Arc;

use weft_literal::{Literal, LiteralType, Variable, VariableMap};

use crate::context::ConversionContext;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue, RecordType, TypeKey};
use crate::registry;
use crate::transformer::Transformer;

const TRACING_TARGET: &str = "weft_interchange::engine";

/// The extensible conversion engine.
///
/// All entry points are associated functions over the process-wide
/// transformer registry. Surrounding layers (task execution, plugins, the
/// remote client) talk to the interchange core exclusively through this
/// facade and the registration API.
pub struct TypeEngine;

impl TypeEngine {
    /// Registers a transformer for its own key plus any additional keys.
    pub fn register(
        transformer: Arc<dyn Transformer>,
        additional_keys: &[TypeKey],
    ) -> InterchangeResult<()> {
        registry::global().write().register(transformer, additional_keys)
    }

    /// Registers a secondary key for an existing transformer, optionally
    /// overriding a previous owner.
    pub fn register_alias(
        transformer: Arc<dyn Transformer>,
        key: TypeKey,
        override_existing: bool,
    ) {
        registry::global()
            .write()
            .register_alias(transformer, key, override_existing)
    }

    /// Marks a native type as permanently unconvertible.
    pub fn register_restricted(name: &str, key: TypeKey) -> InterchangeResult<()> {
        registry::global().write().register_restricted(name, key)
    }

    /// Looks up the transformer for a native type (see the registry module
    /// for the tier order). Lazily registers record and fallback types.
    pub fn get_transformer(ty: &NativeType) -> InterchangeResult<Arc<dyn Transformer>> {
        registry::resolve(ty)
    }

    /// All registered type keys, in registration order.
    pub fn available_type_keys() -> Vec<TypeKey> {
        registry::global().read().keys()
    }

    /// Computes the wire type for a native type.
    ///
    /// A single annotation payload on the native type becomes the wire
    /// type's annotation; carrying more than one is an error.
    pub fn to_literal_type(ty: &NativeType) -> InterchangeResult<LiteralType> {
        let transformer = Self::get_transformer(ty)?;
        let literal_type = transformer.get_literal_type(ty)?;

        let metas = ty.meta_decorations();
        if metas.len() > 1 {
            return Err(InterchangeError::unsupported(
                ty,
                "at most one annotation payload may decorate a type",
            ));
        }
        Ok(match metas.first() {
            Some(payload) => literal_type.with_annotation((*payload).clone()),
            None => literal_type,
        })
    }

    /// Encodes a native value of a declared type into a wire value.
    pub fn to_literal(
        ctx: &ConversionContext,
        value: &NativeValue,
        ty: &NativeType,
        expected: &LiteralType,
    ) -> InterchangeResult<Literal> {
        if matches!(value, NativeValue::None) && !expected.is_union() {
            return Err(InterchangeError::conversion(
                ty,
                format!("value cannot be none, expected {expected}"),
            ));
        }

        let transformer = Self::get_transformer(ty)?;
        if transformer.type_assertions_enabled() {
            transformer.assert_type(ty, value)?;
        }

        let mut literal = transformer.to_literal(ctx, value, ty, expected)?;
        if let Some(method) = ty.hash_decoration() {
            literal.hash = Some(method.calculate(value));
        }
        Ok(literal)
    }

    /// Decodes a wire value into the expected native type.
    pub fn to_native_value(
        ctx: &ConversionContext,
        literal: &Literal,
        ty: &NativeType,
    ) -> InterchangeResult<NativeValue> {
        let transformer = Self::get_transformer(ty)?;
        transformer.to_native_value(ctx, literal, ty)
    }

    /// Converts a record type to the declared-interface shape, with each
    /// field's position as its description.
    pub fn record_to_variable_map(record: &RecordType) -> InterchangeResult<VariableMap> {
        let mut variables = VariableMap::new();
        for (index, field) in record.fields.iter().enumerate() {
            let literal_type = Self::to_literal_type(&field.ty)?;
            variables.insert(&field.name, Variable::new(literal_type, index.to_string()));
        }
        Ok(variables)
    }

    /// Decodes a literal map into native values, keyed as declared.
    ///
    /// Receiving more literals than the declared types allow is an arity
    /// error; a literal whose key is undeclared is a key error.
    pub fn literal_map_to_kwargs(
        ctx: &ConversionContext,
        literals: &HashMap<String, Literal>,
        types: &HashMap<String, NativeType>,
    ) -> InterchangeResult<HashMap<String, NativeValue>> {
        if literals.len() > types.len() {
            return Err(InterchangeError::Arity {
                received: literals.len(),
                declared: types.len(),
            });
        }

        let mut values = HashMap::with_capacity(literals.len());
        for (key, literal) in literals {
            let ty = types
                .get(key)
                .ok_or_else(|| InterchangeError::KeyNotFound { key: key.clone() })?;
            values.insert(key.clone(), Self::to_native_value(ctx, literal, ty)?);
        }
        Ok(values)
    }

    /// Encodes a map of native values, with optional per-key type hints.
    ///
    /// A hint overrides the value's runtime type; containers need one because
    /// their element types erase. Every failure is wrapped with the offending
    /// key, type, and reason.
    pub fn dict_to_literal_map(
        ctx: &ConversionContext,
        values: &HashMap<String, NativeValue>,
        type_hints: &HashMap<String, NativeType>,
    ) -> InterchangeResult<HashMap<String, Literal>> {
        let mut literals = HashMap::with_capacity(values.len());
        for (key, value) in values {
            let ty = type_hints
                .get(key)
                .cloned()
                .unwrap_or_else(|| value.native_type());
            let literal = Self::to_literal_type(&ty)
                .and_then(|expected| Self::to_literal(ctx, value, &ty, &expected))
                .map_err(|error| InterchangeError::Entry {
                    key: key.clone(),
                    native_type: ty.to_string(),
                    reason: error.to_string(),
                })?;
            literals.insert(key.clone(), literal);
        }
        Ok(literals)
    }

    /// Best-effort reverse inference for a whole interface.
    pub fn guess_native_types(
        variables: &VariableMap,
    ) -> InterchangeResult<HashMap<String, NativeType>> {
        let mut types = HashMap::with_capacity(variables.len());
        for (name, variable) in variables.iter() {
            types.insert(
                name.to_string(),
                Self::guess_native_type(&variable.literal_type)?,
            );
        }
        Ok(types)
    }

    /// Best-effort reverse inference for one wire type.
    ///
    /// Walks registered transformers in registration order until one claims
    /// the wire type.
    pub fn guess_native_type(literal_type: &LiteralType) -> InterchangeResult<NativeType> {
        let transformers = registry::global().read().transformers_in_order();
        for transformer in transformers {
            match transformer.guess_native_type(literal_type) {
                Ok(ty) => return Ok(ty),
                Err(_) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        transformer = transformer.name(),
                        "transformer cannot reverse the wire type"
                    );
                }
            }
        }
        Err(InterchangeError::NotReversible {
            wire_type: literal_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use jiff::{SignedDuration, Timestamp};
    use weft_literal::{Scalar, SimpleType};

    use super::*;
    use crate::native::{
        EnumDef, EnumValue, HashMethod, NativeType, OpaqueValue, RecordValue, TypeDecorations,
    };
    use crate::resolver::LiteralsResolver;

    fn round_trip(value: NativeValue, ty: NativeType) -> NativeValue {
        let ctx = ConversionContext::in_memory();
        let expected = TypeEngine::to_literal_type(&ty).unwrap();
        let literal = TypeEngine::to_literal(&ctx, &value, &ty, &expected).unwrap();
        TypeEngine::to_native_value(&ctx, &literal, &ty).unwrap()
    }

    #[test]
    fn test_simple_round_trips() {
        let cases = vec![
            (NativeValue::Int(-3), NativeType::Int),
            (NativeValue::Float(2.5), NativeType::Float),
            (NativeValue::Bool(true), NativeType::Bool),
            (NativeValue::Str("weft".into()), NativeType::Str),
            (
                NativeValue::Datetime(Timestamp::from_second(1_700_000_000).unwrap()),
                NativeType::Datetime,
            ),
            (
                NativeValue::Duration(SignedDuration::from_secs(90)),
                NativeType::Duration,
            ),
        ];
        for (value, ty) in cases {
            assert_eq!(round_trip(value.clone(), ty), value);
        }
    }

    #[test]
    fn test_float_accepts_integer_literal() {
        let ctx = ConversionContext::in_memory();
        let value = TypeEngine::to_native_value(&ctx, &Literal::integer(4), &NativeType::Float)
            .unwrap();
        assert_eq!(value, NativeValue::Float(4.0));
    }

    #[test]
    fn test_to_literal_rejects_none_for_non_union() {
        let ctx = ConversionContext::in_memory();
        let expected = TypeEngine::to_literal_type(&NativeType::Int).unwrap();
        let err = TypeEngine::to_literal(&ctx, &NativeValue::None, &NativeType::Int, &expected)
            .unwrap_err();
        assert!(matches!(err, InterchangeError::Conversion { .. }));
    }

    #[test]
    fn test_optional_none_round_trip() {
        let ty = NativeType::optional(NativeType::Int);
        assert_eq!(round_trip(NativeValue::None, ty), NativeValue::None);
    }

    #[test]
    fn test_union_encode_tags_the_winning_variant() {
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::Union(vec![NativeType::Int, NativeType::Str]);
        let expected = TypeEngine::to_literal_type(&ty).unwrap();

        let literal =
            TypeEngine::to_literal(&ctx, &NativeValue::Str("x".into()), &ty, &expected).unwrap();
        let union = literal.as_union().unwrap();
        assert_eq!(union.stored_type.tag(), Some("str"));

        let back = TypeEngine::to_native_value(&ctx, &literal, &ty).unwrap();
        assert_eq!(back, NativeValue::Str("x".into()));
    }

    #[test]
    fn test_union_ambiguous_encode_fails() {
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::Union(vec![NativeType::Int, NativeType::Int]);
        let expected = TypeEngine::to_literal_type(&ty).unwrap();

        let err = TypeEngine::to_literal(&ctx, &NativeValue::Int(1), &ty, &expected).unwrap_err();
        assert!(matches!(err, InterchangeError::AmbiguousUnionMatch { .. }));
    }

    #[test]
    fn test_enum_round_trip() {
        let def = EnumDef::new("test.engine.Color", ["RED", "GREEN"]);
        let ty = NativeType::Enum(def.clone());
        let value = NativeValue::Enum(EnumValue::new(def, "GREEN"));

        let expected = TypeEngine::to_literal_type(&ty).unwrap();
        assert_eq!(
            expected.as_enum().map(|e| e.values.clone()),
            Some(vec!["RED".to_string(), "GREEN".to_string()])
        );
        assert_eq!(round_trip(value.clone(), ty), value);
    }

    #[test]
    fn test_list_round_trip_preserves_order() {
        let ty = NativeType::List(Box::new(NativeType::Int));
        let value = NativeValue::List(vec![
            NativeValue::Int(3),
            NativeValue::Int(1),
            NativeValue::Int(2),
        ]);
        assert_eq!(round_trip(value.clone(), ty), value);
    }

    #[test]
    fn test_typed_map_round_trip() {
        let ty = NativeType::Map(Box::new(NativeType::Str));
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), NativeValue::Str("1".into()));
        entries.insert("b".to_string(), NativeValue::Str("2".into()));
        let value = NativeValue::Map(entries);
        assert_eq!(round_trip(value.clone(), ty), value);
    }

    #[test]
    fn test_untyped_map_degrades_to_struct_and_back() {
        let ty = NativeType::Map(Box::new(NativeType::Unknown));
        assert_eq!(
            TypeEngine::to_literal_type(&ty).unwrap().as_simple(),
            Some(SimpleType::Struct)
        );

        let mut entries = HashMap::new();
        entries.insert("n".to_string(), NativeValue::Int(1));
        entries.insert("s".to_string(), NativeValue::Str("x".into()));
        let value = NativeValue::Map(entries);
        assert_eq!(round_trip(value.clone(), ty), value);
    }

    fn point_type(name: &str) -> NativeType {
        NativeType::Record(RecordType::new(
            name,
            vec![("a", NativeType::Int), ("b", NativeType::Str)],
        ))
    }

    #[test]
    fn test_record_round_trip() {
        let ty = point_type("test.engine.Pair");
        let value = NativeValue::Record(RecordValue::new(
            "test.engine.Pair",
            vec![
                ("a", NativeValue::Int(1)),
                ("b", NativeValue::Str("x".into())),
            ],
        ));
        assert_eq!(round_trip(value.clone(), ty), value);
    }

    #[test]
    fn test_record_decode_requires_every_field() {
        let ctx = ConversionContext::in_memory();
        let ty = point_type("test.engine.Partial");
        let value = NativeValue::Record(RecordValue::new(
            "test.engine.Partial",
            vec![
                ("a", NativeValue::Int(1)),
                ("b", NativeValue::Str("x".into())),
            ],
        ));

        let expected = TypeEngine::to_literal_type(&ty).unwrap();
        assert_eq!(expected.tag(), Some("test.engine.Partial"));
        let literal = TypeEngine::to_literal(&ctx, &value, &ty, &expected).unwrap();

        let mut entries = literal.as_map().unwrap().clone();
        entries.remove("b");
        let err = TypeEngine::to_native_value(&ctx, &Literal::map(entries), &ty).unwrap_err();
        assert!(matches!(err, InterchangeError::Conversion { .. }));
    }

    #[test]
    fn test_record_transformer_is_registered_once() {
        let ty = point_type("test.engine.CachedRecord");
        let first = TypeEngine::get_transformer(&ty).unwrap();
        let _ = TypeEngine::to_literal_type(&ty).unwrap();
        let second = TypeEngine::get_transformer(&ty).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_fallback_round_trips_and_is_registered_once() {
        let ty = NativeType::Opaque("test.engine.Widget".into());
        let value = NativeValue::Opaque(OpaqueValue::new(
            "test.engine.Widget",
            serde_json::json!({"size": 3, "label": "w"}),
        ));

        assert_eq!(round_trip(value.clone(), ty.clone()), value);

        let first = TypeEngine::get_transformer(&ty).unwrap();
        assert_eq!(round_trip(value.clone(), ty.clone()), value);
        let second = TypeEngine::get_transformer(&ty).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(
            TypeEngine::available_type_keys()
                .contains(&TypeKey::Named("test.engine.Widget".into()))
        );
    }

    #[test]
    fn test_restricted_tuple_cannot_convert() {
        let ty = NativeType::Tuple(vec![NativeType::Int, NativeType::Str]);
        let err = TypeEngine::to_literal_type(&ty).unwrap_err();
        assert!(matches!(err, InterchangeError::RestrictedType { .. }));
    }

    #[test]
    fn test_duplicate_registration_fails_through_facade() {
        struct Named(&'static str, &'static str);
        impl Transformer for Named {
            fn name(&self) -> &str {
                self.0
            }
            fn type_key(&self) -> TypeKey {
                TypeKey::Named(self.1.to_string())
            }
            fn get_literal_type(&self, _ty: &NativeType) -> InterchangeResult<LiteralType> {
                Ok(LiteralType::simple(SimpleType::Integer))
            }
            fn to_literal(
                &self,
                _ctx: &ConversionContext,
                _value: &NativeValue,
                _ty: &NativeType,
                _expected: &LiteralType,
            ) -> InterchangeResult<Literal> {
                Ok(Literal::integer(0))
            }
            fn to_native_value(
                &self,
                _ctx: &ConversionContext,
                _literal: &Literal,
                _ty: &NativeType,
            ) -> InterchangeResult<NativeValue> {
                Ok(NativeValue::Int(0))
            }
        }

        TypeEngine::register(Arc::new(Named("original", "test.engine.Owned")), &[]).unwrap();
        let err =
            TypeEngine::register(Arc::new(Named("intruder", "test.engine.Owned")), &[]).unwrap_err();
        assert!(matches!(err, InterchangeError::DuplicateRegistration { .. }));

        let owner =
            TypeEngine::get_transformer(&NativeType::Opaque("test.engine.Owned".into())).unwrap();
        assert_eq!(owner.name(), "original");
    }

    struct CountingTransformer {
        key: TypeKey,
        decodes: Arc<AtomicUsize>,
    }

    impl Transformer for CountingTransformer {
        fn name(&self) -> &str {
            "counting"
        }
        fn type_key(&self) -> TypeKey {
            self.key.clone()
        }
        fn get_literal_type(&self, _ty: &NativeType) -> InterchangeResult<LiteralType> {
            Ok(LiteralType::simple(SimpleType::Integer))
        }
        fn to_literal(
            &self,
            _ctx: &ConversionContext,
            _value: &NativeValue,
            _ty: &NativeType,
            _expected: &LiteralType,
        ) -> InterchangeResult<Literal> {
            Ok(Literal::integer(0))
        }
        fn to_native_value(
            &self,
            _ctx: &ConversionContext,
            literal: &Literal,
            _ty: &NativeType,
        ) -> InterchangeResult<NativeValue> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            match literal.as_primitive() {
                Some(weft_literal::Primitive::Integer(i)) => Ok(NativeValue::Int(*i)),
                _ => Err(InterchangeError::conversion("counting", "not an integer")),
            }
        }
    }

    #[test]
    fn test_resolver_caches_decoded_values() {
        let decodes = Arc::new(AtomicUsize::new(0));
        TypeEngine::register(
            Arc::new(CountingTransformer {
                key: TypeKey::Named("test.engine.Counted".into()),
                decodes: decodes.clone(),
            }),
            &[],
        )
        .unwrap();

        let ctx = ConversionContext::in_memory();
        let mut literals = HashMap::new();
        literals.insert("x".to_string(), Literal::integer(5));
        let mut resolver = LiteralsResolver::new(literals, None);

        let ty = NativeType::Opaque("test.engine.Counted".into());
        let first = resolver.get(&ctx, "x", Some(&ty)).unwrap();
        assert_eq!(first, NativeValue::Int(5));
        assert_eq!(decodes.load(Ordering::SeqCst), 1);

        // cached: no second decode, even with a different requested type
        let second = resolver.get(&ctx, "x", None).unwrap();
        assert_eq!(second, NativeValue::Int(5));
        let third = resolver.get(&ctx, "x", Some(&NativeType::Int)).unwrap();
        assert_eq!(third, NativeValue::Int(5));
        assert_eq!(decodes.load(Ordering::SeqCst), 1);

        let err = resolver.get(&ctx, "absent", Some(&ty)).unwrap_err();
        assert!(matches!(err, InterchangeError::KeyNotFound { .. }));
    }

    #[test]
    fn test_resolver_infers_from_variable_map() {
        let ctx = ConversionContext::in_memory();

        let mut literals = HashMap::new();
        literals.insert(
            "xs".to_string(),
            Literal::collection(vec![Literal::integer(1), Literal::integer(2)]),
        );
        literals.insert("untyped".to_string(), Literal::integer(9));

        let mut variables = VariableMap::new();
        variables.insert(
            "xs",
            Variable::new(
                LiteralType::collection(LiteralType::simple(SimpleType::Integer)),
                "0",
            ),
        );

        let mut resolver = LiteralsResolver::new(literals, Some(variables));
        let value = resolver.get(&ctx, "xs", None).unwrap();
        assert_eq!(
            value,
            NativeValue::List(vec![NativeValue::Int(1), NativeValue::Int(2)])
        );

        // no as_type, no hint, no declared variable
        let err = resolver.get(&ctx, "untyped", None).unwrap_err();
        assert!(matches!(err, InterchangeError::Inference { .. }));
    }

    #[test]
    fn test_resolver_hint_is_used_when_no_as_type() {
        let ctx = ConversionContext::in_memory();
        let mut literals = HashMap::new();
        literals.insert("n".to_string(), Literal::integer(6));

        let mut resolver = LiteralsResolver::new(literals, None);
        let mut hints = HashMap::new();
        hints.insert("n".to_string(), NativeType::Int);
        resolver.update_type_hints(hints);

        assert_eq!(resolver.get(&ctx, "n", None).unwrap(), NativeValue::Int(6));
    }

    #[test]
    fn test_literal_map_to_kwargs_checks_arity() {
        let ctx = ConversionContext::in_memory();

        let mut literals = HashMap::new();
        literals.insert("a".to_string(), Literal::integer(1));
        literals.insert("b".to_string(), Literal::integer(2));

        let mut types = HashMap::new();
        types.insert("a".to_string(), NativeType::Int);

        let err = TypeEngine::literal_map_to_kwargs(&ctx, &literals, &types).unwrap_err();
        assert!(matches!(
            err,
            InterchangeError::Arity {
                received: 2,
                declared: 1
            }
        ));

        types.insert("b".to_string(), NativeType::Int);
        let values = TypeEngine::literal_map_to_kwargs(&ctx, &literals, &types).unwrap();
        assert_eq!(values["a"], NativeValue::Int(1));
        assert_eq!(values["b"], NativeValue::Int(2));
    }

    #[test]
    fn test_dict_to_literal_map_hint_overrides_runtime_type() {
        let ctx = ConversionContext::in_memory();

        let mut values = HashMap::new();
        values.insert(
            "xs".to_string(),
            NativeValue::List(vec![NativeValue::Int(1)]),
        );

        // a bare list erases its element type and cannot convert unaided
        let err = TypeEngine::dict_to_literal_map(&ctx, &values, &HashMap::new()).unwrap_err();
        let InterchangeError::Entry { key, .. } = err else {
            panic!("expected an entry error");
        };
        assert_eq!(key, "xs");

        let mut hints = HashMap::new();
        hints.insert("xs".to_string(), NativeType::List(Box::new(NativeType::Int)));
        let literals = TypeEngine::dict_to_literal_map(&ctx, &values, &hints).unwrap();
        assert_eq!(literals["xs"].as_collection().map(<[Literal]>::len), Some(1));
    }

    #[test]
    fn test_record_to_variable_map_orders_and_numbers_fields() {
        let record = RecordType::new(
            "test.engine.Interface",
            vec![("first", NativeType::Int), ("second", NativeType::Str)],
        );
        let variables = TypeEngine::record_to_variable_map(&record).unwrap();

        let collected: Vec<(&str, &str)> = variables
            .iter()
            .map(|(name, v)| (name, v.description.as_str()))
            .collect();
        assert_eq!(collected, vec![("first", "0"), ("second", "1")]);
    }

    #[test]
    fn test_annotation_payload_propagates_to_wire_type() {
        let annotated = NativeType::annotated(
            NativeType::Int,
            TypeDecorations::meta(serde_json::json!({"owner": "tests"})),
        );
        let lt = TypeEngine::to_literal_type(&annotated).unwrap();
        assert_eq!(lt.annotation, Some(serde_json::json!({"owner": "tests"})));

        let twice = NativeType::annotated(
            annotated,
            TypeDecorations::meta(serde_json::json!({"second": true})),
        );
        let err = TypeEngine::to_literal_type(&twice).unwrap_err();
        assert!(matches!(err, InterchangeError::UnsupportedType { .. }));
    }

    #[test]
    fn test_hash_decoration_populates_literal_hash() {
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::annotated(
            NativeType::Str,
            TypeDecorations::hash(HashMethod::new(|value| match value {
                NativeValue::Str(s) => format!("len:{}", s.len()),
                _ => String::new(),
            })),
        );

        let expected = TypeEngine::to_literal_type(&ty).unwrap();
        let literal =
            TypeEngine::to_literal(&ctx, &NativeValue::Str("abc".into()), &ty, &expected).unwrap();
        assert_eq!(literal.hash.as_deref(), Some("len:3"));
    }

    #[test]
    fn test_guess_native_types_across_an_interface() {
        let mut variables = VariableMap::new();
        variables.insert(
            "count",
            Variable::new(LiteralType::simple(SimpleType::Integer), "0"),
        );
        variables.insert(
            "names",
            Variable::new(
                LiteralType::collection(LiteralType::simple(SimpleType::String)),
                "1",
            ),
        );
        variables.insert(
            "choice",
            Variable::new(
                LiteralType::union(vec![
                    LiteralType::simple(SimpleType::Integer),
                    LiteralType::simple(SimpleType::None),
                ]),
                "2",
            ),
        );

        let types = TypeEngine::guess_native_types(&variables).unwrap();
        assert_eq!(types["count"], NativeType::Int);
        assert_eq!(
            types["names"],
            NativeType::List(Box::new(NativeType::Str))
        );
        assert_eq!(
            types["choice"],
            NativeType::Union(vec![NativeType::Int, NativeType::None])
        );
    }

    #[test]
    fn test_guess_fails_for_unclaimed_wire_types() {
        let lt = LiteralType::blob(weft_literal::BlobType::single("application/x-unclaimed"));
        let err = TypeEngine::guess_native_type(&lt).unwrap_err();
        assert!(matches!(err, InterchangeError::NotReversible { .. }));
    }

    #[test]
    fn test_union_literal_decodes_without_tag() {
        // a bare none scalar decoded against an optional yields none
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::optional(NativeType::Int);
        let value = TypeEngine::to_native_value(&ctx, &Literal::none(), &ty).unwrap();
        assert_eq!(value, NativeValue::None);
    }

    #[test]
    fn test_text_stream_round_trips_through_a_local_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ConversionContext::new(Arc::new(crate::context::LocalDirStore::new(dir.path())));

        let ty = NativeType::TextStream;
        let value = NativeValue::Stream(crate::native::StreamHandle::text(&b"hello"[..]));

        let expected = TypeEngine::to_literal_type(&ty).unwrap();
        let literal = TypeEngine::to_literal(&ctx, &value, &ty, &expected).unwrap();
        assert!(literal.as_blob().unwrap().uri.starts_with("file://"));

        let back = TypeEngine::to_native_value(&ctx, &literal, &ty).unwrap();
        let NativeValue::Stream(handle) = back else {
            panic!("expected a stream handle");
        };
        assert_eq!(handle.contents.as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_union_stored_type_survives_the_wire_model() {
        let ctx = ConversionContext::in_memory();
        let ty = NativeType::Union(vec![NativeType::Int, NativeType::Str]);
        let expected = TypeEngine::to_literal_type(&ty).unwrap();
        let literal = TypeEngine::to_literal(&ctx, &NativeValue::Int(1), &ty, &expected).unwrap();

        match literal.as_scalar() {
            Some(Scalar::Union(u)) => {
                assert_eq!(u.stored_type.tag(), Some("int"));
                assert_eq!(u.value, Literal::integer(1));
            }
            _ => panic!("expected a union scalar"),
        }
    }
}
