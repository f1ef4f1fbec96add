//! The process-wide transformer registry and its dispatch algorithm.
//!
//! The registry is populated with built-ins at first use and grows
//! monotonically as record and fallback types are first seen. Reads clone
//! `Arc`s under the read lock; lazy registration is an insert-if-absent under
//! the write lock. Transformer construction must happen outside either lock:
//! record construction recursively resolves field transformers.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, TypeKey};
use crate::transform::{self, OpaqueTransformer, RecordTransformer};
use crate::transformer::{RestrictedTypeTransformer, Transformer};

const TRACING_TARGET: &str = "weft_interchange::registry";

/// An explicitly ordered structural dispatch rule.
///
/// Rules replace inheritance-style matching: a rule recognizes a structural
/// shape of native type and routes it to a family key. Walk order is the
/// declared order of the rule list, which makes the tie-break between
/// overlapping rules part of the registry's contract.
#[derive(Debug, Clone)]
pub struct StructuralRule {
    /// Rule name, for diagnostics.
    pub name: &'static str,
    /// Maps a matching native type to the family key to dispatch to.
    pub matcher: fn(&NativeType) -> Option<TypeKey>,
}

/// Mapping from native type keys to transformers.
pub struct TransformerRegistry {
    by_key: HashMap<TypeKey, Arc<dyn Transformer>>,
    /// Registration order; reverse inference walks transformers in this order.
    order: Vec<TypeKey>,
    rules: Vec<StructuralRule>,
    restricted: Vec<TypeKey>,
}

impl TransformerRegistry {
    /// Creates an empty registry with the default structural rules.
    pub(crate) fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            order: Vec::new(),
            rules: vec![
                StructuralRule {
                    name: "enumeration",
                    matcher: |ty| matches!(ty, NativeType::Enum(_)).then_some(TypeKey::Enum),
                },
                StructuralRule {
                    name: "message",
                    matcher: |ty| matches!(ty, NativeType::Message(_)).then_some(TypeKey::Message),
                },
            ],
            restricted: Vec::new(),
        }
    }

    /// Creates a registry populated with the built-in transformers.
    pub(crate) fn with_defaults() -> Self {
        let mut registry = Self::new();
        transform::register_defaults(&mut registry);
        registry
    }

    /// Registers a transformer for its own key plus any additional keys.
    ///
    /// Registering a key that is already owned fails without touching the
    /// registry.
    pub fn register(
        &mut self,
        transformer: Arc<dyn Transformer>,
        additional_keys: &[TypeKey],
    ) -> InterchangeResult<()> {
        let mut keys = vec![transformer.type_key()];
        keys.extend_from_slice(additional_keys);

        for key in &keys {
            if let Some(existing) = self.by_key.get(key) {
                return Err(InterchangeError::DuplicateRegistration {
                    native_type: key.to_string(),
                    existing: existing.name().to_string(),
                    attempted: transformer.name().to_string(),
                });
            }
        }
        for key in keys {
            self.order.push(key.clone());
            self.by_key.insert(key, transformer.clone());
        }
        Ok(())
    }

    /// Registers a secondary key for an existing transformer.
    ///
    /// Inserts only if the key is free, unless `override_existing` is set.
    pub fn register_alias(
        &mut self,
        transformer: Arc<dyn Transformer>,
        key: TypeKey,
        override_existing: bool,
    ) {
        if override_existing || !self.by_key.contains_key(&key) {
            if !self.by_key.contains_key(&key) {
                self.order.push(key.clone());
            }
            self.by_key.insert(key, transformer);
        }
    }

    /// Marks a type as permanently unconvertible.
    pub fn register_restricted(
        &mut self,
        name: impl Into<String>,
        key: TypeKey,
    ) -> InterchangeResult<()> {
        self.restricted.push(key.clone());
        self.register(
            Arc::new(RestrictedTypeTransformer::new(name, key)),
            &[],
        )
    }

    /// Returns the transformer registered for a key.
    pub fn get(&self, key: &TypeKey) -> Option<Arc<dyn Transformer>> {
        self.by_key.get(key).cloned()
    }

    /// Inserts a transformer unless the key was registered concurrently;
    /// returns the transformer that owns the key afterwards.
    pub(crate) fn insert_if_absent(
        &mut self,
        key: TypeKey,
        transformer: Arc<dyn Transformer>,
    ) -> Arc<dyn Transformer> {
        if let Some(existing) = self.by_key.get(&key) {
            return existing.clone();
        }
        self.order.push(key.clone());
        self.by_key.insert(key, transformer.clone());
        transformer
    }

    /// Applies the structural rules in declared order.
    fn match_rules(&self, ty: &NativeType) -> Option<Arc<dyn Transformer>> {
        for rule in &self.rules {
            if let Some(key) = (rule.matcher)(ty) {
                if let Some(transformer) = self.by_key.get(&key) {
                    return Some(transformer.clone());
                }
            }
        }
        None
    }

    /// All registered keys, in registration order.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.order.clone()
    }

    /// All registered transformers, in registration order.
    pub(crate) fn transformers_in_order(&self) -> Vec<Arc<dyn Transformer>> {
        self.order
            .iter()
            .filter_map(|key| self.by_key.get(key).cloned())
            .collect()
    }

    /// The restricted keys, in registration order.
    pub fn restricted_keys(&self) -> &[TypeKey] {
        &self.restricted
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

static REGISTRY: LazyLock<RwLock<TransformerRegistry>> =
    LazyLock::new(|| RwLock::new(TransformerRegistry::with_defaults()));

/// The process-wide registry.
pub(crate) fn global() -> &'static RwLock<TransformerRegistry> {
    &REGISTRY
}

/// Looks up the transformer for a native type.
///
/// Resolution tiers, first match wins:
/// 1. exact key match (annotation wrappers stripped first; parameterized
///    types hit their generic-origin family key here);
/// 2. a parameterized type whose family key is unregistered is unsupported;
/// 3. record types lazily construct and cache a record transformer;
/// 4. structural rules, in declared order;
/// 5. fallback to opaque serialization, auto-registered with a warning.
///
/// Tier 5 guarantees the lookup never fails for non-parameterized types.
pub(crate) fn resolve(ty: &NativeType) -> InterchangeResult<Arc<dyn Transformer>> {
    let base = ty.strip_annotations();
    let key = base.type_key();

    {
        let registry = global().read();
        if let Some(transformer) = registry.get(&key) {
            return Ok(transformer);
        }
        if base.is_parameterized() {
            return Err(InterchangeError::unsupported(
                base,
                format!("generic origin {key} is not registered"),
            ));
        }
    }

    if let NativeType::Record(record) = base {
        let transformer: Arc<dyn Transformer> = Arc::new(RecordTransformer::new(record)?);
        return Ok(global().write().insert_if_absent(key, transformer));
    }

    {
        let registry = global().read();
        if let Some(transformer) = registry.match_rules(base) {
            return Ok(transformer);
        }
    }

    tracing::warn!(
        target: TRACING_TARGET,
        native_type = %base,
        "no transformer matched; falling back to opaque serialization"
    );
    let transformer: Arc<dyn Transformer> = Arc::new(OpaqueTransformer::new(base));
    Ok(global().write().insert_if_absent(key, transformer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_literal::LiteralType;

    use crate::context::ConversionContext;
    use crate::native::NativeValue;
    use crate::transformer::SimpleTransformer;
    use weft_literal::SimpleType;

    fn stub(name: &'static str, key_name: &str) -> Arc<dyn Transformer> {
        struct Stub {
            name: &'static str,
            key: TypeKey,
        }
        impl Transformer for Stub {
            fn name(&self) -> &str {
                self.name
            }
            fn type_key(&self) -> TypeKey {
                self.key.clone()
            }
            fn get_literal_type(&self, _ty: &NativeType) -> InterchangeResult<LiteralType> {
                Ok(LiteralType::simple(SimpleType::Struct))
            }
            fn to_literal(
                &self,
                _ctx: &ConversionContext,
                _value: &NativeValue,
                _ty: &NativeType,
                _expected: &LiteralType,
            ) -> InterchangeResult<weft_literal::Literal> {
                unimplemented!("stub")
            }
            fn to_native_value(
                &self,
                _ctx: &ConversionContext,
                _literal: &weft_literal::Literal,
                _ty: &NativeType,
            ) -> InterchangeResult<NativeValue> {
                unimplemented!("stub")
            }
        }
        Arc::new(Stub {
            name,
            key: TypeKey::Named(key_name.to_string()),
        })
    }

    #[test]
    fn test_duplicate_registration_leaves_original_intact() {
        let mut registry = TransformerRegistry::new();
        registry
            .register(stub("first", "test.registry.Dup"), &[])
            .unwrap();

        let err = registry
            .register(stub("second", "test.registry.Dup"), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            InterchangeError::DuplicateRegistration { .. }
        ));

        let owner = registry
            .get(&TypeKey::Named("test.registry.Dup".into()))
            .unwrap();
        assert_eq!(owner.name(), "first");
    }

    #[test]
    fn test_register_checks_additional_keys_before_inserting() {
        let mut registry = TransformerRegistry::new();
        registry
            .register(stub("owner", "test.registry.A"), &[])
            .unwrap();

        // primary key is free, but the extra key collides; nothing changes
        let err = registry
            .register(
                stub("late", "test.registry.B"),
                &[TypeKey::Named("test.registry.A".into())],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            InterchangeError::DuplicateRegistration { .. }
        ));
        assert!(registry.get(&TypeKey::Named("test.registry.B".into())).is_none());
    }

    #[test]
    fn test_alias_does_not_override_by_default() {
        let mut registry = TransformerRegistry::new();
        registry
            .register(stub("owner", "test.registry.Alias"), &[])
            .unwrap();

        let key = TypeKey::Named("test.registry.Alias".into());
        registry.register_alias(stub("usurper", "unused"), key.clone(), false);
        assert_eq!(registry.get(&key).unwrap().name(), "owner");

        registry.register_alias(stub("usurper", "unused"), key.clone(), true);
        assert_eq!(registry.get(&key).unwrap().name(), "usurper");
    }

    #[test]
    fn test_simple_transformer_registration_order() {
        let mut registry = TransformerRegistry::new();
        let int = Arc::new(SimpleTransformer::new(
            "int",
            NativeType::Int,
            SimpleType::Integer,
            |_| unimplemented!("unused"),
            |_| unimplemented!("unused"),
        ));
        registry.register(int, &[]).unwrap();
        assert_eq!(registry.keys(), vec![TypeKey::Int]);
    }
}
