//! Lazy, caching view over a received bag of literals.

use std::collections::HashMap;

use weft_literal::{Literal, VariableMap};

use crate::context::ConversionContext;
use crate::engine::TypeEngine;
use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue};

const TRACING_TARGET: &str = "weft_interchange::resolver";

/// Resolves native values on demand from a completed literal map.
///
/// Built for callers that receive a bag of wire values (typically a task's
/// outputs) and want native values key by key. The native type for a key is
/// resolved in order: an explicit `as_type` argument, a registered hint, then
/// inference from the declared variable map. Decoded values are cached for
/// the lifetime of the resolver; a repeat `get` returns the cached value even
/// if a different `as_type` is supplied later.
pub struct LiteralsResolver {
    literals: HashMap<String, Literal>,
    variable_map: Option<VariableMap>,
    type_hints: HashMap<String, NativeType>,
    native_values: HashMap<String, NativeValue>,
}

impl LiteralsResolver {
    /// Creates a resolver over a literal map, with an optional declared
    /// interface used for type inference.
    pub fn new(literals: HashMap<String, Literal>, variable_map: Option<VariableMap>) -> Self {
        Self {
            literals,
            variable_map,
            type_hints: HashMap::new(),
            native_values: HashMap::new(),
        }
    }

    /// Registers native-type hints for keys that have not been read yet.
    pub fn update_type_hints(&mut self, type_hints: HashMap<String, NativeType>) {
        self.type_hints.extend(type_hints);
    }

    /// The backing literal map.
    pub fn literals(&self) -> &HashMap<String, Literal> {
        &self.literals
    }

    /// The declared interface, if one was supplied.
    pub fn variable_map(&self) -> Option<&VariableMap> {
        self.variable_map.as_ref()
    }

    /// The values decoded so far.
    pub fn native_values(&self) -> &HashMap<String, NativeValue> {
        &self.native_values
    }

    /// Returns the raw literal for a key.
    pub fn get_literal(&self, key: &str) -> InterchangeResult<&Literal> {
        self.literals
            .get(key)
            .ok_or_else(|| InterchangeError::KeyNotFound { key: key.into() })
    }

    /// Decodes the value for `key`, caching the result.
    ///
    /// Fails with a key-not-found error if the key is absent from the backing
    /// map, regardless of hints, and with an inference error when no type
    /// source yields a native type for the key.
    pub fn get(
        &mut self,
        ctx: &ConversionContext,
        key: &str,
        as_type: Option<&NativeType>,
    ) -> InterchangeResult<NativeValue> {
        if !self.literals.contains_key(key) {
            return Err(InterchangeError::KeyNotFound { key: key.into() });
        }
        if let Some(cached) = self.native_values.get(key) {
            return Ok(cached.clone());
        }

        let ty = match as_type {
            Some(ty) => ty.clone(),
            None => match self.type_hints.get(key) {
                Some(hint) => hint.clone(),
                None => {
                    let variable = self
                        .variable_map
                        .as_ref()
                        .and_then(|variables| variables.get(key));
                    match variable {
                        Some(variable) => {
                            TypeEngine::guess_native_type(&variable.literal_type).inspect_err(
                                |error| {
                                    tracing::error!(
                                        target: TRACING_TARGET,
                                        key,
                                        %error,
                                        "could not guess a native type for variable"
                                    );
                                },
                            )?
                        }
                        None => return Err(InterchangeError::Inference { key: key.into() }),
                    }
                }
            },
        };

        let value = TypeEngine::to_native_value(ctx, &self.literals[key], &ty)?;
        self.native_values.insert(key.to_string(), value.clone());
        Ok(value)
    }
}
