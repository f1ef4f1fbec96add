//! Directional castability between producer and consumer wire types.

use weft_literal::{LiteralType, LiteralTypeKind, SimpleType};

/// Returns true if a value typed `upstream` may flow where `downstream` is
/// expected.
///
/// Rules are checked in order: collections and maps recurse and reject
/// one-sided matches outright; structured datasets require an exact,
/// order-sensitive schema match; a producer union must have every variant
/// accepted (covariance) while a consumer union needs only one accepting
/// variant (contravariance); enumerations cast to the plain string type;
/// everything else falls back to structural essence equality. The predicate
/// is directional — unions make it asymmetric by construction.
pub fn are_castable(upstream: &LiteralType, downstream: &LiteralType) -> bool {
    if let Some(upstream_element) = upstream.as_collection() {
        return match downstream.as_collection() {
            Some(downstream_element) => are_castable(upstream_element, downstream_element),
            None => false,
        };
    }

    if let Some(upstream_value) = upstream.as_map_value() {
        return match downstream.as_map_value() {
            Some(downstream_value) => are_castable(upstream_value, downstream_value),
            None => false,
        };
    }

    if let LiteralTypeKind::StructuredDataset(upstream_sd) = &upstream.kind {
        let LiteralTypeKind::StructuredDataset(downstream_sd) = &downstream.kind else {
            return false;
        };
        if upstream_sd.format != downstream_sd.format
            || upstream_sd.external_schema_type != downstream_sd.external_schema_type
            || upstream_sd.external_schema_bytes != downstream_sd.external_schema_bytes
            || upstream_sd.columns.len() != downstream_sd.columns.len()
        {
            return false;
        }
        return upstream_sd
            .columns
            .iter()
            .zip(&downstream_sd.columns)
            .all(|(u, d)| u.name == d.name && are_castable(&u.literal_type, &d.literal_type));
    }

    if let Some(upstream_union) = upstream.as_union() {
        // every upstream variant must have a home downstream
        return upstream_union
            .variants
            .iter()
            .all(|variant| are_castable(variant, downstream));
    }

    if let Some(downstream_union) = downstream.as_union() {
        // one accepting downstream variant suffices
        if downstream_union
            .variants
            .iter()
            .any(|variant| are_castable(upstream, variant))
        {
            return true;
        }
    }

    if upstream.as_enum().is_some() && downstream.as_simple() == Some(SimpleType::String) {
        return true;
    }

    upstream.essence() == downstream.essence()
}
