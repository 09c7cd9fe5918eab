//! Canonical byte form of contract parameters.
//!
//! Objects are emitted with keys in sorted order and compact separators, so
//! two semantically equal parameter sets always produce the same bytes no
//! matter how they were constructed. Non-finite numbers have no JSON form and
//! are rejected before serialisation.
use super::error::{ContractError, ValidationError};
use super::parameters::ContractParameters;
use serde_json::{Map, Value};

/// Bytes fed to the integrity hash. Only constructible through [`CanonicalParameters::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalParameters(Vec<u8>);

impl CanonicalParameters {
    pub fn new(params: &ContractParameters) -> Result<Self, ContractError> {
        for (field, value) in [
            ("quantity_kg", params.quantity_kg),
            ("price_per_kg_usd", params.price_per_kg_usd),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonPositive { field, value }.into());
            }
        }

        let value = sort_keys(serde_json::to_value(params)?);
        Ok(Self(serde_json::to_vec(&value)?))
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// serde_json only sorts maps when built without `preserve_order`, rebuild in key order either way
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
