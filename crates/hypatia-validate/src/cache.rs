//! Process-wide validator cache.
//!
//! Compiling a schema is the expensive step, so compiled validators are
//! memoized by schema *value*: structurally equal schemas share one
//! compiled instance, intentionally, even across unrelated operations.
//! The cache is append-only and never evicted; compiled validators live
//! for the process lifetime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hypatia_core::SchemaLocation;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::{ValidateOptions, Validator};
use crate::error::{ValidateError, ValidateResult};

/// A memoizing cache of compiled validators.
///
/// Constructed once at process start and shared by reference with every
/// component that validates. The only mutation is insert-if-absent: under
/// concurrent first use of a schema the insert is re-checked under the
/// write lock, so two callers can never observe different validator
/// instances for the same schema.
///
/// # Example
///
/// ```
/// use hypatia_validate::{ValidateOptions, ValidatorCache};
/// use hypatia_core::SchemaLocation;
/// use serde_json::json;
///
/// let cache = ValidatorCache::new();
/// let schema = json!({"type": "integer"});
///
/// let out = cache
///     .validate(&schema, &json!("42"), SchemaLocation::Query, &ValidateOptions::for_request())
///     .unwrap();
/// assert_eq!(out, json!(42));
/// assert_eq!(cache.compilations(), 1);
///
/// // A structurally equal schema is a cache hit.
/// cache.compile(&json!({"type": "integer"}));
/// assert_eq!(cache.compilations(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ValidatorCache {
    validators: RwLock<HashMap<String, Arc<Validator>>>,
    compilations: AtomicU64,
}

impl ValidatorCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached validator for `schema`, compiling it on first use.
    pub fn compile(&self, schema: &Value) -> Arc<Validator> {
        let key = cache_key(schema);

        if let Some(validator) = self.validators.read().get(&key) {
            return Arc::clone(validator);
        }

        let mut validators = self.validators.write();
        // Re-check: another caller may have won the write race.
        if let Some(validator) = validators.get(&key) {
            return Arc::clone(validator);
        }

        let validator = Arc::new(Validator::compile(schema));
        self.compilations.fetch_add(1, Ordering::Relaxed);
        debug!(cached = validators.len() + 1, "compiled new validator");
        validators.insert(key, Arc::clone(&validator));
        validator
    }

    /// Validates `input` against `schema` through the cache.
    ///
    /// The input is deep-copied before validation; the returned value
    /// carries any coercions and defaults the options enabled. Failures
    /// are tagged with `location`.
    pub fn validate(
        &self,
        schema: &Value,
        input: &Value,
        location: SchemaLocation,
        options: &ValidateOptions,
    ) -> ValidateResult<Value> {
        match self.compile(schema).validate(input, options) {
            Ok(output) => Ok(output),
            Err(violations) if violations.is_empty() => {
                // Defensive: a failure without detail must stay
                // distinguishable from a detailed one.
                warn!(%location, "validator reported failure without detail");
                Err(ValidateError::Unknown { location })
            }
            Err(violations) => Err(ValidateError::Invalid {
                location,
                violations,
            }),
        }
    }

    /// Number of compilations actually performed (cache misses).
    #[must_use]
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Number of distinct schemas cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.read().len()
    }

    /// Returns true if nothing has been compiled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.read().is_empty()
    }
}

/// Structural cache key for a schema value.
///
/// `serde_json` object maps are ordered by key, so serialization is
/// canonical: two structurally equal schemas produce the same key however
/// they were assembled.
fn cache_key(schema: &Value) -> String {
    schema.to_string()
}
