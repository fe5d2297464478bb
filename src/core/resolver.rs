use std::cell::RefCell;
use std::collections::HashMap;

use crate::core::identity::{LookupEntry, ResolvedIdentity, UNKNOWN_REGION};

/// Resolves short names to canonical identities. Built once from the lookup
/// table and immutable afterwards; results are memoized per distinct input.
#[derive(Debug, Default)]
pub struct IdentifierResolver {
    short_to_canonical: HashMap<String, String>,
    canonical_to_short: HashMap<String, String>,
    short_to_region: HashMap<String, String>,
    cache: RefCell<HashMap<String, ResolvedIdentity>>,
}

impl IdentifierResolver {
    pub fn new(entries: &[LookupEntry]) -> Self {
        let mut short_to_canonical = HashMap::new();
        let mut canonical_to_short = HashMap::new();
        let mut short_to_region = HashMap::new();
        for entry in entries {
            let short = entry.short_name.trim();
            if short.is_empty() {
                continue;
            }
            short_to_canonical.insert(short.to_string(), entry.canonical_name.clone());
            canonical_to_short.insert(entry.canonical_name.clone(), short.to_string());
            short_to_region.insert(short.to_string(), entry.region.clone());
        }
        Self {
            short_to_canonical,
            canonical_to_short,
            short_to_region,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, short_name: &str) -> ResolvedIdentity {
        let key = short_name.trim();
        if let Some(hit) = self.cache.borrow().get(key) {
            return hit.clone();
        }

        let identity = match self.short_to_canonical.get(key) {
            Some(canonical) => ResolvedIdentity {
                short_name: key.to_string(),
                canonical_name: Some(canonical.clone()),
                region: self
                    .short_to_region
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_REGION.to_string()),
                known: true,
            },
            None => ResolvedIdentity {
                short_name: key.to_string(),
                canonical_name: None,
                region: UNKNOWN_REGION.to_string(),
                known: false,
            },
        };

        self.cache
            .borrow_mut()
            .insert(key.to_string(), identity.clone());
        identity
    }

    pub fn canonical_for(&self, short_name: &str) -> Option<&str> {
        self.short_to_canonical
            .get(short_name.trim())
            .map(String::as_str)
    }

    pub fn short_for(&self, canonical_name: &str) -> Option<&str> {
        self.canonical_to_short
            .get(canonical_name.trim())
            .map(String::as_str)
    }
}
