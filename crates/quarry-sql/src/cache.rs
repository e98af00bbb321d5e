//! Caching of compiled WHERE clauses.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::Result;
use crate::fragment::CompiledCondition;
use crate::where_builder::WhereBuilder;

/// Storage for compiled conditions.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<CompiledCondition>;

    /// Stores `value`, expiring after `ttl` when given.
    fn set(&self, key: &str, value: CompiledCondition, ttl: Option<Duration>);
}

/// In-process [`Cache`].
///
/// Expired entries are dropped when read and on every `set`. Entries stored
/// without a ttl stay until [`MemoryCache::clear`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (CompiledCondition, Option<Instant>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<CompiledCondition> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = match entries.get(key) {
            None => return None,
            Some((_, Some(expires_at))) => Instant::now() >= *expires_at,
            Some((_, None)) => false,
        };

        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|(value, _)| value.clone())
    }

    fn set(&self, key: &str, value: CompiledCondition, ttl: Option<Duration>) {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, (_, expires_at)| !expires_at.is_some_and(|at| at <= now));
        entries.insert(key.to_string(), (value, ttl.map(|ttl| now + ttl)));
    }
}

/// A [`WhereBuilder`] that looks up its compiled clause in a [`Cache`].
///
/// The default key combines the field set name, the dialect and a
/// fingerprint of the condition tree and column mappings. Conversions are
/// not part of the fingerprint, builders that differ only in conversions
/// need their own key.
pub struct CachedWhereBuilder<'c, C: Cache + ?Sized> {
    builder: WhereBuilder,
    cache: &'c C,
    key: Option<String>,
    ttl: Option<Duration>,
    compiled: Option<CompiledCondition>,
}

impl<'c, C: Cache + ?Sized> CachedWhereBuilder<'c, C> {
    pub fn new(builder: WhereBuilder, cache: &'c C) -> Self {
        CachedWhereBuilder {
            builder,
            cache,
            key: None,
            ttl: None,
            compiled: None,
        }
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self.compiled = None;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// The wrapped builder, for mapping fields.
    pub fn builder_mut(&mut self) -> &mut WhereBuilder {
        self.compiled = None;
        &mut self.builder
    }

    pub fn cache_key(&self) -> Result<String> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        Ok(format!(
            "quarry.where.{}.{}.{:016x}",
            self.builder.condition().field_set().name(),
            self.builder.dialect().name(),
            self.builder.fingerprint()?
        ))
    }

    pub fn compile(&mut self) -> Result<&CompiledCondition> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => self.fetch()?,
        };
        Ok(self.compiled.insert(compiled))
    }

    pub fn where_clause(&mut self, prepend: &str) -> Result<String> {
        let compiled = self.compile()?;
        if compiled.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{prepend}{}", compiled.sql()))
    }

    fn fetch(&mut self) -> Result<CompiledCondition> {
        let key = self.cache_key()?;
        if let Some(compiled) = self.cache.get(&key) {
            trace!(key = %key, "where clause cache hit");
            return Ok(compiled);
        }

        trace!(key = %key, "where clause cache miss");
        let compiled = self.builder.compile()?.clone();
        self.cache.set(&key, compiled.clone(), self.ttl);
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::SqlFragment;

    fn compiled(sql: &str) -> CompiledCondition {
        CompiledCondition::from(SqlFragment::new(sql))
    }

    #[test]
    fn memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert!(cache.get("k").is_none());

        cache.set("k", compiled("id IN (1)"), None);
        assert_eq!(cache.get("k").unwrap().sql(), "id IN (1)");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = MemoryCache::new();
        cache.set("k", compiled("id IN (1)"), Some(Duration::ZERO));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn set_sweeps_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("stale", compiled("id IN (1)"), Some(Duration::ZERO));
        cache.set("kept", compiled("id IN (2)"), None);
        let minute = Some(Duration::from_secs(60));
        cache.set("fresh", compiled("id IN (3)"), minute);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("kept").is_some());
        assert!(cache.get("fresh").is_some());
    }
}
