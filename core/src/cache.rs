//! Client-side query cache.
//!
//! Holds the last fetched copy of each query and whether it is stale. Every
//! list fetch is stamped with a generation when it is issued; `settle`
//! decides whether its response may replace what is cached.

use std::collections::HashMap;
use std::fmt;

use crate::types::Todo;

/// Cached queries. The todo collection is fetched and invalidated as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Todos,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Todos => f.write_str("todos"),
        }
    }
}

/// What to do with a response that arrives after a newer one was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Drop responses older than the newest applied generation.
    #[default]
    Fenced,
    /// Whatever resolves last overwrites the cache, even if it was issued
    /// first.
    LastArrivalWins,
}

/// Result of settling a fetch against the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Applied,
    Discarded,
}

#[derive(Debug, Default, Clone)]
pub struct QueryEntry {
    data: Option<Vec<Todo>>,
    stale: bool,
    issued: u64,
    applied: u64,
}

impl QueryEntry {
    pub fn data(&self) -> Option<&[Todo]> {
        self.data.as_deref()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Generation of the data currently held; 0 before the first fetch.
    pub fn applied_generation(&self) -> u64 {
        self.applied
    }

    pub fn needs_fetch(&self) -> bool {
        self.data.is_none() || self.stale
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, QueryEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, key: QueryKey) -> Option<&QueryEntry> {
        self.entries.get(&key)
    }

    pub fn data(&self, key: QueryKey) -> Option<&[Todo]> {
        self.entries.get(&key).and_then(QueryEntry::data)
    }

    pub fn needs_fetch(&self, key: QueryKey) -> bool {
        self.entries.get(&key).map_or(true, QueryEntry::needs_fetch)
    }

    /// Mark the cached data stale. The data itself stays readable until a
    /// refetch replaces it.
    pub fn invalidate(&mut self, key: QueryKey) {
        self.entries.entry(key).or_default().stale = true;
    }

    /// Stamp a new fetch for `key` and return its generation.
    pub fn issue(&mut self, key: QueryKey) -> u64 {
        let entry = self.entries.entry(key).or_default();
        entry.issued += 1;
        entry.issued
    }

    /// Offer the response of fetch `generation`.
    pub fn settle(
        &mut self,
        key: QueryKey,
        generation: u64,
        data: Vec<Todo>,
        policy: StalePolicy,
    ) -> Settled {
        let entry = self.entries.entry(key).or_default();
        if policy == StalePolicy::Fenced && generation <= entry.applied {
            return Settled::Discarded;
        }
        entry.data = Some(data);
        entry.applied = entry.applied.max(generation);
        // A mutation may have invalidated the key after this fetch was
        // issued; only the latest issued fetch clears the flag.
        if generation >= entry.issued {
            entry.stale = false;
        }
        Settled::Applied
    }
}
