//! Federated provider registry
//!
//! Holds every registered RDBMS provider, keeps the most specific provider
//! per kind in a read-optimized cache, and resolves connection strings to
//! the best matching provider across kinds.
//!
//! Lookups read only the per-kind cache, so steady-state resolution is
//! O(kinds) rather than O(registered providers).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::discovery::ProviderLoader;
use crate::error::{Error, Result};
use crate::provider::{Facade, RdbmsProvider};
use crate::types::{ConnectProps, RdbmsKind, Specificity};

/// One registered provider with its ranking data.
#[derive(Clone)]
struct SpecificEntry {
    rdbms: RdbmsKind,
    specificity: Specificity,
    /// Full-match form of the provider's pattern, compiled once at
    /// registration.
    pattern: Regex,
    provider: Arc<dyn RdbmsProvider>,
}

impl SpecificEntry {
    fn new(provider: Arc<dyn RdbmsProvider>) -> Self {
        let rdbms = provider.rdbms();
        let specificity = provider.specificity();
        let pattern = anchored(provider.connection_pattern());
        Self {
            rdbms,
            specificity,
            pattern,
            provider,
        }
    }

    /// Whether the pattern matches the whole connection string.
    fn matches(&self, connection_string: &str) -> bool {
        self.pattern.is_match(connection_string)
    }

    /// Instance identity, not value identity: two providers reporting the
    /// same kind and specificity remain distinguishable.
    fn same_provider(&self, provider: &Arc<dyn RdbmsProvider>) -> bool {
        Arc::ptr_eq(&self.provider, provider)
    }
}

impl fmt::Display for SpecificEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rdbms, self.specificity)
    }
}

/// Wrap a provider pattern so matching covers the whole connection string,
/// never a substring.
fn anchored(pattern: &Regex) -> Regex {
    Regex::new(&format!("^(?:{})$", pattern.as_str()))
        .expect("anchoring a valid pattern keeps it valid")
}

/// Registry of competing RDBMS providers.
///
/// Multiple providers may claim the same kind with varying degrees of
/// specialization; the registry keeps them ranked and resolves connection
/// strings to the most specific matching provider. All operations are safe
/// under concurrent registration, deregistration and lookup.
pub struct FederatedRegistry {
    /// Every registered provider, in registration order.
    registered: RwLock<Vec<SpecificEntry>>,
    /// The most specific provider currently known per kind. Values are
    /// replaced whole; readers never observe partial updates.
    best: DashMap<RdbmsKind, SpecificEntry>,
}

impl FederatedRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            registered: RwLock::new(Vec::new()),
            best: DashMap::new(),
        }
    }

    /// Process-wide shared instance.
    ///
    /// Offered for convenience; embedders that need isolation construct
    /// their own registries and inject them.
    pub fn global() -> &'static FederatedRegistry {
        static GLOBAL: OnceLock<FederatedRegistry> = OnceLock::new();
        GLOBAL.get_or_init(FederatedRegistry::new)
    }

    /// Build a registry pre-populated by the given loader.
    ///
    /// Providers register in the loader's order, which fixes tie-break
    /// precedence for equal specificities discovered at startup.
    pub fn bootstrap(loader: &dyn ProviderLoader) -> Self {
        let registry = Self::new();
        for provider in loader.load() {
            registry.register(provider);
        }
        registry
    }

    /// Register a provider and recompute the best provider for its kind.
    ///
    /// Equal specificity never displaces an earlier registration. Safe to
    /// call concurrently with lookups and other mutations.
    pub fn register(&self, provider: Arc<dyn RdbmsProvider>) {
        let entry = SpecificEntry::new(provider);
        let rdbms = entry.rdbms.clone();
        debug!(entry = %entry, "registering rdbms provider");
        self.registered.write().push(entry);
        self.select_best(&rdbms);
    }

    /// Remove every registration of the given provider instance.
    ///
    /// Matching is by instance identity, not by reported kind or
    /// specificity; duplicate registrations of one instance all go at once.
    /// Unknown instances are a no-op.
    pub fn deregister(&self, provider: &Arc<dyn RdbmsProvider>) {
        let rdbms = provider.rdbms();
        let removed = {
            let mut entries = self.registered.write();
            let before = entries.len();
            entries.retain(|entry| !entry.same_provider(provider));
            before - entries.len()
        };
        if removed == 0 {
            debug!(rdbms = %rdbms, "deregister of unknown provider ignored");
            return;
        }
        debug!(rdbms = %rdbms, removed, "deregistered rdbms provider");
        self.select_best(&rdbms);
    }

    /// Recompute the best provider for one kind from a full scan of the
    /// registered entries.
    ///
    /// Runs under the cache entry lock for the kind: recomputes for the
    /// same kind serialize, so the last one reflects every completed
    /// mutation, while other kinds proceed in parallel.
    fn select_best(&self, rdbms: &RdbmsKind) {
        match self.best.entry(rdbms.clone()) {
            Entry::Occupied(mut slot) => match self.scan_best(rdbms) {
                Some(best) => {
                    slot.insert(best);
                }
                None => {
                    slot.remove();
                }
            },
            Entry::Vacant(slot) => {
                if let Some(best) = self.scan_best(rdbms) {
                    slot.insert(best);
                }
            }
        }
    }

    fn scan_best(&self, rdbms: &RdbmsKind) -> Option<SpecificEntry> {
        let entries = self.registered.read();
        let mut best: Option<&SpecificEntry> = None;
        for entry in entries.iter().filter(|entry| entry.rdbms == *rdbms) {
            match best {
                // Strictly lower only: the earliest registration keeps
                // winning ties.
                Some(current) if entry.specificity >= current.specificity => {}
                _ => best = Some(entry),
            }
        }
        best.cloned()
    }

    /// Kinds that currently have at least one registered provider.
    ///
    /// Returns an owned snapshot; later mutations do not show through.
    pub fn supported_rdbms(&self) -> HashSet<RdbmsKind> {
        self.best.iter().map(|entry| entry.key().clone()).collect()
    }

    /// The current best provider for a kind, if any.
    pub fn get_specific_provider(&self, rdbms: &RdbmsKind) -> Option<Arc<dyn RdbmsProvider>> {
        self.best
            .get(rdbms)
            .map(|entry| Arc::clone(&entry.provider))
    }

    /// Resolve a connection string to the best matching provider.
    ///
    /// Only the best provider per kind participates: ranking happens
    /// per-kind before pattern matching, so a less specific provider never
    /// services a string just because the kind's best one does not match
    /// it. Among matching kinds the lowest specificity wins; tie order
    /// across kinds is unspecified.
    pub fn resolve(&self, connection_string: &str) -> Result<Arc<dyn RdbmsProvider>> {
        let mut best: Option<SpecificEntry> = None;
        for entry in self.best.iter() {
            if !entry.matches(connection_string) {
                continue;
            }
            match &best {
                Some(current) if entry.specificity >= current.specificity => {}
                _ => best = Some(entry.value().clone()),
            }
        }
        match best {
            Some(entry) => Ok(entry.provider),
            None => {
                debug!(connection_string, "no provider pattern matched");
                Err(Error::no_provider(connection_string))
            }
        }
    }

    /// Resolve and open a facade, forwarding all arguments unchanged.
    ///
    /// Exactly one provider is attempted per call; resolution failures and
    /// provider failures propagate untouched, with no retry and no
    /// fallback to other candidates.
    pub async fn open_facade(
        &self,
        connection_string: &str,
        properties: Option<&ConnectProps>,
        connections_limit: u32,
    ) -> Result<Box<dyn Facade>> {
        let provider = self.resolve(connection_string)?;
        provider
            .open_facade(connection_string, properties, connections_limit)
            .await
    }
}

impl Default for FederatedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FederatedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedRegistry")
            .field("registered", &self.registered.read().len())
            .field("kinds", &self.best.len())
            .finish()
    }
}
