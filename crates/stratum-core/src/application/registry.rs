//! The catalog of known plugins and bundles.
//!
//! Built once through [`RegistryBuilder`], read-only afterwards. Every
//! registration is checked for duplicate keys and for bundle cycles, so a
//! built [`Registry`] is always acyclic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::application::plugin::Plugin;
use crate::domain::{Bundle, DomainError, PluginKey, ProjectVersion};
use crate::error::StratumResult;

/// A registered plugin or bundle.
#[derive(Clone)]
pub enum RegistryEntry {
    Plugin(Arc<dyn Plugin>),
    Bundle(Bundle),
}

impl RegistryEntry {
    pub fn key(&self) -> &PluginKey {
        match self {
            Self::Plugin(p) => p.key(),
            Self::Bundle(b) => b.key(),
        }
    }

    pub fn deprecation(&self) -> Option<&str> {
        match self {
            Self::Plugin(p) => p.deprecation(),
            Self::Bundle(b) => b.deprecation(),
        }
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self, Self::Bundle(_))
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plugin(p) => f.debug_tuple("Plugin").field(p.key()).finish(),
            Self::Bundle(b) => f.debug_tuple("Bundle").field(b).finish(),
        }
    }
}

/// Collects entries and validates them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<PluginKey, RegistryEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: RegistryEntry) -> StratumResult<&mut Self> {
        let key = entry.key().clone();
        if self.entries.contains_key(&key) {
            return Err(DomainError::DuplicateKey {
                key: key.to_string(),
            }
            .into());
        }
        if let RegistryEntry::Bundle(bundle) = &entry {
            if let Some(cycle) = self.find_cycle(bundle) {
                return Err(DomainError::CyclicBundle {
                    bundle: key.to_string(),
                    cycle,
                }
                .into());
            }
        }

        debug!(key = %key, bundle = entry.is_bundle(), "registered");
        self.entries.insert(key, entry);
        Ok(self)
    }

    pub fn register_plugin(&mut self, plugin: impl Plugin + 'static) -> StratumResult<&mut Self> {
        self.register(RegistryEntry::Plugin(Arc::new(plugin)))
    }

    pub fn register_bundle(&mut self, bundle: Bundle) -> StratumResult<&mut Self> {
        self.register(RegistryEntry::Bundle(bundle))
    }

    /// Finish registration. Fails if a bundle names a key that was never
    /// registered.
    pub fn build(self) -> StratumResult<Registry> {
        let bundles = self.entries.values().filter_map(|e| match e {
            RegistryEntry::Bundle(b) => Some(b),
            RegistryEntry::Plugin(_) => None,
        });
        for bundle in bundles {
            let missing = bundle
                .members()
                .iter()
                .find(|m| !self.entries.contains_key(*m));
            if let Some(missing) = missing {
                return Err(DomainError::NotFound {
                    key: missing.to_string(),
                    reason: format!("member of bundle '{}' is not registered", bundle.key()),
                }
                .into());
            }
        }
        Ok(Registry {
            entries: self.entries,
        })
    }

    /// Depth-first walk from `bundle` through already registered bundles,
    /// looking for a path back to `bundle`. Uses an explicit stack and a
    /// visited set.
    fn find_cycle(&self, bundle: &Bundle) -> Option<Vec<String>> {
        let start = bundle.key();
        let mut visited: BTreeSet<&PluginKey> = BTreeSet::new();
        let mut stack: Vec<(&Bundle, usize)> = vec![(bundle, 0)];

        while let Some(top) = stack.last_mut() {
            let (current, next) = (top.0, top.1);
            let Some(member) = current.members().get(next) else {
                stack.pop();
                continue;
            };
            top.1 += 1;

            if member == start {
                let mut cycle: Vec<String> =
                    stack.iter().map(|(b, _)| b.key().to_string()).collect();
                cycle.push(start.to_string());
                return Some(cycle);
            }
            if let Some(RegistryEntry::Bundle(nested)) = self.entries.get(member) {
                if visited.insert(member) {
                    stack.push((nested, 0));
                }
            }
        }
        None
    }
}

/// Read-only catalog, safe for concurrent reads.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: BTreeMap<PluginKey, RegistryEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, key: &PluginKey) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    pub fn lookup(&self, key: &PluginKey) -> StratumResult<&RegistryEntry> {
        self.get(key).ok_or_else(|| {
            DomainError::NotFound {
                key: key.to_string(),
                reason: "not registered".into(),
            }
            .into()
        })
    }

    /// Every entry, in key order.
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of non-deprecated entries supporting `version`, for listings.
    pub fn all_keys(&self, version: &ProjectVersion) -> BTreeSet<PluginKey> {
        self.entries
            .values()
            .filter(|e| e.deprecation().is_none())
            .map(RegistryEntry::key)
            .filter(|k| self.supports(k, version))
            .cloned()
            .collect()
    }

    /// Whether `key` supports `version`. A bundle does only if every member
    /// does, recursively. Unknown keys support nothing.
    pub fn supports(&self, key: &PluginKey, version: &ProjectVersion) -> bool {
        let mut pending = vec![key];
        while let Some(current) = pending.pop() {
            match self.entries.get(current) {
                Some(RegistryEntry::Plugin(p)) => {
                    if !p.supports(version) {
                        return false;
                    }
                }
                Some(RegistryEntry::Bundle(b)) => pending.extend(b.members()),
                None => return false,
            }
        }
        true
    }

    /// Project versions served by at least one non-deprecated plugin.
    pub fn project_versions(&self) -> BTreeSet<ProjectVersion> {
        self.entries
            .values()
            .filter_map(|e| match e {
                RegistryEntry::Plugin(p) if !p.is_deprecated() => {
                    Some(p.supported_project_versions())
                }
                _ => None,
            })
            .flatten()
            .cloned()
            .collect()
    }
}
