//! Turns requested plugin key strings into a validated, ordered
//! [`ResolvedSet`].
//!
//! 1. Each request (`name[/version]`, short names allowed) selects one key.
//! 2. Bundles expand depth-first in member order, with cycle detection.
//! 3. Duplicates are dropped, keeping the first occurrence.
//! 4. Every plugin must support the target project version.
//! 5. The driven capability must have the required number of providers.
//!
//! Resolution is pure: no filesystem access, deterministic for a given
//! registry and input.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::plugin::Plugin;
use crate::application::registry::{Registry, RegistryEntry};
use crate::domain::{
    Bundle, Capability, Cardinality, DomainError, Operation, PluginKey, PluginRequest,
    ProjectVersion,
};
use crate::error::StratumResult;

/// The capability an operation drives and how many providers it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityRequirement {
    pub operation: Operation,
    pub capability: Capability,
    pub cardinality: Cardinality,
}

impl From<Operation> for CapabilityRequirement {
    fn from(operation: Operation) -> Self {
        Self {
            operation,
            capability: operation.capability(),
            cardinality: operation.cardinality(),
        }
    }
}

/// Flattened, deduplicated, validated plugins in execution order.
#[derive(Clone, Default)]
pub struct ResolvedSet {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl ResolvedSet {
    pub fn keys(&self) -> Vec<PluginKey> {
        self.plugins.iter().map(|p| p.key().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugins offering `capability`, in resolved order.
    pub fn providers(&self, capability: Capability) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.plugins.iter().filter(move |p| p.provides(capability))
    }
}

impl fmt::Debug for ResolvedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.key().to_string()))
            .finish()
    }
}

struct Frame<'r> {
    bundle: &'r Bundle,
    next: usize,
}

pub struct Resolver<'r> {
    registry: &'r Registry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    #[instrument(skip_all, fields(project_version = %version))]
    pub fn resolve<S: AsRef<str>>(
        &self,
        requested: &[S],
        version: &ProjectVersion,
        requirement: Option<CapabilityRequirement>,
    ) -> StratumResult<ResolvedSet> {
        let roots = requested
            .iter()
            .map(|r| self.resolve_key(r.as_ref(), version))
            .collect::<StratumResult<Vec<_>>>()?;

        let flattened = self.expand(&roots)?;

        let mut seen = HashSet::new();
        let mut plugins = Vec::with_capacity(flattened.len());
        for plugin in flattened {
            if seen.insert(plugin.key().clone()) {
                plugins.push(plugin);
            } else {
                debug!(plugin = %plugin.key(), "dropping duplicate");
            }
        }

        for plugin in &plugins {
            if !plugin.supports(version) {
                return Err(DomainError::UnsupportedVersion {
                    plugin: plugin.key().to_string(),
                    project_version: version.to_string(),
                    supported: plugin
                        .supported_project_versions()
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                }
                .into());
            }
        }

        let set = ResolvedSet { plugins };
        if let Some(requirement) = requirement {
            check_cardinality(&set, requirement)?;
        }

        for plugin in set.iter() {
            info!(plugin = %plugin.key(), "resolved");
        }
        Ok(set)
    }

    /// Select the concrete key a single request refers to.
    ///
    /// With an explicit version the key must match exactly. Without one, the
    /// highest non-deprecated version supporting `version` wins.
    pub fn resolve_key(&self, request: &str, version: &ProjectVersion) -> StratumResult<PluginKey> {
        let request = PluginRequest::parse(request)?;
        let mut candidates: Vec<&RegistryEntry> = self
            .registry
            .entries()
            .filter(|e| e.key().matches_name(&request.name))
            .collect();
        // A full name never competes with other plugins sharing its short name.
        if candidates.iter().any(|e| e.key().name() == request.name) {
            candidates.retain(|e| e.key().name() == request.name);
        }

        let names: BTreeSet<&str> = candidates.iter().map(|e| e.key().name()).collect();
        if names.len() > 1 {
            return Err(DomainError::AmbiguousPlugin {
                key: request.to_string(),
                candidates: names.into_iter().map(str::to_string).collect(),
            }
            .into());
        }

        let not_found = |reason: String| DomainError::NotFound {
            key: request.to_string(),
            reason,
        };

        if candidates.is_empty() {
            return Err(not_found("no plugin is registered under this name".into()).into());
        }

        if let Some(wanted) = request.version {
            let entry = candidates
                .iter()
                .find(|e| e.key().version() == wanted)
                .ok_or_else(|| not_found(format!("version {wanted} is not registered")))?;
            if let Some(message) = entry.deprecation() {
                warn!(plugin = %entry.key(), "{}", message);
            }
            return Ok(entry.key().clone());
        }

        let available: Vec<&PluginKey> = candidates
            .iter()
            .filter(|e| e.deprecation().is_none())
            .map(|e| e.key())
            .collect();
        if available.is_empty() {
            return Err(not_found(
                "only deprecated versions are registered; request one explicitly".into(),
            )
            .into());
        }

        available
            .into_iter()
            .filter(|k| self.registry.supports(k, version))
            .max()
            .cloned()
            .ok_or_else(|| {
                not_found(format!("no version supports project version {version}")).into()
            })
    }

    /// Expand bundles depth-first in member order. Iterative: the explicit
    /// frame stack doubles as the current path for cycle detection.
    fn expand(&self, roots: &[PluginKey]) -> StratumResult<Vec<Arc<dyn Plugin>>> {
        let mut out = Vec::new();

        for root in roots {
            let bundle = match self.registry.lookup(root)? {
                RegistryEntry::Plugin(plugin) => {
                    out.push(Arc::clone(plugin));
                    continue;
                }
                RegistryEntry::Bundle(bundle) => bundle,
            };

            let mut stack: Vec<Frame<'r>> = vec![Frame { bundle, next: 0 }];
            while let Some(frame) = stack.last_mut() {
                let current = frame.bundle;
                let Some(member) = current.members().get(frame.next) else {
                    stack.pop();
                    continue;
                };
                frame.next += 1;

                match self.registry.lookup(member)? {
                    RegistryEntry::Plugin(plugin) => out.push(Arc::clone(plugin)),
                    RegistryEntry::Bundle(nested) => {
                        if stack.iter().any(|f| f.bundle.key() == nested.key()) {
                            let mut cycle: Vec<String> =
                                stack.iter().map(|f| f.bundle.key().to_string()).collect();
                            cycle.push(nested.key().to_string());
                            return Err(DomainError::CyclicBundle {
                                bundle: root.to_string(),
                                cycle,
                            }
                            .into());
                        }
                        stack.push(Frame {
                            bundle: nested,
                            next: 0,
                        });
                    }
                }
            }
        }

        Ok(out)
    }
}

fn check_cardinality(set: &ResolvedSet, requirement: CapabilityRequirement) -> StratumResult<()> {
    let providers: Vec<&Arc<dyn Plugin>> = set.providers(requirement.capability).collect();

    match (providers.as_slice(), requirement.cardinality) {
        ([], _) => Err(DomainError::MissingCapability {
            capability: requirement.capability,
            operation: requirement.operation.to_string(),
        }
        .into()),
        ([first, second, ..], Cardinality::ExactlyOne) => Err(DomainError::DuplicateCapability {
            capability: requirement.capability,
            first: first.key().to_string(),
            second: second.key().to_string(),
        }
        .into()),
        _ => Ok(()),
    }
}
