use crate::domain::entities::plugin_key::PluginKey;
use crate::domain::error::DomainError;

/// An ordered group of plugin or bundle keys resolvable as one unit.
///
/// Membership is by key only; the registry owns the entries. Transitive
/// cycles are detected when the bundle is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    key: PluginKey,
    members: Vec<PluginKey>,
    deprecation: Option<String>,
}

impl Bundle {
    pub fn new(
        key: PluginKey,
        members: impl IntoIterator<Item = PluginKey>,
    ) -> Result<Self, DomainError> {
        let members: Vec<PluginKey> = members.into_iter().collect();

        if members.is_empty() {
            return Err(DomainError::EmptyBundle {
                bundle: key.to_string(),
            });
        }
        if members.contains(&key) {
            return Err(DomainError::CyclicBundle {
                bundle: key.to_string(),
                cycle: vec![key.to_string(), key.to_string()],
            });
        }

        Ok(Self {
            key,
            members,
            deprecation: None,
        })
    }

    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecation = Some(message.into());
        self
    }

    pub fn key(&self) -> &PluginKey {
        &self.key
    }

    pub fn members(&self) -> &[PluginKey] {
        &self.members
    }

    pub fn deprecation(&self) -> Option<&str> {
        self.deprecation.as_deref()
    }
}
