//! Typed plugin flags.
//!
//! Subcommands declare flags on a [`FlagSet`] during `bind_flags`; the
//! engine fills it from raw `--name[=value]` arguments ([`RawFlags`]) and the
//! subcommand reads the values back during `read_flags`.

use std::collections::BTreeMap;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: String,
    pub help: String,
    pub default: FlagValue,
}

/// Flags declared by every participating subcommand. Several subcommands
/// may declare the same flag; the first declaration fixes its type.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    specs: BTreeMap<String, FlagSpec>,
    values: BTreeMap<String, FlagValue>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool(&mut self, name: &str, default: bool, help: &str) {
        self.declare(name, FlagValue::Bool(default), help);
    }

    pub fn string(&mut self, name: &str, default: &str, help: &str) {
        self.declare(name, FlagValue::String(default.to_string()), help);
    }

    fn declare(&mut self, name: &str, default: FlagValue, help: &str) {
        self.specs
            .entry(name.to_string())
            .or_insert_with(|| FlagSpec {
                name: name.to_string(),
                help: help.to_string(),
                default,
            });
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn specs(&self) -> impl Iterator<Item = &FlagSpec> {
        self.specs.values()
    }

    /// Set a raw value. A bool flag given without a value becomes `true`.
    pub fn set(&mut self, name: &str, raw: Option<&str>) -> Result<(), DomainError> {
        let spec = self.specs.get(name).ok_or_else(|| DomainError::InvalidFlag {
            name: name.to_string(),
            reason: "unknown flag".into(),
        })?;

        let value = match (&spec.default, raw) {
            (FlagValue::Bool(_), None) => FlagValue::Bool(true),
            (FlagValue::Bool(_), Some(raw)) => match raw {
                "true" => FlagValue::Bool(true),
                "false" => FlagValue::Bool(false),
                other => {
                    return Err(DomainError::InvalidFlag {
                        name: name.to_string(),
                        reason: format!("expected true or false, got '{other}'"),
                    });
                }
            },
            (FlagValue::String(_), Some(raw)) => FlagValue::String(raw.to_string()),
            (FlagValue::String(_), None) => {
                return Err(DomainError::InvalidFlag {
                    name: name.to_string(),
                    reason: "a value is required".into(),
                });
            }
        };

        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn value(&self, name: &str) -> Option<&FlagValue> {
        self.values
            .get(name)
            .or_else(|| self.specs.get(name).map(|s| &s.default))
    }

    /// Current value, falling back to the declared default. `false` for
    /// undeclared or non-bool flags.
    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.value(name), Some(FlagValue::Bool(true)))
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.value(name) {
            Some(FlagValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Unparsed `--name[=value]` arguments as given by the caller, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFlags(Vec<(String, Option<String>)>);

impl RawFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `--name=value`, `--name value` and bare `--name` forms.
    pub fn parse<I, S>(args: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut flags = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let Some(body) = arg.strip_prefix("--").filter(|b| !b.is_empty()) else {
                return Err(DomainError::InvalidFlag {
                    name: arg.trim_start_matches('-').to_string(),
                    reason: format!("expected --name[=value], got '{arg}'"),
                });
            };

            match body.split_once('=') {
                Some((name, value)) => flags.push((name.to_string(), Some(value.to_string()))),
                None => {
                    let next = args.get(i + 1).filter(|n| !n.starts_with("--"));
                    if let Some(value) = next {
                        flags.push((body.to_string(), Some(value.clone())));
                        i += 1;
                    } else {
                        flags.push((body.to_string(), None));
                    }
                }
            }
            i += 1;
        }

        Ok(Self(flags))
    }

    pub fn with(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.0.push((name.into(), value.map(str::to_string)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Names that `set` does not declare.
    pub fn unknown<'a>(&'a self, set: &FlagSet) -> Vec<&'a str> {
        self.0
            .iter()
            .map(|(n, _)| n.as_str())
            .filter(|n| !set.is_declared(n))
            .collect()
    }

    /// Populate `set` from these arguments.
    pub fn apply(&self, set: &mut FlagSet) -> Result<(), DomainError> {
        for (name, value) in self.iter() {
            set.set(name, value)?;
        }
        Ok(())
    }
}
