//! Checker configuration: the container constructor registry.
//!
//! Variance is a declared property of each constructor. Nothing is inferred
//! from whether a container happens to be mutable.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ty::Variance;

/// A registered container constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerSpec {
    pub variance: Variance,
    /// Direct supertypes, e.g. `list → Sequence`.
    #[serde(default)]
    pub bases: Vec<String>,
}

impl ContainerSpec {
    pub fn new(variance: Variance, bases: &[&str]) -> Self {
        Self {
            variance,
            bases: bases.iter().map(|b| b.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    /// Constructor name → variance and bases.
    pub containers: BTreeMap<String, ContainerSpec>,
    /// Alternative spellings, e.g. `List → list`.
    pub aliases: BTreeMap<String, String>,
    /// Constructor given to list displays such as `[1, 2]`.
    pub list_display: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("container '{ctor}' names unknown base '{base}'")]
    UnknownBase { ctor: String, base: String },
    #[error("alias '{alias}' refers to unknown container '{target}'")]
    UnknownAlias { alias: String, target: String },
    #[error("list displays use '{0}', which is not a registered container")]
    MissingListDisplay(String),
    #[error("container bases form a cycle through '{0}'")]
    Cycle(String),
}

impl Default for CheckerConfig {
    fn default() -> Self {
        use Variance::{Covariant, Invariant};

        let containers = [
            ("list", ContainerSpec::new(Invariant, &["Sequence"])),
            ("set", ContainerSpec::new(Invariant, &["Collection"])),
            ("frozenset", ContainerSpec::new(Covariant, &["Collection"])),
            ("Sequence", ContainerSpec::new(Covariant, &["Collection"])),
            ("Collection", ContainerSpec::new(Covariant, &["Iterable"])),
            ("Iterator", ContainerSpec::new(Covariant, &["Iterable"])),
            ("Iterable", ContainerSpec::new(Covariant, &[])),
        ]
        .into_iter()
        .map(|(name, spec)| (name.to_string(), spec))
        .collect();

        let aliases = [("List", "list"), ("Set", "set"), ("FrozenSet", "frozenset")]
            .into_iter()
            .map(|(a, t)| (a.to_string(), t.to_string()))
            .collect();

        Self {
            containers,
            aliases,
            list_display: "list".to_string(),
        }
    }
}

impl CheckerConfig {
    /// Parse and validate a JSON configuration. Omitted fields keep their
    /// defaults; a given `containers` table replaces the built-in one.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: CheckerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (ctor, spec) in &self.containers {
            if let Some(base) = spec.bases.iter().find(|b| self.resolve(b).is_none()) {
                return Err(ConfigError::UnknownBase {
                    ctor: ctor.clone(),
                    base: base.clone(),
                });
            }
        }
        for (alias, target) in &self.aliases {
            if !self.containers.contains_key(target) {
                return Err(ConfigError::UnknownAlias {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        if self.resolve(&self.list_display).is_none() {
            return Err(ConfigError::MissingListDisplay(self.list_display.clone()));
        }
        self.check_acyclic()
    }

    /// Canonical name and spec of a constructor, following one alias.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<(&'a str, &'a ContainerSpec)> {
        let canonical = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.containers
            .get_key_value(canonical)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// `true` when `sub` is `sup` or reaches it through bases.
    pub fn conforms(&self, sub: &str, sup: &str) -> bool {
        let (Some((sub, _)), Some((sup, _))) = (self.resolve(sub), self.resolve(sup)) else {
            return sub == sup;
        };
        let mut stack = vec![sub];
        let mut seen = BTreeSet::new();
        while let Some(ctor) = stack.pop() {
            if ctor == sup {
                return true;
            }
            if !seen.insert(ctor) {
                continue;
            }
            if let Some((_, spec)) = self.resolve(ctor) {
                stack.extend(
                    spec.bases
                        .iter()
                        .filter_map(|b| self.resolve(b).map(|(name, _)| name)),
                );
            }
        }
        false
    }

    fn check_acyclic(&self) -> Result<(), ConfigError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Active,
            Done,
        }

        fn visit<'a>(
            config: &'a CheckerConfig,
            ctor: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
        ) -> Result<(), ConfigError> {
            match marks.get(ctor) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Active) => return Err(ConfigError::Cycle(ctor.to_string())),
                None => {}
            }
            marks.insert(ctor, Mark::Active);
            if let Some((_, spec)) = config.resolve(ctor) {
                for base in &spec.bases {
                    if let Some((name, _)) = config.resolve(base) {
                        visit(config, name, marks)?;
                    }
                }
            }
            marks.insert(ctor, Mark::Done);
            Ok(())
        }

        let mut marks = BTreeMap::new();
        for ctor in self.containers.keys() {
            visit(self, ctor, &mut marks)?;
        }
        Ok(())
    }
}
