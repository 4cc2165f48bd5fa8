use std::collections::BTreeMap;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::api::API_VERSION;

/// Parameters of one request envelope: a plain JSON object.
pub type Params = Map<String, Value>;

/// A registered action handler.
pub type Handler = Box<dyn Fn(&Params) -> Result<Value> + Send + Sync>;

pub(crate) enum ActionKind {
    /// An ordinary handler function
    Func(Handler),
    /// The built-in batch action, dispatched recursively by the
    /// dispatcher itself
    Batch,
}

/// One registry entry: how the action is invoked plus the version
/// aliases it answers to.
pub(crate) struct Action {
    pub kind: ActionKind,
    /// `(min_version, alias)` pairs; the highest `min_version` not
    /// above the requested version decides the name this entry
    /// answers to
    pub version_aliases: Vec<(u32, String)>,
}

/// The action table: built once at startup, read-only afterwards.
///
/// A `BTreeMap` keeps iteration lexicographic by declared name, so
/// alias resolution is deterministic when two entries could answer to
/// the same name.
pub struct Registry {
    actions: BTreeMap<String, Action>,
}

impl Registry {
    /// Finds the entry answering to `action` under the requested
    /// protocol `version`.
    ///
    /// Every entry answers to exactly one name per version: the alias
    /// with the highest qualifying `min_version`, or the declared name
    /// when no alias qualifies. The first match in lexicographic order
    /// wins.
    pub(crate) fn resolve(&self, action: &str, version: i64) -> Option<&Action> {
        for (name, entry) in &self.actions {
            let mut chosen_version = 0i64;
            let mut chosen_alias: Option<&str> = None;

            for (min_version, alias) in &entry.version_aliases {
                let min_version = i64::from(*min_version);
                if chosen_version < min_version && min_version <= version {
                    chosen_version = min_version;
                    chosen_alias = Some(alias);
                }
            }

            if chosen_alias.is_none() && chosen_version == 0 {
                chosen_alias = Some(name);
            }

            if chosen_alias == Some(action) {
                return Some(entry);
            }
        }

        None
    }
}

/// Assembles the immutable [`Registry`].
///
/// Starts preloaded with the built-in actions: `version` reports the
/// protocol version and `multi` batches a sequence of requests.
pub struct RegistryBuilder {
    actions: BTreeMap<String, Action>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            actions: BTreeMap::new(),
        };

        builder.actions.insert(
            "multi".to_string(),
            Action {
                kind: ActionKind::Batch,
                version_aliases: Vec::new(),
            },
        );

        builder.register("version", |params| {
            ensure_no_params(params)?;
            Ok(Value::from(API_VERSION))
        })
    }

    /// Registers `name` with a handler and no version aliases.
    pub fn register<F>(self, name: &str, handler: F) -> Self
    where
        F: Fn(&Params) -> Result<Value> + Send + Sync + 'static,
    {
        self.register_aliased(name, Vec::new(), handler)
    }

    /// Registers `name` with the `(min_version, alias)` pairs under
    /// which clients on other protocol versions reach it.
    ///
    /// A colliding registration is flagged here rather than failing a
    /// request later; resolution stays first-match-wins.
    pub fn register_aliased<F>(
        mut self,
        name: &str,
        version_aliases: Vec<(u32, String)>,
        handler: F,
    ) -> Self
    where
        F: Fn(&Params) -> Result<Value> + Send + Sync + 'static,
    {
        if self.actions.contains_key(name) {
            warn!("Action '{}' registered twice, replacing", name);
        }
        for (_, alias) in &version_aliases {
            if self.collides(name, alias) {
                warn!("Alias '{}' of action '{}' shadows another entry", alias, name);
            }
        }

        self.actions.insert(
            name.to_string(),
            Action {
                kind: ActionKind::Func(Box::new(handler)),
                version_aliases,
            },
        );

        self
    }

    pub fn build(self) -> Registry {
        Registry {
            actions: self.actions,
        }
    }

    fn collides(&self, name: &str, alias: &str) -> bool {
        self.actions.iter().any(|(other, entry)| {
            other.as_str() != name
                && (other.as_str() == alias
                    || entry.version_aliases.iter().any(|(_, a)| a.as_str() == alias))
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes the params object into a typed struct.
///
/// Pair with `#[serde(deny_unknown_fields)]` on the target struct so a
/// request carrying extra or missing parameters fails the call instead
/// of being silently accepted.
pub fn from_params<T: DeserializeOwned>(params: &Params) -> Result<T> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| anyhow::anyhow!("invalid params: {}", e))
}

/// For actions that take no parameters at all.
pub fn ensure_no_params(params: &Params) -> Result<()> {
    if let Some(name) = params.keys().next() {
        anyhow::bail!("unexpected parameter '{}'", name);
    }
    Ok(())
}
