use anyhow::{bail, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::registry::{from_params, ActionKind, Params, Registry};
use crate::audit::AuditLog;

/// Requests that do not declare a version speak the last
/// pre-versioning protocol.
const DEFAULT_VERSION: i64 = 4;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MultiParams {
    actions: Vec<Value>,
}

/// Resolves request envelopes against the registry and invokes the
/// matched handlers.
///
/// Pure given the registry and the envelope: any side effects belong
/// to the handlers themselves.
pub struct Dispatcher {
    registry: Registry,
    audit: Option<AuditLog>,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            audit: None,
        }
    }

    /// Attaches a sink that records every request and reply envelope,
    /// batched sub-calls included.
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Resolves and invokes one request envelope, returning the reply.
    ///
    /// Failures of any kind, whether an unknown action, bad parameters
    /// or an error raised by the handler, come back inside the reply
    /// envelope, never as a panic or a dropped call: the caller always
    /// has something to send.
    ///
    /// A successful call from a client on version 4 or older gets the
    /// bare result value instead of the `{result, error}` envelope, a
    /// compatibility shim for pre-versioning clients. Failed calls
    /// keep the full envelope so the error stays visible.
    pub fn dispatch(&self, request: &Value) -> Value {
        if let Some(audit) = &self.audit {
            audit.record("request", request);
        }

        let action = request.get("action").and_then(Value::as_str).unwrap_or("");
        let version = request
            .get("version")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_VERSION);

        let reply = match self.invoke(action, version, request.get("params")) {
            Ok(result) if version <= DEFAULT_VERSION => result,
            Ok(result) => json!({ "result": result, "error": null }),
            Err(e) => json!({ "result": null, "error": e.to_string() }),
        };

        if let Some(audit) = &self.audit {
            audit.record("reply", &reply);
        }

        reply
    }

    fn invoke(&self, action: &str, version: i64, params: Option<&Value>) -> Result<Value> {
        let empty = Params::new();
        let params = match params {
            None => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => bail!("params must be an object"),
        };

        let Some(entry) = self.registry.resolve(action, version) else {
            bail!("unsupported action");
        };

        match &entry.kind {
            ActionKind::Func(handler) => handler(params),
            ActionKind::Batch => {
                let MultiParams { actions } = from_params(params)?;
                // Each entry runs the full pipeline on its own; one
                // failing sub-request never aborts the rest.
                Ok(Value::Array(
                    actions.iter().map(|sub| self.dispatch(sub)).collect(),
                ))
            }
        }
    }
}
