use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

/// Append-only sink for request and reply envelopes.
///
/// Entries are written as `[request]` / `[reply]` blocks of
/// pretty-printed JSON so a captured session stays readable.
pub struct AuditLog {
    file: Mutex<File>,
}

impl AuditLog {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open api log {}", path.display()))?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one tagged envelope. Sink failures are logged and
    /// swallowed; auditing never fails a call.
    pub fn record(&self, tag: &str, envelope: &Value) {
        let text = serde_json::to_string_pretty(envelope).unwrap_or_else(|_| "null".to_string());

        let Ok(mut file) = self.file.lock() else {
            return;
        };
        if let Err(e) = writeln!(file, "[{}]\n{}\n", tag, text) {
            warn!("Api log write failed: {}", e);
        }
    }
}
