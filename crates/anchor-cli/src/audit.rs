//! Append-only JSON-lines audit sink for receipts.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use anchor_core::AnchorReceipt;

/// A file that receives one JSON object per receipt, one per line.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Sink at `path`. The file and its parent directories are created on
    /// first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `receipts` in order.
    pub fn append(&self, receipts: &[AnchorReceipt]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening audit log {}", self.path.display()))?;

        let mut buf = String::new();
        for receipt in receipts {
            buf.push_str(&serde_json::to_string(receipt)?);
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())
            .with_context(|| format!("writing audit log {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), count = receipts.len(), "appended receipts");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_core::{AnchorRecord, DecisionRecord, FailureKind, DISABLED_MESSAGE};

    fn receipt(id: &str) -> AnchorReceipt {
        let decision = DecisionRecord::builder(id).cost(1.0).score(2.0).build().unwrap();
        let raw = serde_json::json!({
            "attempt_id": "00000000-0000-4000-8000-000000000000",
            "success": false,
            "error": DISABLED_MESSAGE,
            "failure": FailureKind::Disabled,
            "record": AnchorRecord::from_decision(&decision),
        });
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn appends_one_line_per_receipt_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("nested/audit.jsonl"));

        log.append(&[receipt("a"), receipt("b")]).unwrap();
        log.append(&[receipt("c")]).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let ids: Vec<String> = content
            .lines()
            .map(|line| {
                let v: serde_json::Value = serde_json::from_str(line).unwrap();
                v["record"]["decision_id"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn empty_append_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl"));
        log.append(&[]).unwrap();
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
    }
}
