use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSONL log of one interactive session: commands entered,
/// store calls and their outcomes, validation rejections.
pub struct SessionLog {
    pub path: PathBuf,
    session_id: String,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl SessionLog {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            file,
        })
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn command(&mut self, line: &str) -> Result<()> {
        self.log("command", serde_json::json!({ "line": line }))
    }

    /// Log one store call and its outcome. The id is absent for list
    /// and for creates that never reached the store.
    pub fn store_call(
        &mut self,
        op: &str,
        id: Option<&str>,
        ok: bool,
        error: Option<&str>,
    ) -> Result<()> {
        self.log(
            "store_call",
            serde_json::json!({
                "op": op,
                "id": id,
                "ok": ok,
                "error": error,
            }),
        )
    }

    /// Log a submission blocked by field validation before any network
    /// call was made.
    pub fn validation_rejected(&mut self, op: &str, messages: &[&str]) -> Result<()> {
        self.log(
            "validation_rejected",
            serde_json::json!({ "op": op, "messages": messages }),
        )
    }
}
