//! Record store gateway: the remote document database holding the
//! "users" collection.
//!
//! The remote side is a Firestore-style REST document API. Everything
//! the rest of the app needs goes through the [`RecordStore`] trait so
//! flows can be exercised against an in-memory fake.

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

/// A user document as stored remotely. The id is assigned by the store
/// on creation and never generated client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// The writable fields of a user document (no id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// Collection-scoped operations against the remote store. All errors
/// collapse to a single class; callers catch, log, and show a generic
/// message rather than rethrowing.
pub trait RecordStore {
    /// Create a document; returns the store-assigned id.
    fn create(&self, fields: &UserFields) -> Result<String>;
    /// Fetch the whole collection in store order.
    fn list(&self) -> Result<Vec<UserRecord>>;
    /// Partial write of the three fields to an existing document.
    fn update(&self, id: &str, fields: &UserFields) -> Result<()>;
    fn delete(&self, id: &str) -> Result<()>;
}

pub struct FirestoreStore {
    parent_url: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl FirestoreStore {
    pub fn new(
        base_url: &str,
        project: &str,
        database: &str,
        collection: &str,
        api_key: Option<String>,
    ) -> Self {
        let parent_url = format!(
            "{}/projects/{}/databases/{}/documents/{}",
            base_url.trim_end_matches('/'),
            project,
            database,
            collection
        );
        Self {
            parent_url,
            api_key,
            agent: ureq::Agent::new(),
        }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let mut req = self.agent.request(method, url);
        if let Some(key) = &self.api_key {
            req = req.set("Authorization", &format!("Bearer {}", key));
        }
        req
    }

    fn send(&self, req: ureq::Request, body: Option<Value>) -> Result<Value> {
        let resp = match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };
        match resp {
            Ok(r) => {
                // Delete responses can come back with an empty body
                let body = r.into_string()?;
                if body.trim().is_empty() {
                    Ok(Value::Null)
                } else {
                    Ok(serde_json::from_str(&body)?)
                }
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(anyhow!("store error {}: {}", code, body))
            }
            Err(e) => Err(anyhow!("request failed: {}", e)),
        }
    }
}

impl RecordStore for FirestoreStore {
    fn create(&self, fields: &UserFields) -> Result<String> {
        let req = self.request("POST", &self.parent_url);
        let doc = self.send(req, Some(json!({ "fields": encode_fields(fields) })))?;
        document_id(&doc).ok_or_else(|| anyhow!("create response missing document name"))
    }

    fn list(&self) -> Result<Vec<UserRecord>> {
        let req = self.request("GET", &self.parent_url);
        let body = self.send(req, None)?;
        // The documents key is absent entirely when the collection is empty.
        let docs = body
            .get("documents")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(docs.iter().map(decode_document).collect())
    }

    fn update(&self, id: &str, fields: &UserFields) -> Result<()> {
        let url = format!("{}/{}", self.parent_url, id);
        let req = self
            .request("PATCH", &url)
            .query("updateMask.fieldPaths", "name")
            .query("updateMask.fieldPaths", "email")
            .query("updateMask.fieldPaths", "age");
        self.send(req, Some(json!({ "fields": encode_fields(fields) })))?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let url = format!("{}/{}", self.parent_url, id);
        self.send(self.request("DELETE", &url), None)?;
        Ok(())
    }
}

/// Encode write fields in Firestore value JSON. Integers travel as
/// strings on this wire.
fn encode_fields(fields: &UserFields) -> Value {
    json!({
        "name": { "stringValue": fields.name },
        "email": { "stringValue": fields.email },
        "age": { "integerValue": fields.age.to_string() },
    })
}

/// The id is the last segment of the full document resource path.
fn document_id(doc: &Value) -> Option<String> {
    doc.get("name")
        .and_then(Value::as_str)
        .and_then(|path| path.rsplit('/').next())
        .map(str::to_string)
}

/// Decode one document. Missing or malformed fields fall back to
/// defaults rather than failing the whole list fetch.
fn decode_document(doc: &Value) -> UserRecord {
    let field = |name: &str, kind: &str| -> Option<String> {
        doc.get("fields")?
            .get(name)?
            .get(kind)?
            .as_str()
            .map(str::to_string)
    };
    UserRecord {
        id: document_id(doc).unwrap_or_default(),
        name: field("name", "stringValue").unwrap_or_default(),
        email: field("email", "stringValue").unwrap_or_default(),
        age: field("age", "integerValue")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
    }
}

/// In-memory stand-in for the remote store, shared by flow tests.
#[cfg(test)]
pub mod fake {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    pub struct MemoryStore {
        pub records: RefCell<Vec<UserRecord>>,
        next_id: Cell<u64>,
        pub fail: Cell<bool>,
        pub calls: RefCell<Vec<String>>,
    }

    impl MemoryStore {
        pub fn with_records(records: Vec<UserRecord>) -> Self {
            let store = Self::default();
            *store.records.borrow_mut() = records;
            store
        }

        fn check(&self, op: &str) -> Result<()> {
            self.calls.borrow_mut().push(op.to_string());
            if self.fail.get() {
                Err(anyhow!("store error 503: unavailable"))
            } else {
                Ok(())
            }
        }
    }

    impl RecordStore for MemoryStore {
        fn create(&self, fields: &UserFields) -> Result<String> {
            self.check("create")?;
            let id = format!("doc{}", self.next_id.get());
            self.next_id.set(self.next_id.get() + 1);
            self.records.borrow_mut().push(UserRecord {
                id: id.clone(),
                name: fields.name.clone(),
                email: fields.email.clone(),
                age: fields.age,
            });
            Ok(id)
        }

        fn list(&self) -> Result<Vec<UserRecord>> {
            self.check("list")?;
            Ok(self.records.borrow().clone())
        }

        fn update(&self, id: &str, fields: &UserFields) -> Result<()> {
            self.check("update")?;
            let mut records = self.records.borrow_mut();
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| anyhow!("store error 404: not found"))?;
            record.name = fields.name.clone();
            record.email = fields.email.clone();
            record.age = fields.age;
            Ok(())
        }

        fn delete(&self, id: &str) -> Result<()> {
            self.check("delete")?;
            let mut records = self.records.borrow_mut();
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Err(anyhow!("store error 404: not found"));
            }
            Ok(())
        }
    }
}
