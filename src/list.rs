//! The user list: a session-local mirror of the remote collection.

use crate::store::{RecordStore, UserRecord};
use anyhow::Result;

/// Rows fetched from the store, in store order. Each refresh replaces
/// the rows wholesale; there is no cache beyond this.
#[derive(Debug, Default)]
pub struct ListView {
    rows: Vec<UserRecord>,
    /// Set while a user-initiated refresh is pending.
    pub refreshing: bool,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[UserRecord] {
        &self.rows
    }

    /// Re-fetch the whole collection. On failure the previous rows are
    /// kept and the error is returned for the caller to log; no retry
    /// is scheduled. The refreshing flag clears either way.
    pub fn refresh(&mut self, store: &dyn RecordStore) -> Result<()> {
        self.refreshing = true;
        let result = store.list();
        self.refreshing = false;

        match result {
            Ok(rows) => {
                self.rows = rows;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Look up a row by 1-based display index, as rendered.
    pub fn select(&self, index: usize) -> Option<&UserRecord> {
        index.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// Render the rows the way the mobile list did: name, email, age.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "(no users)".to_string();
        }
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            out.push_str(&format!(
                "{:>3}. {}  <{}>  {} years old\n",
                i + 1,
                row.name,
                row.email,
                row.age
            ));
        }
        out.pop();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::MemoryStore;

    fn record(id: &str, name: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", id),
            age: 30,
        }
    }

    #[test]
    fn test_refresh_replaces_rows_in_store_order() {
        let store = MemoryStore::with_records(vec![
            record("a", "Alice"),
            record("b", "Bob"),
            record("c", "Cleo"),
        ]);
        let mut list = ListView::new();
        list.refresh(&store).unwrap();
        assert_eq!(list.rows().len(), 3);
        assert_eq!(list.rows()[1].name, "Bob");
        assert!(!list.refreshing);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_rows() {
        let store = MemoryStore::with_records(vec![record("a", "Alice")]);
        let mut list = ListView::new();
        list.refresh(&store).unwrap();

        store.fail.set(true);
        assert!(list.refresh(&store).is_err());
        assert_eq!(list.rows().len(), 1);
        assert!(!list.refreshing);
    }

    #[test]
    fn test_select_is_one_based() {
        let store = MemoryStore::with_records(vec![record("a", "Alice"), record("b", "Bob")]);
        let mut list = ListView::new();
        list.refresh(&store).unwrap();

        assert_eq!(list.select(1).unwrap().name, "Alice");
        assert_eq!(list.select(2).unwrap().id, "b");
        assert!(list.select(0).is_none());
        assert!(list.select(3).is_none());
    }

    #[test]
    fn test_render_empty() {
        let list = ListView::new();
        assert_eq!(list.render(), "(no users)");
    }
}
