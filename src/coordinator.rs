//! Root coordinator: which view is active, and when the list must
//! refresh.
//!
//! Two states only. Browsing shows the list plus the create form;
//! Editing binds the edit/delete form to one selected record. A
//! completed edit or delete queues exactly one list refresh on the way
//! back to Browsing; a cancel does not.

use crate::store::UserRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Editing(UserRecord),
}

/// How an editing session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSignal {
    /// An update or delete went through; the collection changed.
    Completed,
    /// The user backed out; nothing was written.
    Cancelled,
}

#[derive(Debug)]
pub struct Coordinator {
    mode: Mode,
    needs_refresh: bool,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            mode: Mode::Browsing,
            needs_refresh: false,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selected(&self) -> Option<&UserRecord> {
        match &self.mode {
            Mode::Editing(record) => Some(record),
            Mode::Browsing => None,
        }
    }

    /// A list row was chosen while Browsing.
    pub fn select(&mut self, record: UserRecord) {
        self.mode = Mode::Editing(record);
    }

    /// The create form saved a new record while Browsing.
    pub fn record_added(&mut self) {
        self.needs_refresh = true;
    }

    /// The editing session ended; return to Browsing with no
    /// selection. Completion queues a refresh, cancellation does not.
    pub fn finish_edit(&mut self, signal: EditSignal) {
        self.mode = Mode::Browsing;
        if signal == EditSignal::Completed {
            self.needs_refresh = true;
        }
    }

    /// Consume the pending refresh request, if any.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.needs_refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            id: "doc1".to_string(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            age: 29,
        }
    }

    #[test]
    fn test_initial_state_browsing() {
        let mut coord = Coordinator::new();
        assert_eq!(*coord.mode(), Mode::Browsing);
        assert!(coord.selected().is_none());
        assert!(!coord.take_refresh());
    }

    #[test]
    fn test_select_enters_editing_with_record() {
        let mut coord = Coordinator::new();
        coord.select(record());
        assert_eq!(coord.selected().unwrap().id, "doc1");
    }

    #[test]
    fn test_completion_returns_to_browsing_and_queues_one_refresh() {
        let mut coord = Coordinator::new();
        coord.select(record());
        coord.finish_edit(EditSignal::Completed);

        assert_eq!(*coord.mode(), Mode::Browsing);
        assert!(coord.selected().is_none());
        assert!(coord.take_refresh());
        // Consumed: not queued again
        assert!(!coord.take_refresh());
    }

    #[test]
    fn test_cancel_returns_to_browsing_without_refresh() {
        let mut coord = Coordinator::new();
        coord.select(record());
        coord.finish_edit(EditSignal::Cancelled);

        assert_eq!(*coord.mode(), Mode::Browsing);
        assert!(!coord.take_refresh());
    }

    #[test]
    fn test_record_added_queues_refresh() {
        let mut coord = Coordinator::new();
        coord.record_added();
        assert!(coord.take_refresh());
    }
}
