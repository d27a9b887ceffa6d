//! Create and edit/delete submission flows.
//!
//! A flow validates the raw field text, then issues exactly one store
//! call. Outcomes are returned to the caller, which owns printing,
//! session logging, and the coordinator transition; a flow never
//! touches the UI directly.

use crate::store::{RecordStore, UserFields};
use crate::validate::{self, Verdict};
use anyhow::Error;

/// Mutable form state for the three text fields. Edit forms start
/// pre-populated from an existing record, with age rendered as text.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub name: String,
    pub email: String,
    pub age: String,
    /// Set while a store call is pending; a submit while busy is
    /// ignored. Advisory debouncing only, not mutual exclusion.
    pub busy: bool,
}

impl FormState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_record(record: &crate::store::UserRecord) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            age: record.age.to_string(),
            busy: false,
        }
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.age.clear();
    }
}

/// Result of one submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The store accepted the write. Create flows have already cleared
    /// the form; the caller must trigger a list refresh.
    Saved,
    /// Field validation failed; the store was never contacted and the
    /// field contents are untouched.
    Rejected(Verdict),
    /// The store rejected the call; field contents are untouched so
    /// the user can retry.
    Failed(Error),
    /// A call was already pending; nothing was done.
    Busy,
}

/// Validate and parse the form into a write payload. Age has already
/// passed the digits-only rule, but parse failure (overflow) still
/// fails closed as a rejection rather than defaulting.
fn parse_fields(form: &FormState) -> Result<UserFields, Verdict> {
    let verdict = validate::validate(&form.name, &form.email, &form.age);
    if !verdict.is_valid() {
        return Err(verdict);
    }
    let age = form.age.parse::<i64>().map_err(|_| Verdict {
        age: Some(validate::AGE_MESSAGE),
        ..Verdict::default()
    })?;
    Ok(UserFields {
        name: form.name.clone(),
        email: form.email.clone(),
        age,
    })
}

/// Submit the create form. On success the fields reset to empty.
pub fn submit_create(store: &dyn RecordStore, form: &mut FormState) -> SubmitOutcome {
    if form.busy {
        return SubmitOutcome::Busy;
    }
    let fields = match parse_fields(form) {
        Ok(fields) => fields,
        Err(verdict) => return SubmitOutcome::Rejected(verdict),
    };

    form.busy = true;
    let result = store.create(&fields);
    form.busy = false;

    match result {
        Ok(_id) => {
            form.clear();
            SubmitOutcome::Saved
        }
        Err(e) => SubmitOutcome::Failed(e),
    }
}

/// Submit the edit form as a partial write to an existing record.
/// Field contents survive both rejection and store failure.
pub fn submit_update(store: &dyn RecordStore, id: &str, form: &mut FormState) -> SubmitOutcome {
    if form.busy {
        return SubmitOutcome::Busy;
    }
    let fields = match parse_fields(form) {
        Ok(fields) => fields,
        Err(verdict) => return SubmitOutcome::Rejected(verdict),
    };

    form.busy = true;
    let result = store.update(id, &fields);
    form.busy = false;

    match result {
        Ok(()) => SubmitOutcome::Saved,
        Err(e) => SubmitOutcome::Failed(e),
    }
}

/// Delete an existing record. The destructive-action confirmation
/// happens before this is called.
pub fn delete_record(store: &dyn RecordStore, id: &str) -> Result<(), Error> {
    store.delete(id)
}
