use crate::{
    config::Config,
    coordinator::{Coordinator, EditSignal, Mode},
    forms::{self, FormState, SubmitOutcome},
    list::ListView,
    session::SessionLog,
    store::{RecordStore, UserRecord},
    Args,
};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;

pub struct Context {
    pub args: Args,
    pub config: Config,
    pub store: Box<dyn RecordStore>,
    pub session: RefCell<SessionLog>,
    pub session_id: String,
    pub tracing: RefCell<bool>,
}

impl Context {
    fn trace(&self, line: &str) {
        if *self.tracing.borrow() {
            eprintln!("[trace] {}", line);
        }
    }
}

/// One-shot mode: run a single browsing command and exit. Commands
/// that need form input are interactive-only.
pub fn run_once(ctx: &Context, line: &str) -> Result<()> {
    let _ = ctx.session.borrow_mut().command(line);
    let mut list = ListView::new();
    match line.trim() {
        "list" | "ls" | "refresh" => {
            fetch_list(ctx, &mut list);
            println!("{}", list.render());
            Ok(())
        }
        other => Err(anyhow::anyhow!(
            "'{}' is not available in one-shot mode (try: list)",
            other
        )),
    }
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut list = ListView::new();
    let mut coord = Coordinator::new();

    println!("roster - type 'help' for commands, 'quit' to exit");

    // First mount: fetch the collection before the first prompt
    fetch_list(&ctx, &mut list);
    println!("{}", list.render());

    loop {
        let prompt = match coord.mode() {
            Mode::Browsing => "users> ".to_string(),
            Mode::Editing(record) => format!("edit {}> ", record.id),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;
                let _ = ctx.session.borrow_mut().command(line);

                let quit = match coord.mode().clone() {
                    Mode::Browsing => handle_browsing(&ctx, line, &mut rl, &mut list, &mut coord)?,
                    Mode::Editing(record) => {
                        handle_editing(&ctx, line, &record, &mut rl, &mut coord)?
                    }
                };
                if quit {
                    break;
                }

                // Completed edits, deletes, and creates all queue a
                // refresh; cancels do not.
                if coord.take_refresh() {
                    fetch_list(&ctx, &mut list);
                    println!("{}", list.render());
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn handle_browsing(
    ctx: &Context,
    line: &str,
    rl: &mut DefaultEditor,
    list: &mut ListView,
    coord: &mut Coordinator,
) -> Result<bool> {
    let parts: Vec<&str> = line.splitn(2, ' ').collect();
    match parts[0] {
        "quit" | "exit" => return Ok(true),
        "help" => {
            println!("Commands:");
            println!("  list            - show the fetched users");
            println!("  refresh         - re-fetch the collection");
            println!("  add             - create a new user");
            println!("  edit <n>        - edit or delete the n-th listed user");
            println!("  session         - show session info");
            println!("  trace           - toggle store call tracing");
            println!("  quit            - exit");
        }
        "list" | "ls" => println!("{}", list.render()),
        "refresh" => {
            fetch_list(ctx, list);
            println!("{}", list.render());
        }
        "add" => {
            if run_create_form(ctx, rl)? {
                coord.record_added();
            }
        }
        "edit" => {
            let index = parts.get(1).and_then(|s| s.trim().parse::<usize>().ok());
            match index.and_then(|i| list.select(i)) {
                Some(record) => coord.select(record.clone()),
                None => println!("Usage: edit <n> (n from the list output)"),
            }
        }
        "session" => {
            println!("Session: {}", ctx.session_id);
            println!("Log: {:?}", ctx.session.borrow().path);
            println!(
                "Store: {}/{} ({})",
                ctx.config.store.project, ctx.config.store.collection, ctx.config.store.base_url
            );
        }
        "trace" => {
            let mut t = ctx.tracing.borrow_mut();
            *t = !*t;
            println!("Tracing: {}", if *t { "on" } else { "off" });
        }
        _ => println!("Unknown command: {} (try 'help')", parts[0]),
    }
    Ok(false)
}

fn handle_editing(
    ctx: &Context,
    line: &str,
    record: &UserRecord,
    rl: &mut DefaultEditor,
    coord: &mut Coordinator,
) -> Result<bool> {
    match line {
        "quit" | "exit" => return Ok(true),
        "help" => {
            println!("Commands:");
            println!("  show            - show the selected user");
            println!("  update          - edit and save the selected user");
            println!("  delete          - delete the selected user");
            println!("  cancel          - back to the list without changes");
            println!("  quit            - exit");
        }
        "show" => {
            println!("{}  <{}>  {} years old", record.name, record.email, record.age);
        }
        "update" => {
            if run_edit_form(ctx, rl, record)? {
                coord.finish_edit(EditSignal::Completed);
            }
        }
        "delete" => {
            if run_delete(ctx, rl, record)? {
                coord.finish_edit(EditSignal::Completed);
            }
        }
        "cancel" => coord.finish_edit(EditSignal::Cancelled),
        other => println!("Unknown command: {} (try 'help')", other),
    }
    Ok(false)
}

/// Prompt for one field with the current draft pre-filled. `None`
/// means the user backed out of the form.
fn prompt_field(rl: &mut DefaultEditor, label: &str, draft: &str) -> Result<Option<String>> {
    match rl.readline_with_initial(&format!("  {}: ", label), (draft, "")) {
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fill the three fields, keeping the draft across retries. `None`
/// means the form was abandoned.
fn fill_form(rl: &mut DefaultEditor, form: &mut FormState) -> Result<bool> {
    let Some(name) = prompt_field(rl, "Name", &form.name)? else {
        return Ok(false);
    };
    form.name = name;
    let Some(email) = prompt_field(rl, "Email", &form.email)? else {
        return Ok(false);
    };
    form.email = email;
    let Some(age) = prompt_field(rl, "Age", &form.age)? else {
        return Ok(false);
    };
    form.age = age;
    Ok(true)
}

/// The create form. Loops until the store accepts the record or the
/// user abandons the form; rejected or failed submissions keep the
/// field contents for the next attempt. Returns whether a record was
/// added.
fn run_create_form(ctx: &Context, rl: &mut DefaultEditor) -> Result<bool> {
    let mut form = FormState::empty();
    println!("New user (Ctrl-C to abort):");

    loop {
        if !fill_form(rl, &mut form)? {
            println!("Add cancelled.");
            return Ok(false);
        }

        match forms::submit_create(ctx.store.as_ref(), &mut form) {
            SubmitOutcome::Saved => {
                let _ = ctx.session.borrow_mut().store_call("create", None, true, None);
                ctx.trace("create -> ok");
                println!("User added successfully!");
                return Ok(true);
            }
            SubmitOutcome::Rejected(verdict) => {
                let messages = verdict.messages();
                let _ = ctx
                    .session
                    .borrow_mut()
                    .validation_rejected("create", &messages);
                for message in messages {
                    println!("{}", message);
                }
            }
            SubmitOutcome::Failed(e) => {
                let _ = ctx.session.borrow_mut().store_call(
                    "create",
                    None,
                    false,
                    Some(&e.to_string()),
                );
                ctx.trace(&format!("create -> {}", e));
                println!("Error adding user");
            }
            SubmitOutcome::Busy => {
                println!("A request is already in progress");
                return Ok(false);
            }
        }
    }
}

/// The edit form, pre-populated from the selected record. Returns
/// whether the update was saved.
fn run_edit_form(ctx: &Context, rl: &mut DefaultEditor, record: &UserRecord) -> Result<bool> {
    let mut form = FormState::from_record(record);
    println!("Editing {} (Ctrl-C to abort):", record.id);

    loop {
        if !fill_form(rl, &mut form)? {
            println!("Update cancelled.");
            return Ok(false);
        }

        match forms::submit_update(ctx.store.as_ref(), &record.id, &mut form) {
            SubmitOutcome::Saved => {
                let _ = ctx
                    .session
                    .borrow_mut()
                    .store_call("update", Some(&record.id), true, None);
                ctx.trace(&format!("update {} -> ok", record.id));
                println!("User updated successfully!");
                return Ok(true);
            }
            SubmitOutcome::Rejected(verdict) => {
                let messages = verdict.messages();
                let _ = ctx
                    .session
                    .borrow_mut()
                    .validation_rejected("update", &messages);
                for message in messages {
                    println!("{}", message);
                }
            }
            SubmitOutcome::Failed(e) => {
                let _ = ctx.session.borrow_mut().store_call(
                    "update",
                    Some(&record.id),
                    false,
                    Some(&e.to_string()),
                );
                ctx.trace(&format!("update {} -> {}", record.id, e));
                println!("Error updating user");
            }
            SubmitOutcome::Busy => {
                println!("A request is already in progress");
                return Ok(false);
            }
        }
    }
}

/// Confirm and delete the selected record. Returns whether it was
/// deleted.
fn run_delete(ctx: &Context, rl: &mut DefaultEditor, record: &UserRecord) -> Result<bool> {
    let answer = match rl.readline(&format!(
        "Delete {} <{}>? This cannot be undone. [y/N] ",
        record.name, record.email
    )) {
        Ok(line) => line,
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        return Ok(false);
    }

    match forms::delete_record(ctx.store.as_ref(), &record.id) {
        Ok(()) => {
            let _ = ctx
                .session
                .borrow_mut()
                .store_call("delete", Some(&record.id), true, None);
            ctx.trace(&format!("delete {} -> ok", record.id));
            println!("User deleted successfully!");
            Ok(true)
        }
        Err(e) => {
            let _ = ctx.session.borrow_mut().store_call(
                "delete",
                Some(&record.id),
                false,
                Some(&e.to_string()),
            );
            ctx.trace(&format!("delete {} -> {}", record.id, e));
            println!("Error deleting user");
            Ok(false)
        }
    }
}

/// Fetch the collection into the list view. Failures keep the previous
/// rows; they are logged, not retried.
fn fetch_list(ctx: &Context, list: &mut ListView) {
    match list.refresh(ctx.store.as_ref()) {
        Ok(()) => {
            let _ = ctx.session.borrow_mut().store_call("list", None, true, None);
            ctx.trace(&format!("list -> {} rows", list.rows().len()));
        }
        Err(e) => {
            let _ = ctx
                .session
                .borrow_mut()
                .store_call("list", None, false, Some(&e.to_string()));
            ctx.trace(&format!("list -> {}", e));
            eprintln!("Error fetching users");
        }
    }
}
