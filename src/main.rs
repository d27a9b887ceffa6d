mod cli;
mod config;
mod coordinator;
mod forms;
mod list;
mod session;
mod store;
mod validate;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster", about = "A terminal front-end for a hosted users collection")]
pub struct Args {
    #[arg(short = 'p', long, help = "One-shot command mode (e.g. 'list')")]
    pub command: Option<String>,

    #[arg(long, env = "ROSTER_PROJECT", help = "Hosted store project id")]
    pub project: Option<String>,

    #[arg(long, help = "Database id (default: the store's default database)")]
    pub database: Option<String>,

    #[arg(long, help = "Collection name (default: users)")]
    pub collection: Option<String>,

    #[arg(long, env = "FIRESTORE_BASE_URL", help = "REST endpoint root")]
    pub base_url: Option<String>,

    #[arg(long, help = "Bearer key (overrides config and env)")]
    pub api_key: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Session logs directory")]
    pub sessions_dir: Option<PathBuf>,

    #[arg(long, help = "Echo store calls and outcomes to stderr")]
    pub trace: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load().unwrap_or_default()
    };

    // CLI flags override the merged config
    if let Some(project) = &args.project {
        cfg.store.project = project.clone();
    }
    if let Some(database) = &args.database {
        cfg.store.database = database.clone();
    }
    if let Some(collection) = &args.collection {
        cfg.store.collection = collection.clone();
    }
    if let Some(base_url) = &args.base_url {
        cfg.store.base_url = base_url.clone();
    }
    if let Some(api_key) = &args.api_key {
        cfg.store.api_key = Some(api_key.clone());
    }
    if let Some(dir) = &args.sessions_dir {
        cfg.sessions_dir = Some(dir.clone());
    }

    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error {}", error);
        }
        return Err(anyhow::anyhow!("invalid configuration"));
    }

    let sessions_dir = cfg
        .sessions_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(".roster").join("sessions"));
    std::fs::create_dir_all(&sessions_dir)?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let session_path = sessions_dir.join(format!("{}.jsonl", session_id));
    let session = session::SessionLog::new(&session_path, &session_id)?;

    let api_key = cfg.store.resolve_api_key();
    let store = store::FirestoreStore::new(
        &cfg.store.base_url,
        &cfg.store.project,
        &cfg.store.database,
        &cfg.store.collection,
        api_key,
    );

    let trace = args.trace;
    let ctx = cli::Context {
        args,
        config: cfg,
        store: Box::new(store),
        session: RefCell::new(session),
        session_id,
        tracing: RefCell::new(trace),
    };

    if let Some(command) = ctx.args.command.clone() {
        cli::run_once(&ctx, &command)
    } else {
        cli::run_repl(ctx)
    }
}
