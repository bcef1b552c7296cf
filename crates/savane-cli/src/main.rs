//! savane2github - Savane to GitHub migration tool

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod github;
mod http;
mod store;

use cli::{App, Command, Global};
use github::{GitHub, IssueTracker};
use http::SavaneSession;
use store::ProjectStore;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn main() {
    let app = App::parse();
    init_tracing(app.global.verbose);

    eprintln!("Savane to GitHub Migration Tool v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(app) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(app: App) -> Result<()> {
    let global = app.global;
    match app.command {
        Command::List(args) => {
            let (session, store) = open_session(&global)?;
            let project = global.project()?;
            for kind in args.kinds {
                commands::list_tracker(&session, &store, session.instance(), project, kind)?;
            }
        }
        Command::Download(args) => {
            let (session, store) = open_session(&global)?;
            for kind in args.kinds {
                commands::download_tracker(&session, &store, session.instance(), kind)?;
            }
        }
        Command::Import(args) => {
            let store = open_store(&global)?;
            let instance = global.instance.trim_end_matches('/');
            for kind in args.kinds {
                commands::import_tracker(&store, instance, kind)?;
            }
        }
        Command::ImportSf(args) => {
            let store = open_store(&global)?;
            commands::import_sourceforge_export(&store, &args.export)?;
        }
        Command::Dump(args) => {
            let store = open_store(&global)?;
            let mut stdout = io::stdout().lock();
            for name in args.names() {
                let trackers = store.read_trackers(&name)?;
                commands::dump_trackers(&trackers, &mut stdout)?;
            }
        }
        Command::Export(args) => {
            let store = open_store(&global)?;
            let mut github = if args.dry_run {
                None
            } else {
                let token = args
                    .access_token
                    .as_deref()
                    .context("--access-token or GITHUB_TOKEN is required unless --dry-run is given")?;
                Some(GitHub::new(&args.repo_path, token)?)
            };

            let mut stdout = io::stdout().lock();
            for name in args.trackers.names() {
                let destination = github.as_mut().map(|g| g as &mut dyn IssueTracker);
                commands::export_tracker(&store, &name, destination, &mut stdout)?;
            }
        }
        Command::Convert(args) => {
            let markdown = commands::convert_file(&args.file, &global.instance, args.scoped_lists)?;
            println!("{}", markdown);
        }
    }
    Ok(())
}

fn open_store(global: &Global) -> Result<ProjectStore> {
    let store = ProjectStore::open(global.project()?)?;
    debug!("Using project directory '{}'", store.root().display());
    Ok(store)
}

fn open_session(global: &Global) -> Result<(SavaneSession, ProjectStore)> {
    let store = open_store(global)?;
    let session = SavaneSession::new(&global.instance)?;
    if let Some((username, password)) = global.credentials() {
        session.login(global.project()?, username, password)?;
    }
    Ok((session, store))
}
