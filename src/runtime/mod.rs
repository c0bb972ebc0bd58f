use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::bridge::GET_SONGS;
use crate::config::Settings;
use crate::index::{FsMediaIndex, MediaIndex, SqliteMediaIndex};

mod cli;
mod host;
mod logging;
mod session;
mod settings;

pub use cli::{Cli, Command, IndexArgs, ScanArgs};
pub use session::Session;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut settings, problem) = settings::load_settings();
    logging::init(&settings.log.filter)?;
    if let Some(msg) = problem {
        warn!("{msg}");
    }

    match cli.command {
        Command::Scan(args) => run_scan(&mut settings, args),
        Command::Index(args) => run_index(&settings, args),
        Command::Config => {
            print!("{}", settings.to_toml().context("rendering settings")?);
            Ok(())
        }
    }
}

fn run_scan(settings: &mut Settings, args: ScanArgs) -> anyhow::Result<()> {
    if !args.roots.is_empty() {
        settings.index.roots = args.roots;
    }
    if args.db.is_some() {
        settings.index.database = args.db;
    }
    if let Some(level) = args.api_level {
        settings.permission.api_level = level;
    }

    let index: Arc<dyn MediaIndex> = match &settings.index.database {
        Some(db) => Arc::new(
            SqliteMediaIndex::open(db)
                .with_context(|| format!("opening media index {}", db.display()))?,
        ),
        None => Arc::new(FsMediaIndex::new(&settings.index)),
    };

    let mut session = Session::new(settings, index, args.deny, args.grant_on_request);
    info!(channel = %session.channel_name(), "dispatching {GET_SONGS}");

    for (method, result) in session.run(GET_SONGS) {
        let line = serde_json::json!({ "method": method, "result": result });
        let rendered = if args.pretty {
            serde_json::to_string_pretty(&line)?
        } else {
            serde_json::to_string(&line)?
        };
        println!("{rendered}");
    }
    Ok(())
}

fn run_index(settings: &Settings, args: IndexArgs) -> anyhow::Result<()> {
    let walker = FsMediaIndex::new(&settings.index).with_roots(args.roots);
    let rows = walker.collect_rows().context("walking index roots")?;

    let db = SqliteMediaIndex::open(&args.db)
        .with_context(|| format!("opening media index {}", args.db.display()))?;
    let written = db.ingest(&rows).context("writing media index")?;

    info!(rows = written, db = %args.db.display(), "media index written");
    Ok(())
}
