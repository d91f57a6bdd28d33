mod audio;
mod clock;
mod config;
mod db;
mod error;
mod events;
mod feedback;
mod journals;
mod profiles;
mod reminders;
mod server;
mod stats;
mod timer;
mod utils;
mod videos;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clock::{SharedClock, SystemClock};
use config::DataPaths;
use db::Database;
use events::{ensure_csv_log, EventLog};
use log::{info, warn};
use timer::TimerController;
use videos::ytdlp::YtDlp;

pub use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub(crate) db: Database,
    pub(crate) clock: SharedClock,
    pub(crate) events: EventLog,
    pub(crate) timers: TimerController,
    pub(crate) paths: Arc<DataPaths>,
    pub(crate) ytdlp: YtDlp,
    pub(crate) web_root: Option<PathBuf>,
}

impl AppState {
    pub(crate) fn new(
        db: Database,
        clock: SharedClock,
        paths: DataPaths,
        ytdlp: YtDlp,
        web_root: Option<PathBuf>,
    ) -> Self {
        let events = EventLog::new(db.clone(), paths.csv_log.clone(), clock.clone());
        let timers = TimerController::new(db.clone(), clock.clone());
        Self {
            db,
            clock,
            events,
            timers,
            paths: Arc::new(paths),
            ytdlp,
            web_root,
        }
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    utils::logging::init_logging();
    info!("Ambient companion starting up...");

    let paths = DataPaths::new(&config.data_dir);
    paths.create_dirs()?;
    ensure_csv_log(&paths.csv_log)?;

    let database = Database::new(paths.database.clone())?;
    let clock: SharedClock = Arc::new(SystemClock);
    database
        .ensure_default_profile(clock.now())
        .await
        .context("failed to seed the default profile")?;

    match std::env::current_dir() {
        Ok(project_dir) => {
            audio::init_sounds(&project_dir, &paths.uploads, &paths.sounds);
        }
        Err(err) => warn!("Skipping ambient sound setup: {err}"),
    }

    let state = AppState::new(
        database,
        clock,
        paths,
        YtDlp::new(config.ytdlp_bin.clone()),
        config.web_root.clone(),
    );
    server::serve(state, &config.host, config.port).await
}
