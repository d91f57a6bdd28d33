use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Study companion backend: timers, reminders, journals and a local video library"
)]
pub struct Config {
    /// Directory holding the database, CSV log, uploads, sounds and videos
    #[arg(long, env = "AC_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    #[arg(long, env = "AC_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// yt-dlp executable used by the video endpoints
    #[arg(long, env = "AC_YTDLP_BIN", default_value = "yt-dlp")]
    pub ytdlp_bin: String,

    /// Static files served for any path no route matches
    #[arg(long, env = "AC_WEB_ROOT")]
    pub web_root: Option<PathBuf>,
}

/// Locations inside the data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
    pub uploads: PathBuf,
    pub videos: PathBuf,
    pub sounds: PathBuf,
    pub database: PathBuf,
    pub csv_log: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            uploads: root.join("uploads"),
            videos: root.join("videos"),
            sounds: root.join("sounds"),
            database: root.join("ac.db"),
            csv_log: root.join("logs.csv"),
            root,
        }
    }

    pub fn create_dirs(&self) -> Result<()> {
        for dir in [&self.root, &self.uploads, &self.videos, &self.sounds] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}
