//! Uploaded audio and the ambient sound catalog.

pub mod commands;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

pub const ALLOWED_MIME: [&str; 8] = [
    "audio/mpeg",
    "audio/mp4",
    "audio/x-m4a",
    "audio/aac",
    "audio/wav",
    "audio/x-wav",
    "audio/ogg",
    "audio/webm",
];

pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

pub const SOUND_EXTENSIONS: [&str; 5] = ["mp3", "wav", "ogg", "webm", "m4a"];

const KNOWN_SOUNDS: [&str; 8] = [
    "coffee",
    "coffee-shop",
    "rain",
    "rainfall",
    "forest",
    "forest-ambience",
    "white",
    "white-noise",
];

const MAX_EXTENSION_CHARS: usize = 10;

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME.contains(&mime)
}

fn has_sound_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOUND_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// `aud_<timestamp>_<8 hex><.ext>`, keeping at most ten characters of the
/// lowercased extension (dot included).
pub fn stored_upload_name(original_name: &str, now: DateTime<Utc>, nonce: u32) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            format!(".{}", ext.to_lowercase())
                .chars()
                .take(MAX_EXTENSION_CHARS)
                .collect::<String>()
        })
        .unwrap_or_default();
    format!("aud_{}_{nonce:08x}{extension}", now.format("%Y%m%d%H%M%S"))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AmbientSound {
    pub name: String,
    pub filename: String,
    pub url: String,
    pub size: u64,
}

/// Audio files directly inside `sounds_dir`, sorted by stem.
pub fn list_sounds(sounds_dir: &Path) -> Result<Vec<AmbientSound>> {
    let mut sounds = Vec::new();
    let entries = fs::read_dir(sounds_dir)
        .with_context(|| format!("failed to read {}", sounds_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if !metadata.is_file() || !has_sound_extension(&path) {
            continue;
        }
        let (Some(stem), Some(filename)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.file_name().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        sounds.push(AmbientSound {
            name: stem.to_string(),
            filename: filename.to_string(),
            url: format!("/ambient/{filename}"),
            size: metadata.len(),
        });
    }
    sounds.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sounds)
}

fn move_if_absent(source: &Path, sounds_dir: &Path) -> Option<PathBuf> {
    let dest = sounds_dir.join(source.file_name()?);
    if dest.exists() {
        return None;
    }
    match fs::rename(source, &dest) {
        Ok(()) => Some(dest),
        Err(err) => {
            warn!("Failed to move {} into sounds: {err}", source.display());
            None
        }
    }
}

/// Moves known ambient tracks lying in `project_dir` or `uploads_dir` into
/// `sounds_dir`. Returns the files that were moved.
pub fn init_sounds(project_dir: &Path, uploads_dir: &Path, sounds_dir: &Path) -> Vec<PathBuf> {
    let mut moved = Vec::new();

    for base in KNOWN_SOUNDS {
        for ext in SOUND_EXTENSIONS {
            let candidate = project_dir.join(format!("{base}.{ext}"));
            if candidate.is_file() {
                moved.extend(move_if_absent(&candidate, sounds_dir));
            }
        }
    }

    match fs::read_dir(uploads_dir) {
        Ok(entries) => {
            for path in entries.flatten().map(|entry| entry.path()) {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_lowercase)
                    .unwrap_or_default();
                if path.is_file() && KNOWN_SOUNDS.iter().any(|known| stem.contains(known)) {
                    moved.extend(move_if_absent(&path, sounds_dir));
                }
            }
        }
        Err(err) => warn!("Failed to scan {}: {err}", uploads_dir.display()),
    }

    if !moved.is_empty() {
        info!("Moved {} ambient sound(s) into {}", moved.len(), sounds_dir.display());
    }
    moved
}
