//! Video search, download and the on-disk library.
//!
//! Downloads land in the videos directory: single videos at the top level and
//! playlists in one subdirectory each. Watched flags live in the database and
//! are keyed by the path relative to the videos directory.

pub mod commands;
pub mod ytdlp;

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi"];
const DESCRIPTION_CHARS: usize = 200;

/// One `yt-dlp` search hit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub url: String,
    pub duration: Value,
    pub channel: String,
    pub thumbnail: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoFile {
    pub name: String,
    pub filename: String,
    pub size: u64,
    pub path: String,
    pub watched: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlaylistDir {
    pub name: String,
    pub video_count: usize,
    pub videos: Vec<VideoFile>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Library {
    pub videos: Vec<VideoFile>,
    pub playlists: Vec<PlaylistDir>,
}

/// Maps the requested quality to a `yt-dlp` format selector.
pub fn format_for_quality(quality: &str) -> Option<String> {
    match quality {
        "best" => Some("bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string()),
        "audio" => Some("bestaudio[ext=m4a]/bestaudio/best".to_string()),
        height if !height.is_empty() && height.chars().all(|c| c.is_ascii_digit()) => Some(format!(
            "bestvideo[height<={height}][ext=mp4]+bestaudio[ext=m4a]/best[height<={height}][ext=mp4]/best"
        )),
        _ => None,
    }
}

/// Directory-safe playlist name.
pub fn sanitize_playlist_name(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim().to_string();
    if sanitized.is_empty() {
        "playlist".to_string()
    } else {
        sanitized
    }
}

fn str_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Parses the newline-delimited JSON `yt-dlp --dump-json` prints. Lines that
/// are not JSON objects are skipped.
pub fn parse_search_output(stdout: &str) -> Vec<SearchHit> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(Value::is_object)
        .map(|data| {
            let id = str_field(&data, "id").unwrap_or_default().to_string();
            let url = str_field(&data, "url")
                .map(str::to_string)
                .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={id}"));
            SearchHit {
                title: str_field(&data, "title").unwrap_or_default().to_string(),
                url,
                duration: data.get("duration").cloned().unwrap_or(Value::Null),
                channel: str_field(&data, "channel")
                    .or_else(|| str_field(&data, "uploader"))
                    .unwrap_or_default()
                    .to_string(),
                thumbnail: str_field(&data, "thumbnail").unwrap_or_default().to_string(),
                description: str_field(&data, "description")
                    .unwrap_or_default()
                    .chars()
                    .take(DESCRIPTION_CHARS)
                    .collect(),
                id,
            }
        })
        .collect()
}

/// Playlist title from the first entry of a flat playlist dump.
pub fn playlist_title(stdout: &str) -> String {
    stdout
        .lines()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| serde_json::from_str::<Value>(line).ok())
        .and_then(|data| {
            str_field(&data, "playlist_title")
                .or_else(|| str_field(&data, "playlist"))
                .map(str::to_string)
        })
        .unwrap_or_else(|| "playlist".to_string())
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn video_files(
    dir: &Path,
    prefix: Option<&str>,
    watched: &HashMap<String, bool>,
) -> Result<Vec<VideoFile>> {
    let mut videos = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if !metadata.is_file() || !is_video(&path) {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.clone());
        let relative = match prefix {
            Some(prefix) => format!("{prefix}/{filename}"),
            None => filename.clone(),
        };
        videos.push(VideoFile {
            name,
            watched: watched.get(&relative).copied().unwrap_or(false),
            size: metadata.len(),
            path: relative,
            filename,
        });
    }
    videos.sort_by_key(|video| video.name.to_lowercase());
    Ok(videos)
}

/// Walks the videos directory one level deep. Playlist directories without
/// any video are left out.
pub fn scan_library(videos_dir: &Path, watched: &HashMap<String, bool>) -> Result<Library> {
    if !videos_dir.is_dir() {
        return Ok(Library::default());
    }

    let videos = video_files(videos_dir, None, watched)?;
    let mut playlists = Vec::new();
    for entry in fs::read_dir(videos_dir)
        .with_context(|| format!("failed to read {}", videos_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let videos = video_files(&entry.path(), Some(&name), watched)?;
        if videos.is_empty() {
            continue;
        }
        playlists.push(PlaylistDir {
            name,
            video_count: videos.len(),
            videos,
        });
    }
    playlists.sort_by_key(|playlist| playlist.name.to_lowercase());

    Ok(Library { videos, playlists })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_selectors() {
        assert_eq!(
            format_for_quality("best").as_deref(),
            Some("bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best")
        );
        assert_eq!(
            format_for_quality("audio").as_deref(),
            Some("bestaudio[ext=m4a]/bestaudio/best")
        );
        assert_eq!(
            format_for_quality("720").as_deref(),
            Some("bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720][ext=mp4]/best")
        );
        assert_eq!(format_for_quality("hd"), None);
        assert_eq!(format_for_quality(""), None);
        assert_eq!(format_for_quality("72a"), None);
    }

    #[test]
    fn playlist_names_are_directory_safe() {
        assert_eq!(sanitize_playlist_name("Lo-fi / Beats: 2024"), "Lo-fi _ Beats_ 2024");
        assert_eq!(sanitize_playlist_name("../etc"), "___etc");
        assert_eq!(sanitize_playlist_name("   "), "playlist");
        assert_eq!(sanitize_playlist_name("Études_1"), "Études_1");
    }

    #[test]
    fn search_lines_map_to_hits() {
        let long = "x".repeat(300);
        let stdout = format!(
            "{}\nnot json\n{}\n\n",
            serde_json::json!({
                "id": "abc",
                "title": "Rain sounds",
                "duration": 3600.0,
                "uploader": "Nature",
                "description": long,
            }),
            serde_json::json!({
                "id": "def",
                "title": "Focus",
                "url": "https://example.com/v/def",
                "channel": "Study",
                "thumbnail": "https://example.com/t.jpg",
            }),
        );

        let hits = parse_search_output(&stdout);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(hits[0].channel, "Nature");
        assert_eq!(hits[0].description.chars().count(), 200);
        assert_eq!(hits[0].duration, serde_json::json!(3600.0));
        assert_eq!(hits[1].url, "https://example.com/v/def");
        assert_eq!(hits[1].channel, "Study");
        assert_eq!(hits[1].duration, Value::Null);
    }

    #[test]
    fn playlist_title_fallbacks() {
        assert_eq!(playlist_title("{\"playlist_title\":\"Deep Work\"}\n{}"), "Deep Work");
        assert_eq!(playlist_title("{\"playlist\":\"Mix\"}"), "Mix");
        assert_eq!(playlist_title("{\"id\":\"x\"}"), "playlist");
        assert_eq!(playlist_title(""), "playlist");
    }

    #[test]
    fn library_scan_groups_playlists_and_marks_watched() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("b clip.mp4"), b"1234").unwrap();
        fs::write(root.join("A talk.webm"), b"12").unwrap();
        fs::write(root.join("notes.txt"), b"skip").unwrap();
        fs::create_dir(root.join("Mix")).unwrap();
        fs::write(root.join("Mix/one.mkv"), b"1").unwrap();
        fs::write(root.join("Mix/two.avi"), b"1").unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        let mut watched = HashMap::new();
        watched.insert("Mix/two.avi".to_string(), true);
        watched.insert("b clip.mp4".to_string(), false);

        let library = scan_library(root, &watched).unwrap();
        let names: Vec<_> = library.videos.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["A talk", "b clip"]);
        assert_eq!(library.videos[1].size, 4);
        assert!(!library.videos[1].watched);

        assert_eq!(library.playlists.len(), 1);
        let mix = &library.playlists[0];
        assert_eq!(mix.name, "Mix");
        assert_eq!(mix.video_count, 2);
        assert_eq!(mix.videos[1].path, "Mix/two.avi");
        assert!(mix.videos[1].watched);
        assert!(!mix.videos[0].watched);
    }

    #[test]
    fn missing_library_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = scan_library(&dir.path().join("nope"), &HashMap::new()).unwrap();
        assert_eq!(library, Library::default());
    }
}
