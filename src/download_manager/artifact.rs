//! Output naming and artifact lookup.
//!
//! The downloader picks the extension, so the final file name is only known
//! after it exits. Files are named `<sanitized title>_<record id>.<ext>`.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9]").unwrap();
}

/// Suffixes yt-dlp leaves behind for unfinished downloads.
const PARTIAL_SUFFIXES: [&str; 2] = [".part", ".ytdl"];

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(title, "_").into_owned()
}

pub fn output_prefix(title: &str, recording_id: i64) -> String {
    format!("{}_{}", sanitize_title(title), recording_id)
}

/// `<dir>/<prefix>.%(ext)s`
pub fn output_template(downloads_dir: &Path, prefix: &str) -> PathBuf {
    downloads_dir.join(format!("{}.%(ext)s", prefix))
}

/// Finds the file the downloader produced for `prefix`.
///
/// Only `<prefix>.<anything>` matches, so `X_1` never picks up `X_12.mp4`.
/// With several candidates the first by name wins.
pub async fn find_artifact(downloads_dir: &Path, prefix: &str) -> std::io::Result<Option<PathBuf>> {
    let stem = format!("{}.", prefix);
    let mut candidates = Vec::new();

    let mut entries = tokio::fs::read_dir(downloads_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&stem) || PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        if entry.file_type().await?.is_file() {
            candidates.push(name.to_string());
        }
    }

    candidates.sort();
    Ok(candidates
        .into_iter()
        .next()
        .map(|name| downloads_dir.join(name)))
}
