//! Runs the yt-dlp downloader against a stand-in shell script.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zoom_archive_server::download_manager::{
    find_artifact, output_prefix, output_template, DownloadError, DownloadRequest,
    RecordingDownloader, YtDlpDownloader,
};

/// Accepts only passcode `ab12`, then writes an mp4 where `-o` points.
const FAKE_YT_DLP: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --video-password) pass="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) url="$1"; shift ;;
  esac
done
if [ "$pass" != "ab12" ]; then
  echo "ERROR: [zoom] $url: Wrong passcode" >&2
  exit 1
fi
target=$(printf '%s' "$out" | sed 's/%(ext)s/mp4/')
printf 'fake video' > "$target"
"#;

fn install_fake(dir: &Path) -> PathBuf {
    let path = dir.join("yt-dlp");
    std::fs::write(&path, FAKE_YT_DLP).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}

fn request(dir: &Path, passcode: &str) -> DownloadRequest {
    DownloadRequest {
        url: "https://zoom.us/rec/share/xyz".to_string(),
        passcode: passcode.to_string(),
        output_template: output_template(dir, &output_prefix("Math Class", 7)),
    }
}

// One test so the script is never rewritten while another test executes it.
#[tokio::test]
async fn test_fake_yt_dlp_round() {
    let bin = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    let downloader = YtDlpDownloader::new(install_fake(bin.path()));

    let result = downloader
        .download(&request(downloads.path(), "wrong"))
        .await;
    match result {
        Err(DownloadError::NonZeroExit { stderr, .. }) => {
            assert!(stderr.contains("Wrong passcode"), "stderr: {}", stderr);
        }
        other => panic!("expected a non-zero exit, got {:?}", other),
    }
    assert_eq!(
        find_artifact(downloads.path(), "Math_Class_7").await.unwrap(),
        None
    );

    downloader
        .download(&request(downloads.path(), "ab12"))
        .await
        .unwrap();
    let artifact = find_artifact(downloads.path(), "Math_Class_7")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(artifact, downloads.path().join("Math_Class_7.mp4"));
    assert_eq!(std::fs::read(&artifact).unwrap(), b"fake video");
}
