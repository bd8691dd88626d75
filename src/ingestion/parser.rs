//! Share-message parsing.
//!
//! Turns the free text a user pastes from Zoom ("Share recording") into a
//! [`LinkDescriptor`]. Field detection is line based and order independent:
//!
//! ```text
//! Ammar
//! Date: May 27, 2025 05:35 AM
//! Duration: 00:59:54
//! https://us06web.zoom.us/rec/share/...
//! Passcode: 1I?N7@?L
//! ```

use chrono::Local;

/// Substring identifying a line that carries the share link.
pub const ZOOM_DOMAIN_MARKER: &str = "zoom.us";

pub const DEFAULT_TITLE: &str = "Untitled Recording";

const DATE_MARKER: &str = "Date:";
const DURATION_MARKER: &str = "Duration:";
const PASSCODE_MARKERS: [&str; 2] = ["Passcode:", "Password:"];

/// Structured fields extracted from a share message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
    pub title: String,
    pub date: String,
    pub url: String,
    pub passcode: String,
}

/// Parses a share message, defaulting the date to today (local time).
///
/// Returns `None` unless both a link line and a passcode line are present.
pub fn parse(text: &str) -> Option<LinkDescriptor> {
    let today = Local::now().format("%-m/%-d/%Y").to_string();
    parse_with_default_date(text, &today)
}

/// Same as [`parse`], with the date used when the message has no `Date:` line.
pub fn parse_with_default_date(text: &str, default_date: &str) -> Option<LinkDescriptor> {
    let mut title: Option<&str> = None;
    let mut date: Option<String> = None;
    let mut url: Option<&str> = None;
    let mut passcode: Option<&str> = None;

    for line in text.split('\n').map(str::trim) {
        if title.is_none()
            && !line.is_empty()
            && !line.contains(DATE_MARKER)
            && !line.contains(DURATION_MARKER)
            && !line.contains("http")
        {
            title = Some(line);
        }

        if line.contains(DATE_MARKER) {
            date = Some(line.replacen(DATE_MARKER, "", 1).trim().to_string());
        }

        if line.contains(ZOOM_DOMAIN_MARKER) {
            url = Some(line);
        }

        if PASSCODE_MARKERS.iter().any(|marker| line.contains(marker)) {
            passcode = line.split_once(':').map(|(_, rest)| rest.trim());
        }
    }

    let url = url.filter(|u| !u.is_empty())?;
    let passcode = passcode.filter(|p| !p.is_empty())?;

    Some(LinkDescriptor {
        title: title.unwrap_or(DEFAULT_TITLE).to_string(),
        date: date
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| default_date.to_string()),
        url: url.to_string(),
        passcode: passcode.to_string(),
    })
}
