//! Shared constants for end-to-end tests
//!
//! When seeded test data changes, update only this file.

// ============================================================================
// Principals
// ============================================================================

/// Uploader owning every seeded recording
pub const UPLOADER_ID: i64 = 4242;

// ============================================================================
// Seeded recordings
// ============================================================================

/// Completed, with an artifact on disk
pub const MATH_TITLE: &str = "Math Class";

/// Completed, artifact path recorded but the file was removed
pub const GRAMMAR_TITLE: &str = "Arabic Grammar";

/// Still pending, no artifact
pub const HISTORY_TITLE: &str = "History Lecture";

pub const SEEDED_DATE: &str = "June 1, 2025";
pub const SEEDED_URL: &str = "https://us06web.zoom.us/rec/share/seeded";
pub const SEEDED_PASSCODE: &str = "ab12";

/// Bytes written to the math class artifact
pub const MATH_ARTIFACT_BYTES: &[u8] = b"not really an mp4 but close enough";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the test server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Build hash reported by the test server
pub const TEST_HASH: &str = "e2e-test";
