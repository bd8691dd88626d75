//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per route. When routes change, update
//! only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn home(&self) -> Response {
        self.get("/").await
    }

    pub async fn health(&self) -> Response {
        self.get("/health").await
    }

    pub async fn list_recordings(&self, query: Option<&str>) -> Response {
        let mut request = self.client.get(format!("{}/recordings", self.base_url));
        if let Some(query) = query {
            request = request.query(&[("query", query)]);
        }
        request.send().await.expect("Request failed")
    }

    /// Takes the id as a string so tests can send malformed ids.
    pub async fn get_recording(&self, id: &str) -> Response {
        self.get(&format!("/recordings/{}", id)).await
    }

    pub async fn download(&self, id: &str) -> Response {
        self.get(&format!("/download/{}", id)).await
    }

    pub async fn file_info(&self, id: &str) -> Response {
        self.get(&format!("/file-info/{}", id)).await
    }
}
