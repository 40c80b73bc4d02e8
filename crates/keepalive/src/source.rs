//! Project list retrieval.

use crate::types::Project;
use async_trait::async_trait;
use tracing::info;

/// Default location of the projects list.
pub const DEFAULT_PROJECTS_URL: &str =
    "https://raw.githubusercontent.com/harryy2510/supabase-keep-alive/main/projects.json";

/// Errors from fetching the projects list.
///
/// All variants abort the cycle before any probing happens.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The projects endpoint answered with a non-success status.
    #[error("Failed to fetch projects: {0}")]
    Status(u16),

    /// The payload did not decode into a projects list.
    #[error("Failed to decode projects: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be completed.
    #[error("Failed to fetch projects: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Source of the current probe targets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Resolve the current list of projects. A single failed fetch
    /// aborts the cycle, there is no retry.
    async fn fetch(&self) -> Result<Vec<Project>, SourceError>;
}

/// Project source backed by an HTTP endpoint serving a JSON array.
pub struct HttpProjectSource {
    client: reqwest::Client,
    url: String,
}

impl HttpProjectSource {
    /// Create a new HTTP project source
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ProjectSource for HttpProjectSource {
    async fn fetch(&self) -> Result<Vec<Project>, SourceError> {
        info!(event = "fetch_projects", url = %self.url, "Fetching projects list");

        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let projects: Vec<Project> = serde_json::from_str(&body)?;

        info!(
            event = "projects_loaded",
            count = projects.len(),
            "Projects list loaded"
        );

        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use tokio::net::TcpListener;
    use tokio_test::assert_ok;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_parses_project_list() {
        let body = r#"[
            {"name": "a", "owner": "o", "url": "https://a.example.co", "anon_key": "k1"},
            {"name": "b", "owner": "o", "url": "https://b.example.co", "anon_key": "k2"}
        ]"#;
        let base = serve(Router::new().route("/projects.json", get(move || async move { body }))).await;

        let source =
            HttpProjectSource::new(reqwest::Client::new(), format!("{base}/projects.json"));
        let projects = assert_ok!(source.fetch().await);

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "a");
        assert_eq!(projects[1].anon_key, "k2");
    }

    #[tokio::test]
    async fn test_fetch_surfaces_status_in_message() {
        let base = serve(
            Router::new().route("/projects.json", get(|| async { StatusCode::NOT_FOUND })),
        )
        .await;

        let source =
            HttpProjectSource::new(reqwest::Client::new(), format!("{base}/projects.json"));
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, SourceError::Status(404)));
        assert_eq!(err.to_string(), "Failed to fetch projects: 404");
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_payload() {
        let base =
            serve(Router::new().route("/projects.json", get(|| async { "not json" }))).await;

        let source =
            HttpProjectSource::new(reqwest::Client::new(), format!("{base}/projects.json"));
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_classifies_transport_failure() {
        // Nothing listens on port 1
        let source = HttpProjectSource::new(reqwest::Client::new(), "http://127.0.0.1:1/p.json");
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, SourceError::Transport(_)));
    }
}
