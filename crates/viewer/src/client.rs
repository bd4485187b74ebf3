use anyhow::{Context, Result};
use extract::DocumentShape;
use graph::{GraphStats, GraphView, LabelPolicy, MissingTargets};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use store::SaveEntry;

/// Body of `GET /api/graph/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphPayload {
    pub path: String,
    pub shape: Option<DocumentShape>,
    pub graph: GraphView,
    pub stats: GraphStats,
}

/// Per-request presenter overrides. `None` keeps the server's configured default.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphRequest {
    pub shape: Option<DocumentShape>,
    pub labels: Option<LabelPolicy>,
    pub missing: Option<MissingTargets>,
}

impl GraphRequest {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(shape) = self.shape {
            pairs.push(("shape", shape.to_string()));
        }
        if let Some(labels) = self.labels {
            pairs.push(("labels", labels.to_string()));
        }
        if let Some(missing) = self.missing {
            pairs.push(("missing", missing.to_string()));
        }
        pairs
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct SavesClient {
    client: Client,
    base: Url,
}

impl SavesClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("Invalid server URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Server URL cannot carry a path: {}", base_url);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `prefix` segments followed by the `/`-separated save path, each segment percent-encoded.
    fn endpoint(&self, prefix: &[&str], path: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(prefix);
            if let Some(path) = path {
                segments.extend(path.split('/').filter(|s| !s.is_empty()));
            }
        }
        url
    }

    pub async fn list_folders(&self) -> Result<Vec<SaveEntry>> {
        let url = self.endpoint(&["api", "folders"], None);
        self.get_json(url).await
    }

    /// Files in `folder`, or every save under the root when `folder` is `None`.
    pub async fn list_files(&self, folder: Option<&str>) -> Result<Vec<SaveEntry>> {
        let mut url = self.endpoint(&["api", "saves"], None);
        if let Some(folder) = folder {
            url.query_pairs_mut().append_pair("folder", folder);
        }
        self.get_json(url).await
    }

    pub async fn latest(&self, folder: &str) -> Result<SaveEntry> {
        let url = self.endpoint(&["api", "folders", folder, "latest"], None);
        self.get_json(url).await
    }

    pub async fn fetch_document(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(&["api", "saves"], Some(path));
        self.get_json(url).await
    }

    pub async fn fetch_graph(&self, path: &str, request: GraphRequest) -> Result<GraphPayload> {
        let mut url = self.endpoint(&["api", "graph"], Some(path));
        append_query(&mut url, &request.query_pairs());
        self.get_json(url).await
    }

    pub async fn fetch_mermaid(&self, path: &str, request: GraphRequest) -> Result<String> {
        let mut url = self.endpoint(&["api", "mermaid"], Some(path));
        append_query(&mut url, &request.query_pairs());
        let response = self.send(url).await?;
        response.text().await.context("Failed to read Mermaid response")
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(url.clone()).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Unexpected response body from {}", url))
    }

    async fn send(&self, url: Url) -> Result<Response> {
        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        anyhow::bail!("{} returned {}: {}", url.path(), status.as_u16(), message)
    }
}

fn append_query(url: &mut Url, pairs: &[(&str, String)]) {
    if pairs.is_empty() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
}
