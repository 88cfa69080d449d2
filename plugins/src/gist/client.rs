use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LINK};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use hearth_core::api::{LocalStore, RemoteConfig, RemoteStore, SecretKey, Snapshot};

use super::error::GistError;
use super::models::{Gist, GistFileWrite, GistSummary, GistWrite};

const GITHUB_JSON: &str = "application/vnd.github+json";
const DISCOVERY_PAGE_SIZE: usize = 100;
const MAX_DISCOVERY_PAGES: usize = 100;

#[derive(Debug, Clone)]
pub struct GistSettings {
    pub base_url: String,
    pub token: String,
    pub label: String,
    pub file_name: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl GistSettings {
    pub fn from_config(cfg: &RemoteConfig, token: String) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            token,
            label: cfg.label.clone(),
            file_name: cfg.file_name.clone(),
            timeout_ms: cfg.timeout_ms,
            user_agent: cfg.user_agent.clone(),
        }
    }
}

/// Snapshot stored as a single file inside a private gist.
///
/// The gist id is resolved lazily: in-memory cache, then the local secret
/// store, then discovery by description across every page of the account's
/// gists. A cached id that answers 404 is forgotten and discovery runs again.
pub struct GistRemoteStore {
    http: reqwest::Client,
    token: String,
    label: String,
    file_name: String,
    url_gists: String,
    local: Arc<dyn LocalStore>,
    document_id: Mutex<Option<String>>,
}

impl GistRemoteStore {
    pub fn new(settings: GistSettings, local: Arc<dyn LocalStore>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .user_agent(settings.user_agent)
            .default_headers(headers)
            .build()?;

        let base = settings.base_url.trim_end_matches('/');
        Ok(Self {
            http,
            token: settings.token,
            label: settings.label,
            file_name: settings.file_name,
            url_gists: format!("{}/gists", base),
            local,
            document_id: Mutex::new(None),
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    fn gist_url(&self, id: &str) -> String {
        format!("{}/{}", self.url_gists, id)
    }

    async fn send(&self, req: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, GistError> {
        self.auth(req)
            .send()
            .await
            .map_err(|err| GistError::transport(err, url))
    }

    async fn resolve_document_id(&self) -> Result<Option<String>, GistError> {
        let mut cached = self.document_id.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(Some(id.clone()));
        }

        if let Some(id) = self.local.load_secret(SecretKey::RemoteDocumentId).await {
            tracing::debug!(target: "hearth.gist", gist_id = %id, "using cached gist id");
            *cached = Some(id.clone());
            return Ok(Some(id));
        }

        let found = self.discover().await?;
        if let Some(id) = &found {
            *cached = Some(id.clone());
            self.persist_document_id(id).await;
        }
        Ok(found)
    }

    /// First gist whose description equals the label, following `Link:
    /// rel="next"` until the listing ends.
    async fn discover(&self) -> Result<Option<String>, GistError> {
        let mut next = Some(format!("{}?per_page={}", self.url_gists, DISCOVERY_PAGE_SIZE));
        let mut pages = 0;

        while let Some(url) = next.take() {
            pages += 1;
            tracing::debug!(target: "hearth.gist", stage = "gist.discover.in", url = %url, page = pages);
            let resp = self.send(self.http.get(&url), &url).await?;
            let following = next_page_link(resp.headers());
            let gists: Vec<GistSummary> = parse_json_response(resp).await?;

            let found = gists
                .into_iter()
                .find(|g| g.description.as_deref() == Some(self.label.as_str()))
                .map(|g| g.id);
            if found.is_some() {
                tracing::debug!(target: "hearth.gist", stage = "gist.discover.out", pages, found = true);
                return Ok(found);
            }

            if pages >= MAX_DISCOVERY_PAGES {
                tracing::warn!(target: "hearth.gist", pages, "stopping gist discovery at page limit");
                break;
            }
            next = following;
        }

        tracing::debug!(target: "hearth.gist", stage = "gist.discover.out", pages, found = false);
        Ok(None)
    }

    async fn remember_document_id(&self, id: &str) {
        *self.document_id.lock().await = Some(id.to_string());
        self.persist_document_id(id).await;
    }

    async fn persist_document_id(&self, id: &str) {
        if let Err(e) = self.local.save_secret(SecretKey::RemoteDocumentId, id).await {
            tracing::warn!(target: "hearth.gist", "failed to cache gist id locally: {}", e);
        }
    }

    async fn forget_document_id(&self, stale: &str) {
        tracing::warn!(target: "hearth.gist", gist_id = %stale, "cached gist no longer exists");
        *self.document_id.lock().await = None;
        if let Err(e) = self.local.clear_secret(SecretKey::RemoteDocumentId).await {
            tracing::warn!(target: "hearth.gist", "failed to clear cached gist id: {}", e);
        }
    }

    async fn fetch_gist(&self, id: &str) -> Result<Gist, GistError> {
        let url = self.gist_url(id);
        tracing::debug!(target: "hearth.gist", stage = "gist.load.in", url = %url);
        let resp = self.send(self.http.get(&url), &url).await?;
        parse_json_response(resp).await
    }

    async fn fetch_raw(&self, raw_url: &str) -> Result<String, GistError> {
        let resp = self.send(self.http.get(raw_url), raw_url).await?;
        read_success_body(resp).await
    }

    async fn update_gist(&self, id: &str, files: HashMap<&str, GistFileWrite>) -> Result<(), GistError> {
        let url = self.gist_url(id);
        let payload = GistWrite {
            description: None,
            public: None,
            files,
        };
        tracing::debug!(target: "hearth.gist", stage = "gist.update.in", url = %url);
        let resp = self.send(self.http.patch(&url).json(&payload), &url).await?;
        read_success_body(resp).await?;
        tracing::debug!(target: "hearth.gist", stage = "gist.update.out", gist_id = %id);
        Ok(())
    }

    async fn create_gist(&self, files: HashMap<&str, GistFileWrite>) -> Result<(), GistError> {
        let url = self.url_gists.clone();
        let payload = GistWrite {
            description: Some(self.label.as_str()),
            public: Some(false),
            files,
        };
        tracing::debug!(target: "hearth.gist", stage = "gist.create.in", url = %url);
        let resp = self.send(self.http.post(&url).json(&payload), &url).await?;
        let created: GistSummary = parse_json_response(resp).await?;
        tracing::info!(target: "hearth.gist", gist_id = %created.id, "created sync gist");
        self.remember_document_id(&created.id).await;
        Ok(())
    }

    fn files_payload(&self, snapshot: &Snapshot) -> anyhow::Result<HashMap<&str, GistFileWrite>> {
        let content = snapshot.to_json()?;
        Ok(HashMap::from([(self.file_name.as_str(), GistFileWrite { content })]))
    }
}

#[async_trait]
impl RemoteStore for GistRemoteStore {
    async fn load_snapshot(&self) -> Result<Option<Snapshot>, anyhow::Error> {
        let Some(id) = self.resolve_document_id().await? else {
            tracing::debug!(target: "hearth.gist", "no gist found for label {}", self.label);
            return Ok(None);
        };

        let gist = match self.fetch_gist(&id).await {
            Err(e) if e.is_not_found() => {
                self.forget_document_id(&id).await;
                let Some(id) = self.resolve_document_id().await? else {
                    return Ok(None);
                };
                self.fetch_gist(&id).await?
            }
            other => other?,
        };

        let Some(file) = gist.files.get(&self.file_name) else {
            tracing::debug!(target: "hearth.gist", gist_id = %gist.id, "gist has no {} file", self.file_name);
            return Ok(None);
        };

        let content = match (file.truncated, file.raw_url.as_deref()) {
            (true, Some(raw_url)) => self.fetch_raw(raw_url).await?,
            _ => file.content.clone().unwrap_or_default(),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot = Snapshot::from_json(&content)
            .map_err(|err| GistError::decode(self.gist_url(&gist.id), &content, err))?;
        tracing::debug!(
            target: "hearth.gist",
            stage = "gist.load.out",
            updated_at = snapshot.updated_at
        );
        Ok(Some(snapshot))
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), anyhow::Error> {
        if let Some(id) = self.resolve_document_id().await? {
            match self.update_gist(&id, self.files_payload(snapshot)?).await {
                Err(e) if e.is_not_found() => self.forget_document_id(&id).await,
                other => return Ok(other?),
            }
            if let Some(id) = self.resolve_document_id().await? {
                return Ok(self.update_gist(&id, self.files_payload(snapshot)?).await?);
            }
        }
        Ok(self.create_gist(self.files_payload(snapshot)?).await?)
    }
}

/// Target of the `rel="next"` entry in a `Link` header.
fn next_page_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| matches!(p.trim(), "rel=\"next\"" | "rel=next"));
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

async fn read_success_body(resp: reqwest::Response) -> Result<String, GistError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let headers = resp.headers().clone();
    let body = resp
        .text()
        .await
        .map_err(|err| GistError::transport(err, &url))?;

    if !status.is_success() {
        return Err(GistError::from_response(status, &headers, url, &body));
    }
    Ok(body)
}

async fn parse_json_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GistError> {
    let url = resp.url().to_string();
    let body = read_success_body(resp).await?;
    serde_json::from_str::<T>(&body).map_err(|err| GistError::decode(url, &body, err))
}
