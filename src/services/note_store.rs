//! Client for the note vault's local REST API.
//!
//! Covers the health check, note existence, create/append, the currently
//! open note, fuzzy search and path resolution. A client is built from the
//! current `NoteStoreSettings` for every operation so that edited settings
//! take effect immediately.
//!
//! Search is tolerant of vault plugins that only implement part of the API:
//! it walks an ordered list of [`SearchStrategy`] values and the first one
//! that yields a non-empty result wins.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::types::errors::NoteStoreError;
use crate::types::note::{FolderListing, SearchHit};
use crate::types::settings::NoteStoreSettings;

/// Trait defining note store operations.
#[async_trait]
pub trait NoteStoreTrait: Send + Sync {
    async fn ping(&self) -> Result<String, NoteStoreError>;
    async fn exists(&self, path: &str) -> bool;
    async fn create(&self, path: &str, content: &str) -> Result<(), NoteStoreError>;
    async fn append(&self, path: &str, content: &str) -> Result<(), NoteStoreError>;
    async fn active_note(&self) -> Result<String, NoteStoreError>;
    async fn search(&self, query: &str) -> Vec<String>;
    async fn resolve_path(&self, name: &str) -> String;
}

/// One tier of the search fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// `GET /search/simple/?query=`
    SimpleSearch,
    /// `GET /search/?query=`
    FullSearch,
    /// Listing of the vault root and the default folder, filtered locally.
    FolderListing,
}

impl SearchStrategy {
    /// Order in which strategies are tried.
    pub const ORDER: [SearchStrategy; 3] = [
        SearchStrategy::SimpleSearch,
        SearchStrategy::FullSearch,
        SearchStrategy::FolderListing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::SimpleSearch => "simple-search",
            SearchStrategy::FullSearch => "search",
            SearchStrategy::FolderListing => "folder-listing",
        }
    }
}

/// HTTP client for the note store.
pub struct NoteStoreClient {
    base_url: String,
    api_key: String,
    default_folder: Option<String>,
    http_client: Client,
}

impl NoteStoreClient {
    /// Builds a client from settings. Fails when no API key is configured.
    pub fn from_settings(settings: &NoteStoreSettings) -> Result<Self, NoteStoreError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| NoteStoreError::ConfigMissing("API key is not set".to_string()))?;

        let default_folder = settings
            .default_folder
            .as_deref()
            .map(|f| f.trim_matches('/'))
            .filter(|f| !f.is_empty())
            .map(str::to_string);

        Ok(Self {
            base_url: format!("{}://{}:{}", settings.protocol, settings.host, settings.port),
            api_key: api_key.to_string(),
            default_folder,
            http_client: Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn vault_url(&self, path: &str) -> String {
        format!("{}/vault/{}", self.base_url, encode_path(path))
    }

    async fn fetch_search(&self, endpoint: &str, query: &str) -> Result<Vec<String>, NoteStoreError> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, endpoint))
            .query(&[("query", query)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| NoteStoreError::NetworkFailure(e.to_string()))?;

        let response = require_success(response)?;
        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|e| NoteStoreError::UnexpectedResponse(e.to_string()))?;

        Ok(hits
            .into_iter()
            .map(|hit| hit.filename)
            .filter(|f| !f.is_empty())
            .collect())
    }

    async fn fetch_listing(&self, folder: Option<&str>) -> Result<Vec<String>, NoteStoreError> {
        let url = match folder {
            Some(folder) => format!("{}/", self.vault_url(folder)),
            None => format!("{}/vault/", self.base_url),
        };
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| NoteStoreError::NetworkFailure(e.to_string()))?;

        let response = require_success(response)?;
        let listing: FolderListing = response
            .json()
            .await
            .map_err(|e| NoteStoreError::UnexpectedResponse(e.to_string()))?;
        Ok(listing.into_names())
    }

    async fn search_listings(&self, query: &str) -> Result<Vec<String>, NoteStoreError> {
        let mut folders: Vec<Option<&str>> = vec![None];
        if let Some(folder) = self.default_folder.as_deref() {
            folders.push(Some(folder));
        }

        let mut names = Vec::new();
        let mut last_error = None;
        let mut any_succeeded = false;
        for folder in folders {
            match self.fetch_listing(folder).await {
                Ok(found) => {
                    any_succeeded = true;
                    names.extend(found);
                }
                Err(e) => {
                    debug!(folder = folder.unwrap_or("/"), error = %e, "vault listing failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !any_succeeded => Err(e),
            _ => Ok(filter_listing(names, query)),
        }
    }

    async fn run_strategy(&self, strategy: SearchStrategy, query: &str) -> Result<Vec<String>, NoteStoreError> {
        match strategy {
            SearchStrategy::SimpleSearch => self.fetch_search("/search/simple/", query).await,
            SearchStrategy::FullSearch => self.fetch_search("/search/", query).await,
            SearchStrategy::FolderListing => self.search_listings(query).await,
        }
    }

    /// Candidate paths for a typed note name, in lookup order.
    pub fn path_candidates(&self, name: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        push_with_extension(&mut candidates, name);
        if let Some(folder) = self.default_folder.as_deref() {
            let joined = format!("{}/{}", folder, name.trim_start_matches('/'));
            push_with_extension(&mut candidates, &joined);
        }
        candidates
    }
}

#[async_trait]
impl NoteStoreTrait for NoteStoreClient {
    async fn ping(&self) -> Result<String, NoteStoreError> {
        let response = self
            .http_client
            .get(format!("{}/", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| NoteStoreError::NetworkFailure(e.to_string()))?;

        let response = require_success(response)?;
        response
            .text()
            .await
            .map_err(|e| NoteStoreError::NetworkFailure(e.to_string()))
    }

    async fn exists(&self, path: &str) -> bool {
        let result = self
            .http_client
            .head(self.vault_url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match result {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(path, error = %e, "existence check failed");
                false
            }
        }
    }

    async fn create(&self, path: &str, content: &str) -> Result<(), NoteStoreError> {
        let response = self
            .http_client
            .put(self.vault_url(path))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "text/markdown")
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| NoteStoreError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NoteStoreError::CreateFailed(format!("{} {}", status.as_u16(), body).trim().to_string()));
        }
        info!(path, "note created");
        Ok(())
    }

    async fn append(&self, path: &str, content: &str) -> Result<(), NoteStoreError> {
        let response = self
            .http_client
            .post(self.vault_url(path))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "text/markdown")
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| NoteStoreError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(NoteStoreError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NoteStoreError::AppendFailed(format!("{} {}", status.as_u16(), body).trim().to_string()));
        }
        debug!(path, bytes = content.len(), "appended to note");
        Ok(())
    }

    async fn active_note(&self) -> Result<String, NoteStoreError> {
        let response = self
            .http_client
            .get(format!("{}/active/", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| NoteStoreError::NetworkFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NoteStoreError::NoActiveNote(format!(
                "Status: {} (is a note open?)",
                response.status().as_u16()
            )));
        }

        let base = Url::parse(&self.base_url).map_err(|e| NoteStoreError::ConfigMissing(e.to_string()))?;
        vault_path_from_url(&base, response.url())
            .ok_or_else(|| NoteStoreError::NoActiveNote(response.url().to_string()))
    }

    async fn search(&self, query: &str) -> Vec<String> {
        for strategy in SearchStrategy::ORDER {
            match self.run_strategy(strategy, query).await {
                Ok(results) if !results.is_empty() => {
                    debug!(strategy = strategy.name(), count = results.len(), "search hit");
                    return results;
                }
                Ok(_) => debug!(strategy = strategy.name(), "search returned nothing"),
                Err(e) => warn!(strategy = strategy.name(), error = %e, "search strategy failed"),
            }
        }
        Vec::new()
    }

    async fn resolve_path(&self, name: &str) -> String {
        for candidate in self.path_candidates(name) {
            if self.exists(&candidate).await {
                info!(input = name, resolved = %candidate, "resolved note by existence");
                return candidate;
            }
        }

        let base_name = basename_without_extension(name);
        let results = self.search(base_name).await;
        if let Some(best) = pick_search_result(&results, base_name) {
            info!(input = name, resolved = %best, "resolved note by search");
            return best;
        }

        debug!(input = name, "note could not be resolved");
        name.to_string()
    }
}

fn require_success(response: Response) -> Result<Response, NoteStoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(NoteStoreError::UnexpectedResponse(format!(
            "Status: {}",
            response.status().as_u16()
        )))
    }
}

/// Percent-encodes each path segment, keeping `/` separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn has_md_extension(name: &str) -> bool {
    name.len() >= 3
        && name.is_char_boundary(name.len() - 3)
        && name[name.len() - 3..].eq_ignore_ascii_case(".md")
}

fn push_with_extension(candidates: &mut Vec<String>, name: &str) {
    candidates.push(name.to_string());
    if !has_md_extension(name) {
        candidates.push(format!("{}.md", name));
    }
}

/// Last path segment with a trailing `.md` (any case) removed.
pub fn basename_without_extension(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    if has_md_extension(base) {
        &base[..base.len() - 3]
    } else {
        base
    }
}

/// Prefers an exact `basename.md` match, then the first result.
pub fn pick_search_result(results: &[String], base_name: &str) -> Option<String> {
    let target = format!("{}.md", base_name);
    let suffix = format!("/{}", target);
    results
        .iter()
        .find(|r| *r == &target || r.ends_with(&suffix))
        .or_else(|| results.first())
        .cloned()
}

/// Case-insensitive substring filter, deduplicated in first-seen order.
pub fn filter_listing(names: Vec<String>, query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Extracts the decoded vault path from a URL under `{base}/vault/`.
pub fn vault_path_from_url(base: &Url, url: &Url) -> Option<String> {
    if base.origin() != url.origin() {
        return None;
    }
    let raw = url.path().strip_prefix("/vault/")?;
    if raw.is_empty() {
        return None;
    }
    urlencoding::decode(raw).ok().map(|decoded| decoded.into_owned())
}
