use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures::future::try_join_all;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::creature::{Creature, CreatureId, LocalizedNames};

use super::error::{CoreError, CoreErrorCode};
use super::well_known::TYRADEX_API_BASE;

const BULK_MAX_AGE_SECS: u64 = 60 * 60;
const REFERENCE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Read access to the creature catalog.
///
/// `fetch_by_ids` issues one independent `fetch_by_id` per id, awaits all of
/// them, keeps input order and fails as a whole if any single fetch fails.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn fetch_all(&self) -> Result<Vec<Creature>, CoreError>;

    async fn fetch_by_id(&self, id: CreatureId) -> Result<Creature, CoreError>;

    async fn fetch_by_generation(&self, generation: u32) -> Result<Vec<Creature>, CoreError>;

    async fn fetch_types(&self) -> Result<Vec<String>, CoreError>;

    async fn fetch_by_ids(&self, ids: &[CreatureId]) -> Result<Vec<Creature>, CoreError> {
        try_join_all(ids.iter().map(|&id| self.fetch_by_id(id))).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    All,
    ById(CreatureId),
    ByGeneration(u32),
    Types,
}

impl RequestKind {
    pub fn path(&self) -> String {
        match *self {
            Self::All => "pokemon".to_string(),
            Self::ById(id) => format!("pokemon/{id}"),
            Self::ByGeneration(generation) => format!("gen/{generation}"),
            Self::Types => "types".to_string(),
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        match *self {
            Self::All | Self::ById(_) | Self::ByGeneration(_) => CachePolicy {
                max_age_secs: BULK_MAX_AGE_SECS,
            },
            Self::Types => CachePolicy {
                max_age_secs: REFERENCE_MAX_AGE_SECS,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_age_secs: u64,
}

impl CachePolicy {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn expires_at(&self, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
        let secs = i64::try_from(self.max_age_secs).unwrap_or(i64::MAX);
        fetched_at
            .checked_add_signed(TimeDelta::seconds(secs))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub user_agent: String,
    pub cache_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: TYRADEX_API_BASE.to_string(),
            user_agent: format!("poketeam/{}", env!("CARGO_PKG_VERSION")),
            cache_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedBody {
    body: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: Mutex<HashMap<String, CachedBody>>,
}

impl CatalogClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url_for(&self, kind: RequestKind) -> String {
        format!(
            "{}/{}",
            self.config.api_base.trim_end_matches('/'),
            kind.path()
        )
    }

    pub fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    async fn get_json<T: DeserializeOwned>(&self, kind: RequestKind) -> Result<T, CoreError> {
        let url = self.url_for(kind);
        if let Some(body) = self.cached(&url) {
            tracing::debug!(%url, "catalog cache hit");
            return decode_body(kind, &url, &body);
        }

        let body = self.send(kind, &url).await?;
        let decoded = decode_body(kind, &url, &body)?;
        self.store(kind, &url, &body);
        Ok(decoded)
    }

    async fn send(&self, kind: RequestKind, url: &str) -> Result<String, CoreError> {
        tracing::debug!(%url, "catalog request");
        let request = self.http.get(url);
        #[cfg(not(target_arch = "wasm32"))]
        let request = request.header(reqwest::header::USER_AGENT, &self.config.user_agent);

        let response = request.send().await.map_err(|e| {
            CoreError::new(CoreErrorCode::Network, format!("request to {url} failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_failure(kind, url, status.as_u16()));
        }

        response.text().await.map_err(|e| {
            CoreError::new(
                CoreErrorCode::Network,
                format!("failed to read response from {url}: {e}"),
            )
        })
    }

    fn cached(&self, url: &str) -> Option<String> {
        if !self.config.cache_enabled {
            return None;
        }
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(url)
            .filter(|entry| entry.expires_at > Utc::now())
            .map(|entry| entry.body.clone())
    }

    fn store(&self, kind: RequestKind, url: &str, body: &str) {
        if !self.config.cache_enabled {
            return;
        }
        let expires_at = kind.cache_policy().expires_at(Utc::now());
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                url.to_string(),
                CachedBody {
                    body: body.to_string(),
                    expires_at,
                },
            );
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl CatalogSource for CatalogClient {
    async fn fetch_all(&self) -> Result<Vec<Creature>, CoreError> {
        self.get_json(RequestKind::All).await
    }

    async fn fetch_by_id(&self, id: CreatureId) -> Result<Creature, CoreError> {
        self.get_json(RequestKind::ById(id)).await
    }

    async fn fetch_by_generation(&self, generation: u32) -> Result<Vec<Creature>, CoreError> {
        self.get_json(RequestKind::ByGeneration(generation)).await
    }

    async fn fetch_types(&self) -> Result<Vec<String>, CoreError> {
        let labels: Vec<TypeLabel> = self.get_json(RequestKind::Types).await?;
        Ok(labels.into_iter().filter_map(TypeLabel::into_label).collect())
    }
}

fn upstream_failure(kind: RequestKind, url: &str, status: u16) -> CoreError {
    match kind {
        RequestKind::ById(id) => CoreError::new(
            CoreErrorCode::NotFound,
            format!("creature {id} not found at {url} (HTTP {status})"),
        ),
        _ => CoreError::new(
            CoreErrorCode::Network,
            format!("upstream answered HTTP {status} for {url}"),
        ),
    }
}

// The upstream sometimes answers 200 with `{"status": 404, "message": ...}`.
fn decode_body<T: DeserializeOwned>(kind: RequestKind, url: &str, body: &str) -> Result<T, CoreError> {
    let value: JsonValue = serde_json::from_str(body).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Decode,
            format!("response from {url} is not JSON: {e}"),
        )
    })?;

    if let Some(status) = embedded_error_status(&value) {
        return Err(upstream_failure(kind, url, status));
    }

    serde_json::from_value(value).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Decode,
            format!("unexpected response shape from {url}: {e}"),
        )
    })
}

fn embedded_error_status(value: &JsonValue) -> Option<u16> {
    let object = value.as_object()?;
    if object.contains_key("pokedex_id") {
        return None;
    }
    let status = object.get("status")?.as_u64()?;
    if status >= 400 {
        u16::try_from(status).ok()
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeLabel {
    Plain(String),
    Named { name: LocalizedNames },
}

impl TypeLabel {
    fn into_label(self) -> Option<String> {
        match self {
            Self::Plain(label) => Some(label),
            Self::Named { name } => name.fr,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileCatalog {
    records: Vec<Creature>,
}

impl FileCatalog {
    pub fn load_from_path(path: &Path) -> Result<Self, CoreError> {
        let bytes = fs::read(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        let records: Vec<Creature> = serde_json::from_slice(&bytes).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Decode,
                format!("failed to parse catalog {}: {e}", path.display()),
            )
        })?;
        tracing::debug!(path = %path.display(), count = records.len(), "loaded catalog file");
        Ok(Self { records })
    }
}

impl CatalogSource for FileCatalog {
    async fn fetch_all(&self) -> Result<Vec<Creature>, CoreError> {
        Ok(self.records.clone())
    }

    async fn fetch_by_id(&self, id: CreatureId) -> Result<Creature, CoreError> {
        self.records
            .iter()
            .find(|record| record.pokedex_id == id)
            .cloned()
            .ok_or_else(|| {
                CoreError::new(
                    CoreErrorCode::NotFound,
                    format!("creature {id} not found in catalog file"),
                )
            })
    }

    async fn fetch_by_generation(&self, generation: u32) -> Result<Vec<Creature>, CoreError> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.generation == Some(generation))
            .cloned()
            .collect())
    }

    async fn fetch_types(&self) -> Result<Vec<String>, CoreError> {
        let mut labels: Vec<String> = Vec::new();
        for name in self.records.iter().flat_map(Creature::type_names) {
            if !labels.iter().any(|seen| seen == name) {
                labels.push(name.to_string());
            }
        }
        Ok(labels)
    }
}
