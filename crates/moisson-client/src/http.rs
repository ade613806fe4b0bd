//! Async HTTP client wrapping the retrieval service's JSON API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use moisson_core::{
  event::ReferenceEvent,
  reference::Reference,
  retrieval::{Retrieval, RetrievalRequest},
};

use crate::api::{HarvestApi, RetrievalHandle};

/// Connection settings for the retrieval service API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("http request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("{method} {url} returned {status}")]
  Status {
    method: &'static str,
    url:    String,
    status: StatusCode,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Async HTTP client for the retrieval service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpApi {
  client: Client,
  config: ApiConfig,
}

impl HttpApi {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn get_json<T: serde::de::DeserializeOwned>(
    &self,
    url: String,
  ) -> Result<T> {
    let resp = self.client.get(&url).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        method: "GET",
        url,
        status: resp.status(),
      });
    }
    Ok(resp.json().await?)
  }
}

impl HarvestApi for HttpApi {
  type Error = Error;

  /// `POST /references/retrieval`
  async fn submit(
    &self,
    request: &RetrievalRequest,
  ) -> Result<RetrievalHandle> {
    let url = self.url("/references/retrieval");
    let resp = self.client.post(&url).json(request).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        method: "POST",
        url,
        status: resp.status(),
      });
    }
    Ok(resp.json().await?)
  }

  /// `GET <retrieval_url>` — the handle carries an absolute URL.
  async fn harvesting_state(
    &self,
    handle: &RetrievalHandle,
  ) -> Result<Retrieval> {
    self.get_json(handle.retrieval_url.clone()).await
  }

  /// `GET /reference_events/{id}`
  async fn reference_event(&self, id: i64) -> Result<ReferenceEvent> {
    self.get_json(self.url(&format!("/reference_events/{id}"))).await
  }

  /// `GET /references/by_id_and_version?...` — 404 means "no such version".
  async fn reference_by_version(
    &self,
    harvester: &str,
    source_identifier: &str,
    version: i64,
  ) -> Result<Option<Reference>> {
    let url = self.url("/references/by_id_and_version");
    let version = version.to_string();
    let resp = self
      .client
      .get(&url)
      .query(&[
        ("harvester", harvester),
        ("source_identifier", source_identifier),
        ("version", version.as_str()),
      ])
      .send()
      .await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(Error::Status {
        method: "GET",
        url,
        status: resp.status(),
      });
    }
    Ok(Some(resp.json().await?))
  }

  /// `GET /retrievals/{id}`
  async fn retrieval(&self, id: i64) -> Result<Retrieval> {
    self.get_json(self.url(&format!("/retrievals/{id}"))).await
  }
}
