use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, Url,
};
use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, info, warn};

use crate::{build_search_request, config::ElasticConfig, SearchError};

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Product {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, serde::Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, serde::Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Debug, serde::Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Product,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityStatus {
    Connected,
    Disconnected,
    Uninitialized,
    Error(String),
}

impl Display for ConnectivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Elasticsearch ping succeeded, Elasticsearch is connected."),
            Self::Disconnected => write!(f, "Elasticsearch is not connected."),
            Self::Uninitialized => write!(f, "Elasticsearch client is not initialized."),
            Self::Error(message) => write!(f, "Error pinging Elasticsearch: {message}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Elastic {
    client: Client,
    base_url: Url,
    index: String,
}

impl Elastic {
    /// Creates a client for the configured cluster.
    ///
    /// # Errors
    ///
    /// Fails if the endpoint or API key is missing or unusable.
    pub fn new(config: &ElasticConfig) -> Result<Self, SearchError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or(SearchError::BackendUninitialized)?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(SearchError::BackendUninitialized)?;

        let base_url = Url::parse(endpoint).map_err(|err| {
            SearchError::UnexpectedBackendError(format!("Invalid endpoint {endpoint}: {err}"))
        })?;

        let mut authorization = HeaderValue::from_str(&format!("ApiKey {api_key}"))
            .map_err(|err| SearchError::UnexpectedBackendError(format!("Invalid API key: {err}")))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, authorization);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url,
            index: config.index.clone(),
        })
    }

    /// Checks whether the cluster answers a `HEAD /` request.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn ping(&self) -> Result<bool, reqwest::Error> {
        let response = self.client.head(self.base_url.clone()).send().await?;

        Ok(response.status().is_success())
    }

    /// Runs a `_search` request against the configured index.
    ///
    /// # Errors
    ///
    /// Fails if the cluster is unreachable, rejects the request, or returns an unexpected body.
    pub async fn search(&self, body: &Value) -> Result<Vec<Product>, SearchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SearchError::UnexpectedBackendError(format!(
                    "Endpoint {} cannot be used as a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(&self.index)
            .push("_search");

        debug!("Searching {url} with {body}");

        let response: SearchResponse = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.hits.hits.into_iter().map(|hit| hit.source).collect())
    }
}

/// The search backend handle, resolved once at startup.
#[derive(Debug, Clone)]
pub enum SearchBackend {
    Live(Elastic),
    Unavailable { reason: String },
}

impl SearchBackend {
    /// Connects to the configured cluster, degrading to [`SearchBackend::Unavailable`] instead of failing.
    #[must_use]
    pub fn connect(config: &ElasticConfig) -> Self {
        info!(
            "Elasticsearch endpoint: {}",
            config.endpoint.as_deref().unwrap_or("<unset>")
        );

        match Elastic::new(config) {
            Ok(elastic) => Self::Live(elastic),
            Err(err) => {
                warn!("Elasticsearch client unavailable: {err}");

                Self::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Reports whether the cluster is reachable. An unavailable backend is
    /// [`ConnectivityStatus::Uninitialized`] without touching the network.
    pub async fn check_connectivity(&self) -> ConnectivityStatus {
        let Self::Live(elastic) = self else {
            return ConnectivityStatus::Uninitialized;
        };

        match elastic.ping().await {
            Ok(true) => ConnectivityStatus::Connected,
            Ok(false) => ConnectivityStatus::Disconnected,
            Err(err) => ConnectivityStatus::Error(err.to_string()),
        }
    }

    /// Searches the product index for `query`, optionally within a date expression.
    ///
    /// # Errors
    ///
    /// Fails on a malformed query or date, an uninitialized backend, or a backend error.
    pub async fn search_products(
        &self,
        query: &str,
        date: Option<&str>,
    ) -> Result<Vec<Product>, SearchError> {
        let body = build_search_request(query, date)?;

        match self {
            Self::Live(elastic) => elastic.search(&body).await,
            Self::Unavailable { .. } => Err(SearchError::BackendUninitialized),
        }
    }
}
