//! PokeAPI client.
//!
//! Stateless: every call is a single GET whose JSON body is parsed into a
//! typed shape. There is no retry and no backoff; a failed call surfaces as
//! one [`UpstreamError`] for the caller to handle locally.

pub mod types;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::UpstreamConfig;
pub use types::{
    CategoryRecord, ListPage, LocalizedName, NamedResource, PokemonRecord, SpeciesRecord,
    pick_name,
};

/// Errors from the upstream API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// Transport failure or non-2xx status.
    #[error("upstream unavailable: {url}: {message}")]
    Unavailable {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The body was not the JSON shape we expected.
    #[error("malformed upstream payload from {url}: {message}")]
    MalformedPayload { url: String, message: String },

    /// The client could not be constructed from configuration.
    #[error("invalid upstream configuration: {0}")]
    Config(String),
}

impl UpstreamError {
    /// True when the upstream answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::Unavailable { status: Some(404), .. })
    }
}

/// HTTP client for the upstream data API.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: Url,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::Config(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::Config(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| UpstreamError::Config(e.to_string()))?;

        Ok(Self { http, base })
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a URL and parse its JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        let response = self
            .http
            .get(url.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Upstream request failed");
                UpstreamError::Unavailable {
                    url: url.to_string(),
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status.as_u16(), "Upstream returned error status");
            return Err(UpstreamError::Unavailable {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Unavailable {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: e.to_string(),
            })?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Upstream payload did not parse");
            UpstreamError::MalformedPayload {
                url: url.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Listing window starting at `offset`.
    pub async fn list(&self, offset: u64, limit: u64) -> Result<ListPage, UpstreamError> {
        let mut url = self.endpoint(&["pokemon"]);
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        self.fetch_json(url).await
    }

    /// Base record.
    pub async fn pokemon(&self, id: &str) -> Result<PokemonRecord, UpstreamError> {
        self.fetch_json(self.endpoint(&["pokemon", id])).await
    }

    /// Species record carrying localized names.
    pub async fn species(&self, id: &str) -> Result<SpeciesRecord, UpstreamError> {
        self.fetch_json(self.endpoint(&["pokemon-species", id])).await
    }

    /// Category (type) record.
    pub async fn category(&self, key: &str) -> Result<CategoryRecord, UpstreamError> {
        self.fetch_json(self.endpoint(&["type", key])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            base_url: server.uri(),
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_building() {
        let client = UpstreamClient::new(&UpstreamConfig {
            base_url: "https://pokeapi.co/api/v2/".into(),
            ..UpstreamConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint(&["pokemon", "25"]).as_str(),
            "https://pokeapi.co/api/v2/pokemon/25"
        );
        assert_eq!(
            client.endpoint(&["pokemon", "a/b"]).as_str(),
            "https://pokeapi.co/api/v2/pokemon/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_invalid_base() {
        let result = UpstreamClient::new(&UpstreamConfig {
            base_url: "not a url".into(),
            ..UpstreamConfig::default()
        });
        assert!(matches!(result, Err(UpstreamError::Config(_))));
    }

    #[tokio::test]
    async fn test_list_parses_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .and(query_param("offset", "20"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1025,
                "results": [
                    { "name": "spearow", "url": "https://pokeapi.co/api/v2/pokemon/21/" },
                    { "name": "fearow", "url": "https://pokeapi.co/api/v2/pokemon/22/" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server).list(20, 2).await.unwrap();
        assert_eq!(page.count, 1025);
        let items = page.items();
        assert_eq!(items[1].id(), Some("22"));
        assert_eq!(items[1].display_key, "fearow");
    }

    #[tokio::test]
    async fn test_non_success_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/99999"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).pokemon("99999").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/type/fire"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).category("fire").await.unwrap_err();
        assert!(matches!(err, UpstreamError::MalformedPayload { .. }));
    }
}
