// HTTP transport implementation backed by reqwest
use crate::application::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use crate::domain::request::Method;
use crate::domain::urls;
use async_trait::async_trait;
use std::time::Duration;
use url::{ParseError, Url};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for `url`, relative ones resolved against the base URL.
    /// A leading `/` stays below the base path. The fragment never goes
    /// over the wire.
    fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        let invalid = |e: ParseError| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let mut resolved = match Url::parse(url) {
            Ok(absolute) => absolute,
            Err(ParseError::RelativeUrlWithoutBase) if url.starts_with('/') => {
                Url::parse(&urls::join(&self.base_url, url)).map_err(invalid)?
            }
            Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("{}/", self.base_url))
                .and_then(|base| base.join(url))
                .map_err(invalid)?,
            Err(e) => return Err(invalid(e)),
        };
        resolved.set_fragment(None);
        Ok(resolved)
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = self.resolve(&request.url)?;
        tracing::debug!("{} {}", request.method.as_str(), url);

        let mut builder = self.client.request(reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = request.payload.as_ref().filter(|p| !p.is_empty()) {
            builder = match request.method {
                Method::Get => builder.query(payload.fields()),
                _ => builder.form(payload.fields()),
            };
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(TransportResponse { status, headers, body })
    }
}
