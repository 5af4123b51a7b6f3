//! Blocking HTTP gateway connection.
//!
//! Forwards each IAM request to `{base_url}{path}` and hands the numeric status and
//! raw body back untouched. Authentication is a static bearer token; session setup
//! on the device side is the gateway's business.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::config::DeviceConfig;
use crate::error::ConnectionError;
use crate::iam::{Connection, IamResponse, Method, Request};
use crate::secure::SecureString;

/// Content type of listing payloads.
const CBOR_CONTENT_TYPE: &str = "application/cbor";

/// Connection to a device exposed through an HTTP gateway.
pub struct HttpConnection {
    http_client: Client,
    base_url: String,
    token: SecureString,
}

impl HttpConnection {
    /// Create a new connection from device settings.
    pub fn new(config: &DeviceConfig) -> Result<Self, ConnectionError> {
        let base_url = Url::parse(&config.url)?;

        let http_client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(ConnectionError::Client)?;

        Ok(Self {
            http_client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, ConnectionError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }
}

/// A prepared gateway request.
pub struct HttpRequest {
    builder: RequestBuilder,
    url: Url,
}

impl Connection for HttpConnection {
    type Request = HttpRequest;

    fn create_request(&self, method: Method, path: &str) -> Result<HttpRequest, ConnectionError> {
        let url = self.url_for(path)?;
        let method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .http_client
            .request(method, url.clone())
            .header(ACCEPT, CBOR_CONTENT_TYPE);
        if !self.token.is_empty() {
            builder = builder.bearer_auth(self.token.as_str());
        }

        Ok(HttpRequest { builder, url })
    }
}

impl Request for HttpRequest {
    fn execute(self) -> Result<IamResponse, ConnectionError> {
        let response = self.builder.send()?;
        let status_code = response.status().as_u16();
        let body = response.bytes().map_err(ConnectionError::Body)?;

        debug!(
            "{} answered {} ({} bytes)",
            self.url,
            status_code,
            body.len()
        );

        let payload = (!body.is_empty()).then(|| body.to_vec());
        Ok(IamResponse::new(status_code, payload))
    }
}
