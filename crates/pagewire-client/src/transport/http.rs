//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use url::Url;

use pagewire_core::error::{PageWireError, Result};
use pagewire_core::protocol::{InteractionRequest, Method, RawReply};

use super::Transport;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(base: Url) -> Result<Self> {
        // Servers branch on this header to answer with an envelope instead of a page.
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PageWireError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: &InteractionRequest) -> Result<RawReply> {
        let url = req.url(&self.base)?;

        let builder = match req.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(req.payload.encode()),
            Method::Multipart => {
                return Err(PageWireError::Internal(
                    "multipart requests are submitted by the page, not the transport".into(),
                ))
            }
        };

        tracing::debug!(method = req.method.as_str(), %url, "sending request");

        let resp = builder
            .send()
            .await
            .map_err(|e| PageWireError::Transport(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PageWireError::Transport(format!("{url}: http status {status}")));
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));

        if is_json {
            // A JSON content type with an unparseable body is a protocol failure.
            let body = resp
                .text()
                .await
                .map_err(|e| PageWireError::Transport(format!("{url}: read body failed: {e}")))?;
            let value = serde_json::from_str(&body)
                .map_err(|e| PageWireError::Protocol(format!("invalid json body: {e}")))?;
            Ok(RawReply::Json(value))
        } else {
            let body = resp
                .text()
                .await
                .map_err(|e| PageWireError::Transport(format!("{url}: read body failed: {e}")))?;
            Ok(RawReply::Text(body))
        }
    }
}
