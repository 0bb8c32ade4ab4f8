//! HTTP transport shared by every sub-client.
//!
//! [`Transport`] is the single chokepoint for network calls. It owns one
//! pooled [`reqwest::Client`] bound to the configured base URL, attaches the
//! JSON content type and bearer credentials, and classifies every outcome:
//!
//! - transport failure (connect, DNS, TLS, timeout) → [`OnyxError::Network`]
//! - HTTP 404 → [`OnyxError::NotFound`] carrying the raw body
//! - any other non-2xx → [`OnyxError::Api`] carrying status and raw body
//! - 2xx → the raw [`Response`], decoded by the caller
//!
//! Request paths are given as segments. Each segment is percent-encoded on its
//! own, so an identifier can never add, drop or climb path levels.
//!
//! The pool is released when the transport is dropped.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{OnyxError, OnyxResult};
use crate::models::Validate;

/// One connection pool bound to one base URL. Not `Clone`: the pool lives
/// exactly as long as the [`OnyxClient`](crate::OnyxClient) that owns it.
///
/// ```compile_fail
/// fn assert_clone<T: Clone>() {}
/// assert_clone::<onyx_sdk::Transport>();
/// ```
#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
}

impl Transport {
    /// Build the connection pool described by `config`.
    pub fn new(config: &ClientConfig) -> OnyxResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        if config.timeout_secs == 0 {
            return Err(OnyxError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref key) = config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| OnyxError::Config(format!("invalid api key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| OnyxError::Config(format!("failed to build HTTP client: {e}")))?;

        debug!(base_url = %base_url, timeout_secs = config.timeout_secs, "onyx transport ready");

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base URL, keeping any path prefix it carries.
    ///
    /// `.` and `..` are refused; everything else is percent-encoded, `/` and
    /// `\` included.
    fn url(&self, segments: &[&str]) -> OnyxResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(OnyxError::Validation(format!(
                "'{bad}' is not a valid path segment"
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                OnyxError::Config(format!("base_url '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a GET with optional query parameters.
    pub async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> OnyxResult<Response> {
        let url = self.url(segments)?;
        let mut request = self.http.get(url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute(Method::GET, &url, request).await
    }

    /// Issue a POST with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> OnyxResult<Response> {
        let url = self.url(segments)?;
        let request = self.http.post(url.clone()).body(encode_body(body)?);
        self.execute(Method::POST, &url, request).await
    }

    /// Issue a PUT with a JSON body.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> OnyxResult<Response> {
        let url = self.url(segments)?;
        let request = self.http.put(url.clone()).body(encode_body(body)?);
        self.execute(Method::PUT, &url, request).await
    }

    /// Issue a DELETE.
    pub async fn delete(&self, segments: &[&str]) -> OnyxResult<Response> {
        let url = self.url(segments)?;
        let request = self.http.delete(url.clone());
        self.execute(Method::DELETE, &url, request).await
    }

    async fn execute(
        &self,
        method: Method,
        url: &Url,
        request: RequestBuilder,
    ) -> OnyxResult<Response> {
        let path = url.path();
        debug!(%method, path, "onyx request");

        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(err) => {
                let err = OnyxError::from(err);
                warn!(%method, path, error = %err, "onyx request failed");
                return Err(err);
            }
        };

        let status = resp.status();
        debug!(%method, path, status = status.as_u16(), "onyx response");

        if status.is_success() {
            return Ok(resp);
        }

        let message = match resp.text().await {
            Ok(body) => body,
            Err(err) => {
                let err = OnyxError::from(err);
                warn!(
                    %method,
                    path,
                    status = status.as_u16(),
                    error = %err,
                    "failed to read error body"
                );
                return Err(err);
            }
        };
        if status == StatusCode::NOT_FOUND {
            Err(OnyxError::NotFound(message))
        } else {
            Err(OnyxError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Decode a 2xx JSON body into `T` and check its invariants.
    pub async fn decode<T: DeserializeOwned + Validate>(resp: Response) -> OnyxResult<T> {
        let body = Self::text(resp).await?;
        let value: T = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(err) => {
                return Err(OnyxError::Decode {
                    message: err.to_string(),
                    body,
                })
            }
        };
        if let Err(message) = value.validate() {
            return Err(OnyxError::Decode { message, body });
        }
        Ok(value)
    }

    /// Read a 2xx body as raw text.
    pub async fn text(resp: Response) -> OnyxResult<String> {
        Ok(resp.text().await?)
    }
}

fn parse_base_url(raw: &str) -> OnyxResult<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(OnyxError::Config(format!(
            "base_url must be an http(s) URL, got '{raw}'"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> OnyxResult<Vec<u8>> {
    serde_json::to_vec(body)
        .map_err(|e| OnyxError::Validation(format!("request body could not be encoded: {e}")))
}
