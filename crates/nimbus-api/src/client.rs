// REST client for the Nimbus management API
//
// Wraps `reqwest::Client` with CSRF bootstrapping, multi-tenant
// `Organization` scoping, list-envelope unwrapping, and the server's
// `{error, error_msg}` error shape. Resource-specific knowledge (paths,
// envelope keys) lives in `nimbus-core`; this module stays generic.

use std::sync::{PoisonError, RwLock};

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const CSRF_HEADER: &str = "Csrf-Token";
const ORGANIZATION_HEADER: &str = "Organization";

/// Error body returned with non-2xx responses.
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Deserialize)]
struct CsrfResponse {
    token: String,
}

/// One page of a resource listing.
///
/// `count` is the server's total across all pages, not `items.len()`.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
        }
    }
}

/// Async client for the management API.
///
/// Holds the CSRF token fetched once at startup and the organization the
/// console is currently scoped to. Both are interior-mutable so a single
/// client can be shared behind an `Arc` by every action module.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    csrf_token: RwLock<Option<String>>,
    organization: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            csrf_token: RwLock::new(None),
            organization: RwLock::new(None),
        }
    }

    /// The console base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── CSRF token management ─────────────────────────────────────────

    /// Fetch the CSRF token via `GET /csrf` and store it for later requests.
    pub async fn fetch_csrf(&self) -> Result<String, Error> {
        let url = self.url("csrf")?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let body: CsrfResponse = handle_response(resp).await?;

        self.set_csrf_token(body.token.clone());
        Ok(body.token)
    }

    pub fn set_csrf_token(&self, token: String) {
        trace!("storing CSRF token");
        *self
            .csrf_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── Organization scoping ──────────────────────────────────────────

    /// Scope subsequent requests to an organization (`None` clears it).
    pub fn set_organization(&self, organization: Option<String>) {
        debug!(organization = ?organization, "switching organization");
        *self
            .organization
            .write()
            .unwrap_or_else(PoisonError::into_inner) = organization;
    }

    pub fn organization(&self) -> Option<String> {
        self.organization
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join a relative path (e.g. `"firewall/abc"`) onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// WebSocket URL of the server-pushed event stream (`/event`).
    pub fn event_url(&self) -> Result<Url, Error> {
        let mut url = self.url("event")?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| Error::EventConnect(format!("cannot derive websocket URL from {url}")))?;
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach `Accept`, `Csrf-Token` and `Organization` headers.
    fn decorate(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut builder = builder.header(ACCEPT, "application/json");
        if let Some(token) = self.csrf_token() {
            builder = builder.header(CSRF_HEADER, token);
        }
        if let Some(org) = self.organization() {
            builder = builder.header(ORGANIZATION_HEADER, org);
        }
        builder
    }

    /// Like `decorate`, but refuses to send a mutating request without a
    /// CSRF token.
    fn decorate_mutating(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        if self.csrf_token().is_none() {
            return Err(Error::CsrfMissing);
        }
        Ok(self.decorate(builder))
    }

    /// `GET {path}` and unwrap a list envelope.
    ///
    /// Accepts both `{ "<key>": [...], "count": N }` and a bare JSON array
    /// (in which case `count` is the array length).
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        query: &[(String, String)],
    ) -> Result<Page<T>, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={query:?}");

        let resp = self.decorate(self.http.get(url)).query(query).send().await?;
        let body: serde_json::Value = handle_response(resp).await?;
        parse_page(body, key)
    }

    /// `GET {path}` and deserialize the body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={query:?}");

        let resp = self.decorate(self.http.get(url)).query(query).send().await?;
        handle_response(resp).await
    }

    /// `PUT {path}` with a JSON body.
    pub async fn put<B: Serialize + Sync + ?Sized>(&self, path: &str, body: &B) -> Result<(), Error> {
        self.put_with_query(path, &[], body).await
    }

    /// `PUT {path}` with query parameters and a JSON body.
    pub async fn put_with_query<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url} params={query:?}");

        let resp = self
            .decorate_mutating(self.http.put(url))?
            .query(query)
            .json(body)
            .send()
            .await?;
        handle_empty(resp).await
    }

    /// `PUT {path}` with no body (named operations such as `node/{id}/restart`).
    pub async fn put_empty(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.decorate_mutating(self.http.put(url))?.send().await?;
        handle_empty(resp).await
    }

    /// `POST {path}` with a JSON body.
    pub async fn post<B: Serialize + Sync + ?Sized>(&self, path: &str, body: &B) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .decorate_mutating(self.http.post(url))?
            .json(body)
            .send()
            .await?;
        handle_empty(resp).await
    }

    /// `POST {path}` with a JSON body and deserialize the response.
    pub async fn post_for<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .decorate_mutating(self.http.post(url))?
            .json(body)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// `DELETE {path}`.
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.decorate_mutating(self.http.delete(url))?.send().await?;
        handle_empty(resp).await
    }

    /// `DELETE {path}` with query parameters and a JSON body (bulk delete).
    pub async fn delete_with_body<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url} params={query:?}");

        let resp = self
            .decorate_mutating(self.http.delete(url))?
            .query(query)
            .json(body)
            .send()
            .await?;
        handle_empty(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error(status, resp).await);
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::SessionExpired;
    }

    let raw = resp.text().await.unwrap_or_default();

    let status_code = status.as_u16();
    match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(ErrorResponse {
            error,
            error_msg: Some(detail),
        }) => Error::Api {
            status: status_code,
            message: detail.clone(),
            code: error,
            detail: Some(detail),
        },
        Ok(ErrorResponse { error: Some(code), .. }) => Error::Api {
            status: status_code,
            message: code.clone(),
            code: Some(code),
            detail: None,
        },
        _ => Error::Api {
            status: status_code,
            message: status
                .canonical_reason()
                .map_or_else(|| status.to_string(), str::to_owned),
            code: None,
            detail: None,
        },
    }
}

/// Split a list response into items and total count.
pub(crate) fn parse_page<T: DeserializeOwned>(
    body: serde_json::Value,
    key: &str,
) -> Result<Page<T>, Error> {
    let (items, count) = match body {
        serde_json::Value::Array(items) => {
            let len = u64::try_from(items.len()).unwrap_or(u64::MAX);
            (items, Some(len))
        }
        serde_json::Value::Object(mut obj) => {
            let count = obj.get("count").and_then(serde_json::Value::as_u64);
            let items = match obj.remove(key) {
                Some(serde_json::Value::Array(items)) => items,
                Some(serde_json::Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(Error::Deserialization {
                        message: format!("expected array under \"{key}\""),
                        body: other.to_string(),
                    });
                }
            };
            (items, count)
        }
        serde_json::Value::Null => (Vec::new(), Some(0)),
        other => {
            return Err(Error::Deserialization {
                message: "expected list envelope or array".into(),
                body: other.to_string(),
            });
        }
    };

    let count = count.unwrap_or_else(|| u64::try_from(items.len()).unwrap_or(u64::MAX));
    let items = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;

    Ok(Page { items, count })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn parses_keyed_envelope() {
        let body = json!({"firewalls": [{"id": "a"}, {"id": "b"}], "count": 42});
        let page: Page<Item> = parse_page(body, "firewalls").unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.count, 42);
    }

    #[test]
    fn parses_bare_array() {
        let body = json!([{"id": "a"}]);
        let page: Page<Item> = parse_page(body, "organizations").unwrap();
        assert_eq!(page.items, vec![Item { id: "a".into() }]);
        assert_eq!(page.count, 1);
    }

    #[test]
    fn null_items_are_empty() {
        let body = json!({"disks": null, "count": 0});
        let page: Page<Item> = parse_page(body, "disks").unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn non_array_under_key_is_an_error() {
        let body = json!({"disks": {"id": "a"}});
        let res: Result<Page<Item>, _> = parse_page(body, "disks");
        assert!(matches!(res, Err(Error::Deserialization { .. })));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://console.example.com/admin").unwrap(),
        );
        assert_eq!(
            client.url("firewall/abc").unwrap().as_str(),
            "https://console.example.com/admin/firewall/abc"
        );
        assert_eq!(
            client.event_url().unwrap().as_str(),
            "wss://console.example.com/admin/event"
        );
    }
}
