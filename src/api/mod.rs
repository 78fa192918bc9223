//! REST client for the blog backend.
//!
//! `Client` builds authenticated requests and funnels every response through
//! `interpret_response`, which maps HTTP and envelope errors to `ApiError`.
//! Resource endpoints live in the submodules as `impl Client` blocks.

mod announcements;
mod articles;
mod columns;
pub mod list;
pub mod model;
mod notes;
mod taxonomy;
mod users;

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use list::Page;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("not logged in or session expired (run `blogdesk login`)")]
    Unauthorized,

    #[error("{message}")]
    Backend { code: i64, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request, attaching the bearer token when logged in.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.http.request(method, self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    fn send(&self, req: RequestBuilder) -> Result<Value, ApiError> {
        let req = req.build()?;
        log::debug!("{} {}", req.method(), req.url());
        let resp = self.http.execute(req)?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        log::debug!("-> HTTP {} ({} bytes)", status, body.len());
        interpret_response(status, &body)
    }

    pub(crate) fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        list::decode_one(self.send(self.request(Method::GET, path))?)
    }

    pub(crate) fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Page<T>, ApiError> {
        list::decode_list(self.send(self.request(Method::GET, path))?)
    }

    pub(crate) fn get_list_query<T, Q>(&self, path: &str, query: &Q) -> Result<Page<T>, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        list::decode_list(self.send(self.request(Method::GET, path).query(query))?)
    }

    pub(crate) fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        list::decode_one(self.send(self.request(Method::POST, path).json(body))?)
    }

    pub(crate) fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        list::decode_one(self.send(self.request(Method::PUT, path).json(body))?)
    }

    /// Send a request whose response body is ignored (plain-text acks, empty bodies).
    pub(crate) fn execute(&self, req: RequestBuilder) -> Result<(), ApiError> {
        self.send(req).map(|_| ())
    }

    pub(crate) fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, path))
    }
}

/// Map an HTTP status and body to a JSON value or an error.
///
/// Non-JSON success bodies (plain-text acknowledgements) become a JSON string.
pub fn interpret_response(status: u16, body: &str) -> Result<Value, ApiError> {
    let parsed: Option<Value> = if body.trim().is_empty() {
        Some(Value::Null)
    } else {
        serde_json::from_str(body).ok()
    };

    if status == 401 {
        return Err(ApiError::Unauthorized);
    }

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(ApiError::Status { status, message });
    }

    let value = parsed.unwrap_or_else(|| Value::String(body.to_string()));
    list::unwrap_envelope(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(token: Option<&str>) -> Client {
        Client::new(
            "http://blog.test/api/",
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_url_joining() {
        let c = client(None);
        assert_eq!(c.base_url(), "http://blog.test/api");
        let req = c.request(Method::GET, "/articles/3").build().unwrap();
        assert_eq!(req.url().as_str(), "http://blog.test/api/articles/3");
    }

    #[test]
    fn test_bearer_token_attached() {
        let req = client(Some("abc")).request(Method::GET, "users/me").build().unwrap();
        assert_eq!(
            req.headers().get("authorization").unwrap().to_str().unwrap(),
            "Bearer abc"
        );

        let req = client(None).request(Method::GET, "users/me").build().unwrap();
        assert!(req.headers().get("authorization").is_none());
    }

    #[test]
    fn test_success_json() {
        let value = interpret_response(200, r#"{"id": 1}"#).unwrap();
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn test_success_plain_text_and_empty() {
        assert_eq!(
            interpret_response(200, "Password updated successfully").unwrap(),
            json!("Password updated successfully")
        );
        assert_eq!(interpret_response(204, "").unwrap(), Value::Null);
    }

    #[test]
    fn test_unauthorized_status() {
        assert!(matches!(
            interpret_response(401, ""),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_error_message_from_body() {
        match interpret_response(400, r#"{"error": "title required"}"#) {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "title required");
            }
            other => panic!("unexpected {:?}", other),
        }
        match interpret_response(403, r#"{"message": "forbidden"}"#) {
            Err(ApiError::Status { message, .. }) => assert_eq!(message, "forbidden"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        match interpret_response(404, "<html>") {
            Err(ApiError::Status { message, .. }) => assert_eq!(message, "Not Found"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_envelope_error_on_200() {
        assert!(matches!(
            interpret_response(200, r#"{"code": 500, "message": "db down"}"#),
            Err(ApiError::Backend { .. })
        ));
    }
}
