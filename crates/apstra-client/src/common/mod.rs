//! Common utilities for Apstra API client
//!
//! Provides the authenticated HTTP wrapper shared by every API call and by
//! the background task monitor.

pub mod query;
mod tasks;

use crate::config::ClientConfig;
use crate::error::ApstraError;
use crate::models::{LoginRequest, LoginResponse, ObjectId};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Login endpoint
pub const API_URL_USER_LOGIN: &str = "/api/user/login";
/// Logout endpoint
pub const API_URL_USER_LOGOUT: &str = "/api/user/logout";

const AUTH_HEADER: &str = "AuthToken";
const ERR_RESPONSE_LIMIT: usize = 4096;
const DECODE_ERR_PREVIEW: usize = 500;
// Scheme alias requesting https without certificate validation
const SCHEME_HTTPS_UNSAFE: &str = "hxxps://";

#[derive(Debug, Clone)]
struct Session {
    token: String,
    user_id: ObjectId,
}

/// HTTP client wrapper with authentication
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    user: String,
    pass: String,
    session: RwLock<Option<Session>>,
}

impl HttpClient {
    /// Build the wrapper from client configuration
    pub fn new(cfg: &ClientConfig) -> Result<Self, ApstraError> {
        let (base_url, insecure) = match cfg.url.strip_prefix(SCHEME_HTTPS_UNSAFE) {
            Some(rest) => (format!("https://{}", rest), true),
            None => (cfg.url.clone(), false),
        };

        let client = Client::builder()
            .timeout(cfg.effective_timeout())
            .danger_accept_invalid_certs(insecure)
            .build()?;

        Ok(Self::with_client(client, base_url, cfg.user.clone(), cfg.pass.clone()))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, base_url: String, user: String, pass: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
            pass,
            session: RwLock::new(None),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Build query string from filters
    pub fn build_query_string(&self, filters: &[(&str, &str)]) -> String {
        filters
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Apstra user id of the current session, if logged in
    pub async fn user_id(&self) -> Option<ObjectId> {
        self.session.read().await.as_ref().map(|s| s.user_id.clone())
    }

    /// True when an auth token is held
    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Submit credentials and store the returned auth token
    pub async fn login(&self) -> Result<(), ApstraError> {
        let body = serde_json::to_value(LoginRequest {
            username: self.user.clone(),
            password: self.pass.clone(),
        })?;

        // sent directly; a 401 here is a credential failure, never a relogin
        let raw = self.send_once(Method::POST, API_URL_USER_LOGIN, &[], Some(&body)).await?;
        let text = self.read_response(API_URL_USER_LOGIN, raw).await?;
        let response: LoginResponse = decode(API_URL_USER_LOGIN, &text)?;

        info!(user = %self.user, user_id = %response.id, "Logged in to Apstra");
        *self.session.write().await = Some(Session {
            token: response.token,
            user_id: response.id,
        });
        Ok(())
    }

    /// Invalidate the held auth token
    pub async fn logout(&self) -> Result<(), ApstraError> {
        if !self.is_logged_in().await {
            debug!("Logout requested without a session");
            return Ok(());
        }
        self.request_text(Method::POST, API_URL_USER_LOGOUT, &[], None).await?;
        *self.session.write().await = None;
        info!(user = %self.user, "Logged out of Apstra");
        Ok(())
    }

    /// Issue one request, logging in and retrying once on HTTP 401.
    /// Returns the raw response body of a successful call.
    pub async fn request_text(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<String, ApstraError> {
        let may_login = path != API_URL_USER_LOGIN && path != API_URL_USER_LOGOUT;
        let mut logged_in_here = false;

        loop {
            let response = self.send_once(method.clone(), path, query, body).await?;

            if response.status() == StatusCode::UNAUTHORIZED && may_login && !logged_in_here {
                debug!("HTTP 401 at {}, logging in and retrying", path);
                self.login().await.map_err(|e| {
                    ApstraError::Authentication(format!("error attempting login after initial auth failure - {}", e))
                })?;
                logged_in_here = true;
                continue;
            }

            return self.read_response(path, response).await;
        }
    }

    /// Make a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApstraError> {
        let text = self.request_text(Method::GET, path, query, None).await?;
        decode(path, &text)
    }

    /// Make a POST request
    pub async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApstraError> {
        let text = self.request_text(Method::POST, path, &[], Some(body)).await?;
        decode(path, &text)
    }

    /// Make a PUT request, ignoring any response body
    pub async fn put(&self, path: &str, body: &serde_json::Value) -> Result<(), ApstraError> {
        self.request_text(Method::PUT, path, &[], Some(body)).await?;
        Ok(())
    }

    /// Make a PATCH request, ignoring any response body
    pub async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<(), ApstraError> {
        self.request_text(Method::PATCH, path, &[], Some(body)).await?;
        Ok(())
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), ApstraError> {
        self.request_text(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApstraError> {
        let mut url = self.build_url(path);
        if !query.is_empty() {
            url = format!("{}?{}", url, self.build_query_string(query));
        }
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("Accept", "application/json");

        if let Some(session) = self.session.read().await.as_ref() {
            request = request.header(AUTH_HEADER, &session.token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(ApstraError::Http)
    }

    async fn read_response(&self, path: &str, response: reqwest::Response) -> Result<String, ApstraError> {
        let status = response.status();
        let url = response.url().to_string();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        // credentials travel in the login body; never echo it
        let body = if path == API_URL_USER_LOGIN {
            format!("response body for '{}' redacted", path)
        } else {
            text.chars().take(ERR_RESPONSE_LIMIT).collect()
        };

        match status {
            StatusCode::UNAUTHORIZED if path == API_URL_USER_LOGIN => Err(ApstraError::Authentication(format!(
                "http 401 at '{}' - check username/password",
                path
            ))),
            StatusCode::UNAUTHORIZED => Err(ApstraError::Authentication(format!(
                "http 401 at '{}' - {}",
                path, body
            ))),
            StatusCode::NOT_FOUND => Err(ApstraError::NotFound(format!("{} - {}", path, body))),
            StatusCode::CONFLICT => Err(ApstraError::Conflict(format!("{} - {}", path, body))),
            _ => Err(ApstraError::Api {
                status: status.as_u16(),
                url,
                body,
            }),
        }
    }
}

/// Decode a JSON body, reporting the head of the body on failure
pub fn decode<T: for<'de> Deserialize<'de>>(path: &str, text: &str) -> Result<T, ApstraError> {
    serde_json::from_str(text).map_err(|e| ApstraError::Decode {
        url: path.to_string(),
        message: format!(
            "{} - Response (first {} chars): {}",
            e,
            DECODE_ERR_PREVIEW,
            text.chars().take(DECODE_ERR_PREVIEW).collect::<String>()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http_for(server: &MockServer) -> HttpClient {
        HttpClient::new(&ClientConfig::new(server.uri(), "admin", "secret")).unwrap()
    }

    async fn mount_login(server: &MockServer, token: &str) {
        Mock::given(method("POST"))
            .and(path(API_URL_USER_LOGIN))
            .and(body_json(serde_json::json!({"username": "admin", "password": "secret"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "token": token,
                "id": "user-1",
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_build_url_and_query() {
        let http = HttpClient::with_client(
            Client::new(),
            "https://apstra/".to_string(),
            "u".to_string(),
            "p".to_string(),
        );
        assert_eq!(http.base_url(), "https://apstra");
        assert_eq!(http.build_url("/api/version"), "https://apstra/api/version");
        assert_eq!(
            http.build_query_string(&[("filter", "id in ['a']")]),
            "filter=id%20in%20%5B%27a%27%5D"
        );
    }

    #[test]
    fn test_unsafe_scheme_is_rewritten() {
        let http = HttpClient::new(&ClientConfig::new("hxxps://apstra:443", "u", "p")).unwrap();
        assert_eq!(http.base_url(), "https://apstra:443");
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let server = MockServer::start().await;
        mount_login(&server, "tok-1").await;

        let http = http_for(&server);
        http.login().await.unwrap();
        assert!(http.is_logged_in().await);
        assert_eq!(http.user_id().await, Some(ObjectId::from("user-1")));
    }

    #[tokio::test]
    async fn test_login_bad_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(API_URL_USER_LOGIN))
            .respond_with(ResponseTemplate::new(401).set_body_string("password=secret"))
            .expect(1)
            .mount(&server)
            .await;

        let err = http_for(&server).login().await.unwrap_err();
        assert!(matches!(err, ApstraError::Authentication(_)));
        assert!(!err.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_relogin_on_401() {
        let server = MockServer::start().await;
        mount_login(&server, "tok-2").await;
        Mock::given(method("GET"))
            .and(path("/api/design/tags"))
            .and(header(AUTH_HEADER, "tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/design/tags"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let http = http_for(&server);
        let tags: crate::models::ItemsResponse<serde_json::Value> =
            http.get("/api/design/tags", &[]).await.unwrap();
        assert!(tags.items.is_empty());
        assert!(http.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_second_401_is_authentication_error() {
        let server = MockServer::start().await;
        mount_login(&server, "tok-3").await;
        Mock::given(method("GET"))
            .and(path("/api/design/tags"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let err = http_for(&server)
            .get::<serde_json::Value>("/api/design/tags", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApstraError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;
        Mock::given(path("/exists"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;
        Mock::given(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let http = http_for(&server);
        assert!(http.get::<serde_json::Value>("/missing", &[]).await.unwrap_err().is_not_found());
        assert!(matches!(
            http.delete("/exists").await.unwrap_err(),
            ApstraError::Conflict(_)
        ));
        match http.get::<serde_json::Value>("/broken", &[]).await.unwrap_err() {
            ApstraError::Api { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("Expected Api error, got: {other:?}"),
        }
        match http.get::<serde_json::Value>("/garbage", &[]).await.unwrap_err() {
            ApstraError::Decode { message, .. } => assert!(message.contains("not json")),
            other => panic!("Expected Decode error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let server = MockServer::start().await;
        mount_login(&server, "tok-4").await;
        Mock::given(method("POST"))
            .and(path(API_URL_USER_LOGOUT))
            .and(header(AUTH_HEADER, "tok-4"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let http = http_for(&server);
        http.login().await.unwrap();
        http.logout().await.unwrap();
        assert!(!http.is_logged_in().await);
        // second logout is a no-op
        http.logout().await.unwrap();
    }
}
