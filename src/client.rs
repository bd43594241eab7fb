//! Thin, typed wrapper around `reqwest` for the inventory backend.
//!
//! Provides ergonomic async helpers ([`ApiClient::get_json`],
//! [`ApiClient::post_json_text`], ...) so that the per-entity gateway
//! services never touch transport internals directly. Every outgoing request
//! except the two auth endpoints carries `Authorization: Bearer <token>` when
//! the shared [`TokenStore`] holds one; an absent token sends the request
//! unmodified and lets the server enforce rejection.

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorMessage};
use crate::token::TokenStore;

/// Typed HTTP client for the inventory backend.
///
/// `Clone` is cheap: the inner `reqwest::Client` is an Arc'd connection pool
/// and the token store is shared.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    /// Build a client against `base_url` (scheme + host + port, no trailing
    /// slash needed) using a default `reqwest` client.
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, tokens)
    }

    /// Build a client over a pre-configured `reqwest::Client`.
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: TokenStore,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests to `path` skip the bearer header.
    ///
    /// Login and registration run before any token exists; everything else
    /// is authenticated when possible.
    fn auth_exempt(path: &str) -> bool {
        path.contains("/auth/new") || path.contains("/auth/authenticate")
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        if Self::auth_exempt(path) {
            return builder;
        }
        match self.tokens.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a prepared request and normalize the failure modes.
    ///
    /// # Errors
    ///
    /// [`ApiError::Transport`] when no response arrives;
    /// [`ApiError::Status`] for any non-2xx answer, with the display message
    /// extracted from the body best-effort (the extraction itself cannot
    /// fail).
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // Failing to read the error body is not itself an error; it just
        // degrades the message to the generic tier.
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: ErrorMessage::extract(&body),
        })
    }

    async fn decode_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let body = response.text().await.map_err(ApiError::Transport)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET` a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::decode_json(response).await
    }

    /// `GET` a plain-text resource.
    pub async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        response.text().await.map_err(ApiError::Transport)
    }

    /// `POST` a JSON body, expecting a plain-text acknowledgment.
    pub async fn post_json_text<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, ApiError> {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        response.text().await.map_err(ApiError::Transport)
    }

    /// `POST` a JSON body, expecting a JSON response.
    pub async fn post_json_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Self::decode_json(response).await
    }

    /// `POST` with an empty body, expecting a plain-text acknowledgment.
    /// Used by trigger-style endpoints such as the low-stock notifier.
    pub async fn post_empty_text(&self, path: &str) -> Result<String, ApiError> {
        let response = self.send(self.request(Method::POST, path)).await?;
        response.text().await.map_err(ApiError::Transport)
    }

    /// `PUT` a JSON body, expecting the updated record back as JSON.
    pub async fn put_json_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.request(Method::PUT, path).json(body))
            .await?;
        Self::decode_json(response).await
    }

    /// `DELETE` a resource, expecting a plain-text acknowledgment.
    pub async fn delete_text(&self, path: &str) -> Result<String, ApiError> {
        let response = self.send(self.request(Method::DELETE, path)).await?;
        response.text().await.map_err(ApiError::Transport)
    }
}
