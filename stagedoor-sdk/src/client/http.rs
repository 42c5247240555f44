//! Request dispatch, bearer injection and response classification.

use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::core::HttpClient;
use crate::cross_log;
use crate::errors::{Error, RequestError, Result};
use crate::forms::FieldErrors;
use crate::navigation::same_route;

/// What the adapter does with a `401`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnUnauthorized {
    /// Clear the session and redirect to the login route.
    Teardown,
    /// Only report it. Used by credential checks, where `401` means "wrong password".
    Report,
}

impl HttpClient {
    /// Resolve `path` against the API base URL. Leading slashes are ignored.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Resolve `path` and append `query` pairs to it.
    pub fn url_with_query<I, K, V>(&self, path: &str, query: I) -> Result<Url>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.url(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k.as_ref(), v.as_ref());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    /// Start a request to `path` with the bearer token (if any) and `Accept: application/json`.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.request_url(method, self.url(path)?))
    }

    pub(crate) fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a prepared request and classify the response.
    ///
    /// Non-2xx responses become [`RequestError`]s; a `401` additionally tears the session down
    /// unless the login route is displayed.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.send_with(builder, OnUnauthorized::Teardown).await
    }

    pub(crate) async fn send_with(
        &self,
        builder: RequestBuilder,
        on_unauthorized: OnUnauthorized,
    ) -> Result<Response> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    cross_log!(error, "Request timed out: {}", e);
                } else {
                    cross_log!(error, "Request failed before a response: {}", e);
                }
                return Err(RequestError::Network(e).into());
            }
        };

        match check_http_status(response).await {
            Ok(response) => Ok(response),
            Err(err) => {
                if matches!(err, RequestError::Unauthorized { .. })
                    && on_unauthorized == OnUnauthorized::Teardown
                {
                    self.handle_unauthorized();
                }
                Err(err.into())
            }
        }
    }

    /// Global `401` policy: sign out and go to the login page, never looping on it.
    fn handle_unauthorized(&self) {
        let login = &self.config.routes.login;
        let current = self.navigator.current_route();
        if same_route(&current, login) {
            cross_log!(debug, "401 while on {}; leaving the session alone", current);
            return;
        }
        cross_log!(warn, "Bearer token rejected on {}, signing out", current);
        self.session.teardown();
        self.navigator.navigate(login);
    }

    // === JSON helpers ===

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        decode_json(response).await
    }

    pub(crate) async fn get_json_with_query<T, I, K, V>(&self, path: &str, query: I) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = self.url_with_query(path, query)?;
        let response = self.send(self.request_url(Method::GET, url)).await?;
        decode_json(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, Some(body)).await
    }

    /// `POST` without a body (state transitions such as publish or mark-read).
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json::<Value, T>(Method::POST, path, None).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, Some(body)).await
    }

    pub(crate) async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PATCH, path, Some(body)).await
    }

    /// `DELETE`, ignoring whatever body the server returns.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::DELETE, path)?).await?;
        decode_json(response).await
    }

    /// Multipart upload. The transport sets `Content-Type` with the boundary.
    pub(crate) async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let builder = self.request(Method::POST, path)?.multipart(form);
        let response = self.send(builder).await?;
        decode_json(response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(builder).await?;
        decode_json(response).await
    }
}

/// Decode a JSON body. An empty body decodes as `null`.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    let raw: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };
    serde_json::from_slice(raw).map_err(|e| {
        cross_log!(warn, "Unexpected response body: {}", e);
        Error::from(RequestError::DecodeJson {
            message: e.to_string(),
        })
    })
}

/// Convert non-2xx responses into a classified [`RequestError`].
///
/// If the status is successful (2xx), the original response is returned. Otherwise the body
/// is consumed to extract the server's `message`, `code` and (for `422`) `errors` members.
pub(crate) async fn check_http_status(
    response: Response,
) -> std::result::Result<Response, RequestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let err = classify(status, &body, retry_after);

    if status.is_server_error() {
        cross_log!(error, "{} {}: {}", status, url, err);
    } else {
        cross_log!(warn, "{} {}: {}", status, url, err);
    }
    Err(err)
}

fn classify(status: StatusCode, body: &str, retry_after: Option<u64>) -> RequestError {
    let json: Option<Value> = serde_json::from_str(body).ok();
    let member = |name: &str| {
        json.as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let message = member("message")
        .or_else(|| member("error"))
        .or_else(|| {
            let text = body.trim();
            (json.is_none() && !text.is_empty() && text.len() <= 200).then(|| text.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED => RequestError::Unauthorized { message },
        StatusCode::FORBIDDEN => RequestError::Forbidden {
            message,
            code: member("code"),
        },
        StatusCode::NOT_FOUND => RequestError::NotFound { message },
        StatusCode::UNPROCESSABLE_ENTITY => RequestError::Validation {
            fields: json
                .as_ref()
                .map(FieldErrors::from_response_body)
                .unwrap_or_default(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => RequestError::RateLimited {
            retry_after,
            message,
        },
        s if s.is_server_error() => RequestError::Server { status, message },
        _ => RequestError::Http { status, message },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use reqwest::Method;
    use crate::navigation::{MemoryNavigator, Navigator};
    use crate::test_support::{signed_in_client, talent_user, test_client};

    #[test]
    fn classify_reads_laravel_bodies() {
        let err = classify(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"The email has already been taken.","errors":{"email":["The email has already been taken."]}}"#,
            None,
        );
        match err {
            RequestError::Validation { message, fields } => {
                assert_eq!(message, "The email has already been taken.");
                assert_eq!(
                    fields.first("email"),
                    Some("The email has already been taken.")
                );
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = classify(
            StatusCode::FORBIDDEN,
            r#"{"message":"Verify first","code":"email_not_verified"}"#,
            None,
        );
        assert!(matches!(
            err,
            RequestError::Forbidden { code: Some(ref c), .. } if c == "email_not_verified"
        ));

        let err = classify(StatusCode::BAD_GATEWAY, "", None);
        assert!(matches!(err, RequestError::Server { ref message, .. } if message == "Bad Gateway"));

        let err = classify(StatusCode::TOO_MANY_REQUESTS, "{}", Some(30));
        assert!(matches!(err, RequestError::RateLimited { retry_after: Some(30), .. }));

        let err = classify(StatusCode::CONFLICT, "plain text", None);
        assert!(matches!(err, RequestError::Http { ref message, .. } if message == "plain text"));
    }

    #[test]
    fn url_joins_relative_paths() {
        let (client, _nav) = test_client("http://localhost:8000/api/v1/");
        assert_eq!(
            client.url("/auth/me").unwrap().as_str(),
            "http://localhost:8000/api/v1/auth/me"
        );
        let url = client
            .url_with_query("projects", [("page", "2"), ("status", "active")])
            .unwrap();
        assert_eq!(url.query(), Some("page=2&status=active"));
        let url = client
            .url_with_query("projects", Vec::<(&str, &str)>::new())
            .unwrap();
        assert_eq!(url.query(), None);
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_present() {
        let server = MockServer::start_async().await;
        let anonymous = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/public/categories").header_missing("authorization");
                then.status(200).json_body(json!([]));
            })
            .await;

        let (client, _nav) = test_client(&server.url("/api/v1/"));
        let _: Value = client.get_json("public/categories").await.unwrap();
        anonymous.assert_async().await;

        let authed = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/auth/me")
                    .header("authorization", "Bearer tok-1")
                    .header("accept", "application/json");
                then.status(200).json_body(json!({ "data": {} }));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok-1", "/talent/profile");
        let _: Value = client.get_json("auth/me").await.unwrap();
        authed.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_tears_down_and_redirects() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/talent/profile");
                then.status(401).json_body(json!({ "message": "Unauthenticated." }));
            })
            .await;

        let (client, nav) = signed_in_client(&server.url("/api/v1/"), "expired", "/talent/profile");
        let err = client.get_json::<Value>("talent/profile").await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!client.session.snapshot().is_authenticated());
        assert!(client.session.token().is_none());
        assert_eq!(nav.history(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn unauthorized_on_login_route_does_not_loop() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/auth/me");
                then.status(401);
            })
            .await;

        let (client, nav) = signed_in_client(&server.url("/api/v1/"), "stale", "/login?next=/x");
        for _ in 0..3 {
            let err = client.get_json::<Value>("auth/me").await.unwrap_err();
            assert!(err.is_unauthorized());
        }
        assert!(nav.history().is_empty());
    }

    #[tokio::test]
    async fn report_policy_leaves_session_alone() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/auth/login");
                then.status(401).json_body(json!({ "message": "Invalid credentials" }));
            })
            .await;

        let (client, nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/dashboard");
        let builder = client.request(Method::POST, "auth/login").unwrap();
        let err = client
            .send_with(builder, OnUnauthorized::Report)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(
            client.session.snapshot().user(),
            Some(&talent_user())
        );
        assert!(nav.history().is_empty());
    }

    #[tokio::test]
    async fn other_errors_leave_session_alone() {
        let server = MockServer::start_async().await;
        for (path, status) in [("forbidden", 403), ("missing", 404), ("busy", 429), ("boom", 500)] {
            server
                .mock_async(move |when, then| {
                    when.path(format!("/api/v1/{path}"));
                    then.status(status);
                })
                .await;
        }

        let (client, nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/dashboard");
        for (path, status) in [("forbidden", 403), ("missing", 404), ("busy", 429), ("boom", 500)] {
            let err = client.get_json::<Value>(path).await.unwrap_err();
            assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
        }
        assert!(client.session.snapshot().is_authenticated());
        assert!(nav.history().is_empty());
    }

    #[tokio::test]
    async fn network_failure_is_distinct() {
        let nav = Arc::new(MemoryNavigator::default());
        let client = HttpClient::builder()
            .base_url("http://127.0.0.1:9/api/v1/")
            .navigator(nav.clone())
            .build()
            .unwrap();
        let err = client.get_json::<Value>("auth/me").await.unwrap_err();
        assert!(err.is_network());
        assert!(err.status().is_none());
        assert_eq!(nav.current_route(), "/");
    }

    #[tokio::test]
    async fn empty_and_malformed_bodies() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/talent/skills/4");
                then.status(204);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/garbled");
                then.status(200).body("<html>");
            })
            .await;

        let (client, _nav) = test_client(&server.url("/api/v1/"));
        client.delete("talent/skills/4").await.unwrap();
        let none: Option<Value> = client.delete_json("talent/skills/4").await.unwrap();
        assert!(none.is_none());

        let err = client.get_json::<Value>("garbled").await.unwrap_err();
        assert!(matches!(err, Error::Request(RequestError::DecodeJson { .. })));
    }
}
