use crate::utils::error::Result;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub text: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Thin wrapper over reqwest used for every call the session makes.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Sends a request and buffers the whole body as text.
    ///
    /// Non-2xx statuses are returned, not raised; only transport failures
    /// (DNS, connect, timeout, body read) produce an error.
    pub async fn send_request(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<TransportResponse> {
        let mut request = self.client.request(method.clone(), url);

        for (key, value) in headers {
            request = request.header(*key, value);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("📡 {} {}", method, url);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("📡 Response status: {}", status);

        let text = response.text().await?;
        Ok(TransportResponse { status, text })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_send_request_posts_json_with_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/echo")
                .header("authorization", "Bearer abc")
                .json_body(serde_json::json!({"hello": "world"}));
            then.status(201).body("created");
        });

        let transport = HttpTransport::default();
        let body = serde_json::json!({"hello": "world"});
        let response = transport
            .send_request(
                Method::POST,
                &server.url("/echo"),
                &[("Authorization", bearer("abc"))],
                Some(&body),
            )
            .await
            .unwrap();

        mock.assert();
        assert!(response.is_success());
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.text, "created");
    }

    #[tokio::test]
    async fn test_send_request_returns_error_status_without_failing() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/denied");
            then.status(401).body("nope");
        });

        let transport = HttpTransport::default();
        let response = transport
            .send_request(Method::POST, &server.url("/denied"), &[], None)
            .await
            .unwrap();

        mock.assert();
        assert!(!response.is_success());
        assert_eq!(response.text, "nope");
    }
}
