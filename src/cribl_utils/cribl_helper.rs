use std::time::Duration;

use log::info;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::convert::CriblHecToken;
use crate::errors::MigrateError;

/// Authenticated handle to a Cribl Stream deployment.
///
/// Construction logs in; every later call reuses the bearer token from
/// that exchange. Tokens are not refreshed, so a run must finish within
/// the token's lifetime.
#[derive(Debug)]
pub struct CriblHelper {
    client: Client,
    host: String,
    auth_header: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

impl CriblHelper {
    /// Logs into `host` with local credentials and keeps the bearer token
    /// for subsequent calls.
    pub fn login(host: &str, username: &str, password: &str) -> Result<Self, MigrateError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .default_headers(headers)
            .build()?;

        let response = client
            .post(format!("{}/api/v1/auth/login", host))
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MigrateError::Authentication(format!(
                "login returned {}: {}",
                status, body
            )));
        }

        let login: LoginResponse = response.json().map_err(|e| {
            MigrateError::Authentication(format!("login response held no usable token: {}", e))
        })?;
        if login.token.is_empty() {
            return Err(MigrateError::Authentication(
                "login response held an empty token".to_string(),
            ));
        }

        info!("Authentication successful");

        Ok(CriblHelper {
            client,
            host: host.to_string(),
            auth_header: format!("Bearer {}", login.token),
        })
    }

    /// Creates one HEC token on the named worker group's input. Returns
    /// Cribl's response document on success; any 4xx/5xx aborts with the
    /// status and raw body.
    pub fn create_hec_token(
        &self,
        worker_group: &str,
        input_id: &str,
        token: &CriblHecToken,
    ) -> Result<Value, MigrateError> {
        let url = format!(
            "{}/api/v1/m/{}/system/inputs/{}/hectoken",
            self.host, worker_group, input_id
        );

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, self.auth_header.as_str())
            .json(token)
            .send()?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().unwrap_or_default();
            return Err(MigrateError::Submission { status, body });
        }

        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tokio::runtime::Runtime;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_token() -> CriblHecToken {
        CriblHecToken {
            token: "TOK1".to_string(),
            description: "{\"message\":\"Imported from Splunk\"}".to_string(),
            metadata: vec![crate::convert::KvPair {
                name: "index".to_string(),
                value: "\"main\"".to_string(),
            }],
        }
    }

    #[test]
    fn login_sends_credentials_and_keeps_bearer_token() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());

        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/auth/login"))
                .and(body_json(json!({
                    "username": "admin",
                    "password": "s3cret",
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "token": "tok123",
                })))
                .expect(1)
                .mount(&server),
        );
        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/m/default/system/inputs/in_splunk_hec/hectoken"))
                .and(header("Authorization", "Bearer tok123"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
                .expect(1)
                .mount(&server),
        );

        let cribl = CriblHelper::login(&server.uri(), "admin", "s3cret").unwrap();
        cribl
            .create_hec_token("default", "in_splunk_hec", &sample_token())
            .unwrap();
    }

    #[test]
    fn login_rejects_non_success_status() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());

        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/auth/login"))
                .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
                .mount(&server),
        );

        let err = CriblHelper::login(&server.uri(), "admin", "wrong").unwrap_err();

        assert!(matches!(err, MigrateError::Authentication(_)));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn login_rejects_response_without_token_field() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());

        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/auth/login"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
                .mount(&server),
        );

        let err = CriblHelper::login(&server.uri(), "admin", "s3cret").unwrap_err();

        assert!(matches!(err, MigrateError::Authentication(_)));
    }

    #[test]
    fn login_rejects_empty_token() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());

        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/auth/login"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": ""})))
                .mount(&server),
        );

        let err = CriblHelper::login(&server.uri(), "admin", "s3cret").unwrap_err();

        assert!(matches!(err, MigrateError::Authentication(_)));
        assert!(err.to_string().contains("empty token"));
    }

    #[test]
    fn rejected_submission_carries_status_and_body() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());

        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/auth/login"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"token": "tok123"})),
                )
                .mount(&server),
        );
        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/m/default/system/inputs/in_splunk_hec/hectoken"))
                .respond_with(ResponseTemplate::new(400).set_body_string("invalid expression"))
                .mount(&server),
        );

        let cribl = CriblHelper::login(&server.uri(), "admin", "s3cret").unwrap();
        let err = cribl
            .create_hec_token("default", "in_splunk_hec", &sample_token())
            .unwrap_err();

        match err {
            MigrateError::Submission { status, body } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body, "invalid expression");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn create_posts_the_serialized_token_body() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());

        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/auth/login"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"token": "tok123"})),
                )
                .mount(&server),
        );
        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/api/v1/m/prod/system/inputs/in_custom/hectoken"))
                .and(body_json(json!({
                    "token": "TOK1",
                    "description": "{\"message\":\"Imported from Splunk\"}",
                    "metadata": [
                        {"name": "index", "value": "\"main\""},
                    ],
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1})))
                .expect(1)
                .mount(&server),
        );

        let cribl = CriblHelper::login(&server.uri(), "admin", "s3cret").unwrap();
        let details = cribl
            .create_hec_token("prod", "in_custom", &sample_token())
            .unwrap();

        assert_eq!(details["count"], 1);
    }
}
