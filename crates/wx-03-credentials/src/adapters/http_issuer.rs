//! HTTP adapter for the platform's credential-issuing endpoints.
//!
//! - `GET {base}/cgi-bin/token?grant_type=client_credential&appid=..&secret=..`
//! - `GET {base}/cgi-bin/ticket/getticket?access_token=..&type=jsapi`
//!
//! Both answer with JSON; a non-zero `errcode` is a platform error.

use crate::domain::credential::IssuedCredential;
use crate::domain::errors::RefreshError;
use crate::ports::outbound::CredentialIssuer;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared_types::AccountConfig;
use std::time::Duration;
use tracing::debug;

/// Production API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.weixin.qq.com";

/// Raw issuer response; token and ticket endpoints share the shape.
#[derive(Debug, Deserialize)]
struct IssueResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
    access_token: Option<String>,
    ticket: Option<String>,
    expires_in: Option<u64>,
}

impl IssueResponse {
    fn into_credential(
        self,
        pick: fn(Self) -> (Option<String>, Option<u64>),
    ) -> Result<IssuedCredential, RefreshError> {
        if self.errcode != 0 {
            return Err(RefreshError::Platform {
                code: self.errcode,
                message: self.errmsg,
            });
        }
        match pick(self) {
            (Some(value), Some(ttl_secs)) if !value.is_empty() => {
                Ok(IssuedCredential { value, ttl_secs })
            }
            _ => Err(RefreshError::Malformed(
                "missing credential or expires_in".to_string(),
            )),
        }
    }
}

/// Credential issuer backed by the platform HTTP API.
#[derive(Clone)]
pub struct HttpCredentialIssuer {
    client: Client,
    base_url: String,
    app_id: String,
    app_secret: String,
}

impl HttpCredentialIssuer {
    /// Create an issuer for `account` against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError::Transport` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        account: &AccountConfig,
        request_timeout: Duration,
    ) -> Result<Self, RefreshError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_id: account.app_id().to_string(),
            app_secret: account.app_secret().to_string(),
        })
    }

    async fn fetch(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<IssueResponse, RefreshError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            // The URL carries the secret; keep it out of the message.
            .map_err(|e| RefreshError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshError::Transport(e.without_url().to_string()))?;
        serde_json::from_slice(&body).map_err(|e| RefreshError::Malformed(e.to_string()))
    }
}

impl std::fmt::Debug for HttpCredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCredentialIssuer")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialIssuer for HttpCredentialIssuer {
    async fn issue_access_token(&self) -> Result<IssuedCredential, RefreshError> {
        debug!(app_id = %self.app_id, "Requesting access token");
        self.fetch(
            "/cgi-bin/token",
            &[
                ("grant_type", "client_credential"),
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.as_str()),
            ],
        )
        .await?
        .into_credential(|r| (r.access_token, r.expires_in))
    }

    async fn issue_capability_ticket(
        &self,
        access_token: &str,
    ) -> Result<IssuedCredential, RefreshError> {
        debug!(app_id = %self.app_id, "Requesting capability ticket");
        self.fetch(
            "/cgi-bin/ticket/getticket",
            &[("access_token", access_token), ("type", "jsapi")],
        )
        .await?
        .into_credential(|r| (r.ticket, r.expires_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn token(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        if q.get("grant_type").map(String::as_str) != Some("client_credential") {
            return Json(json!({"errcode": 40002, "errmsg": "invalid grant_type"}));
        }
        if q.get("appid").map(String::as_str) == Some("wx1")
            && q.get("secret").map(String::as_str) == Some("secret")
        {
            Json(json!({"access_token": "ACCESS", "expires_in": 7200}))
        } else {
            Json(json!({"errcode": 40013, "errmsg": "invalid appid"}))
        }
    }

    async fn ticket(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        match (q.get("access_token"), q.get("type")) {
            (Some(t), Some(kind)) if t == "ACCESS" && kind == "jsapi" => Json(
                json!({"errcode": 0, "errmsg": "ok", "ticket": "TICKET", "expires_in": 7200}),
            ),
            _ => Json(json!({"errcode": 40001, "errmsg": "invalid credential"})),
        }
    }

    async fn spawn_platform() -> String {
        let app = Router::new()
            .route("/cgi-bin/token", get(token))
            .route("/cgi-bin/ticket/getticket", get(ticket))
            .route("/broken/cgi-bin/token", get(|| async { "not json" }))
            .route(
                "/down/cgi-bin/token",
                get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn issuer(base: &str, app_id: &str) -> HttpCredentialIssuer {
        let account = AccountConfig::new(app_id, "secret", "token", false, None).unwrap();
        HttpCredentialIssuer::new(base, &account, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_issue_access_token() {
        let base = spawn_platform().await;
        let issued = issuer(&base, "wx1").issue_access_token().await.unwrap();
        assert_eq!(
            issued,
            IssuedCredential {
                value: "ACCESS".into(),
                ttl_secs: 7200
            }
        );
    }

    #[tokio::test]
    async fn test_issue_capability_ticket() {
        let base = spawn_platform().await;
        let issued = issuer(&base, "wx1")
            .issue_capability_ticket("ACCESS")
            .await
            .unwrap();
        assert_eq!(issued.value, "TICKET");

        let err = issuer(&base, "wx1")
            .issue_capability_ticket("WRONG")
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::Platform { code: 40001, .. }));
    }

    #[tokio::test]
    async fn test_platform_error_code() {
        let base = spawn_platform().await;
        let err = issuer(&base, "wx_unknown")
            .issue_access_token()
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RefreshError::Platform {
                code: 40013,
                message: "invalid appid".into()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_and_status_errors() {
        let base = spawn_platform().await;

        let err = issuer(&format!("{base}/broken"), "wx1")
            .issue_access_token()
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::Malformed(_)));

        let err = issuer(&format!("{base}/down"), "wx1")
            .issue_access_token()
            .await
            .unwrap_err();
        assert_eq!(err, RefreshError::Status(503));
    }

    #[tokio::test]
    async fn test_transport_error_hides_secret() {
        // Nothing listens on port 9 locally.
        let err = issuer("http://127.0.0.1:9", "wx1")
            .issue_access_token()
            .await
            .unwrap_err();
        match err {
            RefreshError::Transport(msg) => assert!(!msg.contains("secret")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let response = IssueResponse {
            errcode: 0,
            errmsg: String::new(),
            access_token: Some("A".into()),
            ticket: None,
            expires_in: None,
        };
        assert!(matches!(
            response.into_credential(|r| (r.access_token, r.expires_in)),
            Err(RefreshError::Malformed(_))
        ));
    }
}
