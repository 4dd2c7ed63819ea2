//! # Management Client
//!
//! - `POST {base}/cgi-bin/menu/create?access_token=..` (menu JSON body)
//! - `GET  {base}/cgi-bin/menu/get?access_token=..`
//! - `GET  {base}/cgi-bin/menu/delete?access_token=..`
//! - `POST {base}/cgi-bin/media/upload?access_token=..&type=..` (multipart `media`)
//!
//! A stale-token error code invalidates the cached access token and is returned
//! to the caller unchanged. Retrying is the caller's decision; the next call
//! starts with a freshly issued token.

use crate::domain::errors::ManagementError;
use crate::domain::media::{MediaKind, UploadedMedia};
use crate::ports::inbound::ManagementApi;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use shared_types::CredentialKind;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wx_03_credentials::{is_stale_token_code, CredentialProvider};

/// Management API client bound to one account's credential cache.
pub struct ManagementClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ManagementClient {
    /// Create a client for `base_url` using tokens from `credentials`.
    ///
    /// # Errors
    ///
    /// Returns `ManagementError::Transport` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        request_timeout: Duration,
    ) -> Result<Self, ManagementError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ManagementError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run `call` with a valid access token.
    ///
    /// A stale-token rejection drops the cached token before the error is
    /// returned.
    async fn with_token<T, F, Fut>(&self, call: F) -> Result<T, ManagementError>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<T, ManagementError>> + Send,
        T: Send,
    {
        let token = self.credentials.access_token().await?;
        let result = call(token).await;
        if let Err(ManagementError::Upstream { code, .. }) = &result {
            if is_stale_token_code(*code) {
                warn!(code = *code, "Access token rejected by platform, invalidating");
                self.credentials.invalidate(CredentialKind::AccessToken);
            }
        }
        result
    }
}

impl std::fmt::Debug for ManagementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Send `request` and return the JSON body if the platform accepted it.
async fn send(request: RequestBuilder) -> Result<Value, ManagementError> {
    // The URL carries the access token; keep it out of the message.
    let response = request
        .send()
        .await
        .map_err(|e| ManagementError::Transport(e.without_url().to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ManagementError::Transport(format!("HTTP {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ManagementError::Transport(e.without_url().to_string()))?;
    let value: Value =
        serde_json::from_slice(&body).map_err(|e| ManagementError::Malformed(e.to_string()))?;
    check_errcode(value)
}

fn check_errcode(value: Value) -> Result<Value, ManagementError> {
    let code = value.get("errcode").and_then(Value::as_i64).unwrap_or(0);
    if code == 0 {
        return Ok(value);
    }
    let message = value
        .get("errmsg")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(ManagementError::Upstream { code, message })
}

#[async_trait]
impl ManagementApi for ManagementClient {
    async fn create_menu(&self, menu: &Value) -> Result<(), ManagementError> {
        let url = self.url("/cgi-bin/menu/create");
        self.with_token(|token| {
            send(
                self.client
                    .post(&url)
                    .query(&[("access_token", token.as_str())])
                    .json(menu),
            )
        })
        .await?;
        info!("Custom menu created");
        Ok(())
    }

    async fn get_menu(&self) -> Result<Value, ManagementError> {
        let url = self.url("/cgi-bin/menu/get");
        self.with_token(|token| {
            send(
                self.client
                    .get(&url)
                    .query(&[("access_token", token.as_str())]),
            )
        })
        .await
    }

    async fn delete_menu(&self) -> Result<(), ManagementError> {
        let url = self.url("/cgi-bin/menu/delete");
        self.with_token(|token| {
            send(
                self.client
                    .get(&url)
                    .query(&[("access_token", token.as_str())]),
            )
        })
        .await?;
        info!("Custom menu deleted");
        Ok(())
    }

    async fn upload_temporary_media(
        &self,
        kind: MediaKind,
        path: &Path,
    ) -> Result<UploadedMedia, ManagementError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());
        debug!(%kind, size = bytes.len(), file = %file_name, "Uploading temporary media");

        let url = self.url("/cgi-bin/media/upload");
        let value = self
            .with_token(move |token| {
                let part = Part::bytes(bytes).file_name(file_name);
                send(
                    self.client
                        .post(&url)
                        .query(&[("access_token", token.as_str()), ("type", kind.as_str())])
                        .multipart(Form::new().part("media", part)),
                )
            })
            .await?;

        let uploaded: UploadedMedia =
            serde_json::from_value(value).map_err(|e| ManagementError::Malformed(e.to_string()))?;
        info!(%kind, media_id = %uploaded.media_id, "Temporary media uploaded");
        Ok(uploaded)
    }
}
