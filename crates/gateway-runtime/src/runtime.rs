//! Wiring of the subsystems from one configuration.

use crate::cli::{MediaCommand, MenuCommand};
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::info;
use wx_03_credentials::{CredentialCache, CredentialProvider, HttpCredentialIssuer, SystemTimeSource};
use wx_04_gateway::{GatewayConfig, GatewayService, MessageHandler};
use wx_05_management::{ManagementApi, ManagementClient, MediaKind};

/// All long-lived components of one gateway process.
pub struct GatewayRuntime {
    config: GatewayConfig,
    credentials: Arc<CredentialCache>,
    management: ManagementClient,
}

impl GatewayRuntime {
    /// Build the credential cache and management client for `config`.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let account = config.account_config()?;
        let settings = &config.credentials;

        let issuer = HttpCredentialIssuer::new(
            settings.api_base_url.clone(),
            &account,
            settings.request_timeout,
        )
        .context("Failed to create credential issuer")?;
        let credentials = Arc::new(CredentialCache::new(
            Arc::new(issuer),
            Arc::new(SystemTimeSource),
            settings.expiry_margin,
        ));

        let provider: Arc<dyn CredentialProvider> = credentials.clone();
        let management = ManagementClient::new(
            settings.api_base_url.clone(),
            provider,
            settings.request_timeout,
        )
        .context("Failed to create management client")?;

        Ok(Self {
            config,
            credentials,
            management,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Shared credential cache for application handlers.
    pub fn credentials(&self) -> Arc<CredentialCache> {
        Arc::clone(&self.credentials)
    }

    pub fn management(&self) -> &ManagementClient {
        &self.management
    }

    /// Serve the webhook with `handler` until `shutdown` resolves.
    pub async fn serve<F>(&self, handler: Arc<dyn MessageHandler>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("===========================================");
        info!("  WX Webhook Gateway v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            app_id = %self.config.account.app_id,
            addr = %self.config.http_addr(),
            path = %self.config.http.path,
            safe_mode = self.config.account.safe_mode,
            "Starting gateway"
        );

        let service = GatewayService::new(self.config.clone(), handler)
            .context("Failed to create gateway service")?;
        service.start(shutdown).await.context("Gateway server failed")?;
        Ok(())
    }

    /// Run a menu command and return what should be printed.
    pub async fn run_menu(&self, command: &MenuCommand) -> Result<String> {
        match command {
            MenuCommand::Create { file } => {
                let raw = tokio::fs::read_to_string(file)
                    .await
                    .with_context(|| format!("Failed to read menu file {}", file.display()))?;
                let menu: serde_json::Value =
                    serde_json::from_str(&raw).context("Menu file is not valid JSON")?;
                self.management.create_menu(&menu).await?;
                Ok("menu created".to_string())
            }
            MenuCommand::Get => {
                let menu = self.management.get_menu().await?;
                Ok(serde_json::to_string_pretty(&menu)?)
            }
            MenuCommand::Delete => {
                self.management.delete_menu().await?;
                Ok("menu deleted".to_string())
            }
        }
    }

    /// Run a media command and return what should be printed.
    pub async fn run_media(&self, command: &MediaCommand) -> Result<String> {
        match command {
            MediaCommand::Upload { kind, path } => {
                let kind: MediaKind = kind.parse()?;
                let uploaded = self.management.upload_temporary_media(kind, path).await?;
                Ok(serde_json::to_string_pretty(&uploaded)?)
            }
        }
    }
}
