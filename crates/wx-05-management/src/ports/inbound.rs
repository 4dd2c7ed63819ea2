//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::ManagementError;
use crate::domain::media::{MediaKind, UploadedMedia};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Management operations performed on behalf of the account.
///
/// Every call obtains a valid access token from the credential cache first.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Replace the custom menu with `menu` (platform menu JSON).
    async fn create_menu(&self, menu: &Value) -> Result<(), ManagementError>;

    /// Current custom menu as returned by the platform.
    async fn get_menu(&self) -> Result<Value, ManagementError>;

    /// Remove the custom menu.
    async fn delete_menu(&self) -> Result<(), ManagementError>;

    /// Upload the file at `path` as temporary media of `kind`.
    async fn upload_temporary_media(
        &self,
        kind: MediaKind,
        path: &Path,
    ) -> Result<UploadedMedia, ManagementError>;
}
