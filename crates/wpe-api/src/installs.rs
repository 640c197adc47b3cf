// Install-scoped write endpoints: backups and cache purges.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::client::WpEngineClient;
use crate::error::Error;
use crate::models::{BackupRequest, CacheType, PurgeOutcome};

impl WpEngineClient {
    /// Request a backup of an install.
    ///
    /// `POST /installs/{id}/backups` with
    /// `{"description": "...", "notification_emails": "..."}`. Returns the
    /// decoded response as-is.
    pub async fn create_backup(
        &self,
        install_id: &str,
        description: &str,
        notification_emails: &str,
    ) -> Result<Value, Error> {
        let url = self.segments_url(&["installs", install_id, "backups"])?;
        debug!(install_id, description, "requesting backup");

        let resp = self
            .post(
                url,
                &BackupRequest {
                    description,
                    notification_emails,
                },
            )
            .await?;
        info!(install_id, "backup requested");
        Ok(resp)
    }

    /// Purge a single cache layer of an install.
    ///
    /// `POST /installs/{id}/purge_cache` with `{"type": "object" | "page"}`
    pub async fn purge_cache_type(
        &self,
        install_id: &str,
        cache: CacheType,
    ) -> Result<Value, Error> {
        let url = self.segments_url(&["installs", install_id, "purge_cache"])?;
        debug!(install_id, %cache, "purging cache");
        self.post(url, &json!({ "type": cache })).await
    }

    /// Purge both the object and the page cache, in that order.
    ///
    /// Both requests are always sent. If either fails, the first failure
    /// is returned once the page purge has also run.
    pub async fn purge_cache(&self, install_id: &str) -> Result<PurgeOutcome, Error> {
        let object = self.purge_cache_type(install_id, CacheType::Object).await;
        let page = self.purge_cache_type(install_id, CacheType::Page).await;

        match (object, page) {
            (Ok(object), Ok(page)) => {
                info!(install_id, "object and page caches purged");
                Ok(PurgeOutcome { object, page })
            }
            (Err(err), page) => {
                if let Err(ref page_err) = page {
                    warn!(install_id, error = %page_err, "page cache purge also failed");
                }
                Err(err)
            }
            (Ok(_), Err(err)) => Err(err),
        }
    }
}
