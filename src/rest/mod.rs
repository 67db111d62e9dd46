use crate::error::{Error, Result};
use crate::models::FolderRecord;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: u32 = 500;
const FOLDER_FIELDS: &str = "Id,DisplayName,ParentFolderId";

/// Contract for the remote mail service: the two folder listings plus
/// the move operation. The Outlook client below is the production
/// implementation; tests script their own.
#[allow(async_fn_in_trait)]
pub trait MailService {
    async fn list_root_folders(&self) -> Result<Vec<FolderRecord>>;

    /// Children of one folder. Returns an empty sequence on a
    /// non-success status rather than failing the whole load.
    async fn list_child_folders(&self, parent_id: &str) -> Result<Vec<FolderRecord>>;

    async fn move_message(&self, item_id: &str, folder_id: &str) -> Result<()>;
}

pub struct OutlookClient {
    client: Client,
    token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    value: Vec<FolderRecord>,
}

impl OutlookClient {
    pub fn new(token: String, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            base_url: base_url.into(),
        }
    }

    async fn get_folder_page(&self, url: &str) -> Result<reqwest::Response> {
        let resp = self
            .client
            .get(url)
            .query(&[
                ("$top", PAGE_SIZE.to_string()),
                ("$select", FOLDER_FIELDS.to_string()),
            ])
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(resp)
    }
}

impl MailService for OutlookClient {
    #[instrument(skip(self))]
    async fn list_root_folders(&self) -> Result<Vec<FolderRecord>> {
        let url = format!("{}/v2.0/me/mailfolders", self.base_url);
        debug!(url = %url, "Listing top-level folders");
        let resp = self.get_folder_page(&url).await?;

        match resp.status().as_u16() {
            401 => return Err(Error::InvalidToken("Token expired or invalid".into())),
            429 => return Err(Error::RateLimited),
            500..=599 => return Err(Error::Server(format!("Server error: {}", resp.status()))),
            s if s >= 400 => {
                return Err(Error::Fetch(format!("Outlook REST error: {}", resp.status())));
            }
            _ => {}
        }

        let data: ListResponse = resp.json().await?;
        Ok(data.value)
    }

    #[instrument(skip(self))]
    async fn list_child_folders(&self, parent_id: &str) -> Result<Vec<FolderRecord>> {
        let url = format!(
            "{}/v2.0/me/mailfolders/{}/childfolders",
            self.base_url, parent_id
        );
        let resp = self.get_folder_page(&url).await?;

        if !resp.status().is_success() {
            warn!(parent_id, status = %resp.status(), "Child folder listing failed, treating as empty");
            return Ok(Vec::new());
        }

        let data: ListResponse = resp.json().await?;
        Ok(data.value)
    }

    #[instrument(skip(self))]
    async fn move_message(&self, item_id: &str, folder_id: &str) -> Result<()> {
        let url = format!("{}/v2.0/me/messages/{}/move", self.base_url, item_id);
        debug!(url = %url, folder_id, "Moving message");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "DestinationId": folder_id }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().await.unwrap_or_default();
            let reason = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("Failed to move message: {}", status));
            return Err(Error::Move(reason));
        }

        Ok(())
    }
}
