use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw folder record as returned by the Outlook REST v2.0 listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FolderRecord {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub parent_folder_id: Option<String>,
}

/// A folder with its derived full path, as kept in the cache and
/// searched by the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub parent_folder_id: Option<String>,
    pub path: String,
    pub search_text: String,
}

impl Folder {
    pub fn new(record: FolderRecord, path: String) -> Self {
        let search_text = format!("{} {}", record.display_name, path).to_lowercase();
        Self {
            id: record.id,
            display_name: record.display_name,
            parent_folder_id: record.parent_folder_id,
            path,
            search_text,
        }
    }
}

/// Persisted folder snapshot. Valid only while fresh and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderCache {
    pub folders: Vec<Folder>,
    pub timestamp: i64,
}

impl FolderCache {
    pub fn is_valid(&self, now_millis: i64, ttl: Duration) -> bool {
        !self.folders.is_empty() && now_millis - self.timestamp < ttl.as_millis() as i64
    }
}

/// Projection of a move destination kept in the recency list. Retained
/// across folder refreshes and filtered against live folder ids on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub id: String,
    pub display_name: String,
    pub path: String,
}

impl From<&Folder> for RecentEntry {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id.clone(),
            display_name: folder.display_name.clone(),
            path: folder.path.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Output<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn success_msg(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn error(err: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.into()),
            message: None,
        }
    }

    pub fn print(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap());
    }
}
