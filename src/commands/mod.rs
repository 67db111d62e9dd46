mod auth;
mod list;
mod r#move;
mod pick;
mod refresh;
mod search;

pub use auth::*;
pub use list::*;
pub use pick::*;
pub use r#move::*;
pub use refresh::*;
pub use search::*;

use crate::config::Config;
use crate::error::Result;
use crate::recent::RecencyTracker;
use crate::rest::OutlookClient;
use crate::store::{FileStore, FolderStore};

/// Shared wiring for every command: config, credentialed client, and
/// the file-backed stores.
pub(crate) struct Context {
    pub client: OutlookClient,
    pub store: FolderStore<FileStore>,
    pub recents: RecencyTracker<FileStore>,
}

pub(crate) fn context() -> Result<Context> {
    let config = Config::load()?;
    let token = config.get_token()?;
    let client = OutlookClient::new(token.to_string(), config.rest_url());
    Ok(Context {
        client,
        store: FolderStore::new(FileStore::open_default()?),
        recents: RecencyTracker::new(FileStore::open_default()?),
    })
}
