use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_REST_URL: &str = "https://outlook.office.com/api";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_token: Option<String>,
    pub rest_url: Option<String>,
}

impl Config {
    fn config_dir() -> Result<PathBuf> {
        let dir = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not find home directory".into()))?
            .join(".refile");
        Ok(dir)
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Directory for persisted state (folder cache, recency list).
    pub fn state_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("state"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))?;
        }

        let path = Self::config_path()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn get_token(&self) -> Result<&str> {
        self.api_token.as_deref().ok_or(Error::NotAuthenticated)
    }

    pub fn set_token(&mut self, token: String) {
        self.api_token = Some(token);
    }

    pub fn rest_url(&self) -> &str {
        self.rest_url.as_deref().unwrap_or(DEFAULT_REST_URL)
    }
}
