//! Configuration handling for the TUI

use crate::api::DEFAULT_API_URL;
use crate::auth::{OAuthSettings, TokenParams};
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SCOPE: &str = "openid profile email";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_CALLBACK_PORT: u16 = 5173;

/// User configuration for the TUI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Project API base URL
    pub api_url: String,
    /// Identity provider tenant domain
    pub auth_domain: Option<String>,
    /// OAuth client id
    pub client_id: Option<String>,
    /// API audience tokens are requested for
    pub audience: Option<String>,
    pub scope: String,
    /// Loopback port of `http://localhost:<port>/callback`, which has to be
    /// registered with the identity provider; 0 picks a free port
    pub callback_port: u16,
    /// Projects per page on the profile tab
    pub page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_domain: None,
            client_id: None,
            audience: None,
            scope: DEFAULT_SCOPE.to_string(),
            callback_port: DEFAULT_CALLBACK_PORT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    fn dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "folio", "folio-tui")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory for the log file and cached credentials
    pub fn data_dir() -> Option<PathBuf> {
        Self::dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn credentials_path() -> Option<PathBuf> {
        Self::data_dir().map(|dir| dir.join("credentials.json"))
    }

    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)?;
                serde_json::from_str(&content)?
            }
            _ => {
                let defaults = Self::default();
                if let Err(e) = defaults.save() {
                    tracing::warn!("Failed to write default config: {}", e);
                }
                defaults
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = lookup("FOLIO_API_URL") {
            self.api_url = url;
        }
        if let Some(domain) = lookup("FOLIO_AUTH_DOMAIN") {
            self.auth_domain = Some(domain);
        }
        if let Some(client_id) = lookup("FOLIO_AUTH_CLIENT_ID") {
            self.client_id = Some(client_id);
        }
        if let Some(audience) = lookup("FOLIO_AUTH_AUDIENCE") {
            self.audience = Some(audience);
        }
        if let Some(scope) = lookup("FOLIO_AUTH_SCOPE") {
            self.scope = scope;
        }
        match lookup("FOLIO_AUTH_CALLBACK_PORT").map(|port| port.trim().parse::<u16>()) {
            Some(Ok(port)) => self.callback_port = port,
            Some(Err(e)) => tracing::warn!("Ignoring FOLIO_AUTH_CALLBACK_PORT: {}", e),
            None => {}
        }
    }

    /// Token parameters used for every API write
    pub fn token_params(&self) -> TokenParams {
        TokenParams::new(self.audience.clone(), self.scope.clone())
    }

    /// Identity provider settings; `None` until domain and client id are set
    pub fn oauth_settings(&self) -> Option<OAuthSettings> {
        Some(OAuthSettings {
            domain: self.auth_domain.clone()?,
            client_id: self.client_id.clone()?,
            callback_port: self.callback_port,
        })
    }
}
