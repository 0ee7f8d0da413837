//! AutoGest Desktop Library
//!
//! Session-gated client for the AutoGest vehicle inventory service.

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod models;
pub mod pages;
pub mod storage;
#[cfg(feature = "desktop")]
pub mod commands;

use std::sync::Arc;

use api::{ApiClient, ApiError};
use auth::AuthManager;
use config::Config;
use pages::Pages;
use storage::SecureStorage;

/// Application state shared across commands
pub struct AppState {
    pub pages: Pages,
}

impl AppState {
    /// Wire storage, session and API client from configuration
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let storage = SecureStorage::new(&config.data_dir);
        let auth = Arc::new(AuthManager::new(storage));
        let api = ApiClient::new(&config.api_url, config.request_timeout, auth)?;

        Ok(Self {
            pages: Pages::new(api),
        })
    }
}
