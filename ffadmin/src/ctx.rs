//! Application context and service selection.
//!
//! This module provides the [`AdminContext`] type which holds the options
//! shared by every command and builds the form controller from them.

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use ffconfig::{
    ConfigService, FormController, HttpService, MemoryService, PreferenceStore, TransportError,
};

/// Options shared by all commands.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// Base URL of the media server.
    pub server: String,
    /// Admin password, if the server requires one.
    pub password: Option<String>,
    /// Preferences file.
    pub prefs: PathBuf,
    /// Request timeout; none by default.
    pub timeout: Option<Duration>,
    /// Directory with `config.xml`, `stats.xml` and `values.xml` to use
    /// instead of a live server.
    pub fixtures: Option<PathBuf>,
}

impl AdminContext {
    /// Builds an unloaded controller for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences file is invalid, the fixtures
    /// cannot be read or the HTTP client cannot be created.
    pub fn controller(&self) -> anyhow::Result<FormController<AdminService>> {
        let prefs = PreferenceStore::load(&self.prefs)
            .with_context(|| format!("Failed to load {}", self.prefs.display()))?;

        let service = match &self.fixtures {
            Some(dir) => {
                info!("Using fixtures from {}", dir.display());
                AdminService::Fixture(
                    MemoryService::from_dir(dir)
                        .with_context(|| format!("Failed to read fixtures in {}", dir.display()))?,
                )
            }
            None => {
                let mut http = HttpService::new(&self.server, self.timeout)?;
                if let Some(password) = &self.password {
                    http = http.with_password(password);
                }
                AdminService::Http(http)
            }
        };
        Ok(FormController::new(service, prefs))
    }

    /// Builds the controller and runs the load sequence.
    pub async fn load(&self) -> anyhow::Result<FormController<AdminService>> {
        let mut controller = self.controller()?;
        controller
            .load()
            .await
            .with_context(|| format!("Failed to load configuration from {}", self.source()))?;
        Ok(controller)
    }

    /// Human-readable origin of the configuration.
    pub fn source(&self) -> String {
        match &self.fixtures {
            Some(dir) => dir.display().to_string(),
            None => self.server.clone(),
        }
    }
}

/// The service behind the CLI: a live server or fixture files.
pub enum AdminService {
    Http(HttpService),
    Fixture(MemoryService),
}

impl ConfigService for AdminService {
    async fn fetch_schema(&self) -> Result<String, TransportError> {
        match self {
            AdminService::Http(s) => s.fetch_schema().await,
            AdminService::Fixture(s) => s.fetch_schema().await,
        }
    }

    async fn fetch_stats(&self) -> Result<String, TransportError> {
        match self {
            AdminService::Http(s) => s.fetch_stats().await,
            AdminService::Fixture(s) => s.fetch_stats().await,
        }
    }

    async fn fetch_values(&self) -> Result<String, TransportError> {
        match self {
            AdminService::Http(s) => s.fetch_values().await,
            AdminService::Fixture(s) => s.fetch_values().await,
        }
    }

    async fn update_config(&self, body: &str) -> Result<String, TransportError> {
        match self {
            AdminService::Http(s) => s.update_config(body).await,
            AdminService::Fixture(s) => {
                info!("Fixture update: {body}");
                s.update_config(body).await
            }
        }
    }
}
