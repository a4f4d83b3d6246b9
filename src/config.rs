//! Runtime configuration
//!
//! Values come from command-line flags, then environment variables (a `.env`
//! file is honoured by the binary), then built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ng_space::DescriptionCatalog;
use ng_types::DEFAULT_BASE_URL;
use tracing::info;

use crate::session::Session;
use crate::store::MemoryStore;

pub const ENV_BASE_URL: &str = "NGTOOLS_BASE_URL";
pub const ENV_HISTORY: &str = "NGTOOLS_HISTORY";
pub const ENV_DESCRIPTIONS: &str = "NGTOOLS_DESCRIPTIONS";
pub const ENV_DISPLAY: &str = "NGTOOLS_DISPLAY";
pub const ENV_LOG: &str = "NGTOOLS_LOG";

/// Initial display order.
pub const DEFAULT_DISPLAY: &str = "xyz";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Viewer URL used when printing state as a link.
    pub base_url: String,
    /// REPL history file; `None` disables history.
    pub history: Option<PathBuf>,
    /// JSON catalog of source descriptions.
    pub descriptions: Option<PathBuf>,
    pub display: String,
    /// `tracing` filter directive.
    pub log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            history: default_history(),
            descriptions: None,
            display: DEFAULT_DISPLAY.to_string(),
            log: None,
        }
    }
}

/// `$HOME/.neuroglancer_history`, when a home directory is known.
pub fn default_history() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".neuroglancer_history"))
}

impl Config {
    /// Build an in-memory session with this configuration.
    pub fn session(&self) -> Result<Session<MemoryStore>> {
        let mut session =
            Session::new(MemoryStore::default()).with_base_url(self.base_url.clone());

        if let Some(path) = &self.descriptions {
            let catalog = DescriptionCatalog::from_path(path)
                .with_context(|| format!("Failed to load descriptions from {}", path.display()))?;
            info!(path = %path.display(), entries = catalog.len(), "loaded source descriptions");
            session = session.with_provider(Box::new(catalog));
        }

        let tokens: Vec<&str> = self.display.split_whitespace().collect();
        session
            .display(&tokens)
            .with_context(|| format!("Invalid display order '{}'", self.display))?;
        Ok(session)
    }
}
