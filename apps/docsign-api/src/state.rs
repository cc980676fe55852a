//! Application state for DocSign API

use anyhow::{Context, Result};
use docsign_core::{LopdfBackend, SigningService};
use std::path::PathBuf;

use crate::config::Config;
use crate::store::FsStore;

pub type Service = SigningService<FsStore, LopdfBackend>;

pub struct AppState {
    pub service: Service,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let data_dir = config.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("docsign-api")
                .join("documents")
        });

        tracing::info!("Storing documents in {}", data_dir.display());
        let store = FsStore::open(&data_dir)
            .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;

        Ok(Self::with_store(store))
    }

    pub fn with_store(store: FsStore) -> Self {
        Self {
            service: SigningService::new(store, LopdfBackend),
        }
    }
}

/// Get platform-specific data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}
