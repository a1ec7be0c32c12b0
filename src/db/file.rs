use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::bot::error::Error;

/// Load a whole string-keyed JSON map from disk.
/// A missing, unreadable or corrupt file yields an empty map (cold start).
pub async fn load_map<V: DeserializeOwned>(path: &Path) -> BTreeMap<String, V> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist yet, starting empty", path.display());
            return BTreeMap::new();
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            error!("Failed to parse {}, starting empty: {}", path.display(), e);
            BTreeMap::new()
        }
    }
}

/// Replace the file with the whole map, pretty-printed
pub async fn save_map<V: Serialize>(path: &Path, map: &BTreeMap<String, V>) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(map)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Remove a store file, treating "already gone" as success.
/// Returns true if a file was deleted.
pub async fn remove_file(path: &Path) -> Result<bool, Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            Err(e.into())
        }
    }
}
