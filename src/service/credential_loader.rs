use crate::db::models::NewCredential;
use crate::error::RetrieverError;
use std::{fs, path::Path};
use tracing::{info, warn};

/// Load credential JSON files (`{"screen_name", "access_token", "access_secret"}`)
/// from a directory. Unreadable or malformed files are skipped.
pub fn load_from_dir(dir: &Path) -> Result<Vec<NewCredential>, RetrieverError> {
    if !dir.exists() {
        info!(path = %dir.display(), "credentials directory not found; skipping load");
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                let err: RetrieverError = e.into();
                warn!(error = %err, "failed to read credentials dir entry");
                None
            }
        })
        .filter(|path| is_json_file(path))
        .collect();
    paths.sort();

    let loaded = paths
        .into_iter()
        .filter_map(|path| {
            load_credential(&path)
                .inspect_err(|e| {
                    warn!(path = %path.display(), error = %e, "failed to load credential");
                })
                .ok()
        })
        .collect();

    Ok(loaded)
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        == Some(true)
}

fn load_credential(path: &Path) -> Result<NewCredential, RetrieverError> {
    let contents = fs::read_to_string(path)?;
    let cred: NewCredential = serde_json::from_str(&contents)?;
    if cred.screen_name.trim().is_empty() {
        return Err(RetrieverError::InvalidConfig(format!(
            "empty screen_name in {}",
            path.display()
        )));
    }
    Ok(cred)
}
