//! Artifact fetching from the Hugging Face Hub.

use std::path::PathBuf;

use hf_hub::api::sync::Api;
use tracing::debug;

use super::{Error, Result};

/// Resolve a single file from a Hub model repository, downloading it into the
/// local cache if it is not already present.
pub fn fetch(repo_id: &str, filename: &str) -> Result<PathBuf> {
    let api = Api::new().map_err(|e| Error::Hub(e.to_string()))?;
    let path = api
        .model(repo_id.to_string())
        .get(filename)
        .map_err(|e| Error::Hub(format!("{repo_id}/{filename}: {e}")))?;
    debug!("resolved {}/{} -> {:?}", repo_id, filename, path);
    Ok(path)
}
