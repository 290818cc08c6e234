use crate::KubeMergeError;
use directories::BaseDirs;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// Where the merge result goes, and which other files make up the effective target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
    /// The file that is read as the target and written back.
    pub destination: PathBuf,
    /// Remaining `KUBECONFIG` entries, in list order. Their entries are visible to kubectl
    /// below the destination's, so names taken there count as existing.
    pub layered: Vec<PathBuf>,
}

/// Locate the kubeconfig the merge result is written to.
///
/// Search order: explicit path, then the `KUBECONFIG` path list, then `~/.kube/config`.
///
/// # Errors
///
/// Returns an error if no explicit path or `KUBECONFIG` is given and the home directory
/// cannot be determined.
pub fn resolve_target_path(explicit: Option<&Path>) -> Result<PathBuf, KubeMergeError> {
    resolve_target_paths(explicit).map(|paths| paths.destination)
}

/// Like [`resolve_target_path`], but also returns the other files of a `KUBECONFIG` list.
///
/// # Errors
///
/// Returns an error if no explicit path or `KUBECONFIG` is given and the home directory
/// cannot be determined.
pub fn resolve_target_paths(explicit: Option<&Path>) -> Result<TargetPaths, KubeMergeError> {
    if let Some(path) = explicit {
        debug!("Using explicit target config {}", path.display());
        return Ok(TargetPaths { destination: path.to_path_buf(), layered: Vec::new() });
    }

    if let Some(value) = std::env::var_os(KUBECONFIG_ENV) {
        let candidates = kubeconfig_paths(&value);
        if let Some(destination) = first_kubeconfig_path(&value) {
            debug!("Using target config {} from {KUBECONFIG_ENV}", destination.display());
            let layered = candidates.into_iter().filter(|p| *p != destination).collect();
            return Ok(TargetPaths { destination, layered });
        }
    }

    default_kubeconfig_path().map(|destination| TargetPaths { destination, layered: Vec::new() })
}

/// Non-empty entries of a `KUBECONFIG` list, in order and without duplicates.
#[must_use]
pub fn kubeconfig_paths(value: &OsStr) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for path in std::env::split_paths(value).filter(|p| !p.as_os_str().is_empty()) {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// Pick the first existing entry of a `KUBECONFIG` list, or the first entry if none exist.
#[must_use]
pub fn first_kubeconfig_path(value: &OsStr) -> Option<PathBuf> {
    let candidates = kubeconfig_paths(value);

    candidates
        .iter()
        .find(|candidate| candidate.exists())
        .or_else(|| candidates.first())
        .cloned()
}

/// `$HOME/.kube/config`
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_kubeconfig_path() -> Result<PathBuf, KubeMergeError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".kube").join("config"))
        .ok_or_else(|| KubeMergeError::Config("Could not determine home directory".to_string()))
}
