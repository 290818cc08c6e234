use super::Kubeconfig;
use anyhow::Context as _;
use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Serialize a kubeconfig document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_yaml_string(config: &Kubeconfig) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(config)
}

/// Write a kubeconfig document to `path`.
///
/// The content goes to a temporary file next to the target, which then replaces it. An
/// existing symlink is followed so the file it points to is the one replaced.
///
/// # Errors
///
/// Returns an error if:
/// - Unable to create parent directories
/// - Unable to serialize the configuration
/// - Unable to write or persist the file
pub fn write_kubeconfig<P: AsRef<Path>>(path: P, config: &Kubeconfig) -> anyhow::Result<()> {
    let path_ref = resolve_destination(path.as_ref())?;
    let path_ref = path_ref.as_path();

    let parent = match path_ref.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;

    let yaml = to_yaml_string(config).context("Failed to serialize kubeconfig")?;

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    file.write_all(yaml.as_bytes()).context("Failed to write kubeconfig")?;
    restrict_permissions(file.as_file())?;
    file.persist(path_ref)
        .with_context(|| format!("Failed to modify configuration: {}", path_ref.display()))?;

    Ok(())
}

fn resolve_destination(path: &Path) -> anyhow::Result<PathBuf> {
    let is_symlink = fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink());
    if !is_symlink {
        return Ok(path.to_path_buf());
    }

    fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve symlink {}", path.display()))
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o600))
        .context("Failed to set kubeconfig permissions")
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_file: &fs::File) -> anyhow::Result<()> {
    Ok(())
}

/// Create a backup of a file with timestamp
///
/// # Errors
///
/// Returns an error if unable to copy the file
pub fn backup_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Option<String>> {
    let path_ref = path.as_ref();

    if !path_ref.exists() {
        return Ok(None);
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = path_ref.with_file_name(format!(
        "{}.backup.{}",
        path_ref.file_name().and_then(|n| n.to_str()).unwrap_or("config"),
        timestamp
    ));

    fs::copy(path_ref, &backup_path).with_context(|| {
        format!("Failed to copy {} to {}", path_ref.display(), backup_path.display())
    })?;

    Ok(Some(backup_path.to_string_lossy().to_string()))
}
