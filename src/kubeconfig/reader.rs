use super::Kubeconfig;
use anyhow::Context as _;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Parse a kubeconfig document from YAML (or JSON, which YAML accepts).
///
/// Blank input yields an empty document.
///
/// # Errors
///
/// Returns an error if the content is not a valid kubeconfig document.
pub fn parse_kubeconfig(content: &str) -> Result<Kubeconfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(Kubeconfig::default());
    }
    serde_yaml::from_str(content)
}

/// Read the source document from a file, or from standard input when `path` is
/// `None` or `-`.
///
/// # Errors
///
/// Returns an error if:
/// - The source file cannot be opened
/// - Reading the content fails
/// - The content cannot be parsed
pub fn read_source(path: Option<&Path>) -> anyhow::Result<Kubeconfig> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            debug!("Reading source config from {}", path.display());
            let file = fs::File::open(path).context("Failed to open source config")?;
            read_source_from(file)
        },
        _ => {
            debug!("Reading source config from standard input");
            read_source_from(io::stdin().lock())
        },
    }
}

/// Read and parse a source document from any reader.
///
/// # Errors
///
/// Returns an error if reading or parsing fails.
pub fn read_source_from<R: Read>(mut reader: R) -> anyhow::Result<Kubeconfig> {
    let mut content = String::new();
    reader.read_to_string(&mut content).context("Failed to read source config")?;

    parse_kubeconfig(&content).context("Failed to parse source config")
}

/// Read the target document. A missing file is an empty document.
///
/// # Errors
///
/// Returns an error if:
/// - Unable to read the file (when it exists)
/// - Unable to parse the content
pub fn read_kubeconfig<P: AsRef<Path>>(path: P) -> anyhow::Result<Kubeconfig> {
    let path_ref = path.as_ref();

    if !path_ref.exists() {
        debug!("Target config {} does not exist, starting empty", path_ref.display());
        return Ok(Kubeconfig::default());
    }

    let content = fs::read_to_string(path_ref).with_context(|| {
        format!("Failed to read target config: {}", path_ref.display())
    })?;

    parse_kubeconfig(&content)
        .with_context(|| format!("Failed to parse target config: {}", path_ref.display()))
}

/// Read several target files into one document. The first file defining a name wins.
///
/// # Errors
///
/// Returns an error if any existing file cannot be read or parsed.
pub fn read_layered<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<Kubeconfig> {
    let mut layered = Kubeconfig::default();
    for path in paths {
        layered.fill_missing_from(&read_kubeconfig(path)?);
    }
    Ok(layered)
}
