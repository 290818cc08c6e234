#![allow(missing_docs)]

pub mod app_config;
pub mod cli;
pub mod kubeconfig;
pub mod merge;
pub mod paths;

pub use kubeconfig::{EntryKind, Kubeconfig};
pub use merge::{check_merge, merge_kubeconfigs, target_name, CollisionPolicy, MergeError, MergePolicy};

#[derive(Debug, thiserror::Error)]
pub enum KubeMergeError {
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Merge a source document into a target document, both given as YAML text, and return
/// the merged target as YAML.
///
/// # Errors
///
/// Returns an error if either document fails to parse, the merge is rejected, or the
/// result cannot be serialized.
pub fn merge_yaml(
    target: &str,
    source: &str,
    policy: &MergePolicy,
) -> Result<String, KubeMergeError> {
    let mut target = kubeconfig::reader::parse_kubeconfig(target)?;
    let source = kubeconfig::reader::parse_kubeconfig(source)?;

    merge_kubeconfigs(&mut target, &source, policy)?;

    Ok(kubeconfig::writer::to_yaml_string(&target)?)
}
