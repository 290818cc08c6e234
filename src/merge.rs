#![allow(clippy::self_named_module_files)]

//! Merge engine: inserts every cluster, context and user of a source kubeconfig into a
//! target kubeconfig under (optionally) renamed keys.
//!
//! The merge is two-phase. All target names are computed and checked first; the target is
//! only mutated once every entry is known to be insertable.

use crate::kubeconfig::{AuthInfo, Cluster, Context, EntryKind, Kubeconfig};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

pub mod strategy;

pub use strategy::CollisionPolicy;

/// Naming and overwrite options for a single merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePolicy {
    pub collision: CollisionPolicy,
    /// Replaces the server address of every merged cluster when non-empty.
    pub server: String,
    /// Collapses every merged entry onto this name when non-empty.
    pub override_name: String,
    pub prefix: String,
}

impl MergePolicy {
    fn target_name(&self, source_name: &str) -> String {
        target_name(source_name, &self.override_name, &self.prefix)
    }
}

/// Compute the name an entry gets in the target document.
///
/// A non-empty `override_name` replaces the source name entirely.
#[must_use]
pub fn target_name(source_name: &str, override_name: &str, prefix: &str) -> String {
    if override_name.is_empty() {
        format!("{prefix}{source_name}")
    } else {
        format!("{prefix}{override_name}")
    }
}

/// A target name that already exists and may not be overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: EntryKind,
    pub name: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' does already exist in target config", self.kind, self.name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MergeError {
    #[error(
        "you can't use --name to override name for source configurations with more than one cluster, context or user (source has {clusters} clusters, {contexts} contexts, {users} users)"
    )]
    AmbiguousOverride { clusters: usize, contexts: usize, users: usize },

    #[error("{}", join_conflicts(.conflicts))]
    Collision { conflicts: Vec<Conflict> },
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Names written to the target, per namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: Vec<(EntryKind, String)>,
    pub replaced: Vec<(EntryKind, String)>,
}

impl MergeReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.added.len() + self.replaced.len()
    }

    fn record(&mut self, kind: EntryKind, name: &str, existed: bool) {
        if existed {
            self.replaced.push((kind, name.to_string()));
        } else {
            self.added.push((kind, name.to_string()));
        }
    }
}

/// Entries computed from the source, ready to be written.
#[derive(Debug, Default)]
struct MergePlan {
    clusters: BTreeMap<String, Cluster>,
    contexts: BTreeMap<String, Context>,
    users: BTreeMap<String, AuthInfo>,
    conflicts: Vec<Conflict>,
}

impl MergePlan {
    fn check(&mut self, target: &Kubeconfig, kind: EntryKind, name: &str, policy: &MergePolicy) {
        if policy.collision == CollisionPolicy::Reject && target.contains(kind, name) {
            self.conflicts.push(Conflict { kind, name: name.to_string() });
        }
    }
}

/// Fails when a single override name would have to absorb several source entries.
fn check_override_name(source: &Kubeconfig, policy: &MergePolicy) -> Result<(), MergeError> {
    let clusters = source.len_of(EntryKind::Cluster);
    let contexts = source.len_of(EntryKind::Context);
    let users = source.len_of(EntryKind::User);

    if !policy.override_name.is_empty() && (clusters > 1 || contexts > 1 || users > 1) {
        return Err(MergeError::AmbiguousOverride { clusters, contexts, users });
    }

    Ok(())
}

fn plan_merge(target: &Kubeconfig, source: &Kubeconfig, policy: &MergePolicy) -> MergePlan {
    let mut plan = MergePlan::default();

    for (name, cluster) in &source.clusters {
        let target_name = policy.target_name(name);
        plan.check(target, EntryKind::Cluster, &target_name, policy);

        let mut new_cluster = cluster.clone();
        if !policy.server.is_empty() {
            new_cluster.server.clone_from(&policy.server);
        }
        plan.clusters.insert(target_name, new_cluster);
    }

    for (name, context) in &source.contexts {
        let target_name = policy.target_name(name);
        plan.check(target, EntryKind::Context, &target_name, policy);

        let mut new_context = context.clone();
        new_context.cluster = policy.target_name(&context.cluster);
        new_context.user = policy.target_name(&context.user);
        plan.contexts.insert(target_name, new_context);
    }

    for (name, user) in &source.users {
        let target_name = policy.target_name(name);
        plan.check(target, EntryKind::User, &target_name, policy);

        plan.users.insert(target_name, user.clone());
    }

    plan
}

fn checked_plan(
    existing: &Kubeconfig,
    source: &Kubeconfig,
    policy: &MergePolicy,
) -> Result<MergePlan, MergeError> {
    check_override_name(source, policy)?;

    let plan = plan_merge(existing, source, policy);
    if !plan.conflicts.is_empty() {
        return Err(MergeError::Collision { conflicts: plan.conflicts });
    }

    Ok(plan)
}

/// Runs the policy and collision checks of a merge against `existing` without writing
/// anything.
///
/// `existing` may hold more entries than the document that is finally written, e.g. every
/// file of a `KUBECONFIG` list layered together.
///
/// # Errors
///
/// Returns the same errors as [`merge_kubeconfigs`].
pub fn check_merge(
    existing: &Kubeconfig,
    source: &Kubeconfig,
    policy: &MergePolicy,
) -> Result<(), MergeError> {
    checked_plan(existing, source, policy).map(|_| ())
}

/// Merges the source document into the target document.
///
/// Namespaces are processed clusters, contexts, users. Every collision across all three is
/// reported together, and on any error the target is left exactly as it was.
///
/// # Errors
///
/// Returns an error if:
/// - An override name is set and the source has more than one cluster, context or user
/// - A target name already exists and the policy rejects collisions
pub fn merge_kubeconfigs(
    target: &mut Kubeconfig,
    source: &Kubeconfig,
    policy: &MergePolicy,
) -> Result<MergeReport, MergeError> {
    let plan = checked_plan(target, source, policy)?;
    let merged_contexts: Vec<String> = plan.contexts.keys().cloned().collect();

    let mut report = MergeReport::default();

    for (name, cluster) in plan.clusters {
        debug!("Merging cluster '{name}' (server: {})", cluster.server);
        report.record(EntryKind::Cluster, &name, target.clusters.contains_key(&name));
        target.clusters.insert(name, cluster);
    }

    for (name, context) in plan.contexts {
        debug!("Merging context '{name}' (cluster: {}, user: {})", context.cluster, context.user);
        report.record(EntryKind::Context, &name, target.contexts.contains_key(&name));
        target.contexts.insert(name, context);
    }

    for (name, user) in plan.users {
        debug!("Merging user '{name}'");
        report.record(EntryKind::User, &name, target.users.contains_key(&name));
        target.users.insert(name, user);
    }

    for dangling in target
        .dangling_references()
        .into_iter()
        .filter(|dangling| merged_contexts.contains(&dangling.context))
    {
        warn!("{dangling}");
    }

    info!(
        "Merged {} entries into target config ({} added, {} replaced)",
        report.total(),
        report.added.len(),
        report.replaced.len()
    );

    Ok(report)
}
