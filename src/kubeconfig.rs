#![allow(clippy::self_named_module_files)]

//! In-memory model of a kubeconfig document.
//!
//! On disk every namespace is a list of `{name, <kind>: {...}}` items. In memory each
//! namespace is a map keyed by name, which is what the merge engine works against.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub mod reader;
pub mod writer;

/// The three namespaces of a kubeconfig document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Cluster,
    Context,
    User,
}

impl EntryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Context => "context",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection attributes of a cluster. Only `server` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    // certificate-authority-data, insecure-skip-tls-verify, proxy-url, extensions, ...
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A named binding of a cluster reference and a user reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Credential material for a user. Entirely opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// A whole kubeconfig document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawKubeconfig", into = "RawKubeconfig")]
pub struct Kubeconfig {
    pub api_version: String,
    pub kind: String,
    pub preferences: Value,
    pub clusters: BTreeMap<String, Cluster>,
    pub contexts: BTreeMap<String, Context>,
    pub users: BTreeMap<String, AuthInfo>,
    pub current_context: String,
    pub extensions: Option<Value>,
    /// Unknown top-level keys, preserved as-is.
    pub extra: BTreeMap<String, Value>,
}

impl Default for Kubeconfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            preferences: empty_object(),
            clusters: BTreeMap::new(),
            contexts: BTreeMap::new(),
            users: BTreeMap::new(),
            current_context: String::new(),
            extensions: None,
            extra: BTreeMap::new(),
        }
    }
}

/// A context reference that does not resolve inside the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub context: String,
    pub kind: EntryKind,
    pub name: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context '{}' references unknown {} '{}'", self.context, self.kind, self.name)
    }
}

impl Kubeconfig {
    /// True when the document has no clusters, contexts or users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.contexts.is_empty() && self.users.is_empty()
    }

    /// Number of entries in the given namespace.
    #[must_use]
    pub fn len_of(&self, kind: EntryKind) -> usize {
        match kind {
            EntryKind::Cluster => self.clusters.len(),
            EntryKind::Context => self.contexts.len(),
            EntryKind::User => self.users.len(),
        }
    }

    /// Whether `name` exists in the given namespace.
    #[must_use]
    pub fn contains(&self, kind: EntryKind, name: &str) -> bool {
        match kind {
            EntryKind::Cluster => self.clusters.contains_key(name),
            EntryKind::Context => self.contexts.contains_key(name),
            EntryKind::User => self.users.contains_key(name),
        }
    }

    /// Add every entry of `lower` whose name is not taken yet. Entries already present win,
    /// the way kubectl layers the files of a `KUBECONFIG` list.
    pub fn fill_missing_from(&mut self, lower: &Kubeconfig) {
        for (name, cluster) in &lower.clusters {
            self.clusters.entry(name.clone()).or_insert_with(|| cluster.clone());
        }
        for (name, context) in &lower.contexts {
            self.contexts.entry(name.clone()).or_insert_with(|| context.clone());
        }
        for (name, user) in &lower.users {
            self.users.entry(name.clone()).or_insert_with(|| user.clone());
        }
    }

    /// Context references pointing at clusters or users missing from this document.
    ///
    /// Empty references are treated as unset and never reported.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        for (name, context) in &self.contexts {
            if !context.cluster.is_empty() && !self.clusters.contains_key(&context.cluster) {
                dangling.push(DanglingReference {
                    context: name.clone(),
                    kind: EntryKind::Cluster,
                    name: context.cluster.clone(),
                });
            }
            if !context.user.is_empty() && !self.users.contains_key(&context.user) {
                dangling.push(DanglingReference {
                    context: name.clone(),
                    kind: EntryKind::User,
                    name: context.user.clone(),
                });
            }
        }

        dangling
    }
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Config".to_string()
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Treats an explicit `null` list the same as a missing one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Deserialize)]
struct NamedCluster {
    name: String,
    #[serde(default)]
    cluster: Cluster,
}

#[derive(Serialize, Deserialize)]
struct NamedContext {
    name: String,
    #[serde(default)]
    context: Context,
}

#[derive(Serialize, Deserialize)]
struct NamedAuthInfo {
    name: String,
    #[serde(default)]
    user: AuthInfo,
}

/// The kubectl on-disk layout.
#[derive(Serialize, Deserialize)]
struct RawKubeconfig {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    api_version: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default = "empty_object")]
    preferences: Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    clusters: Vec<NamedCluster>,
    #[serde(default, deserialize_with = "null_as_empty")]
    contexts: Vec<NamedContext>,
    #[serde(default, deserialize_with = "null_as_empty")]
    users: Vec<NamedAuthInfo>,
    #[serde(rename = "current-context", default)]
    current_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extensions: Option<Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

fn collect_unique<T>(
    kind: EntryKind,
    items: impl IntoIterator<Item = (String, T)>,
) -> Result<BTreeMap<String, T>, String> {
    let mut map = BTreeMap::new();
    for (name, entry) in items {
        if map.contains_key(&name) {
            return Err(format!("duplicate {kind} name '{name}'"));
        }
        map.insert(name, entry);
    }
    Ok(map)
}

impl TryFrom<RawKubeconfig> for Kubeconfig {
    type Error = String;

    fn try_from(raw: RawKubeconfig) -> Result<Self, Self::Error> {
        Ok(Self {
            api_version: raw.api_version,
            kind: raw.kind,
            preferences: raw.preferences,
            clusters: collect_unique(
                EntryKind::Cluster,
                raw.clusters.into_iter().map(|c| (c.name, c.cluster)),
            )?,
            contexts: collect_unique(
                EntryKind::Context,
                raw.contexts.into_iter().map(|c| (c.name, c.context)),
            )?,
            users: collect_unique(
                EntryKind::User,
                raw.users.into_iter().map(|u| (u.name, u.user)),
            )?,
            current_context: raw.current_context.unwrap_or_default(),
            extensions: raw.extensions,
            extra: raw.extra,
        })
    }
}

impl From<Kubeconfig> for RawKubeconfig {
    fn from(config: Kubeconfig) -> Self {
        Self {
            api_version: config.api_version,
            kind: config.kind,
            preferences: config.preferences,
            clusters: config
                .clusters
                .into_iter()
                .map(|(name, cluster)| NamedCluster { name, cluster })
                .collect(),
            contexts: config
                .contexts
                .into_iter()
                .map(|(name, context)| NamedContext { name, context })
                .collect(),
            users: config
                .users
                .into_iter()
                .map(|(name, user)| NamedAuthInfo { name, user })
                .collect(),
            current_context: Some(config.current_context),
            extensions: config.extensions,
            extra: config.extra,
        }
    }
}
