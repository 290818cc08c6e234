use crate::app_config::AppConfig;
use crate::merge::{CollisionPolicy, MergePolicy};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kube-config-merge",
    about = "Merge Kubernetes configuration from SOURCE into the current configuration",
    long_about = "Merges Kubernetes configuration from file SOURCE into the current
configuration. It uses the default kubectl config locations or you can
explicitly specify a target config using --kubeconfig flag. If no SOURCE is
specified it is read from standard input.

Defaults for --prefix, --override and --backup can be set in
$XDG_CONFIG_HOME/kube-config-merge/config.toml:

  [defaults]
  prefix = \"lab-\"
  override = false
  backup = true",
    after_help = "Examples:
  kube-config-merge some-kubeconfig.yaml

  kube-config-merge --kubeconfig my-target-config.yaml some-kubeconfig.yaml

  ssh k3s-host sudo cat /etc/rancher/k3s/k3s.yaml | kube-config-merge --name k3s --server https://k3s-host",
    version,
    author
)]
pub struct Cli {
    /// Source kubeconfig to merge ('-' or absent reads standard input)
    #[arg(value_name = "SOURCE", value_hint = clap::ValueHint::FilePath)]
    pub source: Option<PathBuf>,

    /// Path to the kubeconfig file, where other config should be merged into. If not
    /// specified default locations will be used.
    #[arg(long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub kubeconfig: Option<PathBuf>,

    /// Overwrite existing clusters, contexts and users in target config.
    #[arg(long = "override")]
    pub override_existing: bool,

    /// Overwrite the server url from the source with this particular server. This usually
    /// only makes sense if you have a single cluster in the source config.
    #[arg(long, value_name = "URL", default_value = "")]
    pub server: String,

    /// Put cluster, context and user in the target config under that specific name. Only
    /// works if you don't have more than one of each in source config.
    #[arg(long, value_name = "NAME", default_value = "")]
    pub name: String,

    /// Prefix names in target config with prefix.
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Print the merged configuration instead of writing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Create timestamped backup of the target configuration before writing
    #[arg(short, long)]
    pub backup: bool,

    /// Enable debug output (shows INFO and DEBUG messages)
    #[arg(long)]
    pub debug: bool,

    /// Enable trace output (shows all log messages including TRACE)
    #[arg(short = 't', long)]
    pub trace: bool,
}

impl Cli {
    /// Build the run policy, letting explicit flags win over configured defaults.
    #[must_use]
    pub fn merge_policy(&self, app_config: Option<&AppConfig>) -> MergePolicy {
        let prefix = self
            .prefix
            .as_deref()
            .or_else(|| app_config.and_then(AppConfig::default_prefix))
            .unwrap_or_default()
            .to_string();
        let override_existing =
            self.override_existing || app_config.is_some_and(AppConfig::override_existing);

        MergePolicy {
            collision: CollisionPolicy::from_override_flag(override_existing),
            server: self.server.clone(),
            override_name: self.name.clone(),
            prefix,
        }
    }

    #[must_use]
    pub fn backup_enabled(&self, app_config: Option<&AppConfig>) -> bool {
        self.backup || app_config.is_some_and(AppConfig::backup)
    }
}
