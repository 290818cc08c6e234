#![allow(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use kube_config_merge::{
    app_config::AppConfig,
    cli::Cli,
    kubeconfig::{reader, writer},
    merge::{check_merge, merge_kubeconfigs},
    paths,
};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    initialize_tracing(cli.debug, cli.trace);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Initialize tracing with the specified debug/trace flags
fn initialize_tracing(debug: bool, trace: bool) {
    let log_level = if trace {
        Level::TRACE
    } else if debug {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::builder().with_default_directive(log_level.into()).from_env_lossy())
        .init();
}

/// Load application configuration and log its status
fn load_and_log_config() -> Result<Option<AppConfig>> {
    let app_config = AppConfig::load().context("Failed to load app configuration")?;

    if app_config.is_some() {
        debug!("Loaded app configuration from: {}", AppConfig::config_path()?.display());
    } else {
        debug!("No app configuration file found at: {}", AppConfig::config_path()?.display());
    }

    Ok(app_config)
}

fn run(cli: &Cli) -> Result<()> {
    let app_config = load_and_log_config()?;
    let policy = cli.merge_policy(app_config.as_ref());
    debug!("Merge policy: {policy:?}");

    let source = reader::read_source(cli.source.as_deref())?;

    let target_paths = paths::resolve_target_paths(cli.kubeconfig.as_deref())
        .context("Failed to open target config")?;
    let target_path = target_paths.destination;
    let mut target = reader::read_kubeconfig(&target_path)?;

    if !target_paths.layered.is_empty() {
        debug!("Checking names against {} more KUBECONFIG entries", target_paths.layered.len());
        let mut existing = target.clone();
        existing.fill_missing_from(&reader::read_layered(&target_paths.layered)?);
        check_merge(&existing, &source, &policy)?;
    }

    merge_kubeconfigs(&mut target, &source, &policy)?;

    if cli.dry_run {
        debug!("Dry run mode - not writing {}", target_path.display());
        print!("{}", writer::to_yaml_string(&target).context("Failed to serialize kubeconfig")?);
        return Ok(());
    }

    if cli.backup_enabled(app_config.as_ref()) {
        if let Some(backup_path) = writer::backup_file(&target_path)
            .with_context(|| format!("Failed to back up {}", target_path.display()))?
        {
            debug!("Backup created: {backup_path}");
        }
    }

    writer::write_kubeconfig(&target_path, &target)?;
    debug!("Wrote merged configuration to {}", target_path.display());

    Ok(())
}
