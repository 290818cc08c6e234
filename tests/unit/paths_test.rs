use kube_config_merge::paths::resolve_target_path;
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to save and restore `KUBECONFIG` and `HOME`
    struct EnvGuard {
        kubeconfig_original: Option<String>,
        home_original: Option<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                kubeconfig_original: std::env::var("KUBECONFIG").ok(),
                home_original: std::env::var("HOME").ok(),
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.kubeconfig_original {
                Some(value) => std::env::set_var("KUBECONFIG", value),
                None => std::env::remove_var("KUBECONFIG"),
            }
            match &self.home_original {
                Some(value) => std::env::set_var("HOME", value),
                None => std::env::remove_var("HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_explicit_path_beats_kubeconfig_env() {
        let _guard = EnvGuard::new();
        std::env::set_var("KUBECONFIG", "/from/env");

        let path = resolve_target_path(Some(Path::new("/from/flag"))).unwrap();
        assert_eq!(path, PathBuf::from("/from/flag"));
    }

    #[test]
    #[serial]
    fn test_kubeconfig_env_prefers_existing_entry() {
        let _guard = EnvGuard::new();
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let present = temp_dir.path().join("present");
        fs::write(&present, "apiVersion: v1\n").unwrap();
        std::env::set_var("KUBECONFIG", std::env::join_paths([&missing, &present]).unwrap());

        assert_eq!(resolve_target_path(None).unwrap(), present);
    }

    #[test]
    #[serial]
    #[cfg(unix)]
    fn test_falls_back_to_home_kube_config() {
        let _guard = EnvGuard::new();
        let temp_dir = TempDir::new().unwrap();
        std::env::remove_var("KUBECONFIG");
        std::env::set_var("HOME", temp_dir.path());

        assert_eq!(
            resolve_target_path(None).unwrap(),
            temp_dir.path().join(".kube").join("config")
        );
    }

    #[test]
    #[serial]
    #[cfg(unix)]
    fn test_empty_kubeconfig_env_is_ignored() {
        let _guard = EnvGuard::new();
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var("KUBECONFIG", "");
        std::env::set_var("HOME", temp_dir.path());

        assert_eq!(
            resolve_target_path(None).unwrap(),
            temp_dir.path().join(".kube").join("config")
        );
    }
}
