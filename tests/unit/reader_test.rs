use assert_fs::prelude::*;
use kube_config_merge::kubeconfig::reader;
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_kubeconfig_preserves_opaque_fields() {
        let temp_file = assert_fs::NamedTempFile::new("config").unwrap();
        temp_file
            .write_str(
                r"apiVersion: v1
kind: Config
preferences:
  colors: true
clusters:
- name: gke
  cluster:
    server: https://34.1.2.3
    certificate-authority-data: Q0E=
    tls-server-name: kubernetes.default
users:
- name: gke-user
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: gke-gcloud-auth-plugin
      provideClusterInfo: true
contexts:
- name: gke
  context:
    cluster: gke
    user: gke-user
    namespace: default
current-context: gke
",
            )
            .unwrap();

        let config = reader::read_kubeconfig(temp_file.path()).unwrap();

        assert_eq!(config.preferences, json!({"colors": true}));
        let cluster = config.clusters.get("gke").unwrap();
        assert_eq!(cluster.server, "https://34.1.2.3");
        assert_eq!(cluster.extra.get("tls-server-name"), Some(&json!("kubernetes.default")));

        let user = config.users.get("gke-user").unwrap();
        assert_eq!(
            user.fields.get("exec").and_then(|e| e.get("command")),
            Some(&json!("gke-gcloud-auth-plugin"))
        );
        assert_eq!(config.current_context, "gke");
    }

    #[test]
    fn test_read_kubeconfig_empty_file() {
        let temp_file = assert_fs::NamedTempFile::new("config").unwrap();
        temp_file.write_str("").unwrap();

        let config = reader::read_kubeconfig(temp_file.path()).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_read_kubeconfig_file_not_found() {
        let config = reader::read_kubeconfig("/nonexistent/path/config").unwrap();
        assert!(config.is_empty());
        assert_eq!(config.kind, "Config");
    }

    #[test]
    fn test_read_source_accepts_json() {
        let json = r#"{"apiVersion":"v1","users":[{"name":"ci","user":{"token":"abc"}}]}"#;

        let config = reader::read_source_from(json.as_bytes()).unwrap();
        assert_eq!(config.users.get("ci").and_then(|u| u.fields.get("token")), Some(&json!("abc")));
    }

    #[test]
    fn test_read_source_reports_path_errors() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let missing = temp_dir.child("missing.yaml");

        let err = reader::read_source(Some(missing.path())).unwrap_err();
        assert!(format!("{err:#}").starts_with("Failed to open source config"));
    }

    #[test]
    fn test_read_source_rejects_wrong_shape() {
        let err = reader::read_source_from("clusters: not-a-list".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse source config"));
    }
}
